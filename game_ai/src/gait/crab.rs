use std::collections::VecDeque;

use game_core::sound::SoundRef;
use game_core::{Attachable, WorldContext};
use game_data::{Error, Property, Writer};
use glam::Vec2;

use super::{read_sound, remove_collinear_points, GaitInput, LegDrive, LegPair};

/// Default distance in pixels below which consecutive path points are merged.
pub const DEFAULT_MIN_PATH_SPACING: f32 = 20.0;

/// Two pairs of legs, one on each side of the body.
///
/// The left legs walk their paths mirrored against the facing of the body.
#[derive(Clone, Debug)]
pub struct CrabGait {
    pub left: LegPair,
    pub right: LegPair,
    pub stride_sound: Option<SoundRef>,
    /// Crabs take wide steps and skip path points closer than this to the previous one.
    pub min_path_spacing: f32,
}

impl CrabGait {
    pub const CLASS: &'static str = "ACrab";

    pub fn new(mut left: LegPair, right: LegPair) -> Self {
        left.fg.mirrored = true;
        left.bg.mirrored = true;

        Self {
            left,
            right,
            stride_sound: None,
            min_path_spacing: DEFAULT_MIN_PATH_SPACING,
        }
    }

    pub(super) fn update<C>(&mut self, body: &mut Attachable, input: &GaitInput, ctx: &mut C) -> u32
    where
        C: WorldContext + ?Sized,
    {
        self.left.update(body, input, ctx) + self.right.update(body, input, ctx)
    }

    pub(super) fn on_new_move_path(&mut self, path: &mut VecDeque<Vec2>) {
        remove_collinear_points(path);

        let Some(last) = path.back().copied() else {
            return;
        };

        let mut spaced: VecDeque<Vec2> = VecDeque::with_capacity(path.len());
        for point in path.iter().copied() {
            match spaced.back() {
                Some(prev) if prev.distance(point) < self.min_path_spacing => (),
                _ => spaced.push_back(point),
            }
        }

        // The destination is always kept.
        if spaced.back() != Some(&last) {
            if spaced.len() > 1 && spaced.back().is_some_and(|prev| prev.distance(last) < self.min_path_spacing) {
                spaced.pop_back();
            }
            spaced.push_back(last);
        }

        *path = spaced;
    }

    pub(super) fn read_property(&mut self, prop: &Property, body: &mut Attachable) -> Result<bool, Error> {
        match prop.name.as_str() {
            "StrideSound" => self.stride_sound = read_sound(prop)?,
            "MinPathSpacing" => self.min_path_spacing = prop.parse()?,
            _ => {
                if self.left.read_property(prop, "Left", body)? {
                    return Ok(true);
                }

                return self.right.read_property(prop, "Right", body);
            }
        }

        Ok(true)
    }

    pub(super) fn save(&self, writer: &mut Writer, body: &Attachable) {
        self.left.save(writer, "Left", body);
        self.right.save(writer, "Right", body);
        writer.property("MinPathSpacing", self.min_path_spacing);

        if let Some(sound) = &self.stride_sound {
            sound.write(writer, "StrideSound");
        }
    }
}

impl Default for CrabGait {
    fn default() -> Self {
        Self::new(
            LegPair::new(LegDrive::default(), LegDrive::default()),
            LegPair::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use game_core::attachable::Role;
    use game_core::leg::Leg;
    use game_core::{Attachable, Config, World};
    use game_data::Property;
    use glam::Vec2;

    use super::CrabGait;
    use crate::gait::GaitInput;
    use crate::states::{LocomotionStates, MovementState};

    #[test]
    fn left_legs_are_mirrored() {
        let gait = CrabGait::default();
        assert!(gait.left.fg.mirrored && gait.left.bg.mirrored);
        assert!(!gait.right.fg.mirrored && !gait.right.bg.mirrored);
    }

    #[test]
    fn close_path_points_are_merged() {
        let mut gait = CrabGait::default();
        let mut path: VecDeque<Vec2> = [
            Vec2::new(0.0, 0.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(40.0, 0.0),
            Vec2::new(45.0, 10.0),
            Vec2::new(50.0, 20.0),
        ]
        .into_iter()
        .collect();

        gait.on_new_move_path(&mut path);

        assert_eq!(path.front(), Some(&Vec2::new(0.0, 0.0)));
        assert_eq!(path.back(), Some(&Vec2::new(50.0, 20.0)));
        for (a, b) in path.iter().zip(path.iter().skip(1)) {
            assert!(a.distance(*b) >= 10.0);
        }
        assert!(path.len() < 5);
    }

    #[test]
    fn prefixed_legs_are_read() {
        let mut body = Attachable::new();
        let mut gait = CrabGait::default();

        assert!(gait
            .read_property(&Property::new("LeftFGLeg", "Leg"), &mut body)
            .unwrap());
        assert!(gait
            .read_property(&Property::new("RightBGLeg", "Leg"), &mut body)
            .unwrap());
        assert!(!gait
            .read_property(&Property::new("FGLeg", "Leg"), &mut body)
            .unwrap());

        assert_eq!(body.attachables().len(), 2);
        assert!(gait.left.fg.leg.is_some());
        assert!(gait.right.bg.leg.is_some());
        assert!(gait.left.bg.leg.is_none());
    }

    #[test]
    fn both_sides_walk() {
        let mut world = World::new(Config {
            gravity: 0.0,
            ..Default::default()
        });
        let mut body = Attachable::new();
        let mut gait = CrabGait::default();

        for pair in [&mut gait.left, &mut gait.right] {
            let leg = Attachable::with_role(Role::Leg(Leg::new()));
            pair.fg.leg = Some(leg.id());
            pair.fg.walk_path = game_physics::LimbPath::new(Vec2::new(4.0, 10.0), vec![Vec2::new(-8.0, 0.0)]);
            body.add_attachable(leg);
        }

        let input = GaitInput {
            states: LocomotionStates {
                movement: MovementState::Walk,
                ..Default::default()
            },
            ..Default::default()
        };
        gait.update(&mut body, &input, &mut world);

        assert!(gait.left.fg.limb_pos().is_some());
        assert!(gait.right.fg.limb_pos().is_some());
        assert_ne!(gait.left.fg.limb_pos(), gait.right.fg.limb_pos());
    }
}
