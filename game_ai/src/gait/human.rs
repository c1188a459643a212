use std::collections::VecDeque;

use game_common::math::Vec2Ext;
use game_common::UniqueId;
use game_core::sound::SoundRef;
use game_core::{Attachable, WorldContext};
use game_data::{Error, Property, Writer};
use glam::Vec2;

use super::{read_limb, read_sound, remove_collinear_points, save_limb, GaitInput, LegPair};
use crate::states::DeviceHandlingState;

const AIM_TARGET: &str = "Aim";

/// Two legs walking half a cycle apart and two arms following the aim.
#[derive(Clone, Debug, Default)]
pub struct HumanGait {
    pub legs: LegPair,
    pub fg_arm: Option<UniqueId>,
    pub bg_arm: Option<UniqueId>,
    /// Played whenever a stride ends.
    pub stride_sound: Option<SoundRef>,
}

impl HumanGait {
    pub const CLASS: &'static str = "AHuman";

    pub fn new(legs: LegPair) -> Self {
        Self {
            legs,
            ..Default::default()
        }
    }

    pub(super) fn update<C>(&mut self, body: &mut Attachable, input: &GaitInput, ctx: &mut C) -> u32
    where
        C: WorldContext + ?Sized,
    {
        let strides = self.legs.update(body, input, ctx);
        self.update_arms(body, input);
        strides
    }

    /// Points the arms along the aim while a device is handled.
    fn update_arms(&self, body: &mut Attachable, input: &GaitInput) {
        let aiming = matches!(
            input.states.device,
            DeviceHandlingState::Pointing
                | DeviceHandlingState::Scanning
                | DeviceHandlingState::Aiming
                | DeviceHandlingState::Firing
        );

        let aim = Vec2::new(input.aim_angle.cos(), -input.aim_angle.sin()).flip_x(body.is_h_flipped());
        let aim = body.rotation().rotate(aim);

        for id in [self.fg_arm, self.bg_arm].into_iter().flatten() {
            body.with_attachable_mut(id, |limb| {
                let Some(joint) = limb.joint_pos() else {
                    return;
                };
                let Some(arm) = limb.as_arm_mut() else {
                    return;
                };

                if aiming {
                    let target = joint + aim * arm.max_length;
                    arm.add_hand_target(AIM_TARGET, target);
                } else {
                    arm.clear_hand_targets();
                }
            });
        }
    }

    pub(super) fn on_new_move_path(&mut self, path: &mut VecDeque<Vec2>) {
        remove_collinear_points(path);
    }

    pub(super) fn read_property(&mut self, prop: &Property, body: &mut Attachable) -> Result<bool, Error> {
        match prop.name.as_str() {
            "FGArm" | "FGArmIndex" => self.fg_arm = Some(read_limb(prop, body)?),
            "BGArm" | "BGArmIndex" => self.bg_arm = Some(read_limb(prop, body)?),
            "StrideSound" => self.stride_sound = read_sound(prop)?,
            _ => return self.legs.read_property(prop, "", body),
        }

        Ok(true)
    }

    pub(super) fn save(&self, writer: &mut Writer, body: &Attachable) {
        save_limb(writer, "FGArm", self.fg_arm, body);
        save_limb(writer, "BGArm", self.bg_arm, body);
        self.legs.save(writer, "", body);

        if let Some(sound) = &self.stride_sound {
            sound.write(writer, "StrideSound");
        }
    }
}

#[cfg(test)]
mod tests {
    use game_core::arm::Arm;
    use game_core::attachable::Role;
    use game_core::{Attachable, Config, World};
    use game_data::{Property, Writer};
    use glam::Vec2;

    use super::HumanGait;
    use crate::gait::GaitInput;
    use crate::states::{DeviceHandlingState, LocomotionStates, MovementState};

    fn body_with_arm() -> (Attachable, HumanGait) {
        let mut body = Attachable::new();
        let arm = Attachable::with_role(Role::Arm(Arm::new()));

        let mut gait = HumanGait::default();
        gait.fg_arm = Some(arm.id());
        body.add_attachable(arm);
        (body, gait)
    }

    fn input(device: DeviceHandlingState) -> GaitInput {
        GaitInput {
            states: LocomotionStates {
                movement: MovementState::NoMove,
                device,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn arms_follow_aim_while_pointing() {
        let mut world = World::new(Config::default());
        let (mut body, mut gait) = body_with_arm();
        let id = gait.fg_arm.unwrap();

        gait.update(&mut body, &input(DeviceHandlingState::Aiming), &mut world);

        let arm = body.attachable(id).unwrap();
        let joint = arm.joint_pos().unwrap();
        let target = arm.as_arm().unwrap().next_hand_target().unwrap();
        assert_eq!(target.description, "Aim");
        assert!((target.pos - (joint + Vec2::new(10.0, 0.0))).length() < 1e-3);

        gait.update(&mut body, &input(DeviceHandlingState::Still), &mut world);
        let arm = body.attachable(id).unwrap();
        assert!(arm.as_arm().unwrap().next_hand_target().is_none());
    }

    #[test]
    fn arm_slots_are_read_and_saved_by_index() {
        let mut body = Attachable::new();
        let mut gait = HumanGait::default();

        let arm = Property::new("FGArm", "Arm").with_child(Property::new("MaxLength", "14"));
        assert!(gait.read_property(&arm, &mut body).unwrap());
        assert!(!gait.read_property(&Property::new("Wobble", "1"), &mut body).unwrap());

        let id = gait.fg_arm.unwrap();
        assert_eq!(body.attachables().len(), 1);
        assert_eq!(body.attachables()[0].id(), id);

        let mut writer = Writer::new();
        gait.save(&mut writer, &body);
        assert!(writer.finish().contains("FGArmIndex = 0"));

        let mut other = HumanGait::default();
        assert!(other
            .read_property(&Property::new("BGArmIndex", "0"), &mut body)
            .unwrap());
        assert_eq!(other.bg_arm, Some(id));
        assert!(other
            .read_property(&Property::new("BGArmIndex", "4"), &mut body)
            .is_err());
    }
}
