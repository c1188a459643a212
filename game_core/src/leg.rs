//! Ankle tracking for legs.

use game_common::math::{Rotation, Vec2Ext};
use game_common::UniqueId;
use game_data::{Error, Property, Serializable, Writer};
use glam::Vec2;

/// The leg role of an attachable.
///
/// The ankle is tracked as an offset from the joint in the unrotated, unflipped frame of the
/// leg's parent. Its distance from the joint stays between the lengths of the contracted and
/// extended offsets.
#[derive(Clone, Debug, PartialEq)]
pub struct Leg {
    contracted_offset: Vec2,
    extended_offset: Vec2,
    min_extension: f32,
    max_extension: f32,
    pub idle_offset: Vec2,
    pub will_idle: bool,
    /// Fraction of the remaining distance to the target covered every tick.
    pub move_speed: f32,
    ankle_offset: Vec2,
    target_position: Option<Vec2>,
    pub(crate) foot: Option<UniqueId>,
}

impl Leg {
    pub fn new() -> Self {
        let mut leg = Self {
            contracted_offset: Vec2::new(0.0, 4.0),
            extended_offset: Vec2::new(0.0, 12.0),
            min_extension: 0.0,
            max_extension: 0.0,
            idle_offset: Vec2::new(0.0, 12.0),
            will_idle: true,
            move_speed: 0.5,
            ankle_offset: Vec2::new(0.0, 12.0),
            target_position: None,
            foot: None,
        };
        leg.update_extensions();
        leg
    }

    pub fn contracted_offset(&self) -> Vec2 {
        self.contracted_offset
    }

    pub fn set_contracted_offset(&mut self, offset: Vec2) {
        self.contracted_offset = offset;
        self.update_extensions();
    }

    pub fn extended_offset(&self) -> Vec2 {
        self.extended_offset
    }

    pub fn set_extended_offset(&mut self, offset: Vec2) {
        self.extended_offset = offset;
        self.update_extensions();
    }

    fn update_extensions(&mut self) {
        let a = self.contracted_offset.length();
        let b = self.extended_offset.length();
        self.min_extension = a.min(b);
        self.max_extension = a.max(b);
    }

    pub fn min_extension(&self) -> f32 {
        self.min_extension
    }

    pub fn max_extension(&self) -> f32 {
        self.max_extension
    }

    pub fn ankle_offset(&self) -> Vec2 {
        self.ankle_offset
    }

    /// Returns how far the leg is extended, `0` when contracted and `1` when extended.
    pub fn extension_ratio(&self) -> f32 {
        let range = self.max_extension - self.min_extension;
        if range <= 0.0 {
            return 1.0;
        }

        ((self.ankle_offset.length() - self.min_extension) / range).clamp(0.0, 1.0)
    }

    pub fn target_position(&self) -> Option<Vec2> {
        self.target_position
    }

    /// Sets the scene position the ankle should move to. `None` lets the leg idle.
    pub fn set_target_position(&mut self, target: Option<Vec2>) {
        self.target_position = target;
    }

    pub fn foot(&self) -> Option<UniqueId> {
        self.foot
    }

    /// Moves the ankle toward its target and returns the new ankle offset.
    ///
    /// `frame` is the rotation of the leg's parent.
    pub(crate) fn update(&mut self, joint_pos: Vec2, frame: Rotation, flipped: bool) -> Vec2 {
        let target = match self.target_position {
            Some(pos) => Some(frame.unrotate(pos - joint_pos).flip_x(flipped)),
            None if self.will_idle => Some(self.idle_offset),
            None => None,
        };

        if let Some(target) = target {
            self.ankle_offset += (target - self.ankle_offset) * self.move_speed.clamp(0.0, 1.0);
        }

        self.ankle_offset = if self.ankle_offset.length_squared() <= f32::EPSILON {
            self.extended_offset.with_magnitude(self.min_extension)
        } else {
            self.ankle_offset.clamp_length(self.min_extension, self.max_extension)
        };

        self.ankle_offset
    }
}

impl Default for Leg {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializable for Leg {
    const CLASS: &'static str = "Leg";

    fn read_property(&mut self, prop: &Property) -> Result<bool, Error> {
        match prop.name.as_str() {
            "ContractedOffset" => self.set_contracted_offset(prop.as_vec2()?),
            "ExtendedOffset" => self.set_extended_offset(prop.as_vec2()?),
            "IdleOffset" => self.idle_offset = prop.as_vec2()?,
            "WillIdle" => self.will_idle = prop.as_bool()?,
            "MoveSpeed" => self.move_speed = prop.parse()?,
            _ => return Ok(false),
        }

        Ok(true)
    }

    fn save(&self, writer: &mut Writer) {
        writer.vec2("ContractedOffset", self.contracted_offset);
        writer.vec2("ExtendedOffset", self.extended_offset);
        writer.vec2("IdleOffset", self.idle_offset);
        writer.bool("WillIdle", self.will_idle);
        writer.property("MoveSpeed", self.move_speed);
    }
}
