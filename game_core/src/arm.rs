//! Hand reaching for arms.

use std::collections::VecDeque;
use std::time::Duration;

use game_common::math::{Rotation, Vec2Ext};
use game_common::time::Timer;
use game_common::UniqueId;
use game_data::{Error, Property, Serializable, Writer};
use glam::Vec2;

/// Distance in pixels at which the hand has reached its target.
pub const HAND_TARGET_THRESHOLD: f32 = 1.0;

/// A scene position the hand should reach for.
#[derive(Clone, Debug, PartialEq)]
pub struct HandTarget {
    /// Targets with the same description replace each other.
    pub description: String,
    pub pos: Vec2,
    /// Time the hand stays at the target before moving on to the next one.
    pub delay: Duration,
    timer: Timer,
}

/// The arm role of an attachable.
///
/// The hand is tracked as an offset from the joint in the unrotated, unflipped frame of the
/// arm's parent. A held device is an attachable of the arm positioned at the hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Arm {
    pub max_length: f32,
    /// Fraction of the remaining distance to the target covered every tick.
    pub move_speed: f32,
    pub idle_offset: Vec2,
    pub will_idle: bool,
    pub grip_strength: f32,
    pub throw_strength: f32,
    hand_offset: Vec2,
    hand_targets: VecDeque<HandTarget>,
    pub(crate) held_device: Option<UniqueId>,
}

impl Arm {
    pub fn new() -> Self {
        Self {
            max_length: 10.0,
            move_speed: 0.5,
            idle_offset: Vec2::ZERO,
            will_idle: true,
            grip_strength: 0.0,
            throw_strength: 0.0,
            hand_offset: Vec2::ZERO,
            hand_targets: VecDeque::new(),
            held_device: None,
        }
    }

    pub fn hand_offset(&self) -> Vec2 {
        self.hand_offset
    }

    /// Moves the hand immediately, limited to the reach of the arm.
    pub fn set_hand_offset(&mut self, offset: Vec2) {
        self.hand_offset = offset.clamp_length_max(self.max_length);
    }

    /// Adds a target the hand should reach for.
    pub fn add_hand_target(&mut self, description: impl Into<String>, pos: Vec2) {
        self.add_hand_target_with_delay(description, pos, Duration::ZERO);
    }

    /// Adds a target the hand should reach for and then stay at for `delay`.
    ///
    /// If a target with the same description is queued already, it is updated in place.
    pub fn add_hand_target_with_delay(&mut self, description: impl Into<String>, pos: Vec2, delay: Duration) {
        let description = description.into();

        if let Some(target) = self
            .hand_targets
            .iter_mut()
            .find(|target| target.description == description)
        {
            target.pos = pos;
            target.delay = delay;
            return;
        }

        self.hand_targets.push_back(HandTarget {
            description,
            pos,
            delay,
            timer: Timer::new(),
        });
    }

    pub fn next_hand_target(&self) -> Option<&HandTarget> {
        self.hand_targets.front()
    }

    pub fn hand_targets(&self) -> impl Iterator<Item = &HandTarget> {
        self.hand_targets.iter()
    }

    pub fn clear_hand_targets(&mut self) {
        self.hand_targets.clear();
    }

    pub fn held_device(&self) -> Option<UniqueId> {
        self.held_device
    }

    /// Moves the hand toward the next target and returns the new hand offset.
    ///
    /// `frame` is the rotation of the arm's parent.
    pub(crate) fn update(&mut self, joint_pos: Vec2, frame: Rotation, flipped: bool, dt: Duration) -> Vec2 {
        let max_length = self.max_length;
        let to_local = |pos: Vec2| frame.unrotate(pos - joint_pos).flip_x(flipped);

        let target = match self.hand_targets.front_mut() {
            Some(target) => {
                let local = to_local(target.pos).clamp_length_max(max_length);

                if (self.hand_offset - local).length() < HAND_TARGET_THRESHOLD {
                    target.timer.tick(dt);
                    if target.timer.elapsed() >= target.delay {
                        self.hand_targets.pop_front();
                    }
                }

                Some(local)
            }
            None if self.will_idle => Some(self.idle_offset),
            None => None,
        };

        if let Some(target) = target {
            self.hand_offset += (target - self.hand_offset) * self.move_speed.clamp(0.0, 1.0);
        }

        self.hand_offset = self.hand_offset.clamp_length_max(max_length);
        self.hand_offset
    }
}

impl Default for Arm {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializable for Arm {
    const CLASS: &'static str = "Arm";

    fn read_property(&mut self, prop: &Property) -> Result<bool, Error> {
        match prop.name.as_str() {
            "MaxLength" => self.max_length = prop.parse()?,
            "MoveSpeed" => self.move_speed = prop.parse()?,
            "IdleOffset" => self.idle_offset = prop.as_vec2()?,
            "WillIdle" => self.will_idle = prop.as_bool()?,
            "GripStrength" => self.grip_strength = prop.parse()?,
            "ThrowStrength" => self.throw_strength = prop.parse()?,
            _ => return Ok(false),
        }

        Ok(true)
    }

    fn save(&self, writer: &mut Writer) {
        writer.property("MaxLength", self.max_length);
        writer.property("MoveSpeed", self.move_speed);
        writer.vec2("IdleOffset", self.idle_offset);
        writer.bool("WillIdle", self.will_idle);
        writer.property("GripStrength", self.grip_strength);
        writer.property("ThrowStrength", self.throw_strength);
    }
}
