use game_common::{Team, UniqueId};
use glam::Vec2;

/// A collision between a moving object and a body.
#[derive(Clone, Debug, PartialEq)]
pub struct HitData {
    /// The scene position of the hit.
    pub point: Vec2,
    /// Velocity of the hitter at impact, in m/s.
    pub velocity: Vec2,
    /// Mass of the hitter, in kg.
    pub mass: f32,
    pub team: Team,
    pub source: Option<UniqueId>,
    /// Whether the hitter is a single particle rather than a body.
    pub is_particle: bool,
    /// The impulse applied to the body that was hit. Written by the body accepting the hit.
    pub resulting_impulse: Vec2,
}

impl HitData {
    pub fn new(point: Vec2, velocity: Vec2, mass: f32) -> Self {
        Self {
            point,
            velocity,
            mass,
            team: Team::NONE,
            source: None,
            is_particle: false,
            resulting_impulse: Vec2::ZERO,
        }
    }

    /// Returns the momentum carried by the hitter.
    #[inline]
    pub fn impulse(&self) -> Vec2 {
        self.velocity * self.mass
    }
}
