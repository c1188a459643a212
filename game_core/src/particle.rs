use std::time::Duration;

use game_common::time::Timer;
use game_common::units::PIXELS_PER_METER;
use game_common::{Team, UniqueId};
use game_data::{Error, Property, Serializable, Writer};
use glam::Vec2;

/// A single simulated point particle, used for debris, sparks and emissions.
#[derive(Clone, Debug)]
pub struct Particle {
    id: UniqueId,
    preset_name: String,
    /// Position in pixels.
    pub pos: Vec2,
    /// Velocity in m/s.
    pub vel: Vec2,
    pub mass: f32,
    /// Time after which the particle is removed. Zero lives forever.
    pub lifetime: Duration,
    pub team: Team,
    pub ignores_team_hits: bool,
    /// An object this particle does not collide with.
    pub ignore: Option<UniqueId>,
    age: Timer,
    to_delete: bool,
}

impl Particle {
    pub fn new() -> Self {
        Self {
            id: UniqueId::new(),
            preset_name: String::new(),
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            mass: 0.01,
            lifetime: Duration::ZERO,
            team: Team::NONE,
            ignores_team_hits: false,
            ignore: None,
            age: Timer::new(),
            to_delete: false,
        }
    }

    pub fn id(&self) -> UniqueId {
        self.id
    }

    pub fn preset_name(&self) -> &str {
        &self.preset_name
    }

    pub fn set_preset_name(&mut self, name: impl Into<String>) {
        self.preset_name = name.into();
    }

    /// Returns a copy of this particle with a new id.
    pub fn instantiate(&self) -> Self {
        Self {
            id: UniqueId::new(),
            age: Timer::new(),
            to_delete: false,
            ..self.clone()
        }
    }

    pub fn age(&self) -> Duration {
        self.age.elapsed()
    }

    pub fn to_delete(&self) -> bool {
        self.to_delete
    }

    pub fn set_to_delete(&mut self) {
        self.to_delete = true;
    }

    /// Moves the particle by one tick of `dt` under `gravity` (m/s²).
    pub fn travel(&mut self, dt: Duration, gravity: Vec2) {
        let secs = dt.as_secs_f32();
        self.vel += gravity * secs;
        self.pos += self.vel * secs * PIXELS_PER_METER;

        self.age.tick(dt);
        if !self.lifetime.is_zero() && self.age.elapsed() >= self.lifetime {
            self.to_delete = true;
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializable for Particle {
    const CLASS: &'static str = "MOPixel";

    fn read_property(&mut self, prop: &Property) -> Result<bool, Error> {
        match prop.name.as_str() {
            "PresetName" => self.preset_name = prop.value.clone(),
            "Mass" => self.mass = prop.parse()?,
            "LifeTime" => self.lifetime = Duration::from_millis(prop.parse()?),
            "Team" => self.team = Team(prop.parse()?),
            "IgnoresTeamHits" => self.ignores_team_hits = prop.as_bool()?,
            _ => return Ok(false),
        }

        Ok(true)
    }

    fn save(&self, writer: &mut Writer) {
        writer.property("PresetName", &self.preset_name);
        writer.property("Mass", self.mass);
        writer.property("LifeTime", self.lifetime.as_millis());
        writer.property("Team", self.team.0);
        writer.bool("IgnoresTeamHits", self.ignores_team_hits);
    }
}
