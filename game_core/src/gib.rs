//! Debris spawned when a body is destroyed.

use std::f32::consts::TAU;

use game_data::{Error, Property, Serializable, Writer};
use glam::Vec2;
use rand::{Rng, RngCore};

/// Step between consecutive gibs of a [`SpreadMode::Spiral`] gib, the golden angle.
pub const SPIRAL_ANGLE_STEP: f32 = 2.39996;

/// How the velocity directions of the copies of a [`Gib`] are distributed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpreadMode {
    /// Every copy gets an independent random angle within the spread.
    #[default]
    Random,
    /// Copies are distributed evenly across the spread.
    Even,
    /// Every copy is rotated by a fixed step from the previous one.
    Spiral,
}

impl SpreadMode {
    fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Random),
            1 => Some(Self::Even),
            2 => Some(Self::Spiral),
            _ => None,
        }
    }

    fn index(self) -> u8 {
        match self {
            Self::Random => 0,
            Self::Even => 1,
            Self::Spiral => 2,
        }
    }
}

/// A gib entry of a body: `count` copies of a preset spawned when the body gibs.
#[derive(Clone, Debug, PartialEq)]
pub struct Gib {
    /// Class of the spawned preset, e.g. `MOPixel` or `Attachable`.
    pub class: String,
    /// Name of the spawned preset.
    pub preset: String,
    /// Spawn offset from the center of the body, unrotated.
    pub offset: Vec2,
    pub count: u32,
    /// Half-angle of the spread cone in radians.
    pub spread: f32,
    pub min_velocity: f32,
    pub max_velocity: f32,
    /// Random variation of the lifetime of every copy in `[0, 1]`.
    pub life_variation: f32,
    /// Fraction of the velocity of the body added to every copy.
    pub inherits_velocity: f32,
    pub ignores_team_hits: bool,
    pub spread_mode: SpreadMode,
}

impl Gib {
    pub fn new(class: impl Into<String>, preset: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            preset: preset.into(),
            ..Default::default()
        }
    }

    /// Returns the velocity magnitudes of all copies in `[min, max]`.
    pub fn velocity_magnitudes(&self, min: f32, max: f32, rng: &mut dyn RngCore) -> Vec<f32> {
        match self.spread_mode {
            SpreadMode::Spiral => {
                let scale = (max - min) / (self.count as f32).sqrt();
                (0..self.count)
                    .map(|index| min + ((self.count - index) as f32).sqrt() * scale)
                    .collect()
            }
            _ => (0..self.count).map(|_| min + rng.gen::<f32>() * (max - min)).collect(),
        }
    }
}

impl Default for Gib {
    fn default() -> Self {
        Self {
            class: String::from("MOPixel"),
            preset: String::new(),
            offset: Vec2::ZERO,
            count: 1,
            spread: 0.1,
            min_velocity: 0.0,
            max_velocity: 0.0,
            life_variation: 0.1,
            inherits_velocity: 0.5,
            ignores_team_hits: false,
            spread_mode: SpreadMode::Random,
        }
    }
}

/// Returns the velocity angles of `count` copies spread around `base`.
pub fn gib_angles(mode: SpreadMode, count: u32, spread: f32, base: f32, rng: &mut dyn RngCore) -> Vec<f32> {
    match mode {
        SpreadMode::Random => (0..count)
            .map(|_| base + spread * rng.gen_range(-1.0_f32..=1.0))
            .collect(),
        SpreadMode::Even => (0..count)
            .map(|index| base - spread + 2.0 * spread * (index as f32 + 0.5) / count as f32)
            .collect(),
        SpreadMode::Spiral => {
            let start = base + rng.gen::<f32>() * TAU;
            (0..count)
                .map(|index| start + SPIRAL_ANGLE_STEP * index as f32)
                .collect()
        }
    }
}

impl Serializable for Gib {
    const CLASS: &'static str = "Gib";

    fn read_property(&mut self, prop: &Property) -> Result<bool, Error> {
        match prop.name.as_str() {
            "GibParticle" => {
                let Some(preset) = prop.preset_reference() else {
                    return Err(prop.invalid());
                };

                self.class = prop.value.clone();
                self.preset = preset.to_owned();
            }
            "Offset" => self.offset = prop.as_vec2()?,
            "Count" => self.count = prop.parse()?,
            "Spread" => self.spread = prop.parse()?,
            "MinVelocity" => self.min_velocity = prop.parse()?,
            "MaxVelocity" => self.max_velocity = prop.parse()?,
            "LifeVariation" => self.life_variation = prop.parse()?,
            "InheritsVel" => self.inherits_velocity = prop.parse()?,
            "IgnoresTeamHits" => self.ignores_team_hits = prop.as_bool()?,
            "SpreadMode" => {
                self.spread_mode = SpreadMode::from_index(prop.parse()?).ok_or_else(|| prop.invalid())?;
            }
            _ => return Ok(false),
        }

        Ok(true)
    }

    fn save(&self, writer: &mut Writer) {
        writer.reference("GibParticle", &self.class, &self.preset);
        writer.vec2("Offset", self.offset);
        writer.property("Count", self.count);
        writer.property("Spread", self.spread);
        writer.property("MinVelocity", self.min_velocity);
        writer.property("MaxVelocity", self.max_velocity);
        writer.property("LifeVariation", self.life_variation);
        writer.property("InheritsVel", self.inherits_velocity);
        writer.bool("IgnoresTeamHits", self.ignores_team_hits);
        writer.property("SpreadMode", self.spread_mode.index());
    }
}
