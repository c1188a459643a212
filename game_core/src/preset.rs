//! Named templates of particles and attachables.

use std::collections::HashMap;
use std::time::Duration;

use game_common::{Team, UniqueId};
use game_data::{Reader, Serializable};
use glam::Vec2;
use thiserror::Error;

use crate::attachable::Attachable;
use crate::context::WorldContext;
use crate::particle::Particle;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PresetError {
    #[error(transparent)]
    Data(#[from] game_data::Error),
    #[error("duplicate preset {0}")]
    Duplicate(String),
    #[error("line {line}: preset of class {class} has no name")]
    Unnamed { line: usize, class: String },
    #[error("line {line}: unknown preset class {class}")]
    UnknownClass { line: usize, class: String },
}

/// A library of presets referenced by name from other presets, e.g. gib particles and break
/// wounds.
#[derive(Clone, Debug, Default)]
pub struct PresetLibrary {
    particles: HashMap<String, Particle>,
    attachables: HashMap<String, Attachable>,
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len() + self.attachables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add_particle(&mut self, particle: Particle) -> Result<(), PresetError> {
        let name = particle.preset_name().to_owned();
        if self.particles.contains_key(&name) {
            return Err(PresetError::Duplicate(name));
        }

        self.particles.insert(name, particle);
        Ok(())
    }

    pub fn add_attachable(&mut self, attachable: Attachable) -> Result<(), PresetError> {
        let name = attachable.preset_name().to_owned();
        if self.attachables.contains_key(&name) {
            return Err(PresetError::Duplicate(name));
        }

        self.attachables.insert(name, attachable);
        Ok(())
    }

    pub fn particle(&self, name: &str) -> Option<&Particle> {
        self.particles.get(name)
    }

    pub fn attachable(&self, name: &str) -> Option<&Attachable> {
        self.attachables.get(name)
    }

    /// Returns a new particle from the preset `name`.
    pub fn instantiate_particle(&self, name: &str) -> Option<Particle> {
        self.particle(name).map(Particle::instantiate)
    }

    /// Returns a new attachable from the preset `name`.
    pub fn instantiate_attachable(&self, name: &str) -> Option<Attachable> {
        self.attachable(name).map(Attachable::instantiate)
    }

    /// Returns a new object of `class` from the preset `name`.
    pub fn instantiate(&self, class: &str, name: &str) -> Option<PresetInstance> {
        if class == Particle::CLASS {
            return self.instantiate_particle(name).map(PresetInstance::Particle);
        }

        let attachable = self.instantiate_attachable(name)?;
        if attachable.class_name() != class {
            tracing::warn!(
                "preset {} is a {}, not a {}",
                name,
                attachable.class_name(),
                class
            );
            return None;
        }

        Some(PresetInstance::Object(attachable))
    }

    /// Loads all presets defined in `text`, e.g. `AddEffect = MOPixel` blocks.
    ///
    /// Presets may reference presets defined earlier in the same text or in earlier loads.
    pub fn load(&mut self, text: &str) -> Result<(), PresetError> {
        let _span = game_tracing::trace_span!("PresetLibrary::load").entered();

        for prop in Reader::parse(text)? {
            if !prop.name.starts_with("Add") {
                tracing::warn!("line {}: expected a preset, found {}, skipping", prop.line, prop.name);
                continue;
            }

            match prop.value.as_str() {
                "MOPixel" => {
                    let particle: Particle = game_data::read_object(&prop)?;
                    if particle.preset_name().is_empty() {
                        return Err(PresetError::Unnamed {
                            line: prop.line,
                            class: prop.value,
                        });
                    }
                    self.add_particle(particle)?;
                }
                "Attachable" | "AEmitter" | "Arm" | "Leg" => {
                    let attachable = Attachable::from_property(&prop)?;
                    if attachable.preset_name().is_empty() {
                        return Err(PresetError::Unnamed {
                            line: prop.line,
                            class: prop.value,
                        });
                    }
                    self.add_attachable(attachable)?;
                }
                _ => {
                    return Err(PresetError::UnknownClass {
                        line: prop.line,
                        class: prop.value,
                    })
                }
            }
        }

        tracing::debug!("loaded {} presets", self.len());
        Ok(())
    }
}

/// A freshly instantiated preset.
#[derive(Clone, Debug)]
pub enum PresetInstance {
    Particle(Particle),
    Object(Attachable),
}

impl PresetInstance {
    /// Returns a copy with new ids.
    pub fn instantiate(&self) -> Self {
        match self {
            Self::Particle(particle) => Self::Particle(particle.instantiate()),
            Self::Object(object) => Self::Object(object.instantiate()),
        }
    }

    pub fn id(&self) -> UniqueId {
        match self {
            Self::Particle(particle) => particle.id(),
            Self::Object(object) => object.id(),
        }
    }

    pub fn mass(&self) -> f32 {
        match self {
            Self::Particle(particle) => particle.mass,
            Self::Object(object) => object.mass(),
        }
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        match self {
            Self::Particle(particle) => particle.pos = pos,
            Self::Object(object) => object.pos = pos,
        }
    }

    pub fn set_vel(&mut self, vel: Vec2) {
        match self {
            Self::Particle(particle) => particle.vel = vel,
            Self::Object(object) => object.vel = vel,
        }
    }

    pub fn set_team(&mut self, team: Team) {
        match self {
            Self::Particle(particle) => particle.team = team,
            Self::Object(object) => object.team = team,
        }
    }

    /// Only particles ignore team hits.
    pub fn set_ignores_team_hits(&mut self, ignores: bool) {
        if let Self::Particle(particle) = self {
            particle.ignores_team_hits = ignores;
        }
    }

    /// Only particles ignore objects.
    pub fn set_ignore(&mut self, ignore: Option<UniqueId>) {
        if let Self::Particle(particle) = self {
            particle.ignore = ignore;
        }
    }

    /// Scales the lifetime of particles by `factor`.
    pub fn scale_lifetime(&mut self, factor: f32) {
        if let Self::Particle(particle) = self {
            particle.lifetime = Duration::from_secs_f32(particle.lifetime.as_secs_f32() * factor.max(0.0));
        }
    }

    /// Adds this instance to the world.
    pub fn spawn<C>(self, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        match self {
            Self::Particle(particle) => ctx.add_particle(particle),
            Self::Object(object) => ctx.add_object(object),
        }
    }
}
