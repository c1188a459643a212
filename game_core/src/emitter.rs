//! Particle emitters. Wounds are emitters attached to a body.

use game_common::math::{Rotation, Vec2Ext};
use game_common::{Team, UniqueId};
use game_data::{Error, Property, Serializable, Writer};
use glam::Vec2;
use rand::Rng;

use crate::context::WorldContext;

/// A stream of particles emitted by an [`Emitter`].
#[derive(Clone, Debug, PartialEq)]
pub struct Emission {
    /// Name of the emitted particle preset.
    pub particle: String,
    pub particles_per_minute: f32,
    /// Number of particles emitted at once when the emitter starts.
    pub burst_size: u32,
    /// Half-angle of the spread cone in radians.
    pub spread: f32,
    pub min_velocity: f32,
    pub max_velocity: f32,
    /// Offset from the emitter, unrotated.
    pub offset: Vec2,
    /// Fraction of the emitter's velocity added to each particle.
    pub inherits_velocity: f32,
    accumulator: f32,
}

impl Emission {
    pub fn new(particle: impl Into<String>) -> Self {
        Self {
            particle: particle.into(),
            ..Default::default()
        }
    }
}

impl Default for Emission {
    fn default() -> Self {
        Self {
            particle: String::new(),
            particles_per_minute: 0.0,
            burst_size: 0,
            spread: 0.0,
            min_velocity: 0.0,
            max_velocity: 0.0,
            offset: Vec2::ZERO,
            inherits_velocity: 0.0,
            accumulator: 0.0,
        }
    }
}

impl Serializable for Emission {
    const CLASS: &'static str = "Emission";

    fn read_property(&mut self, prop: &Property) -> Result<bool, Error> {
        match prop.name.as_str() {
            "EmittedParticle" => {
                self.particle = prop.preset_reference().ok_or_else(|| prop.invalid())?.to_owned();
            }
            "ParticlesPerMinute" => self.particles_per_minute = prop.parse()?,
            "BurstSize" => self.burst_size = prop.parse()?,
            "Spread" => self.spread = prop.parse()?,
            "MinVelocity" => self.min_velocity = prop.parse()?,
            "MaxVelocity" => self.max_velocity = prop.parse()?,
            "Offset" => self.offset = prop.as_vec2()?,
            "InheritsVel" => self.inherits_velocity = prop.parse()?,
            _ => return Ok(false),
        }

        Ok(true)
    }

    fn save(&self, writer: &mut Writer) {
        writer.reference("EmittedParticle", "MOPixel", &self.particle);
        writer.property("ParticlesPerMinute", self.particles_per_minute);
        writer.property("BurstSize", self.burst_size);
        writer.property("Spread", self.spread);
        writer.property("MinVelocity", self.min_velocity);
        writer.property("MaxVelocity", self.max_velocity);
        writer.vec2("Offset", self.offset);
        writer.property("InheritsVel", self.inherits_velocity);
    }
}

/// The emitter role of an attachable.
#[derive(Clone, Debug, PartialEq)]
pub struct Emitter {
    pub emissions: Vec<Emission>,
    /// Emission direction relative to the emitter's rotation, in radians.
    pub emit_angle: f32,
    /// Damage dealt to the owning body when this emitter is removed as a wound.
    pub burst_damage: f32,
    /// Damage per second dealt to the owning body while emitting.
    pub emit_damage: f32,
    pub emitter_damage_multiplier: f32,
    enabled: bool,
    burst_pending: bool,
    emit_count: u64,
}

/// Kinematics of the body hosting an emitter.
#[derive(Copy, Clone, Debug)]
pub(crate) struct EmitterHost {
    pub id: UniqueId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: Rotation,
    pub flipped: bool,
    pub team: Team,
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            emissions: Vec::new(),
            emit_angle: 0.0,
            burst_damage: 0.0,
            emit_damage: 0.0,
            emitter_damage_multiplier: 1.0,
            enabled: false,
            burst_pending: false,
            emit_count: 0,
        }
    }

    pub fn is_emitting(&self) -> bool {
        self.enabled
    }

    /// Starts or stops emitting. Starting triggers the burst of every emission.
    pub fn enable_emission(&mut self, enable: bool) {
        if enable && !self.enabled {
            self.burst_pending = true;
        }

        self.enabled = enable;
    }

    /// Returns the total number of particles emitted so far.
    pub fn emit_count(&self) -> u64 {
        self.emit_count
    }

    /// Returns the damage this emitter represents when removed as a wound.
    pub fn wound_damage(&self) -> f32 {
        self.burst_damage * self.emitter_damage_multiplier
    }

    /// Returns the damage dealt to the owning body over `dt` seconds.
    pub fn damage_over(&self, dt: f32) -> f32 {
        if self.enabled {
            self.emit_damage * self.emitter_damage_multiplier * dt
        } else {
            0.0
        }
    }

    pub(crate) fn update<C>(&mut self, host: &EmitterHost, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        if !self.enabled {
            return;
        }

        let dt = ctx.frame_time().as_secs_f32();
        let emit_angle = self.emit_angle;
        let burst = std::mem::take(&mut self.burst_pending);

        for emission in &mut self.emissions {
            emission.accumulator += emission.particles_per_minute / 60.0 * dt;
            let mut count = emission.accumulator.floor() as u32;
            emission.accumulator -= count as f32;
            if burst {
                count += emission.burst_size;
            }

            if count == 0 {
                continue;
            }

            let Some(template) = ctx.presets().particle(&emission.particle).cloned() else {
                tracing::warn!("requested unknown particle preset {}", emission.particle);
                continue;
            };

            let origin = host.pos + host.rotation.rotate(emission.offset.flip_x(host.flipped));

            for _ in 0..count {
                let angle = emit_angle + emission.spread * ctx.rng().gen_range(-1.0_f32..=1.0);
                let dir = host.rotation.rotate(Vec2::from_angle(angle).flip_x(host.flipped));
                let speed = emission.min_velocity
                    + ctx.rng().gen::<f32>() * (emission.max_velocity - emission.min_velocity);

                let mut particle = template.instantiate();
                particle.pos = origin;
                particle.vel = dir * speed + host.vel * emission.inherits_velocity;
                particle.team = host.team;
                particle.ignore = Some(host.id);
                ctx.add_particle(particle);
            }

            self.emit_count += u64::from(count);
        }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializable for Emitter {
    const CLASS: &'static str = "AEmitter";

    fn read_property(&mut self, prop: &Property) -> Result<bool, Error> {
        match prop.name.as_str() {
            "AddEmission" => self.emissions.push(game_data::read_object(prop)?),
            "EmitAngle" => self.emit_angle = prop.parse()?,
            "BurstDamage" => self.burst_damage = prop.parse()?,
            "EmitDamage" => self.emit_damage = prop.parse()?,
            "EmitterDamageMultiplier" => self.emitter_damage_multiplier = prop.parse()?,
            "EmissionEnabled" => self.enable_emission(prop.as_bool()?),
            _ => return Ok(false),
        }

        Ok(true)
    }

    fn save(&self, writer: &mut Writer) {
        for emission in &self.emissions {
            game_data::write_object(writer, "AddEmission", emission);
        }

        writer.property("EmitAngle", self.emit_angle);
        writer.property("BurstDamage", self.burst_damage);
        writer.property("EmitDamage", self.emit_damage);
        writer.property("EmitterDamageMultiplier", self.emitter_damage_multiplier);
        writer.bool("EmissionEnabled", self.enabled);
    }
}
