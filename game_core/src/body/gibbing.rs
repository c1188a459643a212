use std::f32::consts::PI;

use game_common::math::Vec2Ext;
use game_common::UniqueId;
use game_tracing::trace_span;
use glam::Vec2;
use rand::Rng;

use super::Body;
use crate::context::WorldContext;
use crate::gib::{gib_angles, Gib};

impl Body {
    /// Destroys this body.
    ///
    /// Every gib entry is spawned into the world and every attachable is either gibbed as well
    /// or released with a push away from the center. The body is marked for deletion
    /// afterwards. Gibbing a body that is already marked for deletion does nothing.
    pub fn gib_this<C>(&mut self, impact_impulse: Vec2, ignore: Option<UniqueId>, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        if self.to_delete {
            return;
        }

        let _span = trace_span!("Body::gib_this").entered();
        tracing::debug!("gibbing {} with impulse {}", self.id, impact_impulse);

        let mut energy = 0.0;
        for gib in &self.gibs {
            energy += self.spawn_gib(gib, impact_impulse, ignore, ctx);
        }

        self.release_attachables_on_gib(ctx);

        if let Some(sound) = &self.gib_sound {
            ctx.play_sound(sound, self.pos);
        }

        let shake = self
            .gib_screen_shake_amount
            .unwrap_or_else(|| energy * ctx.shake_per_unit_of_gib_energy());
        if shake > 0.0 {
            ctx.add_screen_shake(self.pos, shake);
        }

        self.flash_white = true;
        self.to_delete = true;
    }

    /// Spawns all copies of `gib`. Returns their total kinetic energy.
    fn spawn_gib<C>(&self, gib: &Gib, impact_impulse: Vec2, ignore: Option<UniqueId>, ctx: &mut C) -> f32
    where
        C: WorldContext + ?Sized,
    {
        if gib.count == 0 {
            return 0.0;
        }

        let Some(template) = ctx.presets().instantiate(&gib.class, &gib.preset) else {
            tracing::warn!("requested unknown gib preset {} of class {}", gib.preset, gib.class);
            return 0.0;
        };

        let (mut min_velocity, mut max_velocity) = (gib.min_velocity, gib.max_velocity);
        if min_velocity == 0.0 && max_velocity == 0.0 {
            min_velocity = self.gib_blast_strength / self.mass().max(f32::EPSILON);
            max_velocity = min_velocity + 10.0;
        }

        let offset = self.rotation.rotate(gib.offset.flip_x(self.h_flipped));

        let base_angle = if gib.inherits_velocity > 0.0 && impact_impulse != Vec2::ZERO {
            impact_impulse.abs_angle()
        } else if offset != Vec2::ZERO {
            offset.abs_angle()
        } else if self.h_flipped {
            self.rotation.angle() + PI
        } else {
            self.rotation.angle()
        };

        let angles = gib_angles(gib.spread_mode, gib.count, gib.spread, base_angle, ctx.rng());
        let speeds = gib.velocity_magnitudes(min_velocity, max_velocity, ctx.rng());
        let inherited = (self.prev_vel + self.vel) / 2.0 * gib.inherits_velocity;

        let mut energy = 0.0;
        for (angle, speed) in angles.into_iter().zip(speeds) {
            let mut object = template.instantiate();
            let vel = Vec2::from_angle(angle) * speed + inherited;

            object.set_pos(self.pos + offset);
            object.set_vel(vel);
            object.set_team(self.team);
            object.set_ignores_team_hits(gib.ignores_team_hits);
            object.set_ignore(ignore);

            if gib.life_variation > 0.0 {
                let variation = gib.life_variation * ctx.rng().gen_range(-1.0_f32..=1.0);
                object.scale_lifetime(1.0 + variation);
            }

            energy += 0.5 * object.mass() * vel.length_squared();
            object.spawn(ctx);
        }

        energy
    }

    fn release_attachables_on_gib<C>(&mut self, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        let attachables = std::mem::take(&mut self.attachables);
        self.atoms.clear_subgroups();
        self.farthest_attachable = None;

        for mut child in attachables {
            self.update_attachable_and_wound_mass(-child.mass());
            child.detach();
            child.vel = self.vel;

            if ctx.rng().gen::<f32>() < child.gib_with_parent_chance || child.gib_when_removed_from_parent {
                child.gib_this(Vec2::ZERO, None, ctx);
                continue;
            }

            if child.delete_when_removed_from_parent {
                continue;
            }

            let blast = child.parent_gib_blast_strength_multiplier * self.gib_blast_strength / (1.0 + child.mass());
            let direction = self.rotation.rotate(child.parent_offset().flip_x(self.h_flipped));
            let strength = blast * 0.5 + blast * ctx.rng().gen::<f32>();
            child.vel = self.vel + direction.with_magnitude(strength);

            ctx.add_object(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use crate::attachable::Attachable;
    use crate::body::Body;
    use crate::config::Config;
    use crate::context::WorldContext;
    use crate::gib::Gib;
    use crate::particle::Particle;
    use crate::sound::SoundRef;
    use crate::world::World;

    fn world() -> World {
        let mut world = World::new(Config {
            rng_seed: Some(9),
            ..Default::default()
        });

        let mut spark = Particle::new();
        spark.set_preset_name("Spark");
        world.presets_mut().add_particle(spark).unwrap();

        let mut chunk = Attachable::new();
        chunk.set_preset_name("Chunk");
        world.presets_mut().add_attachable(chunk).unwrap();

        world
    }

    fn gib(class: &str, preset: &str, count: u32) -> Gib {
        Gib {
            count,
            ..Gib::new(class, preset)
        }
    }

    #[test]
    fn gib_spawns_every_copy() {
        let mut world = world();
        let mut body = Body::new();
        body.pos = Vec2::new(100.0, 50.0);
        body.gibs.push(gib("MOPixel", "Spark", 5));

        body.gib_this(Vec2::ZERO, None, &mut world);

        assert!(body.to_delete());
        assert_eq!(world.pool().particles().count(), 5);
        for particle in world.pool().particles() {
            assert_eq!(particle.pos, Vec2::new(100.0, 50.0));
            let speed = particle.vel.length();
            assert!((10.0 - 1e-3..=20.0 + 1e-3).contains(&speed), "speed {}", speed);
        }
    }

    #[test]
    fn gib_spawns_objects() {
        let mut world = world();
        let mut body = Body::new();
        body.gibs.push(gib("Attachable", "Chunk", 2));

        body.gib_this(Vec2::ZERO, None, &mut world);

        assert_eq!(world.pool().bodies().count(), 2);
        assert!(world.pool().bodies().all(|object| object.preset_name() == "Chunk"));
    }

    #[test]
    fn unknown_gib_presets_are_skipped() {
        let mut world = world();
        let mut body = Body::new();
        body.gibs.push(gib("MOPixel", "Missing", 3));
        body.gibs.push(gib("MOPixel", "Spark", 2));

        body.gib_this(Vec2::ZERO, None, &mut world);

        assert_eq!(world.pool().particles().count(), 2);
        assert!(body.to_delete());
    }

    #[test]
    fn gibbing_twice_does_nothing() {
        let mut world = world();
        let mut body = Body::new();
        body.gibs.push(gib("MOPixel", "Spark", 3));

        body.gib_this(Vec2::ZERO, None, &mut world);
        body.gib_this(Vec2::new(50.0, 0.0), None, &mut world);

        assert_eq!(world.pool().particles().count(), 3);
        assert_eq!(world.screen_shakes().len(), 1);
    }

    #[test]
    fn gib_plays_sound_and_shakes() {
        let mut world = world();
        let mut body = Body::new();
        body.pos = Vec2::new(3.0, 4.0);
        body.gib_sound = Some(SoundRef::new("Splat"));
        body.gib_screen_shake_amount = Some(2.5);

        body.gib_this(Vec2::ZERO, None, &mut world);

        assert_eq!(world.sounds().len(), 1);
        assert_eq!(world.sounds()[0].sound.name(), "Splat");
        assert_eq!(world.sounds()[0].pos, Vec2::new(3.0, 4.0));
        assert_eq!(world.screen_shakes()[0].amount, 2.5);
    }

    #[test]
    fn screen_shake_follows_gib_energy() {
        let mut world = world();
        let mut body = Body::new();
        body.gibs.push(gib("MOPixel", "Spark", 4));

        body.gib_this(Vec2::ZERO, None, &mut world);

        let energy: f32 = world
            .pool()
            .particles()
            .map(|particle| 0.5 * particle.mass * particle.vel.length_squared())
            .sum();
        let expected = energy * world.shake_per_unit_of_gib_energy();

        assert_eq!(world.screen_shakes().len(), 1);
        assert!((world.screen_shakes()[0].amount - expected).abs() <= 1e-4);
    }

    #[test]
    fn gib_releases_attachables() {
        let mut world = world();
        let mut body = Body::new();
        let mut child = Attachable::new();
        child.set_parent_offset(Vec2::new(5.0, 0.0));
        let id = child.id();
        body.add_attachable(child);

        body.gib_this(Vec2::ZERO, None, &mut world);

        assert!(body.attachables().is_empty());
        assert_eq!(body.mass(), body.individual_mass());

        let released = world.pool().get(id).and_then(|object| object.as_body()).unwrap();
        assert!(!released.is_attached());
        assert!(released.vel.x >= 2.5 - 1e-4);
        assert!(released.vel.y.abs() <= 1e-4);
    }

    #[test]
    fn gib_takes_attachables_along() {
        let mut world = world();
        let mut body = Body::new();

        let mut doomed = Attachable::new();
        doomed.gib_with_parent_chance = 1.0;
        doomed.gibs.push(gib("MOPixel", "Spark", 2));
        let mut deleted = Attachable::new();
        deleted.delete_when_removed_from_parent = true;
        let (doomed_id, deleted_id) = (doomed.id(), deleted.id());
        body.add_attachable(doomed);
        body.add_attachable(deleted);

        body.gib_this(Vec2::ZERO, None, &mut world);

        assert!(!world.pool().contains(doomed_id));
        assert!(!world.pool().contains(deleted_id));
        assert_eq!(world.pool().particles().count(), 2);
    }
}
