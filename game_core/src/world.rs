//! The world owning all free objects.

use std::collections::HashMap;
use std::time::Duration;

use game_common::math::SceneWrap;
use game_common::{Team, UniqueId};
use game_physics::{OpenTerrain, QueryFilter, TerrainQuery};
use game_tracing::trace_span;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::attachable::Attachable;
use crate::config::Config;
use crate::context::WorldContext;
use crate::particle::Particle;
use crate::pathfinding::{PathRequest, Pathfinder, StraightLinePathfinder};
use crate::pool::{ObjectPool, PoolObject};
use crate::preset::PresetLibrary;
use crate::sound::SoundRef;

/// A sound started during a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayedSound {
    pub sound: SoundRef,
    pub pos: Vec2,
}

/// A screen shake started during a tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScreenShake {
    pub pos: Vec2,
    pub amount: f32,
}

pub struct World {
    config: Config,
    pool: ObjectPool,
    presets: PresetLibrary,
    rng: StdRng,
    terrain: Box<dyn TerrainQuery + Send + Sync>,
    pathfinder: Box<dyn Pathfinder>,
    sounds: Vec<PlayedSound>,
    screen_shakes: Vec<ScreenShake>,
    /// Positions of all pooled objects at the start of the current step.
    positions: HashMap<UniqueId, Vec2>,
    frame: u64,
}

impl World {
    pub fn new(config: Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            pool: ObjectPool::new(),
            presets: PresetLibrary::new(),
            rng,
            terrain: Box::new(OpenTerrain),
            pathfinder: Box::new(StraightLinePathfinder::default()),
            sounds: Vec::new(),
            screen_shakes: Vec::new(),
            positions: HashMap::new(),
            frame: 0,
        }
    }

    pub fn with_terrain<T>(mut self, terrain: T) -> Self
    where
        T: TerrainQuery + Send + Sync + 'static,
    {
        self.terrain = Box::new(terrain);
        self
    }

    pub fn with_pathfinder<P>(mut self, pathfinder: P) -> Self
    where
        P: Pathfinder + 'static,
    {
        self.pathfinder = Box::new(pathfinder);
        self
    }

    pub fn with_presets(mut self, presets: PresetLibrary) -> Self {
        self.presets = presets;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn presets_mut(&mut self) -> &mut PresetLibrary {
        &mut self.presets
    }

    pub fn pool(&self) -> &ObjectPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ObjectPool {
        &mut self.pool
    }

    /// Returns the number of completed steps.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn sounds(&self) -> &[PlayedSound] {
        &self.sounds
    }

    pub fn screen_shakes(&self) -> &[ScreenShake] {
        &self.screen_shakes
    }

    /// Clears the sounds and screen shakes recorded so far.
    pub fn clear_effects(&mut self) {
        self.sounds.clear();
        self.screen_shakes.clear();
    }

    /// Advances every pooled object by one tick.
    ///
    /// Objects spawned during the step join the pool after it. Deleted objects are dropped.
    pub fn step(&mut self) {
        let _span = trace_span!("World::step").entered();

        let mut objects = std::mem::take(&mut self.pool);
        self.positions = objects.iter().map(|object| (object.id(), object.pos())).collect();

        let dt = self.config.timestep();
        let gravity = self.config.gravity();

        for object in objects.iter_mut() {
            match object {
                PoolObject::Body(body) => {
                    body.update(self);
                    body.travel(self);
                }
                PoolObject::Particle(particle) => {
                    particle.travel(dt, gravity);
                    let filter = QueryFilter::new().ignore(particle.id()).ignore_team(particle.team);
                    if self.terrain.is_obstructed(particle.pos, &filter) {
                        particle.set_to_delete();
                    }
                }
            }
        }

        objects.retain(|object| !object.to_delete());

        let spawned = self.pool.len();
        objects.append(&mut self.pool);
        self.pool = objects;
        self.positions.clear();
        self.frame += 1;

        if spawned > 0 {
            tracing::trace!("{} objects joined the pool", spawned);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl WorldContext for World {
    fn presets(&self) -> &PresetLibrary {
        &self.presets
    }

    fn add_particle(&mut self, particle: Particle) {
        self.pool.insert(particle);
    }

    fn add_object(&mut self, object: Attachable) {
        self.pool.insert(object);
    }

    fn play_sound(&mut self, sound: &SoundRef, pos: Vec2) {
        self.sounds.push(PlayedSound {
            sound: sound.clone(),
            pos,
        });
    }

    fn add_screen_shake(&mut self, pos: Vec2, amount: f32) {
        self.screen_shakes.push(ScreenShake {
            pos,
            amount: amount.min(self.config.max_screen_shake),
        });
    }

    fn shake_per_unit_of_gib_energy(&self) -> f32 {
        self.config.default_shake_per_unit_of_gib_energy
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    fn terrain(&self) -> &dyn TerrainQuery {
        &*self.terrain
    }

    fn scene_wrap(&self) -> SceneWrap {
        self.config.scene_wrap()
    }

    fn frame_time(&self) -> Duration {
        self.config.timestep()
    }

    fn gravity(&self) -> Vec2 {
        self.config.gravity()
    }

    fn request_path(&mut self, from: Vec2, to: Vec2, team: Team) -> PathRequest {
        self.pathfinder.request_path(from, to, team)
    }

    fn object_position(&self, id: UniqueId) -> Option<Vec2> {
        self.positions
            .get(&id)
            .copied()
            .or_else(|| self.pool.get(id).map(PoolObject::pos))
    }
}

#[cfg(test)]
mod tests {
    use game_physics::FlatGround;
    use glam::Vec2;

    use super::World;
    use crate::attachable::Attachable;
    use crate::config::Config;
    use crate::context::WorldContext;
    use crate::particle::Particle;

    fn world() -> World {
        World::new(Config {
            rng_seed: Some(1),
            ..Default::default()
        })
    }

    #[test]
    fn free_body_falls() {
        let mut world = world();
        let body = Attachable::new();
        let id = body.id();
        world.add_object(body);

        for _ in 0..10 {
            world.step();
        }

        let pos = world.object_position(id).unwrap();
        assert!(pos.y > 0.0);
        assert_eq!(pos.x, 0.0);
    }

    #[test]
    fn body_rests_on_ground() {
        let mut world = world().with_terrain(FlatGround::new(50.0));
        let body = Attachable::new();
        let id = body.id();
        world.add_object(body);

        for _ in 0..300 {
            world.step();
        }

        let pos = world.object_position(id).unwrap();
        assert!(pos.y < 50.0);
        assert!(pos.y > 40.0);
    }

    #[test]
    fn particles_expire() {
        let mut world = world();
        let mut particle = Particle::new();
        particle.lifetime = std::time::Duration::from_millis(100);
        world.add_particle(particle);

        for _ in 0..10 {
            world.step();
        }

        assert!(world.pool().is_empty());
        assert_eq!(world.frame(), 10);
    }

    #[test]
    fn particles_stop_in_terrain() {
        let mut world = world().with_terrain(FlatGround::new(5.0));
        let mut particle = Particle::new();
        particle.vel = Vec2::new(0.0, 10.0);
        world.add_particle(particle);

        for _ in 0..10 {
            world.step();
        }

        assert!(world.pool().is_empty());
    }

    #[test]
    fn screen_shake_is_clamped() {
        let mut world = world();
        world.add_screen_shake(Vec2::ZERO, 1.0e9);

        assert_eq!(world.screen_shakes()[0].amount, world.config().max_screen_shake);
    }
}
