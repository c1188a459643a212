use std::time::Duration;

use game_common::math::SceneWrap;
use game_common::{Team, UniqueId};
use game_physics::TerrainQuery;
use glam::Vec2;
use rand::RngCore;

use crate::attachable::Attachable;
use crate::particle::Particle;
use crate::pathfinding::PathRequest;
use crate::preset::PresetLibrary;
use crate::sound::SoundRef;

/// The world as seen by a simulated object during its tick.
///
/// All engine services a body or actor needs are reached through this trait instead of
/// global state, so objects can be simulated against any implementation of it.
pub trait WorldContext {
    /// Returns the library of loaded presets.
    fn presets(&self) -> &PresetLibrary;

    /// Adds a new particle to the world.
    fn add_particle(&mut self, particle: Particle);

    /// Adds a free object to the world, transferring ownership of it.
    fn add_object(&mut self, object: Attachable);

    /// Plays `sound` at the scene position `pos`.
    fn play_sound(&mut self, sound: &SoundRef, pos: Vec2);

    /// Shakes the screen around `pos`.
    fn add_screen_shake(&mut self, pos: Vec2, amount: f32);

    /// Returns the screen shake caused by one unit of gib kinetic energy.
    fn shake_per_unit_of_gib_energy(&self) -> f32;

    fn rng(&mut self) -> &mut dyn RngCore;

    fn terrain(&self) -> &dyn TerrainQuery;

    fn scene_wrap(&self) -> SceneWrap;

    /// Returns the duration of the current tick.
    fn frame_time(&self) -> Duration;

    /// Returns the gravity acceleration in m/s².
    fn gravity(&self) -> Vec2;

    /// Requests a path from `from` to `to`. The request completes asynchronously.
    fn request_path(&mut self, from: Vec2, to: Vec2, team: Team) -> PathRequest;

    /// Returns the position of the object `id`, or `None` if it no longer exists.
    fn object_position(&self, id: UniqueId) -> Option<Vec2>;
}
