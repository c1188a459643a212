//! Controllable units.
//!
//! An [`Actor`] is a body driven by a [`Controller`]. AI controlled actors follow their
//! waypoints through a [`Navigator`] and walk with a [`Gait`] chosen by their class.

mod status;

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use game_common::time::Timer;
use game_common::UniqueId;
use game_core::sound::SoundRef;
use game_core::{Attachable, WorldContext};
use game_data::{Error, Property, Serializable, Writer};
use game_physics::{QueryFilter, Speed};
use game_tracing::trace_span;
use glam::Vec2;

pub use status::{AiMode, Status};

use crate::controller::{ControlState, Controller, InputMode};
use crate::gait::{Gait, GaitInput};
use crate::inventory::Inventory;
use crate::navigator::{Navigator, Waypoint};
use crate::states::{JumpState, LocomotionStates, SweepState};

/// Angular velocity in rad/s above which an actor loses its footing.
pub const MAX_STABLE_ANG_VEL: f32 = 6.0;

#[derive(Clone, Debug)]
pub struct Actor {
    body: Attachable,
    pub health: f32,
    pub max_health: f32,
    status: Status,
    ai_mode: AiMode,
    pub controller: Controller,
    pub inventory: Inventory,
    navigator: Navigator,
    states: LocomotionStates,
    gait: Option<Gait>,
    /// Played when the velocity changes abruptly, e.g. when hitting the ground.
    pub body_hit_sound: Option<SoundRef>,
    /// Velocity change in m/s within one tick that plays the body hit sound.
    pub impact_threshold: f32,
    /// Impulse in kg·m/s applied upwards when a jump takes off.
    pub jump_impulse: f32,
    /// Horizontal distance in pixels to the move target below which the AI stops walking.
    pub move_threshold: f32,
    /// Height in pixels of a move target above the actor that makes the AI jump.
    pub jump_height: f32,
    /// Time spent in every phase of a sweep.
    pub sweep_interval: Duration,
    sweep_timer: Timer,
    /// Time between the actor dying and being dead.
    pub death_delay: Duration,
    death_timer: Timer,
}

impl Actor {
    pub fn new(body: Attachable) -> Self {
        Self {
            body,
            health: 100.0,
            max_health: 100.0,
            status: Status::Stable,
            ai_mode: AiMode::None,
            controller: Controller::new(InputMode::Ai),
            inventory: Inventory::new(),
            navigator: Navigator::new(),
            states: LocomotionStates::default(),
            gait: None,
            body_hit_sound: None,
            impact_threshold: 5.0,
            jump_impulse: 0.0,
            move_threshold: 2.0,
            jump_height: 20.0,
            sweep_interval: Duration::from_millis(1500),
            sweep_timer: Timer::new(),
            death_delay: Duration::from_millis(2000),
            death_timer: Timer::new(),
        }
    }

    /// Creates an actor walking with `gait`.
    pub fn with_gait(body: Attachable, gait: Gait) -> Self {
        let mut actor = Self::new(body);
        actor.gait = Some(gait);
        actor
    }

    /// Reads an actor from a property whose value names its class.
    ///
    /// `Actor` creates an actor without a gait, `AHuman` and `ACrab` pick the matching gait.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the class is unknown or any child property is invalid.
    pub fn from_property(prop: &Property) -> Result<Self, Error> {
        let gait = if prop.value == <Self as Serializable>::CLASS {
            None
        } else {
            Some(Gait::from_class(&prop.value).ok_or_else(|| prop.unknown_class())?)
        };

        let mut actor = Self::new(Attachable::new());
        actor.gait = gait;
        game_data::apply(&mut actor, &prop.children)?;
        Ok(actor)
    }

    pub fn class_name(&self) -> &'static str {
        match &self.gait {
            Some(gait) => gait.class_name(),
            None => <Self as Serializable>::CLASS,
        }
    }

    /// Writes this actor as a nested block named `name`.
    pub fn write(&self, writer: &mut Writer, name: &str) {
        writer.begin(name, self.class_name());
        self.save(writer);
        writer.end();
    }

    pub fn body(&self) -> &Attachable {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Attachable {
        &mut self.body
    }

    pub fn into_body(self) -> Attachable {
        self.body
    }

    pub fn gait(&self) -> Option<&Gait> {
        self.gait.as_ref()
    }

    pub fn gait_mut(&mut self) -> Option<&mut Gait> {
        self.gait.as_mut()
    }

    /// Returns the total mass including everything in the inventory.
    pub fn mass(&self) -> f32 {
        self.body.mass() + self.inventory.mass()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_status(&mut self, status: Status) {
        if self.status != status {
            self.status = status;
            self.death_timer.reset();
        }
    }

    pub fn states(&self) -> &LocomotionStates {
        &self.states
    }

    pub fn ai_mode(&self) -> AiMode {
        self.ai_mode
    }

    /// Switches the AI mode. Waypoints and the move path of the previous mode are dropped.
    pub fn set_ai_mode(&mut self, mode: AiMode) {
        if self.ai_mode == mode {
            return;
        }

        self.ai_mode = mode;
        self.navigator.clear_ai_waypoints();
        self.navigator.clear_move_path();

        self.states.sweep = sweep_state_for(mode);
        self.sweep_timer.reset();
    }

    /// Returns `true` if any arm of the actor holds a device.
    pub fn holds_device(&self) -> bool {
        self.body
            .attachables()
            .iter()
            .any(|limb| limb.as_arm().is_some_and(|arm| arm.held_device().is_some()))
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn add_ai_scene_waypoint(&mut self, pos: Vec2) {
        self.navigator.add_scene_waypoint(pos);
    }

    /// Adds a waypoint following the object `id`. Returns `false` if the object does not exist.
    pub fn add_ai_mo_waypoint<C>(&mut self, id: UniqueId, ctx: &C) -> bool
    where
        C: WorldContext + ?Sized,
    {
        self.navigator.add_object_waypoint(id, ctx)
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &Waypoint> {
        self.navigator.waypoints()
    }

    pub fn last_ai_waypoint(&self) -> Vec2 {
        self.navigator.last_ai_waypoint()
    }

    pub fn move_path(&self) -> impl Iterator<Item = &Vec2> {
        self.navigator.move_path()
    }

    pub fn move_path_size(&self) -> usize {
        self.navigator.move_path_size()
    }

    pub fn is_waiting_on_new_move_path(&self) -> bool {
        self.navigator.is_waiting_on_new_move_path()
    }

    /// Requests a move path to the next waypoint. Returns `false` if a request is pending.
    pub fn update_move_path<C>(&mut self, ctx: &mut C) -> bool
    where
        C: WorldContext + ?Sized,
    {
        self.navigator.set_position(self.body.pos);
        self.navigator.update_move_path(self.body.team, ctx)
    }

    pub fn remove_move_path_beginning(&mut self) -> Option<Vec2> {
        self.navigator.remove_move_path_beginning()
    }

    pub fn remove_move_path_end(&mut self) -> Option<Vec2> {
        self.navigator.remove_move_path_end()
    }

    pub fn clear_ai_waypoints(&mut self) {
        self.navigator.clear_ai_waypoints();
    }

    pub fn clear_move_path(&mut self) {
        self.navigator.clear_move_path();
    }

    /// Runs one tick of the actor and everything attached to it.
    pub fn update<C>(&mut self, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        let _span = trace_span!("Actor::update").entered();

        if self.body.to_delete() {
            return;
        }

        let dt = ctx.frame_time();
        self.update_status(dt);

        self.navigator.set_position(self.body.pos);
        if self.controller.is_ai_controlled() && self.status.can_act() {
            self.update_ai(ctx);
        }

        if self.controller.is_state(ControlState::MoveLeft) {
            self.body.set_h_flipped(true);
        } else if self.controller.is_state(ControlState::MoveRight) {
            self.body.set_h_flipped(false);
        }

        let grounded = self.is_grounded(&*ctx);
        let holds_device = self.holds_device();
        let prev_jump = self.states.jump;
        self.states
            .update(self.controller.states(), grounded, self.body.vel.y, holds_device);
        self.update_sweep(dt);

        if prev_jump == JumpState::PrepareJump && self.states.jump.is_takeoff() {
            self.body.add_impulse(Vec2::new(0.0, -self.jump_impulse), Vec2::ZERO);
        }

        if let Some(gait) = &mut self.gait {
            let input = GaitInput {
                states: self.states,
                speed: speed(&self.controller),
                aim_angle: self.controller.aim_angle,
            };
            gait.update(&mut self.body, &input, ctx);
        }

        self.body.update(ctx);
        self.health -= self.body.collect_damage();
    }

    /// Integrates the motion of the actor.
    pub fn travel<C>(&mut self, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        let vel = self.body.vel;
        self.body.travel(ctx);

        if (self.body.vel - vel).length() > self.impact_threshold {
            if let Some(sound) = &self.body_hit_sound {
                ctx.play_sound(sound, self.body.pos);
            }
        }
    }

    fn update_status(&mut self, dt: Duration) {
        match self.status {
            Status::Dead => return,
            Status::Dying => {
                self.death_timer.tick(dt);
                if self.death_timer.elapsed() >= self.death_delay {
                    tracing::debug!("{} died", self.body.id());
                    self.status = Status::Dead;
                }
                return;
            }
            _ => (),
        }

        if self.health <= 0.0 {
            tracing::debug!("{} is dying", self.body.id());
            self.set_status(Status::Dying);
            self.controller.set_input_mode(InputMode::None);
            return;
        }

        match self.status {
            Status::Stable if self.body.ang_vel.abs() > MAX_STABLE_ANG_VEL => {
                self.status = Status::Unstable;
            }
            Status::Unstable if self.body.ang_vel.abs() <= MAX_STABLE_ANG_VEL => {
                self.status = Status::Stable;
            }
            _ => (),
        }
    }

    fn update_ai<C>(&mut self, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        let pos = self.body.pos;
        let team = self.body.team;

        match &mut self.gait {
            Some(gait) => self.navigator.update(pos, team, ctx, gait),
            None => self
                .navigator
                .update(pos, team, ctx, &mut |_: &mut VecDeque<Vec2>| {}),
        }

        self.controller
            .steer_towards(self.navigator.move_vector(), self.move_threshold, self.jump_height);
    }

    fn update_sweep(&mut self, dt: Duration) {
        if self.states.sweep == SweepState::NoSweep {
            return;
        }

        self.sweep_timer.tick(dt);
        if self.sweep_timer.elapsed() >= self.sweep_interval {
            self.states.sweep = self.states.sweep.advance();
            self.sweep_timer.reset();
        }
    }

    /// Returns `true` if there is terrain right below the lowest point of the actor.
    fn is_grounded<C>(&self, ctx: &C) -> bool
    where
        C: WorldContext + ?Sized,
    {
        let filter = QueryFilter::new().ignore(self.body.id()).ignore_team(self.body.team);
        let probe = self.body.pos + Vec2::new(0.0, self.body.radius() + 1.0);
        ctx.terrain().is_obstructed(probe, &filter)
    }
}

fn speed(controller: &Controller) -> Speed {
    if controller.is_state(ControlState::MoveFast) {
        Speed::Fast
    } else if controller.is_state(ControlState::BodyCrouch) {
        Speed::Slow
    } else {
        Speed::Normal
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::new(Attachable::new())
    }
}

impl Deref for Actor {
    type Target = Attachable;

    #[inline]
    fn deref(&self) -> &Attachable {
        &self.body
    }
}

impl DerefMut for Actor {
    #[inline]
    fn deref_mut(&mut self) -> &mut Attachable {
        &mut self.body
    }
}

fn sweep_state_for(mode: AiMode) -> SweepState {
    match mode {
        AiMode::Sentry => SweepState::SweepingUp,
        _ => SweepState::NoSweep,
    }
}

impl Serializable for Actor {
    const CLASS: &'static str = "Actor";

    fn read_property(&mut self, prop: &Property) -> Result<bool, Error> {
        match prop.name.as_str() {
            "Health" => self.health = prop.parse()?,
            "MaxHealth" => self.max_health = prop.parse()?,
            "Status" => self.status = Status::from_value(prop.parse()?).ok_or_else(|| prop.invalid())?,
            "AIMode" => {
                // Waypoints read before the mode are kept.
                self.ai_mode = AiMode::from_value(prop.parse()?).ok_or_else(|| prop.invalid())?;
                self.states.sweep = sweep_state_for(self.ai_mode);
            }
            "InputMode" => {
                let mode = InputMode::from_value(prop.parse()?).ok_or_else(|| prop.invalid())?;
                self.controller.set_input_mode(mode);
            }
            "BodyHitSound" => self.body_hit_sound = Some(SoundRef::read(prop)?),
            "ImpactThreshold" => self.impact_threshold = prop.parse()?,
            "JumpImpulse" => self.jump_impulse = prop.parse()?,
            "MoveThreshold" => self.move_threshold = prop.parse()?,
            "JumpHeight" => self.jump_height = prop.parse()?,
            "SweepInterval" => self.sweep_interval = Duration::from_secs_f32(prop.parse::<f32>()?.max(0.0) / 1000.0),
            "DeathDelay" => self.death_delay = Duration::from_secs_f32(prop.parse::<f32>()?.max(0.0) / 1000.0),
            "AddAISceneWaypoint" => self.navigator.add_scene_waypoint(prop.as_vec2()?),
            "AddInventory" => self.inventory.add(Attachable::from_property(prop)?),
            _ => {
                if let Some(gait) = &mut self.gait {
                    if gait.read_property(prop, &mut self.body)? {
                        return Ok(true);
                    }
                }

                return self.body.read_property(prop);
            }
        }

        Ok(true)
    }

    fn save(&self, writer: &mut Writer) {
        self.body.save(writer);

        writer.property("Health", self.health);
        writer.property("MaxHealth", self.max_health);
        writer.property("Status", self.status.value());
        writer.property("AIMode", self.ai_mode.value());
        writer.property("InputMode", self.controller.input_mode().value());
        if let Some(sound) = &self.body_hit_sound {
            sound.write(writer, "BodyHitSound");
        }
        writer.property("ImpactThreshold", self.impact_threshold);
        writer.property("JumpImpulse", self.jump_impulse);
        writer.property("MoveThreshold", self.move_threshold);
        writer.property("JumpHeight", self.jump_height);
        writer.property("SweepInterval", self.sweep_interval.as_secs_f32() * 1000.0);
        writer.property("DeathDelay", self.death_delay.as_secs_f32() * 1000.0);

        for waypoint in self.navigator.waypoints().filter(|waypoint| waypoint.object.is_none()) {
            writer.vec2("AddAISceneWaypoint", waypoint.pos);
        }

        for device in self.inventory.iter() {
            device.write(writer, "AddInventory");
        }

        if let Some(gait) = &self.gait {
            gait.save(writer, &self.body);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use game_common::assert_approx_eq;
    use game_core::sound::SoundRef;
    use game_core::{Attachable, Config, World};
    use game_physics::FlatGround;
    use glam::Vec2;

    use super::{Actor, AiMode, Status};
    use crate::controller::{ControlState, InputMode};
    use crate::gait::Gait;
    use crate::states::{JumpState, MovementState, SweepState};

    fn world() -> World {
        World::new(Config {
            rng_seed: Some(3),
            gravity: 0.0,
            ..Default::default()
        })
    }

    #[test]
    fn mass_includes_inventory() {
        let mut body = Attachable::new();
        body.set_individual_mass(60.0);
        let mut actor = Actor::new(body);

        let mut device = Attachable::new();
        device.set_individual_mass(4.0);
        actor.inventory.add(device);

        assert_approx_eq!(actor.mass(), 64.0);
    }

    #[test]
    fn changing_ai_mode_clears_waypoints() {
        let mut actor = Actor::default();
        actor.add_ai_scene_waypoint(Vec2::new(100.0, 0.0));
        actor.set_ai_mode(AiMode::Patrol);

        assert_eq!(actor.waypoints().count(), 0);
        assert_eq!(actor.move_path_size(), 0);

        actor.add_ai_scene_waypoint(Vec2::new(100.0, 0.0));
        actor.set_ai_mode(AiMode::Patrol);
        assert_eq!(actor.waypoints().count(), 1);
    }

    #[test]
    fn sentries_sweep() {
        let mut world = world();
        let mut actor = Actor::default();
        actor.set_ai_mode(AiMode::Sentry);
        actor.sweep_interval = Duration::from_millis(50);

        assert_eq!(actor.states().sweep, SweepState::SweepingUp);
        for _ in 0..4 {
            actor.update(&mut world);
        }
        assert_eq!(actor.states().sweep, SweepState::SweepUpPause);

        actor.set_ai_mode(AiMode::Stay);
        assert_eq!(actor.states().sweep, SweepState::NoSweep);
    }

    #[test]
    fn no_health_kills_after_delay() {
        let mut world = world();
        let mut actor = Actor::default();
        actor.death_delay = Duration::from_millis(100);
        actor.health = 0.0;

        actor.update(&mut world);
        assert_eq!(actor.status(), Status::Dying);
        assert!(actor.controller.is_disabled());

        for _ in 0..10 {
            actor.update(&mut world);
        }
        assert_eq!(actor.status(), Status::Dead);
    }

    #[test]
    fn spinning_actor_is_unstable() {
        let mut world = world();
        let mut actor = Actor::default();

        actor.ang_vel = 10.0;
        actor.update(&mut world);
        assert_eq!(actor.status(), Status::Unstable);

        actor.ang_vel = 0.0;
        actor.update(&mut world);
        assert_eq!(actor.status(), Status::Stable);
    }

    #[test]
    fn player_moves_and_faces_left() {
        let mut world = world().with_terrain(FlatGround::new(1.5));
        let mut actor = Actor::default();
        actor.controller.set_input_mode(InputMode::Player);
        actor.controller.set_state(ControlState::MoveLeft, true);

        actor.update(&mut world);

        assert!(actor.is_h_flipped());
        assert_eq!(actor.states().movement, MovementState::Walk);
    }

    #[test]
    fn jump_applies_impulse_on_takeoff() {
        let mut world = world().with_terrain(FlatGround::new(1.5));
        let mut actor = Actor::default();
        actor.jump_impulse = 50.0;
        actor.controller.set_input_mode(InputMode::Player);
        actor.controller.set_state(ControlState::BodyJump, true);

        actor.update(&mut world);
        assert_eq!(actor.states().jump, JumpState::PrepareJump);
        assert_eq!(actor.pending_impulse(), Vec2::ZERO);

        actor.update(&mut world);
        assert_eq!(actor.states().jump, JumpState::UpJump);
        assert_approx_eq!(actor.pending_impulse().y, -50.0);
    }

    #[test]
    fn hard_landing_plays_body_hit_sound() {
        let mut world = world().with_terrain(FlatGround::new(2.0));
        let mut actor = Actor::default();
        actor.body_hit_sound = Some(SoundRef::new("Thud"));
        actor.vel = Vec2::new(0.0, 20.0);

        actor.travel(&mut world);

        assert_eq!(actor.vel, Vec2::ZERO);
        assert_eq!(world.sounds().len(), 1);
    }

    #[test]
    fn class_picks_gait() {
        let prop = game_data::Property::new("AddActor", "ACrab")
            .with_child(game_data::Property::new("Health", "80"))
            .with_child(game_data::Property::new("AIMode", "1"));
        let actor = Actor::from_property(&prop).unwrap();

        assert!(matches!(actor.gait(), Some(Gait::Crab(_))));
        assert_eq!(actor.class_name(), "ACrab");
        assert_approx_eq!(actor.health, 80.0);
        assert_eq!(actor.ai_mode(), AiMode::Sentry);

        let prop = game_data::Property::new("AddActor", "ADoor");
        assert!(Actor::from_property(&prop).is_err());
    }

    #[test]
    fn ai_mode_keeps_waypoints_read_before_it() {
        let text = "\
AddActor = AHuman
\tAddAISceneWaypoint = Vector
\t\tX = 10
\t\tY = 20
\tAIMode = 1
";
        let props = game_data::Reader::parse(text).unwrap();
        let actor = Actor::from_property(&props[0]).unwrap();

        assert_eq!(actor.ai_mode(), AiMode::Sentry);
        assert_eq!(actor.states().sweep, SweepState::SweepingUp);
        assert_eq!(actor.waypoints().count(), 1);
        assert_eq!(actor.waypoints().next().unwrap().pos, Vec2::new(10.0, 20.0));
    }
}
