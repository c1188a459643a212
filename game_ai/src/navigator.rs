//! AI waypoints and the move path walked towards them.
//!
//! Waypoints are the goals of an actor. The move path is the route to the first of them,
//! computed by the pathfinder of the world. The navigator requests a new route whenever the
//! current one is used up while waypoints remain, and adopts it once the request completes.

use std::collections::VecDeque;

use game_common::math::SceneWrap;
use game_common::{Team, UniqueId};
use game_core::pathfinding::PathRequest;
use game_core::WorldContext;
use glam::Vec2;

/// Distance in pixels at which a point of the move path counts as reached.
pub const DEFAULT_POINT_REACHED_DISTANCE: f32 = 10.0;

/// Distance in pixels at which a waypoint counts as reached.
pub const DEFAULT_WAYPOINT_REACHED_DISTANCE: f32 = 15.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub pos: Vec2,
    /// The object this waypoint follows. Its position is refreshed every tick.
    pub object: Option<UniqueId>,
}

/// Post-processing applied to every move path before it is walked.
pub trait OnNewMovePath {
    fn on_new_move_path(&mut self, path: &mut VecDeque<Vec2>);
}

impl<F> OnNewMovePath for F
where
    F: FnMut(&mut VecDeque<Vec2>),
{
    fn on_new_move_path(&mut self, path: &mut VecDeque<Vec2>) {
        self(path);
    }
}

#[derive(Clone, Debug)]
pub struct Navigator {
    waypoints: VecDeque<Waypoint>,
    move_path: VecDeque<Vec2>,
    move_target: Vec2,
    move_vector: Vec2,
    path_request: Option<PathRequest>,
    update_requested: bool,
    stuck: bool,
    /// The position of the actor as of the last update.
    pos: Vec2,
    /// The scene wrap as of the last update.
    wrap: SceneWrap,
    pub point_reached_distance: f32,
    pub waypoint_reached_distance: f32,
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            waypoints: VecDeque::new(),
            move_path: VecDeque::new(),
            move_target: Vec2::ZERO,
            move_vector: Vec2::ZERO,
            path_request: None,
            update_requested: false,
            stuck: false,
            pos: Vec2::ZERO,
            wrap: SceneWrap::NONE,
            point_reached_distance: DEFAULT_POINT_REACHED_DISTANCE,
            waypoint_reached_distance: DEFAULT_WAYPOINT_REACHED_DISTANCE,
        }
    }

    /// Sets the position of the actor without running an update.
    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
        if self.move_path.is_empty() {
            self.move_target = pos;
            self.move_vector = Vec2::ZERO;
        }
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    pub fn add_scene_waypoint(&mut self, pos: Vec2) {
        self.waypoints.push_back(Waypoint { pos, object: None });
        self.stuck = false;
    }

    /// Adds a waypoint following the object `id`.
    ///
    /// Returns `false` if the object does not exist.
    pub fn add_object_waypoint<C>(&mut self, id: UniqueId, ctx: &C) -> bool
    where
        C: WorldContext + ?Sized,
    {
        let Some(pos) = ctx.object_position(id) else {
            tracing::warn!("cannot add waypoint to missing object {}", id);
            return false;
        };

        self.waypoints.push_back(Waypoint { pos, object: Some(id) });
        self.stuck = false;
        true
    }

    /// Returns the last goal of the actor.
    ///
    /// Falls back to the end of the move path and then to the position of the actor.
    pub fn last_ai_waypoint(&self) -> Vec2 {
        self.waypoints
            .back()
            .map(|waypoint| waypoint.pos)
            .or_else(|| self.move_path.back().copied())
            .unwrap_or(self.pos)
    }

    pub fn move_path(&self) -> impl Iterator<Item = &Vec2> {
        self.move_path.iter()
    }

    pub fn move_path_size(&self) -> usize {
        self.move_path.len()
    }

    /// Returns the point the actor is currently walking to.
    pub fn move_target(&self) -> Vec2 {
        self.move_target
    }

    /// Returns the shortest vector from the actor to the move target.
    pub fn move_vector(&self) -> Vec2 {
        self.move_vector
    }

    /// Returns `true` if the last path request yielded no path.
    pub fn is_stuck(&self) -> bool {
        self.stuck
    }

    /// Returns `true` while a path request is pending or a new one was asked for.
    pub fn is_waiting_on_new_move_path(&self) -> bool {
        self.path_request.is_some() || self.update_requested
    }

    /// Asks for a new move path on the next update.
    pub fn request_move_path_update(&mut self) {
        self.update_requested = true;
    }

    /// Requests a move path from the position of the actor to the first waypoint.
    ///
    /// Does nothing and returns `false` while a request is pending or no waypoint exists.
    pub fn update_move_path<C>(&mut self, team: Team, ctx: &mut C) -> bool
    where
        C: WorldContext + ?Sized,
    {
        if self.path_request.is_some() {
            return false;
        }

        self.update_requested = false;

        let Some(waypoint) = self.waypoints.front() else {
            return false;
        };

        tracing::debug!("requesting move path from {} to {}", self.pos, waypoint.pos);
        self.path_request = Some(ctx.request_path(self.pos, waypoint.pos, team));
        true
    }

    /// Adopts the result of the pending path request if it completed.
    ///
    /// Returns `true` if a new move path was adopted.
    pub fn poll_move_path<H>(&mut self, hook: &mut H) -> bool
    where
        H: OnNewMovePath + ?Sized,
    {
        let Some(request) = &self.path_request else {
            return false;
        };

        if !request.is_complete() {
            return false;
        }

        let path = request.take_path().unwrap_or_default();
        self.path_request = None;

        if path.is_empty() {
            tracing::debug!("no move path to {}", self.last_ai_waypoint());
            self.move_path.clear();
            self.stuck = true;
            self.refresh_move_target();
            return false;
        }

        let mut path = VecDeque::from(path);
        hook.on_new_move_path(&mut path);

        tracing::debug!("adopted move path with {} points", path.len());
        self.move_path = path;
        self.stuck = false;
        self.refresh_move_target();
        true
    }

    pub fn remove_move_path_beginning(&mut self) -> Option<Vec2> {
        let point = self.move_path.pop_front();
        self.refresh_move_target();
        point
    }

    pub fn remove_move_path_end(&mut self) -> Option<Vec2> {
        let point = self.move_path.pop_back();
        self.refresh_move_target();
        point
    }

    /// Drops all waypoints, the move path and any pending request.
    pub fn clear_ai_waypoints(&mut self) {
        self.waypoints.clear();
        self.path_request = None;
        self.update_requested = false;
        self.stuck = false;
        self.clear_move_path();
    }

    pub fn clear_move_path(&mut self) {
        self.move_path.clear();
        self.refresh_move_target();
    }

    /// Runs one tick of navigation for an actor at `pos`.
    ///
    /// Object waypoints follow their objects, reached path points and waypoints are consumed,
    /// and a new move path is requested once the current one is used up.
    pub fn update<C, H>(&mut self, pos: Vec2, team: Team, ctx: &mut C, hook: &mut H)
    where
        C: WorldContext + ?Sized,
        H: OnNewMovePath + ?Sized,
    {
        self.pos = pos;
        self.wrap = ctx.scene_wrap();
        let wrap = self.wrap;

        self.refresh_object_waypoints(&*ctx);
        self.poll_move_path(hook);

        while let Some(point) = self.move_path.front() {
            if wrap.shortest_distance(pos, *point).length() > self.point_reached_distance {
                break;
            }

            self.move_path.pop_front();
        }

        if self.move_path.is_empty() && !self.is_waiting_on_new_move_path() {
            while let Some(waypoint) = self.waypoints.front() {
                if wrap.shortest_distance(pos, waypoint.pos).length() > self.waypoint_reached_distance {
                    break;
                }

                tracing::debug!("reached waypoint {}", waypoint.pos);
                self.waypoints.pop_front();
                self.stuck = false;
            }

            if !self.waypoints.is_empty() && !self.stuck {
                self.update_requested = true;
            }
        }

        if self.update_requested {
            self.update_move_path(team, ctx);
        }

        self.refresh_move_target();
    }

    fn refresh_object_waypoints<C>(&mut self, ctx: &C)
    where
        C: WorldContext + ?Sized,
    {
        let front_object = self.waypoints.front().and_then(|waypoint| waypoint.object);

        self.waypoints.retain_mut(|waypoint| {
            let Some(id) = waypoint.object else {
                return true;
            };

            match ctx.object_position(id) {
                Some(pos) => {
                    waypoint.pos = pos;
                    true
                }
                None => {
                    tracing::debug!("waypoint object {} is gone", id);
                    false
                }
            }
        });

        let Some(id) = front_object else {
            return;
        };

        // The current route leads to an object that no longer exists.
        if self.waypoints.front().and_then(|waypoint| waypoint.object) != Some(id) {
            self.move_path.clear();
            self.path_request = None;
            self.stuck = false;
        }
    }

    fn refresh_move_target(&mut self) {
        self.move_target = self.move_path.front().copied().unwrap_or(self.pos);
        self.move_vector = self.wrap.shortest_distance(self.pos, self.move_target);
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}
