//! Walking strategies keyed by the kind of unit.
//!
//! A gait moves the legs of an actor along their [`LimbPath`]s and pushes the body while the
//! feet are on the ground. Legs are walked in pairs: the background leg starts half a cycle
//! after the foreground leg and both paths restart whenever they end.

mod crab;
mod human;

use std::collections::VecDeque;

use game_common::math::Vec2Ext;
use game_common::units::PIXELS_PER_METER;
use game_common::UniqueId;
use game_core::sound::SoundRef;
use game_core::{Attachable, WorldContext};
use game_data::{Error, Property, Writer};
use game_physics::{LimbPath, QueryFilter, Speed};
use glam::Vec2;

pub use crab::CrabGait;
pub use human::HumanGait;

use crate::navigator::OnNewMovePath;
use crate::states::{LocomotionStates, MovementState};

/// Number of pixels a foot is lifted at most to get out of the terrain.
const MAX_FOOT_LIFT: u32 = 8;

/// What a gait is told every tick.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GaitInput {
    pub states: LocomotionStates,
    pub speed: Speed,
    /// Aim angle in radians relative to the facing direction.
    pub aim_angle: f32,
}

/// The kind of stride a leg is walking.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stride {
    Walk,
    Crawl,
}

impl Stride {
    fn from_movement(movement: MovementState) -> Option<Self> {
        match movement {
            MovementState::Walk | MovementState::Climb => Some(Self::Walk),
            MovementState::Crawl | MovementState::ArmCrawl => Some(Self::Crawl),
            _ => None,
        }
    }
}

/// A leg and the paths it walks along.
#[derive(Clone, Debug, Default)]
pub struct LegDrive {
    pub leg: Option<UniqueId>,
    pub walk_path: LimbPath,
    /// Used instead of the walk path while crawling, if set.
    pub crawl_path: Option<LimbPath>,
    /// The ankle target while standing. The leg idles if unset.
    pub stand_path: Option<LimbPath>,
    /// Mirrors the paths against the facing of the body.
    pub mirrored: bool,
    /// Scene position of the foot driven along the current path.
    limb_pos: Option<Vec2>,
}

impl LegDrive {
    pub fn new(walk_path: LimbPath) -> Self {
        Self {
            walk_path,
            ..Default::default()
        }
    }

    pub fn limb_pos(&self) -> Option<Vec2> {
        self.limb_pos
    }

    fn path_mut(&mut self, stride: Stride) -> &mut LimbPath {
        match (stride, &mut self.crawl_path) {
            (Stride::Crawl, Some(path)) => path,
            _ => &mut self.walk_path,
        }
    }

    pub fn path(&self, stride: Stride) -> &LimbPath {
        match (stride, &self.crawl_path) {
            (Stride::Crawl, Some(path)) => path,
            _ => &self.walk_path,
        }
    }

    /// Returns the joint and the current ankle position of the leg.
    fn ankle(&self, body: &Attachable) -> Option<(Vec2, Vec2)> {
        let leg = body.attachable(self.leg?)?;
        let joint = leg.joint_pos()?;
        let ankle = leg.as_leg()?.ankle_offset();
        Some((joint, joint + body.rotation().rotate(ankle.flip_x(body.is_h_flipped()))))
    }

    fn set_target(&self, body: &mut Attachable, target: Option<Vec2>) {
        let Some(id) = self.leg else {
            return;
        };

        body.with_attachable_mut(id, |leg| {
            if let Some(leg) = leg.as_leg_mut() {
                leg.set_target_position(target);
            }
        });
    }

    /// Starts the path of `stride` from its beginning.
    pub fn start(&mut self, stride: Stride) {
        self.path_mut(stride).restart();
        self.limb_pos = None;
    }

    /// Moves the foot along the path of `stride` for one tick.
    ///
    /// Returns `true` if the path ended and was restarted.
    pub fn walk<C>(&mut self, body: &mut Attachable, stride: Stride, speed: Speed, ctx: &mut C) -> bool
    where
        C: WorldContext + ?Sized,
    {
        let Some((joint, ankle)) = self.ankle(body) else {
            return false;
        };

        let flipped = body.is_h_flipped() != self.mirrored;
        let filter = QueryFilter::new().ignore(body.id()).ignore_team(body.team);
        let terrain_blocks = |pos: Vec2, ctx: &C| ctx.terrain().is_obstructed(pos, &filter);

        let mut limb = self.limb_pos.unwrap_or(ankle);
        let start = limb;
        let dt = ctx.frame_time();

        let path = self.path_mut(stride);
        path.set_speed(speed);
        path.set_joint_pos(joint);
        path.set_joint_vel(body.vel);
        path.set_rotation(body.rotation());
        path.set_h_flip(flipped);
        path.set_frame_time(dt);

        for _ in 0..=path.seg_count() {
            let chunk = path.next_time_chunk(limb);
            if chunk <= 0.0 {
                break;
            }

            limb += path.current_vel(limb) * chunk * PIXELS_PER_METER;
            path.report_progress(limb);

            if path.path_ended() {
                break;
            }
        }

        for _ in 0..MAX_FOOT_LIFT {
            if !terrain_blocks(limb, &*ctx) {
                break;
            }

            limb.y -= 1.0;
        }

        // The foot pushes the body while it is on the ground.
        let stroke = limb - start - body.vel * dt.as_secs_f32() * PIXELS_PER_METER;
        let grounded = terrain_blocks(limb + Vec2::Y, &*ctx);
        if grounded && stroke.x != 0.0 {
            let push = Vec2::new(-stroke.x, 0.0).with_magnitude(path.push_force());
            body.add_force(push, Vec2::ZERO);
        }

        let mut restarted = false;
        if path.path_ended() {
            path.restart_free(&mut limb, &filter, ctx.terrain());
            restarted = true;
        }

        self.limb_pos = Some(limb);
        self.set_target(body, Some(limb));
        restarted
    }

    /// Holds the leg at its stand path, or lets it idle.
    pub fn stand(&mut self, body: &mut Attachable) {
        self.limb_pos = None;

        let joint = self.ankle(body).map(|(joint, _)| joint);
        let target = match (&mut self.stand_path, joint) {
            (Some(path), Some(joint)) => {
                path.set_joint_pos(joint);
                path.set_rotation(body.rotation());
                path.set_h_flip(body.is_h_flipped() != self.mirrored);
                Some(path.current_seg_target())
            }
            _ => None,
        };

        self.set_target(body, target);
    }

    /// Lets the leg idle.
    pub fn idle(&mut self, body: &mut Attachable) {
        self.limb_pos = None;
        self.set_target(body, None);
    }

    fn read_property(&mut self, prop: &Property, name: &str, body: &mut Attachable) -> Result<bool, Error> {
        let Some(suffix) = prop.name.strip_prefix(name) else {
            return Ok(false);
        };

        match suffix {
            "" | "Index" => self.leg = Some(read_limb(prop, body)?),
            "WalkPath" => self.walk_path = game_data::read_object(prop)?,
            "CrawlPath" => self.crawl_path = Some(game_data::read_object(prop)?),
            "StandPath" => self.stand_path = Some(game_data::read_object(prop)?),
            _ => return Ok(false),
        }

        Ok(true)
    }

    fn save(&self, writer: &mut Writer, name: &str, body: &Attachable) {
        save_limb(writer, name, self.leg, body);

        game_data::write_object(writer, &format!("{}WalkPath", name), &self.walk_path);
        if let Some(path) = &self.crawl_path {
            game_data::write_object(writer, &format!("{}CrawlPath", name), path);
        }
        if let Some(path) = &self.stand_path {
            game_data::write_object(writer, &format!("{}StandPath", name), path);
        }
    }
}

/// A foreground and a background leg walking half a cycle apart.
#[derive(Clone, Debug, Default)]
pub struct LegPair {
    pub fg: LegDrive,
    pub bg: LegDrive,
    stride: Option<Stride>,
    bg_started: bool,
}

impl LegPair {
    pub fn new(fg: LegDrive, bg: LegDrive) -> Self {
        Self {
            fg,
            bg,
            stride: None,
            bg_started: false,
        }
    }

    /// Returns the stride the pair is currently walking.
    pub fn stride(&self) -> Option<Stride> {
        self.stride
    }

    /// Returns `true` once the background leg joined the current stride.
    pub fn bg_started(&self) -> bool {
        self.bg_started
    }

    /// Walks both legs for one tick. Returns the number of paths that ended.
    pub fn walk<C>(&mut self, body: &mut Attachable, stride: Stride, speed: Speed, ctx: &mut C) -> u32
    where
        C: WorldContext + ?Sized,
    {
        if self.stride != Some(stride) {
            self.stride = Some(stride);
            self.fg.start(stride);
            self.bg_started = false;
        }

        let mut ended = u32::from(self.fg.walk(body, stride, speed, ctx));

        if !self.bg_started {
            if ended > 0 || self.fg.path(stride).regular_progress() >= 0.5 {
                self.bg.start(stride);
                self.bg_started = true;
            } else {
                self.bg.idle(body);
                return ended;
            }
        }

        ended += u32::from(self.bg.walk(body, stride, speed, ctx));
        ended
    }

    pub fn stand(&mut self, body: &mut Attachable) {
        self.stride = None;
        self.fg.stand(body);
        self.bg.stand(body);
    }

    pub fn idle(&mut self, body: &mut Attachable) {
        self.stride = None;
        self.fg.idle(body);
        self.bg.idle(body);
    }

    /// Drives the pair according to the movement state. Returns the number of paths that ended.
    fn update<C>(&mut self, body: &mut Attachable, input: &GaitInput, ctx: &mut C) -> u32
    where
        C: WorldContext + ?Sized,
    {
        match Stride::from_movement(input.states.movement) {
            Some(stride) => self.walk(body, stride, input.speed, ctx),
            None => {
                match input.states.movement {
                    MovementState::Stand | MovementState::Crouch => self.stand(body),
                    _ => self.idle(body),
                }
                0
            }
        }
    }

    fn read_property(&mut self, prop: &Property, prefix: &str, body: &mut Attachable) -> Result<bool, Error> {
        if self.fg.read_property(prop, &format!("{}FGLeg", prefix), body)? {
            return Ok(true);
        }

        self.bg.read_property(prop, &format!("{}BGLeg", prefix), body)
    }

    fn save(&self, writer: &mut Writer, prefix: &str, body: &Attachable) {
        self.fg.save(writer, &format!("{}FGLeg", prefix), body);
        self.bg.save(writer, &format!("{}BGLeg", prefix), body);
    }
}

/// The gait of an actor.
#[derive(Clone, Debug)]
pub enum Gait {
    Human(HumanGait),
    Crab(CrabGait),
}

impl Gait {
    /// Returns the class name of actors walking with this gait.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Human(_) => HumanGait::CLASS,
            Self::Crab(_) => CrabGait::CLASS,
        }
    }

    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            HumanGait::CLASS => Some(Self::Human(HumanGait::default())),
            CrabGait::CLASS => Some(Self::Crab(CrabGait::default())),
            _ => None,
        }
    }

    /// Runs one tick of the gait. Returns `true` if a stride ended.
    pub fn update<C>(&mut self, body: &mut Attachable, input: &GaitInput, ctx: &mut C) -> bool
    where
        C: WorldContext + ?Sized,
    {
        let (strides, sound) = match self {
            Self::Human(gait) => (gait.update(body, input, ctx), &gait.stride_sound),
            Self::Crab(gait) => (gait.update(body, input, ctx), &gait.stride_sound),
        };

        if strides == 0 {
            return false;
        }

        if let Some(sound) = sound {
            ctx.play_sound(sound, body.pos);
        }

        true
    }

    pub(crate) fn read_property(&mut self, prop: &Property, body: &mut Attachable) -> Result<bool, Error> {
        match self {
            Self::Human(gait) => gait.read_property(prop, body),
            Self::Crab(gait) => gait.read_property(prop, body),
        }
    }

    pub(crate) fn save(&self, writer: &mut Writer, body: &Attachable) {
        match self {
            Self::Human(gait) => gait.save(writer, body),
            Self::Crab(gait) => gait.save(writer, body),
        }
    }
}

impl OnNewMovePath for Gait {
    fn on_new_move_path(&mut self, path: &mut VecDeque<Vec2>) {
        match self {
            Self::Human(gait) => gait.on_new_move_path(path),
            Self::Crab(gait) => gait.on_new_move_path(path),
        }
    }
}

/// Removes every point lying on the straight line between its neighbors.
pub fn remove_collinear_points(path: &mut VecDeque<Vec2>) {
    if path.len() < 3 {
        return;
    }

    let mut kept: VecDeque<Vec2> = VecDeque::with_capacity(path.len());
    for (index, point) in path.iter().enumerate() {
        let (Some(prev), Some(next)) = (kept.back(), path.get(index + 1)) else {
            kept.push_back(*point);
            continue;
        };

        let cross = (*point - *prev).perp_dot(*next - *point);
        if cross.abs() > 1e-3 || (*point - *prev).dot(*next - *point) < 0.0 {
            kept.push_back(*point);
        }
    }

    *path = kept;
}

/// Reads a limb slot and returns the id of the limb.
///
/// `...Index` properties refer to an attachable the body already has, all others describe a
/// new limb which is attached to the body.
fn read_limb(prop: &Property, body: &mut Attachable) -> Result<UniqueId, Error> {
    if prop.name.ends_with("Index") {
        let index: usize = prop.parse()?;
        return body
            .attachables()
            .get(index)
            .map(|limb| limb.id())
            .ok_or_else(|| prop.invalid());
    }

    let limb = Attachable::from_property(prop)?;
    let id = limb.id();
    body.add_attachable(limb);
    Ok(id)
}

/// Writes the index of the attachable `id` of `body` as `{name}Index`.
fn save_limb(writer: &mut Writer, name: &str, id: Option<UniqueId>, body: &Attachable) {
    let index = id.and_then(|id| body.attachables().iter().position(|limb| limb.id() == id));
    if let Some(index) = index {
        writer.property(&format!("{}Index", name), index);
    }
}

fn read_sound(prop: &Property) -> Result<Option<SoundRef>, Error> {
    SoundRef::read(prop).map(Some)
}
