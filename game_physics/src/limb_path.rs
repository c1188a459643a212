//! Procedural limb motion along a sequence of waypoints.
//!
//! A [`LimbPath`] is a start offset followed by relative segments, all in the local space of
//! the limb's joint. Every tick the owner supplies the joint kinematics, asks for the next
//! target or velocity and reports back where the limb ended up.

use std::time::Duration;

use game_common::math::{Rotation, Vec2Ext};
use game_common::time::Timer;
use game_common::units::METERS_PER_PIXEL;
use game_data::{Error, Property, Serializable, Writer};
use glam::Vec2;

use crate::terrain::{QueryFilter, TerrainQuery};

/// Distance in pixels below which the current segment counts as reached.
pub const SEGMENT_END_THRESHOLD: f32 = 1.5;

/// Distance in pixels below which a static point counts as reached.
pub const STATIC_POINT_THRESHOLD: f32 = 1.0;

/// Time without reaching a segment after which the push force is doubled.
const PUSH_FORCE_ESCALATION_MS: f32 = 500.0;

/// Time in seconds in which a static point should be reached.
const STATIC_CORRECTION_SECS: f32 = 0.02;

/// The travel speed presets of a [`LimbPath`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Speed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl Speed {
    pub const ALL: [Self; 3] = [Self::Slow, Self::Normal, Self::Fast];

    #[inline]
    const fn index(self) -> usize {
        match self {
            Self::Slow => 0,
            Self::Normal => 1,
            Self::Fast => 2,
        }
    }

    const fn property_name(self) -> &'static str {
        match self {
            Self::Slow => "SlowTravelSpeed",
            Self::Normal => "NormalTravelSpeed",
            Self::Fast => "FastTravelSpeed",
        }
    }
}

#[derive(Clone, Debug)]
pub struct LimbPath {
    preset_name: String,
    start: Vec2,
    /// Number of segments that bring the limb from its rest position onto the cycle.
    start_seg_count: usize,
    segments: Vec<Vec2>,
    /// Foot collisions are disabled on this many segments at the end of the path.
    end_seg_count: Option<usize>,
    travel_speeds: [f32; 3],
    speed: Speed,
    speed_multiplier: f32,
    push_force: f32,
    default_push_force: f32,
    total_length: f32,
    regular_length: f32,

    current_segment: usize,
    seg_progress: f32,
    ended: bool,
    path_timer: Timer,
    seg_timer: Timer,
    /// Remaining time of this tick in seconds.
    time_left: f32,

    joint_pos: Vec2,
    joint_vel: Vec2,
    rotation: Rotation,
    flipped: bool,
    rotation_offset: Vec2,
    position_offset: Vec2,
}

impl LimbPath {
    pub fn new(start: Vec2, segments: Vec<Vec2>) -> Self {
        let mut path = Self {
            preset_name: String::new(),
            start,
            start_seg_count: 0,
            segments,
            end_seg_count: None,
            travel_speeds: [2.0, 4.0, 6.0],
            speed: Speed::Normal,
            speed_multiplier: 1.0,
            push_force: 200.0,
            default_push_force: 200.0,
            total_length: 0.0,
            regular_length: 0.0,
            current_segment: 0,
            seg_progress: 0.0,
            ended: false,
            path_timer: Timer::new(),
            seg_timer: Timer::new(),
            time_left: 0.0,
            joint_pos: Vec2::ZERO,
            joint_vel: Vec2::ZERO,
            rotation: Rotation::IDENTITY,
            flipped: false,
            rotation_offset: Vec2::ZERO,
            position_offset: Vec2::ZERO,
        };
        path.update_lengths();
        path
    }

    /// Creates a path with a single point and no segments.
    pub fn static_point(start: Vec2) -> Self {
        Self::new(start, Vec::new())
    }

    pub fn preset_name(&self) -> &str {
        &self.preset_name
    }

    pub fn set_preset_name(&mut self, name: impl Into<String>) {
        self.preset_name = name.into();
    }

    pub fn start_offset(&self) -> Vec2 {
        self.start
    }

    pub fn set_start_offset(&mut self, start: Vec2) {
        self.start = start;
    }

    pub fn segments(&self) -> &[Vec2] {
        &self.segments
    }

    pub fn add_segment(&mut self, segment: Vec2) {
        self.segments.push(segment);
        self.update_lengths();
    }

    pub fn seg_count(&self) -> usize {
        self.segments.len()
    }

    pub fn start_seg_count(&self) -> usize {
        self.start_seg_count
    }

    pub fn set_start_seg_count(&mut self, count: usize) {
        self.start_seg_count = count;
        self.update_lengths();
    }

    pub fn set_end_seg_count(&mut self, count: Option<usize>) {
        self.end_seg_count = count;
    }

    /// Returns `true` if this path has no segments and always targets its start offset.
    #[inline]
    pub fn is_static_point(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    fn update_lengths(&mut self) {
        self.total_length = self.segments.iter().map(|s| s.length()).sum();
        let start_length: f32 = self
            .segments
            .iter()
            .take(self.start_seg_count)
            .map(|s| s.length())
            .sum();
        self.regular_length = self.total_length - start_length;
    }

    pub fn set_joint_pos(&mut self, pos: Vec2) {
        self.joint_pos = pos;
    }

    pub fn set_joint_vel(&mut self, vel: Vec2) {
        self.joint_vel = vel;
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn set_h_flip(&mut self, flipped: bool) {
        self.flipped = flipped;
    }

    pub fn is_h_flipped(&self) -> bool {
        self.flipped
    }

    /// Sets the local point around which the path is rotated.
    pub fn set_rotation_offset(&mut self, offset: Vec2) {
        self.rotation_offset = offset;
    }

    /// Sets an offset added to every point after rotation.
    pub fn set_position_offset(&mut self, offset: Vec2) {
        self.position_offset = offset;
    }

    /// Starts a new tick lasting `delta` seconds.
    pub fn set_frame_time(&mut self, delta: Duration) {
        self.time_left = delta.as_secs_f32();
        self.path_timer.tick(delta);
        self.seg_timer.tick(delta);
    }

    /// Returns the unused time of this tick in seconds.
    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    pub fn path_time(&self) -> Duration {
        self.path_timer.elapsed()
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }

    pub fn travel_speed(&self, speed: Speed) -> f32 {
        self.travel_speeds[speed.index()]
    }

    /// Overrides the travel speed of a preset, in m/s.
    pub fn override_speed(&mut self, speed: Speed, value: f32) {
        self.travel_speeds[speed.index()] = value;
    }

    pub fn set_travel_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier;
    }

    pub fn travel_speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Returns the push force, increased linearly up to twice its value while the current
    /// segment is not reached.
    pub fn push_force(&self) -> f32 {
        let escalation = (self.seg_timer.elapsed_ms() / PUSH_FORCE_ESCALATION_MS).min(1.0);
        self.push_force * (1.0 + escalation)
    }

    pub fn default_push_force(&self) -> f32 {
        self.default_push_force
    }

    pub fn override_push_force(&mut self, force: f32) {
        self.push_force = force;
    }

    /// Transforms a point from the local space of the path into an offset from the joint.
    fn rotate_point(&self, point: Vec2) -> Vec2 {
        let pivot = self.rotation_offset.flip_x(self.flipped);
        self.rotation.rotate(point.flip_x(self.flipped) - pivot) + pivot + self.position_offset
    }

    /// Returns the local offset of the beginning of segment `index`.
    fn segment_start(&self, index: usize) -> Vec2 {
        self.start + self.segments.iter().take(index).sum::<Vec2>()
    }

    /// Returns the scene position of the current target.
    pub fn current_seg_target(&self) -> Vec2 {
        let offset = if self.is_static_point() {
            self.start
        } else {
            self.segment_start(self.current_segment + 1)
        };

        self.joint_pos + self.rotate_point(offset)
    }

    /// Returns the scene position the limb should currently be at.
    pub fn progress_pos(&self) -> Vec2 {
        if self.is_static_point() {
            return self.joint_pos + self.rotate_point(self.start);
        }

        let offset =
            self.segment_start(self.current_segment) + self.segments[self.current_segment] * self.seg_progress;
        self.joint_pos + self.rotate_point(offset)
    }

    fn effective_speed(&self) -> f32 {
        self.travel_speeds[self.speed.index()] / (1.0 + self.joint_vel.y.abs() * 0.1) * self.speed_multiplier
    }

    /// Returns the velocity in m/s that moves a limb at `limb_pos` toward the current target.
    pub fn current_vel(&self, limb_pos: Vec2) -> Vec2 {
        let distance = self.current_seg_target() - limb_pos;

        if self.is_static_point() {
            let max_speed = self.travel_speeds[self.speed.index()] * self.speed_multiplier;
            let correction = distance * METERS_PER_PIXEL / STATIC_CORRECTION_SECS;
            return correction.clamp_length_max(max_speed) + self.joint_vel;
        }

        distance.with_magnitude(self.effective_speed()) + self.joint_vel
    }

    /// Returns how many seconds of the remaining time of this tick should be spent
    /// moving toward the current target and deducts them from it.
    pub fn next_time_chunk(&mut self, limb_pos: Vec2) -> f32 {
        if self.time_left <= 0.0 {
            return 0.0;
        }

        let speed = self.effective_speed();
        if self.is_static_point() || speed <= 0.0 {
            return std::mem::take(&mut self.time_left);
        }

        let distance = (self.current_seg_target() - limb_pos).length() * METERS_PER_PIXEL;
        let segment_time = distance / speed;

        if segment_time >= self.time_left {
            std::mem::take(&mut self.time_left)
        } else {
            self.time_left -= segment_time;
            segment_time
        }
    }

    /// Updates the progress along the current segment from the position of the limb. Segments
    /// that are reached or overshot advance to the next one; finishing the last one ends the
    /// path.
    pub fn report_progress(&mut self, limb_pos: Vec2) {
        let target = self.current_seg_target();
        let distance = (target - limb_pos).length();

        if self.is_static_point() {
            self.ended = distance < STATIC_POINT_THRESHOLD;
            return;
        }

        let start = self.joint_pos + self.rotate_point(self.segment_start(self.current_segment));
        let segment = target - start;
        let progress = if segment.length_squared() > 0.0 {
            (limb_pos - start).dot(segment) / segment.length_squared()
        } else {
            1.0
        };

        if progress >= 1.0 || distance < SEGMENT_END_THRESHOLD {
            if self.current_segment + 1 < self.segments.len() {
                self.current_segment += 1;
                self.seg_progress = 0.0;
                self.seg_timer.reset();
                self.ended = false;
            } else {
                self.seg_progress = 1.0;
                self.ended = true;
            }
        } else {
            self.seg_progress = progress.max(0.0);
            self.ended = false;
        }
    }

    /// Returns the progress over the whole path in `[0, 1]`. Ended paths report `0`.
    pub fn total_progress(&self) -> f32 {
        if self.ended || self.is_static_point() || self.total_length <= 0.0 {
            return 0.0;
        }

        (self.completed_length() / self.total_length).clamp(0.0, 1.0)
    }

    /// Returns the progress over the segments after the start segments in `[0, 1]`.
    pub fn regular_progress(&self) -> f32 {
        if self.ended || self.is_static_point() || self.regular_length <= 0.0 {
            return 0.0;
        }

        let progress = self.completed_length() - (self.total_length - self.regular_length);
        (progress / self.regular_length).clamp(0.0, 1.0)
    }

    fn completed_length(&self) -> f32 {
        let done: f32 = self
            .segments
            .iter()
            .take(self.current_segment)
            .map(|s| s.length())
            .sum();
        done + self.segments[self.current_segment].length() * self.seg_progress
    }

    pub fn current_segment_number(&self) -> usize {
        self.current_segment
    }

    pub fn segment_progress(&self) -> f32 {
        self.seg_progress
    }

    pub fn path_ended(&self) -> bool {
        self.ended
    }

    /// Moves back to the first segment.
    pub fn restart(&mut self) {
        self.current_segment = 0;
        self.seg_progress = 0.0;
        self.ended = false;
        self.path_timer.reset();
        self.seg_timer.reset();
    }

    /// Restarts the path on the last start segment whose beginning is not obstructed.
    ///
    /// The start segments are tried from the last to the first one. On success `limb_pos` is
    /// moved to the beginning of the chosen segment. If every candidate is obstructed the path
    /// restarts on the first segment and `false` is returned.
    pub fn restart_free(
        &mut self,
        limb_pos: &mut Vec2,
        filter: &QueryFilter,
        terrain: &dyn TerrainQuery,
    ) -> bool {
        self.path_timer.reset();
        self.seg_timer.reset();
        self.seg_progress = 0.0;
        self.ended = false;

        if self.is_static_point() {
            let pos = self.current_seg_target();
            if terrain.is_obstructed(pos, filter) {
                return false;
            }

            *limb_pos = pos;
            return true;
        }

        let candidates = self.start_seg_count.clamp(1, self.segments.len());
        for index in (0..candidates).rev() {
            self.current_segment = index;
            let pos = self.progress_pos();

            if !terrain.is_obstructed(pos, filter) {
                *limb_pos = pos;
                return true;
            }
        }

        self.current_segment = 0;
        *limb_pos = self.progress_pos();
        false
    }

    /// Ends the path immediately.
    pub fn terminate(&mut self) {
        if !self.is_static_point() {
            self.current_segment = self.segments.len() - 1;
            self.seg_progress = 1.0;
        }

        self.ended = true;
    }

    /// Returns `true` if the limb is on one of the last segments on which its foot should not
    /// collide.
    pub fn foot_collisions_should_be_disabled(&self) -> bool {
        match self.end_seg_count {
            Some(count) => self.segments.len() - self.current_segment <= count,
            None => false,
        }
    }

    /// Returns the largest local Y coordinate of any point of the path.
    pub fn lowest_y(&self) -> f32 {
        self.local_points().fold(self.start.y, |lowest, point| lowest.max(point.y))
    }

    /// Returns the local X coordinate in the middle of the path, mirrored when flipped.
    pub fn middle_x(&self) -> f32 {
        let (low, high) = self
            .local_points()
            .fold((self.start.x, self.start.x), |(low, high), point| {
                (low.min(point.x), high.max(point.x))
            });

        let middle = (low + high) / 2.0;
        if self.flipped {
            -middle
        } else {
            middle
        }
    }

    fn local_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.segments.iter().scan(self.start, |point, segment| {
            *point += *segment;
            Some(*point)
        })
    }
}

impl Default for LimbPath {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec::new())
    }
}

impl Serializable for LimbPath {
    const CLASS: &'static str = "LimbPath";

    fn read_property(&mut self, prop: &Property) -> Result<bool, Error> {
        match prop.name.as_str() {
            "PresetName" => self.preset_name = prop.value.clone(),
            "StartOffset" => self.start = prop.as_vec2()?,
            "StartSegCount" => self.set_start_seg_count(prop.parse()?),
            "AddSegment" => self.add_segment(prop.as_vec2()?),
            "EndSegCount" => self.end_seg_count = Some(prop.parse()?),
            "PushForce" => {
                self.default_push_force = prop.parse()?;
                self.push_force = self.default_push_force;
            }
            name => {
                let Some(speed) = Speed::ALL.into_iter().find(|s| s.property_name() == name) else {
                    return Ok(false);
                };

                self.travel_speeds[speed.index()] = prop.parse()?;
            }
        }

        Ok(true)
    }

    fn save(&self, writer: &mut Writer) {
        writer.property("PresetName", &self.preset_name);
        writer.vec2("StartOffset", self.start);
        writer.property("StartSegCount", self.start_seg_count);
        for segment in &self.segments {
            writer.vec2("AddSegment", *segment);
        }

        for speed in Speed::ALL {
            writer.property(speed.property_name(), self.travel_speeds[speed.index()]);
        }

        writer.property("PushForce", self.default_push_force);
        if let Some(count) = self.end_seg_count {
            writer.property("EndSegCount", count);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use game_common::assert_approx_eq;
    use game_common::math::Rotation;
    use glam::Vec2;

    use super::{LimbPath, Speed};
    use crate::terrain::{FlatGround, OpenTerrain, QueryFilter};

    fn walk_path() -> LimbPath {
        LimbPath::new(
            Vec2::ZERO,
            vec![Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0), Vec2::new(-10.0, 0.0)],
        )
    }

    #[test]
    fn seg_target_accumulates_segments() {
        let mut path = walk_path();
        path.set_joint_pos(Vec2::new(100.0, 50.0));

        assert_eq!(path.current_seg_target(), Vec2::new(110.0, 50.0));
        path.report_progress(Vec2::new(110.0, 50.0));
        assert_eq!(path.current_segment_number(), 1);
        assert_eq!(path.current_seg_target(), Vec2::new(110.0, 60.0));
    }

    #[test]
    fn seg_target_flipped_and_rotated() {
        let mut path = walk_path();
        path.set_h_flip(true);
        assert_eq!(path.current_seg_target(), Vec2::new(-10.0, 0.0));

        path.set_h_flip(false);
        path.set_rotation(Rotation::new(std::f32::consts::FRAC_PI_2));
        let target = path.current_seg_target();
        assert_approx_eq!(target.x, 0.0, epsilon = 1e-5);
        assert_approx_eq!(target.y, 10.0, epsilon = 1e-5);
    }

    #[test]
    fn walk_reaches_end_with_monotonic_progress() {
        let mut path = walk_path();
        path.set_joint_pos(Vec2::new(20.0, 20.0));

        let mut limb = path.progress_pos();
        let mut visited = Vec::new();
        let mut last_progress = 0.0;

        for _ in 0..1000 {
            let to_target = path.current_seg_target() - limb;
            limb += to_target.clamp_length_max(1.0);
            path.report_progress(limb);

            if path.path_ended() {
                break;
            }

            if visited.last() != Some(&path.current_segment_number()) {
                visited.push(path.current_segment_number());
            }

            let progress = path.total_progress();
            assert!(progress >= last_progress, "{} < {}", progress, last_progress);
            last_progress = progress;
        }

        assert!(path.path_ended());
        assert_eq!(visited, vec![0, 1, 2]);
        assert_eq!(path.total_progress(), 0.0);
    }

    #[test]
    fn overshot_segment_advances() {
        let mut path = LimbPath::new(Vec2::ZERO, vec![Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)]);

        path.report_progress(Vec2::new(5.0, 0.0));
        assert_eq!(path.current_segment_number(), 0);
        assert_approx_eq!(path.segment_progress(), 0.5);

        path.report_progress(Vec2::new(13.0, 0.0));
        assert_eq!(path.current_segment_number(), 1);
        assert_eq!(path.segment_progress(), 0.0);
        assert!(!path.path_ended());

        // Past the end of the last segment.
        path.report_progress(Vec2::new(10.0, 14.0));
        assert!(path.path_ended());
    }

    #[test]
    fn sideways_offset_does_not_count_as_progress() {
        let mut path = LimbPath::new(Vec2::ZERO, vec![Vec2::new(10.0, 0.0)]);

        path.report_progress(Vec2::new(4.0, 6.0));
        assert_approx_eq!(path.segment_progress(), 0.4);
        assert!(!path.path_ended());
    }

    #[test]
    fn static_point() {
        let mut path = LimbPath::static_point(Vec2::new(3.0, 4.0));
        path.set_joint_pos(Vec2::new(10.0, 10.0));

        assert!(path.is_static_point());
        assert_eq!(path.current_seg_target(), Vec2::new(13.0, 14.0));

        path.report_progress(Vec2::new(20.0, 14.0));
        assert!(!path.path_ended());
        path.report_progress(Vec2::new(13.5, 14.0));
        assert!(path.path_ended());
        assert_eq!(path.total_progress(), 0.0);
    }

    #[test]
    fn next_time_chunk() {
        // 20 pixels at 4 m/s take 0.25 seconds.
        let mut path = LimbPath::new(Vec2::ZERO, vec![Vec2::new(20.0, 0.0)]);
        path.set_speed(Speed::Normal);

        path.set_frame_time(Duration::from_millis(100));
        assert_approx_eq!(path.next_time_chunk(Vec2::ZERO), 0.1, epsilon = 1e-6);
        assert_eq!(path.time_left(), 0.0);
        assert_eq!(path.next_time_chunk(Vec2::ZERO), 0.0);

        path.set_frame_time(Duration::from_secs(1));
        assert_approx_eq!(path.next_time_chunk(Vec2::ZERO), 0.25, epsilon = 1e-6);
        assert_approx_eq!(path.time_left(), 0.75, epsilon = 1e-6);
    }

    #[test]
    fn current_vel_points_at_target() {
        let mut path = LimbPath::new(Vec2::ZERO, vec![Vec2::new(20.0, 0.0)]);
        path.override_speed(Speed::Fast, 8.0);
        path.set_speed(Speed::Fast);
        path.set_joint_vel(Vec2::new(1.0, 0.0));

        let vel = path.current_vel(Vec2::ZERO);
        assert_approx_eq!(vel.x, 9.0, epsilon = 1e-5);
        assert_approx_eq!(vel.y, 0.0);

        path.set_travel_speed_multiplier(0.5);
        assert_approx_eq!(path.current_vel(Vec2::ZERO).x, 5.0, epsilon = 1e-5);
    }

    #[test]
    fn push_force_escalates_while_stuck() {
        let mut path = walk_path();
        path.override_push_force(100.0);
        assert_approx_eq!(path.push_force(), 100.0);

        path.set_frame_time(Duration::from_millis(250));
        assert_approx_eq!(path.push_force(), 150.0, epsilon = 1e-3);

        path.set_frame_time(Duration::from_millis(750));
        assert_approx_eq!(path.push_force(), 200.0);

        path.restart();
        assert_approx_eq!(path.push_force(), 100.0);
    }

    #[test]
    fn restart_free_picks_unobstructed_start_segment() {
        let mut path = LimbPath::new(
            Vec2::ZERO,
            vec![Vec2::new(0.0, 10.0), Vec2::new(5.0, 0.0), Vec2::new(5.0, 0.0)],
        );
        path.set_start_seg_count(2);

        let mut limb = Vec2::new(50.0, 50.0);
        assert!(path.restart_free(&mut limb, &QueryFilter::new(), &OpenTerrain));
        assert_eq!(path.current_segment_number(), 1);
        assert_eq!(limb, Vec2::new(0.0, 10.0));

        let mut limb = Vec2::new(50.0, 50.0);
        assert!(path.restart_free(&mut limb, &QueryFilter::new(), &FlatGround::new(5.0)));
        assert_eq!(path.current_segment_number(), 0);
        assert_eq!(limb, Vec2::ZERO);

        let mut limb = Vec2::new(50.0, 50.0);
        assert!(!path.restart_free(&mut limb, &QueryFilter::new(), &FlatGround::new(-5.0)));
        assert_eq!(path.current_segment_number(), 0);
        assert_eq!(limb, Vec2::ZERO);
    }

    #[test]
    fn terminate_and_foot_collisions() {
        let mut path = walk_path();
        path.set_end_seg_count(Some(1));
        assert!(!path.foot_collisions_should_be_disabled());

        path.terminate();
        assert!(path.path_ended());
        assert_eq!(path.current_segment_number(), 2);
        assert!(path.foot_collisions_should_be_disabled());
    }

    #[test]
    fn regular_progress_skips_start_segments() {
        let mut path = LimbPath::new(Vec2::ZERO, vec![Vec2::new(10.0, 0.0), Vec2::new(10.0, 0.0)]);
        path.set_start_seg_count(1);

        path.report_progress(Vec2::new(5.0, 0.0));
        assert_approx_eq!(path.total_progress(), 0.25);
        assert_eq!(path.regular_progress(), 0.0);

        path.report_progress(Vec2::new(10.0, 0.0));
        path.report_progress(Vec2::new(15.0, 0.0));
        assert_approx_eq!(path.regular_progress(), 0.5);
    }

    #[test]
    fn extents() {
        let mut path = walk_path();
        assert_eq!(path.lowest_y(), 10.0);
        assert_eq!(path.middle_x(), 5.0);
        path.set_h_flip(true);
        assert_eq!(path.middle_x(), -5.0);
    }

    #[test]
    fn read_and_save() {
        let text = "\
AddLimbPath = LimbPath
\tPresetName = Walk
\tStartOffset = Vector
\t\tX = 1
\t\tY = 2
\tStartSegCount = 1
\tAddSegment = Vector
\t\tX = 4
\t\tY = 0
\tAddSegment = Vector
\t\tX = 0
\t\tY = 4
\tSlowTravelSpeed = 1.5
\tFastTravelSpeed = 7
\tPushForce = 350
\tEndSegCount = 1
";
        let path: LimbPath = game_data::from_str(text).unwrap();
        assert_eq!(path.preset_name(), "Walk");
        assert_eq!(path.start_offset(), Vec2::new(1.0, 2.0));
        assert_eq!(path.seg_count(), 2);
        assert_eq!(path.travel_speed(Speed::Slow), 1.5);
        assert_eq!(path.travel_speed(Speed::Normal), 4.0);
        assert_eq!(path.default_push_force(), 350.0);
        assert_approx_eq!(path.total_length(), 8.0);

        let saved = game_data::to_string("AddLimbPath", &path);
        let read: LimbPath = game_data::from_str(&saved).unwrap();
        assert_eq!(game_data::to_string("AddLimbPath", &read), saved);
    }
}
