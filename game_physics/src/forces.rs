use glam::Vec2;
use parking_lot::Mutex;

/// The largest force or impulse magnitude accepted by a [`ForceQueue`].
///
/// Anything above this is the result of a broken collision response and is clamped.
pub const MAX_FORCE_MAGNITUDE: f32 = 500_000.0;

/// A force or impulse applied at an offset from the center of mass.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Force {
    pub vector: Vec2,
    /// Offset from the center of mass in pixels, in scene orientation.
    pub offset: Vec2,
}

/// An append-only queue of forces accumulated during a tick.
///
/// Pushing only requires a shared reference, so multiple call sites may add forces while the
/// owner is borrowed elsewhere. The queue is drained exactly once per tick by its owner.
#[derive(Debug, Default)]
pub struct ForceQueue {
    forces: Mutex<Vec<Force>>,
}

impl ForceQueue {
    pub fn new() -> Self {
        Self {
            forces: Mutex::new(Vec::new()),
        }
    }

    /// Adds a new force to the queue.
    ///
    /// Non-finite forces are dropped. Forces above [`MAX_FORCE_MAGNITUDE`] are clamped.
    pub fn push(&self, vector: Vec2, offset: Vec2) {
        if !vector.is_finite() || !offset.is_finite() {
            tracing::error!("dropping non-finite force {} at {}", vector, offset);
            return;
        }

        let magnitude = vector.length();
        debug_assert!(
            magnitude <= MAX_FORCE_MAGNITUDE,
            "force magnitude {} is out of bounds",
            magnitude
        );

        let vector = if magnitude > MAX_FORCE_MAGNITUDE {
            tracing::error!(
                "clamping force {} with magnitude {} to {}",
                vector,
                magnitude,
                MAX_FORCE_MAGNITUDE
            );
            vector * (MAX_FORCE_MAGNITUDE / magnitude)
        } else {
            vector
        };

        self.forces.lock().push(Force { vector, offset });
    }

    /// Removes and returns all queued forces.
    pub fn drain(&mut self) -> Vec<Force> {
        std::mem::take(self.forces.get_mut())
    }

    /// Returns the sum of all queued force vectors without draining them.
    pub fn sum(&self) -> Vec2 {
        self.forces.lock().iter().map(|force| force.vector).sum()
    }

    pub fn len(&self) -> usize {
        self.forces.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.lock().is_empty()
    }

    pub fn clear(&mut self) {
        self.forces.get_mut().clear();
    }
}

impl Clone for ForceQueue {
    fn clone(&self) -> Self {
        Self {
            forces: Mutex::new(self.forces.lock().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::{ForceQueue, MAX_FORCE_MAGNITUDE};

    #[test]
    fn push_and_drain() {
        let mut queue = ForceQueue::new();
        queue.push(Vec2::new(1.0, 0.0), Vec2::ZERO);
        queue.push(Vec2::new(0.0, 2.0), Vec2::new(3.0, 0.0));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.sum(), Vec2::new(1.0, 2.0));

        let forces = queue.drain();
        assert_eq!(forces.len(), 2);
        assert_eq!(forces[1].offset, Vec2::new(3.0, 0.0));
        assert!(queue.is_empty());
    }

    #[test]
    fn push_from_shared_references() {
        let queue = ForceQueue::new();
        let a = &queue;
        let b = &queue;
        a.push(Vec2::X, Vec2::ZERO);
        b.push(Vec2::Y, Vec2::ZERO);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn drop_non_finite() {
        let queue = ForceQueue::new();
        queue.push(Vec2::new(f32::NAN, 0.0), Vec2::ZERO);
        queue.push(Vec2::X, Vec2::new(f32::INFINITY, 0.0));
        assert!(queue.is_empty());
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic)]
    fn clamp_out_of_bounds() {
        let queue = ForceQueue::new();
        queue.push(Vec2::new(MAX_FORCE_MAGNITUDE * 10.0, 0.0), Vec2::ZERO);
        assert_eq!(queue.sum(), Vec2::new(MAX_FORCE_MAGNITUDE, 0.0));
    }
}
