//! Asynchronous path requests.
//!
//! A [`Pathfinder`] hands out a [`PathRequest`] immediately and completes it later through the
//! matching [`PathResolver`], possibly from another thread. Requesters poll the handle every
//! tick and take the path once it is complete.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use game_common::Team;
use glam::Vec2;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct RequestState {
    complete: AtomicBool,
    path: Mutex<Option<Vec<Vec2>>>,
}

/// A handle to a pending path computation.
#[derive(Clone, Debug)]
pub struct PathRequest {
    state: Arc<RequestState>,
}

impl PathRequest {
    /// Creates a new pending request and the resolver completing it.
    pub fn new() -> (Self, PathResolver) {
        let state = Arc::new(RequestState::default());

        (
            Self {
                state: state.clone(),
            },
            PathResolver { state: Some(state) },
        )
    }

    /// Creates a request that is already complete.
    pub fn completed(path: Vec<Vec2>) -> Self {
        let (request, resolver) = Self::new();
        resolver.resolve(path);
        request
    }

    pub fn is_complete(&self) -> bool {
        self.state.complete.load(Ordering::Acquire)
    }

    /// Takes the computed path.
    ///
    /// Returns `None` while the request is pending and after the path was taken. A completed
    /// request for which no path exists yields an empty path.
    pub fn take_path(&self) -> Option<Vec<Vec2>> {
        if !self.is_complete() {
            return None;
        }

        self.state.path.lock().take()
    }
}

/// Completes a [`PathRequest`].
///
/// Dropping an unresolved `PathResolver` completes the request without a path.
#[derive(Debug)]
pub struct PathResolver {
    state: Option<Arc<RequestState>>,
}

impl PathResolver {
    pub fn resolve(mut self, path: Vec<Vec2>) {
        self.complete(path);
    }

    fn complete(&mut self, path: Vec<Vec2>) {
        if let Some(state) = self.state.take() {
            *state.path.lock() = Some(path);
            state.complete.store(true, Ordering::Release);
        }
    }
}

impl Drop for PathResolver {
    fn drop(&mut self) {
        self.complete(Vec::new());
    }
}

/// A service computing paths through the scene.
pub trait Pathfinder {
    /// Requests a path from `from` to `to` for an actor of `team`.
    fn request_path(&mut self, from: Vec2, to: Vec2, team: Team) -> PathRequest;
}

/// A [`Pathfinder`] returning straight lines, split into steps of at most `step` pixels.
#[derive(Copy, Clone, Debug)]
pub struct StraightLinePathfinder {
    pub step: f32,
}

impl StraightLinePathfinder {
    pub const DEFAULT_STEP: f32 = 20.0;

    pub fn new(step: f32) -> Self {
        Self { step }
    }

    /// Computes the path from `from` to `to`, excluding `from`.
    pub fn path(&self, from: Vec2, to: Vec2) -> Vec<Vec2> {
        let distance = from.distance(to);
        if distance == 0.0 {
            return vec![to];
        }

        let steps = if self.step > 0.0 {
            (distance / self.step).ceil().max(1.0) as usize
        } else {
            1
        };

        (1..=steps)
            .map(|index| from.lerp(to, index as f32 / steps as f32))
            .collect()
    }
}

impl Default for StraightLinePathfinder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEP)
    }
}

impl Pathfinder for StraightLinePathfinder {
    fn request_path(&mut self, from: Vec2, to: Vec2, _team: Team) -> PathRequest {
        PathRequest::completed(self.path(from, to))
    }
}

/// A search computing a path between two points.
pub type SearchFn = dyn Fn(Vec2, Vec2, Team) -> Vec<Vec2> + Send + 'static;

struct Job {
    from: Vec2,
    to: Vec2,
    team: Team,
    resolver: PathResolver,
}

/// A [`Pathfinder`] running a search function on a dedicated worker thread.
pub struct ThreadedPathfinder {
    tx: Option<mpsc::Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadedPathfinder {
    pub fn new<F>(search: F) -> Self
    where
        F: Fn(Vec2, Vec2, Team) -> Vec<Vec2> + Send + 'static,
    {
        let search: Box<SearchFn> = Box::new(search);
        let (tx, rx) = mpsc::channel::<Job>();

        let handle = std::thread::spawn(move || {
            let _span = game_tracing::trace_span!("ThreadedPathfinder::run").entered();

            while let Ok(job) = rx.recv() {
                let path = search(job.from, job.to, job.team);
                job.resolver.resolve(path);
            }
        });

        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }
}

impl Pathfinder for ThreadedPathfinder {
    fn request_path(&mut self, from: Vec2, to: Vec2, team: Team) -> PathRequest {
        let (request, resolver) = PathRequest::new();

        let job = Job {
            from,
            to,
            team,
            resolver,
        };

        // A failed send drops the job, completing the request without a path.
        if let Some(tx) = &self.tx {
            if tx.send(job).is_err() {
                tracing::warn!("pathfinding worker stopped");
            }
        }

        request
    }
}

impl Drop for ThreadedPathfinder {
    fn drop(&mut self) {
        // Closing the channel stops the worker.
        drop(self.tx.take());

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("pathfinding worker panicked");
            }
        }
    }
}

/// A [`Pathfinder`] that keeps every request pending until it is resolved by hand.
#[derive(Debug, Default)]
pub struct ManualPathfinder {
    pending: Vec<(Vec2, Vec2, PathResolver)>,
}

impl ManualPathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Returns the endpoints of the oldest pending request.
    pub fn next_request(&self) -> Option<(Vec2, Vec2)> {
        self.pending.first().map(|(from, to, _)| (*from, *to))
    }

    /// Completes the oldest pending request with `path`. Returns `false` if none is pending.
    pub fn resolve_next(&mut self, path: Vec<Vec2>) -> bool {
        if self.pending.is_empty() {
            return false;
        }

        let (_, _, resolver) = self.pending.remove(0);
        resolver.resolve(path);
        true
    }
}

impl Pathfinder for ManualPathfinder {
    fn request_path(&mut self, from: Vec2, to: Vec2, _team: Team) -> PathRequest {
        let (request, resolver) = PathRequest::new();
        self.pending.push((from, to, resolver));
        request
    }
}
