//! The core body simulation.
//!
//! Bodies own trees of [`Attachable`]s joined at breakable joints. Every tick each body
//! positions its attachables, collects the forces and impulses acting on them through their
//! joints and gibs itself once it takes too much.

pub mod arm;
pub mod attachable;
pub mod body;
pub mod config;
pub mod context;
pub mod emitter;
pub mod gib;
pub mod leg;
pub mod logger;
pub mod particle;
pub mod pathfinding;
pub mod pool;
pub mod preset;
pub mod sound;
pub mod world;

pub use attachable::{Attachable, FlipInheritance, JointOverrides, JointStatus, Role};
pub use body::Body;
pub use config::Config;
pub use context::WorldContext;
pub use world::World;
