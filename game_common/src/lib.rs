//! The common core of the body and actor simulation.
//!
//! Everything in here is shared by all other crates: object identity, 2D math on top of
//! [`glam`], scene wrapping, simulation timers and the per-object value tables used by
//! scripts.

pub mod id;
pub mod math;
pub mod time;
pub mod units;
pub mod utils;
pub mod values;

pub use id::{Team, UniqueId};
