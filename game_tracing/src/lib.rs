//! Instrumentation of per-tick simulation zones.
//!
//! Spans are compiled out unless the `spans` feature is enabled, so instrumenting hot paths
//! like the body update costs nothing in normal builds.

pub mod span;

pub use span::{EnteredSpan, Span};
