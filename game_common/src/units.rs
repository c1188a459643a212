//! Conversion between scene pixels and physical units.
//!
//! Positions are stored in pixels, velocities in meters per second and masses in kilograms.

/// Pixels per meter.
pub const PIXELS_PER_METER: f32 = 20.0;

/// Meters per pixel.
pub const METERS_PER_PIXEL: f32 = 1.0 / PIXELS_PER_METER;
