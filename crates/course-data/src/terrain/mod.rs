//! Terrain generation for fixture courses.

mod elevation;

pub use elevation::{ElevationGenerator, add_elevation_jitter};
