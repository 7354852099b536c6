//! Geometry sources for course segments.
//!
//! - [`GpxLoader`]: read recorded or published GPX tracks
//! - [`ProceduralGenerator`]: generate fixture segments with Perlin terrain

mod gpx_files;
mod procedural;

pub use gpx_files::{GpxError, GpxLoader, GpxTrack};
pub use procedural::{ProceduralGenerator, RoutePattern, SegmentConfig};

use course::elevation::FEET_PER_METER;

/// Sum of positive elevation deltas, converted from meters to feet.
pub fn climb_feet(elevations_m: &[f64]) -> f64 {
    elevations_m
        .windows(2)
        .map(|w| (w[1] - w[0]).max(0.0))
        .sum::<f64>()
        * FEET_PER_METER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_climb_ignores_descents() {
        let climb = climb_feet(&[100.0, 110.0, 105.0, 125.0]);
        assert!((climb - 30.0 * FEET_PER_METER).abs() < 1e-9);
        assert_eq!(climb_feet(&[]), 0.0);
    }
}
