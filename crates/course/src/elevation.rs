//! Elevation profile indexed by normalized distance.

use serde::{Deserialize, Serialize};

use crate::distance::DistanceTable;

pub const FEET_PER_METER: f64 = 3.28084;

/// Unit of the raw elevation samples supplied by the geometry loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationUnit {
    #[default]
    Meters,
    Feet,
}

impl ElevationUnit {
    /// Converts a sample in this unit to feet (the display unit).
    pub fn to_feet(self, value: f64) -> f64 {
        match self {
            ElevationUnit::Meters => value * FEET_PER_METER,
            ElevationUnit::Feet => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfilePoint {
    /// Normalized distance along the segment.
    pub distance: f64,
    /// Elevation in feet.
    pub elevation: f64,
}

/// One (distance, elevation) pair per track sample, aligned with the
/// segment's [`DistanceTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationProfile {
    points: Vec<ProfilePoint>,
}

impl ElevationProfile {
    /// Pairs each sample with its normalized distance. No smoothing.
    ///
    /// Callers check that `samples` and `table` have the same length.
    pub fn build(samples: &[f64], unit: ElevationUnit, table: &DistanceTable) -> Self {
        debug_assert_eq!(samples.len(), table.len());
        let points = table
            .as_slice()
            .iter()
            .zip(samples)
            .map(|(&distance, &raw)| ProfilePoint {
                distance,
                elevation: unit.to_feet(raw),
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lowest and highest elevation, for chart scaling.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |acc, p| match acc {
            None => Some((p.elevation, p.elevation)),
            Some((lo, hi)) => Some((lo.min(p.elevation), hi.max(p.elevation))),
        })
    }

    /// Sum of positive elevation deltas between consecutive samples, in feet.
    pub fn raw_gain(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].elevation - w[0].elevation).max(0.0))
            .sum()
    }
}
