//! Cumulative along-track distance, rescaled to a course's nominal distance.
//!
//! Segments span at most tens of kilometers, so a local equirectangular
//! projection is used instead of great-circle distance.

use geo::Coord;
use thiserror::Error;

/// Miles per degree of latitude (and of longitude at the equator).
pub const MILES_PER_DEGREE: f64 = 69.172;

/// Raised when a track has no path length to rescale.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("track has zero path length ({points} points)")]
pub struct DegenerateTrackError {
    pub points: usize,
}

/// Planar distance in miles between two lon/lat coordinates.
///
/// The longitude delta is scaled by the cosine of the mean latitude.
pub fn planar_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let mean_lat = ((a.y + b.y) / 2.0).to_radians();
    let d_lon = (b.x - a.x) * mean_lat.cos() * MILES_PER_DEGREE;
    let d_lat = (b.y - a.y) * MILES_PER_DEGREE;
    d_lon.hypot(d_lat)
}

/// Running sum of planar distances; the first entry is always 0.
///
/// An empty track yields an empty table and a single point yields `[0.0]`.
pub fn raw_distances(coords: &[Coord<f64>]) -> Vec<f64> {
    let mut out = Vec::with_capacity(coords.len());
    if coords.is_empty() {
        return out;
    }

    let mut total = 0.0;
    out.push(total);
    for pair in coords.windows(2) {
        total += planar_distance(pair[0], pair[1]);
        out.push(total);
    }
    out
}

/// Position of a distance between two table entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lo: usize,
    pub hi: usize,
    /// Fractional position between `lo` and `hi` (0 when they coincide).
    pub t: f64,
}

/// Normalized cumulative distances, one per track sample.
///
/// Invariants: `table[0] == 0`, non-decreasing, `table[last] == nominal`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    entries: Vec<f64>,
}

impl DistanceTable {
    /// Builds the table and rescales it so the last entry equals `nominal`.
    pub fn normalized(coords: &[Coord<f64>], nominal: f64) -> Result<Self, DegenerateTrackError> {
        let mut entries = raw_distances(coords);
        let raw_total = entries.last().copied().unwrap_or(0.0);
        if raw_total <= 0.0 || !raw_total.is_finite() {
            return Err(DegenerateTrackError {
                points: coords.len(),
            });
        }

        let scale = nominal / raw_total;
        for d in &mut entries {
            *d *= scale;
        }
        // Pin the end exactly; scaling can leave it one ulp off.
        if let Some(last) = entries.last_mut() {
            *last = nominal;
        }

        Ok(Self { entries })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Final (nominal) distance.
    pub fn total(&self) -> f64 {
        self.entries.last().copied().unwrap_or(0.0)
    }

    /// Finds the pair of samples bracketing `distance`, clamped to the table.
    pub fn locate(&self, distance: f64) -> Bracket {
        let last = self.entries.len().saturating_sub(1);
        let d = distance.clamp(0.0, self.total());

        if self.entries.len() < 2 {
            return Bracket { lo: 0, hi: 0, t: 0.0 };
        }

        // First entry at or past `d`, searching from the second sample on.
        let hi = (1 + self.entries[1..].partition_point(|x| *x < d)).min(last);
        let lo = hi - 1;
        let span = self.entries[hi] - self.entries[lo];
        let t = if span > 0.0 {
            ((d - self.entries[lo]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Bracket { lo, hi, t }
    }
}
