//! Geographic areas used when generating fixture courses.

use serde::{Deserialize, Serialize};

/// Geographic bounding box defined by southwest and northeast corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Returns a random (lat, lon) within the box.
    pub fn random_point(&self, rng: &mut impl rand::Rng) -> (f64, f64) {
        let lat = rng.gen_range(self.min_lat..self.max_lat);
        let lon = rng.gen_range(self.min_lon..self.max_lon);
        (lat, lon)
    }

    /// Returns the (lat, lon) center of the box.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Pre-defined trail race areas.
#[derive(Debug, Clone, Copy)]
pub struct Region;

impl Region {
    /// McDowell Mountain desert loops, Arizona.
    pub const MCDOWELL: BoundingBox = BoundingBox::new(33.65, -111.78, 33.78, -111.62);

    /// Sleeping Giant ridge trails, Connecticut.
    pub const SLEEPING_GIANT: BoundingBox = BoundingBox::new(41.41, -72.93, 41.45, -72.86);

    /// Northern Catskills escarpment, New York.
    pub const CATSKILLS: BoundingBox = BoundingBox::new(42.10, -74.25, 42.30, -73.95);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_point_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let (lat, lon) = Region::MCDOWELL.random_point(&mut rng);
            assert!(Region::MCDOWELL.contains(lat, lon));
        }
    }

    #[test]
    fn test_center() {
        let (lat, lon) = Region::SLEEPING_GIANT.center();
        assert!((lat - 41.43).abs() < 1e-9);
        assert!((lon + 72.895).abs() < 1e-9);
    }
}
