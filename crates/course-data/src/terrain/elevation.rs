//! Perlin noise-based elevation generation.

use geo::Coord;
use noise::{NoiseFn, Perlin};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Generates terrain elevations (meters) from fractal Perlin noise.
#[derive(Debug, Clone)]
pub struct ElevationGenerator {
    perlin: Perlin,
    /// Base elevation in meters.
    base_elevation: f64,
    /// Amplitude of the variation around the base, in meters.
    height_scale: f64,
    /// Noise cycles per degree of latitude/longitude.
    frequency: f64,
    octaves: u32,
}

impl ElevationGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base_elevation: 500.0,
            height_scale: 120.0,
            frequency: 40.0,
            octaves: 4,
        }
    }

    /// Low desert with rolling washes and a few rocky rises.
    pub fn desert(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base_elevation: 700.0,
            height_scale: 60.0,
            frequency: 30.0,
            octaves: 3,
        }
    }

    /// Steep ridges with short, punchy climbs.
    pub fn ridge(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base_elevation: 150.0,
            height_scale: 90.0,
            frequency: 80.0,
            octaves: 5,
        }
    }

    /// Big mountain terrain.
    pub fn mountain(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base_elevation: 900.0,
            height_scale: 350.0,
            frequency: 25.0,
            octaves: 5,
        }
    }

    pub fn with_base_elevation(mut self, elevation: f64) -> Self {
        self.base_elevation = elevation;
        self
    }

    pub fn with_height_scale(mut self, scale: f64) -> Self {
        self.height_scale = scale;
        self
    }

    pub fn with_frequency(mut self, freq: f64) -> Self {
        self.frequency = freq;
        self
    }

    pub fn base_elevation(&self) -> f64 {
        self.base_elevation
    }

    pub fn height_scale(&self) -> f64 {
        self.height_scale
    }

    /// Elevation at a lat/lon, using fractal Brownian motion.
    pub fn elevation_at(&self, lat: f64, lon: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.frequency;
        let mut max_amplitude = 0.0;

        for _ in 0..self.octaves {
            total += self.perlin.get([lat * frequency, lon * frequency]) * amplitude;
            max_amplitude += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        let normalized = total / max_amplitude;
        self.base_elevation + normalized * self.height_scale
    }

    /// One elevation per `[lon, lat]` coordinate.
    pub fn elevation_profile(&self, coords: &[Coord<f64>]) -> Vec<f64> {
        coords.iter().map(|c| self.elevation_at(c.y, c.x)).collect()
    }
}

/// Adds GPS-like vertical noise to elevation samples. A negative or NaN
/// `std_dev` leaves the samples untouched.
pub fn add_elevation_jitter(elevations: &mut [f64], rng: &mut impl Rng, std_dev: f64) {
    let normal = match Normal::new(0.0, std_dev) {
        Ok(normal) => normal,
        Err(e) => {
            tracing::warn!(std_dev, error = %e, "skipping elevation jitter");
            return;
        }
    };
    for elevation in elevations {
        *elevation += normal.sample(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_elevation_consistency() {
        let elev_gen = ElevationGenerator::new(42);
        let elev1 = elev_gen.elevation_at(33.7, -111.7);
        let elev2 = elev_gen.elevation_at(33.7, -111.7);
        assert!((elev1 - elev2).abs() < 0.001);
    }

    #[test]
    fn test_elevation_range() {
        let elev_gen = ElevationGenerator::desert(42);
        for i in 0..50 {
            let elev = elev_gen.elevation_at(33.7 + i as f64 * 0.003, -111.7);
            assert!(elev >= elev_gen.base_elevation() - elev_gen.height_scale());
            assert!(elev <= elev_gen.base_elevation() + elev_gen.height_scale());
        }
    }

    #[test]
    fn test_profile_and_jitter() {
        let elev_gen = ElevationGenerator::ridge(7);
        let coords = vec![
            Coord { x: -72.9, y: 41.42 },
            Coord { x: -72.89, y: 41.43 },
            Coord { x: -72.88, y: 41.44 },
        ];
        let mut profile = elev_gen.elevation_profile(&coords);
        assert_eq!(profile.len(), 3);

        let original = profile.clone();
        let mut rng = StdRng::seed_from_u64(1);
        add_elevation_jitter(&mut profile, &mut rng, -1.0);
        assert_eq!(profile, original);
        add_elevation_jitter(&mut profile, &mut rng, 3.0);
        assert_ne!(profile, original);
    }
}
