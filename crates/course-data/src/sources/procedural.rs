//! Procedural fixture segments.

use std::f64::consts::TAU;

use course::distance::MILES_PER_DEGREE;
use course::models::SegmentSpec;
use geo::Coord;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::BoundingBox;
use crate::sources::climb_feet;
use crate::terrain::{ElevationGenerator, add_elevation_jitter};

/// Shape of a generated segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutePattern {
    /// Closed loop returning to its start.
    #[default]
    Loop,
    /// Random walk with momentum, kept inside the bounds.
    PointToPoint,
}

#[derive(Debug, Clone)]
pub struct SegmentConfig {
    pub distance_miles: f64,
    /// Number of track samples.
    pub points: usize,
    /// (lat, lon). Random within `bounds` when unset.
    pub start_point: Option<(f64, f64)>,
    pub bounds: BoundingBox,
    pub pattern: RoutePattern,
    /// Horizontal GPS noise, in meters.
    pub gps_jitter_m: f64,
    /// Vertical GPS noise, in meters.
    pub elevation_jitter_m: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            distance_miles: 5.0,
            points: 200,
            start_point: None,
            bounds: crate::config::Region::MCDOWELL,
            pattern: RoutePattern::Loop,
            gps_jitter_m: 3.0,
            elevation_jitter_m: 2.0,
        }
    }
}

const METERS_PER_DEGREE: f64 = 111_000.0;

/// Generates segment specs with noisy geometry and Perlin terrain.
///
/// The nominal distance is the configured distance, not the generated path
/// length, the same way published race distances differ from recorded GPS.
#[derive(Debug, Clone)]
pub struct ProceduralGenerator {
    config: SegmentConfig,
    elevation: ElevationGenerator,
}

impl ProceduralGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            config: SegmentConfig::default(),
            elevation: ElevationGenerator::desert(seed),
        }
    }

    pub fn for_region(bounds: BoundingBox, seed: u32) -> Self {
        Self {
            config: SegmentConfig {
                bounds,
                ..Default::default()
            },
            elevation: ElevationGenerator::new(seed),
        }
    }

    pub fn with_distance(mut self, miles: f64) -> Self {
        self.config.distance_miles = miles;
        self
    }

    pub fn with_points(mut self, points: usize) -> Self {
        self.config.points = points.max(2);
        self
    }

    pub fn with_start(mut self, lat: f64, lon: f64) -> Self {
        self.config.start_point = Some((lat, lon));
        self
    }

    pub fn with_pattern(mut self, pattern: RoutePattern) -> Self {
        self.config.pattern = pattern;
        self
    }

    pub fn with_gps_jitter(mut self, meters: f64) -> Self {
        self.config.gps_jitter_m = meters;
        self
    }

    pub fn with_elevation_jitter(mut self, meters: f64) -> Self {
        self.config.elevation_jitter_m = meters;
        self
    }

    pub fn with_elevation(mut self, elevation: ElevationGenerator) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    /// Generates a complete segment spec. Elevations are in meters.
    pub fn generate(&self, id: &str, label: &str, color: &str, rng: &mut impl Rng) -> SegmentSpec {
        let start = self
            .config
            .start_point
            .unwrap_or_else(|| self.config.bounds.random_point(rng));

        let mut path = match self.config.pattern {
            RoutePattern::Loop => self.generate_loop(start, rng),
            RoutePattern::PointToPoint => self.generate_walk(start, rng),
        };
        self.apply_gps_jitter(&mut path, rng);
        if self.config.pattern == RoutePattern::Loop && !path.is_empty() {
            let last = path.len() - 1;
            path[last] = path[0];
        }

        let mut elevations = self.elevation.elevation_profile(&path);
        add_elevation_jitter(&mut elevations, rng, self.config.elevation_jitter_m);

        SegmentSpec {
            id: id.to_string(),
            label: label.to_string(),
            abbr: None,
            color: color.to_string(),
            pattern: None,
            nominal_distance: self.config.distance_miles,
            nominal_climb: climb_feet(&elevations).round(),
            coordinates: path.iter().map(|c| [c.x, c.y]).collect(),
            elevations,
            aid_stations: Vec::new(),
        }
    }

    /// A wobbly circle whose circumference is roughly the target distance.
    pub fn generate_loop(&self, start: (f64, f64), rng: &mut impl Rng) -> Vec<Coord<f64>> {
        let n = self.config.points.max(3);
        let radius = self.config.distance_miles / TAU / MILES_PER_DEGREE;
        let (lat0, lon0) = start;
        let lon_scale = lat0.to_radians().cos().max(0.01);
        let phase = rng.gen_range(0.0..TAU);
        // Start sits on the circle, so the center is offset from it
        let center_lat = lat0 - radius * phase.cos();
        let center_lon = lon0 - radius * phase.sin() / lon_scale;

        (0..n)
            .map(|i| {
                let theta = phase + TAU * i as f64 / (n - 1) as f64;
                let wobble = if i == 0 || i == n - 1 {
                    1.0
                } else {
                    1.0 + 0.15 * (3.0 * theta).sin()
                };
                Coord {
                    x: center_lon + radius * wobble * theta.sin() / lon_scale,
                    y: center_lat + radius * wobble * theta.cos(),
                }
            })
            .collect()
    }

    /// Random walk with momentum, bouncing off the bounds.
    pub fn generate_walk(&self, start: (f64, f64), rng: &mut impl Rng) -> Vec<Coord<f64>> {
        let n = self.config.points.max(2);
        let step_m = self.config.distance_miles / MILES_PER_DEGREE * METERS_PER_DEGREE
            / (n - 1) as f64;
        let (mut lat, mut lon) = start;
        let mut heading = rng.gen_range(0.0..TAU);
        let mut path = Vec::with_capacity(n);
        path.push(Coord { x: lon, y: lat });

        for _ in 1..n {
            heading += rng.gen_range(-0.3..0.3);
            let step = step_m * rng.gen_range(0.8..1.2);
            let next_lat = lat + step * heading.cos() / METERS_PER_DEGREE;
            let next_lon =
                lon + step * heading.sin() / (METERS_PER_DEGREE * lat.to_radians().cos());

            let (next_lat, next_lon, bounced) = self.apply_bounds(next_lat, next_lon, heading);
            heading = bounced;
            lat = next_lat;
            lon = next_lon;
            path.push(Coord { x: lon, y: lat });
        }

        path
    }

    /// Keeps a point inside the bounds, reflecting the heading at the edge.
    fn apply_bounds(&self, lat: f64, lon: f64, heading: f64) -> (f64, f64, f64) {
        let b = &self.config.bounds;
        let mut new_heading = heading;

        let lat = if lat < b.min_lat {
            new_heading = std::f64::consts::PI - heading;
            b.min_lat + (b.min_lat - lat).min(0.001)
        } else if lat > b.max_lat {
            new_heading = std::f64::consts::PI - heading;
            b.max_lat - (lat - b.max_lat).min(0.001)
        } else {
            lat
        };

        let lon = if lon < b.min_lon {
            new_heading = -heading;
            b.min_lon + (b.min_lon - lon).min(0.001)
        } else if lon > b.max_lon {
            new_heading = -heading;
            b.max_lon - (lon - b.max_lon).min(0.001)
        } else {
            lon
        };

        (lat, lon, new_heading)
    }

    fn apply_gps_jitter(&self, path: &mut [Coord<f64>], rng: &mut impl Rng) {
        let Ok(jitter) = Normal::new(0.0, self.config.gps_jitter_m / METERS_PER_DEGREE) else {
            tracing::warn!(gps_jitter_m = self.config.gps_jitter_m, "skipping gps jitter");
            return;
        };
        for coord in path.iter_mut() {
            coord.x += jitter.sample(rng);
            coord.y += jitter.sample(rng);
        }
    }
}
