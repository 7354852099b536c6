//! Fluent builder for course files.

use course::catalogue::{LoadedCourse, SegmentCatalogue};
use course::clock::GoalSpec;
use course::config::SimulatorConfig;
use course::models::{AidStation, CourseFeature, CourseSpec, Cutoff, RaceSpec, SegmentSpec};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{BoundingBox, Region};
use crate::sources::ProceduralGenerator;

/// Builds a [`CourseSpec`] from generated or supplied segments.
///
/// # Example
///
/// ```rust,ignore
/// let course = CourseBuilder::new(42)
///     .with_region(Region::MCDOWELL)
///     .with_generated_segment("loop", "Loop", "#FF8C00", 15.5)
///     .race("50k", "50K")
///         .segments(["loop", "loop"])
///         .goal(7, 30)
///         .done()
///     .build();
/// ```
pub struct CourseBuilder {
    seed: u64,
    rng: StdRng,
    region: BoundingBox,
    points_per_segment: usize,
    start: Option<(f64, f64)>,
    config: SimulatorConfig,
    segments: Vec<SegmentSpec>,
    races: Vec<RaceSpec>,
}

impl CourseBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            region: Region::MCDOWELL,
            points_per_segment: 200,
            start: None,
            config: SimulatorConfig::default(),
            segments: Vec::new(),
            races: Vec::new(),
        }
    }

    /// Three loops sharing a start area, with repeated laps and a shared
    /// stretch: a 100 mile, a 100 km and a single-loop race.
    pub fn desert_loops(seed: u64) -> Self {
        let start = Region::MCDOWELL.center();
        Self::new(seed)
            .with_region(Region::MCDOWELL)
            .with_start(start.0, start.1)
            .with_config(SimulatorConfig {
                race_start_hour: 6.0,
                day_labels: vec!["Sat".to_string(), "Sun".to_string()],
                ..Default::default()
            })
            .with_generated_segment("loop1", "Loop 1", "#FF8C00", 15.71)
            .with_nominal_climb("loop1", 1188.0)
            .with_abbr("loop1", "L1")
            .with_generated_segment("escondido", "Escondido", "#00AEEF", 6.16)
            .with_nominal_climb("escondido", 453.0)
            .with_abbr("escondido", "E")
            .with_generated_segment("standard", "Standard Loop", "#FF8C00", 19.45)
            .with_nominal_climb("standard", 1506.0)
            .with_abbr("standard", "SL")
            .with_aid_station("standard", "Jackass Junction", 7.6, "Water, food, medical")
            .with_aid_station("standard", "Coyote Camp", 13.3, "Water, food")
            .race("100m", "100 Mile")
            .segments(["loop1", "escondido", "standard", "standard", "standard", "standard"])
            .goal(30, 0)
            .feature(CourseFeature::SharedOverlap)
            .feature(CourseFeature::LapCounter)
            .feature(CourseFeature::AidStations)
            .feature(CourseFeature::CutoffMarkers)
            .cutoff(61.2, "18h", "Must start loop 5")
            .done()
            .race("100k", "100 KM")
            .segments(["loop1", "escondido", "standard", "standard"])
            .goal(29, 0)
            .feature(CourseFeature::SharedOverlap)
            .feature(CourseFeature::LapCounter)
            .done()
            .race("31k", "31K")
            .segments(["standard"])
            .goal(8, 30)
            .done()
    }

    /// One loop run for one or two laps.
    pub fn single_loop(seed: u64) -> Self {
        Self::new(seed)
            .with_region(Region::SLEEPING_GIANT)
            .with_generated_segment("giant", "Giant Loop", "#7ED321", 15.5)
            .race("loop", "1 Lap")
            .segments(["giant"])
            .goal(3, 30)
            .done()
            .race("double", "2 Laps")
            .segments(["giant", "giant"])
            .goal(7, 0)
            .feature(CourseFeature::LapCounter)
            .done()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn with_region(mut self, region: BoundingBox) -> Self {
        self.region = region;
        self
    }

    /// Start (lat, lon) shared by every generated segment.
    pub fn with_start(mut self, lat: f64, lon: f64) -> Self {
        self.start = Some((lat, lon));
        self
    }

    pub fn with_points_per_segment(mut self, points: usize) -> Self {
        self.points_per_segment = points.max(2);
        self
    }

    pub fn with_config(mut self, config: SimulatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_segment(mut self, spec: SegmentSpec) -> Self {
        self.segments.push(spec);
        self
    }

    /// Adds a procedurally generated segment. Elevations are in meters, as
    /// the default config expects.
    pub fn with_generated_segment(mut self, id: &str, label: &str, color: &str, miles: f64) -> Self {
        let terrain_seed = self.seed as u32 ^ self.segments.len() as u32;
        let mut generator = ProceduralGenerator::for_region(self.region, terrain_seed)
            .with_distance(miles)
            .with_points(self.points_per_segment);
        if let Some((lat, lon)) = self.start {
            generator = generator.with_start(lat, lon);
        }
        let spec = generator.generate(id, label, color, &mut self.rng);
        self.segments.push(spec);
        self
    }

    /// Overrides a segment's nominal climb with a published figure.
    pub fn with_nominal_climb(mut self, id: &str, feet: f64) -> Self {
        if let Some(spec) = self.segments.iter_mut().find(|s| s.id == id) {
            spec.nominal_climb = feet;
        }
        self
    }

    pub fn with_abbr(mut self, id: &str, abbr: &str) -> Self {
        if let Some(spec) = self.segments.iter_mut().find(|s| s.id == id) {
            spec.abbr = Some(abbr.to_string());
        }
        self
    }

    pub fn with_aid_station(mut self, id: &str, name: &str, distance: f64, services: &str) -> Self {
        if let Some(spec) = self.segments.iter_mut().find(|s| s.id == id) {
            spec.aid_stations.push(AidStation {
                name: name.to_string(),
                distance,
                services: services.to_string(),
            });
        }
        self
    }

    /// Starts a race definition; finish it with [`RaceBuilder::done`].
    pub fn race(self, id: &str, name: &str) -> RaceBuilder {
        RaceBuilder {
            parent: self,
            spec: RaceSpec {
                id: id.to_string(),
                name: name.to_string(),
                segments: Vec::new(),
                default_goal: None,
                features: Vec::new(),
                cutoffs: Vec::new(),
            },
        }
    }

    pub fn with_race(mut self, spec: RaceSpec) -> Self {
        self.races.push(spec);
        self
    }

    pub fn build(self) -> CourseSpec {
        tracing::info!(
            seed = self.seed,
            segments = self.segments.len(),
            races = self.races.len(),
            "built course"
        );
        CourseSpec {
            config: self.config,
            segments: self.segments,
            races: self.races,
        }
    }

    /// Builds the course and loads it into a catalogue.
    pub fn build_catalogue(self) -> LoadedCourse {
        SegmentCatalogue::load(self.build())
    }
}

/// Race definition nested in a [`CourseBuilder`].
pub struct RaceBuilder {
    parent: CourseBuilder,
    spec: RaceSpec,
}

impl RaceBuilder {
    pub fn segments<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.segments = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn goal(mut self, hours: u32, minutes: u32) -> Self {
        self.spec.default_goal = Some(GoalSpec {
            hours: hours as f64,
            minutes: minutes as f64,
        });
        self
    }

    pub fn feature(mut self, feature: CourseFeature) -> Self {
        if !self.spec.features.contains(&feature) {
            self.spec.features.push(feature);
        }
        self
    }

    pub fn cutoff(mut self, distance: f64, time_label: &str, description: &str) -> Self {
        self.spec.cutoffs.push(Cutoff {
            distance,
            time_label: time_label.to_string(),
            description: description.to_string(),
        });
        self
    }

    pub fn done(self) -> CourseBuilder {
        self.parent.with_race(self.spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desert_loops_loads_cleanly() {
        let loaded = CourseBuilder::desert_loops(42)
            .with_points_per_segment(120)
            .build_catalogue();
        assert!(loaded.rejected.is_empty());

        let race = loaded.catalogue.race("100m").unwrap();
        assert!((race.total_distance() - (15.71 + 6.16 + 4.0 * 19.45)).abs() < 1e-9);
        assert_eq!(race.total_climb(), 1188.0 + 453.0 + 4.0 * 1506.0);
        assert_eq!(race.default_goal().split(), (30, 0));
        assert!(race.has_feature(CourseFeature::SharedOverlap));
        assert_eq!(race.occurrences()[5].lap, 4);

        let standard = loaded.catalogue.segment("standard").unwrap();
        assert_eq!(standard.abbr(), Some("SL"));
        assert_eq!(standard.aid_stations().len(), 2);
    }

    #[test]
    fn test_generated_segments_are_reproducible() {
        let a = CourseBuilder::single_loop(7).build();
        let b = CourseBuilder::single_loop(7).build();
        assert_eq!(a.segments[0].coordinates, b.segments[0].coordinates);
        assert_eq!(a.races.len(), 2);
        assert_eq!(a.races[1].segments, vec!["giant", "giant"]);
    }

    #[test]
    fn test_feature_not_duplicated() {
        let spec = CourseBuilder::new(1)
            .with_generated_segment("x", "X", "#000", 2.0)
            .race("r", "R")
            .segments(["x"])
            .feature(CourseFeature::LapCounter)
            .feature(CourseFeature::LapCounter)
            .done()
            .build();
        assert_eq!(spec.races[0].features.len(), 1);
        assert!(spec.races[0].default_goal.is_none());
    }
}
