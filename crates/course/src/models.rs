//! Load-time descriptions of segments and races, as supplied by the geometry
//! loader and the race catalogue.

use enumflags2::{BitFlags, bitflags};
use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::clock::GoalSpec;
use crate::config::SimulatorConfig;

/// Optional behaviors a race declares instead of carrying its own code paths.
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseFeature {
    /// Two of the race's segments physically coincide for part of their length.
    SharedOverlap = 0b0001,
    /// The race has time cutoffs to mark on the scrubber.
    CutoffMarkers = 0b0010,
    /// Aid stations are shown along the course.
    AidStations = 0b0100,
    /// Repeated segments are labelled with a lap counter.
    LapCounter = 0b1000,
}

pub type CourseFeatures = BitFlags<CourseFeature>;

/// A named aid station at a distance along one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AidStation {
    pub name: String,
    pub distance: f64,
    #[serde(default)]
    pub services: String,
}

/// A time cutoff at a distance into a race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cutoff {
    pub distance: f64,
    /// Short label such as "24h".
    pub time_label: String,
    #[serde(default)]
    pub description: String,
}

/// Geometry and nominal values for one segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub abbr: Option<String>,
    #[serde(default)]
    pub color: String,
    /// Visual pattern tag for renderers, e.g. "checkered".
    #[serde(default)]
    pub pattern: Option<String>,
    pub nominal_distance: f64,
    pub nominal_climb: f64,
    /// `[longitude, latitude]` pairs.
    pub coordinates: Vec<[f64; 2]>,
    /// Raw elevation samples, index-aligned with `coordinates`.
    pub elevations: Vec<f64>,
    #[serde(default)]
    pub aid_stations: Vec<AidStation>,
}

impl SegmentSpec {
    pub fn coords(&self) -> Vec<Coord<f64>> {
        self.coordinates
            .iter()
            .map(|[x, y]| Coord { x: *x, y: *y })
            .collect()
    }
}

/// A selectable race distance from the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSpec {
    pub id: String,
    pub name: String,
    /// Ordered segment ids; repeats mean repeated laps.
    pub segments: Vec<String>,
    #[serde(default)]
    /// Validated when the race is built.
    pub default_goal: Option<GoalSpec>,
    #[serde(default)]
    pub features: Vec<CourseFeature>,
    #[serde(default)]
    pub cutoffs: Vec<Cutoff>,
}

impl RaceSpec {
    pub fn feature_flags(&self) -> CourseFeatures {
        self.features.iter().copied().collect()
    }
}

/// A complete course file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSpec {
    #[serde(default)]
    pub config: SimulatorConfig,
    pub segments: Vec<SegmentSpec>,
    #[serde(default)]
    pub races: Vec<RaceSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_spec_from_json() {
        let json = r#"{
            "id": "100m",
            "name": "100 Mile",
            "segments": ["loop1", "escondido", "standard", "standard"],
            "default_goal": { "hours": 30, "minutes": 0 },
            "features": ["shared_overlap", "cutoff_markers"],
            "cutoffs": [{ "distance": 80.5, "time_label": "24h" }]
        }"#;
        let spec: RaceSpec = serde_json::from_str(json).unwrap();

        assert_eq!(spec.segments.len(), 4);
        let flags = spec.feature_flags();
        assert!(flags.contains(CourseFeature::SharedOverlap));
        assert!(flags.contains(CourseFeature::CutoffMarkers));
        assert!(!flags.contains(CourseFeature::AidStations));
        assert_eq!(spec.cutoffs[0].description, "");
    }

    #[test]
    fn test_segment_spec_coords() {
        let spec = SegmentSpec {
            id: "pink".into(),
            label: "Pink".into(),
            abbr: Some("P".into()),
            color: "#E834EC".into(),
            pattern: None,
            nominal_distance: 7.75,
            nominal_climb: 840.0,
            coordinates: vec![[-74.43, 41.19], [-74.42, 41.2]],
            elevations: vec![300.0, 310.0],
            aid_stations: Vec::new(),
        };
        let coords = spec.coords();
        assert_eq!(coords[1], Coord { x: -74.42, y: 41.2 });
    }
}
