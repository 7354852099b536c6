//! Races: ordered sequences of segment occurrences.

use std::sync::Arc;

use serde::Serialize;

use crate::clock::GoalDuration;
use crate::models::{CourseFeature, CourseFeatures, Cutoff};
use crate::segment::Segment;

/// Distances this close to an occurrence boundary belong to the earlier one.
pub(crate) const BOUNDARY_EPSILON: f64 = 1e-9;

/// One appearance of a segment within a race.
#[derive(Debug, Clone)]
pub struct Occurrence {
    pub index: usize,
    pub segment: Arc<Segment>,
    /// Race distance at which this occurrence starts.
    pub start_distance: f64,
    /// Climb completed before this occurrence starts.
    pub start_climb: f64,
    /// 1-based count of this segment id so far in the race.
    pub lap: u32,
}

impl Occurrence {
    pub fn distance(&self) -> f64 {
        self.segment.nominal_distance()
    }

    pub fn end_distance(&self) -> f64 {
        self.start_distance + self.distance()
    }
}

/// An immutable race definition. Swapped, never mutated, when the user picks
/// another distance.
#[derive(Debug, Clone)]
pub struct Race {
    id: String,
    name: String,
    occurrences: Vec<Occurrence>,
    total_distance: f64,
    total_climb: f64,
    default_goal: GoalDuration,
    features: CourseFeatures,
    cutoffs: Vec<Cutoff>,
}

/// A cutoff placed on the scrubber.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutoffMarker {
    pub fraction: f64,
    pub time_label: String,
    pub description: String,
}

impl Race {
    /// Builds a race from already-resolved segments. `segments` must not be
    /// empty; the catalogue checks this before calling.
    pub(crate) fn new(
        id: String,
        name: String,
        segments: Vec<Arc<Segment>>,
        default_goal: GoalDuration,
    ) -> Self {
        let mut occurrences = Vec::with_capacity(segments.len());
        let mut distance = 0.0;
        let mut climb = 0.0;

        for (index, segment) in segments.into_iter().enumerate() {
            let lap = 1 + occurrences
                .iter()
                .filter(|o: &&Occurrence| o.segment.id() == segment.id())
                .count() as u32;
            let next_distance = distance + segment.nominal_distance();
            let next_climb = climb + segment.nominal_climb();
            occurrences.push(Occurrence {
                index,
                segment,
                start_distance: distance,
                start_climb: climb,
                lap,
            });
            distance = next_distance;
            climb = next_climb;
        }

        Self {
            id,
            name,
            occurrences,
            total_distance: distance,
            total_climb: climb,
            default_goal,
            features: CourseFeatures::empty(),
            cutoffs: Vec::new(),
        }
    }

    pub fn with_features(mut self, features: CourseFeatures) -> Self {
        self.features = features;
        self
    }

    pub fn with_cutoffs(mut self, cutoffs: Vec<Cutoff>) -> Self {
        self.cutoffs = cutoffs;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn total_climb(&self) -> f64 {
        self.total_climb
    }

    pub fn default_goal(&self) -> GoalDuration {
        self.default_goal
    }

    pub fn features(&self) -> CourseFeatures {
        self.features
    }

    pub fn has_feature(&self, feature: CourseFeature) -> bool {
        self.features.contains(feature)
    }

    pub fn cutoffs(&self) -> &[Cutoff] {
        &self.cutoffs
    }

    pub fn segment_ids(&self) -> impl Iterator<Item = &str> {
        self.occurrences.iter().map(|o| o.segment.id())
    }

    pub fn first_occurrence(&self) -> &Occurrence {
        &self.occurrences[0]
    }

    pub fn last_occurrence(&self) -> &Occurrence {
        &self.occurrences[self.occurrences.len() - 1]
    }

    /// The occurrence owning a race distance.
    ///
    /// The first occurrence whose end is at or past `distance` owns it, so an
    /// exact boundary belongs to the earlier occurrence. Distances past the
    /// end belong to the last occurrence.
    pub fn occurrence_at(&self, distance: f64) -> &Occurrence {
        self.occurrences
            .iter()
            .find(|o| distance <= o.end_distance() + BOUNDARY_EPSILON)
            .unwrap_or_else(|| self.last_occurrence())
    }

    /// Race fractions where one occurrence hands over to the next.
    pub fn boundaries(&self) -> Vec<f64> {
        let n = self.occurrences.len();
        self.occurrences[..n.saturating_sub(1)]
            .iter()
            .map(|o| o.end_distance() / self.total_distance)
            .collect()
    }

    /// Share of the race covered by each occurrence.
    pub fn occurrence_widths(&self) -> Vec<f64> {
        self.occurrences
            .iter()
            .map(|o| o.distance() / self.total_distance)
            .collect()
    }

    /// Cutoffs as race fractions; those past the finish are dropped.
    pub fn cutoff_markers(&self) -> Vec<CutoffMarker> {
        self.cutoffs
            .iter()
            .map(|c| (c.distance / self.total_distance, c))
            .filter(|(fraction, _)| *fraction <= 1.0)
            .map(|(fraction, c)| CutoffMarker {
                fraction,
                time_label: c.time_label.clone(),
                description: c.description.clone(),
            })
            .collect()
    }
}
