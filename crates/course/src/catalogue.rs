//! The segment and race catalogue.
//!
//! Segments are loaded once and shared between races. A segment or race that
//! fails validation is logged and left out, so it is never offered for
//! selection, while the rest of the course still loads.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use crate::clock::GoalDuration;
use crate::config::SimulatorConfig;
use crate::elevation::ElevationUnit;
use crate::errors::{CourseError, Result};
use crate::models::{CourseSpec, RaceSpec, SegmentSpec};
use crate::race::Race;
use crate::segment::Segment;

#[derive(Debug, Clone, Default)]
pub struct SegmentCatalogue {
    unit: ElevationUnit,
    segments: BTreeMap<String, Arc<Segment>>,
    /// Segment ids in load order.
    order: Vec<String>,
    races: Vec<Arc<Race>>,
    hidden: BTreeSet<String>,
}

/// A catalogue built from a course file, with everything that was rejected.
#[derive(Debug)]
pub struct LoadedCourse {
    pub catalogue: SegmentCatalogue,
    pub config: SimulatorConfig,
    pub rejected: Vec<CourseError>,
}

impl SegmentCatalogue {
    pub fn new(unit: ElevationUnit) -> Self {
        Self {
            unit,
            ..Default::default()
        }
    }

    /// Builds every segment, then every race. Individual failures are
    /// collected in `rejected`.
    pub fn load(spec: CourseSpec) -> LoadedCourse {
        let CourseSpec {
            config,
            segments,
            races,
        } = spec;
        let mut catalogue = Self::new(config.elevation_unit);
        let mut rejected = Vec::new();

        for segment in segments {
            if let Err(e) = catalogue.insert_segment(segment) {
                tracing::warn!(error = %e, "skipping segment");
                rejected.push(e);
            }
        }

        for race in &races {
            match catalogue.build_race(race, config.default_goal) {
                Ok(built) => {
                    catalogue.register_race(built);
                }
                Err(e) => {
                    tracing::warn!(race = %race.id, error = %e, "skipping race");
                    rejected.push(e);
                }
            }
        }

        tracing::info!(
            segments = catalogue.segments.len(),
            races = catalogue.races.len(),
            rejected = rejected.len(),
            "course loaded"
        );

        LoadedCourse {
            catalogue,
            config,
            rejected,
        }
    }

    pub fn from_json_str(json: &str) -> Result<LoadedCourse> {
        let spec: CourseSpec = serde_json::from_str(json)?;
        Ok(Self::load(spec))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<LoadedCourse> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn elevation_unit(&self) -> ElevationUnit {
        self.unit
    }

    /// Validates and adds a segment. Ids must be unique.
    pub fn insert_segment(&mut self, spec: SegmentSpec) -> Result<Arc<Segment>> {
        if self.segments.contains_key(&spec.id) {
            return Err(CourseError::DuplicateSegment(spec.id));
        }
        let segment = Arc::new(Segment::from_spec(spec, self.unit)?);
        let id = segment.id().to_string();
        self.order.push(id.clone());
        self.segments.insert(id, Arc::clone(&segment));
        Ok(segment)
    }

    pub fn segment(&self, id: &str) -> Option<&Arc<Segment>> {
        self.segments.get(id)
    }

    /// Segments in load order.
    pub fn segments(&self) -> impl Iterator<Item = &Arc<Segment>> {
        self.order.iter().filter_map(|id| self.segments.get(id))
    }

    /// Resolves an ordered list of segment ids into a race. Fails on the
    /// first id that is not in the catalogue.
    pub fn define_race<S: AsRef<str>>(
        &self,
        id: &str,
        name: &str,
        segment_ids: &[S],
        default_goal: GoalDuration,
    ) -> Result<Race> {
        if segment_ids.is_empty() {
            return Err(CourseError::EmptyRace(id.to_string()));
        }
        let segments = segment_ids
            .iter()
            .map(|segment_id| {
                self.segments
                    .get(segment_id.as_ref())
                    .cloned()
                    .ok_or_else(|| CourseError::UnknownSegment {
                        race: id.to_string(),
                        segment: segment_id.as_ref().to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Race::new(id.to_string(), name.to_string(), segments, default_goal))
    }

    /// Builds a race from its catalogue entry, falling back to
    /// `default_goal` when the entry has none.
    pub fn build_race(&self, spec: &RaceSpec, default_goal: GoalDuration) -> Result<Race> {
        let goal = match spec.default_goal {
            Some(goal) => GoalDuration::try_from(goal).map_err(|source| CourseError::InvalidGoal {
                race: spec.id.clone(),
                source,
            })?,
            None => default_goal,
        };
        let race = self.define_race(&spec.id, &spec.name, &spec.segments, goal)?;
        Ok(race
            .with_features(spec.feature_flags())
            .with_cutoffs(spec.cutoffs.clone()))
    }

    /// Makes a race selectable, replacing any race with the same id.
    pub fn register_race(&mut self, race: Race) -> Arc<Race> {
        let race = Arc::new(race);
        match self.races.iter_mut().find(|r| r.id() == race.id()) {
            Some(existing) => *existing = Arc::clone(&race),
            None => self.races.push(Arc::clone(&race)),
        }
        race
    }

    pub fn race(&self, id: &str) -> Option<Arc<Race>> {
        self.races.iter().find(|r| r.id() == id).cloned()
    }

    /// Selectable races, in catalogue order.
    pub fn races(&self) -> &[Arc<Race>] {
        &self.races
    }

    pub fn is_visible(&self, segment_id: &str) -> bool {
        self.segments.contains_key(segment_id) && !self.hidden.contains(segment_id)
    }

    pub fn set_visible(&mut self, segment_id: &str, visible: bool) {
        if visible {
            self.hidden.remove(segment_id);
        } else if self.segments.contains_key(segment_id) {
            self.hidden.insert(segment_id.to_string());
        }
    }

    /// Flips a segment's visibility and returns the new value.
    pub fn toggle_visibility(&mut self, segment_id: &str) -> bool {
        let visible = !self.is_visible(segment_id);
        self.set_visible(segment_id, visible);
        self.is_visible(segment_id)
    }

    /// Shows exactly the segments used by `race`.
    pub fn show_race(&mut self, race: &Race) {
        let used: BTreeSet<&str> = race.segment_ids().collect();
        self.hidden = self
            .segments
            .keys()
            .filter(|id| !used.contains(id.as_str()))
            .cloned()
            .collect();
    }

    pub fn visible_segments(&self) -> impl Iterator<Item = &Arc<Segment>> {
        self.segments().filter(|s| !self.hidden.contains(s.id()))
    }
}
