//! Progress interpolation: position, elevation, grade and climb at any point
//! of a race.
//!
//! Grade is a symmetric finite difference and climb-to-date assumes climb is
//! spread evenly along each segment. Both are approximations of the true
//! point-by-point values over noisy elevation data.

use geo::Coord;
use serde::{Serialize, Serializer};

use crate::race::{BOUNDARY_EPSILON, Race};
use crate::segment::{MileMarker, Segment};

pub const FEET_PER_MILE: f64 = 5280.0;

/// Default half-width of the grade window, in distance units.
pub const DEFAULT_GRADE_DELTA: f64 = 0.05;

/// Grade above which the runner is climbing (and below the negative of which
/// descending), in percent.
const TREND_THRESHOLD: f64 = 2.0;

fn serialize_coord<S: Serializer>(coord: &Coord<f64>, s: S) -> Result<S::Ok, S::Error> {
    [coord.x, coord.y].serialize(s)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeTrend {
    Climbing,
    Descending,
    Rolling,
}

impl GradeTrend {
    pub fn from_grade(grade: f64) -> Self {
        if grade > TREND_THRESHOLD {
            GradeTrend::Climbing
        } else if grade < -TREND_THRESHOLD {
            GradeTrend::Descending
        } else {
            GradeTrend::Rolling
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GradeTrend::Climbing => "Climbing",
            GradeTrend::Descending => "Descending",
            GradeTrend::Rolling => "Rolling",
        }
    }
}

/// Snapshot of the virtual runner at one point of a race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceState {
    pub progress: f64,
    pub distance: f64,
    #[serde(serialize_with = "serialize_coord")]
    pub coordinate: Coord<f64>,
    /// Feet.
    pub elevation: f64,
    /// Percent.
    pub grade: f64,
    pub trend: GradeTrend,
    /// Feet.
    pub climb_to_date: f64,
    pub segment_id: String,
    pub segment_occurrence_index: usize,
    /// Distance into the current occurrence.
    pub local_distance: f64,
    pub lap: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OccurrenceStatus {
    Done,
    Active { percent: u32 },
    Pending,
}

/// One row of the occurrence tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccurrenceProgress {
    pub index: usize,
    pub segment_id: String,
    pub label: String,
    pub lap: u32,
    pub start_distance: f64,
    pub end_distance: f64,
    #[serde(flatten)]
    pub status: OccurrenceStatus,
}

/// Clamps progress into `[0, 1]`. NaN means an upstream invariant broke.
fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        tracing::error!("progress is NaN; treating as 0");
        debug_assert!(!progress.is_nan(), "progress is NaN");
        return 0.0;
    }
    progress.clamp(0.0, 1.0)
}

fn grade_between(e1: f64, e2: f64, d1: f64, d2: f64) -> f64 {
    let span_feet = (d2 - d1) * FEET_PER_MILE;
    if span_feet > 0.0 {
        (e2 - e1) / span_feet * 100.0
    } else {
        0.0
    }
}

impl Race {
    /// State at a progress fraction, using the default grade window.
    pub fn state_at(&self, progress: f64) -> RaceState {
        self.state_at_with_delta(progress, DEFAULT_GRADE_DELTA)
    }

    pub fn state_at_with_delta(&self, progress: f64, grade_delta: f64) -> RaceState {
        let progress = clamp_progress(progress);
        let distance = progress * self.total_distance();
        let mut state = self.state_at_distance(distance, grade_delta);
        state.progress = progress;
        state
    }

    /// State at a race distance, clamped to `[0, total_distance]`.
    pub fn state_at_distance(&self, distance: f64, grade_delta: f64) -> RaceState {
        let total = self.total_distance();
        let distance = distance.clamp(0.0, total);
        let occurrence = self.occurrence_at(distance);
        let local = (distance - occurrence.start_distance).clamp(0.0, occurrence.distance());
        let point = occurrence.segment.point_at(local);
        let grade = self.grade_at(distance, grade_delta);

        RaceState {
            progress: distance / total,
            distance,
            coordinate: point.coord,
            elevation: point.elevation,
            grade,
            trend: GradeTrend::from_grade(grade),
            climb_to_date: self.climb_to_date(distance),
            segment_id: occurrence.segment.id().to_string(),
            segment_occurrence_index: occurrence.index,
            local_distance: local,
            lap: occurrence.lap,
        }
    }

    /// Elevation in feet at a race distance.
    pub fn elevation_at(&self, distance: f64) -> f64 {
        let distance = distance.clamp(0.0, self.total_distance());
        let occurrence = self.occurrence_at(distance);
        occurrence
            .segment
            .elevation_at(distance - occurrence.start_distance)
    }

    /// Grade in percent from elevations at `distance ± delta`, both ends
    /// clamped to the race.
    pub fn grade_at(&self, distance: f64, delta: f64) -> f64 {
        let d1 = (distance - delta).max(0.0);
        let d2 = (distance + delta).min(self.total_distance());
        grade_between(self.elevation_at(d1), self.elevation_at(d2), d1, d2)
    }

    /// Completed occurrences' climb plus a linear share of the current one.
    pub fn climb_to_date(&self, distance: f64) -> f64 {
        let distance = distance.clamp(0.0, self.total_distance());
        let occurrence = self.occurrence_at(distance);
        let local = (distance - occurrence.start_distance).clamp(0.0, occurrence.distance());
        occurrence.start_climb
            + occurrence.segment.nominal_climb() * (local / occurrence.distance())
    }

    /// Map position at a race distance.
    pub fn coord_at(&self, distance: f64) -> Coord<f64> {
        let distance = distance.clamp(0.0, self.total_distance());
        let occurrence = self.occurrence_at(distance);
        let local = (distance - occurrence.start_distance).clamp(0.0, occurrence.distance());
        occurrence.segment.coord_at(local)
    }

    /// Every occurrence's elevation profile laid end to end, in race
    /// distance. Joints appear twice, once per occurrence.
    pub fn profile(&self) -> Vec<RaceProfilePoint> {
        self.occurrences()
            .iter()
            .flat_map(|o| {
                o.segment.profile().points().iter().map(move |p| RaceProfilePoint {
                    distance: o.start_distance + p.distance,
                    elevation: p.elevation,
                    segment_id: o.segment.id().to_string(),
                    occurrence_index: o.index,
                })
            })
            .collect()
    }

    /// One marker per whole distance unit along the race.
    pub fn mile_markers(&self) -> Vec<MileMarker> {
        let count = self.total_distance().floor() as u32;
        (1..=count)
            .map(|mile| MileMarker {
                mile,
                coord: self.coord_at(mile as f64),
                major: mile % 5 == 0,
            })
            .collect()
    }

    /// Per-occurrence status for the occurrence tracker.
    pub fn occurrence_progress(&self, distance: f64) -> Vec<OccurrenceProgress> {
        let current = self.occurrence_at(distance).index;
        self.occurrences()
            .iter()
            .map(|o| {
                let status = if distance > o.end_distance() + crate::race::BOUNDARY_EPSILON {
                    OccurrenceStatus::Done
                } else if o.index == current {
                    let share = ((distance - o.start_distance) / o.distance()).clamp(0.0, 1.0);
                    OccurrenceStatus::Active {
                        percent: (share * 100.0).round() as u32,
                    }
                } else {
                    OccurrenceStatus::Pending
                };
                OccurrenceProgress {
                    index: o.index,
                    segment_id: o.segment.id().to_string(),
                    label: o.segment.label().to_string(),
                    lap: o.lap,
                    start_distance: o.start_distance,
                    end_distance: o.end_distance(),
                    status,
                }
            })
            .collect()
    }
}

/// A sample of the race-wide elevation profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceProfilePoint {
    /// Race distance.
    pub distance: f64,
    /// Feet.
    pub elevation: f64,
    pub segment_id: String,
    pub occurrence_index: usize,
}

/// State on a single-segment course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentState {
    pub distance: f64,
    #[serde(serialize_with = "serialize_coord")]
    pub coordinate: Coord<f64>,
    pub elevation: f64,
    pub grade: f64,
    pub climb_to_date: f64,
    pub lap: u32,
}

/// Distance queries straight against one segment's tables, without a race.
///
/// With `laps > 1` the course is that many laps of the same loop and
/// distances wrap onto the loop.
#[derive(Debug, Clone, Copy)]
pub struct SegmentQuery<'a> {
    segment: &'a Segment,
    laps: u32,
    grade_delta: f64,
}

impl<'a> SegmentQuery<'a> {
    pub fn new(segment: &'a Segment) -> Self {
        Self {
            segment,
            laps: 1,
            grade_delta: DEFAULT_GRADE_DELTA,
        }
    }

    pub fn with_laps(mut self, laps: u32) -> Self {
        self.laps = laps.max(1);
        self
    }

    pub fn with_grade_delta(mut self, delta: f64) -> Self {
        self.grade_delta = delta;
        self
    }

    pub fn total_distance(&self) -> f64 {
        self.segment.nominal_distance() * self.laps as f64
    }

    pub fn total_climb(&self) -> f64 {
        self.segment.nominal_climb() * self.laps as f64
    }

    /// 1-based lap owning a course distance. An exact lap boundary belongs to
    /// the earlier lap, as occurrence boundaries do in a race.
    pub fn lap_at(&self, distance: f64) -> u32 {
        let loop_distance = self.segment.nominal_distance();
        let completed = ((distance - BOUNDARY_EPSILON) / loop_distance).floor().max(0.0);
        (completed as u32 + 1).min(self.laps)
    }

    /// Course distance mapped onto the owning lap of the loop.
    fn local(&self, distance: f64) -> f64 {
        let loop_distance = self.segment.nominal_distance();
        let distance = distance.clamp(0.0, self.total_distance());
        let before = (self.lap_at(distance) - 1) as f64 * loop_distance;
        (distance - before).clamp(0.0, loop_distance)
    }

    pub fn elevation_at(&self, distance: f64) -> f64 {
        self.segment.elevation_at(self.local(distance))
    }

    pub fn coord_at(&self, distance: f64) -> Coord<f64> {
        self.segment.coord_at(self.local(distance))
    }

    pub fn grade_at(&self, distance: f64) -> f64 {
        let d1 = (distance - self.grade_delta).max(0.0);
        let d2 = (distance + self.grade_delta).min(self.total_distance());
        grade_between(self.elevation_at(d1), self.elevation_at(d2), d1, d2)
    }

    pub fn state_at_distance(&self, distance: f64) -> SegmentState {
        let total = self.total_distance();
        let distance = distance.clamp(0.0, total);
        let lap = self.lap_at(distance);

        SegmentState {
            distance,
            coordinate: self.coord_at(distance),
            elevation: self.elevation_at(distance),
            grade: self.grade_at(distance),
            climb_to_date: distance / total * self.total_climb(),
            lap,
        }
    }
}
