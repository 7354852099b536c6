//! Simulator configuration.

use serde::{Deserialize, Serialize};

use crate::clock::GoalDuration;
use crate::elevation::ElevationUnit;

/// Settings shared by every race of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Hour of day (0-24) the race starts.
    pub race_start_hour: f64,

    /// Goal duration used when a race does not declare its own.
    pub default_goal: GoalDuration,

    /// Simulated seconds for one full traversal at 1x speed.
    pub traversal_seconds: f64,

    /// Half-width of the finite-difference window used for grade.
    pub grade_delta: f64,

    /// Unit of the raw elevation samples.
    pub elevation_unit: ElevationUnit,

    /// Labels per race day, e.g. `["Sat", "Sun"]`.
    pub day_labels: Vec<String>,

    /// Playing from at or beyond this progress restarts from 0.
    pub replay_threshold: f64,

    /// Lower bound for an edited goal duration, in hours.
    pub min_goal_hours: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            race_start_hour: 6.0,
            default_goal: GoalDuration::from_hm(4, 0),
            traversal_seconds: 30.0,
            grade_delta: 0.05,
            elevation_unit: ElevationUnit::Meters,
            day_labels: Vec::new(),
            replay_threshold: 0.999,
            min_goal_hours: 0.1,
        }
    }
}

impl SimulatorConfig {
    /// Start hour wrapped into `[0, 24)`.
    pub fn start_hour(&self) -> f64 {
        self.race_start_hour.rem_euclid(24.0)
    }
}
