//! Goal duration, projected time of day, and pace.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, Time};

use crate::config::SimulatorConfig;

const MINUTES_PER_DAY: u64 = 24 * 60;

/// Longest goal a course file may declare.
pub const MAX_GOAL_HOURS: f64 = 1000.0;

/// A declared goal that is not a positive, finite number of hours within
/// [`MAX_GOAL_HOURS`].
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("goal of {hours} hours is out of range")]
pub struct InvalidGoalError {
    pub hours: f64,
}

/// A user-settable total finish time for the active race.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GoalSpec", into = "GoalSpec")]
pub struct GoalDuration {
    duration: Duration,
}

/// Goal as written in a course file: `{ "hours": 8.5 }` or
/// `{ "hours": 2, "minutes": 30 }`. Unvalidated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalSpec {
    pub hours: f64,
    #[serde(default)]
    pub minutes: f64,
}

impl GoalSpec {
    pub fn total_hours(&self) -> f64 {
        self.hours + self.minutes / 60.0
    }
}

impl TryFrom<GoalSpec> for GoalDuration {
    type Error = InvalidGoalError;

    fn try_from(spec: GoalSpec) -> Result<Self, Self::Error> {
        let hours = spec.total_hours();
        if hours.is_finite() && hours > 0.0 && hours <= MAX_GOAL_HOURS {
            Ok(GoalDuration::from_hours(hours))
        } else {
            Err(InvalidGoalError { hours })
        }
    }
}

impl From<GoalDuration> for GoalSpec {
    fn from(goal: GoalDuration) -> Self {
        let (hours, minutes) = goal.split();
        GoalSpec {
            hours: hours as f64,
            minutes: minutes as f64,
        }
    }
}

impl GoalDuration {
    pub fn from_hm(hours: u32, minutes: u32) -> Self {
        Self {
            duration: Duration::hours(hours as i64) + Duration::minutes(minutes as i64),
        }
    }

    /// Clamped to `[0, MAX_GOAL_HOURS]`; non-finite input yields zero.
    pub fn from_hours(hours: f64) -> Self {
        let hours = if hours.is_finite() {
            hours.clamp(0.0, MAX_GOAL_HOURS)
        } else {
            0.0
        };
        Self {
            duration: Duration::seconds_f64(hours * 3600.0),
        }
    }

    /// This goal, or `min_hours` if it is shorter.
    pub fn at_least(self, min_hours: f64) -> Self {
        if self.hours() < min_hours {
            Self::from_hours(min_hours)
        } else {
            self
        }
    }

    /// Goal from the hours/minutes editor, floored at `min_hours`.
    pub fn edited(hours: u32, minutes: u32, min_hours: f64) -> Self {
        Self::from_hm(hours, minutes).at_least(min_hours)
    }

    pub fn hours(&self) -> f64 {
        self.duration.as_seconds_f64() / 3600.0
    }

    pub fn as_duration(&self) -> Duration {
        self.duration
    }

    /// Whole hours and rounded minutes, for populating the editor.
    pub fn split(&self) -> (u32, u32) {
        let total = (self.hours() * 60.0).round() as u64;
        ((total / 60) as u32, (total % 60) as u32)
    }
}

/// How a fractional minute is resolved when projecting a clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinuteRounding {
    Floor,
    Nearest,
}

/// A projected time of day, with the number of day boundaries crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectedTime {
    pub minute_of_day: u32,
    pub day_offset: u32,
}

impl ProjectedTime {
    /// Projects `start_hour + elapsed_hours` onto a 24h clock.
    pub fn project(start_hour: f64, elapsed_hours: f64, rounding: MinuteRounding) -> Self {
        let total = (start_hour + elapsed_hours).max(0.0) * 60.0;
        let minutes = match rounding {
            // Guard against 7.9999999h flooring to 7:59.
            MinuteRounding::Floor => (total + 1e-6).floor(),
            MinuteRounding::Nearest => total.round(),
        } as u64;

        Self {
            minute_of_day: (minutes % MINUTES_PER_DAY) as u32,
            day_offset: (minutes / MINUTES_PER_DAY) as u32,
        }
    }

    pub fn hour(&self) -> u8 {
        (self.minute_of_day / 60) as u8
    }

    pub fn minute(&self) -> u8 {
        (self.minute_of_day % 60) as u8
    }

    pub fn time_of_day(&self) -> Time {
        Time::from_hms(self.hour(), self.minute(), 0).unwrap_or(Time::MIDNIGHT)
    }

    pub fn is_next_day(&self) -> bool {
        self.day_offset > 0
    }

    /// `h:mm AM|PM`, followed by a day label or day-boundary indicator.
    pub fn label(&self, day_labels: &[String]) -> String {
        let time = self.time_of_day();
        let hour = time.hour();
        let period = if hour >= 12 { "PM" } else { "AM" };
        let display_hour = match hour {
            0 => 12,
            h if h > 12 => h - 12,
            h => h,
        };
        let mut out = format!("{display_hour}:{:02} {period}", time.minute());

        if let Some(day) = day_labels.get(self.day_offset as usize) {
            out.push(' ');
            out.push_str(day);
        } else {
            match self.day_offset {
                0 => {}
                1 => out.push_str(" (next day)"),
                n => out.push_str(&format!(" (+{n} days)")),
            }
        }
        out
    }
}

/// Average pace over the goal, in minutes and seconds per distance unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pace {
    pub minutes: u32,
    pub seconds: u32,
}

impl Pace {
    pub fn from_goal(goal: &GoalDuration, total_distance: f64) -> Option<Self> {
        if total_distance <= 0.0 {
            return None;
        }
        let seconds = (goal.hours() * 3600.0 / total_distance).round() as u64;
        Some(Self {
            minutes: (seconds / 60) as u32,
            seconds: (seconds % 60) as u32,
        })
    }

    pub fn label(&self) -> String {
        format!("{}:{:02} /mi", self.minutes, self.seconds)
    }
}

/// Current and finish clock projections for one progress value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockReading {
    pub elapsed_hours: f64,
    pub current: ProjectedTime,
    pub finish: ProjectedTime,
    pub current_label: String,
    pub finish_label: String,
}

impl ClockReading {
    /// Elapsed time is `progress * goal`; progress is clamped to `[0, 1]`.
    pub fn at(progress: f64, goal: &GoalDuration, config: &SimulatorConfig) -> Self {
        let start = config.start_hour();
        let elapsed_hours = progress.clamp(0.0, 1.0) * goal.hours();
        let current = ProjectedTime::project(start, elapsed_hours, MinuteRounding::Floor);
        let finish = ProjectedTime::project(start, goal.hours(), MinuteRounding::Nearest);

        Self {
            elapsed_hours,
            current,
            finish,
            current_label: current.label(&config.day_labels),
            finish_label: finish.label(&config.day_labels),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_split_and_edit() {
        let goal = GoalDuration::from_hours(8.5);
        assert_eq!(goal.split(), (8, 30));

        let goal = GoalDuration::from_hours(2.0 + 59.7 / 60.0);
        assert_eq!(goal.split(), (3, 0));

        let tiny = GoalDuration::edited(0, 0, 0.1);
        assert!((tiny.hours() - 0.1).abs() < 1e-9);

        let goal = GoalDuration::edited(2, 30, 0.1);
        assert!((goal.hours() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_goal_serde() {
        let goal: GoalDuration = serde_json::from_str(r#"{ "hours": 2, "minutes": 30 }"#).unwrap();
        assert!((goal.hours() - 2.5).abs() < 1e-9);

        let goal: GoalDuration = serde_json::from_str(r#"{ "hours": 8.5 }"#).unwrap();
        assert_eq!(goal.split(), (8, 30));

        let json = serde_json::to_string(&GoalDuration::from_hm(30, 0)).unwrap();
        assert_eq!(json, r#"{"hours":30.0,"minutes":0.0}"#);
    }

    #[test]
    fn test_goal_spec_rejects_out_of_range_hours() {
        for hours in [1e300, -3.0, 0.0, f64::NAN] {
            let spec = GoalSpec { hours, minutes: 0.0 };
            assert!(GoalDuration::try_from(spec).is_err(), "{hours} accepted");
        }
        let ok = GoalDuration::try_from(GoalSpec { hours: 0.0, minutes: 45.0 }).unwrap();
        assert!((ok.hours() - 0.75).abs() < 1e-9);

        assert!(serde_json::from_str::<GoalDuration>(r#"{ "hours": 1e300 }"#).is_err());
        assert_eq!(GoalDuration::from_hours(1e300).hours(), MAX_GOAL_HOURS);
        assert_eq!(GoalDuration::from_hours(-3.0).at_least(0.1), GoalDuration::from_hours(0.1));
    }

    #[test]
    fn test_projection_wraps_past_midnight() {
        let t = ProjectedTime::project(6.0, 30.0, MinuteRounding::Nearest);
        assert_eq!(t.hour(), 12);
        assert_eq!(t.minute(), 0);
        assert_eq!(t.day_offset, 1);
        assert!(t.is_next_day());

        let t = ProjectedTime::project(6.0, 17.99, MinuteRounding::Floor);
        assert_eq!(t.day_offset, 0);
        assert_eq!(t.hour(), 23);
    }

    #[test]
    fn test_labels() {
        let t = ProjectedTime::project(6.0, 0.0, MinuteRounding::Floor);
        assert_eq!(t.label(&[]), "6:00 AM");

        let t = ProjectedTime::project(0.0, 0.25, MinuteRounding::Floor);
        assert_eq!(t.label(&[]), "12:15 AM");

        let t = ProjectedTime::project(12.0, 1.5, MinuteRounding::Floor);
        assert_eq!(t.label(&[]), "1:30 PM");

        let days = vec!["Sat".to_string(), "Sun".to_string()];
        let t = ProjectedTime::project(6.0, 24.0, MinuteRounding::Floor);
        assert_eq!(t.label(&days), "6:00 AM Sun");
        assert_eq!(t.label(&[]), "6:00 AM (next day)");

        let t = ProjectedTime::project(6.0, 50.0, MinuteRounding::Floor);
        assert_eq!(t.label(&days), "8:00 AM (+2 days)");
    }

    #[test]
    fn test_pace() {
        let pace = Pace::from_goal(&GoalDuration::from_hm(2, 30), 15.5).unwrap();
        // 150 min / 15.5 mi = 9.677 min/mi = 9:41
        assert_eq!(pace, Pace { minutes: 9, seconds: 41 });
        assert_eq!(pace.label(), "9:41 /mi");
        assert!(Pace::from_goal(&GoalDuration::from_hm(1, 0), 0.0).is_none());
    }

    #[test]
    fn test_clock_reading() {
        let config = SimulatorConfig {
            race_start_hour: 5.0,
            ..Default::default()
        };
        let goal = GoalDuration::from_hm(2, 30);

        let reading = ClockReading::at(0.5, &goal, &config);
        assert!((reading.elapsed_hours - 1.25).abs() < 1e-9);
        assert_eq!(reading.current_label, "6:15 AM");
        assert_eq!(reading.finish_label, "7:30 AM");

        let reading = ClockReading::at(2.0, &goal, &config);
        assert_eq!(reading.current, reading.finish);
    }
}
