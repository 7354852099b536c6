//! The simulation context owned by the host view.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::catalogue::SegmentCatalogue;
use crate::clock::{ClockReading, GoalDuration, Pace};
use crate::config::SimulatorConfig;
use crate::errors::{CourseError, Result};
use crate::interpolate::{OccurrenceProgress, RaceState};
use crate::playback::{Playback, PlaybackState, TickOutcome};
use crate::race::Race;

/// Everything renderers need for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    pub race_id: String,
    pub race_name: String,
    pub playback: PlaybackState,
    pub speed: f64,
    pub progress: f64,
    pub state: RaceState,
    pub clock: ClockReading,
    pub goal_hours: f64,
    pub pace: Option<String>,
    pub tracker: Vec<OccurrenceProgress>,
}

/// Active race, Progress State, playback and goal for one simulator view.
///
/// The race and progress only change together through [`activate_race`],
/// so no reader can observe a new race paired with a stale progress.
///
/// [`activate_race`]: SimulationContext::activate_race
#[derive(Debug, Clone)]
pub struct SimulationContext {
    race: Arc<Race>,
    playback: Playback,
    goal: GoalDuration,
    config: SimulatorConfig,
}

impl SimulationContext {
    pub fn new(race: Arc<Race>, config: SimulatorConfig) -> Self {
        let goal = race.default_goal().at_least(config.min_goal_hours);
        Self {
            playback: Playback::from_config(&config),
            race,
            goal,
            config,
        }
    }

    pub fn race(&self) -> &Arc<Race> {
        &self.race
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn progress(&self) -> f64 {
        self.playback.progress()
    }

    pub fn goal(&self) -> GoalDuration {
        self.goal
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// Swaps the active race, rewinds to the start, stops playback and
    /// restores the race's default goal.
    pub fn activate_race(&mut self, race: Arc<Race>) {
        tracing::debug!(from = %self.race.id(), to = %race.id(), "activating race");
        self.race = race;
        self.playback.reset();
        self.goal = self.race.default_goal().at_least(self.config.min_goal_hours);
    }

    /// Activates a race from the catalogue. An unknown id leaves the current
    /// race and progress untouched.
    pub fn select_race(&mut self, catalogue: &SegmentCatalogue, id: &str) -> Result<()> {
        let race = catalogue
            .race(id)
            .ok_or_else(|| CourseError::UnknownRace(id.to_string()))?;
        self.activate_race(race);
        Ok(())
    }

    /// Goal from the hours/minutes editor. Progress is unaffected.
    pub fn set_goal(&mut self, hours: u32, minutes: u32) {
        self.goal = GoalDuration::edited(hours, minutes, self.config.min_goal_hours);
    }

    pub fn set_goal_duration(&mut self, goal: GoalDuration) {
        self.goal = goal.at_least(self.config.min_goal_hours);
    }

    pub fn play(&mut self, now: Duration) {
        self.playback.play(now);
    }

    pub fn pause(&mut self) {
        self.playback.pause();
    }

    pub fn toggle(&mut self, now: Duration) {
        self.playback.toggle(now);
    }

    pub fn set_speed(&mut self, multiplier: f64) {
        self.playback.set_speed(multiplier);
    }

    pub fn scrub(&mut self, fraction: f64) {
        self.playback.scrub(fraction);
    }

    pub fn begin_scrub(&mut self, fraction: f64) {
        self.playback.begin_scrub(fraction);
    }

    pub fn scrub_to(&mut self, fraction: f64) {
        self.playback.scrub_to(fraction);
    }

    pub fn end_scrub(&mut self) {
        self.playback.end_scrub();
    }

    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        self.playback.tick(now)
    }

    pub fn advance(&mut self, dt: f64) -> TickOutcome {
        self.playback.advance(dt)
    }

    pub fn state(&self) -> RaceState {
        self.race
            .state_at_with_delta(self.progress(), self.config.grade_delta)
    }

    pub fn clock(&self) -> ClockReading {
        ClockReading::at(self.progress(), &self.goal, &self.config)
    }

    pub fn pace(&self) -> Option<Pace> {
        Pace::from_goal(&self.goal, self.race.total_distance())
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        let state = self.state();
        let tracker = self.race.occurrence_progress(state.distance);
        SimulationSnapshot {
            race_id: self.race.id().to_string(),
            race_name: self.race.name().to_string(),
            playback: self.playback.state(),
            speed: self.playback.speed(),
            progress: self.progress(),
            clock: self.clock(),
            goal_hours: self.goal.hours(),
            pace: self.pace().map(|p| p.label()),
            tracker,
            state,
        }
    }
}
