//! Playback engine: owns Progress State and advances it while playing.

use std::time::Duration;

use serde::Serialize;

use crate::config::SimulatorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Scrubbing,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not playing; progress untouched.
    Skipped,
    Advanced { progress: f64 },
    /// Progress reached 1 and playback returned to Idle.
    Finished,
    /// Speed is 0, so playback returned to Idle without moving.
    Stalled,
}

#[derive(Debug, Clone)]
pub struct Playback {
    state: PlaybackState,
    progress: f64,
    speed: f64,
    traversal_seconds: f64,
    replay_threshold: f64,
    last_tick: Option<Duration>,
}

impl Playback {
    pub fn new(traversal_seconds: f64, replay_threshold: f64) -> Self {
        let traversal_seconds = if traversal_seconds.is_finite() && traversal_seconds > 0.0 {
            traversal_seconds
        } else {
            tracing::warn!(traversal_seconds, "invalid traversal time, using 30s");
            30.0
        };
        Self {
            state: PlaybackState::Idle,
            progress: 0.0,
            speed: 1.0,
            traversal_seconds,
            replay_threshold,
            last_tick: None,
        }
    }

    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self::new(config.traversal_seconds, config.replay_threshold)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn traversal_seconds(&self) -> f64 {
        self.traversal_seconds
    }

    /// Idle -> Playing. Playing from the finish restarts from 0.
    pub fn play(&mut self, now: Duration) {
        if self.state == PlaybackState::Playing {
            return;
        }
        if self.progress >= self.replay_threshold {
            self.progress = 0.0;
        }
        self.state = PlaybackState::Playing;
        self.last_tick = Some(now);
        tracing::debug!(progress = self.progress, "playback started");
    }

    /// Playing -> Idle.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Idle;
            self.last_tick = None;
            tracing::debug!(progress = self.progress, "playback paused");
        }
    }

    pub fn toggle(&mut self, now: Duration) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play(now);
        }
    }

    /// Pointer down on the scrubber: stops playback and jumps to `fraction`.
    pub fn begin_scrub(&mut self, fraction: f64) {
        self.state = PlaybackState::Scrubbing;
        self.last_tick = None;
        self.set_progress(fraction);
        tracing::debug!(progress = self.progress, "scrub started");
    }

    /// Pointer move while scrubbing. Ignored otherwise.
    pub fn scrub_to(&mut self, fraction: f64) {
        if self.state == PlaybackState::Scrubbing {
            self.set_progress(fraction);
        }
    }

    /// Pointer release.
    pub fn end_scrub(&mut self) {
        if self.state == PlaybackState::Scrubbing {
            self.state = PlaybackState::Idle;
            tracing::debug!(progress = self.progress, "scrub ended");
        }
    }

    /// A complete drag to `fraction` and release.
    pub fn scrub(&mut self, fraction: f64) {
        self.begin_scrub(fraction);
        self.end_scrub();
    }

    /// Negative multipliers are treated as 0.
    pub fn set_speed(&mut self, multiplier: f64) {
        self.speed = if multiplier.is_nan() { 0.0 } else { multiplier.max(0.0) };
        tracing::debug!(speed = self.speed, "speed changed");
    }

    /// Advance by the wall time elapsed since the previous tick.
    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        if !self.is_playing() {
            return TickOutcome::Skipped;
        }
        let dt = match self.last_tick {
            Some(last) => now.saturating_sub(last),
            None => Duration::ZERO,
        };
        self.last_tick = Some(now);
        self.advance(dt.as_secs_f64())
    }

    /// Advance by `dt` seconds while playing.
    pub fn advance(&mut self, dt: f64) -> TickOutcome {
        if !self.is_playing() {
            return TickOutcome::Skipped;
        }
        if self.speed == 0.0 {
            self.state = PlaybackState::Idle;
            self.last_tick = None;
            tracing::debug!(progress = self.progress, "playback stalled at speed 0");
            return TickOutcome::Stalled;
        }
        let step = dt.max(0.0) * self.speed / self.traversal_seconds;
        self.progress = (self.progress + step).min(1.0);
        tracing::trace!(dt, progress = self.progress, "tick");

        if self.progress >= 1.0 {
            self.state = PlaybackState::Idle;
            self.last_tick = None;
            tracing::debug!("playback finished");
            TickOutcome::Finished
        } else {
            TickOutcome::Advanced {
                progress: self.progress,
            }
        }
    }

    /// Back to the start, Idle. Used when the active race changes.
    pub fn reset(&mut self) {
        self.state = PlaybackState::Idle;
        self.progress = 0.0;
        self.last_tick = None;
    }

    fn set_progress(&mut self, fraction: f64) {
        self.progress = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::from_config(&SimulatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_fixed_dt_reaches_finish() {
        let mut playback = Playback::default();
        playback.play(secs(0));
        assert_eq!(playback.tick(secs(15)), TickOutcome::Advanced { progress: 0.5 });
        assert_eq!(playback.progress(), 0.5);
        assert_eq!(playback.tick(secs(30)), TickOutcome::Finished);
        assert_eq!(playback.progress(), 1.0);
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(playback.tick(secs(45)), TickOutcome::Skipped);
    }

    #[test]
    fn test_speed_scales_advance() {
        let mut playback = Playback::default();
        playback.set_speed(10.0);
        playback.play(secs(0));
        playback.advance(1.5);
        assert!((playback.progress() - 0.5).abs() < 1e-12);

        playback.set_speed(-3.0);
        assert_eq!(playback.speed(), 0.0);
        assert_eq!(playback.advance(100.0), TickOutcome::Stalled);
        assert!((playback.progress() - 0.5).abs() < 1e-12);
        assert_eq!(playback.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_play_after_finish_replays() {
        let mut playback = Playback::default();
        playback.scrub(0.9995);
        playback.play(secs(0));
        assert_eq!(playback.progress(), 0.0);

        let mut playback = Playback::default();
        playback.scrub(0.5);
        playback.play(secs(0));
        assert_eq!(playback.progress(), 0.5);
    }

    #[test]
    fn test_scrub_from_any_state() {
        let mut playback = Playback::default();
        playback.play(secs(0));
        playback.tick(secs(3));
        playback.scrub(0.3);
        assert_eq!(playback.progress(), 0.3);
        assert_eq!(playback.state(), PlaybackState::Idle);

        playback.scrub(0.3);
        assert_eq!(playback.progress(), 0.3);
        assert_eq!(playback.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_drag_sequence() {
        let mut playback = Playback::default();
        playback.begin_scrub(1.4);
        assert_eq!(playback.state(), PlaybackState::Scrubbing);
        assert_eq!(playback.progress(), 1.0);
        playback.scrub_to(-0.2);
        assert_eq!(playback.progress(), 0.0);
        assert_eq!(playback.tick(secs(10)), TickOutcome::Skipped);
        playback.end_scrub();
        assert_eq!(playback.state(), PlaybackState::Idle);

        playback.scrub_to(0.7);
        assert_eq!(playback.progress(), 0.0);
    }

    #[test]
    fn test_pause_and_toggle() {
        let mut playback = Playback::default();
        playback.toggle(secs(0));
        assert!(playback.is_playing());
        playback.tick(secs(6));
        playback.toggle(secs(6));
        assert_eq!(playback.state(), PlaybackState::Idle);

        // Time spent paused is not counted
        playback.play(secs(100));
        playback.tick(secs(103));
        assert!((playback.progress() - 0.3).abs() < 1e-12);
    }
}
