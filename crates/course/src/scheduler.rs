//! Frame-driven scheduling with injectable time.
//!
//! The host supplies frame timestamps; the scheduler ticks the context once
//! per frame for as long as it is playing. Nothing here blocks or spawns.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::session::{SimulationContext, SimulationSnapshot};

/// A monotonic clock.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Wall-clock time since construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new(start: Duration) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Source of frame timestamps. `None` means the host stopped delivering
/// frames.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Duration>;
}

/// Evenly spaced frames, optionally limited in number.
#[derive(Debug, Clone)]
pub struct FixedStepFrames {
    next: Duration,
    step: Duration,
    remaining: Option<usize>,
}

impl FixedStepFrames {
    /// First frame is at `start + step`.
    pub fn new(start: Duration, step: Duration) -> Self {
        Self {
            next: start + step,
            step,
            remaining: None,
        }
    }

    pub fn limit(mut self, frames: usize) -> Self {
        self.remaining = Some(frames);
        self
    }
}

impl FrameSource for FixedStepFrames {
    fn next_frame(&mut self) -> Option<Duration> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        let frame = self.next;
        self.next += self.step;
        Some(frame)
    }
}

/// Frames taken from a [`TimeSource`] each time one is requested.
#[derive(Debug)]
pub struct ClockFrames<'a, T: TimeSource> {
    clock: &'a T,
}

impl<'a, T: TimeSource> ClockFrames<'a, T> {
    pub fn new(clock: &'a T) -> Self {
        Self { clock }
    }
}

impl<T: TimeSource> FrameSource for ClockFrames<'_, T> {
    fn next_frame(&mut self) -> Option<Duration> {
        Some(self.clock.now())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler {
    max_frames: Option<usize>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops after this many frames even if still playing (e.g. speed 0).
    pub fn with_max_frames(mut self, frames: usize) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Ticks `ctx` once per frame while it is playing, handing each frame's
    /// snapshot to `on_frame`. Returns the number of frames run.
    pub fn run<F, C>(&self, ctx: &mut SimulationContext, frames: &mut F, mut on_frame: C) -> usize
    where
        F: FrameSource,
        C: FnMut(&SimulationSnapshot),
    {
        let mut count = 0;
        while ctx.is_playing() {
            if self.max_frames.is_some_and(|max| count >= max) {
                break;
            }
            let Some(now) = frames.next_frame() else {
                tracing::debug!(frames = count, "frame source closed");
                break;
            };
            ctx.tick(now);
            count += 1;
            on_frame(&ctx.snapshot());
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalogue::SegmentCatalogue;
    use crate::clock::GoalDuration;
    use crate::config::SimulatorConfig;
    use crate::elevation::ElevationUnit;
    use crate::segment::tests::straight_spec;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(Duration::from_secs(5));
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now(), Duration::from_millis(5250));
        clock.set(Duration::ZERO);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn test_fixed_step_frames() {
        let mut frames = FixedStepFrames::new(Duration::ZERO, Duration::from_secs(15)).limit(2);
        assert_eq!(frames.next_frame(), Some(Duration::from_secs(15)));
        assert_eq!(frames.next_frame(), Some(Duration::from_secs(30)));
        assert_eq!(frames.next_frame(), None);
    }

    #[test]
    fn test_zero_speed_ends_unbounded_run() {
        let mut catalogue = SegmentCatalogue::new(ElevationUnit::Feet);
        catalogue.insert_segment(straight_spec("a", 5.0, 500.0, 6)).unwrap();
        let race = catalogue
            .define_race("a", "A", &["a"], GoalDuration::from_hm(1, 0))
            .unwrap();
        let mut ctx = SimulationContext::new(Arc::new(race), SimulatorConfig::default());
        ctx.set_speed(0.0);
        ctx.play(Duration::ZERO);

        let mut frames = FixedStepFrames::new(Duration::ZERO, Duration::from_millis(16));
        let ran = Scheduler::new().run(&mut ctx, &mut frames, |_| {});
        assert_eq!(ran, 1);
        assert_eq!(ctx.progress(), 0.0);
        assert!(!ctx.is_playing());
    }

    #[test]
    fn test_clock_frames_follow_clock() {
        let clock = ManualClock::default();
        let mut frames = ClockFrames::new(&clock);
        clock.advance(Duration::from_secs(2));
        assert_eq!(frames.next_frame(), Some(Duration::from_secs(2)));
    }
}
