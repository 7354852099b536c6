//! Course simulator core.
//!
//! Segments are loaded once from geometry, their raw path lengths rescaled to
//! the published distance. Races are ordered sequences of segment
//! occurrences. A [`SimulationContext`](session::SimulationContext) holds the
//! active race and its playback, and answers "where is the runner at this
//! fraction of the race" for renderers.
//!
//! ```rust,ignore
//! use course::prelude::*;
//!
//! let loaded = SegmentCatalogue::from_path("course.json")?;
//! let race = loaded.catalogue.race("50k").unwrap();
//! let mut ctx = SimulationContext::new(race, loaded.config);
//!
//! let clock = ManualClock::default();
//! ctx.play(clock.now());
//! let mut frames = FixedStepFrames::new(clock.now(), Duration::from_millis(16));
//! Scheduler::new().run(&mut ctx, &mut frames, |snap| println!("{}", snap.clock.current_label));
//! ```

pub mod catalogue;
pub mod clock;
pub mod config;
pub mod distance;
pub mod elevation;
pub mod errors;
pub mod interpolate;
pub mod models;
pub mod playback;
pub mod race;
pub mod scheduler;
pub mod segment;
pub mod session;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::catalogue::{LoadedCourse, SegmentCatalogue};
    pub use crate::clock::{
        ClockReading, GoalDuration, GoalSpec, InvalidGoalError, Pace, ProjectedTime,
    };
    pub use crate::config::SimulatorConfig;
    pub use crate::distance::{DegenerateTrackError, DistanceTable};
    pub use crate::elevation::{ElevationProfile, ElevationUnit};
    pub use crate::errors::{CourseError, Result};
    pub use crate::interpolate::{
        GradeTrend, OccurrenceProgress, OccurrenceStatus, RaceProfilePoint, RaceState, SegmentQuery,
        SegmentState,
    };
    pub use crate::models::{
        AidStation, CourseFeature, CourseFeatures, CourseSpec, Cutoff, RaceSpec, SegmentSpec,
    };
    pub use crate::playback::{Playback, PlaybackState, TickOutcome};
    pub use crate::race::{CutoffMarker, Occurrence, Race};
    pub use crate::scheduler::{
        ClockFrames, FixedStepFrames, FrameSource, ManualClock, Scheduler, SystemClock,
        TimeSource,
    };
    pub use crate::segment::{MileMarker, PlacedAidStation, Segment};
    pub use crate::session::{SimulationContext, SimulationSnapshot};
}
