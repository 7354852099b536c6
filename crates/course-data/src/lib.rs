//! Geometry loading and fixture courses for the course simulator.
//!
//! Segments can come from GPX files or be generated procedurally with
//! Perlin-noise terrain. [`CourseBuilder`](builders::CourseBuilder) assembles
//! them into a course file with its races.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use course_data::prelude::*;
//!
//! let loaded = CourseBuilder::desert_loops(42).build_catalogue();
//! let race = loaded.catalogue.race("100k").unwrap();
//! let ctx = SimulationContext::new(race, loaded.config);
//! ```

pub mod builders;
pub mod config;
pub mod sources;
pub mod terrain;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::builders::{CourseBuilder, RaceBuilder};
    pub use crate::config::{BoundingBox, Region};
    pub use crate::sources::{
        GpxError, GpxLoader, GpxTrack, ProceduralGenerator, RoutePattern, SegmentConfig,
        climb_feet,
    };
    pub use crate::terrain::ElevationGenerator;
    pub use course::prelude::*;
}
