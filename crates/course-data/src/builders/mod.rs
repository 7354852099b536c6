//! Fluent builders for fixture courses.

mod scenario;

pub use scenario::{CourseBuilder, RaceBuilder};
