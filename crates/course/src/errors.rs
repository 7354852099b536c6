use thiserror::Error;

use crate::clock::InvalidGoalError;
use crate::distance::DegenerateTrackError;

#[derive(Error, Debug)]
pub enum CourseError {
    #[error("Degenerate track for segment {segment}: {source}")]
    DegenerateTrack {
        segment: String,
        #[source]
        source: DegenerateTrackError,
    },

    #[error("Segment {segment} needs at least 2 track points, got {points}")]
    TooFewPoints { segment: String, points: usize },

    #[error("Segment {segment} has {elevations} elevation samples for {points} track points")]
    ElevationMismatch {
        segment: String,
        points: usize,
        elevations: usize,
    },

    #[error("Segment {segment} has invalid nominal {field}: {value}")]
    InvalidNominal {
        segment: String,
        field: &'static str,
        value: f64,
    },

    #[error("Duplicate segment id: {0}")]
    DuplicateSegment(String),

    #[error("Race {race} references unknown segment {segment}")]
    UnknownSegment { race: String, segment: String },

    #[error("Race {race} has an invalid default goal: {source}")]
    InvalidGoal {
        race: String,
        #[source]
        source: InvalidGoalError,
    },

    #[error("Race {0} has no segments")]
    EmptyRace(String),

    #[error("Unknown race: {0}")]
    UnknownRace(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CourseError>;

impl CourseError {
    /// Returns true for errors that reject a whole segment at load time.
    pub fn is_segment_error(&self) -> bool {
        matches!(
            self,
            CourseError::DegenerateTrack { .. }
                | CourseError::TooFewPoints { .. }
                | CourseError::ElevationMismatch { .. }
                | CourseError::InvalidNominal { .. }
                | CourseError::DuplicateSegment(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CourseError::UnknownSegment {
            race: "50k".to_string(),
            segment: "orange".to_string(),
        };
        assert_eq!(err.to_string(), "Race 50k references unknown segment orange");

        let err = CourseError::DegenerateTrack {
            segment: "blue".to_string(),
            source: DegenerateTrackError { points: 3 },
        };
        assert!(err.to_string().starts_with("Degenerate track for segment blue"));
        assert!(err.is_segment_error());
        assert!(!CourseError::EmptyRace("x".into()).is_segment_error());
    }
}
