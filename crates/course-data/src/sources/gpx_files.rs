//! GPX file loading.

use std::path::Path;

use course::models::SegmentSpec;
use geo::{Coord, Distance as _, Haversine, Point};
use gpx::{Gpx, read};
use thiserror::Error;

use crate::sources::climb_feet;

const METERS_PER_MILE: f64 = 1609.344;

#[derive(Debug, Error)]
pub enum GpxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("GPX parse error: {0}")]
    Parse(#[from] gpx::errors::GpxError),
    #[error("No tracks found in GPX file")]
    NoTracks,
    #[error("No track points found")]
    NoPoints,
    #[error("Track point {index} has no elevation")]
    MissingElevation { index: usize },
}

/// Track geometry read from a GPX file, elevations in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct GpxTrack {
    pub name: Option<String>,
    pub coords: Vec<Coord<f64>>,
    pub elevations: Vec<f64>,
}

impl GpxTrack {
    /// Great-circle length of the recorded path.
    pub fn length_miles(&self) -> f64 {
        self.coords
            .windows(2)
            .map(|w| Haversine.distance(Point::from(w[0]), Point::from(w[1])))
            .sum::<f64>()
            / METERS_PER_MILE
    }

    pub fn climb_feet(&self) -> f64 {
        climb_feet(&self.elevations)
    }

    /// A segment spec whose nominal distance and climb come from the track
    /// itself. Callers with published figures should overwrite them.
    pub fn into_segment_spec(self, id: &str, label: &str, color: &str) -> SegmentSpec {
        let nominal_distance = self.length_miles();
        let nominal_climb = self.climb_feet().round();
        SegmentSpec {
            id: id.to_string(),
            label: label.to_string(),
            abbr: None,
            color: color.to_string(),
            pattern: None,
            nominal_distance,
            nominal_climb,
            coordinates: self.coords.iter().map(|c| [c.x, c.y]).collect(),
            elevations: self.elevations,
            aid_stations: Vec::new(),
        }
    }
}

/// Loads segment geometry from GPX files.
pub struct GpxLoader;

impl GpxLoader {
    /// Loads every point of every track and track segment in the file, in
    /// order, as one track.
    pub fn load_file(path: impl AsRef<Path>) -> Result<GpxTrack, GpxError> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let gpx: Gpx = read(reader)?;

        Self::extract_track(&gpx)
    }

    pub fn load_bytes(data: &[u8]) -> Result<GpxTrack, GpxError> {
        let reader = std::io::Cursor::new(data);
        let gpx: Gpx = read(reader)?;

        Self::extract_track(&gpx)
    }

    fn extract_track(gpx: &Gpx) -> Result<GpxTrack, GpxError> {
        if gpx.tracks.is_empty() {
            return Err(GpxError::NoTracks);
        }

        let mut coords = Vec::new();
        let mut elevations = Vec::new();

        for track in &gpx.tracks {
            for segment in &track.segments {
                for waypoint in &segment.points {
                    let elevation = waypoint.elevation.ok_or(GpxError::MissingElevation {
                        index: coords.len(),
                    })?;
                    let point = waypoint.point();
                    coords.push(Coord {
                        x: point.x(),
                        y: point.y(),
                    });
                    elevations.push(elevation);
                }
            }
        }

        if coords.is_empty() {
            return Err(GpxError::NoPoints);
        }

        tracing::debug!(points = coords.len(), "loaded gpx track");

        Ok(GpxTrack {
            name: gpx.tracks[0].name.clone(),
            coords,
            elevations,
        })
    }

    /// Writes a segment's geometry as a single-track GPX file.
    ///
    /// Elevations are written as stored in the spec.
    pub fn write_file(path: impl AsRef<Path>, spec: &SegmentSpec) -> Result<(), GpxError> {
        use gpx::{GpxVersion, Track, TrackSegment, Waypoint};

        let points: Vec<Waypoint> = spec
            .coordinates
            .iter()
            .zip(&spec.elevations)
            .map(|([lon, lat], elevation)| {
                let mut wp = Waypoint::new(Point::new(*lon, *lat));
                wp.elevation = Some(*elevation);
                wp
            })
            .collect();

        let mut track = Track::new();
        track.name = Some(spec.label.clone());
        track.segments = vec![TrackSegment { points }];

        let gpx = Gpx {
            version: GpxVersion::Gpx11,
            tracks: vec![track],
            ..Default::default()
        };

        let file = std::fs::File::create(path)?;
        gpx::write(&gpx, file)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="course-data" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Pemberton</name>
    <trkseg>
      <trkpt lat="33.7000" lon="-111.7000"><ele>700.0</ele></trkpt>
      <trkpt lat="33.7100" lon="-111.7000"><ele>712.5</ele></trkpt>
      <trkpt lat="33.7200" lon="-111.7000"><ele>705.0</ele></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_load_bytes() {
        let track = GpxLoader::load_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(track.name.as_deref(), Some("Pemberton"));
        assert_eq!(track.coords.len(), 3);
        assert_eq!(track.coords[0], Coord { x: -111.7, y: 33.7 });

        // 0.02 degrees of latitude is about 1.38 miles
        let miles = track.length_miles();
        assert!((miles - 1.382).abs() < 0.01, "miles {miles}");
        assert!((track.climb_feet() - 12.5 * 3.28084).abs() < 1e-9);
    }

    #[test]
    fn test_missing_elevation() {
        let gpx = SAMPLE.replace("<ele>712.5</ele>", "");
        let err = GpxLoader::load_bytes(gpx.as_bytes()).unwrap_err();
        assert!(matches!(err, GpxError::MissingElevation { index: 1 }));
    }

    #[test]
    fn test_write_then_load_as_segment() {
        let spec = GpxLoader::load_bytes(SAMPLE.as_bytes())
            .unwrap()
            .into_segment_spec("pemberton", "Pemberton Trail", "#FF8C00");
        assert_eq!(spec.nominal_climb, 41.0);

        let temp_path = std::env::temp_dir().join("course_data_segment.gpx");
        GpxLoader::write_file(&temp_path, &spec).unwrap();
        let loaded = GpxLoader::load_file(&temp_path).unwrap();
        assert_eq!(loaded.coords.len(), 3);
        assert_eq!(loaded.name.as_deref(), Some("Pemberton Trail"));

        std::fs::remove_file(temp_path).ok();
    }
}
