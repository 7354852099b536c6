//! Named, independently geometered stretches of trail.

use geo::{BoundingRect, Coord, LineString, Rect};

use crate::distance::DistanceTable;
use crate::elevation::{ElevationProfile, ElevationUnit};
use crate::errors::{CourseError, Result};
use crate::models::{AidStation, SegmentSpec};

/// Ordered lon/lat samples with their raw elevations. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    coords: Vec<Coord<f64>>,
    elevations: Vec<f64>,
}

impl Track {
    pub fn coords(&self) -> &[Coord<f64>] {
        &self.coords
    }

    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Interpolated position on one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPoint {
    pub coord: Coord<f64>,
    /// Feet.
    pub elevation: f64,
}

/// A whole-unit distance marker along a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MileMarker {
    pub mile: u32,
    pub coord: Coord<f64>,
    /// Every fifth marker is major.
    pub major: bool,
}

/// An aid station resolved to a map position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedAidStation {
    pub station: AidStation,
    pub coord: Coord<f64>,
}

#[derive(Debug, Clone)]
pub struct Segment {
    id: String,
    label: String,
    abbr: Option<String>,
    color: String,
    pattern: Option<String>,
    track: Track,
    distances: DistanceTable,
    profile: ElevationProfile,
    nominal_distance: f64,
    nominal_climb: f64,
    aid_stations: Vec<AidStation>,
}

impl Segment {
    /// Validates the geometry, normalizes distances and builds the profile.
    pub fn from_spec(spec: SegmentSpec, unit: ElevationUnit) -> Result<Self> {
        let SegmentSpec {
            id,
            label,
            abbr,
            color,
            pattern,
            nominal_distance,
            nominal_climb,
            coordinates,
            elevations,
            aid_stations,
        } = spec;

        if !nominal_distance.is_finite() || nominal_distance <= 0.0 {
            return Err(CourseError::InvalidNominal {
                segment: id,
                field: "distance",
                value: nominal_distance,
            });
        }
        if !nominal_climb.is_finite() || nominal_climb < 0.0 {
            return Err(CourseError::InvalidNominal {
                segment: id,
                field: "climb",
                value: nominal_climb,
            });
        }
        if coordinates.len() < 2 {
            return Err(CourseError::TooFewPoints {
                segment: id,
                points: coordinates.len(),
            });
        }
        if elevations.len() != coordinates.len() {
            return Err(CourseError::ElevationMismatch {
                segment: id,
                points: coordinates.len(),
                elevations: elevations.len(),
            });
        }

        let coords: Vec<Coord<f64>> = coordinates
            .iter()
            .map(|[x, y]| Coord { x: *x, y: *y })
            .collect();

        let distances = match DistanceTable::normalized(&coords, nominal_distance) {
            Ok(table) => table,
            Err(source) => return Err(CourseError::DegenerateTrack { segment: id, source }),
        };
        let profile = ElevationProfile::build(&elevations, unit, &distances);

        Ok(Self {
            id,
            label,
            abbr,
            color,
            pattern,
            track: Track { coords, elevations },
            distances,
            profile,
            nominal_distance,
            nominal_climb,
            aid_stations,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn abbr(&self) -> Option<&str> {
        self.abbr.as_deref()
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn distances(&self) -> &DistanceTable {
        &self.distances
    }

    pub fn profile(&self) -> &ElevationProfile {
        &self.profile
    }

    pub fn nominal_distance(&self) -> f64 {
        self.nominal_distance
    }

    pub fn nominal_climb(&self) -> f64 {
        self.nominal_climb
    }

    pub fn aid_stations(&self) -> &[AidStation] {
        &self.aid_stations
    }

    pub fn first_coord(&self) -> Coord<f64> {
        self.track.coords[0]
    }

    pub fn last_coord(&self) -> Coord<f64> {
        self.track.coords[self.track.coords.len() - 1]
    }

    /// Interpolated coordinate at a local distance (clamped to the segment).
    pub fn coord_at(&self, distance: f64) -> Coord<f64> {
        let b = self.distances.locate(distance);
        let c0 = self.track.coords[b.lo];
        let c1 = self.track.coords[b.hi];
        Coord {
            x: lerp(c0.x, c1.x, b.t),
            y: lerp(c0.y, c1.y, b.t),
        }
    }

    /// Interpolated elevation in feet at a local distance.
    pub fn elevation_at(&self, distance: f64) -> f64 {
        let b = self.distances.locate(distance);
        let points = self.profile.points();
        lerp(points[b.lo].elevation, points[b.hi].elevation, b.t)
    }

    pub fn point_at(&self, distance: f64) -> SegmentPoint {
        SegmentPoint {
            coord: self.coord_at(distance),
            elevation: self.elevation_at(distance),
        }
    }

    /// Wraps a distance onto this segment for repeated laps of a single loop.
    pub fn wrap(&self, distance: f64) -> f64 {
        if distance >= 0.0 && distance <= self.nominal_distance {
            distance
        } else {
            distance.rem_euclid(self.nominal_distance)
        }
    }

    /// Bounding box of the track, for fitting the silhouette to a canvas.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        LineString::from(self.track.coords.clone()).bounding_rect()
    }

    /// One marker per whole distance unit along the segment.
    pub fn mile_markers(&self) -> Vec<MileMarker> {
        let count = self.nominal_distance.floor() as u32;
        (1..=count)
            .map(|mile| MileMarker {
                mile,
                coord: self.coord_at(mile as f64),
                major: mile % 5 == 0,
            })
            .collect()
    }

    /// Aid stations with their interpolated coordinates.
    pub fn placed_aid_stations(&self) -> Vec<PlacedAidStation> {
        self.aid_stations
            .iter()
            .map(|station| PlacedAidStation {
                coord: self.coord_at(station.distance),
                station: station.clone(),
            })
            .collect()
    }
}

/// Exact at both ends, so `t == 1` returns `b` itself.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A straight north-running segment: `points` samples, evenly spaced.
    pub(crate) fn straight_spec(id: &str, distance: f64, climb: f64, points: usize) -> SegmentSpec {
        let coordinates = (0..points)
            .map(|i| [-74.0, 41.0 + i as f64 * 0.001])
            .collect();
        let elevations = (0..points).map(|i| 100.0 + i as f64 * 10.0).collect();
        SegmentSpec {
            id: id.to_string(),
            label: id.to_uppercase(),
            abbr: None,
            color: "#FF8C00".to_string(),
            pattern: None,
            nominal_distance: distance,
            nominal_climb: climb,
            coordinates,
            elevations,
            aid_stations: Vec::new(),
        }
    }

    #[test]
    fn test_from_spec_builds_aligned_tables() {
        let seg = Segment::from_spec(straight_spec("a", 5.0, 500.0, 11), ElevationUnit::Feet).unwrap();
        assert_eq!(seg.distances().len(), 11);
        assert_eq!(seg.profile().len(), 11);
        assert_eq!(seg.distances().total(), 5.0);
        assert!((seg.distances().as_slice()[5] - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let mut spec = straight_spec("a", 5.0, 500.0, 3);
        spec.elevations.pop();
        assert!(matches!(
            Segment::from_spec(spec, ElevationUnit::Feet),
            Err(CourseError::ElevationMismatch { points: 3, elevations: 2, .. })
        ));

        let mut spec = straight_spec("a", 5.0, 500.0, 3);
        spec.coordinates = vec![[-74.0, 41.0]; 3];
        assert!(matches!(
            Segment::from_spec(spec, ElevationUnit::Feet),
            Err(CourseError::DegenerateTrack { .. })
        ));

        let spec = straight_spec("a", 5.0, 500.0, 1);
        assert!(matches!(
            Segment::from_spec(spec, ElevationUnit::Feet),
            Err(CourseError::TooFewPoints { points: 1, .. })
        ));

        let spec = straight_spec("a", 0.0, 500.0, 3);
        assert!(matches!(
            Segment::from_spec(spec, ElevationUnit::Feet),
            Err(CourseError::InvalidNominal { field: "distance", .. })
        ));
    }

    #[test]
    fn test_interpolation() {
        let seg = Segment::from_spec(straight_spec("a", 5.0, 500.0, 11), ElevationUnit::Feet).unwrap();

        assert_eq!(seg.coord_at(0.0), seg.first_coord());
        assert_eq!(seg.coord_at(5.0), seg.last_coord());
        assert_eq!(seg.coord_at(99.0), seg.last_coord());

        // Midway between samples 2 and 3
        let p = seg.point_at(1.25);
        assert!((p.elevation - 125.0).abs() < 1e-6);
        assert!((p.coord.y - 41.0025).abs() < 1e-9);
    }

    #[test]
    fn test_wrap() {
        let seg = Segment::from_spec(straight_spec("a", 5.0, 500.0, 3), ElevationUnit::Feet).unwrap();
        assert_eq!(seg.wrap(5.0), 5.0);
        assert!((seg.wrap(7.5) - 2.5).abs() < 1e-9);
        assert!((seg.wrap(-1.0) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_markers_and_bounds() {
        let mut spec = straight_spec("a", 10.5, 500.0, 22);
        spec.aid_stations.push(AidStation {
            name: "Coyote Camp".to_string(),
            distance: 4.0,
            services: "Water".to_string(),
        });
        let seg = Segment::from_spec(spec, ElevationUnit::Feet).unwrap();

        let markers = seg.mile_markers();
        assert_eq!(markers.len(), 10);
        assert!(markers[4].major);
        assert!(!markers[3].major);

        let stations = seg.placed_aid_stations();
        assert_eq!(stations[0].coord, seg.coord_at(4.0));

        let bounds = seg.bounds().unwrap();
        assert_eq!(bounds.min().y, 41.0);
        assert!((bounds.max().y - 41.021).abs() < 1e-9);
    }
}
