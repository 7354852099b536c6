//! Generated and GPX-sourced courses driven through the simulator.

use std::time::Duration;

use course_data::prelude::*;

#[test]
fn test_desert_course_plays_to_finish() {
    let loaded = CourseBuilder::desert_loops(12345)
        .with_points_per_segment(150)
        .build_catalogue();
    assert!(loaded.rejected.is_empty());
    assert_eq!(loaded.catalogue.races().len(), 3);

    let mut ctx = SimulationContext::new(
        loaded.catalogue.race("100m").unwrap(),
        loaded.config.clone(),
    );
    ctx.set_speed(4.0);
    ctx.play(Duration::ZERO);

    let mut frames = FixedStepFrames::new(Duration::ZERO, Duration::from_millis(250));
    let mut indices = Vec::new();
    let mut climbs = Vec::new();
    let ran = Scheduler::new()
        .with_max_frames(10_000)
        .run(&mut ctx, &mut frames, |snap| {
            indices.push(snap.state.segment_occurrence_index);
            climbs.push(snap.state.climb_to_date);
        });

    assert!(ran > 0 && ran < 10_000);
    assert!(indices.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*indices.last().unwrap(), 5);
    assert!(climbs.windows(2).all(|w| w[0] <= w[1]));

    let end = ctx.snapshot();
    assert_eq!(end.progress, 1.0);
    assert!((end.state.climb_to_date - ctx.race().total_climb()).abs() < 1e-6);
    assert_eq!(end.clock.finish_label, "12:00 PM Sun");
    assert_eq!(end.clock.current_label, end.clock.finish_label);
    assert!(end.tracker.iter().all(|row| row.status != OccurrenceStatus::Pending));
}

#[test]
fn test_shared_start_for_generated_loops() {
    let loaded = CourseBuilder::desert_loops(3)
        .with_points_per_segment(80)
        .build_catalogue();
    let race = loaded.catalogue.race("100k").unwrap();
    let start = race.state_at(0.0).coordinate;
    let (lat, lon) = Region::MCDOWELL.center();
    // Within GPS jitter of the shared start
    assert!((start.y - lat).abs() < 0.001);
    assert!((start.x - lon).abs() < 0.001);
}

#[test]
fn test_single_loop_laps() {
    let loaded = CourseBuilder::single_loop(9).build_catalogue();
    let giant = loaded.catalogue.segment("giant").unwrap();
    let double = loaded.catalogue.race("double").unwrap();
    assert_eq!(double.total_distance(), 31.0);

    let query = SegmentQuery::new(giant).with_laps(2);
    let from_race = double.state_at_distance(20.0, 0.05);
    let from_query = query.state_at_distance(20.0);
    assert_eq!(from_race.lap, 2);
    assert_eq!(from_query.lap, 2);
    assert_eq!(from_race.coordinate, from_query.coordinate);
    assert!((from_race.elevation - from_query.elevation).abs() < 1e-9);
}

#[test]
fn test_gpx_segment_in_catalogue() {
    let generated = ProceduralGenerator::new(5)
        .with_points(60)
        .with_distance(6.0)
        .generate("gen", "Generated", "#123456", &mut rand::thread_rng());

    let path = std::env::temp_dir().join("course_data_fixture_roundtrip.gpx");
    GpxLoader::write_file(&path, &generated).unwrap();
    let track = GpxLoader::load_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let measured = track.length_miles();
    let mut spec = track.into_segment_spec("escarpment", "Escarpment", "#8B4513");
    assert!((spec.nominal_distance - measured).abs() < 1e-12);
    // Published figures replace the measured ones
    spec.nominal_distance = 6.0;
    spec.nominal_climb = 900.0;

    let mut catalogue = SegmentCatalogue::new(ElevationUnit::Meters);
    let segment = catalogue.insert_segment(spec).unwrap();
    assert_eq!(segment.distances().total(), 6.0);
    assert_eq!(segment.mile_markers().len(), 6);
    assert!(segment.mile_markers()[4].major);
}
