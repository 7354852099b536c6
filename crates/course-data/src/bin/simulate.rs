//! Headless playback of one race, logging a snapshot per frame.
//!
//! Run with:
//! ```
//! RACE_ID=100k SPEED=4 cargo run -p course-data --bin simulate
//! ```
//!
//! `COURSE_FILE` loads a course JSON file instead of the generated desert
//! course. `WRITE_COURSE` saves the generated course to a file and exits.

use std::time::Duration;

use anyhow::Context;
use course::prelude::*;
use course_data::builders::CourseBuilder;
use tracing_subscriber::EnvFilter;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let seed: u64 = env_or("SEED", 12345);
    let speed: f64 = env_or("SPEED", 1.0);
    let frame_ms: u64 = env_or("FRAME_MS", 100);
    anyhow::ensure!(
        speed.is_finite() && speed > 0.0,
        "SPEED must be a positive number, got {speed}"
    );

    if let Ok(path) = std::env::var("WRITE_COURSE") {
        let spec = CourseBuilder::desert_loops(seed).build();
        std::fs::write(&path, serde_json::to_string_pretty(&spec)?)
            .with_context(|| format!("writing {path}"))?;
        tracing::info!(path = %path, "course written");
        return Ok(());
    }

    let mut loaded = match std::env::var("COURSE_FILE") {
        Ok(path) => SegmentCatalogue::from_path(&path).with_context(|| format!("loading {path}"))?,
        Err(_) => CourseBuilder::desert_loops(seed).build_catalogue(),
    };
    for error in &loaded.rejected {
        tracing::warn!(%error, "rejected");
    }

    let first = loaded
        .catalogue
        .races()
        .first()
        .cloned()
        .context("course has no usable races")?;
    let mut ctx = SimulationContext::new(first, loaded.config.clone());
    if let Ok(race_id) = std::env::var("RACE_ID") {
        ctx.select_race(&loaded.catalogue, &race_id)?;
    }
    loaded.catalogue.show_race(ctx.race());
    let visible: Vec<&str> = loaded.catalogue.visible_segments().map(|s| s.id()).collect();
    tracing::debug!(?visible, "visible segments");

    let race = ctx.race();
    tracing::info!(
        race = race.id(),
        miles = race.total_distance(),
        climb_ft = race.total_climb(),
        occurrences = race.occurrences().len(),
        goal = ?ctx.goal().split(),
        pace = ?ctx.pace().map(|p| p.label()),
        "starting playback"
    );

    let clock = SystemClock::new();
    let mut interval = tokio::time::interval(Duration::from_millis(frame_ms.max(1)));
    ctx.set_speed(speed);
    ctx.play(clock.now());

    let mut frames = 0usize;
    let mut last_occurrence = usize::MAX;
    while ctx.is_playing() {
        interval.tick().await;
        ctx.tick(clock.now());
        frames += 1;

        let snapshot = ctx.snapshot();
        if snapshot.state.segment_occurrence_index != last_occurrence {
            last_occurrence = snapshot.state.segment_occurrence_index;
            tracing::info!(
                segment = %snapshot.state.segment_id,
                lap = snapshot.state.lap,
                mile = snapshot.state.distance,
                clock = %snapshot.clock.current_label,
                "entered segment"
            );
        }
        tracing::debug!(snapshot = %serde_json::to_string(&snapshot)?, "frame");
    }

    let snapshot = ctx.snapshot();
    tracing::info!(
        frames,
        finish = %snapshot.clock.finish_label,
        climb_ft = snapshot.state.climb_to_date,
        "finished"
    );

    Ok(())
}
