//! Application of route elevation summaries to workouts.
//!
//! Route files are parsed elsewhere; this module consumes their already
//! summarized output and matches each workout to the route recorded nearest
//! its start time. Matching is best-effort: a workout without a close
//! enough route simply keeps its elevation fields unset.

use crate::{Result, Workout};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default matching tolerance in minutes
pub const DEFAULT_TOLERANCE_MINUTES: i64 = 30;

/// One route file's elevation summary, produced by an external matcher
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RouteElevation {
    pub recorded_at: NaiveDateTime,
    pub file: String,
    pub gain_m: f64,
    pub loss_m: f64,
    pub max_m: f64,
}

/// Load route elevation summaries from a matcher output file.
///
/// Returns an empty list if the file doesn't exist (no routes summarized
/// yet). A file that cannot be read or parsed is logged and ignored rather
/// than failing the run.
pub fn load_route_summaries(path: &Path) -> Result<Vec<RouteElevation>> {
    if !path.exists() {
        tracing::debug!("No route summary file found at {:?}", path);
        return Ok(Vec::new());
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(
                "Failed to read route summaries at {:?}: {}. Skipping elevation.",
                path,
                e
            );
            return Ok(Vec::new());
        }
    };

    match serde_json::from_str(&contents) {
        Ok(routes) => Ok(routes),
        Err(e) => {
            tracing::warn!(
                "Failed to parse route summaries at {:?}: {}. Skipping elevation.",
                path,
                e
            );
            Ok(Vec::new())
        }
    }
}

/// Attach elevation data to workouts by nearest recorded route.
///
/// For each workout the route with the smallest absolute distance between
/// its recorded timestamp and the workout start wins, provided that
/// distance is strictly under the tolerance. A difference of exactly the
/// tolerance is not a match. All four elevation fields are written
/// together; unmatched workouts keep all of them unset.
pub fn attach_elevation(
    workouts: &mut [Workout],
    routes: &[RouteElevation],
    tolerance_minutes: i64,
) {
    let tolerance = Duration::minutes(tolerance_minutes);

    let mut matched = 0usize;
    for workout in workouts.iter_mut() {
        let mut best: Option<&RouteElevation> = None;
        let mut best_diff = tolerance;

        for route in routes {
            let diff = (workout.start - route.recorded_at).abs();
            if diff < best_diff {
                best = Some(route);
                best_diff = diff;
            }
        }

        if let Some(route) = best {
            workout.route_file = Some(route.file.clone());
            workout.elevation_gain_m = Some(route.gain_m);
            workout.elevation_loss_m = Some(route.loss_m);
            workout.max_elevation_m = Some(route.max_m);
            matched += 1;
        }
    }

    tracing::info!(
        "Matched elevation data to {}/{} workouts",
        matched,
        workouts.len()
    );
}
