//! Correlation of point samples into workout time windows.
//!
//! Samples carry no workout reference; the only link is time. A sample
//! belongs to a workout when its timestamp falls inside `[start, end]`,
//! inclusive on both ends; an interval whose end precedes its start holds
//! no samples at all. Each stage here takes the workout slice mutably and
//! writes only its own fields.

use crate::{HrSample, QuantitySample, Workout};
use chrono::NaiveDateTime;

/// Derive per-workout heart-rate statistics from the sample stream.
///
/// Samples are sorted once and each workout's window is sliced out of the
/// sorted timeline. Workouts with no overlapping sample keep `avg_hr`,
/// `max_hr` and `min_hr` unset; no data is not the same as zero.
pub fn attach_heart_rate(workouts: &mut [Workout], samples: &[HrSample]) {
    let mut timeline: Vec<(NaiveDateTime, f64)> =
        samples.iter().map(|s| (s.at, s.bpm)).collect();
    timeline.sort_by_key(|&(at, _)| at);

    let mut matched = 0usize;
    for workout in workouts.iter_mut() {
        let lo = timeline.partition_point(|&(at, _)| at < workout.start);
        let hi = timeline.partition_point(|&(at, _)| at <= workout.end);
        // hi < lo when the workout interval is inverted
        if hi <= lo {
            continue;
        }
        let in_window = &timeline[lo..hi];

        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &(_, bpm) in in_window {
            sum += bpm;
            min = min.min(bpm);
            max = max.max(bpm);
        }

        workout.avg_hr = Some(sum / in_window.len() as f64);
        workout.max_hr = Some(max);
        workout.min_hr = Some(min);
        matched += 1;
    }

    tracing::info!(
        "Matched heart-rate data to {}/{} workouts",
        matched,
        workouts.len()
    );
}

/// Sum incremental distance and energy samples into each workout's window.
///
/// A positive in-window sum replaces the workout's own total; a zero or
/// empty sum leaves it untouched. The workout-level total and the itemized
/// samples are independently reported, and zero must never erase a good
/// prior value. Overlapping workouts may count a shared sample twice; that
/// is accepted, not deduplicated.
pub fn attach_sample_totals(
    workouts: &mut [Workout],
    distance: &[QuantitySample],
    energy: &[QuantitySample],
) {
    let distance = sorted_by_time(distance);
    let energy = sorted_by_time(energy);

    let mut with_distance = 0usize;
    let mut with_energy = 0usize;
    for workout in workouts.iter_mut() {
        let distance_sum = window_sum(&distance, workout.start, workout.end);
        let energy_sum = window_sum(&energy, workout.start, workout.end);

        if distance_sum > 0.0 {
            workout.distance_km = distance_sum;
        }
        if energy_sum > 0.0 {
            workout.energy_kcal = energy_sum;
        }

        if workout.distance_km > 0.0 {
            with_distance += 1;
        }
        if workout.energy_kcal > 0.0 {
            with_energy += 1;
        }
    }

    tracing::info!(
        "Matched distance data to {}/{} workouts, energy data to {}/{}",
        with_distance,
        workouts.len(),
        with_energy,
        workouts.len()
    );
}

fn sorted_by_time(samples: &[QuantitySample]) -> Vec<QuantitySample> {
    let mut sorted = samples.to_vec();
    sorted.sort_by_key(|s| s.at);
    sorted
}

fn window_sum(sorted: &[QuantitySample], start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let lo = sorted.partition_point(|s| s.at < start);
    let hi = sorted.partition_point(|s| s.at <= end);
    if hi <= lo {
        return 0.0;
    }
    sorted[lo..hi].iter().map(|s| s.value).sum()
}
