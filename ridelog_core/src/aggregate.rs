//! Grouped aggregation of enriched workouts.
//!
//! Summaries follow two rules worth spelling out:
//! - Average speed is a ratio of sums (group distance over group hours).
//!   A mean of per-workout speeds would over-weight short sessions.
//! - Elevation totals and averages only see workouts that carry elevation
//!   data, so the elevation average uses a smaller denominator than the
//!   distance/duration/energy averages.

use crate::{Error, OverallStats, Result, Summary, Workout};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

impl Summary {
    /// Compute a summary over any set of workouts.
    ///
    /// An empty set yields the all-zero default.
    pub fn compute<'a, I>(workouts: I) -> Self
    where
        I: IntoIterator<Item = &'a Workout>,
    {
        let mut summary = Summary::default();
        let mut with_elevation = 0usize;

        for w in workouts {
            summary.workouts += 1;
            summary.total_distance_km += w.distance_km;
            summary.total_duration_minutes += w.duration_minutes;
            summary.total_energy_kcal += w.energy_kcal;
            summary.max_distance_km = summary.max_distance_km.max(w.distance_km);
            summary.max_duration_minutes = summary.max_duration_minutes.max(w.duration_minutes);

            if let Some(gain) = w.elevation_gain_m {
                summary.total_elevation_gain_m += gain;
                summary.max_elevation_gain_m = summary.max_elevation_gain_m.max(gain);
                with_elevation += 1;
            }
        }

        if summary.workouts > 0 {
            let members = summary.workouts as f64;
            summary.avg_distance_km = summary.total_distance_km / members;
            summary.avg_duration_minutes = summary.total_duration_minutes / members;
            summary.avg_energy_kcal = summary.total_energy_kcal / members;
        }
        if with_elevation > 0 {
            summary.avg_elevation_gain_m =
                summary.total_elevation_gain_m / with_elevation as f64;
        }

        let total_hours = summary.total_duration_minutes / 60.0;
        if total_hours > 0.0 {
            summary.avg_speed_kmh = summary.total_distance_km / total_hours;
        }

        summary
    }
}

/// Group workouts by an arbitrary key and summarize each group.
///
/// The map is ordered by key, so callers iterate deterministically.
pub fn aggregate<K, F>(workouts: &[Workout], key: F) -> BTreeMap<K, Summary>
where
    K: Ord,
    F: Fn(&Workout) -> K,
{
    let mut groups: BTreeMap<K, Vec<&Workout>> = BTreeMap::new();
    for w in workouts {
        groups.entry(key(w)).or_default().push(w);
    }

    groups
        .into_iter()
        .map(|(k, members)| (k, Summary::compute(members)))
        .collect()
}

/// Aggregate per calendar year
pub fn by_year(workouts: &[Workout]) -> BTreeMap<i32, Summary> {
    tracing::info!("Aggregating {} workouts by year", workouts.len());
    aggregate(workouts, Workout::year)
}

/// Aggregate per calendar month, keyed by (year, month)
pub fn by_month(workouts: &[Workout]) -> BTreeMap<(i32, u32), Summary> {
    tracing::info!("Aggregating {} workouts by month", workouts.len());
    aggregate(workouts, |w| (w.year(), w.month()))
}

/// Whole-history statistics across every workout
pub fn overall(workouts: &[Workout]) -> OverallStats {
    tracing::info!("Calculating overall statistics");

    let summary = Summary::compute(workouts);
    let years: BTreeSet<i32> = workouts.iter().map(|w| w.year()).collect();

    // Each workout's average counts once here, however many samples went
    // into it; zone time over in zones.rs weighs raw samples instead
    let hr_averages: Vec<f64> = workouts.iter().filter_map(|w| w.avg_hr).collect();
    let avg_heart_rate = if hr_averages.is_empty() {
        None
    } else {
        Some(hr_averages.iter().sum::<f64>() / hr_averages.len() as f64)
    };

    OverallStats {
        summary,
        years_active: years.len(),
        first_workout: workouts.iter().map(|w| w.start).min(),
        last_workout: workouts.iter().map(|w| w.start).max(),
        avg_heart_rate,
        workouts_with_elevation: workouts
            .iter()
            .filter(|w| w.elevation_gain_m.is_some())
            .count(),
        workouts_with_hr: hr_averages.len(),
    }
}

/// Workout metrics usable for top-N ranking
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Distance,
    Duration,
    ElevationGain,
    Energy,
}

impl Metric {
    /// The metric's value for one workout; `None` when the workout lacks it
    pub fn of(self, workout: &Workout) -> Option<f64> {
        match self {
            Metric::Distance => Some(workout.distance_km),
            Metric::Duration => Some(workout.duration_minutes),
            Metric::ElevationGain => workout.elevation_gain_m,
            Metric::Energy => Some(workout.energy_kcal),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Metric::Distance => "distance",
            Metric::Duration => "duration",
            Metric::ElevationGain => "elevation",
            Metric::Energy => "energy",
        };
        write!(f, "{label}")
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "distance" => Ok(Metric::Distance),
            "duration" => Ok(Metric::Duration),
            "elevation" => Ok(Metric::ElevationGain),
            "energy" | "calories" => Ok(Metric::Energy),
            other => Err(Error::UnknownMetric(other.to_string())),
        }
    }
}

/// The top `n` workouts ranked by a metric, descending.
///
/// Workouts lacking the metric are left out entirely rather than ranked as
/// zero.
pub fn top_workouts(workouts: &[Workout], metric: Metric, n: usize) -> Vec<&Workout> {
    let mut ranked: Vec<(&Workout, f64)> = workouts
        .iter()
        .filter_map(|w| metric.of(w).map(|v| (w, v)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(n).map(|(w, _)| w).collect()
}
