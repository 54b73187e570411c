//! Core domain types for the ridelog pipeline.
//!
//! This module defines the types flowing between pipeline stages:
//! - Workouts and the point samples correlated into them
//! - Typed records yielded by the streaming extractor
//! - Heart-rate zones and aggregate summaries

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;

// ============================================================================
// Workout
// ============================================================================

/// One recorded exercise session: a closed time interval `[start, end]` with
/// totals from the export plus enrichment fields filled in by later stages.
///
/// Each enrichment field is written by exactly one stage (heart-rate
/// correlation or elevation application) and read-only afterwards. `None`
/// means "no data", which downstream consumers must keep distinct from zero.
#[derive(Clone, Debug)]
pub struct Workout {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: f64,
    pub distance_km: f64,
    pub energy_kcal: f64,
    pub source_name: String,
    pub activity_type: String,

    // Written by the elevation stage
    pub route_file: Option<String>,
    pub elevation_gain_m: Option<f64>,
    pub elevation_loss_m: Option<f64>,
    pub max_elevation_m: Option<f64>,

    // Written by heart-rate correlation
    pub avg_hr: Option<f64>,
    pub max_hr: Option<f64>,
    pub min_hr: Option<f64>,
}

impl Workout {
    /// Create a workout, clamping negative distance and duration to zero.
    ///
    /// Exports occasionally contain small negative totals; those records are
    /// kept (clamped) rather than rejected.
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        duration_minutes: f64,
        distance_km: f64,
        energy_kcal: f64,
        source_name: String,
        activity_type: String,
    ) -> Self {
        Self {
            start,
            end,
            duration_minutes: duration_minutes.max(0.0),
            distance_km: distance_km.max(0.0),
            energy_kcal,
            source_name,
            activity_type,
            route_file: None,
            elevation_gain_m: None,
            elevation_loss_m: None,
            max_elevation_m: None,
            avg_hr: None,
            max_hr: None,
            min_hr: None,
        }
    }

    /// Duration in hours
    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes / 60.0
    }

    /// Average speed in km/h (0 for zero-duration workouts)
    pub fn avg_speed_kmh(&self) -> f64 {
        if self.duration_minutes > 0.0 {
            self.distance_km / self.duration_hours()
        } else {
            0.0
        }
    }

    /// Energy burned per kilometre (0 for zero-distance workouts)
    pub fn kcal_per_km(&self) -> f64 {
        if self.distance_km > 0.0 {
            self.energy_kcal / self.distance_km
        } else {
            0.0
        }
    }

    /// Calendar year of the workout start
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Calendar month (1-12) of the workout start
    pub fn month(&self) -> u32 {
        self.start.month()
    }
}

// ============================================================================
// Samples
// ============================================================================

/// A single heart-rate observation
///
/// Samples are produced and consumed within one run; they are never
/// persisted.
#[derive(Clone, Debug)]
pub struct HrSample {
    pub at: NaiveDateTime,
    pub bpm: f64,
    pub source_name: String,
}

/// An incremental quantity observed at an instant (distance or energy)
///
/// The value is an increment since the previous observation, not a rate;
/// correlation sums increments inside a workout window.
#[derive(Clone, Copy, Debug)]
pub struct QuantitySample {
    pub at: NaiveDateTime,
    pub value: f64,
}

/// Sample categories the extractor can emit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleKind {
    HeartRate,
    CyclingDistance,
    ActiveEnergy,
}

/// A typed record pulled from the export archive, in archive order
#[derive(Clone, Debug)]
pub enum HealthRecord {
    Workout(Workout),
    HeartRate(HrSample),
    Distance(QuantitySample),
    Energy(QuantitySample),
}

// ============================================================================
// Heart-rate zones
// ============================================================================

/// A named BPM range `[min_bpm, max_bpm)` with accumulated time.
///
/// `max_bpm = None` marks the open-ended top zone. Zones live in an ordered
/// list and membership is first-match; the list is not required to be
/// gap-free or non-overlapping.
#[derive(Clone, Debug, PartialEq)]
pub struct HeartRateZone {
    pub name: String,
    pub min_bpm: u32,
    pub max_bpm: Option<u32>,
    pub minutes: f64,
}

impl HeartRateZone {
    /// Whether a BPM value falls inside this zone
    pub fn contains(&self, bpm: f64) -> bool {
        bpm >= f64::from(self.min_bpm) && self.max_bpm.map_or(true, |max| bpm < f64::from(max))
    }

    /// Accumulated time in hours
    pub fn hours(&self) -> f64 {
        self.minutes / 60.0
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// Derived statistics over a group of workouts.
///
/// Totals are plain sums; distance/duration/energy averages divide by the
/// full group size. Elevation is different: workouts without elevation data
/// contribute nothing to the total, and the elevation average divides by the
/// count of workouts that *have* elevation. Average speed is a ratio of sums
/// (total distance over total hours), never a mean of per-workout speeds.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub workouts: usize,
    pub total_distance_km: f64,
    pub total_duration_minutes: f64,
    pub total_energy_kcal: f64,
    pub total_elevation_gain_m: f64,
    pub avg_distance_km: f64,
    pub avg_duration_minutes: f64,
    pub avg_energy_kcal: f64,
    pub avg_speed_kmh: f64,
    pub avg_elevation_gain_m: f64,
    pub max_distance_km: f64,
    pub max_duration_minutes: f64,
    pub max_elevation_gain_m: f64,
}

/// Whole-history statistics: a Summary plus fields that only make sense over
/// the full workout set.
#[derive(Clone, Debug, Default, Serialize)]
pub struct OverallStats {
    #[serde(flatten)]
    pub summary: Summary,
    pub years_active: usize,
    pub first_workout: Option<NaiveDateTime>,
    pub last_workout: Option<NaiveDateTime>,
    /// Unweighted mean of per-workout average heart rates
    pub avg_heart_rate: Option<f64>,
    pub workouts_with_elevation: usize,
    pub workouts_with_hr: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_negative_inputs_clamp_to_zero() {
        let w = Workout::new(
            dt(10, 0),
            dt(11, 0),
            -5.0,
            -2.5,
            300.0,
            "Watch".into(),
            "Cycling".into(),
        );
        assert_eq!(w.duration_minutes, 0.0);
        assert_eq!(w.distance_km, 0.0);
    }

    #[test]
    fn test_avg_speed() {
        let w = Workout::new(
            dt(10, 0),
            dt(10, 30),
            30.0,
            15.0,
            0.0,
            "Watch".into(),
            "Cycling".into(),
        );
        assert!((w.avg_speed_kmh() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_avg_speed_zero_duration() {
        let w = Workout::new(
            dt(10, 0),
            dt(10, 0),
            0.0,
            5.0,
            0.0,
            "Watch".into(),
            "Cycling".into(),
        );
        assert_eq!(w.avg_speed_kmh(), 0.0);
    }

    #[test]
    fn test_kcal_per_km_zero_distance() {
        let w = Workout::new(
            dt(10, 0),
            dt(11, 0),
            60.0,
            0.0,
            400.0,
            "Watch".into(),
            "Cycling".into(),
        );
        assert_eq!(w.kcal_per_km(), 0.0);
    }

    #[test]
    fn test_year_and_month() {
        let w = Workout::new(
            dt(10, 0),
            dt(11, 0),
            60.0,
            10.0,
            0.0,
            "Watch".into(),
            "Cycling".into(),
        );
        assert_eq!(w.year(), 2024);
        assert_eq!(w.month(), 5);
    }

    #[test]
    fn test_zone_contains() {
        let zone = HeartRateZone {
            name: "Zone 2".into(),
            min_bpm: 111,
            max_bpm: Some(129),
            minutes: 0.0,
        };
        assert!(zone.contains(111.0));
        assert!(zone.contains(128.9));
        assert!(!zone.contains(129.0));
        assert!(!zone.contains(110.9));
    }

    #[test]
    fn test_open_top_zone_contains_everything_above_min() {
        let top = HeartRateZone {
            name: "Zone 5".into(),
            min_bpm: 166,
            max_bpm: None,
            minutes: 0.0,
        };
        assert!(top.contains(166.0));
        assert!(top.contains(240.0));
        assert!(!top.contains(165.9));
    }
}
