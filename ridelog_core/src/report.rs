//! CSV and JSON report writers.
//!
//! Each writer serializes one flat row struct per line; distance and
//! elevation columns are converted to the configured display units on the
//! way out, while durations and energy keep their working units
//! (minutes/hours, kcal). The JSON dump of the overall statistics stays in
//! working units for machine consumers.

use crate::units::DisplayUnits;
use crate::{HeartRateZone, OverallStats, Result, Summary, Workout};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A row of the per-year summary export
#[derive(Debug, serde::Serialize)]
struct YearRow {
    year: i32,
    workouts: usize,
    total_distance: f64,
    total_duration_hours: f64,
    total_energy_kcal: f64,
    total_elevation_gain: f64,
    avg_distance: f64,
    avg_duration_minutes: f64,
    avg_speed: f64,
    avg_elevation_gain: f64,
    max_distance: f64,
    max_elevation_gain: f64,
}

impl YearRow {
    fn new(year: i32, summary: &Summary, units: DisplayUnits) -> Self {
        YearRow {
            year,
            workouts: summary.workouts,
            total_distance: units.distance.from_km(summary.total_distance_km),
            total_duration_hours: summary.total_duration_minutes / 60.0,
            total_energy_kcal: summary.total_energy_kcal,
            total_elevation_gain: units.elevation.from_metres(summary.total_elevation_gain_m),
            avg_distance: units.distance.from_km(summary.avg_distance_km),
            avg_duration_minutes: summary.avg_duration_minutes,
            avg_speed: units.distance.from_km(summary.avg_speed_kmh),
            avg_elevation_gain: units.elevation.from_metres(summary.avg_elevation_gain_m),
            max_distance: units.distance.from_km(summary.max_distance_km),
            max_elevation_gain: units.elevation.from_metres(summary.max_elevation_gain_m),
        }
    }
}

/// A row of the per-month summary export
#[derive(Debug, serde::Serialize)]
struct MonthRow {
    year: i32,
    month: u32,
    month_label: String,
    workouts: usize,
    total_distance: f64,
    total_duration_hours: f64,
    total_energy_kcal: f64,
    total_elevation_gain: f64,
    avg_distance: f64,
    avg_duration_minutes: f64,
    avg_speed: f64,
}

impl MonthRow {
    fn new(year: i32, month: u32, summary: &Summary, units: DisplayUnits) -> Self {
        MonthRow {
            year,
            month,
            month_label: format!("{year}-{month:02}"),
            workouts: summary.workouts,
            total_distance: units.distance.from_km(summary.total_distance_km),
            total_duration_hours: summary.total_duration_minutes / 60.0,
            total_energy_kcal: summary.total_energy_kcal,
            total_elevation_gain: units.elevation.from_metres(summary.total_elevation_gain_m),
            avg_distance: units.distance.from_km(summary.avg_distance_km),
            avg_duration_minutes: summary.avg_duration_minutes,
            avg_speed: units.distance.from_km(summary.avg_speed_kmh),
        }
    }
}

/// A row of the raw workout export
#[derive(Debug, serde::Serialize)]
struct WorkoutRow {
    start: String,
    end: String,
    duration_minutes: f64,
    distance: f64,
    avg_speed: f64,
    energy_kcal: f64,
    avg_hr: Option<f64>,
    max_hr: Option<f64>,
    min_hr: Option<f64>,
    elevation_gain: Option<f64>,
    elevation_loss: Option<f64>,
    max_elevation: Option<f64>,
    source: String,
    route_file: Option<String>,
}

impl WorkoutRow {
    fn new(workout: &Workout, units: DisplayUnits) -> Self {
        WorkoutRow {
            start: workout.start.format("%Y-%m-%d %H:%M:%S").to_string(),
            end: workout.end.format("%Y-%m-%d %H:%M:%S").to_string(),
            duration_minutes: workout.duration_minutes,
            distance: units.distance.from_km(workout.distance_km),
            avg_speed: units.distance.from_km(workout.avg_speed_kmh()),
            energy_kcal: workout.energy_kcal,
            avg_hr: workout.avg_hr,
            max_hr: workout.max_hr,
            min_hr: workout.min_hr,
            elevation_gain: workout
                .elevation_gain_m
                .map(|m| units.elevation.from_metres(m)),
            elevation_loss: workout
                .elevation_loss_m
                .map(|m| units.elevation.from_metres(m)),
            max_elevation: workout
                .max_elevation_m
                .map(|m| units.elevation.from_metres(m)),
            source: workout.source_name.clone(),
            route_file: workout.route_file.clone(),
        }
    }
}

/// A row of the heart-rate zone export
#[derive(Debug, serde::Serialize)]
struct ZoneRow {
    zone: String,
    min_bpm: u32,
    max_bpm: Option<u32>,
    minutes: f64,
    hours: f64,
}

impl From<&HeartRateZone> for ZoneRow {
    fn from(zone: &HeartRateZone) -> Self {
        ZoneRow {
            zone: zone.name.clone(),
            min_bpm: zone.min_bpm,
            max_bpm: zone.max_bpm,
            minutes: zone.minutes,
            hours: zone.hours(),
        }
    }
}

/// Write the per-year summaries as CSV
pub fn write_yearly_csv(
    path: &Path,
    yearly: &BTreeMap<i32, Summary>,
    units: DisplayUnits,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for (year, summary) in yearly {
        writer.serialize(YearRow::new(*year, summary, units))?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} yearly rows to {}", yearly.len(), path.display());
    Ok(())
}

/// Write the per-month summaries as CSV
pub fn write_monthly_csv(
    path: &Path,
    monthly: &BTreeMap<(i32, u32), Summary>,
    units: DisplayUnits,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for (&(year, month), summary) in monthly {
        writer.serialize(MonthRow::new(year, month, summary, units))?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} monthly rows to {}", monthly.len(), path.display());
    Ok(())
}

/// Write every enriched workout as CSV, in the given order
pub fn write_workouts_csv(path: &Path, workouts: &[Workout], units: DisplayUnits) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for workout in workouts {
        writer.serialize(WorkoutRow::new(workout, units))?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} workout rows to {}", workouts.len(), path.display());
    Ok(())
}

/// Write the accumulated zone times as CSV, in configured zone order
pub fn write_zones_csv(path: &Path, zones: &[HeartRateZone]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for zone in zones {
        writer.serialize(ZoneRow::from(zone))?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} zone rows to {}", zones.len(), path.display());
    Ok(())
}

/// Dump the overall statistics as pretty-printed JSON
pub fn write_overall_json(path: &Path, stats: &OverallStats) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, stats)?;
    // Flush explicitly; the buffered writer's drop discards write errors
    writer.flush()?;

    tracing::info!("Wrote overall statistics to {}", path.display());
    Ok(())
}
