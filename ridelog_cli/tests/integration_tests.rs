//! Integration tests for the ridelog binary.
//!
//! These tests verify end-to-end behavior including:
//! - The full report pipeline over a small export fixture
//! - Heart-rate correlation and zone accumulation in the written reports
//! - Config date filtering, display units and route elevation summaries
//! - Top-N ranking and the init command

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("ridelog"))
}

/// Two cycling rides, one running workout, heart-rate samples inside the
/// first ride, distance/energy samples inside the second, one record with
/// no timestamp and one record of an unrelated type.
const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<HealthData locale="en_US">
 <ExportDate value="2023-12-31 09:00:00 +0000"/>
 <Workout workoutActivityType="HKWorkoutActivityTypeCycling" duration="60" startDate="2023-06-01 08:00:00 +0000" endDate="2023-06-01 09:00:00 +0000" totalDistance="30" distanceUnit="km" totalEnergyBurned="600" energyUnit="Cal" sourceName="Watch"/>
 <Workout workoutActivityType="HKWorkoutActivityTypeRunning" duration="20" startDate="2023-06-02 07:00:00 +0000" endDate="2023-06-02 07:20:00 +0000" sourceName="Watch"/>
 <Workout workoutActivityType="HKWorkoutActivityTypeCycling" duration="30" startDate="2023-06-03 08:00:00 +0000" endDate="2023-06-03 08:30:00 +0000" totalDistance="20" distanceUnit="km" totalEnergyBurned="400" energyUnit="Cal" sourceName="Watch"/>
 <Record type="HKQuantityTypeIdentifierHeartRate" value="120" unit="count/min" startDate="2023-06-01 08:05:00 +0000" endDate="2023-06-01 08:05:00 +0000" sourceName="Watch"/>
 <Record type="HKQuantityTypeIdentifierHeartRate" value="150" unit="count/min" startDate="2023-06-01 08:15:00 +0000" endDate="2023-06-01 08:15:00 +0000" sourceName="Watch"/>
 <Record type="HKQuantityTypeIdentifierHeartRate" value="999" unit="count/min" sourceName="Watch"/>
 <Record type="HKQuantityTypeIdentifierDistanceCycling" value="5" unit="km" startDate="2023-06-03 08:10:00 +0000" endDate="2023-06-03 08:10:00 +0000" sourceName="Watch"/>
 <Record type="HKQuantityTypeIdentifierDistanceCycling" value="7" unit="km" startDate="2023-06-03 08:20:00 +0000" endDate="2023-06-03 08:20:00 +0000" sourceName="Watch"/>
 <Record type="HKQuantityTypeIdentifierActiveEnergyBurned" value="150" unit="Cal" startDate="2023-06-03 08:15:00 +0000" endDate="2023-06-03 08:15:00 +0000" sourceName="Watch"/>
 <Record type="HKQuantityTypeIdentifierStepCount" value="900" unit="count" startDate="2023-06-01 10:00:00 +0000" endDate="2023-06-01 10:00:00 +0000" sourceName="Phone"/>
</HealthData>
"#;

fn write_export(dir: &Path) -> PathBuf {
    let path = dir.join("export.xml");
    fs::write(&path, EXPORT).expect("Failed to write export fixture");
    path
}

/// Write a config pointing at the fixture, in metric display units so the
/// console numbers come out unconverted. Extra TOML sections are appended.
fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("config.toml");
    let contents = format!(
        "[data]\nexport_path = \"{}\"\noutput_dir = \"{}\"\n\n[units]\ndistance = \"km\"\nelevation = \"m\"\n{}",
        dir.join("export.xml").display(),
        dir.join("output").display(),
        extra
    );
    fs::write(&path, contents).expect("Failed to write config");
    path
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Cycling analytics from a health export archive",
        ));
}

#[test]
fn test_report_writes_all_outputs() {
    let temp_dir = setup_test_dir();
    write_export(temp_dir.path());
    let config_path = write_config(temp_dir.path(), "");

    cli()
        .arg("report")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Ride Log Summary"));

    let output = temp_dir.path().join("output");
    assert!(output.join("yearly.csv").exists());
    assert!(output.join("monthly.csv").exists());
    assert!(output.join("workouts.csv").exists());
    assert!(output.join("zones.csv").exists());
    assert!(output.join("overall.json").exists());
}

#[test]
fn test_report_summary_numbers() {
    let temp_dir = setup_test_dir();
    write_export(temp_dir.path());
    let config_path = write_config(temp_dir.path(), "");

    // Ride 1 keeps its 30 km attribute total; ride 2's 20 km is replaced by
    // the 5+7 km of in-window distance samples, and its energy by the one
    // 150 kcal sample. The running workout and the timestampless record are
    // ignored.
    cli()
        .arg("report")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Rides: 2"))
        .stdout(predicate::str::contains("Total Distance: 42.0 km"))
        .stdout(predicate::str::contains("Total Time: 1.5 hours"))
        .stdout(predicate::str::contains("Total Calories: 750 kcal"))
        .stdout(predicate::str::contains("Average Distance: 21.0 km"))
        .stdout(predicate::str::contains("Average Duration: 45.0 min"))
        .stdout(predicate::str::contains("Average Speed: 28.0 km/h"))
        .stdout(predicate::str::contains("Years Active: 1"))
        .stdout(predicate::str::contains("First Ride: 2023-06-01"))
        .stdout(predicate::str::contains("Last Ride: 2023-06-03"))
        .stdout(predicate::str::contains("Workouts with Heart Rate Data: 1"))
        .stdout(predicate::str::contains("Average Heart Rate: 135.0 bpm"));
}

#[test]
fn test_workouts_csv_rows() {
    let temp_dir = setup_test_dir();
    write_export(temp_dir.path());
    let config_path = write_config(temp_dir.path(), "");

    cli()
        .arg("report")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let csv_path = temp_dir.path().join("output").join("workouts.csv");
    let mut reader = csv::Reader::from_path(&csv_path).expect("Failed to open workouts.csv");

    let headers = reader.headers().expect("Failed to read headers").clone();
    assert!(headers.iter().any(|h| h == "avg_hr"));
    assert!(headers.iter().any(|h| h == "route_file"));

    let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 2);
    // Archive order: the 30 km ride first, with its correlated heart rate
    assert!(rows[0][0].starts_with("2023-06-01"));
    assert_eq!(&rows[0][6], "135.0");
    assert_eq!(&rows[1][6], "");
}

#[test]
fn test_zone_time_in_zones_csv() {
    let temp_dir = setup_test_dir();
    write_export(temp_dir.path());
    let config_path = write_config(temp_dir.path(), "");

    cli()
        .arg("report")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    // Two samples ten minutes apart, held at 120 bpm, land in zone 2 of the
    // default 185 bpm table ([111, 129))
    let content =
        fs::read_to_string(temp_dir.path().join("output").join("zones.csv")).unwrap();
    assert!(content.starts_with("zone,min_bpm,max_bpm,minutes,hours"));
    assert!(content.contains("Zone 2 (Endurance),111,129,10.0"));
    assert!(content.contains("Zone 5 (Maximum),166,,0.0"));
}

#[test]
fn test_overall_json_contents() {
    let temp_dir = setup_test_dir();
    write_export(temp_dir.path());
    let config_path = write_config(temp_dir.path(), "");

    cli()
        .arg("report")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let content =
        fs::read_to_string(temp_dir.path().join("output").join("overall.json")).unwrap();
    let stats: serde_json::Value = serde_json::from_str(&content).unwrap();

    assert_eq!(stats["workouts"], 2);
    assert_eq!(stats["years_active"], 1);
    assert_eq!(stats["workouts_with_hr"], 1);
    assert_eq!(stats["avg_heart_rate"], 135.0);
    // The JSON dump stays in working units regardless of display config
    assert_eq!(stats["total_distance_km"], 42.0);
    assert!(stats["first_workout"]
        .as_str()
        .unwrap()
        .starts_with("2023-06-01"));
}

#[test]
fn test_date_filter_excludes_earlier_rides() {
    let temp_dir = setup_test_dir();
    write_export(temp_dir.path());
    let config_path = write_config(temp_dir.path(), "\n[filter]\nstart_date = \"2023-06-02\"\n");

    // Only the June 3rd ride starts on or after the bound; its heart-rate
    // samples from June 1st fall outside the sample window too
    cli()
        .arg("report")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Rides: 1"))
        .stdout(predicate::str::contains("Total Distance: 12.0 km"))
        .stdout(predicate::str::contains("Average Heart Rate").not());
}

#[test]
fn test_report_with_no_matching_workouts() {
    let temp_dir = setup_test_dir();
    write_export(temp_dir.path());
    let config_path = write_config(temp_dir.path(), "\n[filter]\nstart_date = \"2030-01-01\"\n");

    cli()
        .arg("report")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No matching workouts found"));

    assert!(!temp_dir.path().join("output").exists());
}

#[test]
fn test_route_summaries_attach_elevation() {
    let temp_dir = setup_test_dir();
    write_export(temp_dir.path());

    let routes_path = temp_dir.path().join("routes.json");
    let routes = r#"[
        {
            "recorded_at": "2023-06-01T08:10:00",
            "file": "morning.gpx",
            "gain_m": 250.0,
            "loss_m": 240.0,
            "max_m": 800.0
        }
    ]"#;
    fs::write(&routes_path, routes).unwrap();

    let extra = format!("\n[routes]\nsummary_path = \"{}\"\n", routes_path.display());
    let config_path = write_config(temp_dir.path(), &extra);

    // Recorded ten minutes from the first ride's start, days from the second
    cli()
        .arg("report")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Workouts with Elevation Data: 1"))
        .stdout(predicate::str::contains("Total Elevation Gain: 250 m"));

    cli()
        .arg("top")
        .arg("--metric")
        .arg("elevation")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Top 1 workouts by elevation"))
        .stdout(predicate::str::contains("2023-06-01"))
        .stdout(predicate::str::contains("250.0 m"));
}

#[test]
fn test_top_by_distance() {
    let temp_dir = setup_test_dir();
    write_export(temp_dir.path());
    let config_path = write_config(temp_dir.path(), "");

    // Ranking reads the workout attribute totals; no sample correlation runs
    cli()
        .arg("top")
        .arg("--metric")
        .arg("distance")
        .arg("--count")
        .arg("1")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Top 1 workouts by distance"))
        .stdout(predicate::str::contains("2023-06-01"))
        .stdout(predicate::str::contains("30.0 km"))
        .stdout(predicate::str::contains("2023-06-03").not());
}

#[test]
fn test_top_rejects_unknown_metric() {
    let temp_dir = setup_test_dir();
    write_export(temp_dir.path());
    let config_path = write_config(temp_dir.path(), "");

    cli()
        .arg("top")
        .arg("--metric")
        .arg("watts")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("watts"));
}

#[test]
fn test_init_writes_default_config() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");

    cli()
        .arg("init")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[data]"));
    assert!(content.contains("max_hr = 185"));

    // A second init refuses to clobber without --force
    cli()
        .arg("init")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    cli()
        .arg("init")
        .arg("--force")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));
}

#[test]
fn test_missing_export_fails() {
    let temp_dir = setup_test_dir();
    // Config points at an export that was never written
    let config_path = write_config(temp_dir.path(), "");

    cli()
        .arg("report")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure();
}
