use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use ridelog_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ridelog")]
#[command(about = "Cycling analytics from a health export archive", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override config file location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write CSV/JSON reports (default)
    Report {
        /// Override the export archive path
        #[arg(long)]
        export: Option<PathBuf>,

        /// Override the output directory
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List the top workouts by one metric
    Top {
        /// Metric to rank by (distance, duration, elevation, energy)
        #[arg(long, default_value_t = Metric::Distance)]
        metric: Metric,

        /// How many workouts to list
        #[arg(long, default_value_t = 10)]
        count: usize,

        /// Override the export archive path
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    ridelog_core::logging::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Report { export, output }) => {
            let config = load_config(cli.config.as_deref())?;
            cmd_report(&config, export, output)
        }
        Some(Commands::Top {
            metric,
            count,
            export,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            cmd_top(&config, metric, count, export)
        }
        Some(Commands::Init { force }) => cmd_init(cli.config.as_deref(), force),
        None => {
            // Default to "report" command
            let config = load_config(cli.config.as_deref())?;
            cmd_report(&config, None, None)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn cmd_report(config: &Config, export: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let export = export.unwrap_or_else(|| config.data.export_path.clone());
    let output_dir = output.unwrap_or_else(|| config.data.output_dir.clone());

    let window = config.filter.window()?;
    let mut workouts = extract_workouts(&export, &config.filter.workout_types, window)?;
    if workouts.is_empty() {
        println!("No matching workouts found in {}", export.display());
        return Ok(());
    }

    // Samples only matter inside the span the workouts cover
    let sample_window = TimeWindow::spanning(&workouts);
    let samples = extract_samples(
        &export,
        &[
            SampleKind::HeartRate,
            SampleKind::CyclingDistance,
            SampleKind::ActiveEnergy,
        ],
        sample_window,
    )?;

    attach_heart_rate(&mut workouts, &samples.heart_rate);
    attach_sample_totals(&mut workouts, &samples.distance, &samples.energy);

    if let Some(route_path) = &config.routes.summary_path {
        let routes = load_route_summaries(route_path)?;
        if !routes.is_empty() {
            attach_elevation(&mut workouts, &routes, config.routes.tolerance_minutes);
        }
    }

    let mut zones = build_zones(config.heart_rate.max_hr, &config.heart_rate.zones);
    zone_totals(&workouts, &samples.heart_rate, &mut zones);

    let yearly = ridelog_core::aggregate::by_year(&workouts);
    let monthly = ridelog_core::aggregate::by_month(&workouts);
    let stats = ridelog_core::aggregate::overall(&workouts);

    std::fs::create_dir_all(&output_dir)?;
    ridelog_core::report::write_yearly_csv(&output_dir.join("yearly.csv"), &yearly, config.units)?;
    ridelog_core::report::write_monthly_csv(
        &output_dir.join("monthly.csv"),
        &monthly,
        config.units,
    )?;
    ridelog_core::report::write_workouts_csv(
        &output_dir.join("workouts.csv"),
        &workouts,
        config.units,
    )?;
    ridelog_core::report::write_zones_csv(&output_dir.join("zones.csv"), &zones)?;
    ridelog_core::report::write_overall_json(&output_dir.join("overall.json"), &stats)?;

    print_summary(&stats, &output_dir, config.units);

    Ok(())
}

fn cmd_top(config: &Config, metric: Metric, count: usize, export: Option<PathBuf>) -> Result<()> {
    let export = export.unwrap_or_else(|| config.data.export_path.clone());

    let window = config.filter.window()?;
    let mut workouts = extract_workouts(&export, &config.filter.workout_types, window)?;
    if workouts.is_empty() {
        println!("No matching workouts found in {}", export.display());
        return Ok(());
    }

    // Elevation ranking needs the route summaries applied first
    if let Some(route_path) = &config.routes.summary_path {
        let routes = load_route_summaries(route_path)?;
        if !routes.is_empty() {
            attach_elevation(&mut workouts, &routes, config.routes.tolerance_minutes);
        }
    }

    let top = top_workouts(&workouts, metric, count);
    if top.is_empty() {
        println!("No workouts carry {} data", metric);
        return Ok(());
    }

    println!("\nTop {} workouts by {}:\n", top.len(), metric);
    for (rank, workout) in top.iter().enumerate() {
        let Some(value) = metric.of(workout) else {
            continue;
        };
        let (value, label) = display_metric(metric, value, config.units);
        println!(
            "  {:>2}. {}  {:>8.1} {}  ({})",
            rank + 1,
            workout.start.format("%Y-%m-%d"),
            value,
            label,
            workout.source_name
        );
    }
    println!();

    Ok(())
}

fn cmd_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_config_path);

    if path.exists() && !force {
        println!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }

    Config::default().save_to(&path)?;
    println!("✓ Wrote default config to {}", path.display());

    Ok(())
}

fn display_metric(metric: Metric, value: f64, units: DisplayUnits) -> (f64, &'static str) {
    match metric {
        Metric::Distance => (units.distance.from_km(value), units.distance.label()),
        Metric::Duration => (value, "min"),
        Metric::ElevationGain => (units.elevation.from_metres(value), units.elevation.label()),
        Metric::Energy => (value, "kcal"),
    }
}

fn print_summary(stats: &OverallStats, output_dir: &Path, units: DisplayUnits) {
    let line = "=".repeat(60);
    let summary = &stats.summary;

    println!("\n{line}");
    println!("Ride Log Summary");
    println!("{line}");
    println!("\nTotal Rides: {}", summary.workouts);
    println!(
        "Total Distance: {:.1} {}",
        units.distance.from_km(summary.total_distance_km),
        units.distance.label()
    );
    println!(
        "Total Time: {:.1} hours",
        summary.total_duration_minutes / 60.0
    );
    println!(
        "Total Elevation Gain: {:.0} {}",
        units.elevation.from_metres(summary.total_elevation_gain_m),
        units.elevation.label()
    );
    println!("Total Calories: {:.0} kcal", summary.total_energy_kcal);

    println!(
        "\nAverage Distance: {:.1} {}",
        units.distance.from_km(summary.avg_distance_km),
        units.distance.label()
    );
    println!("Average Duration: {:.1} min", summary.avg_duration_minutes);
    println!(
        "Average Speed: {:.1} {}",
        units.distance.from_km(summary.avg_speed_kmh),
        units.distance.speed_label()
    );

    println!("\nYears Active: {}", stats.years_active);
    println!("First Ride: {}", fmt_date(stats.first_workout));
    println!("Last Ride: {}", fmt_date(stats.last_workout));

    println!(
        "\nWorkouts with Elevation Data: {}",
        stats.workouts_with_elevation
    );
    println!("Workouts with Heart Rate Data: {}", stats.workouts_with_hr);
    if let Some(avg_hr) = stats.avg_heart_rate {
        println!("Average Heart Rate: {:.1} bpm", avg_hr);
    }

    println!("\n{line}");
    println!("Reports saved to:");
    println!("{}", output_dir.display());
    println!("{line}\n");
}

fn fmt_date(at: Option<NaiveDateTime>) -> String {
    at.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}
