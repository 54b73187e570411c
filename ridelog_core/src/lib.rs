#![forbid(unsafe_code)]

//! Core pipeline for analyzing personal fitness-tracker exports.
//!
//! This crate provides:
//! - Streaming extraction of typed records from the export archive
//! - Correlation of point samples into workout time windows
//! - Step-hold integration of heart-rate samples into named zones
//! - Grouped aggregation with ratio-of-sums semantics
//! - Elevation application, report writers, configuration

pub mod types;
pub mod error;
pub mod timestamp;
pub mod units;
pub mod extract;
pub mod correlate;
pub mod zones;
pub mod aggregate;
pub mod elevation;
pub mod report;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use extract::{
    extract_samples, extract_workouts, RecordFilter, RecordStream, SampleSet, TimeWindow,
};
pub use correlate::{attach_heart_rate, attach_sample_totals};
pub use elevation::{attach_elevation, load_route_summaries, RouteElevation};
pub use zones::{build_zones, zone_time, zone_totals};
pub use aggregate::{top_workouts, Metric};
pub use timestamp::parse_timestamp;
pub use units::DisplayUnits;
