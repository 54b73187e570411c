//! Unit normalization and display conversion.
//!
//! The export tags every quantity with a unit string. The pipeline works in
//! kilometres / metres / kilocalories; the report layer converts to the
//! configured display units on the way out.

use serde::{Deserialize, Serialize};

/// Kilometres per statute mile
pub const KM_PER_MI: f64 = 1.60934;

/// Feet per metre
pub const FT_PER_M: f64 = 3.28084;

/// Normalize a distance quantity to kilometres from its unit tag.
///
/// `mi` converts, `m` converts; `km` and unrecognized tags pass through
/// unchanged (the export's own working unit is km).
pub fn distance_to_km(value: f64, unit: &str) -> f64 {
    match unit {
        "mi" => value * KM_PER_MI,
        "m" => value / 1000.0,
        _ => value,
    }
}

/// Normalize an energy quantity to kilocalories from its unit tag.
///
/// `Cal` is the dietary Calorie, already kcal; `cal` is the small calorie;
/// unrecognized tags pass through as kcal.
pub fn energy_to_kcal(value: f64, unit: &str) -> f64 {
    match unit {
        "cal" => value / 1000.0,
        _ => value,
    }
}

/// Distance unit used for report output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Km,
    #[default]
    Miles,
}

impl DistanceUnit {
    /// Convert a kilometre quantity into this display unit
    pub fn from_km(self, km: f64) -> f64 {
        match self {
            DistanceUnit::Km => km,
            DistanceUnit::Miles => km / KM_PER_MI,
        }
    }

    /// Unit label for column headers and console output
    pub fn label(self) -> &'static str {
        match self {
            DistanceUnit::Km => "km",
            DistanceUnit::Miles => "mi",
        }
    }

    /// Speed label for the matching speed unit (km/h or mph)
    pub fn speed_label(self) -> &'static str {
        match self {
            DistanceUnit::Km => "km/h",
            DistanceUnit::Miles => "mph",
        }
    }
}

/// Elevation unit used for report output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElevationUnit {
    #[serde(rename = "m")]
    Metres,
    #[default]
    #[serde(rename = "ft")]
    Feet,
}

impl ElevationUnit {
    /// Convert a metre quantity into this display unit
    pub fn from_metres(self, metres: f64) -> f64 {
        match self {
            ElevationUnit::Metres => metres,
            ElevationUnit::Feet => metres * FT_PER_M,
        }
    }

    /// Unit label for column headers and console output
    pub fn label(self) -> &'static str {
        match self {
            ElevationUnit::Metres => "m",
            ElevationUnit::Feet => "ft",
        }
    }
}

/// Display unit pair for report output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayUnits {
    #[serde(default)]
    pub distance: DistanceUnit,
    #[serde(default)]
    pub elevation: ElevationUnit,
}
