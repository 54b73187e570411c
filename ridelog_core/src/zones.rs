//! Heart-rate zone construction and step-hold time integration.
//!
//! Zone time is integrated from sparse samples with a zero-order hold: the
//! heart rate is assumed constant from one observation until the next, so
//! each adjacent pair of samples contributes its full elapsed time to the
//! zone containing the earlier value. A lone sample establishes no elapsed
//! time at all.
//!
//! Zones are an ordered list and membership is first-match. The list is
//! deliberately not validated for gaps or overlaps; a misconfigured table
//! behaves order-dependently rather than failing.

use crate::{HeartRateZone, HrSample, Workout};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A zone expressed as fractions of a reference maximum heart rate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneBand {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

/// The conventional five-band table
pub fn default_bands() -> Vec<ZoneBand> {
    [
        ("Zone 1 (Recovery)", 0.0, 0.60),
        ("Zone 2 (Endurance)", 0.60, 0.70),
        ("Zone 3 (Aerobic)", 0.70, 0.80),
        ("Zone 4 (Threshold)", 0.80, 0.90),
        ("Zone 5 (Maximum)", 0.90, 1.00),
    ]
    .into_iter()
    .map(|(name, lower, upper)| ZoneBand {
        name: name.to_string(),
        lower,
        upper,
    })
    .collect()
}

/// Derive BPM zone ranges from a reference maximum heart rate.
///
/// Fractional bounds scale against `max_hr` and truncate to whole BPM. The
/// last band is always open-ended at the top, whatever its configured upper
/// fraction; readings above the nominal maximum still land in the top zone.
pub fn build_zones(max_hr: u32, bands: &[ZoneBand]) -> Vec<HeartRateZone> {
    bands
        .iter()
        .enumerate()
        .map(|(i, band)| {
            let max_bpm = if i + 1 == bands.len() {
                None
            } else {
                Some((f64::from(max_hr) * band.upper) as u32)
            };
            HeartRateZone {
                name: band.name.clone(),
                min_bpm: (f64::from(max_hr) * band.lower) as u32,
                max_bpm,
                minutes: 0.0,
            }
        })
        .collect()
}

/// Minutes spent in each zone within one window, by zone name.
///
/// Samples are filtered to `[start, end]` inclusive and sorted; fewer than
/// two remaining samples yields zero minutes everywhere. Each adjacent pair
/// attributes its full elapsed time to the first zone containing the
/// earlier sample's value; a value matching no zone drops that interval.
/// The final sample contributes no trailing interval.
pub fn zone_time(
    samples: &[HrSample],
    start: NaiveDateTime,
    end: NaiveDateTime,
    zones: &[HeartRateZone],
) -> HashMap<String, f64> {
    let mut minutes: HashMap<String, f64> =
        zones.iter().map(|z| (z.name.clone(), 0.0)).collect();

    let mut in_window: Vec<&HrSample> = samples
        .iter()
        .filter(|s| s.at >= start && s.at <= end)
        .collect();
    if in_window.len() < 2 {
        return minutes;
    }
    in_window.sort_by_key(|s| s.at);

    for pair in in_window.windows(2) {
        let elapsed = (pair[1].at - pair[0].at).num_seconds() as f64 / 60.0;
        if let Some(zone) = zones.iter().find(|z| z.contains(pair[0].bpm)) {
            if let Some(m) = minutes.get_mut(&zone.name) {
                *m += elapsed;
            }
        }
    }

    minutes
}

/// Accumulate zone time across every workout into the zone list
pub fn zone_totals(workouts: &[Workout], samples: &[HrSample], zones: &mut [HeartRateZone]) {
    tracing::info!(
        "Integrating zone time across {} workouts from {} samples",
        workouts.len(),
        samples.len()
    );

    for workout in workouts {
        let per_workout = zone_time(samples, workout.start, workout.end, zones);
        for zone in zones.iter_mut() {
            if let Some(m) = per_workout.get(&zone.name) {
                zone.minutes += m;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn hr(at: NaiveDateTime, bpm: f64) -> HrSample {
        HrSample {
            at,
            bpm,
            source_name: String::new(),
        }
    }

    fn zone(name: &str, min: u32, max: Option<u32>) -> HeartRateZone {
        HeartRateZone {
            name: name.into(),
            min_bpm: min,
            max_bpm: max,
            minutes: 0.0,
        }
    }

    fn three_zones() -> Vec<HeartRateZone> {
        vec![
            zone("Zone 2", 90, Some(120)),
            zone("Zone 3", 120, Some(150)),
            zone("Zone 4", 150, Some(180)),
        ]
    }

    #[test]
    fn test_step_hold_attributes_interval_to_earlier_sample() {
        let samples = vec![
            hr(dt(10, 0), 100.0),
            hr(dt(10, 10), 130.0),
            hr(dt(10, 20), 160.0),
            hr(dt(10, 30), 140.0),
        ];

        let minutes = zone_time(&samples, dt(10, 0), dt(10, 30), &three_zones());

        assert!((minutes["Zone 2"] - 10.0).abs() < 1e-9);
        assert!((minutes["Zone 3"] - 10.0).abs() < 1e-9);
        assert!((minutes["Zone 4"] - 10.0).abs() < 1e-9);
        // The final 140 reading opens no interval of its own
        let total: f64 = minutes.values().sum();
        assert!((total - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_fewer_than_two_samples_yields_all_zeros() {
        let zones = three_zones();

        let empty = zone_time(&[], dt(10, 0), dt(11, 0), &zones);
        assert!(empty.values().all(|&m| m == 0.0));
        assert_eq!(empty.len(), zones.len());

        let lone = vec![hr(dt(10, 15), 130.0)];
        let single = zone_time(&lone, dt(10, 0), dt(11, 0), &zones);
        assert!(single.values().all(|&m| m == 0.0));
    }

    #[test]
    fn test_unmatched_value_drops_interval_silently() {
        // 50 bpm is below every configured zone
        let samples = vec![
            hr(dt(10, 0), 50.0),
            hr(dt(10, 10), 130.0),
            hr(dt(10, 20), 130.0),
        ];

        let minutes = zone_time(&samples, dt(10, 0), dt(10, 30), &three_zones());

        assert!((minutes["Zone 2"]).abs() < 1e-9);
        assert!((minutes["Zone 3"] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_match_wins_for_overlapping_zones() {
        let zones = vec![zone("Broad", 90, Some(150)), zone("Narrow", 120, Some(150))];
        let samples = vec![hr(dt(10, 0), 130.0), hr(dt(10, 10), 130.0)];

        let minutes = zone_time(&samples, dt(10, 0), dt(10, 30), &zones);

        assert!((minutes["Broad"] - 10.0).abs() < 1e-9);
        assert!((minutes["Narrow"]).abs() < 1e-9);
    }

    #[test]
    fn test_build_zones_truncates_and_opens_top() {
        let zones = build_zones(185, &default_bands());

        assert_eq!(zones.len(), 5);
        assert_eq!(zones[0].min_bpm, 0);
        assert_eq!(zones[0].max_bpm, Some(111));
        assert_eq!(zones[1].min_bpm, 111);
        assert_eq!(zones[1].max_bpm, Some(129));
        assert_eq!(zones[2].max_bpm, Some(148));
        assert_eq!(zones[3].max_bpm, Some(166));
        assert_eq!(zones[4].min_bpm, 166);
        assert_eq!(zones[4].max_bpm, None);
    }

    #[test]
    fn test_last_band_is_open_regardless_of_fraction() {
        let bands = vec![
            ZoneBand {
                name: "Low".into(),
                lower: 0.0,
                upper: 0.50,
            },
            ZoneBand {
                name: "High".into(),
                lower: 0.50,
                upper: 0.95,
            },
        ];

        let zones = build_zones(200, &bands);
        assert_eq!(zones[1].max_bpm, None);
        assert!(zones[1].contains(250.0));
    }

    #[test]
    fn test_zone_totals_accumulates_across_workouts() {
        let mut zones = three_zones();
        let samples = vec![
            // First workout window
            hr(dt(8, 0), 100.0),
            hr(dt(8, 10), 100.0),
            // Second workout window
            hr(dt(10, 0), 130.0),
            hr(dt(10, 20), 130.0),
        ];
        let workouts = vec![
            Workout::new(
                dt(8, 0),
                dt(8, 30),
                30.0,
                0.0,
                0.0,
                "Watch".into(),
                "Cycling".into(),
            ),
            Workout::new(
                dt(10, 0),
                dt(10, 30),
                30.0,
                0.0,
                0.0,
                "Watch".into(),
                "Cycling".into(),
            ),
        ];

        zone_totals(&workouts, &samples, &mut zones);

        assert!((zones[0].minutes - 10.0).abs() < 1e-9);
        assert!((zones[1].minutes - 20.0).abs() < 1e-9);
        assert!((zones[2].minutes).abs() < 1e-9);
        assert!((zones[1].hours() - 20.0 / 60.0).abs() < 1e-9);
    }
}
