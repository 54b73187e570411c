//! Streaming extraction of typed records from a fitness export archive.
//!
//! The export is one large flat XML document whose `<Workout>` and `<Record>`
//! elements carry all data in attributes. Archives grow to hundreds of
//! megabytes, so extraction is a single forward pass over the event stream:
//! the event buffer is cleared per element and its capacity released on a
//! fixed cadence, keeping peak memory bounded by the current element rather
//! than the archive.
//!
//! A malformed element is skipped and logged; a source that cannot be opened
//! or a broken document is fatal.

use crate::timestamp::parse_timestamp;
use crate::units::{distance_to_km, energy_to_kcal, KM_PER_MI};
use crate::{Error, HealthRecord, HrSample, QuantitySample, Result, SampleKind, Workout};
use chrono::NaiveDateTime;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Record `type` attribute identifying heart-rate samples
pub const HEART_RATE_TYPE: &str = "HKQuantityTypeIdentifierHeartRate";

/// Record `type` attribute identifying incremental cycling-distance samples
pub const CYCLING_DISTANCE_TYPE: &str = "HKQuantityTypeIdentifierDistanceCycling";

/// Record `type` attribute identifying incremental active-energy samples
pub const ACTIVE_ENERGY_TYPE: &str = "HKQuantityTypeIdentifierActiveEnergyBurned";

/// Workout `workoutActivityType` attribute for cycling sessions
pub const CYCLING_ACTIVITY_TYPE: &str = "HKWorkoutActivityTypeCycling";

/// Release buffer capacity and log progress every this many top-level elements
const SCAN_CHECKPOINT_EVERY: u64 = 10_000;

impl SampleKind {
    /// Map a record `type` attribute to a sample kind
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        match tag {
            HEART_RATE_TYPE => Some(SampleKind::HeartRate),
            CYCLING_DISTANCE_TYPE => Some(SampleKind::CyclingDistance),
            ACTIVE_ENERGY_TYPE => Some(SampleKind::ActiveEnergy),
            _ => None,
        }
    }
}

/// Inclusive time window, either bound optional
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimeWindow {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TimeWindow {
    /// Whether a timestamp falls inside the window (bounds inclusive)
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        if let Some(start) = self.start {
            if at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if at > end {
                return false;
            }
        }
        true
    }

    /// The smallest window covering every workout interval
    pub fn spanning(workouts: &[Workout]) -> Option<Self> {
        let start = workouts.iter().map(|w| w.start).min()?;
        let end = workouts.iter().map(|w| w.end).max()?;
        Some(Self {
            start: Some(start),
            end: Some(end),
        })
    }
}

/// Selects which records a stream yields.
///
/// Workout elements match when their activity type is in `workout_types`;
/// Record elements match when their type tag maps to one of `kinds`. An
/// empty list matches nothing of that category. The window, when set,
/// applies to the start timestamp of both categories.
#[derive(Clone, Debug, Default)]
pub struct RecordFilter {
    pub workout_types: Vec<String>,
    pub kinds: Vec<SampleKind>,
    pub window: Option<TimeWindow>,
}

impl RecordFilter {
    /// Filter matching only workouts of the given activity types
    pub fn workouts(activity_types: &[String], window: Option<TimeWindow>) -> Self {
        Self {
            workout_types: activity_types.to_vec(),
            kinds: Vec::new(),
            window,
        }
    }

    /// Filter matching only samples of the given kinds
    pub fn samples(kinds: &[SampleKind], window: Option<TimeWindow>) -> Self {
        Self {
            workout_types: Vec::new(),
            kinds: kinds.to_vec(),
            window,
        }
    }
}

/// Lazy stream of typed records from an export file, in archive order.
///
/// Each call to [`RecordStream::open`] re-parses from scratch; no state is
/// cached between runs. A mid-stream document error yields one `Err` item
/// and ends the stream.
pub struct RecordStream {
    reader: Reader<BufReader<File>>,
    buf: Vec<u8>,
    filter: RecordFilter,
    elements_seen: u64,
    yielded: u64,
    shrink_pending: bool,
    done: bool,
}

impl RecordStream {
    /// Open an export file for streaming extraction.
    ///
    /// Fails only when the file cannot be opened; document problems surface
    /// later as stream items.
    pub fn open(path: impl AsRef<Path>, filter: RecordFilter) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.trim_text(true);

        tracing::debug!("Opened export {}", path.as_ref().display());
        Ok(Self {
            reader,
            buf: Vec::new(),
            filter,
            elements_seen: 0,
            yielded: 0,
            shrink_pending: false,
            done: false,
        })
    }
}

impl Iterator for RecordStream {
    type Item = Result<HealthRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            self.buf.clear();
            if self.shrink_pending {
                // Give back capacity grown by oversized elements
                self.buf.shrink_to_fit();
                self.shrink_pending = false;
            }

            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let name = e.name();
                    let tag = name.as_ref();
                    if tag != b"Workout" && tag != b"Record" {
                        continue;
                    }

                    self.elements_seen += 1;
                    if self.elements_seen % SCAN_CHECKPOINT_EVERY == 0 {
                        self.shrink_pending = true;
                        tracing::debug!(
                            "Scanned {} top-level elements, yielded {} records",
                            self.elements_seen,
                            self.yielded
                        );
                    }

                    let parsed = if tag == b"Workout" {
                        parse_workout(e, &self.filter).map(|w| w.map(HealthRecord::Workout))
                    } else {
                        parse_record(e, &self.filter)
                    };

                    match parsed {
                        Ok(Some(record)) => {
                            self.yielded += 1;
                            return Some(Ok(record));
                        }
                        Ok(None) => continue,
                        Err(e) => {
                            tracing::warn!(
                                "Skipping malformed element #{}: {}",
                                self.elements_seen,
                                e
                            );
                            continue;
                        }
                    }
                }
                Ok(Event::Eof) => {
                    self.done = true;
                    tracing::info!(
                        "Extraction finished: {} records from {} top-level elements",
                        self.yielded,
                        self.elements_seen
                    );
                    return None;
                }
                Ok(_) => continue,
                Err(e) => {
                    // Document-level failure, not a single bad record
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

/// Extract all matching workouts in one pass
pub fn extract_workouts(
    path: impl AsRef<Path>,
    activity_types: &[String],
    window: Option<TimeWindow>,
) -> Result<Vec<Workout>> {
    let mut workouts = Vec::new();
    for record in RecordStream::open(path, RecordFilter::workouts(activity_types, window))? {
        if let HealthRecord::Workout(w) = record? {
            workouts.push(w);
        }
    }
    tracing::info!("Extracted {} matching workouts", workouts.len());
    Ok(workouts)
}

/// Samples collected from one extraction pass, grouped by kind
#[derive(Debug, Default)]
pub struct SampleSet {
    pub heart_rate: Vec<HrSample>,
    pub distance: Vec<QuantitySample>,
    pub energy: Vec<QuantitySample>,
}

/// Extract samples of the given kinds in one pass
pub fn extract_samples(
    path: impl AsRef<Path>,
    kinds: &[SampleKind],
    window: Option<TimeWindow>,
) -> Result<SampleSet> {
    let mut set = SampleSet::default();
    for record in RecordStream::open(path, RecordFilter::samples(kinds, window))? {
        match record? {
            HealthRecord::HeartRate(s) => set.heart_rate.push(s),
            HealthRecord::Distance(s) => set.distance.push(s),
            HealthRecord::Energy(s) => set.energy.push(s),
            HealthRecord::Workout(_) => {}
        }
    }
    tracing::info!(
        "Extracted {} heart-rate, {} distance, {} energy samples",
        set.heart_rate.len(),
        set.distance.len(),
        set.energy.len()
    );
    Ok(set)
}

fn parse_number(attr: &'static str, raw: &str) -> Result<f64> {
    raw.parse().map_err(|_| Error::Number {
        attr,
        value: raw.to_string(),
    })
}

fn parse_workout(e: &BytesStart<'_>, filter: &RecordFilter) -> Result<Option<Workout>> {
    let mut activity_type: Option<String> = None;
    let mut start_raw: Option<String> = None;
    let mut end_raw: Option<String> = None;
    let mut duration_raw: Option<String> = None;
    let mut distance_raw: Option<String> = None;
    let mut distance_unit = String::new();
    let mut energy_raw: Option<String> = None;
    let mut energy_unit = String::new();
    let mut source_name: Option<String> = None;

    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"workoutActivityType" => activity_type = Some(value.into_owned()),
            b"startDate" => start_raw = Some(value.into_owned()),
            b"endDate" => end_raw = Some(value.into_owned()),
            b"duration" => duration_raw = Some(value.into_owned()),
            b"totalDistance" => distance_raw = Some(value.into_owned()),
            b"distanceUnit" => distance_unit = value.into_owned(),
            b"totalEnergyBurned" => energy_raw = Some(value.into_owned()),
            b"energyUnit" => energy_unit = value.into_owned(),
            b"sourceName" => source_name = Some(value.into_owned()),
            _ => {}
        }
    }

    // An unlisted (or absent) activity type is not selected, not an error
    let Some(activity_type) = activity_type else {
        return Ok(None);
    };
    if !filter.workout_types.iter().any(|t| t == &activity_type) {
        return Ok(None);
    }

    let start = parse_timestamp(&start_raw.ok_or(Error::MissingAttr("startDate"))?)?;
    let end = parse_timestamp(&end_raw.ok_or(Error::MissingAttr("endDate"))?)?;

    if let Some(window) = &filter.window {
        if !window.contains(start) {
            return Ok(None);
        }
    }

    // The explicit duration attribute (already in minutes) is more accurate
    // than the start/end delta when both are present
    let mut duration_minutes = (end - start).num_seconds() as f64 / 60.0;
    if let Some(raw) = duration_raw {
        duration_minutes = parse_number("duration", &raw)?;
    }

    // Workout totals only distinguish miles from the working unit; metre
    // totals do not occur at the workout level
    let mut distance_km = 0.0;
    if let Some(raw) = distance_raw {
        distance_km = parse_number("totalDistance", &raw)?;
        if distance_unit == "mi" {
            distance_km *= KM_PER_MI;
        }
    }

    let mut energy_kcal = 0.0;
    if let Some(raw) = energy_raw {
        energy_kcal = energy_to_kcal(parse_number("totalEnergyBurned", &raw)?, &energy_unit);
    }

    let source_name = source_name.unwrap_or_else(|| "Unknown".to_string());

    Ok(Some(Workout::new(
        start,
        end,
        duration_minutes,
        distance_km,
        energy_kcal,
        source_name,
        activity_type,
    )))
}

fn parse_record(e: &BytesStart<'_>, filter: &RecordFilter) -> Result<Option<HealthRecord>> {
    let mut type_tag: Option<String> = None;
    let mut start_raw: Option<String> = None;
    let mut value_raw: Option<String> = None;
    let mut unit = String::new();
    let mut source_name = String::new();

    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"type" => type_tag = Some(value.into_owned()),
            b"startDate" => start_raw = Some(value.into_owned()),
            b"value" => value_raw = Some(value.into_owned()),
            b"unit" => unit = value.into_owned(),
            b"sourceName" => source_name = value.into_owned(),
            _ => {}
        }
    }

    let Some(kind) = type_tag.as_deref().and_then(SampleKind::from_type_tag) else {
        return Ok(None);
    };
    if !filter.kinds.contains(&kind) {
        return Ok(None);
    }

    let at = parse_timestamp(&start_raw.ok_or(Error::MissingAttr("startDate"))?)?;
    if let Some(window) = &filter.window {
        if !window.contains(at) {
            return Ok(None);
        }
    }

    let value = match value_raw {
        Some(raw) => parse_number("value", &raw)?,
        None => 0.0,
    };

    let record = match kind {
        SampleKind::HeartRate => HealthRecord::HeartRate(HrSample {
            at,
            bpm: value,
            source_name,
        }),
        SampleKind::CyclingDistance => HealthRecord::Distance(QuantitySample {
            at,
            value: distance_to_km(value, &unit),
        }),
        SampleKind::ActiveEnergy => HealthRecord::Energy(QuantitySample {
            at,
            value: energy_to_kcal(value, &unit),
        }),
    };
    Ok(Some(record))
}
