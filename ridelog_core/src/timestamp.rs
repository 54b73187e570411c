//! Export timestamp parsing.
//!
//! The export writes timestamps as `YYYY-MM-DD HH:MM:SS`, optionally followed
//! by a space and a signed 4-digit UTC offset (e.g. `2025-01-11 12:27:45
//! -0800`). The offset is discarded: the whole pipeline works in naive local
//! time, which is what the wall-clock workout windows are recorded in.

use crate::{Error, Result};
use chrono::NaiveDateTime;

const EXPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse an export timestamp, dropping a trailing UTC offset if present.
///
/// A non-conforming string is an error; callers inside the extractor treat
/// that as a skippable record-level failure, direct callers (e.g. config date
/// bounds) propagate it.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let text = raw.trim();
    let body = match text.rsplit_once(' ') {
        Some((head, tail)) if is_offset(tail) => head,
        _ => text,
    };

    NaiveDateTime::parse_from_str(body, EXPORT_FORMAT).map_err(|source| Error::Timestamp {
        raw: raw.to_string(),
        source,
    })
}

/// A signed 4-digit offset such as `-0800` or `+0130`
fn is_offset(tail: &str) -> bool {
    let mut chars = tail.chars();
    tail.len() == 5
        && matches!(chars.next(), Some('+') | Some('-'))
        && chars.all(|c| c.is_ascii_digit())
}
