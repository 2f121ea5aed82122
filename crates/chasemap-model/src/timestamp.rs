//! Wall-clock timestamps as they appear in exported game documents.
//!
//! The exporter writes naive local date-times (`2025-06-01T14:03:22.517301`),
//! sometimes with a space instead of the `T`. Documents edited by hand or
//! produced by other tools may carry an RFC 3339 offset; those are
//! converted to this host's local wall-clock time, the clock the exporter
//! and the server's "now" both use.
//!
//! Use the serde helpers with `#[serde(with = "crate::timestamp")]` for a
//! required field and `#[serde(default, with = "crate::timestamp::option")]`
//! for a nullable one.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

use crate::ModelError;

/// A naive wall-clock instant. All comparisons inside Chasemap are done
/// between timestamps from the same clock (the document's and the
/// caller's `now`), so no zone information is carried.
pub type Timestamp = NaiveDateTime;

/// Layouts tried in order before falling back to RFC 3339.
/// `%.f` also matches when there is no fractional part.
const LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Output layout. Fractional seconds are printed only when non-zero.
const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parses a timestamp string in any accepted layout.
///
/// # Errors
/// Returns [`ModelError::InvalidTimestamp`] when no layout matches.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, ModelError> {
    let raw = raw.trim();
    for layout in LAYOUTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, layout) {
            return Ok(ts);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local).naive_local())
        .map_err(|_| ModelError::InvalidTimestamp(raw.to_string()))
}

pub fn serialize<S: Serializer>(
    ts: &Timestamp,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&ts.format(FORMAT))
}

pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Timestamp, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Helpers for nullable timestamps. `null`, a missing field, and an empty
/// string all read as `None`.
pub mod option {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{parse_timestamp, Timestamp, FORMAT};

    pub fn serialize<S: Serializer>(
        ts: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.collect_str(&ts.format(FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_timestamp(raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
