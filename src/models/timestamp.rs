//! ISO-8601 timestamp encoding for the JSON documents.
//!
//! Timestamps are written as RFC 3339 in UTC with microsecond precision.
//! Older documents carry naive local times (no offset); those are read back
//! as local time.

use chrono::{ DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc };
use serde::{ de, Deserialize, Deserializer, Serializer };

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer
{
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where D: Deserializer<'de>
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(de::Error::custom)
}

pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT).map_err(|e|
        format!("invalid timestamp '{}': {}", raw, e)
    )?;
    Ok(match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    })
}
