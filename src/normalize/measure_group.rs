//! Parsing of a single module's measurement group from a station's `measures`.
//!
//! Netatmo reports three shapes:
//!
//! ```json
//! {"type": ["temperature", "humidity"], "res": {"1536149253": [18.1, 74]}}
//! {"rain_60min": 0.2, "rain_24h": 1.4, "rain_live": 0, "rain_timeutc": 1536149265}
//! {"wind_strength": 9, "wind_angle": 240, "gust_strength": 17, "gust_angle": 250, "wind_timeutc": 1536149270}
//! ```
//!
//! Rain and wind groups are recognised only by their first key.

use crate::normalize::error::MalformedGroup;
use crate::normalize::table::Cell;
use serde_json::{Map, Value};

pub const RAIN_FIELDS: [&str; 3] = ["rain_60min", "rain_24h", "rain_live"];
pub const RAIN_TIMESTAMP: &str = "rain_timeutc";

pub const WIND_FIELDS: [&str; 4] = ["wind_strength", "wind_angle", "gust_strength", "gust_angle"];
pub const WIND_TIMESTAMP: &str = "wind_timeutc";

/// Suffix of the companion column holding a field's measurement time.
pub const TIMESTAMP_SUFFIX: &str = "_utc_timestamp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// `type` + `res` layout.
    Generic,
    /// First key is `rain_60min`.
    Rain,
    /// First key is `wind_strength` and wind parsing is enabled.
    Wind,
}

impl GroupKind {
    pub fn classify(group: &Map<String, Value>, wind: bool) -> GroupKind {
        match group.keys().next().map(String::as_str) {
            Some(first) if first == RAIN_FIELDS[0] => GroupKind::Rain,
            Some(first) if wind && first == WIND_FIELDS[0] => GroupKind::Wind,
            _ => GroupKind::Generic,
        }
    }
}

/// A well-formed group: field names, their values and one shared timestamp.
///
/// `fields` and `values` are aligned by position. If the API sent fewer
/// values than names, the trailing names get a timestamp column but no value.
#[derive(Debug, Clone, PartialEq)]
pub struct Readings {
    pub fields: Vec<String>,
    pub values: Vec<Cell>,
    pub timestamp: i64,
}

/// The replacement for a group that could not be read.
///
/// `declared` holds the field names the group announced before it turned out
/// to be unusable; each of them is reported as missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Fallback {
    pub declared: Vec<String>,
    pub cause: MalformedGroup,
}

impl Fallback {
    fn empty(cause: MalformedGroup) -> Self {
        Self {
            declared: Vec::new(),
            cause,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedGroup {
    Readings(Readings),
    Fallback(Fallback),
}

impl ParsedGroup {
    /// The `(column, cell)` pairs this group contributes to a station row:
    /// all values first, then one `<field>_utc_timestamp` per field.
    pub fn entries(&self) -> Vec<(String, Cell)> {
        match self {
            ParsedGroup::Readings(readings) => {
                let values = readings
                    .fields
                    .iter()
                    .zip(&readings.values)
                    .map(|(field, value)| (field.clone(), value.clone()));
                let timestamps = readings.fields.iter().map(|field| {
                    (
                        format!("{field}{TIMESTAMP_SUFFIX}"),
                        Cell::Timestamp(readings.timestamp),
                    )
                });
                values.chain(timestamps).collect()
            }
            ParsedGroup::Fallback(fallback) => {
                let values = fallback
                    .declared
                    .iter()
                    .map(|field| (field.clone(), Cell::Missing));
                let timestamps = fallback
                    .declared
                    .iter()
                    .map(|field| (format!("{field}{TIMESTAMP_SUFFIX}"), Cell::Missing));
                values.chain(timestamps).collect()
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ParsedGroup::Fallback(_))
    }
}

/// Reads one measurement group. Never fails: unreadable groups come back as
/// [`ParsedGroup::Fallback`] carrying the reason.
pub fn parse_group(group: &Value, wind: bool) -> ParsedGroup {
    let result = match group.as_object() {
        None => Err(Fallback::empty(MalformedGroup::NotAnObject)),
        Some(object) => match GroupKind::classify(object, wind) {
            GroupKind::Generic => parse_generic(object),
            GroupKind::Rain => parse_fixed(object, &RAIN_FIELDS, RAIN_TIMESTAMP),
            GroupKind::Wind => parse_fixed(object, &WIND_FIELDS, WIND_TIMESTAMP),
        },
    };
    match result {
        Ok(readings) => ParsedGroup::Readings(readings),
        Err(fallback) => ParsedGroup::Fallback(fallback),
    }
}

fn parse_generic(object: &Map<String, Value>) -> Result<Readings, Fallback> {
    let types = object
        .get("type")
        .ok_or_else(|| Fallback::empty(MalformedGroup::MissingKey("type")))?
        .as_array()
        .ok_or_else(|| Fallback::empty(MalformedGroup::WrongShape("type")))?;
    let fields = types
        .iter()
        .map(|name| name.as_str().map(str::to_owned))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| Fallback::empty(MalformedGroup::WrongShape("type")))?;

    let res = object
        .get("res")
        .ok_or_else(|| Fallback::empty(MalformedGroup::MissingKey("res")))?
        .as_object()
        .ok_or_else(|| Fallback::empty(MalformedGroup::WrongShape("res")))?;

    let mut entries = res.iter();
    let (raw_timestamp, values) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(Fallback {
                declared: fields,
                cause: MalformedGroup::TimestampCount(res.len()),
            })
        }
    };

    let timestamp = raw_timestamp
        .trim()
        .parse::<i64>()
        .map_err(|_| Fallback::empty(MalformedGroup::InvalidTimestamp(raw_timestamp.clone())))?;
    let values = values
        .as_array()
        .ok_or_else(|| Fallback::empty(MalformedGroup::WrongShape("res")))?
        .iter()
        .map(Cell::from_json)
        .collect();

    Ok(Readings {
        fields,
        values,
        timestamp,
    })
}

fn parse_fixed(
    object: &Map<String, Value>,
    fields: &[&'static str],
    timestamp_key: &'static str,
) -> Result<Readings, Fallback> {
    let values = fields
        .iter()
        .map(|&field| {
            object
                .get(field)
                .map(Cell::from_json)
                .ok_or_else(|| Fallback::empty(MalformedGroup::MissingKey(field)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let raw_timestamp = object
        .get(timestamp_key)
        .ok_or_else(|| Fallback::empty(MalformedGroup::MissingKey(timestamp_key)))?;
    let timestamp = timestamp_from_value(raw_timestamp).ok_or_else(|| {
        Fallback::empty(MalformedGroup::InvalidTimestamp(raw_timestamp.to_string()))
    })?;

    Ok(Readings {
        fields: fields.iter().map(|field| field.to_string()).collect(),
        values,
        timestamp,
    })
}

/// Epoch seconds from a JSON number or numeric string; fractions are truncated.
fn timestamp_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
