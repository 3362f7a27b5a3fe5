//! Activity records and the insertion-ordered series set.
//!
//! A series set maps a series name (e.g. `"work"`) to its records.  The
//! order in which series appear is significant: it decides which activity
//! takes the upper-left half of a shared calendar cell.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single time-stamped event.
///
/// `date` stays a raw string so that malformed input can be reported and
/// skipped instead of failing deserialization of the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub date: String,
    #[serde(rename = "type")]
    pub activity: String,
    /// Accepted for compatibility; only occurrences are counted.
    #[serde(default)]
    pub value: f64,
}

impl ActivityRecord {
    pub fn new(date: &str, activity: &str, value: f64) -> Self {
        ActivityRecord {
            date: date.to_string(),
            activity: activity.to_string(),
            value,
        }
    }

    /// Calendar date of the record, if the date string can be parsed.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.date)
    }
}

impl fmt::Display for ActivityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActivityRecord({}, {}, {})", self.date, self.activity, self.value)
    }
}

/// Parse the calendar date of a record.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the date as written, offset
/// ignored) and naive `YYYY-MM-DDTHH:MM:SS` timestamps.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

/// Insertion-ordered mapping of series name → records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    series: Vec<(String, Vec<ActivityRecord>)>,
}

impl SeriesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records to the named series, creating it at the end of the
    /// ordering if it does not exist yet.
    pub fn insert(&mut self, name: &str, records: Vec<ActivityRecord>) {
        match self.series.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => existing.extend(records),
            None => self.series.push((name.to_string(), records)),
        }
    }

    /// Builder-style [`SeriesSet::insert`].
    pub fn with(mut self, name: &str, records: Vec<ActivityRecord>) -> Self {
        self.insert(name, records);
        self
    }

    pub fn get(&self, name: &str) -> Option<&[ActivityRecord]> {
        self.series
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r.as_slice())
    }

    /// Series names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ActivityRecord])> {
        self.series.iter().map(|(n, r)| (n.as_str(), r.as_slice()))
    }

    /// Every record of every series, series by series.
    pub fn records(&self) -> impl Iterator<Item = &ActivityRecord> {
        self.series.iter().flat_map(|(_, r)| r.iter())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl Serialize for SeriesSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.series.iter().map(|(n, r)| (n, r)))
    }
}

impl<'de> Deserialize<'de> for SeriesSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SeriesSetVisitor;

        impl<'de> Visitor<'de> for SeriesSetVisitor {
            type Value = SeriesSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of series name to activity records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SeriesSet, A::Error> {
                let mut set = SeriesSet::new();
                while let Some((name, records)) =
                    access.next_entry::<String, Vec<ActivityRecord>>()?
                {
                    set.insert(&name, records);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SeriesSetVisitor)
    }
}
