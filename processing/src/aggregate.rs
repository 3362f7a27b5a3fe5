//! Aggregation of activity series into per-day, per-activity counts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use calgrid_common::record::SeriesSet;

/// Occurrence counts keyed by calendar date, then by activity.
///
/// Activities are referred to by their index in [`DayCount::activities`],
/// which is also their precedence when two share a cell.  Iteration over
/// days is chronological.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayCount {
    activities: Vec<String>,
    days: BTreeMap<NaiveDate, BTreeMap<usize, u32>>,
}

impl DayCount {
    /// Activity names in precedence order.
    pub fn activities(&self) -> &[String] {
        &self.activities
    }

    pub fn activity_index(&self, activity: &str) -> Option<usize> {
        self.activities.iter().position(|a| a == activity)
    }

    /// Count for one `(date, activity)` pair; zero if absent.
    pub fn get(&self, date: NaiveDate, activity: &str) -> u32 {
        self.activity_index(activity)
            .and_then(|i| self.days.get(&date)?.get(&i).copied())
            .unwrap_or(0)
    }

    /// Sum over all activities on `date`.
    pub fn total(&self, date: NaiveDate) -> u32 {
        self.days.get(&date).map(|m| m.values().sum()).unwrap_or(0)
    }

    /// Indices of the activities with a count on `date`, in precedence order.
    pub fn activities_on(&self, date: NaiveDate) -> impl Iterator<Item = usize> + '_ {
        self.days.get(&date).into_iter().flat_map(|m| m.keys().copied())
    }

    /// Days in chronological order with their per-activity counts.
    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &BTreeMap<usize, u32>)> {
        self.days.iter().map(|(d, m)| (*d, m))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn index_or_insert(&mut self, activity: &str) -> usize {
        match self.activity_index(activity) {
            Some(i) => i,
            None => {
                self.activities.push(activity.to_string());
                self.activities.len() - 1
            }
        }
    }
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    pub counts: DayCount,
    /// Records excluded because their date could not be parsed.
    pub skipped: usize,
}

/// Count every record by `(calendar date, record type)`.
///
/// Series names are registered as activities first, in insertion order;
/// record types that are not series names follow in first-seen order.
/// Records with an unparseable date are skipped and logged at debug level.
pub fn aggregate(series: &SeriesSet) -> Aggregation {
    let mut counts = DayCount::default();
    for name in series.names() {
        counts.index_or_insert(name);
    }

    let mut skipped = 0;
    for (name, records) in series.iter() {
        for record in records {
            let Some(date) = record.calendar_date() else {
                debug!("Skipping record with invalid date in series {name}: {record}");
                skipped += 1;
                continue;
            };
            let activity = counts.index_or_insert(&record.activity);
            *counts
                .days
                .entry(date)
                .or_default()
                .entry(activity)
                .or_insert(0) += 1;
        }
    }

    Aggregation { counts, skipped }
}
