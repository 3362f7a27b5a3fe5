//! Date and ISO-week helpers.
//!
//! Pure functions over [`NaiveDate`].  Date arithmetic goes through
//! chrono's checked operations and saturates at the representable range.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Serialize, Serializer};

use crate::error::{CalendarError, Result};

/// ISO-8601 week number (1..=53).
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// ISO weekday, Monday = 1 … Sunday = 7.
pub fn iso_weekday(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

/// The Monday..Sunday dates of the ISO week containing `date`.
pub fn days_of_iso_week(date: NaiveDate) -> [NaiveDate; 7] {
    let back = u64::from(date.weekday().num_days_from_monday());
    let monday = date.checked_sub_days(Days::new(back)).unwrap_or(date);
    std::array::from_fn(|i| {
        monday
            .checked_add_days(Days::new(i as u64))
            .unwrap_or(NaiveDate::MAX)
    })
}

/// First-of-month dates of every month intersecting `[start, end)`.
pub fn month_starts(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut starts = Vec::new();
    if start >= end {
        return starts;
    }
    let mut cursor = first_of_month(start);
    while cursor < end {
        starts.push(cursor);
        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    starts
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Number of grid columns for `[start, end)`: `ceil(days / 7)`.
pub fn weeks_in_range(start: NaiveDate, end: NaiveDate) -> usize {
    let days = (end - start).num_days();
    if days <= 0 {
        0
    } else {
        ((days + 6) / 7) as usize
    }
}

/// Dates visited when stepping one week at a time from `start` while
/// staying before `end`.  One entry per grid column.
pub fn week_steps(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut steps = Vec::with_capacity(weeks_in_range(start, end));
    let mut cursor = start;
    while cursor < end {
        steps.push(cursor);
        match cursor.checked_add_days(Days::new(7)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    steps
}

/// The date a stepped week is anchored on: the first day of a month if
/// the week contains one, otherwise the stepped date itself.
pub fn week_anchor(stepped: NaiveDate) -> NaiveDate {
    days_of_iso_week(stepped)
        .into_iter()
        .find(|d| d.day() == 1)
        .unwrap_or(stepped)
}

/// Ordered column keys for `[start, end)`.
pub fn week_keys_between(start: NaiveDate, end: NaiveDate) -> Vec<WeekKey> {
    week_steps(start, end)
        .into_iter()
        .map(|d| WeekKey::of(week_anchor(d)))
        .collect()
}

// ─── WeekKey ────────────────────────────────────────────────────────────

/// A grid column identifier: ISO week-numbering year and ISO week.
///
/// The year is the ISO year, not the calendar year, so the days of one
/// physical week always share a key: 2020-12-31 and 2021-01-01 are both
/// `2020-53`, and 2024-12-31 is `2025-1`.  Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekKey {
    pub fn new(year: i32, week: u32) -> Self {
        WeekKey { year, week }
    }

    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        WeekKey {
            year: iso.year(),
            week: iso.week(),
        }
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.week)
    }
}

impl FromStr for WeekKey {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| CalendarError::InvalidDate {
            value: s.to_string(),
            reason: reason.to_string(),
        };
        // rsplit so that negative years keep their sign
        let (year, week) = s.rsplit_once('-').ok_or_else(|| invalid("expected YYYY-W"))?;
        let year: i32 = year.parse().map_err(|_| invalid("bad year"))?;
        let week: u32 = week.parse().map_err(|_| invalid("bad week"))?;
        if !(1..=53).contains(&week) {
            return Err(invalid("week out of range"));
        }
        Ok(WeekKey { year, week })
    }
}

impl Serialize for WeekKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ─── DateRange ──────────────────────────────────────────────────────────

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Parse both bounds from `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(DateRange {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }

    /// A range is empty (not an error) when `start >= end`.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days().max(0)
    }

    pub fn weeks(&self) -> usize {
        weeks_in_range(self.start, self.end)
    }

    /// Whether the range touches more than one calendar year.
    pub fn is_multi_year(&self) -> bool {
        match self.end.pred_opt() {
            Some(last) if !self.is_empty() => last.year() != self.start.year(),
            _ => false,
        }
    }

    pub fn month_starts(&self) -> Vec<NaiveDate> {
        month_starts(self.start, self.end)
    }
}

fn parse_bound(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| CalendarError::InvalidDate {
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_week_year_boundaries() {
        assert_eq!(iso_week(ymd(2021, 1, 1)), 53);
        assert_eq!(iso_week(ymd(2021, 1, 4)), 1);
        assert_eq!(iso_week(ymd(2024, 12, 30)), 1);
        assert_eq!(iso_week(ymd(2015, 12, 31)), 53);
        assert_eq!(iso_week(ymd(2023, 6, 15)), 24);
    }

    #[test]
    fn test_iso_weekday_row_law() {
        assert_eq!(iso_weekday(ymd(2021, 1, 4)), 1); // Monday
        assert_eq!(iso_weekday(ymd(2021, 1, 10)), 7); // Sunday
        for offset in 0..14 {
            let d = ymd(2021, 1, 1) + chrono::Duration::days(offset);
            let row = iso_weekday(d) - 1;
            assert!(row <= 6);
        }
    }

    #[test]
    fn test_days_of_iso_week() {
        let days = days_of_iso_week(ymd(2021, 1, 1));
        assert_eq!(days[0], ymd(2020, 12, 28));
        assert_eq!(days[6], ymd(2021, 1, 3));
        // a Monday is its own week start
        assert_eq!(days_of_iso_week(ymd(2021, 1, 4))[0], ymd(2021, 1, 4));
        assert_eq!(days_of_iso_week(ymd(2021, 1, 10))[6], ymd(2021, 1, 10));
    }

    #[test]
    fn test_month_starts() {
        let starts = month_starts(ymd(2020, 11, 15), ymd(2021, 2, 1));
        assert_eq!(starts, vec![ymd(2020, 11, 1), ymd(2020, 12, 1), ymd(2021, 1, 1)]);
        assert_eq!(month_starts(ymd(2021, 3, 1), ymd(2021, 3, 2)), vec![ymd(2021, 3, 1)]);
        assert!(month_starts(ymd(2021, 3, 1), ymd(2021, 3, 1)).is_empty());
        assert!(month_starts(ymd(2021, 3, 5), ymd(2021, 3, 1)).is_empty());
    }

    #[test]
    fn test_weeks_in_range() {
        assert_eq!(weeks_in_range(ymd(2021, 1, 1), ymd(2021, 1, 8)), 1);
        assert_eq!(weeks_in_range(ymd(2021, 1, 1), ymd(2021, 1, 9)), 2);
        assert_eq!(weeks_in_range(ymd(2021, 1, 4), ymd(2021, 2, 1)), 4);
        assert_eq!(weeks_in_range(ymd(2021, 1, 4), ymd(2021, 1, 4)), 0);
        assert_eq!(weeks_in_range(ymd(2021, 1, 8), ymd(2021, 1, 4)), 0);
    }

    #[test]
    fn test_week_anchor_prefers_first_of_month() {
        // week of 2021-03-01 (Monday) anchors on the 1st itself
        assert_eq!(week_anchor(ymd(2021, 3, 3)), ymd(2021, 3, 1));
        // week 2021-01-25..31 contains no 1st
        assert_eq!(week_anchor(ymd(2021, 1, 27)), ymd(2021, 1, 27));
        // the anchor may lie before the stepped date's year
        assert_eq!(week_anchor(ymd(2020, 12, 29)), ymd(2021, 1, 1));
    }

    #[test]
    fn test_week_keys_between() {
        let keys = week_keys_between(ymd(2020, 12, 21), ymd(2021, 1, 18));
        let rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, vec!["2020-52", "2020-53", "2021-1", "2021-2"]);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_week_key_no_duplicates_around_2000() {
        // Calendar-year labelling would give "2000-52" twice here.
        let keys = week_keys_between(ymd(1999, 12, 20), ymd(2001, 1, 8));
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(keys.len(), weeks_in_range(ymd(1999, 12, 20), ymd(2001, 1, 8)));
        assert_eq!(WeekKey::of(ymd(2000, 1, 1)).to_string(), "1999-52");
        assert_eq!(WeekKey::of(ymd(2000, 12, 31)).to_string(), "2000-52");
    }

    #[test]
    fn test_week_key_parse() {
        assert_eq!("2021-1".parse::<WeekKey>().unwrap(), WeekKey::new(2021, 1));
        assert_eq!("2020-53".parse::<WeekKey>().unwrap(), WeekKey::new(2020, 53));
        assert!("2020-54".parse::<WeekKey>().is_err());
        assert!("2020".parse::<WeekKey>().is_err());
        assert_eq!(serde_json::to_string(&WeekKey::new(2021, 7)).unwrap(), "\"2021-7\"");
    }

    #[test]
    fn test_date_range() {
        let range = DateRange::parse("2021-12-27", "2022-01-03").unwrap();
        assert_eq!(range.days(), 7);
        assert_eq!(range.weeks(), 1);
        assert!(range.is_multi_year());
        assert!(range.contains(ymd(2022, 1, 2)));
        assert!(!range.contains(ymd(2022, 1, 3)));

        // end is exclusive, so this range stays within 2021
        assert!(!DateRange::parse("2021-12-01", "2022-01-01").unwrap().is_multi_year());
        assert!(DateRange::parse("2021-13-01", "2022-01-01").is_err());
        assert!(DateRange::parse("2021-02-01", "2021-01-01").unwrap().is_empty());
    }
}
