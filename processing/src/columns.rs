//! Column index: maps calendar dates to zero-based grid columns.
//!
//! Columns are produced by stepping one week at a time from the range
//! start, so a range of `n` days always has `ceil(n / 7)` columns.  When the
//! range does not start on a Monday, the days after the last stepped week
//! belong to an ISO week that has no column; lookups for them return the
//! boundary sentinel and placement falls back to the nearest edge.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{self, DateRange, WeekKey};

/// One grid column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekColumn {
    pub key: WeekKey,
    /// The first day of a month falling in this week, or the stepped date.
    pub anchor: NaiveDate,
}

/// Where a date lands on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The date's week has its own column.
    Column(usize),
    /// Boundary miss, clamped to the nearest edge column.
    Edge(usize),
}

impl Placement {
    pub fn column(self) -> usize {
        match self {
            Placement::Column(c) | Placement::Edge(c) => c,
        }
    }

    pub fn is_edge(self) -> bool {
        matches!(self, Placement::Edge(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnIndex {
    columns: Vec<WeekColumn>,
}

impl ColumnIndex {
    /// Build the index for `range`.  Empty ranges give an empty index.
    pub fn build(range: &DateRange) -> Self {
        let columns = calendar::week_steps(range.start, range.end)
            .into_iter()
            .map(|stepped| {
                let anchor = calendar::week_anchor(stepped);
                WeekColumn {
                    key: WeekKey::of(anchor),
                    anchor,
                }
            })
            .collect();
        ColumnIndex { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[WeekColumn] {
        &self.columns
    }

    pub fn keys(&self) -> impl Iterator<Item = WeekKey> + '_ {
        self.columns.iter().map(|c| c.key)
    }

    /// Column of `date`, or `None` when its week has no column.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.position(WeekKey::of(date)).ok()
    }

    /// Column of `date`, falling back to the first or last column for
    /// dates whose week lies before or after the index.  `None` only for
    /// an empty index.
    pub fn resolve(&self, date: NaiveDate) -> Option<Placement> {
        if self.columns.is_empty() {
            return None;
        }
        Some(match self.position(WeekKey::of(date)) {
            Ok(column) => Placement::Column(column),
            Err(0) => Placement::Edge(0),
            Err(_) => Placement::Edge(self.columns.len() - 1),
        })
    }

    // Keys are strictly increasing, so a binary search locates a key or
    // the slot it would occupy.
    fn position(&self, key: WeekKey) -> Result<usize, usize> {
        self.columns.binary_search_by(|c| c.key.cmp(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end)
    }

    #[test]
    fn test_column_count_and_order() {
        let cases = [
            (ymd(2021, 1, 1), ymd(2021, 1, 8)),
            (ymd(2020, 11, 18), ymd(2021, 2, 3)),
            (ymd(2019, 6, 1), ymd(2022, 6, 1)),
            (ymd(2021, 1, 4), ymd(2021, 1, 5)),
        ];
        for (start, end) in cases {
            let index = ColumnIndex::build(&range(start, end));
            assert_eq!(index.len(), calendar::weeks_in_range(start, end));
            let keys: Vec<WeekKey> = index.keys().collect();
            assert!(keys.windows(2).all(|w| w[0] < w[1]), "{start}..{end}");
        }
    }

    #[test]
    fn test_empty_range() {
        let index = ColumnIndex::build(&range(ymd(2021, 1, 8), ymd(2021, 1, 1)));
        assert!(index.is_empty());
        assert_eq!(index.index_of(ymd(2021, 1, 4)), None);
        assert_eq!(index.resolve(ymd(2021, 1, 4)), None);
    }

    #[test]
    fn test_coverage_within_range() {
        let start = ymd(2020, 12, 2);
        let end = ymd(2021, 3, 17);
        let index = ColumnIndex::build(&range(start, end));
        let mut day = start;
        while day < end {
            if let Some(col) = index.index_of(day) {
                assert!(col < index.len());
                assert_eq!(index.resolve(day), Some(Placement::Column(col)));
            } else {
                // only the trailing partial week can miss
                assert!(day > index.columns().last().unwrap().anchor);
                assert_eq!(index.resolve(day), Some(Placement::Edge(index.len() - 1)));
            }
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_year_boundary_lookup() {
        // Both dates are in ISO week 2020-W53.
        let index = ColumnIndex::build(&range(ymd(2020, 12, 28), ymd(2021, 1, 11)));
        assert_eq!(index.index_of(ymd(2020, 12, 31)), Some(0));
        assert_eq!(index.index_of(ymd(2021, 1, 3)), Some(0));
        assert_eq!(index.index_of(ymd(2021, 1, 4)), Some(1));

        // 2024-12-30 is in ISO week 2025-W1, the same column as 2025-01-05.
        let index = ColumnIndex::build(&range(ymd(2024, 12, 23), ymd(2025, 1, 13)));
        assert_eq!(index.index_of(ymd(2024, 12, 30)), index.index_of(ymd(2025, 1, 5)));
        assert_eq!(index.index_of(ymd(2024, 12, 30)), Some(1));
    }

    #[test]
    fn test_anchor_on_month_start() {
        let index = ColumnIndex::build(&range(ymd(2021, 2, 24), ymd(2021, 3, 10)));
        assert_eq!(index.columns()[0].anchor, ymd(2021, 2, 24));
        // 2021-03-03 is stepped; its week starts on Monday 2021-03-01
        assert_eq!(index.columns()[1].anchor, ymd(2021, 3, 1));
        assert_eq!(index.index_of(ymd(2021, 3, 1)), Some(1));
    }

    #[test]
    fn test_resolve_clamps_outside_dates() {
        let index = ColumnIndex::build(&range(ymd(2021, 1, 6), ymd(2021, 1, 20)));
        assert_eq!(index.resolve(ymd(2020, 6, 1)), Some(Placement::Edge(0)));
        assert_eq!(index.resolve(ymd(2021, 1, 4)), Some(Placement::Column(0)));
        assert_eq!(index.resolve(ymd(2021, 1, 19)), Some(Placement::Edge(1)));
        assert!(index.resolve(ymd(2022, 1, 1)).unwrap().is_edge());
    }

    #[test]
    fn test_idempotent_build() {
        let r = range(ymd(2019, 12, 15), ymd(2021, 2, 1));
        assert_eq!(ColumnIndex::build(&r), ColumnIndex::build(&r));
    }
}
