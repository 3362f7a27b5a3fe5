//! Weekday and month/year annotations placed in the layout padding.

use chrono::{Datelike, Weekday};

use calgrid_common::protocol::{MonthLabel, Point, WeekdayLabel};

use crate::calendar::DateRange;
use crate::columns::ColumnIndex;
use crate::layout::Layout;

/// Seven labels, Monday first, right-aligned against the grid.
pub fn weekday_labels(layout: &Layout) -> Vec<WeekdayLabel> {
    let x = layout.padding_days_of_week - layout.cell_size * 0.25;
    let mut day = Weekday::Mon;
    let mut labels = Vec::with_capacity(7);
    for row in 0..7u32 {
        labels.push(WeekdayLabel {
            text: day.to_string(),
            row,
            anchor: Point::new(
                x,
                layout.padding_months_of_year + (f64::from(row) + 0.5) * layout.cell_size,
            ),
        });
        day = day.succ();
    }
    labels
}

/// One label per month intersecting `range`, at the column holding the
/// month's first day (or the nearest edge column).
///
/// The first label and every January also carry the year.  When two
/// months resolve to the same column the later one wins, keeping any year
/// text of the one it replaces.
pub fn month_labels(index: &ColumnIndex, range: &DateRange, layout: &Layout) -> Vec<MonthLabel> {
    let mut labels: Vec<MonthLabel> = Vec::new();
    for first in range.month_starts() {
        let Some(placement) = index.resolve(first) else {
            continue;
        };
        let column = placement.column();
        let mut year = (labels.is_empty() || first.month() == 1).then(|| first.format("%Y").to_string());

        if labels.last().map(|l| l.column) == Some(column) {
            if let Some(replaced) = labels.pop() {
                year = year.or(replaced.year);
            }
        }

        let (x, _) = layout.origin(column, 0);
        labels.push(MonthLabel {
            date: first,
            column,
            text: first.format("%b").to_string(),
            year,
            anchor: Point::new(x, layout.padding_months_of_year * 0.75),
        });
    }
    labels
}
