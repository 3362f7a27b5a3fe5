//! Projection of day counts into flat `(date, count, activity)` cells.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::DayCount;
use crate::calendar::DateRange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub date: NaiveDate,
    pub count: u32,
    pub activity: String,
}

/// Cells of one activity in chronological order.
pub fn extract(counts: &DayCount, activity: &str) -> Vec<Cell> {
    let Some(index) = counts.activity_index(activity) else {
        return Vec::new();
    };
    counts
        .days()
        .filter_map(|(date, per_activity)| {
            per_activity.get(&index).map(|&count| Cell {
                date,
                count,
                activity: activity.to_string(),
            })
        })
        .collect()
}

/// Cells of every activity: activity by activity in precedence order,
/// each run chronological.
pub fn extract_all(counts: &DayCount) -> Vec<Cell> {
    counts
        .activities()
        .iter()
        .flat_map(|activity| extract(counts, activity))
        .collect()
}

/// [`extract_all`] restricted to dates inside `range`.
pub fn extract_in(counts: &DayCount, range: &DateRange) -> Vec<Cell> {
    extract_all(counts)
        .into_iter()
        .filter(|c| range.contains(c.date))
        .collect()
}
