//! Artboard dimensions and annotation padding.
//!
//! The grid always has seven rows.  The weekday labels take two cells of
//! horizontal padding and the month/year labels one cell of vertical
//! padding.  Nothing here depends on activity values.

use serde::Serialize;

use calgrid_common::config::{CalendarConfig, Sizing};

use crate::calendar::DateRange;

/// Rows in the grid, one per weekday.
pub const DAYS_PER_WEEK: f64 = 7.0;
/// Weekday-label padding, in cells.
pub const WEEKDAY_PADDING_CELLS: f64 = 2.0;
/// Month/year-label padding, in cells.
pub const MONTH_PADDING_CELLS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub cell_size: f64,
    pub padding_days_of_week: f64,
    pub padding_months_of_year: f64,
}

impl Layout {
    /// Layout for `range` under the sizing mode of `config`.
    pub fn compute(range: &DateRange, config: &CalendarConfig) -> Self {
        match config.sizing {
            Sizing::Cell => Self::with_cell_size(range, f64::from(config.cell_size)),
            Sizing::Fit => Self::fit(range, f64::from(config.width), f64::from(config.height)),
        }
    }

    /// Fixed cell size; the artboard grows with the number of weeks.
    pub fn with_cell_size(range: &DateRange, cell_size: f64) -> Self {
        let weeks = range.weeks() as f64;
        let padding_days_of_week = cell_size * WEEKDAY_PADDING_CELLS;
        let padding_months_of_year = cell_size * MONTH_PADDING_CELLS;
        Layout {
            width: cell_size * weeks + padding_days_of_week,
            height: cell_size * DAYS_PER_WEEK + padding_months_of_year,
            cell_size,
            padding_days_of_week,
            padding_months_of_year,
        }
    }

    /// Fixed artboard; the largest cell size whose grid and padding fit.
    pub fn fit(range: &DateRange, width: f64, height: f64) -> Self {
        let weeks = range.weeks() as f64;
        let cell_size = (width / (weeks + WEEKDAY_PADDING_CELLS))
            .min(height / (DAYS_PER_WEEK + MONTH_PADDING_CELLS));
        Layout {
            width,
            height,
            cell_size,
            padding_days_of_week: cell_size * WEEKDAY_PADDING_CELLS,
            padding_months_of_year: cell_size * MONTH_PADDING_CELLS,
        }
    }

    /// Top-left corner of the grid square at `column`, `row`.
    pub fn origin(&self, column: usize, row: u32) -> (f64, f64) {
        (
            self.padding_days_of_week + column as f64 * self.cell_size,
            self.padding_months_of_year + f64::from(row) * self.cell_size,
        )
    }
}
