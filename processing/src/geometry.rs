//! Cell polygons in artboard coordinates.
//!
//! A cell whose date carries a single activity is a square.  When several
//! activities share a date the square is split along the TR–BL diagonal:
//! the first activity present takes the upper-left triangle and any later
//! one the lower-right triangle.  A third activity on the same date
//! therefore overlaps the second.  Each cell is inset on its trailing and
//! bottom edges by `margin_ratio * cell_size`.

use tracing::debug;

use calgrid_common::protocol::{CellPart, CellShape, Point};

use crate::aggregate::DayCount;
use crate::calendar::iso_weekday;
use crate::cells::Cell;
use crate::columns::ColumnIndex;
use crate::layout::Layout;
use crate::shading::Shade;

/// Grid row of a date: Monday = 0 … Sunday = 6.
pub fn row_of(date: chrono::NaiveDate) -> u32 {
    iso_weekday(date) - 1
}

/// Which part of the square `cell` occupies given the other activities on
/// its date.
pub fn part_of(cell: &Cell, counts: &DayCount) -> CellPart {
    let present: Vec<usize> = counts.activities_on(cell.date).collect();
    if present.len() < 2 {
        return CellPart::Full;
    }
    let own = counts.activity_index(&cell.activity);
    if own == present.first().copied() {
        CellPart::UpperLeft
    } else {
        CellPart::LowerRight
    }
}

/// Closed polygon for a part of the square at `(column, row)`.
pub fn polygon(
    layout: &Layout,
    column: usize,
    row: u32,
    part: CellPart,
    margin_ratio: f64,
) -> Vec<Point> {
    let (x0, y0) = layout.origin(column, row);
    let inner = layout.cell_size * (1.0 - margin_ratio);
    let (x1, y1) = (x0 + inner, y0 + inner);

    let tl = Point::new(x0, y0);
    let tr = Point::new(x1, y0);
    let br = Point::new(x1, y1);
    let bl = Point::new(x0, y1);

    match part {
        CellPart::Full => vec![tl, tr, br, bl, tl],
        CellPart::UpperLeft => vec![tl, tr, bl, tl],
        CellPart::LowerRight => vec![br, bl, tr, br],
    }
}

/// Build one shape per cell.  `shades` runs parallel to `cells`.
///
/// Cells whose week has no column are drawn at the nearest edge column.
/// With an empty column index nothing can be placed and no shapes are
/// produced.
pub fn build(
    cells: &[Cell],
    shades: &[Shade],
    counts: &DayCount,
    index: &ColumnIndex,
    layout: &Layout,
    margin_ratio: f64,
) -> Vec<CellShape> {
    cells
        .iter()
        .zip(shades)
        .filter_map(|(cell, shade)| {
            let placement = index.resolve(cell.date)?;
            if placement.is_edge() {
                debug!(
                    "No column for {} ({}), placing at edge column {}",
                    cell.date,
                    cell.activity,
                    placement.column()
                );
            }
            let column = placement.column();
            let row = row_of(cell.date);
            let part = part_of(cell, counts);
            Some(CellShape {
                date: cell.date,
                activity: cell.activity.clone(),
                count: cell.count,
                bucket: shade.bucket,
                color: shade.color.to_string(),
                column,
                row,
                part,
                points: polygon(layout, column, row, part, margin_ratio),
            })
        })
        .collect()
}
