//! Output types handed to a rendering layer.
//!
//! Everything here is plain, serialisable data: polygons in artboard
//! pixel coordinates plus the metadata needed to style a cell and to
//! answer pointer interactions.

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A point in artboard coordinates (x grows right, y grows down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Which part of its grid square a cell occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellPart {
    Full,
    UpperLeft,
    LowerRight,
}

/// One rendered calendar cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellShape {
    pub date: NaiveDate,
    pub activity: String,
    pub count: u32,
    /// Threshold bucket, 1 (low) ..= 3 (high).
    pub bucket: u8,
    pub color: String,
    pub column: usize,
    pub row: u32,
    pub part: CellPart,
    /// Closed polygon: the last point repeats the first.
    pub points: Vec<Point>,
}

impl CellShape {
    /// SVG path data (`M … L … Z`) for the polygon.
    pub fn svg_path(&self) -> String {
        let mut path = String::new();
        let open = &self.points[..self.points.len().saturating_sub(1)];
        for (i, p) in open.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(path, "{cmd}{} {} ", trim(p.x), trim(p.y));
        }
        path.push('Z');
        path
    }

    /// Whether `p` lies inside (or on the edge of) the polygon.
    pub fn contains(&self, p: Point) -> bool {
        let pts = &self.points;
        if pts.len() < 4 {
            return false;
        }
        // Points on an edge count as inside so that a pointer resting on a
        // boundary still resolves to a cell.
        for w in pts.windows(2) {
            if on_segment(w[0], w[1], p) {
                return true;
            }
        }
        let mut inside = false;
        for w in pts.windows(2) {
            let (a, b) = (w[0], w[1]);
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross.abs() > 1e-9 {
        return false;
    }
    p.x >= a.x.min(b.x) - 1e-9
        && p.x <= a.x.max(b.x) + 1e-9
        && p.y >= a.y.min(b.y) - 1e-9
        && p.y <= a.y.max(b.y) + 1e-9
}

/// Format a coordinate without a trailing `.0` for whole numbers.
fn trim(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v:.3}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Weekday annotation in the left padding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayLabel {
    pub text: String,
    pub row: u32,
    pub anchor: Point,
}

/// Month (and optionally year) annotation in the top padding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthLabel {
    /// First day of the month.
    pub date: NaiveDate,
    pub column: usize,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub anchor: Point,
}

/// Payload for a hover/select notification on a rendered cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub date: NaiveDate,
    pub activity: String,
    pub value: u32,
    pub bucket: u8,
    pub pointer: Point,
}
