//! One conditioning pass: series set + range + configuration → everything
//! a rendering layer needs.
//!
//! Stages run in dependency order: aggregate, index columns, extract cells,
//! fit shading, lay out, build geometry, annotate.  Each pass produces a
//! fresh [`Conditioned`]; nothing is updated in place.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use calgrid_common::config::CalendarConfig;
use calgrid_common::protocol::{CellShape, Interaction, MonthLabel, Point, WeekdayLabel};
use calgrid_common::record::SeriesSet;

use crate::aggregate::{aggregate, DayCount};
use crate::annotations;
use crate::calendar::DateRange;
use crate::cells::{self, Cell};
use crate::columns::ColumnIndex;
use crate::error::{CalendarError, Result};
use crate::geometry;
use crate::layout::Layout;
use crate::shading;

/// Immutable result of one conditioning pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conditioned {
    pub range: DateRange,
    pub counts: DayCount,
    /// Records dropped because their date could not be parsed.
    pub skipped: usize,
    pub columns: ColumnIndex,
    /// Cells inside the range, activity by activity, each chronological.
    pub cells: Vec<Cell>,
    pub layout: Layout,
    pub weekday_labels: Vec<WeekdayLabel>,
    pub month_labels: Vec<MonthLabel>,
    pub shapes: Vec<CellShape>,
}

impl Conditioned {
    /// Payload for a pointer at `pointer`, taken from the last-drawn shape
    /// containing it.
    pub fn interaction_at(&self, pointer: Point) -> Option<Interaction> {
        self.shapes
            .iter()
            .rev()
            .find(|s| s.contains(pointer))
            .map(|s| Interaction {
                date: s.date,
                activity: s.activity.clone(),
                value: s.count,
                bucket: s.bucket,
                pointer,
            })
    }

    /// Shapes drawn for `date`.
    pub fn shapes_on(&self, date: NaiveDate) -> impl Iterator<Item = &CellShape> {
        self.shapes.iter().filter(move |s| s.date == date)
    }
}

/// Run a full conditioning pass.
///
/// Fails only on an invalid configuration; data problems are skipped.
pub fn condition(
    series: &SeriesSet,
    range: &DateRange,
    config: &CalendarConfig,
) -> Result<Conditioned> {
    config.validate()?;

    let aggregation = aggregate(series);
    let counts = aggregation.counts;
    let columns = ColumnIndex::build(range);
    let cells = cells::extract_in(&counts, range);

    let probes = shading::probes(
        cells
            .iter()
            .map(|c| (counts.activity_index(&c.activity).unwrap_or(0), c.count)),
    );
    let strategy = shading::fit(config.shading, &probes);
    let shades: Vec<_> = probes.iter().map(|p| strategy.classify(p)).collect();

    let layout = Layout::compute(range, config);
    let shapes = geometry::build(&cells, &shades, &counts, &columns, &layout, config.margin_ratio);
    let weekday_labels = annotations::weekday_labels(&layout);
    let month_labels = annotations::month_labels(&columns, range, &layout);

    info!(
        "Conditioned {}..{}: {} columns, {} cells, {} activities, {} skipped",
        range.start,
        range.end,
        columns.len(),
        cells.len(),
        counts.activities().len(),
        aggregation.skipped,
    );

    Ok(Conditioned {
        range: *range,
        counts,
        skipped: aggregation.skipped,
        columns,
        cells,
        layout,
        weekday_labels,
        month_labels,
        shapes,
    })
}

/// A calendar context: a configuration plus the latest pass.
///
/// Every [`Calendar::update`] replaces the previous result wholesale.
#[derive(Debug, Clone, Default)]
pub struct Calendar {
    config: CalendarConfig,
    current: Option<Conditioned>,
}

impl Calendar {
    pub fn new(config: CalendarConfig) -> Self {
        Calendar { config, current: None }
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    /// Recondition with new data and/or range.
    pub fn update(&mut self, series: &SeriesSet, range: &DateRange) -> Result<&Conditioned> {
        let next = condition(series, range, &self.config)?;
        Ok(&*self.current.insert(next))
    }

    /// Replace the configuration.  The previous result is discarded.
    pub fn reconfigure(&mut self, config: CalendarConfig) {
        self.config = config;
        self.current = None;
    }

    /// The latest pass, or [`CalendarError::NotReady`] before the first one.
    pub fn result(&self) -> Result<&Conditioned> {
        self.current.as_ref().ok_or(CalendarError::NotReady)
    }

    pub fn cells(&self) -> Result<&[Cell]> {
        Ok(&self.result()?.cells)
    }

    pub fn shapes(&self) -> Result<&[CellShape]> {
        Ok(&self.result()?.shapes)
    }

    pub fn interaction_at(&self, pointer: Point) -> Result<Option<Interaction>> {
        Ok(self.result()?.interaction_at(pointer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calgrid_common::config::ShadingPolicy;
    use calgrid_common::record::ActivityRecord;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series() -> SeriesSet {
        SeriesSet::new()
            .with(
                "work",
                vec![
                    ActivityRecord::new("2021-01-04", "work", 1.0),
                    ActivityRecord::new("2021-01-04", "work", 1.0),
                    ActivityRecord::new("2021-01-05", "work", 1.0),
                    ActivityRecord::new("2020-06-01", "work", 1.0),
                ],
            )
            .with(
                "play",
                vec![
                    ActivityRecord::new("2021-01-04", "play", 1.0),
                    ActivityRecord::new("garbage", "play", 1.0),
                ],
            )
    }

    #[test]
    fn test_condition_clips_cells_to_range() {
        let range = DateRange::new(ymd(2021, 1, 4), ymd(2021, 1, 18));
        let result = condition(&series(), &range, &CalendarConfig::default()).unwrap();
        assert_eq!(result.cells.len(), 3);
        assert_eq!(result.shapes.len(), 3);
        assert_eq!(result.skipped, 1);
        // the out-of-range record is still counted
        assert_eq!(result.counts.total(ymd(2020, 6, 1)), 1);
        assert_eq!(result.weekday_labels.len(), 7);
    }

    #[test]
    fn test_interaction_payload() {
        let range = DateRange::new(ymd(2021, 1, 4), ymd(2021, 1, 18));
        let result = condition(&series(), &range, &CalendarConfig::default()).unwrap();
        // Monday 2021-01-04, column 0: upper-left half is "work"
        let hit = result.interaction_at(Point::new(21.0, 11.0)).unwrap();
        assert_eq!(hit.date, ymd(2021, 1, 4));
        assert_eq!(hit.activity, "work");
        assert_eq!(hit.value, 2);
        assert_eq!(hit.bucket, 3);
        let hit = result.interaction_at(Point::new(28.0, 18.0)).unwrap();
        assert_eq!(hit.activity, "play");
        // the inset gap between cells is empty
        assert!(result.interaction_at(Point::new(29.5, 12.0)).is_none());
    }

    #[test]
    fn test_invalid_config() {
        let range = DateRange::new(ymd(2021, 1, 4), ymd(2021, 1, 18));
        let config = CalendarConfig { cell_size: 0, ..Default::default() };
        assert!(matches!(
            condition(&series(), &range, &config),
            Err(CalendarError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_calendar_not_ready() {
        let mut calendar = Calendar::new(CalendarConfig::default());
        assert!(matches!(calendar.result(), Err(CalendarError::NotReady)));
        assert!(matches!(calendar.cells(), Err(CalendarError::NotReady)));

        let range = DateRange::new(ymd(2021, 1, 4), ymd(2021, 1, 18));
        calendar.update(&series(), &range).unwrap();
        assert_eq!(calendar.cells().unwrap().len(), 3);

        calendar.reconfigure(CalendarConfig { shading: ShadingPolicy::Quantile, ..Default::default() });
        assert!(matches!(calendar.shapes(), Err(CalendarError::NotReady)));
    }

    #[test]
    fn test_update_replaces_state() {
        let mut calendar = Calendar::new(CalendarConfig::default());
        let range = DateRange::new(ymd(2021, 1, 4), ymd(2021, 1, 18));
        calendar.update(&series(), &range).unwrap();
        calendar.update(&SeriesSet::new(), &range).unwrap();
        assert!(calendar.cells().unwrap().is_empty());
        assert_eq!(calendar.result().unwrap().columns.len(), 2);
    }
}
