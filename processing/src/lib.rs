//! Calendar-grid conditioning: turns date-stamped activity series into a
//! week-column × weekday-row grid of shaded, shaped cells.
//!
//! The pipeline is pure and synchronous.  [`pipeline::condition`] runs one
//! pass; [`pipeline::Calendar`] keeps the latest pass for a fixed
//! configuration.

pub mod aggregate;
pub mod annotations;
pub mod calendar;
pub mod cells;
pub mod columns;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod pipeline;
pub mod shading;

pub use calendar::{DateRange, WeekKey};
pub use error::{CalendarError, Result};
pub use pipeline::{condition, Calendar, Conditioned};
