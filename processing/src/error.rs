//! Error types for the conditioning pipeline.
//!
//! Data-quality problems in activity records are never errors (they are
//! skipped and logged); these variants cover caller mistakes only.

use calgrid_common::config::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalendarError>;

#[derive(Debug, Error)]
pub enum CalendarError {
    /// A result was requested before any conditioning pass ran.
    #[error("calendar has not been conditioned yet")]
    NotReady,

    /// A range bound could not be parsed as an ISO-8601 date.
    #[error("invalid date {value:?}: {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
