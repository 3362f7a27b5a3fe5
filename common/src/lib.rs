//! Types shared between the conditioning pipeline and its consumers.

pub mod config;
pub mod protocol;
pub mod record;
