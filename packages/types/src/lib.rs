//! Shared types for the shopmetrics workspace: the error taxonomy and the
//! catalog of source extracts every other crate agrees on.

pub mod error;
pub mod tables;

pub use error::{Error, Result};
