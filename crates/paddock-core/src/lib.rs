//! Shared types for Paddock.
//!
//! Table and session models, the crate-wide error type, CLI settings and
//! small formatting helpers used by the data and runtime layers.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{PaddockError, Result};
