//! Runtime layer for Paddock.
//!
//! Drives one full consolidation run from the raw session folders to the
//! processed output files.

pub mod pipeline;

pub use paddock_core as core;
pub use paddock_data as data;
