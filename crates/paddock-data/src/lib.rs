//! Data layer for Paddock.
//!
//! Discovers session folders, parses their identity, loads and tags the raw
//! laps/results/weather tables, consolidates them across sessions, derives
//! the active-driver roster and persists the results.

pub mod aggregator;
pub mod collector;
pub mod identifier;
pub mod reader;
pub mod roster;
pub mod writer;

pub use paddock_core as core;
