//! Active-driver roster derived from the consolidated results table.

use std::collections::HashMap;

use paddock_core::error::{PaddockError, Result};
use paddock_core::models::{Table, TableKind, DRIVER_ID_COLUMN, ROSTER_COLUMN};
use serde::Serialize;

/// A driver and the number of result rows they appear in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub driver: String,
    pub appearances: usize,
}

/// The single conversion rule from a raw identifier cell to a tally key.
///
/// Values are compared as their textual form with surrounding whitespace
/// removed, so `"HAM"`, `" HAM "` and a numeric `44` read as `"44"` are keyed
/// uniformly. A value that is empty after trimming counts as null.
///
/// Unlike a plain string coercion, padded and unpadded spellings of an
/// identifier intentionally share one key.
pub fn canonical_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Count appearances of every driver across all rows of `results`.
///
/// Sorted by descending count; equal counts keep first-seen order.
pub fn count_appearances(results: &Table) -> Result<Vec<RosterEntry>> {
    let values = results
        .column_values(DRIVER_ID_COLUMN)
        .ok_or_else(|| PaddockError::MissingColumn {
            table: TableKind::Results.to_string(),
            column: DRIVER_ID_COLUMN.to_string(),
        })?;

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut tally: Vec<RosterEntry> = Vec::new();
    for key in values.flatten().filter_map(canonical_key) {
        match index.get(&key) {
            Some(&i) => tally[i].appearances += 1,
            None => {
                index.insert(key.clone(), tally.len());
                tally.push(RosterEntry {
                    driver: key,
                    appearances: 1,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among ties.
    tally.sort_by(|a, b| b.appearances.cmp(&a.appearances));
    Ok(tally)
}

/// Drivers with at least `threshold` appearances (inclusive).
pub fn active_drivers(results: &Table, threshold: usize) -> Result<Vec<RosterEntry>> {
    let mut entries = count_appearances(results)?;
    entries.retain(|e| e.appearances >= threshold);
    Ok(entries)
}

/// Render roster entries as the single-column `Driver` table.
pub fn roster_table(entries: &[RosterEntry]) -> Table {
    let mut table = Table::new([ROSTER_COLUMN]);
    for entry in entries {
        table.push_row(vec![Some(entry.driver.clone())]);
    }
    table
}
