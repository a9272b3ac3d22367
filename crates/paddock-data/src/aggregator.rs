//! Cross-session concatenation and deduplication.
//!
//! Turns the per-kind batches from the collector into one consolidated table
//! per kind.

use std::collections::{BTreeMap, HashSet};

use paddock_core::models::{Cell, Table, TableKind};
use tracing::debug;

use crate::collector::Collected;

// ── Consolidated ──────────────────────────────────────────────────────────────

/// Up to three consolidated tables, one per kind that had any valid input.
#[derive(Debug, Clone, Default)]
pub struct Consolidated {
    tables: BTreeMap<TableKind, Table>,
}

impl Consolidated {
    /// The consolidated table for `kind`, or `None` when no session
    /// contributed a valid table of that kind.
    pub fn get(&self, kind: TableKind) -> Option<&Table> {
        self.tables.get(&kind)
    }

    /// Consolidated tables in [`TableKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (TableKind, &Table)> {
        self.tables.iter().map(|(k, t)| (*k, t))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Concatenate and deduplicate every kind in `collected`.
pub fn consolidate(collected: Collected) -> Consolidated {
    let mut tables = BTreeMap::new();
    for (kind, batches) in collected.into_batches() {
        let Some(table) = concat_tables(&batches) else {
            continue;
        };
        let before = table.len();
        let table = dedup_rows(table);
        debug!(
            "{}: {} batches, {} rows, {} duplicates dropped",
            kind,
            batches.len(),
            table.len(),
            before - table.len()
        );
        tables.insert(kind, table);
    }
    Consolidated { tables }
}

/// Stack `batches` row-wise.
///
/// Columns are the union of all batch headers in order of first appearance;
/// cells for columns a batch lacks are null. Returns `None` for no batches.
pub fn concat_tables(batches: &[Table]) -> Option<Table> {
    if batches.is_empty() {
        return None;
    }

    let mut columns: Vec<String> = Vec::new();
    let mut positions: BTreeMap<&str, usize> = BTreeMap::new();
    for batch in batches {
        for column in &batch.columns {
            if !positions.contains_key(column.as_str()) {
                positions.insert(column.as_str(), columns.len());
                columns.push(column.clone());
            }
        }
    }

    let width = columns.len();
    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(batches.iter().map(Table::len).sum());
    for batch in batches {
        let mapping: Vec<usize> = batch
            .columns
            .iter()
            .map(|c| positions[c.as_str()])
            .collect();
        for row in &batch.rows {
            let mut out: Vec<Cell> = vec![None; width];
            for (cell, &target) in row.iter().zip(&mapping) {
                out[target] = cell.clone();
            }
            rows.push(out);
        }
    }

    Some(Table { columns, rows })
}

/// Drop rows equal in every column to an earlier row.
///
/// Idempotent: a deduplicated table passes through unchanged.
pub fn dedup_rows(mut table: Table) -> Table {
    let keep: Vec<bool> = {
        let mut seen: HashSet<&[Cell]> = HashSet::with_capacity(table.rows.len());
        table.rows.iter().map(|row| seen.insert(row.as_slice())).collect()
    };
    let mut keep = keep.into_iter();
    table.rows.retain(|_| keep.next().unwrap_or(false));
    table
}

// ── Tests ─────────────────────────────────────────────────────────────────────
