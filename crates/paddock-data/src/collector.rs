//! Per-folder collection of tagged session tables.
//!
//! Walks every session folder under the raw-data root, loads its laps,
//! results and weather tables, tags their rows with the session identity and
//! accumulates them per table kind. A bad folder or file never stops the walk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use paddock_core::error::PaddockError;
use paddock_core::models::{SessionKey, Table, TableKind};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::identifier::parse_session_folder;
use crate::reader::{find_session_folders, load_table};

// ── CollectStats ──────────────────────────────────────────────────────────────

/// Counters describing what a collection pass saw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectStats {
    /// Candidate session folders found under the raw root.
    pub folders_found: usize,
    /// Folders whose name parsed and whose tables were inspected.
    pub folders_processed: usize,
    /// Folders skipped because their name did not parse.
    pub folders_skipped: usize,
    /// Accepted tables per kind.
    pub tables_accepted: BTreeMap<TableKind, usize>,
    /// Rejected (missing, unreadable, malformed or empty) tables per kind.
    pub tables_rejected: BTreeMap<TableKind, usize>,
}

impl CollectStats {
    fn merge(&mut self, other: CollectStats) {
        self.folders_found += other.folders_found;
        self.folders_processed += other.folders_processed;
        self.folders_skipped += other.folders_skipped;
        for (kind, n) in other.tables_accepted {
            *self.tables_accepted.entry(kind).or_default() += n;
        }
        for (kind, n) in other.tables_rejected {
            *self.tables_rejected.entry(kind).or_default() += n;
        }
    }

    /// Total accepted tables across all kinds.
    pub fn total_accepted(&self) -> usize {
        self.tables_accepted.values().sum()
    }

    /// Total rejected tables across all kinds.
    pub fn total_rejected(&self) -> usize {
        self.tables_rejected.values().sum()
    }
}

// ── Collected ─────────────────────────────────────────────────────────────────

/// Tagged tables accumulated per kind, in folder order.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    batches: BTreeMap<TableKind, Vec<Table>>,
    pub stats: CollectStats,
}

impl Collected {
    /// Add an accepted table for `kind`.
    pub fn push(&mut self, kind: TableKind, table: Table) {
        self.batches.entry(kind).or_default().push(table);
        *self.stats.tables_accepted.entry(kind).or_default() += 1;
    }

    /// Batches accumulated for `kind`, oldest first.
    pub fn batches(&self, kind: TableKind) -> &[Table] {
        self.batches.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append everything from `other` after the contents of `self`.
    pub fn merge(mut self, other: Collected) -> Collected {
        for (kind, tables) in other.batches {
            self.batches.entry(kind).or_default().extend(tables);
        }
        self.stats.merge(other.stats);
        self
    }

    /// Consume into the per-kind batches.
    pub fn into_batches(self) -> BTreeMap<TableKind, Vec<Table>> {
        self.batches
    }

    fn reject(&mut self, kind: TableKind) {
        *self.stats.tables_rejected.entry(kind).or_default() += 1;
    }
}

// ── SessionCollector ──────────────────────────────────────────────────────────

/// Collects tagged tables from every session folder under a raw-data root.
#[derive(Debug, Clone)]
pub struct SessionCollector {
    raw_root: PathBuf,
    parallel: bool,
}

impl SessionCollector {
    pub fn new(raw_root: impl Into<PathBuf>) -> Self {
        Self {
            raw_root: raw_root.into(),
            parallel: false,
        }
    }

    /// Process folders on the rayon pool. Output order is unchanged.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run one collection pass over the raw root.
    pub fn collect(&self) -> Collected {
        let folders = find_session_folders(&self.raw_root);
        info!("Found {} session folders", folders.len());

        // Each folder yields a private partial; partials are merged in
        // lexical folder order either way.
        let partials: Vec<Collected> = if self.parallel {
            folders.par_iter().map(|f| collect_folder(f)).collect()
        } else {
            folders.iter().map(|f| collect_folder(f)).collect()
        };

        partials
            .into_iter()
            .fold(Collected::default(), Collected::merge)
    }
}

/// Load and tag every table of a single session folder.
pub fn collect_folder(folder: &Path) -> Collected {
    let mut collected = Collected::default();
    collected.stats.folders_found = 1;

    let key = match folder_key(folder) {
        Ok(key) => key,
        Err(e) => {
            warn!("Skipping {}: {}", folder.display(), e);
            collected.stats.folders_skipped = 1;
            return collected;
        }
    };
    collected.stats.folders_processed = 1;

    for kind in TableKind::ALL {
        match load_table(&folder.join(kind.file_name())) {
            Ok(mut table) => {
                tag_table(&mut table, &key);
                debug!("{}: {} {} rows", key.folder_name(), table.len(), kind);
                collected.push(kind, table);
            }
            Err(_) => collected.reject(kind),
        }
    }

    collected
}

/// Append (or overwrite) the season, event and session columns on every row.
pub fn tag_table(table: &mut Table, key: &SessionKey) {
    for (column, value) in key.tags() {
        table.fill_column(column, value);
    }
}

fn folder_key(folder: &Path) -> Result<SessionKey, PaddockError> {
    let name = folder
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PaddockError::InvalidSessionFolder(folder.display().to_string()))?;
    parse_session_folder(name)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_session(root: &Path, folder: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = root.join(folder);
        std::fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            std::fs::write(dir.join(name), content).unwrap();
        }
        dir
    }

    const LAPS: &str = "Driver,LapNumber,LapTime\nHAM,1,0 days 00:01:15.2\nVER,1,0 days 00:01:14.9\n";
    const RESULTS: &str = "Abbreviation,Position\nVER,1\nHAM,2\n";
    const WEATHER: &str = "Time,AirTemp\n0 days 00:00:10,21.4\n";

    #[test]
    fn test_tag_table_appends_three_columns() {
        let mut table = Table::new(["Driver"]);
        table.push_row(vec![Some("HAM".into())]);

        tag_table(&mut table, &SessionKey::new("2022", "Monaco", "R"));

        assert_eq!(table.columns, vec!["Driver", "Year", "GP", "Session"]);
        assert_eq!(
            table.rows[0],
            vec![
                Some("HAM".into()),
                Some("2022".into()),
                Some("Monaco".into()),
                Some("R".into())
            ]
        );
    }

    #[test]
    fn test_collect_folder_all_tables() {
        let root = TempDir::new().unwrap();
        let dir = write_session(
            root.path(),
            "2023_Las_Vegas_Grand_Prix_R",
            &[("laps.csv", LAPS), ("results.csv", RESULTS), ("weather.csv", WEATHER)],
        );

        let collected = collect_folder(&dir);

        assert_eq!(collected.stats.folders_processed, 1);
        assert_eq!(collected.stats.total_accepted(), 3);
        let laps = &collected.batches(TableKind::Laps)[0];
        let gp = laps.column_index("GP").unwrap();
        assert_eq!(laps.rows[0][gp].as_deref(), Some("Las_Vegas_Grand_Prix"));
    }

    #[test]
    fn test_collect_folder_partial_contribution() {
        let root = TempDir::new().unwrap();
        let dir = write_session(
            root.path(),
            "2022_Monaco_R",
            &[("laps.csv", LAPS), ("results.csv", RESULTS)],
        );

        let collected = collect_folder(&dir);

        assert_eq!(collected.batches(TableKind::Laps).len(), 1);
        assert_eq!(collected.batches(TableKind::Results).len(), 1);
        assert!(collected.batches(TableKind::Weather).is_empty());
        assert_eq!(collected.stats.tables_rejected.get(&TableKind::Weather), Some(&1));
    }

    #[test]
    fn test_collect_folder_empty_file_treated_as_missing() {
        let root = TempDir::new().unwrap();
        let with_empty = write_session(
            root.path(),
            "2022_Monaco_R",
            &[("laps.csv", LAPS), ("weather.csv", "Time,AirTemp\n")],
        );
        let without = write_session(root.path(), "2022_Monaco_Q", &[("laps.csv", LAPS)]);

        let a = collect_folder(&with_empty);
        let b = collect_folder(&without);

        assert_eq!(a.batches(TableKind::Weather), b.batches(TableKind::Weather));
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn test_collect_folder_bad_name_skips_everything() {
        let root = TempDir::new().unwrap();
        let dir = write_session(root.path(), "cache", &[("laps.csv", LAPS)]);

        let collected = collect_folder(&dir);

        assert_eq!(collected.stats.folders_skipped, 1);
        assert_eq!(collected.stats.folders_processed, 0);
        assert!(collected.batches(TableKind::Laps).is_empty());
        assert_eq!(collected.stats.total_rejected(), 0);
    }

    #[test]
    fn test_collect_preserves_folder_order() {
        let root = TempDir::new().unwrap();
        write_session(root.path(), "2022_Monaco_R", &[("results.csv", RESULTS)]);
        write_session(root.path(), "2021_Monaco_R", &[("results.csv", RESULTS)]);
        write_session(root.path(), "2022_Monaco_Q", &[("results.csv", RESULTS)]);

        let collected = SessionCollector::new(root.path()).collect();

        let seasons_sessions: Vec<(String, String)> = collected
            .batches(TableKind::Results)
            .iter()
            .map(|t| {
                let y = t.column_index("Year").unwrap();
                let s = t.column_index("Session").unwrap();
                (
                    t.rows[0][y].clone().unwrap(),
                    t.rows[0][s].clone().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            seasons_sessions,
            vec![
                ("2021".to_string(), "R".to_string()),
                ("2022".to_string(), "Q".to_string()),
                ("2022".to_string(), "R".to_string()),
            ]
        );
        assert_eq!(collected.stats.folders_found, 3);
    }

    #[test]
    fn test_collect_parallel_matches_sequential() {
        let root = TempDir::new().unwrap();
        for season in 2018..2024 {
            for session in ["Q", "R"] {
                write_session(
                    root.path(),
                    &format!("{}_Italian_Grand_Prix_{}", season, session),
                    &[("laps.csv", LAPS), ("results.csv", RESULTS)],
                );
            }
        }
        write_session(root.path(), "junk", &[("laps.csv", LAPS)]);

        let sequential = SessionCollector::new(root.path()).collect();
        let parallel = SessionCollector::new(root.path())
            .with_parallel(true)
            .collect();

        assert_eq!(sequential.stats, parallel.stats);
        for kind in TableKind::ALL {
            assert_eq!(sequential.batches(kind), parallel.batches(kind));
        }
    }

    #[test]
    fn test_collect_missing_root() {
        let collected = SessionCollector::new("/tmp/does-not-exist-paddock-root").collect();
        assert_eq!(collected.stats, CollectStats::default());
    }
}
