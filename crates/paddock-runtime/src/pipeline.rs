//! Consolidation pipeline driver.
//!
//! Runs collection, consolidation and the roster filter in order and persists
//! every output it can build to the processed directory. Nothing is carried
//! over between runs; each run recomputes all outputs from the raw root.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use paddock_core::formatting::pluralize;
use paddock_core::models::{Table, TableKind, DEFAULT_MIN_APPEARANCES, ROSTER_FILE_NAME};
use paddock_data::aggregator::consolidate;
use paddock_data::collector::{CollectStats, SessionCollector};
use paddock_data::roster::{active_drivers, roster_table};
use paddock_data::writer::write_table;
use serde::Serialize;
use tracing::{error, info, warn};

// ── Public types ──────────────────────────────────────────────────────────────

/// One output file written by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    pub path: PathBuf,
    pub rows: usize,
}

/// What a pipeline run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// RFC 3339 timestamp taken when the run finished.
    pub generated_at: String,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    /// Folder and table counters from collection.
    pub collect: CollectStats,
    /// Files written, in write order.
    pub outputs: Vec<OutputFile>,
    /// Outputs that could not be written, with the cause.
    pub failed_writes: Vec<String>,
    /// Roster size, when the roster step ran to completion.
    pub active_drivers: Option<usize>,
    /// Why the roster step was aborted, if it was.
    pub roster_error: Option<String>,
    /// Outputs left over from an earlier run that this run did not replace.
    pub stale_outputs: Vec<PathBuf>,
    pub elapsed_seconds: f64,
}

impl RunSummary {
    /// `true` when `file_name` was written by this run.
    pub fn wrote(&self, file_name: &str) -> bool {
        self.outputs
            .iter()
            .any(|o| o.path.file_name().is_some_and(|n| n == file_name))
    }

    /// One-line human summary.
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "Processed {} ({} skipped), accepted {}, rejected {}, wrote {}",
            pluralize(self.collect.folders_processed, "session folder"),
            self.collect.folders_skipped,
            pluralize(self.collect.total_accepted(), "table"),
            pluralize(self.collect.total_rejected(), "table"),
            pluralize(self.outputs.len(), "file"),
        );
        if !self.stale_outputs.is_empty() {
            line.push_str(&format!(
                ", left {} from an earlier run",
                pluralize(self.stale_outputs.len(), "stale file")
            ));
        }
        line
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Rebuilds the consolidated outputs from the raw session folders.
#[derive(Debug, Clone)]
pub struct Pipeline {
    raw_dir: PathBuf,
    processed_dir: PathBuf,
    min_appearances: usize,
    parallel: bool,
}

impl Pipeline {
    pub fn new(raw_dir: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            processed_dir: processed_dir.into(),
            min_appearances: DEFAULT_MIN_APPEARANCES,
            parallel: false,
        }
    }

    /// Roster threshold (inclusive).
    pub fn with_min_appearances(mut self, min_appearances: usize) -> Self {
        self.min_appearances = min_appearances;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Path of the consolidated output for `kind`.
    pub fn output_path(&self, kind: TableKind) -> PathBuf {
        self.processed_dir.join(kind.output_file_name())
    }

    /// Path of the active-driver roster output.
    pub fn roster_path(&self) -> PathBuf {
        self.processed_dir.join(ROSTER_FILE_NAME)
    }

    /// Run the whole pipeline once.
    ///
    /// Never fails: bad inputs are skipped and failed writes are recorded in
    /// the returned summary.
    pub fn run(&self) -> RunSummary {
        let start = Instant::now();
        info!("Scanning {}", self.raw_dir.display());

        let collected = SessionCollector::new(&self.raw_dir)
            .with_parallel(self.parallel)
            .collect();
        let collect = collected.stats.clone();

        let consolidated = consolidate(collected);
        info!("Writing merged processed files to {}", self.processed_dir.display());

        let mut summary = RunSummary {
            generated_at: String::new(),
            raw_dir: self.raw_dir.clone(),
            processed_dir: self.processed_dir.clone(),
            collect,
            outputs: Vec::new(),
            failed_writes: Vec::new(),
            active_drivers: None,
            roster_error: None,
            stale_outputs: Vec::new(),
            elapsed_seconds: 0.0,
        };

        for (kind, table) in consolidated.iter() {
            persist(&self.output_path(kind), table, &mut summary);
        }

        match consolidated.get(TableKind::Results) {
            None => info!("No valid results tables; skipping active driver roster"),
            Some(results) => match active_drivers(results, self.min_appearances) {
                Ok(entries) => {
                    info!(
                        "{} with at least {} appearances",
                        pluralize(entries.len(), "active driver"),
                        self.min_appearances
                    );
                    summary.active_drivers = Some(entries.len());
                    persist(&self.roster_path(), &roster_table(&entries), &mut summary);
                }
                Err(e) => {
                    warn!("Skipping active driver roster: {}", e);
                    summary.roster_error = Some(e.to_string());
                }
            },
        }

        self.flag_stale_outputs(&mut summary);

        summary.generated_at = Utc::now().to_rfc3339();
        summary.elapsed_seconds = start.elapsed().as_secs_f64();
        info!("{}", summary.summary_line());
        summary
    }
}

impl Pipeline {
    /// Record every known output that exists on disk but was not rewritten,
    /// so it no longer matches the other files of this run.
    fn flag_stale_outputs(&self, summary: &mut RunSummary) {
        let expected = TableKind::ALL
            .into_iter()
            .map(|kind| self.output_path(kind))
            .chain(std::iter::once(self.roster_path()));

        for path in expected {
            let rewritten = summary.outputs.iter().any(|o| o.path == path);
            if !rewritten && path.is_file() {
                warn!("Stale output from an earlier run left in place: {}", path.display());
                summary.stale_outputs.push(path);
            }
        }
    }
}

fn persist(path: &Path, table: &Table, summary: &mut RunSummary) {
    match write_table(path, table) {
        Ok(()) => {
            info!("Wrote {} ({})", path.display(), pluralize(table.len(), "row"));
            summary.outputs.push(OutputFile {
                path: path.to_path_buf(),
                rows: table.len(),
            });
        }
        Err(e) => {
            error!("{}", e);
            summary.failed_writes.push(e.to_string());
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
