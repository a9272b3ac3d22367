//! Session folder discovery and raw table loading.
//!
//! Discovers the per-session folders under the raw-data root and reads the
//! CSV tables inside them into [`Table`]s, rejecting anything missing,
//! unreadable, malformed or empty.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use paddock_core::error::{PaddockError, Result};
use paddock_core::models::Table;
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// List the immediate subdirectories of `raw_root`, sorted by file name.
///
/// Plain files are ignored. A missing root yields an empty list.
pub fn find_session_folders(raw_root: &Path) -> Vec<PathBuf> {
    if !raw_root.exists() {
        warn!("Raw data path does not exist: {}", raw_root.display());
        return Vec::new();
    }

    walkdir::WalkDir::new(raw_root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", raw_root.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .collect()
}

/// Load a CSV table with a header row.
///
/// Succeeds only when the file exists, parses completely and holds at least
/// one data row. Every rejection is logged with its path and cause before it
/// is returned.
pub fn load_table(path: &Path) -> Result<Table> {
    let result = read_table(path);
    match &result {
        Ok(table) => debug!(
            "Loaded {}: {} rows x {} columns",
            path.display(),
            table.len(),
            table.columns.len()
        ),
        Err(e) => warn!("Skipping invalid file: {} ({})", path.display(), e),
    }
    result
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_table(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => PaddockError::TableMissing(path.to_path_buf()),
        _ => PaddockError::FileRead {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let malformed = |source: csv::Error| PaddockError::MalformedTable {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(file);

    let headers = reader.headers().map_err(malformed)?.clone();
    if headers.is_empty() {
        return Err(PaddockError::EmptyTable(path.to_path_buf()));
    }

    let mut table = Table::new(unique_headers(headers.iter()));
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        table.push_row(record.iter().map(parse_cell).collect());
    }

    if table.is_empty() {
        return Err(PaddockError::EmptyTable(path.to_path_buf()));
    }
    Ok(table)
}

/// Repeated header names get a `.N` suffix (`Time`, `Time.1`, `Time.2`),
/// skipping any suffix already taken by another column.
fn unique_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut repeats: HashMap<&str, usize> = HashMap::new();
    let mut out = Vec::new();

    for name in names {
        let mut candidate = name.to_string();
        if taken.contains(&candidate) {
            let n = repeats.entry(name).or_insert(0);
            loop {
                *n += 1;
                candidate = format!("{name}.{n}");
                if !taken.contains(&candidate) {
                    break;
                }
            }
            debug!("Renamed repeated column {:?} to {:?}", name, candidate);
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// Empty fields are nulls.
fn parse_cell(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    // ── find_session_folders ──────────────────────────────────────────────────

    #[test]
    fn test_find_session_folders_sorted_dirs_only() {
        let dir = TempDir::new().unwrap();
        for name in ["2022_Monaco_R", "2021_Bahrain_Q", "2022_Monaco_Q"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        write_file(dir.path(), "notes.txt", "not a session");

        let folders = find_session_folders(dir.path());
        let names: Vec<&str> = folders
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["2021_Bahrain_Q", "2022_Monaco_Q", "2022_Monaco_R"]);
    }

    #[test]
    fn test_find_session_folders_not_recursive() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("2022_Monaco_R").join("nested")).unwrap();

        let folders = find_session_folders(dir.path());
        assert_eq!(folders.len(), 1);
    }

    #[test]
    fn test_find_session_folders_nonexistent_path() {
        let folders = find_session_folders(Path::new("/tmp/does-not-exist-paddock-test-xyz"));
        assert!(folders.is_empty());
    }

    // ── load_table ────────────────────────────────────────────────────────────

    #[test]
    fn test_load_table_basic() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "results.csv",
            "Abbreviation,Position,Points\nVER,1,25\nHAM,2,18\n",
        );

        let table = load_table(&path).unwrap();
        assert_eq!(table.columns, vec!["Abbreviation", "Position", "Points"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1][0].as_deref(), Some("HAM"));
    }

    #[test]
    fn test_load_table_empty_fields_are_null() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "laps.csv", "Driver,LapTime,PitInTime\nHAM,,\n");

        let table = load_table(&path).unwrap();
        assert_eq!(table.rows[0], vec![Some("HAM".to_string()), None, None]);
    }

    #[test]
    fn test_load_table_quoted_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "results.csv",
            "Abbreviation,Status\nALO,\"Collision, retired\"\n",
        );

        let table = load_table(&path).unwrap();
        assert_eq!(table.rows[0][1].as_deref(), Some("Collision, retired"));
    }

    #[test]
    fn test_load_table_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_table(&dir.path().join("weather.csv")).unwrap_err();
        assert!(matches!(err, PaddockError::TableMissing(_)));
    }

    #[test]
    fn test_load_table_zero_byte_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "weather.csv", "");
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, PaddockError::EmptyTable(_)));
    }

    #[test]
    fn test_load_table_header_only_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "weather.csv", "Time,AirTemp,Rainfall\n");
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, PaddockError::EmptyTable(_)));
    }

    #[test]
    fn test_load_table_ragged_rows_are_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "laps.csv", "Driver,LapNumber\nHAM,1\nHAM,2,extra,junk\n");
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, PaddockError::MalformedTable { .. }));
    }

    #[test]
    fn test_load_table_invalid_utf8_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("laps.csv");
        std::fs::write(&path, b"Driver,LapNumber\n\xff\xfe,1\n").unwrap();
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, PaddockError::MalformedTable { .. }));
    }

    #[test]
    fn test_load_table_repeated_headers_are_suffixed() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "laps.csv", "Driver,Time,Time\nHAM,1,2\n");

        let table = load_table(&path).unwrap();
        assert_eq!(table.columns, vec!["Driver", "Time", "Time.1"]);
        assert_eq!(
            table.rows[0],
            vec![Some("HAM".to_string()), Some("1".to_string()), Some("2".to_string())]
        );
    }

    #[test]
    fn test_unique_headers_skips_taken_suffix() {
        let names = unique_headers(["A", "A.1", "A", "A"].into_iter());
        assert_eq!(names, vec!["A", "A.1", "A.2", "A.3"]);
    }

    #[test]
    fn test_load_table_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("laps.csv")).unwrap();
        let err = load_table(&dir.path().join("laps.csv")).unwrap_err();
        assert!(matches!(
            err,
            PaddockError::FileRead { .. } | PaddockError::MalformedTable { .. }
        ));
    }
}
