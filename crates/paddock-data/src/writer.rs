//! Atomic CSV persistence of output tables.

use std::fs::File;
use std::io;
use std::path::Path;

use paddock_core::error::{PaddockError, Result};
use paddock_core::models::Table;
use tempfile::NamedTempFile;

#[cfg(unix)]
const DEFAULT_OUTPUT_MODE: u32 = 0o644;

/// Write `table` as CSV to `path`, replacing any existing file.
///
/// The table is written to a temporary file in the target directory and
/// renamed over `path`, so readers never observe a half-written file. Null
/// cells are written as empty fields. Parent directories are created.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let wrap = |source: io::Error| PaddockError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(wrap)?;

    let tmp = NamedTempFile::new_in(dir).map_err(wrap)?;
    write_csv(tmp.as_file(), table).map_err(wrap)?;
    tmp.as_file().sync_all().map_err(wrap)?;
    apply_output_permissions(tmp.as_file(), path).map_err(wrap)?;
    tmp.persist(path).map_err(|e| wrap(e.error))?;

    Ok(())
}

/// Temporary files are created owner-only; outputs keep the mode of the file
/// they replace, or 0644 when there is none.
#[cfg(unix)]
fn apply_output_permissions(file: &File, target: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = match std::fs::metadata(target) {
        Ok(meta) => meta.permissions(),
        Err(_) => std::fs::Permissions::from_mode(DEFAULT_OUTPUT_MODE),
    };
    file.set_permissions(permissions)
}

#[cfg(not(unix))]
fn apply_output_permissions(_file: &File, _target: &Path) -> io::Result<()> {
    Ok(())
}

fn write_csv<W: io::Write>(out: W, table: &Table) -> io::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}
