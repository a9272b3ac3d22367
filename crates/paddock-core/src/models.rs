use serde::{Deserialize, Serialize};
use std::fmt;

/// Column appended to every tagged row holding the season.
pub const SEASON_COLUMN: &str = "Year";
/// Column appended to every tagged row holding the event name.
pub const EVENT_COLUMN: &str = "GP";
/// Column appended to every tagged row holding the session-type code.
pub const SESSION_COLUMN: &str = "Session";

/// Participant-identifier column of the results table.
pub const DRIVER_ID_COLUMN: &str = "Abbreviation";
/// Single column of the roster output.
pub const ROSTER_COLUMN: &str = "Driver";
/// File name of the roster output.
pub const ROSTER_FILE_NAME: &str = "active_drivers.csv";
/// Minimum number of result rows a driver needs to be on the roster.
pub const DEFAULT_MIN_APPEARANCES: usize = 10;

/// A single table cell. `None` is the null marker (empty CSV field).
pub type Cell = Option<String>;

/// The three raw table kinds stored in every session folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Laps,
    Results,
    Weather,
}

impl TableKind {
    /// Every kind, in the order folders are scanned and outputs written.
    pub const ALL: [TableKind; 3] = [TableKind::Laps, TableKind::Results, TableKind::Weather];

    /// Lower-case name, e.g. `"laps"`.
    pub fn as_str(self) -> &'static str {
        match self {
            TableKind::Laps => "laps",
            TableKind::Results => "results",
            TableKind::Weather => "weather",
        }
    }

    /// File name inside a session folder, e.g. `"laps.csv"`.
    pub fn file_name(self) -> &'static str {
        match self {
            TableKind::Laps => "laps.csv",
            TableKind::Results => "results.csv",
            TableKind::Weather => "weather.csv",
        }
    }

    /// File name of the consolidated output, e.g. `"all_laps.csv"`.
    pub fn output_file_name(self) -> &'static str {
        match self {
            TableKind::Laps => "all_laps.csv",
            TableKind::Results => "all_results.csv",
            TableKind::Weather => "all_weather.csv",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one session, as encoded in its folder name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    /// Season token, kept verbatim (normally a four-digit year).
    pub season: String,
    /// Event name with underscores in place of spaces. May be empty.
    pub event: String,
    /// Session-type code, e.g. `"R"` or `"Q"`.
    pub session: String,
}

impl SessionKey {
    pub fn new(
        season: impl Into<String>,
        event: impl Into<String>,
        session: impl Into<String>,
    ) -> Self {
        Self {
            season: season.into(),
            event: event.into(),
            session: session.into(),
        }
    }

    /// Folder name this session is stored under.
    ///
    /// An empty event collapses to `<season>_<session>`.
    pub fn folder_name(&self) -> String {
        if self.event.is_empty() {
            format!("{}_{}", self.season, self.session)
        } else {
            format!("{}_{}_{}", self.season, self.event, self.session)
        }
    }

    /// The `(column, value)` pairs appended to every row of this session.
    pub fn tags(&self) -> [(&'static str, &str); 3] {
        [
            (SEASON_COLUMN, self.season.as_str()),
            (EVENT_COLUMN, self.event.as_str()),
            (SESSION_COLUMN, self.session.as_str()),
        ]
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.season, self.event, self.session)
    }
}

/// A row-oriented table: ordered column names plus rows of nullable cells.
///
/// Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` in the header, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row, padding with nulls or truncating to the header width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// All cells of column `name`, top to bottom.
    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = Option<&'a str>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[idx].as_deref()))
    }

    /// Set column `name` to `value` on every row.
    ///
    /// The column is appended when absent and overwritten in place otherwise.
    pub fn fill_column(&mut self, name: &str, value: &str) {
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = Some(value.to_string());
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(Some(value.to_string()));
                }
            }
        }
    }
}
