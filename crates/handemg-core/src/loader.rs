//! Loader for the hand-pose and EMG CSV logs
//!
//! Load failures stop here: they are logged and turned into an absent
//! table, so callers only ever check for `None`.

use crate::error::HandEmgResult;
use crate::table::DataTable;
use std::io::{self, Write};
use std::path::Path;
use tracing::{error, info};

/// Parse one CSV file, keeping the typed error
pub fn load_table(path: impl AsRef<Path>) -> HandEmgResult<DataTable> {
    DataTable::from_path(path)
}

/// Holds at most one hand-pose table and one EMG table
#[derive(Debug, Default)]
pub struct HandDataLoader {
    hand_data: Option<DataTable>,
    emg_data: Option<DataTable>,
}

impl HandDataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the hand-pose log.
    ///
    /// On failure the returned value is `None` and a previously loaded
    /// hand table, if any, stays in place.
    pub fn load_hand_data(&mut self, path: impl AsRef<Path>) -> Option<&DataTable> {
        let table = load_logged("Hand", path.as_ref())?;
        Some(self.hand_data.insert(table))
    }

    /// Load the EMG log; same contract as `load_hand_data`
    pub fn load_emg_data(&mut self, path: impl AsRef<Path>) -> Option<&DataTable> {
        let table = load_logged("EMG", path.as_ref())?;
        Some(self.emg_data.insert(table))
    }

    /// Load both logs; a failure in one does not stop the other
    pub fn load_all(
        &mut self,
        hand_path: impl AsRef<Path>,
        emg_path: impl AsRef<Path>,
    ) -> (Option<&DataTable>, Option<&DataTable>) {
        let hand_ok = self.load_hand_data(hand_path).is_some();
        let emg_ok = self.load_emg_data(emg_path).is_some();
        (
            self.hand_data.as_ref().filter(|_| hand_ok),
            self.emg_data.as_ref().filter(|_| emg_ok),
        )
    }

    pub fn hand_data(&self) -> Option<&DataTable> {
        self.hand_data.as_ref()
    }

    pub fn emg_data(&self) -> Option<&DataTable> {
        self.emg_data.as_ref()
    }

    /// Print shape, columns and dtypes of the loaded tables to stdout
    pub fn describe(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.describe_to(&mut out)
    }

    /// Write shape, columns and dtypes of each loaded table; tables not
    /// loaded produce no output
    pub fn describe_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if let Some(table) = &self.hand_data {
            describe_table(out, "Hand Data Info", table)?;
        }

        if let Some(table) = &self.emg_data {
            describe_table(out, "EMG Data Info", table)?;
        }

        Ok(())
    }
}

fn load_logged(kind: &str, path: &Path) -> Option<DataTable> {
    match load_table(path) {
        Ok(table) => {
            info!(
                "{} data loaded: {} rows, {} columns",
                kind,
                table.row_count(),
                table.column_count()
            );
            Some(table)
        }
        Err(e) => {
            error!("Error loading {} data: {}", kind.to_lowercase(), e);
            None
        }
    }
}

fn describe_table<W: Write>(out: &mut W, title: &str, table: &DataTable) -> io::Result<()> {
    let (rows, columns) = table.shape();
    writeln!(out)?;
    writeln!(out, "=== {} ===", title)?;
    writeln!(out, "Shape: ({}, {})", rows, columns)?;
    writeln!(out, "Columns: [{}]", table.column_names().join(", "))?;
    writeln!(out, "Data types:")?;

    let width = table.column_names().iter().map(|n| n.len()).max().unwrap_or(0);
    for (name, dtype) in table.dtypes() {
        writeln!(out, "{:<width$}  {}", name, dtype, width = width)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_describe_without_tables_prints_nothing() {
        let loader = HandDataLoader::new();
        let mut out = Vec::new();
        loader.describe_to(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_one_failure_does_not_block_the_other() {
        let dir = tempdir().unwrap();
        let emg_path = dir.path().join("emg_data.csv");
        fs::write(&emg_path, "Timestamp,emg\n0,0.1\n1,0.2\n").unwrap();

        let mut loader = HandDataLoader::new();
        let (hand, emg) = loader.load_all(dir.path().join("missing.csv"), &emg_path);

        assert!(hand.is_none());
        assert_eq!(emg.map(|t| t.shape()), Some((2, 2)));
    }

    #[test]
    fn test_describe_reports_loaded_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("emg_data.csv");
        fs::write(&path, "Timestamp,emg\n0,0.1\n1,0.2\n2,0.3\n").unwrap();

        let mut loader = HandDataLoader::new();
        loader.load_emg_data(&path);

        let mut out = Vec::new();
        loader.describe_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(!text.contains("Hand Data Info"));
        assert!(text.contains("=== EMG Data Info ==="));
        assert!(text.contains("Shape: (3, 2)"));
        assert!(text.contains("Columns: [Timestamp, emg]"));
        assert!(text.contains("emg        float64"));
    }

    #[test]
    fn test_failed_reload_keeps_previous_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hand.csv");
        fs::write(&path, "timestamp,is_left\n0,True\n").unwrap();

        let mut loader = HandDataLoader::new();
        assert!(loader.load_hand_data(&path).is_some());
        assert!(loader.load_hand_data(dir.path().join("gone.csv")).is_none());
        assert_eq!(loader.hand_data().map(|t| t.row_count()), Some(1));
    }
}
