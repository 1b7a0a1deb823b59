#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv_salvage::ParserOptions;
use tempfile::{TempDir, tempdir};

/// Options for comma-delimited text with quote wrapping enabled.
pub fn quoted_options() -> ParserOptions {
    ParserOptions {
        quoting: true,
        ..ParserOptions::default()
    }
}

/// Field values of every record, in order.
pub fn field_values(records: &[csv_salvage::FieldSet]) -> Vec<Vec<String>> {
    records.iter().map(|r| r.to_vec()).collect()
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
