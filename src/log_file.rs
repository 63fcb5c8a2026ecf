//! Timestamped append-only error log
//!
//! Several programs may share one log file, so every line carries the name
//! of the program that wrote it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::Result;

/// Appends error messages to a log file
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
    program: String,
}

impl ErrorLog {
    /// Log to `path`, tagging lines with the running executable's name
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let program = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| crate::APP_NAME.to_string());
        Self::with_program(path, program)
    }

    /// Log to `path`, tagging lines with `program`
    pub fn with_program(path: impl Into<PathBuf>, program: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            program: program.into(),
        }
    }

    /// Location of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `msg` as `"<timestamp> <program>: <msg>"`
    ///
    /// The file is created if missing; its directory must already exist.
    pub fn write_to_log(&self, msg: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{} {}: {}", timestamp, self.program, msg)?;
        Ok(())
    }
}
