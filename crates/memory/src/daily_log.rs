use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::error::{MemoryError, Result};
use crate::markdown::{log_header, parse_log, render_log_line};
use crate::schema::LogEntry;

/// One date-named, append-only Markdown log file.
#[derive(Debug, Clone)]
pub struct DailyLog {
    path: PathBuf,
}

impl DailyLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn append(&self, entry: &LogEntry) -> Result<()> {
        let io_err = |source| {
            MemoryError::persistence(format!("appending to {}", self.path.display()), source)
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let is_new = !self.path.exists();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        if is_new {
            let label = self
                .path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_default();
            file.write_all(log_header(&label).as_bytes()).map_err(io_err)?;
        }
        file.write_all(render_log_line(entry).as_bytes())
            .map_err(io_err)?;
        // Flush and fsync so the note survives a crash right after append.
        file.flush().map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        Ok(())
    }

    /// All entries in file order; a missing file is an empty log.
    pub fn load(&self) -> Result<Vec<LogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| {
            MemoryError::persistence(format!("reading {}", self.path.display()), source)
        })?;
        Ok(parse_log(&raw))
    }
}
