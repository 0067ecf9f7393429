//! JSONL harvest log — append-only record of every identifier processed.
//!
//! One row per identifier per run, rotated when the file exceeds
//! `MAX_LOG_SIZE`. Rotated files are named `.1`, `.2`, etc.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Maximum harvest log size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum number of rotated log files to keep.
const MAX_ROTATIONS: u32 = 3;

/// Outcome of one identifier's fetch, as recorded in the log.
#[derive(Debug, Clone, Serialize)]
pub struct FetchRecord {
    pub timestamp: String,
    pub part_number: String,
    pub url: String,
    /// `ok`, `partial`, or `load_failed`.
    pub status: String,
    pub duration_ms: u64,
}

/// Append-only JSONL harvest logger with automatic rotation.
pub struct HarvestLog {
    file: File,
    path: PathBuf,
    /// Approximate current size (re-checked on rotation).
    current_size: u64,
}

impl HarvestLog {
    /// Open or create the harvest log file.
    pub fn open(path: &PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open harvest log: {}", path.display()))?;

        let current_size = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            file,
            path: path.clone(),
            current_size,
        })
    }

    /// Open the default harvest log at ~/.partfetch/harvest.jsonl.
    pub fn default_log() -> Result<Self> {
        Self::open(&default_log_path())
    }

    /// Record one identifier's outcome.
    pub fn record(&mut self, part_number: &str, url: &str, status: &str, duration_ms: u64) -> Result<()> {
        self.append(&FetchRecord {
            timestamp: Utc::now().to_rfc3339(),
            part_number: part_number.to_string(),
            url: url.to_string(),
            status: status.to_string(),
            duration_ms,
        })
    }

    /// Append a record, rotating first if the log is full.
    pub fn append(&mut self, record: &FetchRecord) -> Result<()> {
        if self.current_size >= MAX_LOG_SIZE {
            self.rotate()?;
        }

        let json = serde_json::to_string(record)?;
        let bytes_written = writeln!(self.file, "{json}")
            .map(|()| json.len() as u64 + 1)
            .unwrap_or(0);
        self.current_size += bytes_written;
        Ok(())
    }

    /// Rotate log files: harvest.jsonl → harvest.jsonl.1, .1 → .2, etc.
    fn rotate(&mut self) -> Result<()> {
        self.file.flush()?;

        for i in (1..MAX_ROTATIONS).rev() {
            let from = rotation_path(&self.path, i);
            let to = rotation_path(&self.path, i + 1);
            if from.exists() {
                let _ = std::fs::rename(&from, &to);
            }
        }

        let first_rotation = rotation_path(&self.path, 1);
        let _ = std::fs::rename(&self.path, &first_rotation);

        let oldest = rotation_path(&self.path, MAX_ROTATIONS);
        if oldest.exists() {
            let _ = std::fs::remove_file(&oldest);
        }

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| "failed to reopen harvest log after rotation")?;
        self.current_size = 0;

        Ok(())
    }
}

/// Default harvest log location.
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".partfetch")
        .join("harvest.jsonl")
}

/// Build path for a rotated log file: `harvest.jsonl.1`, `harvest.jsonl.2`, etc.
fn rotation_path(base: &std::path::Path, index: u32) -> PathBuf {
    let name = format!(
        "{}.{index}",
        base.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("harvest.jsonl")
    );
    base.with_file_name(name)
}
