// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Append-only payload log.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use symscan_core::LogRecord;
use symscan_core::error::Result;
use tracing::trace;

/// Destination for records that passed deduplication.
pub trait LogSink {
    fn append(&mut self, record: &LogRecord) -> Result<()>;
}

/// Appends `<timestamp> [<kind>] <payload>` lines to a text file.
///
/// The file is opened for every write, so it may be rotated or removed while
/// a session is running.
#[derive(Debug, Clone)]
pub struct FileLogSink {
    path: PathBuf,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileLogSink {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{record}")?;
        trace!(path = %self.path.display(), payload = %record.payload, "log line appended");
        Ok(())
    }
}
