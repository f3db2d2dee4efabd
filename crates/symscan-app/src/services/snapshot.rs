// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Snapshot persistence — timestamped still images of the raw frame.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use image::RgbImage;
use symscan_core::ScanError;
use symscan_core::error::Result;
use symscan_core::time::snapshot_stamp;
use tracing::info;

/// Destination for raw-frame snapshots. Returns where the frame was stored.
pub trait SnapshotSink {
    fn save(&mut self, frame: &RgbImage) -> Result<PathBuf>;
}

/// Writes `frame_<YYYYMMDD-HHMMSS>.<ext>` files into a directory. The image
/// format follows the extension.
///
/// A second snapshot within the same second gets a `-1`, `-2`... suffix rather
/// than overwriting the first.
#[derive(Debug, Clone)]
pub struct FileSnapshotSink {
    dir: PathBuf,
    ext: String,
}

impl FileSnapshotSink {
    pub fn new(dir: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            ext: ext.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save with an explicit capture time.
    pub fn save_at<Tz: TimeZone>(&self, frame: &RgbImage, at: &DateTime<Tz>) -> Result<PathBuf>
    where
        Tz::Offset: std::fmt::Display,
    {
        let path = self.free_path(&snapshot_stamp(at));
        frame
            .save(&path)
            .map_err(|e| ScanError::ImageError(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), "snapshot saved");
        Ok(path)
    }

    fn free_path(&self, stamp: &str) -> PathBuf {
        let first = self.dir.join(format!("frame_{stamp}.{}", self.ext));
        if !first.exists() {
            return first;
        }
        (1u32..)
            .map(|n| self.dir.join(format!("frame_{stamp}-{n}.{}", self.ext)))
            .find(|p| !p.exists())
            .unwrap_or(first)
    }
}

impl SnapshotSink for FileSnapshotSink {
    fn save(&mut self, frame: &RgbImage) -> Result<PathBuf> {
        self.save_at(frame, &Local::now())
    }
}
