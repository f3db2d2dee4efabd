// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame capture — the frame source boundary and a directory-backed source.

use std::path::{Path, PathBuf};

use image::RgbImage;
use symscan_core::ScanError;
use symscan_core::error::Result;
use tracing::{debug, info, warn};

/// Extensions the directory source treats as frames.
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// Supplies frames one at a time. `None` ends the stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<RgbImage>;
}

/// Replays the image files of a directory in file-name order.
///
/// Files that fail to decode are skipped with a warning. With looping
/// enabled the sequence restarts at the first file, unless a whole pass
/// produced no frame at all.
#[derive(Debug)]
pub struct DirectorySource {
    paths: Vec<PathBuf>,
    next: usize,
    looping: bool,
    yielded_this_pass: bool,
}

impl DirectorySource {
    pub fn open(dir: impl AsRef<Path>, looping: bool) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ScanError::Config(format!(
                "frame directory not found: {}",
                dir.display()
            )));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_frame_file(p))
            .collect();
        paths.sort();

        info!(dir = %dir.display(), frames = paths.len(), looping, "frame directory opened");
        Ok(Self::from_paths(paths, looping))
    }

    pub fn from_paths(paths: Vec<PathBuf>, looping: bool) -> Self {
        Self {
            paths,
            next: 0,
            looping,
            yielded_this_pass: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for DirectorySource {
    fn next_frame(&mut self) -> Option<RgbImage> {
        loop {
            if self.next >= self.paths.len() {
                if !self.looping || !self.yielded_this_pass {
                    return None;
                }
                debug!("frame directory exhausted; looping");
                self.next = 0;
                self.yielded_this_pass = false;
            }

            let path = &self.paths[self.next];
            self.next += 1;
            match image::open(path) {
                Ok(img) => {
                    self.yielded_this_pass = true;
                    return Some(img.to_rgb8());
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable frame"),
            }
        }
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
