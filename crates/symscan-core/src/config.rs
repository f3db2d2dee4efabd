// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::dedup::DEFAULT_COOLDOWN_FRAMES;
use crate::error::{Result, ScanError};
use crate::types::BoundingBox;

/// Upper bound on rows sampled by the linear barcode decoder.
pub const MAX_LINEAR_SCANLINES: u32 = 1024;

/// Tunables for the scanning pipeline and its sinks.
///
/// Every field has a default, so a partial JSON file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Frames a logged (kind, payload) pair stays suppressed.
    pub cooldown_frames: u32,
    /// Minimum document quad area as a fraction of the frame area.
    pub min_quad_area_ratio: f32,
    /// Polygon approximation tolerance as a fraction of contour arc length.
    pub approx_epsilon_ratio: f32,
    /// Gaussian blur sigma applied before edge detection.
    pub blur_sigma: f32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Laplacian variance that maps to a confidence of 1.0.
    pub sharpness_normalizer: f32,
    /// Box used for symbols the decoder could not locate.
    pub placeholder_box: BoundingBox,
    /// Rows sampled by the linear barcode decoder.
    pub linear_scanlines: u32,
    /// Append-only payload log.
    pub log_path: PathBuf,
    /// Directory for snapshot images.
    pub snapshot_dir: PathBuf,
    /// Snapshot image extension (format is inferred from it).
    pub snapshot_ext: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            cooldown_frames: DEFAULT_COOLDOWN_FRAMES,
            min_quad_area_ratio: 0.15,
            approx_epsilon_ratio: 0.02,
            blur_sigma: 1.5,
            canny_low: 50.0,
            canny_high: 150.0,
            sharpness_normalizer: 1000.0,
            placeholder_box: BoundingBox::new(20, 20, 200, 60),
            linear_scanlines: 15,
            log_path: PathBuf::from("scan_log.txt"),
            snapshot_dir: PathBuf::from("."),
            snapshot_ext: "png".to_owned(),
        }
    }
}

impl ScanConfig {
    /// Load a JSON config file and validate it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_quad_area_ratio > 0.0 && self.min_quad_area_ratio <= 1.0) {
            return Err(ScanError::Config(format!(
                "min_quad_area_ratio must be in (0, 1], got {}",
                self.min_quad_area_ratio
            )));
        }
        if !(self.approx_epsilon_ratio > 0.0 && self.approx_epsilon_ratio <= 1.0) {
            return Err(ScanError::Config(format!(
                "approx_epsilon_ratio must be in (0, 1], got {}",
                self.approx_epsilon_ratio
            )));
        }
        if !(self.blur_sigma > 0.0) {
            return Err(ScanError::Config(format!(
                "blur_sigma must be positive, got {}",
                self.blur_sigma
            )));
        }
        if self.canny_low > self.canny_high {
            return Err(ScanError::Config(format!(
                "canny_low ({}) exceeds canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        if !(self.sharpness_normalizer > 0.0) {
            return Err(ScanError::Config(format!(
                "sharpness_normalizer must be positive, got {}",
                self.sharpness_normalizer
            )));
        }
        if !(1..=MAX_LINEAR_SCANLINES).contains(&self.linear_scanlines) {
            return Err(ScanError::Config(format!(
                "linear_scanlines must be in 1..={MAX_LINEAR_SCANLINES}, got {}",
                self.linear_scanlines
            )));
        }
        if self.snapshot_ext.trim().is_empty() {
            return Err(ScanError::Config("snapshot_ext must not be empty".into()));
        }
        Ok(())
    }
}
