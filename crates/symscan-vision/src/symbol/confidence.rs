// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sharpness-based confidence — variance of the Laplacian over a symbol's
// region, normalised into [0, 1].

use image::{GrayImage, RgbImage};
use symscan_core::{BoundingBox, ConfidenceScore};

/// Laplacian variance that scores 1.0 unless configured otherwise.
pub const DEFAULT_SHARPNESS_NORMALIZER: f32 = 1000.0;

/// Scores how legible a captured region is. High-frequency content (crisp
/// edges) scores high, blur and flat regions score low. The score says nothing
/// about decode correctness.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceScorer {
    normalizer: f32,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(DEFAULT_SHARPNESS_NORMALIZER)
    }
}

impl ConfidenceScorer {
    pub fn new(normalizer: f32) -> Self {
        Self { normalizer }
    }

    /// Score a grayscale region. Empty regions, and regions too small to have
    /// an interior pixel, score 0.
    pub fn score_region(&self, region: &GrayImage) -> ConfidenceScore {
        let variance = laplacian_variance(region);
        ConfidenceScore::new((variance / self.normalizer as f64) as f32)
    }

    /// Score the part of `frame` under `bbox`. The box is clipped to the frame
    /// first.
    pub fn score_bbox(&self, frame: &RgbImage, bbox: &BoundingBox) -> ConfidenceScore {
        let Some(bbox) = bbox.clip(frame.width(), frame.height()) else {
            return ConfidenceScore::ZERO;
        };
        let crop = image::imageops::crop_imm(frame, bbox.x, bbox.y, bbox.width, bbox.height)
            .to_image();
        self.score_region(&image::imageops::grayscale(&crop))
    }
}

/// Population variance of the 4-neighbour Laplacian over interior pixels.
fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return 0.0;
    }

    let px = |x: u32, y: u32| gray.get_pixel(x, y).0[0] as f64;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut n = 0u64;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let lap = px(x - 1, y) + px(x + 1, y) + px(x, y - 1) + px(x, y + 1) - 4.0 * px(x, y);
            sum += lap;
            sum_sq += lap * lap;
            n += 1;
        }
    }

    let mean = sum / n as f64;
    (sum_sq / n as f64 - mean * mean).max(0.0)
}
