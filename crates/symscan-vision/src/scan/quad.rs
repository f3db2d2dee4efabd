// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document quadrilateral detection — edge map, contour extraction, polygon
// approximation, and selection of the largest convex four-sided candidate.

use image::{GrayImage, RgbImage};
use imageproc::contours::{BorderType, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::morphology::dilate;
use imageproc::point::Point as PixelPoint;
use symscan_core::{Point, Quad, ScanConfig, polygon_area};
use tracing::{debug, instrument, trace};

/// Finds the most likely document boundary in a frame.
///
/// ## Pipeline
///
/// 1. Convert to grayscale
/// 2. Gaussian blur to suppress sensor noise
/// 3. Canny edge detection
/// 4. One-pixel dilation so hairline breaks in the boundary do not split it
/// 5. Contour extraction (outer borders only)
/// 6. Douglas–Peucker approximation at a tolerance proportional to the
///    contour's arc length
/// 7. Keep convex four-vertex polygons covering at least `min_area_ratio` of
///    the frame, and return the largest (first found wins ties)
///
/// Detection is a pure function of the frame.
#[derive(Debug, Clone)]
pub struct QuadDetector {
    blur_sigma: f32,
    canny_low: f32,
    canny_high: f32,
    approx_epsilon_ratio: f64,
    min_area_ratio: f32,
}

impl Default for QuadDetector {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

impl QuadDetector {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            blur_sigma: config.blur_sigma,
            canny_low: config.canny_low,
            canny_high: config.canny_high,
            approx_epsilon_ratio: config.approx_epsilon_ratio as f64,
            min_area_ratio: config.min_quad_area_ratio,
        }
    }

    /// Override the minimum area fraction.
    pub fn with_min_area_ratio(mut self, ratio: f32) -> Self {
        self.min_area_ratio = ratio;
        self
    }

    /// Detect the document quad in an RGB frame.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn detect(&self, frame: &RgbImage) -> Option<Quad> {
        let gray = image::imageops::grayscale(frame);
        self.detect_gray(&gray)
    }

    /// Detect the document quad in a grayscale frame.
    pub fn detect_gray(&self, gray: &GrayImage) -> Option<Quad> {
        let (width, height) = gray.dimensions();
        if width < 3 || height < 3 {
            return None;
        }

        let blurred = gaussian_blur_f32(gray, self.blur_sigma);
        let edges = canny(&blurred, self.canny_low, self.canny_high);
        let edges = dilate(&edges, Norm::LInf, 1);

        let contours = find_contours::<i32>(&edges);
        let min_area = self.min_area_ratio * width as f32 * height as f32;
        trace!(contours = contours.len(), min_area, "contours extracted");

        let mut best: Option<(f32, [Point; 4])> = None;
        for contour in contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer)
        {
            let Some((area, corners)) =
                quad_candidate(&contour.points, self.approx_epsilon_ratio)
            else {
                continue;
            };
            if area < min_area {
                continue;
            }
            // Strictly greater keeps the first candidate on ties.
            if best.as_ref().is_none_or(|(best_area, _)| area > *best_area) {
                best = Some((area, corners));
            }
        }

        match best {
            Some((area, corners)) => {
                debug!(area, ?corners, "document quad found");
                Some(Quad::new(corners))
            }
            None => {
                debug!("no document quad");
                None
            }
        }
    }
}

/// Approximate a contour and return `(area, corners)` if it is a convex
/// quadrilateral. Corners stay in contour (boundary) order.
fn quad_candidate(points: &[PixelPoint<i32>], epsilon_ratio: f64) -> Option<(f32, [Point; 4])> {
    if points.len() < 4 {
        return None;
    }
    let epsilon = epsilon_ratio * arc_length(points, true);
    if epsilon <= 0.0 {
        return None;
    }
    let approx = approximate_polygon_dp(points, epsilon, true);
    if approx.len() != 4 {
        return None;
    }

    let corners = [
        to_point(approx[0]),
        to_point(approx[1]),
        to_point(approx[2]),
        to_point(approx[3]),
    ];
    if !is_convex(&corners) {
        return None;
    }
    Some((polygon_area(&corners), corners))
}

fn to_point(p: PixelPoint<i32>) -> Point {
    Point::new(p.x as f32, p.y as f32)
}

/// A polygon is strictly convex when every turn has the same, non-zero
/// orientation.
pub(crate) fn is_convex(points: &[Point]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f32;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        if cross == 0.0 {
            return false;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}
