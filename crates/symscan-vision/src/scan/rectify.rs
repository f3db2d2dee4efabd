// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — canonical corner ordering, forward/inverse
// projective transforms, and resampling of the document into a fronto-parallel
// rectangle.

use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use symscan_core::error::{Result, ScanError};
use symscan_core::{OrderedQuad, Point, Quad};
use tracing::{debug, instrument};

/// Points closer than this (in pixels) are treated as duplicates.
const DUPLICATE_EPS: f32 = 1e-3;

/// Triangles with a doubled area below this (in square pixels) are treated as
/// collinear.
const COLLINEAR_EPS: f32 = 1e-2;

/// Label quad corners canonically (image coordinates, y down):
///
/// - top-left has the smallest `x + y`
/// - bottom-right has the largest `x + y`
/// - top-right has the smallest `y - x`
/// - bottom-left has the largest `y - x`
///
/// Returns `None` when one point would receive two labels.
pub fn order_quad(quad: &Quad) -> Option<OrderedQuad> {
    let pts = &quad.points;
    let sum = |p: &Point| p.x + p.y;
    let diff = |p: &Point| p.y - p.x;

    let tl = arg_extreme(pts, sum, false);
    let br = arg_extreme(pts, sum, true);
    let tr = arg_extreme(pts, diff, false);
    let bl = arg_extreme(pts, diff, true);

    let labels = [tl, tr, br, bl];
    for i in 0..4 {
        for j in (i + 1)..4 {
            if labels[i] == labels[j] {
                return None;
            }
        }
    }

    Some(OrderedQuad {
        top_left: pts[tl],
        top_right: pts[tr],
        bottom_right: pts[br],
        bottom_left: pts[bl],
    })
}

/// Index of the first point minimising (or maximising) `key`.
fn arg_extreme(points: &[Point; 4], key: impl Fn(&Point) -> f32, max: bool) -> usize {
    let mut best = 0;
    for i in 1..points.len() {
        let (candidate, current) = (key(&points[i]), key(&points[best]));
        let better = if max {
            candidate > current
        } else {
            candidate < current
        };
        if better {
            best = i;
        }
    }
    best
}

/// Reject duplicate or collinear corners.
fn check_non_degenerate(corners: &[Point; 4]) -> Result<()> {
    for i in 0..4 {
        for j in (i + 1)..4 {
            if corners[i].distance(&corners[j]) < DUPLICATE_EPS {
                return Err(ScanError::DegenerateGeometry(format!(
                    "duplicate quad corners {:?} and {:?}",
                    corners[i], corners[j]
                )));
            }
        }
    }
    // Every triple of the four points.
    for skip in 0..4 {
        let tri: Vec<Point> = (0..4).filter(|&k| k != skip).map(|k| corners[k]).collect();
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        if cross.abs() < COLLINEAR_EPS {
            return Err(ScanError::DegenerateGeometry(format!(
                "collinear quad corners {a:?}, {b:?}, {c:?}"
            )));
        }
    }
    Ok(())
}

/// Forward and inverse projective maps between a document quad in the frame
/// and an axis-aligned `width` x `height` rectangle.
///
/// `width` and `height` are always strictly positive.
#[derive(Debug, Clone, Copy)]
pub struct RectificationTransform {
    forward: Projection,
    inverse: Projection,
    width: u32,
    height: u32,
    source: OrderedQuad,
}

impl RectificationTransform {
    /// Derive the transform for a detected quad.
    ///
    /// The destination is `round(max(top, bottom))` wide and
    /// `round(max(left, right))` tall. Its corners are `(0,0)`, `(w-1,0)`,
    /// `(w-1,h-1)`, `(0,h-1)` in TL/TR/BR/BL order.
    pub fn from_quad(quad: &Quad) -> Result<Self> {
        check_non_degenerate(&quad.points)?;
        let ordered = order_quad(quad).ok_or_else(|| {
            ScanError::DegenerateGeometry(format!(
                "quad corners cannot be labelled uniquely: {:?}",
                quad.points
            ))
        })?;

        let width = ordered.top_edge().max(ordered.bottom_edge()).round();
        let height = ordered.left_edge().max(ordered.right_edge()).round();
        if !(width > 0.0 && height > 0.0) {
            return Err(ScanError::DegenerateGeometry(format!(
                "non-positive destination size {width}x{height}"
            )));
        }
        if width < 2.0 || height < 2.0 {
            return Err(ScanError::DegenerateGeometry(format!(
                "destination {width}x{height} too small to rectify"
            )));
        }

        let (max_x, max_y) = (width - 1.0, height - 1.0);
        let src = ordered.corners().map(|p| p.as_tuple());
        let dst = [(0.0, 0.0), (max_x, 0.0), (max_x, max_y), (0.0, max_y)];

        let forward = Projection::from_control_points(src, dst).ok_or_else(|| {
            ScanError::DegenerateGeometry("projective transform is singular".into())
        })?;

        Ok(Self {
            forward,
            inverse: forward.invert(),
            width: width as u32,
            height: height as u32,
            source: ordered,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Destination size as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The ordered source quad in frame coordinates.
    pub fn source(&self) -> &OrderedQuad {
        &self.source
    }

    /// Destination rectangle corners in TL/TR/BR/BL order.
    pub fn destination_corners(&self) -> [Point; 4] {
        let (max_x, max_y) = ((self.width - 1) as f32, (self.height - 1) as f32);
        [
            Point::new(0.0, 0.0),
            Point::new(max_x, 0.0),
            Point::new(max_x, max_y),
            Point::new(0.0, max_y),
        ]
    }

    /// Map a frame point into rectified space.
    pub fn to_rectified(&self, p: Point) -> Point {
        Point::from(self.forward * p.as_tuple())
    }

    /// Map a rectified point back into frame space.
    pub fn to_frame(&self, p: Point) -> Point {
        Point::from(self.inverse * p.as_tuple())
    }

    pub fn forward(&self) -> &Projection {
        &self.forward
    }

    pub fn inverse(&self) -> &Projection {
        &self.inverse
    }
}

/// A rectified document image together with the transform that produced it.
#[derive(Debug, Clone)]
pub struct Rectified {
    pub transform: RectificationTransform,
    pub image: RgbImage,
}

/// Warps the document quad of a frame into a fronto-parallel image.
#[derive(Debug, Clone)]
pub struct PerspectiveRectifier {
    /// Colour for destination pixels that fall outside the source frame.
    fill: Rgb<u8>,
}

impl Default for PerspectiveRectifier {
    fn default() -> Self {
        Self {
            fill: Rgb([255, 255, 255]),
        }
    }
}

impl PerspectiveRectifier {
    /// Rectify `quad` out of `frame`.
    ///
    /// Fails on degenerate quads; the caller is expected to fall back to the
    /// unrectified frame.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn rectify(&self, frame: &RgbImage, quad: &Quad) -> Result<Rectified> {
        let transform = RectificationTransform::from_quad(quad)?;
        let (out_w, out_h) = transform.size();

        let mut image = RgbImage::new(out_w, out_h);
        warp_into(
            frame,
            transform.forward(),
            Interpolation::Bilinear,
            self.fill,
            &mut image,
        );

        debug!(out_w, out_h, "perspective rectification applied");
        Ok(Rectified { transform, image })
    }
}
