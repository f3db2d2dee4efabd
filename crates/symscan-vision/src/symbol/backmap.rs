// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Coordinate back-mapping — symbol outlines decoded in rectified space are
// re-expressed in original frame pixels so that overlays and scoring work in
// one coordinate system whether or not rectification happened.

use symscan_core::{BoundingBox, DetectedSymbol, Point};
use tracing::trace;

use super::decode::RawSymbol;
use crate::scan::RectificationTransform;

/// Apply the inverse rectification pointwise, or pass the polygon through
/// when the frame was decoded unrectified.
pub fn back_map(polygon: &[Point], transform: Option<&RectificationTransform>) -> Vec<Point> {
    match transform {
        Some(t) => polygon.iter().map(|p| t.to_frame(*p)).collect(),
        None => polygon.to_vec(),
    }
}

/// Locates decoded symbols in the original frame.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateBackMapper<'a> {
    transform: Option<&'a RectificationTransform>,
    frame_width: u32,
    frame_height: u32,
    placeholder: BoundingBox,
}

impl<'a> CoordinateBackMapper<'a> {
    pub fn new(
        transform: Option<&'a RectificationTransform>,
        frame_width: u32,
        frame_height: u32,
        placeholder: BoundingBox,
    ) -> Self {
        Self {
            transform,
            frame_width,
            frame_height,
            placeholder,
        }
    }

    pub fn map_polygon(&self, polygon: &[Point]) -> Vec<Point> {
        back_map(polygon, self.transform)
    }

    /// Build the frame-space symbol.
    ///
    /// Symbols with fewer than three outline points get the placeholder box.
    /// Returns `None` when the clipped box has no area.
    pub fn locate(&self, raw: RawSymbol) -> Option<DetectedSymbol> {
        let (polygon, bbox, placeholder) = if raw.polygon.len() < 3 {
            let bbox = self.placeholder.clip(self.frame_width, self.frame_height)?;
            (Vec::new(), bbox, true)
        } else {
            let polygon = self.map_polygon(&raw.polygon);
            let bbox = BoundingBox::enclosing(&polygon, self.frame_width, self.frame_height);
            let Some(bbox) = bbox else {
                trace!(payload = %raw.payload, "symbol box empty after clipping; dropped");
                return None;
            };
            (polygon, bbox, false)
        };

        Some(DetectedSymbol {
            kind: raw.kind,
            payload: raw.payload,
            polygon,
            bbox,
            placeholder,
        })
    }
}
