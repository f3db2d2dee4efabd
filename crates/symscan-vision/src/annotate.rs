// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay rendering — draws symbol outlines, boxes, confidence bars and the
// document indicator onto a copy of the frame.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use symscan_core::{BoundingBox, OrderedQuad, Point, ScoredSymbol};

use crate::pipeline::FrameReport;

const GREEN: Rgb<u8> = Rgb([0, 200, 0]);
const YELLOW: Rgb<u8> = Rgb([230, 200, 0]);
const BLUE: Rgb<u8> = Rgb([30, 90, 255]);
const DARK: Rgb<u8> = Rgb([40, 40, 40]);

/// Height of the confidence bar drawn under each symbol box.
const BAR_HEIGHT: u32 = 4;
/// Gap between a box and its confidence bar.
const BAR_GAP: u32 = 2;
/// Side of the square document marker in the top-left corner.
const MARKER_SIZE: u32 = 14;
const MARKER_MARGIN: i32 = 8;

/// Renders a [`FrameReport`] over the frame it was computed from.
#[derive(Debug, Clone, Default)]
pub struct FrameAnnotator;

impl FrameAnnotator {
    pub fn new() -> Self {
        Self
    }

    /// Return an annotated copy of `frame`.
    pub fn annotate(&self, frame: &RgbImage, report: &FrameReport) -> RgbImage {
        let mut canvas = frame.clone();
        if let Some(document) = &report.document {
            draw_document(&mut canvas, document);
        }
        for scored in &report.symbols {
            draw_symbol(&mut canvas, scored);
        }
        canvas
    }
}

fn draw_document(canvas: &mut RgbImage, document: &OrderedQuad) {
    draw_closed_polyline(canvas, &document.corners(), BLUE);
    if canvas.width() as i32 > MARKER_MARGIN + MARKER_SIZE as i32
        && canvas.height() as i32 > MARKER_MARGIN + MARKER_SIZE as i32
    {
        let marker = Rect::at(MARKER_MARGIN, MARKER_MARGIN).of_size(MARKER_SIZE, MARKER_SIZE);
        draw_filled_rect_mut(canvas, marker, GREEN);
    }
}

fn draw_symbol(canvas: &mut RgbImage, scored: &ScoredSymbol) {
    let symbol = &scored.symbol;
    let colour = if symbol.placeholder { YELLOW } else { GREEN };

    if symbol.polygon.len() >= 3 {
        draw_closed_polyline(canvas, &symbol.polygon, colour);
    }
    if let Some(rect) = to_rect(&symbol.bbox) {
        draw_hollow_rect_mut(canvas, rect, colour);
    }
    draw_confidence_bar(canvas, &symbol.bbox, scored.confidence.value());
}

/// Background track the width of the box, filled proportionally to `score`.
/// Skipped when there is no room below the box.
fn draw_confidence_bar(canvas: &mut RgbImage, bbox: &BoundingBox, score: f32) {
    let top = bbox.bottom() + BAR_GAP;
    if top + BAR_HEIGHT > canvas.height() || bbox.width == 0 {
        return;
    }
    let track = Rect::at(bbox.x as i32, top as i32).of_size(bbox.width, BAR_HEIGHT);
    draw_filled_rect_mut(canvas, track, DARK);

    let filled = (bbox.width as f32 * score.clamp(0.0, 1.0)).round() as u32;
    if filled > 0 {
        let bar = Rect::at(bbox.x as i32, top as i32).of_size(filled, BAR_HEIGHT);
        draw_filled_rect_mut(canvas, bar, GREEN);
    }
}

fn draw_closed_polyline(canvas: &mut RgbImage, points: &[Point], colour: Rgb<u8>) {
    for (i, start) in points.iter().enumerate() {
        let end = points[(i + 1) % points.len()];
        draw_line_segment_mut(canvas, start.as_tuple(), end.as_tuple(), colour);
    }
}

fn to_rect(bbox: &BoundingBox) -> Option<Rect> {
    (bbox.width > 0 && bbox.height > 0)
        .then(|| Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use symscan_core::{ConfidenceScore, DetectedSymbol, SymbolKind};

    fn blank() -> RgbImage {
        RgbImage::from_pixel(200, 150, Rgb([255, 255, 255]))
    }

    fn scored(bbox: BoundingBox, placeholder: bool, confidence: f32) -> ScoredSymbol {
        ScoredSymbol {
            symbol: DetectedSymbol {
                kind: SymbolKind::QrCode,
                payload: "p".into(),
                polygon: if placeholder { vec![] } else { bbox.corners().to_vec() },
                bbox,
                placeholder,
            },
            confidence: ConfidenceScore::new(confidence),
        }
    }

    fn report(symbols: Vec<ScoredSymbol>, document: Option<OrderedQuad>) -> FrameReport {
        FrameReport {
            document,
            rectified_size: None,
            symbols,
            to_log: vec![],
            decode_error: None,
        }
    }

    #[test]
    fn empty_report_leaves_frame_untouched() {
        let frame = blank();
        let out = FrameAnnotator::new().annotate(&frame, &report(vec![], None));
        assert_eq!(out, frame);
    }

    #[test]
    fn symbol_box_is_outlined_in_green() {
        let bbox = BoundingBox::new(50, 40, 60, 30);
        let out = FrameAnnotator::new().annotate(&blank(), &report(vec![scored(bbox, false, 0.5)], None));
        assert_eq!(*out.get_pixel(50, 40), GREEN);
        assert_eq!(*out.get_pixel(80, 55), Rgb([255, 255, 255]));
    }

    #[test]
    fn placeholder_is_yellow() {
        let bbox = BoundingBox::new(20, 20, 100, 40);
        let out = FrameAnnotator::new().annotate(&blank(), &report(vec![scored(bbox, true, 0.0)], None));
        assert_eq!(*out.get_pixel(20, 20), YELLOW);
    }

    #[test]
    fn confidence_bar_is_proportional() {
        let bbox = BoundingBox::new(40, 40, 100, 20);
        let out = FrameAnnotator::new().annotate(&blank(), &report(vec![scored(bbox, false, 0.25)], None));
        let bar_y = bbox.bottom() + BAR_GAP + 1;
        assert_eq!(*out.get_pixel(45, bar_y), GREEN);
        assert_eq!(*out.get_pixel(100, bar_y), DARK);
    }

    #[test]
    fn document_marker_drawn() {
        let quad = OrderedQuad {
            top_left: Point::new(30.0, 30.0),
            top_right: Point::new(170.0, 30.0),
            bottom_right: Point::new(170.0, 120.0),
            bottom_left: Point::new(30.0, 120.0),
        };
        let out = FrameAnnotator::new().annotate(&blank(), &report(vec![], Some(quad)));
        assert_eq!(*out.get_pixel(100, 30), BLUE);
        assert_eq!(*out.get_pixel(MARKER_MARGIN as u32 + 1, MARKER_MARGIN as u32 + 1), GREEN);
    }
}
