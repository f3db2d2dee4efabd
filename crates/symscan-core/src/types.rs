// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Symscan scanning pipeline.

use serde::{Deserialize, Serialize};

/// A planar point in pixel coordinates (x right, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn as_tuple(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Candidate document boundary: exactly four points, in no particular order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub points: [Point; 4],
}

impl Quad {
    pub const fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Build a quad from a slice; anything other than four points is not a quad.
    pub fn from_slice(points: &[Point]) -> Option<Self> {
        let points: [Point; 4] = points.try_into().ok()?;
        Some(Self { points })
    }

    /// Enclosed area via the shoelace formula, assuming the points are stored
    /// in boundary order (CW or CCW).
    pub fn area(&self) -> f32 {
        polygon_area(&self.points)
    }
}

/// The four quad corners labelled canonically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderedQuad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl OrderedQuad {
    /// Corners in TL, TR, BR, BL order.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn top_edge(&self) -> f32 {
        self.top_left.distance(&self.top_right)
    }

    pub fn bottom_edge(&self) -> f32 {
        self.bottom_left.distance(&self.bottom_right)
    }

    pub fn left_edge(&self) -> f32 {
        self.top_left.distance(&self.bottom_left)
    }

    pub fn right_edge(&self) -> f32 {
        self.top_right.distance(&self.bottom_right)
    }
}

/// Shoelace area of a closed polygon. Returns 0 for fewer than three points.
pub fn polygon_area(points: &[Point]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0f32;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area.abs() / 2.0
}

/// Axis-aligned integer rectangle in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest box covering `points`, clipped to a `frame_w` x `frame_h`
    /// frame. Returns `None` when there are no points or the clipped box has
    /// zero area.
    pub fn enclosing(points: &[Point], frame_w: u32, frame_h: u32) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return None;
        }
        clip_span(
            min_x.floor() as i64,
            min_y.floor() as i64,
            max_x.ceil() as i64,
            max_y.ceil() as i64,
            frame_w,
            frame_h,
        )
    }

    /// Intersect with a `frame_w` x `frame_h` frame. `None` if nothing is left.
    pub fn clip(&self, frame_w: u32, frame_h: u32) -> Option<Self> {
        clip_span(
            self.x as i64,
            self.y as i64,
            self.x as i64 + self.width as i64,
            self.y as i64 + self.height as i64,
            frame_w,
            frame_h,
        )
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Corners in TL, TR, BR, BL order.
    pub fn corners(&self) -> [Point; 4] {
        let (x0, y0) = (self.x as f32, self.y as f32);
        let (x1, y1) = (self.right() as f32, self.bottom() as f32);
        [
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }
}

fn clip_span(x0: i64, y0: i64, x1: i64, y1: i64, frame_w: u32, frame_h: u32) -> Option<BoundingBox> {
    let x0 = x0.clamp(0, frame_w as i64);
    let y0 = y0.clamp(0, frame_h as i64);
    let x1 = x1.clamp(0, frame_w as i64);
    let y1 = y1.clamp(0, frame_h as i64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(BoundingBox::new(
        x0 as u32,
        y0 as u32,
        (x1 - x0) as u32,
        (y1 - y0) as u32,
    ))
}

/// Symbol family reported by a decoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// 2D matrix code (QR).
    QrCode,
    /// EAN-13 linear barcode.
    Ean13,
    /// UPC-A linear barcode (EAN-13 with a leading zero).
    UpcA,
    /// Any other family, tagged by the decoder that produced it.
    Other(String),
}

impl SymbolKind {
    /// Stable tag used in dedup keys and log lines.
    pub fn tag(&self) -> &str {
        match self {
            Self::QrCode => "QRCODE",
            Self::Ean13 => "EAN13",
            Self::UpcA => "UPCA",
            Self::Other(tag) => tag,
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A decoded symbol located in original-frame space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedSymbol {
    pub kind: SymbolKind,
    pub payload: String,
    /// Outline in original frame coordinates. Empty when the decoder gave no
    /// usable geometry.
    pub polygon: Vec<Point>,
    /// Axis-aligned box, already clipped to the frame.
    pub bbox: BoundingBox,
    /// Set when `bbox` is the fixed placeholder rather than derived geometry.
    pub placeholder: bool,
}

/// Sharpness-based legibility score in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct ConfidenceScore(f32);

impl ConfidenceScore {
    pub const ZERO: Self = Self(0.0);

    /// Clamp `value` into `[0, 1]`; NaN maps to 0.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl std::fmt::Display for ConfidenceScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// A symbol plus its confidence, as handed to the overlay collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSymbol {
    pub symbol: DetectedSymbol,
    pub confidence: ConfidenceScore,
}

/// One line for the append-only log sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// `YYYY-MM-DD HH:MM:SS`, local time.
    pub timestamp: String,
    pub kind: SymbolKind,
    pub payload: String,
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.timestamp, self.kind, self.payload)
    }
}
