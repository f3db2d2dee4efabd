// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Linear barcode decoding — EAN-13 and UPC-A via horizontal scanlines.
//
// Each sampled row is thresholded at its mid-range, run-length encoded, and
// searched for the 59-run EAN-13 layout:
//
//   start guard (3) | 6 left digits (4 runs each) | middle guard (5)
//   | 6 right digits (4 runs each) | end guard (3)
//
// 95 modules in total. Left digits use L or G parity; the parity pattern
// encodes the leading (13th) digit. Right digits use R codes, whose run widths
// equal the L widths.

use image::{GrayImage, RgbImage};
use symscan_core::config::MAX_LINEAR_SCANLINES;
use symscan_core::{Point, SymbolKind};
use tracing::{debug, instrument, trace};

use super::decode::{DecodeOutcome, RawSymbol, SymbolDecoder};

const MODULES: f32 = 95.0;
const RUNS: usize = 59;
/// Average per-run deviation (fraction of the digit width) above which a digit
/// match is rejected.
const MAX_DIGIT_VARIANCE: f32 = 0.4;
/// Guard runs may deviate this much from one module.
const GUARD_TOLERANCE: f32 = 0.7;
/// Minimum quiet zone before the start guard, in modules.
const QUIET_ZONE_MODULES: f32 = 3.0;
/// Rows with less dynamic range than this are skipped.
const MIN_CONTRAST: u8 = 40;

/// Run widths for L-code digits, starting with a light run. R codes have the
/// same widths starting with a dark run; G codes are the reverse.
pub(crate) const L_WIDTHS: [[u8; 4]; 10] = [
    [3, 2, 1, 1],
    [2, 2, 2, 1],
    [2, 1, 2, 2],
    [1, 4, 1, 1],
    [1, 1, 3, 2],
    [1, 2, 3, 1],
    [1, 1, 1, 4],
    [1, 3, 1, 2],
    [1, 2, 1, 3],
    [3, 1, 1, 2],
];

/// Parity of left digits 1..=6 per leading digit, bit set means G.
pub(crate) const FIRST_DIGIT_PARITY: [u8; 10] = [
    0b000000, 0b001011, 0b001101, 0b001110, 0b010011, 0b011001, 0b011100, 0b010101, 0b010110,
    0b011010,
];

/// Decodes EAN-13 and UPC-A barcodes lying roughly horizontally.
#[derive(Debug, Clone)]
pub struct LinearBarcodeDecoder {
    scanlines: u32,
}

impl Default for LinearBarcodeDecoder {
    fn default() -> Self {
        Self::new(15)
    }
}

/// A successful decode on a single row.
#[derive(Debug, Clone, PartialEq)]
struct RowHit {
    digits: String,
    x_start: f32,
    x_end: f32,
}

impl LinearBarcodeDecoder {
    /// `scanlines` is clamped to `1..=MAX_LINEAR_SCANLINES`.
    pub fn new(scanlines: u32) -> Self {
        Self {
            scanlines: scanlines.clamp(1, MAX_LINEAR_SCANLINES),
        }
    }

    /// Decode every distinct barcode crossed by at least one scanline.
    pub fn decode_gray(&self, gray: &GrayImage) -> Vec<RawSymbol> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let spacing = height as f32 / (self.scanlines + 1) as f32;
        // payload -> (min_x, max_x, min_row, max_row)
        let mut found: Vec<(String, f32, f32, f32, f32)> = Vec::new();

        for line in 1..=self.scanlines {
            let y = ((line as f32 * spacing) as u32).min(height - 1);
            let row: Vec<u8> = (0..width).map(|x| gray.get_pixel(x, y).0[0]).collect();
            for hit in scan_row(&row) {
                let yf = y as f32;
                match found.iter_mut().find(|entry| entry.0 == hit.digits) {
                    Some(entry) => {
                        entry.1 = entry.1.min(hit.x_start);
                        entry.2 = entry.2.max(hit.x_end);
                        entry.3 = entry.3.min(yf);
                        entry.4 = entry.4.max(yf);
                    }
                    None => found.push((hit.digits, hit.x_start, hit.x_end, yf, yf)),
                }
            }
        }

        let half_gap = (spacing / 2.0).max(1.0);
        found
            .into_iter()
            .map(|(digits, x0, x1, y0, y1)| {
                let (y0, y1) = ((y0 - half_gap).max(0.0), (y1 + half_gap).min(height as f32));
                let polygon = vec![
                    Point::new(x0, y0),
                    Point::new(x1, y0),
                    Point::new(x1, y1),
                    Point::new(x0, y1),
                ];
                let (kind, payload) = classify(&digits);
                debug!(%kind, %payload, "linear barcode decoded");
                RawSymbol::new(kind, payload, polygon)
            })
            .collect()
    }
}

impl SymbolDecoder for LinearBarcodeDecoder {
    fn name(&self) -> &str {
        "ean13"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn decode(&self, image: &RgbImage) -> DecodeOutcome {
        let gray = image::imageops::grayscale(image);
        Ok(self.decode_gray(&gray))
    }
}

/// A leading zero means the code is a UPC-A; report its 12-digit form.
fn classify(digits: &str) -> (SymbolKind, String) {
    match digits.strip_prefix('0') {
        Some(upc) => (SymbolKind::UpcA, upc.to_owned()),
        None => (SymbolKind::Ean13, digits.to_owned()),
    }
}

/// Light/dark runs of a row as `(is_dark, start, width)`.
fn runs(row: &[u8]) -> Vec<(bool, usize, usize)> {
    let (Some(&min), Some(&max)) = (row.iter().min(), row.iter().max()) else {
        return Vec::new();
    };
    if max - min < MIN_CONTRAST {
        return Vec::new();
    }
    let threshold = (min as u16 + max as u16) / 2;

    let mut out: Vec<(bool, usize, usize)> = Vec::new();
    for (x, &v) in row.iter().enumerate() {
        let dark = (v as u16) < threshold;
        match out.last_mut() {
            Some(last) if last.0 == dark => last.2 += 1,
            _ => out.push((dark, x, 1)),
        }
    }
    out
}

/// Every EAN-13 found along one row.
fn scan_row(row: &[u8]) -> Vec<RowHit> {
    let runs = runs(row);
    let mut hits = Vec::new();
    if runs.len() < RUNS {
        return hits;
    }

    let mut i = 0;
    while i + RUNS <= runs.len() {
        if !runs[i].0 {
            i += 1;
            continue;
        }
        let window: Vec<f32> = runs[i..i + RUNS].iter().map(|r| r.2 as f32).collect();
        let quiet = if i == 0 { None } else { Some(runs[i - 1].2 as f32) };
        if let Some(digits) = decode_window(&window, quiet) {
            let start = runs[i].1 as f32;
            let last = runs[i + RUNS - 1];
            trace!(%digits, start, "ean13 candidate");
            hits.push(RowHit {
                digits,
                x_start: start,
                x_end: (last.1 + last.2) as f32,
            });
            i += RUNS;
        } else {
            i += 1;
        }
    }
    hits
}

/// Decode 59 run widths starting at a dark run. `quiet` is the width of the
/// light run before the start guard, if any.
fn decode_window(widths: &[f32], quiet: Option<f32>) -> Option<String> {
    let total: f32 = widths.iter().sum();
    let module = total / MODULES;
    if module < 1.0 {
        return None;
    }
    if let Some(quiet) = quiet {
        if quiet < QUIET_ZONE_MODULES * module {
            return None;
        }
    }

    let guard_ok = |range: std::ops::Range<usize>| {
        widths[range]
            .iter()
            .all(|w| (w - module).abs() <= GUARD_TOLERANCE * module)
    };
    if !guard_ok(0..3) || !guard_ok(27..32) || !guard_ok(56..59) {
        return None;
    }

    let mut digits = [0u8; 13];
    let mut parity = 0u8;
    for d in 0..6 {
        let start = 3 + d * 4;
        let (digit, is_g) = match_digit(&widths[start..start + 4], true)?;
        digits[d + 1] = digit;
        if is_g {
            parity |= 1 << (5 - d);
        }
    }
    for d in 0..6 {
        let start = 32 + d * 4;
        let (digit, _) = match_digit(&widths[start..start + 4], false)?;
        digits[d + 7] = digit;
    }

    digits[0] = FIRST_DIGIT_PARITY.iter().position(|&p| p == parity)? as u8;
    if !checksum_ok(&digits) {
        return None;
    }
    Some(digits.iter().map(|d| char::from(b'0' + d)).collect())
}

/// Best-matching digit for four run widths, plus whether it matched a G code.
fn match_digit(widths: &[f32], allow_g: bool) -> Option<(u8, bool)> {
    let total: f32 = widths.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let unit = total / 7.0;

    let variance = |pattern: [u8; 4]| -> f32 {
        widths
            .iter()
            .zip(pattern.iter())
            .map(|(w, p)| (w - *p as f32 * unit).abs())
            .sum::<f32>()
            / total
    };

    let mut best: Option<(f32, u8, bool)> = None;
    for (digit, l) in L_WIDTHS.iter().enumerate() {
        let mut candidates = vec![(*l, false)];
        if allow_g {
            let mut g = *l;
            g.reverse();
            candidates.push((g, true));
        }
        for (pattern, is_g) in candidates {
            let v = variance(pattern);
            if best.is_none_or(|(b, _, _)| v < b) {
                best = Some((v, digit as u8, is_g));
            }
        }
    }

    let (v, digit, is_g) = best?;
    (v < MAX_DIGIT_VARIANCE).then_some((digit, is_g))
}

/// EAN-13 modulo-10 check: weights 1,3,1,3,... over the first twelve digits.
pub(crate) fn checksum_ok(digits: &[u8; 13]) -> bool {
    let sum: u32 = digits[..12]
        .iter()
        .enumerate()
        .map(|(i, &d)| d as u32 * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    (10 - sum % 10) % 10 == digits[12] as u32
}
