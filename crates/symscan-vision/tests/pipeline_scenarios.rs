// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end frame scenarios: real detection and rectification with scripted
// or real decoders.

use std::sync::{Arc, Mutex};

use image::{Rgb, RgbImage};
use symscan_core::{DeduplicationCache, Point, SymbolKind};
use symscan_vision::{DecodeError, DecodeOutcome, RawSymbol, ScanPipeline, SymbolDecoder};

const DARK: Rgb<u8> = Rgb([30, 30, 30]);
const PAPER: Rgb<u8> = Rgb([235, 235, 235]);

/// Returns fixed symbols and records the size of every image it is given.
#[derive(Clone)]
struct ScriptedDecoder {
    symbols: Vec<RawSymbol>,
    seen: Arc<Mutex<Vec<(u32, u32)>>>,
}

impl ScriptedDecoder {
    fn new(symbols: Vec<RawSymbol>) -> Self {
        Self {
            symbols,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn seen(&self) -> Vec<(u32, u32)> {
        self.seen.lock().unwrap().clone()
    }
}

impl SymbolDecoder for ScriptedDecoder {
    fn name(&self) -> &str {
        "scripted"
    }

    fn decode(&self, image: &RgbImage) -> DecodeOutcome {
        self.seen.lock().unwrap().push(image.dimensions());
        Ok(self.symbols.clone())
    }
}

struct AlwaysFails;

impl SymbolDecoder for AlwaysFails {
    fn name(&self) -> &str {
        "always-fails"
    }

    fn decode(&self, _image: &RgbImage) -> DecodeOutcome {
        Err(DecodeError::Backend {
            decoder: "always-fails".into(),
            reason: "no backend".into(),
        })
    }
}

/// 640x480 dark frame with a light 300x300 document at (170, 90).
fn square_document_frame() -> RgbImage {
    RgbImage::from_fn(640, 480, |x, y| {
        if (170..470).contains(&x) && (90..390).contains(&y) {
            PAPER
        } else {
            DARK
        }
    })
}

fn square_at(x0: f32, y0: f32, side: f32) -> Vec<Point> {
    vec![
        Point::new(x0, y0),
        Point::new(x0 + side, y0),
        Point::new(x0 + side, y0 + side),
        Point::new(x0, y0 + side),
    ]
}

#[test]
fn document_is_rectified_and_symbols_mapped_back() {
    let decoder = ScriptedDecoder::new(vec![RawSymbol::new(
        SymbolKind::QrCode,
        "https://example.org/item/7",
        square_at(100.0, 100.0, 50.0),
    )]);
    let pipeline = ScanPipeline::default().with_decoder(decoder.clone());
    let mut cache = DeduplicationCache::new(120);
    let frame = square_document_frame();

    let report = pipeline.process_frame_at(&frame, &mut cache, "2024-03-07 09:05:02");

    let document = report.document.expect("document should be detected");
    assert!((document.top_left.x - 170.0).abs() < 6.0, "{document:?}");
    assert!((document.top_left.y - 90.0).abs() < 6.0, "{document:?}");

    // The decoder saw the rectified document, not the frame.
    let seen = decoder.seen();
    assert_eq!(seen.len(), 1);
    let (w, h) = seen[0];
    assert!((w as i32 - 300).abs() <= 8 && (h as i32 - 300).abs() <= 8, "{w}x{h}");
    assert_eq!(report.rectified_size, Some((w, h)));

    // Rectified (100..150) lands at roughly frame (270..320, 190..240).
    let symbol = &report.symbols[0].symbol;
    assert!(!symbol.placeholder);
    for p in &symbol.polygon {
        assert!((170.0..470.0).contains(&p.x) && (90.0..390.0).contains(&p.y), "{p:?}");
    }
    assert!((symbol.bbox.x as i32 - 270).abs() <= 6, "{:?}", symbol.bbox);
    assert!((symbol.bbox.y as i32 - 190).abs() <= 6, "{:?}", symbol.bbox);

    assert_eq!(report.to_log.len(), 1);
    assert_eq!(
        report.to_log[0].to_string(),
        "2024-03-07 09:05:02 [QRCODE] https://example.org/item/7"
    );
}

#[test]
fn steady_symbol_logged_once_across_frames() {
    let decoder = ScriptedDecoder::new(vec![RawSymbol::new(
        SymbolKind::Ean13,
        "4006381333931",
        square_at(20.0, 20.0, 40.0),
    )]);
    let pipeline = ScanPipeline::default().with_decoder(decoder);
    let mut cache = DeduplicationCache::new(120);
    let frame = square_document_frame();

    let logged: usize = (0..10)
        .map(|_| pipeline.process_frame_at(&frame, &mut cache, "t").to_log.len())
        .sum();
    assert_eq!(logged, 1);
}

#[test]
fn two_payloads_in_one_frame_are_both_logged() {
    let decoder = ScriptedDecoder::new(vec![
        RawSymbol::new(SymbolKind::QrCode, "first", square_at(20.0, 20.0, 40.0)),
        RawSymbol::new(SymbolKind::QrCode, "second", square_at(120.0, 120.0, 40.0)),
    ]);
    let pipeline = ScanPipeline::default().with_decoder(decoder);
    let mut cache = DeduplicationCache::new(120);

    let report = pipeline.process_frame_at(&square_document_frame(), &mut cache, "t");
    let payloads: Vec<_> = report.to_log.iter().map(|r| r.payload.as_str()).collect();
    assert_eq!(payloads, vec!["first", "second"]);
}

#[test]
fn without_document_the_raw_frame_is_decoded() {
    let decoder = ScriptedDecoder::new(vec![]);
    let pipeline = ScanPipeline::default().with_decoder(decoder.clone());
    let mut cache = DeduplicationCache::default();
    let frame = RgbImage::from_pixel(640, 480, Rgb([128, 128, 128]));

    let report = pipeline.process_frame_at(&frame, &mut cache, "t");
    assert!(report.document.is_none());
    assert_eq!(decoder.seen(), vec![(640, 480)]);
}

#[test]
fn decoder_failure_is_not_fatal() {
    let pipeline = ScanPipeline::default().with_decoder(AlwaysFails);
    let mut cache = DeduplicationCache::default();

    let report = pipeline.process_frame_at(&square_document_frame(), &mut cache, "t");
    assert!(report.is_document_detected());
    assert!(report.symbols.is_empty());
    assert!(report.to_log.is_empty());
    assert!(report.decode_error.unwrap().contains("no backend"));
}

// ---------------------------------------------------------------------------
// Real barcode on a document
// ---------------------------------------------------------------------------

const L_WIDTHS: [[u8; 4]; 10] = [
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

/// Bit set means the left-half digit at that position uses G parity.
const FIRST_DIGIT_PARITY: [u8; 10] = [
    0b000000, 0b001011, 0b001101, 0b001110, 0b010011, 0b011001, 0b011100, 0b010101, 0b010110,
    0b011010,
];

fn ean13_bits(code: &str) -> Vec<bool> {
    let digits: Vec<usize> = code.bytes().map(|b| (b - b'0') as usize).collect();
    let mut bits = vec![true, false, true];
    let push = |bits: &mut Vec<bool>, widths: [u8; 4], first_dark: bool| {
        let mut dark = first_dark;
        for w in widths {
            bits.extend(std::iter::repeat_n(dark, w as usize));
            dark = !dark;
        }
    };
    let parity = FIRST_DIGIT_PARITY[digits[0]];
    for d in 0..6 {
        let mut widths = L_WIDTHS[digits[d + 1]];
        if parity & (1 << (5 - d)) != 0 {
            widths.reverse();
        }
        push(&mut bits, widths, false);
    }
    bits.extend([false, true, false, true, false]);
    for d in 0..6 {
        push(&mut bits, L_WIDTHS[digits[d + 7]], true);
    }
    bits.extend([true, false, true]);
    bits
}

#[test]
fn barcode_on_document_is_decoded_and_located() {
    let bits = ean13_bits("4006381333931");
    let module = 4u32;
    let bar_x0 = 130u32;
    let bar_x1 = bar_x0 + bits.len() as u32 * module;

    let frame = RgbImage::from_fn(640, 480, |x, y| {
        if !((80..560).contains(&x) && (60..420).contains(&y)) {
            return DARK;
        }
        if (150..250).contains(&y) && (bar_x0..bar_x1).contains(&x) {
            let idx = ((x - bar_x0) / module) as usize;
            if bits[idx] {
                return Rgb([15, 15, 15]);
            }
        }
        PAPER
    });

    let pipeline = ScanPipeline::default();
    let mut cache = DeduplicationCache::new(120);
    let report = pipeline.process_frame_at(&frame, &mut cache, "t");

    assert!(report.document.is_some());
    let found = report
        .symbols
        .iter()
        .find(|s| s.symbol.payload == "4006381333931")
        .expect("barcode should decode from the rectified document");
    assert_eq!(found.symbol.kind, SymbolKind::Ean13);

    let bbox = found.symbol.bbox;
    assert!((bbox.x as i32 - bar_x0 as i32).abs() <= 8, "{bbox:?}");
    assert!((bbox.right() as i32 - bar_x1 as i32).abs() <= 8, "{bbox:?}");
    assert!(bbox.y >= 125 && bbox.bottom() <= 275, "{bbox:?}");
    assert!(found.confidence.value() > 0.0);
}

// ---------------------------------------------------------------------------
// Real QR code on a perspective-skewed document
// ---------------------------------------------------------------------------

#[cfg(feature = "qr")]
mod skewed_document {
    use super::*;
    use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

    /// Where the 400x300 document lands in the frame, in TL/TR/BR/BL order.
    const SKEWED_QUAD: [(f32, f32); 4] = [(150.0, 60.0), (520.0, 95.0), (560.0, 420.0), (100.0, 395.0)];

    /// White 400x300 page with `payload` as a QR code in the middle.
    fn page_with_qr(payload: &str) -> RgbImage {
        let code = qrcode::QrCode::new(payload.as_bytes()).unwrap();
        let width = code.width() as u32;
        let colors = code.to_colors();
        let module = 5u32;
        let side = width * module;
        let (x0, y0) = ((400 - side) / 2, (300 - side) / 2);

        RgbImage::from_fn(400, 300, |x, y| {
            if (x0..x0 + side).contains(&x) && (y0..y0 + side).contains(&y) {
                let (mx, my) = ((x - x0) / module, (y - y0) / module);
                if colors[(my * width + mx) as usize] == qrcode::Color::Dark {
                    return Rgb([0, 0, 0]);
                }
            }
            Rgb([250, 250, 250])
        })
    }

    /// Project the page onto a dark 640x480 frame so its corners land on
    /// `SKEWED_QUAD`.
    fn skewed_frame(page: &RgbImage) -> RgbImage {
        let (w, h) = ((page.width() - 1) as f32, (page.height() - 1) as f32);
        let page_corners = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
        let projection = Projection::from_control_points(page_corners, SKEWED_QUAD).unwrap();

        let mut frame = RgbImage::new(640, 480);
        warp_into(page, &projection, Interpolation::Bilinear, DARK, &mut frame);
        frame
    }

    /// Whether `p` lies inside the convex quad (corners in winding order).
    fn inside_convex(p: &Point, quad: &[(f32, f32); 4]) -> bool {
        (0..4).all(|i| {
            let (ax, ay) = quad[i];
            let (bx, by) = quad[(i + 1) % 4];
            (bx - ax) * (p.y - ay) - (by - ay) * (p.x - ax) >= 0.0
        })
    }

    #[test]
    fn skewed_document_qr_is_decoded_mapped_back_and_logged_once() {
        let payload = "https://example.org/skewed/42";
        let frame = skewed_frame(&page_with_qr(payload));
        let pipeline = ScanPipeline::default();
        let mut cache = DeduplicationCache::new(120);

        let first = pipeline.process_frame_at(&frame, &mut cache, "t");
        let document = first.document.expect("skewed document should be detected");
        assert!((document.top_left.x - 150.0).abs() < 8.0, "{document:?}");
        assert!((document.bottom_right.y - 420.0).abs() < 8.0, "{document:?}");

        let qr = first
            .symbols
            .iter()
            .find(|s| s.symbol.payload == payload)
            .expect("QR should decode from the rectified document");
        assert_eq!(qr.symbol.kind, SymbolKind::QrCode);
        assert!(!qr.symbol.placeholder);
        assert_eq!(qr.symbol.polygon.len(), 4);
        for p in &qr.symbol.polygon {
            assert!(inside_convex(p, &SKEWED_QUAD), "{p:?} outside the document");
        }

        let mut logged = first.to_log.iter().filter(|r| r.payload == payload).count();
        for _ in 1..10 {
            let report = pipeline.process_frame_at(&frame, &mut cache, "t");
            logged += report.to_log.iter().filter(|r| r.payload == payload).count();
        }
        assert_eq!(logged, 1);
    }
}
