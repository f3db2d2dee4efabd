// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the symscan-vision frame pipeline. Covers quad
// detection alone and a full frame pass on a synthetic 640x480 document.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgb, RgbImage};

use symscan_core::DeduplicationCache;
use symscan_vision::{QuadDetector, ScanPipeline};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Dark background with a light document from (120, 80) to (520, 400) and a
/// few dark stripes printed on it.
fn document_frame() -> RgbImage {
    RgbImage::from_fn(640, 480, |x, y| {
        let on_doc = (120..520).contains(&x) && (80..400).contains(&y);
        if !on_doc {
            Rgb([30, 30, 30])
        } else if (200..300).contains(&y) && (x / 6) % 2 == 0 && (180..460).contains(&x) {
            Rgb([10, 10, 10])
        } else {
            Rgb([235, 235, 235])
        }
    })
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_quad_detection(c: &mut Criterion) {
    let frame = document_frame();
    let detector = QuadDetector::default();

    c.bench_function("quad_detection (640x480)", |b| {
        b.iter(|| black_box(detector.detect(black_box(&frame))));
    });
}

/// Full pass: detection, rectification, both decoders, scoring and dedup.
fn bench_process_frame(c: &mut Criterion) {
    let frame = document_frame();
    let pipeline = ScanPipeline::default();
    let mut cache = DeduplicationCache::default();

    c.bench_function("process_frame (640x480)", |b| {
        b.iter(|| black_box(pipeline.process_frame_at(black_box(&frame), &mut cache, "bench")));
    });
}

criterion_group!(benches, bench_quad_detection, bench_process_frame);
criterion_main!(benches);
