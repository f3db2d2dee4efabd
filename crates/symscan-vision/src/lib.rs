// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// symscan-vision — Frame processing for Symscan.
//
// Provides document quad detection and perspective rectification, QR and
// EAN-13/UPC-A decoding, frame-space back-mapping with sharpness confidence,
// per-frame orchestration with log deduplication, and overlay rendering.

pub mod annotate;
pub mod pipeline;
pub mod scan;
pub mod symbol;

// Re-export the primary structs so callers can use `symscan_vision::ScanPipeline` etc.
pub use annotate::FrameAnnotator;
pub use pipeline::{FrameReport, ScanPipeline};
pub use scan::{PerspectiveRectifier, QuadDetector, RectificationTransform};
pub use symbol::{CompositeDecoder, DecodeError, DecodeOutcome, LinearBarcodeDecoder, RawSymbol, SymbolDecoder};

#[cfg(feature = "qr")]
pub use symbol::QrDecoder;
