// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Symbol decoding, frame-space back-mapping, and confidence scoring.

pub mod backmap;
pub mod confidence;
pub mod decode;
pub mod linear;
#[cfg(feature = "qr")]
pub mod qr;

pub use backmap::{CoordinateBackMapper, back_map};
pub use confidence::ConfidenceScorer;
pub use decode::{CompositeDecoder, DecodeError, DecodeOutcome, RawSymbol, SymbolDecoder};
pub use linear::LinearBarcodeDecoder;
#[cfg(feature = "qr")]
pub use qr::QrDecoder;
