// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Symbol decoding boundary — the decoder trait, its explicit outcome type, and
// a composite that merges several symbol families into one uniform list.

use image::RgbImage;
use symscan_core::{Point, SymbolKind};
use thiserror::Error;
use tracing::{debug, trace};

/// A symbol as reported by a decoder, in the decoded image's coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSymbol {
    pub kind: SymbolKind,
    pub payload: String,
    /// Outline in image space; fewer than three points means no usable
    /// geometry.
    pub polygon: Vec<Point>,
}

impl RawSymbol {
    pub fn new(kind: SymbolKind, payload: impl Into<String>, polygon: Vec<Point>) -> Self {
        Self {
            kind,
            payload: payload.into(),
            polygon,
        }
    }
}

/// Why a decoder produced nothing for an image.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{decoder} failed: {reason}")]
    Backend { decoder: String, reason: String },

    #[error("unsupported image: {0}")]
    UnsupportedImage(String),
}

/// Success with zero or more symbols, or failure with a reason.
pub type DecodeOutcome = Result<Vec<RawSymbol>, DecodeError>;

/// Turns pixels into symbols. Implementations must not panic on arbitrary
/// input; internal faults are reported as [`DecodeError`].
pub trait SymbolDecoder {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Decode every symbol this decoder recognises in `image`. No ordering is
    /// guaranteed.
    fn decode(&self, image: &RgbImage) -> DecodeOutcome;
}

impl<D: SymbolDecoder + ?Sized> SymbolDecoder for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn decode(&self, image: &RgbImage) -> DecodeOutcome {
        (**self).decode(image)
    }
}

/// Runs several decoders over the same image and merges their results.
///
/// A failing decoder contributes nothing; the composite only fails when every
/// decoder failed.
#[derive(Default)]
pub struct CompositeDecoder {
    decoders: Vec<Box<dyn SymbolDecoder>>,
}

impl CompositeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a decoder (builder style).
    pub fn with(mut self, decoder: impl SymbolDecoder + 'static) -> Self {
        self.decoders.push(Box::new(decoder));
        self
    }

    pub fn push(&mut self, decoder: Box<dyn SymbolDecoder>) {
        self.decoders.push(decoder);
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl SymbolDecoder for CompositeDecoder {
    fn name(&self) -> &str {
        "composite"
    }

    fn decode(&self, image: &RgbImage) -> DecodeOutcome {
        let mut merged = Vec::new();
        let mut failures = Vec::new();

        for decoder in &self.decoders {
            match decoder.decode(image) {
                Ok(mut symbols) => {
                    trace!(decoder = decoder.name(), count = symbols.len(), "decoder finished");
                    merged.append(&mut symbols);
                }
                Err(err) => {
                    debug!(decoder = decoder.name(), error = %err, "decoder failed; skipping");
                    failures.push(err);
                }
            }
        }

        if !self.decoders.is_empty() && failures.len() == self.decoders.len() {
            let reason = failures
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(DecodeError::Backend {
                decoder: self.name().to_owned(),
                reason,
            });
        }
        Ok(merged)
    }
}
