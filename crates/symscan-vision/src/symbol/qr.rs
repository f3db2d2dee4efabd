// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QR matrix-code decoding via `rqrr`.
//
// This module is only available when the `qr` feature is enabled (on by
// default).

use std::panic::{AssertUnwindSafe, catch_unwind};

use image::RgbImage;
use symscan_core::{Point, SymbolKind};
use tracing::{debug, instrument, trace};

use super::decode::{DecodeError, DecodeOutcome, RawSymbol, SymbolDecoder};

/// Decodes QR codes anywhere in an image.
///
/// The reported polygon is the four grid corners as located by `rqrr`. Grids
/// that are found but fail to decode (damaged, partially occluded) are
/// skipped.
#[derive(Debug, Clone, Default)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl SymbolDecoder for QrDecoder {
    fn name(&self) -> &str {
        "qr"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn decode(&self, image: &RgbImage) -> DecodeOutcome {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }
        let gray = image::imageops::grayscale(image);

        // rqrr indexes with unchecked assumptions on some malformed grids;
        // surface a panic as an ordinary decode failure.
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut prepared =
                rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                    gray.get_pixel(x as u32, y as u32).0[0]
                });
            let grids = prepared.detect_grids();
            trace!(grids = grids.len(), "qr grids located");

            let mut symbols = Vec::with_capacity(grids.len());
            for grid in grids {
                match grid.decode() {
                    Ok((_meta, content)) => {
                        let polygon = grid
                            .bounds
                            .iter()
                            .map(|p| Point::new(p.x as f32, p.y as f32))
                            .collect();
                        symbols.push(RawSymbol::new(SymbolKind::QrCode, content, polygon));
                    }
                    Err(err) => debug!(error = %err, "qr grid failed to decode"),
                }
            }
            symbols
        }));

        result.map_err(|_| DecodeError::Backend {
            decoder: self.name().to_owned(),
            reason: "decoder panicked".into(),
        })
    }
}
