// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-frame orchestration — detect, rectify, decode, back-map, score, dedup.

use image::RgbImage;
use serde::Serialize;
use symscan_core::time::now_log_timestamp;
use symscan_core::{
    BoundingBox, DeduplicationCache, LogRecord, OrderedQuad, ScanConfig, ScoredSymbol, dedup_key,
};
use tracing::{debug, info, instrument, warn};

use crate::scan::{PerspectiveRectifier, QuadDetector};
use crate::symbol::{
    CompositeDecoder, ConfidenceScorer, CoordinateBackMapper, LinearBarcodeDecoder, SymbolDecoder,
};

/// Everything one frame produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    /// The document outline when rectification succeeded.
    pub document: Option<OrderedQuad>,
    /// Size of the rectified image, if any.
    pub rectified_size: Option<(u32, u32)>,
    /// Every symbol found this frame, in frame coordinates, whether or not it
    /// is logged.
    pub symbols: Vec<ScoredSymbol>,
    /// Records that passed deduplication and should go to the log sink.
    pub to_log: Vec<LogRecord>,
    /// Set when the decoder failed outright.
    pub decode_error: Option<String>,
}

impl FrameReport {
    pub fn is_document_detected(&self) -> bool {
        self.document.is_some()
    }
}

/// The frame-processing pipeline.
///
/// Stateless across frames apart from the deduplication cache, which the
/// caller owns and passes in.
pub struct ScanPipeline {
    detector: QuadDetector,
    rectifier: PerspectiveRectifier,
    decoder: Box<dyn SymbolDecoder>,
    scorer: ConfidenceScorer,
    placeholder: BoundingBox,
}

impl Default for ScanPipeline {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

impl ScanPipeline {
    /// Build a pipeline with the default decoder set: QR (with the `qr`
    /// feature) plus EAN-13/UPC-A.
    pub fn from_config(config: &ScanConfig) -> Self {
        let decoder = CompositeDecoder::new();
        #[cfg(feature = "qr")]
        let decoder = decoder.with(crate::symbol::QrDecoder::new());
        let decoder = decoder.with(LinearBarcodeDecoder::new(config.linear_scanlines));

        Self {
            detector: QuadDetector::from_config(config),
            rectifier: PerspectiveRectifier::default(),
            decoder: Box::new(decoder),
            scorer: ConfidenceScorer::new(config.sharpness_normalizer),
            placeholder: config.placeholder_box,
        }
    }

    /// Replace the decoder.
    pub fn with_decoder(mut self, decoder: impl SymbolDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    pub fn decoder_name(&self) -> &str {
        self.decoder.name()
    }

    /// Process one frame, stamping log records with the current local time.
    pub fn process_frame(&self, frame: &RgbImage, cache: &mut DeduplicationCache) -> FrameReport {
        self.process_frame_at(frame, cache, &now_log_timestamp())
    }

    /// Process one frame with an explicit log timestamp.
    ///
    /// Never fails: a missing or degenerate document falls back to the raw
    /// frame, and a decoder failure yields no symbols. The cache is aged by
    /// one frame after this frame's symbols have been checked.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn process_frame_at(
        &self,
        frame: &RgbImage,
        cache: &mut DeduplicationCache,
        timestamp: &str,
    ) -> FrameReport {
        let mut report = FrameReport::default();

        let rectified = self.detector.detect(frame).and_then(|quad| {
            match self.rectifier.rectify(frame, &quad) {
                Ok(rectified) => Some(rectified),
                Err(err) => {
                    warn!(error = %err, "rectification failed; decoding raw frame");
                    None
                }
            }
        });
        if let Some(r) = &rectified {
            report.document = Some(*r.transform.source());
            report.rectified_size = Some(r.transform.size());
        }

        let (decode_image, transform) = match &rectified {
            Some(r) => (&r.image, Some(&r.transform)),
            None => (frame, None),
        };

        let raw_symbols = match self.decoder.decode(decode_image) {
            Ok(symbols) => symbols,
            Err(err) => {
                debug!(error = %err, "decode failed; treating as no symbols");
                report.decode_error = Some(err.to_string());
                Vec::new()
            }
        };

        let mapper =
            CoordinateBackMapper::new(transform, frame.width(), frame.height(), self.placeholder);
        for raw in raw_symbols {
            let Some(symbol) = mapper.locate(raw) else {
                continue;
            };
            let confidence = self.scorer.score_bbox(frame, &symbol.bbox);

            if cache.should_log(&dedup_key(&symbol.kind, &symbol.payload)) {
                info!(kind = %symbol.kind, payload = %symbol.payload, %confidence, "symbol logged");
                report.to_log.push(LogRecord {
                    timestamp: timestamp.to_owned(),
                    kind: symbol.kind.clone(),
                    payload: symbol.payload.clone(),
                });
            }
            report.symbols.push(ScoredSymbol { symbol, confidence });
        }

        cache.tick();
        debug!(
            document = report.document.is_some(),
            symbols = report.symbols.len(),
            logged = report.to_log.len(),
            "frame processed"
        );
        report
    }
}
