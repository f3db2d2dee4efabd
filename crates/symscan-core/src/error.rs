// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Symscan.

use thiserror::Error;

/// Top-level error type for all Symscan operations.
///
/// None of these are fatal to a running scan session: the pipeline recovers
/// geometry and decoder failures locally and the session drops sink failures.
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Geometry --
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    // -- Imaging --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Sinks / persistence --
    #[error("sink unavailable: {0}")]
    Sink(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;
