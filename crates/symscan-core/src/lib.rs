// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Symscan — Core types, error definitions, configuration, and the log
// deduplication cache shared across all crates.

pub mod config;
pub mod dedup;
pub mod error;
pub mod time;
pub mod types;

pub use config::ScanConfig;
pub use dedup::{DeduplicationCache, dedup_key};
pub use error::ScanError;
pub use types::*;
