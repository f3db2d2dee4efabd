// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame-counted log deduplication.
//
// Each (kind, payload) pair gets a time-to-live measured in frames when it is
// first logged. While the entry is alive the pair is suppressed. Per frame:
//
//   1. call `should_log` for every symbol seen in the frame,
//   2. call `tick` exactly once.
//
// Keys inserted during step 1 therefore survive the frame they appear in.

use std::collections::HashMap;

use tracing::trace;

use crate::types::SymbolKind;

/// Default cooldown window, in frames.
pub const DEFAULT_COOLDOWN_FRAMES: u32 = 120;

/// Build the dedup key for a symbol: kind tag and payload.
pub fn dedup_key(kind: &SymbolKind, payload: &str) -> String {
    format!("{}:{}", kind.tag(), payload)
}

/// Suppresses repeated log emission of the same key within a cooldown window.
///
/// Owned by the scanning session and passed into each frame's processing by
/// `&mut`; there is no process-wide instance.
#[derive(Debug, Clone)]
pub struct DeduplicationCache {
    cooldown: u32,
    entries: HashMap<String, u32>,
}

impl Default for DeduplicationCache {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_FRAMES)
    }
}

impl DeduplicationCache {
    /// Create an empty cache. A cooldown of zero is raised to one frame so a
    /// key is always suppressed for at least the rest of its own frame.
    pub fn new(cooldown: u32) -> Self {
        Self {
            cooldown: cooldown.max(1),
            entries: HashMap::new(),
        }
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Returns `true` if `key` should be logged now. A first sighting inserts
    /// the key with a full TTL; a repeat sighting leaves the TTL untouched.
    pub fn should_log(&mut self, key: &str) -> bool {
        if self.entries.contains_key(key) {
            trace!(key, "dedup: suppressed");
            return false;
        }
        self.entries.insert(key.to_owned(), self.cooldown);
        trace!(key, ttl = self.cooldown, "dedup: new key");
        true
    }

    /// Age every entry by one frame and evict the expired ones.
    pub fn tick(&mut self) {
        self.entries.retain(|_, ttl| {
            *ttl = ttl.saturating_sub(1);
            *ttl > 0
        });
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Frames left before `key` may be logged again.
    pub fn remaining(&self, key: &str) -> Option<u32> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
