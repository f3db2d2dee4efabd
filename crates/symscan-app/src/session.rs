// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The scan loop — pulls frames from a source, runs the pipeline, and fans the
// results out to the log, snapshot and overlay sinks.
//
// The loop is single-threaded: each frame is fully processed before the next
// one is requested. The deduplication cache lives here for the lifetime of
// the session. Sink failures never stop the loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use symscan_core::DeduplicationCache;
use symscan_vision::{FrameAnnotator, FrameReport, ScanPipeline};
use tracing::{debug, info, instrument};

use crate::services::capture::FrameSource;
use crate::services::log_sink::LogSink;
use crate::services::snapshot::SnapshotSink;

/// Running totals for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub frames: u64,
    pub documents: u64,
    pub symbols: u64,
    pub logged: u64,
    pub snapshots: u64,
    pub sink_failures: u64,
}

struct SnapshotPolicy {
    sink: Box<dyn SnapshotSink>,
    every: u64,
}

pub struct ScanSession {
    pipeline: ScanPipeline,
    cache: DeduplicationCache,
    source: Box<dyn FrameSource>,
    log_sink: Box<dyn LogSink>,
    snapshots: Option<SnapshotPolicy>,
    annotator: FrameAnnotator,
    annotated_out: Option<PathBuf>,
    max_frames: Option<u64>,
    stop: Arc<AtomicBool>,
    stats: SessionStats,
}

impl ScanSession {
    pub fn new(
        pipeline: ScanPipeline,
        cooldown_frames: u32,
        source: Box<dyn FrameSource>,
        log_sink: Box<dyn LogSink>,
    ) -> Self {
        Self {
            pipeline,
            cache: DeduplicationCache::new(cooldown_frames),
            source,
            log_sink,
            snapshots: None,
            annotator: FrameAnnotator::new(),
            annotated_out: None,
            max_frames: None,
            stop: Arc::new(AtomicBool::new(false)),
            stats: SessionStats::default(),
        }
    }

    /// Save the raw frame every `every` frames, starting with the first.
    /// Zero disables snapshots.
    pub fn with_snapshots(mut self, sink: Box<dyn SnapshotSink>, every: u64) -> Self {
        self.snapshots = (every > 0).then_some(SnapshotPolicy { sink, every });
        self
    }

    /// Write an annotated copy of every frame into `dir`.
    pub fn with_annotated_output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.annotated_out = Some(dir.into());
        self
    }

    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    /// Raising the returned flag ends the session after the current frame.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Run until the source is exhausted, the frame limit is reached, or the
    /// stop flag is raised.
    #[instrument(skip_all)]
    pub fn run(&mut self) -> SessionStats {
        info!(decoder = self.pipeline.decoder_name(), "scan session started");
        while self.step().is_some() {}
        info!(
            frames = self.stats.frames,
            logged = self.stats.logged,
            snapshots = self.stats.snapshots,
            "scan session finished"
        );
        self.stats
    }

    /// Process a single frame. `None` when the session should end.
    pub fn step(&mut self) -> Option<FrameReport> {
        if self.stop.load(Ordering::SeqCst) {
            debug!("stop requested");
            return None;
        }
        if self.max_frames.is_some_and(|max| self.stats.frames >= max) {
            debug!("frame limit reached");
            return None;
        }
        let frame = self.source.next_frame()?;
        let index = self.stats.frames;

        let report = self.pipeline.process_frame(&frame, &mut self.cache);

        self.stats.frames += 1;
        self.stats.documents += u64::from(report.is_document_detected());
        self.stats.symbols += report.symbols.len() as u64;

        for record in &report.to_log {
            match self.log_sink.append(record) {
                Ok(()) => self.stats.logged += 1,
                Err(e) => {
                    debug!(error = %e, "log sink write dropped");
                    self.stats.sink_failures += 1;
                }
            }
        }

        if let Some(policy) = &mut self.snapshots {
            if index % policy.every == 0 {
                match policy.sink.save(&frame) {
                    Ok(_) => self.stats.snapshots += 1,
                    Err(e) => {
                        debug!(error = %e, "snapshot dropped");
                        self.stats.sink_failures += 1;
                    }
                }
            }
        }

        if let Some(dir) = &self.annotated_out {
            let path = dir.join(format!("annotated_{index:06}.png"));
            if let Err(e) = self.annotator.annotate(&frame, &report).save(&path) {
                debug!(path = %path.display(), error = %e, "annotated frame dropped");
                self.stats.sink_failures += 1;
            }
        }

        Some(report)
    }
}
