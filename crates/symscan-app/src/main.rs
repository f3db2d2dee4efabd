// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Symscan — perspective-corrected multi-symbol scanner
//
// Entry point. Initialises logging, merges the config file with command-line
// overrides, and runs a scan session over a directory of frames.

mod services;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::Parser;
use symscan_core::ScanConfig;
use symscan_core::error::Result;
use symscan_vision::ScanPipeline;

use services::capture::DirectorySource;
use services::log_sink::FileLogSink;
use services::snapshot::FileSnapshotSink;
use session::ScanSession;

#[derive(Debug, Parser)]
#[command(name = "symscan")]
#[command(about = "Find documents in camera frames, flatten them, and log the QR codes and barcodes on them")]
#[command(version)]
struct Cli {
    /// JSON configuration file. Command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of frame images, processed in file-name order.
    #[arg(long)]
    frames: PathBuf,

    /// Restart from the first frame when the directory is exhausted.
    #[arg(long = "loop")]
    looping: bool,

    /// Frames a logged payload stays suppressed.
    #[arg(long)]
    cooldown: Option<u32>,

    /// Payload log file (appended to).
    #[arg(long)]
    log: Option<PathBuf>,

    /// Directory for raw-frame snapshots.
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Save a snapshot every N frames (0 disables).
    #[arg(long, default_value = "0")]
    snapshot_every: u64,

    /// Write annotated frames into this directory.
    #[arg(long)]
    annotated_out: Option<PathBuf>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,

    /// Stop after this many seconds of wall-clock time.
    #[arg(long)]
    duration: Option<u64>,

    /// Print the session totals as JSON on exit.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("Symscan starting");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "symscan failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    let source = DirectorySource::open(&cli.frames, cli.looping)?;
    if source.is_empty() {
        tracing::warn!(dir = %cli.frames.display(), "no frame images found");
    }
    let log_sink = FileLogSink::new(&config.log_path);
    tracing::info!(log = %log_sink.path().display(), cooldown = config.cooldown_frames, "payload log ready");

    let pipeline = ScanPipeline::from_config(&config);
    let mut session = ScanSession::new(
        pipeline,
        config.cooldown_frames,
        Box::new(source),
        Box::new(log_sink),
    );

    if cli.snapshot_every > 0 {
        let sink = FileSnapshotSink::new(&config.snapshot_dir, config.snapshot_ext.clone());
        tracing::info!(dir = %sink.dir().display(), every = cli.snapshot_every, "snapshots enabled");
        session = session.with_snapshots(Box::new(sink), cli.snapshot_every);
    }
    if let Some(dir) = &cli.annotated_out {
        std::fs::create_dir_all(dir)?;
        session = session.with_annotated_output(dir);
    }
    if let Some(max) = cli.max_frames {
        session = session.with_max_frames(max);
    }
    if let Some(secs) = cli.duration {
        let stop = session.stop_handle();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(secs));
            stop.store(true, Ordering::SeqCst);
        });
    }

    let stats = session.run();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    Ok(())
}

/// Load the config file (or defaults), apply flag overrides, and validate.
fn resolve_config(cli: &Cli) -> Result<ScanConfig> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };
    if let Some(cooldown) = cli.cooldown {
        config.cooldown_frames = cooldown;
    }
    if let Some(log) = &cli.log {
        config.log_path = log.clone();
    }
    if let Some(dir) = &cli.snapshot_dir {
        config.snapshot_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("symscan").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn frames_is_required() {
        assert!(Cli::try_parse_from(["symscan"]).is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&["--frames", "in", "--cooldown", "30", "--log", "out.txt", "--loop"]);
        assert!(cli.looping);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.cooldown_frames, 30);
        assert_eq!(config.log_path, PathBuf::from("out.txt"));
        assert_eq!(config.min_quad_area_ratio, 0.15);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.json");
        std::fs::write(&path, r#"{ "cooldown_frames": 10, "snapshot_ext": "jpg" }"#).unwrap();

        let cli = parse(&["--frames", "in", "--config", path.to_str().unwrap(), "--cooldown", "5"]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.cooldown_frames, 5);
        assert_eq!(config.snapshot_ext, "jpg");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.json");
        std::fs::write(&path, r#"{ "min_quad_area_ratio": 2.0 }"#).unwrap();
        let cli = parse(&["--frames", "in", "--config", path.to_str().unwrap()]);
        assert!(resolve_config(&cli).is_err());
    }
}
