//! `streamline-server` - bilingual streaming speech-to-translation coordinator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use clap::Parser;
use streamline_core::CommitConfig;
use streamline_pipeline::{
    Coordinator, NullTranscriber, NullTranslator, PipelineConfig, PipelineWorker, TaggedTranslator,
    TcpEndpoint,
};

/// Flat CLI surface for the single job this process does: run the
/// coordinator loop until stopped.
#[derive(Parser)]
#[command(name = "streamline-server")]
#[command(author, version, about = "Bilingual streaming speech-to-translation coordinator", long_about = None)]
struct Args {
    /// Host to bind the listening socket to.
    #[arg(long, default_value = "192.168.0.165")]
    host: String,

    /// Port to bind the listening socket to.
    #[arg(long, default_value_t = 3333)]
    port: u16,

    /// Expected input sample rate, in Hz.
    #[arg(long, default_value_t = 16_000)]
    sample_rate: u32,

    /// Interleaved input channel count.
    #[arg(long, default_value_t = 2)]
    channels: usize,

    /// Trailing window transcribed on each ASR tick, in seconds.
    #[arg(long, default_value_t = 4.0)]
    window_seconds: f64,

    /// Maximum ASR invocation rate, in Hz.
    #[arg(long, default_value_t = 1.0)]
    step_hz: f64,

    /// Smallest window before the first ASR tick; also the idle-flush timeout.
    #[arg(long, default_value_t = 1.0)]
    min_window_seconds: f64,

    /// Ring buffer capacity, in seconds of audio.
    #[arg(long, default_value_t = 30.0)]
    max_buffer_seconds: f64,

    /// Largest TEXT chunk, in bytes, sent per outbound packet.
    #[arg(long, default_value_t = 128)]
    text_max_payload: usize,

    /// Logical label for input language 1.
    #[arg(long, default_value = "lang1")]
    lang1_label: String,

    /// Logical label for input language 2.
    #[arg(long, default_value = "lang2")]
    lang2_label: String,

    /// Commit engine: size of the agreement history.
    #[arg(long, default_value_t = 3)]
    commit_history: usize,

    /// Commit engine: minimum growth required to commit.
    #[arg(long, default_value_t = 1)]
    commit_min_chars: usize,

    /// Standard log level (overridden by `RUST_LOG` if set).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable the live audio plotter (no visualization UI is linked into
    /// this build; passing this flag logs a warning and continues without
    /// one).
    #[arg(long)]
    plot_audio: bool,

    /// Plotter trailing window, in seconds. Parsed but unused without a
    /// linked plotter.
    #[arg(long, default_value_t = 5.0)]
    plot_window_seconds: f64,

    /// Plotter refresh rate, in Hz. Parsed but unused without a linked
    /// plotter.
    #[arg(long, default_value_t = 30.0)]
    plot_hz: f64,
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            host: self.host.clone(),
            port: self.port,
            sample_rate: self.sample_rate,
            channels: self.channels,
            text_max_payload: self.text_max_payload,
            window_seconds: self.window_seconds,
            step_hz: self.step_hz,
            min_window_seconds: self.min_window_seconds,
            max_buffer_seconds: self.max_buffer_seconds,
            lang1_label: self.lang1_label.clone(),
            lang2_label: self.lang2_label.clone(),
            commit: CommitConfig {
                history_len: self.commit_history,
                min_commit_chars: self.commit_min_chars,
                ..CommitConfig::default()
            },
            ..PipelineConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .init();

    if args.plot_audio {
        tracing::warn!(
            "plot-audio requested but no visualization UI is linked into this build; continuing without one"
        );
    }

    let config = args.pipeline_config();

    let endpoint = TcpEndpoint::bind(&config.host, config.port)
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    tracing::info!(
        host = endpoint.bound_host(),
        port = endpoint.bound_port(),
        "listening"
    );

    let (audio_tx, audio_rx) = crossbeam_channel::bounded(200);
    let (tx_tx, tx_rx) = crossbeam_channel::unbounded();

    let stop = Arc::new(AtomicBool::new(false));
    let stop_for_handler = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        tracing::info!("shutdown requested");
        stop_for_handler.store(true, Ordering::SeqCst);
    })
    .context("failed to install Ctrl+C handler")?;

    let translator = TaggedTranslator::new(
        config.lang1_label.clone(),
        config.lang2_label.clone(),
        Box::new(NullTranslator),
        Box::new(NullTranslator),
    );
    let worker = PipelineWorker::new(config.clone(), NullTranscriber, translator);
    let stop_for_worker = Arc::clone(&stop);
    let worker_handle = thread::spawn(move || worker.run(audio_rx, tx_tx, stop_for_worker));

    let mut coordinator = Coordinator::new(config, endpoint, audio_tx, tx_rx);
    coordinator.run(&stop);

    if worker_handle.join().is_err() {
        tracing::warn!("pipeline worker thread panicked");
    }

    tracing::info!("shutdown complete");
    Ok(())
}
