//! Pipeline-wide tuning configuration.

use streamline_core::CommitConfig;

/// All tuning knobs for a single `Coordinator` + `PipelineWorker` pair.
///
/// Mirrors the CLI surface one-to-one (see the binary crate for the
/// `clap::Parser` struct that builds one of these from process arguments).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Host to bind the listening socket to.
    pub host: String,
    /// Port to bind the listening socket to.
    pub port: u16,
    /// Expected input sample rate, in Hz.
    pub sample_rate: u32,
    /// Interleaved input channel count.
    pub channels: usize,
    /// Largest TEXT chunk, in bytes, sent per outbound packet.
    pub text_max_payload: usize,
    /// Largest payload the frame parser will accept before discarding.
    pub max_payload: usize,
    /// Trailing window transcribed on each ASR tick.
    pub window_seconds: f64,
    /// Maximum ASR invocation rate.
    pub step_hz: f64,
    /// Smallest window before the first ASR tick; also the idle-flush timeout.
    pub min_window_seconds: f64,
    /// Ring buffer capacity, in seconds of audio.
    pub max_buffer_seconds: f64,
    /// Logical label for input language 1.
    pub lang1_label: String,
    /// Logical label for input language 2.
    pub lang2_label: String,
    /// Commit engine tuning.
    pub commit: CommitConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            host: "192.168.0.165".to_string(),
            port: 3333,
            sample_rate: 16_000,
            channels: 2,
            text_max_payload: 128,
            max_payload: 4096,
            window_seconds: 4.0,
            step_hz: 1.0,
            min_window_seconds: 1.0,
            max_buffer_seconds: 30.0,
            lang1_label: "lang1".to_string(),
            lang2_label: "lang2".to_string(),
            commit: CommitConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Ring buffer capacity in samples.
    #[must_use]
    pub fn buffer_capacity_samples(&self) -> usize {
        (self.max_buffer_seconds * self.sample_rate as f64) as usize
    }

    /// Samples needed before the first (or idle-flush) ASR tick is eligible.
    #[must_use]
    pub fn min_window_samples(&self) -> usize {
        (self.min_window_seconds * self.sample_rate as f64) as usize
    }

    /// Samples in the trailing window handed to ASR on each tick.
    #[must_use]
    pub fn window_samples(&self) -> usize {
        (self.window_seconds * self.sample_rate as f64) as usize
    }

    /// Bytes per interleaved audio frame (`3 * channels`).
    #[must_use]
    pub fn frame_bytes(&self) -> usize {
        3 * self.channels
    }
}
