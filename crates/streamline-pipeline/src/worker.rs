//! Pipeline worker: owns the ring buffer and commit engine, drives ASR/MT.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use streamline_core::{Committer, RateLimiter, RingBuffer};

use crate::asr::Transcriber;
use crate::audio_chunk::AudioChunk;
use crate::config::PipelineConfig;
use crate::error::Error;
use crate::mt::Translator;

/// A translated delta ready for transmission, tagged with the source
/// language it was produced from.
pub type TxItem = (String, String);

/// Owns the ring buffer, commit engine, rate limiter and collaborator
/// backends for one streaming session. Runs on its own thread, fed by the
/// coordinator's inbound queue.
pub struct PipelineWorker<T, M> {
    config: PipelineConfig,
    transcriber: T,
    translator: M,
    committer: Committer,
    buffer: RingBuffer,
    rate: RateLimiter,
    current_lang: String,
    last_audio_ts: Instant,
}

impl<T, M> PipelineWorker<T, M>
where
    T: Transcriber,
    M: Translator,
{
    /// Build a worker from its configuration and collaborator backends.
    #[must_use]
    pub fn new(config: PipelineConfig, transcriber: T, translator: M) -> Self {
        let buffer = RingBuffer::new(config.buffer_capacity_samples());
        let rate = RateLimiter::new(config.step_hz);
        let committer = Committer::new(config.commit);
        let current_lang = config.lang1_label.clone();
        Self {
            config,
            transcriber,
            translator,
            committer,
            buffer,
            rate,
            current_lang,
            last_audio_ts: Instant::now(),
        }
    }

    /// Run the worker loop until `stop` is observed, or until a fatal
    /// configuration error (an empty declared language) is hit, in which
    /// case `stop` is set so the coordinator thread unwinds too.
    ///
    /// Consumes `self` since a worker is single-use for the lifetime of one
    /// session.
    pub fn run(mut self, audio_rx: Receiver<AudioChunk>, tx_tx: Sender<TxItem>, stop: Arc<AtomicBool>) {
        tracing::info!("pipeline worker started");
        while !stop.load(Ordering::Relaxed) {
            let ok = match audio_rx.recv_timeout(Duration::from_millis(100)) {
                Ok(chunk) => self.on_chunk(chunk, &tx_tx),
                Err(RecvTimeoutError::Timeout) => self.on_idle(&tx_tx),
                Err(RecvTimeoutError::Disconnected) => break,
            };
            if !ok {
                stop.store(true, Ordering::Relaxed);
                break;
            }
        }
        tracing::info!("pipeline worker stopped");
    }

    /// Returns `false` on a fatal configuration error, `true` otherwise.
    fn on_idle(&mut self, tx_tx: &Sender<TxItem>) -> bool {
        if !self.buffer.is_empty()
            && self.last_audio_ts.elapsed().as_secs_f64() >= self.config.min_window_seconds
        {
            tracing::debug!(
                idle_for_secs = self.last_audio_ts.elapsed().as_secs_f64(),
                "idle flush"
            );
            return self.flush(tx_tx);
        }
        true
    }

    /// Returns `false` on a fatal configuration error, `true` otherwise.
    fn on_chunk(&mut self, chunk: AudioChunk, tx_tx: &Sender<TxItem>) -> bool {
        self.last_audio_ts = Instant::now();

        if chunk.lang != self.current_lang {
            tracing::info!(from = %self.current_lang, to = %chunk.lang, "language switch");
            if !self.flush(tx_tx) {
                return false;
            }
            self.current_lang = chunk.lang.clone();
        }

        self.buffer.append(&chunk.samples);

        let enough = self.buffer.size() >= self.config.min_window_samples();
        if enough && self.rate.allow() {
            match self.transcribe_window() {
                Ok(Some(text)) => self.process_text(&text, false, tx_tx),
                Ok(None) => {}
                Err(()) => return false,
            }
        }
        true
    }

    /// `Ok(Some(text))` on a usable transcript, `Ok(None)` on an empty one,
    /// `Err(())` on a fatal configuration error (caller must stop the
    /// worker). Recoverable ASR errors are logged and folded into `Ok(None)`.
    fn transcribe_window(&mut self) -> Result<Option<String>, ()> {
        let window = self.buffer.get_last(self.config.window_samples());
        match self.transcriber.transcribe(&window, &self.current_lang) {
            Ok(text) if !text.trim().is_empty() => Ok(Some(text)),
            Ok(_) => Ok(None),
            Err(e @ Error::MissingLanguage(_)) => {
                tracing::error!(error = %e, "fatal ASR configuration error; stopping worker");
                Err(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed; window discarded");
                Ok(None)
            }
        }
    }

    fn process_text(&mut self, text: &str, finalize: bool, tx_tx: &Sender<TxItem>) {
        tracing::debug!(lang = %self.current_lang, finalize, text, "transcript");
        let mut delta = self.committer.feed(text);
        if finalize {
            delta.push_str(&self.committer.finalize(text));
        }
        if delta.is_empty() {
            return;
        }
        tracing::debug!(lang = %self.current_lang, delta = %delta, "commit delta");

        match self.translator.translate(&delta, &self.current_lang) {
            Ok(translated) if !translated.is_empty() => {
                tracing::debug!(lang = %self.current_lang, translated = %translated, "translated");
                let _ = tx_tx.send((translated, self.current_lang.clone()));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "translation failed"),
        }
    }

    /// Returns `false` on a fatal configuration error, `true` otherwise.
    fn flush(&mut self, tx_tx: &Sender<TxItem>) -> bool {
        if self.buffer.is_empty() {
            return true;
        }
        let result = match self.transcribe_window() {
            Ok(Some(text)) => {
                self.process_text(&text, true, tx_tx);
                true
            }
            Ok(None) => true,
            Err(()) => false,
        };
        self.buffer.clear();
        self.committer.reset();
        result
    }
}
