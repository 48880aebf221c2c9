//! Speech-to-text collaborator contract.

use crate::error::{Error, Result};

/// A speech recognition backend: a trailing audio window in, text out.
///
/// Implementations must accept empty input (returning empty text) and must
/// not attempt language auto-detection — an empty `language` is a
/// configuration error, not a signal to guess.
pub trait Transcriber: Send {
    /// Transcribe `samples` (mono, normalized `f32`) spoken in `language`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingLanguage`] if `language` is empty.
    fn transcribe(&mut self, samples: &[f32], language: &str) -> Result<String>;
}

/// A no-op transcriber: always returns empty text.
///
/// Lets the binary link and the coordinator/worker loop run end to end
/// without a real ASR model; wiring an actual backend (a local model
/// server, a subprocess, an HTTP call) is left to the integrator.
#[derive(Debug, Default)]
pub struct NullTranscriber;

impl Transcriber for NullTranscriber {
    fn transcribe(&mut self, samples: &[f32], language: &str) -> Result<String> {
        if language.is_empty() {
            return Err(Error::MissingLanguage("transcribe"));
        }
        let _ = samples;
        Ok(String::new())
    }
}
