//! Unit of work handed from the Coordinator to the Pipeline Worker.

/// A decoded, channel-selected window of audio tagged with its source language.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Normalized mono samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// The language label in effect when this chunk was decoded.
    pub lang: String,
}

impl AudioChunk {
    /// Build a chunk from decoded samples and a language label.
    #[must_use]
    pub fn new(samples: Vec<f32>, lang: impl Into<String>) -> Self {
        Self {
            samples,
            lang: lang.into(),
        }
    }
}
