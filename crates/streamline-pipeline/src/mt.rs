//! Machine translation collaborator contract.

use crate::error::Result;

/// A translation backend: text in a declared source language, text out.
///
/// Implementations must accept empty input (returning empty text). Unlike
/// [`Transcriber`](crate::asr::Transcriber), there is no hard requirement on
/// `src_lang` here — the two configured translation directions are dispatched
/// by the caller (see [`TaggedTranslator`]), and an unknown `src_lang` is a
/// caller-level fallback, not this trait's concern.
pub trait Translator: Send {
    /// Translate `text`, which was spoken in `src_lang`.
    fn translate(&mut self, text: &str, src_lang: &str) -> Result<String>;
}

/// Dispatches to one of two configured direction engines by `src_lang`,
/// falling back to the `lang1 -> lang2` direction with a warning if
/// `src_lang` matches neither configured label.
pub struct TaggedTranslator {
    lang1_label: String,
    lang2_label: String,
    lang1_to_lang2: Box<dyn Translator>,
    lang2_to_lang1: Box<dyn Translator>,
}

impl TaggedTranslator {
    /// Build a tagged translator over two direction engines.
    #[must_use]
    pub fn new(
        lang1_label: impl Into<String>,
        lang2_label: impl Into<String>,
        lang1_to_lang2: Box<dyn Translator>,
        lang2_to_lang1: Box<dyn Translator>,
    ) -> Self {
        Self {
            lang1_label: lang1_label.into(),
            lang2_label: lang2_label.into(),
            lang1_to_lang2,
            lang2_to_lang1,
        }
    }
}

impl Translator for TaggedTranslator {
    fn translate(&mut self, text: &str, src_lang: &str) -> Result<String> {
        if src_lang == self.lang1_label {
            return self.lang1_to_lang2.translate(text, src_lang);
        }
        if src_lang == self.lang2_label {
            return self.lang2_to_lang1.translate(text, src_lang);
        }
        tracing::warn!(
            src_lang,
            fallback = %self.lang1_label,
            "unknown source language; defaulting to lang1 -> lang2 direction"
        );
        self.lang1_to_lang2.translate(text, src_lang)
    }
}

/// A no-op translator: echoes empty text back. Used to build a runnable
/// [`TaggedTranslator`] stand-in when no real MT model is wired in.
#[derive(Debug, Default)]
pub struct NullTranslator;

impl Translator for NullTranslator {
    fn translate(&mut self, text: &str, _src_lang: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(String::new());
        }
        Ok(String::new())
    }
}
