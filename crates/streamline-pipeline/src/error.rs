//! Crate-wide error type for the pipeline layer.

/// Errors arising from the TCP endpoint, worker wiring, or collaborator calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Binding the listening socket failed, including after the
    /// unspecified-address fallback.
    #[error("failed to bind {0}: {1}")]
    Bind(String, std::io::Error),

    /// Standard I/O error from the socket layer.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A collaborator (ASR or MT) was invoked without a required language.
    #[error("{0} requires a declared language; language auto-detection is not supported")]
    MissingLanguage(&'static str),
}

/// Convenience result type for the pipeline crate.
pub type Result<T> = std::result::Result<T, Error>;
