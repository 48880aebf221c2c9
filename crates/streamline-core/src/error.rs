//! Error types shared by the wire protocol and audio decoding paths.

/// Error types for core streaming primitives.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A packet payload exceeded the 32-bit length field.
    #[error("payload too large for 32-bit length field: {0} bytes")]
    PayloadTooLarge(usize),
}

/// Convenience result type for core streaming primitives.
pub type Result<T> = std::result::Result<T, Error>;
