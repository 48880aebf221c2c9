//! Networking, collaborator traits and the coordinator/worker thread pair
//! that turn [`streamline_core`] into a runnable streaming pipeline.

pub mod asr;
pub mod audio_chunk;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod mt;
pub mod tcp_endpoint;
pub mod worker;

pub use asr::{NullTranscriber, Transcriber};
pub use audio_chunk::AudioChunk;
pub use config::PipelineConfig;
pub use coordinator::Coordinator;
pub use error::{Error, Result};
pub use mt::{NullTranslator, TaggedTranslator, Translator};
pub use tcp_endpoint::TcpEndpoint;
pub use worker::{PipelineWorker, TxItem};
