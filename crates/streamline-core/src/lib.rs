//! Protocol framing, audio decoding, buffering, rate limiting and incremental
//! commit logic shared by the streaming translator's coordinator and worker.
//!
//! This crate has no networking or threading of its own — it is pure,
//! synchronous logic that [`streamline-pipeline`] wires onto sockets and
//! worker threads.

pub mod audio;
pub mod commit;
pub mod error;
pub mod protocol;
pub mod rate_limiter;
pub mod ring_buffer;

pub use audio::{decode_packed_24bit, ChannelSelect};
pub use commit::{CommitConfig, Committer};
pub use error::{Error, Result};
pub use protocol::{
    build_packet, Packet, StreamParser, FLAG_LANG1_IN, FLAG_LANG1_OUT, FLAG_LANG2_IN,
    FLAG_LANG2_OUT, MSG_TYPE_AUDIO, MSG_TYPE_TEXT,
};
pub use rate_limiter::RateLimiter;
pub use ring_buffer::RingBuffer;
