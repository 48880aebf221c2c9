//! Coordinator: owns the TCP endpoint, frame parser and ingest carry, and
//! bridges the network side to the pipeline worker's queues.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use streamline_core::{
    build_packet, decode_packed_24bit, ChannelSelect, Packet, StreamParser, FLAG_LANG1_IN,
    FLAG_LANG1_OUT, FLAG_LANG2_IN, FLAG_LANG2_OUT, MSG_TYPE_AUDIO, MSG_TYPE_TEXT,
};

use crate::audio_chunk::AudioChunk;
use crate::config::PipelineConfig;
use crate::tcp_endpoint::TcpEndpoint;
use crate::worker::TxItem;

/// Splits `text` into consecutive chunks of at most `max_bytes` bytes each,
/// always cutting on a UTF-8 codepoint boundary.
fn utf8_chunks(text: &str, max_bytes: usize) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let max_bytes = max_bytes.max(1);
    let bytes = text.len();
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < bytes {
        let mut end = (start + max_bytes).min(bytes);
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // A single codepoint is wider than max_bytes; emit it whole
            // rather than looping forever.
            let width = text[start..].chars().next().map_or(1, char::len_utf8);
            end = start + width;
        }
        chunks.push(&text[start..end]);
        start = end;
    }
    chunks
}

fn flags_to_lang<'a>(flags: u8, current: &'a str, lang1: &'a str, lang2: &'a str) -> &'a str {
    if flags & FLAG_LANG1_IN != 0 {
        lang1
    } else if flags & FLAG_LANG2_IN != 0 {
        lang2
    } else {
        current
    }
}

fn lang_to_channel(lang: &str, lang1: &str, lang2: &str) -> ChannelSelect {
    if lang == lang1 {
        ChannelSelect::Left
    } else if lang == lang2 {
        ChannelSelect::Right
    } else {
        ChannelSelect::Left
    }
}

/// The network half of the pipeline: inbound framing/decoding and outbound
/// chunking/framing, joined to the worker purely through two channels.
pub struct Coordinator {
    config: PipelineConfig,
    endpoint: TcpEndpoint,
    parser: StreamParser,
    current_lang: String,
    carry: Vec<u8>,
    audio_tx: Sender<AudioChunk>,
    tx_rx: Receiver<TxItem>,
}

impl Coordinator {
    /// Build a coordinator over an already-bound endpoint and the two
    /// channel halves that connect it to the pipeline worker.
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        endpoint: TcpEndpoint,
        audio_tx: Sender<AudioChunk>,
        tx_rx: Receiver<TxItem>,
    ) -> Self {
        let parser = StreamParser::new(config.max_payload);
        let current_lang = config.lang1_label.clone();
        Self {
            config,
            endpoint,
            parser,
            current_lang,
            carry: Vec::new(),
            audio_tx,
            tx_rx,
        }
    }

    /// Run the network loop until `stop` is observed.
    pub fn run(&mut self, stop: &AtomicBool) {
        tracing::info!(
            host = self.endpoint.bound_host(),
            port = self.endpoint.bound_port(),
            "coordinator listening"
        );
        while !stop.load(Ordering::Relaxed) {
            self.poll_network();
            self.drain_tx();
        }
    }

    fn poll_network(&mut self) {
        let data = self.endpoint.poll(Duration::from_millis(10));
        if data.is_empty() {
            return;
        }
        let packets = self.parser.feed(&data);
        self.ingest_packets(packets);
    }

    fn ingest_packets(&mut self, packets: Vec<Packet>) {
        for pkt in packets {
            if pkt.msg_type != MSG_TYPE_AUDIO {
                continue;
            }

            self.current_lang = flags_to_lang(
                pkt.flags,
                &self.current_lang,
                &self.config.lang1_label,
                &self.config.lang2_label,
            )
            .to_string();

            let mut payload = std::mem::take(&mut self.carry);
            payload.extend_from_slice(&pkt.payload);
            let frame_bytes = self.config.frame_bytes();
            let trim_len = payload.len() - (payload.len() % frame_bytes);
            self.carry = payload[trim_len..].to_vec();
            payload.truncate(trim_len);
            if payload.is_empty() {
                continue;
            }

            let channel =
                lang_to_channel(&self.current_lang, &self.config.lang1_label, &self.config.lang2_label);
            let samples = decode_packed_24bit(&payload, self.config.channels, channel);
            if samples.is_empty() {
                continue;
            }

            let chunk = AudioChunk::new(samples, self.current_lang.clone());
            if self.audio_tx.try_send(chunk).is_err() {
                tracing::warn!("audio queue full; dropping audio chunk");
            }
        }
    }

    fn drain_tx(&mut self) {
        while let Ok((text, src_lang)) = self.tx_rx.try_recv() {
            let out_lang = if src_lang == self.config.lang1_label {
                self.config.lang2_label.clone()
            } else {
                self.config.lang1_label.clone()
            };
            let flags = if out_lang == self.config.lang1_label {
                FLAG_LANG1_OUT
            } else {
                FLAG_LANG2_OUT
            };

            for chunk in utf8_chunks(&text, self.config.text_max_payload) {
                let packet = match build_packet(MSG_TYPE_TEXT, flags, chunk.as_bytes()) {
                    Ok(p) => p,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to build TX packet");
                        continue;
                    }
                };
                tracing::debug!(
                    flags = format!("0x{flags:02X}"),
                    payload_len = chunk.len(),
                    out_lang = %out_lang,
                    "TX packet"
                );
                if !self.endpoint.send(&packet) {
                    tracing::warn!("no active connection; dropping text");
                    return;
                }
            }
        }
    }
}
