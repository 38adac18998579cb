//! JSON-lines framing for the host shim connection.
//!
//! One JSON object per line, tagged by `type`. Lines that do not parse, or
//! that exceed [`MAX_FRAME_LENGTH`], are skipped with a warning so that one
//! bad frame never tears the connection down.

use std::io;

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};
use tracing::warn;

use crate::common::error::HostError;
use crate::common::types::Participant;
use crate::host::gateway::HostBroadcast;

/// Longest accepted line, newline excluded.
pub const MAX_FRAME_LENGTH: usize = 64 * 1024;

/// Server lifecycle state reported by the shim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Started,
    Stopping,
}

/// Frames sent by the host shim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostFrame {
    Lifecycle {
        state: LifecycleState,
    },
    Chat {
        player: Participant,
        /// Raw text as typed.
        message: String,
        /// Decorated text, when the host renders one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Join {
        player: Participant,
    },
    Leave {
        player: Participant,
    },
    Roster {
        players: Vec<Participant>,
    },
}

/// Frames sent to the host shim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostReply {
    Broadcast(HostBroadcast),
}

/// Parse a single line.
pub fn parse_frame(line: &[u8]) -> Result<HostFrame, HostError> {
    Ok(serde_json::from_slice(line)?)
}

/// Newline-delimited JSON codec.
#[derive(Debug)]
pub struct HostCodec {
    lines: LinesCodec,
    max_length: usize,
}

impl HostCodec {
    pub fn new() -> Self {
        Self::with_max_length(MAX_FRAME_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_length),
            max_length,
        }
    }

    fn frame_from_line(line: &str) -> Option<HostFrame> {
        if line.trim().is_empty() {
            return None;
        }
        match parse_frame(line.as_bytes()) {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!("Skipping host frame: {}", e);
                None
            }
        }
    }

    /// Overlong and non-UTF-8 lines are dropped; anything else is an I/O failure.
    fn skip_line(&self, error: LinesCodecError) -> Result<(), HostError> {
        match error {
            LinesCodecError::MaxLineLengthExceeded => {
                warn!(
                    "Skipping host frame: {}",
                    HostError::FrameTooLong {
                        max: self.max_length
                    }
                );
                Ok(())
            }
            LinesCodecError::Io(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!("Skipping host frame: {}", e);
                Ok(())
            }
            LinesCodecError::Io(e) => Err(HostError::Io(e)),
        }
    }
}

impl Default for HostCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for HostCodec {
    type Item = HostFrame;
    type Error = HostError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.lines.decode(src) {
                Ok(Some(line)) => {
                    if let Some(frame) = Self::frame_from_line(&line) {
                        return Ok(Some(frame));
                    }
                }
                Ok(None) => return Ok(None),
                Err(e) => self.skip_line(e)?,
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.lines.decode_eof(src) {
                Ok(Some(line)) => {
                    if let Some(frame) = Self::frame_from_line(&line) {
                        return Ok(Some(frame));
                    }
                }
                Ok(None) => return Ok(None),
                Err(e) => self.skip_line(e)?,
            }
        }
    }
}

impl Encoder<HostReply> for HostCodec {
    type Error = HostError;

    fn encode(&mut self, item: HostReply, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(&item)?;
        dst.reserve(json.len() + 1);
        dst.put_slice(&json);
        dst.put_u8(b'\n');
        Ok(())
    }
}
