//! Wire protocol shared with the coordinator.
//!
//! Every message is a single frame: a 6-byte ASCII header (one tag byte plus
//! five zero-padded decimal digits giving the payload length) followed by
//! exactly that many payload bytes.
//!
//! ```text
//! +-----+-------+------------------+
//! | tag | 00042 | payload (42 B)   |
//! +-----+-------+------------------+
//! ```
//!
//! Tags are `c` (command), `o` (output) and `i` (input). The length field
//! caps payloads at [`MAX_PAYLOAD_LEN`] bytes.

use std::borrow::Cow;
use std::fmt;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{AgentError, Result};

/// Size of the fixed frame header in bytes.
pub const HEADER_LEN: usize = 6;

/// Largest payload the 5-digit length field can describe.
pub const MAX_PAYLOAD_LEN: usize = 99_999;

/// The three message kinds that travel between agent and coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Command,
    Output,
    Input,
}

impl FrameKind {
    /// The single-byte wire tag for this kind.
    pub fn tag(self) -> u8 {
        match self {
            FrameKind::Command => b'c',
            FrameKind::Output => b'o',
            FrameKind::Input => b'i',
        }
    }

    /// Inverse of [`FrameKind::tag`].
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'c' => Some(FrameKind::Command),
            b'o' => Some(FrameKind::Output),
            b'i' => Some(FrameKind::Input),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameKind::Command => "command",
            FrameKind::Output => "output",
            FrameKind::Input => "input",
        };
        f.write_str(name)
    }
}

/// One decoded wire message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub payload: Vec<u8>,
}

impl Frame {
    /// The payload as text. Commands and outputs are produced by shells, so
    /// invalid UTF-8 is tolerated rather than rejected.
    pub fn payload_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Encode a frame into its wire bytes.
pub fn encode(kind: FrameKind, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(AgentError::PayloadTooLarge(payload.len()));
    }
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.push(kind.tag());
    buf.extend_from_slice(format!("{:05}", payload.len()).as_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Decode a 6-byte header into its kind and payload length.
pub fn decode_header(header: &[u8; HEADER_LEN]) -> Result<(FrameKind, usize)> {
    let kind = FrameKind::from_tag(header[0]).ok_or_else(|| {
        AgentError::ProtocolViolation(format!("unknown frame tag {:?}", header[0] as char))
    })?;

    let digits = &header[1..];
    if !digits.iter().all(|b| b.is_ascii_digit()) {
        return Err(AgentError::ProtocolViolation(format!(
            "non-numeric length field {:?}",
            String::from_utf8_lossy(digits)
        )));
    }
    // Five decimal digits, so the value is at most 99999 and cannot overflow.
    let len = digits
        .iter()
        .fold(0usize, |acc, b| acc * 10 + (b - b'0') as usize);

    Ok((kind, len))
}

/// Read one complete frame from the stream.
///
/// Returns `Ok(None)` on clean end-of-stream before any header byte. A
/// stream that ends after that point yields
/// [`AgentError::TruncatedTransmission`].
pub async fn read_frame<S>(stream: &mut S) -> Result<Option<Frame>>
where
    S: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    let mut got = 0;
    while got < HEADER_LEN {
        let n = stream.read(&mut header[got..]).await?;
        if n == 0 {
            if got == 0 {
                return Ok(None);
            }
            return Err(AgentError::TruncatedTransmission {
                expected: HEADER_LEN,
                got,
            });
        }
        got += n;
    }

    let (kind, len) = decode_header(&header)?;
    let mut payload = vec![0u8; len];
    read_full(stream, &mut payload).await?;

    Ok(Some(Frame { kind, payload }))
}

/// Read one frame and require it to carry the given kind.
///
/// End-of-stream and any other kind are both fatal here: the caller is in
/// the middle of a conversation and the peer must not go silent or switch
/// message types.
pub async fn read_frame_expecting<S>(stream: &mut S, kind: FrameKind) -> Result<Frame>
where
    S: AsyncRead + Unpin,
{
    match read_frame(stream).await? {
        Some(frame) if frame.kind == kind => Ok(frame),
        Some(frame) => Err(AgentError::ProtocolViolation(format!(
            "expected {} frame, got {} frame",
            kind, frame.kind
        ))),
        None => Err(AgentError::TruncatedTransmission {
            expected: HEADER_LEN,
            got: 0,
        }),
    }
}

/// Encode and fully write one frame.
pub async fn write_frame<S>(stream: &mut S, kind: FrameKind, payload: &[u8]) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let bytes = encode(kind, payload)?;
    match stream.write_all(&bytes).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::WriteZero => Err(AgentError::PartialTransmission),
        Err(e) => Err(e.into()),
    }
}

async fn read_full<S>(stream: &mut S, buf: &mut [u8]) -> Result<()>
where
    S: AsyncRead + Unpin,
{
    let mut got = 0;
    while got < buf.len() {
        let n = stream.read(&mut buf[got..]).await?;
        if n == 0 {
            return Err(AgentError::TruncatedTransmission {
                expected: buf.len(),
                got,
            });
        }
        got += n;
    }
    Ok(())
}
