//! Length-prefixed frame codec for the daemon's wire protocol.
//!
//! Every message on the wire is one frame: a 4-byte big-endian unsigned
//! length followed by exactly that many payload bytes. The codec owns a
//! single reusable buffer for both directions, growing it to the next
//! power of two when a frame needs more room and never shrinking it.
//!
//! End-of-stream handling is the subtle part. A read that yields zero
//! bytes while waiting for a length prefix is the peer's normal shutdown
//! signal and decodes to `Ok(None)`. A stream that closes after *some*
//! bytes of a frame were delivered means the peer desynchronized, which
//! is unrecoverable for the channel and reported as an error.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default maximum frame size in either direction: 64 MiB.
///
/// Partly a sanity check: if the stream gets out of sync, arbitrary bytes
/// will be interpreted as a frame length, which may be huge. The guard
/// keeps a corrupted prefix from triggering an unbounded allocation.
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 64 * 1024 * 1024;

/// Size of the big-endian length prefix.
const LENGTH_PREFIX_SIZE: usize = 4;

/// Initial size of the reusable I/O buffer.
const INITIAL_BUFFER_SIZE: usize = 8 * 1024;

/// Errors from frame reading and writing.
///
/// All of these poison the channel: once a frame boundary is lost or a
/// frame exceeds the size guard there is no way to find the next frame,
/// so callers treat every variant as fatal for the connection.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A frame (announced by the peer or requested for writing) exceeds
    /// the configured maximum.
    #[error("frame of {size} bytes exceeds maximum {max}")]
    FrameTooLarge { size: u64, max: u32 },

    /// The stream closed in the middle of a frame.
    #[error("stream closed mid-frame: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },

    /// The requested buffer size has no representable power-of-two ceiling.
    #[error("buffer size {size} overflows the power-of-two growth bound")]
    SizeOverflow { size: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The codec's reusable byte buffer.
///
/// Grows to the smallest power of two that fits a requested size and
/// never shrinks. Exclusively owned by the codec; nothing else holds a
/// reference to it.
#[derive(Debug)]
struct FrameBuffer {
    data: Vec<u8>,
}

impl FrameBuffer {
    fn new() -> Self {
        Self { data: vec![0; INITIAL_BUFFER_SIZE] }
    }

    /// Make at least `size` bytes addressable.
    ///
    /// Growth targets the smallest power of two >= `size`; a request the
    /// size type cannot round up is an error rather than a silent wrap.
    fn grow_to(&mut self, size: usize) -> Result<(), CodecError> {
        if size <= self.data.len() {
            return Ok(());
        }
        let target = size
            .checked_next_power_of_two()
            .ok_or(CodecError::SizeOverflow { size })?;
        self.data.resize(target, 0);
        Ok(())
    }

    /// Currently addressable bytes.
    fn capacity(&self) -> usize {
        self.data.len()
    }
}

/// Reads and writes length-prefixed frames over a byte stream.
pub struct FrameCodec {
    buffer: FrameBuffer,
    max_frame_size: u32,
}

impl FrameCodec {
    /// Codec with the default 64 MiB frame guard.
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Codec with a custom maximum frame size (both directions).
    pub fn with_max_frame_size(max_frame_size: u32) -> Self {
        Self { buffer: FrameBuffer::new(), max_frame_size }
    }

    /// Read one frame.
    ///
    /// Returns `Ok(None)` when the stream closed cleanly with no bytes
    /// pending — the normal shutdown signal. The returned slice borrows
    /// the codec's buffer and is valid until the next codec call.
    pub async fn read_frame<R>(&mut self, reader: &mut R) -> Result<Option<&[u8]>, CodecError>
    where
        R: AsyncRead + Unpin,
    {
        self.buffer.grow_to(LENGTH_PREFIX_SIZE)?;
        let got = read_full(reader, &mut self.buffer.data[..LENGTH_PREFIX_SIZE]).await?;
        if got == 0 {
            return Ok(None);
        }
        if got < LENGTH_PREFIX_SIZE {
            return Err(CodecError::Truncated { expected: LENGTH_PREFIX_SIZE, got });
        }

        let prefix = [
            self.buffer.data[0],
            self.buffer.data[1],
            self.buffer.data[2],
            self.buffer.data[3],
        ];
        let len = u32::from_be_bytes(prefix);
        if len > self.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                size: u64::from(len),
                max: self.max_frame_size,
            });
        }

        let len = len as usize;
        self.buffer.grow_to(len)?;
        let got = read_full(reader, &mut self.buffer.data[..len]).await?;
        if got < len {
            return Err(CodecError::Truncated { expected: len, got });
        }
        Ok(Some(&self.buffer.data[..len]))
    }

    /// Write one frame: prefix and payload staged in the shared buffer and
    /// flushed as a single write.
    pub async fn write_frame<W>(&mut self, writer: &mut W, payload: &[u8]) -> Result<(), CodecError>
    where
        W: AsyncWrite + Unpin,
    {
        let Ok(len) = u32::try_from(payload.len()) else {
            return Err(CodecError::FrameTooLarge {
                size: payload.len() as u64,
                max: self.max_frame_size,
            });
        };
        if len > self.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                size: u64::from(len),
                max: self.max_frame_size,
            });
        }

        let total = LENGTH_PREFIX_SIZE + payload.len();
        self.buffer.grow_to(total)?;
        self.buffer.data[..LENGTH_PREFIX_SIZE].copy_from_slice(&len.to_be_bytes());
        self.buffer.data[LENGTH_PREFIX_SIZE..total].copy_from_slice(payload);
        writer.write_all(&self.buffer.data[..total]).await?;
        writer.flush().await?;
        Ok(())
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Read until `buf` is full or the stream ends.
///
/// Returns the number of bytes actually read, which is less than
/// `buf.len()` only when the stream closed early. The caller decides
/// whether a short count is a clean shutdown or a truncated frame.
async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
