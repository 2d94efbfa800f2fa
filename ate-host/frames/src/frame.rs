// Licensed under the Apache-2.0 license

//! Fixed-capacity transport frames
//!
//! A command is carried as the concatenation of `payload[..size]` over an
//! ordered run of frames. There is no inter-frame metadata: ordering, count
//! and boundaries are the caller's concern.

use crate::error::{FrameError, FrameResult};

/// Payload capacity of one SPI console frame.
pub const SPI_CONSOLE_FRAME_SIZE: usize = 2020;

/// Byte used to pad single-frame commands.
pub const FRAME_PAD_BYTE: u8 = b' ';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Box<[u8]>,
    size: usize,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new(SPI_CONSOLE_FRAME_SIZE)
    }
}

impl Frame {
    /// An empty frame with `capacity` payload bytes.
    pub fn new(capacity: usize) -> Self {
        Frame {
            payload: vec![0u8; capacity].into_boxed_slice(),
            size: 0,
        }
    }

    /// A frame holding `data`, with no padding past it.
    pub fn from_data(capacity: usize, data: &[u8]) -> FrameResult<Self> {
        let mut frame = Self::new(capacity);
        frame.set_data(data)?;
        Ok(frame)
    }

    pub fn capacity(&self) -> usize {
        self.payload.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The used part of the payload.
    pub fn data(&self) -> &[u8] {
        &self.payload[..self.size]
    }

    /// The whole payload buffer, padding included.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Copies `data` to the start of the payload. Bytes past it are left as
    /// they were.
    pub fn set_data(&mut self, data: &[u8]) -> FrameResult<()> {
        if data.len() > self.capacity() {
            return Err(FrameError::OutputTooSmall {
                need: data.len(),
                have: self.capacity(),
            });
        }
        self.payload[..data.len()].copy_from_slice(data);
        self.size = data.len();
        Ok(())
    }

    /// Writes a whole command into this frame and pads the rest of the
    /// payload with spaces, as the SPI console expects.
    pub fn fill_padded(&mut self, data: &[u8]) -> FrameResult<()> {
        if data.len() > self.capacity() {
            log::error!(
                "command of {} bytes does not fit a {} byte frame",
                data.len(),
                self.capacity()
            );
        }
        self.set_data(data)?;
        self.payload[data.len()..].fill(FRAME_PAD_BYTE);
        Ok(())
    }
}

/// Number of frames of `capacity` bytes needed to carry `len` bytes.
pub fn frame_count(len: usize, capacity: usize) -> usize {
    len.div_ceil(capacity)
}

/// Splits `command` across `out`, `frame_capacity` bytes per frame.
///
/// Returns the number of frames used. Fails before touching `out` if it
/// holds too few frames or a frame that cannot take `frame_capacity` bytes.
/// Frames past the returned count are left untouched.
pub fn chunk(command: &[u8], frame_capacity: usize, out: &mut [Frame]) -> FrameResult<usize> {
    if frame_capacity == 0 {
        return Err(FrameError::ZeroCapacity);
    }

    let count = frame_count(command.len(), frame_capacity);
    if out.len() < count {
        log::error!(
            "{} byte command needs {} frames, {} available",
            command.len(),
            count,
            out.len()
        );
        return Err(FrameError::OutputTooSmall {
            need: count,
            have: out.len(),
        });
    }
    if let Some(small) = out[..count]
        .iter()
        .find(|frame| frame.capacity() < frame_capacity)
    {
        return Err(FrameError::FrameTooSmall {
            capacity: frame_capacity,
            have: small.capacity(),
        });
    }

    for (frame, piece) in out.iter_mut().zip(command.chunks(frame_capacity)) {
        frame.set_data(piece)?;
    }
    log::debug!(
        "split {} byte command into {} frames",
        command.len(),
        count
    );
    Ok(count)
}

/// Splits `command` into freshly allocated frames.
pub fn chunk_to_vec(command: &[u8], frame_capacity: usize) -> FrameResult<Vec<Frame>> {
    if frame_capacity == 0 {
        return Err(FrameError::ZeroCapacity);
    }
    let mut frames = vec![Frame::new(frame_capacity); frame_count(command.len(), frame_capacity)];
    chunk(command, frame_capacity, &mut frames)?;
    Ok(frames)
}

/// Concatenates the used payload of every frame, in order.
pub fn reassemble<'a, I>(frames: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a Frame>,
{
    let mut out = Vec::new();
    for frame in frames {
        out.extend_from_slice(frame.data());
    }
    out
}

/// Strips console noise around an embedded JSON document.
///
/// Keeps everything from the first `{` or `[` through the last `}` or `]`.
/// Input without a usable pair of delimiters is returned unchanged.
pub fn trim_to_json(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b == b'{' || *b == b'[');
    let end = bytes.iter().rposition(|b| *b == b'}' || *b == b']');
    match (start, end) {
        (Some(start), Some(end)) if end >= start => &bytes[start..=end],
        _ => bytes,
    }
}
