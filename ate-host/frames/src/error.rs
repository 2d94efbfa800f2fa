// Licensed under the Apache-2.0 license

//! Frame layer error types

use thiserror::Error;

pub type FrameResult<T> = Result<T, FrameError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Not enough frames, or not enough room in a single frame.
    #[error("output buffer too small (expected: >= {need}, got: {have})")]
    OutputTooSmall { need: usize, have: usize },

    #[error("frame capacity must be non-zero")]
    ZeroCapacity,

    /// An output frame whose payload buffer is smaller than the requested
    /// frame capacity.
    #[error("frame payload of {have} bytes cannot hold {capacity} bytes")]
    FrameTooSmall { capacity: usize, have: usize },

    #[error("malformed console response: {0}")]
    MalformedResponse(&'static str),

    #[error("console response CRC mismatch (expected: {expected}, computed: {computed})")]
    CrcMismatch { expected: u32, computed: u32 },
}
