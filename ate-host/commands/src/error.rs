// Licensed under the Apache-2.0 license

use ate_host_frames::FrameError;
use perso_tlv::PersoTlvError;
use thiserror::Error;

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Error, Debug)]
pub enum CommandError {
    /// A binary token of the wrong size.
    #[error("invalid {name}: {got} bytes, want {want}")]
    InvalidToken {
        name: &'static str,
        got: usize,
        want: usize,
    },

    #[error("{field} has {got} entries, at most {max} allowed")]
    FieldTooLong {
        field: &'static str,
        got: usize,
        max: usize,
    },

    #[error("{field} has {got} entries, want {want}")]
    WrongLength {
        field: &'static str,
        got: usize,
        want: usize,
    },

    #[error("{field} entry {value} does not fit a byte")]
    ByteOutOfRange { field: &'static str, value: u32 },

    #[error("invalid perso blob: {0}")]
    InvalidPersoBlob(&'static str),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Tlv(#[from] PersoTlvError),
}
