// Licensed under the Apache-2.0 license

//! Transport and session error types

use ate_host_commands::CommandError;
use ate_host_frames::FrameError;
use perso_tlv::PersoTlvError;
use thiserror::Error;

pub type TransportResult<T> = Result<T, TransportError>;

pub type SessionResult<T> = Result<T, SessionError>;

/// Errors reported by a [`ConsoleDriver`](crate::ConsoleDriver).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("console not ready")]
    NotReady,

    #[error("console operation timed out")]
    Timeout,

    #[error("device sync ({0}) message missed")]
    SyncMissed(String),

    #[error("console communication error")]
    CommunicationError,
}

/// Errors raised by external provisioning services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Console(#[from] ConsoleError),

    #[error("command needs {need} frames, at most {max} allowed")]
    TooManyFrames { need: usize, max: usize },

    #[error("no frames received")]
    NoResponse,

    /// The DUT answered with `RESP_ERR`.
    #[error("device reported an error: {0}")]
    DeviceError(String),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Tlv(#[from] PersoTlvError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("perso blob carries no WAS HMAC to authenticate the endorsement request")]
    MissingSignature,
}
