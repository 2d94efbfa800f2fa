// Licensed under the Apache-2.0 license

use crate::header::ObjectType;
use thiserror::Error;

/// Errors raised while walking, unpacking or packing a personalization blob.
///
/// Every variant is a local validation failure. Size-carrying variants hold
/// both the declared and the available value so callers can log a precise
/// diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersoTlvError {
    #[error("invalid personalization blob: empty")]
    EmptyBlob,

    #[error("blob size {got} exceeds max {max}")]
    BlobTooLarge { got: usize, max: usize },

    #[error("remaining buffer too small for object header")]
    TruncatedHeader,

    #[error("object size {declared} exceeds remaining buffer {remaining}")]
    ObjectOverflow { declared: usize, remaining: usize },

    #[error("unexpected {obj_type:?} object size {got}, want {want}")]
    UnexpectedObjectSize {
        obj_type: ObjectType,
        got: usize,
        want: usize,
    },

    /// A certificate sub-header that does not fit its enclosing object.
    #[error(
        "invalid cert entry: entry size {entry_size} with name size {name_size}, {available} bytes available"
    )]
    InvalidCertEntry {
        entry_size: usize,
        name_size: usize,
        available: usize,
    },

    #[error("too many TBS certificates, max {max}")]
    TooManyCerts { max: usize },

    #[error("too many endorsed certificates, max {max}")]
    TooManyEndorsedCerts { max: usize },

    #[error("too many seeds, max {max}")]
    TooManySeeds { max: usize },

    #[error("seed size {size} exceeds max {max}")]
    SeedTooLarge { size: usize, max: usize },

    #[error("personalization blob full: {used} bytes used, {needed} needed, capacity {capacity}")]
    BlobFull {
        used: usize,
        needed: usize,
        capacity: usize,
    },

    #[error("object size {size} does not fit the header size field (max {max})")]
    ObjectTooLarge { size: usize, max: usize },

    #[error("invalid certificate: {0}")]
    InvalidCert(&'static str),

    #[error("required {kind:?} object missing from blob")]
    MissingRequiredObject { kind: ObjectType },

    #[error("device id is all zeros")]
    ZeroDeviceId,
}

/// Result type for personalization blob operations
pub type PersoTlvResult<T> = Result<T, PersoTlvError>;
