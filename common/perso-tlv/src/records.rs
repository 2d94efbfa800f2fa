// Licensed under the Apache-2.0 license

//! Typed records carried inside a personalization blob.

use crate::error::{PersoTlvError, PersoTlvResult};
use crate::header::{ObjectType, MAX_NAME_SIZE};
use core::fmt;

/// Size of the device identifier object body.
pub const DEVICE_ID_SIZE: usize = 32;

/// Size of the WAS HMAC computed over the TBS certificates.
pub const WAS_HMAC_SIZE: usize = 32;

/// Size of the personalization firmware SHA-256 measurement.
pub const PERSO_SHA256_HASH_SIZE: usize = 32;

/// Default cap on a single seed body.
pub const SEED_MAX_SIZE: usize = 64;

/// Fixed-capacity, NUL-padded key label.
///
/// The wire form is not NUL-terminated; the label length travels in the
/// certificate sub-header instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyLabel {
    buf: [u8; MAX_NAME_SIZE + 1],
    len: u8,
}

impl KeyLabel {
    pub fn new(label: &[u8]) -> PersoTlvResult<Self> {
        if label.len() > MAX_NAME_SIZE {
            return Err(PersoTlvError::InvalidCert("key label longer than 15 bytes"));
        }
        let mut buf = [0u8; MAX_NAME_SIZE + 1];
        buf[..label.len()].copy_from_slice(label);
        Ok(KeyLabel {
            buf,
            len: label.len() as u8,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }

    /// The label as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.as_bytes()).ok()
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl TryFrom<&str> for KeyLabel {
    type Error = PersoTlvError;

    fn try_from(label: &str) -> PersoTlvResult<Self> {
        KeyLabel::new(label.as_bytes())
    }
}

impl fmt::Debug for KeyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "KeyLabel({s:?})"),
            None => write!(f, "KeyLabel({:02x?})", self.as_bytes()),
        }
    }
}

impl fmt::Display for KeyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => f.write_str(s),
            None => write!(f, "{:02x?}", self.as_bytes()),
        }
    }
}

/// Device identifier exported by the DUT.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceId(pub [u8; DEVICE_ID_SIZE]);

impl DeviceId {
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// The identifier as eight little-endian 32-bit words.
    pub fn words(&self) -> [u32; DEVICE_ID_SIZE / 4] {
        let mut words = [0u32; DEVICE_ID_SIZE / 4];
        for (word, chunk) in words.iter_mut().zip(self.0.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        words
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({self})")
    }
}

/// Most significant word first, as the provisioning logs print it.
impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for word in self.words().iter().rev() {
            write!(f, "{word:08x}")?;
        }
        Ok(())
    }
}

/// WAS HMAC over the TBS certificates, used by the backend to authenticate
/// the endorsement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WasSignature(pub [u8; WAS_HMAC_SIZE]);

/// SHA-256 of the personalization firmware that produced the blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersoFwHash(pub [u8; PERSO_SHA256_HASH_SIZE]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashType {
    #[default]
    Sha256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveType {
    #[default]
    P256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureEncoding {
    #[default]
    Der,
}

/// A to-be-signed certificate awaiting endorsement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TbsCertRequest {
    pub label: KeyLabel,
    pub tbs: Vec<u8>,
    pub hash_type: HashType,
    pub curve_type: CurveType,
    pub signature_encoding: SignatureEncoding,
}

impl TbsCertRequest {
    pub fn new(label: KeyLabel, tbs: Vec<u8>) -> Self {
        TbsCertRequest {
            label,
            tbs,
            hash_type: HashType::default(),
            curve_type: CurveType::default(),
            signature_encoding: SignatureEncoding::default(),
        }
    }
}

/// An endorsed certificate returned by the signing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndorsedCert {
    pub label: KeyLabel,
    pub cert: Vec<u8>,
}

impl EndorsedCert {
    pub fn new(label: KeyLabel, cert: Vec<u8>) -> Self {
        EndorsedCert { label, cert }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedKind {
    Dev,
    Generic,
}

impl SeedKind {
    pub fn object_type(&self) -> ObjectType {
        match self {
            SeedKind::Dev => ObjectType::DevSeed,
            SeedKind::Generic => ObjectType::GenericSeed,
        }
    }
}

/// Wrapped seed material exported by the DUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub kind: SeedKind,
    pub bytes: Vec<u8>,
}
