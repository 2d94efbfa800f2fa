// Licensed under the Apache-2.0 license

//! Object and certificate headers.
//!
//! Both headers are a single 16-bit word with a 12-bit size in the low bits
//! and a 4-bit discriminant in the high bits. On the wire the word is always
//! big-endian; [`WireWord`] is the only place that knows about byte order.

use bitfield::bitfield;
use core::convert::TryFrom;
use zerocopy::byteorder::big_endian::U16 as WireWord;
use zerocopy::{FromBytes, IntoBytes};

/// Size of an object header on the wire.
pub const OBJECT_HEADER_SIZE: usize = core::mem::size_of::<WireWord>();

/// Size of a certificate sub-header on the wire.
pub const CERT_HEADER_SIZE: usize = core::mem::size_of::<WireWord>();

/// Largest value the 12-bit size fields can hold.
pub const MAX_OBJECT_SIZE: usize = 0x0fff;

/// Largest key label the 4-bit name size field can describe.
pub const MAX_NAME_SIZE: usize = 0x0f;

/// Personalization object types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ObjectType {
    X509Tbs = 0,
    X509Cert = 1,
    DevSeed = 2,
    CwtCert = 3,
    WasTbsHmac = 4,
    DeviceId = 5,
    GenericSeed = 6,
    PersoSha256Hash = 7,
}

impl TryFrom<u8> for ObjectType {
    /// The unrecognized raw value.
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(ObjectType::X509Tbs),
            1 => Ok(ObjectType::X509Cert),
            2 => Ok(ObjectType::DevSeed),
            3 => Ok(ObjectType::CwtCert),
            4 => Ok(ObjectType::WasTbsHmac),
            5 => Ok(ObjectType::DeviceId),
            6 => Ok(ObjectType::GenericSeed),
            7 => Ok(ObjectType::PersoSha256Hash),
            other => Err(other),
        }
    }
}

impl From<ObjectType> for u8 {
    fn from(obj_type: ObjectType) -> Self {
        obj_type as u8
    }
}

bitfield! {
    /// Object header word.
    /// Bits 15:12: Object type
    /// Bits 11:0: Object size, header included
    #[derive(Copy, Clone, PartialEq, Eq, Default)]
    pub struct ObjectHeaderBits(u16);
    impl Debug;
    pub u16, obj_type, set_obj_type: 15, 12;
    pub u16, size, set_size: 11, 0;
}

bitfield! {
    /// Certificate sub-header word.
    /// Bits 15:12: Key label length
    /// Bits 11:0: Entry size (sub-header + label + body)
    #[derive(Copy, Clone, PartialEq, Eq, Default)]
    pub struct CertHeaderBits(u16);
    impl Debug;
    pub u16, name_size, set_name_size: 15, 12;
    pub u16, size, set_size: 11, 0;
}

/// Decoded object header.
///
/// `obj_type` keeps the raw 4-bit value so that types this crate does not
/// know about can still be walked over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHeader {
    pub size: u16,
    pub obj_type: u8,
}

impl ObjectHeader {
    pub fn new(size: u16, obj_type: ObjectType) -> Self {
        ObjectHeader {
            size,
            obj_type: obj_type.into(),
        }
    }

    /// The typed object kind, or `None` for a value outside the known set.
    pub fn object_type(&self) -> Option<ObjectType> {
        ObjectType::try_from(self.obj_type).ok()
    }

    /// Number of body bytes following the header.
    pub fn body_size(&self) -> usize {
        (self.size as usize).saturating_sub(OBJECT_HEADER_SIZE)
    }

    /// Pack into the logical (host order) header word.
    pub fn to_word(&self) -> u16 {
        let mut bits = ObjectHeaderBits(0);
        bits.set_size(self.size);
        bits.set_obj_type(self.obj_type as u16);
        bits.0
    }

    pub fn from_word(word: u16) -> Self {
        let bits = ObjectHeaderBits(word);
        ObjectHeader {
            size: bits.size(),
            obj_type: bits.obj_type() as u8,
        }
    }

    /// Reads a header from the start of `buf`, or `None` if fewer than
    /// [`OBJECT_HEADER_SIZE`] bytes are available.
    pub fn read_from(buf: &[u8]) -> Option<Self> {
        let (word, _) = WireWord::read_from_prefix(buf).ok()?;
        Some(Self::from_word(word.get()))
    }

    /// Writes the big-endian header to the start of `buf`.
    pub fn write_to(&self, buf: &mut [u8]) -> Option<()> {
        WireWord::new(self.to_word()).write_to_prefix(buf).ok()
    }

    pub fn to_bytes(&self) -> [u8; OBJECT_HEADER_SIZE] {
        let mut bytes = [0u8; OBJECT_HEADER_SIZE];
        bytes.copy_from_slice(WireWord::new(self.to_word()).as_bytes());
        bytes
    }
}

/// Decoded certificate sub-header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertHeader {
    pub size: u16,
    pub name_size: u8,
}

impl CertHeader {
    pub fn new(size: u16, name_size: u8) -> Self {
        CertHeader { size, name_size }
    }

    pub fn to_word(&self) -> u16 {
        let mut bits = CertHeaderBits(0);
        bits.set_size(self.size);
        bits.set_name_size(self.name_size as u16);
        bits.0
    }

    pub fn from_word(word: u16) -> Self {
        let bits = CertHeaderBits(word);
        CertHeader {
            size: bits.size(),
            name_size: bits.name_size() as u8,
        }
    }

    pub fn read_from(buf: &[u8]) -> Option<Self> {
        let (word, _) = WireWord::read_from_prefix(buf).ok()?;
        Some(Self::from_word(word.get()))
    }

    pub fn write_to(&self, buf: &mut [u8]) -> Option<()> {
        WireWord::new(self.to_word()).write_to_prefix(buf).ok()
    }
}

/// Packs an object header word. Fields wider than their slot are truncated.
pub fn encode_object_header(size: u16, obj_type: u8) -> u16 {
    ObjectHeader { size, obj_type }.to_word()
}

/// Splits an object header word into `(size, type)`.
pub fn decode_object_header(word: u16) -> (u16, u8) {
    let hdr = ObjectHeader::from_word(word);
    (hdr.size, hdr.obj_type)
}

/// Packs a certificate sub-header word.
pub fn encode_cert_header(size: u16, name_size: u8) -> u16 {
    CertHeader { size, name_size }.to_word()
}

/// Splits a certificate sub-header word into `(size, name_size)`.
pub fn decode_cert_header(word: u16) -> (u16, u8) {
    let hdr = CertHeader::from_word(word);
    (hdr.size, hdr.name_size)
}
