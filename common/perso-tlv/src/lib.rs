// Licensed under the Apache-2.0 license

//! Personalization blob codec
//!
//! The personalization blob is the record set a DUT exports during FT
//! provisioning, and the envelope the tester uses to hand endorsed
//! certificates back. It is a flat buffer of TLV objects:
//!
//! ```text
//!  object header (16-bit, big-endian)
//!  ┌──────────┬───────────────────┐
//!  │ type [4] │ size [12]         │  size includes the header
//!  └──────────┴───────────────────┘
//!  X509Tbs / X509Cert bodies start with a certificate sub-header
//!  ┌──────────┬───────────────────┬────────────┬──────────────┐
//!  │ name [4] │ entry size [12]   │ key label  │ cert / TBS   │
//!  └──────────┴───────────────────┴────────────┴──────────────┘
//! ```
//!
//! - **header**: header word packing and the [`ObjectType`] set
//! - **walker**: bounds-checked iteration over objects
//! - **unpack**: typed record extraction with configurable limits and policy
//! - **pack** / **blob**: append-only construction of blobs

pub mod blob;
pub mod error;
pub mod header;
pub mod pack;
pub mod records;
pub mod unpack;
pub mod walker;

pub use blob::{PersoBlob, PERSO_BLOB_MAX_SIZE};
pub use error::{PersoTlvError, PersoTlvResult};
pub use header::{
    decode_cert_header, decode_object_header, encode_cert_header, encode_object_header,
    CertHeader, ObjectHeader, ObjectType, CERT_HEADER_SIZE, MAX_NAME_SIZE, MAX_OBJECT_SIZE,
    OBJECT_HEADER_SIZE,
};
pub use pack::{pack, pack_certs};
pub use records::{
    CurveType, DeviceId, EndorsedCert, HashType, KeyLabel, PersoFwHash, Seed, SeedKind,
    SignatureEncoding, TbsCertRequest, WasSignature, DEVICE_ID_SIZE, PERSO_SHA256_HASH_SIZE,
    SEED_MAX_SIZE, WAS_HMAC_SIZE,
};
pub use unpack::{unpack, unpack_bytes, PersoRecords, UnpackLimits, UnpackPolicy, Unpacker};
pub use walker::{walk, ObjectWalker, PersoObject};
