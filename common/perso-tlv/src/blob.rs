// Licensed under the Apache-2.0 license

use crate::error::{PersoTlvError, PersoTlvResult};
use crate::header::{
    CertHeader, ObjectHeader, ObjectType, CERT_HEADER_SIZE, MAX_NAME_SIZE, MAX_OBJECT_SIZE,
    OBJECT_HEADER_SIZE,
};
use crate::records::{DeviceId, PersoFwHash, Seed, WasSignature};
use crate::walker::ObjectWalker;

/// Capacity of a personalization blob body.
pub const PERSO_BLOB_MAX_SIZE: usize = 8192;

/// A personalization blob: a fixed-capacity buffer holding whole TLV objects
/// in `body[..next_free]`.
///
/// All `push_*` methods append. They check capacity and field widths before
/// writing, so a failed push leaves the blob untouched.
#[derive(Clone, PartialEq, Eq)]
pub struct PersoBlob {
    /// Number of objects in the blob. Informational only.
    pub num_objects: usize,
    /// Bytes used in `body`.
    pub next_free: usize,
    pub body: Box<[u8; PERSO_BLOB_MAX_SIZE]>,
}

impl Default for PersoBlob {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for PersoBlob {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PersoBlob")
            .field("num_objects", &self.num_objects)
            .field("next_free", &self.next_free)
            .finish_non_exhaustive()
    }
}

impl PersoBlob {
    pub fn new() -> Self {
        PersoBlob {
            num_objects: 0,
            next_free: 0,
            body: Box::new([0u8; PERSO_BLOB_MAX_SIZE]),
        }
    }

    /// Builds a blob around received bytes, counting the objects they hold.
    pub fn from_bytes(bytes: &[u8]) -> PersoTlvResult<Self> {
        if bytes.is_empty() {
            return Err(PersoTlvError::EmptyBlob);
        }
        let num_objects = ObjectWalker::new(bytes)
            .take_while(|object| object.is_ok())
            .count();
        Self::with_contents(num_objects, bytes)
    }

    /// Builds a blob with an explicit object count. The contents are not
    /// validated beyond the capacity check.
    pub fn with_contents(num_objects: usize, bytes: &[u8]) -> PersoTlvResult<Self> {
        if bytes.len() > PERSO_BLOB_MAX_SIZE {
            return Err(PersoTlvError::BlobTooLarge {
                got: bytes.len(),
                max: PERSO_BLOB_MAX_SIZE,
            });
        }
        let mut blob = Self::new();
        blob.body[..bytes.len()].copy_from_slice(bytes);
        blob.next_free = bytes.len();
        blob.num_objects = num_objects;
        Ok(blob)
    }

    /// The used part of the body.
    pub fn as_bytes(&self) -> &[u8] {
        &self.body[..self.next_free.min(PERSO_BLOB_MAX_SIZE)]
    }

    pub fn is_empty(&self) -> bool {
        self.next_free == 0
    }

    pub fn remaining(&self) -> usize {
        PERSO_BLOB_MAX_SIZE.saturating_sub(self.next_free)
    }

    pub fn objects(&self) -> ObjectWalker<'_> {
        ObjectWalker::new(self.as_bytes())
    }

    fn reserve(&self, obj_size: usize) -> PersoTlvResult<()> {
        if self.next_free + obj_size > PERSO_BLOB_MAX_SIZE {
            log::error!(
                "blob full: {} bytes used, object needs {}",
                self.next_free,
                obj_size
            );
            return Err(PersoTlvError::BlobFull {
                used: self.next_free,
                needed: obj_size,
                capacity: PERSO_BLOB_MAX_SIZE,
            });
        }
        Ok(())
    }

    fn check_object_size(obj_size: usize) -> PersoTlvResult<()> {
        if obj_size > MAX_OBJECT_SIZE {
            log::error!("object size {} does not fit the header", obj_size);
            return Err(PersoTlvError::ObjectTooLarge {
                size: obj_size,
                max: MAX_OBJECT_SIZE,
            });
        }
        Ok(())
    }

    /// Writes `parts` back to back at the cursor as one object. Callers have
    /// already checked that the object fits.
    fn write_object(&mut self, obj_type: ObjectType, parts: &[&[u8]]) -> PersoTlvResult<()> {
        let obj_size = OBJECT_HEADER_SIZE + parts.iter().map(|p| p.len()).sum::<usize>();
        let full = PersoTlvError::BlobFull {
            used: self.next_free,
            needed: obj_size,
            capacity: PERSO_BLOB_MAX_SIZE,
        };
        let mut cursor = self.next_free;
        ObjectHeader::new(obj_size as u16, obj_type)
            .write_to(&mut self.body[cursor..])
            .ok_or_else(|| full.clone())?;
        cursor += OBJECT_HEADER_SIZE;
        for part in parts {
            let dst = self
                .body
                .get_mut(cursor..cursor + part.len())
                .ok_or_else(|| full.clone())?;
            dst.copy_from_slice(part);
            cursor += part.len();
        }
        log::debug!(
            "packed {:?} object of {} bytes at offset {}",
            obj_type,
            obj_size,
            self.next_free
        );
        self.next_free = cursor;
        self.num_objects += 1;
        Ok(())
    }

    /// Appends one object whose body is `body`.
    pub fn push_object(&mut self, obj_type: ObjectType, body: &[u8]) -> PersoTlvResult<()> {
        let obj_size = OBJECT_HEADER_SIZE + body.len();
        self.reserve(obj_size)?;
        Self::check_object_size(obj_size)?;
        self.write_object(obj_type, &[body])
    }

    /// Appends a certificate entry object (`X509Tbs` or `X509Cert`).
    pub fn push_cert_entry(
        &mut self,
        obj_type: ObjectType,
        label: &[u8],
        body: &[u8],
    ) -> PersoTlvResult<()> {
        let entry_size = CERT_HEADER_SIZE + label.len() + body.len();
        let obj_size = OBJECT_HEADER_SIZE + entry_size;
        self.reserve(obj_size)?;
        if body.is_empty() {
            log::error!("refusing to pack an empty certificate");
            return Err(PersoTlvError::InvalidCert("empty certificate body"));
        }
        if label.len() > MAX_NAME_SIZE {
            log::error!("key label of {} bytes is too long", label.len());
            return Err(PersoTlvError::InvalidCert("key label longer than 15 bytes"));
        }
        Self::check_object_size(obj_size)?;

        let mut sub_header = [0u8; CERT_HEADER_SIZE];
        CertHeader::new(entry_size as u16, label.len() as u8)
            .write_to(&mut sub_header)
            .ok_or(PersoTlvError::InvalidCert("cert sub-header"))?;
        self.write_object(obj_type, &[&sub_header, label, body])
    }

    pub fn push_device_id(&mut self, device_id: &DeviceId) -> PersoTlvResult<()> {
        self.push_object(ObjectType::DeviceId, &device_id.0)
    }

    pub fn push_signature(&mut self, signature: &WasSignature) -> PersoTlvResult<()> {
        self.push_object(ObjectType::WasTbsHmac, &signature.0)
    }

    pub fn push_perso_hash(&mut self, hash: &PersoFwHash) -> PersoTlvResult<()> {
        self.push_object(ObjectType::PersoSha256Hash, &hash.0)
    }

    pub fn push_seed(&mut self, seed: &Seed) -> PersoTlvResult<()> {
        self.push_object(seed.kind.object_type(), &seed.bytes)
    }
}
