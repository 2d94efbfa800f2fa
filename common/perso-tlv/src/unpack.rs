// Licensed under the Apache-2.0 license

//! Extracts typed records from a personalization blob.

use crate::blob::{PersoBlob, PERSO_BLOB_MAX_SIZE};
use crate::error::{PersoTlvError, PersoTlvResult};
use crate::header::{CertHeader, ObjectType, CERT_HEADER_SIZE, OBJECT_HEADER_SIZE};
use crate::records::{
    DeviceId, EndorsedCert, KeyLabel, PersoFwHash, Seed, SeedKind, TbsCertRequest, WasSignature,
    DEVICE_ID_SIZE, PERSO_SHA256_HASH_SIZE, SEED_MAX_SIZE, WAS_HMAC_SIZE,
};
use crate::walker::{ObjectWalker, PersoObject};

/// Caps on the number and size of records collected from one blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackLimits {
    pub max_tbs_certs: usize,
    pub max_certs: usize,
    pub max_seeds: usize,
    pub seed_max_size: usize,
}

impl Default for UnpackLimits {
    fn default() -> Self {
        UnpackLimits {
            max_tbs_certs: 10,
            max_certs: 10,
            max_seeds: 10,
            seed_max_size: SEED_MAX_SIZE,
        }
    }
}

/// Checks applied once the whole blob has been walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackPolicy {
    pub require_signature: bool,
    pub require_tbs_cert: bool,
    pub reject_zero_device_id: bool,
}

impl Default for UnpackPolicy {
    fn default() -> Self {
        UnpackPolicy {
            require_signature: true,
            require_tbs_cert: true,
            reject_zero_device_id: true,
        }
    }
}

impl UnpackPolicy {
    /// Accepts any blob that walks cleanly, e.g. one carrying only seeds.
    pub fn lenient() -> Self {
        UnpackPolicy {
            require_signature: false,
            require_tbs_cert: false,
            reject_zero_device_id: false,
        }
    }
}

/// Records found in a blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersoRecords {
    /// All zeros when the blob carries no `DeviceId` object.
    pub device_id: DeviceId,
    pub signature: Option<WasSignature>,
    pub perso_fw_hash: Option<PersoFwHash>,
    pub tbs_certs: Vec<TbsCertRequest>,
    pub certs: Vec<EndorsedCert>,
    pub seeds: Vec<Seed>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unpacker {
    pub limits: UnpackLimits,
    pub policy: UnpackPolicy,
}

impl Unpacker {
    pub fn new(limits: UnpackLimits, policy: UnpackPolicy) -> Self {
        Unpacker { limits, policy }
    }

    pub fn unpack(&self, blob: &PersoBlob) -> PersoTlvResult<PersoRecords> {
        check_blob_size(blob.next_free)?;
        self.unpack_objects(&blob.body[..blob.next_free])
    }

    /// Unpacks a blob received as a single buffer.
    pub fn unpack_bytes(&self, bytes: &[u8]) -> PersoTlvResult<PersoRecords> {
        check_blob_size(bytes.len())?;
        self.unpack_objects(bytes)
    }

    fn unpack_objects(&self, bytes: &[u8]) -> PersoTlvResult<PersoRecords> {
        let mut records = PersoRecords::default();
        for object in ObjectWalker::new(bytes) {
            self.extract(&mut records, &object?)?;
        }
        self.check_policy(&records)?;
        log::debug!(
            "unpacked device {}: {} tbs, {} certs, {} seeds",
            records.device_id,
            records.tbs_certs.len(),
            records.certs.len(),
            records.seeds.len()
        );
        Ok(records)
    }

    fn extract(&self, records: &mut PersoRecords, object: &PersoObject) -> PersoTlvResult<()> {
        let Some(obj_type) = object.header.object_type() else {
            log::warn!(
                "skipping object of unknown type {} at offset {}",
                object.header.obj_type,
                object.offset
            );
            return Ok(());
        };
        log::debug!(
            "{:?} object of {} bytes at offset {}",
            obj_type,
            object.header.size,
            object.offset
        );

        match obj_type {
            ObjectType::DeviceId => {
                // A later DeviceId replaces an earlier one.
                let body = fixed_body::<DEVICE_ID_SIZE>(obj_type, object)?;
                records.device_id = DeviceId(body);
            }
            ObjectType::WasTbsHmac => {
                let body = fixed_body::<WAS_HMAC_SIZE>(obj_type, object)?;
                records.signature = Some(WasSignature(body));
            }
            ObjectType::PersoSha256Hash => {
                let body = fixed_body::<PERSO_SHA256_HASH_SIZE>(obj_type, object)?;
                records.perso_fw_hash = Some(PersoFwHash(body));
            }
            ObjectType::X509Tbs => {
                if records.tbs_certs.len() >= self.limits.max_tbs_certs {
                    log::error!("more than {} TBS certificates", self.limits.max_tbs_certs);
                    return Err(PersoTlvError::TooManyCerts {
                        max: self.limits.max_tbs_certs,
                    });
                }
                let (label, tbs) = cert_entry(object.body())?;
                records
                    .tbs_certs
                    .push(TbsCertRequest::new(label, tbs.to_vec()));
            }
            ObjectType::X509Cert => {
                if records.certs.len() >= self.limits.max_certs {
                    log::error!("more than {} endorsed certificates", self.limits.max_certs);
                    return Err(PersoTlvError::TooManyEndorsedCerts {
                        max: self.limits.max_certs,
                    });
                }
                let (label, cert) = cert_entry(object.body())?;
                records.certs.push(EndorsedCert::new(label, cert.to_vec()));
            }
            ObjectType::DevSeed | ObjectType::GenericSeed => {
                let size = object.header.body_size();
                if size > self.limits.seed_max_size {
                    log::error!("seed of {} bytes exceeds {}", size, self.limits.seed_max_size);
                    return Err(PersoTlvError::SeedTooLarge {
                        size,
                        max: self.limits.seed_max_size,
                    });
                }
                if records.seeds.len() >= self.limits.max_seeds {
                    log::error!("more than {} seeds", self.limits.max_seeds);
                    return Err(PersoTlvError::TooManySeeds {
                        max: self.limits.max_seeds,
                    });
                }
                let kind = if obj_type == ObjectType::DevSeed {
                    SeedKind::Dev
                } else {
                    SeedKind::Generic
                };
                records.seeds.push(Seed {
                    kind,
                    bytes: object.body().to_vec(),
                });
            }
            ObjectType::CwtCert => {
                log::debug!("ignoring CWT certificate at offset {}", object.offset);
            }
        }
        Ok(())
    }

    fn check_policy(&self, records: &PersoRecords) -> PersoTlvResult<()> {
        if self.policy.require_signature && records.signature.is_none() {
            log::error!("blob carries no WAS HMAC");
            return Err(PersoTlvError::MissingRequiredObject {
                kind: ObjectType::WasTbsHmac,
            });
        }
        if self.policy.require_tbs_cert && records.tbs_certs.is_empty() {
            log::error!("blob carries no TBS certificate");
            return Err(PersoTlvError::MissingRequiredObject {
                kind: ObjectType::X509Tbs,
            });
        }
        if self.policy.reject_zero_device_id && records.device_id.is_zero() {
            log::error!("device id is all zeros");
            return Err(PersoTlvError::ZeroDeviceId);
        }
        Ok(())
    }
}

fn check_blob_size(len: usize) -> PersoTlvResult<()> {
    if len == 0 {
        log::error!("personalization blob is empty");
        return Err(PersoTlvError::EmptyBlob);
    }
    if len > PERSO_BLOB_MAX_SIZE {
        log::error!("blob of {} bytes exceeds {}", len, PERSO_BLOB_MAX_SIZE);
        return Err(PersoTlvError::BlobTooLarge {
            got: len,
            max: PERSO_BLOB_MAX_SIZE,
        });
    }
    Ok(())
}

fn fixed_body<const N: usize>(
    obj_type: ObjectType,
    object: &PersoObject,
) -> PersoTlvResult<[u8; N]> {
    let want = N + OBJECT_HEADER_SIZE;
    let got = object.header.size as usize;
    if got != want {
        log::error!("{:?} object is {} bytes, want {}", obj_type, got, want);
        return Err(PersoTlvError::UnexpectedObjectSize {
            obj_type,
            got,
            want,
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(object.body());
    Ok(out)
}

/// Splits a certificate entry into its label and body.
fn cert_entry(body: &[u8]) -> PersoTlvResult<(KeyLabel, &[u8])> {
    let header = CertHeader::read_from(body).ok_or(PersoTlvError::InvalidCertEntry {
        entry_size: 0,
        name_size: 0,
        available: body.len(),
    })?;
    let entry_size = header.size as usize;
    let name_size = header.name_size as usize;
    if entry_size < CERT_HEADER_SIZE + name_size || entry_size > body.len() {
        log::error!(
            "cert entry of {} bytes (name {}) in {} available",
            entry_size,
            name_size,
            body.len()
        );
        return Err(PersoTlvError::InvalidCertEntry {
            entry_size,
            name_size,
            available: body.len(),
        });
    }
    let name_end = CERT_HEADER_SIZE + name_size;
    let label = KeyLabel::new(&body[CERT_HEADER_SIZE..name_end])?;
    Ok((label, &body[name_end..entry_size]))
}

/// Unpacks `blob` with the default limits and the strict policy.
pub fn unpack(blob: &PersoBlob) -> PersoTlvResult<PersoRecords> {
    Unpacker::default().unpack(blob)
}

/// Unpacks a raw buffer with the default limits and the strict policy.
pub fn unpack_bytes(bytes: &[u8]) -> PersoTlvResult<PersoRecords> {
    Unpacker::default().unpack_bytes(bytes)
}
