// Licensed under the Apache-2.0 license

//! Serializes endorsed certificates back into a personalization blob.

use crate::blob::PersoBlob;
use crate::error::PersoTlvResult;
use crate::header::ObjectType;
use crate::records::EndorsedCert;

/// Appends one `X509Cert` object per `(label, certificate)` pair.
///
/// Packing stops at the first failing entry. Entries before it stay in the
/// blob, which remains a valid concatenation of whole objects.
pub fn pack<'a, I>(blob: &mut PersoBlob, certs: I) -> PersoTlvResult<()>
where
    I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
{
    for (label, cert) in certs {
        blob.push_cert_entry(ObjectType::X509Cert, label, cert)?;
    }
    Ok(())
}

/// Packs endorsed certificates returned by the signing service.
pub fn pack_certs(blob: &mut PersoBlob, certs: &[EndorsedCert]) -> PersoTlvResult<()> {
    pack(
        blob,
        certs
            .iter()
            .map(|cert| (cert.label.as_bytes(), cert.cert.as_slice())),
    )?;
    log::debug!(
        "packed {} endorsed certificates, blob now {} bytes",
        certs.len(),
        blob.next_free
    );
    Ok(())
}
