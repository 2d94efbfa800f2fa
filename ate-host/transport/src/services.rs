// Licensed under the Apache-2.0 license

//! Provisioning services consumed by the ATE host
//!
//! The backend appliance and its HSM stay behind these traits. The session
//! only moves opaque bytes between them and the DUT.

use crate::error::ServiceError;
use perso_tlv::{EndorsedCert, TbsCertRequest, WasSignature};

/// Signs TBS certificates on behalf of the device.
pub trait EndorsementService {
    /// `signature` is the DUT's WAS HMAC over `requests`. One certificate is
    /// returned per request, with the request's label.
    fn endorse(
        &mut self,
        signature: &WasSignature,
        requests: &[TbsCertRequest],
    ) -> Result<Vec<EndorsedCert>, ServiceError>;
}

/// Derives token material from a provisioning seed.
pub trait KeyDerivation {
    fn derive(
        &mut self,
        seed_label: &str,
        diversifier: &[u8],
        size: usize,
    ) -> Result<Vec<u8>, ServiceError>;
}
