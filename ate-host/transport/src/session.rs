// Licensed under the Apache-2.0 license

//! Personalization session
//!
//! Drives the CP and FT provisioning exchanges with one DUT:
//!
//! ```text
//!  CP:  derive tokens ──► TokensJson ──► DUT ──► DeviceIdJson ──► device id
//!  FT:  RMA token + CA key ids ──► DUT
//!       DUT ──► PersoBlobJson ──► unpack ──► endorse ──► pack ──► DUT
//! ```
//!
//! Every step runs once. A failed step is returned to the caller, which
//! decides whether to retry the device.

use crate::console::DutConsole;
use crate::error::{SessionError, SessionResult};
use crate::services::{EndorsementService, KeyDerivation};
use ate_host_commands::{
    device_id_from_json, perso_blob_from_json, perso_blob_to_frames, rma_token_to_json,
    CaSubjectKeys, Tokens, TOKEN_HASH_SIZE, WAS_SIZE,
};
use perso_tlv::{pack_certs, DeviceId, PersoBlob, PersoFwHash, Unpacker};

/// Seed the wafer authentication secret is derived from.
pub const WAS_SEED_LABEL: &str = "token_seed_security_high";

/// Seed the test unlock and test exit tokens are derived from.
pub const TEST_TOKEN_SEED_LABEL: &str = "token_seed_security_low";

/// Console lines the DUT prints before each exchange. `None` skips the wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncMessages {
    pub cp_tokens: Option<String>,
    pub cp_device_id: Option<String>,
    pub ft_rma_token: Option<String>,
    pub ft_ca_keys: Option<String>,
    pub ft_perso_blob: Option<String>,
}

impl Default for SyncMessages {
    fn default() -> Self {
        Self {
            cp_tokens: Some("Waiting for CP provisioning data ...".to_string()),
            cp_device_id: Some("Exporting CP device ID ...".to_string()),
            ft_rma_token: None,
            ft_ca_keys: None,
            ft_perso_blob: None,
        }
    }
}

/// Outcome of the FT endorsement exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningReport {
    pub device_id: DeviceId,
    pub perso_fw_hash: Option<PersoFwHash>,
    pub tbs_certs: usize,
    pub endorsed_certs: usize,
    pub seeds: usize,
    /// Frames used to return the endorsed certificates.
    pub frames_sent: usize,
}

pub struct PersoSession<'a> {
    console: DutConsole<'a>,
    unpacker: Unpacker,
    sync: SyncMessages,
}

impl<'a> PersoSession<'a> {
    pub fn new(console: DutConsole<'a>, unpacker: Unpacker) -> Self {
        Self {
            console,
            unpacker,
            sync: SyncMessages::default(),
        }
    }

    pub fn with_sync_messages(mut self, sync: SyncMessages) -> Self {
        self.sync = sync;
        self
    }

    /// Derives the CP tokens and injects them into the DUT.
    pub fn inject_cp_tokens(&mut self, kdf: &mut dyn KeyDerivation) -> SessionResult<Tokens> {
        let was = kdf.derive(WAS_SEED_LABEL, b"was", WAS_SIZE)?;
        let test_unlock = kdf.derive(TEST_TOKEN_SEED_LABEL, b"test_unlock", TOKEN_HASH_SIZE)?;
        let test_exit = kdf.derive(TEST_TOKEN_SEED_LABEL, b"test_exit", TOKEN_HASH_SIZE)?;
        let tokens = Tokens::from_slices(&was, &test_unlock, &test_exit)?;

        let json = tokens.to_json()?;
        self.console
            .send_command(self.sync.cp_tokens.as_deref(), json.as_bytes())?;
        log::info!("CP tokens injected");
        Ok(tokens)
    }

    /// Reads the device id the DUT exports at the end of CP.
    pub fn read_cp_device_id(&mut self) -> SessionResult<DeviceId> {
        let body = self
            .console
            .receive_response(self.sync.cp_device_id.as_deref())?;
        let device_id = device_id_from_json(&body)?;
        log::info!("CP Device ID: {}", device_id);
        Ok(device_id)
    }

    /// Sends the RMA token hash and the CA subject key ids for FT.
    pub fn send_ft_inputs(
        &mut self,
        rma_token: &[u8],
        ca_keys: &CaSubjectKeys,
    ) -> SessionResult<()> {
        let rma = rma_token_to_json(rma_token, false)?;
        self.console
            .send_command(self.sync.ft_rma_token.as_deref(), rma.as_bytes())?;

        let keys = ca_keys.to_json()?;
        self.console
            .send_command(self.sync.ft_ca_keys.as_deref(), keys.as_bytes())?;
        Ok(())
    }

    /// Receives the perso blob, has its TBS certificates endorsed and sends
    /// the certificates back.
    pub fn endorse_device(
        &mut self,
        endorser: &mut dyn EndorsementService,
    ) -> SessionResult<ProvisioningReport> {
        let body = self
            .console
            .receive_response(self.sync.ft_perso_blob.as_deref())?;
        let blob = perso_blob_from_json(&body)?;
        let records = self.unpacker.unpack(&blob)?;
        log::info!("Device ID: {}", records.device_id);
        log::info!("Number of TBS certs to endorse: {}", records.tbs_certs.len());

        let signature = records.signature.ok_or_else(|| {
            log::error!("cannot endorse without a WAS HMAC");
            SessionError::MissingSignature
        })?;
        let certs = endorser.endorse(&signature, &records.tbs_certs)?;

        let mut frames_sent = 0;
        if certs.is_empty() {
            log::warn!("no certificates to return to the DUT");
        } else {
            let mut response = PersoBlob::new();
            pack_certs(&mut response, &certs)?;
            let config = self.console.config().clone();
            let frames =
                perso_blob_to_frames(&response, config.frame_capacity, config.max_frames)?;
            self.console.send_frames(&frames)?;
            frames_sent = frames.len();
        }

        Ok(ProvisioningReport {
            device_id: records.device_id,
            perso_fw_hash: records.perso_fw_hash,
            tbs_certs: records.tbs_certs.len(),
            endorsed_certs: certs.len(),
            seeds: records.seeds.len(),
            frames_sent,
        })
    }
}
