// Licensed under the Apache-2.0 license

//! ATE Host Transport Layer
//!
//! Console transport to the DUT and the personalization session built on
//! top of it. External services (endorsement, key derivation) and the
//! physical console link are traits implemented by the caller.

pub mod console;
pub mod error;
pub mod services;
pub mod session;

pub use console::{ConsoleConfig, ConsoleDriver, DutConsole};
pub use error::{
    ConsoleError, ServiceError, SessionError, SessionResult, TransportError, TransportResult,
};
pub use services::{EndorsementService, KeyDerivation};
pub use session::{
    PersoSession, ProvisioningReport, SyncMessages, TEST_TOKEN_SEED_LABEL, WAS_SEED_LABEL,
};
