// Licensed under the Apache-2.0 license

//! ATE Host Library
//!
//! Host side of DUT personalization: the tester exchanges provisioning
//! records with the DUT over the SPI console and with the backend through
//! caller-provided services.
//!
//! - **perso-tlv**: personalization blob TLV codec
//! - **frames**: console frame chunking, reassembly and response envelope
//! - **commands**: JSON commands understood by the personalization firmware
//! - **transport**: console driver abstraction and the provisioning session
//!
//! ## Architecture Overview
//!
//! ```text
//!     ┌─────────────────┐    ┌─────────────────┐
//!     │ ate-host-       │    │ perso-tlv       │
//!     │ transport       │───►│ (Blob Codec)    │
//!     │ (Session)       │    └─────────────────┘
//!     └─────────────────┘             ▲
//!              │                      │
//!              ▼                      │
//!     ┌─────────────────┐    ┌─────────────────┐
//!     │ ate-host-       │───►│ ate-host-       │
//!     │ commands (JSON) │    │ frames          │
//!     └─────────────────┘    └─────────────────┘
//!              │
//!     ┌─────────────────┐
//!     │ ConsoleDriver   │  SPI console, simulator, ...
//!     └─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ate_host::{ConsoleConfig, DutConsole, PersoSession, Unpacker};
//!
//! let mut driver = SpiConsoleDriver::new(/* ... */);
//! let console = DutConsole::new(&mut driver, ConsoleConfig::default());
//! let mut session = PersoSession::new(console, Unpacker::default());
//!
//! let report = session.endorse_device(&mut backend)?;
//! println!("Device ID: {}", report.device_id);
//! ```

pub use ate_host_commands::{
    device_id_from_json, perso_blob_from_frames, perso_blob_from_json, perso_blob_to_frames,
    perso_blob_to_json, rma_token_from_json, rma_token_to_json, CaSubjectKeys, Tokens,
};
pub use ate_host_frames::{
    chunk, parse_console_response, reassemble, trim_to_json, Frame, SPI_CONSOLE_FRAME_SIZE,
};
pub use ate_host_transport::{
    ConsoleConfig, ConsoleDriver, DutConsole, EndorsementService, KeyDerivation, PersoSession,
    ProvisioningReport, SyncMessages,
};
pub use perso_tlv::{
    pack_certs, unpack, DeviceId, EndorsedCert, KeyLabel, PersoBlob, PersoRecords,
    TbsCertRequest, UnpackLimits, UnpackPolicy, Unpacker, WasSignature,
};

// Re-export error types
pub use ate_host_commands::CommandError;
pub use ate_host_frames::FrameError;
pub use ate_host_transport::{ConsoleError, ServiceError, SessionError, TransportError};
pub use perso_tlv::PersoTlvError;
