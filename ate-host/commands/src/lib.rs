// Licensed under the Apache-2.0 license

//! DUT console commands
//!
//! Encoders and decoders for the JSON documents exchanged with the
//! personalization firmware over the SPI console:
//!
//! - **tokens**: CP secrets, the device id report and CA subject key ids
//! - **rma**: the RMA token hash with its trailing CRC object
//! - **perso_blob**: the personalization blob, carried across several frames

pub mod error;
pub mod json;
pub mod perso_blob;
pub mod rma;
pub mod tokens;

pub use error::{CommandError, CommandResult};
pub use json::{command_frame, encode_command, parse_command};
pub use perso_blob::{
    perso_blob_from_frames, perso_blob_from_json, perso_blob_to_frames, perso_blob_to_json,
};
pub use rma::{rma_token_from_json, rma_token_to_json, RMA_TOKEN_SIZE};
pub use tokens::{
    device_id_from_json, device_id_to_json, CaSubjectKeys, Tokens, CA_SUBJECT_KEY_SIZE,
    TOKEN_HASH_SIZE, WAS_SIZE,
};
