// Licensed under the Apache-2.0 license

//! JSON schemas of the DUT console commands
//!
//! Field names match the personalization firmware. Missing fields decode as
//! empty arrays or zero and unknown fields are ignored.

use crate::error::CommandResult;
use ate_host_frames::{trim_to_json, Frame};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokensJson {
    pub wafer_auth_secret: Vec<u32>,
    #[serde(deserialize_with = "de_u64_array")]
    pub test_unlock_token_hash: Vec<u64>,
    #[serde(deserialize_with = "de_u64_array")]
    pub test_exit_token_hash: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceIdJson {
    pub cp_device_id: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaSubjectKeysJson {
    pub dice_auth_key_key_id: Vec<u32>,
    pub ext_auth_key_key_id: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RmaTokenJson {
    #[serde(deserialize_with = "de_u64_array")]
    pub hash: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersoBlobJson {
    pub num_objs: u32,
    pub next_free: u32,
    pub body: Vec<u8>,
}

/// 64-bit values arrive either as numbers or, from protobuf JSON writers,
/// as decimal strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum U64Value {
    Number(u64),
    Text(String),
}

fn de_u64_array<'de, D>(deserializer: D) -> Result<Vec<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<U64Value>::deserialize(deserializer)?
        .into_iter()
        .map(|value| match value {
            U64Value::Number(n) => Ok(n),
            U64Value::Text(s) => s.parse().map_err(serde::de::Error::custom),
        })
        .collect()
}

/// Parses a command out of console bytes, ignoring noise around the JSON.
pub fn parse_command<T: DeserializeOwned>(bytes: &[u8]) -> CommandResult<T> {
    let json = trim_to_json(bytes);
    serde_json::from_slice(json).map_err(|e| {
        log::error!("failed to parse JSON: {}", e);
        e.into()
    })
}

/// Serializes a command without whitespace.
pub fn encode_command<T: Serialize>(command: &T) -> CommandResult<String> {
    Ok(serde_json::to_string(command)?)
}

/// Places a single-frame command into a space-padded frame.
pub fn command_frame(json: &str, capacity: usize) -> CommandResult<Frame> {
    let mut frame = Frame::new(capacity);
    frame.fill_padded(json.as_bytes())?;
    Ok(frame)
}
