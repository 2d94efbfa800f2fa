// Licensed under the Apache-2.0 license

//! Provisioning tokens, device id and CA subject key commands.

use crate::error::{CommandError, CommandResult};
use crate::json::{encode_command, parse_command, CaSubjectKeysJson, DeviceIdJson, TokensJson};
use perso_tlv::{DeviceId, DEVICE_ID_SIZE};

/// Size of the wafer authentication secret.
pub const WAS_SIZE: usize = 32;

/// Size of the test unlock and test exit token hashes.
pub const TOKEN_HASH_SIZE: usize = 16;

/// Size of a CA subject key identifier.
pub const CA_SUBJECT_KEY_SIZE: usize = 20;

const DEVICE_ID_WORDS: usize = DEVICE_ID_SIZE / 4;

fn fixed<const N: usize>(name: &'static str, bytes: &[u8]) -> CommandResult<[u8; N]> {
    bytes.try_into().map_err(|_| {
        log::error!("invalid {}: {} bytes", name, bytes.len());
        CommandError::InvalidToken {
            name,
            got: bytes.len(),
            want: N,
        }
    })
}

fn check_len(field: &'static str, got: usize, want: usize) -> CommandResult<()> {
    if got != want {
        log::error!("{} has {} entries, want {}", field, got, want);
        return Err(CommandError::WrongLength { field, got, want });
    }
    Ok(())
}

pub(crate) fn le_u32_words(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

pub(crate) fn le_u64_words(bytes: &[u8]) -> Vec<u64> {
    bytes
        .chunks_exact(8)
        .map(|c| {
            let mut word = [0u8; 8];
            word.copy_from_slice(c);
            u64::from_le_bytes(word)
        })
        .collect()
}

pub(crate) fn u64_words_to_bytes<const N: usize>(words: &[u64]) -> [u8; N] {
    let mut out = [0u8; N];
    for (chunk, word) in out.chunks_exact_mut(8).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    out
}

/// Secrets injected into the DUT during CP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    pub wafer_auth_secret: [u8; WAS_SIZE],
    pub test_unlock_token_hash: [u8; TOKEN_HASH_SIZE],
    pub test_exit_token_hash: [u8; TOKEN_HASH_SIZE],
}

impl Tokens {
    pub fn from_slices(was: &[u8], test_unlock: &[u8], test_exit: &[u8]) -> CommandResult<Self> {
        Ok(Tokens {
            wafer_auth_secret: fixed("wafer auth secret", was)?,
            test_unlock_token_hash: fixed("test unlock token", test_unlock)?,
            test_exit_token_hash: fixed("test exit token", test_exit)?,
        })
    }

    /// The WAS travels as eight little-endian 32-bit words, the token hashes
    /// as two little-endian 64-bit words each.
    pub fn to_json(&self) -> CommandResult<String> {
        encode_command(&TokensJson {
            wafer_auth_secret: le_u32_words(&self.wafer_auth_secret),
            test_unlock_token_hash: le_u64_words(&self.test_unlock_token_hash),
            test_exit_token_hash: le_u64_words(&self.test_exit_token_hash),
        })
    }

    pub fn from_json(bytes: &[u8]) -> CommandResult<Self> {
        let cmd: TokensJson = parse_command(bytes)?;
        check_len("wafer_auth_secret", cmd.wafer_auth_secret.len(), WAS_SIZE / 4)?;
        check_len(
            "test_unlock_token_hash",
            cmd.test_unlock_token_hash.len(),
            TOKEN_HASH_SIZE / 8,
        )?;
        check_len(
            "test_exit_token_hash",
            cmd.test_exit_token_hash.len(),
            TOKEN_HASH_SIZE / 8,
        )?;

        let mut wafer_auth_secret = [0u8; WAS_SIZE];
        for (chunk, word) in wafer_auth_secret
            .chunks_exact_mut(4)
            .zip(&cmd.wafer_auth_secret)
        {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Ok(Tokens {
            wafer_auth_secret,
            test_unlock_token_hash: u64_words_to_bytes(&cmd.test_unlock_token_hash),
            test_exit_token_hash: u64_words_to_bytes(&cmd.test_exit_token_hash),
        })
    }
}

/// Decodes the `cp_device_id` word array reported by the DUT.
///
/// Words are stored little-endian from the start of the id. Fewer than eight
/// words leave the tail zero.
pub fn device_id_from_json(bytes: &[u8]) -> CommandResult<DeviceId> {
    let cmd: DeviceIdJson = parse_command(bytes)?;
    if cmd.cp_device_id.len() > DEVICE_ID_WORDS {
        log::error!("device id has {} words", cmd.cp_device_id.len());
        return Err(CommandError::FieldTooLong {
            field: "cp_device_id",
            got: cmd.cp_device_id.len(),
            max: DEVICE_ID_WORDS,
        });
    }
    let mut raw = [0u8; DEVICE_ID_SIZE];
    for (chunk, word) in raw.chunks_exact_mut(4).zip(&cmd.cp_device_id) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    Ok(DeviceId(raw))
}

pub fn device_id_to_json(device_id: &DeviceId) -> CommandResult<String> {
    encode_command(&DeviceIdJson {
        cp_device_id: device_id.words().to_vec(),
    })
}

/// Subject key identifiers of the CAs that will endorse the DUT certificates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaSubjectKeys {
    pub dice_auth_key_key_id: [u8; CA_SUBJECT_KEY_SIZE],
    pub ext_auth_key_key_id: [u8; CA_SUBJECT_KEY_SIZE],
}

impl CaSubjectKeys {
    pub fn from_slices(dice: &[u8], ext: &[u8]) -> CommandResult<Self> {
        Ok(CaSubjectKeys {
            dice_auth_key_key_id: fixed("DICE CA subject key", dice)?,
            ext_auth_key_key_id: fixed("auxiliary CA subject key", ext)?,
        })
    }

    /// Each key id byte is one array entry.
    pub fn to_json(&self) -> CommandResult<String> {
        encode_command(&CaSubjectKeysJson {
            dice_auth_key_key_id: self.dice_auth_key_key_id.iter().map(|b| *b as u32).collect(),
            ext_auth_key_key_id: self.ext_auth_key_key_id.iter().map(|b| *b as u32).collect(),
        })
    }

    pub fn from_json(bytes: &[u8]) -> CommandResult<Self> {
        let cmd: CaSubjectKeysJson = parse_command(bytes)?;
        Ok(CaSubjectKeys {
            dice_auth_key_key_id: key_id("dice_auth_key_key_id", &cmd.dice_auth_key_key_id)?,
            ext_auth_key_key_id: key_id("ext_auth_key_key_id", &cmd.ext_auth_key_key_id)?,
        })
    }
}

fn key_id(field: &'static str, values: &[u32]) -> CommandResult<[u8; CA_SUBJECT_KEY_SIZE]> {
    check_len(field, values.len(), CA_SUBJECT_KEY_SIZE)?;
    let mut out = [0u8; CA_SUBJECT_KEY_SIZE];
    for (dst, value) in out.iter_mut().zip(values) {
        *dst = u8::try_from(*value).map_err(|_| CommandError::ByteOutOfRange {
            field,
            value: *value,
        })?;
    }
    Ok(out)
}
