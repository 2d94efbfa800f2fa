// Licensed under the Apache-2.0 license

//! RMA token command
//!
//! The personalization firmware expects this command, and only this one, to
//! be followed by a second JSON object carrying the CRC-32 of the first:
//!
//! ```text
//! {"hash":[8721,0]}{"crc": <decimal CRC-32 of the first object>}
//! ```

use crate::error::{CommandError, CommandResult};
use crate::json::{encode_command, parse_command, RmaTokenJson};
use crate::tokens::{le_u64_words, u64_words_to_bytes};
use ate_host_frames::{crc32, trim_to_json};

pub const RMA_TOKEN_SIZE: usize = 16;

const CRC_PREFIX: &str = "{\"crc\":";

/// Encodes the RMA token hash, appending the CRC object unless `skip_crc`.
pub fn rma_token_to_json(token: &[u8], skip_crc: bool) -> CommandResult<String> {
    if token.len() != RMA_TOKEN_SIZE {
        log::error!("invalid RMA token: {} bytes", token.len());
        return Err(CommandError::InvalidToken {
            name: "RMA token",
            got: token.len(),
            want: RMA_TOKEN_SIZE,
        });
    }
    let mut command = encode_command(&RmaTokenJson {
        hash: le_u64_words(token),
    })?;
    if !skip_crc {
        let crc = crc32(command.as_bytes());
        command.push_str(&format!("{CRC_PREFIX} {crc}}}"));
    }
    Ok(command)
}

/// Decodes the RMA token hash. A trailing CRC object is dropped unchecked.
pub fn rma_token_from_json(bytes: &[u8]) -> CommandResult<[u8; RMA_TOKEN_SIZE]> {
    let mut json = trim_to_json(bytes);
    if let Some(pos) = json
        .windows(CRC_PREFIX.len())
        .position(|w| w == CRC_PREFIX.as_bytes())
    {
        json = &json[..pos];
    }

    let cmd: RmaTokenJson = parse_command(json)?;
    let want = RMA_TOKEN_SIZE / 8;
    if cmd.hash.len() != want {
        log::error!("invalid RMA token hash size {}", cmd.hash.len());
        return Err(CommandError::WrongLength {
            field: "hash",
            got: cmd.hash.len(),
            want,
        });
    }
    Ok(u64_words_to_bytes(&cmd.hash))
}
