// Licensed under the Apache-2.0 license

//! Console response envelope
//!
//! The DUT terminates each response with a single line
//! `RESP_OK:<body> CRC:<decimal>` or `RESP_ERR:<body> CRC:<decimal>`, where
//! the CRC is the standard CRC-32 of `<body>`.

use crate::error::{FrameError, FrameResult};

const RESP_OK: &str = "RESP_OK:";
const RESP_ERR: &str = "RESP_ERR:";
const CRC_TAG: &str = " CRC:";

/// Reflected CRC-32 (poly 0xEDB88320, init and final XOR 0xFFFFFFFF).
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    Err,
}

impl ResponseStatus {
    fn marker(&self) -> &'static str {
        match self {
            ResponseStatus::Ok => RESP_OK,
            ResponseStatus::Err => RESP_ERR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleResponse {
    pub status: ResponseStatus,
    pub body: String,
    pub crc: u32,
}

impl ConsoleResponse {
    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}

/// Finds the first response line in `text` and extracts its body.
///
/// Anything before the marker (log output, sync messages) is ignored. The
/// body runs up to the last ` CRC:` on the marker's line.
pub fn parse_console_response(text: &str, verify_crc: bool) -> FrameResult<ConsoleResponse> {
    let ok = text.find(RESP_OK).map(|i| (i, ResponseStatus::Ok));
    let err = text.find(RESP_ERR).map(|i| (i, ResponseStatus::Err));
    let (start, status) = match (ok, err) {
        (Some(ok), Some(err)) => {
            if ok.0 < err.0 {
                ok
            } else {
                err
            }
        }
        (Some(found), None) | (None, Some(found)) => found,
        (None, None) => {
            return Err(FrameError::MalformedResponse("no RESP_OK or RESP_ERR marker"))
        }
    };

    let rest = &text[start + status.marker().len()..];
    let line = rest.split('\n').next().unwrap_or_default();
    let crc_pos = line
        .rfind(CRC_TAG)
        .ok_or(FrameError::MalformedResponse("missing CRC"))?;
    let body = &line[..crc_pos];
    let digits = line[crc_pos + CRC_TAG.len()..].trim_end_matches('\r');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FrameError::MalformedResponse("invalid CRC value"));
    }
    let crc: u32 = digits
        .parse()
        .map_err(|_| FrameError::MalformedResponse("invalid CRC value"))?;

    if verify_crc {
        let computed = crc32(body.as_bytes());
        if computed != crc {
            log::error!("console CRC mismatch: got {}, computed {}", crc, computed);
            return Err(FrameError::CrcMismatch {
                expected: crc,
                computed,
            });
        }
    }

    Ok(ConsoleResponse {
        status,
        body: body.to_string(),
        crc,
    })
}

/// Formats a response line the way the DUT firmware prints it.
pub fn encode_console_response(status: ResponseStatus, body: &str) -> String {
    format!(
        "{}{}{}{}\n",
        status.marker(),
        body,
        CRC_TAG,
        crc32(body.as_bytes())
    )
}
