// Licensed under the Apache-2.0 license

//! Personalization blob command
//!
//! Unlike the other commands, a perso blob rarely fits one console frame. It
//! is carried as a run of frames whose payloads concatenate to the JSON text.

use crate::error::{CommandError, CommandResult};
use crate::json::{encode_command, parse_command, PersoBlobJson};
use ate_host_frames::{chunk, reassemble, Frame};
use perso_tlv::{PersoBlob, PERSO_BLOB_MAX_SIZE};

pub fn perso_blob_to_json(blob: &PersoBlob) -> CommandResult<String> {
    if blob.num_objects == 0 {
        log::error!("refusing to send a perso blob without objects");
        return Err(CommandError::InvalidPersoBlob("no objects"));
    }
    if blob.next_free > PERSO_BLOB_MAX_SIZE {
        log::error!("perso blob cursor {} past capacity", blob.next_free);
        return Err(CommandError::InvalidPersoBlob("next_free exceeds capacity"));
    }
    encode_command(&PersoBlobJson {
        num_objs: blob.num_objects as u32,
        next_free: blob.next_free as u32,
        body: blob.as_bytes().to_vec(),
    })
}

pub fn perso_blob_from_json(bytes: &[u8]) -> CommandResult<PersoBlob> {
    let cmd: PersoBlobJson = parse_command(bytes)?;
    let next_free = cmd.next_free as usize;
    if next_free > PERSO_BLOB_MAX_SIZE {
        log::error!("perso blob next_free {} past capacity", next_free);
        return Err(CommandError::InvalidPersoBlob("next_free exceeds capacity"));
    }
    if cmd.body.len() < next_free {
        log::error!(
            "perso blob body has {} bytes, next_free is {}",
            cmd.body.len(),
            next_free
        );
        return Err(CommandError::InvalidPersoBlob("body shorter than next_free"));
    }
    Ok(PersoBlob::with_contents(
        cmd.num_objs as usize,
        &cmd.body[..next_free],
    )?)
}

/// Encodes `blob` into at most `max_frames` frames of `frame_capacity`.
pub fn perso_blob_to_frames(
    blob: &PersoBlob,
    frame_capacity: usize,
    max_frames: usize,
) -> CommandResult<Vec<Frame>> {
    let json = perso_blob_to_json(blob)?;
    let mut frames = vec![Frame::new(frame_capacity); max_frames];
    let count = chunk(json.as_bytes(), frame_capacity, &mut frames)?;
    frames.truncate(count);
    Ok(frames)
}

pub fn perso_blob_from_frames(frames: &[Frame]) -> CommandResult<PersoBlob> {
    if frames.is_empty() {
        return Err(CommandError::InvalidPersoBlob("no frames"));
    }
    perso_blob_from_json(&reassemble(frames))
}
