// Licensed under the Apache-2.0 license

use crate::config::PersoToolConfig;
use anyhow::{anyhow, bail, Context, Result};
use ate_host_commands::{perso_blob_from_json, perso_blob_to_json, rma_token_to_json};
use ate_host_frames::{frame_count, parse_console_response};
use perso_tlv::{pack, walk, PersoBlob, PersoRecords, UnpackPolicy};
use std::io::Write;
use std::path::Path;

fn read_blob(path: &Path) -> Result<PersoBlob> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read blob file: {:?}", path))?;
    Ok(PersoBlob::from_bytes(&bytes)?)
}

pub fn inspect(path: &Path, out: &mut impl Write) -> Result<()> {
    let blob = read_blob(path)?;
    writeln!(out, "{} bytes, {} objects", blob.next_free, blob.num_objects)?;
    for object in walk(blob.as_bytes(), blob.next_free)? {
        let object = object?;
        let kind = match object.header.object_type() {
            Some(obj_type) => format!("{:?}", obj_type),
            None => format!("unknown({})", object.header.obj_type),
        };
        writeln!(
            out,
            "{:#06x}  {:<16} {}",
            object.offset, kind, object.header.size
        )?;
    }
    Ok(())
}

fn print_records(records: &PersoRecords, out: &mut impl Write) -> Result<()> {
    writeln!(out, "device id: {}", records.device_id)?;
    match &records.signature {
        Some(signature) => writeln!(out, "WAS HMAC: {}", hex::encode(signature.0))?,
        None => writeln!(out, "WAS HMAC: none")?,
    }
    if let Some(hash) = &records.perso_fw_hash {
        writeln!(out, "perso firmware hash: {}", hex::encode(hash.0))?;
    }
    for tbs in &records.tbs_certs {
        writeln!(out, "TBS cert {}: {} bytes", tbs.label, tbs.tbs.len())?;
    }
    for cert in &records.certs {
        writeln!(out, "cert {}: {} bytes", cert.label, cert.cert.len())?;
    }
    for seed in &records.seeds {
        writeln!(out, "{:?} seed: {} bytes", seed.kind, seed.bytes.len())?;
    }
    Ok(())
}

pub fn unpack(
    config: &PersoToolConfig,
    path: &Path,
    lenient: bool,
    out: &mut impl Write,
) -> Result<()> {
    let blob = read_blob(path)?;
    let mut unpacker = config.unpack.unpacker();
    if lenient {
        unpacker.policy = UnpackPolicy::lenient();
    }
    let records = unpacker.unpack(&blob)?;
    print_records(&records, out)
}

/// Splits a `LABEL=FILE` argument.
fn parse_cert_arg(arg: &str) -> Result<(&str, &str)> {
    arg.split_once('=')
        .filter(|(label, file)| !label.is_empty() && !file.is_empty())
        .ok_or_else(|| anyhow!("Expected LABEL=FILE, got {:?}", arg))
}

pub fn pack_certs(certs: &[String], output: &Path) -> Result<PersoBlob> {
    let mut entries = Vec::with_capacity(certs.len());
    for arg in certs {
        let (label, file) = parse_cert_arg(arg)?;
        let body = std::fs::read(file)
            .with_context(|| format!("Failed to read certificate: {:?}", file))?;
        entries.push((label.as_bytes(), body));
    }

    let mut blob = PersoBlob::new();
    pack(
        &mut blob,
        entries
            .iter()
            .map(|(label, body)| (*label, body.as_slice())),
    )?;
    std::fs::write(output, blob.as_bytes())
        .with_context(|| format!("Failed to write blob file: {:?}", output))?;
    log::info!(
        "packed {} certificates into {} bytes",
        blob.num_objects,
        blob.next_free
    );
    Ok(blob)
}

pub fn to_json(
    config: &PersoToolConfig,
    path: &Path,
    num_objects: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    let mut blob = read_blob(path)?;
    if let Some(num_objects) = num_objects {
        blob.num_objects = num_objects;
    }
    let json = perso_blob_to_json(&blob)?;
    let frames = frame_count(json.len(), config.frames.capacity.max(1));
    if frames > config.frames.max_frames {
        log::warn!(
            "command needs {} frames, console allows {}",
            frames,
            config.frames.max_frames
        );
    }
    writeln!(out, "{}", json)?;
    writeln!(
        out,
        "{} bytes in {} frames of {}",
        json.len(),
        frames,
        config.frames.capacity
    )?;
    Ok(())
}

/// Decodes a captured perso blob response, prints its records and
/// optionally saves the raw blob.
pub fn from_console(
    config: &PersoToolConfig,
    capture: &Path,
    output: Option<&Path>,
    skip_crc: bool,
    out: &mut impl Write,
) -> Result<PersoBlob> {
    let text = std::fs::read_to_string(capture)
        .with_context(|| format!("Failed to read console capture: {:?}", capture))?;
    let response = parse_console_response(&text, !skip_crc)?;
    if !response.is_ok() {
        bail!("DUT returned RESP_ERR: {}", response.body);
    }
    let blob = perso_blob_from_json(response.body.as_bytes())?;
    if let Some(output) = output {
        std::fs::write(output, blob.as_bytes())
            .with_context(|| format!("Failed to write blob file: {:?}", output))?;
    }
    let records = config.unpack.unpacker().unpack(&blob)?;
    print_records(&records, out)?;
    Ok(blob)
}

pub fn rma_token(token: &str, skip_crc: bool, out: &mut impl Write) -> Result<()> {
    let token = hex::decode(token.trim()).context("RMA token is not valid hex")?;
    writeln!(out, "{}", rma_token_to_json(&token, skip_crc)?)?;
    Ok(())
}
