// Licensed under the Apache-2.0 license

//! FT provisioning: RMA token, CA key ids and certificate endorsement.

use crate::common::{
    dut_perso_blob, test_constants::*, test_tbs, EndorseMode, MockDutConsole, MockEndorser,
};
use ate_host::{
    perso_blob_from_frames, perso_blob_to_json, rma_token_from_json, CaSubjectKeys,
    ConsoleConfig, DeviceId, DutConsole, FrameError, KeyLabel, PersoBlob, PersoSession,
    PersoTlvError, ServiceError, SessionError, SyncMessages, TransportError, UnpackLimits,
    UnpackPolicy, Unpacker, WasSignature, SPI_CONSOLE_FRAME_SIZE,
};
use ate_host_frames::{crc32, encode_console_response, ResponseStatus};
use perso_tlv::{ObjectType, PersoFwHash};

fn ca_keys() -> CaSubjectKeys {
    CaSubjectKeys::from_slices(&[0x11; 20], &[0xfe; 20]).unwrap()
}

fn queue_blob(dut: &mut MockDutConsole, blob: &PersoBlob) {
    let json = perso_blob_to_json(blob).unwrap();
    dut.queue_response(ResponseStatus::Ok, &json);
}

#[test]
fn test_send_ft_inputs() {
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    {
        let console = DutConsole::new(&mut dut, ConsoleConfig::default());
        let mut session = PersoSession::new(console, Unpacker::default());
        session
            .send_ft_inputs(&TEST_RMA_TOKEN, &ca_keys())
            .expect("Failed to send FT inputs");
    }

    assert_eq!(dut.sent.len(), 2);
    assert!(dut.synced.is_empty());

    let rma = dut.sent_text(0);
    let split = rma.find("{\"crc\":").expect("RMA command has no CRC object");
    assert_eq!(
        &rma[split..],
        format!("{{\"crc\": {}}}", crc32(rma[..split].as_bytes()))
    );
    assert_eq!(
        rma_token_from_json(dut.sent[0].data()).unwrap(),
        TEST_RMA_TOKEN
    );

    assert_eq!(CaSubjectKeys::from_json(dut.sent[1].data()).unwrap(), ca_keys());
}

#[test]
fn test_send_ft_inputs_rejects_short_token() {
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    {
        let console = DutConsole::new(&mut dut, ConsoleConfig::default());
        let mut session = PersoSession::new(console, Unpacker::default());
        assert!(matches!(
            session.send_ft_inputs(&TEST_RMA_TOKEN[..8], &ca_keys()),
            Err(SessionError::Command(_))
        ));
    }
    assert!(dut.sent.is_empty());
}

#[test]
fn test_endorse_device() {
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    queue_blob(&mut dut, &dut_perso_blob(300));
    let mut endorser = MockEndorser::new(EndorseMode::Sign);

    let report = {
        let console = DutConsole::new(&mut dut, ConsoleConfig::default());
        let mut session = PersoSession::new(console, Unpacker::default());
        session
            .endorse_device(&mut endorser)
            .expect("Failed to endorse device")
    };

    assert_eq!(report.device_id, DeviceId(TEST_DEVICE_ID));
    assert_eq!(report.perso_fw_hash, Some(PersoFwHash(TEST_PERSO_HASH)));
    assert_eq!(report.tbs_certs, 2);
    assert_eq!(report.endorsed_certs, 2);
    assert_eq!(report.seeds, 0);
    assert_eq!(report.frames_sent, dut.sent.len());
    assert!(report.frames_sent > 1);
    assert_eq!(endorser.signatures, vec![WasSignature(TEST_WAS_HMAC)]);

    // Every frame but the last is full; none is padded.
    let (last, full) = dut.sent.split_last().unwrap();
    assert!(full.iter().all(|f| f.size() == SPI_CONSOLE_FRAME_SIZE));
    assert!(last.size() > 0 && last.size() <= SPI_CONSOLE_FRAME_SIZE);

    let returned = perso_blob_from_frames(&dut.sent).expect("DUT could not decode certs");
    assert_eq!(returned.num_objects, 2);
    let records = Unpacker::new(UnpackLimits::default(), UnpackPolicy::lenient())
        .unpack(&returned)
        .unwrap();
    assert!(records.tbs_certs.is_empty());
    assert_eq!(records.certs.len(), 2);
    assert_eq!(records.certs[0].label, KeyLabel::try_from(UDS_LABEL).unwrap());
    assert_eq!(
        records.certs[0].cert,
        MockEndorser::expected_cert(&test_tbs(0x10, 300))
    );
    assert_eq!(records.certs[1].label, KeyLabel::try_from(CDI0_LABEL).unwrap());
    assert_eq!(
        records.certs[1].cert,
        MockEndorser::expected_cert(&test_tbs(0x80, 300))
    );
}

#[test]
fn test_full_ft_sequence_with_sync() {
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    queue_blob(&mut dut, &dut_perso_blob(32));
    let mut endorser = MockEndorser::new(EndorseMode::Sign);
    let sync = SyncMessages {
        ft_rma_token: Some("Waiting for RMA token ...".to_string()),
        ft_ca_keys: Some("Waiting for CA keys ...".to_string()),
        ft_perso_blob: Some("Exporting perso blob ...".to_string()),
        ..Default::default()
    };

    let report = {
        let console = DutConsole::new(&mut dut, ConsoleConfig::default());
        let mut session =
            PersoSession::new(console, Unpacker::default()).with_sync_messages(sync);
        session.send_ft_inputs(&TEST_RMA_TOKEN, &ca_keys()).unwrap();
        session.endorse_device(&mut endorser).unwrap()
    };

    assert_eq!(
        dut.synced,
        vec![
            "Waiting for RMA token ...".to_string(),
            "Waiting for CA keys ...".to_string(),
            "Exporting perso blob ...".to_string(),
        ]
    );
    assert_eq!(report.frames_sent, 1);
    assert_eq!(dut.sent.len(), 3);
}

#[test]
fn test_endorse_missing_signature() {
    let mut blob = PersoBlob::new();
    blob.push_device_id(&DeviceId(TEST_DEVICE_ID)).unwrap();
    blob.push_cert_entry(ObjectType::X509Tbs, UDS_LABEL.as_bytes(), &test_tbs(0, 16))
        .unwrap();

    // Strict policy stops at unpack.
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    queue_blob(&mut dut, &blob);
    let mut endorser = MockEndorser::new(EndorseMode::Sign);
    {
        let console = DutConsole::new(&mut dut, ConsoleConfig::default());
        let mut session = PersoSession::new(console, Unpacker::default());
        assert!(matches!(
            session.endorse_device(&mut endorser),
            Err(SessionError::Tlv(PersoTlvError::MissingRequiredObject {
                kind: ObjectType::WasTbsHmac
            }))
        ));
    }

    // A lenient unpack still cannot authenticate the request.
    queue_blob(&mut dut, &blob);
    {
        let console = DutConsole::new(&mut dut, ConsoleConfig::default());
        let unpacker = Unpacker::new(UnpackLimits::default(), UnpackPolicy::lenient());
        let mut session = PersoSession::new(console, unpacker);
        assert!(matches!(
            session.endorse_device(&mut endorser),
            Err(SessionError::MissingSignature)
        ));
    }

    assert_eq!(endorser.requests, 0);
    assert!(dut.sent.is_empty());
}

#[test]
fn test_endorse_rejected() {
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    queue_blob(&mut dut, &dut_perso_blob(64));
    let mut endorser = MockEndorser::new(EndorseMode::Reject);
    {
        let console = DutConsole::new(&mut dut, ConsoleConfig::default());
        let mut session = PersoSession::new(console, Unpacker::default());
        assert!(matches!(
            session.endorse_device(&mut endorser),
            Err(SessionError::Service(ServiceError::Rejected(_)))
        ));
    }
    assert_eq!(endorser.requests, 2);
    assert!(dut.sent.is_empty());
}

#[test]
fn test_endorse_no_certs_returned() {
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    queue_blob(&mut dut, &dut_perso_blob(64));
    let mut endorser = MockEndorser::new(EndorseMode::Empty);
    let report = {
        let console = DutConsole::new(&mut dut, ConsoleConfig::default());
        let mut session = PersoSession::new(console, Unpacker::default());
        session.endorse_device(&mut endorser).unwrap()
    };
    assert_eq!(report.tbs_certs, 2);
    assert_eq!(report.endorsed_certs, 0);
    assert_eq!(report.frames_sent, 0);
    assert!(dut.sent.is_empty());
}

#[test]
fn test_endorse_crc_mismatch() {
    let json = perso_blob_to_json(&dut_perso_blob(16)).unwrap();
    let bad = format!("RESP_OK:{} CRC:{}\n", json, crc32(json.as_bytes()) ^ 1);

    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    dut.queue_text(&bad);
    let mut endorser = MockEndorser::new(EndorseMode::Sign);
    {
        let console = DutConsole::new(&mut dut, ConsoleConfig::default());
        let mut session = PersoSession::new(console, Unpacker::default());
        assert!(matches!(
            session.endorse_device(&mut endorser),
            Err(SessionError::Transport(TransportError::Frame(
                FrameError::CrcMismatch { .. }
            )))
        ));
    }

    dut.queue_text(&bad);
    let report = {
        let console = DutConsole::new(&mut dut, ConsoleConfig::new().with_crc_check(false));
        let mut session = PersoSession::new(console, Unpacker::default());
        session.endorse_device(&mut endorser).unwrap()
    };
    assert_eq!(report.endorsed_certs, 2);
}

#[test]
fn test_endorse_response_too_many_frames() {
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    queue_blob(&mut dut, &dut_perso_blob(600));
    let mut endorser = MockEndorser::new(EndorseMode::Sign);
    {
        let console = DutConsole::new(&mut dut, ConsoleConfig::new().with_max_frames(2));
        let mut session = PersoSession::new(console, Unpacker::default());
        assert!(matches!(
            session.endorse_device(&mut endorser),
            Err(SessionError::Transport(TransportError::TooManyFrames { max: 2, .. }))
        ));
    }
    assert_eq!(endorser.requests, 0);
}

#[test]
fn test_endorse_device_error() {
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    dut.queue_text(&encode_console_response(
        ResponseStatus::Err,
        "perso blob unavailable",
    ));
    let mut endorser = MockEndorser::new(EndorseMode::Sign);
    let console = DutConsole::new(&mut dut, ConsoleConfig::default());
    let mut session = PersoSession::new(console, Unpacker::default());
    assert!(matches!(
        session.endorse_device(&mut endorser),
        Err(SessionError::Transport(TransportError::DeviceError(_)))
    ));
}
