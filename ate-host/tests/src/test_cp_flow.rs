// Licensed under the Apache-2.0 license

//! CP provisioning: token injection and device id export.

use crate::common::{test_constants::*, MockDutConsole, MockKdf};
use ate_host::{
    ConsoleConfig, ConsoleError, DeviceId, DutConsole, PersoSession, ServiceError, SessionError,
    SyncMessages, Tokens, TransportError, Unpacker, SPI_CONSOLE_FRAME_SIZE,
};
use ate_host_commands::{device_id_to_json, TOKEN_HASH_SIZE, WAS_SIZE};
use ate_host_frames::ResponseStatus;
use ate_host_transport::{TEST_TOKEN_SEED_LABEL, WAS_SEED_LABEL};

const CP_TOKENS_SYNC: &str = "Waiting for CP provisioning data ...";
const CP_DEVICE_ID_SYNC: &str = "Exporting CP device ID ...";

#[test]
fn test_inject_cp_tokens() {
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    let mut kdf = MockKdf::default();

    let tokens = {
        let console = DutConsole::new(&mut dut, ConsoleConfig::default());
        let mut session = PersoSession::new(console, Unpacker::default());
        session
            .inject_cp_tokens(&mut kdf)
            .expect("Failed to inject CP tokens")
    };

    assert_eq!(
        tokens.wafer_auth_secret.to_vec(),
        MockKdf::expected(WAS_SEED_LABEL, b"was", WAS_SIZE)
    );
    assert_eq!(
        tokens.test_unlock_token_hash.to_vec(),
        MockKdf::expected(TEST_TOKEN_SEED_LABEL, b"test_unlock", TOKEN_HASH_SIZE)
    );
    assert_eq!(
        tokens.test_exit_token_hash.to_vec(),
        MockKdf::expected(TEST_TOKEN_SEED_LABEL, b"test_exit", TOKEN_HASH_SIZE)
    );
    assert_eq!(
        kdf.calls,
        vec![
            (WAS_SEED_LABEL.to_string(), b"was".to_vec(), WAS_SIZE),
            (
                TEST_TOKEN_SEED_LABEL.to_string(),
                b"test_unlock".to_vec(),
                TOKEN_HASH_SIZE
            ),
            (
                TEST_TOKEN_SEED_LABEL.to_string(),
                b"test_exit".to_vec(),
                TOKEN_HASH_SIZE
            ),
        ]
    );

    // One padded frame, sent after the DUT asked for it.
    assert_eq!(dut.synced, vec![CP_TOKENS_SYNC.to_string()]);
    assert_eq!(dut.sent.len(), 1);
    let frame = &dut.sent[0];
    assert_eq!(frame.payload().len(), SPI_CONSOLE_FRAME_SIZE);
    assert!(frame.payload()[frame.size()..].iter().all(|b| *b == b' '));

    let received = Tokens::from_json(frame.data()).expect("DUT could not parse tokens");
    assert_eq!(received, tokens);
}

#[test]
fn test_read_cp_device_id() {
    let device_id = DeviceId(TEST_DEVICE_ID);
    let mut dut = MockDutConsole::new(SMALL_FRAME);
    dut.queue_text(&format!(
        "CP done\r\n{}",
        ate_host_frames::encode_console_response(
            ResponseStatus::Ok,
            &device_id_to_json(&device_id).unwrap()
        )
    ));

    let got = {
        let console = DutConsole::new(
            &mut dut,
            ConsoleConfig::new().with_frame_capacity(SMALL_FRAME),
        );
        let mut session = PersoSession::new(console, Unpacker::default());
        session.read_cp_device_id().expect("Failed to read device id")
    };

    assert_eq!(got, device_id);
    let expected: String = (1..=8u32).rev().map(|w| format!("{w:08x}")).collect();
    assert_eq!(got.to_string(), format!("0x{expected}"));
    assert_eq!(dut.synced, vec![CP_DEVICE_ID_SYNC.to_string()]);
    assert_eq!(dut.pending_responses(), 0);
}

#[test]
fn test_cp_device_error() {
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    dut.queue_response(ResponseStatus::Err, "OTP write failed");

    let console = DutConsole::new(&mut dut, ConsoleConfig::default());
    let mut session = PersoSession::new(console, Unpacker::default());
    match session.read_cp_device_id() {
        Err(SessionError::Transport(TransportError::DeviceError(msg))) => {
            assert_eq!(msg, "OTP write failed")
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_cp_sync_missed() {
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    dut.set_ready(false);
    let mut kdf = MockKdf::default();

    {
        let console = DutConsole::new(&mut dut, ConsoleConfig::default());
        let mut session = PersoSession::new(console, Unpacker::default());
        assert!(matches!(
            session.inject_cp_tokens(&mut kdf),
            Err(SessionError::Transport(TransportError::Console(
                ConsoleError::SyncMissed(msg)
            ))) if msg == CP_TOKENS_SYNC
        ));
    }
    assert!(dut.sent.is_empty());
}

#[test]
fn test_cp_kdf_unavailable() {
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    let mut kdf = MockKdf {
        unavailable: true,
        ..Default::default()
    };

    {
        let console = DutConsole::new(&mut dut, ConsoleConfig::default());
        let mut session = PersoSession::new(console, Unpacker::default());
        assert!(matches!(
            session.inject_cp_tokens(&mut kdf),
            Err(SessionError::Service(ServiceError::Unavailable(_)))
        ));
    }
    assert!(dut.sent.is_empty());
    assert!(dut.synced.is_empty());
}

#[test]
fn test_cp_without_sync_messages() {
    let mut dut = MockDutConsole::new(SPI_CONSOLE_FRAME_SIZE);
    dut.queue_response(
        ResponseStatus::Ok,
        &device_id_to_json(&DeviceId(TEST_DEVICE_ID)).unwrap(),
    );
    let mut kdf = MockKdf::default();

    {
        let console = DutConsole::new(&mut dut, ConsoleConfig::default());
        let sync = SyncMessages {
            cp_tokens: None,
            cp_device_id: None,
            ..Default::default()
        };
        let mut session =
            PersoSession::new(console, Unpacker::default()).with_sync_messages(sync);
        session.inject_cp_tokens(&mut kdf).unwrap();
        assert_eq!(
            session.read_cp_device_id().unwrap(),
            DeviceId(TEST_DEVICE_ID)
        );
    }
    assert!(dut.synced.is_empty());
    assert_eq!(dut.sent.len(), 1);
}
