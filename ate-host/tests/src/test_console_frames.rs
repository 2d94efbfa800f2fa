// Licensed under the Apache-2.0 license

//! Command framing over the simulated console.

use crate::common::{test_constants::SMALL_FRAME, MockDutConsole};
use ate_host::{reassemble, trim_to_json, ConsoleConfig, DutConsole, TransportError};
use ate_host_commands::json::CaSubjectKeysJson;
use ate_host_commands::{parse_command, CaSubjectKeys};
use ate_host_frames::{encode_console_response, ResponseStatus, FRAME_PAD_BYTE};

fn small_console(dut: &mut MockDutConsole) -> DutConsole<'_> {
    DutConsole::new(dut, ConsoleConfig::new().with_frame_capacity(SMALL_FRAME))
}

#[test]
fn test_long_command_is_chunked() {
    let keys = CaSubjectKeys::from_slices(&[200; 20], &[100; 20]).unwrap();
    let json = keys.to_json().unwrap();
    assert!(json.len() > 2 * SMALL_FRAME);

    let mut dut = MockDutConsole::new(SMALL_FRAME);
    let sent = small_console(&mut dut)
        .send_command(Some("ready"), json.as_bytes())
        .unwrap();

    assert_eq!(sent, json.len().div_ceil(SMALL_FRAME));
    assert_eq!(dut.sent.len(), sent);
    let (last, full) = dut.sent.split_last().unwrap();
    assert!(full.iter().all(|f| f.size() == SMALL_FRAME));
    assert_eq!(
        last.size(),
        json.len() - SMALL_FRAME * (sent - 1),
        "only the final frame is partial"
    );
    assert_eq!(reassemble(&dut.sent), json.as_bytes());

    let parsed: CaSubjectKeysJson = parse_command(&reassemble(&dut.sent)).unwrap();
    assert_eq!(parsed.dice_auth_key_key_id, vec![200; 20]);
}

#[test]
fn test_short_command_is_padded() {
    let mut dut = MockDutConsole::new(SMALL_FRAME);
    assert_eq!(
        small_console(&mut dut)
            .send_command(None, b"{\"a\":1}")
            .unwrap(),
        1
    );
    let frame = &dut.sent[0];
    assert_eq!(frame.data(), b"{\"a\":1}");
    assert_eq!(frame.payload().len(), SMALL_FRAME);
    assert!(frame.payload()[7..].iter().all(|b| *b == FRAME_PAD_BYTE));
    assert_eq!(trim_to_json(frame.payload()), b"{\"a\":1}");
}

#[test]
fn test_command_over_frame_limit() {
    let mut dut = MockDutConsole::new(SMALL_FRAME);
    let command = vec![b'x'; SMALL_FRAME * 3 + 1];
    let mut console = DutConsole::new(
        &mut dut,
        ConsoleConfig::new()
            .with_frame_capacity(SMALL_FRAME)
            .with_max_frames(3),
    );
    assert!(matches!(
        console.send_command(Some("ready"), &command),
        Err(TransportError::TooManyFrames { need: 4, max: 3 })
    ));
    assert!(dut.sent.is_empty());
    assert!(dut.synced.is_empty());
}

#[test]
fn test_receive_noisy_command() {
    let mut dut = MockDutConsole::new(SMALL_FRAME);
    dut.queue_text("boot: ok\r\nperso: {\"cp_device_id\":[1,2,3]}\r\n> ");

    let raw = small_console(&mut dut).receive_command(None).unwrap();
    assert!(raw.starts_with(b"boot: ok"));
    assert_eq!(trim_to_json(&raw), b"{\"cp_device_id\":[1,2,3]}");
}

#[test]
fn test_responses_are_received_in_order() {
    let mut dut = MockDutConsole::new(SMALL_FRAME);
    dut.queue_response(ResponseStatus::Ok, "{\"first\":1}");
    let second = format!("{{\"second\":\"{}\"}}", "y".repeat(100));
    dut.queue_response(ResponseStatus::Ok, &second);

    {
        let mut console = small_console(&mut dut);
        assert_eq!(console.receive_response(None).unwrap(), b"{\"first\":1}");
        let second = console.receive_response(None).unwrap();
        assert!(second.starts_with(b"{\"second\":\"yyy"));
        assert!(matches!(
            console.receive_response(None),
            Err(TransportError::NoResponse)
        ));
    }
    assert_eq!(dut.pending_responses(), 0);
}

#[test]
fn test_response_without_envelope() {
    let mut dut = MockDutConsole::new(SMALL_FRAME);
    dut.queue_text("{\"cp_device_id\":[1]}");
    assert!(matches!(
        small_console(&mut dut).receive_response(None),
        Err(TransportError::Frame(_))
    ));

    let bad_crc = encode_console_response(ResponseStatus::Ok, "{}").replace(" CRC:", " CRC:x");
    dut.queue_text(&bad_crc);
    assert!(matches!(
        small_console(&mut dut).receive_response(None),
        Err(TransportError::Frame(_))
    ));
}
