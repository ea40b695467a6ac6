//! Integration tests for the frame codec and the retry/resend controller.

mod common;

use common::MockTransport;
use mps_protocol::{
    checksum, encode_reply, ProtocolError, SessionConfig, UartSession, CHECKSUM_SEED, CMD_MEAS,
    CMD_STATUS, CMD_TEMP, MEAS_START_ISO, REQUEST_HEADER_LEN, STATUS_LOCAL_ERROR, STATUS_SUCCESS,
};

fn session(transport: MockTransport, retry_budget: u32) -> UartSession<MockTransport> {
    UartSession::new(
        transport,
        SessionConfig {
            retry_budget,
            ..Default::default()
        },
    )
}

// ============================================================================
// Framing
// ============================================================================

#[test]
fn test_status_request_frame_layout() {
    let mut session = session(MockTransport::new(), 0);
    session.send(CMD_STATUS, &[]).unwrap();

    let writes = &session.transport().writes;
    assert_eq!(writes.len(), 1);
    let header = &writes[0];
    assert_eq!(header.len(), REQUEST_HEADER_LEN);

    // 41 00 00 00 00 00 ck_lo ck_hi, checksum over the zero-checksum header.
    assert_eq!(&header[..6], &[0x41, 0x00, 0x00, 0x00, 0x00, 0x00]);
    let expected = checksum(&[0x41, 0, 0, 0, 0, 0, 0, 0], CHECKSUM_SEED);
    assert_eq!(u16::from_le_bytes([header[6], header[7]]), expected);
}

#[test]
fn test_status_round_trip() {
    let mut transport = MockTransport::new();
    transport.push_reply(&encode_reply(CMD_STATUS, STATUS_SUCCESS, &[]));

    let mut session = session(transport, 0);
    let mut buf = [0u8; 8];
    let len = session.transact(CMD_STATUS, &[], &mut buf).unwrap();
    assert_eq!(len, 0);
}

#[test]
fn test_reply_payload_copied_into_zeroed_buffer() {
    let mut transport = MockTransport::new();
    transport.push_reply(&encode_reply(CMD_TEMP, STATUS_SUCCESS, &[1, 2, 3, 4]));

    let mut session = session(transport, 0);
    let mut buf = [0xAAu8; 8];
    let len = session.transact(CMD_TEMP, &[], &mut buf).unwrap();
    assert_eq!(len, 4);
    // Payload at the front, the rest of the buffer zeroed, not stale.
    assert_eq!(buf, [1, 2, 3, 4, 0, 0, 0, 0]);
}

#[test]
fn test_request_payload_is_second_write() {
    let mut session = session(MockTransport::new(), 0);
    session.send(CMD_MEAS, &[MEAS_START_ISO]).unwrap();

    let writes = &session.transport().writes;
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].len(), REQUEST_HEADER_LEN);
    assert_eq!(writes[1], vec![MEAS_START_ISO]);
}

// ============================================================================
// Failure classification
// ============================================================================

#[test]
fn test_incomplete_header() {
    let frame = encode_reply(CMD_STATUS, STATUS_SUCCESS, &[]);
    let mut transport = MockTransport::new();
    transport.push_read(&frame[..3]);

    let mut session = session(transport, 0);
    let err = session.transact(CMD_STATUS, &[], &mut []).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::IncompleteHeader {
            expected: 6,
            actual: 3
        }
    ));
}

#[test]
fn test_zero_read_is_incomplete_header() {
    let mut session = session(MockTransport::new(), 0);
    let err = session.transact(CMD_STATUS, &[], &mut []).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::IncompleteHeader { actual: 0, .. }
    ));
    assert_eq!(err.status_code(), STATUS_LOCAL_ERROR);
}

#[test]
fn test_incomplete_payload() {
    let frame = encode_reply(CMD_TEMP, STATUS_SUCCESS, &[1, 2, 3, 4]);
    let mut transport = MockTransport::new();
    transport.push_read(&frame[..6]);
    transport.push_read(&frame[6..8]); // two of four payload bytes

    let mut session = session(transport, 0);
    let mut buf = [0u8; 4];
    let err = session.transact(CMD_TEMP, &[], &mut buf).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::IncompletePayload {
            expected: 4,
            actual: 2
        }
    ));
}

#[test]
fn test_any_single_bit_flip_in_payload_fails_checksum() {
    let frame = encode_reply(CMD_TEMP, STATUS_SUCCESS, &[0x12, 0x34, 0x56, 0x78]);

    for bit in 0..32 {
        let mut corrupted = frame.clone();
        corrupted[6 + bit / 8] ^= 1 << (bit % 8);

        let mut transport = MockTransport::new();
        transport.push_reply(&corrupted);

        let mut session = session(transport, 0);
        let mut buf = [0u8; 4];
        let err = session.transact(CMD_TEMP, &[], &mut buf).unwrap_err();
        assert!(
            matches!(err, ProtocolError::ChecksumMismatch { .. }),
            "flipping payload bit {bit} must fail the checksum, got {err:?}"
        );
    }
}

#[test]
fn test_command_mismatch() {
    let mut transport = MockTransport::new();
    transport.push_reply(&encode_reply(CMD_TEMP, STATUS_SUCCESS, &[]));

    let mut session = session(transport, 0);
    let err = session.transact(CMD_STATUS, &[], &mut []).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::CommandMismatch {
            expected: 0x41,
            received: 0x21
        }
    ));
}

#[test]
fn test_command_error_status() {
    let mut transport = MockTransport::new();
    transport.push_reply(&encode_reply(CMD_STATUS, 0x02, &[]));

    let mut session = session(transport, 0);
    let err = session.transact(CMD_STATUS, &[], &mut []).unwrap_err();
    assert!(matches!(err, ProtocolError::CommandFailed(_)));
    assert_eq!(err.status_code(), 0x02);
}

#[test]
fn test_hardware_error_status() {
    let mut transport = MockTransport::new();
    transport.push_reply(&encode_reply(CMD_STATUS, 0x20, &[]));

    let mut session = session(transport, 0);
    let err = session.transact(CMD_STATUS, &[], &mut []).unwrap_err();
    assert!(matches!(err, ProtocolError::Hardware(0x20)));
    assert_eq!(err.status_code(), 0x20);
}

#[test]
fn test_buffer_too_small() {
    let mut transport = MockTransport::new();
    transport.push_reply(&encode_reply(CMD_TEMP, STATUS_SUCCESS, &[1, 2, 3, 4]));

    let mut session = session(transport, 0);
    let mut buf = [0u8; 2];
    let err = session.transact(CMD_TEMP, &[], &mut buf).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::BufferTooSmall {
            needed: 4,
            capacity: 2
        }
    ));
}

#[test]
fn test_short_write_is_terminal() {
    let mut transport = MockTransport::new();
    transport.write_limit = Some(4);

    let mut session = session(transport, 0);
    let err = session.send(CMD_STATUS, &[]).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::Transmit {
            expected: 8,
            written: 4
        }
    ));
}

// ============================================================================
// Retry/resend controller
// ============================================================================

/// Corrupt a frame's checksum so one receive attempt fails.
fn corrupt(frame: &[u8]) -> Vec<u8> {
    let mut bad = frame.to_vec();
    bad[4] ^= 0xFF;
    bad
}

#[test]
fn test_retry_budget_covers_failures() {
    let good = encode_reply(CMD_STATUS, STATUS_SUCCESS, &[]);

    // Two failures, then success: a budget of 2 recovers.
    let mut transport = MockTransport::new();
    transport.push_reply(&corrupt(&good));
    transport.push_reply(&corrupt(&good));
    transport.push_reply(&good);

    let mut session = session(transport, 2);
    session.transact(CMD_STATUS, &[], &mut []).unwrap();

    // Initial send plus two resends, each a single header write.
    assert_eq!(session.transport().writes.len(), 3);
}

#[test]
fn test_retry_budget_exhausted_returns_last_error() {
    let good = encode_reply(CMD_STATUS, STATUS_SUCCESS, &[]);

    // Three failures with a budget of 2: budget + 1 attempts, then the
    // last observed error.
    let mut transport = MockTransport::new();
    for _ in 0..3 {
        transport.push_reply(&corrupt(&good));
    }

    let mut session = session(transport, 2);
    let err = session.transact(CMD_STATUS, &[], &mut []).unwrap_err();
    assert!(matches!(err, ProtocolError::ChecksumMismatch { .. }));
    assert_eq!(session.transport().read_calls, 3);
    assert_eq!(session.transport().writes.len(), 3);
}

#[test]
fn test_zero_budget_fails_immediately() {
    let good = encode_reply(CMD_STATUS, STATUS_SUCCESS, &[]);

    let mut transport = MockTransport::new();
    transport.push_reply(&corrupt(&good));
    transport.push_reply(&good); // would succeed, must never be read

    let mut session = session(transport, 0);
    let err = session.transact(CMD_STATUS, &[], &mut []).unwrap_err();
    assert!(matches!(err, ProtocolError::ChecksumMismatch { .. }));
    assert_eq!(session.transport().writes.len(), 1);
    assert_eq!(session.transport().read_calls, 1);
}

#[test]
fn test_resend_replays_cached_bytes_verbatim() {
    let good = encode_reply(CMD_MEAS, STATUS_SUCCESS, &[]);

    let mut transport = MockTransport::new();
    transport.push_reply(&corrupt(&good));
    transport.push_reply(&good);

    let mut session = session(transport, 1);
    session
        .transact(CMD_MEAS, &[MEAS_START_ISO], &mut [])
        .unwrap();

    // header, payload, then the identical pair again.
    let writes = &session.transport().writes;
    assert_eq!(writes.len(), 4);
    assert_eq!(writes[2], writes[0]);
    assert_eq!(writes[3], writes[1]);
}

#[test]
fn test_buffer_too_small_is_not_retried() {
    let reply = encode_reply(CMD_TEMP, STATUS_SUCCESS, &[1, 2, 3, 4]);

    let mut transport = MockTransport::new();
    transport.push_reply(&reply);
    transport.push_reply(&reply);

    let mut session = session(transport, 3);
    let mut buf = [0u8; 2];
    let err = session.transact(CMD_TEMP, &[], &mut buf).unwrap_err();
    assert!(matches!(err, ProtocolError::BufferTooSmall { .. }));
    // One send, one receive attempt: caller errors are not resent.
    assert_eq!(session.transport().writes.len(), 1);
}
