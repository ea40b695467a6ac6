//! Request/reply frame layout and checksum framing.
//!
//! Both directions carry a fixed header followed by an optional payload.
//! All multi-byte fields travel little-endian, in declared field order:
//!
//! ```text
//! request (8 bytes):  cmd_lo cmd_hi len_lo len_hi rsvd_lo rsvd_hi ck_lo ck_hi
//! reply   (6 bytes):  cmd    status len_lo len_hi ck_lo   ck_hi
//! ```
//!
//! The checksum always covers the header with its checksum field zeroed,
//! continued over the payload bytes when a payload is present.

use bytes::BufMut;

use crate::checksum::checksum;
use crate::constants::*;
use crate::error::ProtocolError;

/// Fixed 8-byte request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Command code (widened to 16 bits on the wire).
    pub command_id: u16,
    /// Payload length in bytes.
    pub length: u16,
    /// Always zero.
    pub reserved: u16,
    /// Running checksum over the zero-checksum header and payload.
    pub checksum: u16,
}

impl RequestHeader {
    /// Header for `command_id` with a `length`-byte payload, checksum unset.
    pub fn new(command_id: u8, length: u16) -> Self {
        RequestHeader {
            command_id: command_id as u16,
            length,
            reserved: 0,
            checksum: 0,
        }
    }

    /// Serialize in declared field order.
    pub fn encode(&self) -> [u8; REQUEST_HEADER_LEN] {
        let mut buf = [0u8; REQUEST_HEADER_LEN];
        buf[0..2].copy_from_slice(&self.command_id.to_le_bytes());
        buf[2..4].copy_from_slice(&self.length.to_le_bytes());
        buf[4..6].copy_from_slice(&self.reserved.to_le_bytes());
        buf[6..8].copy_from_slice(&self.checksum.to_le_bytes());
        buf
    }
}

/// Fixed 6-byte reply header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyHeader {
    /// Command code this reply answers.
    pub command_id: u8,
    /// Completion status (0x00 success).
    pub status: u8,
    /// Payload length in bytes.
    pub length: u16,
    /// Running checksum over the zero-checksum header and payload.
    pub checksum: u16,
}

impl ReplyHeader {
    /// Parse the fixed header bytes.
    pub fn decode(bytes: &[u8; REPLY_HEADER_LEN]) -> Self {
        ReplyHeader {
            command_id: bytes[0],
            status: bytes[1],
            length: u16::from_le_bytes([bytes[2], bytes[3]]),
            checksum: u16::from_le_bytes([bytes[4], bytes[5]]),
        }
    }

    /// Serialize in declared field order.
    pub fn encode(&self) -> [u8; REPLY_HEADER_LEN] {
        let mut buf = [0u8; REPLY_HEADER_LEN];
        buf[0] = self.command_id;
        buf[1] = self.status;
        buf[2..4].copy_from_slice(&self.length.to_le_bytes());
        buf[4..6].copy_from_slice(&self.checksum.to_le_bytes());
        buf
    }
}

/// Build the complete outbound frame for `command_id` carrying `payload`.
///
/// The checksum is computed over the header with its checksum field still
/// zero, then continued over the payload, and patched into the header.
pub fn encode_request(command_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut header = RequestHeader::new(command_id, payload.len() as u16);

    let mut cksum = checksum(&header.encode(), CHECKSUM_SEED);
    if !payload.is_empty() {
        cksum = checksum(payload, cksum);
    }
    header.checksum = cksum;

    let mut frame = Vec::with_capacity(REQUEST_HEADER_LEN + payload.len());
    frame.put_slice(&header.encode());
    frame.put_slice(payload);
    frame
}

/// Build a complete reply frame.
///
/// The sensor side of the codec; the host uses it to fabricate replies in
/// tests and loopback rigs.
pub fn encode_reply(command_id: u8, status: u8, payload: &[u8]) -> Vec<u8> {
    let mut header = ReplyHeader {
        command_id,
        status,
        length: payload.len() as u16,
        checksum: 0,
    };

    let mut cksum = checksum(&header.encode(), CHECKSUM_SEED);
    if !payload.is_empty() {
        cksum = checksum(payload, cksum);
    }
    header.checksum = cksum;

    let mut frame = Vec::with_capacity(REPLY_HEADER_LEN + payload.len());
    frame.put_slice(&header.encode());
    frame.put_slice(payload);
    frame
}

/// Recompute a reply checksum with the stored field zeroed and compare it
/// against the received value.
///
/// The header itself is left untouched, so the received checksum stays
/// available for diagnostics on mismatch.
pub fn verify_reply(header: &ReplyHeader, payload: &[u8]) -> Result<(), ProtocolError> {
    let zeroed = ReplyHeader {
        checksum: 0,
        ..*header
    };

    let mut computed = checksum(&zeroed.encode(), CHECKSUM_SEED);
    if !payload.is_empty() {
        computed = checksum(payload, computed);
    }

    if computed != header.checksum {
        return Err(ProtocolError::ChecksumMismatch {
            computed,
            received: header.checksum,
        });
    }
    Ok(())
}
