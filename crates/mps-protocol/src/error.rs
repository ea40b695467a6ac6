//! Protocol error types.

use thiserror::Error;

use crate::constants::*;

/// Errors produced by the protocol engine.
///
/// Every failure is returned to the immediate caller as a value; nothing
/// panics across the protocol boundary. The retry controller consults
/// [`ProtocolError::is_retryable`] to decide whether a resend may recover
/// the exchange.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Byte-transport open/read/write failure.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The transport accepted fewer bytes than the frame required.
    #[error("short write: {written} of {expected} bytes accepted")]
    Transmit {
        /// Bytes the frame required.
        expected: usize,
        /// Bytes the transport accepted.
        written: usize,
    },

    /// Fewer reply-header bytes arrived than the fixed header length.
    #[error("incomplete reply header: expected {expected} bytes, got {actual}")]
    IncompleteHeader {
        /// Fixed reply-header length.
        expected: usize,
        /// Bytes actually read.
        actual: usize,
    },

    /// The reply payload was cut short.
    #[error("incomplete reply payload: expected {expected} bytes, got {actual}")]
    IncompletePayload {
        /// Payload length declared by the reply header.
        expected: usize,
        /// Bytes actually read.
        actual: usize,
    },

    /// The recomputed reply checksum does not match the received one.
    #[error("checksum mismatch: computed 0x{computed:04X}, received 0x{received:04X}")]
    ChecksumMismatch {
        /// Checksum recomputed over the received frame.
        computed: u16,
        /// Checksum carried by the reply header.
        received: u16,
    },

    /// The reply answers a different command than the one requested.
    #[error("command mismatch: expected 0x{expected:02X}, received 0x{received:02X}")]
    CommandMismatch {
        /// Command the request carried.
        expected: u8,
        /// Command the reply names.
        received: u8,
    },

    /// The sensor rejected the request (status 0x01–0x1F).
    #[error("command rejected by sensor: {0}")]
    CommandFailed(CommandStatus),

    /// The sensor reported a hardware fault (status ≥ 0x20).
    #[error("sensor hardware error: 0x{0:02X}")]
    Hardware(u8),

    /// The caller's reply buffer cannot hold the declared payload.
    #[error("reply buffer too small: need {needed} bytes, have {capacity}")]
    BufferTooSmall {
        /// Payload length declared by the reply header.
        needed: usize,
        /// Capacity of the caller's buffer.
        capacity: usize,
    },

    /// No command-table entry exists for this code.
    #[error("unknown command code: 0x{0:02X}")]
    UnknownCommand(u8),

    /// An engineering-data read was issued without an output sink.
    #[error("no output sink configured for engineering data")]
    MissingSink,

    /// Writing an engineering-data chunk to the sink failed.
    #[error("output sink write failed: {0}")]
    Sink(std::io::Error),

    /// A reply payload is shorter than the record being decoded.
    #[error("reply too short for {what}: expected {expected} bytes, got {actual}")]
    ReplyTooShort {
        /// The record being decoded.
        what: &'static str,
        /// Bytes the record requires.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },
}

impl ProtocolError {
    /// Whether a verbatim resend of the request may recover this failure.
    ///
    /// Short frames, corruption, desync, and sensor-side rejections are
    /// transient; transport faults and caller errors are not. Hardware
    /// errors keep the same resend semantics as command rejections.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProtocolError::IncompleteHeader { .. }
                | ProtocolError::IncompletePayload { .. }
                | ProtocolError::ChecksumMismatch { .. }
                | ProtocolError::CommandMismatch { .. }
                | ProtocolError::CommandFailed(_)
                | ProtocolError::Hardware(_)
        )
    }

    /// Status byte reported for this failure.
    ///
    /// Sensor-reported statuses pass through; failures detected on the
    /// host side map to [`STATUS_LOCAL_ERROR`]. The test client uses this
    /// as its process exit code.
    pub fn status_code(&self) -> u8 {
        match self {
            ProtocolError::CommandFailed(status) => u8::from(*status),
            ProtocolError::Hardware(status) => *status,
            _ => STATUS_LOCAL_ERROR,
        }
    }
}

/// Error statuses a reply can carry in the 0x01–0x1F range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Request frame failed the sensor-side checksum.
    CrcError,
    /// Request carried an invalid parameter.
    BadParameter,
    /// The sensor could not execute the command.
    ExecutionFailed,
    /// The sensor ran out of memory.
    NoMemory,
    /// The sensor did not recognize the command.
    UnknownCommand,
    /// Unlisted status code.
    Other(u8),
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandStatus::CrcError => write!(f, "checksum error"),
            CommandStatus::BadParameter => write!(f, "bad parameter"),
            CommandStatus::ExecutionFailed => write!(f, "execution failed"),
            CommandStatus::NoMemory => write!(f, "out of memory"),
            CommandStatus::UnknownCommand => write!(f, "unknown command"),
            CommandStatus::Other(code) => write!(f, "status 0x{:02X}", code),
        }
    }
}

impl From<u8> for CommandStatus {
    fn from(code: u8) -> Self {
        match code {
            STATUS_CRC_ERROR => CommandStatus::CrcError,
            STATUS_BAD_PARAM => CommandStatus::BadParameter,
            STATUS_EXE_FAILED => CommandStatus::ExecutionFailed,
            STATUS_NO_MEM => CommandStatus::NoMemory,
            STATUS_UNKNOWN_CMD => CommandStatus::UnknownCommand,
            _ => CommandStatus::Other(code),
        }
    }
}

impl From<CommandStatus> for u8 {
    fn from(status: CommandStatus) -> Self {
        match status {
            CommandStatus::CrcError => STATUS_CRC_ERROR,
            CommandStatus::BadParameter => STATUS_BAD_PARAM,
            CommandStatus::ExecutionFailed => STATUS_EXE_FAILED,
            CommandStatus::NoMemory => STATUS_NO_MEM,
            CommandStatus::UnknownCommand => STATUS_UNKNOWN_CMD,
            CommandStatus::Other(code) => code,
        }
    }
}
