//! Request/reply session with bounded resend recovery.
//!
//! One session owns one transport and carries one request at a time:
//! send, receive, and on a transient receive failure resend the cached
//! frame bytes verbatim up to the configured budget. The cache holds the
//! originally transmitted bytes rather than re-encoding, so a retried
//! request is bit-identical to the first transmission, checksum included.

use log::{debug, trace, warn};

use crate::constants::*;
use crate::error::{CommandStatus, ProtocolError};
use crate::frame::{self, ReplyHeader};
use crate::transport::Transport;

/// Per-session tunables.
///
/// Explicit fields where the reference client kept process-wide globals;
/// two sessions on two ports cannot disturb each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    /// Resend attempts permitted after a failed receive.
    pub retry_budget: u32,
    /// Log request and reply headers.
    pub verbose: bool,
    /// Log raw frame bytes.
    pub hexdump: bool,
}

/// Bytes of the last transmitted frame, replayed verbatim on resend.
struct ResendCache {
    header: [u8; REQUEST_HEADER_LEN],
    payload: Vec<u8>,
}

/// A synchronous protocol session over one transport.
pub struct UartSession<T: Transport> {
    transport: T,
    config: SessionConfig,
    cache: Option<ResendCache>,
}

impl<T: Transport> UartSession<T> {
    /// Create a session over `transport`.
    pub fn new(transport: T, config: SessionConfig) -> Self {
        UartSession {
            transport,
            config,
            cache: None,
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The underlying transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Encode and transmit a request, header first, then the payload.
    ///
    /// The frame bytes are cached for resend only when a nonzero retry
    /// budget is configured.
    pub fn send(&mut self, command_id: u8, payload: &[u8]) -> Result<(), ProtocolError> {
        let frame = frame::encode_request(command_id, payload);
        let (header, body) = frame.split_at(REQUEST_HEADER_LEN);

        if self.config.verbose {
            debug!(
                "request: cmd=0x{:02X} payload={} bytes",
                command_id,
                payload.len()
            );
        }
        if self.config.hexdump {
            trace!("request bytes: {}", hex::encode(&frame));
        }

        write_all(&mut self.transport, header)?;
        if !body.is_empty() {
            write_all(&mut self.transport, body)?;
        }

        if self.config.retry_budget > 0 {
            let mut cached = [0u8; REQUEST_HEADER_LEN];
            cached.copy_from_slice(header);
            self.cache = Some(ResendCache {
                header: cached,
                payload: body.to_vec(),
            });
        }

        Ok(())
    }

    /// Receive and validate the reply for `command_id`, resending on
    /// transient failures up to the retry budget.
    ///
    /// The decoded payload is copied into `buf` and its length returned.
    /// Total receive attempts never exceed budget + 1; the last observed
    /// error is returned when the budget runs out.
    pub fn receive(&mut self, command_id: u8, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        let result = self.receive_with_resend(command_id, buf);
        // The resend cache lives for one logical request.
        self.cache = None;
        result
    }

    fn receive_with_resend(
        &mut self,
        command_id: u8,
        buf: &mut [u8],
    ) -> Result<usize, ProtocolError> {
        // Without a cached frame there is nothing to resend.
        let budget = if self.cache.is_some() {
            self.config.retry_budget
        } else {
            0
        };

        let mut last = match self.receive_single(command_id, buf) {
            Ok(len) => return Ok(len),
            Err(err) if budget == 0 || !err.is_retryable() => return Err(err),
            Err(err) => err,
        };

        for attempt in 1..=budget {
            debug!("receive failed ({last}), resend {attempt}/{budget}");
            self.resend()?;
            match self.receive_single(command_id, buf) {
                Ok(len) => return Ok(len),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => last = err,
            }
        }

        Err(last)
    }

    /// Send a request and receive its reply.
    pub fn transact(
        &mut self,
        command_id: u8,
        payload: &[u8],
        buf: &mut [u8],
    ) -> Result<usize, ProtocolError> {
        self.send(command_id, payload)?;
        self.receive(command_id, buf)
    }

    /// One receive attempt: read the fixed header, read the declared
    /// payload, validate, and copy the payload out.
    fn receive_single(&mut self, command_id: u8, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        let mut header_bytes = [0u8; REPLY_HEADER_LEN];
        let got = self.transport.read(&mut header_bytes)?;
        if got < REPLY_HEADER_LEN {
            return Err(ProtocolError::IncompleteHeader {
                expected: REPLY_HEADER_LEN,
                actual: got,
            });
        }
        let header = ReplyHeader::decode(&header_bytes);

        let mut payload = vec![0u8; header.length as usize];
        if !payload.is_empty() {
            let got = self.transport.read(&mut payload)?;
            if got < payload.len() {
                return Err(ProtocolError::IncompletePayload {
                    expected: payload.len(),
                    actual: got,
                });
            }
        }

        if let Err(err) = frame::verify_reply(&header, &payload) {
            warn!("reply failed checksum: {header:?}");
            return Err(err);
        }

        if header.command_id != command_id {
            warn!("reply answers the wrong command: {header:?}");
            return Err(ProtocolError::CommandMismatch {
                expected: command_id,
                received: header.command_id,
            });
        }

        match header.status {
            STATUS_SUCCESS => {}
            status if status >= STATUS_HARDWARE_MIN => {
                warn!("sensor hardware error: 0x{status:02X}");
                return Err(ProtocolError::Hardware(status));
            }
            status => {
                debug!("command returned error status 0x{status:02X}");
                return Err(ProtocolError::CommandFailed(CommandStatus::from(status)));
            }
        }

        if self.config.verbose {
            debug!("reply: {header:?}");
        }
        if self.config.hexdump {
            trace!(
                "reply bytes: {} {}",
                hex::encode(header_bytes),
                hex::encode(&payload)
            );
        }

        if header.length == 0 {
            return Ok(0);
        }

        let needed = header.length as usize;
        if buf.len() < needed {
            return Err(ProtocolError::BufferTooSmall {
                needed,
                capacity: buf.len(),
            });
        }
        buf.fill(0);
        buf[..needed].copy_from_slice(&payload);
        Ok(needed)
    }

    /// Replay the cached frame bytes, header first, then the payload.
    fn resend(&mut self) -> Result<(), ProtocolError> {
        match &self.cache {
            Some(cache) => {
                write_all(&mut self.transport, &cache.header)?;
                if !cache.payload.is_empty() {
                    write_all(&mut self.transport, &cache.payload)?;
                }
                Ok(())
            }
            None => Err(ProtocolError::Transmit {
                expected: REQUEST_HEADER_LEN,
                written: 0,
            }),
        }
    }
}

fn write_all<T: Transport>(transport: &mut T, data: &[u8]) -> Result<(), ProtocolError> {
    let written = transport.write(data)?;
    if written != data.len() {
        return Err(ProtocolError::Transmit {
            expected: data.len(),
            written,
        });
    }
    Ok(())
}
