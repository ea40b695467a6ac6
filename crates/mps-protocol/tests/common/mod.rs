//! Scripted transport for exercising the protocol engine without hardware.

use std::collections::VecDeque;
use std::io;

use mps_protocol::{Transport, REPLY_HEADER_LEN};

/// Transport fed from a script of read chunks, recording every write.
///
/// Each `read` call consumes one queued chunk; an empty queue reads zero
/// bytes, which the session reports as an incomplete frame. Writes are
/// captured in order, optionally truncated to simulate a short write.
#[derive(Default)]
pub struct MockTransport {
    /// Byte chunks returned by successive read calls.
    pub reads: VecDeque<Vec<u8>>,
    /// Every write issued by the session, in order.
    pub writes: Vec<Vec<u8>>,
    /// Number of read calls observed.
    pub read_calls: usize,
    /// Cap on bytes accepted per write (None accepts everything).
    pub write_limit: Option<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one raw read chunk.
    pub fn push_read(&mut self, bytes: &[u8]) {
        self.reads.push_back(bytes.to_vec());
    }

    /// Queue a full reply frame split into header and payload reads, the
    /// way the session consumes it.
    pub fn push_reply(&mut self, frame: &[u8]) {
        self.push_read(&frame[..REPLY_HEADER_LEN]);
        if frame.len() > REPLY_HEADER_LEN {
            self.push_read(&frame[REPLY_HEADER_LEN..]);
        }
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_calls += 1;
        match self.reads.pop_front() {
            Some(chunk) => {
                let len = chunk.len().min(buf.len());
                buf[..len].copy_from_slice(&chunk[..len]);
                Ok(len)
            }
            None => Ok(0),
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let accepted = self.write_limit.map_or(data.len(), |cap| cap.min(data.len()));
        self.writes.push(data[..accepted].to_vec());
        Ok(accepted)
    }
}
