//! Byte-transport seam.
//!
//! The protocol engine reaches the serial device only through this trait,
//! so the same engine drives a real port, a loopback rig, or a scripted
//! test double.

use std::io;

/// Blocking byte-level access to the sensor link.
pub trait Transport {
    /// Read bytes into `buf`, blocking until data arrives or the device
    /// timeout elapses. Returns the number of bytes read; fewer than
    /// `buf.len()` signals a short read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write `data`, returning the number of bytes the device accepted.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;
}
