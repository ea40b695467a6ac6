//! MPS Sensor UART Protocol
//!
//! This crate implements the host side of the binary request/reply
//! protocol used to query an MPS gas sensor over a serial link. A request
//! is a fixed 8-byte header plus an optional payload; the sensor answers
//! with a fixed 6-byte header plus an optional payload. Both directions
//! are protected by a running 16-bit checksum.
//!
//! # Protocol Overview
//!
//! ```text
//! host → sensor:  cmd:u16  len:u16  reserved:u16  cksum:u16  [payload]
//! sensor → host:  cmd:u8   status:u8  len:u16     cksum:u16  [payload]
//! ```
//!
//! The checksum covers the header with its checksum field zeroed,
//! continued over the payload, seeded with 0xFFFF. A failed receive can be
//! recovered by resending the cached request bytes verbatim, up to the
//! session's retry budget.
//!
//! The engine talks to the device only through the [`Transport`] trait, so
//! the same code drives a real serial port or a scripted test double.
//!
//! # Example
//!
//! ```rust,ignore
//! use mps_protocol::{SensorClient, SessionConfig, UartSession};
//!
//! let session = UartSession::new(port, SessionConfig { retry_budget: 2, ..Default::default() });
//! let mut client = SensorClient::new(session);
//! let temperature = client.temperature()?;
//! ```

mod checksum;
mod client;
mod commands;
mod constants;
mod error;
mod frame;
mod session;
mod transport;
mod values;

pub use checksum::*;
pub use client::*;
pub use commands::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use session::*;
pub use transport::*;
pub use values::*;
