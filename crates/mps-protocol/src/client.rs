//! Typed sensor operations over a UART session.
//!
//! Each operation pairs one command with its reply decoder: send the
//! request, receive through the retry controller, then interpret the raw
//! reply bytes as the command's record shape.

use std::io::Write;

use log::debug;

use crate::commands::{self, MeasurementMode};
use crate::constants::*;
use crate::error::ProtocolError;
use crate::session::UartSession;
use crate::transport::Transport;
use crate::values::{Answer, EngDataChunk, SensorInfo, VersionInfo};

/// Typed value produced by a dispatched command.
#[derive(Debug)]
pub enum CommandOutput {
    /// A 32-bit float reading.
    Float(f32),
    /// A 32-bit unsigned reading.
    Integer(u32),
    /// A single-byte reading.
    Byte(u8),
    /// The version record.
    Version(VersionInfo),
    /// The sensor identity record.
    SensorInfo(SensorInfo),
    /// The full measurement answer record.
    Answer(Answer),
    /// One engineering-data chunk (already appended to the sink).
    EngData(EngDataChunk),
    /// A zero-length success reply (write-style commands).
    Empty,
}

/// Typed client for the sensor command surface.
pub struct SensorClient<T: Transport> {
    session: UartSession<T>,
}

impl<T: Transport> SensorClient<T> {
    /// Wrap a session.
    pub fn new(session: UartSession<T>) -> Self {
        SensorClient { session }
    }

    /// The underlying session.
    pub fn session(&self) -> &UartSession<T> {
        &self.session
    }

    /// The underlying session, mutably.
    pub fn session_mut(&mut self) -> &mut UartSession<T> {
        &mut self.session
    }

    /// Issue a no-payload request and return the reply payload.
    fn read_reply(&mut self, command_id: u8, expected: usize) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = vec![0u8; expected];
        let len = self.session.transact(command_id, &[], &mut buf)?;
        buf.truncate(len);
        Ok(buf)
    }

    /// Read a 4-byte float reading.
    pub fn read_float(&mut self, command_id: u8) -> Result<f32, ProtocolError> {
        let buf = self.read_reply(command_id, 4)?;
        if buf.len() < 4 {
            return Err(ProtocolError::ReplyTooShort {
                what: "float reading",
                expected: 4,
                actual: buf.len(),
            });
        }
        Ok(f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
    }

    /// Read a 4-byte unsigned reading.
    pub fn read_integer(&mut self, command_id: u8) -> Result<u32, ProtocolError> {
        let buf = self.read_reply(command_id, 4)?;
        if buf.len() < 4 {
            return Err(ProtocolError::ReplyTooShort {
                what: "integer reading",
                expected: 4,
                actual: buf.len(),
            });
        }
        Ok(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
    }

    /// Read a single-byte reading.
    pub fn read_byte(&mut self, command_id: u8) -> Result<u8, ProtocolError> {
        let buf = self.read_reply(command_id, 1)?;
        if buf.is_empty() {
            return Err(ProtocolError::ReplyTooShort {
                what: "byte reading",
                expected: 1,
                actual: 0,
            });
        }
        Ok(buf[0])
    }

    /// Send a write-style command and require a zero-length success reply.
    pub fn execute_write(&mut self, command_id: u8, payload: &[u8]) -> Result<(), ProtocolError> {
        self.session.transact(command_id, payload, &mut [])?;
        Ok(())
    }

    /// Ambient temperature in degrees C.
    pub fn temperature(&mut self) -> Result<f32, ProtocolError> {
        self.read_float(CMD_TEMP)
    }

    /// Barometric pressure.
    pub fn pressure(&mut self) -> Result<f32, ProtocolError> {
        self.read_float(CMD_PRES)
    }

    /// Relative humidity in percent.
    pub fn relative_humidity(&mut self) -> Result<f32, ProtocolError> {
        self.read_float(CMD_REL_HUM)
    }

    /// Absolute humidity.
    pub fn absolute_humidity(&mut self) -> Result<f32, ProtocolError> {
        self.read_float(CMD_ABS_HUM)
    }

    /// Gas concentration.
    #[cfg(feature = "flammable")]
    pub fn concentration(&mut self) -> Result<f32, ProtocolError> {
        self.read_float(CMD_CONC)
    }

    /// Detected gas identifier.
    #[cfg(feature = "flammable")]
    pub fn gas_id(&mut self) -> Result<u32, ProtocolError> {
        self.read_integer(CMD_ID)
    }

    /// Sensor status byte.
    pub fn status(&mut self) -> Result<u8, ProtocolError> {
        self.read_byte(CMD_STATUS)
    }

    /// Firmware/hardware/protocol version record.
    pub fn version(&mut self) -> Result<VersionInfo, ProtocolError> {
        let buf = self.read_reply(CMD_VERSION, VersionInfo::WIRE_SIZE)?;
        VersionInfo::decode(&buf)
    }

    /// Sensor identity record.
    ///
    /// The record shape depends on the firmware revision, so the version
    /// is fetched first and the expected reply size computed fresh for
    /// this call.
    pub fn sensor_info(&mut self) -> Result<SensorInfo, ProtocolError> {
        let version = self.version()?;
        let revision = version.firmware_revision();
        let expected = SensorInfo::wire_size_for(revision);

        let buf = self.read_reply(CMD_SENSOR_INFO, expected)?;
        SensorInfo::decode(&buf, revision)
    }

    /// Full measurement answer record.
    pub fn answer(&mut self) -> Result<Answer, ProtocolError> {
        let buf = self.read_reply(CMD_ANSWER, Answer::WIRE_SIZE)?;
        Answer::decode(&buf)
    }

    /// Start or stop measurement.
    pub fn set_measurement(&mut self, mode: MeasurementMode) -> Result<(), ProtocolError> {
        self.execute_write(CMD_MEAS, &[mode.code()])
    }

    /// Shut the sensor down.
    pub fn shutdown(&mut self) -> Result<(), ProtocolError> {
        self.execute_write(CMD_SHUTDOWN, &[])
    }

    /// Read one engineering-data chunk and append it to `sink`.
    ///
    /// A missing sink is a caller configuration error, reported before any
    /// transport traffic. On success the chunk's length field and data,
    /// `length + 4` bytes, are appended.
    pub fn eng_data(&mut self, sink: Option<&mut dyn Write>) -> Result<EngDataChunk, ProtocolError> {
        let sink = sink.ok_or(ProtocolError::MissingSink)?;

        let buf = self.read_reply(CMD_ENGDATA, EngDataChunk::MAX_WIRE_SIZE)?;
        let chunk = EngDataChunk::decode(&buf)?;
        sink.write_all(&chunk.sink_bytes())
            .map_err(ProtocolError::Sink)?;
        Ok(chunk)
    }

    /// Poll STATUS until the sensor answers.
    ///
    /// The sensor ignores traffic while it boots; this loops until a
    /// status reply arrives, giving up only on a transport fault.
    pub fn wait_until_ready(&mut self) -> Result<(), ProtocolError> {
        loop {
            match self.status() {
                Ok(_) => return Ok(()),
                Err(err @ ProtocolError::Transport(_)) => return Err(err),
                Err(err) => debug!("sensor not ready: {err}"),
            }
        }
    }

    /// Dispatch a raw command code through the command table.
    ///
    /// `value` supplies the parameter byte for commands with a request
    /// payload; `sink` receives engineering data.
    pub fn execute(
        &mut self,
        command_id: u8,
        value: Option<u8>,
        sink: Option<&mut dyn Write>,
    ) -> Result<CommandOutput, ProtocolError> {
        let spec = commands::lookup(command_id)?;

        match command_id {
            CMD_ANSWER => Ok(CommandOutput::Answer(self.answer()?)),
            #[cfg(feature = "flammable")]
            CMD_CONC => Ok(CommandOutput::Float(self.read_float(command_id)?)),
            #[cfg(feature = "flammable")]
            CMD_ID => Ok(CommandOutput::Integer(self.read_integer(command_id)?)),
            CMD_ENGDATA => Ok(CommandOutput::EngData(self.eng_data(sink)?)),
            CMD_TEMP | CMD_PRES | CMD_REL_HUM | CMD_ABS_HUM => {
                Ok(CommandOutput::Float(self.read_float(command_id)?))
            }
            CMD_STATUS => Ok(CommandOutput::Byte(self.status()?)),
            CMD_VERSION => Ok(CommandOutput::Version(self.version()?)),
            CMD_SENSOR_INFO => Ok(CommandOutput::SensorInfo(self.sensor_info()?)),
            CMD_MEAS | CMD_SHUTDOWN => {
                if spec.request_size > 0 {
                    self.execute_write(command_id, &[value.unwrap_or(0)])?;
                } else {
                    self.execute_write(command_id, &[])?;
                }
                Ok(CommandOutput::Empty)
            }
            _ => Err(ProtocolError::UnknownCommand(command_id)),
        }
    }
}
