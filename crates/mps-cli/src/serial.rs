//! Serial-port transport for the sensor link.
//!
//! Devices are named by family prefix plus a numeric suffix (e.g.
//! `/dev/ttyACM0`). Baud rate and framing are fixed per family: the
//! virtual COM family runs at 115200, the raw families at 38400, all
//! 8N1 with no flow control.

use std::io::{self, Read, Write};
use std::time::Duration;

use mps_protocol::Transport;
use serialport::SerialPort;

/// USB serial adapter family.
pub const DEV_USB: &str = "/dev/ttyUSB";
/// Raw serial device family.
pub const DEV_AMA: &str = "/dev/serial";
/// Virtual COM port family (USB CDC).
pub const DEV_ACM: &str = "/dev/ttyACM";

/// Zero-byte reads tolerated before a read is abandoned.
const MAX_ZERO_READS: u32 = 2;

/// Read timeout; the sensor answers well inside two deciseconds.
const READ_TIMEOUT: Duration = Duration::from_millis(200);

/// A blocking serial-port transport.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open `device` family at `index` with that family's fixed framing.
    pub fn open(device: &str, index: u32) -> Result<Self, serialport::Error> {
        let path = format!("{device}{index}");
        let baud = if device == DEV_ACM { 115_200 } else { 38_400 };

        let port = serialport::new(&path, baud)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()?;

        Ok(SerialTransport { port })
    }
}

impl Transport for SerialTransport {
    /// Fill `buf`, tolerating up to two empty reads before giving up and
    /// reporting however many bytes arrived.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        let mut zero_reads = 0;

        while filled < buf.len() {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => {
                    zero_reads += 1;
                    if zero_reads > MAX_ZERO_READS {
                        break;
                    }
                }
                Ok(len) => filled += len,
                Err(err) if err.kind() == io::ErrorKind::TimedOut => {
                    zero_reads += 1;
                    if zero_reads > MAX_ZERO_READS {
                        break;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Ok(filled)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.port.write(data)
    }
}
