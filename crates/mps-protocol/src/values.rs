//! Typed records decoded from reply payloads.
//!
//! Every record is decoded field by field at known offsets, little-endian.
//! Nothing here reinterprets raw buffer memory.

use std::fmt;

use crate::constants::*;
use crate::error::ProtocolError;

/// Firmware/hardware/protocol version record (VERSION reply).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    /// Software version, major.
    pub sw_major: u8,
    /// Software version, minor.
    pub sw_minor: u8,
    /// Software version, patch.
    pub sw_patch: u8,
    /// Software version, build.
    pub sw_build: u8,
    /// Hardware version, major.
    pub hw_major: u8,
    /// Hardware version, minor.
    pub hw_minor: u8,
    /// Protocol version, major.
    pub protocol_major: u8,
    /// Protocol version, minor.
    pub protocol_minor: u8,
}

impl VersionInfo {
    /// Reply payload size in bytes.
    pub const WIRE_SIZE: usize = 8;

    /// Decode the 8-byte version record.
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        if payload.len() < Self::WIRE_SIZE {
            return Err(ProtocolError::ReplyTooShort {
                what: "version record",
                expected: Self::WIRE_SIZE,
                actual: payload.len(),
            });
        }
        Ok(VersionInfo {
            sw_major: payload[0],
            sw_minor: payload[1],
            sw_patch: payload[2],
            sw_build: payload[3],
            hw_major: payload[4],
            hw_minor: payload[5],
            protocol_major: payload[6],
            protocol_minor: payload[7],
        })
    }

    /// Firmware revision as one comparable number: w.x.y.z becomes
    /// w·1000 + x·100 + y·10 + z.
    pub fn firmware_revision(&self) -> u16 {
        self.sw_major as u16 * 1000
            + self.sw_minor as u16 * 100
            + self.sw_patch as u16 * 10
            + self.sw_build as u16
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sw {}.{}.{}.{} hw {}.{} protocol {}.{}",
            self.sw_major,
            self.sw_minor,
            self.sw_patch,
            self.sw_build,
            self.hw_major,
            self.hw_minor,
            self.protocol_major,
            self.protocol_minor
        )
    }
}

/// Sensor identity record (SENSOR_INFO reply).
///
/// Firmware revisions from [`POST_SKU_CHANGE_FW`] on report a larger
/// record with a SKU field between the sensor type and the dates; older
/// firmware omits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorInfo {
    /// Serial name (zero-padded ASCII on the wire).
    pub serial_number: String,
    /// Sensor type/model.
    pub sensor_type: u32,
    /// Product SKU; absent before the SKU-bearing firmware.
    pub sku: Option<String>,
    /// Calibration date.
    pub calibration_date: String,
    /// Manufacturing date.
    pub manufacturing_date: String,
}

impl SensorInfo {
    /// Reply payload size with the SKU field.
    pub const WIRE_SIZE: usize = 100;
    /// Reply payload size without the SKU field.
    pub const WIRE_SIZE_NO_SKU: usize = 68;

    /// Expected reply payload size for a given firmware revision.
    pub fn wire_size_for(firmware_revision: u16) -> usize {
        if firmware_revision >= POST_SKU_CHANGE_FW {
            Self::WIRE_SIZE
        } else {
            Self::WIRE_SIZE_NO_SKU
        }
    }

    /// Decode the record shape reported by `firmware_revision`.
    pub fn decode(payload: &[u8], firmware_revision: u16) -> Result<Self, ProtocolError> {
        let expected = Self::wire_size_for(firmware_revision);
        if payload.len() < expected {
            return Err(ProtocolError::ReplyTooShort {
                what: "sensor info record",
                expected,
                actual: payload.len(),
            });
        }

        let serial_number = fixed_ascii(&payload[0..32]);
        let sensor_type = u32::from_le_bytes([payload[32], payload[33], payload[34], payload[35]]);

        if firmware_revision >= POST_SKU_CHANGE_FW {
            Ok(SensorInfo {
                serial_number,
                sensor_type,
                sku: Some(fixed_ascii(&payload[36..68])),
                calibration_date: fixed_ascii(&payload[68..84]),
                manufacturing_date: fixed_ascii(&payload[84..100]),
            })
        } else {
            Ok(SensorInfo {
                serial_number,
                sensor_type,
                sku: None,
                calibration_date: fixed_ascii(&payload[36..52]),
                manufacturing_date: fixed_ascii(&payload[52..68]),
            })
        }
    }
}

/// Full measurement answer record (ANSWER reply).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Answer {
    /// Measurement cycle counter.
    pub cycle_count: i32,
    /// Gas concentration.
    pub concentration: f32,
    /// Detected gas identifier.
    pub gas_id: u32,
    /// Ambient temperature in degrees C.
    pub temperature: f32,
    /// Barometric pressure.
    pub pressure: f32,
    /// Relative humidity in percent.
    pub relative_humidity: f32,
    /// Absolute humidity.
    pub absolute_humidity: f32,
}

impl Answer {
    /// Reply payload size in bytes.
    pub const WIRE_SIZE: usize = 28;

    /// Decode the 28-byte answer record.
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        if payload.len() < Self::WIRE_SIZE {
            return Err(ProtocolError::ReplyTooShort {
                what: "answer record",
                expected: Self::WIRE_SIZE,
                actual: payload.len(),
            });
        }
        Ok(Answer {
            cycle_count: i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]),
            concentration: f32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]),
            gas_id: u32::from_le_bytes([payload[8], payload[9], payload[10], payload[11]]),
            temperature: f32::from_le_bytes([payload[12], payload[13], payload[14], payload[15]]),
            pressure: f32::from_le_bytes([payload[16], payload[17], payload[18], payload[19]]),
            relative_humidity: f32::from_le_bytes([
                payload[20],
                payload[21],
                payload[22],
                payload[23],
            ]),
            absolute_humidity: f32::from_le_bytes([
                payload[24],
                payload[25],
                payload[26],
                payload[27],
            ]),
        })
    }
}

/// One variable-length chunk of engineering data (ENGDATA reply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngDataChunk {
    /// Data length declared by the chunk.
    pub length: u32,
    /// Chunk data, `length` bytes.
    pub data: Vec<u8>,
}

impl EngDataChunk {
    /// Largest reply payload a chunk can occupy: the length field plus a
    /// full chunk of data.
    pub const MAX_WIRE_SIZE: usize = ENGDATA_CHUNK_SIZE + 4;

    /// Decode the length-prefixed chunk.
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        if payload.len() < 4 {
            return Err(ProtocolError::ReplyTooShort {
                what: "engineering data chunk",
                expected: 4,
                actual: payload.len(),
            });
        }
        let length = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let end = 4 + length as usize;
        if payload.len() < end {
            return Err(ProtocolError::ReplyTooShort {
                what: "engineering data chunk",
                expected: end,
                actual: payload.len(),
            });
        }
        Ok(EngDataChunk {
            length,
            data: payload[4..end].to_vec(),
        })
    }

    /// Bytes appended to the output sink: the length field followed by the
    /// data, `length + 4` bytes in total.
    pub fn sink_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + self.data.len());
        bytes.extend_from_slice(&self.length.to_le_bytes());
        bytes.extend_from_slice(&self.data);
        bytes
    }
}

/// Zero-padded fixed-width ASCII field to an owned string.
fn fixed_ascii(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_decode_and_revision() {
        let version = VersionInfo::decode(&[4, 1, 0, 0, 2, 0, 1, 2]).unwrap();
        assert_eq!(version.sw_major, 4);
        assert_eq!(version.hw_major, 2);
        assert_eq!(version.protocol_minor, 2);
        assert_eq!(version.firmware_revision(), 4100);
        assert_eq!(version.to_string(), "sw 4.1.0.0 hw 2.0 protocol 1.2");
    }

    #[test]
    fn test_version_too_short() {
        let err = VersionInfo::decode(&[4, 1, 0]).unwrap_err();
        assert!(matches!(err, ProtocolError::ReplyTooShort { .. }));
    }

    #[test]
    fn test_sensor_info_shapes() {
        let mut with_sku = vec![0u8; SensorInfo::WIRE_SIZE];
        with_sku[..6].copy_from_slice(b"MPS-01");
        with_sku[32..36].copy_from_slice(&7u32.to_le_bytes());
        with_sku[36..39].copy_from_slice(b"SKU");
        with_sku[68..72].copy_from_slice(b"2024");
        with_sku[84..88].copy_from_slice(b"2023");

        let info = SensorInfo::decode(&with_sku, 4100).unwrap();
        assert_eq!(info.serial_number, "MPS-01");
        assert_eq!(info.sensor_type, 7);
        assert_eq!(info.sku.as_deref(), Some("SKU"));
        assert_eq!(info.calibration_date, "2024");
        assert_eq!(info.manufacturing_date, "2023");

        let mut without_sku = vec![0u8; SensorInfo::WIRE_SIZE_NO_SKU];
        without_sku[..6].copy_from_slice(b"MPS-01");
        without_sku[32..36].copy_from_slice(&7u32.to_le_bytes());
        without_sku[36..40].copy_from_slice(b"2024");
        without_sku[52..56].copy_from_slice(b"2023");

        let info = SensorInfo::decode(&without_sku, 3900).unwrap();
        assert_eq!(info.sku, None);
        assert_eq!(info.calibration_date, "2024");
        assert_eq!(info.manufacturing_date, "2023");
    }

    #[test]
    fn test_answer_field_offsets() {
        let mut payload = vec![0u8; Answer::WIRE_SIZE];
        payload[0..4].copy_from_slice(&(-3i32).to_le_bytes());
        payload[4..8].copy_from_slice(&1.5f32.to_le_bytes());
        payload[8..12].copy_from_slice(&9u32.to_le_bytes());
        payload[12..16].copy_from_slice(&21.5f32.to_le_bytes());

        let answer = Answer::decode(&payload).unwrap();
        assert_eq!(answer.cycle_count, -3);
        assert_eq!(answer.concentration, 1.5);
        assert_eq!(answer.gas_id, 9);
        assert_eq!(answer.temperature, 21.5);
        assert_eq!(answer.pressure, 0.0);
    }

    #[test]
    fn test_engdata_decode() {
        let mut payload = vec![0u8; 12];
        payload[0..4].copy_from_slice(&8u32.to_le_bytes());
        payload[4..12].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

        let chunk = EngDataChunk::decode(&payload).unwrap();
        assert_eq!(chunk.length, 8);
        assert_eq!(chunk.data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(chunk.sink_bytes(), payload);
    }

    #[test]
    fn test_engdata_truncated_data() {
        let mut payload = vec![0u8; 6];
        payload[0..4].copy_from_slice(&8u32.to_le_bytes());

        let err = EngDataChunk::decode(&payload).unwrap_err();
        assert!(matches!(err, ProtocolError::ReplyTooShort { .. }));
    }
}
