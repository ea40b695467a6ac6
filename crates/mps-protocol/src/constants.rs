//! Protocol constants
//!
//! Command codes, reply status classification, and fixed sizes used by the
//! MPS sensor UART protocol.

// ============================================================================
// Command Codes (host → sensor)
// ============================================================================

/// Read the full measurement answer record.
pub const CMD_ANSWER: u8 = 0x01;
/// Read the gas concentration (flammable build variant).
#[cfg(feature = "flammable")]
pub const CMD_CONC: u8 = 0x03;
/// Read the detected gas identifier (flammable build variant).
#[cfg(feature = "flammable")]
pub const CMD_ID: u8 = 0x04;
/// Read one chunk of engineering data.
pub const CMD_ENGDATA: u8 = 0x09;
/// Read the ambient temperature in degrees C.
pub const CMD_TEMP: u8 = 0x21;
/// Read the barometric pressure.
pub const CMD_PRES: u8 = 0x22;
/// Read the relative humidity in percent.
pub const CMD_REL_HUM: u8 = 0x23;
/// Read the absolute humidity.
pub const CMD_ABS_HUM: u8 = 0x24;
/// Read the sensor status byte.
pub const CMD_STATUS: u8 = 0x41;
/// Read the firmware/hardware/protocol version record.
pub const CMD_VERSION: u8 = 0x42;
/// Read the sensor identity record (serial number, SKU, dates).
pub const CMD_SENSOR_INFO: u8 = 0x43;
/// Start or stop measurement (one mode byte of payload).
pub const CMD_MEAS: u8 = 0x61;
/// Shut the sensor down.
pub const CMD_SHUTDOWN: u8 = 0x62;

// ============================================================================
// Measurement Modes (CMD_MEAS payload byte)
// ============================================================================

/// Start continuous measurement, ISO mode.
pub const MEAS_START_ISO: u8 = 0x02;
/// Start continuous measurement, IEC mode.
pub const MEAS_START_IEC: u8 = 0x22;
/// Stop measurement.
pub const MEAS_STOP: u8 = 0x03;

// ============================================================================
// Reply Status Codes (sensor → host)
// ============================================================================

/// Command completed successfully.
pub const STATUS_SUCCESS: u8 = 0x00;
/// Request frame failed the sensor-side checksum.
pub const STATUS_CRC_ERROR: u8 = 0x01;
/// Request carried an invalid parameter.
pub const STATUS_BAD_PARAM: u8 = 0x02;
/// The sensor could not execute the command.
pub const STATUS_EXE_FAILED: u8 = 0x03;
/// The sensor ran out of memory.
pub const STATUS_NO_MEM: u8 = 0x04;
/// The sensor did not recognize the command.
pub const STATUS_UNKNOWN_CMD: u8 = 0x05;
/// First status value classified as a hardware error.
pub const STATUS_HARDWARE_MIN: u8 = 0x20;
/// Status reported for failures detected on the host side.
pub const STATUS_LOCAL_ERROR: u8 = 0xFF;

// ============================================================================
// Sizes
// ============================================================================

/// Request header length in bytes.
pub const REQUEST_HEADER_LEN: usize = 8;
/// Reply header length in bytes.
pub const REPLY_HEADER_LEN: usize = 6;
/// Maximum packet size: header plus payload.
pub const MAX_FRAME_SIZE: usize = 8 * 1024;
/// Size of one chunk of engineering data.
pub const ENGDATA_CHUNK_SIZE: usize = 512;
/// Bit set in an engineering-data stream to mark the last chunk.
pub const FINAL_PACKET: u16 = 0x8000;

// ============================================================================
// Checksum
// ============================================================================

/// Seed for every protocol checksum computation.
pub const CHECKSUM_SEED: u16 = 0xFFFF;

// ============================================================================
// Firmware Revisions
// ============================================================================

/// First firmware revision whose sensor-info record carries a SKU field.
pub const POST_SKU_CHANGE_FW: u16 = 4100;
