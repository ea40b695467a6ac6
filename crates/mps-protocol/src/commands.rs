//! The static command table.
//!
//! Every command the sensor understands has one entry naming its request
//! and reply payload sizes. Lookup is by raw command code; a code with no
//! entry is an error, never a default.

use crate::constants::*;
use crate::error::ProtocolError;
use crate::values::{Answer, EngDataChunk, SensorInfo, VersionInfo};

/// Request/reply payload shape for one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Command code.
    pub command_id: u8,
    /// Request payload size in bytes.
    pub request_size: u16,
    /// Expected reply payload size in bytes.
    ///
    /// For SENSOR_INFO this is the pre-SKU size; the client recomputes the
    /// expectation per call from the reporting firmware revision.
    pub response_size: u16,
}

/// Commands available in every build.
const COMMAND_TABLE: &[CommandSpec] = &[
    CommandSpec {
        command_id: CMD_ANSWER,
        request_size: 0,
        response_size: Answer::WIRE_SIZE as u16,
    },
    CommandSpec {
        command_id: CMD_ENGDATA,
        request_size: 0,
        response_size: EngDataChunk::MAX_WIRE_SIZE as u16,
    },
    CommandSpec {
        command_id: CMD_TEMP,
        request_size: 0,
        response_size: 4,
    },
    CommandSpec {
        command_id: CMD_PRES,
        request_size: 0,
        response_size: 4,
    },
    CommandSpec {
        command_id: CMD_REL_HUM,
        request_size: 0,
        response_size: 4,
    },
    CommandSpec {
        command_id: CMD_ABS_HUM,
        request_size: 0,
        response_size: 4,
    },
    CommandSpec {
        command_id: CMD_STATUS,
        request_size: 0,
        response_size: 1,
    },
    CommandSpec {
        command_id: CMD_VERSION,
        request_size: 0,
        response_size: VersionInfo::WIRE_SIZE as u16,
    },
    CommandSpec {
        command_id: CMD_SENSOR_INFO,
        request_size: 0,
        response_size: SensorInfo::WIRE_SIZE_NO_SKU as u16,
    },
    CommandSpec {
        command_id: CMD_MEAS,
        request_size: 1,
        response_size: 0,
    },
    CommandSpec {
        command_id: CMD_SHUTDOWN,
        request_size: 0,
        response_size: 0,
    },
];

/// Commands present only in the flammable-gas build variant.
#[cfg(feature = "flammable")]
const FLAMMABLE_TABLE: &[CommandSpec] = &[
    CommandSpec {
        command_id: CMD_CONC,
        request_size: 0,
        response_size: 4,
    },
    CommandSpec {
        command_id: CMD_ID,
        request_size: 0,
        response_size: 4,
    },
];

/// Look up the table entry for a raw command code.
pub fn lookup(code: u8) -> Result<CommandSpec, ProtocolError> {
    all_commands()
        .find(|spec| spec.command_id == code)
        .ok_or(ProtocolError::UnknownCommand(code))
}

/// All commands known to this build, in table order.
pub fn all_commands() -> impl Iterator<Item = CommandSpec> {
    #[cfg(feature = "flammable")]
    let extra = FLAMMABLE_TABLE.iter().copied();
    #[cfg(not(feature = "flammable"))]
    let extra = std::iter::empty();

    COMMAND_TABLE.iter().copied().chain(extra)
}

/// Measurement-mode payload byte carried by CMD_MEAS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementMode {
    /// Start continuous measurement, ISO mode.
    StartIso,
    /// Start continuous measurement, IEC mode.
    StartIec,
    /// Stop measurement.
    Stop,
}

impl MeasurementMode {
    /// The payload byte for this mode.
    pub fn code(&self) -> u8 {
        match self {
            MeasurementMode::StartIso => MEAS_START_ISO,
            MeasurementMode::StartIec => MEAS_START_IEC,
            MeasurementMode::Stop => MEAS_STOP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_command() {
        let spec = lookup(CMD_STATUS).expect("STATUS is in the table");
        assert_eq!(spec.request_size, 0);
        assert_eq!(spec.response_size, 1);
    }

    #[test]
    fn test_lookup_unknown_command_is_an_error() {
        let err = lookup(0x99).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownCommand(0x99)));
    }

    #[test]
    fn test_measurement_commands_take_one_byte() {
        let spec = lookup(CMD_MEAS).unwrap();
        assert_eq!(spec.request_size, 1);
        assert_eq!(spec.response_size, 0);
    }

    #[test]
    fn test_table_has_no_duplicate_codes() {
        let codes: Vec<u8> = all_commands().map(|spec| spec.command_id).collect();
        let mut deduped = codes.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(codes.len(), deduped.len());
    }
}
