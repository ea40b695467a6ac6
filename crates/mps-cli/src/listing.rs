//! Command-table listing (`--list` output).
//!
//! Prints every command with its precomputed request frame, so a captured
//! bus trace can be checked byte for byte against the table.

use mps_protocol::{encode_request, REQUEST_HEADER_LEN};

struct ListedCommand {
    name: &'static str,
    command_id: u8,
    payload: Option<u8>,
}

fn listed_commands() -> Vec<ListedCommand> {
    use mps_protocol::*;

    let mut commands = vec![ListedCommand {
        name: "ANSWER",
        command_id: CMD_ANSWER,
        payload: None,
    }];

    #[cfg(feature = "flammable")]
    {
        commands.push(ListedCommand {
            name: "CONC",
            command_id: CMD_CONC,
            payload: None,
        });
        commands.push(ListedCommand {
            name: "ID",
            command_id: CMD_ID,
            payload: None,
        });
    }

    commands.extend([
        ListedCommand {
            name: "TEMP",
            command_id: CMD_TEMP,
            payload: None,
        },
        ListedCommand {
            name: "PRES",
            command_id: CMD_PRES,
            payload: None,
        },
        ListedCommand {
            name: "REL_HUM",
            command_id: CMD_REL_HUM,
            payload: None,
        },
        ListedCommand {
            name: "ABS_HUM",
            command_id: CMD_ABS_HUM,
            payload: None,
        },
        ListedCommand {
            name: "STATUS",
            command_id: CMD_STATUS,
            payload: None,
        },
        ListedCommand {
            name: "VERSION",
            command_id: CMD_VERSION,
            payload: None,
        },
        ListedCommand {
            name: "SENSOR_INFO",
            command_id: CMD_SENSOR_INFO,
            payload: None,
        },
        ListedCommand {
            name: "MEAS (start ISO)",
            command_id: CMD_MEAS,
            payload: Some(MEAS_START_ISO),
        },
        ListedCommand {
            name: "MEAS (start IEC)",
            command_id: CMD_MEAS,
            payload: Some(MEAS_START_IEC),
        },
        ListedCommand {
            name: "MEAS (stop)",
            command_id: CMD_MEAS,
            payload: Some(MEAS_STOP),
        },
        ListedCommand {
            name: "SHUTDOWN",
            command_id: CMD_SHUTDOWN,
            payload: None,
        },
    ]);

    commands
}

/// Print the command table with computed request frames.
pub fn print() {
    println!();
    println!("MPS Sensor UART API Commands");
    println!();
    println!("Code  Command           CMD_ID    | Length    | Reserved  | Checksum  | Payload");
    println!("--------------------------------------------------------------------------------");

    for command in listed_commands() {
        let payload: &[u8] = match &command.payload {
            Some(byte) => std::slice::from_ref(byte),
            None => &[],
        };
        let frame = encode_request(command.command_id, payload);

        print!("0x{:02X}  {:16}  ", command.command_id, command.name);
        for (offset, pair) in frame[..REQUEST_HEADER_LEN].chunks(2).enumerate() {
            if offset > 0 {
                print!(" | ");
            }
            print!("0x{:02X} 0x{:02X}", pair[0], pair[1]);
        }
        print!(" |");
        for byte in &frame[REQUEST_HEADER_LEN..] {
            print!(" 0x{byte:02X}");
        }
        println!();
    }
    println!();
}
