//! MPS sensor UART test client — entry point.
//!
//! Opens the serial link, dispatches one command through the protocol
//! engine, prints the decoded value, and exits with the final status code
//! (0 on success, the sensor's status byte or 0xFF on local failure
//! otherwise).
//!
//! ```text
//! mpsctl -c 0x21                      read the temperature on /dev/serial0
//! mpsctl -D /dev/ttyUSB -p 1 -c 0x42  read version info on /dev/ttyUSB1
//! mpsctl -c 0x61 -v 0x02              start measuring (ISO)
//! mpsctl -c 0x09 -f /tmp/eng.bin      append one engineering-data chunk
//! mpsctl -l                           list the command table
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::debug;
use mps_protocol::{CommandOutput, SensorClient, SessionConfig, UartSession};

mod listing;
mod serial;

/// MPS sensor UART test client.
#[derive(Debug, Parser)]
#[command(name = "mpsctl", about = "Exercise the MPS sensor UART API")]
struct Cli {
    /// Command code to execute, in hex (e.g. 0x61).
    #[arg(short = 'c', long, value_parser = parse_hex_byte)]
    command: Option<u8>,

    /// Serial device family, a path prefix without the port number.
    #[arg(short = 'D', long, default_value = serial::DEV_AMA)]
    device: String,

    /// COM port number appended to the device prefix.
    #[arg(short = 'p', long, default_value_t = 0)]
    port: u32,

    /// Parameter byte sent with the command, in hex (e.g. 0x02).
    #[arg(short = 'v', long, value_parser = parse_hex_byte)]
    value: Option<u8>,

    /// Output file for engineering data (appended).
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,

    /// Resend attempts after a failed receive.
    #[arg(short = 'r', long, default_value_t = 0)]
    retries: u32,

    /// Log request and reply headers.
    #[arg(short = 'V', long)]
    verbose: bool,

    /// Log raw frame bytes (implies --verbose).
    #[arg(short = 'x', long)]
    hexdump: bool,

    /// List the command table with precomputed request frames.
    #[arg(short = 'l', long)]
    list: bool,
}

fn parse_hex_byte(arg: &str) -> Result<u8, String> {
    let digits = arg
        .strip_prefix("0x")
        .or_else(|| arg.strip_prefix("0X"))
        .unwrap_or(arg);
    u8::from_str_radix(digits, 16).map_err(|err| format!("invalid hex byte {arg:?}: {err}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.hexdump {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if cli.list {
        listing::print();
        return ExitCode::SUCCESS;
    }

    let Some(command) = cli.command else {
        eprintln!("no command given; use -c <cmdID> or -l to list commands");
        eprintln!(
            "devices: {}<n> (default), {}<n>, {}<n>",
            serial::DEV_AMA,
            serial::DEV_USB,
            serial::DEV_ACM
        );
        return ExitCode::FAILURE;
    };

    let transport = match serial::SerialTransport::open(&cli.device, cli.port) {
        Ok(transport) => transport,
        Err(err) => {
            eprintln!(
                "unable to open {}{}: {} (is the sensor powered on?)",
                cli.device, cli.port, err
            );
            return ExitCode::FAILURE;
        }
    };

    let config = SessionConfig {
        retry_budget: cli.retries,
        verbose: cli.verbose || cli.hexdump,
        hexdump: cli.hexdump,
    };
    let mut client = SensorClient::new(UartSession::new(transport, config));

    let mut sink = match &cli.file {
        Some(path) => match OpenOptions::new().append(true).create(true).open(path) {
            Ok(file) => Some(file),
            Err(err) => {
                eprintln!("cannot open {}: {}", path.display(), err);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    debug!("executing command 0x{command:02X}");
    let result = client.execute(
        command,
        cli.value,
        sink.as_mut().map(|file| file as &mut dyn Write),
    );

    match result {
        Ok(output) => {
            print_output(command, &output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("command 0x{command:02X} failed: {err}");
            ExitCode::from(err.status_code())
        }
    }
}

fn print_output(command: u8, output: &CommandOutput) {
    match output {
        CommandOutput::Float(value) => println!("Command[0x{command:02X}]: {value}"),
        CommandOutput::Integer(value) => println!("Command[0x{command:02X}]: {value}"),
        CommandOutput::Byte(value) => println!("Command[0x{command:02X}]: 0x{value:02X}"),
        CommandOutput::Version(version) => {
            println!(
                "SW Version: {}.{}.{}.{}",
                version.sw_major, version.sw_minor, version.sw_patch, version.sw_build
            );
            println!("HW Version: {}.{}", version.hw_major, version.hw_minor);
            println!(
                "Protocol: {}.{}",
                version.protocol_major, version.protocol_minor
            );
        }
        CommandOutput::SensorInfo(info) => {
            println!("Serial Number: {}", info.serial_number);
            println!("Sensor Type: {}", info.sensor_type);
            if let Some(sku) = &info.sku {
                println!("SKU: {sku}");
            }
            println!("Calibration Date: {}", info.calibration_date);
            println!("Manufactured Date: {}", info.manufacturing_date);
        }
        CommandOutput::Answer(answer) => {
            println!("Cycle: {}", answer.cycle_count);
            println!("Gas: {}", answer.gas_id);
            println!("Concentration: {}", answer.concentration);
            println!("TEMP: {}", answer.temperature);
            println!("PRESS: {}", answer.pressure);
            println!("REL_HUM: {}", answer.relative_humidity);
            println!("ABS_HUM: {}", answer.absolute_humidity);
        }
        CommandOutput::EngData(chunk) => {
            println!("appended {} bytes of engineering data", chunk.length + 4);
        }
        CommandOutput::Empty => {}
    }
}
