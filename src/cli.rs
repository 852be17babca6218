//! CLI argument parsing

use crate::probes;
use clap::Parser;
use jayspi_core::probe::parse_serial_number;
use jayspi_core::{BlockLength, OutputFormat, Request, SessionConfig, SessionMode};

/// Parse a decimal probe serial number (leading zeros allowed)
fn parse_serial(s: &str) -> Result<u32, String> {
    parse_serial_number(s).map_err(|e| e.to_string())
}

/// Parse an interactive block length
fn parse_block_length(s: &str) -> Result<BlockLength, String> {
    let len = s
        .parse::<usize>()
        .map_err(|e| format!("Invalid block length: {}", e))?;
    BlockLength::new(len).map_err(|e| e.to_string())
}

/// Parse a boolean given as any non-empty prefix of "true" or "false"
fn parse_bool_prefix(s: &str) -> Result<bool, String> {
    let lower = s.to_ascii_lowercase();
    if lower.is_empty() {
        Err("Expected true or false".to_string())
    } else if "true".starts_with(&lower) {
        Ok(true)
    } else if "false".starts_with(&lower) {
        Ok(false)
    } else {
        Err(format!("Invalid boolean '{}', expected true or false", s))
    }
}

/// Check a probe name against the compiled-in backends
fn parse_probe(s: &str) -> Result<String, String> {
    probes::find_probe(s).map(str::to_string).ok_or_else(|| {
        format!(
            "Unknown probe '{}' [available: {}]",
            s,
            probes::probe_names_short()
        )
    })
}

/// Generate dynamic help text for the probe argument
fn probe_help() -> String {
    format!(
        "Probe backend to use [available: {}]",
        probes::probe_names_short()
    )
}

#[derive(Parser, Debug)]
#[command(name = "jayspi")]
#[command(author, version, about = "SPI transactions through a J-Link's JTAG pins")]
#[command(long_about = "SPI transactions through a J-Link's JTAG pins.\n\n\
    Wiring: TCK to SCK, TDI to MOSI, TDO to MISO and nTRST to CS.\n\n\
    Data to send is read from standard input and the data clocked in is \
    written to standard output, as hex by default.")]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Use the probe with this serial number
    #[arg(short, long, value_name = "SN", value_parser = parse_serial)]
    pub serial: Option<u32>,

    /// Write raw bytes instead of hex
    #[arg(short, long, conflicts_with = "cs")]
    pub binary: bool,

    /// Transfer standard input in blocks of LEN bytes until it ends
    #[arg(
        short,
        long,
        value_name = "LEN",
        value_parser = parse_block_length,
        conflicts_with = "cs"
    )]
    pub interactive: Option<BlockLength>,

    /// Only set the CS signal (true = asserted) and exit
    #[arg(short, long, value_name = "BOOL", value_parser = parse_bool_prefix)]
    pub cs: Option<bool>,

    #[arg(
        short,
        long,
        default_value = probes::default_probe(),
        value_parser = parse_probe,
        help = probe_help(),
        long_help = probes::probe_help()
    )]
    pub probe: String,

    /// List attached probes and exit
    #[arg(long, conflicts_with_all = ["cs", "interactive", "binary"])]
    pub list: bool,
}

impl Cli {
    /// Build the session configuration from the parsed flags
    pub fn session_config(&self) -> SessionConfig {
        let request = match (self.cs, self.interactive) {
            (Some(enabled), _) => Request::ChipSelect(enabled),
            (None, Some(len)) => Request::Transfer(SessionMode::Interactive(len)),
            (None, None) => Request::Transfer(SessionMode::OneShot),
        };

        SessionConfig {
            serial_number: self.serial,
            output: if self.binary {
                OutputFormat::Binary
            } else {
                OutputFormat::Hex
            },
            request,
        }
    }
}
