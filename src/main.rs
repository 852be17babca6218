//! jayspi - SPI master emulation over a debug probe's JTAG pins
//!
//! Wire an SPI device to a J-Link like this:
//!
//! | J-Link | SPI  |
//! |--------|------|
//! | TCK    | SCK  |
//! | TDI    | MOSI |
//! | TDO    | MISO |
//! | nTRST  | CS   |
//!
//! The bytes to send are read from standard input. The bytes clocked in
//! are written to standard output, either as hex or raw.

mod cli;
mod probes;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Default level from verbosity, RUST_LOG still wins
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = if cli.list {
        probes::list(&cli.probe)
    } else {
        let config = cli.session_config();
        log::debug!("session config: {:?}", config);
        probes::run(&cli.probe, &config)
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
