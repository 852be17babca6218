//! jayspi-core - SPI transactions over a JTAG debug probe
//!
//! This crate drives an SPI device through the JTAG pins of a debug probe:
//! TCK is SCK, TDI is MOSI, TDO is MISO and the probe's nTRST pin is chip
//! select. Probe backends plug in through the [`probe::JtagProbe`] and
//! [`probe::ProbeDriver`] traits.
//!
//! # Example
//!
//! ```ignore
//! use jayspi_core::{session, SessionConfig};
//!
//! fn read_jedec_id<D: jayspi_core::probe::ProbeDriver>(driver: &mut D) {
//!     let config = SessionConfig::default();
//!     let input: &[u8] = &[0x9f, 0, 0, 0];
//!     session::run(driver, &config, input, std::io::stdout()).unwrap();
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bitrev;
pub mod buffer;
pub mod config;
pub mod cs;
pub mod error;
pub mod probe;
pub mod session;
pub mod transfer;

#[cfg(test)]
mod testing;

pub use buffer::{TransferBuffer, MAX_TRANSFER_SIZE};
pub use config::{BlockLength, OutputFormat, Request, SessionConfig, SessionMode};
pub use error::{Error, ProbeError, Result};
