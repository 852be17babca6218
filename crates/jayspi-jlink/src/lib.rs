//! jayspi-jlink - SEGGER J-Link USB probe backend
//!
//! Talks to J-Link probes over their vendor-specific USB interface using
//! `nusb`. Only the handful of commands needed to drive SPI over the JTAG
//! pins is implemented:
//!
//! - firmware version, capabilities and extended capabilities
//! - target interface query and selection
//! - nTRST control (used as chip select)
//! - `HW_JTAG3` (or `HW_JTAG2` on older probes) bit shifting
//!
//! # Example
//!
//! ```no_run
//! use jayspi_core::probe::ProbeDriver;
//! use jayspi_jlink::JLinkDriver;
//!
//! let mut driver = JLinkDriver::new();
//! for device in driver.discover()? {
//!     println!("S/N: {:012}", driver.serial_number(&device)?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod device;
mod error;
mod protocol;

pub use device::{JLink, JLinkDriver};
pub use error::{JLinkError, Result};
