//! Probe abstraction
//!
//! The bridge never talks to hardware directly. A backend crate implements
//! [`ProbeDriver`] to find and open devices and [`JtagProbe`] for the opened
//! handle; the session driver only consumes those two traits.

mod caps;
mod traits;

pub use caps::{Capabilities, Interface, Interfaces};
pub use traits::{JtagProbe, ProbeDriver};

use crate::error::ProbeError;

/// Parse a probe serial number
///
/// Serial numbers are plain decimal and commonly printed zero-padded to
/// twelve digits, so leading zeros are accepted. The value must fit in 32
/// bits.
pub fn parse_serial_number(s: &str) -> Result<u32, ProbeError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProbeError::InvalidSerial(s.to_string()));
    }

    let digits = s.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }

    digits
        .parse::<u32>()
        .map_err(|_| ProbeError::InvalidSerial(s.to_string()))
}
