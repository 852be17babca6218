//! Probe trait definitions

use super::{Capabilities, Interface, Interfaces};
use crate::error::ProbeError;

/// An opened debug probe with JTAG pin control
///
/// Dropping the value closes the connection. Implementations must release
/// every resource they hold in `Drop`, since the session driver relies on
/// that for cleanup on error paths.
pub trait JtagProbe {
    /// Serial number of the opened probe
    fn serial_number(&self) -> u32;

    /// Read the firmware version string
    ///
    /// Returns `None` when the probe reports an empty version.
    fn firmware_version(&mut self) -> Result<Option<String>, ProbeError>;

    /// Read the legacy capability report
    fn capabilities(&mut self) -> Result<Capabilities, ProbeError>;

    /// Read the extended capability report
    ///
    /// Only valid when [`Capabilities::GET_CAPS_EX`] is advertised.
    fn extended_capabilities(&mut self) -> Result<Capabilities, ProbeError>;

    /// Read the set of target interfaces the probe supports
    ///
    /// Only valid when [`Capabilities::SELECT_IF`] is advertised.
    fn available_interfaces(&mut self) -> Result<Interfaces, ProbeError>;

    /// Switch the probe to target interface `intf`
    fn select_interface(&mut self, intf: Interface) -> Result<(), ProbeError>;

    /// Drive the TRST line high
    fn set_trst(&mut self) -> Result<(), ProbeError>;

    /// Drive the TRST line low
    fn clear_trst(&mut self) -> Result<(), ProbeError>;

    /// Shift `bit_count` bits of `tdi` out and return the bits shifted in
    ///
    /// Bits go out LSB first within each byte. The returned buffer holds
    /// `bit_count.div_ceil(8)` bytes of TDO data.
    fn jtag_io(&mut self, tdi: &[u8], bit_count: usize) -> Result<Vec<u8>, ProbeError>;
}

/// Discovery and opening of probes of one kind
pub trait ProbeDriver {
    /// Handle to a discovered, not yet opened device
    type Device;
    /// Opened probe type
    type Probe: JtagProbe;

    /// Enumerate attached devices
    fn discover(&mut self) -> Result<Vec<Self::Device>, ProbeError>;

    /// Serial number of a discovered device
    fn serial_number(&self, device: &Self::Device) -> Result<u32, ProbeError>;

    /// Open a discovered device
    fn open(&mut self, device: &Self::Device) -> Result<Self::Probe, ProbeError>;
}
