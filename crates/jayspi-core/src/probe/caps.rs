//! Probe capability and target interface sets

use bitflags::bitflags;
use core::fmt;

bitflags! {
    /// Capabilities advertised by a probe
    ///
    /// The legacy report is 32 bits wide; the extended report is 256 bits,
    /// of which only the low 128 carry anything we know about.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u128 {
        /// Hardware version can be queried
        const GET_HW_VERSION = 1 << 1;
        /// Adaptive clocking via RTCK
        const ADAPTIVE_CLOCKING = 1 << 3;
        /// Supported speeds can be queried
        const SPEED_INFO = 1 << 9;
        /// Kickstart power can be switched
        const SET_KS_POWER = 1 << 13;
        /// Target interface selection (JTAG, SWD, ...)
        const SELECT_IF = 1 << 17;
        /// SWO trace capture
        const SWO = 1 << 23;
        /// Extended capability report available
        const GET_CAPS_EX = 1 << 31;
        /// Write-only JTAG command
        const HW_JTAG_WRITE = 1 << 32;
        /// Virtual COM port
        const COM = 1 << 33;
    }
}

impl Capabilities {
    /// Build from the 32-bit legacy capability report
    pub fn from_legacy(raw: u32) -> Self {
        Self::from_bits_retain(u128::from(raw))
    }

    /// Build from the 32-byte extended capability report
    pub fn from_extended(raw: &[u8; 32]) -> Self {
        let mut low = [0u8; 16];
        low.copy_from_slice(&raw[..16]);
        Self::from_bits_retain(u128::from_le_bytes(low))
    }
}

/// Target interface of a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interface {
    /// IEEE 1149.1 JTAG
    Jtag = 0,
    /// Serial Wire Debug
    Swd = 1,
    /// Background Debug Mode 3
    Bdm3 = 2,
    /// Renesas FINE
    Fine = 3,
    /// PIC32 in-circuit serial programming
    Pic32Icsp = 4,
    /// Native SPI
    Spi = 5,
    /// Silicon Labs C2
    C2 = 6,
    /// IEEE 1149.7 compact JTAG
    CJtag = 7,
}

impl Interface {
    /// Interface number as used on the wire
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Single-bit mask of this interface within [`Interfaces`]
    pub fn mask(self) -> Interfaces {
        Interfaces::from_bits_retain(1 << self as u32)
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Interface::Jtag => "JTAG",
            Interface::Swd => "SWD",
            Interface::Bdm3 => "BDM3",
            Interface::Fine => "FINE",
            Interface::Pic32Icsp => "PIC32 ICSP",
            Interface::Spi => "SPI",
            Interface::C2 => "C2",
            Interface::CJtag => "cJTAG",
        })
    }
}

bitflags! {
    /// Set of target interfaces supported by a probe
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Interfaces: u32 {
        /// IEEE 1149.1 JTAG
        const JTAG = 1 << 0;
        /// Serial Wire Debug
        const SWD = 1 << 1;
        /// Background Debug Mode 3
        const BDM3 = 1 << 2;
        /// Renesas FINE
        const FINE = 1 << 3;
        /// PIC32 in-circuit serial programming
        const PIC32_ICSP = 1 << 4;
        /// Native SPI
        const SPI = 1 << 5;
        /// Silicon Labs C2
        const C2 = 1 << 6;
        /// IEEE 1149.7 compact JTAG
        const CJTAG = 1 << 7;
    }
}

impl Interfaces {
    /// Whether `intf` is in the set
    pub fn supports(self, intf: Interface) -> bool {
        self.contains(intf.mask())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_caps() {
        let caps = Capabilities::from_legacy((1 << 17) | (1 << 31) | 1);
        assert!(caps.contains(Capabilities::SELECT_IF));
        assert!(caps.contains(Capabilities::GET_CAPS_EX));
        assert!(!caps.contains(Capabilities::SWO));
        // Unknown bits are kept
        assert_eq!(caps.bits() & 1, 1);
    }

    #[test]
    fn test_extended_caps() {
        let mut raw = [0u8; 32];
        raw[2] = 0x02; // bit 17
        raw[4] = 0x02; // bit 33
        raw[20] = 0xff; // beyond what we track
        let caps = Capabilities::from_extended(&raw);
        assert!(caps.contains(Capabilities::SELECT_IF));
        assert!(caps.contains(Capabilities::COM));
        assert!(!caps.contains(Capabilities::GET_CAPS_EX));
    }

    #[test]
    fn test_interface_mask() {
        let intfs = Interfaces::from_bits_retain(0b11);
        assert!(intfs.supports(Interface::Jtag));
        assert!(intfs.supports(Interface::Swd));
        assert!(!intfs.supports(Interface::Spi));
        assert_eq!(Interface::CJtag.mask(), Interfaces::CJTAG);
    }
}
