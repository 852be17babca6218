//! J-Link USB protocol constants and command encoding
//!
//! Every command is a single bulk OUT transfer starting with the command
//! byte. Responses, where there are any, arrive on the bulk IN endpoint.

use std::time::Duration;

use jayspi_core::ProbeError;
use nusb::descriptors::TransferType;

use crate::error::{JLinkError, Result};

// USB identifiers
pub const JLINK_USB_VENDOR: u16 = 0x1366;

// The J-Link interface uses vendor-specific class, subclass and protocol
pub const JLINK_INTERFACE_CLASS: u8 = 0xFF;
pub const JLINK_INTERFACE_SUBCLASS: u8 = 0xFF;
pub const JLINK_INTERFACE_PROTOCOL: u8 = 0xFF;

pub const USB_TIMEOUT: Duration = Duration::from_millis(500);

/// J-Link command bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Version = 0x01,
    SelectIf = 0xC7,
    HwJtag2 = 0xCE,
    HwJtag3 = 0xCF,
    HwTrst0 = 0xDE,
    HwTrst1 = 0xDF,
    GetCaps = 0xE8,
    GetCapsEx = 0xED,
}

/// `SELECT_IF` argument that queries the available interfaces
pub const SELECT_IF_QUERY: u8 = 0xFF;

// Response sizes
pub const CAPS_EX_LEN: usize = 32;
pub const VERSION_HEADER_LEN: usize = 2;

/// Build a `HW_JTAG2` / `HW_JTAG3` frame
///
/// Layout: command, one alignment byte, bit count (u16 LE), TMS bytes, TDI
/// bytes. TMS and TDI carry the same number of bytes.
pub fn jtag_frame(cmd: Command, tms: &[u8], tdi: &[u8], bit_count: usize) -> Result<Vec<u8>> {
    let bits = u16::try_from(bit_count).map_err(|_| JLinkError::TooManyBits(bit_count))?;
    let nbytes = bit_count.div_ceil(8);

    let mut frame = Vec::with_capacity(4 + nbytes * 2);
    frame.push(cmd as u8);
    frame.push(0);
    frame.extend_from_slice(&bits.to_le_bytes());
    frame.extend_from_slice(&tms[..nbytes]);
    frame.extend_from_slice(&tdi[..nbytes]);
    Ok(frame)
}

/// Pick the IN and OUT endpoint addresses of a vendor-specific interface
///
/// `endpoints` holds the address and transfer type of every endpoint in the
/// interface. Only interfaces with exactly two bulk endpoints qualify.
pub fn select_endpoints(endpoints: &[(u8, TransferType)]) -> Option<(u8, u8)> {
    let [(first, first_type), (second, second_type)] = endpoints else {
        log::warn!(
            "vendor-specific interface with {} endpoints, expected 2 (skipping)",
            endpoints.len()
        );
        return None;
    };

    if *first_type != TransferType::Bulk || *second_type != TransferType::Bulk {
        log::warn!(
            "non-bulk endpoints {:#04x} ({:?}) and {:#04x} ({:?}), skipping interface",
            first,
            first_type,
            second,
            second_type
        );
        return None;
    }

    // Bit 7 of the address is the IN direction
    if first & 0x80 != 0 {
        Some((*first, *second))
    } else {
        Some((*second, *first))
    }
}

/// Number of bytes a JTAG shift of `bit_count` bits answers with
///
/// `HW_JTAG3` appends a status byte after the TDO data.
pub fn jtag_response_len(bit_count: usize, jtag3: bool) -> usize {
    bit_count.div_ceil(8) + usize::from(jtag3)
}

/// Split the TDO data from a JTAG shift response
///
/// For `HW_JTAG3` the trailing status byte must be zero.
pub fn decode_jtag_response(
    mut response: Vec<u8>,
    jtag3: bool,
) -> std::result::Result<Vec<u8>, ProbeError> {
    if jtag3 {
        match response.pop() {
            Some(0) => {}
            Some(status) => return Err(ProbeError::Status(status)),
            None => {
                return Err(ProbeError::InvalidResponse(
                    "JTAG response without status byte".to_string(),
                ))
            }
        }
    }
    Ok(response)
}

/// Decode the firmware version string
///
/// The string may be padded with NUL bytes; only what precedes the first NUL
/// counts. An empty string yields `None`.
pub fn parse_firmware_version(raw: &[u8]) -> Option<String> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let version = String::from_utf8_lossy(&raw[..end]).trim_end().to_string();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

/// Interpret a 4-byte little-endian response word
pub fn le_u32(raw: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*raw)
}
