//! Error types for the J-Link backend

use jayspi_core::ProbeError;
use nusb::transfer::TransferError;
use thiserror::Error;

/// J-Link specific errors
#[derive(Debug, Error)]
pub enum JLinkError {
    /// Failed to open the USB device
    #[error("failed to open J-Link: {0}")]
    OpenFailed(String),

    /// The device has no usable vendor-specific interface
    #[error("device is not a J-Link device")]
    NoJLinkInterface,

    /// Failed to claim the J-Link interface
    #[error("failed to claim interface {intf}: {msg}")]
    ClaimFailed {
        /// Interface number
        intf: u8,
        /// nusb error text
        msg: String,
    },

    /// USB transfer failed
    #[error("USB transfer failed: {0}")]
    TransferFailed(String),

    /// USB transfer did not complete in time
    #[error("USB transfer timed out")]
    Timeout,

    /// The device answered with fewer bytes than expected
    #[error("short read: expected {expected} bytes, got {received}")]
    ShortRead {
        /// Bytes requested
        expected: usize,
        /// Bytes received before the device stopped sending
        received: usize,
    },

    /// The device reported no serial number
    #[error("device has no serial number")]
    NoSerialNumber,

    /// JTAG shift longer than one command can carry
    #[error("JTAG shift of {0} bits exceeds the 16-bit bit count")]
    TooManyBits(usize),
}

/// Result type for J-Link operations
pub type Result<T> = std::result::Result<T, JLinkError>;

impl From<TransferError> for JLinkError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::Cancelled => JLinkError::Timeout,
            e => JLinkError::TransferFailed(e.to_string()),
        }
    }
}

impl From<JLinkError> for ProbeError {
    fn from(e: JLinkError) -> Self {
        match e {
            JLinkError::Timeout => ProbeError::Timeout,
            JLinkError::ShortRead { .. } => ProbeError::InvalidResponse(e.to_string()),
            JLinkError::NoSerialNumber => ProbeError::InvalidSerial(e.to_string()),
            e => ProbeError::Usb(e.to_string()),
        }
    }
}
