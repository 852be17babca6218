//! Error types for jayspi-core
//!
//! [`ProbeError`] is what a probe backend reports. [`Error`] is what the
//! transaction engine and session driver report, grouped into configuration,
//! device and transfer failures.

use thiserror::Error;

use crate::probe::Interface;

/// Failure reported by a probe backend
#[derive(Debug, Error)]
pub enum ProbeError {
    /// USB level failure (open, claim, transfer)
    #[error("USB error: {0}")]
    Usb(String),

    /// The probe did not answer in time
    #[error("timeout while talking to the probe")]
    Timeout,

    /// A JTAG I/O command returned a nonzero status byte
    #[error("probe I/O command returned error code {0:#x}")]
    Status(u8),

    /// The probe lacks a capability required for the operation
    #[error("probe is missing capability {0}")]
    MissingCapability(&'static str),

    /// The probe does not support the requested target interface
    #[error("probe does not support target interface {0}")]
    InterfaceNotSupported(Interface),

    /// The probe sent something we could not make sense of
    #[error("invalid response from probe: {0}")]
    InvalidResponse(String),

    /// A serial number string could not be parsed
    #[error("invalid serial number: {0}")]
    InvalidSerial(String),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

/// Errors from the transaction engine and session driver
#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors
    /// More than one device attached and no serial number given
    #[error("multiple devices found ({count}), use the serial number to select a specific device")]
    AmbiguousDevice {
        /// Number of discovered devices
        count: usize,
    },

    /// Interactive block length outside `1..=MAX_TRANSFER_SIZE`
    #[error("invalid block length {len}, must be between 1 and {max}")]
    InvalidBlockLength {
        /// Requested length
        len: usize,
        /// Maximum transfer size
        max: usize,
    },

    /// No backend with this name is compiled in
    #[error("unknown probe backend '{0}'")]
    UnknownProbe(String),

    // Device errors
    /// No device matched the selection
    #[error("no J-Link device found")]
    DeviceNotFound,

    /// A probe operation failed while bringing the device up
    #[error("{op} failed: {source}")]
    Probe {
        /// Name of the failed operation
        op: &'static str,
        /// Underlying probe error
        #[source]
        source: ProbeError,
    },

    /// The device advertises interface selection but has no JTAG
    #[error("device does not support JTAG")]
    JtagUnsupported,

    // Transfer errors
    /// Driving the chip select line failed
    #[error("failed to {} CS signal: {source}", cs_verb(.asserted))]
    ChipSelect {
        /// Requested CS state
        asserted: bool,
        /// Underlying probe error
        #[source]
        source: ProbeError,
    },

    /// The JTAG bit exchange failed
    #[error("JTAG transfer failed: {0}")]
    Exchange(#[source] ProbeError),

    /// A transfer exceeds the protocol's bit count limit
    #[error("transfer of {len} bytes exceeds maximum transfer size of {max} bytes")]
    TransferTooLarge {
        /// Requested length
        len: usize,
        /// Maximum transfer size
        max: usize,
    },

    /// More input than fits in one transfer
    #[error("too much input data, maximum transfer size is {max} bytes")]
    TooMuchInput {
        /// Maximum transfer size
        max: usize,
    },

    /// Input ended in the middle of an interactive block
    #[error("input ended after {received} of {expected} bytes of a block")]
    TruncatedBlock {
        /// Block length
        expected: usize,
        /// Bytes read before end of input
        received: usize,
    },

    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn cs_verb(asserted: &bool) -> &'static str {
    if *asserted {
        "assert"
    } else {
        "de-assert"
    }
}

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a probe error raised by operation `op`
    pub fn probe(op: &'static str) -> impl FnOnce(ProbeError) -> Error {
        move |source| Error::Probe { op, source }
    }
}
