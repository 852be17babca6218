//! Session configuration
//!
//! Everything the session driver needs is decided once at startup and
//! passed in as an immutable [`SessionConfig`].

use crate::buffer::MAX_TRANSFER_SIZE;
use crate::error::{Error, Result};

/// How responses are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Space-separated lowercase hex pairs, newline terminated
    #[default]
    Hex,
    /// Raw bytes
    Binary,
}

/// Interactive block length, guaranteed to be in `1..=MAX_TRANSFER_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLength(usize);

impl BlockLength {
    /// Validate a block length
    pub fn new(len: usize) -> Result<Self> {
        if len == 0 || len > MAX_TRANSFER_SIZE {
            return Err(Error::InvalidBlockLength {
                len,
                max: MAX_TRANSFER_SIZE,
            });
        }
        Ok(Self(len))
    }

    /// Length in bytes
    pub fn get(self) -> usize {
        self.0
    }
}

/// How input is framed into transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Read all input and transact it once
    #[default]
    OneShot,
    /// Transact fixed-size blocks until end of input
    Interactive(BlockLength),
}

/// What the session does once the probe is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Move data from input to the SPI bus
    Transfer(SessionMode),
    /// Only drive chip select (`true` = asserted) and stop
    ChipSelect(bool),
}

impl Default for Request {
    fn default() -> Self {
        Request::Transfer(SessionMode::OneShot)
    }
}

/// Immutable configuration of one session
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Only use the probe with this serial number
    pub serial_number: Option<u32>,
    /// Response format
    pub output: OutputFormat,
    /// Action to perform
    pub request: Request,
}
