//! Fixed-capacity transfer buffer
//!
//! The JTAG I/O command carries a 16-bit bit count, so a single transaction
//! can move at most `u16::MAX / 8` whole bytes. [`TransferBuffer`] holds up
//! to that many bytes inline and refuses anything larger.

use core::ops::{Deref, DerefMut};

use crate::error::{Error, Result};

/// Largest number of bytes a single transaction can move
pub const MAX_TRANSFER_SIZE: usize = u16::MAX as usize / 8;

/// Byte buffer with capacity [`MAX_TRANSFER_SIZE`]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TransferBuffer {
    data: heapless::Vec<u8, MAX_TRANSFER_SIZE>,
}

impl TransferBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding a copy of `bytes`
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let mut buf = Self::new();
        buf.extend_from_slice(bytes)?;
        Ok(buf)
    }

    /// Create a buffer of `len` zero bytes
    pub fn zeroed(len: usize) -> Result<Self> {
        let mut buf = Self::new();
        buf.data
            .resize(len, 0)
            .map_err(|_| Error::TransferTooLarge {
                len,
                max: MAX_TRANSFER_SIZE,
            })?;
        Ok(buf)
    }

    /// Append `bytes`, failing without modification if they do not fit
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<()> {
        let len = self.data.len() + bytes.len();
        self.data
            .extend_from_slice(bytes)
            .map_err(|_| Error::TransferTooLarge {
                len,
                max: MAX_TRANSFER_SIZE,
            })
    }

    /// Number of payload bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of JTAG clock cycles needed to shift the whole buffer
    pub fn bit_count(&self) -> usize {
        self.data.len() * 8
    }
}

impl Deref for TransferBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for TransferBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl core::fmt::Debug for TransferBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "TransferBuffer({} bytes: {:02x?})", self.len(), &self.data[..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_transfer_size() {
        assert_eq!(MAX_TRANSFER_SIZE, 8191);
    }

    #[test]
    fn test_from_slice_fits() {
        let buf = TransferBuffer::from_slice(&[1, 2, 3]).unwrap();
        assert_eq!(&buf[..], &[1, 2, 3]);
        assert_eq!(buf.bit_count(), 24);
    }

    #[test]
    fn test_full_buffer_accepted() {
        let data = vec![0xa5; MAX_TRANSFER_SIZE];
        let buf = TransferBuffer::from_slice(&data).unwrap();
        assert_eq!(buf.len(), MAX_TRANSFER_SIZE);
        assert_eq!(buf.bit_count(), 65528);
    }

    #[test]
    fn test_oversize_rejected() {
        let data = vec![0; MAX_TRANSFER_SIZE + 1];
        match TransferBuffer::from_slice(&data) {
            Err(Error::TransferTooLarge { len, max }) => {
                assert_eq!(len, MAX_TRANSFER_SIZE + 1);
                assert_eq!(max, MAX_TRANSFER_SIZE);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_extend_failure_leaves_contents() {
        let mut buf = TransferBuffer::zeroed(MAX_TRANSFER_SIZE - 1).unwrap();
        assert!(buf.extend_from_slice(&[1, 2]).is_err());
        assert_eq!(buf.len(), MAX_TRANSFER_SIZE - 1);
        buf.extend_from_slice(&[7]).unwrap();
        assert_eq!(buf[MAX_TRANSFER_SIZE - 1], 7);
    }
}
