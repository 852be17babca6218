//! Bit order conversion between SPI and JTAG
//!
//! JTAG shifts each byte out LSB first while SPI devices expect MSB first,
//! so every byte crossing the bridge is mirrored on the way out and again
//! on the way back in.

/// Reverse the bit order of a single byte (bit 0 <-> bit 7, 1 <-> 6, ...)
#[inline]
pub const fn reverse_byte(x: u8) -> u8 {
    let x = ((x >> 1) & 0x55) | ((x << 1) & 0xaa);
    let x = ((x >> 2) & 0x33) | ((x << 2) & 0xcc);
    ((x >> 4) & 0x0f) | ((x << 4) & 0xf0)
}

/// Reverse every byte of `src` into `dst`
///
/// Only `min(dst.len(), src.len())` bytes are written. Use
/// [`reverse_in_place`] when source and destination are the same buffer.
pub fn reverse_bytes(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d = reverse_byte(*s);
    }
}

/// Reverse every byte of `buf` in place
pub fn reverse_in_place(buf: &mut [u8]) {
    for b in buf.iter_mut() {
        *b = reverse_byte(*b);
    }
}
