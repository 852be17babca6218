//! SPI transactions over JTAG
//!
//! A transaction frames one JTAG data shift with chip select:
//!
//! ```text
//! CS assert -> reverse MOSI -> jtag_io(len * 8 bits) -> CS de-assert -> reverse MISO
//! ```
//!
//! TCK acts as SCK, TDI as MOSI and TDO as MISO. Because JTAG shifts LSB
//! first, the payload is bit-reversed in both directions.

use crate::bitrev::{reverse_bytes, reverse_in_place};
use crate::buffer::{TransferBuffer, MAX_TRANSFER_SIZE};
use crate::cs::set_cs;
use crate::error::{Error, ProbeError, Result};
use crate::probe::JtagProbe;

/// Run one SPI transaction and return the bytes clocked in
///
/// Either every step succeeds or an error is returned; a partially filled
/// response is never handed back. When the exchange itself fails, CS is left
/// asserted for the caller to clean up.
///
/// Empty transfers are legal and still toggle CS.
pub fn transact<P: JtagProbe + ?Sized>(probe: &mut P, mosi: &[u8]) -> Result<TransferBuffer> {
    let len = mosi.len();
    if len > MAX_TRANSFER_SIZE {
        return Err(Error::TransferTooLarge {
            len,
            max: MAX_TRANSFER_SIZE,
        });
    }

    set_cs(probe, true)?;

    let mut tdi = TransferBuffer::zeroed(len)?;
    reverse_bytes(&mut tdi, mosi);

    let tdo = probe.jtag_io(&tdi, tdi.bit_count()).map_err(Error::Exchange)?;
    if tdo.len() != len {
        return Err(Error::Exchange(ProbeError::InvalidResponse(format!(
            "expected {} TDO bytes, got {}",
            len,
            tdo.len()
        ))));
    }

    set_cs(probe, false)?;

    let mut miso = TransferBuffer::from_slice(&tdo)?;
    reverse_in_place(&mut miso);

    log::debug!("transferred {} bytes", len);
    Ok(miso)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitrev::reverse_byte;
    use crate::testing::{Call, FailAt, MockProbe};

    #[test]
    fn test_round_trip_through_echo() {
        let mut probe = MockProbe::new(1);
        let data: Vec<u8> = (0..=255).collect();
        let miso = transact(&mut probe, &data).unwrap();
        assert_eq!(&miso[..], &data[..]);
    }

    #[test]
    fn test_call_order() {
        let mut probe = MockProbe::new(1);
        transact(&mut probe, &[0x9f, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(
            probe.calls(),
            vec![Call::ClearTrst, Call::JtagIo { bits: 32 }, Call::SetTrst]
        );
    }

    #[test]
    fn test_tdi_is_bit_reversed() {
        let mut probe = MockProbe::new(1);
        transact(&mut probe, &[0x01, 0x9f]).unwrap();
        assert_eq!(
            probe.last_tdi(),
            Some(vec![reverse_byte(0x01), reverse_byte(0x9f)])
        );
    }

    #[test]
    fn test_response_is_bit_reversed() {
        // Device drives 0xc2 0x20 on MISO, which arrives LSB first on TDO
        let mut probe = MockProbe::new(1).respond_with(vec![reverse_byte(0xc2), reverse_byte(0x20)]);
        let miso = transact(&mut probe, &[0, 0]).unwrap();
        assert_eq!(&miso[..], &[0xc2, 0x20]);
    }

    #[test]
    fn test_zero_length_toggles_cs() {
        let mut probe = MockProbe::new(1);
        let miso = transact(&mut probe, &[]).unwrap();
        assert!(miso.is_empty());
        assert_eq!(
            probe.calls(),
            vec![Call::ClearTrst, Call::JtagIo { bits: 0 }, Call::SetTrst]
        );
    }

    #[test]
    fn test_max_size_round_trip() {
        let mut probe = MockProbe::new(1);
        let data = vec![0x5a; MAX_TRANSFER_SIZE];
        let miso = transact(&mut probe, &data).unwrap();
        assert_eq!(miso.len(), MAX_TRANSFER_SIZE);
        assert_eq!(
            probe.calls()[1],
            Call::JtagIo {
                bits: MAX_TRANSFER_SIZE * 8
            }
        );
    }

    #[test]
    fn test_oversize_rejected_before_cs() {
        let mut probe = MockProbe::new(1);
        let data = vec![0; MAX_TRANSFER_SIZE + 1];
        assert!(matches!(
            transact(&mut probe, &data),
            Err(Error::TransferTooLarge { .. })
        ));
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn test_assert_failure_stops_early() {
        let mut probe = MockProbe::new(1).fail_at(FailAt::ClearTrst);
        assert!(matches!(
            transact(&mut probe, &[1, 2, 3]),
            Err(Error::ChipSelect { asserted: true, .. })
        ));
        assert_eq!(probe.calls(), vec![Call::ClearTrst]);
    }

    #[test]
    fn test_exchange_failure_leaves_cs_asserted() {
        let mut probe = MockProbe::new(1).fail_at(FailAt::JtagIo);
        assert!(matches!(
            transact(&mut probe, &[1, 2, 3]),
            Err(Error::Exchange(_))
        ));
        assert_eq!(
            probe.calls(),
            vec![Call::ClearTrst, Call::JtagIo { bits: 24 }]
        );
    }

    #[test]
    fn test_deassert_failure_is_reported() {
        let mut probe = MockProbe::new(1).fail_at(FailAt::SetTrst);
        assert!(matches!(
            transact(&mut probe, &[1]),
            Err(Error::ChipSelect {
                asserted: false,
                ..
            })
        ));
    }

    #[test]
    fn test_short_response_rejected() {
        let mut probe = MockProbe::new(1).respond_with(vec![0xff]);
        assert!(matches!(
            transact(&mut probe, &[1, 2]),
            Err(Error::Exchange(ProbeError::InvalidResponse(_)))
        ));
    }
}
