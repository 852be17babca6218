//! Chip select control
//!
//! CS is wired to the probe's nTRST pin. TRST idles high (reset released),
//! so asserting CS means clearing TRST and de-asserting means setting it.

use crate::error::{Error, Result};
use crate::probe::JtagProbe;

/// Assert (`enabled = true`) or de-assert the chip select line
///
/// Failures are reported as-is and never retried.
pub fn set_cs<P: JtagProbe + ?Sized>(probe: &mut P, enabled: bool) -> Result<()> {
    let ret = if enabled {
        probe.clear_trst()
    } else {
        probe.set_trst()
    };

    ret.map_err(|source| Error::ChipSelect {
        asserted: enabled,
        source,
    })?;

    log::trace!("CS {}", if enabled { "asserted" } else { "de-asserted" });
    Ok(())
}
