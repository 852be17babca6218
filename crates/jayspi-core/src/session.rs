//! Session driver
//!
//! A session walks through these states:
//!
//! ```text
//! Idle -> DeviceReady -> { ChipSelect | OneShot | Interactive } -> Closed
//! ```
//!
//! `DeviceReady` is reached by [`open_probe`]. `Closed` is not a separate
//! step: the probe is owned by [`run`] and dropped on every return path,
//! including early returns through `?`.

use std::io::{self, ErrorKind, Read, Write};

use crate::buffer::{TransferBuffer, MAX_TRANSFER_SIZE};
use crate::config::{BlockLength, OutputFormat, Request, SessionConfig, SessionMode};
use crate::cs::set_cs;
use crate::error::{Error, Result};
use crate::probe::{Capabilities, Interface, JtagProbe, ProbeDriver};
use crate::transfer::transact;

/// Run one complete session
///
/// In one-shot mode the whole payload is read before the probe is touched,
/// so oversized input never reaches the device.
pub fn run<D, R, W>(driver: &mut D, config: &SessionConfig, mut input: R, mut output: W) -> Result<()>
where
    D: ProbeDriver,
    R: Read,
    W: Write,
{
    let payload = match config.request {
        Request::Transfer(SessionMode::OneShot) => Some(read_payload(&mut input)?),
        _ => None,
    };

    let mut probe = open_probe(driver, config.serial_number)?;

    match (config.request, payload) {
        (Request::ChipSelect(enabled), _) => {
            set_cs(&mut probe, enabled)?;
            log::info!("CS {}", if enabled { "asserted" } else { "de-asserted" });
            Ok(())
        }
        (Request::Transfer(SessionMode::Interactive(len)), _) => {
            run_interactive(&mut probe, len, config.output, &mut input, &mut output)
        }
        (Request::Transfer(SessionMode::OneShot), payload) => {
            let payload = payload.unwrap_or_default();
            let miso = transact(&mut probe, &payload)?;
            write_response(&mut output, config.output, &miso)?;
            output.flush()?;
            Ok(())
        }
    }
}

/// Find, open and prepare a probe for SPI transfers
///
/// With no `serial` filter exactly one device may be attached. The returned
/// probe has CS de-asserted and, where the probe supports interface
/// selection, JTAG selected.
pub fn open_probe<D: ProbeDriver>(driver: &mut D, serial: Option<u32>) -> Result<D::Probe> {
    let devices = driver.discover().map_err(Error::probe("device discovery"))?;
    log::debug!("found {} device(s)", devices.len());

    if devices.len() > 1 && serial.is_none() {
        return Err(Error::AmbiguousDevice {
            count: devices.len(),
        });
    }

    let mut probe = None;
    let mut open_error = None;

    for device in &devices {
        let sn = match driver.serial_number(device) {
            Ok(sn) => sn,
            Err(e) => {
                log::warn!("failed to read device serial number: {}", e);
                continue;
            }
        };

        if serial.is_some_and(|want| want != sn) {
            continue;
        }

        match driver.open(device) {
            Ok(p) => {
                probe = Some(p);
                break;
            }
            Err(e) => {
                log::error!("failed to open device {:012}: {}", sn, e);
                open_error = Some(e);
            }
        }
    }

    let mut probe = match (probe, open_error) {
        (Some(p), _) => p,
        (None, Some(e)) => return Err(Error::Probe { op: "open", source: e }),
        (None, None) => return Err(Error::DeviceNotFound),
    };

    log::debug!("S/N: {:012}", probe.serial_number());

    let firmware = probe
        .firmware_version()
        .map_err(Error::probe("reading firmware version"))?;
    if let Some(version) = firmware {
        log::debug!("Firmware: {}", version);
    }

    // Make sure CS starts out de-asserted
    set_cs(&mut probe, false)?;

    let mut caps = probe
        .capabilities()
        .map_err(Error::probe("reading capabilities"))?;
    if caps.contains(Capabilities::GET_CAPS_EX) {
        caps = probe
            .extended_capabilities()
            .map_err(Error::probe("reading extended capabilities"))?;
    }
    log::debug!("capabilities: {:?}", caps);

    if caps.contains(Capabilities::SELECT_IF) {
        let interfaces = probe
            .available_interfaces()
            .map_err(Error::probe("reading available interfaces"))?;

        if !interfaces.supports(Interface::Jtag) {
            return Err(Error::JtagUnsupported);
        }

        probe
            .select_interface(Interface::Jtag)
            .map_err(Error::probe("selecting JTAG interface"))?;
    }

    Ok(probe)
}

/// Serial numbers of all attached devices
///
/// Devices whose serial number cannot be read are reported as errors in
/// place rather than failing the whole listing.
pub fn list_devices<D: ProbeDriver>(driver: &mut D) -> Result<Vec<Result<u32>>> {
    let devices = driver.discover().map_err(Error::probe("device discovery"))?;
    Ok(devices
        .iter()
        .map(|d| {
            driver
                .serial_number(d)
                .map_err(Error::probe("reading serial number"))
        })
        .collect())
}

/// Read the one-shot payload, rejecting more than [`MAX_TRANSFER_SIZE`] bytes
fn read_payload<R: Read>(input: &mut R) -> Result<TransferBuffer> {
    let mut data = Vec::with_capacity(MAX_TRANSFER_SIZE + 1);
    input
        .take(MAX_TRANSFER_SIZE as u64 + 1)
        .read_to_end(&mut data)?;

    if data.len() > MAX_TRANSFER_SIZE {
        return Err(Error::TooMuchInput {
            max: MAX_TRANSFER_SIZE,
        });
    }

    TransferBuffer::from_slice(&data)
}

fn run_interactive<P, R, W>(
    probe: &mut P,
    len: BlockLength,
    format: OutputFormat,
    input: &mut R,
    output: &mut W,
) -> Result<()>
where
    P: JtagProbe + ?Sized,
    R: Read,
    W: Write,
{
    let mut block = TransferBuffer::zeroed(len.get())?;
    let mut count = 0usize;

    loop {
        let filled = fill_block(input, &mut block)?;
        if filled == 0 {
            break;
        }
        if filled < len.get() {
            return Err(Error::TruncatedBlock {
                expected: len.get(),
                received: filled,
            });
        }

        let miso = transact(probe, &block)?;
        write_response(output, format, &miso)?;
        output.flush()?;
        count += 1;
    }

    log::debug!("interactive session done after {} block(s)", count);
    Ok(())
}

/// Read until `block` is full or input ends, returning the bytes read
fn fill_block<R: Read>(input: &mut R, block: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < block.len() {
        match input.read(&mut block[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Write one response in the requested format
pub fn write_response<W: Write>(output: &mut W, format: OutputFormat, data: &[u8]) -> io::Result<()> {
    match format {
        OutputFormat::Hex => {
            for b in data {
                write!(output, "{:02x} ", b)?;
            }
            writeln!(output)
        }
        OutputFormat::Binary => output.write_all(data),
    }
}
