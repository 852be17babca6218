//! J-Link device implementation
//!
//! [`JLinkDriver`] finds probes on the USB bus and [`JLink`] is an opened
//! probe with its bulk endpoints claimed.

use nusb::transfer::{Buffer, Bulk, In, Out};
use nusb::{DeviceInfo, Endpoint, MaybeFuture};
use nusb::Interface as UsbInterface;

use jayspi_core::probe::{
    parse_serial_number, Capabilities, Interface, Interfaces, JtagProbe, ProbeDriver,
};
use jayspi_core::ProbeError;

use crate::error::{JLinkError, Result};
use crate::protocol::*;

type ProbeResult<T> = std::result::Result<T, ProbeError>;

/// Finds and opens J-Link probes
#[derive(Debug, Default)]
pub struct JLinkDriver;

impl JLinkDriver {
    /// Create a driver for the USB bus
    pub fn new() -> Self {
        Self
    }
}

impl ProbeDriver for JLinkDriver {
    type Device = DeviceInfo;
    type Probe = JLink;

    fn discover(&mut self) -> ProbeResult<Vec<DeviceInfo>> {
        let devices: Vec<_> = nusb::list_devices()
            .wait()
            .map_err(|e| ProbeError::Usb(e.to_string()))?
            .filter(|d| d.vendor_id() == JLINK_USB_VENDOR)
            .collect();

        for d in &devices {
            log::trace!(
                "J-Link {:04x}:{:04x} at bus {} address {}",
                d.vendor_id(),
                d.product_id(),
                d.bus_id(),
                d.device_address()
            );
        }
        Ok(devices)
    }

    fn serial_number(&self, device: &DeviceInfo) -> ProbeResult<u32> {
        let serial = device.serial_number().ok_or(JLinkError::NoSerialNumber)?;
        parse_serial_number(serial)
    }

    fn open(&mut self, device: &DeviceInfo) -> ProbeResult<JLink> {
        let serial = self.serial_number(device)?;
        Ok(JLink::open(device, serial)?)
    }
}

/// An opened J-Link probe
pub struct JLink {
    serial: u32,
    _interface: UsbInterface,
    in_ep: Endpoint<Bulk, In>,
    out_ep: Endpoint<Bulk, Out>,
    /// Last capability report read from the probe
    caps: Option<Capabilities>,
}

impl JLink {
    /// Open `device` and claim its vendor-specific interface
    pub fn open(device: &DeviceInfo, serial: u32) -> Result<Self> {
        log::debug!(
            "Opening J-Link at bus {} address {}",
            device.bus_id(),
            device.device_address()
        );

        let handle = device
            .open()
            .wait()
            .map_err(|e| JLinkError::OpenFailed(e.to_string()))?;

        let (intf, read_ep, write_ep) = {
            let config = handle
                .active_configuration()
                .map_err(|e| JLinkError::OpenFailed(e.to_string()))?;

            let mut found = None;
            for descr in config.interface_alt_settings() {
                if descr.class() != JLINK_INTERFACE_CLASS
                    || descr.subclass() != JLINK_INTERFACE_SUBCLASS
                    || descr.protocol() != JLINK_INTERFACE_PROTOCOL
                {
                    continue;
                }

                let endpoints: Vec<_> = descr
                    .endpoints()
                    .map(|ep| (ep.address(), ep.transfer_type()))
                    .collect();
                let Some((read_ep, write_ep)) = select_endpoints(&endpoints) else {
                    continue;
                };
                found = Some((descr.interface_number(), read_ep, write_ep));
                break;
            }
            found.ok_or(JLinkError::NoJLinkInterface)?
        };
        log::debug!(
            "J-Link interface is #{} (IN {:#04x}, OUT {:#04x})",
            intf,
            read_ep,
            write_ep
        );

        let interface = handle
            .claim_interface(intf)
            .wait()
            .map_err(|e| JLinkError::ClaimFailed {
                intf,
                msg: e.to_string(),
            })?;

        let in_ep = interface
            .endpoint::<Bulk, In>(read_ep)
            .map_err(|e| JLinkError::ClaimFailed {
                intf,
                msg: e.to_string(),
            })?;
        let out_ep = interface
            .endpoint::<Bulk, Out>(write_ep)
            .map_err(|e| JLinkError::ClaimFailed {
                intf,
                msg: e.to_string(),
            })?;

        Ok(Self {
            serial,
            _interface: interface,
            in_ep,
            out_ep,
            caps: None,
        })
    }

    fn write_cmd(&mut self, cmd: &[u8]) -> Result<()> {
        log::trace!("write {} bytes: {:02x?}", cmd.len(), cmd);

        let mut buf = Buffer::new(cmd.len());
        buf.extend_from_slice(cmd);
        self.out_ep.transfer_blocking(buf, USB_TIMEOUT).into_result()?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        let max_packet_size = self.in_ep.max_packet_size();
        let mut total = 0;

        while total < buf.len() {
            let remaining = buf.len() - total;
            let request_len = remaining.div_ceil(max_packet_size) * max_packet_size;
            let mut in_buf = Buffer::new(request_len);
            in_buf.set_requested_len(request_len);

            let data = self
                .in_ep
                .transfer_blocking(in_buf, USB_TIMEOUT)
                .into_result()?;
            if data.is_empty() {
                return Err(JLinkError::ShortRead {
                    expected: buf.len(),
                    received: total,
                });
            }

            let n = data.len().min(remaining);
            buf[total..total + n].copy_from_slice(&data[..n]);
            total += n;
        }

        log::trace!("read {} bytes: {:02x?}", buf.len(), buf);
        Ok(())
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0; 4];
        self.read(&mut buf)?;
        Ok(le_u32(&buf))
    }

    /// Capabilities that decide the JTAG command, read on first use
    fn cached_caps(&mut self) -> ProbeResult<Capabilities> {
        match self.caps {
            Some(caps) => Ok(caps),
            None => {
                let caps = self.capabilities()?;
                if caps.contains(Capabilities::GET_CAPS_EX) {
                    self.extended_capabilities()
                } else {
                    Ok(caps)
                }
            }
        }
    }
}

impl JtagProbe for JLink {
    fn serial_number(&self) -> u32 {
        self.serial
    }

    fn firmware_version(&mut self) -> ProbeResult<Option<String>> {
        self.write_cmd(&[Command::Version as u8])?;

        let mut header = [0; VERSION_HEADER_LEN];
        self.read(&mut header)?;
        let len = usize::from(u16::from_le_bytes(header));

        let mut raw = vec![0; len];
        self.read(&mut raw)?;
        Ok(parse_firmware_version(&raw))
    }

    fn capabilities(&mut self) -> ProbeResult<Capabilities> {
        self.write_cmd(&[Command::GetCaps as u8])?;
        let caps = Capabilities::from_legacy(self.read_u32()?);
        log::trace!("legacy caps: {:?}", caps);
        self.caps = Some(caps);
        Ok(caps)
    }

    fn extended_capabilities(&mut self) -> ProbeResult<Capabilities> {
        self.write_cmd(&[Command::GetCapsEx as u8])?;
        let mut raw = [0; CAPS_EX_LEN];
        self.read(&mut raw)?;
        let caps = Capabilities::from_extended(&raw);
        log::trace!("extended caps: {:?}", caps);
        self.caps = Some(caps);
        Ok(caps)
    }

    fn available_interfaces(&mut self) -> ProbeResult<Interfaces> {
        if !self.cached_caps()?.contains(Capabilities::SELECT_IF) {
            return Err(ProbeError::MissingCapability("SELECT_IF"));
        }

        self.write_cmd(&[Command::SelectIf as u8, SELECT_IF_QUERY])?;
        Ok(Interfaces::from_bits_retain(self.read_u32()?))
    }

    fn select_interface(&mut self, intf: Interface) -> ProbeResult<()> {
        if !self.cached_caps()?.contains(Capabilities::SELECT_IF) {
            return Err(ProbeError::MissingCapability("SELECT_IF"));
        }

        self.write_cmd(&[Command::SelectIf as u8, intf.as_u8()])?;
        // Answer is the previously selected interface
        let previous = self.read_u32()?;
        log::trace!("selected {} (previous interface {})", intf, previous);
        Ok(())
    }

    fn set_trst(&mut self) -> ProbeResult<()> {
        Ok(self.write_cmd(&[Command::HwTrst1 as u8])?)
    }

    fn clear_trst(&mut self) -> ProbeResult<()> {
        Ok(self.write_cmd(&[Command::HwTrst0 as u8])?)
    }

    fn jtag_io(&mut self, tdi: &[u8], bit_count: usize) -> ProbeResult<Vec<u8>> {
        // Probes with interface selection have the newer command, which
        // appends a status byte to the TDO data
        let jtag3 = self.cached_caps()?.contains(Capabilities::SELECT_IF);
        let cmd = if jtag3 {
            Command::HwJtag3
        } else {
            Command::HwJtag2
        };

        // TMS mirrors TDI, the SPI target ignores it
        let frame = jtag_frame(cmd, tdi, tdi, bit_count)?;
        self.write_cmd(&frame)?;

        let mut response = vec![0; jtag_response_len(bit_count, jtag3)];
        self.read(&mut response)?;
        decode_jtag_response(response, jtag3)
    }
}

impl Drop for JLink {
    fn drop(&mut self) {
        log::debug!("closing J-Link {:012}", self.serial);
    }
}
