//! jayspi-dummy - Emulated probe for testing
//!
//! This crate provides a probe driver whose devices live in memory. Each
//! device has an SPI target wired to its JTAG pins the same way real
//! hardware is: TDI to MOSI, TDO to MISO and nTRST to chip select. It's
//! useful for testing and development without a J-Link attached.

mod target;

pub use target::{JedecFlash, Loopback, SpiTarget, Target};

use jayspi_core::bitrev::reverse_byte;
use jayspi_core::probe::{Capabilities, Interface, Interfaces, JtagProbe, ProbeDriver};
use jayspi_core::ProbeError;

/// Configuration of one emulated device
#[derive(Debug, Clone)]
pub struct DummyDevice {
    /// USB serial number
    pub serial: u32,
    /// Firmware version string, empty for none
    pub firmware: String,
    /// Advertised capabilities
    pub capabilities: Capabilities,
    /// Supported target interfaces
    pub interfaces: Interfaces,
    /// Device on the SPI side
    pub target: Target,
}

impl Default for DummyDevice {
    fn default() -> Self {
        Self {
            serial: 123456,
            firmware: "J-Link emulator compiled Jan  1 2024".to_string(),
            capabilities: Capabilities::GET_CAPS_EX | Capabilities::SELECT_IF,
            interfaces: Interfaces::JTAG | Interfaces::SWD,
            target: Target::default(),
        }
    }
}

/// Driver over a fixed list of emulated devices
#[derive(Debug, Clone)]
pub struct DummyDriver {
    devices: Vec<DummyDevice>,
}

impl DummyDriver {
    /// Create a driver that discovers `devices`
    pub fn new(devices: Vec<DummyDevice>) -> Self {
        Self { devices }
    }
}

impl Default for DummyDriver {
    /// One device with a W25Q128FV on the SPI side
    fn default() -> Self {
        Self::new(vec![DummyDevice::default()])
    }
}

impl ProbeDriver for DummyDriver {
    type Device = DummyDevice;
    type Probe = DummyProbe;

    fn discover(&mut self) -> Result<Vec<DummyDevice>, ProbeError> {
        Ok(self.devices.clone())
    }

    fn serial_number(&self, device: &DummyDevice) -> Result<u32, ProbeError> {
        Ok(device.serial)
    }

    fn open(&mut self, device: &DummyDevice) -> Result<DummyProbe, ProbeError> {
        log::debug!("opening dummy probe {:012}", device.serial);
        Ok(DummyProbe::new(device.clone()))
    }
}

/// An opened emulated probe
pub struct DummyProbe {
    config: DummyDevice,
    target: Box<dyn SpiTarget>,
    /// TRST level; low means CS is asserted
    trst_high: bool,
    selected: Option<Interface>,
}

impl DummyProbe {
    /// Open an emulated device
    pub fn new(config: DummyDevice) -> Self {
        let target = config.target.build();
        Self {
            config,
            target,
            trst_high: true,
            selected: None,
        }
    }

    /// Whether the chip select line is currently asserted
    pub fn cs_asserted(&self) -> bool {
        !self.trst_high
    }

    fn has_select_if(&self) -> bool {
        self.config.capabilities.contains(Capabilities::SELECT_IF)
    }
}

impl JtagProbe for DummyProbe {
    fn serial_number(&self) -> u32 {
        self.config.serial
    }

    fn firmware_version(&mut self) -> Result<Option<String>, ProbeError> {
        if self.config.firmware.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.config.firmware.clone()))
        }
    }

    fn capabilities(&mut self) -> Result<Capabilities, ProbeError> {
        // The legacy report only has room for the low 32 bits
        Ok(Capabilities::from_legacy(
            self.config.capabilities.bits() as u32,
        ))
    }

    fn extended_capabilities(&mut self) -> Result<Capabilities, ProbeError> {
        if !self.config.capabilities.contains(Capabilities::GET_CAPS_EX) {
            return Err(ProbeError::MissingCapability("GET_CAPS_EX"));
        }
        Ok(self.config.capabilities)
    }

    fn available_interfaces(&mut self) -> Result<Interfaces, ProbeError> {
        if !self.has_select_if() {
            return Err(ProbeError::MissingCapability("SELECT_IF"));
        }
        Ok(self.config.interfaces)
    }

    fn select_interface(&mut self, intf: Interface) -> Result<(), ProbeError> {
        if !self.has_select_if() {
            return Err(ProbeError::MissingCapability("SELECT_IF"));
        }
        if !self.config.interfaces.supports(intf) {
            return Err(ProbeError::InterfaceNotSupported(intf));
        }
        self.selected = Some(intf);
        Ok(())
    }

    fn set_trst(&mut self) -> Result<(), ProbeError> {
        if !self.trst_high {
            self.target.deselect();
        }
        self.trst_high = true;
        Ok(())
    }

    fn clear_trst(&mut self) -> Result<(), ProbeError> {
        self.trst_high = false;
        Ok(())
    }

    fn jtag_io(&mut self, tdi: &[u8], bit_count: usize) -> Result<Vec<u8>, ProbeError> {
        if bit_count > usize::from(u16::MAX) {
            return Err(ProbeError::Other(format!(
                "JTAG shift of {} bits exceeds the 16-bit bit count",
                bit_count
            )));
        }
        // Probes with interface selection only shift in JTAG mode
        if self.has_select_if() && self.selected != Some(Interface::Jtag) {
            return Err(ProbeError::Other("JTAG interface not selected".to_string()));
        }

        let nbytes = bit_count.div_ceil(8);
        if tdi.len() < nbytes {
            return Err(ProbeError::Other(format!(
                "{} TDI bytes given for {} bits",
                tdi.len(),
                bit_count
            )));
        }

        let tdo = tdi[..nbytes]
            .iter()
            .map(|&b| {
                let miso = if self.trst_high {
                    // Nobody drives MISO, the pull-up wins
                    0xFF
                } else {
                    self.target.transfer(reverse_byte(b))
                };
                reverse_byte(miso)
            })
            .collect();
        Ok(tdo)
    }
}

impl Drop for DummyProbe {
    fn drop(&mut self) {
        log::debug!("closing dummy probe {:012}", self.config.serial);
    }
}
