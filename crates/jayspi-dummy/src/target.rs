//! Emulated SPI devices

/// RDID opcode
const RDID: u8 = 0x9F;

/// A device on the SPI side of an emulated probe
pub trait SpiTarget {
    /// Clock one byte while CS is asserted and return what the device drives
    /// on MISO
    fn transfer(&mut self, mosi: u8) -> u8;

    /// CS went inactive
    fn deselect(&mut self);
}

/// Which SPI device an emulated probe is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// MISO tied to MOSI
    Loopback,
    /// Flash chip that answers the JEDEC ID command
    JedecFlash {
        /// JEDEC manufacturer ID
        manufacturer: u8,
        /// JEDEC device ID
        device: u16,
    },
}

impl Default for Target {
    fn default() -> Self {
        Target::JedecFlash {
            manufacturer: 0xEF, // Winbond
            device: 0x4018,     // W25Q128FV
        }
    }
}

impl Target {
    /// Instantiate the emulated device
    pub fn build(self) -> Box<dyn SpiTarget> {
        match self {
            Target::Loopback => Box::new(Loopback),
            Target::JedecFlash {
                manufacturer,
                device,
            } => Box::new(JedecFlash::new(manufacturer, device)),
        }
    }
}

/// Echoes every byte
#[derive(Debug, Default)]
pub struct Loopback;

impl SpiTarget for Loopback {
    fn transfer(&mut self, mosi: u8) -> u8 {
        mosi
    }

    fn deselect(&mut self) {}
}

/// Minimal SPI NOR flash
///
/// The first byte after CS assertion is the opcode. For RDID the following
/// bytes return the manufacturer ID and the two device ID bytes; everything
/// else reads as `0xFF`.
#[derive(Debug)]
pub struct JedecFlash {
    id: [u8; 3],
    opcode: Option<u8>,
    pos: usize,
}

impl JedecFlash {
    /// Create a flash with the given JEDEC ID
    pub fn new(manufacturer: u8, device: u16) -> Self {
        let [hi, lo] = device.to_be_bytes();
        Self {
            id: [manufacturer, hi, lo],
            opcode: None,
            pos: 0,
        }
    }
}

impl SpiTarget for JedecFlash {
    fn transfer(&mut self, mosi: u8) -> u8 {
        let Some(opcode) = self.opcode else {
            self.opcode = Some(mosi);
            return 0xFF;
        };

        let miso = match opcode {
            RDID => self.id.get(self.pos).copied().unwrap_or(0xFF),
            _ => 0xFF,
        };
        self.pos += 1;
        miso
    }

    fn deselect(&mut self) {
        self.opcode = None;
        self.pos = 0;
    }
}
