//! Recording probe and driver for unit tests
//!
//! Every probe call, plus reads and flushes from the I/O helpers, lands in a
//! shared [`Log`] so tests can check ordering across all of them.

use std::cell::RefCell;
use std::io::{self, Read, Write};
use std::rc::Rc;

use crate::error::ProbeError;
use crate::probe::{Capabilities, Interface, Interfaces, JtagProbe, ProbeDriver};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Discover,
    Open(u32),
    FirmwareVersion,
    Capabilities,
    ExtendedCapabilities,
    AvailableInterfaces,
    SelectInterface(Interface),
    SetTrst,
    ClearTrst,
    JtagIo { bits: usize },
    Close,
    Read(usize),
    Flush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    FirmwareVersion,
    SetTrst,
    ClearTrst,
    JtagIo,
}

pub type Log = Rc<RefCell<Vec<Call>>>;

fn injected() -> ProbeError {
    ProbeError::Other("injected failure".to_string())
}

#[derive(Debug)]
pub struct MockProbe {
    serial: u32,
    log: Log,
    caps: Capabilities,
    ext_caps: Capabilities,
    interfaces: Interfaces,
    fail_at: Option<FailAt>,
    response: Option<Vec<u8>>,
    last_tdi: Option<Vec<u8>>,
}

impl MockProbe {
    /// Probe that echoes TDI back on TDO and has no optional capabilities
    pub fn new(serial: u32) -> Self {
        Self::with_log(serial, Log::default())
    }

    fn with_log(serial: u32, log: Log) -> Self {
        Self {
            serial,
            log,
            caps: Capabilities::empty(),
            ext_caps: Capabilities::empty(),
            interfaces: Interfaces::JTAG,
            fail_at: None,
            response: None,
            last_tdi: None,
        }
    }

    pub fn fail_at(mut self, at: FailAt) -> Self {
        self.fail_at = Some(at);
        self
    }

    /// Answer every exchange with `tdo` instead of echoing
    pub fn respond_with(mut self, tdo: Vec<u8>) -> Self {
        self.response = Some(tdo);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub fn last_tdi(&self) -> Option<Vec<u8>> {
        self.last_tdi.clone()
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }

    fn check(&self, at: FailAt) -> Result<(), ProbeError> {
        if self.fail_at == Some(at) {
            Err(injected())
        } else {
            Ok(())
        }
    }
}

impl JtagProbe for MockProbe {
    fn serial_number(&self) -> u32 {
        self.serial
    }

    fn firmware_version(&mut self) -> Result<Option<String>, ProbeError> {
        self.record(Call::FirmwareVersion);
        self.check(FailAt::FirmwareVersion)?;
        Ok(Some("J-Link mock compiled Jan  1 2024".to_string()))
    }

    fn capabilities(&mut self) -> Result<Capabilities, ProbeError> {
        self.record(Call::Capabilities);
        Ok(self.caps)
    }

    fn extended_capabilities(&mut self) -> Result<Capabilities, ProbeError> {
        self.record(Call::ExtendedCapabilities);
        Ok(self.ext_caps)
    }

    fn available_interfaces(&mut self) -> Result<Interfaces, ProbeError> {
        self.record(Call::AvailableInterfaces);
        Ok(self.interfaces)
    }

    fn select_interface(&mut self, intf: Interface) -> Result<(), ProbeError> {
        self.record(Call::SelectInterface(intf));
        Ok(())
    }

    fn set_trst(&mut self) -> Result<(), ProbeError> {
        self.record(Call::SetTrst);
        self.check(FailAt::SetTrst)
    }

    fn clear_trst(&mut self) -> Result<(), ProbeError> {
        self.record(Call::ClearTrst);
        self.check(FailAt::ClearTrst)
    }

    fn jtag_io(&mut self, tdi: &[u8], bit_count: usize) -> Result<Vec<u8>, ProbeError> {
        self.record(Call::JtagIo { bits: bit_count });
        self.check(FailAt::JtagIo)?;

        let tdi = tdi[..bit_count.div_ceil(8)].to_vec();
        let tdo = self.response.clone().unwrap_or_else(|| tdi.clone());
        self.last_tdi = Some(tdi);
        Ok(tdo)
    }
}

impl Drop for MockProbe {
    fn drop(&mut self) {
        self.record(Call::Close);
    }
}

#[derive(Debug, Clone)]
pub struct MockDevice {
    serial: u32,
    serial_readable: bool,
    open_fails: bool,
    select_if: Option<bool>,
    fail_at: Option<FailAt>,
}

impl MockDevice {
    pub fn new(serial: u32) -> Self {
        Self {
            serial,
            serial_readable: true,
            open_fails: false,
            select_if: None,
            fail_at: None,
        }
    }

    pub fn unreadable_serial(mut self) -> Self {
        self.serial_readable = false;
        self
    }

    pub fn open_fails(mut self) -> Self {
        self.open_fails = true;
        self
    }

    /// Advertise extended caps with interface selection, with or without JTAG
    pub fn with_select_if(mut self, jtag: bool) -> Self {
        self.select_if = Some(jtag);
        self
    }

    pub fn fail_at(mut self, at: FailAt) -> Self {
        self.fail_at = Some(at);
        self
    }
}

pub struct MockDriver {
    devices: Vec<MockDevice>,
    log: Log,
}

impl MockDriver {
    pub fn new(devices: Vec<MockDevice>) -> Self {
        Self {
            devices,
            log: Log::default(),
        }
    }

    pub fn log(&self) -> Log {
        self.log.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    /// Control line and exchange calls only
    pub fn transfer_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::SetTrst | Call::ClearTrst | Call::JtagIo { .. }))
            .collect()
    }

    fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.log.borrow().iter().filter(|c| f(c)).count()
    }

    pub fn exchange_count(&self) -> usize {
        self.count(|c| matches!(c, Call::JtagIo { .. }))
    }

    pub fn open_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Open(_)))
    }

    pub fn close_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Close))
    }
}

impl ProbeDriver for MockDriver {
    type Device = MockDevice;
    type Probe = MockProbe;

    fn discover(&mut self) -> Result<Vec<MockDevice>, ProbeError> {
        self.log.borrow_mut().push(Call::Discover);
        Ok(self.devices.clone())
    }

    fn serial_number(&self, device: &MockDevice) -> Result<u32, ProbeError> {
        if device.serial_readable {
            Ok(device.serial)
        } else {
            Err(ProbeError::InvalidSerial("unreadable".to_string()))
        }
    }

    fn open(&mut self, device: &MockDevice) -> Result<MockProbe, ProbeError> {
        self.log.borrow_mut().push(Call::Open(device.serial));
        if device.open_fails {
            return Err(ProbeError::Usb("access denied".to_string()));
        }

        let mut probe = MockProbe::with_log(device.serial, self.log.clone());
        probe.fail_at = device.fail_at;
        if let Some(jtag) = device.select_if {
            probe.caps = Capabilities::GET_CAPS_EX;
            probe.ext_caps = Capabilities::GET_CAPS_EX | Capabilities::SELECT_IF;
            probe.interfaces = if jtag {
                Interfaces::JTAG | Interfaces::SWD
            } else {
                Interfaces::SWD
            };
        }
        Ok(probe)
    }
}

/// Reader that logs the size of every read it serves
pub struct LoggedReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
    log: Log,
}

impl LoggedReader {
    pub fn new(data: Vec<u8>, log: Log) -> Self {
        Self {
            data,
            pos: 0,
            chunk: usize::MAX,
            log,
        }
    }

    /// Serve at most `chunk` bytes per read
    pub fn chunked(mut self, chunk: usize) -> Self {
        self.chunk = chunk;
        self
    }
}

impl Read for LoggedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.chunk).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        self.log.borrow_mut().push(Call::Read(n));
        Ok(n)
    }
}

/// Writer that logs every flush
pub struct LoggedWriter {
    pub data: Vec<u8>,
    log: Log,
}

impl LoggedWriter {
    pub fn new(log: Log) -> Self {
        Self {
            data: Vec::new(),
            log,
        }
    }
}

impl Write for LoggedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.log.borrow_mut().push(Call::Flush);
        Ok(())
    }
}
