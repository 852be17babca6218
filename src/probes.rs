//! Probe backend registration and dispatch
//!
//! Backends are feature-gated; only the ones compiled in are offered on the
//! command line.

use std::io;

use jayspi_core::probe::ProbeDriver;
use jayspi_core::{session, SessionConfig};

/// Information about a probe backend
pub struct ProbeInfo {
    /// Name used on the command line
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Get information about all backends enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_probes() -> Vec<ProbeInfo> {
    let mut probes = Vec::new();

    #[cfg(feature = "jlink")]
    probes.push(ProbeInfo {
        name: "jlink",
        description: "SEGGER J-Link over USB (VID:1366)",
    });

    #[cfg(feature = "dummy")]
    probes.push(ProbeInfo {
        name: "dummy",
        description: "Emulated probe with a W25Q128FV on the SPI side",
    });

    probes
}

/// Generate the long help text listing every backend with its description
pub fn probe_help() -> String {
    let probes = available_probes();

    if probes.is_empty() {
        return "No probe backends available (recompile with backend features enabled)"
            .to_string();
    }

    let mut help = String::from("Available probes:\n");
    for p in &probes {
        help.push_str(&format!("  {:8} - {}\n", p.name, p.description));
    }
    help
}

/// Generate a short list of backend names for CLI help
pub fn probe_names_short() -> String {
    let names: Vec<&str> = available_probes().iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Backend used when none is given
pub fn default_probe() -> &'static str {
    available_probes().first().map_or("jlink", |p| p.name)
}

/// Look up a backend by name
pub fn find_probe(name: &str) -> Option<&'static str> {
    available_probes()
        .into_iter()
        .find(|p| p.name == name)
        .map(|p| p.name)
}

/// Run a session on the named backend with stdin and stdout
#[allow(unused_variables)]
pub fn run(name: &str, config: &SessionConfig) -> jayspi_core::Result<()> {
    #[cfg(feature = "jlink")]
    if name == "jlink" {
        return run_with(&mut jayspi_jlink::JLinkDriver::new(), config);
    }

    #[cfg(feature = "dummy")]
    if name == "dummy" {
        return run_with(&mut jayspi_dummy::DummyDriver::default(), config);
    }

    Err(jayspi_core::Error::UnknownProbe(name.to_string()))
}

/// Print the serial numbers of all attached probes of the named backend
#[allow(unused_variables)]
pub fn list(name: &str) -> jayspi_core::Result<()> {
    #[cfg(feature = "jlink")]
    if name == "jlink" {
        return list_with(&mut jayspi_jlink::JLinkDriver::new());
    }

    #[cfg(feature = "dummy")]
    if name == "dummy" {
        return list_with(&mut jayspi_dummy::DummyDriver::default());
    }

    Err(jayspi_core::Error::UnknownProbe(name.to_string()))
}

#[allow(dead_code)]
fn run_with<D: ProbeDriver>(driver: &mut D, config: &SessionConfig) -> jayspi_core::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    session::run(driver, config, stdin.lock(), stdout.lock())
}

#[allow(dead_code)]
fn list_with<D: ProbeDriver>(driver: &mut D) -> jayspi_core::Result<()> {
    let serials = session::list_devices(driver)?;
    if serials.is_empty() {
        println!("No probes found");
        return Ok(());
    }

    for (i, serial) in serials.iter().enumerate() {
        match serial {
            Ok(sn) => println!("{}: S/N {:012}", i, sn),
            Err(e) => println!("{}: S/N unreadable ({})", i, e),
        }
    }
    Ok(())
}
