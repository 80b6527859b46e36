//! Accelerator capability probe.
//!
//! The inference runtime runs on whatever hardware the host offers. The probe
//! runs once at startup and its result is injected into configuration
//! resolution, so nothing deeper in the call path inspects the machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Concrete compute device the runtime should place the pipeline on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cpu,
    /// NVIDIA GPU
    Cuda,
    /// Apple Metal Performance Shaders
    Mps,
}

impl Device {
    pub fn as_str(self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
            Device::Mps => "mps",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Files whose presence indicates a loaded NVIDIA kernel driver.
const NVIDIA_MARKERS: &[&str] = &["/proc/driver/nvidia/version", "/dev/nvidiactl", "/dev/nvidia0"];

/// Probe the host for the best available accelerator.
pub fn probe() -> Device {
    let device = probe_with(std::env::consts::OS, std::env::consts::ARCH, |p| {
        Path::new(p).exists()
    });
    tracing::debug!(%device, "Probed accelerator");
    device
}

/// Probe with an injectable platform description and filesystem check.
pub fn probe_with(os: &str, arch: &str, exists: impl Fn(&str) -> bool) -> Device {
    if os == "macos" && arch == "aarch64" {
        return Device::Mps;
    }
    if NVIDIA_MARKERS.iter().any(|marker| exists(marker)) {
        return Device::Cuda;
    }
    Device::Cpu
}
