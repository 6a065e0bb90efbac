//! Compute device descriptors and accelerator probing.

use std::fmt;
use std::process::Command;
use std::str::FromStr;

use crate::error::DeviceError;

/// Class of compute target.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DeviceKind {
    /// Host processor.
    Cpu,
    /// NVIDIA GPU driven through CUDA.
    Cuda,
}

impl DeviceKind {
    /// Returns the upper-case prefix used in device descriptors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Cuda => "CUDA",
        }
    }
}

/// A compute target such as `CPU:0` or `CUDA:0`.
///
/// # Examples
/// ```
/// use tensorbench_core::{Device, DeviceKind};
///
/// let device: Device = "cuda:1".parse().expect("valid descriptor");
/// assert_eq!(device.kind(), DeviceKind::Cuda);
/// assert_eq!(device.index(), 1);
/// assert_eq!(device.to_string(), "CUDA:1");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Device {
    kind: DeviceKind,
    index: u32,
}

impl Device {
    /// Creates a CPU descriptor.
    #[must_use]
    pub const fn cpu(index: u32) -> Self {
        Self {
            kind: DeviceKind::Cpu,
            index,
        }
    }

    /// Creates a CUDA descriptor.
    #[must_use]
    pub const fn cuda(index: u32) -> Self {
        Self {
            kind: DeviceKind::Cuda,
            index,
        }
    }

    /// Returns the device class.
    #[must_use]
    pub const fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Returns the ordinal within the device class.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.index)
    }
}

impl FromStr for Device {
    type Err = DeviceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || DeviceError::Malformed {
            descriptor: raw.to_owned(),
        };
        let (kind, ordinal) = raw.trim().split_once(':').ok_or_else(malformed)?;
        let index = ordinal.parse::<u32>().map_err(|_| malformed())?;
        match kind.to_ascii_uppercase().as_str() {
            "CPU" => Ok(Self::cpu(index)),
            "CUDA" => Ok(Self::cuda(index)),
            _ => Err(DeviceError::UnknownKind {
                kind: kind.to_owned(),
            }),
        }
    }
}

/// Reports whether a CUDA accelerator can be used right now.
pub trait AcceleratorProbe {
    /// Returns `true` if at least one accelerator is usable.
    fn is_available(&self) -> bool;
}

/// Probes for NVIDIA GPUs by running `nvidia-smi --list-gpus`.
///
/// A missing binary, a failing exit status, or an empty GPU listing all count
/// as unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct NvidiaSmiProbe;

impl AcceleratorProbe for NvidiaSmiProbe {
    fn is_available(&self) -> bool {
        match Command::new("nvidia-smi").arg("--list-gpus").output() {
            Ok(output) if output.status.success() => {
                let listing = String::from_utf8_lossy(&output.stdout);
                let gpus = count_listed_gpus(&listing);
                tracing::debug!(gpus, "nvidia-smi listed GPUs");
                gpus > 0
            }
            Ok(output) => {
                tracing::debug!(status = %output.status, "nvidia-smi reported failure");
                false
            }
            Err(err) => {
                tracing::debug!(error = %err, "nvidia-smi unavailable");
                false
            }
        }
    }
}

fn count_listed_gpus(listing: &str) -> usize {
    listing
        .lines()
        .filter(|line| line.trim_start().starts_with("GPU "))
        .count()
}
