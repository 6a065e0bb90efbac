//! Benchmark configuration tables.
//!
//! Sizes and dtypes are fixed; devices are recomputed on every call because
//! accelerator availability is only known at run time.

use crate::device::{AcceleratorProbe, Device, NvidiaSmiProbe};
use crate::dtype::Dtype;

/// Element counts used for tensor benchmarks.
///
/// # Examples
/// ```
/// use tensorbench_core::list_tensor_sizes;
///
/// assert_eq!(list_tensor_sizes(), vec![100_000_000]);
/// ```
#[must_use]
pub fn list_tensor_sizes() -> Vec<usize> {
    vec![100_000_000]
}

/// Numeric dtypes exercised by arithmetic benchmarks, excluding booleans.
#[must_use]
pub fn list_non_bool_dtypes() -> Vec<Dtype> {
    vec![
        Dtype::Int8,
        Dtype::UInt8,
        Dtype::Int16,
        Dtype::UInt16,
        Dtype::Int32,
        Dtype::UInt32,
        Dtype::Int64,
        Dtype::UInt64,
        Dtype::Float32,
        Dtype::Float64,
    ]
}

/// Dtypes exercised by floating-point-only benchmarks.
#[must_use]
pub fn list_float_dtypes() -> Vec<Dtype> {
    vec![Dtype::Float32, Dtype::Float64]
}

/// Devices to benchmark on: `CPU:0`, followed by `CUDA:0` when `nvidia-smi`
/// reports a GPU.
#[must_use]
pub fn list_devices() -> Vec<Device> {
    list_devices_with(&NvidiaSmiProbe)
}

/// Devices to benchmark on, querying `probe` for accelerator availability.
///
/// # Examples
/// ```
/// use tensorbench_core::{AcceleratorProbe, Device, list_devices_with};
///
/// struct NoGpu;
///
/// impl AcceleratorProbe for NoGpu {
///     fn is_available(&self) -> bool {
///         false
///     }
/// }
///
/// assert_eq!(list_devices_with(&NoGpu), vec![Device::cpu(0)]);
/// ```
#[must_use]
pub fn list_devices_with(probe: &dyn AcceleratorProbe) -> Vec<Device> {
    let mut devices = vec![Device::cpu(0)];
    if probe.is_available() {
        devices.push(Device::cuda(0));
    }
    tracing::debug!(count = devices.len(), "enumerated benchmark devices");
    devices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceKind;
    use rstest::rstest;

    struct FixedProbe(bool);

    impl AcceleratorProbe for FixedProbe {
        fn is_available(&self) -> bool {
            self.0
        }
    }

    fn count_kind(devices: &[Device], kind: DeviceKind) -> usize {
        devices.iter().filter(|device| device.kind() == kind).count()
    }

    #[rstest]
    #[case::with_gpu(true, 1)]
    #[case::without_gpu(false, 0)]
    fn device_list_tracks_accelerator(#[case] available: bool, #[case] cuda_count: usize) {
        let devices = list_devices_with(&FixedProbe(available));

        assert_eq!(count_kind(&devices, DeviceKind::Cpu), 1);
        assert_eq!(count_kind(&devices, DeviceKind::Cuda), cuda_count);
        assert_eq!(devices.first(), Some(&Device::cpu(0)));
    }

    #[test]
    fn float_dtypes_are_a_subset_of_non_bool_dtypes() {
        let non_bool = list_non_bool_dtypes();
        for dtype in list_float_dtypes() {
            assert!(dtype.is_float());
            assert!(non_bool.contains(&dtype));
        }
    }

    #[test]
    fn non_bool_dtypes_exclude_bool() {
        assert!(!list_non_bool_dtypes().contains(&Dtype::Bool));
        assert_eq!(list_non_bool_dtypes().len(), 10);
    }

    #[test]
    fn tensor_sizes_are_positive() {
        assert!(list_tensor_sizes().iter().all(|size| *size > 0));
    }
}
