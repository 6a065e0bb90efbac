//! Core tables for tensor benchmarks.
//!
//! Provides the dtype tags of the tensor library under test, their numeric
//! array toolkit equivalents, compute device descriptors, and the fixed
//! enumerations that benchmark suites iterate over.

mod catalogue;
mod device;
mod dtype;
mod error;

pub use crate::{
    catalogue::{
        list_devices, list_devices_with, list_float_dtypes, list_non_bool_dtypes,
        list_tensor_sizes,
    },
    device::{AcceleratorProbe, Device, DeviceKind, NvidiaSmiProbe},
    dtype::{ArrayDtype, Dtype, to_array_dtype},
    error::{DeviceError, DeviceErrorCode, DtypeError, DtypeErrorCode},
};
