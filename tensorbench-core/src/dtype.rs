//! Scalar dtype tags and their numeric array toolkit equivalents.
//!
//! [`Dtype`] names the element types understood by the tensor library under
//! benchmark. Benchmarks that cross-check results against plain arrays need
//! the matching [`ArrayDtype`], which [`to_array_dtype`] looks up in a fixed
//! table.

use std::fmt;
use std::str::FromStr;

use crate::error::DtypeError;

/// Element type tag of the numeric array toolkit used for reference results.
pub type ArrayDtype = safetensors::Dtype;

/// Scalar element type of a tensor.
///
/// # Examples
/// ```
/// use tensorbench_core::Dtype;
///
/// let dtype: Dtype = "float32".parse().expect("known name");
/// assert_eq!(dtype, Dtype::Float32);
/// assert_eq!(dtype.byte_size(), 4);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Dtype {
    /// Placeholder for tensors without an element type.
    Undefined,
    /// 32-bit IEEE float.
    Float32,
    /// 64-bit IEEE float.
    Float64,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Unsigned 64-bit integer.
    UInt64,
    /// One-byte boolean.
    Bool,
    /// Opaque fixed-size element without a numeric interpretation.
    Object,
}

impl Dtype {
    /// Alias of [`Dtype::Bool`] kept for callers that spell the width out.
    pub const BOOL8: Self = Self::Bool;

    /// Every tag, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Undefined,
        Self::Float32,
        Self::Float64,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Bool,
        Self::Object,
    ];

    /// Returns the canonical lowercase name of the tag.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Bool => "bool",
            Self::Object => "object",
        }
    }

    /// Returns the size of one element in bytes; zero for [`Dtype::Undefined`]
    /// and [`Dtype::Object`], whose size is not fixed by the tag.
    #[must_use]
    pub const fn byte_size(self) -> usize {
        match self {
            Self::Undefined | Self::Object => 0,
            Self::Int8 | Self::UInt8 | Self::Bool => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Float32 | Self::Int32 | Self::UInt32 => 4,
            Self::Float64 | Self::Int64 | Self::UInt64 => 8,
        }
    }

    /// Returns `true` for the two IEEE float tags.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Looks up the equivalent [`ArrayDtype`].
    ///
    /// # Errors
    /// Returns [`DtypeError::Unmapped`] when the tag has no table entry.
    pub fn to_array_dtype(self) -> Result<ArrayDtype, DtypeError> {
        to_array_dtype(self)
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dtype {
    type Err = DtypeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let name = raw.trim().to_ascii_lowercase();
        if name == "bool8" {
            return Ok(Self::BOOL8);
        }
        Self::ALL
            .into_iter()
            .find(|dtype| dtype.name() == name)
            .ok_or(DtypeError::UnknownName { name })
    }
}

/// Fixed conversion table from tensor dtype tags to array dtype tags.
///
/// Both spellings of the boolean tag appear so the table documents the alias;
/// they resolve to the same key.
const CONVERSIONS: [(Dtype, ArrayDtype); 12] = [
    (Dtype::BOOL8, ArrayDtype::BOOL),
    (Dtype::Bool, ArrayDtype::BOOL),
    (Dtype::Int8, ArrayDtype::I8),
    (Dtype::UInt8, ArrayDtype::U8),
    (Dtype::Int16, ArrayDtype::I16),
    (Dtype::UInt16, ArrayDtype::U16),
    (Dtype::Int32, ArrayDtype::I32),
    (Dtype::UInt32, ArrayDtype::U32),
    (Dtype::Int64, ArrayDtype::I64),
    (Dtype::UInt64, ArrayDtype::U64),
    (Dtype::Float32, ArrayDtype::F32),
    (Dtype::Float64, ArrayDtype::F64),
];

/// Converts a tensor dtype tag into the array toolkit's equivalent tag.
///
/// # Errors
/// Returns [`DtypeError::Unmapped`] for tags outside the integer, unsigned,
/// float and boolean families, such as [`Dtype::Object`].
///
/// # Examples
/// ```
/// use tensorbench_core::{ArrayDtype, Dtype, to_array_dtype};
///
/// assert_eq!(to_array_dtype(Dtype::UInt16), Ok(ArrayDtype::U16));
/// assert!(to_array_dtype(Dtype::Undefined).is_err());
/// ```
pub fn to_array_dtype(dtype: Dtype) -> Result<ArrayDtype, DtypeError> {
    CONVERSIONS
        .iter()
        .find_map(|(key, value)| (*key == dtype).then_some(*value))
        .ok_or(DtypeError::Unmapped { dtype })
}
