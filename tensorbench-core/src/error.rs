//! Error types for the tensorbench core library.
//!
//! Defines the lookup and parsing errors exposed by the dtype and device
//! APIs, together with the macro that attaches stable machine-readable codes
//! to error enums across the workspace.

use thiserror::Error;

use crate::dtype::Dtype;

/// Declares a code enum mirroring the variants of an error enum.
///
/// Each generated code exposes `as_str` returning a stable identifier and
/// implements [`core::fmt::Display`]; the error type gains a `code` accessor.
#[macro_export]
macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl ::core::fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while naming or converting a [`Dtype`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DtypeError {
    /// The dtype has no entry in the array dtype table.
    #[error("dtype `{dtype}` has no array dtype equivalent")]
    Unmapped {
        /// Dtype that was looked up.
        dtype: Dtype,
    },
    /// The dtype name did not match any known tag.
    #[error("unknown dtype name `{name}`")]
    UnknownName {
        /// Raw name supplied by the caller.
        name: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`DtypeError`] variants.
    enum DtypeErrorCode for DtypeError {
        /// The dtype has no entry in the array dtype table.
        Unmapped => Unmapped { .. } => "DTYPE_UNMAPPED",
        /// The dtype name did not match any known tag.
        UnknownName => UnknownName { .. } => "DTYPE_UNKNOWN_NAME",
    }
}

/// An error produced while parsing a device descriptor such as `CUDA:0`.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DeviceError {
    /// The descriptor was not of the form `TYPE:INDEX`.
    #[error("malformed device descriptor `{descriptor}`; expected `TYPE:INDEX`")]
    Malformed {
        /// Raw descriptor supplied by the caller.
        descriptor: String,
    },
    /// The device type is not one of `CPU` or `CUDA`.
    #[error("unknown device type `{kind}`")]
    UnknownKind {
        /// Device type portion of the descriptor.
        kind: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`DeviceError`] variants.
    enum DeviceErrorCode for DeviceError {
        /// The descriptor was not of the form `TYPE:INDEX`.
        Malformed => Malformed { .. } => "DEVICE_MALFORMED",
        /// The device type is not one of `CPU` or `CUDA`.
        UnknownKind => UnknownKind { .. } => "DEVICE_UNKNOWN_KIND",
    }
}
