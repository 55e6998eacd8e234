//! Conversion engine between the representations of an arbitrary-precision
//! decimal: signed packed decimal bytes, 64-bit densely packed decimal words
//! (IEEE 754-2008 decimal64), BCD digit streams and binary integers.
//!
//! Every fast path goes through a [`DecimalHardware`](hardware::DecimalHardware)
//! backend selected once per [`Context`]. When the backend cannot perform an
//! operation the context reports a fallback (`Ok(None)`) and the caller takes
//! its software path; only the errors in [`ArithmeticError`] are ever surfaced.
//!
//! # Example
//!
//! ```
//! use decimalcodec::prelude::*;
//!
//! let mut ctx = Context::new();
//! let value = ctx.decode_packed(&packed!(-123), 2).unwrap();
//! assert_eq!(value.to_string(), "-1.23");
//! assert_eq!(ctx.encode_packed(&value), [0x12, 0x3D]);
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    unused_crate_dependencies
)]
#![no_std]

extern crate alloc;

mod bcd;
pub mod context;
mod error;
pub mod hardware;
mod ops;
pub mod packed;
#[cfg(feature = "soft-dfp")]
mod soft;
mod value;
mod word;

pub use bcd::{all_zero_bcd, bcd_digit_count, bcd_to_binary, binary_to_bcd, num_digits};
pub use context::{suitable_for_hardware, Config, Context, Flags, Hysteresis};
pub use error::{ArithmeticError, HardwareError, PackedDecimalError};
#[cfg(feature = "soft-dfp")]
pub use soft::SoftDfp;
pub use value::{DecimalValue, Representation, Sign};
pub use word::Dfp64;

/// Rounding modes, numbered by their ordinal in the value type's API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RoundingMode {
    /// Away from zero.
    Up = 0,
    /// Toward zero.
    Down = 1,
    /// Toward positive infinity.
    Ceiling = 2,
    /// Toward negative infinity.
    Floor = 3,
    /// To nearest, ties away from zero.
    HalfUp = 4,
    /// To nearest, ties toward zero.
    HalfDown = 5,
    /// To nearest, ties to the even neighbour.
    HalfEven = 6,
    /// Asserts that no rounding is needed.
    Unnecessary = 7,
}

impl RoundingMode {
    /// Ordinal of the mode.
    #[must_use]
    #[inline]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Mode with the given ordinal.
    #[must_use]
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        Some(match ordinal {
            0 => Self::Up,
            1 => Self::Down,
            2 => Self::Ceiling,
            3 => Self::Floor,
            4 => Self::HalfUp,
            5 => Self::HalfDown,
            6 => Self::HalfEven,
            7 => Self::Unnecessary,
            _ => return None,
        })
    }

    /// Hardware rounding code for this mode.
    ///
    /// Must be recomputed at every call that hands a mode to the hardware.
    #[must_use]
    #[inline]
    pub const fn to_hardware(self) -> HwRounding {
        HwRounding(remap_rounding(self.ordinal()))
    }
}

/// Swaps the ordinals of `Up` and `HalfEven`, the two modes whose hardware
/// codes are exchanged. Every other ordinal maps to itself.
#[must_use]
#[inline]
pub const fn remap_rounding(ordinal: u8) -> u8 {
    match ordinal {
        0 => 6,
        6 => 0,
        other => other,
    }
}

/// Rounding code in the hardware's own numbering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HwRounding(u8);

impl HwRounding {
    /// Round to nearest, ties to even.
    pub const HALF_EVEN: Self = Self(0);
    /// Round toward zero.
    pub const DOWN: Self = Self(1);
    /// Round toward positive infinity.
    pub const CEILING: Self = Self(2);
    /// Round toward negative infinity.
    pub const FLOOR: Self = Self(3);
    /// Round to nearest, ties away from zero.
    pub const HALF_UP: Self = Self(4);
    /// Round to nearest, ties toward zero.
    pub const HALF_DOWN: Self = Self(5);
    /// Round away from zero.
    pub const UP: Self = Self(6);
    /// Round to prepare for shorter precision.
    pub const REROUND: Self = Self(7);

    /// Code with the given value, `0..=7`.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        if code < 8 {
            Some(Self(code))
        } else {
            None
        }
    }

    /// Raw code.
    #[must_use]
    #[inline]
    pub const fn code(self) -> u8 {
        self.0
    }
}

/// Precision and rounding mode requested for an operation.
///
/// A precision of 0 means unlimited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MathContext {
    precision: u32,
    rounding: RoundingMode,
}

impl MathContext {
    /// Exact arithmetic.
    pub const UNLIMITED: Self = Self::new(0, RoundingMode::HalfUp);
    /// 7 digits, ties to even.
    pub const DECIMAL32: Self = Self::new(7, RoundingMode::HalfEven);
    /// 16 digits, ties to even; the native format of the word.
    pub const DECIMAL64: Self = Self::new(16, RoundingMode::HalfEven);
    /// 34 digits, ties to even.
    pub const DECIMAL128: Self = Self::new(34, RoundingMode::HalfEven);

    /// Create a context.
    #[must_use]
    #[inline]
    pub const fn new(precision: u32, rounding: RoundingMode) -> Self {
        Self {
            precision,
            rounding,
        }
    }

    /// Number of significant digits, 0 for unlimited.
    #[must_use]
    #[inline]
    pub const fn precision(self) -> u32 {
        self.precision
    }

    /// Rounding mode.
    #[must_use]
    #[inline]
    pub const fn rounding(self) -> RoundingMode {
        self.rounding
    }

    pub(crate) fn is_decimal64(self) -> bool {
        self.precision == decimalcodec_tables::MAX_DIGITS && self.rounding == RoundingMode::HalfEven
    }
}

impl Default for MathContext {
    #[inline]
    fn default() -> Self {
        Self::UNLIMITED
    }
}

#[doc(hidden)]
pub use decimalcodec_macros_support::{to_dfp64_bits, to_packed_bytes};

/// Allows writing [`Dfp64`] literals, checked at compile time.
///
/// # Example
///
/// ```
/// use decimalcodec::prelude::*;
///
/// const PRICE: Dfp64 = dfp64!(-1.23);
/// assert_eq!(PRICE.to_bits(), 0xA230_0000_0000_00A3);
/// assert_eq!(dfp64!(15e-4).to_string(), "0.0015");
/// ```
#[macro_export]
macro_rules! dfp64 {
    ($($lit:tt)+) => {
        $crate::Dfp64::from_bits($crate::to_dfp64_bits!($($lit)+))
    };
}

/// Writes an integer literal as signed packed decimal bytes.
///
/// # Example
///
/// ```
/// use decimalcodec::prelude::*;
///
/// assert_eq!(packed!(-123), [0x12, 0x3D]);
/// assert_eq!(packed!(42), [0x04, 0x2C]);
/// ```
#[macro_export]
macro_rules! packed {
    ($($lit:tt)+) => {
        $crate::to_packed_bytes!($($lit)+)
    };
}

/// Contains the most commonly used elements of the library.
pub mod prelude {
    pub use crate::{
        dfp64, packed, ArithmeticError, Config, Context, DecimalValue, Dfp64, Flags, MathContext,
        PackedDecimalError, Representation, RoundingMode, Sign,
    };
}
