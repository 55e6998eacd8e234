//! Capability-checked access to decimal floating point primitives.
//!
//! A [`DecimalHardware`] implementation is chosen once, when a
//! [`Context`](crate::Context) is created. [`NoAcceleration`] fails every
//! primitive so that every caller takes its software path; the `soft-dfp`
//! feature provides [`SoftDfp`](crate::SoftDfp), which performs them.

use core::{cmp::Ordering, fmt};
use decimalcodec_tables::{BIAS, MAX_DIGITS};

use crate::{Dfp64, HardwareError, HwRounding, MathContext, RoundingMode};

/// How a primitive rounds its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundingSpec {
    /// The exact result is required; primitives other than
    /// [`DecimalHardware::divide`] fail with [`HardwareError::Inexact`]
    /// when it does not fit.
    NoRounding,
    /// Round to 16 digits, ties to even.
    FixedPrecision64,
    /// Round to `precision` (1 to 16) digits with a hardware rounding code.
    PrecisionAndMode {
        /// Significant digits to keep.
        precision: u32,
        /// Already remapped rounding code.
        mode: HwRounding,
    },
}

impl RoundingSpec {
    /// Spec for rounding to `mc`, remapping its mode.
    ///
    /// `None` when `mc` is unlimited or wider than the word.
    #[must_use]
    pub fn rounded(mc: MathContext) -> Option<Self> {
        match mc.precision() {
            0 => None,
            _ if mc.is_decimal64() => Some(Self::FixedPrecision64),
            precision if precision <= MAX_DIGITS => Some(Self::PrecisionAndMode {
                precision,
                mode: mc.rounding().to_hardware(),
            }),
            _ => None,
        }
    }
}

/// Result of a primitive that reports inexactness instead of failing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Exactness {
    /// No digit was lost.
    Exact(Dfp64),
    /// The result was rounded.
    Inexact(Dfp64),
}

impl Exactness {
    /// The resulting word.
    #[must_use]
    #[inline]
    pub const fn word(self) -> Dfp64 {
        match self {
            Self::Exact(word) | Self::Inexact(word) => word,
        }
    }

    /// `true` for [`Exactness::Exact`].
    #[must_use]
    #[inline]
    pub const fn is_exact(self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

/// The decimal floating point primitives the codec builds on.
///
/// Every primitive may fail; a failure only ever means "take the software
/// path". Exponents passed in are biased.
pub trait DecimalHardware: fmt::Debug + Sync {
    /// Whether the primitives can succeed at all on this platform.
    fn is_available(&self) -> bool {
        true
    }

    /// `lhs + rhs`.
    fn add(&self, lhs: Dfp64, rhs: Dfp64, rounding: RoundingSpec) -> Result<Dfp64, HardwareError>;

    /// `lhs - rhs`.
    fn subtract(
        &self,
        lhs: Dfp64,
        rhs: Dfp64,
        rounding: RoundingSpec,
    ) -> Result<Dfp64, HardwareError>;

    /// `lhs * rhs`.
    fn multiply(
        &self,
        lhs: Dfp64,
        rhs: Dfp64,
        rounding: RoundingSpec,
    ) -> Result<Dfp64, HardwareError>;

    /// `lhs / rhs`, for a non-zero `rhs`. With [`RoundingSpec::NoRounding`]
    /// an inexact quotient is rounded to 16 digits and reported as
    /// [`Exactness::Inexact`].
    fn divide(
        &self,
        lhs: Dfp64,
        rhs: Dfp64,
        rounding: RoundingSpec,
    ) -> Result<Exactness, HardwareError>;

    /// Numeric comparison.
    fn compare(&self, lhs: Dfp64, rhs: Dfp64) -> Result<Ordering, HardwareError>;

    /// Moves `src` to `biased_exponent`. Without a rounding code the result
    /// is rounded ties-to-even and reported as inexact when digits are lost.
    fn set_scale(
        &self,
        src: Dfp64,
        biased_exponent: i32,
        rounding: Option<HwRounding>,
    ) -> Result<Exactness, HardwareError>;

    /// Rounds `src` to `precision` significant digits.
    fn round(&self, src: Dfp64, precision: u32, mode: HwRounding) -> Result<Dfp64, HardwareError>;

    /// Word for `value` with exponent 0.
    fn construct_from_int(&self, value: i32, rounding: RoundingSpec) -> Result<Dfp64, HardwareError> {
        self.construct_from_long(i64::from(value), BIAS, rounding)
    }

    /// Word for `value` at `biased_exponent`.
    fn construct_from_long(
        &self,
        value: i64,
        biased_exponent: i32,
        rounding: RoundingSpec,
    ) -> Result<Dfp64, HardwareError>;

    /// Positive word for the unsigned BCD magnitude `bcd` at
    /// `biased_exponent`. The caller applies the sign afterwards, which lets
    /// all 16 digits be used for negative values too.
    fn construct_from_bcd(
        &self,
        bcd: u64,
        biased_exponent: i32,
        rounding: RoundingSpec,
    ) -> Result<Dfp64, HardwareError>;

    /// Word for a packed decimal image at `biased_exponent`. When `signed`,
    /// the low nibble is a sign code and the other 15 nibbles are digits.
    fn construct_from_packed(
        &self,
        packed: u64,
        biased_exponent: i32,
        signed: bool,
    ) -> Result<Dfp64, HardwareError>;

    /// Packed decimal image of the coefficient of `word`, with a trailing
    /// sign nibble when `signed`.
    fn convert_to_packed(&self, word: Dfp64, signed: bool) -> Result<u64, HardwareError>;

    /// Signed coefficient, if the hardware extracts it directly.
    fn unscaled_value(&self, _word: Dfp64) -> Option<i64> {
        None
    }

    /// Coefficient as BCD, if the hardware extracts it directly.
    fn bcd_digits(&self, _word: Dfp64) -> Option<u64> {
        None
    }

    /// Significant digits as the hardware counts them (0 for zero).
    fn significance(&self, _word: Dfp64) -> Option<u32> {
        None
    }

    /// Biased exponent, if the hardware extracts it directly.
    fn exponent(&self, _word: Dfp64) -> Option<i32> {
        None
    }
}

/// Backend for platforms without decimal support: every primitive fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoAcceleration;

impl DecimalHardware for NoAcceleration {
    fn is_available(&self) -> bool {
        false
    }

    fn add(&self, _: Dfp64, _: Dfp64, _: RoundingSpec) -> Result<Dfp64, HardwareError> {
        Err(HardwareError::Unsupported)
    }

    fn subtract(&self, _: Dfp64, _: Dfp64, _: RoundingSpec) -> Result<Dfp64, HardwareError> {
        Err(HardwareError::Unsupported)
    }

    fn multiply(&self, _: Dfp64, _: Dfp64, _: RoundingSpec) -> Result<Dfp64, HardwareError> {
        Err(HardwareError::Unsupported)
    }

    fn divide(&self, _: Dfp64, _: Dfp64, _: RoundingSpec) -> Result<Exactness, HardwareError> {
        Err(HardwareError::Unsupported)
    }

    fn compare(&self, _: Dfp64, _: Dfp64) -> Result<Ordering, HardwareError> {
        Err(HardwareError::Unsupported)
    }

    fn set_scale(
        &self,
        _: Dfp64,
        _: i32,
        _: Option<HwRounding>,
    ) -> Result<Exactness, HardwareError> {
        Err(HardwareError::Unsupported)
    }

    fn round(&self, _: Dfp64, _: u32, _: HwRounding) -> Result<Dfp64, HardwareError> {
        Err(HardwareError::Unsupported)
    }

    fn construct_from_long(&self, _: i64, _: i32, _: RoundingSpec) -> Result<Dfp64, HardwareError> {
        Err(HardwareError::Unsupported)
    }

    fn construct_from_bcd(&self, _: u64, _: i32, _: RoundingSpec) -> Result<Dfp64, HardwareError> {
        Err(HardwareError::Unsupported)
    }

    fn construct_from_packed(&self, _: u64, _: i32, _: bool) -> Result<Dfp64, HardwareError> {
        Err(HardwareError::Unsupported)
    }

    fn convert_to_packed(&self, _: Dfp64, _: bool) -> Result<u64, HardwareError> {
        Err(HardwareError::Unsupported)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "soft-dfp")] {
        static DETECTED: crate::SoftDfp = crate::SoftDfp;
    } else {
        static DETECTED: NoAcceleration = NoAcceleration;
    }
}

/// The backend for this build, decided at compile time.
#[must_use]
pub fn detect() -> &'static dyn DecimalHardware {
    &DETECTED
}

/// Remapped code for `mode`, or `None` for `Unnecessary`, which the
/// primitives express as "no rounding".
pub(crate) fn explicit_rounding(mode: RoundingMode) -> Option<HwRounding> {
    match mode {
        RoundingMode::Unnecessary => None,
        mode => Some(mode.to_hardware()),
    }
}
