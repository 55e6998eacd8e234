//! The 64-bit densely packed decimal word.

use alloc::string::String;
use core::{fmt, ops::Neg};
use decimalcodec_tables::{
    biased_exponent, coefficient_bcd, compose, BIAS, COEFFICIENT_CONTINUATION_MASK,
    COMBINATION_SHIFT, SIGN_MASK, ZERO_BITS,
};
use forward_ref::forward_ref_unop;

use crate::{
    bcd::{bcd_digit_count, bcd_to_binary, binary_to_bcd, push_bcd_digits},
    value::write_scientific,
};

/// A decimal64 value in densely packed decimal encoding.
///
/// Bit 63 is the sign, bits 58-62 the combination field, bits 50-57 the low
/// exponent bits and bits 0-49 five declets of three digits each. Equality is
/// bitwise, so `1.0` and `1.00` are different words.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Dfp64 {
    bits: u64,
}

impl Dfp64 {
    /// `0E0`, the word every zero result is normalized against.
    pub const ZERO: Self = Self { bits: ZERO_BITS };

    /// Raw transmutation from `u64`.
    #[must_use]
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    /// Raw transmutation to `u64`.
    #[must_use]
    #[inline]
    pub const fn to_bits(self) -> u64 {
        self.bits
    }

    /// Builds a word from a sign, a binary coefficient and an unbiased
    /// exponent. `None` if the coefficient has more than 16 digits or the
    /// exponent is out of range.
    #[must_use]
    pub fn from_parts(negative: bool, coefficient: u64, exponent: i32) -> Option<Self> {
        Self::from_bcd(negative, binary_to_bcd(coefficient)?, exponent.checked_add(BIAS)?)
    }

    /// Builds a word from a sign, a BCD coefficient and a biased exponent.
    #[must_use]
    pub const fn from_bcd(negative: bool, bcd: u64, biased_exponent: i32) -> Option<Self> {
        match compose(negative, bcd, biased_exponent) {
            Some(bits) => Some(Self { bits }),
            None => None,
        }
    }

    /// The 5-bit combination field.
    #[must_use]
    #[inline]
    pub const fn combination(self) -> u8 {
        ((self.bits >> COMBINATION_SHIFT) & 0x1F) as u8
    }

    /// `true` for every encoding of zero, whatever its sign and exponent.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        let combination = self.combination();
        self.bits == ZERO_BITS
            || (self.bits & COEFFICIENT_CONTINUATION_MASK == 0
                && combination & 0x7 == 0
                && combination & 0x18 != 0x18)
    }

    /// `true` if the sign bit is set, including for a negative zero.
    #[must_use]
    #[inline]
    pub const fn is_sign_negative(self) -> bool {
        self.bits & SIGN_MASK != 0
    }

    /// The same word with the sign bit set to `negative`.
    #[must_use]
    #[inline]
    pub const fn with_sign(self, negative: bool) -> Self {
        if negative {
            Self { bits: self.bits | SIGN_MASK }
        } else {
            Self { bits: self.bits & !SIGN_MASK }
        }
    }

    /// Clears the sign of a zero word; other words are returned unchanged.
    #[must_use]
    #[inline]
    pub const fn normalize_zero(self) -> Self {
        if self.is_zero() {
            self.with_sign(false)
        } else {
            self
        }
    }

    /// Exponent as stored, `0..=767`.
    #[must_use]
    #[inline]
    pub const fn biased_exponent(self) -> i32 {
        biased_exponent(self.bits)
    }

    /// Exponent with the bias removed.
    #[must_use]
    #[inline]
    pub const fn exponent(self) -> i32 {
        self.biased_exponent() - BIAS
    }

    /// Digits after the decimal point, the negated exponent.
    #[must_use]
    #[inline]
    pub const fn scale(self) -> i32 {
        -self.exponent()
    }

    /// The 16 coefficient digits as BCD, decoded through the lookup tables.
    #[must_use]
    pub const fn bcd_digits(self) -> u64 {
        if self.is_zero() {
            0
        } else {
            coefficient_bcd(self.bits)
        }
    }

    /// Magnitude of the coefficient.
    #[must_use]
    pub fn coefficient(self) -> u64 {
        bcd_to_binary(self.bcd_digits())
    }

    /// Signed coefficient.
    #[must_use]
    pub fn unscaled_value(self) -> i64 {
        // at most sixteen digits, so the cast is lossless
        #[allow(clippy::cast_possible_wrap)]
        let magnitude = self.coefficient() as i64;
        if self.is_sign_negative() {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Significant digits of the coefficient, 1 for zero.
    #[must_use]
    pub fn significant_digits(self) -> u32 {
        bcd_digit_count(self.bcd_digits())
    }

    /// -1, 0 or 1. A negative zero reports 0.
    #[must_use]
    pub const fn signum(self) -> i32 {
        if self.bcd_digits() == 0 {
            0
        } else if self.is_sign_negative() {
            -1
        } else {
            1
        }
    }
}

impl Default for Dfp64 {
    #[inline]
    fn default() -> Self {
        Self::ZERO
    }
}

impl Neg for Dfp64 {
    type Output = Self;

    /// Flips the sign bit, as the hardware does; `-0` stays a negative zero.
    #[inline]
    fn neg(self) -> Self {
        Self {
            bits: self.bits ^ SIGN_MASK,
        }
    }
}

forward_ref_unop!(impl Neg, neg for Dfp64);

impl fmt::Display for Dfp64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.significant_digits();
        let mut text = String::with_capacity(16);
        push_bcd_digits(&mut text, self.bcd_digits(), digits);
        write_scientific(
            f,
            self.signum() < 0,
            &text,
            i64::from(self.scale()),
        )
    }
}

impl fmt::Debug for Dfp64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dfp64")
            .field("bits", &format_args!("{:#018X}", self.bits))
            .field("value", &format_args!("{self}"))
            .finish()
    }
}

impl From<Dfp64> for u64 {
    #[inline]
    fn from(word: Dfp64) -> Self {
        word.to_bits()
    }
}

impl From<u64> for Dfp64 {
    #[inline]
    fn from(bits: u64) -> Self {
        Self::from_bits(bits)
    }
}
