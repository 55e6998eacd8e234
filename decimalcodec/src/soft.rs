//! Decimal64 primitives emulated in software.

use core::cmp::Ordering;
use decimalcodec_tables::{
    is_valid_bcd, BIAS, MAX_BIASED_EXPONENT, MAX_DIGITS, MAX_EXPONENT, MIN_EXPONENT,
};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::{
    bcd::bcd_to_binary,
    hardware::{DecimalHardware, Exactness, RoundingSpec},
    Dfp64, HardwareError, HwRounding,
};

/// A [`DecimalHardware`] backend that performs every primitive in software
/// with IEEE 754-2008 decimal64 semantics.
///
/// Results use the ideal exponents of the standard and round with the
/// hardware's own rounding codes, so it can stand in wherever accelerated
/// decimal support is missing. Results that would lose digits below the
/// minimum exponent, or need padding past the maximum one, are errors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SoftDfp;

fn ten_pow(exponent: u32) -> BigUint {
    BigUint::from(10_u32).pow(exponent)
}

fn digits_of(coefficient: &BigUint) -> u32 {
    if coefficient.is_zero() {
        1
    } else {
        #[allow(clippy::cast_possible_truncation)]
        let digits = coefficient.to_str_radix(10).len() as u32;
        digits
    }
}

fn parts(word: Dfp64) -> (bool, BigUint, i32) {
    (
        word.is_sign_negative(),
        BigUint::from(word.coefficient()),
        word.exponent(),
    )
}

fn check_biased(biased_exponent: i32) -> Result<i32, HardwareError> {
    if (0..=MAX_BIASED_EXPONENT).contains(&biased_exponent) {
        Ok(biased_exponent - BIAS)
    } else {
        Err(HardwareError::Unsupported)
    }
}

/// Drops the `drop` lowest digits of `coefficient`, rounding with `mode`.
/// Returns the shortened coefficient and whether a non-zero digit was lost.
fn shorten(coefficient: &BigUint, drop: u32, negative: bool, mode: HwRounding) -> (BigUint, bool) {
    if drop == 0 {
        return (coefficient.clone(), false);
    }
    // beyond one digit past the coefficient every divisor rounds alike
    let divisor = ten_pow(drop.min(digits_of(coefficient) + 1));
    let quotient = coefficient / &divisor;
    let remainder = coefficient % &divisor;
    if remainder.is_zero() {
        return (quotient, false);
    }
    let half = (&remainder << 1_u8).cmp(&divisor);
    let increment = match mode {
        HwRounding::HALF_EVEN => {
            half == Ordering::Greater
                || (half == Ordering::Equal && !(&quotient % 2_u32).is_zero())
        }
        HwRounding::DOWN => false,
        HwRounding::CEILING => !negative,
        HwRounding::FLOOR => negative,
        HwRounding::HALF_UP => half != Ordering::Less,
        HwRounding::HALF_DOWN => half == Ordering::Greater,
        HwRounding::UP => true,
        // round for reround: a lost digit moves a final 0 or 5 up by one
        _ => {
            let last = &quotient % 10_u32;
            last.is_zero() || last == BigUint::from(5_u32)
        }
    };
    if increment {
        (quotient + 1_u32, true)
    } else {
        (quotient, true)
    }
}

/// Rounds `coefficient` × 10^`exponent` into a word as `rounding` asks.
///
/// Returns the word and whether it is inexact. [`RoundingSpec::NoRounding`]
/// fails on an inexact result. A result that loses digits below the minimum
/// exponent fails with [`HardwareError::Inexact`], and a non-zero result
/// above the maximum exponent fails with [`HardwareError::Overflow`].
fn finish(
    negative: bool,
    coefficient: BigUint,
    exponent: i32,
    rounding: RoundingSpec,
) -> Result<(Dfp64, bool), HardwareError> {
    let (precision, mode, strict) = match rounding {
        RoundingSpec::NoRounding => (MAX_DIGITS, HwRounding::HALF_EVEN, true),
        RoundingSpec::FixedPrecision64 => (MAX_DIGITS, HwRounding::HALF_EVEN, false),
        RoundingSpec::PrecisionAndMode { precision, mode } => {
            if precision == 0 || precision > MAX_DIGITS {
                return Err(HardwareError::Unsupported);
            }
            (precision, mode, false)
        }
    };

    let digits = digits_of(&coefficient);
    let excess = i64::from(digits) - i64::from(precision);
    let below = i64::from(MIN_EXPONENT) - i64::from(exponent);
    let drop = u32::try_from(excess.max(below).max(0)).map_err(|_| HardwareError::Overflow)?;

    let (mut coefficient, inexact) = shorten(&coefficient, drop, negative, mode);
    let mut exponent = i64::from(exponent) + i64::from(drop);
    if digits_of(&coefficient) > precision {
        // carry out of the top digit leaves a power of ten
        coefficient /= 10_u32;
        exponent += 1;
    }
    if strict && inexact {
        return Err(HardwareError::Inexact);
    }
    // digits lost to the minimum exponent
    if inexact && below > 0 && below >= excess {
        return Err(HardwareError::Inexact);
    }

    if exponent > i64::from(MAX_EXPONENT) {
        if !coefficient.is_zero() {
            return Err(HardwareError::Overflow);
        }
        exponent = i64::from(MAX_EXPONENT);
    }

    let exponent = i32::try_from(exponent).map_err(|_| HardwareError::Overflow)?;
    let word = coefficient
        .to_u64()
        .and_then(|coefficient| Dfp64::from_parts(negative, coefficient, exponent))
        .ok_or(HardwareError::Overflow)?;
    Ok((word, inexact))
}

fn aligned(lhs: Dfp64, rhs: Dfp64) -> (BigUint, BigUint, i32) {
    let (_, lhs_coefficient, lhs_exponent) = parts(lhs);
    let (_, rhs_coefficient, rhs_exponent) = parts(rhs);
    let exponent = lhs_exponent.min(rhs_exponent);
    (
        lhs_coefficient * ten_pow((lhs_exponent - exponent).unsigned_abs()),
        rhs_coefficient * ten_pow((rhs_exponent - exponent).unsigned_abs()),
        exponent,
    )
}

impl SoftDfp {
    fn sum(
        lhs: Dfp64,
        rhs: Dfp64,
        rhs_negative: bool,
        rounding: RoundingSpec,
    ) -> Result<Dfp64, HardwareError> {
        let lhs_negative = lhs.is_sign_negative();
        let (lhs_coefficient, rhs_coefficient, exponent) = aligned(lhs, rhs);
        let (negative, coefficient) = if lhs_negative == rhs_negative {
            (lhs_negative, lhs_coefficient + rhs_coefficient)
        } else if lhs_coefficient >= rhs_coefficient {
            (lhs_negative, lhs_coefficient - rhs_coefficient)
        } else {
            (rhs_negative, rhs_coefficient - lhs_coefficient)
        };
        let negative = if coefficient.is_zero() && lhs_negative != rhs_negative {
            // an exact zero sum is positive except when rounding toward -inf
            matches!(
                rounding,
                RoundingSpec::PrecisionAndMode { mode: HwRounding::FLOOR, .. }
            )
        } else {
            negative
        };
        finish(negative, coefficient, exponent, rounding).map(|(word, _)| word)
    }
}

impl DecimalHardware for SoftDfp {
    fn add(&self, lhs: Dfp64, rhs: Dfp64, rounding: RoundingSpec) -> Result<Dfp64, HardwareError> {
        Self::sum(lhs, rhs, rhs.is_sign_negative(), rounding)
    }

    fn subtract(
        &self,
        lhs: Dfp64,
        rhs: Dfp64,
        rounding: RoundingSpec,
    ) -> Result<Dfp64, HardwareError> {
        Self::sum(lhs, rhs, !rhs.is_sign_negative(), rounding)
    }

    fn multiply(
        &self,
        lhs: Dfp64,
        rhs: Dfp64,
        rounding: RoundingSpec,
    ) -> Result<Dfp64, HardwareError> {
        let (lhs_negative, lhs_coefficient, lhs_exponent) = parts(lhs);
        let (rhs_negative, rhs_coefficient, rhs_exponent) = parts(rhs);
        finish(
            lhs_negative != rhs_negative,
            lhs_coefficient * rhs_coefficient,
            lhs_exponent + rhs_exponent,
            rounding,
        )
        .map(|(word, _)| word)
    }

    fn divide(
        &self,
        lhs: Dfp64,
        rhs: Dfp64,
        rounding: RoundingSpec,
    ) -> Result<Exactness, HardwareError> {
        if rhs.is_zero() {
            return Err(HardwareError::Unsupported);
        }
        let (lhs_negative, lhs_coefficient, lhs_exponent) = parts(lhs);
        let (rhs_negative, rhs_coefficient, rhs_exponent) = parts(rhs);
        let negative = lhs_negative != rhs_negative;
        let ideal = lhs_exponent - rhs_exponent;
        let (precision, rounding) = match rounding {
            RoundingSpec::NoRounding | RoundingSpec::FixedPrecision64 => {
                (MAX_DIGITS, RoundingSpec::FixedPrecision64)
            }
            RoundingSpec::PrecisionAndMode { precision, .. } => (precision, rounding),
        };

        if lhs_coefficient.is_zero() {
            let (word, _) = finish(negative, lhs_coefficient, ideal, rounding)?;
            return Ok(Exactness::Exact(word));
        }

        // enough digits for the requested precision and one rounding digit
        let shift = (i64::from(precision) + 1 + i64::from(digits_of(&rhs_coefficient))
            - i64::from(digits_of(&lhs_coefficient)))
        .max(0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let shift = shift as u32;
        let dividend = lhs_coefficient * ten_pow(shift);
        let mut quotient = &dividend / &rhs_coefficient;
        let remainder = &dividend % &rhs_coefficient;
        #[allow(clippy::cast_possible_wrap)]
        let mut exponent = ideal - shift as i32;

        let exact = remainder.is_zero();
        if exact {
            while exponent < ideal && (&quotient % 10_u32).is_zero() {
                quotient /= 10_u32;
                exponent += 1;
            }
        } else {
            // sticky digit: the quotient continues with non-zero digits
            quotient = quotient * 10_u32 + 1_u32;
            exponent -= 1;
        }

        let (word, inexact) = finish(negative, quotient, exponent, rounding)?;
        Ok(if exact && !inexact {
            Exactness::Exact(word)
        } else {
            Exactness::Inexact(word)
        })
    }

    fn compare(&self, lhs: Dfp64, rhs: Dfp64) -> Result<Ordering, HardwareError> {
        let lhs_sign = lhs.signum();
        let rhs_sign = rhs.signum();
        if lhs_sign != rhs_sign {
            return Ok(lhs_sign.cmp(&rhs_sign));
        }
        if lhs_sign == 0 {
            return Ok(Ordering::Equal);
        }
        let (lhs_coefficient, rhs_coefficient, _) = aligned(lhs, rhs);
        let magnitude = lhs_coefficient.cmp(&rhs_coefficient);
        Ok(if lhs_sign < 0 {
            magnitude.reverse()
        } else {
            magnitude
        })
    }

    fn set_scale(
        &self,
        src: Dfp64,
        biased_exponent: i32,
        rounding: Option<HwRounding>,
    ) -> Result<Exactness, HardwareError> {
        let target = check_biased(biased_exponent)?;
        let (negative, coefficient, exponent) = parts(src);
        let (coefficient, inexact) = if target <= exponent {
            let widened = coefficient * ten_pow((exponent - target).unsigned_abs());
            if digits_of(&widened) > MAX_DIGITS {
                return Err(HardwareError::Overflow);
            }
            (widened, false)
        } else {
            let mode = rounding.unwrap_or(HwRounding::HALF_EVEN);
            shorten(&coefficient, (target - exponent).unsigned_abs(), negative, mode)
        };
        let word = coefficient
            .to_u64()
            .and_then(|coefficient| Dfp64::from_parts(negative, coefficient, target))
            .ok_or(HardwareError::Overflow)?;
        Ok(if inexact {
            Exactness::Inexact(word)
        } else {
            Exactness::Exact(word)
        })
    }

    fn round(&self, src: Dfp64, precision: u32, mode: HwRounding) -> Result<Dfp64, HardwareError> {
        let (negative, coefficient, exponent) = parts(src);
        finish(
            negative,
            coefficient,
            exponent,
            RoundingSpec::PrecisionAndMode { precision, mode },
        )
        .map(|(word, _)| word)
    }

    fn construct_from_long(
        &self,
        value: i64,
        biased_exponent: i32,
        rounding: RoundingSpec,
    ) -> Result<Dfp64, HardwareError> {
        let exponent = check_biased(biased_exponent)?;
        finish(
            value < 0,
            BigUint::from(value.unsigned_abs()),
            exponent,
            rounding,
        )
        .map(|(word, _)| word)
    }

    fn construct_from_bcd(
        &self,
        bcd: u64,
        biased_exponent: i32,
        rounding: RoundingSpec,
    ) -> Result<Dfp64, HardwareError> {
        if !is_valid_bcd(bcd) {
            return Err(HardwareError::Unsupported);
        }
        let exponent = check_biased(biased_exponent)?;
        finish(false, BigUint::from(bcd_to_binary(bcd)), exponent, rounding).map(|(word, _)| word)
    }

    fn construct_from_packed(
        &self,
        packed: u64,
        biased_exponent: i32,
        signed: bool,
    ) -> Result<Dfp64, HardwareError> {
        let (negative, bcd) = if signed {
            match packed & 0xF {
                0xB | 0xD => (true, packed >> 4),
                0xA | 0xC | 0xE | 0xF => (false, packed >> 4),
                _ => return Err(HardwareError::Unsupported),
            }
        } else {
            (false, packed)
        };
        if !is_valid_bcd(bcd) {
            return Err(HardwareError::Unsupported);
        }
        check_biased(biased_exponent)?;
        Dfp64::from_bcd(negative, bcd, biased_exponent).ok_or(HardwareError::Unsupported)
    }

    fn convert_to_packed(&self, word: Dfp64, signed: bool) -> Result<u64, HardwareError> {
        let bcd = word.bcd_digits();
        if !signed {
            return Ok(bcd);
        }
        if bcd >> 60 != 0 {
            return Err(HardwareError::Overflow);
        }
        let sign = if word.signum() < 0 { 0xD } else { 0xC };
        Ok((bcd << 4) | sign)
    }

    fn unscaled_value(&self, word: Dfp64) -> Option<i64> {
        Some(word.unscaled_value())
    }

    fn significance(&self, word: Dfp64) -> Option<u32> {
        Some(if word.is_zero() {
            0
        } else {
            word.significant_digits()
        })
    }

    fn exponent(&self, word: Dfp64) -> Option<i32> {
        Some(word.biased_exponent())
    }
}
