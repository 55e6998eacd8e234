//! Arithmetic and conversions on hardware-represented values.
//!
//! Every entry point answers `Ok(None)` (or `None`) when the caller has to
//! take its software path instead. Only [`ArithmeticError`]s are surfaced.

use core::{cmp::Ordering, fmt};
use decimalcodec_tables::{is_valid_bcd, BIAS, MAX_COEFFICIENT, MAX_EXPONENT, MIN_EXPONENT};
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use paste::paste;
use tracing::trace;

use crate::{
    bcd::{all_zero_bcd, bcd_digit_count, bcd_to_binary},
    context::{suitable_for_hardware, Context, Flags},
    hardware::{explicit_rounding, DecimalHardware, Exactness, RoundingSpec},
    num_digits, ArithmeticError, DecimalValue, Dfp64, HardwareError, MathContext, Representation,
    RoundingMode, Sign,
};

type OpResult = Result<Option<DecimalValue>, ArithmeticError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Subtract,
    Multiply,
}

impl BinaryOp {
    const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
        }
    }

    fn apply(
        self,
        hardware: &dyn DecimalHardware,
        lhs: Dfp64,
        rhs: Dfp64,
        rounding: RoundingSpec,
    ) -> Result<Dfp64, HardwareError> {
        match self {
            Self::Add => hardware.add(lhs, rhs, rounding),
            Self::Subtract => hardware.subtract(lhs, rhs, rounding),
            Self::Multiply => hardware.multiply(lhs, rhs, rounding),
        }
    }

    /// Exponent of the exact result.
    fn ideal_exponent(self, lhs: Dfp64, rhs: Dfp64) -> i32 {
        match self {
            Self::Add | Self::Subtract => lhs.exponent().min(rhs.exponent()),
            Self::Multiply => lhs.exponent() + rhs.exponent(),
        }
    }

    const fn is_additive(self) -> bool {
        matches!(self, Self::Add | Self::Subtract)
    }
}

fn in_exponent_range(exponent: i64) -> bool {
    (i64::from(MIN_EXPONENT)..=i64::from(MAX_EXPONENT)).contains(&exponent)
}

/// Biased exponent for `scale`, if a word can hold it.
fn biased_for_scale(scale: i32) -> Option<i32> {
    let exponent = -i64::from(scale);
    if in_exponent_range(exponent) {
        i32::try_from(exponent + i64::from(BIAS)).ok()
    } else {
        None
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Whether `lhs / rhs` has a finite decimal expansion.
fn terminates(lhs: Dfp64, rhs: Dfp64) -> bool {
    let numerator = lhs.coefficient();
    let denominator = rhs.coefficient();
    if numerator == 0 {
        return true;
    }
    let mut rest = denominator / gcd(numerator, denominator);
    for factor in [2, 5] {
        while rest % factor == 0 {
            rest /= factor;
        }
    }
    rest == 1
}

macro_rules! binary_ops {
    ($($op:ident => $name:ident, $doc:literal;)*) => { paste! {
        impl Context { $(
            #[doc = "Exact `" $doc "` at the ideal exponent."]
            ///
            /// Falls back when an operand is not hardware-represented, the
            /// result exponent is out of range or the exact result does not fit.
            pub fn $name(&mut self, lhs: &DecimalValue, rhs: &DecimalValue) -> Option<DecimalValue> {
                self.binary_exact(BinaryOp::$op, lhs, rhs)
            }

            #[doc = "`" $doc "` rounded to `mc`."]
            ///
            /// # Errors
            ///
            /// [`ArithmeticError::InexactRequiresRounding`] when `mc` asks for
            /// no rounding but the result has more digits than its precision.
            pub fn [<$name _with>](
                &mut self,
                lhs: &DecimalValue,
                rhs: &DecimalValue,
                mc: MathContext,
            ) -> OpResult {
                self.binary_with(BinaryOp::$op, lhs, rhs, mc)
            }
        )*}
    }};
}

binary_ops! {
    Add => add, "lhs + rhs";
    Subtract => subtract, "lhs - rhs";
    Multiply => multiply, "lhs * rhs";
}

impl Context {
    /// Logs a fallback, raises [`Flags::FALLBACK`] and returns `None`.
    pub(crate) fn fallback<T>(&mut self, operation: &'static str, reason: impl fmt::Display) -> Option<T> {
        trace!(operation, %reason, "falling back to the software path");
        self.flags.insert(Flags::FALLBACK);
        None
    }

    /// Wraps a word produced on the hardware path: a zero loses its sign and
    /// the sign is cached, nothing else is known.
    pub(crate) fn completed(&mut self, word: Dfp64) -> DecimalValue {
        self.flags.insert(Flags::HARDWARE);
        let word = word.normalize_zero();
        let mut value = DecimalValue::from_hardware(word);
        value.cache_sign(Sign::from_signum(i64::from(word.signum())));
        value
    }

    fn words(
        &mut self,
        operation: &'static str,
        lhs: &DecimalValue,
        rhs: &DecimalValue,
    ) -> Option<(Dfp64, Dfp64)> {
        match (lhs.hardware_word(), rhs.hardware_word()) {
            (Some(lhs), Some(rhs)) => Some((lhs, rhs)),
            _ => self.fallback(operation, "operand not hardware-represented"),
        }
    }

    fn word_bcd(&self, word: Dfp64) -> u64 {
        self.hardware
            .bcd_digits(word)
            .unwrap_or_else(|| word.bcd_digits())
    }

    pub(crate) fn word_significance(&self, word: Dfp64) -> u32 {
        match self.hardware.significance(word) {
            Some(0) => 1,
            Some(digits) => digits,
            None => bcd_digit_count(self.word_bcd(word)),
        }
    }

    fn word_scale(&self, word: Dfp64) -> i32 {
        BIAS - self
            .hardware
            .exponent(word)
            .unwrap_or_else(|| word.biased_exponent())
    }

    fn word_unscaled(&self, word: Dfp64) -> i64 {
        self.hardware.unscaled_value(word).unwrap_or_else(|| {
            // sixteen digits at most
            #[allow(clippy::cast_possible_wrap)]
            let magnitude = bcd_to_binary(self.word_bcd(word)) as i64;
            if word.signum() < 0 {
                -magnitude
            } else {
                magnitude
            }
        })
    }

    fn precision_of(&self, value: &DecimalValue) -> u32 {
        match (value.cached_precision(), value.hardware_word()) {
            (Some(precision), _) => precision,
            (None, Some(word)) => self.word_significance(word),
            (None, None) => value.precision(),
        }
    }

    fn binary_exact(
        &mut self,
        op: BinaryOp,
        lhs: &DecimalValue,
        rhs: &DecimalValue,
    ) -> Option<DecimalValue> {
        let (lhs, rhs) = self.words(op.name(), lhs, rhs)?;
        let exponent = op.ideal_exponent(lhs, rhs);
        if !in_exponent_range(i64::from(exponent)) {
            return self.fallback(op.name(), "result exponent out of range");
        }
        match op.apply(self.hardware, lhs, rhs, RoundingSpec::NoRounding) {
            Ok(word) if word.exponent() == exponent => Some(self.completed(word)),
            Ok(_) => self.fallback(op.name(), "exact result does not fit"),
            Err(error) => self.fallback(op.name(), error),
        }
    }

    fn binary_with(
        &mut self,
        op: BinaryOp,
        lhs: &DecimalValue,
        rhs: &DecimalValue,
        mc: MathContext,
    ) -> OpResult {
        let precision = mc.precision();
        let mode = mc.rounding();

        if op.is_additive() && precision != 0 && mode != RoundingMode::Unnecessary {
            let Some((lhs_word, rhs_word)) = self.words(op.name(), lhs, rhs) else {
                return Ok(None);
            };
            let zeros = (lhs_word.is_zero(), rhs_word.is_zero());
            if zeros != (false, false) {
                return match self.zero_operand(op, lhs, rhs, zeros, mc)? {
                    Some(result) => self.finish(result, mc),
                    None => Ok(None),
                };
            }
        }

        let rounding = if mc.is_decimal64() {
            RoundingSpec::FixedPrecision64
        } else if precision == 0 {
            return Ok(self.binary_exact(op, lhs, rhs));
        } else if mode == RoundingMode::Unnecessary {
            RoundingSpec::NoRounding
        } else if let Some(rounding) = RoundingSpec::rounded(mc) {
            rounding
        } else {
            return Ok(self.fallback(op.name(), "precision wider than the word"));
        };

        let Some((lhs, rhs)) = self.words(op.name(), lhs, rhs) else {
            return Ok(None);
        };
        let word = match op.apply(self.hardware, lhs, rhs, rounding) {
            Ok(word) => word,
            Err(error) => return Ok(self.fallback(op.name(), error)),
        };
        if op.is_additive() && rounding != RoundingSpec::FixedPrecision64 {
            self.record_bias(self.config.rounded_bias);
        }
        let result = self.completed(word);
        if rounding == RoundingSpec::NoRounding {
            self.finish(result, mc)
        } else {
            Ok(Some(result))
        }
    }

    /// `lhs ± rhs` when at least one operand is zero: the other operand,
    /// widened to the zero's scale while the precision has room for it.
    fn zero_operand(
        &mut self,
        op: BinaryOp,
        lhs: &DecimalValue,
        rhs: &DecimalValue,
        zeros: (bool, bool),
        mc: MathContext,
    ) -> OpResult {
        let (zero, other) = match zeros {
            (true, true) => {
                let scale = lhs.scale().max(rhs.scale());
                return Ok(self.value_of(0, scale));
            }
            (false, _) => (rhs, lhs.clone()),
            (true, false) if op == BinaryOp::Subtract => match self.negate(rhs) {
                Some(negated) => (lhs, negated),
                None => return Ok(None),
            },
            (true, false) => (lhs, rhs.clone()),
        };
        if zero.scale() > other.scale() && mc.precision() > self.precision_of(&other) {
            self.set_scale(&other, zero.scale())
        } else {
            Ok(Some(other))
        }
    }

    /// Rounds `value` to the precision of `mc` if it has more digits.
    /// Values held in other representations fall back.
    ///
    /// # Errors
    ///
    /// [`ArithmeticError::InexactRequiresRounding`] when the rounding mode is
    /// `Unnecessary` and a dropped digit is not zero.
    pub fn finish(&mut self, value: DecimalValue, mc: MathContext) -> OpResult {
        let precision = mc.precision();
        if precision == 0 || self.precision_of(&value) <= precision {
            return Ok(Some(value));
        }
        if value.hardware_word().is_some() {
            self.round(&value, precision, mc.rounding())
        } else {
            Ok(self.fallback("finish", "value not hardware-represented"))
        }
    }

    /// Exact `lhs / rhs`.
    ///
    /// # Errors
    ///
    /// [`ArithmeticError::DivisionByZero`] for a zero divisor and
    /// [`ArithmeticError::NonTerminatingExpansion`] when the quotient has no
    /// finite decimal expansion.
    pub fn divide(&mut self, lhs: &DecimalValue, rhs: &DecimalValue) -> OpResult {
        let Some((lhs_word, rhs_word)) = self.divisor_checked(lhs, rhs)? else {
            return Ok(None);
        };
        let bound = u64::from(self.precision_of(lhs))
            + (10 * u64::from(self.precision_of(rhs))).div_ceil(3);
        match self
            .hardware
            .divide(lhs_word, rhs_word, RoundingSpec::NoRounding)
        {
            Ok(Exactness::Exact(word)) => {
                if u64::from(self.word_significance(word)) > bound {
                    return Err(ArithmeticError::NonTerminatingExpansion);
                }
                Ok(Some(self.completed(word)))
            }
            Ok(Exactness::Inexact(_)) | Err(_) if !terminates(lhs_word, rhs_word) => {
                Err(ArithmeticError::NonTerminatingExpansion)
            }
            Ok(Exactness::Inexact(_)) => Ok(self.fallback("divide", "exact quotient does not fit")),
            Err(error) => Ok(self.fallback("divide", error)),
        }
    }

    /// `lhs / rhs` rounded to `mc`.
    ///
    /// # Errors
    ///
    /// [`ArithmeticError::DivisionByZero`] for a zero divisor and
    /// [`ArithmeticError::InexactRequiresRounding`] when the rounding mode is
    /// `Unnecessary` and the quotient is inexact. An unlimited `mc` behaves
    /// like [`Context::divide`].
    pub fn divide_with(
        &mut self,
        lhs: &DecimalValue,
        rhs: &DecimalValue,
        mc: MathContext,
    ) -> OpResult {
        if mc.precision() == 0 {
            return self.divide(lhs, rhs);
        }
        let Some((lhs_word, rhs_word)) = self.divisor_checked(lhs, rhs)? else {
            return Ok(None);
        };
        let Some(rounding) = RoundingSpec::rounded(mc) else {
            return Ok(self.fallback("divide", "precision wider than the word"));
        };
        let word = match self.hardware.divide(lhs_word, rhs_word, rounding) {
            Ok(Exactness::Exact(word)) => word,
            Ok(Exactness::Inexact(_)) if mc.rounding() == RoundingMode::Unnecessary => {
                return Err(ArithmeticError::InexactRequiresRounding);
            }
            Ok(Exactness::Inexact(word)) => {
                self.flags.insert(Flags::INEXACT);
                word
            }
            Err(error) => return Ok(self.fallback("divide", error)),
        };
        self.record_bias(self.config.divide_bias);
        Ok(Some(self.completed(word)))
    }

    fn divisor_checked(
        &mut self,
        lhs: &DecimalValue,
        rhs: &DecimalValue,
    ) -> Result<Option<(Dfp64, Dfp64)>, ArithmeticError> {
        match rhs.hardware_word() {
            Some(word) if word.is_zero() => Err(ArithmeticError::DivisionByZero),
            _ => Ok(self.words("divide", lhs, rhs)),
        }
    }

    /// `-value`. A zero stays positive.
    pub fn negate(&mut self, value: &DecimalValue) -> Option<DecimalValue> {
        let Some(word) = value.hardware_word() else {
            return self.fallback("negate", "value not hardware-represented");
        };
        let mut negated = value.clone();
        let sign = Sign::from_signum(i64::from(word.signum()));
        if sign == Sign::Zero {
            negated.replace_word(word.normalize_zero());
        } else {
            negated.replace_word(-word);
        }
        negated.cache_sign(sign.negate());
        Some(negated)
    }

    /// Numeric comparison.
    pub fn compare(&mut self, lhs: &DecimalValue, rhs: &DecimalValue) -> Option<Ordering> {
        let (lhs, rhs) = self.words("compare", lhs, rhs)?;
        match self.hardware.compare(lhs, rhs) {
            Ok(ordering) => Some(ordering),
            Err(error) => self.fallback("compare", error),
        }
    }

    /// Scale of `value`, cached on the way.
    pub fn scale_of(&self, value: &mut DecimalValue) -> i32 {
        if let Some(scale) = value.cached_scale() {
            return scale;
        }
        let scale = match value.hardware_word() {
            Some(word) => self.word_scale(word),
            None => value.scale(),
        };
        value.cache_scale(scale);
        scale
    }

    /// Significant digits of `value`, 1 for zero, cached on the way.
    pub fn significance_of(&self, value: &mut DecimalValue) -> u32 {
        let precision = self.precision_of(value);
        value.cache_precision(precision);
        precision
    }

    /// `-1`, `0` or `1`, cached on the way. A stored negative zero is 0.
    pub fn signum_of(&self, value: &mut DecimalValue) -> i32 {
        if let Some(sign) = value.cached_sign() {
            return sign.signum();
        }
        let sign = match value.hardware_word() {
            Some(word) if self.word_bcd(word) == 0 => Sign::Zero,
            Some(word) if word.is_sign_negative() => Sign::Negative,
            Some(_) => Sign::Positive,
            None => value.sign(),
        };
        value.cache_sign(sign);
        sign.signum()
    }

    /// Unscaled value of `value`.
    #[must_use]
    pub fn unscaled_value_of(&self, value: &DecimalValue) -> BigInt {
        match value.hardware_word() {
            Some(word) => BigInt::from(self.word_unscaled(word)),
            None => value.unscaled_value(),
        }
    }

    /// `value` moved to `scale` without rounding.
    ///
    /// # Errors
    ///
    /// [`ArithmeticError::InexactRequiresRounding`] when a dropped digit is
    /// not zero.
    pub fn set_scale(&mut self, value: &DecimalValue, scale: i32) -> OpResult {
        let Some((word, biased)) = self.rescalable(value, scale) else {
            return Ok(None);
        };
        match self.hardware.set_scale(word, biased, None) {
            Ok(Exactness::Exact(word)) => Ok(Some(self.rescaled(word, scale))),
            Ok(Exactness::Inexact(_)) => Err(ArithmeticError::InexactRequiresRounding),
            Err(error) => Ok(self.fallback("set_scale", error)),
        }
    }

    /// `value` moved to `scale`, rounding with `mode`.
    ///
    /// # Errors
    ///
    /// With [`RoundingMode::Unnecessary`], as [`Context::set_scale`].
    pub fn set_scale_with(
        &mut self,
        value: &DecimalValue,
        scale: i32,
        mode: RoundingMode,
    ) -> OpResult {
        let Some(rounding) = explicit_rounding(mode) else {
            return self.set_scale(value, scale);
        };
        let Some((word, biased)) = self.rescalable(value, scale) else {
            return Ok(None);
        };
        match self.hardware.set_scale(word, biased, Some(rounding)) {
            Ok(exactness) => {
                if !exactness.is_exact() {
                    self.flags.insert(Flags::INEXACT);
                }
                Ok(Some(self.rescaled(exactness.word(), scale)))
            }
            Err(error) => Ok(self.fallback("set_scale", error)),
        }
    }

    fn rescalable(&mut self, value: &DecimalValue, scale: i32) -> Option<(Dfp64, i32)> {
        let Some(word) = value.hardware_word() else {
            return self.fallback("set_scale", "value not hardware-represented");
        };
        match biased_for_scale(scale) {
            Some(biased) => Some((word, biased)),
            None => self.fallback("set_scale", "scale out of range"),
        }
    }

    fn rescaled(&mut self, word: Dfp64, scale: i32) -> DecimalValue {
        self.record_bias(self.config.rescale_bias);
        let mut value = self.completed(word);
        value.cache_scale(scale);
        value.invalidate_precision();
        value
    }

    /// `value` rounded to `precision` significant digits, if it has more.
    ///
    /// # Errors
    ///
    /// [`ArithmeticError::InexactRequiresRounding`] when `mode` is
    /// `Unnecessary` and a dropped digit is not zero.
    pub fn round(&mut self, value: &DecimalValue, precision: u32, mode: RoundingMode) -> OpResult {
        let Some(word) = value.hardware_word() else {
            return Ok(self.fallback("round", "value not hardware-represented"));
        };
        let current = self.precision_of(value);
        if precision == 0 || current <= precision {
            return Ok(Some(value.clone()));
        }
        if mode == RoundingMode::Unnecessary && !all_zero_bcd(self.word_bcd(word), current - precision)
        {
            return Err(ArithmeticError::InexactRequiresRounding);
        }
        match self.hardware.round(word, precision, mode.to_hardware()) {
            Ok(word) => {
                self.flags.insert(Flags::HARDWARE);
                let mut rounded = value.clone();
                rounded.replace_word(word.normalize_zero());
                rounded.cache_precision(precision);
                rounded.invalidate_scale();
                Ok(Some(rounded))
            }
            Err(error) => Ok(self.fallback("round", error)),
        }
    }

    /// The canonical zero `0E0`, with sign, scale and precision cached.
    #[must_use]
    pub fn create_zero(&self) -> DecimalValue {
        DecimalValue::canonical_zero()
    }

    /// `unscaled × 10^-scale` built exactly.
    pub fn value_of(&mut self, unscaled: i64, scale: i32) -> Option<DecimalValue> {
        if !self.use_extension() {
            return self.fallback("value_of", "hardware representation not in use");
        }
        if unscaled == 0 && scale == 0 {
            return Some(self.create_zero());
        }
        let Some(biased) = biased_for_scale(scale).filter(|_| unscaled.unsigned_abs() <= MAX_COEFFICIENT)
        else {
            return self.fallback("value_of", "value does not fit a word");
        };
        match self
            .hardware
            .construct_from_long(unscaled, biased, RoundingSpec::NoRounding)
        {
            Ok(word) => {
                let mut value = self.completed(word);
                value.cache_scale(scale);
                Some(value)
            }
            Err(error) => self.fallback("value_of", error),
        }
    }

    /// `value` rounded to `mc`.
    ///
    /// # Errors
    ///
    /// [`ArithmeticError::InexactRequiresRounding`] as for [`Context::finish`].
    pub fn from_i32(&mut self, value: i32, mc: MathContext) -> OpResult {
        if value == 0 && self.use_extension() {
            return Ok(Some(self.create_zero()));
        }
        let hardware = self.hardware;
        let rounding = construction_rounding(mc);
        self.construct("from_i32", num_digits(i64::from(value)), 0, mc, rounding, |rounding| {
            hardware.construct_from_int(value, rounding)
        })
    }

    /// `value × 10^-scale` rounded to `mc`.
    ///
    /// # Errors
    ///
    /// [`ArithmeticError::InexactRequiresRounding`] as for [`Context::finish`].
    pub fn from_i64(&mut self, value: i64, scale: i32, mc: MathContext) -> OpResult {
        if value == 0 && scale == 0 && self.use_extension() {
            return Ok(Some(self.create_zero()));
        }
        let Some(biased) =
            biased_for_scale(scale).filter(|_| value.unsigned_abs() <= MAX_COEFFICIENT)
        else {
            return Ok(self.fallback("from_i64", "value does not fit a word"));
        };
        let hardware = self.hardware;
        let rounding = construction_rounding(mc);
        self.construct("from_i64", num_digits(value), scale, mc, rounding, |rounding| {
            hardware.construct_from_long(value, biased, rounding)
        })
    }

    /// `bcd × 10^exponent` with an explicit sign, rounded to `mc`. `digits`
    /// is the number of significant digits in `bcd`.
    ///
    /// The magnitude is built unsigned and the sign applied afterwards, so
    /// negative values may use all 16 digits.
    ///
    /// # Errors
    ///
    /// [`ArithmeticError::InexactRequiresRounding`] as for [`Context::finish`].
    pub fn from_bcd(
        &mut self,
        bcd: u64,
        digits: u32,
        exponent: i32,
        negative: bool,
        mc: MathContext,
    ) -> OpResult {
        if bcd == 0 && exponent == 0 && self.use_extension() {
            return Ok(Some(self.create_zero()));
        }
        let Some(biased) = Some(exponent)
            .filter(|&exponent| in_exponent_range(i64::from(exponent)) && is_valid_bcd(bcd))
            .map(|exponent| exponent + BIAS)
        else {
            return Ok(self.fallback("from_bcd", "value does not fit a word"));
        };
        let rounding = match construction_rounding(mc) {
            // directed modes depend on the sign: round once it is applied
            RoundingSpec::PrecisionAndMode { .. } if negative => RoundingSpec::NoRounding,
            rounding => rounding,
        };
        let hardware = self.hardware;
        self.construct("from_bcd", digits, -exponent, mc, rounding, |rounding| {
            hardware
                .construct_from_bcd(bcd, biased, rounding)
                .map(|word| word.with_sign(negative))
        })
    }

    /// `unscaled × 10^-scale` rounded to `mc`, for unscaled values of at most
    /// 16 digits.
    ///
    /// # Errors
    ///
    /// [`ArithmeticError::InexactRequiresRounding`] as for [`Context::finish`].
    pub fn from_bigint(&mut self, unscaled: &BigInt, scale: i32, mc: MathContext) -> OpResult {
        let Some(value) = unscaled
            .to_i64()
            .filter(|value| value.unsigned_abs() <= MAX_COEFFICIENT)
        else {
            return Ok(self.fallback("from_bigint", "value does not fit a word"));
        };
        self.from_i64(value, scale, mc)
    }

    fn construct(
        &mut self,
        operation: &'static str,
        digits: u32,
        scale: i32,
        mc: MathContext,
        rounding: RoundingSpec,
        build: impl FnOnce(RoundingSpec) -> Result<Dfp64, HardwareError>,
    ) -> OpResult {
        if !self.use_extension() {
            return Ok(self.fallback(operation, "hardware representation not in use"));
        }
        let word = match build(rounding) {
            Ok(word) => word,
            Err(error) => return Ok(self.fallback(operation, error)),
        };
        let mut value = self.completed(word);
        match rounding {
            RoundingSpec::PrecisionAndMode { .. } => Ok(Some(value)),
            RoundingSpec::FixedPrecision64 => {
                value.cache_scale(scale);
                value.cache_precision(digits);
                Ok(Some(value))
            }
            RoundingSpec::NoRounding => {
                value.cache_scale(scale);
                value.cache_precision(digits);
                self.finish(value, mc)
            }
        }
    }

    /// Moves a hardware value to the native lookaside representation.
    /// Returns `false` if `value` is not hardware-represented.
    pub fn convert_to_lookaside(&self, value: &mut DecimalValue) -> bool {
        let Some(word) = value.hardware_word() else {
            return false;
        };
        if word == Dfp64::ZERO {
            value.set_representation(Representation::Lookaside {
                unscaled: 0,
                scale: 0,
            });
            value.cache_precision(1);
            return true;
        }
        let scale = self.scale_of(value);
        let precision = self.significance_of(value);
        let unscaled = self.word_unscaled(word);
        value.set_representation(Representation::Lookaside { unscaled, scale });
        value.cache_precision(precision);
        true
    }

    /// Moves a hardware value to the arbitrary-precision representation.
    /// Returns `false` if `value` is not hardware-represented.
    pub fn convert_to_bigint(&self, value: &mut DecimalValue) -> bool {
        let Some(word) = value.hardware_word() else {
            return false;
        };
        if word == Dfp64::ZERO {
            value.set_representation(Representation::BigInt {
                unscaled: BigInt::zero(),
                scale: 0,
            });
            value.cache_precision(1);
            return true;
        }
        let scale = self.scale_of(value);
        let precision = self.significance_of(value);
        let unscaled = self.unscaled_value_of(value);
        value.set_representation(Representation::BigInt { unscaled, scale });
        value.cache_precision(precision);
        true
    }

    /// Moves a lookaside or arbitrary-precision value into a hardware word
    /// when it fits. Returns whether `value` is now hardware-represented.
    pub fn convert_to_hardware(&mut self, value: &mut DecimalValue) -> bool {
        let (unscaled, scale) = match value.representation() {
            Representation::Hardware(_) => return true,
            Representation::Lookaside { unscaled, scale } => (Some(*unscaled), *scale),
            Representation::BigInt { unscaled, scale } => (unscaled.to_i64(), *scale),
        };
        let Some(unscaled) = unscaled.filter(|unscaled| unscaled.unsigned_abs() <= MAX_COEFFICIENT)
        else {
            return false;
        };
        let Some(biased) = biased_for_scale(scale)
            .filter(|_| suitable_for_hardware(num_digits(unscaled), scale))
        else {
            return false;
        };
        match self
            .hardware
            .construct_from_long(unscaled, biased, RoundingSpec::NoRounding)
        {
            Ok(word) => {
                value.set_representation(Representation::Hardware(word));
                value.cache_scale(scale);
                value.cache_sign(Sign::from_signum(unscaled.signum()));
                true
            }
            Err(error) => {
                self.fallback::<()>("convert_to_hardware", error);
                false
            }
        }
    }
}

/// Rounding for a constructor under `mc`: native, exact or rounded.
fn construction_rounding(mc: MathContext) -> RoundingSpec {
    if mc.is_decimal64() {
        RoundingSpec::FixedPrecision64
    } else if mc.precision() == 0 || mc.rounding() == RoundingMode::Unnecessary {
        RoundingSpec::NoRounding
    } else {
        RoundingSpec::rounded(mc).unwrap_or(RoundingSpec::NoRounding)
    }
}
