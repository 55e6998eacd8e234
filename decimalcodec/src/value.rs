//! The decimal value served by the codec and its representation caches.

use alloc::string::{String, ToString};
use core::fmt::{self, Write};
use num_bigint::{BigInt, Sign as BigSign};
use num_traits::Zero;

use crate::{bcd::push_bcd_digits, num_digits, Dfp64};

/// Sign of a decimal value. Zero has its own sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    /// The value is zero, whatever the sign bit of its word.
    Zero,
    /// Greater than zero.
    Positive,
    /// Less than zero.
    Negative,
}

impl Sign {
    /// Sign of `-1`, `0` or `1`; any other negative or positive value maps
    /// like its signum.
    #[must_use]
    #[inline]
    pub const fn from_signum(signum: i64) -> Self {
        if signum < 0 {
            Self::Negative
        } else if signum == 0 {
            Self::Zero
        } else {
            Self::Positive
        }
    }

    /// `-1`, `0` or `1`.
    #[must_use]
    #[inline]
    pub const fn signum(self) -> i32 {
        match self {
            Self::Zero => 0,
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }

    /// The opposite sign; zero stays zero.
    #[must_use]
    #[inline]
    pub const fn negate(self) -> Self {
        match self {
            Self::Zero => Self::Zero,
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

/// Which of the three representations holds the canonical value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Representation {
    /// A decimal64 word; the scale is the negated exponent of the word.
    Hardware(Dfp64),
    /// A native unscaled integer.
    Lookaside {
        /// Unscaled value.
        unscaled: i64,
        /// Digits after the decimal point.
        scale: i32,
    },
    /// An arbitrary-precision unscaled integer.
    BigInt {
        /// Unscaled value.
        unscaled: BigInt,
        /// Digits after the decimal point.
        scale: i32,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
struct Caches {
    sign: Option<Sign>,
    scale: Option<i32>,
    precision: Option<u32>,
}

/// An arbitrary-precision decimal: an unscaled integer and a scale, held in
/// exactly one [`Representation`] at a time.
///
/// Sign, scale and precision may be cached. A cached entry is trusted as is;
/// every operation that changes the value clears the entries it cannot vouch
/// for.
#[derive(Clone, Debug)]
pub struct DecimalValue {
    repr: Representation,
    cache: Caches,
}

impl DecimalValue {
    /// Value held in a hardware word, with nothing cached.
    #[must_use]
    #[inline]
    pub fn from_hardware(word: Dfp64) -> Self {
        Self::from_representation(Representation::Hardware(word))
    }

    /// Value held as a native unscaled integer, with nothing cached.
    #[must_use]
    #[inline]
    pub fn from_lookaside(unscaled: i64, scale: i32) -> Self {
        Self::from_representation(Representation::Lookaside { unscaled, scale })
    }

    /// Value held as an arbitrary-precision unscaled integer, with nothing
    /// cached.
    #[must_use]
    #[inline]
    pub fn from_bigint(unscaled: BigInt, scale: i32) -> Self {
        Self::from_representation(Representation::BigInt { unscaled, scale })
    }

    /// The canonical zero word with sign, scale and precision cached.
    pub(crate) fn canonical_zero() -> Self {
        Self {
            repr: Representation::Hardware(Dfp64::ZERO),
            cache: Caches {
                sign: Some(Sign::Zero),
                scale: Some(0),
                precision: Some(1),
            },
        }
    }

    #[must_use]
    fn from_representation(repr: Representation) -> Self {
        Self {
            repr,
            cache: Caches::default(),
        }
    }

    /// The canonical representation.
    #[must_use]
    #[inline]
    pub fn representation(&self) -> &Representation {
        &self.repr
    }

    /// The word, if the value is hardware-represented.
    #[must_use]
    #[inline]
    pub fn hardware_word(&self) -> Option<Dfp64> {
        match self.repr {
            Representation::Hardware(word) => Some(word),
            _ => None,
        }
    }

    /// Cached sign, if any.
    #[must_use]
    #[inline]
    pub fn cached_sign(&self) -> Option<Sign> {
        self.cache.sign
    }

    /// Cached scale, if any.
    #[must_use]
    #[inline]
    pub fn cached_scale(&self) -> Option<i32> {
        self.cache.scale
    }

    /// Cached precision, if any.
    #[must_use]
    #[inline]
    pub fn cached_precision(&self) -> Option<u32> {
        self.cache.precision
    }

    /// Replaces the representation and drops every cache.
    pub(crate) fn set_representation(&mut self, repr: Representation) {
        self.repr = repr;
        self.cache = Caches::default();
    }

    /// Swaps in a new word, keeping the caches for the caller to adjust.
    pub(crate) fn replace_word(&mut self, word: Dfp64) {
        self.repr = Representation::Hardware(word);
    }

    pub(crate) fn cache_sign(&mut self, sign: Sign) {
        self.cache.sign = Some(sign);
    }

    pub(crate) fn cache_scale(&mut self, scale: i32) {
        self.cache.scale = Some(scale);
    }

    pub(crate) fn cache_precision(&mut self, precision: u32) {
        self.cache.precision = Some(precision);
    }

    pub(crate) fn invalidate_scale(&mut self) {
        self.cache.scale = None;
    }

    pub(crate) fn invalidate_precision(&mut self) {
        self.cache.precision = None;
    }

    /// Digits after the decimal point; negative for multiples of powers of
    /// ten.
    #[must_use]
    pub fn scale(&self) -> i32 {
        if let Some(scale) = self.cache.scale {
            return scale;
        }
        match self.repr {
            Representation::Hardware(word) => word.scale(),
            Representation::Lookaside { scale, .. } | Representation::BigInt { scale, .. } => scale,
        }
    }

    /// Significant digits of the unscaled value; zero has one.
    #[must_use]
    pub fn precision(&self) -> u32 {
        if let Some(precision) = self.cache.precision {
            return precision;
        }
        match &self.repr {
            Representation::Hardware(word) => word.significant_digits(),
            Representation::Lookaside { unscaled, .. } => num_digits(*unscaled),
            Representation::BigInt { unscaled, .. } => bigint_digits(unscaled),
        }
    }

    /// Sign of the value; a stored negative zero reports [`Sign::Zero`].
    #[must_use]
    pub fn sign(&self) -> Sign {
        if let Some(sign) = self.cache.sign {
            return sign;
        }
        match &self.repr {
            Representation::Hardware(word) => Sign::from_signum(i64::from(word.signum())),
            Representation::Lookaside { unscaled, .. } => Sign::from_signum(unscaled.signum()),
            Representation::BigInt { unscaled, .. } => match unscaled.sign() {
                BigSign::Minus => Sign::Negative,
                BigSign::NoSign => Sign::Zero,
                BigSign::Plus => Sign::Positive,
            },
        }
    }

    /// `-1`, `0` or `1`.
    #[must_use]
    #[inline]
    pub fn signum(&self) -> i32 {
        self.sign().signum()
    }

    /// `true` if the value is zero.
    #[must_use]
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.sign() == Sign::Zero
    }

    /// The unscaled value as an arbitrary-precision integer.
    #[must_use]
    pub fn unscaled_value(&self) -> BigInt {
        match &self.repr {
            Representation::Hardware(word) => BigInt::from(word.unscaled_value()),
            Representation::Lookaside { unscaled, .. } => BigInt::from(*unscaled),
            Representation::BigInt { unscaled, .. } => unscaled.clone(),
        }
    }

    /// Digits of the unscaled magnitude, most significant first, and whether
    /// the value is negative.
    pub(crate) fn magnitude_digits(&self) -> (bool, String) {
        let mut digits = String::new();
        let negative = match &self.repr {
            Representation::Hardware(word) => {
                push_bcd_digits(&mut digits, word.bcd_digits(), word.significant_digits());
                word.signum() < 0
            }
            Representation::Lookaside { unscaled, .. } => {
                digits = unscaled.unsigned_abs().to_string();
                *unscaled < 0
            }
            Representation::BigInt { unscaled, .. } => {
                digits = unscaled.magnitude().to_str_radix(10);
                unscaled.sign() == BigSign::Minus
            }
        };
        (negative, digits)
    }

    /// The value without an exponent field.
    ///
    /// ```
    /// use decimalcodec::DecimalValue;
    ///
    /// assert_eq!(DecimalValue::from_lookaside(15, 5).to_plain_string(), "0.00015");
    /// assert_eq!(DecimalValue::from_lookaside(-15, -2).to_plain_string(), "-1500");
    /// ```
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        Plain(self).to_string()
    }

    /// The unscaled value in decimal, with a leading `-` when negative.
    #[must_use]
    pub fn to_unscaled_string(&self) -> String {
        let (negative, digits) = self.magnitude_digits();
        if negative {
            let mut out = String::with_capacity(digits.len() + 1);
            out.push('-');
            out.push_str(&digits);
            out
        } else {
            digits
        }
    }
}

impl PartialEq for DecimalValue {
    /// Representations are compared, caches are not.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.repr == other.repr
    }
}

impl Eq for DecimalValue {}

impl fmt::Display for DecimalValue {
    /// The canonical scientific string: plain when the scale is not negative
    /// and the adjusted exponent is at least -6, `d.dddE±n` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (negative, digits) = self.magnitude_digits();
        write_scientific(f, negative, &digits, i64::from(self.scale()))
    }
}

/// Displays a value in plain notation.
struct Plain<'a>(&'a DecimalValue);

impl fmt::Display for Plain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (negative, digits) = self.0.magnitude_digits();
        write_plain(f, negative, &digits, i64::from(self.0.scale()))
    }
}

fn bigint_digits(value: &BigInt) -> u32 {
    if value.is_zero() {
        return 1;
    }
    #[allow(clippy::cast_possible_truncation)]
    let digits = value.magnitude().to_str_radix(10).len() as u32;
    digits
}

fn write_zeros(out: &mut impl Write, count: u64) -> fmt::Result {
    (0..count).try_for_each(|_| out.write_char('0'))
}

/// Writes `digits` with `scale` digits after the point and no exponent.
fn write_plain(out: &mut impl Write, negative: bool, digits: &str, scale: i64) -> fmt::Result {
    if negative {
        out.write_char('-')?;
    }
    let len = digits.len() as i64;
    if scale <= 0 {
        out.write_str(digits)?;
        if digits != "0" {
            write_zeros(out, scale.unsigned_abs())?;
        }
        Ok(())
    } else if len > scale {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let point = (len - scale) as usize;
        out.write_str(&digits[..point])?;
        out.write_char('.')?;
        out.write_str(&digits[point..])
    } else {
        out.write_str("0.")?;
        write_zeros(out, (scale - len).unsigned_abs())?;
        out.write_str(digits)
    }
}

/// Writes the canonical scientific string of `digits` at `scale`.
pub(crate) fn write_scientific(
    out: &mut impl Write,
    negative: bool,
    digits: &str,
    scale: i64,
) -> fmt::Result {
    let len = digits.len() as i64;
    let adjusted = len - 1 - scale;
    if scale >= 0 && adjusted >= -6 {
        return write_plain(out, negative, digits, scale);
    }
    if negative {
        out.write_char('-')?;
    }
    out.write_str(&digits[..1])?;
    if len > 1 {
        out.write_char('.')?;
        out.write_str(&digits[1..])?;
    }
    write!(out, "E{adjusted:+}")
}
