//! Signed packed decimal: two BCD digits per byte, the last byte holding the
//! final digit in its high nibble and a sign code in its low nibble.
//!
//! The free functions are the software path and accept any length. The
//! [`Context`] methods try the hardware first for values of up to 8 bytes.

use alloc::{vec, vec::Vec};
use decimalcodec_tables::{BIAS, MAX_BIASED_EXPONENT};
use num_bigint::{BigInt, BigUint, Sign as BigSign};
use num_traits::Zero;
use tracing::trace;

use crate::{num_digits, Context, DecimalValue, PackedDecimalError};

/// Sign code written for values that are not negative.
pub const POSITIVE_SIGN: u8 = 0xC;

/// Sign code written for negative values.
pub const NEGATIVE_SIGN: u8 = 0xD;

/// Digits in an `i64`, the precision reported when one overflows.
const I64_DIGITS: u32 = 19;

/// `true` for the negative sign codes `0xB` and `0xD`. Every other code,
/// including digit values, reads as positive.
#[must_use]
#[inline]
pub const fn is_negative_sign(nibble: u8) -> bool {
    matches!(nibble & 0xF, 0xB | 0xD)
}

/// Number of bytes holding `digits` digits and a sign.
#[must_use]
#[inline]
pub const fn packed_len(digits: u32) -> usize {
    (digits as usize + 2) / 2
}

/// Digit nibbles of `bytes`, most significant first, sign excluded.
fn digit_nibbles(bytes: &[u8]) -> impl Iterator<Item = u8> + '_ {
    let (last, body) = bytes.split_last().map_or((0, &[][..]), |(last, body)| (*last, body));
    body.iter()
        .flat_map(|byte| [byte >> 4, byte & 0xF])
        .chain((!bytes.is_empty()).then_some(last >> 4))
}

/// Checks every digit nibble of `bytes` and returns whether the sign code is
/// negative.
///
/// # Errors
///
/// [`PackedDecimalError::Empty`] for no bytes and
/// [`PackedDecimalError::InvalidDigit`] for a digit nibble above 9.
pub fn check_packed(bytes: &[u8]) -> Result<bool, PackedDecimalError> {
    let last = bytes.last().ok_or(PackedDecimalError::Empty)?;
    if let Some((position, nibble)) = digit_nibbles(bytes)
        .enumerate()
        .find(|&(_, nibble)| nibble > 9)
    {
        return Err(PackedDecimalError::InvalidDigit { position, nibble });
    }
    Ok(is_negative_sign(*last))
}

/// Decodes `bytes` as an unscaled value at `scale` without hardware help.
///
/// ```
/// use decimalcodec::packed::decode_packed;
///
/// assert_eq!(decode_packed(&[0x12, 0x3C], 0).unwrap().to_string(), "123");
/// assert_eq!(decode_packed(&[0x12, 0x3D], 2).unwrap().to_string(), "-1.23");
/// ```
///
/// # Errors
///
/// As for [`check_packed`].
pub fn decode_packed(bytes: &[u8], scale: i32) -> Result<DecimalValue, PackedDecimalError> {
    let negative = check_packed(bytes)?;
    let magnitude = digit_nibbles(bytes).fold(BigUint::zero(), |acc, digit| acc * 10_u32 + digit);
    let sign = if negative {
        BigSign::Minus
    } else {
        BigSign::Plus
    };
    Ok(DecimalValue::from_bigint(
        BigInt::from_biguint(sign, magnitude),
        scale,
    ))
}

/// Writes `digits` (ASCII, most significant first) right-justified into
/// `len` bytes followed by the sign code.
fn write_packed(digits: &[u8], negative: bool, len: usize) -> Vec<u8> {
    let mut out = vec![0; len];
    out[len - 1] = if negative {
        NEGATIVE_SIGN
    } else {
        POSITIVE_SIGN
    };
    for (index, digit) in digits.iter().rev().enumerate() {
        let nibble = index + 1;
        let byte = &mut out[len - 1 - nibble / 2];
        let digit = digit - b'0';
        if nibble % 2 == 1 {
            *byte |= digit << 4;
        } else {
            *byte |= digit;
        }
    }
    out
}

/// Encodes the unscaled value of `value` in the fewest bytes that hold it.
/// With an even number of digits the first byte carries a single digit in
/// its low nibble. The sign nibble is the preferred `0xC` or `0xD`.
#[must_use]
pub fn encode_packed(value: &DecimalValue) -> Vec<u8> {
    let (negative, digits) = value.magnitude_digits();
    #[allow(clippy::cast_possible_truncation)]
    let len = packed_len(digits.len() as u32);
    write_packed(digits.as_bytes(), negative, len)
}

/// Encodes the unscaled value of `value` in the `(precision + 2) / 2` bytes
/// of a field of `precision` digits, zero-padded on the left.
///
/// # Errors
///
/// [`PackedDecimalError::Overflow`] when the value has more than `precision`
/// digits.
pub fn encode_packed_with_precision(
    value: &DecimalValue,
    precision: u32,
) -> Result<Vec<u8>, PackedDecimalError> {
    let (negative, digits) = value.magnitude_digits();
    #[allow(clippy::cast_possible_truncation)]
    let count = digits.len() as u32;
    if count > precision {
        return Err(PackedDecimalError::Overflow {
            digits: count,
            precision,
        });
    }
    Ok(write_packed(digits.as_bytes(), negative, packed_len(precision)))
}

/// Converts packed decimal to an `i64`.
///
/// ```
/// use decimalcodec::packed::packed_to_i64;
///
/// assert_eq!(packed_to_i64(&[0x00, 0x12, 0x3D]), Ok(-123));
/// ```
///
/// # Errors
///
/// As for [`check_packed`], and [`PackedDecimalError::Overflow`] when the
/// value does not fit.
pub fn packed_to_i64(bytes: &[u8]) -> Result<i64, PackedDecimalError> {
    let negative = check_packed(bytes)?;
    let mut magnitude = 0_u64;
    let mut significant = 0_u32;
    let mut overflowed = false;
    for digit in digit_nibbles(bytes) {
        if significant > 0 || digit != 0 {
            significant += 1;
        }
        match magnitude
            .checked_mul(10)
            .and_then(|magnitude| magnitude.checked_add(u64::from(digit)))
        {
            Some(next) => magnitude = next,
            None => overflowed = true,
        }
    }
    let overflow = PackedDecimalError::Overflow {
        digits: significant,
        precision: I64_DIGITS,
    };
    if overflowed {
        return Err(overflow);
    }
    if negative {
        0_i64.checked_sub_unsigned(magnitude).ok_or(overflow)
    } else {
        i64::try_from(magnitude).map_err(|_| overflow)
    }
}

/// Converts an `i64` to the `(precision + 2) / 2` bytes of a packed field of
/// `precision` digits.
///
/// ```
/// use decimalcodec::packed::i64_to_packed;
///
/// assert_eq!(i64_to_packed(-123, 5), Ok(vec![0x00, 0x12, 0x3D]));
/// ```
///
/// # Errors
///
/// [`PackedDecimalError::Overflow`] when `value` has more than `precision`
/// digits.
pub fn i64_to_packed(value: i64, precision: u32) -> Result<Vec<u8>, PackedDecimalError> {
    let digits = num_digits(value);
    if digits > precision {
        return Err(PackedDecimalError::Overflow { digits, precision });
    }
    let mut text = [0_u8; 20];
    let mut magnitude = value.unsigned_abs();
    let mut start = text.len();
    loop {
        start -= 1;
        // a single digit
        #[allow(clippy::cast_possible_truncation)]
        let digit = (magnitude % 10) as u8;
        text[start] = b'0' + digit;
        magnitude /= 10;
        if magnitude == 0 {
            break;
        }
    }
    Ok(write_packed(&text[start..], value < 0, packed_len(precision)))
}

impl Context {
    /// Decodes `bytes` as an unscaled value at `scale`.
    ///
    /// Up to 8 bytes are handed to the hardware when the hardware
    /// representation is in use and the exponent fits; everything else, and
    /// every hardware failure, goes through [`decode_packed`].
    ///
    /// # Errors
    ///
    /// As for [`check_packed`]; invalid digits are never passed on.
    pub fn decode_packed(
        &mut self,
        bytes: &[u8],
        scale: i32,
    ) -> Result<DecimalValue, PackedDecimalError> {
        check_packed(bytes)?;
        let biased = i64::from(BIAS) - i64::from(scale);
        if bytes.len() <= 8
            && self.use_extension()
            && (0..i64::from(MAX_BIASED_EXPONENT)).contains(&biased)
        {
            let image = bytes
                .iter()
                .fold(0_u64, |acc, &byte| (acc << 8) | u64::from(byte));
            // checked against the exponent range above
            #[allow(clippy::cast_possible_truncation)]
            let biased = biased as i32;
            match self.hardware.construct_from_packed(image, biased, true) {
                Ok(word) => {
                    let mut value = self.completed(word);
                    value.cache_scale(scale);
                    return Ok(value);
                }
                Err(error) => {
                    self.fallback::<()>("decode_packed", error);
                }
            }
        } else {
            trace!(len = bytes.len(), scale, "packed decimal decoded in software");
        }
        decode_packed(bytes, scale)
    }

    /// Encodes the unscaled value of `value`.
    ///
    /// A hardware-represented value is converted by the hardware and the
    /// 8-byte image trimmed to the length [`encode_packed`] produces, so both
    /// paths agree byte for byte.
    ///
    /// The image carries no leading zero bytes and its sign nibble is always
    /// `0xC` or `0xD`, so bytes decoded from a zero-padded field or with an
    /// alternate sign code (`0xA`, `0xB`, `0xE`, `0xF`) do not come back
    /// unchanged. Use [`encode_packed_with_precision`] for a fixed width.
    pub fn encode_packed(&mut self, value: &DecimalValue) -> Vec<u8> {
        if let Some(word) = value.hardware_word() {
            match self.hardware.convert_to_packed(word, true) {
                Ok(image) => {
                    let len = packed_len(self.word_significance(word));
                    let bytes = image.to_be_bytes();
                    return bytes[bytes.len().saturating_sub(len)..].to_vec();
                }
                Err(error) => {
                    self.fallback::<()>("encode_packed", error);
                }
            }
        }
        encode_packed(value)
    }
}
