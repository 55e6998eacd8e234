//! Digit counting and BCD nibble-stream helpers.

use alloc::string::String;
use decimalcodec_tables::{is_valid_bcd, MAX_COEFFICIENT, POWERS_OF_TEN};

/// Number of decimal digits in `|value|`. Zero has one digit.
///
/// ```
/// assert_eq!(decimalcodec::num_digits(0), 1);
/// assert_eq!(decimalcodec::num_digits(-1000), 4);
/// assert_eq!(decimalcodec::num_digits(i64::MIN), 19);
/// ```
#[must_use]
pub fn num_digits(value: i64) -> u32 {
    num_digits_u64(value.unsigned_abs())
}

pub(crate) fn num_digits_u64(value: u64) -> u32 {
    match POWERS_OF_TEN.iter().position(|&power| value < power) {
        Some(0) => 1,
        #[allow(clippy::cast_possible_truncation)]
        Some(digits) => digits as u32,
        None if value >= 10_000_000_000_000_000_000 => 20,
        None => 19,
    }
}

/// Binary value of a BCD nibble stream.
#[must_use]
pub fn bcd_to_binary(bcd: u64) -> u64 {
    (0..16)
        .rev()
        .fold(0, |acc, nibble| acc * 10 + ((bcd >> (nibble * 4)) & 0xF))
}

/// BCD nibble stream of `value`, if it has at most 16 digits.
#[must_use]
pub fn binary_to_bcd(mut value: u64) -> Option<u64> {
    if value > MAX_COEFFICIENT {
        return None;
    }
    let mut bcd = 0;
    let mut shift = 0;
    while value != 0 {
        bcd |= (value % 10) << shift;
        value /= 10;
        shift += 4;
    }
    Some(bcd)
}

/// Significant digits of a BCD stream, counted from the leading zero nibbles.
/// Zero has one digit.
#[must_use]
pub fn bcd_digit_count(bcd: u64) -> u32 {
    (16 - bcd.leading_zeros() / 4).max(1)
}

/// `true` when the `digits` lowest digits of `bcd` are all zero.
#[must_use]
pub fn all_zero_bcd(bcd: u64, digits: u32) -> bool {
    match digits {
        0 => true,
        1..=15 => bcd & (u64::MAX >> (64 - digits * 4)) == 0,
        _ => bcd == 0,
    }
}

/// Digit `index` of a `digits`-long BCD stream, counting from the left.
pub(crate) fn digit_at_bcd(bcd: u64, digits: u32, index: u32) -> u8 {
    ((bcd >> ((digits - 1 - index) * 4)) & 0xF) as u8
}

/// Appends the `digits` lowest digits of `bcd` to `out` as ASCII.
pub(crate) fn push_bcd_digits(out: &mut String, bcd: u64, digits: u32) {
    debug_assert!(is_valid_bcd(bcd));
    out.extend((0..digits).map(|i| char::from(b'0' + digit_at_bcd(bcd, digits, i))));
}
