use thiserror::Error;

/// Arithmetic failures surfaced to the caller of the value type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ArithmeticError {
    /// The divisor is zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An exact quotient would need an infinite expansion.
    #[error("non-terminating decimal expansion; no exact representable decimal result")]
    NonTerminatingExpansion,

    /// The rounding mode is `Unnecessary` but the result is inexact.
    #[error("rounding necessary")]
    InexactRequiresRounding,
}

/// Malformed or unrepresentable signed packed decimal data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PackedDecimalError {
    /// No bytes were given.
    #[error("packed decimal is empty")]
    Empty,

    /// A digit nibble holds a value above 9.
    #[error("invalid digit nibble {nibble:#x} at digit {position}")]
    InvalidDigit {
        /// Zero-based digit index, counting from the most significant nibble.
        position: usize,
        /// Offending nibble.
        nibble: u8,
    },

    /// The value has more digits than the target can hold.
    #[error("decimal overflow: {digits} digits do not fit in a precision of {precision}")]
    Overflow {
        /// Digits in the value.
        digits: u32,
        /// Digits available.
        precision: u32,
    },
}

/// Failure of a single hardware primitive.
///
/// Never reaches an end user: the context answers each of these with a
/// fallback to the software path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum HardwareError {
    /// The result needed rounding that was not allowed.
    #[error("result is inexact")]
    Inexact,

    /// The result does not fit in the word.
    #[error("result overflows the word")]
    Overflow,

    /// The operands or the platform are not supported.
    #[error("operation not supported")]
    Unsupported,
}
