use core::cmp::Ordering;
use decimalcodec::prelude::*;
use decimalcodec::SoftDfp;

fn ctx() -> Context {
    Context::with_hardware(&SoftDfp)
}

fn dec(unscaled: i64, scale: i32) -> DecimalValue {
    ctx().value_of(unscaled, scale).unwrap()
}

macro_rules! assert_result {
    ($result:expr, $text:literal) => {
        assert_eq!($result.unwrap().unwrap().to_string(), $text)
    };
}

fn mc(precision: u32, rounding: RoundingMode) -> MathContext {
    MathContext::new(precision, rounding)
}

#[test]
fn test_exact_add_keeps_ideal_exponent() {
    let mut ctx = ctx();
    let sum = ctx.add(&dec(15, 1), &dec(125, 2)).unwrap();
    assert_eq!(sum.to_string(), "2.75");
    let product = ctx.multiply(&dec(15, 1), &dec(15, 1)).unwrap();
    assert_eq!(product.to_string(), "2.25");
    let difference = ctx.subtract(&dec(1, 0), &dec(100, 2)).unwrap();
    assert_eq!(difference.to_string(), "0.00");
    assert!(ctx.flags().contains(Flags::HARDWARE));
}

#[test]
fn test_exact_add_that_does_not_fit_falls_back() {
    let mut ctx = ctx();
    let max = dec(9_999_999_999_999_999, 0);
    assert_eq!(ctx.add(&max, &dec(1, 0)), None);
    assert!(ctx.flags().contains(Flags::FALLBACK));
}

#[test]
fn test_decimal64_add_rounds() {
    let mut ctx = ctx();
    let max = dec(9_999_999_999_999_999, 0);
    assert_result!(
        ctx.add_with(&max, &dec(1, 0), MathContext::DECIMAL64),
        "1.000000000000000E+16"
    );
}

#[test]
fn test_opposite_values_sum_to_positive_zero() {
    let mut ctx = ctx();
    let sum = ctx.add(&dec(500, 2), &dec(-500, 2)).unwrap();
    assert_eq!(sum.to_string(), "0.00");
    assert_eq!(sum.signum(), 0);
    assert!(!sum.hardware_word().unwrap().is_sign_negative());
}

#[test]
fn test_zero_results_lose_their_sign() {
    let mut ctx = ctx();
    let negative_zero = DecimalValue::from_hardware(Dfp64::ZERO.with_sign(true));
    let product = ctx.multiply(&negative_zero, &dec(5, 0)).unwrap();
    assert!(!product.hardware_word().unwrap().is_sign_negative());
    assert_eq!(product.sign(), Sign::Zero);

    let rescaled = ctx
        .set_scale_with(&dec(-1, 2), 1, RoundingMode::Down)
        .unwrap()
        .unwrap();
    assert_eq!(rescaled.to_string(), "0.0");
    assert!(!rescaled.hardware_word().unwrap().is_sign_negative());

    let negated = ctx.negate(&ctx.create_zero()).unwrap();
    assert_eq!(negated.hardware_word(), Some(Dfp64::ZERO));
}

#[test]
fn test_rounded_add() {
    let mut ctx = ctx();
    let lhs = dec(123, 2);
    let rhs = dec(5, 3);
    assert_result!(ctx.add_with(&lhs, &rhs, mc(3, RoundingMode::HalfUp)), "1.24");
    assert_result!(ctx.add_with(&lhs, &rhs, mc(3, RoundingMode::HalfEven)), "1.24");
    assert_result!(ctx.add_with(&lhs, &rhs, mc(3, RoundingMode::HalfDown)), "1.23");
    assert_result!(ctx.add_with(&lhs, &rhs, mc(3, RoundingMode::Up)), "1.24");
    assert_result!(ctx.add_with(&lhs, &rhs, mc(3, RoundingMode::Down)), "1.23");
    assert_result!(ctx.subtract_with(&rhs, &lhs, mc(3, RoundingMode::Floor)), "-1.23");
    assert_result!(ctx.subtract_with(&rhs, &lhs, mc(3, RoundingMode::Ceiling)), "-1.22");
}

#[test]
fn test_unnecessary_rounding_fails_when_inexact() {
    let mut ctx = ctx();
    let lhs = dec(123, 2);
    assert_eq!(
        ctx.add_with(&lhs, &dec(5, 3), mc(3, RoundingMode::Unnecessary)),
        Err(ArithmeticError::InexactRequiresRounding)
    );
    assert_result!(
        ctx.add_with(&lhs, &dec(7, 2), mc(3, RoundingMode::Unnecessary)),
        "1.30"
    );
    assert_eq!(
        ctx.multiply_with(&lhs, &lhs, mc(3, RoundingMode::Unnecessary)),
        Err(ArithmeticError::InexactRequiresRounding)
    );
}

#[test]
fn test_zero_operand_widens_to_scale() {
    let mut ctx = ctx();
    let zero = dec(0, 3);
    let value = dec(15, 1);
    assert_result!(ctx.add_with(&zero, &value, mc(5, RoundingMode::HalfUp)), "1.500");
    assert_result!(ctx.add_with(&value, &zero, mc(5, RoundingMode::HalfUp)), "1.500");
    assert_result!(ctx.add_with(&zero, &value, mc(2, RoundingMode::HalfUp)), "1.5");
    assert_result!(ctx.subtract_with(&zero, &value, mc(5, RoundingMode::HalfUp)), "-1.500");
    assert_result!(ctx.subtract_with(&value, &zero, mc(5, RoundingMode::HalfUp)), "1.500");

    let other = dec(0, 1);
    assert_result!(ctx.add_with(&zero, &other, mc(5, RoundingMode::HalfUp)), "0.000");
}

#[test]
fn test_zero_operand_rounds_other_operand() {
    let mut ctx = ctx();
    let zero = ctx.create_zero();
    let value = dec(12345, 2);
    assert_result!(ctx.add_with(&zero, &value, mc(3, RoundingMode::HalfUp)), "123");
}

#[test]
fn test_divide_rounded() {
    let mut ctx = ctx();
    let one = dec(1, 0);
    let three = dec(3, 0);
    assert_result!(ctx.divide_with(&one, &three, mc(2, RoundingMode::HalfUp)), "0.33");
    assert!(ctx.flags().contains(Flags::INEXACT));
    assert_result!(ctx.divide_with(&dec(2, 0), &three, mc(3, RoundingMode::Down)), "0.666");
    assert_result!(
        ctx.divide_with(&one, &three, MathContext::DECIMAL64),
        "0.3333333333333333"
    );
    assert_eq!(
        ctx.divide_with(&one, &three, mc(2, RoundingMode::Unnecessary)),
        Err(ArithmeticError::InexactRequiresRounding)
    );
}

#[test]
fn test_divide_exact() {
    let mut ctx = ctx();
    let one = dec(1, 0);
    assert_result!(ctx.divide(&one, &dec(4, 0)), "0.25");
    assert_result!(ctx.divide(&dec(100, 0), &dec(4, 0)), "25");
    assert_result!(
        ctx.divide_with(&dec(10, 0), &dec(4, 0), mc(5, RoundingMode::HalfEven)),
        "2.5"
    );
    assert_result!(ctx.divide(&dec(0, 2), &dec(7, 0)), "0.00");
}

#[test]
fn test_divide_non_terminating() {
    let mut ctx = ctx();
    assert_eq!(
        ctx.divide(&dec(1, 0), &dec(3, 0)),
        Err(ArithmeticError::NonTerminatingExpansion)
    );
    assert_eq!(
        ctx.divide_with(&dec(1, 0), &dec(7, 0), MathContext::UNLIMITED),
        Err(ArithmeticError::NonTerminatingExpansion)
    );
    assert_eq!(
        ctx.divide(&dec(1, 398), &dec(3, 0)),
        Err(ArithmeticError::NonTerminatingExpansion)
    );
}

#[test]
fn test_divide_by_zero() {
    let mut ctx = ctx();
    let one = dec(1, 0);
    assert_eq!(
        ctx.divide(&one, &ctx.create_zero()),
        Err(ArithmeticError::DivisionByZero)
    );
    assert_eq!(
        ctx.divide_with(&one, &dec(0, 2), MathContext::DECIMAL32),
        Err(ArithmeticError::DivisionByZero)
    );
}

#[test]
fn test_compare() {
    let mut ctx = ctx();
    let a = dec(10, 1);
    let b = dec(100, 2);
    assert_eq!(ctx.compare(&a, &b), Some(Ordering::Equal));
    assert_eq!(ctx.compare(&dec(-2, 0), &a), Some(Ordering::Less));
    assert_eq!(ctx.compare(&dec(-2, 0), &dec(-3, 0)), Some(Ordering::Greater));
    assert_eq!(ctx.compare(&dec(0, 5), &ctx.create_zero()), Some(Ordering::Equal));
}

#[test]
fn test_negate() {
    let mut ctx = ctx();
    let negated = ctx.negate(&dec(125, 2)).unwrap();
    assert_eq!(negated.to_string(), "-1.25");
    assert_eq!(negated.cached_sign(), Some(Sign::Negative));
    assert_eq!(ctx.negate(&DecimalValue::from_lookaside(1, 0)), None);
}

#[test]
fn test_set_scale() {
    let mut ctx = ctx();
    let widened = ctx.set_scale(&dec(15, 1), 3).unwrap().unwrap();
    assert_eq!(widened.to_string(), "1.500");
    assert_eq!(widened.cached_scale(), Some(3));
    assert_eq!(
        ctx.set_scale(&dec(155, 2), 1),
        Err(ArithmeticError::InexactRequiresRounding)
    );
    assert_result!(ctx.set_scale(&dec(150, 2), 1), "1.5");
    assert_result!(ctx.set_scale_with(&dec(155, 2), 1, RoundingMode::HalfUp), "1.6");
    assert_result!(ctx.set_scale_with(&dec(145, 2), 1, RoundingMode::HalfEven), "1.4");
    assert_result!(ctx.set_scale_with(&dec(-145, 2), 1, RoundingMode::Floor), "-1.5");
    assert_eq!(
        ctx.set_scale_with(&dec(155, 2), 1, RoundingMode::Unnecessary),
        Err(ArithmeticError::InexactRequiresRounding)
    );
}

#[test]
fn test_set_scale_out_of_range_falls_back() {
    let mut ctx = ctx();
    assert_eq!(ctx.set_scale(&dec(1, 0), 399), Ok(None));
    assert_eq!(ctx.set_scale(&dec(1, 0), 20), Ok(None));
    assert!(ctx.flags().contains(Flags::FALLBACK));
}

#[test]
fn test_set_scale_drops_cached_precision() {
    let mut ctx = ctx();
    let rounded = ctx
        .round(&dec(123_456, 3), 4, RoundingMode::HalfUp)
        .unwrap()
        .unwrap();
    assert_eq!(rounded.cached_precision(), Some(4));
    let rescaled = ctx.set_scale(&rounded, 3).unwrap().unwrap();
    assert_eq!(rescaled.to_string(), "123.500");
    assert_eq!(rescaled.cached_precision(), None);
    assert_eq!(rescaled.cached_scale(), Some(3));
    assert_eq!(rescaled.precision(), 6);
}

#[test]
fn test_round() {
    let mut ctx = ctx();
    let rounded = ctx
        .round(&dec(123_456, 3), 4, RoundingMode::HalfUp)
        .unwrap()
        .unwrap();
    assert_eq!(rounded.to_string(), "123.5");
    assert_eq!(rounded.cached_precision(), Some(4));
    assert_eq!(rounded.cached_scale(), None);

    assert_result!(ctx.round(&dec(12300, 4), 3, RoundingMode::Unnecessary), "1.23");
    assert_eq!(
        ctx.round(&dec(12301, 4), 3, RoundingMode::Unnecessary),
        Err(ArithmeticError::InexactRequiresRounding)
    );
    assert_result!(ctx.round(&dec(12, 0), 5, RoundingMode::Unnecessary), "12");
    assert_result!(ctx.round(&dec(999, 0), 2, RoundingMode::Up), "1.0E+3");
}

#[test]
fn test_finish() {
    let mut ctx = ctx();
    assert_result!(ctx.finish(dec(98765, 2), mc(2, RoundingMode::Down)), "9.8E+2");
    assert_result!(ctx.finish(dec(98765, 2), MathContext::UNLIMITED), "987.65");
    assert_eq!(
        ctx.finish(DecimalValue::from_lookaside(98765, 2), mc(2, RoundingMode::Down)),
        Ok(None)
    );
}

#[test]
fn test_operands_outside_the_word_fall_back() {
    let mut ctx = ctx();
    let lookaside = DecimalValue::from_lookaside(1, 0);
    assert_eq!(ctx.add(&lookaside, &dec(1, 0)), None);
    assert_eq!(ctx.add_with(&lookaside, &lookaside, MathContext::DECIMAL64), Ok(None));
    assert_eq!(ctx.compare(&lookaside, &lookaside), None);
    assert_eq!(
        ctx.add_with(&dec(1, 0), &dec(1, 0), MathContext::DECIMAL128),
        Ok(None)
    );
}

#[test]
fn test_underflowing_product_falls_back() {
    let mut ctx = ctx();
    let tiny = dec(1, 300);
    assert_eq!(ctx.multiply_with(&tiny, &tiny, MathContext::DECIMAL64), Ok(None));
    assert_eq!(ctx.multiply_with(&tiny, &tiny, mc(5, RoundingMode::HalfUp)), Ok(None));
    assert_eq!(ctx.multiply(&tiny, &tiny), None);
    assert!(ctx.flags().contains(Flags::FALLBACK));
}

#[test]
fn test_subnormal_result_losing_digits_falls_back() {
    let mut ctx = ctx();
    // 1.5E-398 cannot be held with the exponent at its minimum
    assert_eq!(
        ctx.multiply_with(&dec(15, 391), &dec(1, 8), MathContext::DECIMAL64),
        Ok(None)
    );
    assert_eq!(
        ctx.divide_with(&dec(1, 300), &dec(1, -100), MathContext::DECIMAL64),
        Ok(None)
    );
    assert_eq!(ctx.divide(&dec(1, 300), &dec(1, -100)), Ok(None));
}

#[test]
fn test_exact_subnormal_result() {
    let mut ctx = ctx();
    assert_result!(
        ctx.multiply_with(&dec(1, 390), &dec(1, 8), MathContext::DECIMAL64),
        "1E-398"
    );
    let product = ctx.multiply(&dec(1, 390), &dec(1, 8)).unwrap();
    assert_eq!(product.to_string(), "1E-398");
    // trailing zeros below the minimum exponent are dropped exactly
    assert_result!(
        ctx.multiply_with(&dec(100, 392), &dec(1, 8), MathContext::DECIMAL64),
        "1E-398"
    );
    assert!(!ctx.flags().contains(Flags::FALLBACK));
}

#[test]
fn test_overflowing_results_fall_back() {
    let mut ctx = ctx();
    let huge = dec(1, -300);
    assert_eq!(ctx.multiply_with(&huge, &huge, MathContext::DECIMAL64), Ok(None));
    assert_eq!(ctx.multiply(&huge, &huge), None);

    // 1E+370 would need a padded coefficient at the maximum exponent
    let half = dec(1, -185);
    assert_eq!(ctx.multiply_with(&half, &half, MathContext::DECIMAL64), Ok(None));

    let max = dec(9_999_999_999_999_999, -369);
    assert_eq!(ctx.add_with(&max, &max, MathContext::DECIMAL64), Ok(None));
    assert_eq!(
        ctx.divide_with(&max, &dec(1, 1), MathContext::DECIMAL64),
        Ok(None)
    );
    assert!(ctx.flags().contains(Flags::FALLBACK));
}
