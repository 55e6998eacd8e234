use decimalcodec::prelude::*;
use decimalcodec::SoftDfp;
use num_bigint::BigInt;

fn ctx() -> Context {
    Context::with_hardware(&SoftDfp)
}

fn mc(precision: u32, rounding: RoundingMode) -> MathContext {
    MathContext::new(precision, rounding)
}

#[test]
fn test_create_zero() {
    let zero = ctx().create_zero();
    assert_eq!(zero.hardware_word(), Some(Dfp64::ZERO));
    assert_eq!(zero.cached_sign(), Some(Sign::Zero));
    assert_eq!(zero.cached_scale(), Some(0));
    assert_eq!(zero.cached_precision(), Some(1));
    assert_eq!(zero.to_string(), "0");
}

#[test]
fn test_value_of() {
    let mut ctx = ctx();
    let value = ctx.value_of(-1234, 2).unwrap();
    assert_eq!(value.to_string(), "-12.34");
    assert_eq!(value.cached_scale(), Some(2));
    assert_eq!(value.cached_sign(), Some(Sign::Negative));
    assert_eq!(ctx.value_of(0, 0), Some(ctx.create_zero()));
    assert_eq!(ctx.value_of(0, 4).unwrap().to_string(), "0.0000");
    assert_eq!(ctx.value_of(10_000_000_000_000_000, 0), None);
    assert_eq!(ctx.value_of(1, 399), None);
    assert!(ctx.flags().contains(Flags::FALLBACK));
}

#[test]
fn test_from_i32() {
    let mut ctx = ctx();
    let zero = ctx.from_i32(0, MathContext::UNLIMITED).unwrap().unwrap();
    assert_eq!(zero.cached_precision(), Some(1));
    let value = ctx.from_i32(-42, MathContext::UNLIMITED).unwrap().unwrap();
    assert_eq!(value.to_string(), "-42");
    assert_eq!(value.cached_scale(), Some(0));
    assert_eq!(value.cached_precision(), Some(2));
    let value = ctx.from_i32(i32::MIN, mc(3, RoundingMode::Down)).unwrap().unwrap();
    assert_eq!(value.to_string(), "-2.14E+9");
}

#[test]
fn test_from_i64_caches_by_rounding() {
    let mut ctx = ctx();
    let exact = ctx.from_i64(1234, 2, MathContext::DECIMAL64).unwrap().unwrap();
    assert_eq!(exact.to_string(), "12.34");
    assert_eq!(exact.cached_scale(), Some(2));
    assert_eq!(exact.cached_precision(), Some(4));

    let rounded = ctx.from_i64(123_456_789, 0, mc(3, RoundingMode::HalfUp)).unwrap().unwrap();
    assert_eq!(rounded.to_string(), "1.23E+8");
    assert_eq!(rounded.cached_scale(), None);
    assert_eq!(rounded.cached_precision(), None);

    let finished = ctx.from_i64(123_456_789, 0, mc(3, RoundingMode::Unnecessary));
    assert_eq!(finished, Err(ArithmeticError::InexactRequiresRounding));
    let finished = ctx.from_i64(123_000, 0, mc(3, RoundingMode::Unnecessary)).unwrap().unwrap();
    assert_eq!(finished.to_string(), "1.23E+5");
}

#[test]
fn test_from_i64_out_of_word() {
    let mut ctx = ctx();
    assert_eq!(ctx.from_i64(i64::MAX, 0, MathContext::DECIMAL64), Ok(None));
    assert_eq!(ctx.from_i64(1, -370, MathContext::UNLIMITED), Ok(None));
    assert_eq!(
        ctx.from_bigint(&(BigInt::from(i64::MAX) * 10), 0, MathContext::UNLIMITED),
        Ok(None)
    );
    let value = ctx.from_bigint(&BigInt::from(-42), 1, MathContext::UNLIMITED).unwrap().unwrap();
    assert_eq!(value.to_string(), "-4.2");
}

#[test]
fn test_from_bcd_with_sign() {
    let mut ctx = ctx();
    let value = ctx
        .from_bcd(0x123, 3, -2, true, MathContext::UNLIMITED)
        .unwrap()
        .unwrap();
    assert_eq!(value.to_string(), "-1.23");
    assert_eq!(value.cached_scale(), Some(2));

    let full = ctx
        .from_bcd(0x9999_9999_9999_9999, 16, 0, true, MathContext::UNLIMITED)
        .unwrap()
        .unwrap();
    assert_eq!(full.to_string(), "-9999999999999999");
}

#[test]
fn test_from_bcd_rounds_after_sign() {
    let mut ctx = ctx();
    let floor = mc(2, RoundingMode::Floor);
    let negative = ctx.from_bcd(0x123, 3, -2, true, floor).unwrap().unwrap();
    assert_eq!(negative.to_string(), "-1.3");
    let positive = ctx.from_bcd(0x123, 3, -2, false, floor).unwrap().unwrap();
    assert_eq!(positive.to_string(), "1.2");
}

#[test]
fn test_from_bcd_rejects_bad_input() {
    let mut ctx = ctx();
    assert_eq!(ctx.from_bcd(0x1A, 2, 0, false, MathContext::UNLIMITED), Ok(None));
    assert_eq!(ctx.from_bcd(0x1, 1, 370, false, MathContext::UNLIMITED), Ok(None));
    assert_eq!(
        ctx.from_bcd(0, 1, 0, true, MathContext::UNLIMITED),
        Ok(Some(ctx.create_zero()))
    );
}

#[test]
fn test_accessors_cache_on_the_way() {
    let ctx = ctx();
    let mut value = DecimalValue::from_hardware(Dfp64::from_parts(true, 4200, -3).unwrap());
    assert_eq!(value.cached_scale(), None);
    assert_eq!(ctx.scale_of(&mut value), 3);
    assert_eq!(value.cached_scale(), Some(3));
    assert_eq!(ctx.significance_of(&mut value), 4);
    assert_eq!(value.cached_precision(), Some(4));
    assert_eq!(ctx.signum_of(&mut value), -1);
    assert_eq!(value.cached_sign(), Some(Sign::Negative));
    assert_eq!(ctx.unscaled_value_of(&value), BigInt::from(-4200));

    let mut negative_zero = DecimalValue::from_hardware(Dfp64::ZERO.with_sign(true));
    assert_eq!(ctx.signum_of(&mut negative_zero), 0);
    assert_eq!(ctx.significance_of(&mut negative_zero), 1);
}

#[test]
fn test_convert_to_lookaside() {
    let mut ctx = ctx();
    let mut value = ctx.value_of(-1234, 2).unwrap();
    assert!(ctx.convert_to_lookaside(&mut value));
    assert_eq!(
        value.representation(),
        &Representation::Lookaside {
            unscaled: -1234,
            scale: 2
        }
    );
    assert_eq!(value.cached_precision(), Some(4));
    assert_eq!(value.to_string(), "-12.34");
    assert!(!ctx.convert_to_lookaside(&mut value));

    let mut zero = ctx.create_zero();
    assert!(ctx.convert_to_lookaside(&mut zero));
    assert_eq!(
        zero.representation(),
        &Representation::Lookaside {
            unscaled: 0,
            scale: 0
        }
    );
}

#[test]
fn test_convert_to_bigint() {
    let mut ctx = ctx();
    let mut value = ctx.value_of(9_999_999_999_999_999, -5).unwrap();
    assert!(ctx.convert_to_bigint(&mut value));
    assert_eq!(
        value.representation(),
        &Representation::BigInt {
            unscaled: BigInt::from(9_999_999_999_999_999_i64),
            scale: -5
        }
    );
    assert_eq!(value.to_string(), "9.999999999999999E+20");
}

#[test]
fn test_convert_to_hardware() {
    let mut ctx = ctx();
    let mut value = DecimalValue::from_lookaside(-1234, 2);
    assert!(ctx.convert_to_hardware(&mut value));
    assert_eq!(value.hardware_word(), Dfp64::from_parts(true, 1234, -2));
    assert_eq!(value.cached_scale(), Some(2));
    assert_eq!(value.to_string(), "-12.34");

    let mut value = DecimalValue::from_bigint(BigInt::from(-7), 0);
    assert!(ctx.convert_to_hardware(&mut value));
    assert_eq!(value.signum(), -1);

    let mut too_long = DecimalValue::from_lookaside(i64::MAX, 0);
    assert!(!ctx.convert_to_hardware(&mut too_long));
    let mut too_small = DecimalValue::from_lookaside(1, 400);
    assert!(!ctx.convert_to_hardware(&mut too_small));
    let mut huge = DecimalValue::from_bigint(BigInt::from(u64::MAX) * 1000, 0);
    assert!(!ctx.convert_to_hardware(&mut huge));
}

#[test]
fn test_display() {
    let cases: &[(i64, i32, &str)] = &[
        (123, 0, "123"),
        (-123, 2, "-1.23"),
        (1, 6, "0.000001"),
        (1, 7, "1E-7"),
        (-15, 8, "-1.5E-7"),
        (15, -2, "1.5E+3"),
        (0, -2, "0E+2"),
        (0, 3, "0.000"),
    ];
    for &(unscaled, scale, text) in cases {
        assert_eq!(DecimalValue::from_lookaside(unscaled, scale).to_string(), text);
    }
    assert_eq!(DecimalValue::from_lookaside(15, -2).to_plain_string(), "1500");
    assert_eq!(
        DecimalValue::from_lookaside(i64::MIN, 2).to_plain_string(),
        "-92233720368547758.08"
    );
    assert_eq!(DecimalValue::from_lookaside(-5, 3).to_plain_string(), "-0.005");
    assert_eq!(DecimalValue::from_lookaside(0, 2).to_plain_string(), "0.00");
    assert_eq!(DecimalValue::from_lookaside(-15, 3).to_unscaled_string(), "-15");
}

#[test]
fn test_sign() {
    assert_eq!(Sign::from_signum(-7), Sign::Negative);
    assert_eq!(Sign::from_signum(0), Sign::Zero);
    assert_eq!(Sign::Positive.negate(), Sign::Negative);
    assert_eq!(Sign::Zero.negate(), Sign::Zero);
    assert_eq!(DecimalValue::from_bigint(BigInt::from(0), 3).sign(), Sign::Zero);
}
