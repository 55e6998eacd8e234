use decimalcodec::hardware::{DecimalHardware, NoAcceleration, RoundingSpec};
use decimalcodec::prelude::*;
use decimalcodec::{remap_rounding, suitable_for_hardware, HwRounding, Hysteresis, SoftDfp};

fn rounded_add(ctx: &mut Context) -> Option<DecimalValue> {
    let value = DecimalValue::from_hardware(dfp64!(1.5));
    ctx.add_with(&value, &value, MathContext::new(5, RoundingMode::HalfUp))
        .unwrap()
}

#[test]
fn test_hysteresis_counter() {
    let mut hysteresis = Hysteresis::new();
    assert!(hysteresis.prefers_hardware());
    assert!(!hysteresis.record(-600, 1000));
    assert_eq!(hysteresis.counter(), -600);
    assert!(hysteresis.record(-600, 1000));
    assert!(!hysteresis.prefers_hardware());
    assert_eq!(hysteresis.counter(), 0);
    assert!(!hysteresis.record(-1001, 1000));
    assert_eq!(hysteresis.counter(), 0);
    assert!(!hysteresis.record(1000, 1000));
    assert!(hysteresis.record(1, 1000));
    assert!(hysteresis.prefers_hardware());
}

#[test]
fn test_hysteresis_skips_overflowing_bias() {
    let mut hysteresis = Hysteresis::new();
    assert!(!hysteresis.record(i32::MAX, i32::MAX));
    assert!(!hysteresis.record(i32::MAX, i32::MAX));
    assert_eq!(hysteresis.counter(), i32::MAX);
    assert!(!hysteresis.record(1, i32::MAX));
    assert_eq!(hysteresis.counter(), i32::MAX);
    assert!(!hysteresis.record(-10, i32::MAX));
    assert_eq!(hysteresis.counter(), i32::MAX - 10);

    let mut hysteresis = Hysteresis::new();
    assert!(!hysteresis.record(-5, i32::MAX));
    assert!(!hysteresis.record(i32::MIN, i32::MAX));
    assert_eq!(hysteresis.counter(), -5);
}

#[test]
fn test_rounded_results_steer_away_from_hardware() {
    let config = Config::DEFAULT.with_hysteresis(true).with_threshold(10);
    let mut ctx = Context::with_hardware(&SoftDfp).with_config(config);
    for _ in 0..3 {
        assert!(rounded_add(&mut ctx).is_some());
    }
    assert_eq!(ctx.hysteresis().counter(), -9);
    assert!(ctx.use_extension());
    assert!(rounded_add(&mut ctx).is_some());
    assert!(!ctx.hysteresis().prefers_hardware());
    assert!(ctx.flags().contains(Flags::HYSTERESIS_FLIPPED));
    assert!(!ctx.use_extension());
    assert_eq!(ctx.value_of(1, 0), None);

    ctx.perform_hardware_usage_heuristic(MathContext::DECIMAL32, 20);
    assert!(!ctx.use_extension());
    ctx.perform_hardware_usage_heuristic(MathContext::DECIMAL64, 20);
    assert!(ctx.use_extension());
}

#[test]
fn test_bias_ignored_without_hysteresis() {
    let mut ctx = Context::with_hardware(&SoftDfp).with_config(Config::DEFAULT.with_threshold(1));
    for _ in 0..5 {
        assert!(rounded_add(&mut ctx).is_some());
    }
    ctx.perform_hardware_usage_heuristic(MathContext::DECIMAL64, -100);
    assert_eq!(ctx.hysteresis().counter(), 0);
    assert!(ctx.use_extension());
}

#[test]
fn test_configured_biases() {
    let config = Config::DEFAULT
        .with_hysteresis(true)
        .with_biases(-1, 2, 3);
    let mut ctx = Context::with_hardware(&SoftDfp).with_config(config);
    let one = ctx.value_of(1, 0).unwrap();
    let three = ctx.value_of(3, 0).unwrap();
    ctx.divide_with(&one, &three, MathContext::DECIMAL32).unwrap().unwrap();
    assert_eq!(ctx.hysteresis().counter(), 3);
    ctx.set_scale(&one, 2).unwrap().unwrap();
    assert_eq!(ctx.hysteresis().counter(), 5);
    rounded_add(&mut ctx).unwrap();
    assert_eq!(ctx.hysteresis().counter(), 4);
}

#[test]
fn test_hardware_disabled() {
    let mut ctx = Context::with_hardware(&SoftDfp).with_config(Config::DEFAULT.with_hardware(false));
    assert!(!ctx.use_extension());
    assert!(!ctx.suitable_for_extension(1, 0));
    assert_eq!(ctx.from_i32(7, MathContext::UNLIMITED), Ok(None));
    assert_eq!(ctx.from_i64(7, 1, MathContext::UNLIMITED), Ok(None));
    assert_eq!(ctx.value_of(7, 0), None);
    let mut value = ctx.decode_packed(&packed!(7), 0).unwrap();
    assert!(matches!(value.representation(), Representation::BigInt { .. }));
    assert!(!ctx.flags().contains(Flags::HARDWARE));
    // explicit conversions still go through
    assert!(ctx.convert_to_hardware(&mut value));
}

#[test]
fn test_without_acceleration() {
    let mut ctx = Context::without_acceleration();
    assert!(!ctx.hardware().is_available());
    assert!(!ctx.use_extension());
    let value = DecimalValue::from_hardware(dfp64!(2.5));
    assert_eq!(ctx.add(&value, &value), None);
    assert_eq!(ctx.compare(&value, &value), None);
    assert_eq!(ctx.set_scale(&value, 3), Ok(None));
    assert_eq!(ctx.round(&dfp_value(), 1, RoundingMode::HalfUp), Ok(None));
    assert_eq!(ctx.encode_packed(&value), [0x02, 0x5C]);
    assert_eq!(ctx.flags(), Flags::FALLBACK);
}

fn dfp_value() -> DecimalValue {
    DecimalValue::from_hardware(dfp64!(12.5))
}

#[test]
fn test_no_acceleration_primitives() {
    let word = dfp64!(1);
    assert!(NoAcceleration.add(word, word, RoundingSpec::NoRounding).is_err());
    assert!(NoAcceleration.convert_to_packed(word, true).is_err());
    assert_eq!(NoAcceleration.significance(word), None);
    assert_eq!(SoftDfp.significance(word), Some(1));
}

#[test]
fn test_flags() {
    let mut ctx = Context::new();
    assert!(ctx.flags().is_empty());
    ctx.raise_flags(Flags::INEXACT | Flags::FALLBACK);
    assert_eq!(ctx.test_flags(Flags::INEXACT | Flags::HARDWARE), Flags::INEXACT);
    ctx.lower_flags(Flags::INEXACT);
    assert_eq!(ctx.flags(), Flags::FALLBACK);
    ctx.restore_flags(Flags::HARDWARE, Flags::HARDWARE | Flags::FALLBACK);
    assert_eq!(ctx.flags(), Flags::HARDWARE);
    assert_eq!(ctx.save_all_flags(), Flags::HARDWARE);
    assert!(ctx.flags().is_empty());
}

#[test]
fn test_suitable_for_hardware() {
    assert!(suitable_for_hardware(16, 398));
    assert!(suitable_for_hardware(1, -369));
    assert!(!suitable_for_hardware(17, 0));
    assert!(!suitable_for_hardware(1, 399));
    assert!(!suitable_for_hardware(1, -370));
    assert!(Context::new().suitable_for_extension(16, 0));
}

#[test]
fn test_rounding_remap() {
    for ordinal in 0..8 {
        assert_eq!(remap_rounding(remap_rounding(ordinal)), ordinal);
        let mode = RoundingMode::from_ordinal(ordinal).unwrap();
        assert_eq!(mode.ordinal(), ordinal);
        assert_eq!(mode.to_hardware().code(), remap_rounding(ordinal));
    }
    assert_eq!(RoundingMode::Up.to_hardware(), HwRounding::UP);
    assert_eq!(RoundingMode::HalfEven.to_hardware(), HwRounding::HALF_EVEN);
    assert_eq!(RoundingMode::Floor.to_hardware(), HwRounding::FLOOR);
    assert_eq!(RoundingMode::from_ordinal(8), None);
    assert_eq!(HwRounding::from_code(8), None);
}

#[test]
fn test_rounding_for_context() {
    assert_eq!(RoundingSpec::rounded(MathContext::UNLIMITED), None);
    assert_eq!(
        RoundingSpec::rounded(MathContext::DECIMAL64),
        Some(RoundingSpec::FixedPrecision64)
    );
    assert_eq!(
        RoundingSpec::rounded(MathContext::DECIMAL32),
        Some(RoundingSpec::PrecisionAndMode {
            precision: 7,
            mode: HwRounding::HALF_EVEN
        })
    );
    assert_eq!(
        RoundingSpec::rounded(MathContext::new(16, RoundingMode::Up)),
        Some(RoundingSpec::PrecisionAndMode {
            precision: 16,
            mode: HwRounding::UP
        })
    );
    assert_eq!(RoundingSpec::rounded(MathContext::DECIMAL128), None);
}
