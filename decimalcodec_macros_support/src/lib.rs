#![forbid(unsafe_code)]
#![warn(/*missing_docs, */missing_debug_implementations, unused_crate_dependencies, clippy::pedantic)]

use decimalcodec_tables::{compose, BIAS, MAX_DIGITS};
use proc_macro::{Literal, Span, TokenStream, TokenTree};
use quote::ToTokens;

fn compile_error(span: Span, err: &str) -> TokenStream {
    quote::quote_spanned! { span.into() => compile_error!(#err) }
        .to_token_stream()
        .into()
}

/// A decimal literal split into sign, digits as written and exponent.
struct Parsed {
    negative: bool,
    digits: String,
    exponent: i64,
}

fn parse(stream: &TokenStream) -> Result<Parsed, &'static str> {
    let text: String = stream
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();

    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text.as_str())),
    };

    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (
            mantissa,
            exponent.parse::<i64>().map_err(|_| "invalid exponent")?,
        ),
        None => (unsigned, 0),
    };

    let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{integer}{fraction}");
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err("invalid decimal literal");
    }

    Ok(Parsed {
        negative,
        digits,
        exponent: exponent - i64::try_from(fraction.len()).map_err(|_| "literal too long")?,
    })
}

/// Bits of a `Dfp64` for a decimal literal such as `-1.23` or `15e-4`.
#[proc_macro]
pub fn to_dfp64_bits(stream: TokenStream) -> TokenStream {
    let parsed = match parse(&stream) {
        Ok(parsed) => parsed,
        Err(err) => return compile_error(Span::call_site(), err),
    };

    let significant = parsed.digits.trim_start_matches('0');
    if significant.len() > MAX_DIGITS as usize {
        return compile_error(
            Span::call_site(),
            &format!(
                "literal out of range for `Dfp64`
= note: the literal `{stream}` has {} significant digits, the word holds {MAX_DIGITS}",
                significant.len()
            ),
        );
    }

    let bcd = significant
        .bytes()
        .fold(0_u64, |bcd, digit| (bcd << 4) | u64::from(digit - b'0'));
    let bits = i32::try_from(parsed.exponent + i64::from(BIAS))
        .ok()
        .and_then(|biased| compose(parsed.negative, bcd, biased));

    match bits {
        Some(bits) => TokenTree::Literal(Literal::u64_suffixed(bits)).into(),
        None => compile_error(
            Span::call_site(),
            &format!("exponent of `{stream}` out of range for `Dfp64`"),
        ),
    }
}

/// Signed packed decimal bytes for a literal such as `-123`. A decimal point
/// is dropped; every digit as written, leading zeros included, is encoded.
#[proc_macro]
pub fn to_packed_bytes(stream: TokenStream) -> TokenStream {
    let parsed = match parse(&stream) {
        Ok(parsed) => parsed,
        Err(err) => return compile_error(Span::call_site(), err),
    };
    if parsed.exponent > 0 || stream.to_string().contains(['e', 'E']) {
        return compile_error(
            Span::call_site(),
            "packed decimal literals take no exponent",
        );
    }

    let digits = parsed.digits.as_bytes();
    let len = (digits.len() + 2) / 2;
    let mut bytes = vec![0_u8; len];
    bytes[len - 1] = if parsed.negative { 0xD } else { 0xC };
    for (index, digit) in digits.iter().rev().enumerate() {
        let nibble = index + 1;
        let shift = if nibble % 2 == 1 { 4 } else { 0 };
        bytes[len - 1 - nibble / 2] |= (digit - b'0') << shift;
    }

    quote::quote! { [#(#bytes),*] }.into()
}
