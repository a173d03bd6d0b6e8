//! Lenient parsing of caller-supplied values.
//!
//! Callers pass whatever they received (form fields, query parameters,
//! command-line flags). None of these helpers fail: anything that does not
//! parse to a positive number is replaced by the given default.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

pub const DEFAULT_MONTHLY_PROFIT: Decimal = dec!(150000);
pub const DEFAULT_DAYS_IN_MONTH: u32 = 30;
pub const DEFAULT_MARGIN_PERCENT: Decimal = dec!(30);
pub const MAX_MARGIN_PERCENT: Decimal = dec!(99.9);

/// Removes grouping spaces (ASCII and non-breaking) and turns a decimal comma into a point.
fn normalize_decimal_input(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .collect::<String>()
        .trim()
        .replace(',', ".")
}

/// Base-ten order of magnitude of [`Decimal::MAX`] (about 7.9e28).
const MAX_DECIMAL_ORDER: i64 = 28;

/// Parses plain or scientific decimal text, saturating values outside the decimal range.
///
/// Well-formed numbers too large in magnitude become [`Decimal::MAX`] (or
/// [`Decimal::MIN`]) so that later caps still apply; numbers too small to
/// represent become zero. Anything that is not a number is an error.
///
/// ```
/// use plan_core::input::parse_decimal_text;
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_decimal_text("1.5e2").unwrap(), dec!(150));
/// assert_eq!(parse_decimal_text("1e29").unwrap(), Decimal::MAX);
/// assert_eq!(parse_decimal_text("-1e40").unwrap(), Decimal::MIN);
/// assert!(parse_decimal_text("1e").is_err());
/// ```
pub fn parse_decimal_text(text: &str) -> Result<Decimal, rust_decimal::Error> {
    let error = match text.parse::<Decimal>().or_else(|_| Decimal::from_scientific(text)) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    match decimal_order(text) {
        Some((negative, order)) if order >= MAX_DECIMAL_ORDER => {
            Ok(if negative { Decimal::MIN } else { Decimal::MAX })
        }
        Some((_, order)) if order < 0 => Ok(Decimal::ZERO),
        _ => Err(error),
    }
}

/// Sign and base-ten order of magnitude of a well-formed number such as
/// `-12.5e40`; `None` when `text` is not one. Zero has order `i64::MIN`.
fn decimal_order(text: &str) -> Option<(bool, i64)> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
        None => (unsigned, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !all_digits(int_part)
        || !all_digits(frac_part)
    {
        return None;
    }

    let exponent = match exponent {
        None => 0,
        Some(exp) => {
            let (exp_negative, digits) = match exp.as_bytes().first()? {
                b'-' => (true, &exp[1..]),
                b'+' => (false, &exp[1..]),
                _ => (false, exp),
            };
            if digits.is_empty() || !all_digits(digits) {
                return None;
            }
            let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX / 2);
            if exp_negative { -magnitude } else { magnitude }
        }
    };

    let significant_int = int_part.trim_start_matches('0').len() as i64;
    let order = if significant_int > 0 {
        significant_int - 1
    } else {
        match frac_part.find(|c: char| c != '0') {
            Some(leading_zeros) => -(leading_zeros as i64) - 1,
            None => return Some((negative, i64::MIN)),
        }
    };
    Some((negative, order.saturating_add(exponent)))
}

/// Parses a decimal that may use spaces for grouping and a comma as the decimal separator.
///
/// Returns `default` when the value is missing, unparseable or not positive.
/// Values beyond the decimal range saturate (see [`parse_decimal_text`]).
///
/// ```
/// use plan_core::input::parse_decimal_input;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_decimal_input(Some(" 200 000,50 "), dec!(1)), dec!(200000.50));
/// assert_eq!(parse_decimal_input(Some("abc"), dec!(1)), dec!(1));
/// assert_eq!(parse_decimal_input(None, dec!(1)), dec!(1));
/// ```
pub fn parse_decimal_input(
    value: Option<&str>,
    default: Decimal,
) -> Decimal {
    let Some(raw) = value else {
        return default;
    };
    let normalized = normalize_decimal_input(raw);
    if normalized.is_empty() {
        return default;
    }

    match parse_decimal_text(&normalized) {
        Ok(parsed) if parsed > Decimal::ZERO => parsed,
        Ok(parsed) => {
            debug!(input = %raw, %parsed, "non-positive decimal input, using default");
            default
        }
        Err(e) => {
            debug!(input = %raw, "invalid decimal input, using default: {}", e);
            default
        }
    }
}

/// Parses a positive integer, returning `default` on failure or a non-positive value.
pub fn parse_positive_int(
    value: Option<&str>,
    default: u32,
) -> u32 {
    let Some(raw) = value else {
        return default;
    };
    match raw.trim().parse::<i64>() {
        Ok(parsed) if parsed > 0 => u32::try_from(parsed).unwrap_or_else(|_| {
            debug!(input = %raw, "integer input out of range, using default");
            default
        }),
        Ok(_) => default,
        Err(e) => {
            debug!(input = %raw, "invalid integer input, using default: {}", e);
            default
        }
    }
}

/// Parses a margin percentage.
///
/// Falls back to [`DEFAULT_MARGIN_PERCENT`] like [`parse_decimal_input`] and
/// caps anything at or above 99.9 to exactly 99.9.
pub fn parse_margin_percent(value: Option<&str>) -> Decimal {
    let margin = parse_decimal_input(value, DEFAULT_MARGIN_PERCENT);
    if margin <= Decimal::ZERO {
        DEFAULT_MARGIN_PERCENT
    } else if margin >= MAX_MARGIN_PERCENT {
        MAX_MARGIN_PERCENT
    } else {
        margin
    }
}
