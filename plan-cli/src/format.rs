use plan_core::calculations::common::round_dp_half_up;
use rust_decimal::Decimal;

/// Inserts a space between every group of three integer digits.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    grouped
}

/// Formats a number with space-separated thousands and `decimals` places (half-up).
///
/// ```
/// use plan_cli::format::spaced_number;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(spaced_number(dec!(1234567.891), 2), "1 234 567.89");
/// assert_eq!(spaced_number(dec!(999.5), 0), "1 000");
/// ```
pub fn spaced_number(
    value: Decimal,
    decimals: u32,
) -> String {
    let rounded = round_dp_half_up(value, decimals);
    let text = format!("{:.*}", decimals as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut out = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Money with two decimals, dropping trailing zeros (`5 000`, `11 666.67`, `12.5`).
pub fn spaced_money(value: Decimal) -> String {
    spaced_number(value, 2)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
