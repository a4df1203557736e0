//! Utility functions for formatting amounts in the explain tables

use rust_decimal::{Decimal, RoundingStrategy};

/// Formats a Decimal with two decimal places and `,` thousands separators,
/// right-aligned to `width` (0 for no padding).
///
/// # Examples
/// ```
/// use capital_gains::utils::format_amount_with_width;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_amount_with_width(dec!(1234.5), 0), "1,234.50");
/// assert_eq!(format_amount_with_width(dec!(-20), 10), "    -20.00");
/// ```
pub fn format_amount_with_width(value: Decimal, width: usize) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    let formatted = format!("{:.2}", rounded);
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let digits: Vec<char> = integer_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if value < Decimal::ZERO && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let result = format!("{}{}.{}", sign, grouped, decimal_part);

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// Format an amount without padding: "1,234.56"
///
/// # Examples
/// ```
/// use capital_gains::utils::format_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_amount(dec!(20000)), "20,000.00");
/// ```
pub fn format_amount(value: Decimal) -> String {
    format_amount_with_width(value, 0)
}
