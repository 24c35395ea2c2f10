//! Human-facing number and label formatting shared by narratives and emails.

use rust_decimal::{Decimal, RoundingStrategy};

/// Format `value` with `decimals` fractional digits and comma thousands
/// separators, e.g. `1234567.891` with 2 decimals → `"1,234,567.89"`.
#[must_use]
pub fn group_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.*}", decimals, value.abs());
    let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let grouped = insert_commas(&fixed);
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format a money amount as US dollars: `-$1,234.50`.
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.2}", rounded.abs());
    let grouped = insert_commas(&fixed);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Capitalize the first letter of every alphabetic run and lowercase the
/// rest, so `gross_margin` becomes `Gross_Margin`.
#[must_use]
pub fn title_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut prev_alpha = false;
    for c in label.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

fn insert_commas(fixed: &str) -> String {
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_large_numbers() {
        assert_eq!(group_thousands(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(group_thousands(999.0, 0), "999");
        assert_eq!(group_thousands(1000.0, 0), "1,000");
    }

    #[test]
    fn keeps_sign_for_negative_values() {
        assert_eq!(group_thousands(-12_500.4, 0), "-12,500");
    }

    #[test]
    fn negative_zero_after_rounding_has_no_sign() {
        assert_eq!(group_thousands(-0.001, 0), "0");
    }

    #[test]
    fn formats_currency() {
        assert_eq!(format_currency(Decimal::new(123_456, 2)), "$1,234.56");
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
        assert_eq!(format_currency(Decimal::new(-505, 1)), "-$50.50");
    }

    #[test]
    fn currency_rounds_half_away_from_zero() {
        assert_eq!(format_currency(Decimal::new(10_005, 3)), "$10.01");
    }

    #[test]
    fn title_case_matches_column_labels() {
        assert_eq!(title_case("revenue"), "Revenue");
        assert_eq!(title_case("gross_margin"), "Gross_Margin");
        assert_eq!(title_case("ROI"), "Roi");
    }
}
