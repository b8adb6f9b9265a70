//! Number formatting for human-readable prices.
//!
//! Rupee amounts use Indian digit grouping: the last three digits form one
//! group, every group before that has two (`12,34,567`).

use rust_decimal::Decimal;

/// Format a decimal amount with Indian grouping, trimming a zero fraction.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp(2).normalize();
    let text = rounded.abs().to_string();
    let (integer, fraction) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(format!("{:0<2}", f))),
        None => (text, None),
    };

    let grouped = group_indian(&integer);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_amounts_are_ungrouped() {
        assert_eq!(format_inr(Decimal::from(0)), "0");
        assert_eq!(format_inr(Decimal::from(999)), "999");
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_inr(Decimal::from(2000)), "2,000");
        assert_eq!(format_inr(Decimal::from(123456)), "1,23,456");
        assert_eq!(format_inr(Decimal::from(12345678)), "1,23,45,678");
    }

    #[test]
    fn test_fraction_is_padded_to_paise() {
        assert_eq!(format_inr(Decimal::new(19995, 1)), "1,999.50");
        assert_eq!(format_inr(Decimal::new(200000, 2)), "2,000");
    }

    #[test]
    fn test_negative_amounts() {
        assert_eq!(format_inr(Decimal::from(-1500)), "-1,500");
    }
}
