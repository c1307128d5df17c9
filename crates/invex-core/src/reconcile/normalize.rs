//! Decimal-point restoration for digit strings that lost their separator.

/// Reinterpret a separator-free digit string as a fixed-precision number by
/// inserting a decimal point `places` digits from the right.
///
/// Strings that already carry a separator (or any other non-digit character)
/// are returned unchanged, which makes the operation idempotent for a fixed
/// precision. Strings shorter than `places` digits are also returned
/// unchanged: there is nothing sensible to split.
pub fn insert_decimal_point(raw: &str, places: u32) -> String {
    let places = places as usize;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.to_string();
    }
    if raw.len() < places {
        return raw.to_string();
    }
    let split = raw.len() - places;
    if split == 0 {
        // Every digit is fractional; keep the result parseable.
        return format!("0.{raw}");
    }
    format!("{}.{}", &raw[..split], &raw[split..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn inserts_point_at_configured_precision() {
        assert_eq!(insert_decimal_point("2000", 2), "20.00");
        assert_eq!(insert_decimal_point("12345", 3), "12.345");
        assert_eq!(insert_decimal_point("105", 1), "10.5");
    }

    #[test]
    fn already_pointed_values_are_untouched() {
        for places in 1..=4 {
            assert_eq!(insert_decimal_point("20.00", places), "20.00");
            assert_eq!(insert_decimal_point("0.5", places), "0.5");
            assert_eq!(insert_decimal_point("1234.5678", places), "1234.5678");
        }
    }

    #[test]
    fn idempotent_for_fixed_precision() {
        for places in 1..=4 {
            let once = insert_decimal_point("123456", places);
            let twice = insert_decimal_point(&once, places);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn short_strings_fail_silently() {
        assert_eq!(insert_decimal_point("5", 2), "5");
        assert_eq!(insert_decimal_point("12", 3), "12");
        assert_eq!(insert_decimal_point("", 2), "");
    }

    #[test]
    fn exact_length_gains_zero_integer_part() {
        assert_eq!(insert_decimal_point("50", 2), "0.50");
    }

    #[test]
    fn non_digit_strings_are_untouched() {
        assert_eq!(insert_decimal_point("O5", 2), "O5");
        assert_eq!(insert_decimal_point("##", 2), "##");
    }
}
