use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Render integer cents as a plain two-decimal amount, e.g. `12345 -> "123.45"`.
pub fn format_price_from_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Read a user-typed amount into integer cents.
///
/// Only digits, `,`, `.` and `-` survive. The last `,` or `.` is the decimal
/// separator; any earlier one is a thousands separator and is dropped. So
/// `"R$ 1.234,56"` and `"1,234.56"` both give `123456`. A third fraction digit
/// rounds half-up. Empty, unreadable or out-of-range input gives `0`.
pub fn parse_price_to_cents(text: &str) -> i64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if cleaned.is_empty() {
        return 0;
    }

    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let (whole, fraction) = match unsigned.rfind([',', '.']) {
        Some(separator) => {
            let whole: String = unsigned[..separator]
                .chars()
                .filter(|c| !matches!(c, ',' | '.'))
                .collect();
            (whole, &unsigned[separator + 1..])
        }
        None => (unsigned.to_string(), ""),
    };

    match cents_from_parts(&whole, fraction) {
        Some(cents) if negative => -cents,
        Some(cents) => cents,
        None => {
            debug!("Unreadable price {:?}, treating as zero", text);
            0
        }
    }
}

fn cents_from_parts(whole: &str, fraction: &str) -> Option<i64> {
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return None;
    }

    let units = whole
        .bytes()
        .try_fold(0i64, |acc, digit| acc.checked_mul(10)?.checked_add(i64::from(digit - b'0')))?;

    let mut digits = fraction.bytes().map(|digit| i64::from(digit - b'0'));
    let tenths = digits.next().unwrap_or(0);
    let hundredths = digits.next().unwrap_or(0);
    let round_up = digits.next().is_some_and(|digit| digit >= 5);

    units
        .checked_mul(100)?
        .checked_add(tenths * 10 + hundredths)?
        .checked_add(i64::from(round_up))
}

/// A price that passed the business rule: at least one cent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceInCents(i64);

impl PriceInCents {
    pub fn new(cents: i64) -> Option<Self> {
        (cents >= 1).then_some(PriceInCents(cents))
    }

    pub fn from_text(text: &str) -> Option<Self> {
        Self::new(parse_price_to_cents(text))
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PriceInCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_price_from_cents(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_two_decimals() {
        assert_eq!(format_price_from_cents(12345), "123.45");
        assert_eq!(format_price_from_cents(100), "1.00");
        assert_eq!(format_price_from_cents(5), "0.05");
        assert_eq!(format_price_from_cents(0), "0.00");
        assert_eq!(format_price_from_cents(123456789), "1234567.89");
        assert_eq!(format_price_from_cents(-250), "-2.50");
    }

    #[test]
    fn test_format_then_parse_returns_same_cents() {
        for cents in [0, 1, 9, 10, 99, 100, 101, 12345, 99999, 1_000_000, 123_456_789_012] {
            assert_eq!(parse_price_to_cents(&format_price_from_cents(cents)), cents);
        }
    }

    #[test]
    fn test_round_trip_beyond_float_precision() {
        for cents in [
            9_007_199_254_740_993,
            12_345_678_901_234_567,
            100_000_000_000_000_001,
            i64::MAX / 100,
            i64::MAX - 1,
            i64::MAX,
        ] {
            assert_eq!(parse_price_to_cents(&format_price_from_cents(cents)), cents);
        }
    }

    #[test]
    fn test_overflow_is_zero() {
        assert_eq!(parse_price_to_cents("92233720368547758.08"), 0);
        assert_eq!(parse_price_to_cents("99999999999999999999"), 0);
    }

    #[test]
    fn test_third_fraction_digit_rounds_half_up() {
        assert_eq!(parse_price_to_cents("1.005"), 101);
        assert_eq!(parse_price_to_cents("1.0049"), 100);
        assert_eq!(parse_price_to_cents("-1.005"), -101);
        assert_eq!(parse_price_to_cents(".5"), 50);
        assert_eq!(parse_price_to_cents("5."), 500);
    }

    #[test]
    fn test_parse_plain_amounts() {
        assert_eq!(parse_price_to_cents("123.45"), 12345);
        assert_eq!(parse_price_to_cents("150"), 15000);
        assert_eq!(parse_price_to_cents("12,5"), 1250);
        assert_eq!(parse_price_to_cents("0.1"), 10);
        assert_eq!(parse_price_to_cents(" 80,00 "), 8000);
    }

    #[test]
    fn test_parse_locale_formatted_amounts() {
        assert_eq!(parse_price_to_cents("R$ 1.234,56"), 123456);
        assert_eq!(parse_price_to_cents("$1,234.56"), 123456);
        assert_eq!(parse_price_to_cents("1.234.567,89"), 123456789);
        // A lone separator is always taken as decimal.
        assert_eq!(parse_price_to_cents("1.234"), 123);
        // Only the last separator is decimal, so stray dots fold into the whole part.
        assert_eq!(parse_price_to_cents("12.50.3"), 125030);
    }

    #[test]
    fn test_parse_keeps_sign() {
        assert_eq!(parse_price_to_cents("-12.50"), -1250);
    }

    #[test]
    fn test_unreadable_input_is_zero() {
        assert_eq!(parse_price_to_cents(""), 0);
        assert_eq!(parse_price_to_cents("   "), 0);
        assert_eq!(parse_price_to_cents("abc"), 0);
        assert_eq!(parse_price_to_cents("R$"), 0);
        assert_eq!(parse_price_to_cents("1-2"), 0);
        assert_eq!(parse_price_to_cents(","), 0);
        assert_eq!(parse_price_to_cents("5-"), 0);
        assert_eq!(parse_price_to_cents("--5"), 0);
    }

    #[test]
    fn test_price_in_cents_rejects_zero_and_negative() {
        assert_eq!(PriceInCents::from_text("abc"), None);
        assert_eq!(PriceInCents::from_text("0,00"), None);
        assert_eq!(PriceInCents::from_text("-5"), None);
        assert_eq!(PriceInCents::from_text("0,01").map(PriceInCents::cents), Some(1));

        let price = PriceInCents::new(15000).unwrap();
        assert_eq!(price.to_string(), "150.00");
    }
}
