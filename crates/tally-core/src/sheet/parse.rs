//! Value coercion policies for the cleaned columns.
//!
//! The two policies are deliberately asymmetric: a bad material id fails the
//! whole report, a bad quantity only drops its row.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid literal for integer: '{0}'")]
pub struct StrictParseError(pub String);

/// Replace every `I` with `1`, then parse as an integer.
///
/// Surrounding whitespace is ignored; anything else that is not part of an
/// integer literal is an error.
pub fn strict_parse(text: &str) -> Result<i64, StrictParseError> {
    let substituted = text.replace('I', "1");
    substituted
        .trim()
        .parse::<i64>()
        .map_err(|_| StrictParseError(substituted))
}

/// Drop every character that is not an ASCII digit, then parse as a float.
///
/// Returns NaN when no digits remain.
pub fn lenient_parse(text: &str) -> f64 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strict_parse_substitutes_capital_i() {
        assert_eq!(strict_parse("I23"), Ok(123));
        assert_eq!(strict_parse("1I1"), Ok(111));
        assert_eq!(strict_parse("45"), Ok(45));
        assert_eq!(strict_parse(" 7 "), Ok(7));
    }

    #[test]
    fn strict_parse_rejects_non_integers() {
        assert_eq!(strict_parse("abc"), Err(StrictParseError("abc".into())));
        assert!(strict_parse("").is_err());
        assert!(strict_parse("12.5").is_err());
        // Lower-case `i` is not substituted.
        assert!(strict_parse("i23").is_err());
    }

    #[test]
    fn lenient_parse_keeps_only_digits() {
        assert_eq!(lenient_parse("10"), 10.0);
        assert_eq!(lenient_parse("1 200 pcs"), 1200.0);
        assert_eq!(lenient_parse("-5"), 5.0);
        assert_eq!(lenient_parse("10.5"), 105.0);
    }

    #[test]
    fn lenient_parse_yields_nan_without_digits() {
        assert!(lenient_parse("n/a").is_nan());
        assert!(lenient_parse("").is_nan());
    }
}
