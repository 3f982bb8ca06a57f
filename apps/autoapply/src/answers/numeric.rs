use std::sync::OnceLock;

use regex::Regex;

/// Range used when a validation message yields no usable bounds.
pub const FALLBACK_RANGE: (i64, i64) = (1, 99);

fn digits_re() -> &'static Regex {
    static DIGITS_RE: OnceLock<Regex> = OnceLock::new();
    DIGITS_RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

fn pair_re() -> &'static Regex {
    static PAIR_RE: OnceLock<Regex> = OnceLock::new();
    PAIR_RE.get_or_init(|| Regex::new(r"(\d+)\s*,\s*(\d+)").unwrap())
}

/// First run of digits in `text`, or `default` when there is none.
pub fn extract_number(text: &str, default: i64) -> i64 {
    digits_re()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(default)
}

/// Clamps `raw` into `[min, max]`. Unparseable input becomes `min`.
pub fn clamp_numeric(raw: &str, (min, max): (i64, i64)) -> String {
    let value = raw
        .trim()
        .parse::<f64>()
        .map(|f| f.trunc() as i64)
        .unwrap_or(min);
    value.clamp(min, max).to_string()
}

/// Reads a `(min, max)` pair from free text: `"1,99"` first, then any two numbers.
pub fn parse_range(text: &str) -> (i64, i64) {
    let pair = pair_re()
        .captures(text)
        .and_then(|c| Some((c[1].parse().ok()?, c[2].parse().ok()?)))
        .or_else(|| {
            let mut numbers = digits_re()
                .find_iter(text)
                .filter_map(|m| m.as_str().parse::<i64>().ok());
            Some((numbers.next()?, numbers.next()?))
        });
    match pair {
        Some((a, b)) if a <= b => (a, b),
        Some((a, b)) => (b, a),
        None => FALLBACK_RANGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_number_takes_first_digit_run() {
        assert_eq!(extract_number("We think 7 years is right", 3), 7);
        assert_eq!(extract_number("12 or maybe 15", 3), 12);
        assert_eq!(extract_number("no idea", 3), 3);
    }

    #[test]
    fn test_clamp_numeric_into_range() {
        assert_eq!(clamp_numeric("150", (1, 99)), "99");
        assert_eq!(clamp_numeric("-5", (1, 99)), "1");
        assert_eq!(clamp_numeric("4.7", (0, 10)), "4");
        assert_eq!(clamp_numeric("lots", (1, 99)), "1");
    }

    #[test]
    fn test_parse_range_from_model_output_and_error_text() {
        assert_eq!(parse_range("0,10"), (0, 10));
        assert_eq!(parse_range("Range: 1, 50"), (1, 50));
        assert_eq!(
            parse_range("Enter a whole number between 0 and 99"),
            (0, 99)
        );
        assert_eq!(parse_range("between 20 and 5"), (5, 20));
        assert_eq!(parse_range("unknown"), FALLBACK_RANGE);
    }
}
