//! Status line formatting helpers

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

const PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Placeholder shown for a clock that has not ticked yet
pub const NOT_AVAILABLE: &str = "n/a";

// Decimal exponent read off Rust's exact `{:e}` rendering; log10 can land
// just below an integer for exact powers of ten.
fn decimal_exponent(value: f64) -> i32 {
    format!("{:e}", value)
        .rsplit('e')
        .next()
        .and_then(|e| e.parse().ok())
        .unwrap_or(0)
}

fn round_significant(value: f64, digits: i32) -> f64 {
    let exp = decimal_exponent(value);
    let decimals = digits - 1 - exp;
    if decimals >= 0 {
        let scale = 10f64.powi(decimals);
        (value * scale).round() / scale
    } else {
        let scale = 10f64.powi(-decimals);
        (value / scale).round() * scale
    }
}

/// Format with three significant digits and an SI prefix, trailing zeros
/// trimmed: `230`, `1.23k`, `500m`.
pub fn si_format(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let rounded = round_significant(value, 3);
    let exp = decimal_exponent(rounded);
    let group = exp.div_euclid(3).clamp(-8, 8);
    let scaled = if group >= 0 {
        rounded / 10f64.powi(3 * group)
    } else {
        rounded * 10f64.powi(-3 * group)
    };
    let decimals = (2 - (exp - 3 * group)).max(0) as usize;

    let mut text = format!("{:.*}", decimals, scaled);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    let prefix = PREFIXES[(group + 8) as usize];
    format!("{}{}", text, prefix)
}

/// Date (`YYYY/MM/DD`) and time (`H:MM:SS`) of a unix millisecond timestamp
/// in the given zone, or `None` when the timestamp is out of range.
pub fn clock_strings<Tz>(unix_ms: i64, tz: &Tz) -> Option<(String, String)>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let at: DateTime<Tz> = tz.timestamp_millis_opt(unix_ms).single()?;
    Some((
        at.format("%Y/%m/%d").to_string(),
        at.format("%-H:%M:%S").to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn si_three_significant_digits() {
        assert_eq!(si_format(230.1), "230");
        assert_eq!(si_format(1234.0), "1.23k");
        assert_eq!(si_format(0.5), "500m");
        assert_eq!(si_format(49.98), "50");
        assert_eq!(si_format(-2500.0), "-2.5k");
        assert_eq!(si_format(0.0), "0");
        assert_eq!(si_format(1_000_000.0), "1M");
    }

    #[test]
    fn rounding_can_bump_the_prefix() {
        assert_eq!(si_format(999.7), "1k");
    }

    #[test]
    fn clock_uses_unpadded_hours() {
        let (date, time) = clock_strings(0, &Utc).unwrap();
        assert_eq!(date, "1970/01/01");
        assert_eq!(time, "0:00:00");

        // 2021-03-04 13:05:09 UTC
        let (date, time) = clock_strings(1_614_863_109_000, &Utc).unwrap();
        assert_eq!(date, "2021/03/04");
        assert_eq!(time, "13:05:09");
    }
}
