//! Lenient number parsing and display rounding for usage values.

use regex::Regex;
use std::sync::LazyLock;

static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)").unwrap()
});

/// Parse the longest numeric prefix of `s`, ignoring leading whitespace and
/// any trailing text ("12.5 kWh" -> 12.5). Returns `None` when no numeric
/// prefix exists.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let m = LEADING_FLOAT.find(s.trim_start())?;
    m.as_str().parse().ok()
}

/// Round to 2 decimal places, halves away from zero on the cent value.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Format with exactly `digits` decimals, rounding the exact binary value.
/// Exact ties round up, which the default formatter (ties-to-even) would
/// not do. Values a hair below a tie ("0.15" stored as 0.1499...) round down.
pub fn to_fixed(x: f64, digits: usize) -> String {
    if is_exact_tie(x, digits) {
        let scale = 10f64.powi(digits as i32);
        return format!("{:.*}", digits, ((x * scale).trunc() + 1.0) / scale);
    }
    format!("{:.*}", digits, x)
}

/// `x * 10^digits` has fractional part exactly one half. That only happens
/// when `x * 2^(digits + 1)` is an odd integer, and scaling by a power of
/// two is exact, so no decimal rounding error can fake a tie.
fn is_exact_tie(x: f64, digits: usize) -> bool {
    if !x.is_finite() || x < 0.0 {
        return false;
    }
    let m = x * 2f64.powi(digits as i32 + 1);
    m.is_finite() && m.fract() == 0.0 && m % 2.0 == 1.0
}
