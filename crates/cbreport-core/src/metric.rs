//! Numeric values carried through aggregation
//!
//! Run records mix integer counters with fractional timings. A [`Metric`]
//! keeps the distinction the input document made: integer arithmetic stays
//! integral, any fractional operand produces a float, and ratios are always
//! floats.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// A single numeric statistic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Int(i64),
    Float(f64),
}

impl Metric {
    pub const ZERO: Metric = Metric::Int(0);

    /// Read a metric out of a JSON value, if it is a number
    pub fn from_json(value: &Value) -> Option<Self> {
        let Value::Number(number) = value else {
            return None;
        };
        number
            .as_i64()
            .map(Metric::Int)
            .or_else(|| number.as_f64().map(Metric::Float))
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Metric::Int(v) => v as f64,
            Metric::Float(v) => v,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Metric::Int(v) => v == 0,
            Metric::Float(v) => v == 0.0,
        }
    }

    /// Divide, always producing a float. `None` when the divisor is zero.
    pub fn ratio(self, divisor: Metric) -> Option<Metric> {
        if divisor.is_zero() {
            None
        } else {
            Some(Metric::Float(self.as_f64() / divisor.as_f64()))
        }
    }

    /// Round to `places` decimal places. Integers are returned unchanged.
    ///
    /// Ties in the exact binary value round to even, so `10.0625` becomes
    /// `10.062` at three places.
    pub fn round(self, places: u32) -> Metric {
        match self {
            Metric::Int(_) => self,
            Metric::Float(v) => {
                let rounded = format!("{:.*}", places as usize, v).parse::<f64>().unwrap_or(v);
                Metric::Float(if rounded.is_finite() { rounded } else { v })
            }
        }
    }

    pub fn min(self, other: Metric) -> Metric {
        if other < self {
            other
        } else {
            self
        }
    }

    pub fn max(self, other: Metric) -> Metric {
        if other > self {
            other
        } else {
            self
        }
    }
}

impl Add for Metric {
    type Output = Metric;

    fn add(self, rhs: Metric) -> Metric {
        match (self, rhs) {
            (Metric::Int(a), Metric::Int(b)) => a
                .checked_add(b)
                .map(Metric::Int)
                .unwrap_or(Metric::Float(a as f64 + b as f64)),
            (a, b) => Metric::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl Sub for Metric {
    type Output = Metric;

    fn sub(self, rhs: Metric) -> Metric {
        match (self, rhs) {
            (Metric::Int(a), Metric::Int(b)) => a
                .checked_sub(b)
                .map(Metric::Int)
                .unwrap_or(Metric::Float(a as f64 - b as f64)),
            (a, b) => Metric::Float(a.as_f64() - b.as_f64()),
        }
    }
}

impl PartialOrd for Metric {
    fn partial_cmp(&self, other: &Metric) -> Option<Ordering> {
        match (self, other) {
            (Metric::Int(a), Metric::Int(b)) => a.partial_cmp(b),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl From<i64> for Metric {
    fn from(value: i64) -> Self {
        Metric::Int(value)
    }
}

impl From<f64> for Metric {
    fn from(value: f64) -> Self {
        Metric::Float(value)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Int(v) => write!(f, "{}", v),
            Metric::Float(v) => write!(f, "{}", format_float(*v)),
        }
    }
}

/// Shortest round-trip decimal, with a trailing `.0` on integral values
///
/// Values whose decimal exponent is below -4 or at least 16 are written in
/// scientific form with a signed two-digit exponent, e.g. `1e-05`, `1e+16`.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value != 0.0 {
        let scientific = format!("{:e}", value);
        if let Some((mantissa, exponent)) = scientific.split_once('e') {
            if let Ok(exponent) = exponent.parse::<i32>() {
                if !(-4..16).contains(&exponent) {
                    let sign = if exponent < 0 { '-' } else { '+' };
                    return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
                }
            }
        }
    }

    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_integers() {
        assert_eq!(Metric::from_json(&json!(42)), Some(Metric::Int(42)));
        assert_eq!(Metric::from_json(&json!(1.5)), Some(Metric::Float(1.5)));
        assert_eq!(Metric::from_json(&json!("42")), None);
    }

    #[test]
    fn test_mixed_arithmetic() {
        assert_eq!(Metric::Int(2) + Metric::Int(3), Metric::Int(5));
        assert_eq!(Metric::Int(2) + Metric::Float(0.5), Metric::Float(2.5));
        assert_eq!(Metric::Int(12) - Metric::Int(10), Metric::Int(2));
        assert_eq!(Metric::Int(i64::MAX) + Metric::Int(1), Metric::Float(i64::MAX as f64 + 1.0));
    }

    #[test]
    fn test_ratio() {
        assert_eq!(Metric::Int(30).ratio(Metric::Int(3)), Some(Metric::Float(10.0)));
        assert_eq!(Metric::Int(1).ratio(Metric::Float(0.0)), None);
    }

    #[test]
    fn test_round() {
        assert_eq!(Metric::Float(1.234567).round(3), Metric::Float(1.235));
        assert_eq!(Metric::Int(7).round(3), Metric::Int(7));
    }

    #[test]
    fn test_round_ties_to_even() {
        assert_eq!(Metric::Float(10.0625).round(3), Metric::Float(10.062));
        assert_eq!(Metric::Float(0.0625).round(3), Metric::Float(0.062));
        assert_eq!(Metric::Float(0.125).round(2), Metric::Float(0.12));
        assert_eq!(Metric::Float(0.375).round(2), Metric::Float(0.38));
        assert_eq!(Metric::Float(f64::MAX).round(5), Metric::Float(f64::MAX));
    }

    #[test]
    fn test_ordering_across_kinds() {
        assert!(Metric::Int(1) < Metric::Float(1.5));
        assert_eq!(Metric::Int(3).max(Metric::Float(2.0)), Metric::Int(3));
        assert_eq!(Metric::Int(3).min(Metric::Float(2.0)), Metric::Float(2.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Metric::Int(-4).to_string(), "-4");
        assert_eq!(Metric::Float(10.0).to_string(), "10.0");
        assert_eq!(Metric::Float(0.15).to_string(), "0.15");
    }

    #[test]
    fn test_display_switches_to_scientific() {
        assert_eq!(format_float(1e-5), "1e-05");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(-2.5e-6), "-2.5e-06");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1234567890123456.0), "1234567890123456.0");
        assert_eq!(format_float(1.2345678901234568e17), "1.2345678901234568e+17");
        assert_eq!(format_float(1e100), "1e+100");
        assert_eq!(format_float(0.0), "0.0");
    }
}
