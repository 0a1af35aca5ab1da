//! Numeric values that remember whether they were written as integers.
//!
//! LTX values such as counts and box sizes may be either integral or
//! fractional. Arithmetic keeps integers integral until a float is involved.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;

use serde::Serialize;

/// An integer or a floating-point number.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub const ZERO: Number = Number::Int(0);
    pub const ONE: Number = Number::Int(1);

    /// Parse a literal, trying an integer first and then a float.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(i) = text.parse::<i64>() {
            return Some(Number::Int(i));
        }
        text.parse::<f64>().ok().map(Number::Float)
    }

    /// Parse a non-negative literal: all digits give an integer, otherwise a
    /// finite non-negative float.
    pub fn parse_non_negative(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            return text.parse::<i64>().ok().map(Number::Int);
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() && f >= 0.0 => Some(Number::Float(f)),
            _ => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_int(self) -> bool {
        matches!(self, Number::Int(_))
    }

    /// Convert to a float, keeping the value.
    pub fn to_float(self) -> Self {
        Number::Float(self.as_f64())
    }

    /// Ceiling division, used to turn loose rounds into whole boxes.
    pub fn div_ceil(self, divisor: Number) -> Number {
        match (self, divisor) {
            (Number::Int(a), Number::Int(b)) if b != 0 => {
                let q = a.div_euclid(b);
                Number::Int(if a.rem_euclid(b) != 0 { q + 1 } else { q })
            }
            (a, b) => Number::Float((a.as_f64() / b.as_f64()).ceil()),
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::ZERO
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Number::Int)
            .unwrap_or(Number::Float(value as f64))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 + b as f64)),
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl AddAssign for Number {
    fn add_assign(&mut self, rhs: Number) {
        *self = *self + rhs;
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 * b as f64)),
            (a, b) => Number::Float(a.as_f64() * b.as_f64()),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.partial_cmp(b),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl FromStr for Number {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Number::parse(s).ok_or(())
    }
}

/// Floats always carry a fractional part (`5.0`), so `5` and `5.0` stay distinct.
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{v:.1}")
            }
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefers_int() {
        assert!(matches!(Number::parse("42"), Some(Number::Int(42))));
        assert!(matches!(Number::parse("-3"), Some(Number::Int(-3))));
        assert!(matches!(Number::parse("4.0"), Some(Number::Float(f)) if f == 4.0));
        assert!(Number::parse("four").is_none());
    }

    #[test]
    fn test_parse_non_negative() {
        assert!(matches!(Number::parse_non_negative("7"), Some(Number::Int(7))));
        assert!(matches!(Number::parse_non_negative("0.5"), Some(Number::Float(f)) if f == 0.5));
        assert!(Number::parse_non_negative("-1").is_none());
        assert!(Number::parse_non_negative("inf").is_none());
        assert!(Number::parse_non_negative("").is_none());
    }

    #[test]
    fn test_promotion() {
        assert!((Number::Int(1) + Number::Int(2)).is_int());
        let mixed = Number::Int(1) + Number::Float(1.0);
        assert!(!mixed.is_int());
        assert_eq!(mixed, Number::Float(2.0));
        assert!((Number::Int(3) * Number::Int(4)).is_int());
        assert_eq!(Number::Int(3) * Number::Float(0.5), Number::Float(1.5));
    }

    #[test]
    fn test_display_keeps_float_marker() {
        assert_eq!(Number::Int(5).to_string(), "5");
        assert_eq!(Number::Float(5.0).to_string(), "5.0");
        assert_eq!(Number::Float(0.25).to_string(), "0.25");
    }

    #[test]
    fn test_div_ceil() {
        assert_eq!(Number::Int(30).div_ceil(Number::Int(30)), Number::Int(1));
        assert_eq!(Number::Int(31).div_ceil(Number::Int(30)), Number::Int(2));
        assert_eq!(Number::Float(4.5).div_ceil(Number::Int(2)), Number::Float(3.0));
    }
}
