//! Field values and numeric coercion.

use std::fmt;

/// A single field of a record.
///
/// Fields start out as strings. When autoparse is enabled (or coercion is
/// forced) each field becomes an integer if it parses as one, else a float
/// if it parses as one, else it stays a string.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl FieldValue {
    /// Try integer, then float; leave anything else as the original string.
    pub fn coerce(self) -> Self {
        match self {
            FieldValue::Str(s) => {
                if let Ok(i) = s.parse::<i64>() {
                    FieldValue::Int(i)
                } else if let Ok(f) = s.parse::<f64>() {
                    FieldValue::Float(f)
                } else {
                    FieldValue::Str(s)
                }
            }
            other => other,
        }
    }

    pub fn is_str(&self) -> bool {
        matches!(self, FieldValue::Str(_))
    }

    /// Integer view. Floats with no fractional part convert; strings parse.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            FieldValue::Float(_) => None,
            FieldValue::Str(s) => s.trim().parse().ok(),
        }
    }

    /// Floating-point view. Strings parse.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Str(s) => s.trim().parse().ok(),
        }
    }

    /// Borrow the string, if this field was never coerced.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Str(String::new())
    }
}

/// Floats always show a decimal point, so a coerced `3.0` or `1e5` is
/// written back as `3.0` or `100000.0` rather than as an integer.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(x) => {
                let text = x.to_string();
                if x.is_finite() && !text.contains('.') {
                    write!(f, "{text}.0")
                } else {
                    f.write_str(&text)
                }
            }
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<usize> for FieldValue {
    fn from(i: usize) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl PartialEq<&str> for FieldValue {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, FieldValue::Str(s) if s == other)
    }
}

impl PartialEq<i64> for FieldValue {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, FieldValue::Int(i) if i == other)
    }
}

impl PartialEq<f64> for FieldValue {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, FieldValue::Float(f) if f == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_integer() {
        assert_eq!(FieldValue::from("42").coerce(), 42i64);
    }

    #[test]
    fn test_coerce_float() {
        assert_eq!(FieldValue::from("3.5").coerce(), 3.5f64);
    }

    #[test]
    fn test_coerce_leaves_text() {
        assert_eq!(FieldValue::from("abc").coerce(), "abc");
        assert_eq!(FieldValue::from("").coerce(), "");
    }

    #[test]
    fn test_coerce_is_idempotent_on_numbers() {
        assert_eq!(FieldValue::Int(7).coerce(), 7i64);
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(FieldValue::from(" 12 ").as_i64(), Some(12));
        assert_eq!(FieldValue::Float(2.0).as_i64(), Some(2));
        assert_eq!(FieldValue::Float(2.5).as_i64(), None);
        assert_eq!(FieldValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(FieldValue::from("x").as_f64(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Int(-4).to_string(), "-4");
        assert_eq!(FieldValue::Float(3.5).to_string(), "3.5");
        assert_eq!(FieldValue::from("hi").to_string(), "hi");
    }

    #[test]
    fn test_float_display_keeps_decimal_point() {
        assert_eq!(FieldValue::Float(3.0).to_string(), "3.0");
        assert_eq!(FieldValue::from("1e5").coerce().to_string(), "100000.0");
        assert_eq!(FieldValue::Float(-0.25).to_string(), "-0.25");
        assert_eq!(FieldValue::Float(f64::INFINITY).to_string(), "inf");
    }
}
