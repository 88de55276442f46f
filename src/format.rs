//! printf-style formatting.
//!
//! Supported conversions: `%d %i %s %c %f %F %e %E %g %G %x %X %o %%`, with
//! the flags `-`, `+`, space, `0` and `#`, a field width and a precision.

use crate::error::{AwkError, Result};
use crate::value::FieldValue;

#[derive(Debug, Default)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alt: bool,
    width: usize,
    precision: Option<usize>,
}

/// Format `args` according to `format`.
///
/// Every conversion consumes one argument; missing or leftover arguments
/// are an error.
pub fn sprintf(format: &str, args: &[FieldValue]) -> Result<String> {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }

        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '0' => spec.zero = true,
                '#' => spec.alt = true,
                _ => break,
            }
            chars.next();
        }
        spec.width = read_number(&mut chars).unwrap_or(0);
        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(read_number(&mut chars).unwrap_or(0));
        }

        let conversion = chars
            .next()
            .ok_or_else(|| AwkError::Format("incomplete format specifier".to_string()))?;
        let arg = args
            .next()
            .ok_or_else(|| AwkError::Format("not enough arguments for format".to_string()))?;
        out.push_str(&convert(conversion, arg, &spec)?);
    }

    if args.next().is_some() {
        return Err(AwkError::Format(
            "not all arguments converted during formatting".to_string(),
        ));
    }
    Ok(out)
}

fn read_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits.parse().ok()
}

fn convert(conversion: char, arg: &FieldValue, spec: &Spec) -> Result<String> {
    match conversion {
        'd' | 'i' => {
            let n = integer(arg, conversion)?;
            Ok(pad_number(n < 0, n.unsigned_abs().to_string(), spec))
        }
        'x' | 'X' | 'o' => {
            let n = integer(arg, conversion)?;
            let magnitude = n.unsigned_abs();
            let mut body = match conversion {
                'x' => format!("{magnitude:x}"),
                'X' => format!("{magnitude:X}"),
                _ => format!("{magnitude:o}"),
            };
            if spec.alt {
                let prefix = match conversion {
                    'x' => "0x",
                    'X' => "0X",
                    _ => "0o",
                };
                body.insert_str(0, prefix);
            }
            Ok(pad_number(n < 0, body, spec))
        }
        'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
            let x = float(arg, conversion)?;
            if !x.is_finite() {
                let body = if x.is_nan() { "nan" } else { "inf" };
                let body = if conversion.is_ascii_uppercase() {
                    body.to_uppercase()
                } else {
                    body.to_string()
                };
                return Ok(pad(sign(x < 0.0, spec), body, spec, false));
            }
            let precision = spec.precision.unwrap_or(6);
            let body = match conversion {
                'f' | 'F' => format!("{:.*}", precision, x.abs()),
                'e' | 'E' => exponent(x.abs(), precision, conversion == 'E'),
                _ => general(x.abs(), precision, spec.alt, conversion == 'G'),
            };
            Ok(pad_number(x.is_sign_negative() && x != 0.0, body, spec))
        }
        's' => {
            let text = arg.to_string();
            let text = match spec.precision {
                Some(p) => text.chars().take(p).collect(),
                None => text,
            };
            Ok(pad(String::new(), text, spec, false))
        }
        'c' => {
            let ch = match arg {
                FieldValue::Int(i) => u32::try_from(*i).ok().and_then(char::from_u32),
                FieldValue::Str(s) if s.chars().count() == 1 => s.chars().next(),
                _ => None,
            }
            .ok_or_else(|| AwkError::Format(format!("%c requires a single character, got '{arg}'")))?;
            Ok(pad(String::new(), ch.to_string(), spec, false))
        }
        other => Err(AwkError::Format(format!(
            "unsupported format character '{other}'"
        ))),
    }
}

fn integer(arg: &FieldValue, conversion: char) -> Result<i64> {
    let n = match arg {
        FieldValue::Int(i) => Some(*i),
        other => other.as_f64().map(|f| f.trunc() as i64),
    };
    n.ok_or_else(|| AwkError::Format(format!("%{conversion} requires a number, got '{arg}'")))
}

fn float(arg: &FieldValue, conversion: char) -> Result<f64> {
    arg.as_f64()
        .ok_or_else(|| AwkError::Format(format!("%{conversion} requires a number, got '{arg}'")))
}

/// `d.ddde+XX` form with at least two exponent digits.
fn exponent(x: f64, precision: usize, upper: bool) -> String {
    let raw = format!("{:.*e}", precision, x);
    let (mantissa, exp) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let e = if upper { 'E' } else { 'e' };
    let exp_sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{e}{exp_sign}{:02}", exp.abs())
}

/// `%g`: shortest of `%e`/`%f` at the given number of significant digits.
fn general(x: f64, precision: usize, alt: bool, upper: bool) -> String {
    let precision = precision.max(1);
    let probe = format!("{:.*e}", precision - 1, x);
    let exp: i32 = probe
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);

    let body = if exp < -4 || exp >= precision as i32 {
        exponent(x, precision - 1, upper)
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        format!("{:.*}", decimals, x)
    };
    if alt {
        return body;
    }

    match body.find(['e', 'E']) {
        Some(pos) => {
            let (mantissa, exp) = body.split_at(pos);
            format!("{}{}", strip_zeros(mantissa), exp)
        }
        None => strip_zeros(&body).to_string(),
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn sign(negative: bool, spec: &Spec) -> String {
    if negative {
        "-".to_string()
    } else if spec.plus {
        "+".to_string()
    } else if spec.space {
        " ".to_string()
    } else {
        String::new()
    }
}

fn pad_number(negative: bool, body: String, spec: &Spec) -> String {
    pad(sign(negative, spec), body, spec, true)
}

fn pad(sign: String, body: String, spec: &Spec, numeric: bool) -> String {
    let len = sign.chars().count() + body.chars().count();
    if len >= spec.width {
        return sign + &body;
    }
    let fill = spec.width - len;
    if spec.left {
        format!("{sign}{body}{}", " ".repeat(fill))
    } else if spec.zero && numeric {
        format!("{sign}{}{body}", "0".repeat(fill))
    } else {
        format!("{}{sign}{body}", " ".repeat(fill))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(format: &str, args: &[FieldValue]) -> String {
        sprintf(format, args).unwrap()
    }

    #[test]
    fn test_plain_text_and_percent() {
        assert_eq!(fmt("100%%", &[]), "100%");
    }

    #[test]
    fn test_integers() {
        assert_eq!(fmt("%d", &[42.into()]), "42");
        assert_eq!(fmt("%5d|", &[42.into()]), "   42|");
        assert_eq!(fmt("%-5d|", &[42.into()]), "42   |");
        assert_eq!(fmt("%05d", &[(-42).into()]), "-0042");
        assert_eq!(fmt("%+d", &[7.into()]), "+7");
        assert_eq!(fmt("%d", &[3.9.into()]), "3");
        assert_eq!(fmt("%i", &["12".into()]), "12");
    }

    #[test]
    fn test_hex_and_octal() {
        assert_eq!(fmt("%x %X %o", &[255.into(), 255.into(), 8.into()]), "ff FF 10");
        assert_eq!(fmt("%#x", &[255.into()]), "0xff");
    }

    #[test]
    fn test_floats() {
        assert_eq!(fmt("%f", &[3.5.into()]), "3.500000");
        assert_eq!(fmt("%.2f", &[(2.0 / 3.0).into()]), "0.67");
        assert_eq!(fmt("%8.3f|", &[(-1.5).into()]), "  -1.500|");
        assert_eq!(fmt("%e", &[1234.5.into()]), "1.234500e+03");
        assert_eq!(fmt("%.1E", &[0.00012.into()]), "1.2E-04");
    }

    #[test]
    fn test_general() {
        assert_eq!(fmt("%g", &[100000.0.into()]), "100000");
        assert_eq!(fmt("%g", &[1000000.0.into()]), "1e+06");
        assert_eq!(fmt("%g", &[0.0001.into()]), "0.0001");
        assert_eq!(fmt("%g", &[0.00001.into()]), "1e-05");
        assert_eq!(fmt("%g", &[3.5.into()]), "3.5");
        assert_eq!(fmt("%.3g", &[3.14159.into()]), "3.14");
    }

    #[test]
    fn test_strings_and_chars() {
        assert_eq!(fmt("%s-%s", &["a".into(), 1.into()]), "a-1");
        assert_eq!(fmt("%-4s|%4s", &["ab".into(), "cd".into()]), "ab  |  cd");
        assert_eq!(fmt("%.2s", &["abcdef".into()]), "ab");
        assert_eq!(fmt("%c%c", &[65.into(), "z".into()]), "Az");
    }

    #[test]
    fn test_argument_count_errors() {
        assert!(matches!(sprintf("%d %d", &[1.into()]), Err(AwkError::Format(_))));
        assert!(matches!(sprintf("%d", &[1.into(), 2.into()]), Err(AwkError::Format(_))));
        assert!(matches!(sprintf("%d", &["abc".into()]), Err(AwkError::Format(_))));
        assert!(matches!(sprintf("%q", &[1.into()]), Err(AwkError::Format(_))));
    }
}
