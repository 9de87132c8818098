//! A minimal printf renderer.
//!
//! `vsnprintf` has no Rust equivalent that accepts a *runtime* format
//! string, so this is a hand-written formatter covering the conversions
//! [`crate::args::classify`] recognizes: flags, width, precision, and the
//! standard integer/float/string/pointer conversion characters.

use crate::args::Arg;

struct Spec {
    minus: bool,
    plus: bool,
    space: bool,
    alt: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conv: char,
}

fn parse(spec: &str) -> Spec {
    let bytes = spec.as_bytes();
    let mut i = 1; // skip leading '%'
    let (mut minus, mut plus, mut space, mut alt, mut zero) = (false, false, false, false, false);
    while i < bytes.len() {
        match bytes[i] {
            b'-' => minus = true,
            b'+' => plus = true,
            b' ' => space = true,
            b'#' => alt = true,
            b'0' => zero = true,
            _ => break,
        }
        i += 1;
    }

    let mut width = None;
    if i < bytes.len() && bytes[i] == b'*' {
        i += 1;
    } else {
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i > start {
            width = std::str::from_utf8(&bytes[start..i]).ok().and_then(|s| s.parse().ok());
        }
    }

    let mut precision = None;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        if i < bytes.len() && bytes[i] == b'*' {
            i += 1;
            precision = Some(0);
        } else {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            precision = Some(std::str::from_utf8(&bytes[start..i]).ok().and_then(|s| s.parse().ok()).unwrap_or(0));
        }
    }

    let conv = bytes.last().map(|&b| b as char).unwrap_or('%');
    Spec { minus, plus, space, alt, zero, width, precision, conv }
}

fn pad(body: String, sign_prefix_len: usize, spec: &Spec, numeric: bool) -> String {
    let Some(width) = spec.width else { return body };
    if body.len() >= width {
        return body;
    }
    let fill_len = width - body.len();
    if spec.minus {
        let mut s = body;
        s.push_str(&" ".repeat(fill_len));
        s
    } else if spec.zero && numeric && spec.precision.is_none() {
        let (sign, rest) = body.split_at(sign_prefix_len);
        format!("{sign}{}{rest}", "0".repeat(fill_len))
    } else {
        format!("{}{body}", " ".repeat(fill_len))
    }
}

fn as_i64(arg: &Arg) -> i64 {
    match arg {
        Arg::Int(v) => i64::from(*v),
        Arg::Long(v) | Arg::LLong(v) => *v,
        Arg::Size(v) => *v as i64,
        Arg::Double(v) => *v as i64,
        Arg::Ptr(v) => *v as i64,
        Arg::WInt(v) => i64::from(*v),
        Arg::CStr(_) | Arg::WStr(_) => 0,
    }
}

fn as_u64(arg: &Arg) -> u64 {
    match arg {
        Arg::Int(v) => *v as u32 as u64,
        Arg::Long(v) | Arg::LLong(v) => *v as u64,
        Arg::Size(v) => *v as u64,
        Arg::Double(v) => *v as u64,
        Arg::Ptr(v) => *v as u64,
        Arg::WInt(v) => u64::from(*v),
        Arg::CStr(_) | Arg::WStr(_) => 0,
    }
}

fn as_f64(arg: &Arg) -> f64 {
    match arg {
        Arg::Double(v) => *v,
        Arg::Int(v) => f64::from(*v),
        Arg::Long(v) | Arg::LLong(v) => *v as f64,
        Arg::Size(v) => *v as f64,
        Arg::Ptr(v) => *v as f64,
        Arg::WInt(v) => f64::from(*v),
        Arg::CStr(_) | Arg::WStr(_) => 0.0,
    }
}

fn sign_str(negative: bool, spec: &Spec) -> &'static str {
    if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    }
}

/// Renders `spec` (a full conversion specifier, e.g. `"%-08.3lld"`) against
/// one argument. Best-effort: a class mismatch between `arg` and the
/// specifier never panics, it just renders whatever the mismatched value
/// coerces to (spec.md §7's "variadic mismatch is undefined behavior by
/// contract" becomes "garbage-in, garbage-out" here, not UB).
#[must_use]
pub fn render(spec: &str, arg: Option<&Arg>) -> String {
    let s = parse(spec);
    match s.conv {
        '%' => "%".to_string(),
        'n' => String::new(),
        'd' | 'i' => {
            let Some(arg) = arg else { return String::new() };
            let v = as_i64(arg);
            let neg = v < 0;
            let mut digits = v.unsigned_abs().to_string();
            if let Some(p) = s.precision {
                while digits.len() < p {
                    digits.insert(0, '0');
                }
                if p == 0 && v == 0 {
                    digits.clear();
                }
            }
            let sign = sign_str(neg, &s);
            let body = format!("{sign}{digits}");
            pad(body, sign.len(), &s, true)
        }
        'u' => {
            let Some(arg) = arg else { return String::new() };
            let mut digits = as_u64(arg).to_string();
            if let Some(p) = s.precision {
                while digits.len() < p {
                    digits.insert(0, '0');
                }
            }
            pad(digits, 0, &s, true)
        }
        'o' => {
            let Some(arg) = arg else { return String::new() };
            let v = as_u64(arg);
            let mut digits = format!("{v:o}");
            if s.alt && !digits.starts_with('0') {
                digits.insert(0, '0');
            }
            pad(digits, 0, &s, true)
        }
        'x' | 'X' => {
            let Some(arg) = arg else { return String::new() };
            let v = as_u64(arg);
            let mut digits = if s.conv == 'x' { format!("{v:x}") } else { format!("{v:X}") };
            if let Some(p) = s.precision {
                while digits.len() < p {
                    digits.insert(0, '0');
                }
            }
            let prefix = if s.alt && v != 0 { if s.conv == 'x' { "0x" } else { "0X" } } else { "" };
            let body = format!("{prefix}{digits}");
            pad(body, prefix.len(), &s, true)
        }
        'c' => {
            let Some(arg) = arg else { return String::new() };
            let ch = match arg {
                Arg::WInt(v) => char::from_u32(*v).unwrap_or('\u{FFFD}'),
                other => (as_i64(other) as u8) as char,
            };
            pad(ch.to_string(), 0, &s, false)
        }
        's' => {
            let Some(arg) = arg else { return String::new() };
            let text = match arg {
                Arg::CStr(v) | Arg::WStr(v) => v.clone(),
                _ => String::new(),
            };
            let text = match s.precision {
                Some(p) if p < text.chars().count() => text.chars().take(p).collect(),
                _ => text,
            };
            pad(text, 0, &s, false)
        }
        'p' => {
            let Some(arg) = arg else { return String::new() };
            let v = as_u64(arg);
            pad(format!("0x{v:x}"), 0, &s, false)
        }
        'f' | 'F' => {
            let Some(arg) = arg else { return String::new() };
            let v = as_f64(arg);
            let prec = s.precision.unwrap_or(6);
            let neg = v.is_sign_negative();
            let body = format!("{:.*}", prec, v.abs());
            let sign = sign_str(neg, &s);
            let full = format!("{sign}{body}");
            pad(full, sign.len(), &s, true)
        }
        'e' | 'E' => {
            let Some(arg) = arg else { return String::new() };
            let v = as_f64(arg);
            let prec = s.precision.unwrap_or(6);
            let neg = v.is_sign_negative();
            let mut body = format!("{:.*e}", prec, v.abs());
            if let Some(epos) = body.find('e') {
                let (mantissa, exp) = body.split_at(epos);
                let exp_num: i32 = exp[1..].parse().unwrap_or(0);
                let e_char = if s.conv == 'E' { 'E' } else { 'e' };
                body = format!("{mantissa}{e_char}{}{:02}", if exp_num < 0 { "-" } else { "+" }, exp_num.abs());
            }
            let sign = sign_str(neg, &s);
            let full = format!("{sign}{body}");
            pad(full, sign.len(), &s, true)
        }
        'g' | 'G' | 'a' | 'A' => {
            // approximated: render with Display precision, not bit-exact with libc.
            let Some(arg) = arg else { return String::new() };
            let v = as_f64(arg);
            let body = match s.precision {
                Some(p) => format!("{v:.p$}"),
                None => format!("{v}"),
            };
            pad(body, 0, &s, true)
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal() {
        assert_eq!(render("%d", Some(&Arg::Int(42))), "42");
        assert_eq!(render("%d", Some(&Arg::Int(-7))), "-7");
        assert_eq!(render("%5d", Some(&Arg::Int(3))), "    3");
        assert_eq!(render("%-5d", Some(&Arg::Int(3))), "3    ");
        assert_eq!(render("%05d", Some(&Arg::Int(3))), "00003");
    }

    #[test]
    fn string_and_precision() {
        assert_eq!(render("%s", Some(&Arg::CStr("hello".into()))), "hello");
        assert_eq!(render("%.2s", Some(&Arg::CStr("hello".into()))), "he");
    }

    #[test]
    fn hex_and_alt() {
        assert_eq!(render("%x", Some(&Arg::Int(255))), "ff");
        assert_eq!(render("%#x", Some(&Arg::Int(255))), "0xff");
    }

    #[test]
    fn percent_and_none_consume_nothing_meaningful() {
        assert_eq!(render("%%", None), "%");
        assert_eq!(render("%n", None), "");
    }
}
