use num_enum::TryFromPrimitive;

/// Static classification of a printf conversion specifier, packed into the
/// high 4 bits of an `EMIT_FMT` operand (see [`crate::program`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ArgClass {
    None = 0,
    Int = 1,
    Long = 2,
    LLong = 3,
    Size = 4,
    Double = 5,
    CStr = 6,
    Ptr = 7,
    WInt = 8,
    WStr = 9,
}

/// One variadic argument.
///
/// Rust has no C-style variadics; per spec.md §9's design note, callers
/// instead pass an ordered slice of tagged values, one per `EMIT_FMT` in
/// the compiled program, matching the class the compiler statically
/// derived from the conversion specifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i32),
    Long(i64),
    LLong(i64),
    Size(usize),
    Double(f64),
    CStr(String),
    Ptr(usize),
    WInt(u32),
    WStr(String),
}

impl Arg {
    #[must_use]
    pub fn class(&self) -> ArgClass {
        match self {
            Arg::Int(_) => ArgClass::Int,
            Arg::Long(_) => ArgClass::Long,
            Arg::LLong(_) => ArgClass::LLong,
            Arg::Size(_) => ArgClass::Size,
            Arg::Double(_) => ArgClass::Double,
            Arg::CStr(_) => ArgClass::CStr,
            Arg::Ptr(_) => ArgClass::Ptr,
            Arg::WInt(_) => ArgClass::WInt,
            Arg::WStr(_) => ArgClass::WStr,
        }
    }
}

/// Classifies a full printf conversion specifier (e.g. `%-08.3lld`) by its
/// conversion character and length modifier.
///
/// `%ls` classifies as `WSTR`: the length modifier is inspected before the
/// conversion character short-circuits on `s`, so a wide-string length
/// modifier always wins over a bare `%s`.
#[must_use]
pub fn classify(spec: &str) -> ArgClass {
    let bytes = spec.as_bytes();
    let Some(&conv) = bytes.last() else { return ArgClass::None };
    let conv = conv as char;

    if conv == '%' || conv == 'n' {
        return ArgClass::None;
    }

    let mut p = 1usize; // skip leading '%'
    while p < bytes.len() && matches!(bytes[p], b'-' | b'+' | b' ' | b'#' | b'0') {
        p += 1;
    }
    if p < bytes.len() && bytes[p] == b'*' {
        p += 1;
    } else {
        while p < bytes.len() && bytes[p].is_ascii_digit() {
            p += 1;
        }
    }
    if p < bytes.len() && bytes[p] == b'.' {
        p += 1;
        if p < bytes.len() && bytes[p] == b'*' {
            p += 1;
        } else {
            while p < bytes.len() && bytes[p].is_ascii_digit() {
                p += 1;
            }
        }
    }
    let mods = &bytes[p..bytes.len() - 1];
    let has = |m: &[u8]| mods.windows(m.len()).any(|w| w == m);
    let has_l = has(b"l");
    let has_ll = has(b"ll");
    let has_z = has(b"z");
    let has_j = has(b"j");

    match conv {
        's' if has_l => ArgClass::WStr,
        's' => ArgClass::CStr,
        'c' if has_l => ArgClass::WInt,
        'p' => ArgClass::Ptr,
        'f' | 'F' | 'e' | 'E' | 'g' | 'G' | 'a' | 'A' => ArgClass::Double,
        _ if has_ll || has_j => ArgClass::LLong,
        _ if has_l => ArgClass::Long,
        _ if has_z => ArgClass::Size,
        _ => ArgClass::Int,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_conversions() {
        assert_eq!(classify("%d"), ArgClass::Int);
        assert_eq!(classify("%s"), ArgClass::CStr);
        assert_eq!(classify("%ls"), ArgClass::WStr);
        assert_eq!(classify("%lc"), ArgClass::WInt);
        assert_eq!(classify("%p"), ArgClass::Ptr);
        assert_eq!(classify("%f"), ArgClass::Double);
        assert_eq!(classify("%%"), ArgClass::None);
        assert_eq!(classify("%n"), ArgClass::None);
    }

    #[test]
    fn length_modifiers() {
        assert_eq!(classify("%ld"), ArgClass::Long);
        assert_eq!(classify("%lld"), ArgClass::LLong);
        assert_eq!(classify("%jd"), ArgClass::LLong);
        assert_eq!(classify("%zd"), ArgClass::Size);
    }

    #[test]
    fn flags_width_precision_are_skipped() {
        assert_eq!(classify("%-08.3lld"), ArgClass::LLong);
        assert_eq!(classify("%+ #.*d"), ArgClass::Int);
    }
}
