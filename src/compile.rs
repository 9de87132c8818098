//! The single-pass scanner/compiler.
//!
//! Walks a format string once, emitting instructions as it recognizes tag,
//! brace, and conversion-specifier syntax. The scanner never fails:
//! anything it cannot parse as a tag, brace directive, or conversion
//! specifier is emitted as a literal delimiter and scanning resumes one
//! byte past it.

use log::trace;

use crate::args;
use crate::globals;
use crate::program::{Opcode, Program, pack_fmt_operand};
use crate::style::StyleFlags;
use crate::vars::VarTable;

/// Bound on `{name}`/`{~name}`/`{^name}` re-entrant expansion when a
/// variable's value itself contains `<` markup. Without this, a
/// self-referential variable value would recurse until the stack
/// overflows.
const MAX_RECURSION_DEPTH: u32 = 4;

struct ColorEntry {
    name: &'static str,
    code: u8,
}

const FG_COLORS: &[ColorEntry] = &[
    ColorEntry { name: "black", code: 30 },
    ColorEntry { name: "red", code: 31 },
    ColorEntry { name: "green", code: 32 },
    ColorEntry { name: "yellow", code: 33 },
    ColorEntry { name: "blue", code: 34 },
    ColorEntry { name: "magenta", code: 35 },
    ColorEntry { name: "cyan", code: 36 },
    ColorEntry { name: "white", code: 37 },
    ColorEntry { name: "gray", code: 90 },
    ColorEntry { name: "grey", code: 90 },
    ColorEntry { name: "bright_red", code: 91 },
    ColorEntry { name: "bright_green", code: 92 },
    ColorEntry { name: "bright_yellow", code: 93 },
    ColorEntry { name: "bright_blue", code: 94 },
    ColorEntry { name: "bright_magenta", code: 95 },
    ColorEntry { name: "bright_cyan", code: 96 },
    ColorEntry { name: "bright_white", code: 97 },
];

const BG_COLORS: &[ColorEntry] = &[
    ColorEntry { name: "bg_black", code: 30 },
    ColorEntry { name: "bg_red", code: 31 },
    ColorEntry { name: "bg_green", code: 32 },
    ColorEntry { name: "bg_yellow", code: 33 },
    ColorEntry { name: "bg_blue", code: 34 },
    ColorEntry { name: "bg_magenta", code: 35 },
    ColorEntry { name: "bg_cyan", code: 36 },
    ColorEntry { name: "bg_white", code: 37 },
];

const SEG_BG_COLORS: &[ColorEntry] = &[
    ColorEntry { name: "black", code: 30 },
    ColorEntry { name: "red", code: 31 },
    ColorEntry { name: "green", code: 32 },
    ColorEntry { name: "yellow", code: 33 },
    ColorEntry { name: "blue", code: 34 },
    ColorEntry { name: "magenta", code: 35 },
    ColorEntry { name: "cyan", code: 36 },
    ColorEntry { name: "white", code: 37 },
];

struct AttrEntry {
    name: &'static str,
    flag: StyleFlags,
}

const ATTRS: &[AttrEntry] = &[
    AttrEntry { name: "bold", flag: StyleFlags::BOLD },
    AttrEntry { name: "dim", flag: StyleFlags::DIM },
    AttrEntry { name: "ul", flag: StyleFlags::UNDERLINE },
    AttrEntry { name: "i", flag: StyleFlags::ITALIC },
    AttrEntry { name: "italic", flag: StyleFlags::ITALIC },
    AttrEntry { name: "strike", flag: StyleFlags::STRIKE },
    AttrEntry { name: "invert", flag: StyleFlags::INVERT },
];

fn attr_opcode(flag: StyleFlags) -> Opcode {
    match flag {
        StyleFlags::BOLD => Opcode::SetBold,
        StyleFlags::DIM => Opcode::SetDim,
        StyleFlags::UNDERLINE => Opcode::SetUl,
        StyleFlags::ITALIC => Opcode::SetItalic,
        StyleFlags::STRIKE => Opcode::SetStrike,
        _ => Opcode::SetInvert,
    }
}

/// Loosely mirrors C's `atoi`: an optional leading `-`, then as many
/// decimal digits as are present; no digits at all yields `0`.
fn atoi(bytes: &[u8]) -> i64 {
    let mut i = 0;
    let neg = bytes.first() == Some(&b'-');
    if neg || bytes.first() == Some(&b'+') {
        i += 1;
    }
    let start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mag: i64 = bytes[start..i].iter().fold(0, |a, &d| a * 10 + i64::from(d - b'0'));
    if neg { -mag } else { mag }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Parses `#RGB` or `#RRGGBB` (leading `#` included in `hex`).
fn parse_hex_rgb(hex: &[u8]) -> Option<(u8, u8, u8)> {
    match hex.len() {
        4 => {
            let r = hex_digit(hex[1])?;
            let g = hex_digit(hex[2])?;
            let b = hex_digit(hex[3])?;
            Some((r * 17, g * 17, b * 17))
        }
        7 => {
            let r = (hex_digit(hex[1])? << 4) | hex_digit(hex[2])?;
            let g = (hex_digit(hex[3])? << 4) | hex_digit(hex[4])?;
            let b = (hex_digit(hex[5])? << 4) | hex_digit(hex[6])?;
            Some((r, g, b))
        }
        _ => None,
    }
}

fn rgb_operand(r: u8, g: u8, b: u8) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

struct Compiler {
    program: Program,
    vars: VarTable,
}

impl Compiler {
    fn flush_lit(&mut self, fmt: &[u8], lit: usize, ptr: usize) {
        if ptr <= lit {
            return;
        }
        if let Ok(off) = self.program.literals.add(&fmt[lit..ptr]) {
            self.program.emit(Opcode::EmitLit, off);
        }
    }

    fn emit_lit_bytes(&mut self, bytes: &[u8]) {
        if let Ok(off) = self.program.literals.add(bytes) {
            self.program.emit(Opcode::EmitLit, off);
        }
    }

    fn compile_hex_fg(&mut self, tag: &[u8]) -> bool {
        let Some((r, g, b)) = parse_hex_rgb(tag) else { return false };
        self.program.emit(Opcode::SetFgRgb, rgb_operand(r, g, b));
        true
    }

    fn compile_hex_bg(&mut self, hex: &[u8]) -> bool {
        let Some((r, g, b)) = parse_hex_rgb(hex) else { return false };
        self.program.emit(Opcode::SetBgRgb, rgb_operand(r, g, b));
        true
    }

    fn match_attr(&mut self, seg: &[u8]) -> bool {
        for a in ATTRS {
            if seg == a.name.as_bytes() {
                self.program.emit(attr_opcode(a.flag), 1);
                return true;
            }
        }
        false
    }

    fn match_attr_off(&mut self, seg: &[u8]) -> bool {
        for a in ATTRS {
            if seg == a.name.as_bytes() {
                self.program.emit(attr_opcode(a.flag), 0);
                return true;
            }
        }
        false
    }

    fn match_fg(&mut self, seg: &[u8]) -> bool {
        for c in FG_COLORS {
            if seg == c.name.as_bytes() {
                self.program.emit(Opcode::SetFg, u32::from(c.code));
                return true;
            }
        }
        false
    }

    fn match_fg_off(&mut self, seg: &[u8]) -> bool {
        if FG_COLORS.iter().any(|c| seg == c.name.as_bytes()) {
            self.program.emit(Opcode::SetFg, 0);
            return true;
        }
        if seg.first() == Some(&b'#') {
            self.program.emit(Opcode::SetFg, 0);
            return true;
        }
        false
    }

    fn match_bg(&mut self, seg: &[u8]) -> bool {
        for c in BG_COLORS {
            if seg == c.name.as_bytes() {
                self.program.emit(Opcode::SetBg, u32::from(c.code));
                return true;
            }
        }
        false
    }

    fn match_bg_off(&mut self, seg: &[u8]) -> bool {
        if BG_COLORS.iter().any(|c| seg == c.name.as_bytes()) {
            self.program.emit(Opcode::SetBg, 0);
            return true;
        }
        if seg.starts_with(b"bg_#") {
            self.program.emit(Opcode::SetBg, 0);
            return true;
        }
        false
    }

    fn match_seg_bg(&mut self, seg: &[u8]) -> bool {
        for c in SEG_BG_COLORS {
            if seg == c.name.as_bytes() {
                self.program.emit(Opcode::SetBg, u32::from(c.code));
                return true;
            }
        }
        false
    }

    fn match_plus_seg(&mut self, seg: &[u8]) -> bool {
        if self.match_attr(seg) {
            return true;
        }
        if self.match_fg(seg) {
            return true;
        }
        if self.match_bg(seg) {
            return true;
        }
        if seg.first() == Some(&b'#') {
            return self.compile_hex_fg(seg);
        }
        if let Some(rest) = seg.strip_prefix(b"bg_#") {
            let mut hex = Vec::with_capacity(rest.len() + 1);
            hex.push(b'#');
            hex.extend_from_slice(rest);
            return self.compile_hex_bg(&hex);
        }
        if let Some(rest) = seg.strip_prefix(b"bg_") {
            return self.match_seg_bg(rest);
        }
        false
    }

    /// `a+b+c`-style style combination. Returns the number of segments that
    /// matched; `0` means the whole tag should be treated as unrecognized.
    fn compile_plus_segs(&mut self, s: &[u8]) -> usize {
        let mut seg_start = 0;
        let mut emitted = 0;
        while seg_start < s.len() {
            let next = s[seg_start..].iter().position(|&b| b == b'+').map_or(s.len(), |p| seg_start + p);
            if !self.match_plus_seg(&s[seg_start..next]) {
                return 0;
            }
            emitted += 1;
            seg_start = if next < s.len() { next + 1 } else { s.len() };
        }
        emitted
    }

    /// `name1_name2_..`-style combination (underscore list), e.g.
    /// `bold_red` or `dim_bg_blue`.
    fn compile_underscore_segs(&mut self, tag: &[u8]) -> usize {
        let mut seg = 0;
        let mut emitted = 0;
        while seg < tag.len() {
            let sep = tag[seg..].iter().position(|&b| b == b'_').map_or(tag.len(), |p| seg + p);
            let piece = &tag[seg..sep];
            if self.match_attr(piece) {
                // matched
            } else if piece == b"bg" && sep < tag.len() {
                seg = sep + 1;
                let sep2 = tag[seg..].iter().position(|&b| b == b'_').map_or(tag.len(), |p| seg + p);
                if !self.match_seg_bg(&tag[seg..sep2]) {
                    return 0;
                }
                seg = if sep2 < tag.len() { sep2 + 1 } else { tag.len() };
                emitted += 1;
                continue;
            } else if !self.match_fg(piece) {
                return 0;
            }
            emitted += 1;
            seg = if sep < tag.len() { sep + 1 } else { tag.len() };
        }
        emitted
    }

    /// Parses `name=value[, name=value...]`, accepting single- or
    /// double-quoted values. Appends (never updates) into `self.vars` — see
    /// [`VarTable::push`].
    fn compile_let(&mut self, body: &[u8]) -> bool {
        let body = if body.last() == Some(&b'/') { &body[..body.len() - 1] } else { body };
        let mut p = 0;
        while p < body.len() {
            while p < body.len() && matches!(body[p], b' ' | b',') {
                p += 1;
            }
            if p >= body.len() {
                break;
            }
            let Some(eq_rel) = body[p..].iter().position(|&b| b == b'=') else { return false };
            let eq = p + eq_rel;
            let name = &body[p..eq];
            let vstart = eq + 1;

            if vstart < body.len() && matches!(body[vstart], b'\'' | b'"') {
                let quote = body[vstart];
                let s = vstart + 1;
                let Some(rel) = body[s..].iter().position(|&b| b == quote) else { return false };
                let e = s + rel;
                let mut after = e + 1;
                while after < body.len() && matches!(body[after], b' ' | b',') {
                    after += 1;
                }
                if !self.vars.push(name, &body[s..e]) {
                    return false;
                }
                p = after;
                continue;
            }

            let vend = body[vstart..].iter().position(|&b| b == b',').map_or(body.len(), |rel| vstart + rel);
            if vstart >= vend || !self.vars.push(name, &body[vstart..vend]) {
                return false;
            }
            p = vend;
        }
        true
    }

    /// `$name[+extra+segs]` — applies a variable's value as a style
    /// (its value is interpreted as a plus-list, not emitted literally).
    fn compile_var_ref(&mut self, tag: &[u8]) -> bool {
        let name_all = &tag[1..];
        let plus = name_all.iter().position(|&b| b == b'+');
        let var_name = &name_all[..plus.unwrap_or(name_all.len())];

        let Some(value) = self.vars.iter().find(|v| v.name.as_bytes() == var_name).map(|v| v.value.clone()) else {
            return false;
        };

        self.program.emit(Opcode::StylePush, 0);
        if self.compile_plus_segs(value.as_bytes()) == 0 {
            return false;
        }
        if let Some(p) = plus {
            let rest = &name_all[p + 1..];
            if !rest.is_empty() && self.compile_plus_segs(rest) == 0 {
                return false;
            }
        }
        self.program.emit(Opcode::StyleFlush, 0);
        true
    }

    fn compile_tag(&mut self, tag: &[u8], closing: bool) -> bool {
        if closing {
            if tag == b"pad" || tag == b"rpad" {
                self.program.emit(Opcode::PadEnd, 0);
                return true;
            }
            if self.match_attr_off(tag) || self.match_fg_off(tag) || self.match_bg_off(tag) {
                self.program.emit(Opcode::StyleFlush, 0);
                return true;
            }
            self.program.emit(Opcode::StyleReset, 0);
            return true;
        }

        if let Some(rest) = tag.strip_prefix(b"let ") {
            return self.compile_let(rest);
        }
        if tag.first() == Some(&b'$') && tag.len() > 1 {
            return self.compile_var_ref(tag);
        }
        if let Some(n) = tag.strip_prefix(b"pad=") {
            self.program.emit(Opcode::PadBegin, atoi(n).max(0) as u32);
            return true;
        }
        if let Some(n) = tag.strip_prefix(b"rpad=") {
            self.program.emit(Opcode::RpadBegin, atoi(n).max(0) as u32);
            return true;
        }
        if tag.ends_with(b"/") {
            if let Some(n) = tag.strip_prefix(b"space=") {
                self.program.emit(Opcode::EmitSpaces, atoi(&n[..n.len() - 1]).max(0) as u32);
                return true;
            }
            if let Some(n) = tag.strip_prefix(b"gap=") {
                self.program.emit(Opcode::EmitSpaces, atoi(&n[..n.len() - 1]).max(0) as u32);
                return true;
            }
            if let Some(n) = tag.strip_prefix(b"br=") {
                self.program.emit(Opcode::EmitNewlines, atoi(&n[..n.len() - 1]).max(0) as u32);
                return true;
            }
        }
        if tag == b"reset/" {
            self.program.emit(Opcode::StyleResetAll, 0);
            return true;
        }
        if tag == b"br/" {
            self.program.emit(Opcode::EmitNewlines, 1);
            return true;
        }

        self.program.emit(Opcode::StylePush, 0);

        if self.match_attr(tag) || self.match_fg(tag) || self.match_bg(tag) {
            self.program.emit(Opcode::StyleFlush, 0);
            return true;
        }
        if tag.first() == Some(&b'#') {
            if !self.compile_hex_fg(tag) {
                return false;
            }
            self.program.emit(Opcode::StyleFlush, 0);
            return true;
        }
        if let Some(rest) = tag.strip_prefix(b"bg_#") {
            let mut hex = Vec::with_capacity(rest.len() + 1);
            hex.push(b'#');
            hex.extend_from_slice(rest);
            if !self.compile_hex_bg(&hex) {
                return false;
            }
            self.program.emit(Opcode::StyleFlush, 0);
            return true;
        }
        if tag.contains(&b'+') && self.compile_plus_segs(tag) > 0 {
            self.program.emit(Opcode::StyleFlush, 0);
            return true;
        }
        if self.compile_underscore_segs(tag) > 0 {
            self.program.emit(Opcode::StyleFlush, 0);
            return true;
        }
        false
    }

    fn scan_tag(&mut self, fmt: &[u8], ptr: usize, lit: usize) -> usize {
        self.flush_lit(fmt, lit, ptr);

        let mut start = ptr + 1;
        let closing = fmt.get(start) == Some(&b'/');
        if closing {
            start += 1;
        }

        if closing && fmt.get(start) == Some(&b'>') {
            self.program.emit(Opcode::StyleReset, 0);
            return start + 1;
        }

        let end = fmt[start..].iter().position(|&b| b == b'>').map(|p| start + p);
        if let Some(end) = end {
            if self.compile_tag(&fmt[start..end], closing) {
                return end + 1;
            }
        }

        self.emit_lit_bytes(b"<");
        ptr + 1
    }

    fn scan_let_brace(&mut self, fmt: &[u8], ptr: usize, lit: usize) -> usize {
        self.flush_lit(fmt, lit, ptr);
        let body = ptr + 5;
        let end = fmt[body..].iter().position(|&b| b == b'}').map(|p| body + p);
        if let Some(end) = end {
            if self.compile_let(&fmt[body..end]) {
                return end + 1;
            }
        }
        self.emit_lit_bytes(b"{");
        ptr + 1
    }

    fn scan_var_brace(&mut self, fmt: &[u8], ptr: usize, lit: usize, depth: u32) -> usize {
        self.flush_lit(fmt, lit, ptr);

        let mut name_start = ptr + 1;
        let Some(rel) = fmt[name_start..].iter().position(|&b| b == b'}') else {
            self.emit_lit_bytes(b"{");
            return ptr + 1;
        };
        let end = name_start + rel;

        let lower = fmt.get(name_start) == Some(&b'~');
        let upper = fmt.get(name_start) == Some(&b'^');
        if lower || upper {
            name_start += 1;
        }
        let name = &fmt[name_start..end];

        if let Some(&quote) = name.first().filter(|&&b| b == b'\'' || b == b'"') {
            let s = 1;
            if let Some(rel) = name[s..].iter().position(|&b| b == quote) {
                let e = s + rel;
                let slen = e - s;
                if slen > 0 && slen < crate::vars::MAX_VAR_VALUE {
                    let text = case_transform(&name[s..e], lower, upper);
                    self.emit_lit_bytes(&text);
                }
                return end + 1;
            }
            self.emit_lit_bytes(b"{");
            return ptr + 1;
        }

        let found = self.vars.iter().find(|v| v.name.as_bytes() == name).cloned();
        let Some(var) = found else {
            self.emit_lit_bytes(b"{");
            return ptr + 1;
        };

        let value = case_transform(var.value.as_bytes(), lower, upper);
        if value.contains(&b'<') {
            if depth < MAX_RECURSION_DEPTH {
                self.compile_fragment_inner(&value, depth + 1);
            } else {
                trace!("recursion depth exceeded expanding variable {}, emitting literally", var.name);
                self.emit_lit_bytes(&value);
            }
        } else if var.is_fmt {
            let spec = String::from_utf8_lossy(&value).into_owned();
            let class = args::classify(&spec);
            if let Ok(off) = self.program.literals.add(&value) {
                self.program.emit(Opcode::EmitFmt, pack_fmt_operand(class, off));
            }
        } else {
            self.emit_lit_bytes(&value);
        }

        end + 1
    }

    fn scan_fmt(&mut self, fmt: &[u8], ptr: usize, lit: usize) -> usize {
        self.flush_lit(fmt, lit, ptr);

        let mut fs = ptr + 1;
        while fs < fmt.len() && matches!(fmt[fs], b'-' | b'+' | b' ' | b'#' | b'0') {
            fs += 1;
        }
        if fmt.get(fs) == Some(&b'*') {
            fs += 1;
        } else {
            while fs < fmt.len() && fmt[fs].is_ascii_digit() {
                fs += 1;
            }
        }
        if fmt.get(fs) == Some(&b'.') {
            fs += 1;
            if fmt.get(fs) == Some(&b'*') {
                fs += 1;
            } else {
                while fs < fmt.len() && fmt[fs].is_ascii_digit() {
                    fs += 1;
                }
            }
        }
        while fs < fmt.len() && matches!(fmt[fs], b'h' | b'l' | b'L' | b'z' | b'j' | b't') {
            fs += 1;
        }
        if fs < fmt.len() {
            fs += 1;
        }

        let spec_bytes = &fmt[ptr..fs];
        let spec = String::from_utf8_lossy(spec_bytes).into_owned();
        let class = args::classify(&spec);
        if let Ok(off) = self.program.literals.add(spec_bytes) {
            self.program.emit(Opcode::EmitFmt, pack_fmt_operand(class, off));
        }
        fs
    }

    fn scan_escape(&mut self, fmt: &[u8], ptr: usize, lit: usize, literal: &[u8]) -> usize {
        self.flush_lit(fmt, lit, ptr);
        self.emit_lit_bytes(literal);
        ptr + 2
    }

    fn compile_fragment_inner(&mut self, fmt: &[u8], depth: u32) {
        let mut ptr = 0;
        let mut lit = 0;

        while ptr < fmt.len() {
            let c = fmt[ptr];
            let c1 = fmt.get(ptr + 1).copied();
            if c == b'<' && c1 == Some(b'<') {
                ptr = self.scan_escape(fmt, ptr, lit, b"<");
                lit = ptr;
            } else if c == b'>' && c1 == Some(b'>') {
                ptr = self.scan_escape(fmt, ptr, lit, b">");
                lit = ptr;
            } else if c == b'%' && c1 == Some(b'%') {
                ptr = self.scan_escape(fmt, ptr, lit, b"%");
                lit = ptr;
            } else if c == b'{' && fmt[ptr..].starts_with(b"{let ") {
                ptr = self.scan_let_brace(fmt, ptr, lit);
                lit = ptr;
            } else if c == b'{' {
                ptr = self.scan_var_brace(fmt, ptr, lit, depth);
                lit = ptr;
            } else if c == b'<' {
                ptr = self.scan_tag(fmt, ptr, lit);
                lit = ptr;
            } else if c == b'%' && c1.is_some_and(|c1| c1 != b'%') {
                ptr = self.scan_fmt(fmt, ptr, lit);
                lit = ptr;
            } else {
                ptr += 1;
            }
        }

        self.flush_lit(fmt, lit, ptr);
    }
}

fn case_transform(bytes: &[u8], lower: bool, upper: bool) -> Vec<u8> {
    if lower {
        bytes.iter().map(u8::to_ascii_lowercase).collect()
    } else if upper {
        bytes.iter().map(u8::to_ascii_uppercase).collect()
    } else {
        bytes.to_vec()
    }
}

/// Compiles `format` into a [`Program`]. Never fails: malformed markup
/// degrades to literal text, per spec.md §4.2's graceful-fallback
/// invariant. The process-global variable table (seeded via
/// [`crate::var_set`]) is snapshotted at the start of compilation.
#[must_use]
pub fn compile(format: &str) -> Program {
    trace!("compiling format string of {} bytes", format.len());
    let mut compiler = Compiler { program: Program::new(), vars: globals::snapshot_vars() };
    compiler.compile_fragment_inner(format.as_bytes(), 0);
    compiler.program.emit(Opcode::Halt, 0);
    compiler.program
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Opcode as Op;

    fn ops(p: &Program) -> Vec<Op> {
        p.instructions.iter().map(|i| i.op).collect()
    }

    #[test]
    fn plain_literal_text() {
        let p = compile("hello world");
        assert_eq!(ops(&p), vec![Op::EmitLit, Op::Halt]);
        assert_eq!(p.literals.get_str(0), "hello world");
    }

    #[test]
    fn color_tag_roundtrip() {
        let p = compile("<red>hi</red>");
        assert_eq!(
            ops(&p),
            vec![Op::StylePush, Op::SetFg, Op::StyleFlush, Op::EmitLit, Op::SetFg, Op::StyleFlush, Op::Halt]
        );
    }

    #[test]
    fn unknown_tag_falls_back_to_literal() {
        let p = compile("<nope>x");
        // A style frame is pushed unconditionally before any match is
        // attempted, so a failed match leaves that STYLE_PUSH orphaned in
        // the stream. "<" is then emitted literally and scanning resumes
        // one byte past it.
        assert_eq!(ops(&p), vec![Op::StylePush, Op::EmitLit, Op::EmitLit, Op::Halt]);
        assert_eq!(p.literals.get_str(p.instructions[1].operand), "<");
        assert_eq!(p.literals.get_str(p.instructions[2].operand), "nope>x");
    }

    #[test]
    fn escapes() {
        let p = compile("<< >> %%");
        assert_eq!(p.literals.get_str(0), "<");
        assert_eq!(p.literals.get_str(2), " ");
        assert_eq!(p.literals.get_str(4), ">");
    }

    #[test]
    fn pad_tags() {
        let p = compile("<pad=10>hi</pad>");
        assert_eq!(ops(&p), vec![Op::PadBegin, Op::EmitLit, Op::PadEnd, Op::Halt]);
        assert_eq!(p.instructions[0].operand, 10);
    }

    #[test]
    fn conversion_specifier_classified() {
        let p = compile("n=%d!");
        assert_eq!(ops(&p), vec![Op::EmitLit, Op::EmitFmt, Op::EmitLit, Op::Halt]);
    }

    #[test]
    fn hex_color() {
        let p = compile("<#ff8800>x</#ff8800>");
        assert_eq!(p.instructions[1].op, Op::SetFgRgb);
        assert_eq!(p.instructions[1].operand, 0x00FF_8800);
    }

    #[test]
    fn br_and_space() {
        let p = compile("a<br=2/>b<space=3/>c");
        assert_eq!(ops(&p), vec![Op::EmitLit, Op::EmitNewlines, Op::EmitLit, Op::EmitSpaces, Op::EmitLit, Op::Halt]);
    }

    #[test]
    fn let_and_var_brace() {
        let p = compile("{let name=world}hi {name}!");
        assert_eq!(ops(&p), vec![Op::EmitLit, Op::EmitLit, Op::EmitLit, Op::Halt]);
        assert_eq!(p.literals.get_str(p.instructions[0].operand), "hi ");
        assert_eq!(p.literals.get_str(p.instructions[1].operand), "world");
        assert_eq!(p.literals.get_str(p.instructions[2].operand), "!");
    }

    #[test]
    fn plus_style_combination() {
        let p = compile("<bold+red>x</>");
        assert_eq!(ops(&p), vec![Op::StylePush, Op::SetBold, Op::SetFg, Op::StyleFlush, Op::EmitLit, Op::StyleReset, Op::Halt]);
    }
}
