//! Disassembler and hex-dump diagnostic writers, enabled by
//! [`crate::set_debug_disasm`]/[`crate::set_debug_hex`].

use std::io::{self, Write};

use crate::args::ArgClass;
use crate::program::{Opcode, Program, unpack_fmt_operand};

fn op_name(op: Opcode) -> &'static str {
    match op {
        Opcode::Nop => "NOP",
        Opcode::EmitLit => "EMIT_LIT",
        Opcode::EmitFmt => "EMIT_FMT",
        Opcode::SetFg => "SET_FG",
        Opcode::SetBg => "SET_BG",
        Opcode::SetFgRgb => "SET_FG_RGB",
        Opcode::SetBgRgb => "SET_BG_RGB",
        Opcode::SetBold => "SET_BOLD",
        Opcode::SetDim => "SET_DIM",
        Opcode::SetUl => "SET_UL",
        Opcode::SetItalic => "SET_ITALIC",
        Opcode::SetStrike => "SET_STRIKE",
        Opcode::SetInvert => "SET_INVERT",
        Opcode::StylePush => "STYLE_PUSH",
        Opcode::StyleFlush => "STYLE_FLUSH",
        Opcode::StyleReset => "STYLE_RESET",
        Opcode::StyleResetAll => "STYLE_RESET_ALL",
        Opcode::PadBegin => "PAD_BEGIN",
        Opcode::RpadBegin => "RPAD_BEGIN",
        Opcode::PadEnd => "PAD_END",
        Opcode::EmitSpaces => "EMIT_SPACES",
        Opcode::EmitNewlines => "EMIT_NEWLINES",
        Opcode::Halt => "HALT",
    }
}

fn color_name(code: u32) -> &'static str {
    match code {
        0 => "none",
        30 => "black",
        31 => "red",
        32 => "green",
        33 => "yellow",
        34 => "blue",
        35 => "magenta",
        36 => "cyan",
        37 => "white",
        90 => "gray",
        91 => "bright_red",
        92 => "bright_green",
        93 => "bright_yellow",
        94 => "bright_blue",
        95 => "bright_magenta",
        96 => "bright_cyan",
        97 => "bright_white",
        _ => "?",
    }
}

fn arg_class_name(cls: ArgClass) -> &'static str {
    match cls {
        ArgClass::None => "none",
        ArgClass::Int => "int",
        ArgClass::Long => "long",
        ArgClass::LLong => "llong",
        ArgClass::Size => "size_t",
        ArgClass::Double => "double",
        ArgClass::CStr => "char*",
        ArgClass::Ptr => "void*",
        ArgClass::WInt => "wint_t",
        ArgClass::WStr => "wchar_t*",
    }
}

fn write_quoted(out: &mut impl Write, s: &[u8], max: Option<usize>) -> io::Result<()> {
    write!(out, "\"")?;
    let limit = max.unwrap_or(s.len());
    for &b in s.iter().take(limit) {
        match b {
            b'\n' => write!(out, "\\n")?,
            b'\t' => write!(out, "\\t")?,
            b'"' => write!(out, "\\\"")?,
            0..=0x1f => write!(out, "\\x{b:02x}")?,
            _ => out.write_all(&[b])?,
        }
    }
    if max.is_some_and(|m| s.len() > m) {
        write!(out, "...")?;
    }
    write!(out, "\"")
}

fn write_operand(out: &mut impl Write, prog: &Program, ins_op: Opcode, operand: u32, compact: bool) -> io::Result<()> {
    match ins_op {
        Opcode::EmitLit => write_quoted(out, prog.literals.get(operand), compact.then_some(24)),
        Opcode::EmitFmt => {
            let (offset, cls) = unpack_fmt_operand(operand);
            write_quoted(out, prog.literals.get(offset), compact.then_some(24))?;
            write!(out, " ({})", arg_class_name(cls))
        }
        Opcode::SetFg | Opcode::SetBg => {
            if compact {
                write!(out, "{}", color_name(operand))
            } else {
                write!(out, "{} (ANSI {operand})", color_name(operand))
            }
        }
        Opcode::SetFgRgb | Opcode::SetBgRgb => {
            write!(out, "#{:02x}{:02x}{:02x}", (operand >> 16) & 0xFF, (operand >> 8) & 0xFF, operand & 0xFF)
        }
        Opcode::SetBold | Opcode::SetDim | Opcode::SetUl | Opcode::SetItalic | Opcode::SetStrike | Opcode::SetInvert => {
            write!(out, "{}", if operand != 0 { "ON" } else { "OFF" })
        }
        Opcode::PadBegin | Opcode::RpadBegin => write!(out, "width={operand}"),
        Opcode::EmitSpaces | Opcode::EmitNewlines => write!(out, "{operand}"),
        Opcode::Nop | Opcode::StylePush | Opcode::StyleFlush | Opcode::StyleReset | Opcode::StyleResetAll | Opcode::PadEnd | Opcode::Halt => Ok(()),
    }
}

/// Writes a human-readable disassembly of `prog`'s instruction stream.
pub fn disasm(prog: &Program, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "; crprintf bytecode — {} instructions, {} bytes literal pool", prog.instructions.len(), prog.literals.len())?;
    writeln!(out, "; {:<4}  {:<16} operand", "addr", "opcode")?;
    writeln!(out, "; ----  ---------------- -------")?;
    for (i, ins) in prog.instructions.iter().enumerate() {
        write!(out, "  {i:04}  {:<16} ", op_name(ins.op))?;
        write_operand(out, prog, ins.op, ins.operand, false)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Writes a hex dump of `prog`'s raw instruction bytes plus its literal pool.
pub fn hexdump(prog: &Program, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "; crprintf hex dump — {} instructions, {} bytes literal pool", prog.instructions.len(), prog.literals.len())?;
    writeln!(out, "; {:<4}  {:<26} decoded", "addr", "bytes")?;
    writeln!(out, "; ----  -------------------------  --------")?;

    for (i, ins) in prog.instructions.iter().enumerate() {
        let op_byte = ins.op as u8;
        let operand_bytes = ins.operand.to_le_bytes();
        write!(out, "  {i:04}  {op_byte:02x} ")?;
        for b in operand_bytes {
            write!(out, "{b:02x} ")?;
        }
        write!(out, " ; {} ", op_name(ins.op))?;
        write_operand(out, prog, ins.op, ins.operand, true)?;
        writeln!(out)?;
    }

    let lit = prog.literals.as_bytes();
    if !lit.is_empty() {
        writeln!(out, "\n; literal pool ({} bytes):", lit.len())?;
        for (off, chunk) in lit.chunks(16).enumerate() {
            write!(out, "  {:04x}  ", off * 16)?;
            for (b, byte) in chunk.iter().enumerate() {
                write!(out, "{byte:02x} ")?;
                if b == 7 {
                    write!(out, " ")?;
                }
            }
            for pad in chunk.len()..16 {
                write!(out, "   ")?;
                if pad == 7 {
                    write!(out, " ")?;
                }
            }
            write!(out, " |")?;
            for &b in chunk {
                let c = if (0x20..0x7f).contains(&b) { b as char } else { '.' };
                write!(out, "{c}")?;
            }
            writeln!(out, "|")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;

    #[test]
    fn disasm_lists_every_instruction() {
        let prog = compile("<red>hi</red>");
        let mut buf = Vec::new();
        disasm(&prog, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count() - 3, prog.instructions.len());
        assert!(text.contains("SET_FG"));
        assert!(text.contains("EMIT_LIT"));
    }

    #[test]
    fn hexdump_includes_literal_pool_section() {
        let prog = compile("hello");
        let mut buf = Vec::new();
        hexdump(&prog, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("literal pool"));
        assert!(text.contains("hello"));
    }
}
