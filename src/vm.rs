//! The VM executor.
//!
//! A `match`-dispatch interpreter over [`Program`]: Rust's `match` over a
//! small closed enum compiles to the same jump table a C switch or
//! computed-goto dispatch would.

use std::io;

use log::debug;

use crate::args::{Arg, ArgClass};
use crate::globals;
use crate::printf;
use crate::program::{Opcode, Program, unpack_fmt_operand};
use crate::style::{BoundedStack, Color, Style, StyleFlags};

struct PadEntry {
    mark: usize,
    width: u32,
    right_align: bool,
}

/// Counts "visible" (non-escape-sequence) bytes, so padding measures what a
/// terminal would actually display rather than raw byte length. Byte-based,
/// not grapheme-aware — see spec.md §9's resolved Open Question on this.
fn visible_len(bytes: &[u8]) -> usize {
    let mut vis = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0x1b {
            i += 1;
            while i < bytes.len() && !bytes[i].is_ascii_alphabetic() {
                i += 1;
            }
            i += 1;
        } else {
            vis += 1;
            i += 1;
        }
    }
    vis
}

struct Vm<'a> {
    current: Style,
    style_stack: BoundedStack<Style, 8>,
    pad_stack: BoundedStack<PadEntry, 8>,
    out: Vec<u8>,
    args: &'a [Arg],
    arg_idx: usize,
    color_on: bool,
}

impl<'a> Vm<'a> {
    fn new(args: &'a [Arg]) -> Self {
        Self {
            current: Style::default(),
            style_stack: BoundedStack::new(),
            pad_stack: BoundedStack::new(),
            out: Vec::with_capacity(512),
            args,
            arg_idx: 0,
            color_on: globals::color_enabled(),
        }
    }

    fn next_arg(&mut self) -> Option<&'a Arg> {
        let a = self.args.get(self.arg_idx);
        self.arg_idx += 1;
        a
    }

    fn flush_style(&mut self) {
        if self.color_on {
            self.current.write_sgr(&mut self.out);
        }
    }

    fn run(&mut self, prog: &Program) {
        for ins in &prog.instructions {
            match ins.op {
                Opcode::Nop => {}

                Opcode::EmitLit => {
                    self.out.extend_from_slice(prog.literals.get(ins.operand));
                }

                Opcode::EmitFmt => {
                    let (offset, class) = unpack_fmt_operand(ins.operand);
                    let spec = prog.literals.get_str(offset);
                    let arg = if class == ArgClass::None { None } else { self.next_arg() };
                    let rendered = printf::render(spec, arg);
                    self.out.extend_from_slice(rendered.as_bytes());
                }

                Opcode::SetFg => {
                    self.current.fg = if ins.operand == 0 { Color::None } else { Color::Ansi(ins.operand as u8) };
                }
                Opcode::SetBg => {
                    self.current.bg = if ins.operand == 0 { Color::None } else { Color::Ansi(ins.operand as u8) };
                }
                Opcode::SetFgRgb => {
                    self.current.fg = unpack_rgb(ins.operand);
                }
                Opcode::SetBgRgb => {
                    self.current.bg = unpack_rgb(ins.operand);
                }

                Opcode::SetBold => self.set_flag(StyleFlags::BOLD, ins.operand),
                Opcode::SetDim => self.set_flag(StyleFlags::DIM, ins.operand),
                Opcode::SetUl => self.set_flag(StyleFlags::UNDERLINE, ins.operand),
                Opcode::SetItalic => self.set_flag(StyleFlags::ITALIC, ins.operand),
                Opcode::SetStrike => self.set_flag(StyleFlags::STRIKE, ins.operand),
                Opcode::SetInvert => self.set_flag(StyleFlags::INVERT, ins.operand),

                Opcode::StylePush => self.style_stack.push(self.current),
                Opcode::StyleFlush => self.flush_style(),
                Opcode::StyleReset => {
                    self.current = self.style_stack.pop().unwrap_or_default();
                    self.flush_style();
                }
                Opcode::StyleResetAll => {
                    self.current = Style::default();
                    while self.style_stack.pop().is_some() {}
                    if self.color_on {
                        self.out.extend_from_slice(b"\x1b[0m");
                    }
                }

                Opcode::PadBegin => {
                    self.pad_stack.push(PadEntry { mark: self.out.len(), width: ins.operand, right_align: false });
                }
                Opcode::RpadBegin => {
                    self.pad_stack.push(PadEntry { mark: self.out.len(), width: ins.operand, right_align: true });
                }
                Opcode::PadEnd => self.pad_end(),

                Opcode::EmitSpaces => self.out.resize(self.out.len() + ins.operand as usize, b' '),
                Opcode::EmitNewlines => self.out.resize(self.out.len() + ins.operand as usize, b'\n'),

                Opcode::Halt => break,
            }
        }
    }

    fn set_flag(&mut self, flag: StyleFlags, operand: u32) {
        if operand != 0 {
            self.current.flags.insert(flag);
        } else {
            self.current.flags.remove(flag);
        }
    }

    fn pad_end(&mut self) {
        let Some(pe) = self.pad_stack.pop() else { return };
        let vis = visible_len(&self.out[pe.mark..]);
        let width = pe.width as usize;
        if width <= vis {
            return;
        }
        let pad_n = width - vis;
        if pe.right_align {
            let insert_at = pe.mark;
            let mut spaces = vec![b' '; pad_n];
            spaces.extend_from_slice(&self.out[insert_at..]);
            self.out.truncate(insert_at);
            self.out.extend_from_slice(&spaces);
        } else {
            self.out.resize(self.out.len() + pad_n, b' ');
        }
    }
}

fn unpack_rgb(operand: u32) -> Color {
    let r = ((operand >> 16) & 0xFF) as u8;
    let g = ((operand >> 8) & 0xFF) as u8;
    let b = (operand & 0xFF) as u8;
    Color::Rgb(r, g, b)
}

fn run(prog: &Program, args: &[Arg]) -> Vec<u8> {
    let mut vm = Vm::new(args);
    vm.run(prog);
    vm.out
}

/// Executes `prog` against `args`, writing rendered output to `sink`.
/// Returns the number of bytes written.
pub fn exec<W: io::Write>(prog: &Program, sink: &mut W, args: &[Arg]) -> io::Result<usize> {
    debug!("executing program of {} instructions", prog.instructions.len());
    let rendered = run(prog, args);
    sink.write_all(&rendered)?;
    Ok(rendered.len())
}

/// Executes `prog` against `args`, copying at most `out.len() - 1` rendered
/// bytes into `out` and always NUL-terminating the copy. Returns the full
/// rendered length, which may exceed `out.len()` if the output was
/// truncated — mirroring `snprintf`'s "would-be length" return convention.
#[must_use]
pub fn format_to_buffer(prog: &Program, out: &mut [u8], args: &[Arg]) -> usize {
    let rendered = run(prog, args);
    if !out.is_empty() {
        let n = rendered.len().min(out.len() - 1);
        out[..n].copy_from_slice(&rendered[..n]);
        out[n] = 0;
    }
    rendered.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use std::sync::Mutex as StdMutex;

    static TEST_LOCK: StdMutex<()> = StdMutex::new(());

    #[test]
    fn plain_text() {
        let _g = TEST_LOCK.lock().unwrap();
        let prog = compile("hello");
        let mut buf = Vec::new();
        let n = exec(&prog, &mut buf, &[]).unwrap();
        assert_eq!(n, 5);
        assert_eq!(buf, b"hello");
    }

    #[test]
    fn color_disabled_strips_escapes() {
        let _g = TEST_LOCK.lock().unwrap();
        globals::set_color_enabled(false);
        let prog = compile("<red>hi</red>");
        let mut buf = Vec::new();
        exec(&prog, &mut buf, &[]).unwrap();
        assert_eq!(buf, b"hi");
        globals::set_color_enabled(true);
    }

    #[test]
    fn color_enabled_emits_sgr() {
        let _g = TEST_LOCK.lock().unwrap();
        globals::set_color_enabled(true);
        let prog = compile("<red>x</red>");
        let mut buf = Vec::new();
        exec(&prog, &mut buf, &[]).unwrap();
        assert!(buf.starts_with(b"\x1b[0m\x1b[31mx"));
    }

    #[test]
    fn pad_right_aligns_content() {
        let _g = TEST_LOCK.lock().unwrap();
        globals::set_color_enabled(false);
        let prog = compile("<pad=5>hi</pad>");
        let mut buf = Vec::new();
        exec(&prog, &mut buf, &[]).unwrap();
        assert_eq!(buf, b"hi   ");
        globals::set_color_enabled(true);
    }

    #[test]
    fn rpad_left_pads_content() {
        let _g = TEST_LOCK.lock().unwrap();
        globals::set_color_enabled(false);
        let prog = compile("<rpad=5>hi</rpad>");
        let mut buf = Vec::new();
        exec(&prog, &mut buf, &[]).unwrap();
        assert_eq!(buf, b"   hi");
        globals::set_color_enabled(true);
    }

    #[test]
    fn emit_fmt_consumes_one_arg() {
        let _g = TEST_LOCK.lock().unwrap();
        let prog = compile("n=%d");
        let mut buf = Vec::new();
        exec(&prog, &mut buf, &[Arg::Int(42)]).unwrap();
        assert_eq!(buf, b"n=42");
    }

    #[test]
    fn format_to_buffer_truncates_but_reports_full_length() {
        let _g = TEST_LOCK.lock().unwrap();
        let prog = compile("hello world");
        let mut out = [0u8; 5];
        let n = format_to_buffer(&prog, &mut out, &[]);
        assert_eq!(n, 11);
        assert_eq!(&out, b"hell\0");
    }

    #[test]
    fn br_and_space_tags() {
        let _g = TEST_LOCK.lock().unwrap();
        let prog = compile("a<br=2/>b<space=3/>c");
        let mut buf = Vec::new();
        exec(&prog, &mut buf, &[]).unwrap();
        assert_eq!(buf, b"a\n\nb   c");
    }
}
