use crprintf::args::Arg;
use crprintf::program::Opcode;
use crprintf::{compile, exec, format_to_buffer, set_color_enabled, var_set};
use std::sync::Mutex;

// process-global color toggle is shared across the whole test binary
static COLOR_LOCK: Mutex<()> = Mutex::new(());

fn run(fmt: &str, args: &[Arg]) -> Vec<u8> {
    let prog = compile(fmt);
    let mut out = Vec::new();
    exec(&prog, &mut out, args).unwrap();
    out
}

#[test]
fn every_program_ends_with_halt() {
    for fmt in ["", "plain", "<red>x</red>", "{missing}", "%d", "<< >> %%"] {
        assert!(compile(fmt).ends_with_halt(), "fmt={fmt:?}");
    }
}

#[test]
fn color_disabled_output_has_no_escape_byte() {
    let _g = COLOR_LOCK.lock().unwrap();
    set_color_enabled(false);
    let out = run("<bold><red>x</red></bold><rpad=4>y</rpad>", &[]);
    assert!(!out.contains(&0x1b));
    set_color_enabled(true);
}

#[test]
fn format_to_buffer_reports_full_length_regardless_of_cap() {
    let prog = compile("hello world this is long");
    let mut buf = [0u8; 8];
    let n = format_to_buffer(&prog, &mut buf, &[]);
    assert_eq!(n, 24);
    assert_eq!(&buf, b"hello w\0");
}

#[test]
fn pad_end_writes_exactly_the_shortfall() {
    let _g = COLOR_LOCK.lock().unwrap();
    set_color_enabled(false);
    assert_eq!(run("<pad=10>hi</pad>", &[]), b"hi        ");
    assert_eq!(run("<pad=1>hello</pad>", &[]), b"hello");
}

#[test]
fn compile_is_deterministic() {
    let a = compile("<bold+red>x</bold+red> {let v=1} %d");
    let b = compile("<bold+red>x</bold+red> {let v=1} %d");
    assert_eq!(a.instructions.len(), b.instructions.len());
    for (ia, ib) in a.instructions.iter().zip(&b.instructions) {
        assert_eq!(ia.op, ib.op);
        assert_eq!(ia.operand, ib.operand);
    }
    assert_eq!(a.literals.as_bytes(), b.literals.as_bytes());
}

#[test]
fn scenario_1_color_tag_no_args() {
    let _g = COLOR_LOCK.lock().unwrap();
    set_color_enabled(false);
    let out = run("<red>hello</red>", &[]);
    assert_eq!(out, b"hello");
    assert_eq!(out.len(), 5);
}

#[test]
fn scenario_2_pad() {
    let _g = COLOR_LOCK.lock().unwrap();
    set_color_enabled(false);
    let out = run("<pad=10>hi</pad>", &[]);
    assert_eq!(out.len(), 10);
    assert_eq!(out, b"hi        ");
}

#[test]
fn scenario_3_rpad() {
    let _g = COLOR_LOCK.lock().unwrap();
    set_color_enabled(false);
    let out = run("<rpad=10>hi</rpad>", &[]);
    assert_eq!(out.len(), 10);
    assert_eq!(out, b"        hi");
}

#[test]
fn scenario_4_br() {
    let _g = COLOR_LOCK.lock().unwrap();
    set_color_enabled(false);
    let out = run("a<br=2/>b", &[]);
    assert_eq!(out, b"a\n\nb");
    assert_eq!(out.len(), 4);
}

#[test]
fn scenario_5_space() {
    let _g = COLOR_LOCK.lock().unwrap();
    set_color_enabled(false);
    let out = run("a<space=3/>b", &[]);
    assert_eq!(out, b"a   b");
    assert_eq!(out.len(), 5);
}

#[test]
fn scenario_6_escapes() {
    let out = run("<< >> %%", &[]);
    assert_eq!(out, b"< > %");
    assert_eq!(out.len(), 5);
}

#[test]
fn scenario_7_var_expansion() {
    let _g = COLOR_LOCK.lock().unwrap();
    var_set("v", "hi");
    set_color_enabled(false);
    let out = run("{v}", &[]);
    assert_eq!(out, b"hi");
}

#[test]
fn scenario_8_format_to_buffer_truncation() {
    let prog = compile("hello world this is long");
    let mut buf = [0u8; 8];
    let n = format_to_buffer(&prog, &mut buf, &[]);
    assert_eq!(n, 24);
    assert_eq!(&buf, b"hello w\0");
}

#[test]
fn scenario_9_conversion_specifier() {
    let out = run("num: %d", &[Arg::Int(42)]);
    assert_eq!(out, b"num: 42");
}

#[test]
fn scenario_10_color_on_emits_sgr_and_reset() {
    let _g = COLOR_LOCK.lock().unwrap();
    set_color_enabled(true);
    let out = run("<red>x</red>", &[]);
    assert!(out.starts_with(b"\x1b[0m\x1b[31m"));
    assert!(out.ends_with(b"\x1b[0m") || out.windows(4).any(|w| w == b"\x1b[0m"));
    let visible = out.iter().filter(|&&b| b != 0x1b).count();
    // crude: just confirm the literal 'x' made it through once
    assert_eq!(out.iter().filter(|&&b| b == b'x').count(), 1);
    assert!(visible >= 1);
}

#[test]
fn balanced_tag_pair_leaves_style_stack_depth_unchanged() {
    // plain `</>` closes are the form that actually pops the style stack
    // (an attribute-selective closer like `</dim>` only flushes, it doesn't
    // pop — see DESIGN.md's Open Question #1 resolution).
    let prog = compile("<bold>x<dim>y</>z</>");
    let mut depth = 0i32;
    for ins in &prog.instructions {
        match ins.op {
            Opcode::StylePush => depth += 1,
            Opcode::StyleReset => depth -= 1,
            _ => {}
        }
    }
    assert_eq!(depth, 0);
}

#[test]
fn unknown_tag_falls_back_to_literal_text() {
    let _g = COLOR_LOCK.lock().unwrap();
    set_color_enabled(false);
    // an unrecognized tag is emitted byte-for-byte as literal text
    let out = run("<notatag>x</notatag>", &[]);
    assert_eq!(out, b"<notatag>x</notatag>");
}
