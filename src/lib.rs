//! printf with inline color tags and variables, powered by a register-based VM.
//!
//! A format string is compiled once into a [`program::Program`] — a flat
//! instruction stream plus a literal pool — and then executed as many times
//! as needed against different argument lists. See [`compile::compile`],
//! [`vm::exec`], and [`vm::format_to_buffer`] for the three pieces of that
//! pipeline, or [`crprintf!`] for a macro that caches the compile step per
//! call site.
//!
//! ```
//! use crprintf::{compile, exec, Arg};
//!
//! let program = compile("<bold><red>%s</red></bold>: %d\n");
//! let mut out = Vec::new();
//! exec(&program, &mut out, &[Arg::CStr("errors".into()), Arg::Int(3)]).unwrap();
//! ```

pub mod args;
pub mod cache;
pub mod compile;
pub mod diag;
pub mod error;
pub mod globals;
pub mod pool;
pub mod printf;
pub mod program;
pub mod style;
pub mod vars;
pub mod vm;

pub use crate::args::{Arg, ArgClass};
pub use crate::compile::compile;
pub use crate::error::Error;
pub use crate::globals::{
    color_enabled, debug_disasm, debug_hex, set_color_enabled, set_debug_disasm, set_debug_hex, var_set,
};
pub use crate::program::Program;
pub use crate::vm::{exec, format_to_buffer};
