//! Renders a handful of format strings to stdout, exercising color tags,
//! padding, and variables end to end. Run with `RUST_LOG=trace` to see the
//! compiler/VM's `log` output.

use crprintf::args::Arg;
use crprintf::{compile, exec, var_set};

fn main() {
    env_logger::init();

    let mut stdout = std::io::stdout();

    let greeting = compile("<bold><cyan>info:</cyan></bold> hello, %s!\n");
    exec(&greeting, &mut stdout, &[Arg::CStr("world".into())]).unwrap();

    let table = compile("<rpad=10>name</rpad> <pad=6>score</pad>\n<rpad=10>%s</rpad> <pad=6>%d</pad>\n");
    exec(&table, &mut stdout, &[Arg::CStr("alice".into()), Arg::Int(97)]).unwrap();

    var_set("app", "crprintf-demo");
    let banner = compile("running {app} <dim>(color={^'on'})</dim>\n");
    exec(&banner, &mut stdout, &[]).unwrap();
}
