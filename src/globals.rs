//! Process-global state: the variable table callers seed with
//! [`crate::var_set`], and the color/debug toggles.
//!
//! spec.md §5 is explicit that no internal *logical* synchronization is
//! provided here — a concurrent caller must establish its own
//! happens-before ordering (e.g. configure before any worker compiles).
//! What Rust still requires, independent of that contract, is memory
//! safety: an unsynchronized `static mut` would be unsound. The `Mutex`
//! and `AtomicBool`s below exist purely to satisfy that requirement; they
//! do not change the "configure-before-compile" discipline callers are
//! expected to follow.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::vars::VarTable;

static GLOBAL_VARS: Mutex<VarTable> = Mutex::new(VarTable { entries: Vec::new() });
static COLOR_ENABLED: AtomicBool = AtomicBool::new(true);
static DEBUG_DISASM: AtomicBool = AtomicBool::new(false);
static DEBUG_HEX: AtomicBool = AtomicBool::new(false);

/// Upserts a process-global variable. Silently drops on length or
/// capacity overflow (spec.md §7).
pub fn var_set(name: &str, value: &str) {
    let mut table = GLOBAL_VARS.lock().unwrap_or_else(|e| e.into_inner());
    table.set(name, value);
}

/// Snapshot-copies the process-global variable table, the seed for a
/// new per-compilation table (spec.md §3/§4.2).
#[must_use]
pub fn snapshot_vars() -> VarTable {
    GLOBAL_VARS.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

pub fn set_color_enabled(enable: bool) {
    COLOR_ENABLED.store(enable, Ordering::Relaxed);
}

#[must_use]
pub fn color_enabled() -> bool {
    COLOR_ENABLED.load(Ordering::Relaxed)
}

pub fn set_debug_disasm(enable: bool) {
    DEBUG_DISASM.store(enable, Ordering::Relaxed);
}

#[must_use]
pub fn debug_disasm() -> bool {
    DEBUG_DISASM.load(Ordering::Relaxed)
}

pub fn set_debug_hex(enable: bool) {
    DEBUG_HEX.store(enable, Ordering::Relaxed);
}

#[must_use]
pub fn debug_hex() -> bool {
    DEBUG_HEX.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // serialize tests that touch process-global state
    static TEST_LOCK: StdMutex<()> = StdMutex::new(());

    #[test]
    fn color_toggle_roundtrips() {
        let _guard = TEST_LOCK.lock().unwrap();
        set_color_enabled(false);
        assert!(!color_enabled());
        set_color_enabled(true);
        assert!(color_enabled());
    }

    #[test]
    fn var_set_then_snapshot() {
        let _guard = TEST_LOCK.lock().unwrap();
        var_set("greeting", "hi");
        let snap = snapshot_vars();
        assert_eq!(snap.get("greeting").unwrap().value, "hi");
    }
}
