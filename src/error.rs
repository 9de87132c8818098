use std::{error, fmt};

/// Errors surfaced by the literal pool and the VM's output buffer.
///
/// Malformed markup and resource overflow (too many variables, oversized
/// names/values, stack depth) never reach here — they are handled silently
/// at the point of occurrence per the compiler's graceful-fallback contract.
/// This type exists only for the one failure mode that *can't* be silently
/// absorbed: running out of memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A buffer growth (`Vec::try_reserve`) failed.
    Alloc,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Alloc => "allocation failure",
        })
    }
}

impl error::Error for Error {}
