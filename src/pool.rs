use crate::error::Error;

/// Offsets into a [`LiteralPool`] reserve the high 4 bits of a 32-bit
/// operand for `EMIT_FMT`'s argument-class tag (see [`crate::program`]),
/// so the pool itself is limited to 256 MiB.
pub const MAX_POOL_LEN: usize = 1 << 28;

/// Append-only, NUL-terminated byte buffer.
///
/// Every entry appended via [`LiteralPool::add`] is followed by a `\0`
/// byte so VM operands can be read back as C-style strings; offsets
/// returned by `add` are stable for the life of the pool; nothing is ever
/// removed or moved.
#[derive(Debug, Clone, Default)]
pub struct LiteralPool {
    bytes: Vec<u8>,
}

impl LiteralPool {
    #[must_use]
    pub fn new() -> Self {
        Self { bytes: Vec::with_capacity(256) }
    }

    /// Appends `bytes` followed by a NUL terminator and returns the offset
    /// of the first byte. Doubles capacity on overflow.
    pub fn add(&mut self, bytes: &[u8]) -> Result<u32, Error> {
        let required = self.bytes.len() + bytes.len() + 1;
        if required > MAX_POOL_LEN {
            return Err(Error::Alloc);
        }
        if required > self.bytes.capacity() {
            let additional = required - self.bytes.len();
            self.bytes.try_reserve(additional.max(self.bytes.capacity())).map_err(|_| Error::Alloc)?;
        }
        let off = self.bytes.len() as u32;
        self.bytes.extend_from_slice(bytes);
        self.bytes.push(0);
        Ok(off)
    }

    /// Reads back the NUL-terminated string starting at `offset`.
    ///
    /// # Panics
    /// Panics if `offset` is not a valid entry start — every caller derives
    /// offsets from a [`crate::program::Program`] produced by the compiler,
    /// which upholds the "offset strictly less than `len`" invariant.
    #[must_use]
    pub fn get(&self, offset: u32) -> &[u8] {
        let start = offset as usize;
        let rest = &self.bytes[start..];
        let end = rest.iter().position(|&b| b == 0).expect("literal pool entry must be NUL-terminated");
        &rest[..end]
    }

    #[must_use]
    pub fn get_str(&self, offset: u32) -> &str {
        std::str::from_utf8(self.get(offset)).expect("literal pool entries are always valid UTF-8")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
