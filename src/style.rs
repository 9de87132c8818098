use bitflags::bitflags;

bitflags! {
    /// Text attribute bits, one per style a markup tag can toggle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StyleFlags: u8 {
        const BOLD    = 0b0000_0001;
        const DIM     = 0b0000_0010;
        const UNDERLINE = 0b0000_0100;
        const ITALIC  = 0b0000_1000;
        const STRIKE  = 0b0001_0000;
        const INVERT  = 0b0010_0000;
    }
}

/// Foreground/background color state, as a tagged enum rather than a
/// sentinel integer (`0`, `30..=37`, `90..=97`, or "use rgb").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    None,
    /// A standard (30-37/90-97) or background (+10) SGR palette code.
    Ansi(u8),
    Rgb(u8, u8, u8),
}

/// Current style register: foreground, background, and attribute flags.
/// Default is "no color, no flags", matching spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub flags: StyleFlags,
}

impl Style {
    /// Writes the SGR escape sequence reflecting this style: a bare reset
    /// followed by one sequence per active property, matching
    /// `op_style_flush`/`op_style_reset` in the original VM exactly (reset
    /// first, then bold/dim/underline/italic/strike/invert, then fg, then
    /// bg).
    pub fn write_sgr(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"\x1b[0m");
        if self.flags.contains(StyleFlags::BOLD) {
            out.extend_from_slice(b"\x1b[1m");
        }
        if self.flags.contains(StyleFlags::DIM) {
            out.extend_from_slice(b"\x1b[2m");
        }
        if self.flags.contains(StyleFlags::UNDERLINE) {
            out.extend_from_slice(b"\x1b[4m");
        }
        if self.flags.contains(StyleFlags::ITALIC) {
            out.extend_from_slice(b"\x1b[3m");
        }
        if self.flags.contains(StyleFlags::STRIKE) {
            out.extend_from_slice(b"\x1b[9m");
        }
        if self.flags.contains(StyleFlags::INVERT) {
            out.extend_from_slice(b"\x1b[7m");
        }
        match self.fg {
            Color::None => {}
            Color::Ansi(code) => out.extend_from_slice(format!("\x1b[{code}m").as_bytes()),
            Color::Rgb(r, g, b) => out.extend_from_slice(format!("\x1b[38;2;{r};{g};{b}m").as_bytes()),
        }
        match self.bg {
            Color::None => {}
            Color::Ansi(code) => out.extend_from_slice(format!("\x1b[{}m", code as u16 + 10).as_bytes()),
            Color::Rgb(r, g, b) => out.extend_from_slice(format!("\x1b[48;2;{r};{g};{b}m").as_bytes()),
        }
    }
}

/// Fixed-capacity LIFO used for the style and padding stacks (capacity 8
/// per spec.md §3). Overflowing pushes are silently dropped; popping an
/// empty stack returns `None`.
#[derive(Debug, Clone)]
pub struct BoundedStack<T, const CAP: usize> {
    items: Vec<T>,
}

impl<T, const CAP: usize> Default for BoundedStack<T, CAP> {
    fn default() -> Self {
        Self { items: Vec::with_capacity(CAP) }
    }
}

impl<T, const CAP: usize> BoundedStack<T, CAP> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: T) {
        if self.items.len() < CAP {
            self.items.push(value);
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
