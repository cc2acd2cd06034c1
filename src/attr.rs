//! Packed terminal text attributes and the byte-aligned buffer that holds
//! one of them per byte of a [`crate::buffer::StringBuffer`].
//!
//! An [`Attr`] packs into a single `u64` (`color:28, bold:2, reverse:2,
//! bgcolor:28, underline:2, italic:2`) so that a full-buffer attribute
//! array costs one word per byte rather than a struct with padding. The
//! packing never leaks past this module: callers build and read `Attr`
//! values through typed accessors only.

use smallvec::SmallVec;

/// A tri-state flag: unset attributes from one `Attr` never clobber a set
/// attribute from another when merged with [`Attr::update_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tri {
    None,
    Off,
    On,
}

impl Tri {
    fn pack(self) -> u64 {
        match self {
            Tri::None => 0,
            Tri::On => 1,
            Tri::Off => 2,
        }
    }

    fn unpack(bits: u64) -> Tri {
        match bits & 0b11 {
            1 => Tri::On,
            2 => Tri::Off,
            _ => Tri::None,
        }
    }
}

/// An RGB or ANSI-256 color, packed into 28 bits. `0` means "no color set".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(u32);

impl Color {
    pub fn none() -> Self {
        Color(0)
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        // Top bit marks "is set" so that (0,0,0) black is distinguishable
        // from "unset".
        Color(0x800_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub fn ansi256(code: u8) -> Self {
        Color(0x400_0000 | code as u32)
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn to_rgb(self) -> Option<(u8, u8, u8)> {
        if self.0 & 0x800_0000 != 0 {
            let v = self.0 & 0xFF_FFFF;
            Some(((v >> 16) as u8, (v >> 8) as u8, v as u8))
        } else {
            None
        }
    }

    pub fn to_ansi256(self) -> Option<u8> {
        if self.0 & 0x400_0000 != 0 {
            Some((self.0 & 0xFF) as u8)
        } else {
            None
        }
    }

    fn pack(self) -> u64 {
        self.0 as u64 & 0xFFF_FFFF
    }

    fn unpack(bits: u64) -> Color {
        Color((bits & 0xFFF_FFFF) as u32)
    }
}

const COLOR_BITS: u32 = 28;
const BOLD_BITS: u32 = 2;
const REVERSE_BITS: u32 = 2;
const BGCOLOR_BITS: u32 = 28;
const UNDERLINE_BITS: u32 = 2;
#[allow(dead_code)]
const ITALIC_BITS: u32 = 2;

const COLOR_SHIFT: u32 = 0;
const BOLD_SHIFT: u32 = COLOR_SHIFT + COLOR_BITS;
const REVERSE_SHIFT: u32 = BOLD_SHIFT + BOLD_BITS;
const BGCOLOR_SHIFT: u32 = REVERSE_SHIFT + REVERSE_BITS;
const UNDERLINE_SHIFT: u32 = BGCOLOR_SHIFT + BGCOLOR_BITS;
const ITALIC_SHIFT: u32 = UNDERLINE_SHIFT + UNDERLINE_BITS;

/// A single text cell's style: foreground/background color plus the four
/// tri-state decorations. Copy because it is one `u64` word.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Attr(u64);

impl Attr {
    pub fn none() -> Self {
        Attr(0)
    }

    pub fn color(self) -> Color {
        Color::unpack(self.0 >> COLOR_SHIFT)
    }

    pub fn bgcolor(self) -> Color {
        Color::unpack(self.0 >> BGCOLOR_SHIFT)
    }

    pub fn bold(self) -> Tri {
        Tri::unpack(self.0 >> BOLD_SHIFT)
    }

    pub fn reverse(self) -> Tri {
        Tri::unpack(self.0 >> REVERSE_SHIFT)
    }

    pub fn underline(self) -> Tri {
        Tri::unpack(self.0 >> UNDERLINE_SHIFT)
    }

    pub fn italic(self) -> Tri {
        Tri::unpack(self.0 >> ITALIC_SHIFT)
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn with_color(mut self, c: Color) -> Self {
        self.0 = (self.0 & !((0xFFF_FFFFu64) << COLOR_SHIFT)) | (c.pack() << COLOR_SHIFT);
        self
    }

    pub fn with_bgcolor(mut self, c: Color) -> Self {
        self.0 = (self.0 & !((0xFFF_FFFFu64) << BGCOLOR_SHIFT)) | (c.pack() << BGCOLOR_SHIFT);
        self
    }

    pub fn with_bold(mut self, t: Tri) -> Self {
        self.0 = (self.0 & !(0b11u64 << BOLD_SHIFT)) | (t.pack() << BOLD_SHIFT);
        self
    }

    pub fn with_reverse(mut self, t: Tri) -> Self {
        self.0 = (self.0 & !(0b11u64 << REVERSE_SHIFT)) | (t.pack() << REVERSE_SHIFT);
        self
    }

    pub fn with_underline(mut self, t: Tri) -> Self {
        self.0 = (self.0 & !(0b11u64 << UNDERLINE_SHIFT)) | (t.pack() << UNDERLINE_SHIFT);
        self
    }

    pub fn with_italic(mut self, t: Tri) -> Self {
        self.0 = (self.0 & !(0b11u64 << ITALIC_SHIFT)) | (t.pack() << ITALIC_SHIFT);
        self
    }

    /// Merge `other` onto `self`: any field `other` actually sets
    /// (non-`None` tri-states, non-`none()` colors) overrides `self`'s.
    pub fn update_with(self, other: Attr) -> Attr {
        let mut result = self;
        if !other.color().is_none() {
            result = result.with_color(other.color());
        }
        if !other.bgcolor().is_none() {
            result = result.with_bgcolor(other.bgcolor());
        }
        if other.bold() != Tri::None {
            result = result.with_bold(other.bold());
        }
        if other.reverse() != Tri::None {
            result = result.with_reverse(other.reverse());
        }
        if other.underline() != Tri::None {
            result = result.with_underline(other.underline());
        }
        if other.italic() != Tri::None {
            result = result.with_italic(other.italic());
        }
        result
    }
}

impl Default for Attr {
    fn default() -> Self {
        Attr::none()
    }
}

/// Per-byte attribute storage aligned to a [`crate::buffer::StringBuffer`]:
/// `attrs[i]` is the style of the byte at offset `i`.
#[derive(Default)]
pub struct AttrBuffer {
    cells: SmallVec<[Attr; 64]>,
}

impl AttrBuffer {
    pub fn new() -> Self {
        Self {
            cells: SmallVec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Overwrite `n` cells starting at `pos` with `attr`, growing the
    /// buffer if needed.
    pub fn set_at(&mut self, pos: usize, n: usize, attr: Attr) {
        self.ensure_len(pos + n);
        for cell in &mut self.cells[pos..pos + n] {
            *cell = attr;
        }
    }

    /// Merge `attr` onto `n` cells starting at `pos`, leaving already-set
    /// fields those cells have intact.
    pub fn update_at(&mut self, pos: usize, n: usize, attr: Attr) {
        self.ensure_len(pos + n);
        for cell in &mut self.cells[pos..pos + n] {
            *cell = cell.update_with(attr);
        }
    }

    /// Insert `n` fresh cells of `attr` at `pos`, shifting later cells
    /// right.
    pub fn insert_at(&mut self, pos: usize, n: usize, attr: Attr) {
        let pos = pos.min(self.cells.len());
        let mut inserted: SmallVec<[Attr; 64]> = SmallVec::with_capacity(n);
        inserted.resize(n, attr);
        self.cells.insert_many(pos, inserted);
    }

    /// Remove `n` cells starting at `pos`.
    pub fn delete_at(&mut self, pos: usize, n: usize) {
        let end = (pos + n).min(self.cells.len());
        if pos >= end {
            return;
        }
        self.cells.drain(pos..end);
    }

    pub fn attr_at(&self, pos: usize) -> Attr {
        self.cells.get(pos).copied().unwrap_or_else(Attr::none)
    }

    /// The attribute array, zero-padded on the right to `expected_len` if
    /// it is currently shorter (attributes fall behind text edits made
    /// without going through this buffer, e.g. during highlighting).
    pub fn attrs(&self, expected_len: usize) -> Vec<Attr> {
        let mut v: Vec<Attr> = self.cells.iter().copied().collect();
        if v.len() < expected_len {
            v.resize(expected_len, Attr::none());
        } else {
            v.truncate(expected_len);
        }
        v
    }

    fn ensure_len(&mut self, len: usize) {
        if self.cells.len() < len {
            self.cells.resize(len, Attr::none());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn packs_and_unpacks_all_fields() {
        let a = Attr::none()
            .with_color(Color::rgb(10, 20, 30))
            .with_bgcolor(Color::ansi256(5))
            .with_bold(Tri::On)
            .with_reverse(Tri::Off)
            .with_underline(Tri::On)
            .with_italic(Tri::Off);
        assert_eq!(a.color(), Color::rgb(10, 20, 30));
        assert_eq!(a.bgcolor(), Color::ansi256(5));
        assert_eq!(a.bold(), Tri::On);
        assert_eq!(a.reverse(), Tri::Off);
        assert_eq!(a.underline(), Tri::On);
        assert_eq!(a.italic(), Tri::Off);
    }

    #[test]
    fn update_with_only_overrides_set_fields() {
        let base = Attr::none().with_bold(Tri::On).with_color(Color::rgb(1, 2, 3));
        let patch = Attr::none().with_underline(Tri::On);
        let merged = base.update_with(patch);
        assert_eq!(merged.bold(), Tri::On);
        assert_eq!(merged.color(), Color::rgb(1, 2, 3));
        assert_eq!(merged.underline(), Tri::On);
    }

    #[test]
    fn attrs_pads_with_none_on_the_right() {
        let mut buf = AttrBuffer::new();
        buf.set_at(0, 2, Attr::none().with_bold(Tri::On));
        let attrs = buf.attrs(5);
        assert_eq!(attrs.len(), 5);
        assert_eq!(attrs[0].bold(), Tri::On);
        assert!(attrs[4].is_none());
    }

    #[test]
    fn insert_and_delete_shift_cells() {
        let mut buf = AttrBuffer::new();
        buf.set_at(0, 3, Attr::none().with_bold(Tri::On));
        buf.insert_at(1, 2, Attr::none());
        assert_eq!(buf.len(), 5);
        assert!(buf.attr_at(1).is_none());
        assert_eq!(buf.attr_at(3).bold(), Tri::On);
        buf.delete_at(1, 2);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.attr_at(1).bold(), Tri::On);
    }
}
