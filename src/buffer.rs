//! The edit buffer: a UTF-8 byte-addressable string with code-point
//! stepping, word/line boundary search and row/column geometry under
//! terminal wrapping.
//!
//! Every position used by this module and its callers is a **byte**
//! offset into the buffer's text, always landing on a `char` boundary.
//! Stepping by one code point (not by display column) is what [`next`]
//! and [`prev`] do; display width only enters through the row/column
//! geometry helpers at the bottom of this file.

use crate::unicode::char_display_width;

/// An editable, UTF-8-validated line of text.
#[derive(Clone, Default)]
pub struct StringBuffer {
    text: String,
}

impl StringBuffer {
    pub fn new() -> Self {
        Self { text: String::new() }
    }

    pub fn from_str(s: &str) -> Self {
        Self { text: s.to_string() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn replace(&mut self, s: &str) {
        self.text.clear();
        self.text.push_str(s);
    }

    /// Insert `s` at byte offset `pos`, returning the offset just past the
    /// inserted text.
    pub fn insert_at(&mut self, pos: usize, s: &str) -> usize {
        self.text.insert_str(pos, s);
        pos + s.len()
    }

    pub fn insert_char_at(&mut self, pos: usize, c: char) -> usize {
        self.text.insert(pos, c);
        pos + c.len_utf8()
    }

    /// Delete the `n` bytes starting at `pos`.
    pub fn delete_at(&mut self, pos: usize, n: usize) {
        let end = (pos + n).min(self.text.len());
        if pos >= end {
            return;
        }
        self.text.replace_range(pos..end, "");
    }

    pub fn delete_from_to(&mut self, start: usize, end: usize) {
        let (start, end) = (start.min(end), start.max(end));
        self.delete_at(start, end - start);
    }

    pub fn delete_from(&mut self, pos: usize) {
        let len = self.text.len();
        self.delete_at(pos, len.saturating_sub(pos));
    }

    /// Split the buffer's text at `pos` without mutating it.
    pub fn split_at(&self, pos: usize) -> (&str, &str) {
        self.text.split_at(pos)
    }

    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.text[pos..].chars().next()
    }

    /// Step one code point forward from `pos`, returning the new offset
    /// and the display width of the code point stepped over. `None` at
    /// end of buffer.
    pub fn next(&self, pos: usize) -> Option<(usize, usize)> {
        let c = self.char_at(pos)?;
        Some((pos + c.len_utf8(), char_display_width(c)))
    }

    /// Step one code point backward from `pos`. `None` at the start of the
    /// buffer.
    pub fn prev(&self, pos: usize) -> Option<(usize, usize)> {
        if pos == 0 {
            return None;
        }
        let before = &self.text[..pos];
        let c = before.chars().next_back()?;
        let new_pos = pos - c.len_utf8();
        Some((new_pos, char_display_width(c)))
    }

    /// Replace the code point ending at `pos` with the one starting at
    /// `pos`, i.e. transpose the two characters around `pos`. Returns the
    /// new cursor position (after the swapped pair), or `None` if there
    /// aren't two code points to swap.
    pub fn swap_char(&mut self, pos: usize) -> Option<usize> {
        let (before, _) = self.prev(pos)?;
        let (after, _) = self.next(pos)?;
        let a = self.text[before..pos].to_string();
        let b = self.text[pos..after].to_string();
        self.text.replace_range(before..after, &(b + &a));
        Some(after)
    }

    fn is_word_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    /// Start of the identifier-class word touching or immediately before
    /// `pos`.
    pub fn find_word_start(&self, pos: usize) -> usize {
        let mut p = pos;
        while let Some((np, _)) = self.prev(p) {
            if Self::is_word_char(self.char_at(np).unwrap()) {
                break;
            }
            p = np;
        }
        while let Some((np, _)) = self.prev(p) {
            if !Self::is_word_char(self.char_at(np).unwrap()) {
                break;
            }
            p = np;
        }
        p
    }

    /// End of the identifier-class word touching or immediately after
    /// `pos`.
    pub fn find_word_end(&self, pos: usize) -> usize {
        let mut p = pos;
        while let Some(c) = self.char_at(p) {
            if Self::is_word_char(c) {
                break;
            }
            p = self.next(p).unwrap().0;
        }
        while let Some(c) = self.char_at(p) {
            if !Self::is_word_char(c) {
                break;
            }
            p = self.next(p).unwrap().0;
        }
        p
    }

    /// Start of the whitespace-delimited "word" touching or before `pos`
    /// (used for history word-recall and filename completion).
    pub fn find_ws_word_start(&self, pos: usize) -> usize {
        let mut p = pos;
        while let Some((np, _)) = self.prev(p) {
            if !self.char_at(np).unwrap().is_whitespace() {
                break;
            }
            p = np;
        }
        while let Some((np, _)) = self.prev(p) {
            if self.char_at(np).unwrap().is_whitespace() {
                break;
            }
            p = np;
        }
        p
    }

    pub fn find_ws_word_end(&self, pos: usize) -> usize {
        let mut p = pos;
        while let Some(c) = self.char_at(p) {
            if !c.is_whitespace() {
                break;
            }
            p = self.next(p).unwrap().0;
        }
        while let Some(c) = self.char_at(p) {
            if c.is_whitespace() {
                break;
            }
            p = self.next(p).unwrap().0;
        }
        p
    }

    /// Byte offset just after the nearest preceding `\n`, or `0`.
    pub fn find_line_start(&self, pos: usize) -> usize {
        self.text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    /// Byte offset of the next `\n`, or end of buffer.
    pub fn find_line_end(&self, pos: usize) -> usize {
        self.text[pos..]
            .find('\n')
            .map(|i| pos + i)
            .unwrap_or(self.text.len())
    }

    // --- row/column geometry -------------------------------------------------

    fn build_rows(&self, termw: usize, promptw: usize, cpromptw: usize) -> Vec<RowSpan> {
        let termw = termw.max(1);
        let mut rows = Vec::new();
        let mut row_start = 0usize;
        let mut col = promptw;
        let mut row_startw = promptw;
        let mut pos = 0usize;
        let bytes = self.text.as_str();
        let mut chars = bytes.char_indices().peekable();
        while let Some(&(idx, c)) = chars.peek() {
            debug_assert_eq!(idx, pos);
            if c == '\n' {
                chars.next();
                pos += c.len_utf8();
                rows.push(RowSpan {
                    start: row_start,
                    len: pos - row_start,
                    startw: row_startw,
                });
                row_start = pos;
                row_startw = cpromptw;
                col = cpromptw;
                continue;
            }
            let w = char_display_width(c);
            if col + w > termw && col > row_startw {
                rows.push(RowSpan {
                    start: row_start,
                    len: pos - row_start,
                    startw: row_startw,
                });
                row_start = pos;
                row_startw = cpromptw;
                col = cpromptw;
                continue;
            }
            chars.next();
            pos += c.len_utf8();
            col += w;
        }
        rows.push(RowSpan {
            start: row_start,
            len: pos - row_start,
            startw: row_startw,
        });
        rows
    }

    /// Row/column of `pos` and the total row count, wrapping at `termw`
    /// columns with `promptw` reserved on row 0 and `cpromptw` on
    /// continuation rows.
    pub fn get_rc_at_pos(
        &self,
        termw: usize,
        promptw: usize,
        cpromptw: usize,
        pos: usize,
    ) -> (RowCol, usize) {
        let rows = self.build_rows(termw, promptw, cpromptw);
        rc_from_rows(&rows, &self.text, pos)
    }

    /// Same as [`get_rc_at_pos`] but against a possibly different
    /// (post-resize) terminal width; the buffer's geometry is always
    /// recomputed from the full text, so the "old" width need not be
    /// tracked separately.
    pub fn get_wrapped_rc_at_pos(
        &self,
        new_termw: usize,
        promptw: usize,
        cpromptw: usize,
        pos: usize,
    ) -> (RowCol, usize) {
        self.get_rc_at_pos(new_termw, promptw, cpromptw, pos)
    }

    /// The byte offset of the character at `(row, col)`, clamped to the
    /// buffer's actual geometry.
    pub fn get_pos_at_rc(
        &self,
        termw: usize,
        promptw: usize,
        cpromptw: usize,
        row: usize,
        col: usize,
    ) -> usize {
        let rows = self.build_rows(termw, promptw, cpromptw);
        let r = row.min(rows.len().saturating_sub(1));
        let span = &rows[r];
        let mut w = span.startw;
        let mut p = span.start;
        let row_end = span.start + span.len;
        while p < row_end {
            if w >= col {
                return p;
            }
            let c = self.char_at(p).unwrap();
            if c == '\n' {
                return p;
            }
            w += char_display_width(c);
            p += c.len_utf8();
        }
        p.min(self.text.len())
    }

    /// Invoke `f` once per visual row with `(text slice, row index, byte
    /// start, start column, is this row continued from a wrap (not a
    /// hard newline))`. Returns the total number of rows.
    pub fn for_each_row<F: FnMut(&str, usize, usize, usize, bool)>(
        &self,
        termw: usize,
        promptw: usize,
        cpromptw: usize,
        mut f: F,
    ) -> usize {
        let rows = self.build_rows(termw, promptw, cpromptw);
        for (i, span) in rows.iter().enumerate() {
            let mut end = span.start + span.len;
            // Exclude a trailing hard newline from the emitted slice.
            if end > span.start && self.text.as_bytes()[end - 1] == b'\n' {
                end -= 1;
            }
            let is_wrap = i > 0 && self.text.as_bytes().get(span.start.wrapping_sub(1)) != Some(&b'\n');
            f(&self.text[span.start..end], i, span.start, span.startw, is_wrap);
        }
        rows.len()
    }
}

struct RowSpan {
    start: usize,
    len: usize,
    startw: usize,
}

/// Row/column location of a buffer position, plus whether it sits exactly
/// at the start or end of its visual row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowCol {
    pub row: usize,
    pub col: usize,
    pub first_on_row: bool,
    pub last_on_row: bool,
}

fn rc_from_rows(rows: &[RowSpan], text: &str, pos: usize) -> (RowCol, usize) {
    for (i, span) in rows.iter().enumerate() {
        let row_end = span.start + span.len;
        let matches = if pos == 0 {
            i == 0
        } else {
            pos >= span.start && pos <= row_end
        };
        if matches {
            let mut w = span.startw;
            let mut p = span.start;
            while p < pos {
                let c = text[p..].chars().next().unwrap();
                w += char_display_width(c);
                p += c.len_utf8();
            }
            let rc = RowCol {
                row: i,
                col: w,
                first_on_row: pos == span.start,
                last_on_row: pos == row_end,
            };
            return (rc, rows.len());
        }
    }
    let last = rows.len() - 1;
    (
        RowCol {
            row: last,
            col: rows[last].startw,
            first_on_row: true,
            last_on_row: true,
        },
        rows.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_and_delete_stay_on_char_boundaries() {
        let mut b = StringBuffer::from_str("hé");
        let end = b.insert_at(1, "llo");
        assert_eq!(b.as_str(), "hlloé");
        assert_eq!(end, 4);
        b.delete_at(1, 3);
        assert_eq!(b.as_str(), "hé");
    }

    #[test]
    fn next_and_prev_step_by_code_point() {
        let b = StringBuffer::from_str("a\u{4E2D}b");
        let (p1, w1) = b.next(0).unwrap();
        assert_eq!(w1, 1);
        let (p2, w2) = b.next(p1).unwrap();
        assert_eq!(w2, 2);
        assert_eq!(b.char_at(p2), Some('b'));
        let (back, _) = b.prev(p2).unwrap();
        assert_eq!(back, p1);
    }

    #[test]
    fn word_start_and_end_skip_punctuation() {
        let b = StringBuffer::from_str("foo, bar");
        assert_eq!(b.find_word_start(8), 5); // start of "bar"
        assert_eq!(b.find_word_end(0), 3); // end of "foo"
    }

    #[test]
    fn ws_word_boundaries_treat_punctuation_as_part_of_word() {
        let b = StringBuffer::from_str("./foo/bar baz");
        assert_eq!(b.find_ws_word_start(9), 0);
        assert_eq!(b.find_ws_word_end(0), 9);
    }

    #[test]
    fn line_boundaries_respect_embedded_newlines() {
        let b = StringBuffer::from_str("one\ntwo\nthree");
        assert_eq!(b.find_line_start(5), 4);
        assert_eq!(b.find_line_end(5), 7);
    }

    #[test]
    fn rc_at_pos_wraps_at_terminal_width() {
        let b = StringBuffer::from_str("abcdef");
        let (rc, rows) = b.get_rc_at_pos(4, 2, 0, 6);
        // prompt width 2 + "ab" fills row 0 (4 cols), "cdef" wraps to row 1.
        assert_eq!(rows, 2);
        assert_eq!(rc.row, 1);
    }

    #[test]
    fn rc_at_pos_advances_row_on_newline() {
        let b = StringBuffer::from_str("ab\ncd");
        let (rc, rows) = b.get_rc_at_pos(80, 2, 0, 4);
        assert_eq!(rows, 2);
        assert_eq!(rc.row, 1);
        assert_eq!(rc.col, 1);
    }

    #[test]
    fn swap_char_transposes_adjacent_code_points() {
        let mut b = StringBuffer::from_str("ab");
        let new_pos = b.swap_char(1).unwrap();
        assert_eq!(b.as_str(), "ba");
        assert_eq!(new_pos, 2);
    }
}
