//! In-place rendering: repaint only the rows that changed since the last
//! frame instead of redrawing the whole screen, the way a real terminal
//! line editor has to in order to avoid flicker.

use std::io::{self, Write};

use crossterm::cursor::{MoveDown, MoveToColumn, MoveUp};
use crossterm::style::{Attribute as CtAttribute, Color as CtColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;

use crate::attr::{Attr, Color, Tri};
use crate::buffer::StringBuffer;
use crate::unicode::char_display_width;

fn display_width(s: &str) -> usize {
    s.chars().map(char_display_width).sum()
}

/// Everything the renderer needs to paint one frame. `text` is the full
/// logical content (input followed by any inline hint); `cursor_pos` is a
/// byte offset into `text`, typically at the end of the "real" input
/// portion so the hint renders past the cursor without being part of it.
pub struct Frame<'a> {
    pub prompt: &'a str,
    pub cprompt: &'a str,
    pub text: &'a str,
    pub attrs: &'a [Attr],
    pub cursor_pos: usize,
    pub termw: usize,
    pub termh: usize,
}

/// Tracks enough state between calls to move the cursor back to the start
/// of the previous frame before repainting.
#[derive(Default)]
pub struct Renderer {
    prev_window_rows: usize,
    prev_cursor_row: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous frame, e.g. after a terminal resize or a
    /// freshly started session, so the next `refresh` paints from a known
    /// blank state instead of trying to move up into scrollback.
    pub fn reset(&mut self) {
        self.prev_window_rows = 0;
        self.prev_cursor_row = 0;
    }

    pub fn refresh(&mut self, out: &mut dyn Write, frame: Frame<'_>) -> io::Result<()> {
        let promptw = display_width(frame.prompt);
        let cpromptw = display_width(frame.cprompt);
        let termw = frame.termw.max(1);
        let termh = frame.termh.max(1);

        let buf = StringBuffer::from_str(frame.text);
        let (cursor_rc, total_rows) = buf.get_rc_at_pos(termw, promptw, cpromptw, frame.cursor_pos);

        let window_rows = total_rows.min(termh);
        let first_row = if total_rows <= termh {
            0
        } else {
            cursor_rc.row.saturating_sub(termh - 1)
        };

        // Move up to the first row of the previous frame before painting.
        if self.prev_cursor_row > 0 {
            out.queue(MoveUp(self.prev_cursor_row as u16))?;
        }
        out.queue(MoveToColumn(0))?;

        let mut painted = 0usize;
        let mut row_err = Ok(());
        buf.for_each_row(termw, promptw, cpromptw, |text, row, row_start, _startw, _is_wrap| {
            if row < first_row || row >= first_row + window_rows || row_err.is_err() {
                return;
            }
            row_err = (|| -> io::Result<()> {
                if painted > 0 {
                    out.queue(MoveDown(1))?;
                    out.queue(MoveToColumn(0))?;
                }
                out.queue(Clear(ClearType::CurrentLine))?;
                let marker = if row == 0 { frame.prompt } else { frame.cprompt };
                out.write_all(marker.as_bytes())?;
                write_row_with_attrs(out, frame.attrs, text, row_start)?;
                out.queue(SetAttribute(CtAttribute::Reset))?;
                out.queue(Clear(ClearType::UntilNewLine))?;
                Ok(())
            })();
            painted += 1;
        });
        row_err?;

        // Overwrite any stale rows left over from a previous, taller frame.
        while painted < self.prev_window_rows {
            out.queue(MoveDown(1))?;
            out.queue(MoveToColumn(0))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            painted += 1;
        }

        // Move cursor from the last painted row back up to its logical
        // row, then across to its column.
        let cursor_window_row = cursor_rc.row.saturating_sub(first_row);
        let rows_below_cursor = painted.saturating_sub(1).saturating_sub(cursor_window_row);
        if rows_below_cursor > 0 {
            out.queue(MoveUp(rows_below_cursor as u16))?;
        }
        out.queue(MoveToColumn(cursor_rc.col as u16))?;
        out.flush()?;

        self.prev_window_rows = window_rows;
        self.prev_cursor_row = cursor_window_row;
        Ok(())
    }
}

/// Paint one visual row's characters, switching the active style whenever
/// the attribute at the current byte offset changes.
fn write_row_with_attrs(out: &mut dyn Write, attrs: &[Attr], row_text: &str, row_start: usize) -> io::Result<()> {
    let mut pos = row_start;
    let mut current: Option<Attr> = None;
    for c in row_text.chars() {
        let attr = attrs.get(pos).copied().unwrap_or_else(Attr::none);
        if current != Some(attr) {
            queue_attr(out, attr)?;
            current = Some(attr);
        }
        let mut cbuf = [0u8; 4];
        out.write_all(c.encode_utf8(&mut cbuf).as_bytes())?;
        pos += c.len_utf8();
    }
    Ok(())
}

fn queue_attr(out: &mut dyn Write, attr: Attr) -> io::Result<()> {
    out.queue(SetAttribute(CtAttribute::Reset))?;
    if !attr.color().is_none() {
        out.queue(SetForegroundColor(to_crossterm_color(attr.color())))?;
    }
    if attr.bold() == Tri::On {
        out.queue(SetAttribute(CtAttribute::Bold))?;
    }
    if attr.reverse() == Tri::On {
        out.queue(SetAttribute(CtAttribute::Reverse))?;
    }
    if attr.underline() == Tri::On {
        out.queue(SetAttribute(CtAttribute::Underlined))?;
    }
    if attr.italic() == Tri::On {
        out.queue(SetAttribute(CtAttribute::Italic))?;
    }
    Ok(())
}

fn to_crossterm_color(color: Color) -> CtColor {
    match color.to_rgb() {
        Some((r, g, b)) => CtColor::Rgb { r, g, b },
        None => match color.to_ansi256() {
            Some(code) => CtColor::AnsiValue(code),
            None => CtColor::Reset,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Attr;
    use pretty_assertions::assert_eq;

    #[test]
    fn refresh_writes_prompt_and_input() {
        let mut renderer = Renderer::new();
        let mut out: Vec<u8> = Vec::new();
        let attrs = vec![Attr::none(); 5];
        renderer
            .refresh(
                &mut out,
                Frame {
                    prompt: "> ",
                    cprompt: ". ",
                    text: "hello",
                    attrs: &attrs,
                    cursor_pos: 5,
                    termw: 80,
                    termh: 24,
                },
            )
            .unwrap();
        let s = String::from_utf8_lossy(&out);
        assert!(s.contains("> "));
        assert!(s.contains("hello"));
    }
}
