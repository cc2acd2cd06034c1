//! The completion menu: a small sub-loop entered when more than one
//! candidate survives generation. Lays candidates out as a numbered list
//! or 2/3-column grid depending on how much width they need, caps the
//! visible/selectable set to what that layout can show on screen, and
//! hands any key it doesn't recognize back to the outer editing loop via
//! `Tty::push_back`.

use std::io::{self, Write};

use crate::completers::Completer;
use crate::completion::MAX_COMPLETIONS_TO_SHOW;
use crate::editor::{Editor, HELP_TEXT};
use crate::key::Key;
use crate::tty::Tty;

const DISPLAY2_MAX: usize = 34;
const DISPLAY2_WIDTH: usize = 75;
const DISPLAY3_MAX: usize = 21;
const DISPLAY3_WIDTH: usize = 76;

const LIST_VISIBLE: usize = 9;
const TWO_COLUMN_VISIBLE: usize = 8;
const THREE_COLUMN_VISIBLE: usize = 9;

enum Layout {
    List,
    TwoColumn,
    ThreeColumn,
}

impl Layout {
    /// How many candidates this layout can show at once; selection and
    /// Alt-digit shortcuts never reach past this.
    fn visible_count(&self) -> usize {
        match self {
            Layout::List => LIST_VISIBLE,
            Layout::TwoColumn => TWO_COLUMN_VISIBLE,
            Layout::ThreeColumn => THREE_COLUMN_VISIBLE,
        }
    }
}

fn choose_layout(count: usize, max_width: usize, termw: usize) -> Layout {
    if count > 3 && max_width <= DISPLAY3_MAX && termw >= DISPLAY3_WIDTH {
        Layout::ThreeColumn
    } else if count > 4 && max_width <= DISPLAY2_MAX && termw >= DISPLAY2_WIDTH {
        Layout::TwoColumn
    } else {
        Layout::List
    }
}

/// Run the candidate selection sub-loop. Always leaves the editor ready
/// to resume normal editing: a key the menu doesn't understand is pushed
/// back onto `tty` for the outer loop to see next.
pub fn run(editor: &mut Editor, tty: &mut dyn Tty, out: &mut dyn Write, completer: &mut dyn Completer) -> io::Result<()> {
    let count = editor.completions.count();
    if count == 0 {
        return Ok(());
    }

    let max_width = editor
        .completions
        .iter()
        .map(|c| c.display_text().chars().count())
        .max()
        .unwrap_or(0);
    let layout = choose_layout(count, max_width, editor.termw);
    let visible = layout.visible_count().min(count);
    let more_available = count > visible;

    let mut selected: isize = if editor.config.completion_preview { 0 } else { -1 };

    loop {
        render_menu(out, editor, &layout, selected, visible, more_available)?;

        let ev = tty.read()?;
        match ev.key {
            Key::Esc => {
                editor.completions.clear();
                return Ok(());
            }
            Key::Char(c) if ev.alt && c.is_ascii_digit() && c != '0' => {
                let idx = (c as u8 - b'1') as usize;
                if idx < visible {
                    editor.apply_completion(idx);
                    return Ok(());
                }
            }
            Key::F(1) => {
                print_help(out)?;
            }
            Key::Tab | Key::Down => {
                selected = (selected + 1).rem_euclid(visible as isize);
            }
            Key::BackTab | Key::Up => {
                selected = (selected - 1).rem_euclid(visible as isize);
            }
            Key::Enter | Key::Right | Key::End if selected >= 0 => {
                editor.apply_completion(selected as usize);
                return Ok(());
            }
            Key::PageDown | Key::Linefeed => {
                editor.regenerate_completions_full(completer);
                dump_all(out, editor)?;
                return Ok(());
            }
            _ => {
                if editor.config.completion_preview && selected == 0 {
                    editor.apply_completion(0);
                }
                tty.push_back(ev);
                return Ok(());
            }
        }
    }
}

fn render_menu(
    out: &mut dyn Write,
    editor: &Editor,
    layout: &Layout,
    selected: isize,
    visible: usize,
    more_available: bool,
) -> io::Result<()> {
    writeln!(out)?;
    let per_row = match layout {
        Layout::ThreeColumn => 3,
        Layout::TwoColumn => 2,
        Layout::List => 1,
    };
    for (i, candidate) in editor.completions.iter().take(visible).enumerate() {
        let marker = if i as isize == selected { ">" } else { " " };
        match layout {
            Layout::List => {
                writeln!(out, "{marker} {:2}. {}", i + 1, candidate.display_text())?;
            }
            Layout::TwoColumn | Layout::ThreeColumn => {
                write!(out, "{marker} {:2}. {:width$} ", i + 1, candidate.display_text(), width = DISPLAY2_MAX)?;
                if (i + 1) % per_row == 0 {
                    writeln!(out)?;
                }
            }
        }
    }
    if more_available {
        writeln!(out, "... more (PageDown to list all)")?;
    }
    writeln!(out)?;
    out.flush()
}

fn print_help(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out)?;
    write!(out, "{HELP_TEXT}")?;
    out.flush()
}

fn dump_all(out: &mut dyn Write, editor: &Editor) -> io::Result<()> {
    writeln!(out)?;
    for (i, candidate) in editor.completions.iter().take(MAX_COMPLETIONS_TO_SHOW).enumerate() {
        writeln!(out, "{:4}. {}", i + 1, candidate.display_text())?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_caps_match_visible_counts() {
        assert_eq!(Layout::List.visible_count(), 9);
        assert_eq!(Layout::TwoColumn.visible_count(), 8);
        assert_eq!(Layout::ThreeColumn.visible_count(), 9);
    }

    #[test]
    fn narrow_terminal_falls_back_to_list() {
        assert!(matches!(choose_layout(20, 10, 40), Layout::List));
    }
}
