//! The public, single-threaded entry point: wires the editor, renderer,
//! history, completer and highlighter together into one blocking
//! `read_line` call per line.

use std::io::{self, Write};
use std::time::Duration;

use tracing::trace;

use crate::completers::{Completer, FilenameCompleter};
use crate::config::Config;
use crate::editor::{Editor, Outcome};
use crate::error::Result;
use crate::highlight::{Highlighter, NoHighlighter};
use crate::history::{HistoryView, VecHistory};
use crate::key::Key;
use crate::menu;
use crate::render::{Frame, Renderer};
use crate::tty::{CrosstermTty, Tty};
use crate::unicode::{char_display_width, decode_qutf8, encode_qutf8};

/// A single-process, single-threaded terminal line editor.
pub struct ReadLine {
    tty: Box<dyn Tty>,
    out: Box<dyn Write>,
    editor: Editor,
    history: Box<dyn HistoryView>,
    highlighter: Box<dyn Highlighter>,
    completer: Box<dyn Completer>,
    renderer: Renderer,
}

impl ReadLine {
    /// A `ReadLine` reading/writing the real terminal, with the default
    /// in-memory history, filename completer and no syntax highlighting.
    pub fn new(config: Config) -> io::Result<Self> {
        let tty = CrosstermTty::new();
        let (w, h) = tty.size()?;
        let mut editor = Editor::new(config);
        editor.set_term_size(w as usize, h as usize);
        Ok(Self {
            tty: Box::new(tty),
            out: Box::new(io::stdout()),
            editor,
            history: Box::new(VecHistory::new()),
            highlighter: Box::new(NoHighlighter),
            completer: Box::new(FilenameCompleter::new()),
            renderer: Renderer::new(),
        })
    }

    /// Build a `ReadLine` from injected collaborators, e.g. a
    /// [`crate::tty::MockTty`] and an in-memory `Vec<u8>` writer for
    /// tests.
    pub fn with_parts(
        config: Config,
        tty: Box<dyn Tty>,
        out: Box<dyn Write>,
        history: Box<dyn HistoryView>,
        highlighter: Box<dyn Highlighter>,
        completer: Box<dyn Completer>,
    ) -> Self {
        let mut editor = Editor::new(config);
        if let Ok((w, h)) = tty.size() {
            editor.set_term_size(w as usize, h as usize);
        }
        Self {
            tty,
            out,
            editor,
            history,
            highlighter,
            completer,
            renderer: Renderer::new(),
        }
    }

    pub fn set_history(&mut self, history: Box<dyn HistoryView>) {
        self.history = history;
    }

    pub fn set_highlighter(&mut self, highlighter: Box<dyn Highlighter>) {
        self.highlighter = highlighter;
    }

    pub fn set_completer(&mut self, completer: Box<dyn Completer>) {
        self.completer = completer;
    }

    /// Read one line of input, showing `prompt` at the start of the
    /// first row and the configured continuation marker on wrapped or
    /// multi-line rows. Returns `Ok(None)` on `Ctrl-D` against an empty
    /// buffer or a `Stop` signal, `Ok(Some(text))` otherwise.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.editor.reset_for_new_line();
        self.renderer.reset();
        self.tty.enable_raw_mode()?;
        let result = self.run_loop(prompt);
        self.tty.disable_raw_mode()?;
        result
    }

    fn run_loop(&mut self, prompt: &str) -> Result<Option<String>> {
        let promptw: usize = prompt.chars().map(char_display_width).sum();
        let cpromptw: usize = self.editor.config.cprompt_marker.chars().map(char_display_width).sum();
        self.editor.set_prompt_widths(promptw, cpromptw);
        loop {
            self.editor.refresh_attrs(self.highlighter.as_ref());
            self.editor.refresh_history_hint(self.history.as_ref());
            self.paint(prompt)?;

            let ev = if self.editor.config.hint_enable {
                match self.tty.read_timeout(Duration::from_millis(self.hint_delay_ms()))? {
                    Some(ev) => ev,
                    None => {
                        // Timed out waiting: nothing changed, read again
                        // blocking so we don't spin.
                        self.tty.read()?
                    }
                }
            } else {
                self.tty.read()?
            };

            match self.editor.dispatch(ev, self.history.as_mut(), self.completer.as_mut()) {
                Outcome::Continue => {
                    if let Key::Char('l') = ev.key {
                        if ev.ctrl {
                            self.renderer.reset();
                        }
                    }
                }
                Outcome::Commit(text) => return Ok(Some(decode_qutf8(&encode_qutf8(&text)))),
                Outcome::Eof => return Ok(None),
                Outcome::EnterMenu => {
                    menu::run(&mut self.editor, self.tty.as_mut(), self.out.as_mut(), self.completer.as_mut())?;
                    self.renderer.reset();
                }
                Outcome::ShowHelp => {
                    writeln!(self.out)?;
                    write!(self.out, "{}", crate::editor::HELP_TEXT)?;
                    self.out.flush()?;
                    self.renderer.reset();
                }
            }
        }
    }

    fn hint_delay_ms(&self) -> u64 {
        self.editor.config.hint_delay.as_millis().max(1) as u64
    }

    fn paint(&mut self, prompt: &str) -> Result<()> {
        let input_len = self.editor.text().len();
        let mut text = self.editor.text().to_string();
        text.push_str(self.editor.hint_text());
        let attrs = self.editor.attrs_for(text.len());
        trace!(len = text.len(), cursor = self.editor.cursor(), "render frame");
        self.renderer.refresh(
            self.out.as_mut(),
            Frame {
                prompt,
                cprompt: &self.editor.config.cprompt_marker,
                text: &text,
                attrs: &attrs,
                cursor_pos: self.editor.cursor().min(input_len),
                termw: self.editor.term_width(),
                termh: self.editor.term_height(),
            },
        )?;
        Ok(())
    }

    pub fn add_history_entry(&mut self, entry: impl Into<String>) {
        self.history.push(entry.into());
    }
}
