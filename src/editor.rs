//! The key-event state machine: owns the input buffer, the inline hint,
//! undo/redo, and dispatches every key the top-level read loop feeds it.

use tracing::debug;

use crate::attr::AttrBuffer;
use crate::buffer::{RowCol, StringBuffer};
use crate::completers::Completer;
use crate::completion::CompletionStore;
use crate::config::Config;
use crate::highlight::{default_error_attr, default_match_attr, find_matching_brace, highlight_match_braces, Highlighter};
use crate::history::HistoryView;
use crate::key::{Key, KeyEvent};
use crate::undo::UndoStack;

/// Short key-binding reference shown on F1, in both normal editing and
/// the completion menu.
pub const HELP_TEXT: &str = "\
Ctrl-D  delete-char-forward / commit at empty buffer
Ctrl-C  delete entire line
Ctrl-G  commit empty line
Ctrl-P/N, Up/Down  history prev/next (row motion inside multiline text)
Alt-.   recall previous command's last word
Ctrl-T  transpose characters
Ctrl-Z, Ctrl-_  undo      Ctrl-Y  redo
Ctrl-A/E, Home/End  line start/end
Ctrl-K/U  kill to end/start of line
Ctrl-W, Alt-Backspace, Alt-D  delete word before/after
Alt-f, Ctrl-Right  word right (or accept one hint word)
Alt-m   jump to matching brace
Tab     complete
Ctrl-L  redraw
F1      this help
";

/// What the outer read loop should do after a dispatched key.
pub enum Outcome {
    Continue,
    Commit(String),
    Eof,
    /// Enter the completion menu sub-loop; candidates are already in
    /// `Editor::completions`.
    EnterMenu,
    /// Show the key-binding help overlay.
    ShowHelp,
}

pub struct Editor {
    pub(crate) input: StringBuffer,
    pub(crate) hint: StringBuffer,
    pub(crate) pos: usize,
    pub(crate) input_attrs: AttrBuffer,
    undo: UndoStack,
    redo: UndoStack,
    modified: bool,
    history_idx: usize,
    /// Which history entry Alt-. last pulled a word from (0 = none yet).
    history_widx: usize,
    /// Where in `input` the last Alt-.-recalled word starts, so a
    /// following Alt-. press replaces it instead of stacking words.
    history_word_start: Option<usize>,
    pub(crate) completions: CompletionStore,
    pub(crate) config: Config,
    pub(crate) termw: usize,
    pub(crate) termh: usize,
    prompt_width: usize,
    cprompt_width: usize,
}

impl Editor {
    pub fn new(config: Config) -> Self {
        Self {
            input: StringBuffer::new(),
            hint: StringBuffer::new(),
            pos: 0,
            input_attrs: AttrBuffer::new(),
            undo: UndoStack::new(),
            redo: UndoStack::new(),
            modified: false,
            history_idx: 0,
            history_widx: 0,
            history_word_start: None,
            completions: CompletionStore::new(),
            config,
            termw: 80,
            termh: 24,
            prompt_width: 0,
            cprompt_width: 0,
        }
    }

    pub fn reset_for_new_line(&mut self) {
        self.input.clear();
        self.hint.clear();
        self.pos = 0;
        self.input_attrs.clear();
        self.undo.clear();
        self.redo.clear();
        self.modified = false;
        self.history_idx = 0;
        self.history_widx = 0;
        self.history_word_start = None;
        self.completions.clear();
    }

    pub fn set_term_size(&mut self, width: usize, height: usize) {
        self.termw = width;
        self.termh = height;
    }

    /// Set the display width of the first-row prompt and the
    /// continuation-row prompt, used for row/column geometry (wrapped
    /// cursor motion, Up/Down row-vs-history gating). The caller
    /// (`ReadLine`) recomputes these each render since the prompt text is
    /// per-call, not part of `Config`.
    pub fn set_prompt_widths(&mut self, promptw: usize, cpromptw: usize) {
        self.prompt_width = promptw;
        self.cprompt_width = cpromptw;
    }

    pub fn text(&self) -> &str {
        self.input.as_str()
    }

    pub fn hint_text(&self) -> &str {
        self.hint.as_str()
    }

    pub fn cursor(&self) -> usize {
        self.pos
    }

    pub fn term_width(&self) -> usize {
        self.termw
    }

    pub fn term_height(&self) -> usize {
        self.termh
    }

    /// Attribute array covering `expected_len` bytes (input followed by
    /// hint), padded on the right with [`crate::attr::Attr::none`].
    pub fn attrs_for(&self, expected_len: usize) -> Vec<crate::attr::Attr> {
        self.input_attrs.attrs(expected_len)
    }

    fn start_modify(&mut self) {
        self.undo.push(self.input.as_str(), self.pos);
        self.redo.clear();
    }

    pub fn undo_once(&mut self) {
        if let Some((text, pos)) = self.undo.pop() {
            self.redo.push(self.input.as_str(), self.pos);
            self.input.replace(&text);
            self.pos = pos.min(self.input.len());
        }
    }

    pub fn redo_once(&mut self) {
        if let Some((text, pos)) = self.redo.pop() {
            self.undo.push(self.input.as_str(), self.pos);
            self.input.replace(&text);
            self.pos = pos.min(self.input.len());
        }
    }

    fn mark_modified(&mut self) {
        self.modified = true;
        self.history_idx = 0;
        self.history_widx = 0;
        self.history_word_start = None;
        self.hint.clear();
    }

    // --- insertion ------------------------------------------------------

    pub fn insert_char(&mut self, c: char) {
        self.start_modify();
        let before = self.pos;
        self.pos = self.input.insert_char_at(self.pos, c);
        self.mark_modified();
        self.auto_brace(before, c);
        if c == '\n' {
            self.auto_indent();
        }
    }

    fn auto_brace(&mut self, typed_at: usize, c: char) {
        if !self.config.braceinsert_enable {
            return;
        }
        let pairs: Vec<(char, char)> = self
            .config
            .auto_braces
            .chars()
            .collect::<Vec<_>>()
            .chunks(2)
            .filter_map(|p| if p.len() == 2 { Some((p[0], p[1])) } else { None })
            .collect();

        if let Some(&(_, close)) = pairs.iter().find(|(open, _)| *open == c) {
            self.input.insert_char_at(self.pos, close);
            let (matched, balanced) =
                crate::highlight::find_matching_brace(self.input.as_str(), typed_at, &self.config.match_braces)
                    .unwrap_or((typed_at, true));
            let _ = matched;
            if !balanced {
                self.input.delete_at(self.pos, close.len_utf8());
            }
            return;
        }
        if pairs.iter().any(|(_, close)| *close == c) {
            // Typing a closer that already exists right where the cursor
            // landed: skip over the existing one instead of duplicating it.
            if self.input.char_at(self.pos) == Some(c) {
                let (next, _) = self.input.next(self.pos.saturating_sub(c.len_utf8())).unwrap_or((self.pos, 0));
                let _ = next;
                self.input.delete_at(typed_at, c.len_utf8());
                self.pos = self.input.next(typed_at).map(|(p, _)| p).unwrap_or(self.pos);
            }
        }
    }

    fn auto_indent(&mut self) {
        if !self.config.multiline || self.config.no_multiline_indent {
            return;
        }
        let nl_pos = match self.input.prev(self.pos) {
            Some((p, _)) if self.input.char_at(p) == Some('\n') => p,
            _ => return,
        };
        let before_nl = match self.input.prev(nl_pos) {
            Some((p, _)) => p,
            None => return,
        };
        if self.input.char_at(before_nl) != Some('{') {
            return;
        }
        if self.input.char_at(self.pos) != Some('}') {
            return;
        }
        self.input.insert_at(self.pos, "  \n");
        self.pos += 2;
    }

    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.start_modify();
        self.pos = self.input.insert_at(self.pos, s);
        self.mark_modified();
    }

    // --- deletion ---------------------------------------------------------

    pub fn delete_char_before(&mut self) {
        if let Some((start, _)) = self.input.prev(self.pos) {
            self.start_modify();
            self.input.delete_from_to(start, self.pos);
            self.pos = start;
            self.mark_modified();
        }
    }

    pub fn delete_char_at(&mut self) {
        if let Some((end, _)) = self.input.next(self.pos) {
            self.start_modify();
            self.input.delete_from_to(self.pos, end);
            self.mark_modified();
        }
    }

    pub fn delete_word_before(&mut self) {
        let start = self.input.find_word_start(self.pos);
        if start < self.pos {
            self.start_modify();
            self.input.delete_from_to(start, self.pos);
            self.pos = start;
            self.mark_modified();
        }
    }

    pub fn delete_word_after(&mut self) {
        let end = self.input.find_word_end(self.pos);
        if end > self.pos {
            self.start_modify();
            self.input.delete_from_to(self.pos, end);
            self.mark_modified();
        }
    }

    pub fn delete_to_end_of_line(&mut self) {
        self.start_modify();
        let line_end = self.input.find_line_end(self.pos);
        if self.pos == line_end {
            if let Some((next, _)) = self.input.next(self.pos) {
                self.input.delete_from_to(self.pos, next);
            }
        } else {
            self.input.delete_from_to(self.pos, line_end);
        }
        self.mark_modified();
    }

    pub fn delete_to_start_of_line(&mut self) {
        self.start_modify();
        let line_start = self.input.find_line_start(self.pos);
        if self.pos == line_start {
            if let Some((prev, _)) = self.input.prev(self.pos) {
                self.input.delete_from_to(prev, self.pos);
                self.pos = prev;
            }
        } else {
            self.input.delete_from_to(line_start, self.pos);
            self.pos = line_start;
        }
        self.mark_modified();
    }

    pub fn delete_all(&mut self) {
        self.start_modify();
        self.input.clear();
        self.pos = 0;
        self.mark_modified();
    }

    pub fn swap_char(&mut self) {
        if self.input.prev(self.pos).is_none() || self.input.next(self.pos).is_none() {
            return;
        }
        self.start_modify();
        if let Some(new_pos) = self.input.swap_char(self.pos) {
            self.pos = new_pos;
            self.mark_modified();
        }
    }

    // --- cursor motion ------------------------------------------------------

    pub fn move_left(&mut self) {
        if let Some((p, _)) = self.input.prev(self.pos) {
            self.pos = p;
        }
    }

    /// Move right one code point; if already at the end of the input and
    /// a history hint is showing, accept just the hint's first code point
    /// instead (the rest of the hint stays as a hint).
    pub fn move_right(&mut self) {
        if !self.hint.is_empty() && self.pos == self.input.len() {
            self.consume_hint_char();
            return;
        }
        if let Some((p, _)) = self.input.next(self.pos) {
            self.pos = p;
        }
    }

    pub fn move_word_left(&mut self) {
        self.pos = self.input.find_word_start(self.pos);
    }

    pub fn move_word_right(&mut self) {
        self.pos = self.input.find_word_end(self.pos);
    }

    /// Move one word right, or if at the end of the input with a hint
    /// showing, accept just the hint's next word (Ctrl-Right / Alt-f).
    pub fn word_right_or_hint(&mut self) {
        if !self.hint.is_empty() && self.pos == self.input.len() {
            self.consume_hint_word();
        } else {
            self.move_word_right();
        }
    }

    pub fn move_line_start(&mut self) {
        self.pos = self.input.find_line_start(self.pos);
    }

    pub fn move_line_end(&mut self) {
        if self.pos == self.input.find_line_end(self.pos) && !self.hint.is_empty() {
            self.consume_hint_all();
            return;
        }
        self.pos = self.input.find_line_end(self.pos);
    }

    pub fn move_buffer_start(&mut self) {
        self.pos = 0;
    }

    pub fn move_buffer_end(&mut self) {
        if !self.hint.is_empty() {
            self.consume_hint_all();
        }
        self.pos = self.input.len();
    }

    /// Accept the whole remaining hint (End / Ctrl-End).
    fn consume_hint_all(&mut self) {
        if self.hint.is_empty() {
            return;
        }
        self.start_modify();
        self.pos = self.input.insert_at(self.pos, self.hint.as_str());
        self.hint.clear();
        self.modified = true;
    }

    /// Accept a single code point off the front of the hint (Right).
    fn consume_hint_char(&mut self) {
        let Some(c) = self.hint.char_at(0) else {
            return;
        };
        self.start_modify();
        self.pos = self.input.insert_char_at(self.pos, c);
        self.hint.delete_at(0, c.len_utf8());
        self.modified = true;
    }

    /// Accept one whitespace-delimited word off the front of the hint
    /// (Ctrl-Right / Alt-f).
    fn consume_hint_word(&mut self) {
        if self.hint.is_empty() {
            return;
        }
        let mut end = self.hint.find_ws_word_end(0);
        if end == 0 {
            end = self.hint.len();
        }
        let word = self.hint.as_str()[..end].to_string();
        self.start_modify();
        self.pos = self.input.insert_at(self.pos, &word);
        self.hint.delete_from_to(0, end);
        self.modified = true;
    }

    /// Jump the cursor to the brace matching the one under, or just
    /// before, the cursor (Alt-m). A no-op if neither position sits on a
    /// configured brace character.
    pub fn jump_to_matching_brace(&mut self) {
        if let Some(c) = self.input.char_at(self.pos) {
            if self.config.match_braces.contains(c) {
                if let Some((m, _)) = find_matching_brace(self.input.as_str(), self.pos, &self.config.match_braces) {
                    self.pos = m;
                }
                return;
            }
        }
        if let Some((before, _)) = self.input.prev(self.pos) {
            if self
                .input
                .char_at(before)
                .map(|c| self.config.match_braces.contains(c))
                .unwrap_or(false)
            {
                if let Some((m, _)) = find_matching_brace(self.input.as_str(), before, &self.config.match_braces) {
                    self.pos = m;
                }
            }
        }
    }

    /// Row/column of the cursor and the total visual row count, under the
    /// last prompt widths set via `set_prompt_widths`.
    fn current_rc(&self) -> (RowCol, usize) {
        self.input
            .get_rc_at_pos(self.termw, self.prompt_width, self.cprompt_width, self.pos)
    }

    fn move_row(&mut self, rc: RowCol, delta: i64) {
        let target = (rc.row as i64 + delta).max(0) as usize;
        self.pos = self
            .input
            .get_pos_at_rc(self.termw, self.prompt_width, self.cprompt_width, target, rc.col);
    }

    /// Up: row-up within wrapped/multiline text, or history-prev if
    /// already on the first visual row.
    pub fn move_up_or_history_prev(&mut self, history: &dyn HistoryView) {
        let (rc, _total) = self.current_rc();
        if rc.row == 0 {
            self.history_prev(history);
        } else {
            self.move_row(rc, -1);
        }
    }

    /// Down: row-down within wrapped/multiline text, or history-next if
    /// already on the last visual row.
    pub fn move_down_or_history_next(&mut self, history: &dyn HistoryView) {
        let (rc, total) = self.current_rc();
        if rc.row + 1 >= total {
            self.history_next(history);
        } else {
            self.move_row(rc, 1);
        }
    }

    // --- history --------------------------------------------------------

    pub fn history_prev(&mut self, history: &dyn HistoryView) {
        self.history_nav(history, 1);
    }

    pub fn history_next(&mut self, history: &dyn HistoryView) {
        if self.history_idx == 0 {
            return;
        }
        if self.history_idx == 1 {
            self.history_idx = 0;
            self.input.clear();
            self.pos = 0;
            self.hint.clear();
            return;
        }
        self.history_nav(history, -1);
    }

    fn history_nav(&mut self, history: &dyn HistoryView, ofs: i64) {
        let prefix = self.input.as_str().to_string();
        let new_idx = self.history_idx as i64 + ofs;
        if new_idx < 1 {
            return;
        }
        let new_idx = new_idx as usize;
        match history.get_with_prefix(new_idx, &prefix) {
            Some(entry) => {
                self.input.replace(&entry);
                self.pos = entry.len();
                self.history_idx = new_idx;
                self.hint.clear();
            }
            None => debug!("history navigation: no entry at {new_idx} for prefix {prefix:?}"),
        }
    }

    /// Recompute the ephemeral "rest of the most recent matching history
    /// entry" hint shown past the cursor. Never touches logical input.
    pub fn refresh_history_hint(&mut self, history: &dyn HistoryView) {
        if !self.config.hint_enable || self.history_idx != 0 {
            return;
        }
        self.hint.clear();
        if self.input.is_empty() {
            return;
        }
        if let Some(entry) = history.get_with_prefix(1, self.input.as_str()) {
            if entry.len() > self.input.len() && entry.starts_with(self.input.as_str()) {
                self.hint.replace(&entry[self.input.len()..]);
            }
        }
    }

    /// Alt-.: insert the last whitespace-delimited word of an
    /// increasingly older history entry at the cursor. Consecutive
    /// presses replace the previously inserted word with one from one
    /// entry further back; any other mutation resets the cycle.
    pub fn history_prev_word(&mut self, history: &dyn HistoryView) {
        let next_widx = self.history_widx + 1;
        let Some(entry) = history.get_with_prefix(next_widx, "") else {
            return;
        };
        let word = last_recall_word(&entry);
        self.start_modify();
        if let Some(start) = self.history_word_start {
            self.input.delete_from_to(start, self.pos);
            self.pos = start;
        }
        let start = self.pos;
        self.pos = self.input.insert_at(self.pos, &word);
        self.history_widx = next_widx;
        self.history_word_start = Some(start);
        self.modified = true;
    }

    // --- completion -------------------------------------------------------

    /// Generate candidates for the word at the cursor. Returns `true` if
    /// the caller should enter the completion menu (more than one
    /// candidate survived); a single candidate is applied immediately.
    pub fn generate_completions(&mut self, completer: &mut dyn Completer) -> bool {
        self.completions.clear();
        self.pos = completer.generate(&mut self.input, self.pos, &mut self.completions);
        self.completions.sort();
        match self.completions.count() {
            0 => false,
            1 => {
                self.apply_completion(0);
                false
            }
            _ => true,
        }
    }

    pub fn apply_completion(&mut self, index: usize) -> bool {
        self.start_modify();
        if let Some(new_pos) = self.completions.apply(index, &mut self.input) {
            self.pos = new_pos;
            self.mark_modified();
            true
        } else {
            false
        }
    }

    /// Re-run the completer with the full `MAX_COMPLETIONS_TO_SHOW`
    /// budget instead of the normal (smaller) try-budget, for the
    /// completion menu's PageDown "expand and dump everything" command.
    pub fn regenerate_completions_full(&mut self, completer: &mut dyn Completer) {
        self.completions.clear();
        self.completions.set_budget(crate::completion::MAX_COMPLETIONS_TO_SHOW);
        self.pos = completer.generate(&mut self.input, self.pos, &mut self.completions);
        self.completions.sort();
    }

    // --- highlighting -----------------------------------------------------

    pub fn refresh_attrs(&mut self, highlighter: &dyn Highlighter) {
        self.input_attrs.clear();
        if self.config.highlight_enable {
            highlighter.highlight(self.input.as_str(), &mut self.input_attrs);
        }
        if self.config.bracematch_enable {
            if let Some((before, _)) = self.input.prev(self.pos) {
                if self
                    .input
                    .char_at(before)
                    .map(|c| self.config.match_braces.contains(c))
                    .unwrap_or(false)
                {
                    highlight_match_braces(
                        self.input.as_str(),
                        &mut self.input_attrs,
                        before,
                        &self.config.match_braces,
                        default_match_attr(),
                        default_error_attr(),
                    );
                }
            }
            if self
                .input
                .char_at(self.pos)
                .map(|c| self.config.match_braces.contains(c))
                .unwrap_or(false)
            {
                highlight_match_braces(
                    self.input.as_str(),
                    &mut self.input_attrs,
                    self.pos,
                    &self.config.match_braces,
                    default_match_attr(),
                    default_error_attr(),
                );
            }
        }
    }

    // --- top-level dispatch -------------------------------------------------

    pub fn dispatch(
        &mut self,
        ev: KeyEvent,
        history: &mut dyn HistoryView,
        completer: &mut dyn Completer,
    ) -> Outcome {
        debug!(key = ?ev.key, ctrl = ev.ctrl, alt = ev.alt, "dispatch key");

        if let Key::Resize(w, h) = ev.key {
            self.set_term_size(w as usize, h as usize);
            return Outcome::Continue;
        }
        if matches!(ev.key, Key::Stop) {
            return Outcome::Eof;
        }

        if ev.is_ctrl('d') {
            if self.input.is_empty() {
                return Outcome::Eof;
            }
            self.delete_char_at();
            return Outcome::Continue;
        }
        if ev.is_ctrl('c') {
            self.delete_all();
            return Outcome::Continue;
        }
        if ev.is_ctrl('g') {
            return Outcome::Commit(String::new());
        }
        if matches!(ev.key, Key::Esc) {
            return Outcome::Continue;
        }
        if matches!(ev.key, Key::F(1)) {
            return Outcome::ShowHelp;
        }

        match ev.key {
            Key::Enter => {
                if let Some(eol) = self.config.multiline_eol {
                    if self.pos == self.input.len() && self.input.as_str().ends_with(eol) {
                        let cut = self.input.len() - eol.len_utf8();
                        self.start_modify();
                        self.input.delete_from_to(cut, self.input.len());
                        self.pos = self.input.insert_char_at(cut, '\n');
                        self.mark_modified();
                        return Outcome::Continue;
                    }
                }
                let text = self.input.as_str().to_string();
                history.push(text.clone());
                Outcome::Commit(text)
            }
            Key::Tab | Key::BackTab => {
                if self.generate_completions(completer) {
                    Outcome::EnterMenu
                } else {
                    Outcome::Continue
                }
            }
            Key::Backspace if ev.alt => {
                self.delete_word_before();
                Outcome::Continue
            }
            Key::Backspace => {
                self.delete_char_before();
                Outcome::Continue
            }
            Key::Delete => {
                self.delete_char_at();
                Outcome::Continue
            }
            Key::Left if ev.ctrl || ev.alt => {
                self.move_word_left();
                Outcome::Continue
            }
            Key::Left => {
                self.move_left();
                Outcome::Continue
            }
            Key::Right if ev.ctrl || ev.alt => {
                self.word_right_or_hint();
                Outcome::Continue
            }
            Key::Right => {
                self.move_right();
                Outcome::Continue
            }
            Key::Up => {
                self.move_up_or_history_prev(history);
                Outcome::Continue
            }
            Key::Down => {
                self.move_down_or_history_next(history);
                Outcome::Continue
            }
            Key::Home if ev.ctrl => {
                self.move_buffer_start();
                Outcome::Continue
            }
            Key::Home => {
                self.move_line_start();
                Outcome::Continue
            }
            Key::End if ev.ctrl => {
                self.move_buffer_end();
                Outcome::Continue
            }
            Key::End => {
                self.move_line_end();
                Outcome::Continue
            }
            Key::Char('a') if ev.ctrl => {
                self.move_line_start();
                Outcome::Continue
            }
            Key::Char('e') if ev.ctrl => {
                self.move_line_end();
                Outcome::Continue
            }
            Key::Char('k') if ev.ctrl => {
                self.delete_to_end_of_line();
                Outcome::Continue
            }
            Key::Char('u') if ev.ctrl => {
                self.delete_to_start_of_line();
                Outcome::Continue
            }
            Key::Char('w') if ev.ctrl => {
                self.delete_word_before();
                Outcome::Continue
            }
            Key::Char('d') if ev.alt => {
                self.delete_word_after();
                Outcome::Continue
            }
            Key::Char('f') if ev.alt => {
                self.word_right_or_hint();
                Outcome::Continue
            }
            Key::Char('m') if ev.alt => {
                self.jump_to_matching_brace();
                Outcome::Continue
            }
            Key::Char('.') if ev.alt => {
                self.history_prev_word(history);
                Outcome::Continue
            }
            Key::Char('p') if ev.ctrl => {
                self.history_prev(history);
                Outcome::Continue
            }
            Key::Char('n') if ev.ctrl => {
                self.history_next(history);
                Outcome::Continue
            }
            Key::Char('t') if ev.ctrl => {
                self.swap_char();
                Outcome::Continue
            }
            Key::Char('z') | Key::Char('_') if ev.ctrl => {
                self.undo_once();
                Outcome::Continue
            }
            Key::Char('y') if ev.ctrl => {
                self.redo_once();
                Outcome::Continue
            }
            Key::Char('l') if ev.ctrl => Outcome::Continue, // redraw: handled by caller resetting the renderer
            Key::Char(c) if !ev.ctrl => {
                self.insert_char(c);
                Outcome::Continue
            }
            _ => Outcome::Continue,
        }
    }
}

/// The rightmost whitespace-delimited word of a history entry, used by
/// Alt-. word recall. If that word starts with a single quote, the quote
/// is assumed to open a token containing whitespace and the word is
/// extended backward to the matching quote.
fn last_recall_word(entry: &str) -> String {
    let buf = StringBuffer::from_str(entry);
    let mut start = buf.find_ws_word_start(entry.len());
    if entry[start..].starts_with('\'') {
        if let Some(rel) = entry[..start].rfind('\'') {
            start = rel;
        }
    }
    entry[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completers::FilenameCompleter;
    use crate::history::VecHistory;
    use pretty_assertions::assert_eq;

    fn key(k: Key) -> KeyEvent {
        KeyEvent::new(k)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(Key::Char(c)).with_ctrl()
    }

    #[test]
    fn typing_and_backspace_round_trip() {
        let mut ed = Editor::new(Config::default());
        let mut history = VecHistory::new();
        let mut completer = FilenameCompleter::new();
        for c in "hi".chars() {
            ed.dispatch(key(Key::Char(c)), &mut history, &mut completer);
        }
        assert_eq!(ed.text(), "hi");
        ed.dispatch(key(Key::Backspace), &mut history, &mut completer);
        assert_eq!(ed.text(), "h");
    }

    #[test]
    fn undo_redo_restores_text_and_cursor() {
        let mut ed = Editor::new(Config::default());
        let mut history = VecHistory::new();
        let mut completer = FilenameCompleter::new();
        ed.dispatch(key(Key::Char('a')), &mut history, &mut completer);
        ed.dispatch(key(Key::Char('b')), &mut history, &mut completer);
        assert_eq!(ed.text(), "ab");
        ed.undo_once();
        assert_eq!(ed.text(), "a");
        ed.undo_once();
        assert_eq!(ed.text(), "");
        ed.redo_once();
        assert_eq!(ed.text(), "a");
    }

    #[test]
    fn ctrl_c_deletes_everything_without_committing() {
        let mut ed = Editor::new(Config::default());
        let mut history = VecHistory::new();
        let mut completer = FilenameCompleter::new();
        ed.dispatch(key(Key::Char('x')), &mut history, &mut completer);
        ed.dispatch(ctrl('c'), &mut history, &mut completer);
        assert_eq!(ed.text(), "");
    }

    #[test]
    fn enter_commits_and_pushes_history() {
        let mut ed = Editor::new(Config::default());
        let mut history = VecHistory::new();
        let mut completer = FilenameCompleter::new();
        ed.dispatch(key(Key::Char('h')), &mut history, &mut completer);
        ed.dispatch(key(Key::Char('i')), &mut history, &mut completer);
        match ed.dispatch(key(Key::Enter), &mut history, &mut completer) {
            Outcome::Commit(text) => assert_eq!(text, "hi"),
            _ => panic!("expected commit"),
        }
        assert_eq!(history.get_with_prefix(1, "").as_deref(), Some("hi"));
    }

    #[test]
    fn ctrl_d_on_empty_buffer_signals_eof() {
        let mut ed = Editor::new(Config::default());
        let mut history = VecHistory::new();
        let mut completer = FilenameCompleter::new();
        match ed.dispatch(ctrl('d'), &mut history, &mut completer) {
            Outcome::Eof => {}
            _ => panic!("expected eof"),
        }
    }

    #[test]
    fn auto_brace_inserts_and_removes_unbalanced_close() {
        let mut ed = Editor::new(Config::default());
        let mut history = VecHistory::new();
        let mut completer = FilenameCompleter::new();
        ed.dispatch(key(Key::Char('(')), &mut history, &mut completer);
        assert_eq!(ed.text(), "()");
        assert_eq!(ed.cursor(), 1);
    }

    #[test]
    fn history_hint_shows_unconsumed_suffix() {
        let mut ed = Editor::new(Config::default());
        let mut history = VecHistory::new();
        history.push("git commit".into());
        ed.dispatch(key(Key::Char('g')), &mut history, &mut FilenameCompleter::new());
        ed.dispatch(key(Key::Char('i')), &mut history, &mut FilenameCompleter::new());
        ed.refresh_history_hint(&history);
        assert_eq!(ed.hint.as_str(), "t commit");
    }

    #[test]
    fn ctrl_g_commits_empty() {
        let mut ed = Editor::new(Config::default());
        let mut history = VecHistory::new();
        let mut completer = FilenameCompleter::new();
        ed.dispatch(key(Key::Char('x')), &mut history, &mut completer);
        match ed.dispatch(ctrl('g'), &mut history, &mut completer) {
            Outcome::Commit(text) => assert_eq!(text, ""),
            _ => panic!("expected commit"),
        }
    }

    #[test]
    fn right_consumes_one_hint_char_end_consumes_all() {
        let mut ed = Editor::new(Config::default());
        let mut history = VecHistory::new();
        history.push("git commit".into());
        ed.dispatch(key(Key::Char('g')), &mut history, &mut FilenameCompleter::new());
        ed.refresh_history_hint(&history);
        assert_eq!(ed.hint.as_str(), "it commit");

        ed.move_right();
        assert_eq!(ed.text(), "gi");
        assert_eq!(ed.hint_text(), "t commit");

        ed.move_buffer_end();
        assert_eq!(ed.text(), "git commit");
        assert_eq!(ed.hint_text(), "");
    }

    #[test]
    fn alt_dot_recalls_last_word_and_cycles_back_further() {
        let mut ed = Editor::new(Config::default());
        let mut history = VecHistory::new();
        history.push("touch alpha.txt".into());
        history.push("rm beta.txt".into());
        let mut completer = FilenameCompleter::new();

        ed.history_prev_word(&history);
        assert_eq!(ed.text(), "beta.txt");

        ed.history_prev_word(&history);
        assert_eq!(ed.text(), "alpha.txt");

        // Any other edit resets the cycle.
        ed.dispatch(key(Key::Char('!')), &mut history, &mut completer);
        assert_eq!(ed.text(), "alpha.txt!");
    }

    #[test]
    fn up_moves_within_multiline_before_recalling_history() {
        let mut ed = Editor::new(Config::default());
        let mut history = VecHistory::new();
        history.push("old entry".into());
        ed.input.replace("first\nsecond");
        ed.pos = ed.input.len();
        ed.set_prompt_widths(2, 0);

        ed.move_up_or_history_prev(&history);
        assert_eq!(ed.text(), "first\nsecond");
        assert!(ed.cursor() < "first\n".len(), "cursor should land on the first line");

        ed.move_up_or_history_prev(&history);
        assert_eq!(ed.text(), "old entry");
    }
}
