//! Completion candidates collected by a [`crate::completers::Completer`]
//! and applied back into the edit buffer.

use crate::buffer::StringBuffer;

/// A single completion candidate.
#[derive(Clone)]
pub struct Candidate {
    /// Text that replaces `[cut_start, cut_stop)` in the input when this
    /// candidate is applied.
    pub replacement: String,
    /// What to show in the completion menu, if different from
    /// `replacement` (e.g. a shortened path tail).
    pub display: Option<String>,
    /// One-line help text shown next to `display` in the menu.
    pub help: Option<String>,
}

impl Candidate {
    pub fn new(replacement: impl Into<String>) -> Self {
        Self {
            replacement: replacement.into(),
            display: None,
            help: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn display_text(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.replacement)
    }
}

/// Default cap on the number of candidates a completer is asked to
/// generate before giving up.
pub const MAX_COMPLETIONS_TO_TRY: usize = 250;
/// Hard cap on how many completions the menu will ever show at once.
pub const MAX_COMPLETIONS_TO_SHOW: usize = 1000;

/// The byte range `[cut_start, cut_stop)` of the input that every
/// candidate in the store replaces, plus the ordered candidate list
/// itself.
#[derive(Default)]
pub struct CompletionStore {
    candidates: Vec<Candidate>,
    cut_start: usize,
    cut_stop: usize,
    remaining_budget: isize,
}

impl CompletionStore {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            cut_start: 0,
            cut_stop: 0,
            remaining_budget: MAX_COMPLETIONS_TO_TRY as isize,
        }
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
        self.cut_start = 0;
        self.cut_stop = 0;
        self.remaining_budget = MAX_COMPLETIONS_TO_TRY as isize;
    }

    pub fn set_cut_range(&mut self, start: usize, stop: usize) {
        self.cut_start = start;
        self.cut_stop = stop;
    }

    pub fn cut_start(&self) -> usize {
        self.cut_start
    }

    pub fn cut_stop(&self) -> usize {
        self.cut_stop
    }

    pub fn set_budget(&mut self, n: usize) {
        self.remaining_budget = n as isize;
    }

    pub fn budget_exhausted(&self) -> bool {
        self.remaining_budget <= 0
    }

    pub fn count(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    /// Add a candidate unless its replacement is already present, or the
    /// try-budget is exhausted. Returns whether the caller should keep
    /// generating more (budget not exhausted).
    pub fn add(&mut self, candidate: Candidate) -> bool {
        self.remaining_budget -= 1;
        if self.candidates.len() < MAX_COMPLETIONS_TO_SHOW
            && !self.candidates.iter().any(|c| c.replacement == candidate.replacement)
        {
            self.candidates.push(candidate);
        }
        self.remaining_budget > 0
    }

    /// Sort candidates case-insensitively by their replacement text.
    pub fn sort(&mut self) {
        self.candidates
            .sort_by(|a, b| a.replacement.to_ascii_lowercase().cmp(&b.replacement.to_ascii_lowercase()));
    }

    /// Splice candidate `index`'s replacement into `buffer` over
    /// `[cut_start, cut_stop)`. Returns the new cursor position, or
    /// `None` if the cut range is already exactly the replacement (no-op)
    /// or the index is out of range.
    pub fn apply(&self, index: usize, buffer: &mut StringBuffer) -> Option<usize> {
        let candidate = self.candidates.get(index)?;
        let current = &buffer.as_str()[self.cut_start..self.cut_stop.min(buffer.len())];
        if current == candidate.replacement {
            return None;
        }
        buffer.delete_from_to(self.cut_start, self.cut_stop);
        Some(buffer.insert_at(self.cut_start, &candidate.replacement))
    }

    /// The suffix of candidate `index`'s replacement that hasn't been
    /// typed yet, suitable for display as an inline hint.
    pub fn hint(&self, index: usize, typed_len: usize) -> Option<&str> {
        let candidate = self.candidates.get(index)?;
        candidate.replacement.get(typed_len..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_deduplicates_by_replacement() {
        let mut store = CompletionStore::new();
        assert!(store.add(Candidate::new("foo")));
        store.add(Candidate::new("foo"));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn sort_is_case_insensitive() {
        let mut store = CompletionStore::new();
        store.add(Candidate::new("Zeta"));
        store.add(Candidate::new("alpha"));
        store.sort();
        assert_eq!(store.get(0).unwrap().replacement, "alpha");
        assert_eq!(store.get(1).unwrap().replacement, "Zeta");
    }

    #[test]
    fn apply_splices_replacement_into_cut_range() {
        let mut store = CompletionStore::new();
        store.set_cut_range(2, 5);
        store.add(Candidate::new("foobar"));
        let mut buf = StringBuffer::from_str("ls foo_x");
        let new_pos = store.apply(0, &mut buf).unwrap();
        assert_eq!(buf.as_str(), "ls foobar_x");
        assert_eq!(new_pos, 8);
    }

    #[test]
    fn apply_is_noop_when_replacement_already_present() {
        let mut store = CompletionStore::new();
        store.set_cut_range(0, 3);
        store.add(Candidate::new("foo"));
        let mut buf = StringBuffer::from_str("foo");
        assert_eq!(store.apply(0, &mut buf), None);
        assert_eq!(buf.as_str(), "foo");
    }

    #[test]
    fn budget_runs_out_after_configured_tries() {
        let mut store = CompletionStore::new();
        store.set_budget(2);
        assert!(store.add(Candidate::new("a")));
        assert!(!store.add(Candidate::new("b")));
        assert!(store.budget_exhausted());
    }
}
