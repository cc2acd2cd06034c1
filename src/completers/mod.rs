//! Pluggable completion providers.

mod filename;

pub use filename::FilenameCompleter;

use crate::buffer::StringBuffer;
use crate::completion::CompletionStore;

/// Generates candidates for the word around the cursor. Implementors call
/// [`CompletionStore::add`] until it returns `false` or they run out of
/// candidates, then leave sorting to the caller (the editor sorts once
/// before entering the menu).
///
/// A completer may splice a longest-common-prefix extension directly into
/// `buffer` before returning (the classic shell-Tab "auto-prefix"
/// behavior); the returned cursor position reflects any such edit.
pub trait Completer {
    fn generate(
        &mut self,
        buffer: &mut StringBuffer,
        pos: usize,
        store: &mut CompletionStore,
    ) -> usize;
}
