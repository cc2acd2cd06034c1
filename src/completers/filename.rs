//! Filesystem path completion: the word touching the cursor is split into
//! a directory part and a name prefix, the directory is enumerated, and
//! matching entries become candidates. A longest-common-prefix extension
//! shared by every match is spliced straight into the input, the classic
//! shell-Tab "auto-prefix" behavior.

use std::path::MAIN_SEPARATOR;

use super::Completer;
use crate::buffer::StringBuffer;
use crate::completion::{Candidate, CompletionStore};

#[derive(Default)]
pub struct FilenameCompleter;

impl FilenameCompleter {
    pub fn new() -> Self {
        Self
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

impl Completer for FilenameCompleter {
    fn generate(&mut self, buffer: &mut StringBuffer, pos: usize, store: &mut CompletionStore) -> usize {
        let word_start = buffer.find_ws_word_start(pos);
        let word = buffer.as_str()[word_start..pos].to_string();

        let fname_prefix_rel = word.rfind(MAIN_SEPARATOR).map(|i| i + MAIN_SEPARATOR.len_utf8()).unwrap_or(0);
        let dirname = if fname_prefix_rel == 0 {
            format!(".{}", MAIN_SEPARATOR)
        } else {
            word[..fname_prefix_rel].to_string()
        };
        let fname_prefix = word[fname_prefix_rel..].to_string();

        let cut_start = word_start + fname_prefix_rel;
        store.set_cut_range(cut_start, pos);

        let entries = match std::fs::read_dir(&dirname) {
            Ok(read_dir) => read_dir,
            Err(_) => return pos,
        };

        let show_hidden = fname_prefix.starts_with('.');
        let mut matches: Vec<(String, bool)> = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == "." || name == ".." {
                continue;
            }
            if !show_hidden && name.starts_with('.') {
                continue;
            }
            if !name.starts_with(&fname_prefix) {
                continue;
            }
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            matches.push((name, is_dir));
        }

        let mut pos = pos;
        if matches.len() > 1 {
            let mut lcp = matches[0].0.clone();
            for (name, _) in &matches[1..] {
                let n = common_prefix_len(&lcp, name);
                lcp.truncate(n);
            }
            if lcp.len() > fname_prefix.len() {
                let extra = lcp[fname_prefix.len()..].to_string();
                pos = buffer.insert_at(pos, &extra);
                store.set_cut_range(cut_start, pos);
            }
        }

        for (name, is_dir) in matches {
            let mut replacement = name;
            if is_dir {
                replacement.push(MAIN_SEPARATOR);
            }
            if replacement.chars().any(char::is_whitespace) {
                replacement = format!("'{replacement}'");
            }
            if !store.add(Candidate::new(replacement)) {
                break;
            }
        }

        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn make_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::File::create(dir.path().join("alpha.txt")).unwrap();
        std::fs::File::create(dir.path().join("alphabet.txt")).unwrap();
        std::fs::create_dir(dir.path().join("alphasub")).unwrap();
        dir
    }

    #[test]
    fn completes_and_extends_common_prefix() {
        let dir = make_tree();
        let prefix = dir.path().join("al").to_string_lossy().into_owned();
        let mut buffer = StringBuffer::from_str(&prefix);
        let pos = buffer.len();
        let mut store = CompletionStore::new();
        let mut completer = FilenameCompleter::new();
        let new_pos = completer.generate(&mut buffer, pos, &mut store);

        assert!(buffer.as_str().ends_with("alpha"));
        assert_eq!(new_pos, buffer.len());
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn single_match_yields_one_candidate_with_trailing_separator_for_dirs() {
        let dir = make_tree();
        let prefix = dir.path().join("alphas").to_string_lossy().into_owned();
        let mut buffer = StringBuffer::from_str(&prefix);
        let pos = buffer.len();
        let mut store = CompletionStore::new();
        let mut completer = FilenameCompleter::new();
        completer.generate(&mut buffer, pos, &mut store);

        assert_eq!(store.count(), 1);
        assert!(store.get(0).unwrap().replacement.ends_with(MAIN_SEPARATOR));
    }
}
