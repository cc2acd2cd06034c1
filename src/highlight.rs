//! Syntax highlighting hook and brace matching.
//!
//! Highlighting is a caller-supplied [`Highlighter`]; brace matching is
//! always run by the renderer directly over the configured brace-pair
//! string, independent of any highlighter.

use crate::attr::{Attr, AttrBuffer, Tri};

/// Paints attributes over a buffer's text. The default is a no-op: plain
/// text, no highlighting.
pub trait Highlighter {
    fn highlight(&self, text: &str, attrs: &mut AttrBuffer);
}

/// The highlighter used when none is configured.
pub struct NoHighlighter;

impl Highlighter for NoHighlighter {
    fn highlight(&self, _text: &str, _attrs: &mut AttrBuffer) {}
}

/// Scan `text` for the brace matching the one at byte offset `pos`
/// (assumed to be exactly on an opening or closing brace from `braces`,
/// laid out as open/close pairs e.g. `"()[]{}"`). Returns the matching
/// byte offset and whether the nesting between them is balanced.
pub fn find_matching_brace(text: &str, pos: usize, braces: &str) -> Option<(usize, bool)> {
    let pairs: Vec<(char, char)> = braces
        .chars()
        .collect::<Vec<_>>()
        .chunks(2)
        .filter_map(|c| if c.len() == 2 { Some((c[0], c[1])) } else { None })
        .collect();

    let here = text[pos..].chars().next()?;

    if let Some(&(open, close)) = pairs.iter().find(|(o, _)| *o == here) {
        // Forward scan for the matching close brace.
        let mut depth = 0i32;
        let mut p = pos;
        for ch in text[pos..].chars() {
            if ch == open {
                depth += 1;
            } else if ch == close {
                depth -= 1;
                if depth == 0 {
                    return Some((p, true));
                }
            }
            p += ch.len_utf8();
        }
        return Some((pos, false));
    }

    if let Some(&(open, close)) = pairs.iter().find(|(_, c)| *c == here) {
        // Backward scan for the matching open brace. `depth` starts at 1
        // to account for the close brace at `pos` itself.
        let mut depth = 1i32;
        let before: Vec<(usize, char)> = text[..pos].char_indices().collect();
        for &(p, ch) in before.iter().rev() {
            if ch == close {
                depth += 1;
            } else if ch == open {
                depth -= 1;
                if depth == 0 {
                    return Some((p, true));
                }
            }
        }
        return Some((pos, false));
    }

    None
}

/// Apply a highlight attribute to `pos` and its matching brace if one
/// exists within `text`; if the braces are unbalanced, apply `error_attr`
/// to `pos` alone.
pub fn highlight_match_braces(
    text: &str,
    attrs: &mut AttrBuffer,
    pos: usize,
    braces: &str,
    match_attr: Attr,
    error_attr: Attr,
) {
    let Some(c) = text[pos..].chars().next() else {
        return;
    };
    if !braces.contains(c) {
        return;
    }
    match find_matching_brace(text, pos, braces) {
        Some((match_pos, true)) => {
            let len = c.len_utf8();
            attrs.update_at(pos, len, match_attr);
            let match_len = text[match_pos..].chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            attrs.update_at(match_pos, match_len, match_attr);
        }
        _ => {
            attrs.update_at(pos, c.len_utf8(), error_attr);
        }
    }
}

/// Convenience attribute most highlighters use to flag matched braces.
pub fn default_match_attr() -> Attr {
    Attr::none().with_reverse(Tri::On)
}

/// Convenience attribute most highlighters use to flag an unbalanced
/// brace.
pub fn default_error_attr() -> Attr {
    Attr::none().with_reverse(Tri::On).with_bold(Tri::On)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_matching_close_brace() {
        let (m, balanced) = find_matching_brace("(a(b)c)", 0, "()[]{}").unwrap();
        assert_eq!(m, 6);
        assert!(balanced);
    }

    #[test]
    fn finds_matching_open_brace() {
        let (m, balanced) = find_matching_brace("(a(b)c)", 6, "()[]{}").unwrap();
        assert_eq!(m, 0);
        assert!(balanced);
    }

    #[test]
    fn reports_unbalanced() {
        let (_, balanced) = find_matching_brace("(a(b)c", 0, "()[]{}").unwrap();
        assert!(!balanced);
    }
}
