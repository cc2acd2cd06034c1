//! Editor configuration. Every knob is a builder-style setter on
//! [`Config`] rather than a free-standing flag, so defaults live in one
//! place and callers only override what they need.

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) prompt_marker: String,
    pub(crate) cprompt_marker: String,
    pub(crate) multiline: bool,
    pub(crate) multiline_eol: Option<char>,
    pub(crate) two_line_prompt: bool,
    pub(crate) hint_delay: Duration,
    pub(crate) hint_enable: bool,
    pub(crate) highlight_enable: bool,
    pub(crate) bracematch_enable: bool,
    pub(crate) braceinsert_enable: bool,
    pub(crate) match_braces: String,
    pub(crate) auto_braces: String,
    pub(crate) completion_preview: bool,
    pub(crate) no_multiline_indent: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt_marker: "> ".to_string(),
            cprompt_marker: ". ".to_string(),
            multiline: true,
            multiline_eol: Some('\\'),
            two_line_prompt: false,
            hint_delay: Duration::from_millis(0),
            hint_enable: true,
            highlight_enable: true,
            bracematch_enable: true,
            braceinsert_enable: true,
            match_braces: "()[]{}".to_string(),
            auto_braces: "()[]{}\"\"''".to_string(),
            completion_preview: true,
            no_multiline_indent: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt_marker(mut self, marker: impl Into<String>) -> Self {
        self.prompt_marker = marker.into();
        self
    }

    pub fn with_continuation_marker(mut self, marker: impl Into<String>) -> Self {
        self.cprompt_marker = marker.into();
        self
    }

    pub fn with_multiline(mut self, enable: bool) -> Self {
        self.multiline = enable;
        self
    }

    /// The character that, typed at the end of a line, signals a soft
    /// line continuation and is replaced by a real `\n` on submit. `None`
    /// disables the feature.
    pub fn with_multiline_eol(mut self, eol: Option<char>) -> Self {
        self.multiline_eol = eol;
        self
    }

    pub fn with_two_line_prompt(mut self, enable: bool) -> Self {
        self.two_line_prompt = enable;
        self
    }

    pub fn with_hint_delay(mut self, delay: Duration) -> Self {
        self.hint_delay = delay;
        self
    }

    pub fn with_hint_enable(mut self, enable: bool) -> Self {
        self.hint_enable = enable;
        self
    }

    pub fn with_highlight_enable(mut self, enable: bool) -> Self {
        self.highlight_enable = enable;
        self
    }

    pub fn with_bracematch_enable(mut self, enable: bool) -> Self {
        self.bracematch_enable = enable;
        self
    }

    pub fn with_braceinsert_enable(mut self, enable: bool) -> Self {
        self.braceinsert_enable = enable;
        self
    }

    pub fn with_match_braces(mut self, braces: impl Into<String>) -> Self {
        self.match_braces = braces.into();
        self
    }

    pub fn with_auto_braces(mut self, braces: impl Into<String>) -> Self {
        self.auto_braces = braces.into();
        self
    }

    pub fn with_completion_preview(mut self, enable: bool) -> Self {
        self.completion_preview = enable;
        self
    }

    pub fn with_no_multiline_indent(mut self, enable: bool) -> Self {
        self.no_multiline_indent = enable;
        self
    }
}
