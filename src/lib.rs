//! In-place terminal line editor.
//!
//! `inkline` is a readline-style core: an edit buffer with undo/redo, a
//! key-event state machine, in-place (non-flickering) multiline
//! rendering, filename completion with a menu, and hooks for history
//! hints and syntax highlighting. It does not own a terminal session by
//! itself beyond what [`ReadLine`] needs for one blocking call per line;
//! wiring it into a REPL, shell, or editor is left to the caller.
//!
//! ```no_run
//! use inkline::{Config, ReadLine};
//!
//! # fn main() -> inkline::error::Result<()> {
//! let mut rl = ReadLine::new(Config::default())?;
//! while let Some(line) = rl.read_line("> ")? {
//!     println!("you typed: {line}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod attr;
pub mod buffer;
pub mod completers;
pub mod completion;
pub mod config;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod history;
pub mod key;
pub mod menu;
pub mod render;
pub mod readline;
pub mod tty;
pub mod undo;
pub mod unicode;

pub use completers::{Completer, FilenameCompleter};
pub use config::Config;
pub use error::{ReadlineError, Result};
pub use highlight::{Highlighter, NoHighlighter};
pub use history::{HistoryView, VecHistory};
pub use readline::ReadLine;
pub use tty::{CrosstermTty, MockTty, Tty};
