//! Error type returned from the public API.

use thiserror::Error;

/// Everything that can go wrong driving a [`crate::readline::ReadLine`]
/// session.
#[derive(Debug, Error)]
pub enum ReadlineError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The session was asked to stop (e.g. the host process is shutting
    /// down) before the user committed a line.
    #[error("readline session closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, ReadlineError>;
