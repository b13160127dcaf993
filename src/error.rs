//! Error type shared by the picker, the renderer and the command layer.

use thiserror::Error;

/// Everything that can go wrong inside `tries`.
///
/// User cancellation is not an error; it surfaces as
/// [`SelectionResult::Cancelled`](crate::selector::SelectionResult::Cancelled).
#[derive(Debug, Error)]
pub enum Error {
    /// Generic I/O failure while writing the UI or reading the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The terminal could not be switched into raw mode.
    #[error("cannot set up terminal: {0}")]
    Terminal(std::io::Error),

    /// A style marker with no entry in the token table was rendered.
    #[error("unknown style token: {{{0}}}")]
    UnknownToken(String),

    /// A scripted key sequence ran out before the selector reached a terminal state.
    #[error("scripted key sequence exhausted before the selector finished")]
    KeysExhausted,

    /// A key-script entry did not name a known key.
    #[error("unknown key name: {0}")]
    UnknownKeyName(String),

    /// A git URI that none of the recognised forms could parse.
    #[error("unable to parse git URI: {0}")]
    UnparseableGitUri(String),

    /// A command was invoked without a required argument.
    #[error("{0}")]
    Usage(String),

    /// The home directory could not be determined while expanding `~`.
    #[error("cannot determine home directory")]
    MissingHome,
}

pub type Result<T> = std::result::Result<T, Error>;
