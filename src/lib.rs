//! tries: an interactive picker for dated scratch directories.
//!
//! The picker never creates, moves or clones anything itself. It prints a
//! shell script (`mkdir -p ... && cd ...`) which the `try` shell function
//! installed by `try init` evaluates in the user's shell.
//!
//! # Layout
//! - [`render`]: token-based, line-diffing terminal renderer.
//! - [`rank`]: fuzzy subsequence scoring with recency bonuses.
//! - [`keys`]: logical keys from a raw terminal or a fixed script.
//! - [`selector`]: the picker state machine tying the above together.
//! - [`commands`], [`shell`], [`git`], [`init`]: the command layer that turns
//!   a selection into a script.

pub mod cli;
pub mod commands;
pub mod config;
pub mod entries;
pub mod error;
pub mod git;
pub mod init;
pub mod keys;
pub mod rank;
pub mod render;
pub mod selector;
pub mod shell;
pub mod terminal;

pub use entries::CandidateEntry;
pub use error::{Error, Result};
pub use keys::Key;
pub use selector::{SelectionResult, Selector, SessionOptions};
