//! Command-line definition for the `try` binary.
//!
//! Besides the user-facing subcommands, hidden `--and-*` flags let tests
//! drive the picker without a terminal.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "try")]
#[command(about = "Quick, dated scratch directories for experiments")]
#[command(
    long_about = "Quick, dated scratch directories for experiments.\n\n\
                  Not meant to be run directly: add `eval \"$(try init ~/src/tries)\"` to your \
                  shell rc file (fish: `eval (try init ~/src/tries | string collect)`)."
)]
#[command(version)]
#[command(arg_required_else_help = true)]
/// Command-line arguments.
pub struct Cli {
    /// Directory holding the tries (default: $TRY_PATH or ~/src/tries)
    #[arg(long, global = true)]
    pub path: Option<String>,

    /// Seed the selector query (testing)
    #[arg(long = "and-type", global = true, hide = true)]
    pub and_type: Option<String>,

    /// Render the selector once and exit (testing)
    #[arg(long = "and-exit", global = true, hide = true)]
    pub and_exit: bool,

    /// Comma separated keys to replay, e.g. `CTRL-J,ENTER` (testing)
    #[arg(long = "and-keys", global = true, hide = true)]
    pub and_keys: Option<String>,

    /// Answer to the delete prompt; only `YES` deletes (testing)
    #[arg(long = "and-confirm", global = true, hide = true)]
    pub and_confirm: Option<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pick a try interactively; also accepts `clone`, `.` and git URIs
    Cd {
        /// Initial search query, or a git URI / `.` with an optional name
        args: Vec<String>,
    },
    /// Clone a git repository into a date-prefixed directory
    Clone {
        /// Repository URI
        uri: String,
        /// Directory name to use instead of `<date>-<user>-<repo>`
        name: Option<String>,
    },
    /// Create a dated directory, adding a detached worktree when the source is a git repo
    Worktree {
        /// `dir` (current directory) or a repository path, then an optional name
        args: Vec<String>,
    },
    /// Print the shell function that wraps this binary
    Init {
        /// Absolute base directory to pin in the function
        path: Option<String>,
    },
}
