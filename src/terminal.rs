//! Terminal mode handling for the interactive picker.
//!
//! The picker draws on stderr so that stdout stays free for the generated
//! shell script.

use std::io::stderr;

use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};

// Conditionally compile the nix dependency only for unix targets.
#[cfg(unix)]
use nix::sys::signal::{self, Signal};

use crate::error::{Error, Result};

/// Enables raw mode and hides the cursor.
fn set_terminal_mode() -> std::io::Result<()> {
    enable_raw_mode()?;
    execute!(stderr(), cursor::Hide)?;
    Ok(())
}

/// Disables raw mode and shows the cursor again.
fn restore_terminal_mode() {
    // Failure here is not actionable, the process is leaving the picker anyway.
    let _ = disable_raw_mode();
    let _ = execute!(stderr(), cursor::Show);
}

/// Keeps the terminal in raw mode for as long as it is alive.
///
/// Dropping the guard restores the terminal on every path out of the picker,
/// including early returns through `?` and panics.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    /// Enters raw mode. If only part of the setup succeeds it is undone
    /// before the error is returned.
    pub fn enter() -> Result<Self> {
        if let Err(e) = set_terminal_mode() {
            restore_terminal_mode();
            return Err(Error::Terminal(e));
        }
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        restore_terminal_mode();
    }
}

/// Terminal size as `(columns, rows)`, or `None` when it cannot be queried.
pub fn size() -> Option<(usize, usize)> {
    crossterm::terminal::size()
        .ok()
        .filter(|(cols, rows)| *cols > 0 && *rows > 0)
        .map(|(cols, rows)| (cols as usize, rows as usize))
}

/// [Unix-only] Suspends the process on Ctrl-Z.
///
/// The terminal is restored before `SIGTSTP` is raised and raw mode is
/// re-entered once the shell resumes the process with `fg`.
#[cfg(unix)]
pub fn suspend() -> Result<()> {
    restore_terminal_mode();
    signal::raise(Signal::SIGTSTP).map_err(std::io::Error::from)?;
    // ... The process is suspended here ...
    set_terminal_mode().map_err(Error::Terminal)
}

#[cfg(not(unix))]
pub fn suspend() -> Result<()> {
    Ok(())
}
