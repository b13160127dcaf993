//! Token-based terminal renderer.
//!
//! UI text is written with symbolic `{name}` markers (`{h1}`, `{dim_text}`,
//! `{highlight}`, ...) that are expanded to escape sequences from a static
//! table at flush time. A literal `{` is written as `{{`; use [`literal`] for
//! any text that did not originate in this crate.
//!
//! The renderer keeps two buffers: the lines composed for the frame being
//! built and the lines currently on screen. An interactive flush only
//! redraws the rows whose composed text differs from what was drawn last.
//! Cursor movement and clearing go through crossterm commands; the marker
//! table only carries styles.

use std::borrow::Cow;
use std::io::Write;

use crossterm::{
    cursor, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType},
};
use unicode_width::UnicodeWidthChar;

use crate::error::{Error, Result};

/// Marker name to escape sequence.
const TOKENS: &[(&str, &str)] = &[
    ("text", "\x1b[39m"),
    ("dim_text", "\x1b[90m"),
    ("h1", "\x1b[1;33m"),
    ("h2", "\x1b[1;36m"),
    ("highlight", "\x1b[1;33m"),
    ("reset", "\x1b[0m\x1b[39m\x1b[49m"),
    ("reset_bg", "\x1b[49m"),
    ("reset_fg", "\x1b[39m"),
    ("clear_screen", "\x1b[2J"),
    ("clear_line", "\x1b[2K"),
    ("home", "\x1b[H"),
    ("clear_below", "\x1b[0J"),
    ("hide_cursor", "\x1b[?25l"),
    ("show_cursor", "\x1b[?25h"),
    ("start_selected", "\x1b[1m"),
    ("end_selected", "\x1b[0m"),
    ("bold", "\x1b[1m"),
];

/// Returns `true` if `name` (without braces) is a known marker.
pub fn has_token(name: &str) -> bool {
    lookup(name).is_ok()
}

fn lookup(name: &str) -> Result<&'static str> {
    TOKENS
        .iter()
        .find(|(token, _)| *token == name)
        .map(|(_, seq)| *seq)
        .ok_or_else(|| Error::UnknownToken(name.to_string()))
}

/// Escapes `text` so every `{` in it is printed literally.
pub fn literal(text: &str) -> Cow<'_, str> {
    if text.contains('{') {
        Cow::Owned(text.replace('{', "{{"))
    } else {
        Cow::Borrowed(text)
    }
}

enum Piece {
    Char(char),
    Token(&'static str),
}

/// Walks marked-up `text`, reporting each visible character and each
/// marker's escape sequence in order.
fn walk(text: &str, mut emit: impl FnMut(Piece)) -> Result<()> {
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        rest[..open].chars().for_each(|c| emit(Piece::Char(c)));
        let after = &rest[open + 1..];
        if let Some(tail) = after.strip_prefix('{') {
            emit(Piece::Char('{'));
            rest = tail;
            continue;
        }
        let Some(close) = after.find('}') else {
            return Err(Error::UnknownToken(after.to_string()));
        };
        emit(Piece::Token(lookup(&after[..close])?));
        rest = &after[close + 1..];
    }
    rest.chars().for_each(|c| emit(Piece::Char(c)));
    Ok(())
}

/// Expands every marker in `text` to its escape sequence.
pub fn expand_tokens(text: &str) -> Result<String> {
    expand_truncated(text, None)
}

/// Like [`expand_tokens`], but keeps at most `width` terminal columns.
/// Wide glyphs count as two columns. Markers past the cut are still emitted
/// so styles are closed properly.
fn expand_truncated(text: &str, width: Option<usize>) -> Result<String> {
    let limit = width.unwrap_or(usize::MAX);
    let mut out = String::with_capacity(text.len());
    let mut columns = 0usize;
    let mut cut = false;
    walk(text, |piece| match piece {
        Piece::Char(c) if !cut => {
            let w = c.width().unwrap_or(0);
            if columns + w > limit {
                cut = true;
            } else {
                out.push(c);
                columns += w;
            }
        }
        Piece::Char(_) => {}
        Piece::Token(seq) => out.push_str(seq),
    })?;
    Ok(out)
}

/// Removes every marker from `text`, leaving only the visible characters.
pub fn strip_tokens(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    walk(text, |piece| {
        if let Piece::Char(c) = piece {
            out.push(c);
        }
    })?;
    Ok(out)
}

/// Double-buffered line renderer writing to `W`.
pub struct Renderer<W: Write> {
    out: W,
    current_line: String,
    pending: Vec<String>,
    /// Expanded lines as last drawn on screen.
    previous: Vec<String>,
    width: Option<usize>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            current_line: String::new(),
            pending: Vec::new(),
            previous: Vec::new(),
            width: None,
        }
    }

    /// Limits interactive lines to `width` terminal columns.
    pub fn set_width(&mut self, width: Option<usize>) {
        self.width = width;
    }

    /// Appends `text` to the line being built without terminating it.
    pub fn print(&mut self, text: &str) {
        self.current_line.push_str(text);
    }

    /// Appends `text` and terminates the current line.
    pub fn line(&mut self, text: &str) {
        self.current_line.push_str(text);
        self.pending.push(std::mem::take(&mut self.current_line));
    }

    pub fn current_line(&self) -> &str {
        &self.current_line
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Drops every buffered line, including the memory of the last frame.
    pub fn reset(&mut self) {
        self.current_line.clear();
        self.pending.clear();
        self.previous.clear();
    }

    fn take_frame(&mut self) -> Vec<String> {
        let mut lines = std::mem::take(&mut self.pending);
        if !self.current_line.is_empty() {
            lines.push(std::mem::take(&mut self.current_line));
        }
        lines
    }

    /// Writes the pending frame and starts a new one.
    ///
    /// When `interactive` is false (a pipe, a file or a test harness) the
    /// markers are stripped, the lines are written once as plain text ending
    /// in a newline, and the memory of the previous frame is dropped since
    /// there is no screen to diff against.
    ///
    /// When `interactive` is true the cursor is sent home and every row whose
    /// expanded text differs from the last drawn frame is cleared and
    /// redrawn, followed by an attribute reset. Unchanged rows are not
    /// touched, so an identical frame costs a single cursor move.
    ///
    /// # Arguments
    /// * `interactive`: Whether the writer is a live terminal screen.
    ///
    /// # Returns
    /// An error if a line holds an unknown marker or the writer fails. In
    /// that case the pending lines are discarded.
    pub fn flush(&mut self, interactive: bool) -> Result<()> {
        let lines = self.take_frame();
        if !interactive {
            self.previous.clear();
            if lines.is_empty() {
                return Ok(());
            }
            let mut text = lines
                .iter()
                .map(|line| strip_tokens(line))
                .collect::<Result<Vec<_>>>()?
                .join("\n");
            if !text.ends_with('\n') {
                text.push('\n');
            }
            self.out.write_all(text.as_bytes())?;
            self.out.flush()?;
            return Ok(());
        }

        let frame = lines
            .iter()
            .map(|line| expand_truncated(line, self.width))
            .collect::<Result<Vec<_>>>()?;

        let mut buf: Vec<u8> = Vec::new();
        queue!(buf, cursor::MoveTo(0, 0))?;
        for row in 0..frame.len().max(self.previous.len()) {
            let new = frame.get(row).map(String::as_str);
            if new == self.previous.get(row).map(String::as_str) {
                continue;
            }
            queue!(
                buf,
                cursor::MoveTo(0, u16::try_from(row).unwrap_or(u16::MAX)),
                Clear(ClearType::CurrentLine),
                Print(new.unwrap_or("")),
                SetAttribute(Attribute::Reset)
            )?;
        }
        self.out.write_all(&buf)?;
        self.out.flush()?;
        self.previous = frame;
        Ok(())
    }

    /// Forgets all buffered state and clears the whole screen.
    pub fn cls(&mut self) -> Result<()> {
        self.reset();
        queue!(self.out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
        self.out.flush()?;
        Ok(())
    }
}
