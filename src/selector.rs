//! The interactive directory picker.
//!
//! A [`Selector`] owns the query being typed, the cursor, a lazily loaded
//! listing of the base directory and the renderer. Each iteration ranks the
//! cached entries against the query, draws one frame, reads one key and
//! applies it, until the user confirms or cancels.
//!
//! The list shown to the user is the ranked entries followed by a synthetic
//! "Create new" row, so the cursor ranges over `0..=entries.len()`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, trace, warn};

use crate::config::date_prefix;
use crate::entries::{CandidateEntry, list_directories};
use crate::error::Result;
use crate::keys::{Key, KeySource, ScriptedKeys, TerminalKeys};
use crate::rank::{ScoredEntry, highlight, rank, split_dated};
use crate::render::{Renderer, literal};
use crate::terminal::{self, RawModeGuard};

const SEPARATOR: &str = "{dim_text}────────────────────────────────────────";
const LEGEND: &str =
    "{dim_text}↑↓/Ctrl-P,N,J,K: Navigate  Enter: Select  Ctrl-D: Delete  ESC: Cancel{reset}";

/// Rows used by everything except the list: header, search line and two
/// separators, the gap before "Create new", and the two footer lines.
const CHROME_ROWS: usize = 8;

/// The only value that confirms a delete.
const CONFIRM_WORD: &str = "YES";

/// How a picker session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionResult {
    /// Jump into an existing directory.
    NavigateTo(PathBuf),
    /// Create this (date-prefixed) directory and jump into it.
    CreateNew(PathBuf),
    Cancelled,
}

/// Construction options for a [`Selector`].
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Initial query; spaces are replaced with hyphens.
    pub query: String,
    /// Replay these keys instead of reading the terminal.
    pub keys: Option<Vec<Key>>,
    /// Pre-authorized answer to the delete prompt. Only `YES` confirms.
    pub confirm: Option<String>,
    /// Draw a single frame and return without reading any key or touching
    /// the terminal mode.
    pub render_once: bool,
    /// Never clear the screen or enter raw mode; output plain text.
    pub no_clear: bool,
}

enum State {
    Running,
    Confirmed(SelectionResult),
    Cancelled,
}

/// Characters that may be typed into the query.
fn is_query_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ')
}

/// Formats how long ago `then` was, e.g. `5m ago` or `2mo ago`.
pub fn format_relative_time(then: SystemTime, now: SystemTime) -> String {
    let seconds = now.duration_since(then).unwrap_or_default().as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    if seconds < 10 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 30 {
        format!("{days}d ago")
    } else if days < 365 {
        format!("{}mo ago", days / 30)
    } else {
        format!("{}y ago", days / 365)
    }
}

/// Renders a directory name for the list. Dated names get a dimmed date;
/// the rest (or the whole undated name) has query matches highlighted.
fn entry_name_markup(name: &str, query: &str) -> String {
    let emphasize = |text: &str| {
        if query.is_empty() {
            literal(text).into_owned()
        } else {
            highlight(text, query)
        }
    };
    match split_dated(name) {
        Some((date, rest)) => {
            let dash = if query.contains('-') {
                "{highlight}-{reset_fg}"
            } else {
                "{dim_text}-{reset_fg}"
            };
            format!("{{dim_text}}{date}{{reset_fg}}{dash}{}", emphasize(rest))
        }
        None => emphasize(name),
    }
}

fn entry_row(scored: &ScoredEntry, query: &str, selected: bool, now: SystemTime) -> String {
    let meta = format!(
        "{}, {:.1}",
        format_relative_time(scored.entry.modified_at, now),
        scored.score
    );
    let mut row = String::from(if selected { "{highlight}→ {reset_fg}" } else { "  " });
    row.push_str("📁 ");
    if selected {
        row.push_str("{start_selected}");
    }
    row.push_str(&entry_name_markup(&scored.entry.name, query));
    row.push(' ');
    if selected {
        row.push_str("{end_selected}");
    }
    row.push_str(&format!("{{dim_text}}{meta}{{reset_fg}}"));
    row
}

fn create_row(query: &str, selected: bool) -> String {
    let mut row = String::from(if selected { "{highlight}→ {reset_fg}" } else { "  " });
    row.push_str("+ ");
    if selected {
        row.push_str("{start_selected}");
    }
    if query.is_empty() {
        row.push_str("Create new");
    } else {
        row.push_str(&format!("Create new: {}", literal(query)));
    }
    if selected {
        row.push_str("{end_selected}");
    }
    row
}

/// One picker session over the subdirectories of a base directory.
pub struct Selector<W: Write> {
    base: PathBuf,
    query: String,
    cursor: usize,
    scroll: usize,
    /// `None` until first loaded and again after a delete.
    cached: Option<Vec<CandidateEntry>>,
    status: Option<String>,
    confirm: Option<String>,
    render_once: bool,
    interactive: bool,
    keys: Box<dyn KeySource>,
    renderer: Renderer<W>,
}

impl<W: Write> Selector<W> {
    /// Creates a session drawing to `out`.
    ///
    /// Without scripted keys the session reads stdin and, unless `no_clear`
    /// is set, draws with escape sequences. Raw mode is only entered by
    /// [`run`](Self::run) when keys are actually read from the terminal.
    pub fn new(base: impl Into<PathBuf>, options: SessionOptions, out: W) -> Self {
        let harness = options.keys.is_some() || options.no_clear;
        let keys: Box<dyn KeySource> = match options.keys {
            Some(keys) => Box::new(ScriptedKeys::new(keys)),
            None => Box::new(TerminalKeys::stdin()),
        };
        Self {
            base: base.into(),
            query: options.query.replace(' ', "-"),
            cursor: 0,
            scroll: 0,
            cached: None,
            status: None,
            confirm: options.confirm,
            render_once: options.render_once,
            interactive: !harness,
            keys,
            renderer: Renderer::new(out),
        }
    }

    /// Replaces the key source, e.g. with a custom reader in a host program.
    pub fn with_key_source(mut self, keys: impl KeySource + 'static) -> Self {
        self.keys = Box::new(keys);
        self
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Everything written by the renderer so far.
    pub fn output(&self) -> &W {
        self.renderer.writer()
    }

    /// Runs the session to completion.
    ///
    /// Each iteration ranks the cached listing against the query, draws one
    /// frame, reads one key and applies it. In render-once mode a single
    /// frame is drawn and no key is read.
    ///
    /// In interactive mode the terminal is put into raw mode for the duration
    /// and the screen is cleared on the way out, whether the loop returned a
    /// result or an error. Harness sessions leave the terminal alone so their
    /// output can be captured as is.
    ///
    /// # Returns
    /// * `Ok(NavigateTo(path))`: the user picked an existing directory.
    /// * `Ok(CreateNew(path))`: the user confirmed the "Create new" row.
    /// * `Ok(Cancelled)`: Escape, Ctrl-C, an empty create or render-once.
    /// * `Err(_)`: raw mode could not be entered or the output failed. A
    ///   scripted key list that runs out is an error too.
    pub fn run(&mut self) -> Result<SelectionResult> {
        if self.render_once {
            let entries = self.ranked();
            self.render(&entries)?;
            return Ok(SelectionResult::Cancelled);
        }
        if !self.interactive {
            return self.run_loop();
        }

        let _guard = RawModeGuard::enter()?;
        let outcome = self.renderer.cls().and_then(|()| self.run_loop());
        let cleared = self.renderer.cls();
        let result = outcome?;
        cleared?;
        Ok(result)
    }

    fn run_loop(&mut self) -> Result<SelectionResult> {
        loop {
            let entries = self.ranked();
            self.clamp_cursor(entries.len() + 1);
            self.render(&entries)?;

            let key = self.keys.read_key()?;
            trace!(?key, cursor = self.cursor, "key");
            match self.apply(key, &entries)? {
                State::Running => {}
                State::Confirmed(result) => {
                    debug!(?result, "selection confirmed");
                    return Ok(result);
                }
                State::Cancelled => {
                    debug!("selection cancelled");
                    return Ok(SelectionResult::Cancelled);
                }
            }
        }
    }

    /// Ranks the cached listing, loading it first if needed.
    fn ranked(&mut self) -> Vec<ScoredEntry> {
        let base = &self.base;
        let entries: &[CandidateEntry] = self.cached.get_or_insert_with(|| list_directories(base));
        rank(entries, &self.query, SystemTime::now())
    }

    fn clamp_cursor(&mut self, total: usize) {
        self.cursor = self.cursor.min(total.saturating_sub(1));
    }

    fn apply(&mut self, key: Key, entries: &[ScoredEntry]) -> Result<State> {
        let total = entries.len() + 1;
        match key {
            Key::Enter => {
                let result = match entries.get(self.cursor) {
                    Some(scored) => SelectionResult::NavigateTo(scored.entry.path.clone()),
                    None => self.create_new(),
                };
                return Ok(State::Confirmed(result));
            }
            Key::Up | Key::Ctrl('p' | 'k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            Key::Down | Key::Ctrl('n' | 'j') => {
                if self.cursor + 1 < total {
                    self.cursor += 1;
                }
            }
            Key::Backspace => {
                if self.query.pop().is_some() {
                    self.cursor = 0;
                }
            }
            Key::Ctrl('d') => {
                if let Some(scored) = entries.get(self.cursor) {
                    self.delete(&scored.entry)?;
                    self.cached = None;
                    debug!("directory cache invalidated");
                }
            }
            Key::Escape | Key::Ctrl('c') => return Ok(State::Cancelled),
            Key::Ctrl('z') => {
                if self.interactive {
                    terminal::suspend()?;
                    self.renderer.cls()?;
                }
            }
            Key::Char(c) if is_query_char(c) => {
                self.query.push(c);
                self.cursor = 0;
            }
            _ => {}
        }
        Ok(State::Running)
    }

    /// The "Create new" row: a dated directory named after the query, or
    /// nothing at all for an empty query.
    fn create_new(&self) -> SelectionResult {
        if self.query.is_empty() {
            return SelectionResult::Cancelled;
        }
        let name = format!("{}-{}", date_prefix(), self.query).replace(' ', "-");
        SelectionResult::CreateNew(self.base.join(name))
    }

    fn delete(&mut self, entry: &CandidateEntry) -> Result<()> {
        let confirmed = match &self.confirm {
            Some(answer) => answer == CONFIRM_WORD,
            None => self.prompt_delete(entry)?,
        };
        if !confirmed {
            self.status = Some("Delete cancelled".to_string());
            return Ok(());
        }
        match fs::remove_dir_all(&entry.path) {
            Ok(()) => {
                info!(path = %entry.path.display(), "deleted directory");
                self.status = Some(format!("Deleted: {}", entry.name));
            }
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "delete failed");
                self.status = Some(format!("Delete failed: {}: {e}", entry.name));
            }
        }
        Ok(())
    }

    /// Asks the user to type the confirmation word.
    fn prompt_delete(&mut self, entry: &CandidateEntry) -> Result<bool> {
        let mut typed = String::new();
        loop {
            self.renderer.line("{h1}Delete Directory");
            self.renderer.line(&format!(
                "Delete {{highlight}}{}{{reset}} and everything in it?",
                literal(&entry.name)
            ));
            self.renderer.line(&format!(
                "Type {CONFIRM_WORD} to confirm: {}",
                literal(&typed)
            ));
            self.renderer.flush(self.interactive)?;
            match self.keys.read_key()? {
                Key::Enter => return Ok(typed == CONFIRM_WORD),
                Key::Escape | Key::Ctrl('c') => return Ok(false),
                Key::Backspace => {
                    typed.pop();
                }
                Key::Char(c) if !c.is_control() => typed.push(c),
                _ => {}
            }
        }
    }

    /// The live terminal size, or `None` when drawing for a harness or a
    /// one-shot snapshot whose layout must not depend on the terminal.
    fn screen_size(&self) -> Option<(usize, usize)> {
        if !self.interactive || self.render_once {
            return None;
        }
        terminal::size()
    }

    /// Number of list rows that fit, or `None` when unlimited.
    fn list_rows(&self) -> Option<usize> {
        self.screen_size()
            .map(|(_, rows)| rows.saturating_sub(CHROME_ROWS).max(1))
    }

    fn render(&mut self, entries: &[ScoredEntry]) -> Result<()> {
        let now = SystemTime::now();
        let total = entries.len() + 1;
        let rows = self.list_rows().unwrap_or(total);
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + rows {
            self.scroll = self.cursor + 1 - rows;
        }
        self.scroll = self.scroll.min(total.saturating_sub(rows));

        let width = self.screen_size().map(|(cols, _)| cols);
        self.renderer.set_width(width);

        self.renderer.line("{h1}📁 Try Directory Selection");
        self.renderer.line(SEPARATOR);
        self.renderer
            .line(&format!("{{highlight}}Search: {{reset}}{}", literal(&self.query)));
        self.renderer.line(SEPARATOR);

        for idx in self.scroll..total.min(self.scroll + rows) {
            let selected = idx == self.cursor;
            match entries.get(idx) {
                Some(scored) => {
                    let row = entry_row(scored, &self.query, selected, now);
                    self.renderer.line(&row);
                }
                None => {
                    if !entries.is_empty() {
                        self.renderer.line("");
                    }
                    let row = create_row(&self.query, selected);
                    self.renderer.line(&row);
                }
            }
        }

        self.renderer.line(SEPARATOR);
        match self.status.take() {
            Some(status) => {
                self.renderer.line("{h1}Delete Directory");
                self.renderer
                    .line(&format!("{{highlight}}{}{{reset}}", literal(&status)));
            }
            None => self.renderer.line(LEGEND),
        }
        self.renderer.flush(self.interactive)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn session(base: &Path, query: &str, keys: Vec<Key>) -> Selector<Vec<u8>> {
        let options = SessionOptions {
            query: query.to_string(),
            keys: Some(keys),
            confirm: Some("YES".to_string()),
            ..SessionOptions::default()
        };
        Selector::new(base, options, Vec::new())
    }

    fn output(selector: &Selector<Vec<u8>>) -> String {
        String::from_utf8_lossy(selector.output()).into_owned()
    }

    #[rstest]
    #[case(5, 0)]
    #[case(0, 3)]
    #[case(20, 20)]
    fn cursor_stays_in_bounds(#[case] ups: usize, #[case] downs: usize) {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["a", "b", "c"] {
            fs::create_dir(tmp.path().join(name)).unwrap();
        }
        let mut keys = vec![Key::Up; ups];
        keys.extend(vec![Key::Down; downs]);
        keys.push(Key::Escape);
        let mut selector = session(tmp.path(), "", keys);
        assert_eq!(selector.run().unwrap(), SelectionResult::Cancelled);
        // Three entries plus the create row.
        assert_eq!(selector.cursor(), downs.min(3));
    }

    #[test]
    fn enter_on_create_row_with_empty_query_cancels() {
        let tmp = tempfile::tempdir().unwrap();
        let mut selector = session(tmp.path(), "", vec![Key::Enter]);
        assert_eq!(selector.run().unwrap(), SelectionResult::Cancelled);
    }

    #[test]
    fn typing_filters_and_resets_cursor() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("alpha")).unwrap();
        fs::create_dir(tmp.path().join("beta")).unwrap();
        let keys = vec![Key::Down, Key::Char('b'), Key::Char('!'), Key::Enter];
        let mut selector = session(tmp.path(), "", keys);
        assert_eq!(
            selector.run().unwrap(),
            SelectionResult::NavigateTo(tmp.path().join("beta"))
        );
        assert_eq!(selector.query(), "b");
    }

    #[test]
    fn backspace_edits_query() {
        let tmp = tempfile::tempdir().unwrap();
        let keys = vec![Key::Backspace, Key::Char('x'), Key::Enter];
        let mut selector = session(tmp.path(), "ab", keys);
        let expected = tmp.path().join(format!("{}-ax", date_prefix()));
        assert_eq!(selector.run().unwrap(), SelectionResult::CreateNew(expected));
    }

    #[test]
    fn seeded_query_spaces_become_hyphens() {
        let tmp = tempfile::tempdir().unwrap();
        let selector = session(tmp.path(), "my new idea", vec![]);
        assert_eq!(selector.query(), "my-new-idea");
    }

    #[test]
    fn delete_cancelled_without_confirmation() {
        let tmp = tempfile::tempdir().unwrap();
        let keep = tmp.path().join("2025-08-14-keep-me");
        fs::create_dir(&keep).unwrap();
        let options = SessionOptions {
            query: "keep".to_string(),
            keys: Some(vec![Key::Ctrl('d'), Key::Escape]),
            confirm: Some("NO".to_string()),
            ..SessionOptions::default()
        };
        let mut selector = Selector::new(tmp.path(), options, Vec::new());
        assert_eq!(selector.run().unwrap(), SelectionResult::Cancelled);
        assert!(keep.exists());
        assert!(output(&selector).contains("Delete cancelled"));
    }

    #[test]
    fn delete_prompt_reads_confirmation_from_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let doomed = tmp.path().join("doomed");
        fs::create_dir(&doomed).unwrap();
        let mut keys = vec![Key::Ctrl('d')];
        keys.extend("YES".chars().map(Key::Char));
        keys.extend([Key::Enter, Key::Escape]);
        let options = SessionOptions {
            keys: Some(keys),
            ..SessionOptions::default()
        };
        let mut selector = Selector::new(tmp.path(), options, Vec::new());
        assert_eq!(selector.run().unwrap(), SelectionResult::Cancelled);
        assert!(!doomed.exists());
        assert!(output(&selector).contains("Type YES to confirm: YES"));
    }

    #[test]
    fn delete_on_create_row_does_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut selector = session(tmp.path(), "", vec![Key::Ctrl('d'), Key::Escape]);
        assert_eq!(selector.run().unwrap(), SelectionResult::Cancelled);
        assert!(!output(&selector).contains("Delete Directory"));
    }

    #[test]
    fn status_is_shown_for_one_frame() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("gone")).unwrap();
        let keys = vec![Key::Ctrl('d'), Key::Char('x'), Key::Escape];
        let mut selector = session(tmp.path(), "", keys);
        selector.run().unwrap();
        let text = output(&selector);
        assert_eq!(text.matches("Deleted: gone").count(), 1);
    }

    #[test]
    fn exhausted_keys_are_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut selector = session(tmp.path(), "", vec![Key::Down]);
        assert!(matches!(
            selector.run(),
            Err(crate::error::Error::KeysExhausted)
        ));
    }

    #[test]
    fn dated_rows_dim_the_date_and_highlight_matches() {
        assert_eq!(
            entry_name_markup("2025-08-14-redis-pool", "pool"),
            "{dim_text}2025-08-14{reset_fg}{dim_text}-{reset_fg}redis-\
             {highlight}p{text}{highlight}o{text}{highlight}o{text}{highlight}l{text}"
        );
        assert!(entry_name_markup("2025-08-14-a-b", "a-b").contains("{highlight}-{reset_fg}"));
    }

    #[test]
    fn undated_rows_highlight_in_place() {
        assert_eq!(
            entry_name_markup("thread-pool", "tp"),
            "{highlight}t{text}hread-{highlight}p{text}ool"
        );
        assert_eq!(entry_name_markup("thread-pool", ""), "thread-pool");
    }

    #[test]
    fn selected_rows_are_marked() {
        let now = SystemTime::now();
        let scored = ScoredEntry {
            entry: CandidateEntry::new(Path::new("/b"), "x", now, now),
            score: 5.0,
        };
        let row = entry_row(&scored, "", true, now);
        assert!(row.starts_with("{highlight}→ {reset_fg}📁 {start_selected}x {end_selected}"));
        assert!(row.ends_with("{dim_text}just now, 5.0{reset_fg}"));
        assert_eq!(create_row("q", false), "  + Create new: q");
    }

    #[rstest]
    #[case(5, "just now")]
    #[case(90, "1m ago")]
    #[case(3 * 3_600, "3h ago")]
    #[case(2 * 86_400, "2d ago")]
    #[case(65 * 86_400, "2mo ago")]
    #[case(800 * 86_400, "2y ago")]
    fn relative_times(#[case] secs: u64, #[case] expected: &str) {
        let now = SystemTime::now();
        assert_eq!(format_relative_time(now - Duration::from_secs(secs), now), expected);
    }
}
