//! End-to-end picker sessions over a temporary base directory.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use tries::config::date_prefix;
use tries::keys::{KeySource, ScriptedKeys, TerminalKeys};
use tries::{Key, SelectionResult, Selector, SessionOptions};

#[fixture]
fn base() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn make_dir(base: &Path, name: &str, age: Duration) {
    let path = base.join(name);
    fs::create_dir(&path).unwrap();
    File::open(&path)
        .unwrap()
        .set_modified(SystemTime::now() - age)
        .unwrap();
}

fn scripted(query: &str, keys: Vec<Key>) -> SessionOptions {
    SessionOptions {
        query: query.to_string(),
        keys: Some(keys),
        ..SessionOptions::default()
    }
}

fn text(selector: &Selector<Vec<u8>>) -> String {
    String::from_utf8_lossy(selector.output()).into_owned()
}

#[rstest]
fn render_once_lists_matches_and_create_row(base: TempDir) {
    make_dir(base.path(), "2025-08-14-redis-connection-pool", Duration::ZERO);
    make_dir(base.path(), "thread-pool", Duration::ZERO);
    let options = SessionOptions {
        query: "pool".to_string(),
        render_once: true,
        no_clear: true,
        ..SessionOptions::default()
    };

    let mut selector = Selector::new(base.path(), options, Vec::new());
    assert_eq!(selector.run().unwrap(), SelectionResult::Cancelled);

    let out = text(&selector);
    assert!(out.contains("Try Directory Selection"));
    assert!(out.contains("Search: pool"));
    assert!(out.contains("2025-08-14-redis-connection-pool"));
    assert!(out.contains("thread-pool"));
    assert!(out.contains("Create new: pool"));
    assert!(!out.contains('\x1b'), "plain output must not carry escapes");
}

#[rstest]
fn render_once_highlights_matched_characters(base: TempDir) {
    make_dir(base.path(), "2025-08-14-redis-connection-pool", Duration::ZERO);
    make_dir(base.path(), "thread-pool", Duration::ZERO);
    let options = SessionOptions {
        query: "pool".to_string(),
        render_once: true,
        ..SessionOptions::default()
    };

    let mut selector = Selector::new(base.path(), options, Vec::new());
    selector.run().unwrap();

    let out = text(&selector);
    let highlighted_p = "\x1b[1;33mp\x1b[39m";
    assert!(out.contains(highlighted_p));
    // The dated entry's date is dimmed.
    assert!(out.contains("\x1b[90m2025-08-14\x1b[39m"));
    assert!(out.contains("Create new: pool"));
}

#[rstest]
fn render_once_ignores_terminal_height(base: TempDir) {
    for n in 0..60 {
        make_dir(base.path(), &format!("scratch-{n:02}"), Duration::ZERO);
    }
    let options = SessionOptions {
        render_once: true,
        ..SessionOptions::default()
    };

    let mut selector = Selector::new(base.path(), options, Vec::new());
    selector.run().unwrap();

    let out = text(&selector);
    for n in 0..60 {
        assert!(out.contains(&format!("scratch-{n:02}")), "scratch-{n:02} missing");
    }
    assert!(out.contains("Create new"));
}

#[rstest]
fn enter_on_empty_list_creates_dated_directory(base: TempDir) {
    let mut selector = Selector::new(base.path(), scripted("new-thing", vec![Key::Enter]), Vec::new());
    let expected = base.path().join(format!("{}-new-thing", date_prefix()));
    assert_eq!(selector.run().unwrap(), SelectionResult::CreateNew(expected));
    // The picker only reports; nothing was created.
    assert_eq!(fs::read_dir(base.path()).unwrap().count(), 0);
}

#[rstest]
fn delete_removes_directory_and_reports_once(base: TempDir) {
    let name = "2025-08-14-delete-me";
    make_dir(base.path(), name, Duration::ZERO);
    let options = SessionOptions {
        confirm: Some("YES".to_string()),
        ..scripted("delete-me", vec![Key::Ctrl('d'), Key::Escape])
    };

    let mut selector = Selector::new(base.path(), options, Vec::new());
    assert_eq!(selector.run().unwrap(), SelectionResult::Cancelled);

    assert!(!base.path().join(name).exists());
    let out = text(&selector);
    assert!(out.contains("Delete Directory"));
    assert_eq!(out.matches(&format!("Deleted: {name}")).count(), 1);
    // After the reload the entry is gone from the list.
    let last_frame = out.rsplit("Try Directory Selection").next().unwrap();
    assert!(!last_frame.contains("delete-me "));
}

/// Removes `target` from disk just before handing out Ctrl-D, as if another
/// process got there first.
struct RemovedUnderneath {
    keys: ScriptedKeys,
    target: PathBuf,
}

impl KeySource for RemovedUnderneath {
    fn read_key(&mut self) -> tries::Result<Key> {
        let key = self.keys.read_key()?;
        if key == Key::Ctrl('d') {
            fs::remove_dir_all(&self.target)?;
        }
        Ok(key)
    }
}

#[rstest]
fn failed_delete_is_reported_and_the_session_goes_on(base: TempDir) {
    let name = "2025-08-14-vanishing";
    make_dir(base.path(), name, Duration::ZERO);
    make_dir(base.path(), "2025-08-14-bystander", Duration::from_secs(3_600));
    let options = SessionOptions {
        confirm: Some("YES".to_string()),
        ..scripted("", Vec::new())
    };
    let keys = RemovedUnderneath {
        keys: ScriptedKeys::new([Key::Ctrl('d'), Key::Enter]),
        target: base.path().join(name),
    };

    let mut selector = Selector::new(base.path(), options, Vec::new()).with_key_source(keys);
    // Enter after the failure still picks from the reloaded listing.
    assert_eq!(
        selector.run().unwrap(),
        SelectionResult::NavigateTo(base.path().join("2025-08-14-bystander"))
    );

    let out = text(&selector);
    assert_eq!(out.matches(&format!("Delete failed: {name}:")).count(), 1);
    let last_frame = out.rsplit("Try Directory Selection").next().unwrap();
    assert!(!last_frame.contains(&format!("📁 {name}")));
    assert!(last_frame.contains("📁 2025-08-14-bystander"));
}

#[rstest]
#[case(vec![Key::Down, Key::Enter], "2025-08-15-second")]
#[case(vec![Key::Ctrl('j'), Key::Enter], "2025-08-15-second")]
#[case(vec![Key::Ctrl('j'), Key::Ctrl('k'), Key::Enter], "2025-08-14-first")]
#[case(vec![Key::Up, Key::Up, Key::Enter], "2025-08-14-first")]
fn navigation_follows_score_order(base: TempDir, #[case] keys: Vec<Key>, #[case] expected: &str) {
    make_dir(base.path(), "2025-08-14-first", Duration::ZERO);
    make_dir(base.path(), "2025-08-15-second", Duration::from_secs(48 * 3_600));

    let mut selector = Selector::new(base.path(), scripted("", keys), Vec::new());
    assert_eq!(
        selector.run().unwrap(),
        SelectionResult::NavigateTo(base.path().join(expected))
    );
}

#[rstest]
fn escape_cancels_without_touching_disk(base: TempDir) {
    make_dir(base.path(), "keep", Duration::ZERO);
    let mut selector = Selector::new(base.path(), scripted("", vec![Key::Escape]), Vec::new());
    assert_eq!(selector.run().unwrap(), SelectionResult::Cancelled);
    assert!(base.path().join("keep").is_dir());
}

#[rstest]
fn interrupt_cancels(base: TempDir) {
    let mut selector = Selector::new(base.path(), scripted("x", vec![Key::Ctrl('c')]), Vec::new());
    assert_eq!(selector.run().unwrap(), SelectionResult::Cancelled);
}

#[rstest]
fn raw_terminal_bytes_drive_the_session(base: TempDir) {
    make_dir(base.path(), "alpha", Duration::ZERO);
    make_dir(base.path(), "beta", Duration::from_secs(3_600));
    // "b", then a separate read carrying Enter.
    let input: &[u8] = b"b";
    let input = input.chain(b"\r".as_slice());
    let options = SessionOptions {
        no_clear: true,
        ..SessionOptions::default()
    };

    let mut selector =
        Selector::new(base.path(), options, Vec::new()).with_key_source(TerminalKeys::new(input));
    assert_eq!(
        selector.run().unwrap(),
        SelectionResult::NavigateTo(base.path().join("beta"))
    );
}

#[rstest]
fn closed_input_cancels(base: TempDir) {
    let options = SessionOptions {
        query: "anything".to_string(),
        no_clear: true,
        ..SessionOptions::default()
    };
    let empty: &[u8] = &[];
    let mut selector =
        Selector::new(base.path(), options, Vec::new()).with_key_source(TerminalKeys::new(empty));
    assert_eq!(selector.run().unwrap(), SelectionResult::Cancelled);
}
