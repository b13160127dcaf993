//! Logical key tokens and the sources that produce them.
//!
//! [`TerminalKeys`] decodes raw bytes read from a terminal in raw mode;
//! [`ScriptedKeys`] replays a fixed list for tests and the `--and-keys`
//! harness flag.

use std::collections::VecDeque;
use std::io::Read;

use crate::error::{Error, Result};

const ESC: u8 = 0x1b;

/// One logical key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    /// A control chord, stored as the lowercase letter (`Ctrl('d')`).
    Ctrl(char),
    Char(char),
}

impl Key {
    /// Maps a single raw byte to its key.
    pub fn from_byte(byte: u8) -> Key {
        match byte {
            b'\r' => Key::Enter,
            ESC => Key::Escape,
            0x7f | 0x08 => Key::Backspace,
            0x01..=0x1a => Key::Ctrl((b'a' + byte - 1) as char),
            _ => Key::Char(byte as char),
        }
    }
}

/// Anything that can produce the next key press.
pub trait KeySource {
    fn read_key(&mut self) -> Result<Key>;
}

/// Decodes one chunk of raw terminal input into keys.
///
/// Keys are taken from the front of the chunk until it is used up, so a
/// read holding several escape sequences or pasted text yields every key.
/// An escape byte followed by `[` and a third byte is one key: an arrow for
/// `A`-`D`, otherwise [`Key::Escape`]. Any other escape-prefixed run of up
/// to three bytes collapses to a single [`Key::Escape`]. An empty chunk
/// (end of input) is also [`Key::Escape`].
pub fn decode(bytes: &[u8]) -> Vec<Key> {
    if bytes.is_empty() {
        return vec![Key::Escape];
    }
    let mut keys = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        let (key, used) = decode_one(rest);
        keys.push(key);
        rest = &rest[used..];
    }
    keys
}

/// The first key in `bytes` and how many bytes it took. `bytes` is non-empty.
fn decode_one(bytes: &[u8]) -> (Key, usize) {
    match bytes {
        [ESC, b'[', code, ..] => {
            let key = match code {
                b'A' => Key::Up,
                b'B' => Key::Down,
                b'C' => Key::Right,
                b'D' => Key::Left,
                _ => Key::Escape,
            };
            (key, 3)
        }
        [ESC, ..] => (Key::Escape, bytes.len().min(3)),
        [byte, ..] if byte.is_ascii() => (Key::from_byte(*byte), 1),
        [byte, ..] => (2..=4)
            .find_map(|len| {
                let text = std::str::from_utf8(bytes.get(..len)?).ok()?;
                Some((Key::Char(text.chars().next()?), len))
            })
            .unwrap_or((Key::from_byte(*byte), 1)),
        [] => (Key::Escape, 0),
    }
}

/// Reads keys from a byte stream, normally stdin in raw mode.
///
/// A read error or end of input yields [`Key::Escape`] so the picker never
/// hangs on a closed terminal.
pub struct TerminalKeys<R: Read> {
    input: R,
    queued: VecDeque<Key>,
}

impl<R: Read> TerminalKeys<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            queued: VecDeque::new(),
        }
    }
}

impl TerminalKeys<std::io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(std::io::stdin())
    }
}

impl<R: Read> KeySource for TerminalKeys<R> {
    fn read_key(&mut self) -> Result<Key> {
        if let Some(key) = self.queued.pop_front() {
            return Ok(key);
        }
        // Escape sequences arrive in one read; 8 bytes covers them and short pastes.
        let mut buf = [0u8; 8];
        let n = match self.input.read(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(error = %e, "key read failed, treating as escape");
                0
            }
        };
        self.queued.extend(decode(&buf[..n]));
        Ok(self.queued.pop_front().unwrap_or(Key::Escape))
    }
}

/// Replays a fixed key list; running out is [`Error::KeysExhausted`].
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<Key>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn read_key(&mut self) -> Result<Key> {
        self.keys.pop_front().ok_or(Error::KeysExhausted)
    }
}

/// Parses a comma separated key script such as `"CTRL-J,TYPE=foo,ENTER"`.
///
/// Names are case-insensitive. `TYPE=<text>` expands to one key per
/// character and any single character stands for itself.
pub fn parse_key_script(script: &str) -> Result<Vec<Key>> {
    let mut keys = Vec::new();
    for token in script.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let upper = token.to_ascii_uppercase();
        let key = match upper.as_str() {
            "UP" => Key::Up,
            "DOWN" => Key::Down,
            "LEFT" => Key::Left,
            "RIGHT" => Key::Right,
            "ENTER" => Key::Enter,
            "ESC" => Key::Escape,
            "BACKSPACE" => Key::Backspace,
            "CTRL-C" | "CTRLC" => Key::Ctrl('c'),
            "CTRL-D" | "CTRLD" => Key::Ctrl('d'),
            "CTRL-P" | "CTRLP" => Key::Ctrl('p'),
            "CTRL-N" | "CTRLN" => Key::Ctrl('n'),
            "CTRL-J" | "CTRLJ" => Key::Ctrl('j'),
            "CTRL-K" | "CTRLK" => Key::Ctrl('k'),
            _ if upper.starts_with("TYPE=") => {
                keys.extend(token["TYPE=".len()..].chars().map(Key::Char));
                continue;
            }
            _ => {
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return Err(Error::UnknownKeyName(token.to_string())),
                }
            }
        };
        keys.push(key);
    }
    Ok(keys)
}
