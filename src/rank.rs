//! Fuzzy ranking of candidate directories.
//!
//! A name is scored against the query by ordered, case-insensitive
//! subsequence matching. Matches at word boundaries and matches close to the
//! previous one score higher; the total is then scaled by how early the
//! match ends and by the name's length. Recency bonuses from the creation
//! and modification times are added whether or not a query is present.
//!
//! A non-empty query that is not a subsequence of the name scores exactly
//! `0.0`, and [`rank`] drops such entries.

use std::sync::LazyLock;
use std::time::{Duration, SystemTime};

use regex::Regex;

use crate::entries::CandidateEntry;

static DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}-").expect("valid regex"));
static DATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2})-(.+)$").expect("valid regex"));

const DATED_BONUS: f64 = 2.0;
const SECS_PER_DAY: f64 = 86_400.0;
const SECS_PER_HOUR: f64 = 3_600.0;

/// A candidate together with its score for the current query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub entry: CandidateEntry,
    pub score: f64,
}

/// Returns `true` for names starting with `YYYY-MM-DD-`, even with nothing
/// after the hyphen.
pub fn is_dated(name: &str) -> bool {
    DATE_PREFIX.is_match(name)
}

/// Splits a dated name into its date and the non-empty remainder after the
/// hyphen.
pub fn split_dated(name: &str) -> Option<(&str, &str)> {
    let caps = DATED.captures(name)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn elapsed(since: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(since).unwrap_or_default()
}

/// Scores `name` against `query` at time `now`.
pub fn score(
    name: &str,
    query: &str,
    created_at: SystemTime,
    modified_at: SystemTime,
    now: SystemTime,
) -> f64 {
    let mut score = 0.0;
    if is_dated(name) {
        score += DATED_BONUS;
    }

    if !query.is_empty() {
        let chars: Vec<char> = name.chars().collect();
        let query: Vec<char> = query.chars().map(fold).collect();
        let mut last: Option<usize> = None;
        let mut matched = 0;

        for (pos, &c) in chars.iter().enumerate() {
            if matched == query.len() {
                break;
            }
            if fold(c) != query[matched] {
                continue;
            }
            score += 1.0;
            if pos == 0 || !is_word(chars[pos - 1]) {
                score += 1.0;
            }
            if let Some(prev) = last {
                let gap = pos - prev - 1;
                score += 1.0 / ((gap + 1) as f64).sqrt();
            }
            last = Some(pos);
            matched += 1;
        }

        if matched < query.len() {
            return 0.0;
        }
        if let Some(last) = last {
            score *= query.len() as f64 / (last + 1) as f64;
        }
        score *= 10.0 / (chars.len() as f64 + 10.0);
    }

    let days_old = elapsed(created_at, now).as_secs_f64() / SECS_PER_DAY;
    score += 2.0 / (days_old + 1.0).sqrt();
    let hours_since_modified = elapsed(modified_at, now).as_secs_f64() / SECS_PER_HOUR;
    score += 3.0 / (hours_since_modified + 1.0).sqrt();
    score
}

/// Scores every entry, drops non-matches when `query` is non-empty and
/// sorts by descending score. Ties keep their input order.
pub fn rank(entries: &[CandidateEntry], query: &str, now: SystemTime) -> Vec<ScoredEntry> {
    let mut scored: Vec<ScoredEntry> = entries
        .iter()
        .map(|entry| ScoredEntry {
            score: score(&entry.name, query, entry.created_at, entry.modified_at, now),
            entry: entry.clone(),
        })
        .collect();
    if !query.is_empty() {
        scored.retain(|s| s.score > 0.0);
    }
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Marks the greedily matched query characters in `text` with `{highlight}`.
///
/// Unlike [`score`], a partial match still highlights whatever prefix of the
/// query was found. The result is renderer markup with braces escaped.
pub fn highlight(text: &str, query: &str) -> String {
    let query: Vec<char> = query.chars().map(fold).collect();
    let mut matched = 0;
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let hit = matched < query.len() && fold(c) == query[matched];
        if hit {
            out.push_str("{highlight}");
            matched += 1;
        }
        if c == '{' {
            out.push('{');
        }
        out.push(c);
        if hit {
            out.push_str("{text}");
        }
    }
    out
}
