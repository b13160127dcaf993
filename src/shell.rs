//! Shell script generation.
//!
//! Nothing here touches the filesystem except to probe for free directory
//! names. The script is printed for the calling shell function to `eval`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)([0-9]+)$").expect("valid regex"));

/// One step of a generated script. Every step acts on the script's target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Mkdir,
    /// Message printed to the user before the slower steps.
    Echo(String),
    /// Clone this URI into the target.
    GitClone(String),
    /// Add a detached worktree at the target, from `repo` or the current directory.
    GitWorktree(Option<PathBuf>),
    Touch,
    Cd,
}

/// A sequence of tasks around one target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub target: PathBuf,
    pub tasks: Vec<Task>,
}

impl Script {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            tasks: Vec::new(),
        }
    }

    pub fn then(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Renders the script as `cmd \` / `  && cmd` lines.
    pub fn render(&self) -> String {
        let target = quote_path(&self.target);
        let parts: Vec<String> = self
            .tasks
            .iter()
            .filter_map(|task| match task {
                Task::Mkdir => Some(format!("mkdir -p {target}")),
                Task::Echo(msg) if msg.is_empty() => None,
                Task::Echo(msg) => Some(format!("echo {}", shell_quote(msg))),
                Task::GitClone(uri) => Some(format!("git clone {} {target}", shell_quote(uri))),
                Task::GitWorktree(repo) => Some(worktree_command(repo.as_deref(), &target)),
                Task::Touch => Some(format!("touch {target}")),
                Task::Cd => Some(format!("cd {target}")),
            })
            .collect();
        join_commands(&parts)
    }
}

fn worktree_command(repo: Option<&Path>, target: &str) -> String {
    match repo {
        Some(repo) => {
            let repo = quote_path(repo);
            format!(
                "/usr/bin/env sh -c 'if git -C {repo} rev-parse --is-inside-work-tree >/dev/null 2>&1; \
                 then repo=$(git -C {repo} rev-parse --show-toplevel); \
                 git -C \"$repo\" worktree add --detach {target} >/dev/null 2>&1 || true; fi; exit 0'"
            )
        }
        None => format!(
            "/usr/bin/env sh -c 'if git rev-parse --is-inside-work-tree >/dev/null 2>&1; \
             then repo=$(git rev-parse --show-toplevel); \
             git -C \"$repo\" worktree add --detach {target} >/dev/null 2>&1 || true; fi; exit 0'"
        ),
    }
}

pub fn join_commands(parts: &[String]) -> String {
    parts.join(" \\\n  && ")
}

/// Single-quotes `s` for POSIX shells.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r#"'"'"'"#))
}

fn quote_path(path: &Path) -> String {
    shell_quote(&path.to_string_lossy())
}

/// Returns `name`, or `name-2`, `name-3`, ... whichever does not exist in `base`.
pub fn unique_dir_name(base: &Path, name: &str) -> String {
    let mut candidate = name.to_string();
    let mut n = 2;
    while base.join(&candidate).exists() {
        candidate = format!("{name}-{n}");
        n += 1;
    }
    candidate
}

/// Picks a free stem for `<date>-<stem>` under `base`.
///
/// A taken stem ending in digits is bumped (`v1` → `v2`); other stems get a
/// `-2`, `-3`, ... suffix.
pub fn resolve_unique_name_with_versioning(base: &Path, date: &str, stem: &str) -> String {
    if !base.join(format!("{date}-{stem}")).exists() {
        return stem.to_string();
    }

    if let Some(caps) = TRAILING_NUMBER.captures(stem) {
        let prefix = &caps[1];
        if let Ok(mut n) = caps[2].parse::<u64>() {
            loop {
                n += 1;
                let candidate = format!("{prefix}{n}");
                if !base.join(format!("{date}-{candidate}")).exists() {
                    return candidate;
                }
            }
        }
    }

    let unique = unique_dir_name(base, &format!("{date}-{stem}"));
    unique
        .strip_prefix(&format!("{date}-"))
        .unwrap_or(&unique)
        .to_string()
}
