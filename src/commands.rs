//! The command layer: turns parsed arguments into a shell script.
//!
//! Every command returns the text to print on stdout, or `None` when there
//! is nothing for the shell to do (the picker was cancelled).

use std::env;
use std::fs;
use std::io::{Write, stderr};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::{Cli, Command};
use crate::config::{date_prefix, resolve_base_path};
use crate::error::{Error, Result};
use crate::git::{clone_dir_name, is_git_uri};
use crate::init::{ShellKind, init_script};
use crate::keys::parse_key_script;
use crate::selector::{SelectionResult, Selector, SessionOptions};
use crate::shell::{Script, Task, resolve_unique_name_with_versioning};

/// Runs the parsed command line.
///
/// The base directory is resolved once from `--path`, `$TRY_PATH` or the
/// default, then the subcommand builds its script. Only `cd` may start the
/// picker; the other commands are pure string assembly.
///
/// # Arguments
/// * `cli`: The parsed arguments, including the hidden harness flags.
///
/// # Returns
/// The script to print on stdout, `None` when there is nothing for the
/// shell to do, or an error for the binary to report.
pub fn execute(cli: Cli) -> Result<Option<String>> {
    let Cli {
        path,
        and_type,
        and_exit,
        and_keys,
        and_confirm,
        command,
    } = cli;
    let base = resolve_base_path(path.as_deref())?;
    debug!(base = %base.display(), ?command, "running command");

    match command {
        Command::Clone { uri, name } => Ok(Some(clone_script(&uri, name.as_deref(), &base)?.render())),
        Command::Worktree { args } => {
            let cwd = env::current_dir()?;
            Ok(Some(worktree_from_args(&args, &base, &cwd).render()))
        }
        Command::Init { path } => {
            let pinned = path
                .filter(|p| p.starts_with('/'))
                .map(PathBuf::from)
                .unwrap_or(base);
            let exe = env::current_exe()?;
            let kind = ShellKind::detect(env::var("SHELL").ok().as_deref());
            Ok(Some(init_script(&exe, Some(&pinned), kind)))
        }
        Command::Cd { args } => {
            let keys = and_keys.as_deref().map(parse_key_script).transpose()?;
            let options = SessionOptions {
                query: and_type.unwrap_or_default(),
                no_clear: and_exit || keys.is_some(),
                keys,
                confirm: and_confirm,
                render_once: and_exit,
            };
            let cwd = env::current_dir()?;
            let script = cd(&args, &base, &cwd, options, stderr())?;
            Ok(script.map(|s| s.render()))
        }
    }
}

/// `try cd`: clone / worktree shorthands, otherwise the interactive picker.
///
/// A non-empty `options.query` wins over the query built from `args`.
pub fn cd<W: Write>(
    args: &[String],
    base: &Path,
    cwd: &Path,
    mut options: SessionOptions,
    out: W,
) -> Result<Option<Script>> {
    match args.first().map(String::as_str) {
        Some("clone") => {
            let uri = args
                .get(1)
                .ok_or_else(|| Error::Usage("usage: try clone <git-uri> [name]".to_string()))?;
            return clone_script(uri, args.get(2).map(String::as_str), base).map(Some);
        }
        Some("." | "./") => {
            let custom = joined(&args[1..]);
            return Ok(Some(worktree_script(base, cwd, custom.as_deref(), true)));
        }
        Some(first) if is_git_uri(first) => {
            let custom = joined(&args[1..]);
            return clone_script(first, custom.as_deref(), base).map(Some);
        }
        _ => {}
    }

    fs::create_dir_all(base)?;
    if options.query.is_empty() {
        options.query = args.join(" ");
    }
    let render_once = options.render_once;
    let result = Selector::new(base, options, out).run()?;
    if render_once {
        return Ok(None);
    }
    Ok(selection_script(result))
}

/// The script for a finished picker session.
pub fn selection_script(result: SelectionResult) -> Option<Script> {
    match result {
        SelectionResult::NavigateTo(path) => Some(Script::new(path).then(Task::Touch).then(Task::Cd)),
        SelectionResult::CreateNew(path) => Some(
            Script::new(path)
                .then(Task::Mkdir)
                .then(Task::Touch)
                .then(Task::Cd),
        ),
        SelectionResult::Cancelled => None,
    }
}

/// `try clone <uri> [name]`.
pub fn clone_script(uri: &str, custom: Option<&str>, base: &Path) -> Result<Script> {
    let name = clone_dir_name(uri, custom)?;
    Ok(Script::new(base.join(name))
        .then(Task::Mkdir)
        .then(Task::Echo(format!(
            "Using git clone to create this trial from {uri}."
        )))
        .then(Task::GitClone(uri.to_string()))
        .then(Task::Touch)
        .then(Task::Cd))
}

/// `try worktree [dir | <repo-path>] [name...]`.
pub fn worktree_from_args(args: &[String], base: &Path, cwd: &Path) -> Script {
    match args.first().map(String::as_str) {
        None | Some("dir") => {
            let custom = joined(args.get(1..).unwrap_or_default());
            worktree_script(base, cwd, custom.as_deref(), false)
        }
        Some(repo) => {
            let custom = joined(&args[1..]);
            worktree_script(base, Path::new(repo), custom.as_deref(), true)
        }
    }
}

fn joined(words: &[String]) -> Option<String> {
    let text = words.join(" ");
    (!text.is_empty()).then_some(text)
}

/// A fresh dated directory named after `custom` or the repository, with a
/// detached worktree step when `repo_dir` is a git checkout.
///
/// `explicit_repo` makes the worktree step name the repository instead of
/// relying on the shell's current directory.
fn worktree_script(base: &Path, repo_dir: &Path, custom: Option<&str>, explicit_repo: bool) -> Script {
    let stem = match custom {
        Some(custom) => custom.replace(' ', "-"),
        None => repo_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "worktree".to_string()),
    };
    let date = date_prefix();
    let stem = resolve_unique_name_with_versioning(base, &date, &stem);
    let mut script = Script::new(base.join(format!("{date}-{stem}"))).then(Task::Mkdir);
    if repo_dir.join(".git").exists() {
        script = script
            .then(Task::Echo(format!(
                "Using git worktree to create this trial from {}.",
                repo_dir.display()
            )))
            .then(Task::GitWorktree(explicit_repo.then(|| repo_dir.to_path_buf())));
    }
    script.then(Task::Touch).then(Task::Cd)
}
