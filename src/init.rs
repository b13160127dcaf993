//! Shell function templates printed by `try init`.
//!
//! The function runs the binary with the UI on `/dev/tty` and evaluates
//! whatever script it prints. Output without ` && ` (help text, errors) is
//! printed instead of evaluated.

use std::path::Path;

use crate::shell::shell_quote;

/// Which shell the function is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    Posix,
    Fish,
}

impl ShellKind {
    /// Guesses from a `$SHELL` value.
    pub fn detect(shell: Option<&str>) -> Self {
        match shell {
            Some(shell) if shell.contains("fish") => ShellKind::Fish,
            _ => ShellKind::Posix,
        }
    }
}

/// Renders the `try` shell function for `exe`, pinned to `base` if given.
pub fn init_script(exe: &Path, base: Option<&Path>, kind: ShellKind) -> String {
    let exe = exe.to_string_lossy();
    let path_arg = base
        .map(|base| format!(" --path {}", shell_quote(&base.to_string_lossy())))
        .unwrap_or_default();
    match kind {
        ShellKind::Posix => posix_function(&shell_quote(&exe), &path_arg),
        ShellKind::Fish => fish_function(&shell_quote(&exe), &path_arg),
    }
}

fn posix_function(exe: &str, path_arg: &str) -> String {
    format!(
        r#"try() {{
  script_path={exe}
  case "$1" in
    clone|worktree|init)
      cmd=$(/usr/bin/env "$script_path"{path_arg} "$@" 2>/dev/tty)
      ;;
    *)
      cmd=$(/usr/bin/env "$script_path" cd{path_arg} "$@" 2>/dev/tty)
      ;;
  esac
  rc=$?
  if [ $rc -eq 0 ]; then
    case "$cmd" in
      *" && "*) eval "$cmd" ;;
      *) printf %s "$cmd" ;;
    esac
  else
    printf %s "$cmd"
  fi
}}
"#
    )
}

fn fish_function(exe: &str, path_arg: &str) -> String {
    format!(
        r#"function try
  set -l script_path {exe}
  set -l cmd
  switch $argv[1]
    case clone worktree init
      set cmd (/usr/bin/env $script_path{path_arg} $argv 2>/dev/tty | string collect)
    case '*'
      set cmd (/usr/bin/env $script_path cd{path_arg} $argv 2>/dev/tty | string collect)
  end
  if string match -q -- '* && *' $cmd
    eval $cmd
  else
    printf %s $cmd
  end
end
"#
    )
}
