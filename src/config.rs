//! Base directory resolution and naming helpers.

use std::env;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::{Error, Result};

/// Where tries live when neither `--path` nor `TRY_PATH` is given.
pub const DEFAULT_BASE: &str = "~/src/tries";

/// Environment variable overriding the base directory.
pub const PATH_ENV: &str = "TRY_PATH";

/// Today's date as used in directory names, e.g. `2025-08-27`.
pub fn date_prefix() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Expands a leading `~` and makes `path` absolute.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let home = || dirs::home_dir().ok_or(Error::MissingHome);
    if path == "~" {
        return home();
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return Ok(home()?.join(rest));
    }
    Ok(std::path::absolute(Path::new(path))?)
}

/// Picks the base directory: the `--path` flag, then `env_value`
/// (normally `$TRY_PATH`), then [`DEFAULT_BASE`].
pub fn resolve_base_path_with(flag: Option<&str>, env_value: Option<&str>) -> Result<PathBuf> {
    let raw = flag
        .or(env_value.filter(|v| !v.is_empty()))
        .unwrap_or(DEFAULT_BASE);
    expand_path(raw)
}

pub fn resolve_base_path(flag: Option<&str>) -> Result<PathBuf> {
    let env_value = env::var(PATH_ENV).ok();
    resolve_base_path_with(flag, env_value.as_deref())
}
