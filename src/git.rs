//! Recognising git URIs and naming clone directories after them.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::date_prefix;
use crate::error::{Error, Result};

static GITHUB_HTTPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://github\.com/([^/]+)/([^/]+)").expect("valid regex"));
static GITHUB_SSH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^git@github\.com:([^/]+)/([^/]+)").expect("valid regex"));
static OTHER_HTTPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://([^/]+)/([^/]+)/([^/]+)").expect("valid regex"));
static OTHER_SSH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^git@([^:]+):([^/]+)/([^/]+)").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUri {
    pub user: String,
    pub repo: String,
    pub host: String,
}

/// Cheap check for "looks like something `git clone` accepts".
pub fn is_git_uri(arg: &str) -> bool {
    !arg.is_empty()
        && (arg.starts_with("https://")
            || arg.starts_with("http://")
            || arg.starts_with("git@")
            || arg.contains("github.com")
            || arg.contains("gitlab.com")
            || arg.ends_with(".git"))
}

pub fn parse_git_uri(uri: &str) -> Option<GitUri> {
    let uri = uri.strip_suffix(".git").unwrap_or(uri);

    for github in [&*GITHUB_HTTPS, &*GITHUB_SSH] {
        if let Some(caps) = github.captures(uri) {
            return Some(GitUri {
                user: caps[1].to_string(),
                repo: caps[2].to_string(),
                host: "github.com".to_string(),
            });
        }
    }
    for other in [&*OTHER_HTTPS, &*OTHER_SSH] {
        if let Some(caps) = other.captures(uri) {
            return Some(GitUri {
                user: caps[2].to_string(),
                repo: caps[3].to_string(),
                host: caps[1].to_string(),
            });
        }
    }
    None
}

/// `custom` if given, otherwise `<date>-<user>-<repo>`.
pub fn clone_dir_name(uri: &str, custom: Option<&str>) -> Result<String> {
    if let Some(custom) = custom.filter(|c| !c.is_empty()) {
        return Ok(custom.to_string());
    }
    let parsed = parse_git_uri(uri).ok_or_else(|| Error::UnparseableGitUri(uri.to_string()))?;
    Ok(format!("{}-{}-{}", date_prefix(), parsed.user, parsed.repo))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("https://github.com/tobi/try.git", "tobi", "try", "github.com")]
    #[case("git@github.com:tobi/try.git", "tobi", "try", "github.com")]
    #[case("https://gitlab.com/group/proj", "group", "proj", "gitlab.com")]
    #[case("git@git.example.org:me/tool.git", "me", "tool", "git.example.org")]
    fn parses_known_forms(
        #[case] uri: &str,
        #[case] user: &str,
        #[case] repo: &str,
        #[case] host: &str,
    ) {
        let parsed = parse_git_uri(uri).unwrap();
        assert_eq!(parsed.user, user);
        assert_eq!(parsed.repo, repo);
        assert_eq!(parsed.host, host);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_git_uri("not a uri"), None);
        assert!(matches!(
            clone_dir_name("nope", None),
            Err(Error::UnparseableGitUri(_))
        ));
    }

    #[rstest]
    #[case("https://example.com/x", true)]
    #[case("git@host:a/b", true)]
    #[case("foo.git", true)]
    #[case("github.com/a/b", true)]
    #[case("redis", false)]
    #[case("", false)]
    fn recognises_git_uris(#[case] arg: &str, #[case] expected: bool) {
        assert_eq!(is_git_uri(arg), expected);
    }

    #[test]
    fn clone_names() {
        assert_eq!(clone_dir_name("x", Some("my-fork")).unwrap(), "my-fork");
        let name = clone_dir_name("https://github.com/tobi/try.git", None).unwrap();
        assert_eq!(name, format!("{}-tobi-try", date_prefix()));
    }
}
