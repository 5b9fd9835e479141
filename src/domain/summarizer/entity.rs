//! Summarizer value types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `https://github.com/{owner}/{repo}` followed by `/` or end of input
static GITHUB_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://github\.com/([^/]+)/([^/]+)(/|$)").unwrap());

/// A GitHub repository coordinate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubRepo {
    owner: String,
    name: String,
}

impl GithubRepo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `https://github.com/{owner}/{repo}[/...]`
    ///
    /// Returns `None` for anything else, including other hosts and `http://`.
    pub fn parse_url(url: &str) -> Option<Self> {
        let captures = GITHUB_URL_PATTERN.captures(url.trim())?;
        let owner = captures.get(1)?.as_str();
        let name = captures.get(2)?.as_str().trim_end_matches(".git");

        if name.is_empty() {
            return None;
        }

        Some(Self::new(owner, name))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for GithubRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Structured summary produced from a README
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub summary: String,
    pub cool_facts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        let repo = GithubRepo::parse_url("https://github.com/rust-lang/cargo").unwrap();
        assert_eq!(repo.owner(), "rust-lang");
        assert_eq!(repo.name(), "cargo");
        assert_eq!(repo.to_string(), "rust-lang/cargo");
    }

    #[test]
    fn test_parse_url_with_path() {
        let repo = GithubRepo::parse_url("https://github.com/tokio-rs/axum/tree/main").unwrap();
        assert_eq!(repo.name(), "axum");

        let repo = GithubRepo::parse_url("https://github.com/tokio-rs/axum/").unwrap();
        assert_eq!(repo.name(), "axum");
    }

    #[test]
    fn test_parse_url_strips_git_suffix() {
        let repo = GithubRepo::parse_url("https://github.com/serde-rs/serde.git").unwrap();
        assert_eq!(repo.name(), "serde");
    }

    #[test]
    fn test_parse_invalid_urls() {
        assert!(GithubRepo::parse_url("https://gitlab.com/a/b").is_none());
        assert!(GithubRepo::parse_url("http://github.com/a/b").is_none());
        assert!(GithubRepo::parse_url("https://github.com/only-owner").is_none());
        assert!(GithubRepo::parse_url("not a url").is_none());
    }
}
