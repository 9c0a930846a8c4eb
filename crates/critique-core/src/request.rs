use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::response::Category;

/// Where a review payload comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Inline code supplied by the caller
    Arbitrary,
    /// `git diff --staged`
    Staged,
    /// `git diff`
    Unstaged,
    /// `git show <id>`
    Commit,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arbitrary => write!(f, "arbitrary"),
            Self::Staged => write!(f, "staged"),
            Self::Unstaged => write!(f, "unstaged"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arbitrary" => Ok(Self::Arbitrary),
            "staged" => Ok(Self::Staged),
            "unstaged" => Ok(Self::Unstaged),
            "commit" => Ok(Self::Commit),
            _ => Err(ValidationError::InvalidSource(s.to_string())),
        }
    }
}

/// How much effort the backend should spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDepth {
    #[default]
    Quick,
    Thorough,
}

impl std::fmt::Display for ReviewDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quick => write!(f, "quick"),
            Self::Thorough => write!(f, "thorough"),
        }
    }
}

impl FromStr for ReviewDepth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quick" => Ok(Self::Quick),
            "thorough" => Ok(Self::Thorough),
            _ => Err(ValidationError::InvalidDepth(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid source type '{0}': must be 'arbitrary', 'staged', 'unstaged', or 'commit'")]
    InvalidSource(String),
    #[error("code cannot be empty for arbitrary reviews")]
    EmptyCode,
    #[error("repository path is required for git-based reviews")]
    MissingRepository,
    #[error("commit id is required for commit reviews")]
    MissingCommit,
    #[error("backend must be specified")]
    MissingBackend,
    #[error("invalid review depth '{0}': must be 'quick' or 'thorough'")]
    InvalidDepth(String),
    #[error("invalid focus area '{0}'")]
    InvalidFocusArea(String),
}

/// A single review request. One is built per tool call or CLI run and
/// discarded once the response is produced.
#[derive(Debug, Clone)]
pub struct Request {
    pub source: SourceKind,
    /// Inline code, or diff text once resolution has run.
    pub code: String,
    /// Backend name; the engine substitutes its default when unset.
    pub backend: Option<String>,
    pub language: Option<String>,
    pub depth: ReviewDepth,
    /// Restrict findings to these categories; empty means all.
    pub focus: Vec<Category>,
    pub repo_path: Option<PathBuf>,
    pub commit: Option<String>,
}

impl Request {
    pub fn arbitrary(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            source: SourceKind::Arbitrary,
            code: code.into(),
            language: Some(language.into()),
            ..Self::empty()
        }
    }

    pub fn staged(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            source: SourceKind::Staged,
            repo_path: Some(repo_path.into()),
            ..Self::empty()
        }
    }

    pub fn unstaged(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            source: SourceKind::Unstaged,
            repo_path: Some(repo_path.into()),
            ..Self::empty()
        }
    }

    pub fn commit(repo_path: impl Into<PathBuf>, commit: impl Into<String>) -> Self {
        Self {
            source: SourceKind::Commit,
            repo_path: Some(repo_path.into()),
            commit: Some(commit.into()),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            source: SourceKind::Arbitrary,
            code: String::new(),
            backend: None,
            language: None,
            depth: ReviewDepth::default(),
            focus: Vec::new(),
            repo_path: None,
            commit: None,
        }
    }

    /// Name of the backend this request will run against, after default
    /// substitution.
    pub fn backend_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.backend.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => default,
        }
    }

    /// Check required fields against the source classification. Rules
    /// run in a fixed order and the first violation wins. Source and
    /// depth spellings are already enforced by their types.
    pub fn validate(&self, default_backend: &str) -> Result<(), ValidationError> {
        if self.source == SourceKind::Arbitrary && self.code.is_empty() {
            return Err(ValidationError::EmptyCode);
        }

        if self.source != SourceKind::Arbitrary && self.repo_path_missing() {
            return Err(ValidationError::MissingRepository);
        }

        if self.source == SourceKind::Commit
            && self.commit.as_deref().unwrap_or("").is_empty()
        {
            return Err(ValidationError::MissingCommit);
        }

        if self.backend_or(default_backend).is_empty() {
            return Err(ValidationError::MissingBackend);
        }

        Ok(())
    }

    fn repo_path_missing(&self) -> bool {
        match &self.repo_path {
            Some(path) => path.as_os_str().is_empty(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arbitrary_with_code_passes() {
        let req = Request::arbitrary("fn main() {}", "rust");
        assert!(req.validate("anthropic").is_ok());
    }

    #[test]
    fn arbitrary_without_code_fails() {
        let req = Request::arbitrary("", "rust");
        assert!(matches!(
            req.validate("anthropic"),
            Err(ValidationError::EmptyCode)
        ));
    }

    #[test]
    fn staged_without_repo_fails() {
        let mut req = Request::staged("/tmp/repo");
        req.repo_path = None;
        assert!(matches!(
            req.validate("anthropic"),
            Err(ValidationError::MissingRepository)
        ));

        req.repo_path = Some(PathBuf::new());
        assert!(matches!(
            req.validate("anthropic"),
            Err(ValidationError::MissingRepository)
        ));
    }

    #[test]
    fn commit_without_id_fails() {
        let mut req = Request::commit("/tmp/repo", "abc123");
        req.commit = None;
        assert!(matches!(
            req.validate("anthropic"),
            Err(ValidationError::MissingCommit)
        ));
    }

    #[test]
    fn empty_code_checked_before_backend() {
        // Rule order: the inline-code rule fires even though the
        // backend is also missing.
        let req = Request::arbitrary("", "rust");
        assert!(matches!(req.validate(""), Err(ValidationError::EmptyCode)));
    }

    #[test]
    fn missing_backend_without_default_fails() {
        let req = Request::arbitrary("code", "rust");
        assert!(matches!(
            req.validate(""),
            Err(ValidationError::MissingBackend)
        ));
    }

    #[test]
    fn default_backend_substitutes() {
        let mut req = Request::arbitrary("code", "rust");
        assert!(req.validate("anthropic").is_ok());
        assert_eq!(req.backend_or("anthropic"), "anthropic");

        req.backend = Some("openai".to_string());
        assert_eq!(req.backend_or("anthropic"), "openai");
    }

    #[test]
    fn source_kind_round_trips() {
        for (text, kind) in [
            ("arbitrary", SourceKind::Arbitrary),
            ("staged", SourceKind::Staged),
            ("unstaged", SourceKind::Unstaged),
            ("commit", SourceKind::Commit),
        ] {
            assert_eq!(text.parse::<SourceKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), text);
        }
        assert!("working".parse::<SourceKind>().is_err());
    }

    #[test]
    fn depth_rejects_unknown_spelling() {
        assert!("deep".parse::<ReviewDepth>().is_err());
        assert_eq!("thorough".parse::<ReviewDepth>().unwrap(), ReviewDepth::Thorough);
    }
}
