use std::path::PathBuf;
use std::time::Duration;

use tokio::process::Command;

const DIFF_TIMEOUT: Duration = Duration::from_secs(30);
const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("git {command} timed out after {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },
    #[error("invalid commit '{commit}': {detail}")]
    InvalidCommit { commit: String, detail: String },
    #[error("git {command} failed: {detail}")]
    Command { command: String, detail: String },
    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),
}

/// Git operations on one repository, each shelled out to the `git`
/// binary with a bounded wait.
pub struct GitClient {
    repo_path: PathBuf,
}

impl GitClient {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    /// Diff of staged changes, via `git diff --staged`.
    pub async fn staged_diff(&self) -> Result<String, GitError> {
        self.run(&["diff", "--staged"], DIFF_TIMEOUT).await
    }

    /// Diff of unstaged changes, via `git diff`.
    pub async fn unstaged_diff(&self) -> Result<String, GitError> {
        self.run(&["diff"], DIFF_TIMEOUT).await
    }

    /// Diff for one commit, via `git show`. The commit is verified
    /// first so a bad id fails with an invalid-commit error rather
    /// than whatever `git show` prints.
    pub async fn commit_diff(&self, commit: &str) -> Result<String, GitError> {
        self.validate_commit(commit).await?;
        self.run(&["show", commit], DIFF_TIMEOUT).await
    }

    /// Check that a commit id resolves, via `git rev-parse --verify`.
    pub async fn validate_commit(&self, commit: &str) -> Result<(), GitError> {
        match self.run(&["rev-parse", "--verify", commit], VERIFY_TIMEOUT).await {
            Ok(_) => Ok(()),
            Err(GitError::Command { detail, .. }) => Err(GitError::InvalidCommit {
                commit: commit.to_string(),
                detail,
            }),
            Err(e) => Err(e),
        }
    }

    /// Whether the path is inside a git repository.
    pub async fn is_repository(&self) -> bool {
        self.run(&["rev-parse", "--git-dir"], VERIFY_TIMEOUT)
            .await
            .is_ok()
    }

    /// Top-level directory of the repository.
    pub async fn repo_root(&self) -> Result<PathBuf, GitError> {
        let output = self
            .run(&["rev-parse", "--show-toplevel"], VERIFY_TIMEOUT)
            .await?;
        Ok(PathBuf::from(output.trim()))
    }

    async fn run(&self, args: &[&str], timeout: Duration) -> Result<String, GitError> {
        let command = args.join(" ");

        // Dropping the output future on timeout must take the child
        // with it, or every timed-out call leaks a live git process.
        let output = tokio::time::timeout(
            timeout,
            Command::new("git")
                .args(args)
                .current_dir(&self.repo_path)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| GitError::Timeout {
            command: command.clone(),
            timeout_secs: timeout.as_secs(),
        })??;

        if !output.status.success() {
            let mut detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if detail.is_empty() {
                detail = String::from_utf8_lossy(&output.stdout).trim().to_string();
            }
            return Err(GitError::Command { command, detail });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
