use tracing::info;

use crate::git::{GitClient, GitError};
use crate::request::{Request, SourceKind};

/// Populate `req.code` from the repository for git-backed sources.
///
/// Idempotent short-circuit: arbitrary requests and requests whose code
/// is already populated are left untouched, so a caller can supply its
/// own diff text and skip the VCS entirely.
pub async fn resolve_source(req: &mut Request) -> Result<(), GitError> {
    if req.source == SourceKind::Arbitrary || !req.code.is_empty() {
        return Ok(());
    }

    let repo_path = req.repo_path.clone().unwrap_or_default();
    info!(
        source = %req.source,
        repository = %repo_path.display(),
        "fetching git diff"
    );

    let client = GitClient::new(repo_path);
    let diff = match req.source {
        SourceKind::Arbitrary => return Ok(()),
        SourceKind::Staged => client.staged_diff().await?,
        SourceKind::Unstaged => client.unstaged_diff().await?,
        SourceKind::Commit => {
            let commit = req.commit.as_deref().unwrap_or("");
            client.commit_diff(commit).await?
        }
    };

    info!(diff_size_bytes = diff.len(), "git diff fetched");
    req.code = diff;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::process::Command;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
    }

    fn init_repo(dir: &Path) {
        git(dir, &["init"]);
        git(dir, &["config", "user.email", "test@test.com"]);
        git(dir, &["config", "user.name", "Test"]);
    }

    #[tokio::test]
    async fn arbitrary_is_untouched() {
        let mut req = Request::arbitrary("fn main() {}", "rust");
        resolve_source(&mut req).await.unwrap();
        assert_eq!(req.code, "fn main() {}");
    }

    #[tokio::test]
    async fn populated_code_short_circuits() {
        // The path does not exist; resolution must not reach git.
        let mut req = Request::staged("/definitely/not/a/repo");
        req.code = "diff --git a/x b/x\n".to_string();
        resolve_source(&mut req).await.unwrap();
        assert_eq!(req.code, "diff --git a/x b/x\n");
    }

    #[tokio::test]
    async fn staged_fetches_diff() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        init_repo(dir);

        std::fs::write(dir.join("a.txt"), "one\n").unwrap();
        git(dir, &["add", "-A"]);
        git(dir, &["commit", "-m", "init"]);

        std::fs::write(dir.join("a.txt"), "one\ntwo\n").unwrap();
        git(dir, &["add", "a.txt"]);

        let mut req = Request::staged(dir);
        resolve_source(&mut req).await.unwrap();
        assert!(req.code.contains("+two"));
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let tmp = TempDir::new().unwrap();
        // Not a repository at all.
        let mut req = Request::unstaged(tmp.path());
        assert!(resolve_source(&mut req).await.is_err());
    }
}
