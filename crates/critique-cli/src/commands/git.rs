use std::path::PathBuf;

use clap::Args;

use critique_core::request::{Request, ReviewDepth};
use critique_core::response::Category;

use crate::OutputFormat;

#[derive(Args)]
pub struct StagedArgs {
    /// Repository path
    #[arg(short = 'C', long, default_value = ".")]
    pub repo: PathBuf,

    /// Backend to use (defaults to the configured backend)
    #[arg(long)]
    pub backend: Option<String>,

    /// Review depth
    #[arg(long, default_value = "quick")]
    pub depth: ReviewDepth,

    /// Restrict findings to a category (repeatable)
    #[arg(long = "focus", value_name = "CATEGORY")]
    pub focus: Vec<Category>,

    /// Output format
    #[arg(long, value_enum, default_value = "terminal")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct UnstagedArgs {
    /// Repository path
    #[arg(short = 'C', long, default_value = ".")]
    pub repo: PathBuf,

    /// Backend to use (defaults to the configured backend)
    #[arg(long)]
    pub backend: Option<String>,

    /// Review depth
    #[arg(long, default_value = "quick")]
    pub depth: ReviewDepth,

    /// Restrict findings to a category (repeatable)
    #[arg(long = "focus", value_name = "CATEGORY")]
    pub focus: Vec<Category>,

    /// Output format
    #[arg(long, value_enum, default_value = "terminal")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct CommitArgs {
    /// Commit SHA to review
    pub sha: String,

    /// Repository path
    #[arg(short = 'C', long, default_value = ".")]
    pub repo: PathBuf,

    /// Backend to use (defaults to the configured backend)
    #[arg(long)]
    pub backend: Option<String>,

    /// Review depth
    #[arg(long, default_value = "quick")]
    pub depth: ReviewDepth,

    /// Restrict findings to a category (repeatable)
    #[arg(long = "focus", value_name = "CATEGORY")]
    pub focus: Vec<Category>,

    /// Output format
    #[arg(long, value_enum, default_value = "terminal")]
    pub format: OutputFormat,
}

pub async fn run_staged(args: StagedArgs) {
    let repo = args.repo.canonicalize().unwrap_or(args.repo.clone());

    let mut req = Request::staged(repo);
    req.backend = args.backend;
    req.depth = args.depth;
    req.focus = args.focus;

    super::execute(req, args.format).await;
}

pub async fn run_unstaged(args: UnstagedArgs) {
    let repo = args.repo.canonicalize().unwrap_or(args.repo.clone());

    let mut req = Request::unstaged(repo);
    req.backend = args.backend;
    req.depth = args.depth;
    req.focus = args.focus;

    super::execute(req, args.format).await;
}

pub async fn run_commit(args: CommitArgs) {
    let repo = args.repo.canonicalize().unwrap_or(args.repo.clone());

    let mut req = Request::commit(repo, args.sha);
    req.backend = args.backend;
    req.depth = args.depth;
    req.focus = args.focus;

    super::execute(req, args.format).await;
}
