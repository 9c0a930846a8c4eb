use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReviewCodeParams {
    #[schemars(description = "Code to review")]
    pub code: String,
    #[schemars(description = "Programming language (e.g. rust, go, python)")]
    pub language: String,
    #[schemars(description = "LLM backend to use: 'anthropic', 'openai', or 'google' (defaults to the configured backend)")]
    pub backend: Option<String>,
    #[schemars(description = "Review depth: 'quick' or 'thorough' (default: quick)")]
    pub review_depth: Option<String>,
    #[schemars(description = "Categories to focus on: 'bug', 'security', 'performance', 'style', 'best-practice'")]
    pub focus_areas: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReviewStagedParams {
    #[schemars(description = "Path to the git repository")]
    pub repository_path: String,
    #[schemars(description = "LLM backend to use: 'anthropic', 'openai', or 'google' (defaults to the configured backend)")]
    pub backend: Option<String>,
    #[schemars(description = "Review depth: 'quick' or 'thorough' (default: quick)")]
    pub review_depth: Option<String>,
    #[schemars(description = "Categories to focus on: 'bug', 'security', 'performance', 'style', 'best-practice'")]
    pub focus_areas: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReviewUnstagedParams {
    #[schemars(description = "Path to the git repository")]
    pub repository_path: String,
    #[schemars(description = "LLM backend to use: 'anthropic', 'openai', or 'google' (defaults to the configured backend)")]
    pub backend: Option<String>,
    #[schemars(description = "Review depth: 'quick' or 'thorough' (default: quick)")]
    pub review_depth: Option<String>,
    #[schemars(description = "Categories to focus on: 'bug', 'security', 'performance', 'style', 'best-practice'")]
    pub focus_areas: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReviewCommitParams {
    #[schemars(description = "Path to the git repository")]
    pub repository_path: String,
    #[schemars(description = "Git commit SHA to review")]
    pub commit_sha: String,
    #[schemars(description = "LLM backend to use: 'anthropic', 'openai', or 'google' (defaults to the configured backend)")]
    pub backend: Option<String>,
    #[schemars(description = "Review depth: 'quick' or 'thorough' (default: quick)")]
    pub review_depth: Option<String>,
    #[schemars(description = "Categories to focus on: 'bug', 'security', 'performance', 'style', 'best-practice'")]
    pub focus_areas: Option<Vec<String>>,
}
