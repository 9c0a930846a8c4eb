use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::service::RequestContext;
use rmcp::{tool, tool_handler, tool_router, RoleServer, ServerHandler};
use tokio_util::sync::CancellationToken;
use tracing::info;

use critique_core::engine::Engine;
use critique_core::request::Request;
use critique_core::response::Category;

use crate::tools::*;

#[derive(Clone)]
pub struct CritiqueServer {
    engine: Arc<Engine>,
    tool_router: ToolRouter<Self>,
}

fn invalid_params(msg: impl ToString) -> rmcp::ErrorData {
    rmcp::ErrorData::invalid_params(msg.to_string(), None)
}

/// Fold the optional tool arguments into the request. Bad depth or
/// focus spellings are argument-shape faults and fail here, before the
/// engine runs.
fn apply_options(
    req: &mut Request,
    backend: Option<String>,
    depth: Option<String>,
    focus: Option<Vec<String>>,
) -> Result<(), rmcp::ErrorData> {
    req.backend = backend;
    if let Some(depth) = depth {
        req.depth = depth.parse().map_err(invalid_params)?;
    }
    if let Some(areas) = focus {
        req.focus = areas
            .iter()
            .map(|area| area.parse::<Category>())
            .collect::<Result<_, _>>()
            .map_err(invalid_params)?;
    }
    Ok(())
}

impl CritiqueServer {
    /// Run one review and map the outcome onto a tool result. Engine
    /// failures come back as error-flagged results with a readable
    /// message, not protocol faults.
    async fn run(&self, req: Request, cancel: &CancellationToken) -> CallToolResult {
        match self.engine.review(req, cancel).await {
            Ok(resp) => CallToolResult::success(vec![Content::text(
                serde_json::to_string_pretty(&resp).unwrap_or_default(),
            )]),
            Err(e) => {
                CallToolResult::error(vec![Content::text(format!("Review failed: {e}"))])
            }
        }
    }
}

#[tool_router]
impl CritiqueServer {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Review an arbitrary code snippet for bugs, security issues, performance problems, style, and best practices. Returns structured findings as JSON.")]
    async fn review_code(
        &self,
        Parameters(params): Parameters<ReviewCodeParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        info!(language = %params.language, "handling review_code request");

        let mut req = Request::arbitrary(params.code, params.language);
        apply_options(
            &mut req,
            params.backend,
            params.review_depth,
            params.focus_areas,
        )?;

        Ok(self.run(req, &context.ct).await)
    }

    #[tool(description = "Review the staged changes (git diff --staged) in a repository. Returns structured findings as JSON.")]
    async fn review_staged(
        &self,
        Parameters(params): Parameters<ReviewStagedParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        info!(repository = %params.repository_path, "handling review_staged request");

        let mut req = Request::staged(params.repository_path);
        apply_options(
            &mut req,
            params.backend,
            params.review_depth,
            params.focus_areas,
        )?;

        Ok(self.run(req, &context.ct).await)
    }

    #[tool(description = "Review the unstaged changes (git diff) in a repository. Returns structured findings as JSON.")]
    async fn review_unstaged(
        &self,
        Parameters(params): Parameters<ReviewUnstagedParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        info!(repository = %params.repository_path, "handling review_unstaged request");

        let mut req = Request::unstaged(params.repository_path);
        apply_options(
            &mut req,
            params.backend,
            params.review_depth,
            params.focus_areas,
        )?;

        Ok(self.run(req, &context.ct).await)
    }

    #[tool(description = "Review a single git commit by SHA. Returns structured findings as JSON.")]
    async fn review_commit(
        &self,
        Parameters(params): Parameters<ReviewCommitParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        info!(
            repository = %params.repository_path,
            commit = %params.commit_sha,
            "handling review_commit request"
        );

        let mut req = Request::commit(params.repository_path, params.commit_sha);
        apply_options(
            &mut req,
            params.backend,
            params.review_depth,
            params.focus_areas,
        )?;

        Ok(self.run(req, &context.ct).await)
    }
}

#[tool_handler]
impl ServerHandler for CritiqueServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "LLM-backed code review server. Use review_code for an inline snippet, \
                 review_staged or review_unstaged for pending changes in a repository, and \
                 review_commit for a specific commit. Results are structured findings with \
                 category, severity, and suggestions."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
