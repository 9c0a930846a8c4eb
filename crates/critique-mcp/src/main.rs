mod server;
mod tools;

use std::sync::Arc;

use rmcp::ServiceExt;
use tracing::{error, info};

use critique_core::backend::registry_from_config;
use critique_core::config::Config;
use critique_core::credentials;
use critique_core::engine::Engine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("critique_mcp=info".parse().unwrap())
                .add_directive("critique_core=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load configuration: {e}");
            eprintln!("Error: failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let problems = credentials::validate_all(&config);
    if !problems.is_empty() {
        for problem in &problems {
            error!(backend = problem.backend, "invalid API credential: {}", problem.reason);
        }
        eprintln!("Error: invalid API credentials:");
        for problem in &problems {
            eprintln!("  {problem}");
        }
        std::process::exit(1);
    }

    let backends = registry_from_config(&config);
    if backends.is_empty() {
        error!("no backends available, check API key configuration");
        eprintln!("Error: no LLM backends configured. Set at least one API key:");
        eprintln!("  ANTHROPIC_API_KEY");
        eprintln!("  OPENAI_API_KEY");
        eprintln!("  GOOGLE_API_KEY");
        std::process::exit(1);
    }

    let engine = Engine::new(backends, config.default_backend.clone(), config.max_diff_size);
    info!(
        backends = ?engine.available_backends(),
        default_backend = %config.default_backend,
        max_diff_size = config.max_diff_size,
        "review engine initialized"
    );

    let server = server::CritiqueServer::new(Arc::new(engine));

    info!("starting MCP server on stdio");
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = server.serve(transport).await?;
    service.waiting().await?;

    Ok(())
}
