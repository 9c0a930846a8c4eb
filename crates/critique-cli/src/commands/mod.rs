pub mod code;
pub mod git;

use tokio_util::sync::CancellationToken;

use critique_core::backend::registry_from_config;
use critique_core::config::Config;
use critique_core::credentials;
use critique_core::engine::Engine;
use critique_core::request::Request;

use crate::formatters;
use crate::OutputFormat;

/// Build the engine from the environment and run one review. Ctrl-C
/// cancels the in-flight request.
pub async fn execute(req: Request, format: OutputFormat) {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let problems = credentials::validate_all(&config);
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("error: {problem}");
        }
        std::process::exit(1);
    }

    let backends = registry_from_config(&config);
    if backends.is_empty() {
        eprintln!(
            "error: no LLM backends configured; set ANTHROPIC_API_KEY, OPENAI_API_KEY, or GOOGLE_API_KEY"
        );
        std::process::exit(1);
    }

    let engine = Engine::new(backends, config.default_backend.clone(), config.max_diff_size);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    match engine.review(req, &cancel).await {
        Ok(resp) => match format {
            OutputFormat::Terminal => formatters::terminal::print(&resp),
            OutputFormat::Json => formatters::json::print(&resp),
        },
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
