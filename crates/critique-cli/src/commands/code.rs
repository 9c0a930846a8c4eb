use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;

use critique_core::request::{Request, ReviewDepth};
use critique_core::response::Category;

use crate::OutputFormat;

#[derive(Args)]
pub struct CodeArgs {
    /// File to review; reads stdin when omitted
    pub path: Option<PathBuf>,

    /// Language of the code; inferred from the file extension when omitted
    #[arg(long)]
    pub language: Option<String>,

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

pub async fn run(args: CodeArgs) {
    let (code, language) = match read_source(&args) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let mut req = Request::arbitrary(code, language);
    req.backend = args.backend;
    req.depth = args.depth;
    req.focus = args.focus;

    super::execute(req, args.format).await;
}

fn read_source(args: &CodeArgs) -> std::io::Result<(String, String)> {
    match &args.path {
        Some(path) => {
            let code = std::fs::read_to_string(path)?;
            let language = args
                .language
                .clone()
                .unwrap_or_else(|| determine_language(path).to_string());
            Ok((code, language))
        }
        None => {
            let mut code = String::new();
            std::io::stdin().read_to_string(&mut code)?;
            let language = args.language.clone().unwrap_or_else(|| "text".to_string());
            Ok((code, language))
        }
    }
}

fn determine_language(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "rs" => "rust",
        "go" => "go",
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" => "typescript",
        "rb" => "ruby",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "swift" => "swift",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "sh" | "bash" | "zsh" => "bash",
        "sql" => "sql",
        "yaml" | "yml" => "yaml",
        "json" => "json",
        "toml" => "toml",
        "md" => "markdown",
        _ => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_from_extension() {
        assert_eq!(determine_language(Path::new("src/main.rs")), "rust");
        assert_eq!(determine_language(Path::new("script.PY")), "python");
        assert_eq!(determine_language(Path::new("notes.unknown")), "text");
        assert_eq!(determine_language(Path::new("Makefile")), "text");
    }
}
