mod commands;
mod formatters;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "critique", about = "LLM-backed code review")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review a file or code from stdin
    Code(commands::code::CodeArgs),
    /// Review staged changes in a repository
    Staged(commands::git::StagedArgs),
    /// Review unstaged changes in a repository
    Unstaged(commands::git::UnstagedArgs),
    /// Review a single commit
    Commit(commands::git::CommitArgs),
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Code(args) => commands::code::run(args).await,
        Commands::Staged(args) => commands::git::run_staged(args).await,
        Commands::Unstaged(args) => commands::git::run_unstaged(args).await,
        Commands::Commit(args) => commands::git::run_commit(args).await,
    }
}
