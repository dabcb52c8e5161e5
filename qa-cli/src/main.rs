//! `qa` CLI binary: run an ad hoc test case locally, boot the HTTP server, or inspect a
//! team-state document.
//!
//! Subcommands: `run` (single local execution), `serve` (HTTP server), `state` (inspect/
//! sanitize a team-state file).

mod commands;
mod keys;
mod provider;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "qa")]
#[command(about = "QA run core — local execution, HTTP server, team-state inspection")]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute one ad hoc test case locally and print its event stream as NDJSON
    Run(commands::run::RunArgs),
    /// Run the HTTP server (SSE execution stream, stop plane, AI generation endpoints)
    Serve(commands::serve::ServeArgs),
    /// Inspect or sanitize a team-state JSON document
    State(commands::state::StateArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    qa_config::load_and_apply(None::<&std::path::Path>).ok();
    qa_config::init_tracing("info");

    let args = Args::parse();
    match args.cmd {
        Command::Run(run_args) => commands::run::run(run_args).await,
        Command::Serve(serve_args) => commands::serve::run(serve_args).await,
        Command::State(state_args) => commands::state::run(state_args),
    }
}
