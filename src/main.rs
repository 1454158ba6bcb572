//! epub-lsp - A language server for EPUB sources.

mod actor;
mod cli;
mod config;
mod core;
mod logger;
mod lsp;
mod parser;
mod validator;
mod workspace;

use anyhow::{Context, Result, bail};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use tower_lsp::{LspService, Server};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    logger::set_verbose(cli.verbose);
    if let Some(path) = &cli.log_file {
        logger::set_log_file(path)
            .with_context(|| format!("cannot open log file `{}`", path.display()))?;
    }

    if let Some(path) = &cli.config
        && !path.is_file()
    {
        bail!("config file not found: {}", path.display());
    }

    match &cli.command {
        Some(Commands::Check { args }) => cli::check::run_check(args, cli.config.as_deref()),
        None => {
            debug!("server"; "transport: stdio (explicit: {})", cli.stdio);
            serve(cli.config).await
        }
    }
}

/// Serve the protocol over stdin/stdout until the client exits.
async fn serve(config: Option<std::path::PathBuf>) -> Result<()> {
    log!("server"; "{} {} listening on stdio", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let (service, socket) = LspService::new(|client| lsp::Backend::spawn(client, config));
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;

    log!("server"; "client disconnected");
    Ok(())
}
