//! CLI entrypoint for parley
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use parley_application::{ChatSessionUseCase, StreamReplyUseCase};
use parley_domain::CharacterCatalog;
use parley_infrastructure::{ConfigLoader, FileConfig, OpenAiGateway};
use parley_presentation::{AppState, ChatRepl, Cli, Command, router, serve};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        println!();
        let config = load_config(&cli)?;
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    let config = load_config(&cli)?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(cli.verbose, config.logging.directory.as_deref());

    config.validate().context("Invalid configuration")?;
    info!("Starting parley");

    // === Dependency Injection ===
    let gateway = Arc::new(OpenAiGateway::from_config(&config.provider)?);
    let languages = Arc::new(config.language_table());
    let chat_config = config.chat_config();

    match cli.resolved_command() {
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let listener = TcpListener::bind((host.as_str(), port))
                .await
                .with_context(|| format!("Failed to bind to {}:{}", host, port))?;

            let use_case = StreamReplyUseCase::new(gateway, languages.clone(), chat_config);
            let app = router(AppState::new(use_case, CharacterCatalog::builtin(), languages));

            println!("Parley API listening on http://{}", listener.local_addr()?);
            serve(listener, app).await.context("Server error")?;
        }
        Command::Chat {
            character,
            language,
            native,
            quiet,
        } => {
            let target = language.unwrap_or_else(|| chat_config.target_language.clone());
            let native = native.unwrap_or_else(|| chat_config.native_language.clone());

            let session = Arc::new(ChatSessionUseCase::new(
                gateway,
                languages.clone(),
                chat_config,
            ));
            // A persona brings its own target language; `native` carries over
            session.set_languages(&target, &native);
            if let Some(id) = character {
                session.select_character(&id)?;
            }

            let repl = ChatRepl::new(session, languages)
                .with_progress(config.repl.show_progress && !quiet)
                .with_history_file(config.repl.history_file.as_deref());

            repl.run().await?;
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))
}

/// Stderr logging filtered by `-v` count (or `RUST_LOG` when no `-v` is
/// given), plus a daily-rolling file when `directory` is set.
fn init_logging(verbose: u8, directory: Option<&str>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "parley.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}
