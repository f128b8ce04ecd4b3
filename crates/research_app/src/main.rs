use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use research_app::{build_router, AppConfig, ServerState, SessionStore, WorkflowController};
use research_engine::RagEngine;
use research_logging::{research_info, LevelFilter, LogDestination};

#[derive(Debug, Parser)]
#[command(version, about = "Ask questions about the web pages you provide")]
struct Cli {
    /// RON configuration file; defaults apply when it does not exist.
    #[arg(long, env = "RESEARCH_CONFIG", default_value = "research.ron")]
    config: PathBuf,
    /// Address to listen on, overriding the config file.
    #[arg(long)]
    bind: Option<String>,
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    log: LogTarget,
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    research_logging::initialize(cli.log.into(), cli.log_level);

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }

    // One HTTP client for everyone; each session indexes its own pages.
    let prototype = RagEngine::new(config.fetch_settings(), config.index_settings())
        .context("failed to build the HTTP client")?;
    let sessions = SessionStore::new(config.catalog(), config.session_limits(), move || {
        let engine = Arc::new(prototype.with_fresh_corpus());
        WorkflowController::new(engine.clone(), engine)
    });
    let app = build_router(ServerState::new(sessions));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    research_info!("Research tool listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
