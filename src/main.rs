// src/main.rs
// gomoku-arena - play against external AI executables over HTTP

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use gomoku_arena::config::ArenaConfig;
use gomoku_arena::models::ModelCatalog;
use gomoku_arena::web::{self, AppState};
use gomoku_arena::Arena;

#[derive(Parser)]
#[command(name = "gomoku-arena")]
#[command(about = "Session orchestrator for gomoku against external AI executables")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.gomoku-arena/config.toml)
    #[arg(short, long, global = true, env = "GOMOKU_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP/WebSocket server (default)
    Serve(ServeArgs),

    /// List AI models available in the models directory
    Models {
        /// Models directory override
        #[arg(long, env = "GOMOKU_MODELS_DIR")]
        models_dir: Option<PathBuf>,
    },
}

#[derive(clap::Args, Default)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "GOMOKU_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "GOMOKU_PORT")]
    port: Option<u16>,

    /// Rules engine executable
    #[arg(long, env = "GOMOKU_ENGINE")]
    engine: Option<PathBuf>,

    /// Directory of AI model executables
    #[arg(long, env = "GOMOKU_MODELS_DIR")]
    models_dir: Option<PathBuf>,

    /// Model used by new sessions
    #[arg(short, long, env = "GOMOKU_MODEL")]
    model: Option<String>,

    /// Seconds to wait for a child process reply
    #[arg(long, env = "GOMOKU_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

impl ServeArgs {
    fn apply(self, config: &mut ArenaConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(engine) = self.engine {
            config.engine_path = engine;
        }
        if let Some(dir) = self.models_dir {
            config.models_dir = dir;
        }
        if let Some(model) = self.model {
            config.current_model = model;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = secs;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = ArenaConfig::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => {
            args.apply(&mut config);
            serve(config).await
        }
        Commands::Models { models_dir } => {
            if let Some(dir) = models_dir {
                config.models_dir = dir;
            }
            let catalog = ModelCatalog::new(&config.models_dir, config.current_model.clone());
            for name in catalog.available().await? {
                let marker = if name == config.current_model { "*" } else { " " };
                println!("{marker} {name}");
            }
            Ok(())
        }
    }
}

async fn serve(config: ArenaConfig) -> Result<()> {
    config.validate()?;

    info!("Engine: {}", config.engine_path.display());
    info!("Models: {} (current: {})", config.models_dir.display(), config.current_model);

    let arena = Arc::new(Arena::from_config(&config));
    let app = web::create_router(AppState::new(arena.clone()));

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!("Listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("Server error")?;

    arena.shutdown().await;
    info!("All sessions closed");
    Ok(())
}
