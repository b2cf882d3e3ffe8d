use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use uni_navigator::api;
use uni_navigator::config::Config;
use uni_navigator::embedding::Embedder;
use uni_navigator::estimator::training;
use uni_navigator::search::builder::build_course_index;
use uni_navigator::state::AppState;
use uni_navigator::store::seed;

#[derive(Parser)]
#[command(name = "uni-navigator", version, about = "University course advisor API")]
struct Cli {
    /// Directory holding the database, model bundle and vector index
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load all artifacts and serve the HTTP API (default)
    Serve,
    /// Recreate the SQLite database from the built-in catalog
    Seed,
    /// Train the admission model on synthetic data and save the bundle
    Train,
    /// Embed course descriptions into the vector index
    BuildIndex {
        /// Delete an existing collection before building
        #[arg(long)]
        rebuild: bool,
    },
    /// Seed, train and build the index in one go
    Setup,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    tracing::info!("Data directory: {}", config.data_dir.display());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Seed => seed_database(&config),
        Command::Train => train_model(&config),
        Command::BuildIndex { rebuild } => build_index(&config, rebuild).await,
        Command::Setup => {
            seed_database(&config)?;
            train_model(&config)?;
            build_index(&config, true).await
        }
    }
}

fn seed_database(config: &Config) -> anyhow::Result<()> {
    seed::create_database(&config.db_path())?;
    Ok(())
}

fn train_model(config: &Config) -> anyhow::Result<()> {
    let (model, report) = training::train(&config.training)?;
    let path = config.model_path();
    model.save(&path)?;
    tracing::info!(
        "Model and features saved to {} (train {}, test {}, accuracy {:.2}%)",
        path.display(),
        report.train_size,
        report.test_size,
        report.test_accuracy * 100.0
    );
    Ok(())
}

async fn build_index(config: &Config, rebuild: bool) -> anyhow::Result<()> {
    let embedder = Embedder::new(&config.embedding)?;
    build_course_index(config, &embedder, rebuild).await?;
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Loading all models...");
    let bind_addr = config.bind_addr.clone();
    let state = AppState::load(config).context("Startup aborted")?;
    let app = api::router(state)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
