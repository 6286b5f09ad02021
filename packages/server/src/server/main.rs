// Main entry point for the URL triage API server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::domains::analysis::PostgresHistoryStore;
use server_core::kernel::{
    ContainerRenderer, OpenAiSummarizer, ServerDeps, ShodanClient, VirusTotalReputation,
};
use server_core::server::{build_app, PipelineOptions};
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting URL Triage API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    std::fs::create_dir_all(&config.screenshots_dir)
        .context("Failed to create screenshots directory")?;

    // Wire external collaborators
    let deps = ServerDeps::new(
        Arc::new(VirusTotalReputation::new(config.virustotal_api_key.clone())),
        Arc::new(ShodanClient::new(config.shodan_api_key.clone())?),
        Arc::new(OpenAiSummarizer::new(config.openai_api_key.clone())),
        Arc::new(ContainerRenderer::new(
            config.sandbox_image.clone(),
            config.screenshots_dir.clone(),
        )?),
        Arc::new(PostgresHistoryStore::new(pool.clone())),
    );

    // Build application (spawns the analysis worker pool)
    let options = PipelineOptions {
        worker_count: config.worker_count,
        queue_capacity: config.queue_capacity,
        job_timeout: config.job_timeout,
        ..Default::default()
    };
    let shutdown = CancellationToken::new();
    let app = build_app(deps, options, &config.screenshots_dir, shutdown.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    shutdown.cancel();
    Ok(())
}
