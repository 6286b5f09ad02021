use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub virustotal_api_key: String,
    pub shodan_api_key: String,
    pub openai_api_key: String,
    pub screenshots_dir: PathBuf,
    pub sandbox_image: String,
    pub worker_count: usize,
    pub queue_capacity: usize,
    pub job_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            virustotal_api_key: env::var("VIRUSTOTAL_API_KEY")
                .context("VIRUSTOTAL_API_KEY must be set")?,
            shodan_api_key: env::var("SHODAN_API_KEY")
                .context("SHODAN_API_KEY must be set")?,
            openai_api_key: env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY must be set")?,
            screenshots_dir: env::var("SCREENSHOTS_DIR")
                .unwrap_or_else(|_| "static/screenshots".to_string())
                .into(),
            sandbox_image: env::var("SANDBOX_IMAGE")
                .unwrap_or_else(|_| "selenium/standalone-chromium:latest".to_string()),
            worker_count: env::var("ANALYSIS_WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("ANALYSIS_WORKERS must be a valid number")?,
            queue_capacity: env::var("ANALYSIS_QUEUE_CAPACITY")
                .unwrap_or_else(|_| "64".to_string())
                .parse()
                .context("ANALYSIS_QUEUE_CAPACITY must be a valid number")?,
            job_timeout: Duration::from_secs(
                env::var("ANALYSIS_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .context("ANALYSIS_TIMEOUT_SECS must be a valid number")?,
            ),
        })
    }
}
