use std::time::Duration;

/// Errors returned by the VirusTotal client.
#[derive(Debug, thiserror::Error)]
pub enum VirusTotalError {
    /// Transport-level failure (connection, TLS, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the API.
    #[error("VirusTotal API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The analysis never reached a completed state within the deadline.
    #[error("analysis report not ready after {0:?}")]
    ReportTimeout(Duration),
}

pub type Result<T> = std::result::Result<T, VirusTotalError>;
