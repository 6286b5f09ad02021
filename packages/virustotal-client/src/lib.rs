//! Pure VirusTotal v3 REST API client.
//!
//! A minimal client for URL reputation lookups. Supports submitting a URL
//! for scanning, polling for the verdict report, and best-effort domain IP
//! resolution from DNS records.
//!
//! # Example
//!
//! ```rust,ignore
//! use virustotal::VirusTotalClient;
//!
//! let client = VirusTotalClient::new("your-api-key".into());
//!
//! let scan_id = client.analyze_url("http://example.com").await?;
//! let report = client.wait_for_report(&scan_id).await?;
//! println!("malicious engines: {}", report.malicious_count());
//! ```

pub mod error;
pub mod types;

pub use error::{Result, VirusTotalError};
pub use types::{DnsRecord, EngineVerdict, Report};

use std::collections::HashMap;
use std::time::{Duration, Instant};

use types::{Analysis, ApiResponse, Domain, ScanHandle};
use url::Url;

const BASE_URL: &str = "https://www.virustotal.com/api/v3";

/// First delay between report polls; doubles on each miss up to the cap.
const POLL_INITIAL_DELAY: Duration = Duration::from_secs(3);
const POLL_MAX_DELAY: Duration = Duration::from_secs(15);

/// Give up waiting for a report after this long.
const REPORT_DEADLINE: Duration = Duration::from_secs(120);

pub struct VirusTotalClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl VirusTotalClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root. Used by tests against a
    /// local stub server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    /// Submit a URL for scanning. Returns immediately with the scan id;
    /// the verdict report becomes available asynchronously.
    pub async fn analyze_url(&self, url: &str) -> Result<String> {
        let mut form = HashMap::new();
        form.insert("url", url.to_string());

        let resp = self
            .client
            .post(format!("{}/urls", self.base_url))
            .header("x-apikey", &self.api_key)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VirusTotalError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let handle: ApiResponse<ScanHandle> = resp.json().await?;
        Ok(handle.data.id)
    }

    /// Fetch the verdict report for a scan id. The report may still be in
    /// `queued` state; callers that need a settled verdict should use
    /// [`wait_for_report`](Self::wait_for_report).
    pub async fn fetch_report(&self, scan_id: &str) -> Result<Report> {
        let resp = self
            .client
            .get(format!("{}/analyses/{}", self.base_url, scan_id))
            .header("x-apikey", &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VirusTotalError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let analysis: ApiResponse<Analysis> = resp.json().await?;
        Ok(analysis.data.attributes)
    }

    /// Poll until the analysis completes, backing off between attempts.
    ///
    /// Scans need settling time on the VirusTotal side before the report is
    /// queryable; polling with backoff replaces a blind fixed sleep.
    pub async fn wait_for_report(&self, scan_id: &str) -> Result<Report> {
        let deadline = Instant::now() + REPORT_DEADLINE;
        let mut delay = POLL_INITIAL_DELAY;

        loop {
            let report = self.fetch_report(scan_id).await?;
            if report.is_completed() {
                return Ok(report);
            }

            tracing::debug!(scan_id, status = %report.status, "report not ready");
            if Instant::now() + delay > deadline {
                return Err(VirusTotalError::ReportTimeout(REPORT_DEADLINE));
            }
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(POLL_MAX_DELAY);
        }
    }

    /// Best-effort IP resolution via the domain report's DNS records.
    ///
    /// Enrichment fallback only: every failure (parse, network, missing
    /// data) is swallowed and yields `None`.
    pub async fn resolve_domain_ip(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let domain = parsed.host_str()?;

        let resp = self
            .client
            .get(format!("{}/domains/{}", self.base_url, domain))
            .header("x-apikey", &self.api_key)
            .send()
            .await
            .ok()?;

        if !resp.status().is_success() {
            tracing::debug!(domain, status = %resp.status(), "domain report lookup failed");
            return None;
        }

        let report: ApiResponse<Domain> = resp.json().await.ok()?;
        report.data.attributes.first_a_record()
    }
}
