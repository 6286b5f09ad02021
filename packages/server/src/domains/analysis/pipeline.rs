//! Pipeline orchestration for one URL analysis.
//!
//! Runs the stages in sequence on a worker, recording progress at each
//! boundary. Renderer failures and a failed primary report fetch are fatal;
//! network intelligence and summarization degrade to in-band markers and
//! the pipeline continues with partial data.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::models::{ActivityEntry, AnalysisReport, AnalysisResult, GeoInfo, RiskLevel};
use crate::kernel::jobs::{AnalysisRequest, JobStore, ResultCache};
use crate::kernel::renderer::RenderError;
use crate::kernel::ServerDeps;

/// Fatal pipeline outcomes, classified for the job's error message. A
/// sandbox navigation failure reads differently to the user than any other
/// breakage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("URL unreachable or invalid: {0}")]
    UnreachableUrl(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

pub struct AnalysisPipeline {
    jobs: Arc<JobStore>,
    cache: Arc<ResultCache>,
    deps: ServerDeps,
    job_timeout: Duration,
}

impl AnalysisPipeline {
    pub fn new(
        jobs: Arc<JobStore>,
        cache: Arc<ResultCache>,
        deps: ServerDeps,
        job_timeout: Duration,
    ) -> Self {
        Self {
            jobs,
            cache,
            deps,
            job_timeout,
        }
    }

    /// Run the full analysis for one request and settle its job. Never
    /// returns an error: every outcome lands in the job store.
    pub async fn execute(&self, request: AnalysisRequest) {
        let AnalysisRequest { job_id, url } = request;

        match tokio::time::timeout(self.job_timeout, self.run_stages(job_id, &url)).await {
            Ok(Ok(result)) => self.persist(job_id, &url, result).await,
            Ok(Err(e)) => {
                warn!(job_id = %job_id, url = %url, error = %e, "analysis failed");
                self.jobs.fail(job_id, e.to_string()).await;
            }
            Err(_) => {
                warn!(job_id = %job_id, url = %url, "analysis timed out");
                self.jobs
                    .fail(
                        job_id,
                        format!(
                            "unexpected error: analysis timed out after {}s",
                            self.job_timeout.as_secs()
                        ),
                    )
                    .await;
            }
        }
    }

    /// History first, then cache, then the job: a cache entry must never
    /// exist without its history record.
    async fn persist(&self, job_id: Uuid, url: &str, result: AnalysisResult) {
        match self.deps.history.append(&result).await {
            Ok(record) => {
                self.cache.insert(url.to_string(), record.clone()).await;
                self.jobs.complete(job_id, record).await;
                info!(job_id = %job_id, url = %url, "analysis complete");
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "failed to persist analysis");
                self.jobs
                    .fail(job_id, format!("unexpected error: {:#}", e))
                    .await;
            }
        }
    }

    async fn run_stages(&self, job_id: Uuid, url: &str) -> Result<AnalysisResult, PipelineError> {
        self.jobs.advance(job_id, 0.3, "Capturing screenshot").await;
        let screenshot_url =
            self.deps
                .renderer
                .capture(url, job_id)
                .await
                .map_err(|e| match e {
                    RenderError::Navigation(detail) => PipelineError::UnreachableUrl(detail),
                    other => PipelineError::Unexpected(other.to_string()),
                })?;
        let activity_log = vec![ActivityEntry::now(format!(
            "Navigation to {} inside sandbox",
            url
        ))];

        self.jobs
            .advance(job_id, 0.6, "Analyzing with reputation service")
            .await;
        let scan_id = self
            .deps
            .reputation
            .analyze_url(url)
            .await
            .map_err(|e| PipelineError::Unexpected(format!("{:#}", e)))?;
        let report = self
            .deps
            .reputation
            .wait_for_report(&scan_id)
            .await
            .map_err(|e| PipelineError::Unexpected(format!("{:#}", e)))?;

        // Reports don't always carry the address; fall back to domain DNS
        // data before giving up on enrichment.
        let ip_address = match report.ip_address.clone() {
            Some(ip) => Some(ip),
            None => self.deps.reputation.resolve_domain_ip(url).await,
        };
        info!(job_id = %job_id, ip = ?ip_address, "resolved network address");

        self.jobs.advance(job_id, 0.7, "Analyzing IP").await;
        let geo_info = match &ip_address {
            Some(ip) => self.deps.network_intel.host_info(ip).await,
            None => GeoInfo::unavailable("No IP address found"),
        };

        self.jobs
            .advance(job_id, 0.8, "Generating AI summary")
            .await;
        let summary = self
            .deps
            .summarizer
            .summarize(&report.vendor_results, &geo_info)
            .await;

        Ok(AnalysisResult {
            request_url: url.to_string(),
            screenshot_url,
            activity_log,
            report: AnalysisReport {
                risk_level: RiskLevel::from_stats(&report.stats),
                stats: report.stats,
                vendor_results: report.vendor_results,
                summary,
                geo_info,
            },
        })
    }
}
