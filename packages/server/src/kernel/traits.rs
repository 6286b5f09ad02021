// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. The analysis
// pipeline decides what to do with the data these services return.
//
// Naming convention: Base* for trait names (e.g., BaseRenderer)

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domains::analysis::models::{GeoInfo, VendorResult, VerdictReport};
use crate::kernel::renderer::RenderError;

// =============================================================================
// Reputation Service Trait (Infrastructure - URL verdict lookups)
// =============================================================================

#[async_trait]
pub trait BaseReputationService: Send + Sync {
    /// Submit a URL for scanning; returns the scan id.
    async fn analyze_url(&self, url: &str) -> Result<String>;

    /// Block until the verdict report for a scan has settled.
    async fn wait_for_report(&self, scan_id: &str) -> Result<VerdictReport>;

    /// Best-effort IP resolution from domain reputation data. Failures are
    /// swallowed; `None` means "no address known".
    async fn resolve_domain_ip(&self, url: &str) -> Option<String>;
}

// =============================================================================
// Network Intelligence Trait (Infrastructure - host/location metadata)
// =============================================================================

#[async_trait]
pub trait BaseNetworkIntel: Send + Sync {
    /// Host metadata for an IP address. Upstream failures degrade to
    /// [`GeoInfo::Unavailable`]; this call never fails.
    async fn host_info(&self, ip: &str) -> GeoInfo;
}

// =============================================================================
// Summarization Trait (Infrastructure - LLM risk narrative)
// =============================================================================

#[async_trait]
pub trait BaseSummarizer: Send + Sync {
    /// Natural-language risk summary for the vendor verdicts and host
    /// location. Upstream failures degrade to a canned notice; this call
    /// never fails.
    async fn summarize(&self, vendor_results: &[VendorResult], geo_info: &GeoInfo) -> String;
}

// =============================================================================
// Isolation Renderer Trait (Infrastructure - sandboxed screenshot capture)
// =============================================================================

#[async_trait]
pub trait BaseRenderer: Send + Sync {
    /// Visit the URL in an isolated environment and capture a screenshot
    /// keyed by job id. Returns the public path of the stored artifact.
    async fn capture(&self, url: &str, job_id: Uuid) -> std::result::Result<String, RenderError>;
}
