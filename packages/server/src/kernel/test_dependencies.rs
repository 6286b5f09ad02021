//! Canned service implementations for tests.
//!
//! Each mock records how often it was invoked so tests can assert which
//! pipeline stages ran. Configure behavior at construction; the mocks are
//! immutable afterwards and safe to share behind an `Arc`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domains::analysis::models::{
    GeoInfo, HostLocation, VendorResult, VerdictReport,
};
use crate::kernel::renderer::RenderError;
use crate::kernel::summarizer::NO_THREAT_SUMMARY;
use crate::kernel::traits::{
    BaseNetworkIntel, BaseRenderer, BaseReputationService, BaseSummarizer,
};

/// Build a settled verdict report with the given counts. A malicious count
/// above zero adds a flagged vendor entry so summarization sees findings.
pub fn verdict_report(malicious: u32, harmless: u32, ip: Option<&str>) -> VerdictReport {
    let mut stats = HashMap::new();
    stats.insert("malicious".to_string(), malicious);
    stats.insert("harmless".to_string(), harmless);

    let mut vendor_results = vec![VendorResult {
        vendor_name: "CleanVendor".to_string(),
        category: Some("harmless".to_string()),
        verdict: Some("clean".to_string()),
    }];
    if malicious > 0 {
        vendor_results.push(VendorResult {
            vendor_name: "FlagVendor".to_string(),
            category: Some("malicious".to_string()),
            verdict: Some("phishing".to_string()),
        });
    }

    VerdictReport {
        stats,
        vendor_results,
        ip_address: ip.map(|s| s.to_string()),
    }
}

/// Renderer stub: succeeds with the conventional screenshot path, or fails
/// with a configured error.
#[derive(Default)]
pub struct StaticRenderer {
    calls: AtomicUsize,
    fail_navigation: bool,
    fail_provision: bool,
    delay: Option<Duration>,
}

impl StaticRenderer {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn failing_navigation() -> Self {
        Self {
            fail_navigation: true,
            ..Self::default()
        }
    }

    pub fn failing_provision() -> Self {
        Self {
            fail_provision: true,
            ..Self::default()
        }
    }

    /// Succeeds after sleeping; used to keep workers busy in queue tests.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseRenderer for StaticRenderer {
    async fn capture(&self, _url: &str, job_id: Uuid) -> Result<String, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_navigation {
            return Err(RenderError::Navigation(
                "net::ERR_NAME_NOT_RESOLVED".to_string(),
            ));
        }
        if self.fail_provision {
            return Err(RenderError::Provision("docker daemon unreachable".to_string()));
        }
        Ok(format!("/static/screenshots/{}.png", job_id))
    }
}

/// Reputation stub serving a fixed report (or a fixed failure).
pub struct StaticReputation {
    report: VerdictReport,
    resolved_ip: Option<String>,
    fail_report: bool,
    report_delay: Option<Duration>,
    analyze_calls: AtomicUsize,
}

impl StaticReputation {
    pub fn with_report(report: VerdictReport) -> Self {
        Self {
            report,
            resolved_ip: None,
            fail_report: false,
            report_delay: None,
            analyze_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_report() -> Self {
        Self {
            report: VerdictReport::default(),
            resolved_ip: None,
            fail_report: true,
            report_delay: None,
            analyze_calls: AtomicUsize::new(0),
        }
    }

    /// Fallback address for URLs whose report carries no IP.
    pub fn with_resolved_ip(mut self, ip: &str) -> Self {
        self.resolved_ip = Some(ip.to_string());
        self
    }

    /// Delay report settling; lets tests observe intermediate progress.
    pub fn with_report_delay(mut self, delay: Duration) -> Self {
        self.report_delay = Some(delay);
        self
    }

    pub fn analyze_call_count(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseReputationService for StaticReputation {
    async fn analyze_url(&self, _url: &str) -> Result<String> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        Ok("scan-1".to_string())
    }

    async fn wait_for_report(&self, _scan_id: &str) -> Result<VerdictReport> {
        if let Some(delay) = self.report_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_report {
            anyhow::bail!("VirusTotal API error (500): upstream exploded");
        }
        Ok(self.report.clone())
    }

    async fn resolve_domain_ip(&self, _url: &str) -> Option<String> {
        self.resolved_ip.clone()
    }
}

/// Network intelligence stub returning a fixed GeoInfo.
pub struct StaticNetworkIntel {
    geo: GeoInfo,
    calls: AtomicUsize,
}

impl StaticNetworkIntel {
    pub fn located(country: &str, city: &str) -> Self {
        Self {
            geo: GeoInfo::Located(HostLocation {
                ip: Some("203.0.113.7".to_string()),
                country_name: Some(country.to_string()),
                city: Some(city.to_string()),
                latitude: Some(52.37),
                longitude: Some(4.9),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            geo: GeoInfo::unavailable("Could not retrieve Shodan data."),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseNetworkIntel for StaticNetworkIntel {
    async fn host_info(&self, _ip: &str) -> GeoInfo {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.geo.clone()
    }
}

/// Summarizer stub mirroring the real short-circuit: canned text for clean
/// verdicts, a counted "upstream" call otherwise.
#[derive(Default)]
pub struct CountingSummarizer {
    upstream_calls: AtomicUsize,
}

impl CountingSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upstream_call_count(&self) -> usize {
        self.upstream_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseSummarizer for CountingSummarizer {
    async fn summarize(&self, vendor_results: &[VendorResult], _geo_info: &GeoInfo) -> String {
        let flagged = vendor_results.iter().filter(|v| v.is_malicious()).count();
        if flagged == 0 {
            return NO_THREAT_SUMMARY.to_string();
        }
        self.upstream_calls.fetch_add(1, Ordering::SeqCst);
        format!("Mock summary covering {} malicious findings.", flagged)
    }
}
