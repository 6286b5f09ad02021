//! VirusTotal-backed implementation of the reputation service.

use anyhow::Result;
use async_trait::async_trait;
use virustotal::VirusTotalClient;

use crate::domains::analysis::models::{VendorResult, VerdictReport};
use crate::kernel::traits::BaseReputationService;

pub struct VirusTotalReputation {
    client: VirusTotalClient,
}

impl VirusTotalReputation {
    pub fn new(api_key: String) -> Self {
        Self {
            client: VirusTotalClient::new(api_key),
        }
    }

    pub fn from_client(client: VirusTotalClient) -> Self {
        Self { client }
    }
}

/// Reduce the raw API report to the fields the pipeline consumes. Vendors
/// are sorted by name so the sequence is stable across polls of the same
/// report.
fn to_verdict_report(report: virustotal::Report) -> VerdictReport {
    let mut vendor_results: Vec<VendorResult> = report
        .results
        .into_iter()
        .map(|(vendor_name, verdict)| VendorResult {
            vendor_name,
            category: verdict.category,
            verdict: verdict.result,
        })
        .collect();
    vendor_results.sort_by(|a, b| a.vendor_name.cmp(&b.vendor_name));

    VerdictReport {
        stats: report.stats,
        vendor_results,
        ip_address: report.ip_address,
    }
}

#[async_trait]
impl BaseReputationService for VirusTotalReputation {
    async fn analyze_url(&self, url: &str) -> Result<String> {
        Ok(self.client.analyze_url(url).await?)
    }

    async fn wait_for_report(&self, scan_id: &str) -> Result<VerdictReport> {
        let report = self.client.wait_for_report(scan_id).await?;
        Ok(to_verdict_report(report))
    }

    async fn resolve_domain_ip(&self, url: &str) -> Option<String> {
        self.client.resolve_domain_ip(url).await
    }
}
