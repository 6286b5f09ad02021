//! Wire types for the VirusTotal v3 API.
//!
//! Only the fields this client consumes are modeled; everything else in the
//! (large) API payloads is ignored during deserialization.

use std::collections::HashMap;

use serde::Deserialize;

/// Generic `{"data": ...}` envelope used by every v3 endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Handle returned when a URL is submitted for scanning.
#[derive(Debug, Deserialize)]
pub struct ScanHandle {
    pub id: String,
}

/// `GET /analyses/{id}` payload.
#[derive(Debug, Deserialize)]
pub struct Analysis {
    pub attributes: Report,
}

/// Verdict report for a submitted URL.
///
/// `status` is `"queued"` or `"completed"`; stats and per-engine results are
/// only meaningful once the analysis has completed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub stats: HashMap<String, u32>,
    #[serde(default)]
    pub results: HashMap<String, EngineVerdict>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl Report {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }

    /// Count of engines that classified the URL as malicious.
    pub fn malicious_count(&self) -> u32 {
        self.stats.get("malicious").copied().unwrap_or(0)
    }
}

/// Per-engine classification inside a report.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineVerdict {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub engine_name: Option<String>,
}

/// `GET /domains/{domain}` payload, reduced to the DNS records we scan.
#[derive(Debug, Deserialize)]
pub struct Domain {
    pub attributes: DomainAttributes,
}

#[derive(Debug, Default, Deserialize)]
pub struct DomainAttributes {
    #[serde(default)]
    pub last_dns_records: Vec<DnsRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DnsRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl DomainAttributes {
    /// First address-type (A) record value, if any.
    pub fn first_a_record(&self) -> Option<String> {
        self.last_dns_records
            .iter()
            .find(|r| r.record_type == "A")
            .and_then(|r| r.value.clone())
    }
}
