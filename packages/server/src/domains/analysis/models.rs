//! Analysis result model.
//!
//! An [`AnalysisResult`] is assembled once by the pipeline and immutable
//! afterwards; the job store, result cache and history store each hold their
//! own copy.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall risk classification for an analyzed URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Info,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// High exactly when at least one engine flagged the URL malicious.
    pub fn from_stats(stats: &HashMap<String, u32>) -> Self {
        if stats.get("malicious").copied().unwrap_or(0) > 0 {
            RiskLevel::High
        } else {
            RiskLevel::Info
        }
    }
}

/// One security vendor's classification of the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorResult {
    pub vendor_name: String,
    pub category: Option<String>,
    pub verdict: Option<String>,
}

impl VendorResult {
    pub fn is_malicious(&self) -> bool {
        self.category.as_deref() == Some("malicious")
    }
}

/// Settled verdict report from the reputation service, reduced to the
/// fields the pipeline consumes. Transient: not persisted as-is.
#[derive(Debug, Clone, Default)]
pub struct VerdictReport {
    pub stats: HashMap<String, u32>,
    pub vendor_results: Vec<VendorResult>,
    pub ip_address: Option<String>,
}

/// Host location metadata, or an in-band error marker when the network
/// intelligence lookup failed or no address was available. The marker is
/// valid (if incomplete) data for downstream stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeoInfo {
    // Unavailable must come first: untagged deserialization tries variants
    // in order, and Located's all-optional fields would match anything.
    Unavailable { error: String },
    Located(HostLocation),
}

impl GeoInfo {
    pub fn unavailable(error: impl Into<String>) -> Self {
        GeoInfo::Unavailable {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostLocation {
    pub ip: Option<String>,
    pub country_name: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Timestamped event observed during the sandboxed visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub event: String,
}

impl ActivityEntry {
    pub fn now(event: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            event: event.into(),
        }
    }
}

/// Verdict section of a completed analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub risk_level: RiskLevel,
    pub stats: HashMap<String, u32>,
    pub vendor_results: Vec<VendorResult>,
    pub summary: String,
    pub geo_info: GeoInfo,
}

/// Complete outcome of one URL analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub request_url: String,
    pub screenshot_url: String,
    pub activity_log: Vec<ActivityEntry>,
    pub report: AnalysisReport,
}

/// A persisted analysis: the result plus the store-assigned identifier and
/// persist-time timestamp. This is the shape served to pollers and by the
/// history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub analyzed_at: DateTime<Utc>,
}
