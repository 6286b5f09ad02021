// Risk summary generation using OpenAI
//
// This is the infrastructure implementation of BaseSummarizer.
// The pipeline decides when a summary is needed; this module decides how
// to produce one.

use std::time::Duration;

use async_trait::async_trait;
use rig::completion::Prompt;
use rig::providers::openai;

use crate::domains::analysis::models::{GeoInfo, VendorResult};
use crate::kernel::traits::BaseSummarizer;

/// Upstream completion calls are abandoned after this long.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(45);

/// Returned without any upstream call when no vendor flagged the URL.
pub const NO_THREAT_SUMMARY: &str = "Security vendors scanned this URL and found no specific \
    threats. As always, exercise caution when opening links.";

const PREAMBLE: &str =
    "You are a cybersecurity expert who explains findings so non-experts can understand them.";

/// OpenAI implementation of the risk summarizer
pub struct OpenAiSummarizer {
    client: openai::Client,
}

impl OpenAiSummarizer {
    pub fn new(api_key: String) -> Self {
        Self {
            client: openai::Client::new(&api_key),
        }
    }
}

/// `- Vendor: verdict` lines for every vendor that flagged the URL.
fn malicious_findings(vendor_results: &[VendorResult]) -> Vec<String> {
    vendor_results
        .iter()
        .filter(|v| v.is_malicious())
        .map(|v| {
            format!(
                "- {}: {}",
                v.vendor_name,
                v.verdict.as_deref().unwrap_or("flagged")
            )
        })
        .collect()
}

fn location_sentence(geo_info: &GeoInfo) -> Option<String> {
    match geo_info {
        GeoInfo::Located(location) => {
            let country = location.country_name.as_deref()?;
            let mut sentence = format!(
                "For reference, the site's server is located in {}",
                country
            );
            if let Some(city) = location.city.as_deref() {
                sentence.push_str(&format!(" ({})", city));
            }
            sentence.push('.');
            Some(sentence)
        }
        GeoInfo::Unavailable { .. } => None,
    }
}

fn build_prompt(findings: &[String], geo_info: &GeoInfo) -> String {
    format!(
        "Below are the analysis results for a URL. Summarize, in one paragraph a \
         non-expert can follow, what risks a visitor faces when opening it.\n\n\
         [Malicious findings]\n{}\n\n\
         [Server location]\n{}",
        findings.join("\n"),
        location_sentence(geo_info).unwrap_or_else(|| "No location information available".into())
    )
}

fn failure_notice(category: &str) -> String {
    format!(
        "The AI risk summary could not be generated. (upstream failure: {})",
        category
    )
}

#[async_trait]
impl BaseSummarizer for OpenAiSummarizer {
    async fn summarize(&self, vendor_results: &[VendorResult], geo_info: &GeoInfo) -> String {
        let findings = malicious_findings(vendor_results);
        if findings.is_empty() {
            // Nothing flagged: skip the upstream call entirely.
            return NO_THREAT_SUMMARY.to_string();
        }

        let prompt = build_prompt(&findings, geo_info);
        tracing::debug!(
            findings = findings.len(),
            prompt_length = prompt.len(),
            "Requesting risk summary"
        );

        let agent = self
            .client
            .agent(openai::GPT_4O)
            .preamble(PREAMBLE)
            .max_tokens(1024)
            .build();

        match tokio::time::timeout(UPSTREAM_TIMEOUT, agent.prompt(prompt.as_str())).await {
            Ok(Ok(text)) => {
                tracing::info!(response_length = text.len(), "Risk summary generated");
                text
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Summary completion failed");
                failure_notice("completion error")
            }
            Err(_) => {
                tracing::error!(timeout = ?UPSTREAM_TIMEOUT, "Summary completion timed out");
                failure_notice("timeout")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::analysis::models::HostLocation;

    fn vendor(name: &str, category: &str, verdict: Option<&str>) -> VendorResult {
        VendorResult {
            vendor_name: name.to_string(),
            category: Some(category.to_string()),
            verdict: verdict.map(|v| v.to_string()),
        }
    }

    #[tokio::test]
    async fn clean_verdicts_short_circuit_to_canned_summary() {
        // Dummy key: the canned path must never reach the network.
        let summarizer = OpenAiSummarizer::new("test-key".into());
        let vendors = vec![
            vendor("Alpha", "harmless", Some("clean")),
            vendor("Beta", "undetected", None),
        ];

        let summary = summarizer
            .summarize(&vendors, &GeoInfo::unavailable("No IP address found"))
            .await;
        assert_eq!(summary, NO_THREAT_SUMMARY);
    }

    #[test]
    fn malicious_findings_only_include_flagged_vendors() {
        let vendors = vec![
            vendor("Alpha", "malicious", Some("phishing")),
            vendor("Beta", "harmless", Some("clean")),
            vendor("Gamma", "malicious", None),
        ];

        let findings = malicious_findings(&vendors);
        assert_eq!(findings, vec!["- Alpha: phishing", "- Gamma: flagged"]);
    }

    #[test]
    fn prompt_embeds_findings_and_location() {
        let geo = GeoInfo::Located(HostLocation {
            ip: Some("203.0.113.7".into()),
            country_name: Some("Netherlands".into()),
            city: Some("Amsterdam".into()),
            latitude: None,
            longitude: None,
        });

        let prompt = build_prompt(&["- Alpha: phishing".to_string()], &geo);
        assert!(prompt.contains("- Alpha: phishing"));
        assert!(prompt.contains("Netherlands (Amsterdam)"));
    }

    #[test]
    fn prompt_notes_missing_location() {
        let prompt = build_prompt(
            &["- Alpha: phishing".to_string()],
            &GeoInfo::unavailable("Could not retrieve Shodan data."),
        );
        assert!(prompt.contains("No location information available"));
    }
}
