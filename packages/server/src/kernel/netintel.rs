use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::domains::analysis::models::{GeoInfo, HostLocation};
use crate::kernel::traits::BaseNetworkIntel;

/// Shodan API client for host/location metadata
pub struct ShodanClient {
    api_key: String,
    client: reqwest::Client,
}

/// Shodan host response, reduced to the location fields we surface
#[derive(Debug, Deserialize)]
struct ShodanHost {
    #[serde(default)]
    ip_str: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl ShodanClient {
    /// Create a new Shodan client
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { api_key, client })
    }

    async fn fetch_host(&self, ip: &str) -> Result<HostLocation> {
        let response = self
            .client
            .get(format!("https://api.shodan.io/shodan/host/{}", ip))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .context("Shodan request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Shodan returned HTTP {} for {}", status, ip);
        }

        let host: ShodanHost = response
            .json()
            .await
            .context("Failed to parse Shodan response")?;

        Ok(HostLocation {
            ip: host.ip_str,
            country_name: host.country_name,
            city: host.city,
            latitude: host.latitude,
            longitude: host.longitude,
        })
    }
}

#[async_trait]
impl BaseNetworkIntel for ShodanClient {
    async fn host_info(&self, ip: &str) -> GeoInfo {
        match self.fetch_host(ip).await {
            Ok(location) => GeoInfo::Located(location),
            Err(e) => {
                // Enrichment only: a failed lookup degrades to an in-band
                // marker instead of failing the analysis.
                warn!(ip, error = %e, "Shodan lookup failed");
                GeoInfo::unavailable("Could not retrieve Shodan data.")
            }
        }
    }
}
