//! IP-geolocation lookup for Natter
//!
//! A thin client over the public, unauthenticated ip-api.com JSON endpoint.
//! One GET per lookup, a single timeout from config, no retry or backoff.

use crate::config::IpInfoConfig;
use crate::error::{NatterError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Geolocation record for an IP address, as returned by ip-api.com.
///
/// All fields default: the service's failure payload carries only
/// `status`, `message`, and `query`, so decoding must tolerate the rest
/// being absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpInfo {
    /// The IP address the lookup resolved
    #[serde(default)]
    pub query: String,
    /// "success" or "fail"
    #[serde(default)]
    pub status: String,
    /// Failure reason, present only when status is "fail"
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, rename = "countryCode")]
    pub country_code: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, rename = "regionName")]
    pub region_name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub isp: String,
    #[serde(default)]
    pub org: String,
    /// AS number and organization, e.g. "AS15169 Google LLC"
    #[serde(default, rename = "as")]
    pub asn: String,
}

impl IpInfo {
    /// Whether the lookup succeeded according to the service
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// "City, Region, Country" display string
    pub fn formatted_location(&self) -> String {
        format!("{}, {}, {}", self.city, self.region_name, self.country)
    }

    /// Coordinates are finite and within the valid lat/lon ranges.
    ///
    /// Guards downstream consumers from NaN/Infinity slipping out of the
    /// decoded payload.
    pub fn has_valid_coordinates(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// HTTP client for IP-geolocation lookups
pub struct IpInfoClient {
    client: Client,
    base_url: String,
}

impl IpInfoClient {
    /// Create a new client from config
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(config: &IpInfoConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("natter/0.1.0")
            .build()
            .map_err(|e| NatterError::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Look up geolocation for the caller's own public IP
    pub async fn fetch(&self) -> Result<IpInfo> {
        self.fetch_url(format!("{}/", self.base_url)).await
    }

    /// Look up geolocation for a specific IP address
    pub async fn fetch_for(&self, ip: &str) -> Result<IpInfo> {
        self.fetch_url(format!("{}/{}", self.base_url, ip)).await
    }

    async fn fetch_url(&self, url: String) -> Result<IpInfo> {
        tracing::debug!("Fetching IP info from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("IP info request failed: {}", e);
            NatterError::Fetch(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("IP info service returned {}: {}", status, error_text);
            return Err(NatterError::Fetch(format!(
                "Service returned {}: {}",
                status, error_text
            ))
            .into());
        }

        let info: IpInfo = response.json().await.map_err(|e| {
            tracing::warn!("Failed to decode IP info response: {}", e);
            NatterError::Fetch(format!("Failed to decode response: {}", e))
        })?;

        if !info.is_success() {
            return Err(NatterError::Fetch(format!(
                "Lookup failed for {:?}: {}",
                info.query, info.message
            ))
            .into());
        }

        Ok(info)
    }
}
