//! ipinfo.io lookups
//!
//! The upstream token stays on the server; browsers only ever talk to the
//! proxy endpoints.

use std::net::IpAddr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned {0}")]
    Status(reqwest::StatusCode),
}

/// Client for the ipinfo.io JSON API
#[derive(Debug, Clone)]
pub struct IpInfoClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl IpInfoClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// `{base}/{ip}/json`, or `{base}/json` for the server's own address
    pub fn lookup_url(&self, ip: Option<IpAddr>) -> String {
        let mut url = match ip {
            Some(ip) => format!("{}/{}/json", self.base_url, ip),
            None => format!("{}/json", self.base_url),
        };
        if let Some(token) = &self.token {
            url.push_str("?token=");
            url.push_str(token);
        }
        url
    }

    /// Fetch and decode one lookup; any non-2xx answer is an error
    pub async fn lookup<T: DeserializeOwned>(&self, ip: Option<IpAddr>) -> Result<T, GeoError> {
        let url = self.lookup_url(ip);
        tracing::debug!(ip = ?ip, "ipinfo lookup");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Status(status));
        }
        Ok(response.json::<T>().await?)
    }
}

/// The fields of an ipinfo.io answer the tools display
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpInfo {
    #[serde(default)]
    pub ip: String,
    pub hostname: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    /// `"lat,lng"`
    pub loc: Option<String>,
    pub org: Option<String>,
    pub postal: Option<String>,
    pub timezone: Option<String>,
}

impl IpInfo {
    /// Latitude and longitude parsed from `loc`
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let (lat, lng) = self.loc.as_deref()?.split_once(',')?;
        Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
    }

    /// Country flag built from regional indicator symbols
    pub fn flag_emoji(&self) -> Option<String> {
        let code = self.country.as_deref()?.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        code.to_ascii_uppercase()
            .chars()
            .map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
            .collect()
    }
}

/// What `/api/my-ip` answers with
#[derive(Debug, Clone, Serialize)]
pub struct IpSummary {
    #[serde(flatten)]
    pub info: IpInfo,
    pub flag: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<IpInfo> for IpSummary {
    fn from(info: IpInfo) -> Self {
        let coordinates = info.coordinates();
        Self {
            flag: info.flag_emoji(),
            latitude: coordinates.map(|(lat, _)| lat),
            longitude: coordinates.map(|(_, lng)| lng),
            info,
        }
    }
}

/// Addresses ipinfo.io knows nothing about; these are looked up as "self"
pub fn is_public(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            let unique_local = (v6.segments()[0] & 0xfe00) == 0xfc00;
            let link_local = (v6.segments()[0] & 0xffc0) == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}
