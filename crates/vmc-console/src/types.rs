//! Shared types for the VMware Cloud console client.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_CSP_URL: &str = "https://console.cloud.vmware.com";
pub const DEFAULT_VMC_URL: &str = "https://vmc.vmware.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ─── Config ──────────────────────────────────────────────────────────

/// Connection settings for the console. The refresh token is redacted
/// from `Debug` output.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub refresh_token: SecretString,
    /// CSP (identity) base URL.
    pub csp_url: String,
    /// VMC API base URL.
    pub vmc_url: String,
    pub timeout_secs: u64,
}

impl ConsoleConfig {
    pub fn new(refresh_token: SecretString) -> Self {
        Self {
            refresh_token,
            csp_url: DEFAULT_CSP_URL.to_string(),
            vmc_url: DEFAULT_VMC_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ─── Auth ────────────────────────────────────────────────────────────

/// Raw response of the CSP `api-tokens/authorize` endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: SecretString,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Cached access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|t| Utc::now() >= t).unwrap_or(false)
    }
}

// ─── Orgs / SDDCs ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// The subset of `SddcResourceConfig` needed to reach its vCenter.
#[derive(Debug, Clone, Deserialize)]
pub struct SddcResourceConfig {
    #[serde(default)]
    pub vc_url: Option<String>,
    #[serde(default)]
    pub cloud_username: Option<String>,
    #[serde(default)]
    pub cloud_password: Option<SecretString>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sddc {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sddc_state: Option<String>,
    #[serde(default)]
    pub resource_config: Option<SddcResourceConfig>,
}

// ─── Account linking ─────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Subnet {
    #[serde(default)]
    pub subnet_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub availability_zone: Option<String>,
    #[serde(default)]
    pub subnet_cidr_block: Option<String>,
    #[serde(default)]
    pub compatible: Option<bool>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VpcInfoSubnets {
    #[serde(default)]
    pub cidr_block: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwsCompatibleSubnets {
    #[serde(default)]
    pub vpc_map: HashMap<String, VpcInfoSubnets>,
}
