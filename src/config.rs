use crate::error::{Result, TransferError};
use crate::tree::OrphanPolicy;

/// Connection and orchestration settings.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Store base URL; "/api" is appended when missing.
    pub base_url: String,
    /// Permanent token, sent as a bearer token.
    pub token: Option<String>,
    /// Per-request timeout. Expiry is reported as a transient failure.
    pub timeout_secs: u64,
    pub orphan_policy: OrphanPolicy,
    /// Page size for project article listings.
    pub page_size: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            token: None,
            timeout_secs: 30,
            orphan_policy: OrphanPolicy::default(),
            page_size: 100,
        }
    }
}

impl TransferConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();
        let defaults = Self::default();

        let base_url = dotenv::var("YOUTRACK_URL")
            .map_err(|_| TransferError::Config("YOUTRACK_URL required".to_string()))?;
        let token = dotenv::var("YOUTRACK_TOKEN").ok().filter(|t| !t.is_empty());

        let timeout_secs = match dotenv::var("TRANSFER_TIMEOUT_SECS") {
            Ok(v) => parse_number("TRANSFER_TIMEOUT_SECS", &v)?,
            Err(_) => defaults.timeout_secs,
        };
        let page_size = match dotenv::var("TRANSFER_PAGE_SIZE") {
            Ok(v) => parse_number("TRANSFER_PAGE_SIZE", &v)? as usize,
            Err(_) => defaults.page_size,
        };
        let orphan_policy = match dotenv::var("TRANSFER_ORPHAN_POLICY") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.orphan_policy,
        };

        Ok(Self {
            base_url,
            token,
            timeout_secs,
            orphan_policy,
            page_size,
        })
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(TransferError::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, value
        ))),
    }
}
