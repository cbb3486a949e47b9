//! Provider configuration with environment overrides.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `VALUESCORE_YAHOO_BASE` | [`ProviderConfig::yahoo_base_url`] |
//! | `VALUESCORE_CONSTITUENTS_URL` | [`ProviderConfig::constituents_url`] |
//! | `VALUESCORE_TIMEOUT_MS` | [`ProviderConfig::timeout_ms`] |
//! | `YAHOO_COOKIE` | [`ProviderConfig::cookie`] |

use crate::ValidationError;

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_SESSION_URL: &str = "https://fc.yahoo.com";
pub const DEFAULT_CONSTITUENTS_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Endpoints and transport settings used by the network providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub yahoo_base_url: String,
    pub session_url: String,
    pub constituents_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
    /// Pre-established Yahoo session cookie; skips the cookie handshake.
    pub cookie: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            yahoo_base_url: String::from(DEFAULT_YAHOO_BASE_URL),
            session_url: String::from(DEFAULT_SESSION_URL),
            constituents_url: String::from(DEFAULT_CONSTITUENTS_URL),
            user_agent: format!("valuescore/{}", env!("CARGO_PKG_VERSION")),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            cookie: None,
        }
    }
}

impl ProviderConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base) = non_empty(lookup("VALUESCORE_YAHOO_BASE")) {
            config.yahoo_base_url = base.trim_end_matches('/').to_owned();
        }
        if let Some(url) = non_empty(lookup("VALUESCORE_CONSTITUENTS_URL")) {
            config.constituents_url = url;
        }
        if let Some(raw) = non_empty(lookup("VALUESCORE_TIMEOUT_MS")) {
            config.timeout_ms = parse_timeout(&raw)?;
        }
        config.cookie = non_empty(lookup("YAHOO_COOKIE"));

        Ok(config)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn crumb_url(&self) -> String {
        format!("{}/v1/test/getcrumb", self.yahoo_base_url)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_timeout(raw: &str) -> Result<u64, ValidationError> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ValidationError::InvalidConfig {
            key: "VALUESCORE_TIMEOUT_MS",
            value: raw.to_owned(),
        }),
    }
}
