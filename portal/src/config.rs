//! Portal client configuration loaded via OrthoConfig.
//!
//! Every field can come from `PORTAL_*` environment variables, a config file,
//! or command-line flags; accessors supply the defaults.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::DEFAULT_PAYMENT_METHOD;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SLOW_REQUEST_TIMEOUT_SECS: u64 = 90;
const DEFAULT_STORAGE_BUCKET: &str = "pagos-funed";
const DEFAULT_JOURNAL_DIR: &str = ".portal/submissions";

/// Problems with configured values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A required value is missing.
    #[error("missing configuration value {field}")]
    Missing {
        /// Setting name.
        field: &'static str,
    },
    /// A URL setting could not be parsed.
    #[error("invalid URL in {field}: {message}")]
    InvalidUrl {
        /// Setting name.
        field: &'static str,
        /// Parser message.
        message: String,
    },
}

/// Connection and behaviour settings for the portal client.
///
/// Every field has a default so an empty environment still loads; missing
/// URLs surface later as [`SettingsError::Missing`].
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
#[serde(default)]
pub struct PortalSettings {
    /// Base URL of the REST backend, e.g. `https://api.example.org`.
    pub api_base_url: Option<String>,
    /// Session token sent as a bearer credential.
    pub bearer_token: Option<String>,
    /// Default per-request timeout in seconds.
    #[ortho_config(default = 60)]
    pub request_timeout_secs: u64,
    /// Timeout for slow endpoints (email, exports) in seconds.
    #[ortho_config(default = 90)]
    pub slow_request_timeout_secs: u64,
    /// Base URL of the object storage service.
    pub storage_url: Option<String>,
    /// API key for the object storage service.
    pub storage_api_key: Option<String>,
    /// Bucket receiving payment receipts.
    pub storage_bucket: Option<String>,
    /// Directory holding submission checkpoints.
    pub journal_dir: Option<PathBuf>,
    /// Payment method recorded on submissions.
    pub payment_method: Option<String>,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            bearer_token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            slow_request_timeout_secs: DEFAULT_SLOW_REQUEST_TIMEOUT_SECS,
            storage_url: None,
            storage_api_key: None,
            storage_bucket: None,
            journal_dir: None,
            payment_method: None,
        }
    }
}

impl PortalSettings {
    /// Backend base URL.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Missing`] when unset or blank, or
    /// [`SettingsError::InvalidUrl`] when it does not parse.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        parse_url("api_base_url", self.api_base_url.as_deref())
    }

    /// Storage base URL, falling back to the backend base URL.
    ///
    /// # Errors
    ///
    /// As [`Self::api_base_url`] for whichever value is used.
    pub fn storage_url(&self) -> Result<Url, SettingsError> {
        match self.storage_url.as_deref() {
            Some(raw) => parse_url("storage_url", Some(raw)),
            None => self.api_base_url(),
        }
    }

    /// Bearer token, if one is configured and not blank.
    pub fn bearer_token(&self) -> Option<&str> {
        non_blank(self.bearer_token.as_deref())
    }

    /// Storage API key, if one is configured and not blank.
    pub fn storage_api_key(&self) -> Option<&str> {
        non_blank(self.storage_api_key.as_deref())
    }

    /// Default request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Timeout for slow endpoints; never shorter than the default timeout.
    pub fn slow_request_timeout(&self) -> Duration {
        let slow = Duration::from_secs(self.slow_request_timeout_secs);
        slow.max(self.request_timeout())
    }

    /// Receipt bucket.
    pub fn storage_bucket(&self) -> &str {
        non_blank(self.storage_bucket.as_deref()).unwrap_or(DEFAULT_STORAGE_BUCKET)
    }

    /// Checkpoint directory.
    pub fn journal_dir(&self) -> PathBuf {
        self.journal_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JOURNAL_DIR))
    }

    /// Payment method for new submissions.
    pub fn payment_method(&self) -> &str {
        non_blank(self.payment_method.as_deref()).unwrap_or(DEFAULT_PAYMENT_METHOD)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_url(field: &'static str, raw: Option<&str>) -> Result<Url, SettingsError> {
    let raw = non_blank(raw).ok_or(SettingsError::Missing { field })?;
    Url::parse(raw).map_err(|err| SettingsError::InvalidUrl {
        field,
        message: err.to_string(),
    })
}
