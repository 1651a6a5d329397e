//! Reqwest-backed receipt store speaking the Supabase storage REST API.
//!
//! Objects are written with `x-upsert: true` so a retried upload of the same
//! path replaces the earlier object instead of failing.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::{Value, json};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{ReceiptStorage, ReceiptStorageError};
use crate::domain::{ReceiptFile, StoredReceipt};
use crate::outbound::rest::body_preview;

const OBJECT_PREFIX: &str = "storage/v1/object";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for [`HttpReceiptStorage`].
#[derive(Clone)]
pub struct ReceiptStorageConfig {
    /// Storage service base URL.
    pub base_url: Url,
    /// Bucket receiving the receipts.
    pub bucket: String,
    /// Service key sent as `apikey` and bearer token.
    pub api_key: Option<Zeroizing<String>>,
    /// Request deadline.
    pub timeout: Duration,
}

impl ReceiptStorageConfig {
    /// Config for `bucket` at `base_url` with the default deadline.
    pub fn new(base_url: Url, bucket: impl Into<String>) -> Self {
        Self {
            base_url,
            bucket: bucket.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Attach a service key; blank keys are ignored.
    #[must_use]
    pub fn with_api_key(mut self, key: Option<&str>) -> Self {
        self.api_key = key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| Zeroizing::new(key.to_owned()));
        self
    }

    /// Override the request deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for ReceiptStorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiptStorageConfig")
            .field("base_url", &self.base_url.as_str())
            .field("bucket", &self.bucket)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Receipt store over HTTP.
pub struct HttpReceiptStorage {
    client: Client,
    config: ReceiptStorageConfig,
}

impl HttpReceiptStorage {
    /// Build the adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: ReceiptStorageConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn base(&self) -> &str {
        self.config.base_url.as_str().trim_end_matches('/')
    }

    fn object_url(&self, path: &str) -> Result<Url, ReceiptStorageError> {
        let path = checked_path(path)?;
        parse_url(&format!(
            "{}/{OBJECT_PREFIX}/{}/{path}",
            self.base(),
            self.config.bucket
        ))
    }

    fn public_url(&self, path: &str) -> Result<Url, ReceiptStorageError> {
        let path = checked_path(path)?;
        parse_url(&format!(
            "{}/{OBJECT_PREFIX}/public/{}/{path}",
            self.base(),
            self.config.bucket
        ))
    }

    fn bucket_url(&self) -> Result<Url, ReceiptStorageError> {
        parse_url(&format!(
            "{}/{OBJECT_PREFIX}/{}",
            self.base(),
            self.config.bucket
        ))
    }

    fn authorise(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.api_key.as_deref() {
            Some(key) => request.header("apikey", key.as_str()).bearer_auth(key),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(), ReceiptStorageError> {
        let response = self
            .authorise(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn checked_path(path: &str) -> Result<&str, ReceiptStorageError> {
    let trimmed = path.trim();
    if trimmed.is_empty()
        || trimmed.starts_with('/')
        || trimmed.split('/').any(|segment| segment.is_empty() || segment == "..")
    {
        return Err(ReceiptStorageError::invalid_request(format!(
            "invalid object path `{path}`"
        )));
    }
    Ok(trimmed)
}

fn parse_url(raw: &str) -> Result<Url, ReceiptStorageError> {
    Url::parse(raw).map_err(|err| ReceiptStorageError::invalid_request(format!("{raw}: {err}")))
}

fn map_transport_error(error: reqwest::Error) -> ReceiptStorageError {
    ReceiptStorageError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ReceiptStorageError {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"].into_iter().find_map(|key| {
                value
                    .get(key)
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            })
        })
        .unwrap_or_else(|| body_preview(body));
    ReceiptStorageError::rejected(status.as_u16(), message)
}

#[async_trait]
impl ReceiptStorage for HttpReceiptStorage {
    async fn upload(
        &self,
        path: &str,
        receipt: &ReceiptFile,
    ) -> Result<StoredReceipt, ReceiptStorageError> {
        let url = self.object_url(path)?;
        let public_url = self.public_url(path)?;
        debug!(%url, bytes = receipt.bytes().len(), "uploading receipt");
        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, receipt.content_type())
            .header("x-upsert", "true")
            .body(receipt.bytes().to_vec());
        self.execute(request).await?;
        Ok(StoredReceipt {
            path: path.trim().to_owned(),
            public_url: public_url.to_string(),
        })
    }

    async fn remove(&self, path: &str) -> Result<(), ReceiptStorageError> {
        let path = checked_path(path)?;
        let url = self.bucket_url()?;
        debug!(%url, path, "removing receipt");
        let request = self
            .client
            .delete(url)
            .json(&json!({ "prefixes": [path] }));
        self.execute(request).await
    }
}
