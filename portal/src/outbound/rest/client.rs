//! Reqwest-backed client shared by every REST gateway.
//!
//! The client owns transport details only: URL building, the bearer session,
//! per-endpoint deadlines, the `Idempotency-Key` header, and mapping of HTTP
//! failures into [`GatewayError`]. Gateways decode bodies themselves.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::idempotency::StepKey;
use crate::domain::ports::GatewayError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_SLOW_TIMEOUT: Duration = Duration::from_secs(90);
const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Endpoint families that get the extended deadline.
pub const SLOW_PATH_PREFIXES: [&str; 6] = [
    "/api/email",
    "/api/correo",
    "/api/notificacion",
    "/auth/recuperar",
    "/api/usuarios/invitar",
    "/api/reportes/exportar",
];

/// Credentials attached to every request.
///
/// The token is wiped from memory when the session is dropped.
#[derive(Clone, Default)]
pub struct Session {
    token: Option<Zeroizing<String>>,
}

impl Session {
    /// Session without credentials.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session sending `Authorization: Bearer <token>`; blank tokens are ignored.
    pub fn bearer(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.trim().is_empty() {
            return Self::anonymous();
        }
        Self {
            token: Some(Zeroizing::new(token.trim().to_owned())),
        }
    }

    /// Whether a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref().map(String::as_str)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Connection settings for [`RestClient`].
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// Backend base URL; request paths are appended to it.
    pub base_url: Url,
    /// Default deadline.
    pub timeout: Duration,
    /// Deadline for paths starting with one of `slow_prefixes`.
    pub slow_timeout: Duration,
    /// Path prefixes that get `slow_timeout`.
    pub slow_prefixes: Vec<String>,
}

impl RestClientConfig {
    /// Config with the default deadlines and slow endpoint families.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            slow_timeout: DEFAULT_SLOW_TIMEOUT,
            slow_prefixes: SLOW_PATH_PREFIXES.iter().map(|p| (*p).to_owned()).collect(),
        }
    }

    /// Override both deadlines.
    #[must_use]
    pub fn with_timeouts(mut self, timeout: Duration, slow_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.slow_timeout = slow_timeout;
        self
    }

    /// Deadline that applies to `path`.
    pub fn timeout_for(&self, path: &str) -> Duration {
        if self
            .slow_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            self.slow_timeout
        } else {
            self.timeout
        }
    }
}

/// HTTP client for the portal backend.
pub struct RestClient {
    client: Client,
    config: RestClientConfig,
    session: Session,
}

impl RestClient {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: RestClientConfig, session: Session) -> Result<Self, reqwest::Error> {
        let ceiling = config.timeout.max(config.slow_timeout);
        let client = Client::builder().timeout(ceiling).build()?;
        Ok(Self {
            client,
            config,
            session,
        })
    }

    pub(crate) async fn get(&self, path: &str) -> Result<Vec<u8>, GatewayError> {
        self.send(Method::GET, path, None::<&Value>, None).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<Vec<u8>, GatewayError> {
        self.send(Method::DELETE, path, None::<&Value>, None).await
    }

    pub(crate) async fn post<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
        key: Option<&StepKey>,
    ) -> Result<Vec<u8>, GatewayError> {
        self.send(Method::POST, path, Some(body), key).await
    }

    pub(crate) async fn patch<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, GatewayError> {
        self.send(Method::PATCH, path, Some(body), None).await
    }

    pub(crate) async fn patch_keyed<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
        key: &StepKey,
    ) -> Result<Vec<u8>, GatewayError> {
        self.send(Method::PATCH, path, Some(body), Some(key)).await
    }

    async fn send<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        key: Option<&StepKey>,
    ) -> Result<Vec<u8>, GatewayError> {
        let url = self.url(path)?;
        debug!(%method, %url, "backend request");
        let mut request = self
            .client
            .request(method, url)
            .timeout(self.config.timeout_for(path))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(key) = key {
            request = request.header(IDEMPOTENCY_HEADER, key.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        Ok(bytes.to_vec())
    }

    fn url(&self, path: &str) -> Result<Url, GatewayError> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let joined = format!("{base}/{}", path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|err| {
            GatewayError::invalid_request(format!("cannot build URL for {path}: {err}"))
        })
    }
}

pub(crate) fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::timeout(error.to_string())
    } else {
        GatewayError::transport(error.to_string())
    }
}

pub(crate) fn map_status_error(status: StatusCode, body: &[u8]) -> GatewayError {
    let detail = error_message(body).unwrap_or_else(|| body_preview(body));
    let message = if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        detail
    };

    match status {
        StatusCode::UNAUTHORIZED => GatewayError::unauthorized(message),
        StatusCode::NOT_FOUND => GatewayError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::timeout(message),
        _ => GatewayError::rejected(status.as_u16(), message),
    }
}

/// `message`, `mensaje`, or `error` from a JSON error envelope.
fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "mensaje", "error"].into_iter().find_map(|key| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
    })
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for non-network request and error mapping helpers.

    use super::*;
    use rstest::rstest;

    fn config(base: &str) -> RestClientConfig {
        RestClientConfig::new(Url::parse(base).expect("valid base"))
    }

    #[rstest]
    #[case::email("/api/email/send-payment-approved", 90)]
    #[case::report("/api/reportes/exportar/pagos", 90)]
    #[case::regular("/api/pago/4", 60)]
    fn slow_paths_get_the_extended_deadline(#[case] path: &str, #[case] secs: u64) {
        assert_eq!(
            config("https://api.example.org").timeout_for(path),
            Duration::from_secs(secs)
        );
    }

    #[rstest]
    #[case::plain("https://api.example.org", "https://api.example.org/api/cursos")]
    #[case::trailing_slash("https://api.example.org/", "https://api.example.org/api/cursos")]
    #[case::prefix("https://example.org/backend/", "https://example.org/backend/api/cursos")]
    fn urls_append_the_path(#[case] base: &str, #[case] expected: &str) {
        let client = RestClient::new(config(base), Session::anonymous()).expect("client");
        assert_eq!(client.url("/api/cursos").expect("url").as_str(), expected);
    }

    #[rstest]
    #[case::unauthorized(StatusCode::UNAUTHORIZED, "Unauthorized")]
    #[case::not_found(StatusCode::NOT_FOUND, "NotFound")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::conflict(StatusCode::CONFLICT, "Rejected")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, "Rejected")]
    fn maps_http_statuses(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, r#"{"mensaje":"Token inválido"}"#.as_bytes());
        let matched = match expected {
            "Unauthorized" => matches!(error, GatewayError::Unauthorized { .. }),
            "NotFound" => matches!(error, GatewayError::NotFound { .. }),
            "Timeout" => matches!(error, GatewayError::Timeout { .. }),
            "Rejected" => matches!(error, GatewayError::Rejected { .. }),
            _ => false,
        };
        assert!(matched, "{status} mapped to {error:?}");
    }

    #[test]
    fn accented_envelope_messages_survive() {
        let error = map_status_error(
            StatusCode::UNAUTHORIZED,
            r#"{"mensaje":"Token inválido"}"#.as_bytes(),
        );
        assert_eq!(error, GatewayError::unauthorized("Token inválido"));
        assert!(error.is_unauthorized());
    }

    #[rstest]
    #[case::message(br#"{"message":"Cupo agotado"}"#.as_slice(), "Cupo agotado")]
    #[case::mensaje(br#"{"mensaje":"Pago no encontrado"}"#.as_slice(), "Pago no encontrado")]
    #[case::html(
        b"<html>\n  <body>Bad   gateway</body>\n</html>".as_slice(),
        "<html> <body>Bad gateway</body> </html>"
    )]
    #[case::empty(b"".as_slice(), "status 400")]
    fn error_messages_prefer_the_envelope(#[case] body: &[u8], #[case] expected: &str) {
        let error = map_status_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            error,
            GatewayError::rejected(400_u16, expected),
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn session_debug_hides_the_token() {
        let session = Session::bearer("secret-token");
        assert!(session.is_authenticated());
        assert!(!format!("{session:?}").contains("secret-token"));
        assert!(!Session::bearer("   ").is_authenticated());
    }
}
