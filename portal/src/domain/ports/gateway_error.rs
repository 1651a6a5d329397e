//! Error shared by every remote resource gateway.

use super::define_port_error;

define_port_error! {
    /// Failures surfaced by a backend gateway call.
    pub enum GatewayError {
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "backend transport failed: {message}",
        /// The request exceeded its deadline.
        Timeout { message: String } =>
            "backend request timed out: {message}",
        /// The backend rejected the session credentials (HTTP 401).
        Unauthorized { message: String } =>
            "backend rejected the session: {message}",
        /// The addressed resource does not exist (HTTP 404).
        NotFound { message: String } =>
            "backend resource not found: {message}",
        /// Any other non-2xx response.
        Rejected { status: u16, message: String } =>
            "backend rejected request with status {status}: {message}",
        /// The response body did not match the expected schema.
        Decode { message: String } =>
            "backend response decode failed: {message}",
        /// The adapter refused to build the request.
        InvalidRequest { message: String } =>
            "backend request invalid: {message}",
    }
}

impl GatewayError {
    /// Whether the failure means the session must be renewed.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}
