//! Driven port for payments.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::idempotency::StepKey;
use crate::domain::{NewPayment, Payment, PaymentDetail, PaymentId, PaymentStatus};

/// Port for payment records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment. `key` is forwarded as the `Idempotency-Key`.
    async fn create(&self, payment: &NewPayment, key: &StepKey) -> Result<Payment, GatewayError>;

    /// All payments, newest first as returned by the backend.
    async fn list(&self) -> Result<Vec<Payment>, GatewayError>;

    /// A payment together with its person, enrollment, and course name.
    async fn find_detail(&self, id: PaymentId) -> Result<PaymentDetail, GatewayError>;

    /// Change only the payment status. `key` is forwarded as the
    /// `Idempotency-Key`.
    async fn update_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        key: &StepKey,
    ) -> Result<(), GatewayError>;
}
