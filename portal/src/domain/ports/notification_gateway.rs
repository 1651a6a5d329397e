//! Driven port for outbound email notifications.

use async_trait::async_trait;

use super::GatewayError;

/// Content of the "payment approved" email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentApprovedEmail {
    /// Recipient address.
    pub email: String,
    /// Recipient display name.
    pub name: String,
    /// Course the payment was for.
    pub course: String,
}

/// Port for sending notification emails through the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Send the payment-approved email.
    async fn send_payment_approved(
        &self,
        email: &PaymentApprovedEmail,
    ) -> Result<(), GatewayError>;
}

/// Fixture implementation that accepts every email without sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureNotificationGateway;

#[async_trait]
impl NotificationGateway for FixtureNotificationGateway {
    async fn send_payment_approved(
        &self,
        _email: &PaymentApprovedEmail,
    ) -> Result<(), GatewayError> {
        Ok(())
    }
}
