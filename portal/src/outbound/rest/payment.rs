//! Payment endpoints.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::RestClient;
use super::dto::{NewPaymentBody, PaymentDetailDto, PaymentDto, PaymentStatusBody};
use super::envelope::{decode_record, decode_records};
use crate::domain::idempotency::StepKey;
use crate::domain::ports::{GatewayError, PaymentGateway};
use crate::domain::{NewPayment, Payment, PaymentDetail, PaymentId, PaymentStatus};

/// [`PaymentGateway`] over `/api/pago`.
pub struct HttpPaymentGateway {
    client: Arc<RestClient>,
}

impl HttpPaymentGateway {
    /// Gateway sharing `client`.
    pub const fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create(&self, payment: &NewPayment, key: &StepKey) -> Result<Payment, GatewayError> {
        let payload = NewPaymentBody::from(payment);
        let body = self.client.post("/api/pago", &payload, Some(key)).await?;
        decode_record::<PaymentDto, _>(&body, "pago")
    }

    async fn list(&self) -> Result<Vec<Payment>, GatewayError> {
        let body = self.client.get("/api/pago").await?;
        decode_records::<PaymentDto, _>(&body, "pagos")
    }

    async fn find_detail(&self, id: PaymentId) -> Result<PaymentDetail, GatewayError> {
        let body = self.client.get(&format!("/api/pago/{id}")).await?;
        decode_record::<PaymentDetailDto, _>(&body, "pago")
    }

    async fn update_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        key: &StepKey,
    ) -> Result<(), GatewayError> {
        self.client
            .patch_keyed(
                &format!("/api/pago/{id}"),
                &PaymentStatusBody { estado: status },
                key,
            )
            .await
            .map(drop)
    }
}
