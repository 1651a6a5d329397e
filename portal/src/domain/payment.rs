//! Payments made against enrollments and the administrator's decision on them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::wire::wire_enum;
use super::{Enrollment, EnrollmentId, PaymentId, Person, PersonId};

/// Payment method recorded when the caller does not choose one.
pub const DEFAULT_PAYMENT_METHOD: &str = "Nequi";

wire_enum! {
    /// Verification status of a payment.
    ///
    /// `Aprobado` and `Aceptado` are legacy spellings of `Pagado`.
    pub enum PaymentStatus {
        /// Submitted, awaiting an administrator.
        Pending => "Pendiente",
        /// Accepted by an administrator.
        Paid => "Pagado" | "Aprobado" | "Aceptado",
        /// Rejected by an administrator.
        Rejected => "Rechazado",
    }
}

impl PaymentStatus {
    /// Whether an administrator may still decide on the payment.
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Administrator decision on a pending payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDecision {
    /// Accept the payment.
    Approve,
    /// Reject the payment.
    Reject,
}

impl PaymentDecision {
    /// Status the payment moves to.
    pub const fn target_status(self) -> PaymentStatus {
        match self {
            Self::Approve => PaymentStatus::Paid,
            Self::Reject => PaymentStatus::Rejected,
        }
    }
}

/// A payment as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Backend identifier.
    pub id: PaymentId,
    /// Paying person.
    pub person_id: PersonId,
    /// Enrollment the payment settles.
    pub enrollment_id: EnrollmentId,
    /// Payment method label (e.g. `Nequi`).
    pub method: String,
    /// Amount paid.
    pub amount: Decimal,
    /// Verification status.
    pub status: PaymentStatus,
    /// Public URL of the uploaded receipt.
    pub receipt_url: Option<String>,
    /// Transaction reference supplied by the payer.
    pub reference: Option<String>,
    /// When the payment was made.
    pub paid_at: Option<DateTime<Utc>>,
}

/// Creation payload for a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    /// Paying person.
    pub person_id: PersonId,
    /// Enrollment the payment settles.
    pub enrollment_id: EnrollmentId,
    /// Payment method label.
    pub method: String,
    /// Amount paid.
    pub amount: Decimal,
    /// Initial status (always pending from the submission saga).
    pub status: PaymentStatus,
    /// Public URL of the uploaded receipt.
    pub receipt_url: String,
    /// Object-storage path of the receipt.
    pub receipt_path: String,
    /// Transaction reference supplied by the payer.
    pub reference: Option<String>,
    /// When the payment was made.
    pub paid_at: DateTime<Utc>,
}

/// A payment with the related records the approval saga needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetail {
    /// The payment itself.
    pub payment: Payment,
    /// Paying person, when embedded by the backend.
    pub person: Option<Person>,
    /// Linked enrollment, when embedded by the backend.
    pub enrollment: Option<Enrollment>,
    /// Course name of the linked offering.
    pub course_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Pendiente", PaymentStatus::Pending)]
    #[case("Pagado", PaymentStatus::Paid)]
    #[case("Aprobado", PaymentStatus::Paid)]
    #[case("aceptado", PaymentStatus::Paid)]
    #[case("Rechazado", PaymentStatus::Rejected)]
    fn status_synonyms_collapse(#[case] raw: &str, #[case] expected: PaymentStatus) {
        assert_eq!(raw.parse::<PaymentStatus>(), Ok(expected));
    }

    #[test]
    fn unknown_status_is_an_error() {
        assert!("Reembolsado".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn decisions_map_to_terminal_statuses() {
        assert_eq!(PaymentDecision::Approve.target_status().as_wire(), "Pagado");
        assert_eq!(PaymentDecision::Reject.target_status().as_wire(), "Rechazado");
    }
}
