//! Payment DTOs, including the detail view with embedded person and enrollment.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dates::optional_timestamp;
use super::{EnrollmentDto, PersonDto, lenient_text, required, wire};
use crate::domain::{
    EnrollmentId, NewPayment, Payment, PaymentDetail, PaymentId, PaymentStatus, PersonId,
};

#[derive(Debug, Deserialize)]
pub(in crate::outbound::rest) struct PaymentDto {
    id: i64,
    #[serde(default)]
    id_persona: Option<i64>,
    #[serde(default)]
    id_curso_matriculado: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    forma_pago: Option<String>,
    #[serde(default)]
    monto: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_text")]
    estado: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    comprobante_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    referencia: Option<String>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    fecha_pago: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentDto> for Payment {
    type Error = String;

    fn try_from(dto: PaymentDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PaymentId::new(dto.id),
            person_id: PersonId::new(required(dto.id_persona, "id_persona", "pago")?),
            enrollment_id: EnrollmentId::new(required(
                dto.id_curso_matriculado,
                "id_curso_matriculado",
                "pago",
            )?),
            method: dto.forma_pago.unwrap_or_default(),
            amount: required(dto.monto, "monto", "pago")?,
            status: required(
                wire::<PaymentStatus>(dto.estado.as_deref(), "estado", "pago")?,
                "estado",
                "pago",
            )?,
            receipt_url: dto.comprobante_url,
            reference: dto.referencia,
            paid_at: dto.fecha_pago,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct CourseNameDto {
    #[serde(default, deserialize_with = "lenient_text")]
    nombre_curso: Option<String>,
    #[serde(default)]
    curso: Option<Box<CourseNameDto>>,
}

impl CourseNameDto {
    fn name(self) -> Option<String> {
        self.curso
            .and_then(|inner| inner.name())
            .or(self.nombre_curso)
    }
}

#[derive(Debug, Deserialize)]
struct EnrolledCourseDto {
    #[serde(flatten)]
    enrollment: EnrollmentDto,
    #[serde(default)]
    curso: Option<CourseNameDto>,
}

#[derive(Debug, Deserialize)]
pub(in crate::outbound::rest) struct PaymentDetailDto {
    #[serde(flatten)]
    payment: PaymentDto,
    #[serde(default)]
    persona: Option<PersonDto>,
    #[serde(default, rename = "cursoMatriculado", alias = "curso_matriculado")]
    enrolled: Option<EnrolledCourseDto>,
}

impl TryFrom<PaymentDetailDto> for PaymentDetail {
    type Error = String;

    fn try_from(dto: PaymentDetailDto) -> Result<Self, Self::Error> {
        let (enrollment, course_name) = match dto.enrolled {
            Some(enrolled) => (
                Some(enrolled.enrollment.try_into()?),
                enrolled.curso.and_then(CourseNameDto::name),
            ),
            None => (None, None),
        };
        Ok(Self {
            payment: dto.payment.try_into()?,
            person: dto.persona.map(TryInto::try_into).transpose()?,
            enrollment,
            course_name,
        })
    }
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct NewPaymentBody<'a> {
    id_persona: PersonId,
    id_curso_matriculado: EnrollmentId,
    forma_pago: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    monto: Decimal,
    estado: PaymentStatus,
    comprobante_url: &'a str,
    comprobante_path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    referencia: Option<&'a str>,
    fecha_pago: DateTime<Utc>,
}

impl<'a> From<&'a NewPayment> for NewPaymentBody<'a> {
    fn from(payment: &'a NewPayment) -> Self {
        Self {
            id_persona: payment.person_id,
            id_curso_matriculado: payment.enrollment_id,
            forma_pago: &payment.method,
            monto: payment.amount,
            estado: payment.status,
            comprobante_url: &payment.receipt_url,
            comprobante_path: &payment.receipt_path,
            referencia: payment.reference.as_deref(),
            fecha_pago: payment.paid_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct PaymentStatusBody {
    pub(in crate::outbound::rest) estado: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AcademicResult, EnrollmentStatus};
    use serde_json::json;

    #[test]
    fn detail_reads_nested_course_name() {
        let dto: PaymentDetailDto = serde_json::from_value(json!({
            "id": 90,
            "id_persona": 7,
            "id_curso_matriculado": 40,
            "forma_pago": "Nequi",
            "monto": "350000.00",
            "estado": "aceptado",
            "fecha_pago": "2024-03-01T12:00:00.000Z",
            "persona": {"id": 7, "nombre": "Laura", "correo": "laura@example.org"},
            "cursoMatriculado": {
                "id": 40, "id_persona": 7, "id_curso_oferta": 3,
                "estado": "Preinscrito", "resultado": "Pendiente",
                "curso": {"id": 3, "curso": {"nombre_curso": "Soldadura básica"}}
            }
        }))
        .expect("dto decodes");
        let detail = PaymentDetail::try_from(dto).expect("maps");

        assert_eq!(detail.payment.status, PaymentStatus::Paid);
        assert_eq!(detail.payment.amount, Decimal::new(350_000, 0));
        assert_eq!(detail.course_name.as_deref(), Some("Soldadura básica"));
        let enrollment = detail.enrollment.expect("enrollment embedded");
        assert_eq!(enrollment.status, EnrollmentStatus::PreEnrolled);
        assert_eq!(enrollment.result, AcademicResult::Pending);
        assert_eq!(detail.person.map(|p| p.name), Some("Laura".to_owned()));
    }

    #[test]
    fn unknown_status_is_a_mapping_error() {
        let dto: PaymentDto = serde_json::from_value(json!({
            "id": 1, "id_persona": 7, "id_curso_matriculado": 40,
            "monto": 10, "estado": "En revisión"
        }))
        .expect("dto decodes");
        assert!(Payment::try_from(dto).is_err());
    }

    #[test]
    fn new_payment_body_uses_wire_names() {
        let payment = NewPayment {
            person_id: PersonId::new(7),
            enrollment_id: EnrollmentId::new(40),
            method: "Nequi".to_owned(),
            amount: Decimal::new(350_000, 0),
            status: PaymentStatus::Pending,
            receipt_url: "https://storage.test/7/3/x.png".to_owned(),
            receipt_path: "7/3/x.png".to_owned(),
            reference: None,
            paid_at: DateTime::from_timestamp(1_709_294_400, 0).expect("valid timestamp"),
        };
        let body = serde_json::to_value(NewPaymentBody::from(&payment)).expect("serialises");

        assert_eq!(body["estado"], "Pendiente");
        assert_eq!(body["monto"], json!(350_000.0));
        assert_eq!(body["id_curso_matriculado"], 40);
        assert!(body.get("referencia").is_none());
    }
}
