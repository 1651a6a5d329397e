//! Enrollment DTOs.

use serde::{Deserialize, Serialize};

use super::{lenient_text, required, wire};
use crate::domain::{
    AcademicResult, Enrollment, EnrollmentId, EnrollmentStatus, EnrollmentUpdate, NewEnrollment,
    OfferingId, PersonId,
};

#[derive(Debug, Deserialize)]
pub(in crate::outbound::rest) struct EnrollmentDto {
    id: i64,
    #[serde(default)]
    id_persona: Option<i64>,
    #[serde(default)]
    id_curso_oferta: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    estado: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    resultado: Option<String>,
}

impl TryFrom<EnrollmentDto> for Enrollment {
    type Error = String;

    fn try_from(dto: EnrollmentDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EnrollmentId::new(dto.id),
            person_id: PersonId::new(required(dto.id_persona, "id_persona", "matrícula")?),
            offering_id: OfferingId::new(required(
                dto.id_curso_oferta,
                "id_curso_oferta",
                "matrícula",
            )?),
            status: required(
                wire(dto.estado.as_deref(), "estado", "matrícula")?,
                "estado",
                "matrícula",
            )?,
            result: wire(dto.resultado.as_deref(), "resultado", "matrícula")?
                .unwrap_or(AcademicResult::Pending),
        })
    }
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct NewEnrollmentBody {
    id_persona: PersonId,
    id_curso_oferta: OfferingId,
    estado: EnrollmentStatus,
    resultado: AcademicResult,
}

impl From<&NewEnrollment> for NewEnrollmentBody {
    fn from(enrollment: &NewEnrollment) -> Self {
        Self {
            id_persona: enrollment.person_id,
            id_curso_oferta: enrollment.offering_id,
            estado: enrollment.status,
            resultado: enrollment.result,
        }
    }
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct EnrollmentPatchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    estado: Option<EnrollmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resultado: Option<AcademicResult>,
}

impl From<EnrollmentUpdate> for EnrollmentPatchBody {
    fn from(update: EnrollmentUpdate) -> Self {
        Self {
            estado: update.status,
            resultado: update.result,
        }
    }
}
