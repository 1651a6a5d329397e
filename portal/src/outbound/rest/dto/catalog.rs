//! Course and offering DTOs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::dates::optional_date;
use super::{lenient_text, lenient_u32, required, wire};
use crate::domain::{Course, CourseId, CourseOffering, CourseType, OfferingId, Quota};

#[derive(Debug, Deserialize)]
pub(in crate::outbound::rest) struct CourseDto {
    id: i64,
    #[serde(default, deserialize_with = "lenient_text")]
    nombre_curso: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    duracion: Option<u32>,
    #[serde(default, deserialize_with = "lenient_text")]
    temario: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    tipo_curso: Option<String>,
}

impl TryFrom<CourseDto> for Course {
    type Error = String;

    fn try_from(dto: CourseDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CourseId::new(dto.id),
            name: required(dto.nombre_curso, "nombre_curso", "curso")?,
            duration_hours: dto.duracion,
            syllabus: dto.temario,
            course_type: wire::<CourseType>(dto.tipo_curso.as_deref(), "tipo_curso", "curso")?,
        })
    }
}

/// Course embedded in an offering; older rows keep price and quota here.
#[derive(Debug, Default, Deserialize)]
struct EmbeddedCourseDto {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    nombre_curso: Option<String>,
    #[serde(default)]
    precio: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_u32")]
    cupos: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(in crate::outbound::rest) struct OfferingDto {
    id: i64,
    #[serde(default)]
    id_curso: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    codigo_curso: Option<String>,
    #[serde(default)]
    curso: Option<EmbeddedCourseDto>,
    #[serde(default, deserialize_with = "optional_date")]
    fecha_inicio_curso: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_date")]
    fecha_fin_curso: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_text")]
    horario: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    cupos: Option<u32>,
    #[serde(default)]
    precio: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_text")]
    foto: Option<String>,
}

impl TryFrom<OfferingDto> for CourseOffering {
    type Error = String;

    fn try_from(dto: OfferingDto) -> Result<Self, Self::Error> {
        let embedded = dto.curso.unwrap_or_default();
        let course_id = required(dto.id_curso.or(embedded.id), "id_curso", "oferta")?;
        let price = dto.precio.or(embedded.precio);
        if price.is_some_and(|price| price.is_sign_negative()) {
            return Err(format!("oferta {} has a negative price", dto.id));
        }
        Ok(Self {
            id: OfferingId::new(dto.id),
            course_id: CourseId::new(course_id),
            course_code: dto.codigo_curso,
            course_name: embedded.nombre_curso,
            starts_on: dto.fecha_inicio_curso,
            ends_on: dto.fecha_fin_curso,
            schedule: dto.horario,
            quota: Quota::new(dto.cupos.or(embedded.cupos).unwrap_or_default()),
            price,
            image_url: dto.foto,
        })
    }
}

/// Response of the atomic quota decrement.
#[derive(Debug, Deserialize)]
pub(in crate::outbound::rest) struct QuotaDto {
    #[serde(deserialize_with = "lenient_u32")]
    cupos: Option<u32>,
}

impl TryFrom<QuotaDto> for Quota {
    type Error = String;

    fn try_from(dto: QuotaDto) -> Result<Self, Self::Error> {
        required(dto.cupos, "cupos", "oferta").map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offering_reads_embedded_course_fallbacks() {
        let dto: OfferingDto = serde_json::from_str(
            r#"{"id":3,"codigo_curso":"SOL-01",
                "curso":{"id":1,"nombre_curso":"Soldadura","precio":"350000.00","cupos":"12"},
                "fecha_inicio_curso":"2024-02-01","horario":"Sábados"}"#,
        )
        .expect("dto decodes");
        let offering = CourseOffering::try_from(dto).expect("maps");

        assert_eq!(offering.course_id, CourseId::new(1));
        assert_eq!(offering.course_name.as_deref(), Some("Soldadura"));
        assert_eq!(offering.price, Some(Decimal::new(350_000, 0)));
        assert_eq!(offering.quota, Quota::new(12));
    }

    #[test]
    fn unknown_course_type_is_rejected() {
        let dto: CourseDto =
            serde_json::from_str(r#"{"id":1,"nombre_curso":"X","tipo_curso":"Largo"}"#)
                .expect("dto decodes");
        assert!(Course::try_from(dto).is_err());
    }

    #[test]
    fn quota_response_requires_cupos() {
        let dto: QuotaDto = serde_json::from_str(r#"{"cupos":null}"#).expect("dto decodes");
        assert!(Quota::try_from(dto).is_err());
    }
}
