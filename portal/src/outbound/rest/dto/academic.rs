//! DTOs for grades, attendance, teaching, support content, and the
//! document/notification endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::dates::optional_date;
use super::{lenient_text, required, wire};
use crate::domain::ports::PaymentApprovedEmail;
use crate::domain::{
    AssignmentId, Attendance, AttendanceId, ContentId, EnrollmentId, GradeId, GradeState,
    GradeUpsert, Module, ModuleAssignment, ModuleGrade, ModuleId, NewAttendance,
    NewModuleAssignment, NewTeacher, OfferingId, PersonId, Presence, SupportContent,
    SupportContentDraft, Teacher, TeacherId,
};

#[derive(Debug, Deserialize)]
pub(in crate::outbound::rest) struct ModuleGradeDto {
    id: i64,
    #[serde(default)]
    id_persona: Option<i64>,
    #[serde(default)]
    id_oferta_curso: Option<i64>,
    #[serde(default)]
    id_modulo: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    estado: Option<String>,
}

impl TryFrom<ModuleGradeDto> for ModuleGrade {
    type Error = String;

    fn try_from(dto: ModuleGradeDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: GradeId::new(dto.id),
            person_id: PersonId::new(required(dto.id_persona, "id_persona", "nota")?),
            offering_id: OfferingId::new(required(
                dto.id_oferta_curso,
                "id_oferta_curso",
                "nota",
            )?),
            module_id: ModuleId::new(required(dto.id_modulo, "id_modulo", "nota")?),
            state: wire(dto.estado.as_deref(), "estado", "nota")?.unwrap_or(GradeState::Pending),
        })
    }
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct GradeUpsertBody {
    id_persona: PersonId,
    id_oferta_curso: OfferingId,
    id_modulo: ModuleId,
    estado: GradeState,
}

impl From<&GradeUpsert> for GradeUpsertBody {
    fn from(grade: &GradeUpsert) -> Self {
        Self {
            id_persona: grade.person_id,
            id_oferta_curso: grade.offering_id,
            id_modulo: grade.module_id,
            estado: grade.state,
        }
    }
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct GradePatchBody {
    pub(in crate::outbound::rest) estado: GradeState,
}

/// `asistio` arrives as `"Si"`/`"No"` or, from older rows, a boolean.
fn lenient_presence<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(true)) => Some(Presence::Present.as_wire().to_owned()),
        Some(Value::Bool(false)) => Some(Presence::Absent.as_wire().to_owned()),
        Some(Value::String(text)) => Some(text.trim().to_owned()).filter(|text| !text.is_empty()),
        _ => None,
    })
}

#[derive(Debug, Deserialize)]
pub(in crate::outbound::rest) struct AttendanceDto {
    id: i64,
    #[serde(default)]
    id_curso_matriculado: Option<i64>,
    #[serde(default)]
    id_persona: Option<i64>,
    #[serde(default, deserialize_with = "optional_date")]
    fecha: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_presence")]
    asistio: Option<String>,
}

impl TryFrom<AttendanceDto> for Attendance {
    type Error = String;

    fn try_from(dto: AttendanceDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AttendanceId::new(dto.id),
            enrollment_id: EnrollmentId::new(required(
                dto.id_curso_matriculado,
                "id_curso_matriculado",
                "asistencia",
            )?),
            person_id: PersonId::new(required(dto.id_persona, "id_persona", "asistencia")?),
            date: required(dto.fecha, "fecha", "asistencia")?,
            presence: required(
                wire(dto.asistio.as_deref(), "asistio", "asistencia")?,
                "asistio",
                "asistencia",
            )?,
        })
    }
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct NewAttendanceBody {
    id_curso_matriculado: EnrollmentId,
    id_persona: PersonId,
    fecha: NaiveDate,
    asistio: Presence,
}

impl From<&NewAttendance> for NewAttendanceBody {
    fn from(attendance: &NewAttendance) -> Self {
        Self {
            id_curso_matriculado: attendance.enrollment_id,
            id_persona: attendance.person_id,
            fecha: attendance.date,
            asistio: attendance.presence,
        }
    }
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct AttendancePatchBody {
    pub(in crate::outbound::rest) asistio: Presence,
}

#[derive(Debug, Deserialize)]
pub(in crate::outbound::rest) struct ModuleDto {
    id: i64,
    #[serde(default)]
    id_oferta_curso: Option<i64>,
    #[serde(default, alias = "nombre_modulo", deserialize_with = "lenient_text")]
    nombre: Option<String>,
}

impl TryFrom<ModuleDto> for Module {
    type Error = String;

    fn try_from(dto: ModuleDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ModuleId::new(dto.id),
            offering_id: OfferingId::new(required(
                dto.id_oferta_curso,
                "id_oferta_curso",
                "módulo",
            )?),
            name: required(dto.nombre, "nombre", "módulo")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(in crate::outbound::rest) struct TeacherDto {
    id: i64,
    #[serde(default)]
    id_persona: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    especialidad: Option<String>,
    #[serde(default, deserialize_with = "optional_date")]
    fecha_contratacion: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_date")]
    fecha_terminacion: Option<NaiveDate>,
}

impl TryFrom<TeacherDto> for Teacher {
    type Error = String;

    fn try_from(dto: TeacherDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TeacherId::new(dto.id),
            person_id: PersonId::new(required(dto.id_persona, "id_persona", "docente")?),
            specialty: dto.especialidad,
            hired_on: dto.fecha_contratacion,
            terminated_on: dto.fecha_terminacion,
        })
    }
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct NewTeacherBody<'a> {
    id_persona: PersonId,
    #[serde(skip_serializing_if = "Option::is_none")]
    especialidad: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fecha_contratacion: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fecha_terminacion: Option<NaiveDate>,
}

impl<'a> From<&'a NewTeacher> for NewTeacherBody<'a> {
    fn from(teacher: &'a NewTeacher) -> Self {
        Self {
            id_persona: teacher.person_id,
            especialidad: teacher.specialty.as_deref(),
            fecha_contratacion: teacher.hired_on,
            fecha_terminacion: teacher.terminated_on,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct EmbeddedNameDto {
    #[serde(default, deserialize_with = "lenient_text")]
    nombre: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    apellido: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EmbeddedTeacherDto {
    #[serde(default)]
    persona: Option<EmbeddedNameDto>,
}

#[derive(Debug, Deserialize)]
pub(in crate::outbound::rest) struct AssignmentDto {
    id: i64,
    #[serde(default)]
    id_modulo: Option<i64>,
    #[serde(default)]
    id_docente: Option<i64>,
    #[serde(default)]
    id_oferta_curso: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    nombre_docente: Option<String>,
    #[serde(default)]
    docente: Option<EmbeddedTeacherDto>,
}

impl AssignmentDto {
    fn teacher_name(&mut self) -> Option<String> {
        if let Some(name) = self.nombre_docente.take() {
            return Some(name);
        }
        let person = self.docente.take()?.persona?;
        let name = [person.nombre, person.apellido]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        Some(name).filter(|name| !name.is_empty())
    }
}

impl TryFrom<AssignmentDto> for ModuleAssignment {
    type Error = String;

    fn try_from(mut dto: AssignmentDto) -> Result<Self, Self::Error> {
        let teacher_name = dto.teacher_name();
        Ok(Self {
            id: AssignmentId::new(dto.id),
            module_id: ModuleId::new(required(dto.id_modulo, "id_modulo", "asignación")?),
            teacher_id: TeacherId::new(required(dto.id_docente, "id_docente", "asignación")?),
            offering_id: OfferingId::new(required(
                dto.id_oferta_curso,
                "id_oferta_curso",
                "asignación",
            )?),
            teacher_name,
        })
    }
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct NewAssignmentBody {
    id_modulo: ModuleId,
    id_docente: TeacherId,
    id_oferta_curso: OfferingId,
}

impl From<&NewModuleAssignment> for NewAssignmentBody {
    fn from(assignment: &NewModuleAssignment) -> Self {
        Self {
            id_modulo: assignment.module_id,
            id_docente: assignment.teacher_id,
            id_oferta_curso: assignment.offering_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(in crate::outbound::rest) struct SupportContentDto {
    id: i64,
    #[serde(default)]
    id_oferta_curso: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    titulo: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    descripcion: Option<String>,
    #[serde(default, alias = "url", deserialize_with = "lenient_text")]
    url_contenido: Option<String>,
}

impl TryFrom<SupportContentDto> for SupportContent {
    type Error = String;

    fn try_from(dto: SupportContentDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ContentId::new(dto.id),
            offering_id: OfferingId::new(required(
                dto.id_oferta_curso,
                "id_oferta_curso",
                "contenido",
            )?),
            title: required(dto.titulo, "titulo", "contenido")?,
            description: dto.descripcion,
            url: dto.url_contenido,
        })
    }
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct SupportContentBody<'a> {
    id_oferta_curso: OfferingId,
    titulo: &'a str,
    descripcion: Option<&'a str>,
    url_contenido: Option<&'a str>,
}

impl<'a> From<&'a SupportContentDraft> for SupportContentBody<'a> {
    fn from(draft: &'a SupportContentDraft) -> Self {
        Self {
            id_oferta_curso: draft.offering_id,
            titulo: draft.title.trim(),
            descripcion: draft.description.as_deref(),
            url_contenido: draft.url.as_deref().map(str::trim),
        }
    }
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct CertificateRequestBody {
    pub(in crate::outbound::rest) id_curso_matriculado: EnrollmentId,
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct PaymentApprovedEmailBody<'a> {
    email: &'a str,
    nombre: &'a str,
    curso: &'a str,
}

impl<'a> From<&'a PaymentApprovedEmail> for PaymentApprovedEmailBody<'a> {
    fn from(email: &'a PaymentApprovedEmail) -> Self {
        Self {
            email: &email.email,
            nombre: &email.name,
            curso: &email.course,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::text(json!("Si"), Presence::Present)]
    #[case::accented(json!("Sí"), Presence::Present)]
    #[case::absent(json!("No"), Presence::Absent)]
    #[case::boolean(json!(true), Presence::Present)]
    fn attendance_accepts_presence_spellings(#[case] asistio: Value, #[case] expected: Presence) {
        let dto: AttendanceDto = serde_json::from_value(json!({
            "id": 5, "id_curso_matriculado": 40, "id_persona": 7,
            "fecha": "2024-02-03T00:00:00.000Z", "asistio": asistio
        }))
        .expect("dto decodes");
        let attendance = Attendance::try_from(dto).expect("maps");
        assert_eq!(attendance.presence, expected);
        assert_eq!(attendance.date, NaiveDate::from_ymd_opt(2024, 2, 3).expect("date"));
    }

    #[test]
    fn grade_without_state_is_pending() {
        let dto: ModuleGradeDto = serde_json::from_value(
            json!({"id": 1, "id_persona": 7, "id_oferta_curso": 3, "id_modulo": 11}),
        )
        .expect("dto decodes");
        assert_eq!(ModuleGrade::try_from(dto).expect("maps").state, GradeState::Pending);
    }

    #[test]
    fn assignment_joins_embedded_teacher_name() {
        let dto: AssignmentDto = serde_json::from_value(json!({
            "id": 2, "id_modulo": 11, "id_docente": 4, "id_oferta_curso": 3,
            "docente": {"persona": {"nombre": "Ana", "apellido": "Ruiz"}}
        }))
        .expect("dto decodes");
        let assignment = ModuleAssignment::try_from(dto).expect("maps");
        assert_eq!(assignment.teacher_name.as_deref(), Some("Ana Ruiz"));
    }

    #[test]
    fn email_body_uses_backend_field_names() {
        let email = PaymentApprovedEmail {
            email: "laura@example.org".to_owned(),
            name: "Laura".to_owned(),
            course: "Soldadura básica".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(PaymentApprovedEmailBody::from(&email)).expect("serialises"),
            json!({"email": "laura@example.org", "nombre": "Laura", "curso": "Soldadura básica"})
        );
    }
}
