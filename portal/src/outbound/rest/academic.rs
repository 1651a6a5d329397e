//! Grade, attendance, and teaching endpoints.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::RestClient;
use super::dto::{
    AssignmentDto, AttendanceDto, AttendancePatchBody, GradePatchBody, GradeUpsertBody,
    ModuleDto, ModuleGradeDto, NewAssignmentBody, NewAttendanceBody, NewTeacherBody, TeacherDto,
};
use super::envelope::{decode_record, decode_records};
use crate::domain::ports::{AttendanceGateway, GatewayError, ModuleGradeGateway, TeachingGateway};
use crate::domain::{
    Attendance, AttendanceId, EnrollmentId, GradeId, GradeState, GradeUpsert, Module,
    ModuleAssignment, ModuleGrade, ModuleId, NewAttendance, NewModuleAssignment, NewTeacher,
    OfferingId, PersonId, Presence, Teacher,
};

/// [`ModuleGradeGateway`] over `/api/notas-modulo`.
pub struct HttpModuleGradeGateway {
    client: Arc<RestClient>,
}

impl HttpModuleGradeGateway {
    /// Gateway sharing `client`.
    pub const fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModuleGradeGateway for HttpModuleGradeGateway {
    async fn list_for_person(
        &self,
        person: PersonId,
        offering: OfferingId,
    ) -> Result<Vec<ModuleGrade>, GatewayError> {
        let body = self
            .client
            .get(&format!("/api/notas-modulo/{person}/{offering}"))
            .await?;
        decode_records::<ModuleGradeDto, _>(&body, "notas")
    }

    async fn list_for_module(
        &self,
        module: ModuleId,
        offering: OfferingId,
    ) -> Result<Vec<ModuleGrade>, GatewayError> {
        let body = self
            .client
            .get(&format!("/api/notas-modulo/modulo/{module}/oferta/{offering}"))
            .await?;
        decode_records::<ModuleGradeDto, _>(&body, "notas")
    }

    async fn upsert(&self, grade: &GradeUpsert) -> Result<ModuleGrade, GatewayError> {
        let body = self
            .client
            .post("/api/notas-modulo", &GradeUpsertBody::from(grade), None)
            .await?;
        decode_record::<ModuleGradeDto, _>(&body, "nota")
    }

    async fn update_state(
        &self,
        id: GradeId,
        state: GradeState,
    ) -> Result<ModuleGrade, GatewayError> {
        let body = self
            .client
            .patch(
                &format!("/api/notas-modulo/{id}"),
                &GradePatchBody { estado: state },
            )
            .await?;
        decode_record::<ModuleGradeDto, _>(&body, "nota")
    }
}

/// [`AttendanceGateway`] over `/api/asistencia`.
pub struct HttpAttendanceGateway {
    client: Arc<RestClient>,
}

impl HttpAttendanceGateway {
    /// Gateway sharing `client`.
    pub const fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AttendanceGateway for HttpAttendanceGateway {
    async fn list_for_enrollment(
        &self,
        person: PersonId,
        enrollment: EnrollmentId,
    ) -> Result<Vec<Attendance>, GatewayError> {
        let body = self
            .client
            .get(&format!("/api/asistencia/persona/{person}/curso/{enrollment}"))
            .await?;
        decode_records::<AttendanceDto, _>(&body, "asistencias")
    }

    async fn create(&self, attendance: &NewAttendance) -> Result<Attendance, GatewayError> {
        let body = self
            .client
            .post("/api/asistencia", &NewAttendanceBody::from(attendance), None)
            .await?;
        decode_record::<AttendanceDto, _>(&body, "asistencia")
    }

    async fn update(
        &self,
        id: AttendanceId,
        presence: Presence,
    ) -> Result<Attendance, GatewayError> {
        let body = self
            .client
            .patch(
                &format!("/api/asistencia/{id}"),
                &AttendancePatchBody { asistio: presence },
            )
            .await?;
        decode_record::<AttendanceDto, _>(&body, "asistencia")
    }
}

/// [`TeachingGateway`] over `/api/modulos`, `/api/modulo-docente`, and `/api/docentes`.
pub struct HttpTeachingGateway {
    client: Arc<RestClient>,
}

impl HttpTeachingGateway {
    /// Gateway sharing `client`.
    pub const fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TeachingGateway for HttpTeachingGateway {
    async fn register_teacher(&self, teacher: &NewTeacher) -> Result<Teacher, GatewayError> {
        let body = self
            .client
            .post("/api/docentes", &NewTeacherBody::from(teacher), None)
            .await?;
        decode_record::<TeacherDto, _>(&body, "docente")
    }

    async fn modules_for_offering(
        &self,
        offering: OfferingId,
    ) -> Result<Vec<Module>, GatewayError> {
        let body = self
            .client
            .get(&format!("/api/modulos/oferta/{offering}"))
            .await?;
        decode_records::<ModuleDto, _>(&body, "modulos")
    }

    async fn assignments_for_offering(
        &self,
        offering: OfferingId,
    ) -> Result<Vec<ModuleAssignment>, GatewayError> {
        let body = self
            .client
            .get(&format!("/api/modulo-docente/oferta/{offering}"))
            .await?;
        decode_records::<AssignmentDto, _>(&body, "asignaciones")
    }

    async fn create_assignment(
        &self,
        assignment: &NewModuleAssignment,
    ) -> Result<ModuleAssignment, GatewayError> {
        let body = self
            .client
            .post(
                "/api/modulo-docente",
                &NewAssignmentBody::from(assignment),
                None,
            )
            .await?;
        decode_record::<AssignmentDto, _>(&body, "asignacion")
    }
}
