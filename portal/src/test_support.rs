//! Test utilities for the portal crate.
//!
//! [`InMemoryBackend`] implements every domain port against plain maps so unit
//! tests (in `src/`) and integration tests (in `tests/`) can drive the sagas
//! end to end. Any operation can be made to fail with [`InMemoryBackend::fail`]
//! to exercise compensation and partial-failure paths.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::idempotency::{StepKey, SubmissionKey};
use crate::domain::ports::{
    AttendanceGateway, CertificateGateway, CourseGateway, EnrollmentGateway, GatewayError,
    ModuleGradeGateway, NotificationGateway, OfferingGateway, PaymentApprovedEmail,
    PaymentGateway, PersonGateway, ReceiptStorage, ReceiptStorageError, SubmissionCheckpoint,
    SubmissionJournal, SubmissionJournalError, SupportContentGateway, TeachingGateway,
};
use crate::domain::{
    Attendance, AttendanceId, ContentId, Course, CourseId, CourseOffering, Enrollment,
    EnrollmentId, EnrollmentUpdate, GradeId, GradeState, GradeUpsert, Module, ModuleAssignment,
    ModuleGrade, ModuleId, NewAttendance, NewEnrollment, NewModuleAssignment, NewPayment,
    NewTeacher, OfferingId, Payment, PaymentDetail, PaymentId, PaymentStatus, Person, PersonId,
    Presence, Quota, ReceiptFile, Role, StoredReceipt, SupportContent, SupportContentDraft,
    Teacher, TeacherId,
};
use crate::inbound::cli::PortalPorts;

/// Every port operation the in-memory backend can serve or fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    /// `PersonGateway::find`.
    FindPerson,
    /// `PersonGateway::assign_role`.
    AssignRole,
    /// `PersonGateway::list_active_by_offering`.
    ListActivePeople,
    /// `CourseGateway::list`.
    ListCourses,
    /// `CourseGateway::find`.
    FindCourse,
    /// `OfferingGateway::find`.
    FindOffering,
    /// `OfferingGateway::decrement_quota`.
    DecrementQuota,
    /// `OfferingGateway::list_by_teacher`.
    ListTeacherOfferings,
    /// `EnrollmentGateway::create`.
    CreateEnrollment,
    /// `EnrollmentGateway::find`.
    FindEnrollment,
    /// `EnrollmentGateway::update`.
    UpdateEnrollment,
    /// `EnrollmentGateway::delete`.
    DeleteEnrollment,
    /// `EnrollmentGateway::list_for_person`.
    ListEnrollments,
    /// `PaymentGateway::create`.
    CreatePayment,
    /// `PaymentGateway::list`.
    ListPayments,
    /// `PaymentGateway::find_detail`.
    FindPaymentDetail,
    /// `PaymentGateway::update_status`.
    UpdatePaymentStatus,
    /// `ModuleGradeGateway::list_for_person`.
    ListPersonGrades,
    /// `ModuleGradeGateway::list_for_module`.
    ListModuleGrades,
    /// `ModuleGradeGateway::upsert`.
    UpsertGrade,
    /// `ModuleGradeGateway::update_state`.
    UpdateGrade,
    /// `AttendanceGateway::list_for_enrollment`.
    ListAttendance,
    /// `AttendanceGateway::create`.
    CreateAttendance,
    /// `AttendanceGateway::update`.
    UpdateAttendance,
    /// `TeachingGateway::register_teacher`.
    RegisterTeacher,
    /// `TeachingGateway::modules_for_offering`.
    ListModules,
    /// `TeachingGateway::assignments_for_offering`.
    ListAssignments,
    /// `TeachingGateway::create_assignment`.
    CreateAssignment,
    /// `SupportContentGateway::list_for_offering`.
    ListContents,
    /// `SupportContentGateway::create`.
    CreateContent,
    /// `SupportContentGateway::update`.
    UpdateContent,
    /// `SupportContentGateway::delete`.
    DeleteContent,
    /// `CertificateGateway::generate`.
    GenerateCertificate,
    /// `NotificationGateway::send_payment_approved`.
    SendEmail,
    /// `ReceiptStorage::upload`.
    UploadReceipt,
    /// `ReceiptStorage::remove`.
    RemoveReceipt,
    /// `SubmissionJournal::load`.
    LoadJournal,
    /// `SubmissionJournal::save`.
    SaveJournal,
    /// `SubmissionJournal::clear`.
    ClearJournal,
}

/// Mutable contents of the in-memory backend.
#[derive(Debug, Clone, Default)]
pub struct BackendState {
    /// People by id.
    pub people: BTreeMap<PersonId, Person>,
    /// Courses by id.
    pub courses: BTreeMap<CourseId, Course>,
    /// Offerings by id.
    pub offerings: BTreeMap<OfferingId, CourseOffering>,
    /// Enrollments by id.
    pub enrollments: BTreeMap<EnrollmentId, Enrollment>,
    /// Payments by id.
    pub payments: BTreeMap<PaymentId, Payment>,
    /// Module grades by id.
    pub grades: BTreeMap<GradeId, ModuleGrade>,
    /// Attendance records by id.
    pub attendance: BTreeMap<AttendanceId, Attendance>,
    /// Modules by id.
    pub modules: BTreeMap<ModuleId, Module>,
    /// Teachers by id.
    pub teachers: BTreeMap<TeacherId, Teacher>,
    /// Module assignments in creation order.
    pub assignments: Vec<ModuleAssignment>,
    /// Support content by id.
    pub contents: BTreeMap<ContentId, SupportContent>,
    /// Stored receipt objects: path to size in bytes.
    pub objects: BTreeMap<String, usize>,
    /// Receipt paths removed by compensation.
    pub removed_objects: Vec<String>,
    /// Emails sent.
    pub emails: Vec<PaymentApprovedEmail>,
    /// Certificates rendered.
    pub certificates: Vec<EnrollmentId>,
    /// Idempotency keys received with writes.
    pub idempotency_keys: Vec<String>,
    /// Journal checkpoints.
    pub journal: BTreeMap<String, SubmissionCheckpoint>,
    /// Every operation invoked, in order.
    pub calls: Vec<Operation>,
    failing: BTreeSet<Operation>,
    next_id: i64,
}

impl BackendState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id + 1000
    }

    /// Record `key`; `true` when the backend already applied a write with it.
    fn replayed(&mut self, key: &StepKey) -> bool {
        let seen = self.idempotency_keys.iter().any(|known| known == key.as_str());
        if !seen {
            self.idempotency_keys.push(key.as_str().to_owned());
        }
        seen
    }

    /// Number of times `operation` was invoked.
    pub fn calls_to(&self, operation: Operation) -> usize {
        self.calls.iter().filter(|call| **call == operation).count()
    }
}

/// In-memory implementation of every port.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<BackendState>,
}

impl InMemoryBackend {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call to `operation` fail until [`Self::recover`].
    pub fn fail(&self, operation: Operation) {
        self.with_state(|state| state.failing.insert(operation));
    }

    /// Stop failing `operation`.
    pub fn recover(&self, operation: Operation) {
        self.with_state(|state| state.failing.remove(&operation));
    }

    /// Run `f` with exclusive access to the state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut BackendState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> BackendState {
        self.with_state(|state| state.clone())
    }

    /// Number of times `operation` was invoked.
    pub fn calls_to(&self, operation: Operation) -> usize {
        self.with_state(|state| state.calls_to(operation))
    }

    fn call<T>(
        &self,
        operation: Operation,
        f: impl FnOnce(&mut BackendState) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        self.with_state(|state| {
            state.calls.push(operation);
            if state.failing.contains(&operation) {
                return Err(GatewayError::rejected(
                    503_u16,
                    format!("injected failure: {operation:?}"),
                ));
            }
            f(state)
        })
    }

    fn storage_call<T>(
        &self,
        operation: Operation,
        f: impl FnOnce(&mut BackendState) -> T,
    ) -> Result<T, ReceiptStorageError> {
        self.with_state(|state| {
            state.calls.push(operation);
            if state.failing.contains(&operation) {
                return Err(ReceiptStorageError::rejected(
                    503_u16,
                    format!("injected failure: {operation:?}"),
                ));
            }
            Ok(f(state))
        })
    }

    fn journal_call<T>(
        &self,
        operation: Operation,
        f: impl FnOnce(&mut BackendState) -> T,
    ) -> Result<T, SubmissionJournalError> {
        self.with_state(|state| {
            state.calls.push(operation);
            if state.failing.contains(&operation) {
                return Err(SubmissionJournalError::io(format!(
                    "injected failure: {operation:?}"
                )));
            }
            Ok(f(state))
        })
    }
}

/// Port bundle where every port is served by `backend`.
pub fn portal_ports(backend: &Arc<InMemoryBackend>) -> PortalPorts {
    PortalPorts {
        persons: backend.clone(),
        courses: backend.clone(),
        offerings: backend.clone(),
        enrollments: backend.clone(),
        payments: backend.clone(),
        grades: backend.clone(),
        attendance: backend.clone(),
        teaching: backend.clone(),
        contents: backend.clone(),
        certificates: backend.clone(),
        notifications: backend.clone(),
        storage: backend.clone(),
        journal: backend.clone(),
    }
}

fn not_found(what: &str, id: impl std::fmt::Display) -> GatewayError {
    GatewayError::not_found(format!("{what} {id}"))
}

#[async_trait]
impl PersonGateway for InMemoryBackend {
    async fn find(&self, id: PersonId) -> Result<Person, GatewayError> {
        self.call(Operation::FindPerson, |state| {
            state
                .people
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found("persona", id))
        })
    }

    async fn assign_role(
        &self,
        id: PersonId,
        role: &Role,
        key: &StepKey,
    ) -> Result<(), GatewayError> {
        self.call(Operation::AssignRole, |state| {
            state.replayed(key);
            let person = state
                .people
                .get_mut(&id)
                .ok_or_else(|| not_found("persona", id))?;
            person.role = role.clone();
            Ok(())
        })
    }

    async fn list_active_by_offering(
        &self,
        offering: OfferingId,
    ) -> Result<Vec<Person>, GatewayError> {
        self.call(Operation::ListActivePeople, |state| {
            let enrolled: BTreeSet<PersonId> = state
                .enrollments
                .values()
                .filter(|enrollment| {
                    enrollment.offering_id == offering
                        && enrollment.status == crate::domain::EnrollmentStatus::Active
                })
                .map(|enrollment| enrollment.person_id)
                .collect();
            Ok(enrolled
                .iter()
                .filter_map(|id| state.people.get(id).cloned())
                .collect())
        })
    }
}

#[async_trait]
impl CourseGateway for InMemoryBackend {
    async fn list(&self) -> Result<Vec<Course>, GatewayError> {
        self.call(Operation::ListCourses, |state| {
            Ok(state.courses.values().cloned().collect())
        })
    }

    async fn find(&self, id: CourseId) -> Result<Course, GatewayError> {
        self.call(Operation::FindCourse, |state| {
            state
                .courses
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found("curso", id))
        })
    }
}

#[async_trait]
impl OfferingGateway for InMemoryBackend {
    async fn find(&self, id: OfferingId) -> Result<CourseOffering, GatewayError> {
        self.call(Operation::FindOffering, |state| {
            state
                .offerings
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found("oferta", id))
        })
    }

    async fn decrement_quota(&self, id: OfferingId, key: &StepKey) -> Result<Quota, GatewayError> {
        self.call(Operation::DecrementQuota, |state| {
            let replayed = state.replayed(key);
            let offering = state
                .offerings
                .get_mut(&id)
                .ok_or_else(|| not_found("oferta", id))?;
            if !replayed {
                offering.quota = offering.quota.decremented();
            }
            Ok(offering.quota)
        })
    }

    async fn list_by_teacher(
        &self,
        person: PersonId,
    ) -> Result<Vec<CourseOffering>, GatewayError> {
        self.call(Operation::ListTeacherOfferings, |state| {
            let teacher_ids: BTreeSet<TeacherId> = state
                .teachers
                .values()
                .filter(|teacher| teacher.person_id == person)
                .map(|teacher| teacher.id)
                .collect();
            let offering_ids: BTreeSet<OfferingId> = state
                .assignments
                .iter()
                .filter(|assignment| teacher_ids.contains(&assignment.teacher_id))
                .map(|assignment| assignment.offering_id)
                .collect();
            Ok(offering_ids
                .iter()
                .filter_map(|id| state.offerings.get(id).cloned())
                .collect())
        })
    }
}

#[async_trait]
impl EnrollmentGateway for InMemoryBackend {
    async fn create(
        &self,
        enrollment: &NewEnrollment,
        key: &StepKey,
    ) -> Result<Enrollment, GatewayError> {
        self.call(Operation::CreateEnrollment, |state| {
            state.idempotency_keys.push(key.as_str().to_owned());
            let id = EnrollmentId::new(state.allocate_id());
            let created = Enrollment {
                id,
                person_id: enrollment.person_id,
                offering_id: enrollment.offering_id,
                status: enrollment.status,
                result: enrollment.result,
            };
            state.enrollments.insert(id, created.clone());
            Ok(created)
        })
    }

    async fn find(&self, id: EnrollmentId) -> Result<Enrollment, GatewayError> {
        self.call(Operation::FindEnrollment, |state| {
            state
                .enrollments
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found("matrícula", id))
        })
    }

    async fn update(
        &self,
        id: EnrollmentId,
        update: EnrollmentUpdate,
    ) -> Result<(), GatewayError> {
        self.call(Operation::UpdateEnrollment, |state| {
            let enrollment = state
                .enrollments
                .get_mut(&id)
                .ok_or_else(|| not_found("matrícula", id))?;
            if let Some(status) = update.status {
                enrollment.status = status;
            }
            if let Some(result) = update.result {
                enrollment.result = result;
            }
            Ok(())
        })
    }

    async fn delete(&self, id: EnrollmentId) -> Result<(), GatewayError> {
        self.call(Operation::DeleteEnrollment, |state| {
            state
                .enrollments
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| not_found("matrícula", id))
        })
    }

    async fn list_for_person(&self, person: PersonId) -> Result<Vec<Enrollment>, GatewayError> {
        self.call(Operation::ListEnrollments, |state| {
            Ok(state
                .enrollments
                .values()
                .filter(|enrollment| enrollment.person_id == person)
                .cloned()
                .collect())
        })
    }
}

#[async_trait]
impl PaymentGateway for InMemoryBackend {
    async fn create(&self, payment: &NewPayment, key: &StepKey) -> Result<Payment, GatewayError> {
        self.call(Operation::CreatePayment, |state| {
            state.idempotency_keys.push(key.as_str().to_owned());
            let id = PaymentId::new(state.allocate_id());
            let created = Payment {
                id,
                person_id: payment.person_id,
                enrollment_id: payment.enrollment_id,
                method: payment.method.clone(),
                amount: payment.amount,
                status: payment.status,
                receipt_url: Some(payment.receipt_url.clone()),
                reference: payment.reference.clone(),
                paid_at: Some(payment.paid_at),
            };
            state.payments.insert(id, created.clone());
            Ok(created)
        })
    }

    async fn list(&self) -> Result<Vec<Payment>, GatewayError> {
        self.call(Operation::ListPayments, |state| {
            Ok(state.payments.values().rev().cloned().collect())
        })
    }

    async fn find_detail(&self, id: PaymentId) -> Result<PaymentDetail, GatewayError> {
        self.call(Operation::FindPaymentDetail, |state| {
            let payment = state
                .payments
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found("pago", id))?;
            let enrollment = state.enrollments.get(&payment.enrollment_id).cloned();
            let course_name = enrollment
                .as_ref()
                .and_then(|enrollment| state.offerings.get(&enrollment.offering_id))
                .and_then(|offering| offering.course_name.clone());
            Ok(PaymentDetail {
                person: state.people.get(&payment.person_id).cloned(),
                enrollment,
                course_name,
                payment,
            })
        })
    }

    async fn update_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        key: &StepKey,
    ) -> Result<(), GatewayError> {
        self.call(Operation::UpdatePaymentStatus, |state| {
            state.replayed(key);
            let payment = state
                .payments
                .get_mut(&id)
                .ok_or_else(|| not_found("pago", id))?;
            payment.status = status;
            Ok(())
        })
    }
}

#[async_trait]
impl ModuleGradeGateway for InMemoryBackend {
    async fn list_for_person(
        &self,
        person: PersonId,
        offering: OfferingId,
    ) -> Result<Vec<ModuleGrade>, GatewayError> {
        self.call(Operation::ListPersonGrades, |state| {
            Ok(state
                .grades
                .values()
                .filter(|grade| grade.person_id == person && grade.offering_id == offering)
                .copied()
                .collect())
        })
    }

    async fn list_for_module(
        &self,
        module: ModuleId,
        offering: OfferingId,
    ) -> Result<Vec<ModuleGrade>, GatewayError> {
        self.call(Operation::ListModuleGrades, |state| {
            Ok(state
                .grades
                .values()
                .filter(|grade| grade.module_id == module && grade.offering_id == offering)
                .copied()
                .collect())
        })
    }

    async fn upsert(&self, grade: &GradeUpsert) -> Result<ModuleGrade, GatewayError> {
        self.call(Operation::UpsertGrade, |state| {
            let existing = state.grades.values().find(|stored| {
                stored.person_id == grade.person_id
                    && stored.offering_id == grade.offering_id
                    && stored.module_id == grade.module_id
            });
            let id = match existing {
                Some(stored) => stored.id,
                None => GradeId::new(state.allocate_id()),
            };
            let stored = ModuleGrade {
                id,
                person_id: grade.person_id,
                offering_id: grade.offering_id,
                module_id: grade.module_id,
                state: grade.state,
            };
            state.grades.insert(id, stored);
            Ok(stored)
        })
    }

    async fn update_state(
        &self,
        id: GradeId,
        grade_state: GradeState,
    ) -> Result<ModuleGrade, GatewayError> {
        self.call(Operation::UpdateGrade, |state| {
            let grade = state
                .grades
                .get_mut(&id)
                .ok_or_else(|| not_found("nota", id))?;
            grade.state = grade_state;
            Ok(*grade)
        })
    }
}

#[async_trait]
impl AttendanceGateway for InMemoryBackend {
    async fn list_for_enrollment(
        &self,
        person: PersonId,
        enrollment: EnrollmentId,
    ) -> Result<Vec<Attendance>, GatewayError> {
        self.call(Operation::ListAttendance, |state| {
            Ok(state
                .attendance
                .values()
                .filter(|record| record.person_id == person && record.enrollment_id == enrollment)
                .copied()
                .collect())
        })
    }

    async fn create(&self, attendance: &NewAttendance) -> Result<Attendance, GatewayError> {
        self.call(Operation::CreateAttendance, |state| {
            let id = AttendanceId::new(state.allocate_id());
            let record = Attendance {
                id,
                enrollment_id: attendance.enrollment_id,
                person_id: attendance.person_id,
                date: attendance.date,
                presence: attendance.presence,
            };
            state.attendance.insert(id, record);
            Ok(record)
        })
    }

    async fn update(
        &self,
        id: AttendanceId,
        presence: Presence,
    ) -> Result<Attendance, GatewayError> {
        self.call(Operation::UpdateAttendance, |state| {
            let record = state
                .attendance
                .get_mut(&id)
                .ok_or_else(|| not_found("asistencia", id))?;
            record.presence = presence;
            Ok(*record)
        })
    }
}

#[async_trait]
impl TeachingGateway for InMemoryBackend {
    async fn register_teacher(&self, teacher: &NewTeacher) -> Result<Teacher, GatewayError> {
        self.call(Operation::RegisterTeacher, |state| {
            if !state.people.contains_key(&teacher.person_id) {
                return Err(not_found("persona", teacher.person_id));
            }
            let id = TeacherId::new(state.allocate_id());
            let created = Teacher {
                id,
                person_id: teacher.person_id,
                specialty: teacher.specialty.clone(),
                hired_on: teacher.hired_on,
                terminated_on: teacher.terminated_on,
            };
            state.teachers.insert(id, created.clone());
            Ok(created)
        })
    }

    async fn modules_for_offering(
        &self,
        offering: OfferingId,
    ) -> Result<Vec<Module>, GatewayError> {
        self.call(Operation::ListModules, |state| {
            Ok(state
                .modules
                .values()
                .filter(|module| module.offering_id == offering)
                .cloned()
                .collect())
        })
    }

    async fn assignments_for_offering(
        &self,
        offering: OfferingId,
    ) -> Result<Vec<ModuleAssignment>, GatewayError> {
        self.call(Operation::ListAssignments, |state| {
            Ok(state
                .assignments
                .iter()
                .filter(|assignment| assignment.offering_id == offering)
                .cloned()
                .collect())
        })
    }

    async fn create_assignment(
        &self,
        assignment: &NewModuleAssignment,
    ) -> Result<ModuleAssignment, GatewayError> {
        self.call(Operation::CreateAssignment, |state| {
            let created = ModuleAssignment {
                id: crate::domain::AssignmentId::new(state.allocate_id()),
                module_id: assignment.module_id,
                teacher_id: assignment.teacher_id,
                offering_id: assignment.offering_id,
                teacher_name: None,
            };
            state.assignments.push(created.clone());
            Ok(created)
        })
    }
}

#[async_trait]
impl SupportContentGateway for InMemoryBackend {
    async fn list_for_offering(
        &self,
        offering: OfferingId,
    ) -> Result<Vec<SupportContent>, GatewayError> {
        self.call(Operation::ListContents, |state| {
            Ok(state
                .contents
                .values()
                .filter(|content| content.offering_id == offering)
                .cloned()
                .collect())
        })
    }

    async fn create(&self, draft: &SupportContentDraft) -> Result<SupportContent, GatewayError> {
        self.call(Operation::CreateContent, |state| {
            let id = ContentId::new(state.allocate_id());
            let created = content_from_draft(id, draft);
            state.contents.insert(id, created.clone());
            Ok(created)
        })
    }

    async fn update(
        &self,
        id: ContentId,
        draft: &SupportContentDraft,
    ) -> Result<SupportContent, GatewayError> {
        self.call(Operation::UpdateContent, |state| {
            if !state.contents.contains_key(&id) {
                return Err(not_found("contenido", id));
            }
            let updated = content_from_draft(id, draft);
            state.contents.insert(id, updated.clone());
            Ok(updated)
        })
    }

    async fn delete(&self, id: ContentId) -> Result<(), GatewayError> {
        self.call(Operation::DeleteContent, |state| {
            state
                .contents
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| not_found("contenido", id))
        })
    }
}

fn content_from_draft(id: ContentId, draft: &SupportContentDraft) -> SupportContent {
    SupportContent {
        id,
        offering_id: draft.offering_id,
        title: draft.title.clone(),
        description: draft.description.clone(),
        url: draft.url.clone(),
    }
}

#[async_trait]
impl CertificateGateway for InMemoryBackend {
    async fn generate(&self, enrollment: EnrollmentId) -> Result<Vec<u8>, GatewayError> {
        self.call(Operation::GenerateCertificate, |state| {
            state.certificates.push(enrollment);
            Ok(format!("%PDF-1.4 certificado {enrollment}").into_bytes())
        })
    }
}

#[async_trait]
impl NotificationGateway for InMemoryBackend {
    async fn send_payment_approved(
        &self,
        email: &PaymentApprovedEmail,
    ) -> Result<(), GatewayError> {
        self.call(Operation::SendEmail, |state| {
            state.emails.push(email.clone());
            Ok(())
        })
    }
}

#[async_trait]
impl ReceiptStorage for InMemoryBackend {
    async fn upload(
        &self,
        path: &str,
        receipt: &ReceiptFile,
    ) -> Result<StoredReceipt, ReceiptStorageError> {
        self.storage_call(Operation::UploadReceipt, |state| {
            state.objects.insert(path.to_owned(), receipt.bytes().len());
            StoredReceipt {
                path: path.to_owned(),
                public_url: format!("memory://receipts/{path}"),
            }
        })
    }

    async fn remove(&self, path: &str) -> Result<(), ReceiptStorageError> {
        self.storage_call(Operation::RemoveReceipt, |state| {
            state.objects.remove(path);
            state.removed_objects.push(path.to_owned());
        })
    }
}

#[async_trait]
impl SubmissionJournal for InMemoryBackend {
    async fn load(
        &self,
        key: &SubmissionKey,
    ) -> Result<Option<SubmissionCheckpoint>, SubmissionJournalError> {
        self.journal_call(Operation::LoadJournal, |state| {
            state.journal.get(&key.to_string()).cloned()
        })
    }

    async fn save(&self, checkpoint: &SubmissionCheckpoint) -> Result<(), SubmissionJournalError> {
        self.journal_call(Operation::SaveJournal, |state| {
            state
                .journal
                .insert(checkpoint.key.to_string(), checkpoint.clone());
        })
    }

    async fn clear(&self, key: &SubmissionKey) -> Result<(), SubmissionJournalError> {
        self.journal_call(Operation::ClearJournal, |state| {
            state.journal.remove(&key.to_string());
        })
    }
}

/// Clock that returns a settable instant.
#[derive(Debug)]
pub struct FixtureClock(Mutex<DateTime<Utc>>);

impl FixtureClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock frozen at 2024-03-01T12:00:00Z.
    pub fn fixed() -> Self {
        Self::new(DateTime::from_timestamp(1_709_294_400, 0).unwrap_or_default())
    }

    /// Move the clock forward.
    pub fn advance_millis(&self, millis: i64) {
        *self.lock_clock() += TimeDelta::milliseconds(millis);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

pub mod fixtures {
    //! Builders for seed records.

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::domain::{
        AcademicResult, CourseId, CourseOffering, Enrollment, EnrollmentId, EnrollmentStatus,
        GradeId, GradeState, Module, ModuleGrade, ModuleId, OfferingId, Payment, PaymentId,
        PaymentStatus, Person, PersonId, Quota, Role,
    };

    /// A person with an email address.
    pub fn person(id: i64, role: Role) -> Person {
        Person {
            id: PersonId::new(id),
            name: "Laura".to_owned(),
            surname: "Gómez".to_owned(),
            document_type: Some("CC".to_owned()),
            document_number: Some(format!("10{id}")),
            birth_date: NaiveDate::from_ymd_opt(2001, 5, 17),
            phone: None,
            email: Some(format!("persona{id}@example.org")),
            role,
        }
    }

    /// A priced offering with `seats` remaining.
    pub fn offering(id: i64, seats: u32, price: Option<Decimal>) -> CourseOffering {
        CourseOffering {
            id: OfferingId::new(id),
            course_id: CourseId::new(1),
            course_code: Some(format!("OF-{id}")),
            course_name: Some("Soldadura básica".to_owned()),
            starts_on: NaiveDate::from_ymd_opt(2024, 2, 1),
            ends_on: NaiveDate::from_ymd_opt(2024, 6, 30),
            schedule: Some("Sábados 8-12".to_owned()),
            quota: Quota::new(seats),
            price,
            image_url: None,
        }
    }

    /// An enrollment.
    pub fn enrollment(
        id: i64,
        person: i64,
        offering: i64,
        status: EnrollmentStatus,
        result: AcademicResult,
    ) -> Enrollment {
        Enrollment {
            id: EnrollmentId::new(id),
            person_id: PersonId::new(person),
            offering_id: OfferingId::new(offering),
            status,
            result,
        }
    }

    /// A payment for an enrollment.
    pub fn payment(id: i64, person: i64, enrollment: i64, status: PaymentStatus) -> Payment {
        Payment {
            id: PaymentId::new(id),
            person_id: PersonId::new(person),
            enrollment_id: EnrollmentId::new(enrollment),
            method: "Nequi".to_owned(),
            amount: Decimal::new(350_000, 0),
            status,
            receipt_url: Some("memory://receipts/seed.png".to_owned()),
            reference: Some("REF-1".to_owned()),
            paid_at: None,
        }
    }

    /// A module of an offering.
    pub fn module(id: i64, offering: i64) -> Module {
        Module {
            id: ModuleId::new(id),
            offering_id: OfferingId::new(offering),
            name: format!("Módulo {id}"),
        }
    }

    /// A module grade.
    pub fn grade(
        id: i64,
        person: i64,
        offering: i64,
        module: i64,
        state: GradeState,
    ) -> ModuleGrade {
        ModuleGrade {
            id: GradeId::new(id),
            person_id: PersonId::new(person),
            offering_id: OfferingId::new(offering),
            module_id: ModuleId::new(module),
            state,
        }
    }
}
