//! Dispatch of parsed commands onto domain services.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::args::{
    AttendanceCommand, CertificateCommand, Command, CourseCommand, EnrollmentCommand,
    GradeCommand, PaymentCommand, SubmitArgs, SupportCommand, SupportDraftArgs, TeacherCommand,
};
use super::{files, render};
use crate::domain::idempotency::SubmissionKey;
use crate::domain::ports::{
    AttendanceGateway, CertificateGateway, CourseGateway, EnrollmentGateway,
    FixtureNotificationGateway, ModuleGradeGateway, NotificationGateway, OfferingGateway,
    PaymentGateway, PersonGateway, ReceiptStorage, SubmissionJournal, SupportContentGateway,
    TeachingGateway,
};
use crate::domain::{
    ApprovalPorts, AttendanceService, CertificateService, CourseOverviewPorts,
    CourseOverviewService, DEFAULT_PAYMENT_METHOD, EnrollmentSubmissionService, Error,
    GradeUpsert, GradingService, NewAttendance, NewModuleAssignment, NewTeacher,
    PaymentApprovalService, PaymentDecision, PaymentId, SubmissionPorts, SubmissionRequest,
    SupportContentDraft, SupportContentService, TeacherRegistrationService, map_gateway_error,
};

/// Every port the command surface drives.
#[derive(Clone)]
pub struct PortalPorts {
    /// People and roles.
    pub persons: Arc<dyn PersonGateway>,
    /// Catalogue courses.
    pub courses: Arc<dyn CourseGateway>,
    /// Offerings and quota.
    pub offerings: Arc<dyn OfferingGateway>,
    /// Enrollments.
    pub enrollments: Arc<dyn EnrollmentGateway>,
    /// Payments.
    pub payments: Arc<dyn PaymentGateway>,
    /// Module grades.
    pub grades: Arc<dyn ModuleGradeGateway>,
    /// Attendance.
    pub attendance: Arc<dyn AttendanceGateway>,
    /// Modules, teachers, and assignments.
    pub teaching: Arc<dyn TeachingGateway>,
    /// Support material.
    pub contents: Arc<dyn SupportContentGateway>,
    /// Certificate rendering.
    pub certificates: Arc<dyn CertificateGateway>,
    /// Notification emails.
    pub notifications: Arc<dyn NotificationGateway>,
    /// Receipt object store.
    pub storage: Arc<dyn ReceiptStorage>,
    /// Submission checkpoints.
    pub journal: Arc<dyn SubmissionJournal>,
}

/// Runs `portal-admin` commands.
pub struct PortalApp {
    ports: PortalPorts,
    clock: Arc<dyn Clock>,
    payment_method: String,
}

impl PortalApp {
    /// App over `ports` reading time from `clock`.
    pub fn new(ports: PortalPorts, clock: Arc<dyn Clock>) -> Self {
        Self {
            ports,
            clock,
            payment_method: DEFAULT_PAYMENT_METHOD.to_owned(),
        }
    }

    /// Payment method recorded when `payments submit` does not name one.
    #[must_use]
    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = method.into();
        self
    }

    /// Run `command` and render its result.
    ///
    /// # Errors
    ///
    /// Propagates the domain error of the failed operation.
    pub async fn run(&self, command: &Command) -> Result<String, Error> {
        match command {
            Command::Payments(command) => self.payments(command).await,
            Command::Enrollments(command) => self.enrollments(command).await,
            Command::Certificates(command) => self.certificates(command).await,
            Command::Grades(command) => self.grades(command).await,
            Command::Attendance(command) => self.attendance(command).await,
            Command::Teachers(command) => self.teachers(command).await,
            Command::Courses(command) => self.courses(command).await,
            Command::Support(command) => self.support(command).await,
        }
    }

    async fn payments(&self, command: &PaymentCommand) -> Result<String, Error> {
        match command {
            PaymentCommand::List => {
                let payments = self
                    .ports
                    .payments
                    .list()
                    .await
                    .map_err(|err| map_gateway_error("No se pudieron cargar los pagos", &err))?;
                Ok(render::payments(&payments))
            }
            PaymentCommand::Approve {
                payment,
                skip_email,
            } => {
                self.decide(*payment, PaymentDecision::Approve, *skip_email)
                    .await
            }
            PaymentCommand::Reject { payment } => {
                self.decide(*payment, PaymentDecision::Reject, true).await
            }
            PaymentCommand::Submit(args) => self.submit(args).await,
        }
    }

    async fn decide(
        &self,
        payment: PaymentId,
        decision: PaymentDecision,
        skip_email: bool,
    ) -> Result<String, Error> {
        let notifications: Arc<dyn NotificationGateway> = if skip_email {
            Arc::new(FixtureNotificationGateway)
        } else {
            Arc::clone(&self.ports.notifications)
        };
        let service = PaymentApprovalService::new(ApprovalPorts {
            payments: Arc::clone(&self.ports.payments),
            enrollments: Arc::clone(&self.ports.enrollments),
            offerings: Arc::clone(&self.ports.offerings),
            persons: Arc::clone(&self.ports.persons),
            notifications,
        });
        let report = service.decide(payment, decision).await?;
        info!(payment = %payment, status = %report.payment_status, "payment decided");
        Ok(render::approval(&report))
    }

    async fn submit(&self, args: &SubmitArgs) -> Result<String, Error> {
        let receipt = files::read_receipt(&args.receipt)?;
        let request = SubmissionRequest {
            key: args.key.unwrap_or_else(SubmissionKey::random),
            person_id: args.person,
            offering_id: args.offering,
            receipt,
            reference: args.reference.clone(),
            method: args
                .method
                .clone()
                .unwrap_or_else(|| self.payment_method.clone()),
        };
        let service = EnrollmentSubmissionService::new(
            SubmissionPorts {
                offerings: Arc::clone(&self.ports.offerings),
                enrollments: Arc::clone(&self.ports.enrollments),
                payments: Arc::clone(&self.ports.payments),
                storage: Arc::clone(&self.ports.storage),
                journal: Arc::clone(&self.ports.journal),
            },
            Arc::clone(&self.clock),
        );
        let outcome = service
            .submit(&request)
            .await
            .map_err(|err| with_retry_hint(&err, request.key))?;
        Ok(render::submission(&outcome))
    }

    fn overview_service(&self) -> CourseOverviewService {
        CourseOverviewService::new(CourseOverviewPorts {
            enrollments: Arc::clone(&self.ports.enrollments),
            teaching: Arc::clone(&self.ports.teaching),
            grades: Arc::clone(&self.ports.grades),
            attendance: Arc::clone(&self.ports.attendance),
            contents: Arc::clone(&self.ports.contents),
        })
    }

    async fn enrollments(&self, command: &EnrollmentCommand) -> Result<String, Error> {
        match command {
            EnrollmentCommand::List { person } => {
                let enrollments = self
                    .ports
                    .enrollments
                    .list_for_person(*person)
                    .await
                    .map_err(|err| {
                        map_gateway_error("No se pudieron cargar las matrículas", &err)
                    })?;
                Ok(render::enrollments(&enrollments))
            }
            EnrollmentCommand::Overview { enrollment } => {
                let overview = self.overview_service().overview(*enrollment).await?;
                Ok(render::overview(&overview))
            }
            EnrollmentCommand::Sync { enrollment } => {
                let snapshot = self.overview_service().sync_result(*enrollment).await?;
                Ok(render::snapshot(&snapshot))
            }
        }
    }

    async fn certificates(&self, command: &CertificateCommand) -> Result<String, Error> {
        let CertificateCommand::Download { enrollment, output } = command;
        let service = CertificateService::new(
            Arc::clone(&self.ports.enrollments),
            Arc::clone(&self.ports.certificates),
        );
        let document = service.download(*enrollment).await?;
        let saved = files::write_certificate(output, &document)?;
        Ok(render::lines(vec![
            format!("certificate={saved}"),
            format!("bytes={}", document.bytes.len()),
        ]))
    }

    async fn grades(&self, command: &GradeCommand) -> Result<String, Error> {
        let service = GradingService::new(Arc::clone(&self.ports.grades));
        match command {
            GradeCommand::Roster { module, offering } => {
                let grades = service.roster(*module, *offering).await?;
                Ok(render::grades(&grades))
            }
            GradeCommand::Set {
                person,
                offering,
                module,
                state,
            } => {
                let grade = service
                    .set_grade(GradeUpsert {
                        person_id: *person,
                        offering_id: *offering,
                        module_id: *module,
                        state: *state,
                    })
                    .await?;
                Ok(render::grade(&grade))
            }
        }
    }

    async fn attendance(&self, command: &AttendanceCommand) -> Result<String, Error> {
        let service = AttendanceService::new(Arc::clone(&self.ports.attendance));
        match command {
            AttendanceCommand::History { person, enrollment } => {
                let (records, percent) = service.history(*person, *enrollment).await?;
                Ok(render::attendance_history(&records, percent))
            }
            AttendanceCommand::Record {
                person,
                enrollment,
                date,
                presence,
            } => {
                let record = service
                    .record(NewAttendance {
                        enrollment_id: *enrollment,
                        person_id: *person,
                        date: *date,
                        presence: *presence,
                    })
                    .await?;
                Ok(render::attendance(&record))
            }
        }
    }

    async fn teachers(&self, command: &TeacherCommand) -> Result<String, Error> {
        let service = TeacherRegistrationService::new(
            Arc::clone(&self.ports.teaching),
            Arc::clone(&self.ports.persons),
        );
        match command {
            TeacherCommand::Register {
                person,
                specialty,
                hired,
                terminated,
            } => {
                let registration = service
                    .register(&NewTeacher {
                        person_id: *person,
                        specialty: specialty.clone(),
                        hired_on: *hired,
                        terminated_on: *terminated,
                    })
                    .await?;
                Ok(render::registration(&registration))
            }
            TeacherCommand::Assign {
                module,
                teacher,
                offering,
            } => {
                let assignment = service
                    .assign(NewModuleAssignment {
                        module_id: *module,
                        teacher_id: *teacher,
                        offering_id: *offering,
                    })
                    .await?;
                Ok(render::assignment(&assignment))
            }
            TeacherCommand::Offerings { person } => {
                let offerings = self
                    .ports
                    .offerings
                    .list_by_teacher(*person)
                    .await
                    .map_err(|err| {
                        map_gateway_error("No se pudieron cargar las ofertas", &err)
                    })?;
                Ok(render::offerings(&offerings))
            }
        }
    }

    async fn courses(&self, command: &CourseCommand) -> Result<String, Error> {
        match command {
            CourseCommand::List => {
                let courses = self.ports.courses.list().await.map_err(|err| {
                    map_gateway_error("No se pudieron cargar los cursos", &err)
                })?;
                Ok(render::courses(&courses))
            }
            CourseCommand::Students { offering } => {
                let people = self
                    .ports
                    .persons
                    .list_active_by_offering(*offering)
                    .await
                    .map_err(|err| {
                        map_gateway_error("No se pudieron cargar los estudiantes", &err)
                    })?;
                Ok(render::people(&people))
            }
        }
    }

    async fn support(&self, command: &SupportCommand) -> Result<String, Error> {
        let service = SupportContentService::new(Arc::clone(&self.ports.contents));
        match command {
            SupportCommand::List { offering } => {
                let contents = service.list(*offering).await?;
                Ok(render::contents(&contents))
            }
            SupportCommand::Publish(draft) => {
                let content = service.publish(&draft_from(draft)).await?;
                Ok(render::content(&content))
            }
            SupportCommand::Revise { content, draft } => {
                let revised = service.revise(*content, &draft_from(draft)).await?;
                Ok(render::content(&revised))
            }
            SupportCommand::Remove { content } => {
                service.remove(*content).await?;
                Ok(format!("content={content} removed"))
            }
        }
    }
}

/// Keep the code and details of a failed submission but tell the operator
/// which key resumes it.
fn with_retry_hint(err: &Error, key: SubmissionKey) -> Error {
    let hinted = Error::new(
        err.code(),
        format!("{} (reintente con --key {key})", err.message()),
    );
    match err.details() {
        Some(details) => hinted.with_details(details.clone()),
        None => hinted,
    }
}

fn draft_from(args: &SupportDraftArgs) -> SupportContentDraft {
    SupportContentDraft {
        offering_id: args.offering,
        title: args.title.clone(),
        description: args.description.clone(),
        url: args.url.clone(),
    }
}
