//! Registering teachers and assigning them to modules.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::gateway_mapping::map_gateway_error;
use super::idempotency::StepKey;
use super::ports::{PersonGateway, TeachingGateway};
use super::{Error, ModuleAssignment, NewModuleAssignment, NewTeacher, Role, Teacher};

/// Outcome of [`TeacherRegistrationService::register`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherRegistration {
    /// Created teacher record.
    pub teacher: Teacher,
    /// Whether the person's role was promoted to teacher.
    pub role_updated: bool,
    /// User-facing summary.
    pub message: String,
}

/// Creates teacher records and module assignments.
pub struct TeacherRegistrationService {
    teaching: Arc<dyn TeachingGateway>,
    persons: Arc<dyn PersonGateway>,
}

impl TeacherRegistrationService {
    /// Build the service.
    pub fn new(teaching: Arc<dyn TeachingGateway>, persons: Arc<dyn PersonGateway>) -> Self {
        Self { teaching, persons }
    }

    /// Create a teacher record, then promote the person's role.
    ///
    /// The promotion is best-effort: the record stays even if it fails.
    ///
    /// # Errors
    ///
    /// `Validation` when the withdrawal date precedes the hire date;
    /// `Remote` when the teacher record cannot be created.
    pub async fn register(&self, teacher: &NewTeacher) -> Result<TeacherRegistration, Error> {
        if let (Some(hired), Some(terminated)) = (teacher.hired_on, teacher.terminated_on)
            && terminated < hired
        {
            return Err(Error::validation(
                "La fecha de retiro no puede ser anterior a la de ingreso",
            ));
        }
        let created = self
            .teaching
            .register_teacher(teacher)
            .await
            .map_err(|err| map_gateway_error("No se pudo crear el docente", &err))?;

        let role_key = StepKey::scoped(&format!("docente-{}", created.person_id), "role");
        let role_updated = match self
            .persons
            .assign_role(created.person_id, &Role::Teacher, &role_key)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(person = %created.person_id, error = %err, "teacher role promotion failed");
                false
            }
        };
        let message = if role_updated {
            "Docente creado correctamente".to_owned()
        } else {
            "Docente creado correctamente (rol de persona no actualizado)".to_owned()
        };
        info!(teacher = %created.id, role_updated, "teacher registered");
        Ok(TeacherRegistration {
            teacher: created,
            role_updated,
            message,
        })
    }

    /// Assign a teacher to a module of an offering.
    ///
    /// # Errors
    ///
    /// `Validation` when the module does not belong to the offering.
    pub async fn assign(&self, assignment: NewModuleAssignment) -> Result<ModuleAssignment, Error> {
        let modules = self
            .teaching
            .modules_for_offering(assignment.offering_id)
            .await
            .map_err(|err| map_gateway_error("No se pudieron cargar los módulos", &err))?;
        if !modules.iter().any(|module| module.id == assignment.module_id) {
            return Err(Error::validation(format!(
                "El módulo {} no pertenece a la oferta {}",
                assignment.module_id, assignment.offering_id
            )));
        }
        self.teaching
            .create_assignment(&assignment)
            .await
            .map_err(|err| map_gateway_error("No se pudo asignar el docente", &err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, ModuleId, OfferingId, PersonId, TeacherId};
    use crate::test_support::{InMemoryBackend, Operation, fixtures};
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    #[fixture]
    fn backend() -> Arc<InMemoryBackend> {
        let backend = Arc::new(InMemoryBackend::new());
        backend.with_state(|state| {
            state
                .people
                .insert(PersonId::new(21), fixtures::person(21, Role::Student));
            state.modules.insert(ModuleId::new(1), fixtures::module(1, 3));
        });
        backend
    }

    fn service(backend: &Arc<InMemoryBackend>) -> TeacherRegistrationService {
        TeacherRegistrationService::new(backend.clone(), backend.clone())
    }

    fn new_teacher() -> NewTeacher {
        NewTeacher {
            person_id: PersonId::new(21),
            specialty: Some("Electricidad".to_owned()),
            hired_on: NaiveDate::from_ymd_opt(2023, 1, 16),
            terminated_on: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn registration_promotes_the_role(backend: Arc<InMemoryBackend>) {
        let registration = service(&backend)
            .register(&new_teacher())
            .await
            .expect("registered");

        assert!(registration.role_updated);
        assert_eq!(registration.message, "Docente creado correctamente");
        assert_eq!(
            backend.snapshot().people[&PersonId::new(21)].role,
            Role::Teacher
        );
    }

    #[rstest]
    #[tokio::test]
    async fn role_failure_keeps_the_teacher(backend: Arc<InMemoryBackend>) {
        backend.fail(Operation::AssignRole);

        let registration = service(&backend)
            .register(&new_teacher())
            .await
            .expect("registered");

        assert!(!registration.role_updated);
        assert!(registration.message.ends_with("(rol de persona no actualizado)"));
        assert_eq!(backend.snapshot().teachers.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn termination_before_hiring_is_rejected(backend: Arc<InMemoryBackend>) {
        let mut teacher = new_teacher();
        teacher.terminated_on = NaiveDate::from_ymd_opt(2022, 12, 1);

        let err = service(&backend)
            .register(&teacher)
            .await
            .expect_err("invalid dates");

        assert_eq!(err.code(), ErrorCode::Validation);
        assert_eq!(backend.calls_to(Operation::RegisterTeacher), 0);
    }

    #[rstest]
    #[case::own_module(1, true)]
    #[case::foreign_module(99, false)]
    #[tokio::test]
    async fn assignment_checks_module_ownership(
        backend: Arc<InMemoryBackend>,
        #[case] module: i64,
        #[case] accepted: bool,
    ) {
        let result = service(&backend)
            .assign(NewModuleAssignment {
                module_id: ModuleId::new(module),
                teacher_id: TeacherId::new(5),
                offering_id: OfferingId::new(3),
            })
            .await;

        assert_eq!(result.is_ok(), accepted);
        assert_eq!(backend.snapshot().assignments.len(), usize::from(accepted));
    }
}
