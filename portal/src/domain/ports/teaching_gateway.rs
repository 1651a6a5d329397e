//! Driven port for modules, teachers, and module assignments.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::{Module, ModuleAssignment, NewModuleAssignment, NewTeacher, OfferingId, Teacher};

/// Port for the teaching side of an offering.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeachingGateway: Send + Sync {
    /// Create a teacher record for an existing person.
    async fn register_teacher(&self, teacher: &NewTeacher) -> Result<Teacher, GatewayError>;

    /// Modules of an offering.
    async fn modules_for_offering(&self, offering: OfferingId)
    -> Result<Vec<Module>, GatewayError>;

    /// Module-teacher assignments of an offering.
    async fn assignments_for_offering(
        &self,
        offering: OfferingId,
    ) -> Result<Vec<ModuleAssignment>, GatewayError>;

    /// Assign a teacher to a module.
    async fn create_assignment(
        &self,
        assignment: &NewModuleAssignment,
    ) -> Result<ModuleAssignment, GatewayError>;
}
