//! Driven port for module grades.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::{
    GradeId, GradeState, GradeUpsert, ModuleGrade, ModuleId, OfferingId, PersonId,
};

/// Port for reading and writing per-module grades.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModuleGradeGateway: Send + Sync {
    /// Grades of one person across the modules of an offering.
    async fn list_for_person(
        &self,
        person: PersonId,
        offering: OfferingId,
    ) -> Result<Vec<ModuleGrade>, GatewayError>;

    /// Grades of every student in one module of an offering.
    async fn list_for_module(
        &self,
        module: ModuleId,
        offering: OfferingId,
    ) -> Result<Vec<ModuleGrade>, GatewayError>;

    /// Create or replace the grade for (person, offering, module).
    async fn upsert(&self, grade: &GradeUpsert) -> Result<ModuleGrade, GatewayError>;

    /// Change the state of an existing grade row.
    async fn update_state(
        &self,
        id: GradeId,
        state: GradeState,
    ) -> Result<ModuleGrade, GatewayError>;
}
