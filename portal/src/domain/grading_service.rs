//! Teacher-side grading of modules.

use std::sync::Arc;

use tracing::info;

use super::gateway_mapping::map_gateway_error;
use super::ports::ModuleGradeGateway;
use super::{Error, GradeUpsert, ModuleGrade, ModuleId, OfferingId};

/// Records module grades; one row per (person, offering, module).
pub struct GradingService {
    grades: Arc<dyn ModuleGradeGateway>,
}

impl GradingService {
    /// Build the service.
    pub fn new(grades: Arc<dyn ModuleGradeGateway>) -> Self {
        Self { grades }
    }

    /// Grades of every student in a module.
    ///
    /// # Errors
    ///
    /// `Remote` when the module grades cannot be read.
    pub async fn roster(
        &self,
        module: ModuleId,
        offering: OfferingId,
    ) -> Result<Vec<ModuleGrade>, Error> {
        self.grades
            .list_for_module(module, offering)
            .await
            .map_err(|err| map_gateway_error("No se pudieron cargar las notas del módulo", &err))
    }

    /// Set a grade, patching the existing row when there is one.
    ///
    /// Setting the state a row already has sends nothing.
    ///
    /// # Errors
    ///
    /// `Remote` when the roster read or the grade write fails.
    pub async fn set_grade(&self, grade: GradeUpsert) -> Result<ModuleGrade, Error> {
        let existing = self
            .roster(grade.module_id, grade.offering_id)
            .await?
            .into_iter()
            .find(|row| row.person_id == grade.person_id);
        let stored = match existing {
            Some(row) if row.state == grade.state => return Ok(row),
            Some(row) => self.grades.update_state(row.id, grade.state).await,
            None => self.grades.upsert(&grade).await,
        }
        .map_err(|err| map_gateway_error("No se pudo guardar la nota", &err))?;
        info!(
            person = %grade.person_id,
            module = %grade.module_id,
            state = %grade.state,
            "module grade recorded"
        );
        Ok(stored)
    }
}
