//! Per-module grades.

use serde::{Deserialize, Serialize};

use super::wire::wire_enum;
use super::{GradeId, ModuleId, OfferingId, PersonId};

wire_enum! {
    /// State of one module grade.
    pub enum GradeState {
        /// Not yet evaluated.
        Pending => "Pendiente",
        /// Module passed.
        Passed => "Aprobó" | "Aprobo",
        /// Module failed.
        Failed => "Desaprobó" | "Desaprobo",
    }
}

impl GradeState {
    /// Whether the module has been evaluated either way.
    pub const fn is_evaluated(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Grade of one person in one module of an offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGrade {
    /// Backend identifier.
    pub id: GradeId,
    /// Graded person.
    pub person_id: PersonId,
    /// Offering the module belongs to.
    pub offering_id: OfferingId,
    /// Graded module.
    pub module_id: ModuleId,
    /// Grade state.
    pub state: GradeState,
}

/// Upsert payload keyed by (person, offering, module).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeUpsert {
    /// Graded person.
    pub person_id: PersonId,
    /// Offering the module belongs to.
    pub offering_id: OfferingId,
    /// Graded module.
    pub module_id: ModuleId,
    /// New state.
    pub state: GradeState,
}
