//! Curriculum modules, teachers, and module-teacher assignments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AssignmentId, ModuleId, OfferingId, PersonId, TeacherId};

/// A gradable subdivision of an offering's curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Backend identifier.
    pub id: ModuleId,
    /// Offering the module belongs to.
    pub offering_id: OfferingId,
    /// Display name.
    pub name: String,
}

/// A teacher record linked to a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Backend identifier.
    pub id: TeacherId,
    /// Person behind the teacher record.
    pub person_id: PersonId,
    /// Area of expertise.
    pub specialty: Option<String>,
    /// Contract start.
    pub hired_on: Option<NaiveDate>,
    /// Contract end.
    pub terminated_on: Option<NaiveDate>,
}

/// Creation payload for a teacher record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeacher {
    /// Person to register as a teacher.
    pub person_id: PersonId,
    /// Area of expertise.
    pub specialty: Option<String>,
    /// Contract start.
    pub hired_on: Option<NaiveDate>,
    /// Contract end.
    pub terminated_on: Option<NaiveDate>,
}

/// Which teacher teaches a module within an offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAssignment {
    /// Backend identifier.
    pub id: AssignmentId,
    /// Assigned module.
    pub module_id: ModuleId,
    /// Assigned teacher.
    pub teacher_id: TeacherId,
    /// Offering of the module.
    pub offering_id: OfferingId,
    /// Teacher display name when the backend embeds it.
    pub teacher_name: Option<String>,
}

/// Creation payload for a module assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewModuleAssignment {
    /// Module to assign.
    pub module_id: ModuleId,
    /// Teacher taking the module.
    pub teacher_id: TeacherId,
    /// Offering of the module.
    pub offering_id: OfferingId,
}

/// Assignment for `module`; the first listed assignment wins when several exist.
pub fn assignment_for_module(
    assignments: &[ModuleAssignment],
    module: ModuleId,
) -> Option<&ModuleAssignment> {
    assignments
        .iter()
        .find(|assignment| assignment.module_id == module)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(id: i64, module: i64, teacher: i64) -> ModuleAssignment {
        ModuleAssignment {
            id: AssignmentId::new(id),
            module_id: ModuleId::new(module),
            teacher_id: TeacherId::new(teacher),
            offering_id: OfferingId::new(1),
            teacher_name: None,
        }
    }

    #[test]
    fn first_assignment_for_a_module_wins() {
        let assignments = vec![
            assignment(1, 10, 100),
            assignment(2, 10, 200),
            assignment(3, 11, 300),
        ];

        let found = assignment_for_module(&assignments, ModuleId::new(10)).expect("assignment");
        assert_eq!(found.teacher_id, TeacherId::new(100));
        assert!(assignment_for_module(&assignments, ModuleId::new(12)).is_none());
    }
}
