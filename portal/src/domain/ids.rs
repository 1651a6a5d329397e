//! Strongly typed identifiers for backend resources.
//!
//! The backend issues integer primary keys. Wrapping them keeps a payment id
//! from being passed where an enrollment id is expected.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw backend key.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Raw backend key.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                raw.trim().parse().map(Self)
            }
        }
    };
}

define_id!(
    /// Identifier of a person (student, teacher, or administrator).
    PersonId
);
define_id!(
    /// Identifier of a catalogue course.
    CourseId
);
define_id!(
    /// Identifier of a scheduled course offering.
    OfferingId
);
define_id!(
    /// Identifier of an enrollment (`curso matriculado`).
    EnrollmentId
);
define_id!(
    /// Identifier of a payment.
    PaymentId
);
define_id!(
    /// Identifier of a curriculum module.
    ModuleId
);
define_id!(
    /// Identifier of a module grade row.
    GradeId
);
define_id!(
    /// Identifier of an attendance record.
    AttendanceId
);
define_id!(
    /// Identifier of a teacher record (distinct from the person id).
    TeacherId
);
define_id!(
    /// Identifier of a module-teacher assignment.
    AssignmentId
);
define_id!(
    /// Identifier of a support content item.
    ContentId
);
