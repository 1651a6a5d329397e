//! People known to the portal and their roles.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PersonId;
use super::wire::matches_wire;

/// Access role stored on a person.
///
/// The backend uses `Estudiante`, `Docente`, and `admin`. Any other string is
/// preserved verbatim so a round trip never rewrites an unknown role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Enrolled student.
    Student,
    /// Teacher assigned to modules.
    Teacher,
    /// Portal administrator.
    Admin,
    /// Role the client does not interpret.
    Other(String),
}

impl Role {
    /// Value sent to the backend.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Student => "Estudiante",
            Self::Teacher => "Docente",
            Self::Admin => "admin",
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// Interpret a backend role string.
    pub fn from_wire(raw: &str) -> Self {
        let trimmed = raw.trim();
        [Self::Student, Self::Teacher, Self::Admin]
            .into_iter()
            .find(|role| matches_wire(trimmed, role.as_wire()))
            .unwrap_or_else(|| Self::Other(trimmed.to_owned()))
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::from_wire(&value)
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_wire().to_owned()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// A person registered in the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Backend identifier.
    pub id: PersonId,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Identity document type (e.g. `CC`, `TI`).
    pub document_type: Option<String>,
    /// Identity document number.
    pub document_number: Option<String>,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email, used for payment notifications.
    pub email: Option<String>,
    /// Access role.
    pub role: Role,
}

impl Person {
    /// Name and surname joined for display and email greetings.
    pub fn full_name(&self) -> String {
        let joined = format!("{} {}", self.name.trim(), self.surname.trim());
        joined.trim().to_owned()
    }

    /// Email address when one is recorded and non-blank.
    pub fn contact_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Estudiante", Role::Student)]
    #[case("estudiante", Role::Student)]
    #[case("Docente", Role::Teacher)]
    #[case("admin", Role::Admin)]
    #[case("Admin", Role::Admin)]
    #[case("Coordinador", Role::Other("Coordinador".to_owned()))]
    fn interprets_backend_roles(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(Role::from_wire(raw), expected);
    }

    #[test]
    fn unknown_roles_round_trip_verbatim() {
        let role = Role::from_wire("Coordinador");
        assert_eq!(role.as_wire(), "Coordinador");
    }

    #[test]
    fn blank_email_is_not_a_contact() {
        let person = Person {
            id: PersonId::new(1),
            name: "Ana".to_owned(),
            surname: " Díaz ".to_owned(),
            document_type: None,
            document_number: None,
            birth_date: None,
            phone: None,
            email: Some("  ".to_owned()),
            role: Role::Student,
        };
        assert_eq!(person.contact_email(), None);
        assert_eq!(person.full_name(), "Ana Díaz");
    }
}
