//! Person DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dates::optional_date;
use super::lenient_text;
use crate::domain::{Person, PersonId, Role};

#[derive(Debug, Deserialize)]
pub(in crate::outbound::rest) struct PersonDto {
    id: i64,
    #[serde(default, deserialize_with = "lenient_text")]
    nombre: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    apellido: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    tipo_identificacion: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    numero_identificacion: Option<String>,
    #[serde(default, deserialize_with = "optional_date")]
    fecha_nacimiento: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_text")]
    telefono: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    correo: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    rol: Option<String>,
}

impl TryFrom<PersonDto> for Person {
    type Error = String;

    fn try_from(dto: PersonDto) -> Result<Self, Self::Error> {
        let name = super::required(dto.nombre, "nombre", "persona")?;
        Ok(Self {
            id: PersonId::new(dto.id),
            name,
            surname: dto.apellido.unwrap_or_default(),
            document_type: dto.tipo_identificacion,
            document_number: dto.numero_identificacion,
            birth_date: dto.fecha_nacimiento,
            phone: dto.telefono,
            email: dto.correo,
            role: dto
                .rol
                .as_deref()
                .map_or(Role::Student, Role::from_wire),
        })
    }
}

#[derive(Debug, Serialize)]
pub(in crate::outbound::rest) struct RolePatchBody<'a> {
    pub(in crate::outbound::rest) rol: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_documents_and_unknown_roles_survive() {
        let dto: PersonDto = serde_json::from_str(
            r#"{"id":7,"nombre":"Laura","apellido":"Gómez","numero_identificacion":1020304,
                "fecha_nacimiento":"2001-05-17T00:00:00.000Z","correo":"laura@example.org",
                "rol":"Coordinador"}"#,
        )
        .expect("dto decodes");
        let person = Person::try_from(dto).expect("maps");

        assert_eq!(person.document_number.as_deref(), Some("1020304"));
        assert_eq!(person.birth_date, NaiveDate::from_ymd_opt(2001, 5, 17));
        assert_eq!(person.role, Role::Other("Coordinador".to_owned()));
    }

    #[test]
    fn name_is_required() {
        let dto: PersonDto = serde_json::from_str(r#"{"id":7}"#).expect("dto decodes");
        assert!(Person::try_from(dto).is_err());
    }
}
