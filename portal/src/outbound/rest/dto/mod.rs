//! Wire DTOs for the portal backend.
//!
//! Each endpoint decodes into a DTO first and is then mapped into domain
//! records in one pass. Mapping failures are returned as plain strings and
//! turned into `GatewayError::Decode` by the gateway.

mod academic;
mod catalog;
mod dates;
mod enrollment;
mod payment;
mod people;

pub(super) use academic::{
    AssignmentDto, AttendanceDto, ModuleDto, ModuleGradeDto, NewAssignmentBody,
    NewAttendanceBody, AttendancePatchBody, GradePatchBody, GradeUpsertBody, NewTeacherBody,
    SupportContentBody, SupportContentDto, TeacherDto, CertificateRequestBody,
    PaymentApprovedEmailBody,
};
pub(super) use catalog::{CourseDto, OfferingDto, QuotaDto};
pub(super) use enrollment::{EnrollmentDto, EnrollmentPatchBody, NewEnrollmentBody};
pub(super) use payment::{NewPaymentBody, PaymentDetailDto, PaymentDto, PaymentStatusBody};
pub(super) use people::{PersonDto, RolePatchBody};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a string or a number and keep it as trimmed text; blank is `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text.trim().to_owned()).filter(|text| !text.is_empty()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Accept an integer or a numeric string.
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|raw| u32::try_from(raw).ok())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("{number} is not a count"))),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("{text} is not a count"))),
        Some(other) => Err(serde::de::Error::custom(format!("{other} is not a count"))),
    }
}

fn required<T>(value: Option<T>, field: &str, entity: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("{entity} is missing `{field}`"))
}

fn wire<T>(raw: Option<&str>, field: &str, entity: &str) -> Result<Option<T>, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| raw.parse::<T>().map_err(|err| format!("{entity} `{field}`: {err}")))
        .transpose()
}
