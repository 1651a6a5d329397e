//! Catalogue courses and their scheduled offerings.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::wire::wire_enum;
use super::{CourseId, OfferingId};

wire_enum! {
    /// Kind of course in the catalogue.
    pub enum CourseType {
        /// Long technical programme.
        Technical => "Técnico" | "Tecnico",
        /// Short course.
        Short => "Corto",
    }
}

/// A catalogue course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Backend identifier.
    pub id: CourseId,
    /// Display name.
    pub name: String,
    /// Duration in hours.
    pub duration_hours: Option<u32>,
    /// Free-form syllabus.
    pub syllabus: Option<String>,
    /// Course kind when recorded.
    pub course_type: Option<CourseType>,
}

/// Remaining seats on an offering.
///
/// Decrementing never goes below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quota(u32);

impl Quota {
    /// Wrap a seat count.
    pub const fn new(seats: u32) -> Self {
        Self(seats)
    }

    /// Seat count.
    pub const fn seats(self) -> u32 {
        self.0
    }

    /// Quota after one seat is taken, floored at zero.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::Quota;
    ///
    /// assert_eq!(Quota::new(3).decremented(), Quota::new(2));
    /// assert_eq!(Quota::new(0).decremented(), Quota::new(0));
    /// ```
    #[must_use]
    pub const fn decremented(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Whether no seats remain.
    pub const fn is_exhausted(self) -> bool {
        self.0 == 0
    }
}

/// A scheduled, priced instance of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOffering {
    /// Backend identifier.
    pub id: OfferingId,
    /// Catalogue course this offering schedules.
    pub course_id: CourseId,
    /// Human-facing offering code.
    pub course_code: Option<String>,
    /// Course name when the backend embeds it.
    pub course_name: Option<String>,
    /// First day of classes.
    pub starts_on: Option<NaiveDate>,
    /// Last day of classes.
    pub ends_on: Option<NaiveDate>,
    /// Free-form schedule description.
    pub schedule: Option<String>,
    /// Remaining seats.
    pub quota: Quota,
    /// Enrollment price; a submission cannot proceed without one.
    pub price: Option<Decimal>,
    /// Cover image URL.
    pub image_url: Option<String>,
}

impl CourseOffering {
    /// Best label available for messages: course name, then code, then id.
    pub fn label(&self) -> String {
        self.course_name
            .clone()
            .or_else(|| self.course_code.clone())
            .unwrap_or_else(|| format!("oferta {}", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(5, 4)]
    #[case(1, 0)]
    #[case(0, 0)]
    fn decrement_is_floored_at_zero(#[case] seats: u32, #[case] expected: u32) {
        assert_eq!(Quota::new(seats).decremented().seats(), expected);
    }

    #[rstest]
    #[case("Técnico", CourseType::Technical)]
    #[case("tecnico", CourseType::Technical)]
    #[case("Corto", CourseType::Short)]
    fn parses_course_types(#[case] raw: &str, #[case] expected: CourseType) {
        assert_eq!(raw.parse::<CourseType>(), Ok(expected));
    }
}
