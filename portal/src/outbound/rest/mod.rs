//! REST adapters for the portal backend.
//!
//! Every gateway shares one [`RestClient`] so the session and deadlines are
//! configured once. Responses are normalised by the envelope decoder and then
//! mapped through wire DTOs into domain records.

mod academic;
mod catalog;
mod client;
mod documents;
mod dto;
mod enrollment;
mod envelope;
mod payment;
mod people;

pub use academic::{HttpAttendanceGateway, HttpModuleGradeGateway, HttpTeachingGateway};
pub use catalog::{HttpCourseGateway, HttpOfferingGateway};
pub use client::{RestClient, RestClientConfig, SLOW_PATH_PREFIXES, Session};
pub use documents::{HttpCertificateGateway, HttpNotificationGateway, HttpSupportContentGateway};
pub use enrollment::HttpEnrollmentGateway;
pub use payment::HttpPaymentGateway;
pub use people::HttpPersonGateway;

pub(crate) use client::body_preview;
