//! Driven port for the course catalogue.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::{Course, CourseId};

/// Port for reading catalogue courses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseGateway: Send + Sync {
    /// Every course in the catalogue.
    async fn list(&self) -> Result<Vec<Course>, GatewayError>;

    /// One course.
    async fn find(&self, id: CourseId) -> Result<Course, GatewayError>;
}
