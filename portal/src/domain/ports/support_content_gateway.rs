//! Driven port for support content.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::{ContentId, OfferingId, SupportContent, SupportContentDraft};

/// Port for support material.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SupportContentGateway: Send + Sync {
    /// Content published for an offering.
    async fn list_for_offering(
        &self,
        offering: OfferingId,
    ) -> Result<Vec<SupportContent>, GatewayError>;

    /// Publish new content.
    async fn create(&self, draft: &SupportContentDraft) -> Result<SupportContent, GatewayError>;

    /// Replace existing content.
    async fn update(
        &self,
        id: ContentId,
        draft: &SupportContentDraft,
    ) -> Result<SupportContent, GatewayError>;

    /// Remove content.
    async fn delete(&self, id: ContentId) -> Result<(), GatewayError>;
}
