//! Support material management.

use std::sync::Arc;

use super::gateway_mapping::map_gateway_error;
use super::ports::SupportContentGateway;
use super::{ContentId, Error, OfferingId, SupportContent, SupportContentDraft};

/// Lists and edits support material for offerings.
pub struct SupportContentService {
    contents: Arc<dyn SupportContentGateway>,
}

impl SupportContentService {
    /// Build the service.
    pub fn new(contents: Arc<dyn SupportContentGateway>) -> Self {
        Self { contents }
    }

    /// Material published for an offering.
    ///
    /// # Errors
    ///
    /// `Remote` when the listing fails.
    pub async fn list(&self, offering: OfferingId) -> Result<Vec<SupportContent>, Error> {
        self.contents
            .list_for_offering(offering)
            .await
            .map_err(|err| map_gateway_error("No se pudo cargar el material de apoyo", &err))
    }

    /// Validate and create a new item.
    ///
    /// # Errors
    ///
    /// `Validation` for an invalid draft; `Remote` when the create fails.
    pub async fn publish(&self, draft: &SupportContentDraft) -> Result<SupportContent, Error> {
        draft.validate()?;
        self.contents
            .create(draft)
            .await
            .map_err(|err| map_gateway_error("No se pudo publicar el contenido", &err))
    }

    /// Validate and replace an existing item.
    ///
    /// # Errors
    ///
    /// `Validation` for an invalid draft; `Remote` when the update fails.
    pub async fn revise(
        &self,
        id: ContentId,
        draft: &SupportContentDraft,
    ) -> Result<SupportContent, Error> {
        draft.validate()?;
        self.contents
            .update(id, draft)
            .await
            .map_err(|err| map_gateway_error("No se pudo actualizar el contenido", &err))
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// `Remote` when the delete fails.
    pub async fn remove(&self, id: ContentId) -> Result<(), Error> {
        self.contents
            .delete(id)
            .await
            .map_err(|err| map_gateway_error("No se pudo eliminar el contenido", &err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::test_support::{InMemoryBackend, Operation};

    fn draft(title: &str, url: Option<&str>) -> SupportContentDraft {
        SupportContentDraft {
            offering_id: OfferingId::new(3),
            title: title.to_owned(),
            description: None,
            url: url.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn publish_revise_remove() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = SupportContentService::new(backend.clone());

        let published = service
            .publish(&draft("Guía 1", Some("https://example.org/guia.pdf")))
            .await
            .expect("published");
        let revised = service
            .revise(published.id, &draft("Guía 1 (rev)", None))
            .await
            .expect("revised");
        assert_eq!(revised.title, "Guía 1 (rev)");
        assert_eq!(service.list(OfferingId::new(3)).await.expect("listed").len(), 1);

        service.remove(published.id).await.expect("removed");
        assert!(service.list(OfferingId::new(3)).await.expect("listed").is_empty());
    }

    #[tokio::test]
    async fn invalid_drafts_are_not_sent() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = SupportContentService::new(backend.clone());

        let err = service
            .publish(&draft("Guía", Some("ftp://example.org")))
            .await
            .expect_err("bad url");

        assert_eq!(err.code(), ErrorCode::Validation);
        assert_eq!(backend.calls_to(Operation::CreateContent), 0);
    }
}
