//! Support material published for an offering.

use serde::{Deserialize, Serialize};

use super::{ContentId, Error, OfferingId};

/// A published support item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportContent {
    /// Backend identifier.
    pub id: ContentId,
    /// Offering the material belongs to.
    pub offering_id: OfferingId,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Link to the material.
    pub url: Option<String>,
}

/// Create/update payload for support content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportContentDraft {
    /// Offering the material belongs to.
    pub offering_id: OfferingId,
    /// Title; must not be blank.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Link to the material.
    pub url: Option<String>,
}

impl SupportContentDraft {
    /// Check the draft before it is sent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank title or a non-HTTP link.
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("El título del contenido es obligatorio"));
        }
        if let Some(url) = self.url.as_deref().map(str::trim)
            && !url.is_empty()
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(Error::validation(format!(
                "El enlace del contenido debe ser http(s): {url}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft(title: &str, url: Option<&str>) -> SupportContentDraft {
        SupportContentDraft {
            offering_id: OfferingId::new(3),
            title: title.to_owned(),
            description: None,
            url: url.map(str::to_owned),
        }
    }

    #[rstest]
    #[case::valid("Guía", Some("https://example.org/guia.pdf"), true)]
    #[case::no_link("Guía", None, true)]
    #[case::blank_title("  ", None, false)]
    #[case::bad_scheme("Guía", Some("ftp://example.org/guia.pdf"), false)]
    fn validates_drafts(#[case] title: &str, #[case] url: Option<&str>, #[case] ok: bool) {
        assert_eq!(draft(title, url).validate().is_ok(), ok);
    }
}
