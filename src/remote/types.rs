//! Wire types for the remote REST dialect.

use serde::Deserialize;

/// One entry of the space listing.
#[derive(Clone, Debug, Deserialize)]
pub struct Space {
    pub key: String,
    pub name: String,
}

/// One entry of a page or child listing.
#[derive(Clone, Debug, Deserialize)]
pub struct RemotePage {
    pub id: String,
    pub title: String,
}

/// One entry of a page's version listing.
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteVersion {
    pub number: u32,
    /// RFC 3339 timestamp.
    pub when: String,
    #[serde(default)]
    pub message: Option<String>,
    pub by: VersionAuthor,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VersionAuthor {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Content of a page at one specific version.
#[derive(Clone, Debug, Deserialize)]
pub struct PageContent {
    pub id: String,
    pub title: String,
    body: Body,
}

impl PageContent {
    pub fn new(id: impl Into<String>, title: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: Body {
                storage: Storage {
                    value: markup.into(),
                },
            },
        }
    }

    /// The source markup stored for this version.
    pub fn markup(&self) -> &str {
        &self.body.storage.value
    }
}

#[derive(Clone, Debug, Deserialize)]
struct Body {
    storage: Storage,
}

#[derive(Clone, Debug, Deserialize)]
struct Storage {
    value: String,
}

/// Paginated response envelope. Continuation holds while `_links.next` is
/// present in the response.
#[derive(Debug, Deserialize)]
pub(crate) struct Paged<T> {
    pub results: Vec<T>,
    #[serde(default, rename = "_links")]
    pub links: Links,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Links {
    #[serde(default)]
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_envelope_parses_next_indicator() {
        let json = r#"{
            "results": [{"id": "1", "title": "Home"}],
            "_links": {"next": "/rest/api/content?start=25"}
        }"#;
        let page: Paged<RemotePage> = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 1);
        assert!(page.links.next.is_some());

        let json = r#"{"results": [], "_links": {}}"#;
        let page: Paged<RemotePage> = serde_json::from_str(json).unwrap();
        assert!(page.links.next.is_none());
    }

    #[test]
    fn content_exposes_storage_markup() {
        let json = r#"{
            "id": "7",
            "title": "Draft",
            "body": {"storage": {"value": "<p>hi</p>"}}
        }"#;
        let content: PageContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.markup(), "<p>hi</p>");
    }
}
