//! Confluence content API payloads.

use serde::{Deserialize, Serialize};

/// Body of `POST /rest/api/content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePageRequest {
    /// Content type (always "page").
    #[serde(rename = "type")]
    pub content_type: String,
    pub title: String,
    pub space: SpaceRef,
    pub body: Body,
    /// Parent placement; omitted from the JSON when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ancestors: Vec<Ancestor>,
}

impl CreatePageRequest {
    /// A new page in `space_key`, optionally nested under `parent_id`.
    pub fn new(title: &str, space_key: &str, html: &str, parent_id: Option<&str>) -> Self {
        Self {
            content_type: "page".to_string(),
            title: title.to_string(),
            space: SpaceRef {
                key: space_key.to_string(),
            },
            body: Body {
                storage: Storage {
                    value: html.to_string(),
                    representation: "storage".to_string(),
                },
            },
            ancestors: parent_id
                .map(|id| vec![Ancestor { id: id.to_string() }])
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceRef {
    pub key: String,
}

/// Page body content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub storage: Storage,
}

/// Storage format representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    /// XHTML in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    pub representation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ancestor {
    pub id: String,
}

/// The subset of the created-content response we read.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentResponse {
    /// Usually a string, but treated as opaque.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: Option<String>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

/// Hypermedia links.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    /// Web UI path relative to `base`.
    #[serde(default)]
    pub webui: Option<String>,
    /// Site root, e.g. `https://example.atlassian.net/wiki`.
    #[serde(default)]
    pub base: Option<String>,
}

impl ContentResponse {
    /// The identifier rendered as text, if the response carried one.
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// `base + webui`, or `None` when either part is missing.
    pub fn absolute_url(&self) -> Option<String> {
        let links = self.links.as_ref()?;
        match (links.base.as_deref(), links.webui.as_deref()) {
            (Some(base), Some(webui)) if !base.is_empty() && !webui.is_empty() => {
                Some(format!("{base}{webui}"))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn payload_without_parent_has_no_ancestors() {
        let title = "Help – Login – 2026-01-01 10:00:00";
        let req = CreatePageRequest::new(title, "OLMS", "<p>x</p>", None);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "type": "page",
                "title": "Help – Login – 2026-01-01 10:00:00",
                "space": {"key": "OLMS"},
                "body": {"storage": {"value": "<p>x</p>", "representation": "storage"}}
            })
        );
    }

    #[test]
    fn payload_with_parent_nests_page() {
        let req = CreatePageRequest::new("T", "OLMS", "<p>x</p>", Some("98765"));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["ancestors"], json!([{"id": "98765"}]));
    }

    #[test]
    fn absolute_url_joins_base_and_webui() {
        let resp: ContentResponse = serde_json::from_value(json!({
            "id": "123",
            "_links": {"base": "https://x.atlassian.net/wiki", "webui": "/spaces/OLMS/pages/123"}
        }))
        .unwrap();
        assert_eq!(resp.id_string().as_deref(), Some("123"));
        assert_eq!(
            resp.absolute_url().as_deref(),
            Some("https://x.atlassian.net/wiki/spaces/OLMS/pages/123")
        );
    }

    #[test]
    fn absolute_url_unavailable_when_a_link_is_missing() {
        let no_base: ContentResponse =
            serde_json::from_value(json!({"id": "1", "_links": {"webui": "/p/1"}})).unwrap();
        assert_eq!(no_base.absolute_url(), None);

        let no_links: ContentResponse = serde_json::from_value(json!({"id": "1"})).unwrap();
        assert_eq!(no_links.absolute_url(), None);
    }

    #[test]
    fn numeric_id_is_opaque_text() {
        let resp: ContentResponse = serde_json::from_value(json!({"id": 4242})).unwrap();
        assert_eq!(resp.id_string().as_deref(), Some("4242"));

        let missing: ContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.id_string(), None);
    }
}
