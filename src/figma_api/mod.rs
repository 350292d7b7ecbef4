mod rest;

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer,
};
use thiserror::Error;

use crate::config::ImageFormat;

pub use self::rest::RestClient;

/// The subset of the file endpoint's response we care about.
///
/// https://www.figma.com/developers/api#get-files-endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct FigmaFile {
    pub components: Components,
}

/// https://www.figma.com/developers/api#component-type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComponentMeta {
    pub name: String,
}

/// A document's components, in the order the document lists them.
#[derive(Debug, Clone, Default)]
pub struct Components {
    entries: Vec<(String, ComponentMeta)>,
    index: HashMap<String, usize>,
}

impl Components {
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&ComponentMeta> {
        self.index.get(id).map(|&position| &self.entries[position].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A repeated id keeps its first position and takes the latest value.
    fn insert(&mut self, id: String, meta: ComponentMeta) {
        match self.index.get(&id) {
            Some(&position) => self.entries[position].1 = meta,
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, meta));
            }
        }
    }
}

impl FromIterator<(String, ComponentMeta)> for Components {
    fn from_iter<I: IntoIterator<Item = (String, ComponentMeta)>>(iter: I) -> Self {
        let mut components = Components::default();
        for (id, meta) in iter {
            components.insert(id, meta);
        }
        components
    }
}

struct ComponentsVisitor;

impl<'de> Visitor<'de> for ComponentsVisitor {
    type Value = Components;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of component ids to components")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Components, A::Error> {
        let mut components = Components::default();
        while let Some((id, meta)) = map.next_entry::<String, ComponentMeta>()? {
            components.insert(id, meta);
        }
        Ok(components)
    }
}

impl<'de> Deserialize<'de> for Components {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ComponentsVisitor)
    }
}

/// What the images endpoint returns. Nodes that failed to render map to
/// `None`.
///
/// https://www.figma.com/developers/api#get-images-endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ImageUrls {
    #[serde(default)]
    pub err: Option<String>,
    pub images: BTreeMap<String, Option<String>>,
}

#[async_trait]
pub trait FigmaApiClient: Send + Sync {
    /// Fetch the component inventory of a document.
    async fn get_file(&self, document_key: &str) -> Result<FigmaFile>;

    /// Ask Figma to render the given nodes, returning a temporary URL for
    /// each of them.
    async fn get_image_urls(
        &self,
        document_key: &str,
        ids: &[String],
        format: ImageFormat,
    ) -> Result<ImageUrls>;

    /// Download the contents of a render URL.
    async fn download_render(&self, url: &str, format: ImageFormat) -> Result<Vec<u8>>;
}

#[derive(Debug, Error)]
pub enum FigmaApiError {
    #[error("Figma API HTTP error")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Figma API returned success, but had malformed JSON response: {body}")]
    BadResponseJson {
        body: String,
        source: serde_json::Error,
    },

    #[error("Figma API returned HTTP {status} with body: {body}")]
    ResponseError { status: StatusCode, body: String },

    #[error("Downloading render {url} failed with HTTP {status}")]
    RenderFailed { url: String, status: StatusCode },

    #[error("The access token contains characters that cannot be sent in an HTTP header")]
    InvalidToken,

    #[error("Render {url} was expected to be text but is not valid UTF-8")]
    RenderNotText {
        url: String,
        source: std::string::FromUtf8Error,
    },

    #[error("Invalid URL {url}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_ignores_unknown_fields() {
        let body = r#"{
            "name": "Icons",
            "document": { "id": "0:0" },
            "components": {
                "1:2": { "key": "abc", "name": "Icon/Close", "description": "" },
                "1:3": { "key": "def", "name": "Logo", "description": "" }
            }
        }"#;

        let file: FigmaFile = serde_json::from_str(body).unwrap();

        assert_eq!(file.components.len(), 2);
        assert_eq!(file.components.get("1:2").unwrap().name, "Icon/Close");
        assert_eq!(file.components.get("1:3").unwrap().name, "Logo");
        assert!(file.components.get("9:9").is_none());
    }

    #[test]
    fn components_keep_document_order() {
        let body = r#"{
            "components": {
                "1:9": { "name": "Light/Close" },
                "1:10": { "name": "Dark/Close" },
                "1:2": { "name": "Logo" }
            }
        }"#;

        let file: FigmaFile = serde_json::from_str(body).unwrap();

        assert_eq!(file.components.ids(), vec!["1:9", "1:10", "1:2"]);
    }

    #[test]
    fn repeated_component_id_keeps_first_position() {
        let components: Components = vec![
            ("1:2".to_owned(), ComponentMeta { name: "Old".to_owned() }),
            ("1:3".to_owned(), ComponentMeta { name: "Logo".to_owned() }),
            ("1:2".to_owned(), ComponentMeta { name: "New".to_owned() }),
        ]
        .into_iter()
        .collect();

        assert_eq!(components.ids(), vec!["1:2", "1:3"]);
        assert_eq!(components.get("1:2").unwrap().name, "New");
    }

    #[test]
    fn file_without_components_is_malformed() {
        let result = serde_json::from_str::<FigmaFile>(r#"{ "status": 403, "err": "Invalid token" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn image_urls_keep_failed_renders() {
        let body = r#"{
            "err": null,
            "images": { "1:2": "https://x/a.png", "1:3": null }
        }"#;

        let urls: ImageUrls = serde_json::from_str(body).unwrap();

        assert_eq!(urls.err, None);
        assert_eq!(urls.images["1:2"].as_deref(), Some("https://x/a.png"));
        assert_eq!(urls.images["1:3"], None);
    }
}
