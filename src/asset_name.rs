//! Turning Figma component names into names that can be written to disk.

use std::collections::{BTreeMap, HashMap};

use log::warn;
use thiserror::Error;

use crate::figma_api::Components;

/// A component paired with the URL of its render and the name it will be
/// written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAsset {
    pub id: String,
    pub writable_name: String,
    pub render_url: String,
}

#[derive(Debug, Error)]
pub enum NamingError {
    #[error("Component {id} ({name:?}) does not have a writable name")]
    EmptyWritableName { id: String, name: String },

    #[error("Component {id} is not part of the document")]
    UnknownComponent { id: String },

    #[error("Figma did not return a render URL for component {id}")]
    MissingRenderUrl { id: String },
}

/// Components are commonly grouped with slashes, like `Icon/Close`. Only the
/// last segment is kept.
pub fn writable_name(display_name: &str) -> Option<&str> {
    let name = display_name.rsplit('/').next()?.trim();

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Pairs every id with its writable name and render URL. Any id that cannot
/// be named aborts the whole batch. Names are checked for every id before
/// any render URL is looked at.
pub fn name_assets(
    ids: &[String],
    components: &Components,
    images: &BTreeMap<String, Option<String>>,
) -> Result<Vec<RenderedAsset>, NamingError> {
    let mut names = Vec::with_capacity(ids.len());
    let mut claimed: HashMap<&str, &str> = HashMap::new();

    for id in ids {
        let component = components
            .get(id)
            .ok_or_else(|| NamingError::UnknownComponent { id: id.clone() })?;

        let name =
            writable_name(&component.name).ok_or_else(|| NamingError::EmptyWritableName {
                id: id.clone(),
                name: component.name.clone(),
            })?;

        if let Some(previous) = claimed.insert(name, id.as_str()) {
            warn!(
                "Components {} and {} are both named '{}', the latter will overwrite the former",
                previous, id, name
            );
        }

        names.push((id, name));
    }

    names
        .into_iter()
        .map(|(id, name)| {
            let render_url = images
                .get(id)
                .and_then(|url| url.clone())
                .ok_or_else(|| NamingError::MissingRenderUrl { id: id.clone() })?;

            Ok(RenderedAsset {
                id: id.clone(),
                writable_name: name.to_owned(),
                render_url,
            })
        })
        .collect()
}
