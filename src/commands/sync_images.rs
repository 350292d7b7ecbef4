use std::path::PathBuf;

use log::{debug, info, warn};

use crate::{
    asset_name::name_assets,
    asset_writer::{recreate_output_dir, write_assets},
    config::Config,
    figma_api::FigmaApiClient,
};

/// What a sync run left in the output directory.
#[derive(Debug, Default)]
pub struct SyncSummary {
    pub written: Vec<PathBuf>,
}

/// Exports every component of the configured document into the output
/// directory.
pub async fn sync_images(
    client: &dyn FigmaApiClient,
    config: &Config,
) -> anyhow::Result<SyncSummary> {
    let file = client.get_file(&config.document_key).await?;
    let ids = file.components.ids();

    info!(
        "Found {} components in document {}",
        file.components.len(),
        config.document_key
    );

    if file.components.is_empty() {
        recreate_output_dir(&config.output_dir)?;
        return Ok(SyncSummary::default());
    }

    let image_urls = client
        .get_image_urls(&config.document_key, &ids, config.format)
        .await?;

    // Figma also signals failures through HTTP statuses, so this is only
    // reported.
    if let Some(err) = image_urls.err.as_deref().filter(|err| !err.is_empty()) {
        warn!("Figma reported an error while rendering images: {}", err);
    }

    let assets = name_assets(&ids, &file.components, &image_urls.images)?;
    debug!("Resolved {} assets", assets.len());

    let written = write_assets(client, &config.output_dir, config.format, &assets).await?;

    Ok(SyncSummary { written })
}
