use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::Result;
use fs_err as fs;
use log::{info, trace};

use crate::{asset_name::RenderedAsset, config::ImageFormat, figma_api::FigmaApiClient};

/// Removes the output directory if it exists and creates it again, empty.
pub fn recreate_output_dir(output_dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(output_dir) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    fs::create_dir_all(output_dir)
}

pub fn asset_path(output_dir: &Path, name: &str, format: ImageFormat) -> PathBuf {
    output_dir.join(format!("{}.{}", name, format.as_str()))
}

/// Downloads every asset one after the other into a freshly recreated output
/// directory. The first failure stops the run; anything written before it
/// stays on disk.
pub async fn write_assets(
    client: &dyn FigmaApiClient,
    output_dir: &Path,
    format: ImageFormat,
    assets: &[RenderedAsset],
) -> Result<Vec<PathBuf>> {
    recreate_output_dir(output_dir)?;

    let mut written = Vec::with_capacity(assets.len());

    for (index, asset) in assets.iter().enumerate() {
        info!(
            "Downloading {} ({}/{})",
            asset.writable_name,
            index + 1,
            assets.len()
        );

        let contents = client.download_render(&asset.render_url, format).await?;

        let path = asset_path(output_dir, &asset.writable_name, format);
        fs::write(&path, contents)?;
        trace!("wrote {} for component {}", path.display(), asset.id);

        written.push(path);
    }

    Ok(written)
}
