//! Validated configuration for a sync run.

use std::{fmt, path::PathBuf};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::options::Options;

/// Where exported images land when nothing else is specified.
pub const DEFAULT_OUTPUT_DIR: &str = "./dist";

/// Image kinds the images endpoint can render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    /// The value used both as the `format` query parameter and as the file
    /// extension of written assets.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    /// Raster renders are copied byte for byte, vector renders are decoded as
    /// text first.
    pub fn is_binary(self) -> bool {
        matches!(self, ImageFormat::Png)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Please provide FIGMA_ACCESS_TOKEN and FIGMA_FILE_KEY (FIGMA_ACCESS_TOKEN is missing)")]
    MissingAccessToken,

    #[error("Please provide FIGMA_ACCESS_TOKEN and FIGMA_FILE_KEY (FIGMA_FILE_KEY is missing)")]
    MissingDocumentKey,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub access_token: SecretString,
    pub document_key: String,
    pub format: ImageFormat,
    pub output_dir: PathBuf,
}

impl Config {
    /// Builds a configuration from raw inputs, treating blank values as
    /// missing.
    pub fn new(
        access_token: Option<SecretString>,
        document_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let access_token = access_token
            .filter(|token| !token.expose_secret().trim().is_empty())
            .ok_or(ConfigError::MissingAccessToken)?;

        let document_key = document_key
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingDocumentKey)?;

        // TODO: expose the format once there is a way to pick it per run.
        Ok(Self {
            access_token,
            document_key,
            format: ImageFormat::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        })
    }

    pub fn from_options(options: &Options) -> Result<Self, ConfigError> {
        Self::new(options.access_token.clone(), options.file_key.clone())
    }
}
