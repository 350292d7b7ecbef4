use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::{header::HeaderValue, Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ImageFormat;

use super::{FigmaApiClient, FigmaApiError, FigmaFile, ImageUrls};

pub const DEFAULT_BASE_URL: &str = "https://api.figma.com/v1";

const TOKEN_HEADER: &str = "X-Figma-Token";

/// Talks to the Figma REST API over HTTP.
pub struct RestClient {
    base_url: Url,
    token: HeaderValue,
    client: Client,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "RestClient({})", self.base_url)
    }
}

impl RestClient {
    pub fn new(access_token: &SecretString) -> Result<Self> {
        Self::with_base_url(access_token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(access_token: &SecretString, base_url: &str) -> Result<Self> {
        let mut token = HeaderValue::from_str(access_token.expose_secret())
            .map_err(|_| FigmaApiError::InvalidToken)?;
        token.set_sensitive(true);

        Ok(Self {
            base_url: parse_url(base_url)?,
            token,
            client: Client::new(),
        })
    }

    /// Issue an authenticated GET and parse the body as JSON, returning an
    /// error for non-success statuses and bodies of the wrong shape.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(TOKEN_HEADER, self.token.clone())
            .send()
            .await
            .map_err(FigmaApiError::from)?;

        Ok(read_json(response).await?)
    }
}

#[async_trait]
impl FigmaApiClient for RestClient {
    async fn get_file(&self, document_key: &str) -> Result<FigmaFile> {
        self.get_json(file_url(&self.base_url, document_key)?).await
    }

    async fn get_image_urls(
        &self,
        document_key: &str,
        ids: &[String],
        format: ImageFormat,
    ) -> Result<ImageUrls> {
        self.get_json(images_url(&self.base_url, document_key, ids, format)?)
            .await
    }

    async fn download_render(&self, url: &str, format: ImageFormat) -> Result<Vec<u8>> {
        let url = parse_url(url)?;
        debug!("GET {}", url);

        // Render URLs are pre-signed, so they don't get the token attached.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FigmaApiError::from)?;

        check_render_status(&url, response.status())?;

        let body = response.bytes().await.map_err(FigmaApiError::from)?;

        Ok(render_contents(&url, format, body.to_vec())?)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, FigmaApiError> {
    let status = response.status();
    let body = response.text().await?;

    parse_response(status, body)
}

/// Figma reports most failures through HTTP status codes, so the body is only
/// parsed for successful responses.
fn parse_response<T: DeserializeOwned>(
    status: StatusCode,
    body: String,
) -> Result<T, FigmaApiError> {
    if status.is_success() {
        parse_body(body)
    } else {
        Err(FigmaApiError::ResponseError { status, body })
    }
}

fn check_render_status(url: &Url, status: StatusCode) -> Result<(), FigmaApiError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FigmaApiError::RenderFailed {
            url: url.to_string(),
            status,
        })
    }
}

/// Raster renders are kept as-is, vector renders must be valid text.
fn render_contents(
    url: &Url,
    format: ImageFormat,
    body: Vec<u8>,
) -> Result<Vec<u8>, FigmaApiError> {
    if format.is_binary() {
        return Ok(body);
    }

    String::from_utf8(body)
        .map(String::into_bytes)
        .map_err(|source| FigmaApiError::RenderNotText {
            url: url.to_string(),
            source,
        })
}

fn parse_body<T: DeserializeOwned>(body: String) -> Result<T, FigmaApiError> {
    match serde_json::from_str(&body) {
        Ok(parsed) => Ok(parsed),
        Err(source) => Err(FigmaApiError::BadResponseJson { body, source }),
    }
}

fn parse_url(url: &str) -> Result<Url, FigmaApiError> {
    Url::parse(url).map_err(|source| FigmaApiError::InvalidUrl {
        url: url.to_owned(),
        source,
    })
}

/// Appends path segments to the base URL, percent-encoding each of them.
fn endpoint_url(base_url: &Url, segments: &[&str]) -> Result<Url, FigmaApiError> {
    let mut url = base_url.clone();

    url.path_segments_mut()
        .map_err(|_| FigmaApiError::InvalidUrl {
            url: base_url.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

fn file_url(base_url: &Url, document_key: &str) -> Result<Url, FigmaApiError> {
    endpoint_url(base_url, &["files", document_key])
}

fn images_url(
    base_url: &Url,
    document_key: &str,
    ids: &[String],
    format: ImageFormat,
) -> Result<Url, FigmaApiError> {
    let mut url = endpoint_url(base_url, &["images", document_key])?;

    url.query_pairs_mut()
        .append_pair("ids", &ids.join(","))
        .append_pair("format", format.as_str());

    Ok(url)
}
