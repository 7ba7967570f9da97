//! Remote image URL validation for entry phases.
//!
//! A URL is accepted when a `HEAD` request answers 2xx with an image
//! content-type and a content-length within the configured limit. Servers that
//! omit content-length must additionally serve the first KiB via a ranged `GET`.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, RANGE};
use reqwest::{Client, Url};
use thiserror::Error;

use crate::error::ValidationDetail;

/// Content types accepted for phase images.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// Why an image URL was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageRejection {
    #[error("not a valid URL")]
    InvalidUrl,
    #[error("unsupported protocol '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("missing content-type")]
    MissingContentType,
    #[error("unsupported content-type '{0}'")]
    UnsupportedContentType(String),
    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
}

/// Checks that a URL points at an acceptable image.
#[async_trait]
pub trait ImageValidator: Send + Sync {
    async fn validate(&self, url: &str) -> Result<(), ImageRejection>;
}

/// Validator that probes the URL over HTTP.
pub struct HttpImageValidator {
    client: Client,
    max_bytes: u64,
}

impl HttpImageValidator {
    /// Build a validator whose requests each time out after `timeout`.
    pub fn new(timeout: Duration, max_bytes: u64) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, max_bytes })
    }
}

#[async_trait]
impl ImageValidator for HttpImageValidator {
    async fn validate(&self, url: &str) -> Result<(), ImageRejection> {
        let url = parse_http_url(url)?;

        let head = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(map_transport_error)?;
        if !head.status().is_success() {
            return Err(ImageRejection::Status(head.status().as_u16()));
        }

        check_content_type(
            head.headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        )?;

        let length = head
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        if check_content_length(length, self.max_bytes)? {
            return Ok(());
        }

        let probe = self
            .client
            .get(url)
            .header(RANGE, "bytes=0-1023")
            .send()
            .await
            .map_err(map_transport_error)?;
        if !probe.status().is_success() {
            return Err(ImageRejection::Status(probe.status().as_u16()));
        }
        Ok(())
    }
}

/// Parse a URL and require the http or https scheme.
pub fn parse_http_url(raw: &str) -> Result<Url, ImageRejection> {
    let url = Url::parse(raw.trim()).map_err(|_| ImageRejection::InvalidUrl)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ImageRejection::UnsupportedScheme(other.to_string())),
    }
}

/// Accept only image content types, ignoring parameters such as `charset`.
pub fn check_content_type(value: Option<&str>) -> Result<(), ImageRejection> {
    let value = value.ok_or(ImageRejection::MissingContentType)?;
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if ALLOWED_CONTENT_TYPES.contains(&mime.as_str()) {
        Ok(())
    } else {
        Err(ImageRejection::UnsupportedContentType(mime))
    }
}

/// Returns `Ok(true)` when the size is known and acceptable, `Ok(false)` when unknown.
pub fn check_content_length(length: Option<u64>, limit: u64) -> Result<bool, ImageRejection> {
    match length {
        Some(size) if size > limit => Err(ImageRejection::TooLarge { size, limit }),
        Some(_) => Ok(true),
        None => Ok(false),
    }
}

fn map_transport_error(err: reqwest::Error) -> ImageRejection {
    if err.is_timeout() {
        ImageRejection::Timeout
    } else {
        ImageRejection::Transport(err.to_string())
    }
}

/// Validate every `(field, url)` pair concurrently and collect the failures.
///
/// Blank URLs are skipped. An empty result means every URL passed.
pub async fn validate_all(
    validator: &dyn ImageValidator,
    urls: &[(&str, &str)],
) -> Vec<ValidationDetail> {
    let checks = urls
        .iter()
        .filter(|(_, url)| !url.trim().is_empty())
        .map(|&(field, url)| async move {
            validator
                .validate(url)
                .await
                .err()
                .map(|reason| ValidationDetail {
                    field: field.to_string(),
                    url: url.to_string(),
                    reason: reason.to_string(),
                })
        });

    join_all(checks).await.into_iter().flatten().collect()
}
