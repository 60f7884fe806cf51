//! Locating the media an invocation refers to.
//!
//! Sources are tried in a fixed order: media attached to the command
//! message, then media on the quoted message, then a link found in the
//! command text. The first source that yields media wins; later sources are
//! never consulted.

use async_trait::async_trait;
use bytes::BytesMut;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::Serialize;
use stickerforge_common::{normalize_mime, MediaBlob};

use crate::config::FetchConfig;

/// Name used when a link has no usable file name.
pub const FALLBACK_NAME: &str = "sticker";

/// Downloads media carried by a chat message.
///
/// Returns `Ok(None)` when the message turns out to have no media, so the
/// resolver can move on to the next source.
#[async_trait]
pub trait MediaAccessor: Send + Sync {
    async fn download(&self) -> anyhow::Result<Option<MediaBlob>>;
}

/// Where resolved media came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaOrigin {
    Attachment,
    Quoted,
    Link,
}

impl std::fmt::Display for MediaOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaOrigin::Attachment => write!(f, "attachment"),
            MediaOrigin::Quoted => write!(f, "quoted message"),
            MediaOrigin::Link => write!(f, "link"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedMedia {
    pub origin: MediaOrigin,
    pub blob: MediaBlob,
}

/// Errors raised while retrieving media.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to download {origin} media: {message}")]
    Accessor { origin: MediaOrigin, message: String },

    #[error("invalid link {url}")]
    InvalidUrl { url: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} is not a direct image link (content-type: {})", content_type.as_deref().unwrap_or("none"))]
    NotAnImage {
        url: String,
        content_type: Option<String>,
    },

    #[error("{url} is larger than {limit} bytes")]
    TooLarge { url: String, limit: u64 },
}

impl FetchError {
    fn request(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Message for the chat user.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Accessor { .. } => {
                "Sorry, I couldn't download that media. Please try sending it again.".to_string()
            }
            FetchError::NotAnImage { .. } => {
                "That link doesn't point directly to an image. Please send a direct image link."
                    .to_string()
            }
            FetchError::TooLarge { limit, .. } => format!(
                "That image is too large. The limit is {} MB.",
                limit / (1024 * 1024)
            ),
            FetchError::Timeout { .. } => {
                "Sorry, downloading that link took too long.".to_string()
            }
            FetchError::InvalidUrl { .. }
            | FetchError::Request { .. }
            | FetchError::Status { .. } => format!(
                "Sorry, I couldn't download the image from that link. (Details: {})",
                self
            ),
        }
    }
}

/// Resolves the media for an invocation.
#[derive(Debug, Clone)]
pub struct MediaResolver {
    client: Client,
    max_bytes: u64,
}

impl MediaResolver {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            max_bytes: config.max_bytes,
        }
    }

    /// Pick the first available media source.
    ///
    /// Returns `Ok(None)` when no source yields media.
    pub async fn resolve(
        &self,
        attachment: Option<&dyn MediaAccessor>,
        quoted: Option<&dyn MediaAccessor>,
        url: Option<&str>,
    ) -> Result<Option<ResolvedMedia>, FetchError> {
        let accessors = [
            (MediaOrigin::Attachment, attachment),
            (MediaOrigin::Quoted, quoted),
        ];

        for (origin, accessor) in accessors {
            let Some(accessor) = accessor else {
                continue;
            };

            match accessor.download().await {
                Ok(Some(blob)) => {
                    tracing::debug!("Resolved {} from {}", blob.mime_type(), origin);
                    return Ok(Some(ResolvedMedia { origin, blob }));
                }
                Ok(None) => tracing::debug!("No media on {}", origin),
                Err(e) => {
                    return Err(FetchError::Accessor {
                        origin,
                        message: format!("{:#}", e),
                    })
                }
            }
        }

        match url {
            Some(url) => {
                let blob = self.fetch_url(url).await?;
                Ok(Some(ResolvedMedia {
                    origin: MediaOrigin::Link,
                    blob,
                }))
            }
            None => Ok(None),
        }
    }

    /// Download an image from a link.
    ///
    /// The response must be 2xx with an `image/*` content type and a body no
    /// larger than the configured limit.
    pub async fn fetch_url(&self, url: &str) -> Result<MediaBlob, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        let mut response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| FetchError::request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(normalize_mime);

        let mime_type = match content_type {
            Some(ct) if ct.starts_with("image/") => ct,
            other => {
                return Err(FetchError::NotAnImage {
                    url: url.to_string(),
                    content_type: other,
                })
            }
        };

        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                limit: self.max_bytes,
            });
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::request(url, e))?
        {
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!("Fetched {} bytes of {} from {}", body.len(), mime_type, url);

        Ok(MediaBlob::new(body.freeze(), &mime_type, file_name_for(&parsed)))
    }
}

/// Last non-empty path segment of a link.
fn file_name_for(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}
