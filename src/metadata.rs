// Video metadata lookup. The HTTP client for the upstream API is injected by the host.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::error::EngineError;

/// Upstream video-metadata API, seen as a list of opaque items for one id.
pub trait MetadataSource {
    fn fetch(&mut self, video_id: &str) -> Result<Vec<Value>, EngineError>;
}

/// Upstream response body, already fetched by the page.
/// Either an `items` list or an `error` object, as the video API returns them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchedMetadata {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub error: Option<UpstreamError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamError {
    #[serde(default)]
    pub message: String,
}

impl MetadataSource for FetchedMetadata {
    fn fetch(&mut self, _video_id: &str) -> Result<Vec<Value>, EngineError> {
        match self.error.take() {
            Some(upstream) => Err(EngineError::Metadata(upstream.message)),
            None => Ok(std::mem::take(&mut self.items)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataRequest {
    #[serde(default)]
    pub id: Option<String>,
}

/// Reply shape expected by the authoring page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MetadataResponse {
    Ok { metadata: Value },
    Error { message: String },
}

impl MetadataResponse {
    fn error(message: impl Into<String>) -> Self {
        MetadataResponse::Error {
            message: message.into(),
        }
    }
}

/// Resolve metadata for the requested id. Never fails; problems become `Error` replies.
pub fn lookup_metadata<S: MetadataSource + ?Sized>(
    source: &mut S,
    request: &MetadataRequest,
) -> MetadataResponse {
    let video_id = match request.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id,
        _ => return MetadataResponse::error("Missing video ID"),
    };

    match source.fetch(video_id) {
        Ok(items) => match items.into_iter().next() {
            Some(metadata) => MetadataResponse::Ok { metadata },
            None => MetadataResponse::error("No video found"),
        },
        Err(err) => {
            error!(video_id, error = %err, "metadata lookup failed");
            // The authoring page shows the upstream text as-is.
            match err {
                EngineError::Metadata(message) => MetadataResponse::error(message),
                other => MetadataResponse::error(other.to_string()),
            }
        }
    }
}
