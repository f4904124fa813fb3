use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

/// Maximum body preview size carried in [`HttpError::HttpStatus`] (8KB).
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

const TOO_LARGE_PREVIEW: &str = "<body too large for preview>";

/// Boxed (and already decompressed) response body.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// Response whose body has not been read yet.
///
/// [`bytes`](Self::bytes) accepts any status; [`json`](Self::json) turns a
/// non-2xx status into [`HttpError::HttpStatus`]. Both stop at the
/// configured `max_body_size`.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Read response body as bytes without status check
    ///
    /// # Errors
    /// Returns `HttpError::BodyTooLarge` if body exceeds limit, or
    /// `HttpError::Transport` if the connection fails mid-body.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        read_body_limited(self.inner, self.max_body_size).await
    }

    /// The first [`ERROR_BODY_PREVIEW_LIMIT`] bytes of the body, lossily
    /// decoded, for reporting an error status. Never fails: an oversized
    /// body yields a placeholder and a failed read an empty string.
    #[must_use]
    pub async fn body_preview(self) -> String {
        let limit = self.max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
        match read_body_limited(self.inner, limit).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(HttpError::BodyTooLarge { .. }) => TOO_LARGE_PREVIEW.to_owned(),
            Err(e) => {
                tracing::debug!(error = %e, "response body could not be read");
                String::new()
            }
        }
    }

    /// Parse response body as JSON with status check
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` if status is not 2xx.
    /// Returns `HttpError::BodyTooLarge` if body exceeds limit.
    /// Returns `HttpError::Json` if parsing fails.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body_bytes = checked_body(self.inner, self.max_body_size).await?;
        Ok(serde_json::from_slice(&body_bytes)?)
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

async fn checked_body(
    response: Response<ResponseBody>,
    max_body_size: usize,
) -> Result<Bytes, HttpError> {
    let status = response.status();

    if !status.is_success() {
        let content_type = content_type(response.headers());

        // BodyTooLarge must not hide the status error
        let preview_limit = max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
        let body_preview = match read_body_limited(response, preview_limit).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(HttpError::BodyTooLarge { .. }) => TOO_LARGE_PREVIEW.to_owned(),
            Err(e) => return Err(e),
        };

        return Err(HttpError::HttpStatus {
            status,
            body_preview,
            content_type,
        });
    }

    read_body_limited(response, max_body_size).await
}

async fn read_body_limited(
    response: Response<ResponseBody>,
    limit: usize,
) -> Result<Bytes, HttpError> {
    let (_parts, body) = response.into_parts();

    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            if collected.len() + chunk.len() > limit {
                return Err(HttpError::BodyTooLarge {
                    limit,
                    actual: collected.len() + chunk.len(),
                });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}
