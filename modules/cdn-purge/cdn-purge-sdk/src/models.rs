//! Wire models shared by the purge client and its callers.

use serde::Serialize;

/// Content path that purges everything on an endpoint.
pub const PURGE_ALL_PATH: &str = "/*";

/// JSON body of a purge request: `{"contentPaths": [...]}`.
///
/// Paths never carry scheme, host, port or credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeRequest {
    #[serde(rename = "contentPaths")]
    pub content_paths: Vec<String>,
}

impl PurgeRequest {
    /// Request that purges the whole endpoint.
    #[must_use]
    pub fn all() -> Self {
        Self {
            content_paths: vec![PURGE_ALL_PATH.to_owned()],
        }
    }
}

/// Outcome of the primary purge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body (usually empty for `202 Accepted`).
    pub body: String,
}

impl PurgeResponse {
    /// `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
