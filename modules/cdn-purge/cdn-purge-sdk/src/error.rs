//! Error types for the cdn-purge module.

use thiserror::Error;

/// Errors that can occur while authenticating or purging.
///
/// Secrets and bearer tokens never appear in the formatted output.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CdnPurgeError {
    /// The identity provider answered with a non-2xx status
    /// (bad credentials, unknown tenant, malformed request).
    #[error("authentication rejected: HTTP {status}")]
    Auth {
        /// HTTP status returned by the identity provider.
        status: u16,
        /// Response body (error description from the provider).
        body: String,
    },

    /// A purge endpoint answered with a non-2xx status.
    #[error("purge failed: HTTP {status}: {body}")]
    PurgeHttp {
        /// HTTP status returned by the purge endpoint.
        status: u16,
        /// Response body (error description from the provider).
        body: String,
    },

    /// No response was received: connectivity, DNS, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// A 2xx response whose body could not be used.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be built locally (bad header value, bad URL).
    #[error("request error: {0}")]
    Http(String),
}

impl CdnPurgeError {
    /// Status code of a well-formed error response, if this is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::PurgeHttp { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body of a well-formed error response, if this is one.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Auth { body, .. } | Self::PurgeHttp { body, .. } => Some(body),
            _ => None,
        }
    }

    /// `true` when no response was received at all.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
