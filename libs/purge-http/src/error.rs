use thiserror::Error;

/// Why a request URL was rejected before anything was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    ParseError,
    MissingAuthority,
    MissingScheme,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("cannot build request: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("bad header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("bad header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("no response within {0:?}")]
    Timeout(std::time::Duration),

    /// Connection, DNS or protocol failure below HTTP.
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("TLS failure: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("response body exceeds {limit} bytes (got {actual})")]
    BodyTooLarge { limit: usize, actual: usize },

    /// Non-2xx response. `body_preview` is truncated to
    /// [`ERROR_BODY_PREVIEW_LIMIT`](crate::ERROR_BODY_PREVIEW_LIMIT) bytes.
    #[error("HTTP {status}: {body_preview}")]
    HttpStatus {
        status: http::StatusCode,
        body_preview: String,
        content_type: Option<String>,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot form-encode body: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    /// The buffer worker is gone.
    #[error("HTTP client closed")]
    ServiceClosed,

    /// `reason` is for logs; match on `kind`.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUri {
        url: String,
        kind: InvalidUriKind,
        reason: String,
    },

    #[error("scheme '{scheme}' rejected: {reason}")]
    InvalidScheme { scheme: String, reason: String },
}

impl HttpError {
    /// `true` when no response was received: connectivity, DNS, TLS or
    /// timeout failures, or the client worker going away.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Transport(_) | Self::Tls(_) | Self::ServiceClosed
        )
    }

    /// Status code of a well-formed error response, if this is one.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fmt;

    #[derive(Debug)]
    struct TestError(&'static str);

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl Error for TestError {}

    #[test]
    fn transport_error_preserves_source() {
        let err = HttpError::Transport(Box::new(TestError("connection refused")));

        let source = err.source().unwrap();
        let downcast = source.downcast_ref::<TestError>().unwrap();
        assert_eq!(downcast.0, "connection refused");
    }

    #[test]
    fn transport_classification() {
        assert!(HttpError::Transport(Box::new(TestError("dns"))).is_transport());
        assert!(HttpError::Tls(Box::new(TestError("bad cert"))).is_transport());
        assert!(HttpError::Timeout(std::time::Duration::from_secs(1)).is_transport());
        assert!(HttpError::ServiceClosed.is_transport());

        let status = HttpError::HttpStatus {
            status: http::StatusCode::FORBIDDEN,
            body_preview: "denied".to_owned(),
            content_type: None,
        };
        assert!(!status.is_transport());
        assert_eq!(status.status(), Some(http::StatusCode::FORBIDDEN));
    }

    #[test]
    fn http_status_renders_body_preview() {
        let err = HttpError::HttpStatus {
            status: http::StatusCode::UNAUTHORIZED,
            body_preview: r#"{"error":"invalid_client"}"#.to_owned(),
            content_type: Some("application/json".to_owned()),
        };
        assert_eq!(
            err.to_string(),
            r#"HTTP 401 Unauthorized: {"error":"invalid_client"}"#
        );
    }
}
