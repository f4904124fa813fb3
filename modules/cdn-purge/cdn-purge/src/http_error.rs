use cdn_purge_sdk::CdnPurgeError;
use purge_http::HttpError;

/// Remote side of a failed request; decides how a non-2xx status is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endpoint {
    Identity,
    Purge,
}

impl Endpoint {
    fn prefix(self) -> &'static str {
        match self {
            Self::Identity => "token endpoint",
            Self::Purge => "purge endpoint",
        }
    }
}

/// Map a transport-level [`HttpError`] into the module error.
///
/// Error statuses keep their body so callers can surface the provider's
/// diagnostic. All other messages carry only the prefix and the error kind.
pub(crate) fn map_http_error(err: HttpError, endpoint: Endpoint) -> CdnPurgeError {
    let prefix = endpoint.prefix();
    match err {
        HttpError::HttpStatus {
            status,
            body_preview,
            ..
        } => match endpoint {
            Endpoint::Identity => CdnPurgeError::Auth {
                status: status.as_u16(),
                body: body_preview,
            },
            Endpoint::Purge => CdnPurgeError::PurgeHttp {
                status: status.as_u16(),
                body: body_preview,
            },
        },
        HttpError::Timeout(duration) => {
            CdnPurgeError::Transport(format!("{prefix} request timed out after {duration:?}"))
        }
        HttpError::Transport(e) => CdnPurgeError::Transport(format!("{prefix}: {e}")),
        HttpError::Tls(e) => CdnPurgeError::Transport(format!("{prefix} TLS error: {e}")),
        HttpError::ServiceClosed => {
            CdnPurgeError::Transport(format!("{prefix} service unavailable"))
        }
        HttpError::Json(e) => {
            CdnPurgeError::InvalidResponse(format!("{prefix} JSON parse failed: {e}"))
        }
        HttpError::BodyTooLarge { limit, actual } => CdnPurgeError::InvalidResponse(format!(
            "{prefix} response too large: limit {limit} bytes, got {actual} bytes"
        )),
        HttpError::RequestBuild(e) => {
            CdnPurgeError::Http(format!("{prefix} request build failed: {e}"))
        }
        HttpError::InvalidHeaderName(e) => {
            CdnPurgeError::Http(format!("{prefix} invalid header name: {e}"))
        }
        // The value may be a bearer token; keep it out of the message.
        HttpError::InvalidHeaderValue(_) => {
            CdnPurgeError::Http(format!("{prefix} invalid header value"))
        }
        HttpError::FormEncode(e) => CdnPurgeError::Http(format!("{prefix} form encode error: {e}")),
        HttpError::InvalidUri { url, reason, .. } => {
            CdnPurgeError::Http(format!("{prefix} invalid URL '{url}': {reason}"))
        }
        HttpError::InvalidScheme { scheme, reason } => {
            CdnPurgeError::Http(format!("{prefix} invalid scheme '{scheme}': {reason}"))
        }
        _ => CdnPurgeError::Http(format!("{prefix} request failed")),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn status(code: u16, body: &str) -> HttpError {
        HttpError::HttpStatus {
            status: http::StatusCode::from_u16(code).unwrap(),
            body_preview: body.to_owned(),
            content_type: None,
        }
    }

    #[test]
    fn identity_status_becomes_auth() {
        let err = map_http_error(status(401, "invalid_client"), Endpoint::Identity);
        assert!(matches!(
            err,
            CdnPurgeError::Auth { status: 401, ref body } if body == "invalid_client"
        ));
    }

    #[test]
    fn purge_status_becomes_purge_http() {
        let err = map_http_error(status(403, "AuthorizationFailed"), Endpoint::Purge);
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.body(), Some("AuthorizationFailed"));
        assert!(matches!(err, CdnPurgeError::PurgeHttp { .. }));
    }

    #[test]
    fn timeouts_are_transport() {
        let err = map_http_error(HttpError::Timeout(Duration::from_secs(5)), Endpoint::Purge);
        assert!(err.is_transport());
        assert!(err.to_string().contains("purge endpoint"));
    }

    #[test]
    fn closed_service_is_transport() {
        let err = map_http_error(HttpError::ServiceClosed, Endpoint::Identity);
        assert!(err.is_transport());
        assert!(err.to_string().contains("token endpoint"));
    }

    #[test]
    fn oversized_body_is_invalid_response() {
        let err = map_http_error(
            HttpError::BodyTooLarge {
                limit: 10,
                actual: 20,
            },
            Endpoint::Identity,
        );
        assert!(matches!(err, CdnPurgeError::InvalidResponse(_)));
    }

    #[test]
    fn invalid_header_value_is_not_echoed() {
        let inner = http::HeaderValue::from_bytes(b"Bearer secret\n").unwrap_err();
        let err = map_http_error(HttpError::InvalidHeaderValue(inner), Endpoint::Purge);
        assert!(matches!(err, CdnPurgeError::Http(_)));
        assert!(!err.to_string().contains("secret"));
    }
}
