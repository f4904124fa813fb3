use crate::client::{BufferedService, map_buffer_error};
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::HttpResponse;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{Method, Request, Uri};
use http_body_util::Full;
use serde::Serialize;
use tower::{Service, ServiceExt};

/// Encoded body plus the content type it implies.
struct Payload {
    content_type: &'static str,
    bytes: Bytes,
}

/// A POST request being assembled.
///
/// Created by [`HttpClient::post`](crate::HttpClient::post). A bad header is
/// remembered and reported by the next fallible call (`json`, `form` or
/// `send`), so header calls can be chained without `?`.
#[must_use = "nothing is sent until .send() is awaited"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    transport_security: TransportSecurity,
    url: String,
    headers: Vec<(HeaderName, HeaderValue)>,
    payload: Option<Payload>,
    deferred: Option<HttpError>,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        url: String,
        transport_security: TransportSecurity,
    ) -> Self {
        Self {
            service,
            max_body_size,
            transport_security,
            url,
            headers: Vec::new(),
            payload: None,
            deferred: None,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.deferred.is_none() {
            match parse_header(name, value) {
                Ok(pair) => self.headers.push(pair),
                Err(e) => self.deferred = Some(e),
            }
        }
        self
    }

    /// Serialize `body` as JSON. `Content-Type: application/json` is added
    /// unless a content type header was set explicitly.
    ///
    /// # Errors
    ///
    /// `Json` on serialization failure, or a header error recorded earlier.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, HttpError> {
        let bytes = serde_json::to_vec(body)?;
        self.with_payload("application/json", bytes.into())
    }

    /// Encode `fields` as `application/x-www-form-urlencoded`.
    ///
    /// # Errors
    ///
    /// `FormEncode` on encoding failure, or a header error recorded earlier.
    pub fn form(self, fields: &[(&str, &str)]) -> Result<Self, HttpError> {
        let encoded = serde_urlencoded::to_string(fields)?;
        self.with_payload("application/x-www-form-urlencoded", encoded.into())
    }

    fn with_payload(mut self, content_type: &'static str, bytes: Bytes) -> Result<Self, HttpError> {
        if let Some(e) = self.deferred.take() {
            return Err(e);
        }
        self.payload = Some(Payload {
            content_type,
            bytes,
        });
        Ok(self)
    }

    /// Send the request. Any HTTP status, 4xx and 5xx included, is `Ok`.
    ///
    /// # Errors
    ///
    /// - a header error recorded earlier
    /// - `InvalidUri` / `InvalidScheme` if the URL is unusable under the
    ///   configured [`TransportSecurity`]
    /// - `Transport`, `Tls`, `Timeout` or `ServiceClosed` when no response
    ///   arrives
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.deferred.take() {
            return Err(e);
        }
        let uri = check_url(&self.url, self.transport_security)?;

        let mut request = Request::builder().method(Method::POST).uri(uri);
        let explicit_type = self.headers.iter().any(|(name, _)| name == CONTENT_TYPE);
        for (name, value) in self.headers {
            request = request.header(name, value);
        }
        let body = match self.payload {
            Some(payload) => {
                if !explicit_type {
                    request = request.header(CONTENT_TYPE, payload.content_type);
                }
                payload.bytes
            }
            None => Bytes::new(),
        };
        let request = request.body(Full::new(body))?;

        let inner = self
            .service
            .ready()
            .await
            .map_err(map_buffer_error)?
            .call(request)
            .await
            .map_err(map_buffer_error)?;

        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
        })
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), HttpError> {
    Ok((HeaderName::try_from(name)?, HeaderValue::try_from(value)?))
}

/// Parse `url` and check its scheme against `transport`.
fn check_url(url: &str, transport: TransportSecurity) -> Result<Uri, HttpError> {
    let invalid = |kind, reason: String| HttpError::InvalidUri {
        url: url.to_owned(),
        kind,
        reason,
    };

    let uri: Uri = url
        .parse()
        .map_err(|e: http::uri::InvalidUri| invalid(InvalidUriKind::ParseError, e.to_string()))?;
    if uri.authority().is_none() {
        return Err(invalid(InvalidUriKind::MissingAuthority, "no host".to_owned()));
    }

    let allowed = match uri.scheme_str() {
        None => return Err(invalid(InvalidUriKind::MissingScheme, "no scheme".to_owned())),
        Some("https") => true,
        Some("http") => transport == TransportSecurity::AllowInsecureHttp,
        Some(_) => false,
    };
    if allowed {
        Ok(uri)
    } else {
        Err(HttpError::InvalidScheme {
            scheme: uri.scheme_str().unwrap_or_default().to_owned(),
            reason: match transport {
                TransportSecurity::TlsOnly => "only https is allowed".to_owned(),
                TransportSecurity::AllowInsecureHttp => "only http and https are supported".to_owned(),
            },
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::check_url;
    use crate::error::{HttpError, InvalidUriKind};
    use crate::{HttpClient, HttpClientBuilder, TransportSecurity};
    use httpmock::prelude::*;

    fn test_client() -> HttpClient {
        HttpClientBuilder::new()
            .transport(TransportSecurity::AllowInsecureHttp)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn relative_url_is_rejected() {
        let err = test_client().post("/purge").send().await.unwrap_err();
        assert!(matches!(
            err,
            HttpError::InvalidUri {
                kind: InvalidUriKind::MissingAuthority,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unsupported_scheme_is_rejected() {
        let err = test_client()
            .post("ftp://example.com/purge")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidScheme { ref scheme, .. } if scheme == "ftp"));
    }

    #[test]
    fn plain_http_needs_insecure_transport() {
        let err = check_url("http://example.com/purge", TransportSecurity::TlsOnly).unwrap_err();
        assert!(matches!(err, HttpError::InvalidScheme { ref scheme, .. } if scheme == "http"));
        assert!(check_url("http://example.com/purge", TransportSecurity::AllowInsecureHttp).is_ok());
        assert!(check_url("https://example.com/purge", TransportSecurity::TlsOnly).is_ok());
    }

    #[tokio::test]
    async fn invalid_header_value_is_deferred_to_json() {
        let result = test_client()
            .post("https://example.com")
            .header("authorization", "Bearer \n")
            .json(&serde_json::json!({}));
        assert!(matches!(result, Err(HttpError::InvalidHeaderValue(_))));
    }

    #[tokio::test]
    async fn invalid_header_name_is_deferred_to_send() {
        let err = test_client()
            .post("https://example.com")
            .header("bad header", "v")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidHeaderName(_)));
    }

    #[tokio::test]
    async fn caller_content_type_wins() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/purge")
                .header("content-type", "application/merge-patch+json");
            then.status(200);
        });

        test_client()
            .post(&format!("{}/purge", server.base_url()))
            .header("content-type", "application/merge-patch+json")
            .json(&serde_json::json!({"a": 1}))
            .unwrap()
            .send()
            .await
            .unwrap();

        m.assert();
    }

    #[tokio::test]
    async fn headers_are_forwarded() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/purge")
                .header("authorization", "Bearer tok")
                .header("accept", "application/json");
            then.status(200);
        });

        test_client()
            .post(&format!("{}/purge", server.base_url()))
            .header("authorization", "Bearer tok")
            .header("accept", "application/json")
            .send()
            .await
            .unwrap();

        m.assert();
    }
}
