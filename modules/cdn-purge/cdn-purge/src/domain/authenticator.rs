use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use cdn_purge_sdk::CdnPurgeError;
use secrecy::ExposeSecret;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::config::PurgeConfig;
use crate::http_error::{Endpoint, map_http_error};

/// Bearer token issued by the identity provider.
///
/// `Debug` never prints the token value.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_in: u64,
}

impl AccessToken {
    #[must_use]
    pub fn new(value: impl Into<String>, expires_in: u64) -> Self {
        Self {
            value: value.into(),
            expires_in,
        }
    }

    /// The raw bearer token.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Lifetime in seconds, as reported at issuance.
    #[must_use]
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    #[must_use]
    pub fn into_value(self) -> String {
        self.value
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Anything that can produce a fresh access token.
///
/// [`Authenticator`] is the network implementation; the token cache and
/// the facade depend on this trait only.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Request a new token. Never consults a cache.
    ///
    /// # Errors
    ///
    /// - `Auth` if the identity provider answers with a non-2xx status
    /// - `Transport` if no response was received
    /// - `InvalidResponse` if a 2xx body is not a usable token
    async fn fetch_token(&self) -> Result<AccessToken, CdnPurgeError>;
}

/// Token endpoint response. `expires_in` arrives as a number or as a
/// decimal string depending on the endpoint version.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<Lifetime>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lifetime {
    Seconds(u64),
    Text(String),
}

impl Lifetime {
    fn seconds(&self) -> Result<u64, CdnPurgeError> {
        match self {
            Self::Seconds(secs) => Ok(*secs),
            Self::Text(text) => text.trim().parse().map_err(|_| {
                CdnPurgeError::InvalidResponse(format!(
                    "token endpoint returned non-numeric expires_in '{text}'"
                ))
            }),
        }
    }
}

/// OAuth2 client-credentials authenticator against the tenant's token
/// endpoint.
#[derive(Clone)]
pub struct Authenticator {
    client: purge_http::HttpClient,
    config: Arc<PurgeConfig>,
}

impl Authenticator {
    #[must_use]
    pub fn new(client: purge_http::HttpClient, config: Arc<PurgeConfig>) -> Self {
        Self { client, config }
    }

    /// Exchange the configured client credentials for an access token.
    ///
    /// A missing `expires_in` is treated as zero (the token is used once
    /// and never cached).
    ///
    /// # Errors
    ///
    /// See [`TokenSource::fetch_token`].
    pub async fn authenticate(&self) -> Result<AccessToken, CdnPurgeError> {
        let secret = Zeroizing::new(self.config.client_secret.expose_secret().to_owned());
        let fields: [(&str, &str); 4] = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", secret.as_str()),
            ("resource", self.config.resource.as_str()),
        ];

        tracing::debug!(tenant = %self.config.tenant_id, "requesting access token");

        let response = self
            .client
            .post(&self.config.token_url())
            .form(fields.as_slice())
            .map_err(|e| map_http_error(e, Endpoint::Identity))?
            .send()
            .await
            .map_err(|e| map_http_error(e, Endpoint::Identity))?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| map_http_error(e, Endpoint::Identity))?;

        if token.access_token.is_empty() {
            return Err(CdnPurgeError::InvalidResponse(
                "token endpoint returned an empty access_token".to_owned(),
            ));
        }

        let expires_in = match &token.expires_in {
            Some(lifetime) => lifetime.seconds()?,
            None => 0,
        };

        tracing::debug!(expires_in, "access token issued");
        Ok(AccessToken::new(token.access_token, expires_in))
    }
}

#[async_trait]
impl TokenSource for Authenticator {
    async fn fetch_token(&self) -> Result<AccessToken, CdnPurgeError> {
        self.authenticate().await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use purge_http::{HttpClientBuilder, HttpClientConfig};
    use secrecy::SecretString;

    fn config(server: &MockServer) -> Arc<PurgeConfig> {
        Arc::new(PurgeConfig {
            client_id: "app-id".into(),
            client_secret: SecretString::from("app-secret".to_owned()),
            tenant_id: "tenant-1".into(),
            login_base_url: server.base_url(),
            ..PurgeConfig::default()
        })
    }

    fn authenticator(server: &MockServer) -> Authenticator {
        let client = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap();
        Authenticator::new(client, config(server))
    }

    #[tokio::test]
    async fn posts_client_credentials_form() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/tenant-1/oauth2/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_includes("grant_type=client_credentials")
                .body_includes("client_id=app-id")
                .body_includes("client_secret=app-secret")
                .body_includes("resource=https%3A%2F%2Fmanagement.azure.com%2F");
            then.status(200)
                .json_body(serde_json::json!({"access_token": "tok-1", "expires_in": 3600}));
        });

        let token = authenticator(&server).authenticate().await.unwrap();

        mock.assert();
        assert_eq!(token.value(), "tok-1");
        assert_eq!(token.expires_in(), 3600);
    }

    #[tokio::test]
    async fn accepts_string_lifetime() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/tenant-1/oauth2/token");
            then.status(200).json_body(serde_json::json!({
                "token_type": "Bearer",
                "expires_in": "3599",
                "access_token": "tok-2"
            }));
        });

        let token = authenticator(&server).fetch_token().await.unwrap();
        assert_eq!(token.expires_in(), 3599);
    }

    #[tokio::test]
    async fn missing_lifetime_is_zero() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/tenant-1/oauth2/token");
            then.status(200)
                .json_body(serde_json::json!({"access_token": "tok-3"}));
        });

        let token = authenticator(&server).authenticate().await.unwrap();
        assert_eq!(token.expires_in(), 0);
    }

    #[tokio::test]
    async fn rejected_credentials_are_auth_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/tenant-1/oauth2/token");
            then.status(401)
                .body(r#"{"error":"invalid_client","error_description":"bad secret"}"#);
        });

        let err = authenticator(&server).authenticate().await.unwrap_err();
        match err {
            CdnPurgeError::Auth { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid_client"));
            }
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_success_is_invalid_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/tenant-1/oauth2/token");
            then.status(200).body("<html>maintenance</html>");
        });

        let err = authenticator(&server).authenticate().await.unwrap_err();
        assert!(matches!(err, CdnPurgeError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn garbage_lifetime_is_invalid_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/tenant-1/oauth2/token");
            then.status(200)
                .json_body(serde_json::json!({"access_token": "tok", "expires_in": "soon"}));
        });

        let err = authenticator(&server).authenticate().await.unwrap_err();
        assert!(matches!(err, CdnPurgeError::InvalidResponse(_)));
    }

    #[test]
    fn debug_redacts_token_value() {
        let token = AccessToken::new("super-secret-token", 60);
        let dbg = format!("{token:?}");
        assert!(!dbg.contains("super-secret-token"));
        assert!(dbg.contains("60"));
    }
}
