use std::fmt;
use std::sync::Arc;

use cdn_purge_sdk::{CdnPurgeError, PurgeRequest, PurgeResponse};

use super::normalize::purge_request;
use super::token_cache::TokenCache;
use crate::config::PurgeConfig;
use crate::http_error::{Endpoint, map_http_error};

/// Callback invoked with every absorbed secondary-leg failure.
pub type SecondaryObserver = Arc<dyn Fn(&CdnPurgeError) + Send + Sync>;

/// Sends purge requests to the primary CDN endpoint and, when configured,
/// to the Front Door instance.
///
/// The primary response decides the outcome. A secondary failure is
/// logged, reported to the observer and otherwise ignored.
#[derive(Clone)]
pub struct PurgeClient {
    client: purge_http::HttpClient,
    config: Arc<PurgeConfig>,
    tokens: TokenCache,
    secondary_observer: Option<SecondaryObserver>,
}

impl fmt::Debug for PurgeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PurgeClient")
            .field("cdn_endpoint", &self.config.cdn_endpoint)
            .field("front_door", &self.config.front_door)
            .field("secondary_observer", &self.secondary_observer.is_some())
            .finish_non_exhaustive()
    }
}

impl PurgeClient {
    #[must_use]
    pub fn new(client: purge_http::HttpClient, config: Arc<PurgeConfig>, tokens: TokenCache) -> Self {
        Self {
            client,
            config,
            tokens,
            secondary_observer: None,
        }
    }

    #[must_use]
    pub fn with_secondary_observer(mut self, observer: SecondaryObserver) -> Self {
        self.secondary_observer = Some(observer);
        self
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// Purge `urls` (already-normalized or absolute; empties are skipped).
    ///
    /// When authentication is rejected the request is still sent with an
    /// empty bearer token and the purge endpoint's answer is returned.
    ///
    /// # Errors
    ///
    /// - `PurgeHttp` if the primary endpoint answers with a non-2xx status
    /// - `Transport` if the token or primary purge endpoint is unreachable
    /// - `InvalidResponse` / `Http` for unusable token responses or request
    ///   construction failures
    pub async fn invalidate(&self, urls: &[String]) -> Result<PurgeResponse, CdnPurgeError> {
        let token = self.tokens.get_or_authenticate().await?.unwrap_or_default();
        let request = purge_request(urls);

        tracing::debug!(
            paths = request.content_paths.len(),
            endpoint = %self.config.cdn_endpoint,
            "purging CDN endpoint"
        );
        let response = self
            .post_purge(&self.config.cdn_purge_url(), &token, &request)
            .await?;

        if let Some(url) = self.config.front_door_purge_url() {
            self.purge_secondary(&url, &token, &request).await;
        }

        Ok(response)
    }

    async fn purge_secondary(&self, url: &str, token: &str, request: &PurgeRequest) {
        tracing::debug!(front_door = %self.config.front_door, "purging Front Door");
        if let Err(err) = self.post_purge(url, token, request).await {
            tracing::warn!(
                front_door = %self.config.front_door,
                error = %err,
                "Front Door purge failed; primary result kept"
            );
            if let Some(observer) = &self.secondary_observer {
                observer(&err);
            }
        }
    }

    async fn post_purge(
        &self,
        url: &str,
        token: &str,
        request: &PurgeRequest,
    ) -> Result<PurgeResponse, CdnPurgeError> {
        let response = self
            .client
            .post(url)
            .header("authorization", &format!("Bearer {token}"))
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .json(request)
            .map_err(|e| map_http_error(e, Endpoint::Purge))?
            .send()
            .await
            .map_err(|e| map_http_error(e, Endpoint::Purge))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            // The status is the outcome; the body is only for reporting.
            return Err(CdnPurgeError::PurgeHttp {
                status,
                body: response.body_preview().await,
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| map_http_error(e, Endpoint::Purge))?;
        let response = PurgeResponse {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        };
        tracing::info!(status, url, "purge accepted");
        Ok(response)
    }
}
