use std::sync::Arc;

use cdn_purge_sdk::{CdnPurgeError, PURGE_ALL_PATH};

use super::authenticator::{AccessToken, Authenticator, TokenSource};
use super::purge_client::{PurgeClient, SecondaryObserver};
use super::token_cache::TokenCache;
use crate::config::PurgeConfig;
use crate::http_error::{Endpoint, map_http_error};
use crate::infra::cache_store::CacheStore;

/// Invalidation facade over the token cache and the purge client.
pub struct Service {
    config: Arc<PurgeConfig>,
    source: Arc<dyn TokenSource>,
    purge: PurgeClient,
}

impl Service {
    /// Wire the network authenticator and purge client from `config`.
    ///
    /// # Errors
    ///
    /// Returns `Http` / `Transport` if the HTTP client cannot be built
    /// (TLS provider initialization).
    pub fn new(config: Arc<PurgeConfig>, store: Arc<dyn CacheStore>) -> Result<Self, CdnPurgeError> {
        let client = purge_http::HttpClientBuilder::with_config(config.http.clone())
            .build()
            .map_err(|e| map_http_error(e, Endpoint::Purge))?;
        let source = Arc::new(Authenticator::new(client.clone(), config.clone()));
        Ok(Self::with_token_source(config, client, source, store))
    }

    /// Wire the service around an arbitrary token source.
    #[must_use]
    pub fn with_token_source(
        config: Arc<PurgeConfig>,
        client: purge_http::HttpClient,
        source: Arc<dyn TokenSource>,
        store: Arc<dyn CacheStore>,
    ) -> Self {
        let tokens = TokenCache::new(store, source.clone());
        let purge = PurgeClient::new(client, config.clone(), tokens);
        Self {
            config,
            source,
            purge,
        }
    }

    #[must_use]
    pub fn with_secondary_observer(mut self, observer: SecondaryObserver) -> Self {
        self.purge = self.purge.with_secondary_observer(observer);
        self
    }

    #[must_use]
    pub fn config(&self) -> &PurgeConfig {
        &self.config
    }

    /// The underlying purge client, for callers that need the raw response.
    #[must_use]
    pub fn purge_client(&self) -> &PurgeClient {
        &self.purge
    }

    /// Authenticate now and seed the token cache with the result.
    ///
    /// # Errors
    ///
    /// Every authentication failure is propagated, including `Auth`.
    pub async fn authenticate(&self) -> Result<AccessToken, CdnPurgeError> {
        self.purge.tokens().refresh().await
    }

    /// Purge everything on the endpoint.
    ///
    /// # Errors
    ///
    /// See [`invalidate_urls`](Self::invalidate_urls).
    pub async fn invalidate_all(&self) -> Result<u16, CdnPurgeError> {
        self.invalidate_urls(&[PURGE_ALL_PATH.to_owned()]).await
    }

    /// Purge a single URL.
    ///
    /// # Errors
    ///
    /// See [`invalidate_urls`](Self::invalidate_urls).
    pub async fn invalidate_url(&self, url: &str) -> Result<u16, CdnPurgeError> {
        self.invalidate_urls(&[url.to_owned()]).await
    }

    /// Purge `urls` and return the primary endpoint's status code.
    ///
    /// # Errors
    ///
    /// Everything except an error status from the purge endpoint, which is
    /// returned as `Ok(status)`.
    pub async fn invalidate_urls(&self, urls: &[String]) -> Result<u16, CdnPurgeError> {
        match self.purge.invalidate(urls).await {
            Ok(response) => Ok(response.status),
            Err(CdnPurgeError::PurgeHttp { status, body }) => {
                tracing::debug!(status, body = %body, "purge endpoint rejected the request");
                Ok(status)
            }
            Err(e) => Err(e),
        }
    }

    /// `Ok(true)` when the CDN identifiers are complete and a live
    /// authentication succeeds. Never touches the token cache.
    ///
    /// Incomplete identifiers (checked without any request) and rejected
    /// credentials are `Ok(false)`.
    ///
    /// # Errors
    ///
    /// `Transport`, `InvalidResponse` and `Http` from the token request.
    pub async fn is_configured(&self) -> Result<bool, CdnPurgeError> {
        if !self.check_identifiers() {
            return Ok(false);
        }
        configured_from(self.source.fetch_token().await.map(|_| ()))
    }

    /// Like [`is_configured`](Self::is_configured), but a cached token
    /// counts as a successful authentication and a fresh one is cached.
    ///
    /// # Errors
    ///
    /// Same as [`is_configured`](Self::is_configured).
    pub async fn is_configured_cached(&self) -> Result<bool, CdnPurgeError> {
        if !self.check_identifiers() {
            return Ok(false);
        }
        // The cache reports a rejection as a missing token.
        match self.purge.tokens().get_or_authenticate().await {
            Ok(Some(_)) => Ok(true),
            Ok(None) => {
                tracing::debug!("credentials rejected during configuration check");
                Ok(false)
            }
            Err(e) => configured_from(Err(e)),
        }
    }

    #[must_use]
    pub fn is_secondary_configured(&self) -> bool {
        self.config.is_front_door_configured()
    }

    fn check_identifiers(&self) -> bool {
        if !self.config.is_complete() {
            tracing::debug!("CDN identifiers incomplete; purging disabled");
            return false;
        }
        if !self.config.has_credentials() {
            tracing::debug!("client credentials incomplete; authentication will likely fail");
        }
        true
    }
}

fn configured_from(outcome: Result<(), CdnPurgeError>) -> Result<bool, CdnPurgeError> {
    match outcome {
        Ok(()) => Ok(true),
        Err(CdnPurgeError::Auth { status, .. }) => {
            tracing::debug!(status, "credentials rejected during configuration check");
            Ok(false)
        }
        Err(e) => {
            tracing::warn!(error = %e, "configuration check could not reach a verdict");
            Err(e)
        }
    }
}
