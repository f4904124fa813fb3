use std::sync::Arc;
use std::time::Duration;

use cdn_purge_sdk::CdnPurgeError;

use super::authenticator::{AccessToken, TokenSource};
use crate::infra::cache_store::CacheStore;

/// Key under which the bearer token is stored.
pub const TOKEN_CACHE_KEY: &str = "azure-purge-access-token";
/// Tag attached to every entry this module writes.
pub const TOKEN_CACHE_TAG: &str = "azure";

/// Read-through cache in front of a [`TokenSource`].
///
/// Entries live exactly `expires_in` seconds. Concurrent misses may both
/// authenticate; the last write wins.
#[derive(Clone)]
pub struct TokenCache {
    store: Arc<dyn CacheStore>,
    source: Arc<dyn TokenSource>,
}

impl TokenCache {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, source: Arc<dyn TokenSource>) -> Self {
        Self { store, source }
    }

    /// Return the cached bearer token, authenticating on a miss.
    ///
    /// A rejected authentication yields `Ok(None)` and is not cached, so
    /// the next call tries again.
    ///
    /// # Errors
    ///
    /// `Transport` and `InvalidResponse` errors from the token source are
    /// propagated.
    pub async fn get_or_authenticate(&self) -> Result<Option<String>, CdnPurgeError> {
        if let Some(token) = self.store.get(TOKEN_CACHE_KEY) {
            tracing::trace!("access token served from cache");
            return Ok(Some(token));
        }

        match self.refresh().await {
            Ok(token) => Ok(Some(token.into_value())),
            Err(CdnPurgeError::Auth { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Authenticate unconditionally and store the result.
    ///
    /// # Errors
    ///
    /// Every token source error is propagated, including `Auth`.
    pub async fn refresh(&self) -> Result<AccessToken, CdnPurgeError> {
        let token = self.source.fetch_token().await?;
        self.store.set(
            TOKEN_CACHE_KEY,
            token.value().to_owned(),
            &[TOKEN_CACHE_TAG],
            Duration::from_secs(token.expires_in()),
        );
        Ok(token)
    }

    /// Drop the cached token (flushes the module's cache tag).
    pub fn clear(&self) {
        self.store.flush_by_tag(TOKEN_CACHE_TAG);
    }
}
