//! Public API trait for CDN invalidation.

use async_trait::async_trait;

use crate::error::CdnPurgeError;

/// Invalidation facade.
///
/// Every `invalidate_*` call resolves to the bare HTTP status code of the
/// primary purge request. A well-formed error response from the purge
/// endpoint (e.g. `403`) is returned as `Ok(403)`, not as an error.
///
/// ```ignore
/// let purger: Arc<dyn CdnPurgeClient> = Arc::new(service);
///
/// purger.invalidate_all().await?;
/// purger.invalidate_url("https://example.com/page").await?;
/// purger.invalidate_urls(&urls).await?;
/// ```
#[async_trait]
pub trait CdnPurgeClient: Send + Sync {
    /// Purge everything on the endpoint (content path `/*`).
    ///
    /// # Errors
    ///
    /// Same as [`invalidate_urls`](Self::invalidate_urls).
    async fn invalidate_all(&self) -> Result<u16, CdnPurgeError>;

    /// Purge a single URL.
    ///
    /// # Errors
    ///
    /// Same as [`invalidate_urls`](Self::invalidate_urls).
    async fn invalidate_url(&self, url: &str) -> Result<u16, CdnPurgeError>;

    /// Purge a list of URLs. Empty entries are skipped; scheme, host, port
    /// and credentials are stripped before the request is built.
    ///
    /// # Errors
    ///
    /// - `Transport` if the purge endpoint could not be reached
    /// - `InvalidResponse` / `Http` for unusable token responses or request
    ///   construction failures
    ///
    /// Non-2xx purge responses are NOT errors; their status is returned.
    async fn invalidate_urls(&self, urls: &[String]) -> Result<u16, CdnPurgeError>;

    /// `Ok(true)` when the required CDN identifiers are set and a live
    /// authentication succeeds. Always performs a token request.
    ///
    /// Incomplete identifiers and rejected credentials are `Ok(false)`.
    ///
    /// # Errors
    ///
    /// - `Transport` if the identity provider could not be reached
    /// - `InvalidResponse` / `Http` for unusable token responses or request
    ///   construction failures
    async fn is_configured(&self) -> Result<bool, CdnPurgeError>;

    /// `true` when a secondary (Front Door) endpoint name is configured.
    fn is_secondary_configured(&self) -> bool;
}
