//! Cache-flush adapter interface.

use async_trait::async_trait;

/// Capability set a host's proxy-cache manager calls when pages change.
///
/// Implementations gate every flush on their own "is active" check and
/// never surface errors: a failed or skipped flush is a silent no-op.
#[async_trait]
pub trait ProxyProvider: Send + Sync {
    /// Accept the host's configured proxy endpoints. Providers that know
    /// their endpoints from their own configuration ignore this.
    fn set_proxy_endpoints(&self, endpoints: &[String]);

    /// Flush a single URL. Empty input is a no-op.
    async fn flush_cache_for_url(&self, url: &str);

    /// Flush a list of URLs. Empty input is a no-op.
    async fn flush_cache_for_urls(&self, urls: &[String]);

    /// Flush everything.
    async fn flush_all_urls(&self);
}
