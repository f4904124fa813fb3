//! In-process implementation of the SDK invalidation contract.

use std::sync::Arc;

use async_trait::async_trait;
use cdn_purge_sdk::{CdnPurgeClient, CdnPurgeError};

use super::Service;

/// [`CdnPurgeClient`] backed by a local [`Service`].
pub struct CdnPurgeLocalClient {
    svc: Arc<Service>,
}

impl CdnPurgeLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_failure(op: &str, e: CdnPurgeError) -> CdnPurgeError {
    tracing::error!(operation = op, error = %e, "cdn-purge call failed");
    e
}

#[async_trait]
impl CdnPurgeClient for CdnPurgeLocalClient {
    async fn invalidate_all(&self) -> Result<u16, CdnPurgeError> {
        self.svc
            .invalidate_all()
            .await
            .map_err(|e| log_failure("invalidate_all", e))
    }

    async fn invalidate_url(&self, url: &str) -> Result<u16, CdnPurgeError> {
        self.svc
            .invalidate_url(url)
            .await
            .map_err(|e| log_failure("invalidate_url", e))
    }

    async fn invalidate_urls(&self, urls: &[String]) -> Result<u16, CdnPurgeError> {
        self.svc
            .invalidate_urls(urls)
            .await
            .map_err(|e| log_failure("invalidate_urls", e))
    }

    async fn is_configured(&self) -> Result<bool, CdnPurgeError> {
        self.svc
            .is_configured()
            .await
            .map_err(|e| log_failure("is_configured", e))
    }

    fn is_secondary_configured(&self) -> bool {
        self.svc.is_secondary_configured()
    }
}
