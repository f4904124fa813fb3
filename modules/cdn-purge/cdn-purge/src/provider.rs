//! Proxy-cache adapter for hosts that flush caches through a
//! [`ProxyProvider`].

use std::sync::Arc;

use async_trait::async_trait;
use cdn_purge_sdk::{CdnPurgeClient, CdnPurgeError, ProxyProvider};
use tokio::sync::OnceCell;

/// [`ProxyProvider`] that forwards flushes to a [`CdnPurgeClient`].
///
/// Whether the provider is active is decided by the first configuration
/// check that reaches a verdict, and kept for the lifetime of the instance.
/// A check that fails (identity provider unreachable) leaves the gate open
/// for the next flush. Errors are logged at `debug` and otherwise dropped.
pub struct AzureProxyProvider {
    purger: Arc<dyn CdnPurgeClient>,
    active: OnceCell<bool>,
}

impl AzureProxyProvider {
    #[must_use]
    pub fn new(purger: Arc<dyn CdnPurgeClient>) -> Self {
        Self {
            purger,
            active: OnceCell::new(),
        }
    }

    /// Whether purging is configured. The first verdict is kept; a failed
    /// check counts as inactive for this call only.
    pub async fn is_active(&self) -> bool {
        let verdict = self
            .active
            .get_or_try_init(|| async {
                let active = self.purger.is_configured().await?;
                tracing::debug!(active, "azure proxy provider gate evaluated");
                Ok::<_, CdnPurgeError>(active)
            })
            .await;
        match verdict {
            Ok(active) => *active,
            Err(e) => {
                tracing::debug!(error = %e, "configuration check failed; retrying on next flush");
                false
            }
        }
    }

    fn report(op: &str, result: Result<u16, CdnPurgeError>) {
        match result {
            Ok(status) if status < 300 => tracing::debug!(operation = op, status, "flush done"),
            Ok(status) => tracing::debug!(operation = op, status, "flush rejected"),
            Err(e) => tracing::debug!(operation = op, error = %e, "flush failed"),
        }
    }
}

#[async_trait]
impl ProxyProvider for AzureProxyProvider {
    fn set_proxy_endpoints(&self, endpoints: &[String]) {
        tracing::trace!(count = endpoints.len(), "ignoring proxy endpoints");
    }

    async fn flush_cache_for_url(&self, url: &str) {
        if !self.is_active().await || url.is_empty() {
            return;
        }
        Self::report("flush_cache_for_url", self.purger.invalidate_url(url).await);
    }

    async fn flush_cache_for_urls(&self, urls: &[String]) {
        if !self.is_active().await || urls.is_empty() {
            return;
        }
        Self::report("flush_cache_for_urls", self.purger.invalidate_urls(urls).await);
    }

    async fn flush_all_urls(&self) {
        if !self.is_active().await {
            return;
        }
        Self::report("flush_all_urls", self.purger.invalidate_all().await);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingPurger {
        configured: bool,
        fail: bool,
        unreachable_checks: usize,
        checks: AtomicUsize,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingPurger {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) -> Result<u16, CdnPurgeError> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                Err(CdnPurgeError::Transport("down".to_owned()))
            } else {
                Ok(202)
            }
        }
    }

    #[async_trait]
    impl CdnPurgeClient for RecordingPurger {
        async fn invalidate_all(&self) -> Result<u16, CdnPurgeError> {
            self.record("all".to_owned())
        }

        async fn invalidate_url(&self, url: &str) -> Result<u16, CdnPurgeError> {
            self.record(format!("url:{url}"))
        }

        async fn invalidate_urls(&self, urls: &[String]) -> Result<u16, CdnPurgeError> {
            self.record(format!("urls:{}", urls.join(",")))
        }

        async fn is_configured(&self) -> Result<bool, CdnPurgeError> {
            let seen = self.checks.fetch_add(1, Ordering::SeqCst);
            if seen < self.unreachable_checks {
                return Err(CdnPurgeError::Transport("timed out".to_owned()));
            }
            Ok(self.configured)
        }

        fn is_secondary_configured(&self) -> bool {
            false
        }
    }

    fn provider(purger: &Arc<RecordingPurger>) -> AzureProxyProvider {
        AzureProxyProvider::new(purger.clone())
    }

    #[tokio::test]
    async fn inactive_provider_does_nothing() {
        let purger = Arc::new(RecordingPurger::default());
        let p = provider(&purger);

        p.flush_cache_for_url("https://example.com/a").await;
        p.flush_cache_for_urls(&["https://example.com/b".to_owned()]).await;
        p.flush_all_urls().await;

        assert!(purger.calls().is_empty());
        assert_eq!(purger.checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn active_provider_forwards_flushes() {
        let purger = Arc::new(RecordingPurger {
            configured: true,
            ..RecordingPurger::default()
        });
        let p = provider(&purger);

        p.flush_cache_for_url("https://example.com/a").await;
        p.flush_cache_for_urls(&["/b".to_owned(), "/c".to_owned()]).await;
        p.flush_all_urls().await;

        assert_eq!(
            purger.calls(),
            vec![
                "url:https://example.com/a".to_owned(),
                "urls:/b,/c".to_owned(),
                "all".to_owned(),
            ]
        );
        assert_eq!(purger.checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_input_is_a_no_op() {
        let purger = Arc::new(RecordingPurger {
            configured: true,
            ..RecordingPurger::default()
        });
        let p = provider(&purger);

        p.flush_cache_for_url("").await;
        p.flush_cache_for_urls(&[]).await;

        assert!(purger.calls().is_empty());
    }

    #[tokio::test]
    async fn errors_are_swallowed() {
        let purger = Arc::new(RecordingPurger {
            configured: true,
            fail: true,
            ..RecordingPurger::default()
        });
        let p = provider(&purger);

        p.flush_all_urls().await;
        assert_eq!(purger.calls(), vec!["all".to_owned()]);
    }

    #[tokio::test]
    async fn failed_check_is_retried_on_next_flush() {
        let purger = Arc::new(RecordingPurger {
            configured: true,
            unreachable_checks: 1,
            ..RecordingPurger::default()
        });
        let p = provider(&purger);

        p.flush_all_urls().await;
        assert!(purger.calls().is_empty());

        p.flush_all_urls().await;
        p.flush_all_urls().await;
        assert_eq!(purger.calls(), vec!["all".to_owned(), "all".to_owned()]);
        assert_eq!(purger.checks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn negative_verdict_is_kept() {
        let purger = Arc::new(RecordingPurger::default());
        let p = provider(&purger);

        p.flush_all_urls().await;
        p.flush_all_urls().await;
        assert_eq!(purger.checks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn proxy_endpoints_are_ignored() {
        let purger = Arc::new(RecordingPurger::default());
        provider(&purger).set_proxy_endpoints(&["varnish:6081".to_owned()]);
        assert_eq!(purger.checks.load(Ordering::SeqCst), 0);
    }
}
