//! CDN Purge Module
//!
//! Invalidates cached content on an Azure CDN endpoint and, when
//! configured, on an Azure Front Door instance.
//!
//! - [`config::PurgeConfig`] - credentials and endpoint identifiers
//! - [`domain::Authenticator`] - OAuth2 client-credentials token source
//! - [`domain::TokenCache`] - read-through token cache over a [`infra::CacheStore`]
//! - [`domain::PurgeClient`] - primary / secondary purge dispatch
//! - [`domain::Service`] - invalidation facade, exposed through the SDK
//!   as [`domain::CdnPurgeLocalClient`]
//! - [`provider::AzureProxyProvider`] - proxy-cache adapter
//!
//! ```ignore
//! let config = Arc::new(PurgeConfig::from_env());
//! let svc = Arc::new(Service::new(config, Arc::new(InMemoryCacheStore::new()))?);
//! let purger: Arc<dyn CdnPurgeClient> = Arc::new(CdnPurgeLocalClient::new(svc));
//! let provider = AzureProxyProvider::new(purger);
//! provider.flush_all_urls().await;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
mod http_error;
pub mod infra;
pub mod provider;

pub use config::PurgeConfig;
pub use domain::{CdnPurgeLocalClient, Service};
pub use infra::{CacheStore, InMemoryCacheStore};
pub use provider::AzureProxyProvider;
