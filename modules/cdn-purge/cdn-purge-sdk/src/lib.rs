//! CDN Purge SDK
//!
//! Public contract of the `cdn-purge` module:
//!
//! - [`CdnPurgeClient`] - invalidation facade other subsystems call into
//! - [`ProxyProvider`] - cache-flush adapter interface used by host integrations
//! - [`PurgeRequest`], [`PurgeResponse`] - wire models
//! - [`CdnPurgeError`] - error types
//!
//! ## Usage
//!
//! ```ignore
//! use cdn_purge_sdk::CdnPurgeClient;
//!
//! let status = purger.invalidate_url("https://example.com/news/").await?;
//! if status >= 300 {
//!     tracing::warn!(status, "purge rejected");
//! }
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;
pub mod provider;

pub use api::CdnPurgeClient;
pub use error::CdnPurgeError;
pub use models::{PURGE_ALL_PATH, PurgeRequest, PurgeResponse};
pub use provider::ProxyProvider;
