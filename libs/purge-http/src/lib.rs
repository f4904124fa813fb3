#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Outbound HTTP client for the Azure purge workspace
//!
//! A hyper-based client with:
//! - TLS via rustls (HTTPS only by default)
//! - Connection pooling
//! - A per-request timeout
//! - User-Agent header injection
//! - Transparent response decompression (gzip, brotli, deflate)
//!
//! There is no retry layer: every request is a single attempt and its outcome
//! is final.
//!
//! # Status handling
//!
//! `send()` resolves to `Ok(HttpResponse)` for **every** HTTP status. Only
//! transport failures (connect, DNS, TLS, timeout) are errors at that point.
//! A non-2xx status becomes [`HttpError::HttpStatus`] only when the body
//! is read through [`HttpResponse::json`].
//!
//! # Example
//!
//! ```ignore
//! use purge_http::{HttpClientBuilder, HttpClientConfig};
//!
//! let client = HttpClientBuilder::with_config(HttpClientConfig::default()).build()?;
//!
//! let resp = client
//!     .post("https://management.azure.com/...")
//!     .header("authorization", "Bearer token")
//!     .json(&body)?
//!     .send()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod request;
mod response;
mod tls;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{DEFAULT_USER_AGENT, HttpClientConfig, TransportSecurity};
pub use error::{HttpError, InvalidUriKind};
pub use request::RequestBuilder;
pub use response::{ERROR_BODY_PREVIEW_LIMIT, HttpResponse, ResponseBody};
