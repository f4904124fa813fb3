//! Domain layer: authentication, token caching and purge dispatch.

pub mod authenticator;
pub mod local_client;
pub mod normalize;
pub mod purge_client;
pub mod service;
pub mod token_cache;

pub use authenticator::{AccessToken, Authenticator, TokenSource};
pub use local_client::CdnPurgeLocalClient;
pub use normalize::{content_path, purge_request};
pub use purge_client::{PurgeClient, SecondaryObserver};
pub use service::Service;
pub use token_cache::{TOKEN_CACHE_KEY, TOKEN_CACHE_TAG, TokenCache};
