pub mod cache_store;

pub use cache_store::{CacheStore, InMemoryCacheStore};
