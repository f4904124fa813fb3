use std::time::Duration;

/// User agent sent when the config does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("azure-purge/", env!("CARGO_PKG_VERSION"));

/// Which URL schemes the client accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    /// `https` only.
    #[default]
    TlsOnly,
    /// `http` is accepted as well. Meant for local mock servers.
    AllowInsecureHttp,
}

/// Settings for [`HttpClientBuilder`](crate::HttpClientBuilder).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Applied to each request end to end. Default 30s.
    pub request_timeout: Duration,
    /// Responses larger than this fail with `BodyTooLarge`. Default 1 MiB.
    pub max_body_size: usize,
    pub user_agent: String,
    pub transport: TransportSecurity,
    /// Requests that may queue in front of the shared worker. Default 64.
    pub buffer_capacity: usize,
    /// Default 30s; `None` keeps idle connections forever.
    pub pool_idle_timeout: Option<Duration>,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: 1 << 20,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            buffer_capacity: 64,
            pool_idle_timeout: Some(Duration::from_secs(30)),
            pool_max_idle_per_host: 4,
        }
    }
}

impl HttpClientConfig {
    /// Plain HTTP with shorter timeouts, for tests against `httpmock`.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            pool_idle_timeout: Some(Duration::from_secs(10)),
            transport: TransportSecurity::AllowInsecureHttp,
            ..Self::default()
        }
    }
}
