use crate::client::{BufferedService, HttpClient};
use crate::config::{HttpClientConfig, TransportSecurity};
use crate::error::HttpError;
use crate::response::ResponseBody;
use crate::tls;
use bytes::Bytes;
use http::Response;
use http::header::{HeaderValue, USER_AGENT};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;
use tower_http::set_header::SetRequestHeaderLayer;

type PooledClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Assembles an [`HttpClient`] from an [`HttpClientConfig`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn transport(mut self, transport: TransportSecurity) -> Self {
        self.config.transport = transport;
        self
    }

    /// Build the client. Must run inside a tokio runtime, since the shared
    /// request buffer spawns its worker here.
    ///
    /// # Errors
    ///
    /// `Tls` if the crypto provider cannot be set up, `InvalidHeaderValue`
    /// if the configured user agent is not a valid header value.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let HttpClientConfig {
            request_timeout,
            max_body_size,
            user_agent,
            transport,
            buffer_capacity,
            pool_idle_timeout,
            pool_max_idle_per_host,
        } = self.config;

        if transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!("plain HTTP allowed; only use this against local mock servers");
        }

        let pooled = pooled_client(
            tls::build_https_connector(transport)?,
            pool_idle_timeout,
            pool_max_idle_per_host,
        );

        let user_agent = HeaderValue::from_str(&user_agent)?;

        // Outer to inner: timeout, user agent, decompression, pooled client.
        let stack = ServiceBuilder::new()
            .layer(TimeoutLayer::new(request_timeout))
            .layer(SetRequestHeaderLayer::if_not_present(USER_AGENT, user_agent))
            .layer(DecompressionLayer::new())
            .service(pooled)
            .map_response(box_body)
            .map_err(move |e: tower::BoxError| map_tower_error(e, request_timeout))
            .boxed_clone();

        let service: BufferedService = Buffer::new(stack, buffer_capacity.max(1));
        Ok(HttpClient {
            service,
            max_body_size,
            transport_security: transport,
        })
    }
}

fn pooled_client(
    connector: HttpsConnector<HttpConnector>,
    idle_timeout: Option<Duration>,
    max_idle_per_host: usize,
) -> PooledClient {
    let mut builder = Client::builder(TokioExecutor::new());
    // the idle timeout is only enforced with a pool timer
    builder
        .pool_timer(TokioTimer::new())
        .pool_max_idle_per_host(max_idle_per_host)
        .pool_idle_timeout(idle_timeout);
    builder.build(connector)
}

/// Translate an error coming out of the tower stack.
fn map_tower_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(other) => HttpError::Transport(other),
    }
}

fn box_body<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    response.map(|body| body.map_err(Into::into).boxed())
}
