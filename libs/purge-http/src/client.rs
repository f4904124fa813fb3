use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::response::ResponseBody;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;
use tower::buffer::Buffer;

/// Future type of the inner (boxed) service
pub type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

/// The buffered service shared by all clones of an [`HttpClient`]
pub type BufferedService = Buffer<Request<Full<Bytes>>, ServiceFuture>;

/// HTTP client over a tower service stack (timeout, user agent,
/// decompression).
///
/// `HttpClient` is `Clone + Send + Sync`; cloning only clones the buffer
/// handle, so components can hold their own copy.
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: BufferedService,
    pub(crate) max_body_size: usize,
    pub(crate) transport_security: TransportSecurity,
}

impl HttpClient {
    /// Start a POST request.
    ///
    /// The URL must be absolute; a relative URL fails with
    /// [`HttpError::InvalidUri`] once the request is sent.
    pub fn post(&self, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            url.to_owned(),
            self.transport_security,
        )
    }
}

/// Unwrap an error coming back through the buffer. Inner service errors
/// are already `HttpError`; anything else comes from the buffer itself.
pub fn map_buffer_error(err: tower::BoxError) -> HttpError {
    err.downcast::<HttpError>().map_or_else(
        |other| {
            tracing::error!(error = %other, "HTTP client worker stopped");
            HttpError::ServiceClosed
        },
        |http_err| *http_err,
    )
}
