//! TLS setup for the HTTP client.

use crate::config::TransportSecurity;
use crate::error::HttpError;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use std::sync::Arc;

/// Get the crypto provider for TLS connections.
///
/// Uses the process-wide default provider when one is installed, otherwise
/// an aws-lc-rs provider that is not installed globally.
pub fn get_crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

/// Build the HTTPS connector with Mozilla (webpki) roots.
///
/// ALPN advertises both h2 and http/1.1.
///
/// # Errors
///
/// Returns `HttpError::Tls` if the crypto provider does not support the
/// default protocol versions.
pub fn build_https_connector(
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let builder = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(get_crypto_provider())
        .map_err(|e| HttpError::Tls(Box::new(e)))?;

    let connector = if transport == TransportSecurity::AllowInsecureHttp {
        builder.https_or_http().enable_all_versions().build()
    } else {
        builder.https_only().enable_all_versions().build()
    };
    Ok(connector)
}
