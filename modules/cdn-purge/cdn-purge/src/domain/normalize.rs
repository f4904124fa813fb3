//! URL to content-path conversion.

use cdn_purge_sdk::{PURGE_ALL_PATH, PurgeRequest};
use url::Url;

/// Base used to resolve relative inputs; never appears in the output.
const RELATIVE_BASE: &str = "http://localhost/";

/// Strip scheme, credentials, host and port from `raw`, keeping path,
/// query and fragment.
///
/// The path comes out in the WHATWG-normalized form the edge sees on the
/// wire: dot segments are resolved and characters outside the URL code
/// points are percent-encoded (`/a/../b c` becomes `/b%20c`). Relative
/// inputs are resolved against the root, so `a/b` becomes `/a/b`.
/// Returns `None` for input that cannot be parsed as a URL.
#[must_use]
pub fn content_path(raw: &str) -> Option<String> {
    if raw == PURGE_ALL_PATH {
        return Some(raw.to_owned());
    }

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(RELATIVE_BASE).ok()?.join(raw).ok()?
        }
        Err(_) => return None,
    };

    let mut path = url.path().to_owned();
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        path.push('#');
        path.push_str(fragment);
    }
    Some(path)
}

/// Build a purge request body from caller-supplied URLs.
///
/// Empty entries are skipped. Unparseable entries are skipped with a
/// warning; the rest of the batch is still purged.
#[must_use]
pub fn purge_request(urls: &[String]) -> PurgeRequest {
    let content_paths = urls
        .iter()
        .filter(|raw| !raw.is_empty())
        .filter_map(|raw| {
            let path = content_path(raw);
            if path.is_none() {
                tracing::warn!(url = %raw, "skipping URL that cannot be parsed");
            }
            path
        })
        .collect();
    PurgeRequest { content_paths }
}
