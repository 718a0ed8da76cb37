//! Stored artifact serving module
//!
//! Serves filtered images back from the image store under the configured
//! URL prefix, with MIME detection and `ETag` revalidation.

use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::IF_NONE_MATCH;
use hyper::{Request, Response};

use crate::config::AppState;
use crate::http::{self, cache, mime};
use crate::logger;
use crate::store::ImageRef;

/// Serve one stored image; anything that is not a valid, existing
/// reference is a 404
pub async fn serve_image(
    req: &Request<Bytes>,
    raw_ref: &str,
    state: &AppState,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let Ok(reference) = ImageRef::parse(raw_ref) else {
        logger::log_debug(&format!("Rejected image reference {raw_ref:?}"));
        return http::build_404_response();
    };

    let store = Arc::clone(&state.store);
    let lookup = reference.clone();
    let loaded = tokio::task::spawn_blocking(move || store.get(&lookup)).await;

    let data = match loaded {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => return http::build_404_response(),
        Ok(Err(e)) => {
            logger::log_error(&format!("Failed to read image {reference}: {e}"));
            return http::build_500_response();
        }
        Err(e) => {
            logger::log_error(&format!("Image read task failed for {reference}: {e}"));
            return http::build_500_response();
        }
    };

    let etag = cache::generate_etag(&data);
    let if_none_match = req
        .headers()
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    let extension = reference.extension();
    let content_type = mime::get_content_type(extension.as_deref());
    http::build_cached_response(Bytes::from(data), content_type, &etag, is_head)
}
