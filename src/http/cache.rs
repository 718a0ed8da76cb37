//! HTTP cache control module
//!
//! `ETag` generation and `If-None-Match` handling for stored artifacts.

use sha2::{Digest, Sha256};

/// Strong `ETag` for `content`, e.g. `"9f86d081884c7d65"`
///
/// Stable across processes, so a browser cache survives a restart.
pub fn generate_etag(content: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(content));
    format!("\"{}\"", &digest[..16])
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Accepts a single tag, a comma separated list, weak tags (`W/"..."`) or
/// the `*` wildcard. Returns true when a 304 should be sent.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').map(str::trim).any(|e| {
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}
