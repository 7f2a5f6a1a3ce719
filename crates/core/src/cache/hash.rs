//! Cache entry key generation.

use sha2::{Digest, Sha256};

/// Compute the key identifying a request within a cache store.
///
/// The method is uppercased and the fragment stripped so `get` and `GET`,
/// or `/page` and `/page#top`, address the same entry.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let url = url.split_once('#').map_or(url, |(base, _)| base);
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
