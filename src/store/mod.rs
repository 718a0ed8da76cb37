//! Image artifact storage
//!
//! Filtered images are stored under content-derived references, so two
//! uploads that share a filename never overwrite each other and a repeated
//! upload resolves to the same artifact.

mod fs;

pub use fs::FsImageStore;

use sha2::{Digest, Sha256};
use std::fmt;

/// Number of hex characters of the content hash kept in a reference
const HASH_LEN: usize = 16;

/// Fallback name when an upload has no usable filename
const DEFAULT_NAME: &str = "image";

/// Longest file stem kept from an upload; keeps references under `NAME_MAX`
const MAX_STEM_LEN: usize = 100;

/// Longer suffixes are treated as part of the stem
const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid image reference: {0:?}")]
    InvalidReference(String),
}

/// Opaque handle to a stored artifact
///
/// Always a single path component made of `[A-Za-z0-9._-]`, never starting
/// with a dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(String);

impl ImageRef {
    /// Validate a reference received from the outside world (e.g. a URL)
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let valid = !raw.is_empty()
            && !raw.starts_with('.')
            && raw.chars().all(is_safe_char);
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(StoreError::InvalidReference(raw.to_string()))
        }
    }

    /// Build the reference for `bytes`: `<stem>-<hash16>-<sanitized file name>`
    pub fn for_content(stem: &str, file_name: &str, bytes: &[u8]) -> Self {
        let digest = format!("{:x}", Sha256::digest(bytes));
        Self(format!(
            "{}-{}-{}",
            sanitize_component(stem),
            &digest[..HASH_LEN],
            sanitize_file_name(file_name)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extension of the embedded file name, lowercased
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.0)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Put/get storage for filtered images
pub trait ImageStore: Send + Sync {
    /// Store `bytes`, returning the reference they can be fetched with.
    /// Storing identical bytes under the same stem and name is idempotent.
    fn put(&self, stem: &str, file_name: &str, bytes: &[u8]) -> Result<ImageRef, StoreError>;

    /// Fetch a stored artifact, `None` if nothing is stored under `reference`
    fn get(&self, reference: &ImageRef) -> Result<Option<Vec<u8>>, StoreError>;
}

const fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

fn sanitize_component(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .map(|c| if is_safe_char(c) { c } else { '_' })
        .collect()
}

/// Keep the final path component of an uploaded filename, restricted to
/// safe characters, with the stem cut to `MAX_STEM_LEN` bytes
pub fn sanitize_file_name(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .map(|c| if is_safe_char(c) { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return DEFAULT_NAME.to_string();
    }

    // ASCII only from here, so byte slicing is safe
    match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() <= MAX_EXTENSION_LEN => {
            format!("{}.{ext}", truncate(stem))
        }
        _ => truncate(cleaned).to_string(),
    }
}

fn truncate(stem: &str) -> &str {
    &stem[..stem.len().min(MAX_STEM_LEN)]
}
