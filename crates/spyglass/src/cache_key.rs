//
// cache_key.rs
//
// Fingerprint of the current viewing context, used to suppress
// redundant resolution
//

use tower_lsp::lsp_types::{Range, Url};

/// Fingerprint of what is being looked at: document, version, and the
/// word range under the cursor (absent when the cursor is not on a word).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub uri: Url,
    pub version: i32,
    pub word_range: Option<Range>,
}

impl CacheKey {
    pub fn new(uri: Url, version: i32, word_range: Option<Range>) -> Self {
        Self {
            uri,
            version,
            word_range,
        }
    }
}

/// Outcome of comparing the current context against the last rendered one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Context unchanged, no work needed
    Skip,
    /// Context changed (or absent), resolution should run
    Proceed,
}

/// Compare the current viewing context against the last rendered one.
///
/// An absent key means "no active context" and never compares equal to
/// anything, including another absent key, so absence always proceeds.
pub fn evaluate(current: Option<&CacheKey>, last: Option<&CacheKey>) -> Evaluation {
    match (current, last) {
        (Some(cur), Some(prev)) if cur == prev => Evaluation::Skip,
        _ => Evaluation::Proceed,
    }
}
