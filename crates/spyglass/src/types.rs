//
// types.rs
//
// Core data model shared across the preview engine
//

use ropey::Rope;
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{Range, Url};

/// One resolved location that may define a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDefinition {
    /// Source containing the definition
    pub uri: Url,
    /// Range of the defining symbol itself
    pub defining_range: Range,
    /// Wider range suitable for preview framing (often the whole declaration)
    pub preview_range: Range,
}

/// Cheap metadata about a source, obtainable without reading its full text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStat {
    /// Version of the source (document version or mtime-derived)
    pub version: i32,
    /// Number of lines in the source
    pub line_count: usize,
    /// Language tag for syntax classification
    pub language: String,
}

/// Full text of a source as returned by the reader
#[derive(Debug, Clone)]
pub struct SourceText {
    pub contents: Rope,
    pub version: i32,
    pub language: String,
    pub line_count: usize,
}

impl SourceText {
    pub fn new(text: &str, version: i32, language: &str) -> Self {
        let contents = Rope::from_str(text);
        let line_count = text.lines().count().max(1);
        Self {
            contents,
            version,
            language: language.to_string(),
            line_count,
        }
    }

    pub fn text(&self) -> String {
        self.contents.to_string()
    }
}

/// Everything the display sink needs to paint one resolved definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedContent {
    /// Full text of the defining source
    pub text: String,
    /// 1-based line of the definition, used as the scroll target
    pub anchor_line: u32,
    /// 1-based column of the definition
    pub anchor_column: u32,
    /// Preview range within the source
    pub range: Range,
    /// Source the content came from
    pub uri: Url,
    /// Language tag for syntax classification
    pub language: String,
    /// Version of the source the text was read at
    pub version: i32,
    /// Number of lines in the source
    pub line_count: usize,
    /// Symbol text to highlight, when known
    pub symbol: Option<String>,
}
