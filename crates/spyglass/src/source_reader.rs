//
// source_reader.rs
//
// Source reader seam and the disk-backed default implementation
//

use std::time::UNIX_EPOCH;

use anyhow::Context;
use async_trait::async_trait;
use tower_lsp::lsp_types::Url;

use crate::types::{SourceStat, SourceText};

/// External capability for reading source documents.
///
/// `stat` answers cheaply (version, line count, language) so callers can
/// consult the content cache before paying for a full read; `open`
/// returns the complete text.
#[async_trait]
pub trait SourceReader: Send + Sync {
    async fn stat(&self, uri: &Url) -> anyhow::Result<SourceStat>;

    async fn open(&self, uri: &Url) -> anyhow::Result<SourceText>;
}

/// Language tag from a file extension. Unknown extensions classify as
/// plaintext; the display sink owns the actual highlighting tables.
pub fn language_from_extension(uri: &Url) -> &'static str {
    let path = uri.path();
    let ext = path.rsplit('.').next().unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "rs" => "rust",
        "r" => "r",
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" | "mts" | "cts" => "typescript",
        "go" => "go",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" | "hh" => "cpp",
        "java" => "java",
        "rb" => "ruby",
        "sh" | "bash" => "shellscript",
        "json" => "json",
        "toml" => "toml",
        "yml" | "yaml" => "yaml",
        "md" => "markdown",
        _ => "plaintext",
    }
}

/// Disk-backed source reader.
///
/// Versions are derived from the file's mtime in milliseconds truncated
/// to i32, which is stable across reads of an unchanged file and differs
/// after a write. Editors embedding the engine should supply a reader
/// backed by their document store instead.
#[derive(Debug, Default)]
pub struct FileSourceReader;

impl FileSourceReader {
    pub fn new() -> Self {
        Self
    }

    fn version_from_mtime(metadata: &std::fs::Metadata) -> i32 {
        metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i32)
            .unwrap_or(0)
    }
}

#[async_trait]
impl SourceReader for FileSourceReader {
    async fn stat(&self, uri: &Url) -> anyhow::Result<SourceStat> {
        let path = uri
            .to_file_path()
            .map_err(|_| anyhow::anyhow!("not a file uri: {}", uri))?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .with_context(|| format!("stat failed for {}", uri))?;
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("read failed for {}", uri))?;

        Ok(SourceStat {
            version: Self::version_from_mtime(&metadata),
            line_count: text.lines().count().max(1),
            language: language_from_extension(uri).to_string(),
        })
    }

    async fn open(&self, uri: &Url) -> anyhow::Result<SourceText> {
        let path = uri
            .to_file_path()
            .map_err(|_| anyhow::anyhow!("not a file uri: {}", uri))?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .with_context(|| format!("stat failed for {}", uri))?;
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("read failed for {}", uri))?;

        Ok(SourceText::new(
            &text,
            Self::version_from_mtime(&metadata),
            language_from_extension(uri),
        ))
    }
}
