//
// render.rs
//
// Cache-or-fresh-read source fetching and rendered content assembly
//

use std::sync::Arc;

use tower_lsp::lsp_types::Url;

use crate::content_cache::PreviewContentCache;
use crate::disambiguation::AnnotatedCandidate;
use crate::source_reader::SourceReader;
use crate::types::{RenderedContent, SourceText};

/// Fetch a source through the content cache.
///
/// Stats the source first so the cache can be consulted at the current
/// version; on a miss the full text is read and, when large enough,
/// cached for next time.
pub async fn fetch_source(
    reader: &Arc<dyn SourceReader>,
    cache: &Arc<PreviewContentCache>,
    uri: &Url,
) -> anyhow::Result<Arc<SourceText>> {
    let stat = reader.stat(uri).await?;

    if let Some(cached) = cache.get(uri, stat.version) {
        log::trace!("content cache hit for {} at version {}", uri, stat.version);
        return Ok(cached);
    }

    let source = Arc::new(reader.open(uri).await?);
    cache.put(uri.clone(), source.clone());
    Ok(source)
}

/// Assemble rendered content for one annotated candidate.
pub fn build_rendered(
    annotation: &AnnotatedCandidate,
    source: &SourceText,
    symbol: Option<String>,
) -> RenderedContent {
    RenderedContent {
        text: source.text(),
        anchor_line: annotation.line,
        anchor_column: annotation.column,
        range: annotation.preview_range,
        uri: annotation.uri.clone(),
        language: source.language.clone(),
        version: source.version,
        line_count: source.line_count,
        symbol,
    }
}
