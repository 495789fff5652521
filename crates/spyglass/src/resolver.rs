//
// resolver.rs
//
// Definition resolver seam
//

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tower_lsp::lsp_types::{Position, Url};

use crate::types::CandidateDefinition;

/// External capability that resolves the definition(s) of the symbol at
/// a position.
///
/// `resolve` may return an empty list (a normal outcome, not an error)
/// and may fail; either way the pipeline absorbs it. The cancellation
/// token is honored best-effort: implementations should stop early when
/// it fires, but the engine never relies on that for correctness.
#[async_trait]
pub trait DefinitionResolver: Send + Sync {
    async fn resolve(
        &self,
        uri: &Url,
        position: Position,
        token: &CancellationToken,
    ) -> anyhow::Result<Vec<CandidateDefinition>>;

    /// Optional enrichment: the symbol text at a position as the editor
    /// sees it. Callers wrap this in a short timeout and fall back to
    /// local word extraction, so a slow implementation costs nothing.
    async fn symbol_at(&self, _uri: &Url, _position: Position) -> Option<String> {
        None
    }
}

/// Resolver that never finds anything. Used by the stdio harness, where
/// the embedder has not supplied a real resolver.
#[derive(Debug, Default)]
pub struct NullResolver;

#[async_trait]
impl DefinitionResolver for NullResolver {
    async fn resolve(
        &self,
        _uri: &Url,
        _position: Position,
        _token: &CancellationToken,
    ) -> anyhow::Result<Vec<CandidateDefinition>> {
        Ok(Vec::new())
    }
}
