//
// pipeline.rs
//
// Definition resolution: resolver call, zero/one/many classification,
// failure absorption
//

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tower_lsp::lsp_types::{Position, Url};

use crate::resolver::DefinitionResolver;
use crate::types::CandidateDefinition;

/// Classified result of one resolution attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    /// No candidates. Carries the original trigger position so the sink
    /// can clear stale highlights. A normal outcome, not an error.
    Empty { position: Position },
    /// Exactly one candidate; proceed directly to rendering
    Single(CandidateDefinition),
    /// Several candidates; disambiguation picks among them
    Multiple(Vec<CandidateDefinition>),
}

/// Call the resolver and classify its answer.
///
/// Resolver rejection is absorbed and treated identically to an empty
/// result: navigation is best-effort, so nothing here escapes as a hard
/// fault. The caller owns progress signaling.
pub async fn resolve(
    resolver: &Arc<dyn DefinitionResolver>,
    uri: &Url,
    position: Position,
    token: &CancellationToken,
) -> ResolutionOutcome {
    let candidates = match resolver.resolve(uri, position, token).await {
        Ok(candidates) => candidates,
        Err(err) => {
            log::info!("definition resolver failed for {}: {:#}", uri, err);
            return ResolutionOutcome::Empty { position };
        }
    };

    match candidates.len() {
        0 => ResolutionOutcome::Empty { position },
        1 => ResolutionOutcome::Single(candidates.into_iter().next().unwrap()),
        n => {
            log::trace!("resolver returned {} candidates for {}", n, uri);
            ResolutionOutcome::Multiple(candidates)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tower_lsp::lsp_types::Range;

    struct FixedResolver {
        result: anyhow::Result<Vec<CandidateDefinition>>,
    }

    #[async_trait]
    impl DefinitionResolver for FixedResolver {
        async fn resolve(
            &self,
            _uri: &Url,
            _position: Position,
            _token: &CancellationToken,
        ) -> anyhow::Result<Vec<CandidateDefinition>> {
            match &self.result {
                Ok(v) => Ok(v.clone()),
                Err(e) => Err(anyhow::anyhow!("{}", e)),
            }
        }
    }

    fn candidate(name: &str) -> CandidateDefinition {
        CandidateDefinition {
            uri: Url::parse(&format!("file:///{}", name)).unwrap(),
            defining_range: Range::default(),
            preview_range: Range::default(),
        }
    }

    fn pos() -> Position {
        Position {
            line: 3,
            character: 7,
        }
    }

    #[tokio::test]
    async fn test_empty_keeps_trigger_position() {
        let resolver: Arc<dyn DefinitionResolver> = Arc::new(FixedResolver {
            result: Ok(Vec::new()),
        });
        let uri = Url::parse("file:///a.rs").unwrap();
        let outcome = resolve(&resolver, &uri, pos(), &CancellationToken::new()).await;
        assert_eq!(outcome, ResolutionOutcome::Empty { position: pos() });
    }

    #[tokio::test]
    async fn test_rejection_behaves_as_empty() {
        let resolver: Arc<dyn DefinitionResolver> = Arc::new(FixedResolver {
            result: Err(anyhow::anyhow!("resolver unavailable")),
        });
        let uri = Url::parse("file:///a.rs").unwrap();
        let outcome = resolve(&resolver, &uri, pos(), &CancellationToken::new()).await;
        assert_eq!(outcome, ResolutionOutcome::Empty { position: pos() });
    }

    #[tokio::test]
    async fn test_single_and_multiple() {
        let resolver: Arc<dyn DefinitionResolver> = Arc::new(FixedResolver {
            result: Ok(vec![candidate("d.rs")]),
        });
        let uri = Url::parse("file:///a.rs").unwrap();
        let outcome = resolve(&resolver, &uri, pos(), &CancellationToken::new()).await;
        assert!(matches!(outcome, ResolutionOutcome::Single(_)));

        let resolver: Arc<dyn DefinitionResolver> = Arc::new(FixedResolver {
            result: Ok(vec![candidate("d.rs"), candidate("e.rs")]),
        });
        let outcome = resolve(&resolver, &uri, pos(), &CancellationToken::new()).await;
        match outcome {
            ResolutionOutcome::Multiple(list) => assert_eq!(list.len(), 2),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
