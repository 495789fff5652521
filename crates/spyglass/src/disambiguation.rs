//
// disambiguation.rs
//
// Choosing among multiple candidate definitions: annotation, default
// selection heuristic, and the data for manual override
//

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{Position, Range, Url};

use crate::content_cache::PreviewContentCache;
use crate::render::fetch_source;
use crate::source_reader::SourceReader;
use crate::types::CandidateDefinition;
use crate::word;

/// One candidate annotated for display and later re-selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedCandidate {
    /// Symbol text at the defining range, else an ordinal fallback label
    pub title: String,
    pub uri: Url,
    /// 1-based line of the definition
    pub line: u32,
    /// 1-based column of the definition
    pub column: u32,
    pub defining_range: Range,
    pub preview_range: Range,
}

/// Annotate candidates for the definition list.
///
/// Each candidate's source is fetched through the cache-or-read path to
/// extract the symbol text for its title. Candidates whose source cannot
/// be opened are dropped; an emptied list behaves upstream as an empty
/// resolution.
pub async fn annotate_candidates(
    reader: &Arc<dyn SourceReader>,
    cache: &Arc<PreviewContentCache>,
    candidates: Vec<CandidateDefinition>,
) -> Vec<AnnotatedCandidate> {
    let mut annotated = Vec::with_capacity(candidates.len());

    for (ordinal, candidate) in candidates.into_iter().enumerate() {
        let source = match fetch_source(reader, cache, &candidate.uri).await {
            Ok(source) => source,
            Err(err) => {
                log::info!(
                    "dropping candidate in unavailable source {}: {:#}",
                    candidate.uri,
                    err
                );
                continue;
            }
        };

        let title = word::text_at_range(&source.contents, candidate.defining_range)
            .unwrap_or_else(|| format!("Definition {}", ordinal + 1));

        annotated.push(AnnotatedCandidate {
            title,
            uri: candidate.uri,
            line: candidate.defining_range.start.line + 1,
            column: candidate.defining_range.start.character + 1,
            defining_range: candidate.defining_range,
            preview_range: candidate.preview_range,
        });
    }

    annotated
}

/// Weighted distance between the trigger position and a candidate.
/// The 1000 line weight makes any same-line candidate beat any
/// off-by-one-line candidate.
fn weighted_distance(trigger: Position, candidate: &AnnotatedCandidate) -> u64 {
    let line_diff = (candidate.defining_range.start.line as i64 - trigger.line as i64).unsigned_abs();
    let col_diff =
        (candidate.defining_range.start.character as i64 - trigger.character as i64).unsigned_abs();
    line_diff * 1000 + col_diff
}

/// Index of the default selection among annotated candidates.
///
/// Priority: nearest candidate in the trigger's own source by weighted
/// distance; else the first same-source candidate in list order; else
/// the first candidate overall.
pub fn default_index(
    trigger_uri: &Url,
    trigger_position: Position,
    candidates: &[AnnotatedCandidate],
) -> usize {
    let mut best: Option<(usize, u64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        if candidate.uri != *trigger_uri {
            continue;
        }
        let distance = weighted_distance(trigger_position, candidate);
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((i, distance)),
        }
    }

    best.map(|(i, _)| i).unwrap_or(0)
}
