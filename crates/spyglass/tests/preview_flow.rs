//
// preview_flow.rs
//
// End-to-end flows through the public API: trigger in, render commands
// and history out.
//

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tower_lsp::lsp_types::{Position, Range, Url};

use spyglass::config::PreviewConfig;
use spyglass::controller::PreviewController;
use spyglass::display::{DisplayCommand, DisplaySink};
use spyglass::input::{InputEvent, TriggerKind};
use spyglass::resolver::DefinitionResolver;
use spyglass::source_reader::SourceReader;
use spyglass::types::{CandidateDefinition, SourceStat, SourceText};

fn test_uri(name: &str) -> Url {
    Url::parse(&format!("file:///{}", name)).unwrap()
}

fn pos(line: u32, character: u32) -> Position {
    Position { line, character }
}

fn range(line: u32, start: u32, end: u32) -> Range {
    Range {
        start: pos(line, start),
        end: pos(line, end),
    }
}

struct MapReader {
    files: HashMap<Url, SourceText>,
}

#[async_trait]
impl SourceReader for MapReader {
    async fn stat(&self, uri: &Url) -> anyhow::Result<SourceStat> {
        let s = self
            .files
            .get(uri)
            .ok_or_else(|| anyhow::anyhow!("unavailable: {}", uri))?;
        Ok(SourceStat {
            version: s.version,
            line_count: s.line_count,
            language: s.language.clone(),
        })
    }

    async fn open(&self, uri: &Url) -> anyhow::Result<SourceText> {
        self.files
            .get(uri)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unavailable: {}", uri))
    }
}

struct FixedResolver {
    candidates: Vec<CandidateDefinition>,
    calls: AtomicUsize,
}

#[async_trait]
impl DefinitionResolver for FixedResolver {
    async fn resolve(
        &self,
        _uri: &Url,
        _position: Position,
        _token: &CancellationToken,
    ) -> anyhow::Result<Vec<CandidateDefinition>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.clone())
    }
}

fn origin_text() -> String {
    // Line 10 (0-based) holds "value" at columns 4..9
    let mut text = String::new();
    for i in 0..10 {
        text.push_str(&format!("// line {}\n", i));
    }
    text.push_str("let value = target();\n");
    text
}

fn defining_source_text() -> String {
    let mut text = String::new();
    for i in 0..19 {
        text.push_str(&format!("// filler {}\n", i));
    }
    // Line 19 (0-based): the definition, anchor line 20 for the display
    text.push_str("fn value() {}\n");
    text
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(3000)).await;
}

#[tokio::test(start_paused = true)]
async fn end_to_end_single_definition_renders_and_records_history() {
    let origin = test_uri("d.rs");
    let defining = test_uri("e.rs");

    let reader = Arc::new(MapReader {
        files: vec![
            (origin.clone(), SourceText::new(&origin_text(), 5, "rust")),
            (
                defining.clone(),
                SourceText::new(&defining_source_text(), 1, "rust"),
            ),
        ]
        .into_iter()
        .collect(),
    });
    let resolver = Arc::new(FixedResolver {
        candidates: vec![CandidateDefinition {
            uri: defining.clone(),
            defining_range: range(19, 3, 8),
            preview_range: range(19, 0, 13),
        }],
        calls: AtomicUsize::new(0),
    });

    let (sink, mut rx) = DisplaySink::new();
    let controller =
        PreviewController::new(PreviewConfig::default(), resolver.clone(), reader, sink);

    controller
        .handle_event(InputEvent::CursorMoved {
            uri: origin.clone(),
            position: pos(10, 6),
            kind: TriggerKind::Keyboard,
            selection_empty: true,
        })
        .await;
    settle().await;

    let mut commands = Vec::new();
    while let Ok(command) = rx.try_recv() {
        commands.push(command);
    }

    assert_eq!(commands.first(), Some(&DisplayCommand::BeginProgress));
    assert_eq!(commands.last(), Some(&DisplayCommand::EndProgress));

    let rendered = commands
        .iter()
        .find_map(|c| match c {
            DisplayCommand::RenderContent { content } => Some(content.clone()),
            _ => None,
        })
        .expect("expected rendered content");

    assert_eq!(rendered.uri, defining);
    assert_eq!(rendered.text, defining_source_text());
    assert_eq!(rendered.anchor_line, 20);
    assert_eq!(rendered.anchor_column, 4);
    assert_eq!(rendered.language, "rust");
    assert_eq!(rendered.symbol.as_deref(), Some("value"));

    assert_eq!(controller.history_len().await, 1);
    assert_eq!(controller.history_index().await, 0);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn default_selection_prefers_smaller_weighted_distance() {
    let origin = test_uri("d.rs");

    // Two candidates in the trigger's own source: one a line away
    // (weighted distance 1005), one on the same line (distance 200)
    let reader = Arc::new(MapReader {
        files: vec![(origin.clone(), SourceText::new(&origin_text(), 5, "rust"))]
            .into_iter()
            .collect(),
    });
    let resolver = Arc::new(FixedResolver {
        candidates: vec![
            CandidateDefinition {
                uri: origin.clone(),
                defining_range: range(11, 9, 10),
                preview_range: range(11, 0, 10),
            },
            CandidateDefinition {
                uri: origin.clone(),
                defining_range: range(10, 204, 205),
                preview_range: range(10, 0, 21),
            },
        ],
        calls: AtomicUsize::new(0),
    });

    let (sink, mut rx) = DisplaySink::new();
    let controller = PreviewController::new(PreviewConfig::default(), resolver, reader, sink);

    controller
        .handle_event(InputEvent::CursorMoved {
            uri: origin.clone(),
            position: pos(10, 4),
            kind: TriggerKind::Keyboard,
            selection_empty: true,
        })
        .await;
    settle().await;

    let mut active = None;
    while let Ok(command) = rx.try_recv() {
        if let DisplayCommand::ShowDefinitionList { active: a, .. } = command {
            active = Some(a);
        }
    }
    assert_eq!(active, Some(1), "distance-200 candidate wins the default");
}

#[tokio::test(start_paused = true)]
async fn second_trigger_supersedes_first_before_completion() {
    let origin = test_uri("d.rs");
    let slow_target = test_uri("slow.rs");
    let fast_target = test_uri("fast.rs");

    // Resolver that answers by trigger line: line 10 slowly resolves to
    // slow.rs, line 0 quickly to fast.rs. The token is ignored so the
    // slow completion really arrives after being superseded.
    struct ByLineResolver {
        slow: CandidateDefinition,
        fast: CandidateDefinition,
    }

    #[async_trait]
    impl DefinitionResolver for ByLineResolver {
        async fn resolve(
            &self,
            _uri: &Url,
            position: Position,
            _token: &CancellationToken,
        ) -> anyhow::Result<Vec<CandidateDefinition>> {
            if position.line == 10 {
                tokio::time::sleep(Duration::from_millis(1500)).await;
                Ok(vec![self.slow.clone()])
            } else {
                Ok(vec![self.fast.clone()])
            }
        }
    }

    let reader = Arc::new(MapReader {
        files: vec![
            (origin.clone(), SourceText::new(&origin_text(), 5, "rust")),
            (
                slow_target.clone(),
                SourceText::new("fn slow() {}\n", 1, "rust"),
            ),
            (
                fast_target.clone(),
                SourceText::new("fn fast() {}\n", 1, "rust"),
            ),
        ]
        .into_iter()
        .collect(),
    });
    let resolver = Arc::new(ByLineResolver {
        slow: CandidateDefinition {
            uri: slow_target.clone(),
            defining_range: range(0, 3, 7),
            preview_range: range(0, 0, 12),
        },
        fast: CandidateDefinition {
            uri: fast_target.clone(),
            defining_range: range(0, 3, 7),
            preview_range: range(0, 0, 12),
        },
    });

    let (sink, mut rx) = DisplaySink::new();
    let controller = PreviewController::new(PreviewConfig::default(), resolver, reader, sink);

    controller
        .handle_event(InputEvent::CursorMoved {
            uri: origin.clone(),
            position: pos(10, 6),
            kind: TriggerKind::Keyboard,
            selection_empty: true,
        })
        .await;
    // Let the first debounce elapse so the slow resolution is in flight
    tokio::time::sleep(Duration::from_millis(600)).await;
    controller
        .handle_event(InputEvent::CursorMoved {
            uri: origin.clone(),
            position: pos(0, 3),
            kind: TriggerKind::Keyboard,
            selection_empty: true,
        })
        .await;
    settle().await;

    let mut commands = Vec::new();
    while let Ok(command) = rx.try_recv() {
        commands.push(command);
    }

    let rendered: Vec<_> = commands
        .iter()
        .filter_map(|c| match c {
            DisplayCommand::RenderContent { content } => Some(content.uri.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(rendered, vec![fast_target]);

    let begins = commands
        .iter()
        .filter(|c| matches!(c, DisplayCommand::BeginProgress))
        .count();
    let ends = commands
        .iter()
        .filter(|c| matches!(c, DisplayCommand::EndProgress))
        .count();
    assert_eq!(begins, 2);
    assert_eq!(ends, 2);
    assert_eq!(controller.history_len().await, 1);
}
