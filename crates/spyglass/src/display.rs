//
// display.rs
//
// Render commands flowing out to the display sink
//

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tower_lsp::lsp_types::Position;

use crate::disambiguation::AnnotatedCandidate;
use crate::types::RenderedContent;

/// Commands consumed by the display sink, the sole producer of
/// user-visible output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum DisplayCommand {
    #[serde(rename_all = "camelCase")]
    RenderContent { content: RenderedContent },
    #[serde(rename_all = "camelCase")]
    ShowNoContent { message: String },
    #[serde(rename_all = "camelCase")]
    ShowDefinitionList {
        candidates: Vec<AnnotatedCandidate>,
        active: usize,
    },
    ClearDefinitionList,
    BeginProgress,
    EndProgress,
    #[serde(rename_all = "camelCase")]
    ShowNoSymbolFound { position: Position },
}

/// Handle for sending commands to the display sink.
///
/// Sends are fire-and-forget; a dropped receiver only produces a trace
/// message since the display may legitimately go away first.
#[derive(Debug, Clone)]
pub struct DisplaySink {
    tx: mpsc::UnboundedSender<DisplayCommand>,
}

impl DisplaySink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DisplayCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, command: DisplayCommand) {
        if self.tx.send(command).is_err() {
            log::trace!("display sink receiver dropped; command discarded");
        }
    }

    pub fn render_content(&self, content: RenderedContent) {
        self.send(DisplayCommand::RenderContent { content });
    }

    pub fn show_no_content(&self, message: &str) {
        self.send(DisplayCommand::ShowNoContent {
            message: message.to_string(),
        });
    }

    pub fn show_definition_list(&self, candidates: Vec<AnnotatedCandidate>, active: usize) {
        self.send(DisplayCommand::ShowDefinitionList { candidates, active });
    }

    pub fn clear_definition_list(&self) {
        self.send(DisplayCommand::ClearDefinitionList);
    }

    pub fn show_no_symbol_found(&self, position: Position) {
        self.send(DisplayCommand::ShowNoSymbolFound { position });
    }
}

/// Brackets an asynchronous resolution with begin/end progress signals.
///
/// EndProgress is sent on drop, so the pair closes on every exit path:
/// success, empty, failure, and cancellation.
pub struct ProgressGuard {
    sink: DisplaySink,
}

impl ProgressGuard {
    pub fn begin(sink: &DisplaySink) -> Self {
        sink.send(DisplayCommand::BeginProgress);
        Self { sink: sink.clone() }
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.sink.send(DisplayCommand::EndProgress);
    }
}
