//
// input.rs
//
// Input events crossing into the engine from the editor boundary
//

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{Position, Url};

use crate::history::NavigationDirection;

/// Origin of a cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerKind {
    Mouse,
    Keyboard,
}

/// Events emitted by the input source.
///
/// A closed set: every boundary event is one of these variants and the
/// controller matches exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum InputEvent {
    #[serde(rename_all = "camelCase")]
    CursorMoved {
        uri: Url,
        position: Position,
        kind: TriggerKind,
        selection_empty: bool,
    },
    #[serde(rename_all = "camelCase")]
    SymbolActivated {
        uri: Url,
        position: Position,
        symbol: String,
    },
    #[serde(rename_all = "camelCase")]
    DefinitionListItemChosen { index: usize },
    #[serde(rename_all = "camelCase")]
    NavigateRequested { direction: NavigationDirection },
    #[serde(rename_all = "camelCase")]
    VisibilityChanged { visible: bool },
    #[serde(rename_all = "camelCase")]
    PinChanged { pinned: bool },
}
