//
// history.rs
//
// Bounded back/forward history of rendered definition previews
//

use crate::types::RenderedContent;

/// Default bound on history length
const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One navigable resolution result
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Rendered content, absent when nothing could be rendered
    pub content: Option<RenderedContent>,
    /// Line in the origin document the jump was made from
    pub return_line: u32,
}

/// Outcome of a back/forward navigation request
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// Index moved; the entry now current
    Moved(HistoryEntry),
    /// Already at the edge, nothing happened
    AtEdge,
}

/// Direction of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationDirection {
    Back,
    Forward,
}

/// Ordered sequence of resolved results with a current index.
///
/// Pushing while positioned before the end truncates the forward tail
/// first, then appends. When the bound is exceeded the oldest entry is
/// evicted and the index shifted down so it keeps denoting the same
/// logical entry.
#[derive(Debug)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    index: usize,
    limit: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryStack {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            limit: limit.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current index, meaningful only when non-empty
    pub fn index(&self) -> usize {
        self.index
    }

    /// Entry at the current index, or None when history is empty
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index)
    }

    /// Drop all entries beyond the current index, append, and advance.
    /// Evicts the oldest entry when the bound is exceeded.
    pub fn push(&mut self, entry: HistoryEntry) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(entry);
        self.index = self.entries.len() - 1;

        if self.entries.len() > self.limit {
            self.entries.remove(0);
            self.index -= 1;
        }
    }

    /// Move the index one step back, clamped at the start
    pub fn navigate_back(&mut self) -> Navigation {
        if self.entries.is_empty() || self.index == 0 {
            return Navigation::AtEdge;
        }
        self.index -= 1;
        Navigation::Moved(self.entries[self.index].clone())
    }

    /// Move the index one step forward, clamped at the end
    pub fn navigate_forward(&mut self) -> Navigation {
        if self.entries.is_empty() || self.index + 1 >= self.entries.len() {
            return Navigation::AtEdge;
        }
        self.index += 1;
        Navigation::Moved(self.entries[self.index].clone())
    }

    pub fn navigate(&mut self, direction: NavigationDirection) -> Navigation {
        match direction {
            NavigationDirection::Back => self.navigate_back(),
            NavigationDirection::Forward => self.navigate_forward(),
        }
    }
}
