//
// controller.rs
//
// Top-level update controller: debouncing, cancellation, guard
// conditions, and wiring of resolution, disambiguation, rendering,
// and history
//

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_lsp::lsp_types::{Position, Url};

use crate::cache_key::{self, CacheKey, Evaluation};
use crate::config::PreviewConfig;
use crate::content_cache::PreviewContentCache;
use crate::disambiguation::{self, AnnotatedCandidate};
use crate::display::{DisplaySink, ProgressGuard};
use crate::history::{HistoryEntry, HistoryStack, Navigation, NavigationDirection};
use crate::input::{InputEvent, TriggerKind};
use crate::pipeline::{self, ResolutionOutcome};
use crate::render::{build_rendered, fetch_source};
use crate::resolver::DefinitionResolver;
use crate::source_reader::SourceReader;
use crate::word;

/// One update trigger: where the user is pointing and how they got there
#[derive(Debug, Clone)]
struct Trigger {
    uri: Url,
    position: Position,
    kind: TriggerKind,
    /// Symbol text supplied by an explicit activation, if any
    symbol: Option<String>,
}

/// Session state owned by the controller.
///
/// Mutated only between suspension points of the single cooperative
/// update flow; the lock is never held across an await that does I/O.
struct SessionState {
    last_key: Option<CacheKey>,
    /// Monotonic id of the most recently scheduled update. Completions
    /// are applied only when their id still matches.
    current_request: u64,
    pending: Option<CancellationToken>,
    pinned: bool,
    visible: bool,
    selection_empty: bool,
    last_trigger: Option<Trigger>,
    /// Annotations captured for the definition list, for manual
    /// re-selection without re-resolution
    annotations: Vec<AnnotatedCandidate>,
    captured_symbol: Option<String>,
    origin_line: u32,
    history: HistoryStack,
}

impl SessionState {
    fn new(config: &PreviewConfig) -> Self {
        Self {
            last_key: None,
            current_request: 0,
            pending: None,
            pinned: false,
            visible: true,
            selection_empty: true,
            last_trigger: None,
            annotations: Vec::new(),
            captured_symbol: None,
            origin_line: 0,
            history: HistoryStack::new(config.history_limit),
        }
    }

    /// Cancel any pending update and hand out a fresh handle
    fn begin_request(&mut self) -> (u64, CancellationToken) {
        if let Some(old) = self.pending.take() {
            old.cancel();
        }
        self.current_request += 1;
        let token = CancellationToken::new();
        self.pending = Some(token.clone());
        (self.current_request, token)
    }
}

/// Coordinates the whole preview update flow.
pub struct PreviewController {
    config: PreviewConfig,
    resolver: Arc<dyn DefinitionResolver>,
    reader: Arc<dyn SourceReader>,
    cache: Arc<PreviewContentCache>,
    sink: DisplaySink,
    state: Arc<RwLock<SessionState>>,
}

impl PreviewController {
    pub fn new(
        config: PreviewConfig,
        resolver: Arc<dyn DefinitionResolver>,
        reader: Arc<dyn SourceReader>,
        sink: DisplaySink,
    ) -> Arc<Self> {
        let cache = Arc::new(PreviewContentCache::new(
            config.content_cache_capacity,
            config.large_source_line_threshold,
        ));
        let state = Arc::new(RwLock::new(SessionState::new(&config)));
        Arc::new(Self {
            config,
            resolver,
            reader,
            cache,
            sink,
            state,
        })
    }

    /// Number of entries currently in history
    pub async fn history_len(&self) -> usize {
        self.state.read().await.history.len()
    }

    /// Current history index
    pub async fn history_index(&self) -> usize {
        self.state.read().await.history.index()
    }

    /// Dispatch one input event
    pub async fn handle_event(self: &Arc<Self>, event: InputEvent) {
        match event {
            InputEvent::CursorMoved {
                uri,
                position,
                kind,
                selection_empty,
            } => {
                {
                    let mut state = self.state.write().await;
                    state.selection_empty = selection_empty;
                    if state.pinned {
                        log::trace!("pinned; cursor movement ignored");
                        return;
                    }
                }
                let debounce = match kind {
                    TriggerKind::Keyboard => self.config.keyboard_debounce_ms,
                    TriggerKind::Mouse => self.config.mouse_settle_ms,
                };
                self.schedule_update(
                    Trigger {
                        uri,
                        position,
                        kind,
                        symbol: None,
                    },
                    false,
                    Some(debounce),
                )
                .await;
            }
            InputEvent::SymbolActivated {
                uri,
                position,
                symbol,
            } => {
                if self.state.read().await.pinned {
                    log::trace!("pinned; symbol activation ignored");
                    return;
                }
                // Explicit activation skips the debounce and the cache
                // key comparison
                self.schedule_update(
                    Trigger {
                        uri,
                        position,
                        kind: TriggerKind::Keyboard,
                        symbol: Some(symbol),
                    },
                    true,
                    None,
                )
                .await;
            }
            InputEvent::DefinitionListItemChosen { index } => {
                self.choose_definition(index).await;
            }
            InputEvent::NavigateRequested { direction } => {
                self.navigate(direction).await;
            }
            InputEvent::VisibilityChanged { visible } => {
                let last_trigger = {
                    let mut state = self.state.write().await;
                    state.visible = visible;
                    if visible {
                        state.last_trigger.clone()
                    } else {
                        None
                    }
                };
                // Regained visibility refreshes the last context,
                // bypassing the cache key
                if let Some(trigger) = last_trigger {
                    log::trace!("visibility regained; forcing refresh");
                    self.schedule_update(trigger, true, None).await;
                }
            }
            InputEvent::PinChanged { pinned } => {
                let mut state = self.state.write().await;
                state.pinned = pinned;
                if pinned {
                    if let Some(token) = state.pending.take() {
                        token.cancel();
                    }
                }
            }
        }
    }

    /// Register a new update and start its (possibly debounced) task.
    /// Any previously pending update is cancelled.
    async fn schedule_update(self: &Arc<Self>, trigger: Trigger, ignore_cache: bool, debounce_ms: Option<u64>) {
        let (id, token) = {
            let mut state = self.state.write().await;
            state.last_trigger = Some(trigger.clone());
            state.begin_request()
        };

        let this = self.clone();
        tokio::spawn(async move {
            if let Some(wait) = debounce_ms {
                tokio::select! {
                    _ = token.cancelled() => {
                        log::trace!("update {} superseded during debounce", id);
                        return;
                    }
                    _ = tokio::time::sleep(Duration::from_millis(wait)) => {}
                }
            }
            this.run_update(id, token, trigger, ignore_cache).await;
        });
    }

    async fn is_current(&self, id: u64) -> bool {
        self.state.read().await.current_request == id
    }

    /// One complete update attempt: guards, cache key, resolution,
    /// disambiguation, rendering, history.
    async fn run_update(
        self: Arc<Self>,
        id: u64,
        token: CancellationToken,
        trigger: Trigger,
        ignore_cache: bool,
    ) {
        {
            let state = self.state.read().await;
            if state.current_request != id {
                log::trace!("stale update {} dropped before resolution", id);
                return;
            }
            if !state.visible {
                log::trace!("display surface hidden; update skipped");
                return;
            }
            if state.pinned {
                return;
            }
            // Mouse-drag selections must not trigger mid-drag: after the
            // settle delay the selection must still be empty.
            if trigger.kind == TriggerKind::Mouse && !state.selection_empty {
                log::trace!("selection active after mouse settle; update skipped");
                return;
            }
        }

        let (key, local_word) = self.compute_cache_key(&trigger).await;

        {
            let mut state = self.state.write().await;
            if state.current_request != id {
                log::trace!("stale update {} dropped after cache key", id);
                return;
            }
            if !ignore_cache
                && cache_key::evaluate(key.as_ref(), state.last_key.as_ref()) == Evaluation::Skip
            {
                log::trace!("viewing context unchanged; resolution skipped");
                return;
            }
            state.last_key = key;
        }

        // The guard closes the progress pair on every exit path below,
        // including stale drops and panics.
        let _progress = ProgressGuard::begin(&self.sink);

        let outcome =
            pipeline::resolve(&self.resolver, &trigger.uri, trigger.position, &token).await;

        if !self.is_current(id).await {
            log::trace!("stale resolution {} discarded", id);
            return;
        }

        match outcome {
            ResolutionOutcome::Empty { position } => {
                self.show_empty(id, position).await;
            }
            ResolutionOutcome::Single(candidate) => {
                let annotated = disambiguation::annotate_candidates(
                    &self.reader,
                    &self.cache,
                    vec![candidate],
                )
                .await;
                if !self.is_current(id).await {
                    log::trace!("stale annotation {} discarded", id);
                    return;
                }
                match annotated.into_iter().next() {
                    None => self.show_empty(id, trigger.position).await,
                    Some(annotation) => {
                        let symbol = self.capture_symbol(&trigger, local_word).await;
                        {
                            let mut state = self.state.write().await;
                            if state.current_request != id {
                                return;
                            }
                            state.annotations.clear();
                            state.captured_symbol = symbol.clone();
                            state.origin_line = trigger.position.line;
                        }
                        self.sink.clear_definition_list();
                        self.render_candidate(id, annotation, symbol, trigger.position.line)
                            .await;
                    }
                }
            }
            ResolutionOutcome::Multiple(candidates) => {
                let annotated =
                    disambiguation::annotate_candidates(&self.reader, &self.cache, candidates)
                        .await;
                if !self.is_current(id).await {
                    log::trace!("stale annotation {} discarded", id);
                    return;
                }
                if annotated.is_empty() {
                    self.show_empty(id, trigger.position).await;
                } else {
                    let active =
                        disambiguation::default_index(&trigger.uri, trigger.position, &annotated);
                    let symbol = self.capture_symbol(&trigger, local_word).await;
                    {
                        let mut state = self.state.write().await;
                        if state.current_request != id {
                            return;
                        }
                        state.annotations = annotated.clone();
                        state.captured_symbol = symbol.clone();
                        state.origin_line = trigger.position.line;
                    }
                    self.sink.show_definition_list(annotated.clone(), active);
                    self.render_candidate(id, annotated[active].clone(), symbol, trigger.position.line)
                        .await;
                }
            }
        }

        let mut state = self.state.write().await;
        if state.current_request == id {
            state.pending = None;
        }
    }

    async fn show_empty(&self, id: u64, position: Position) {
        let mut state = self.state.write().await;
        if state.current_request != id {
            return;
        }
        state.annotations.clear();
        drop(state);
        self.sink.clear_definition_list();
        self.sink.show_no_symbol_found(position);
    }

    /// Compute the cache key for the trigger context, plus the locally
    /// extracted word text for symbol highlighting. A context that
    /// cannot be read at all yields no key, which never compares equal.
    async fn compute_cache_key(&self, trigger: &Trigger) -> (Option<CacheKey>, Option<String>) {
        match fetch_source(&self.reader, &self.cache, &trigger.uri).await {
            Ok(source) => {
                let range = word::word_range_at(&source.contents, trigger.position);
                let local_word = word::word_at(&source.contents, trigger.position);
                (
                    Some(CacheKey::new(trigger.uri.clone(), source.version, range)),
                    local_word,
                )
            }
            Err(err) => {
                log::trace!("no active context for {}: {:#}", trigger.uri, err);
                (None, None)
            }
        }
    }

    /// Symbol text for highlighting: an explicit activation wins, then
    /// the resolver's enrichment under a short timeout, then the locally
    /// extracted word.
    async fn capture_symbol(&self, trigger: &Trigger, local_word: Option<String>) -> Option<String> {
        if trigger.symbol.is_some() {
            return trigger.symbol.clone();
        }

        let enrichment = tokio::time::timeout(
            Duration::from_millis(self.config.enrichment_timeout_ms),
            self.resolver.symbol_at(&trigger.uri, trigger.position),
        )
        .await;

        match enrichment {
            Ok(Some(symbol)) => Some(symbol),
            Ok(None) => local_word,
            Err(_) => {
                log::trace!("symbol enrichment timed out; using local word");
                local_word
            }
        }
    }

    /// Fetch the candidate's source and render it, pushing history when
    /// the flow is still current.
    async fn render_candidate(
        &self,
        id: u64,
        annotation: AnnotatedCandidate,
        symbol: Option<String>,
        return_line: u32,
    ) {
        let source = match fetch_source(&self.reader, &self.cache, &annotation.uri).await {
            Ok(source) => source,
            Err(err) => {
                log::info!("source vanished before render: {}: {:#}", annotation.uri, err);
                return;
            }
        };

        let rendered = build_rendered(&annotation, &source, symbol);

        let mut state = self.state.write().await;
        if state.current_request != id {
            log::trace!("stale render {} discarded", id);
            return;
        }
        if state.pinned {
            return;
        }
        state.history.push(HistoryEntry {
            content: Some(rendered.clone()),
            return_line,
        });
        drop(state);
        self.sink.render_content(rendered);
    }

    /// Re-render a previously annotated candidate chosen from the list.
    /// Uses the captured annotation and symbol text; cursor state may
    /// have drifted since the list was shown, so it is not re-queried.
    async fn choose_definition(self: &Arc<Self>, index: usize) {
        let (annotation, symbol, return_line, id) = {
            let mut state = self.state.write().await;
            if state.pinned {
                return;
            }
            let Some(annotation) = state.annotations.get(index).cloned() else {
                log::warn!("definition list index {} out of range", index);
                return;
            };
            let (id, _token) = state.begin_request();
            (annotation, state.captured_symbol.clone(), state.origin_line, id)
        };

        self.render_candidate(id, annotation, symbol, return_line)
            .await;
    }

    /// Move through history and re-render the stored content without
    /// resolving again. Edges are a quiet no-op.
    async fn navigate(&self, direction: NavigationDirection) {
        let mut state = self.state.write().await;
        if state.pinned {
            log::trace!("pinned; navigation ignored");
            return;
        }
        match state.history.navigate(direction) {
            Navigation::Moved(entry) => {
                drop(state);
                match entry.content {
                    Some(content) => self.sink.render_content(content),
                    None => self.sink.show_no_content("No content available"),
                }
            }
            Navigation::AtEdge => {
                log::trace!("history edge reached; no movement");
            }
        }
    }
}
