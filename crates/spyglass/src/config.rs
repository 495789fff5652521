//
// config.rs
//
// Configuration for the preview engine
//

/// Preview engine configuration
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Debounce window for keyboard-origin cursor movement in milliseconds
    pub keyboard_debounce_ms: u64,
    /// Settle delay for mouse-origin cursor movement in milliseconds
    pub mouse_settle_ms: u64,
    /// Maximum number of history entries
    pub history_limit: usize,
    /// Maximum number of cached large-source texts
    pub content_cache_capacity: usize,
    /// Sources with more lines than this are cached; smaller ones are re-read
    pub large_source_line_threshold: usize,
    /// Timeout for optional enrichment calls in milliseconds
    pub enrichment_timeout_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            keyboard_debounce_ms: 500,
            mouse_settle_ms: 300,
            history_limit: 50,
            content_cache_capacity: 10,
            large_source_line_threshold: 5000,
            enrichment_timeout_ms: 200,
        }
    }
}

/// Parse preview configuration from client settings.
///
/// Reads the top-level `preview` section from a serde_json::Value. Only
/// fields present in the provided JSON are applied; absent fields retain
/// their defaults from `PreviewConfig::default()`.
///
/// Returns `Some(PreviewConfig)` when the `preview` section is present,
/// `None` otherwise.
pub fn parse_preview_config(settings: &serde_json::Value) -> Option<PreviewConfig> {
    let preview = settings.get("preview")?;

    let mut config = PreviewConfig::default();

    if let Some(v) = preview.get("keyboardDebounceMs").and_then(|v| v.as_u64()) {
        config.keyboard_debounce_ms = v;
    }
    if let Some(v) = preview.get("mouseSettleMs").and_then(|v| v.as_u64()) {
        config.mouse_settle_ms = v;
    }
    if let Some(v) = preview.get("historyLimit").and_then(|v| v.as_u64()) {
        config.history_limit = v as usize;
    }
    if let Some(v) = preview
        .get("contentCacheCapacity")
        .and_then(|v| v.as_u64())
    {
        config.content_cache_capacity = v as usize;
    }
    if let Some(v) = preview
        .get("largeSourceLineThreshold")
        .and_then(|v| v.as_u64())
    {
        config.large_source_line_threshold = v as usize;
    }
    if let Some(v) = preview.get("enrichmentTimeoutMs").and_then(|v| v.as_u64()) {
        config.enrichment_timeout_ms = v;
    }

    log::info!("Preview configuration loaded from settings:");
    log::info!("  keyboard_debounce_ms: {}", config.keyboard_debounce_ms);
    log::info!("  mouse_settle_ms: {}", config.mouse_settle_ms);
    log::info!("  history_limit: {}", config.history_limit);
    log::info!("  content_cache_capacity: {}", config.content_cache_capacity);
    log::info!(
        "  large_source_line_threshold: {}",
        config.large_source_line_threshold
    );
    log::info!("  enrichment_timeout_ms: {}", config.enrichment_timeout_ms);

    Some(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_values() {
        let config = PreviewConfig::default();
        assert_eq!(config.keyboard_debounce_ms, 500);
        assert_eq!(config.mouse_settle_ms, 300);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.content_cache_capacity, 10);
        assert_eq!(config.large_source_line_threshold, 5000);
        assert_eq!(config.enrichment_timeout_ms, 200);
    }

    #[test]
    fn test_parse_missing_section() {
        let settings = json!({ "other": {} });
        assert!(parse_preview_config(&settings).is_none());
    }

    #[test]
    fn test_parse_partial_overrides() {
        let settings = json!({
            "preview": {
                "keyboardDebounceMs": 250,
                "historyLimit": 20
            }
        });
        let config = parse_preview_config(&settings).unwrap();
        assert_eq!(config.keyboard_debounce_ms, 250);
        assert_eq!(config.history_limit, 20);
        // Absent fields retain defaults
        assert_eq!(config.mouse_settle_ms, 300);
        assert_eq!(config.content_cache_capacity, 10);
    }

    #[test]
    fn test_parse_ignores_wrong_types() {
        let settings = json!({
            "preview": {
                "keyboardDebounceMs": "fast",
                "mouseSettleMs": 100
            }
        });
        let config = parse_preview_config(&settings).unwrap();
        assert_eq!(config.keyboard_debounce_ms, 500);
        assert_eq!(config.mouse_settle_ms, 100);
    }
}
