// lib.rs — Peek-definition preview engine.
//
// The binary entry point lives in main.rs; it wires the engine to a
// JSON-line stdio transport. Everything else is a library so embedders
// can supply their own resolver and display sink.

pub mod cache_key;
pub mod config;
pub mod content_cache;
pub mod controller;
pub mod disambiguation;
pub mod display;
pub mod history;
pub mod input;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod source_reader;
pub mod types;
pub mod word;

pub use config::PreviewConfig;
pub use controller::PreviewController;
pub use display::{DisplayCommand, DisplaySink};
pub use input::InputEvent;
