//! Pageflow: pagination and content-sync core for a story editor
//!
//! This crate maintains the single source of truth for per-page story text
//! while a rich-text surface edits it:
//! - Line-break-preserving HTML <-> plain-text conversion
//! - Content splitting across page boundaries with an integrity gate
//! - An authoritative, capped page store with a current-page cursor
//! - A navigation protocol that never races in-flight or debounced edits
//! - A best-effort overflow/reflow heuristic

pub mod convert;
pub mod error;
pub mod manager;
pub mod reflow;
pub mod split;
pub mod store;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmStoryEditor;

// Re-export primary types
pub use convert::{estimate_line_count, html_to_text, text_to_html};
pub use error::PageError;
pub use manager::{Debounce, EditorSurface, PageManager, SurfaceSelection};
pub use reflow::{HeightMeasurer, ReflowEngine};
pub use split::{split_at, split_into_sections, validate_break_integrity, SplitResult};
pub use store::{Alignment, Page, PageId, PageStore, Section, TextStyle};

/// Hard cap on the number of pages in a story
pub const MAX_PAGES_PER_STORY: usize = 6;

/// Default trailing debounce for store writes, in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 275;

/// Cross-cutting editor configuration
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Page cap, at most [`MAX_PAGES_PER_STORY`]
    pub max_pages: usize,
    /// Trailing debounce window for continuous typing
    pub debounce_ms: u64,
    /// Average characters per display line; feeds only the line-count
    /// estimate and the reflow heuristic, never authoritative pagination
    pub avg_chars_per_line: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_pages: MAX_PAGES_PER_STORY,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            avg_chars_per_line: 38,
        }
    }
}
