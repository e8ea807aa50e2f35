//! Page identity and content

/// Stable identifier for a page that survives edits and reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PageId(pub u64);

/// One unit of the bounded, ordered sequence a story is divided into.
///
/// `content` is canonical plain text (`\n` line breaks, `\n\n` paragraph
/// boundaries) and never contains markup; it is the single serialization
/// format exchanged with the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub id: PageId,
    pub content: String,
    /// Opaque reference to a background template, passed through untouched
    pub background_template: Option<String>,
}

impl Page {
    /// Create a page with the given id and content
    pub fn new(id: PageId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            background_template: None,
        }
    }

    /// Check whether the page holds any non-whitespace content
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}
