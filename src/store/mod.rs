//! Authoritative page store
//!
//! The store is the single source of truth for per-page text content. It
//! owns page identity, ordering, the current-page cursor and the hard page
//! cap. Invariants held at all observable times after construction:
//! `1 <= len() <= max_pages` and `current_index() < len()`.
//!
//! Synchronization with derived views is one-directional and explicit:
//! [`PageStore::sections`] and [`PageStore::combined_content`] recompute the
//! projection on demand and nothing in the store ever writes back into the
//! pages through a derived view.

mod page;
mod section;

pub use page::{Page, PageId};
pub use section::{Alignment, Section, TextStyle};

use crate::error::PageError;
use crate::split::split_into_sections;
use crate::MAX_PAGES_PER_STORY;
use smallvec::SmallVec;

/// The ordered, capped page collection with its current-page cursor
#[derive(Debug, Clone)]
pub struct PageStore {
    pages: SmallVec<[Page; MAX_PAGES_PER_STORY]>,
    current_index: usize,
    max_pages: usize,
    /// Next page ID to assign; never reused
    next_page_id: u64,
    /// Monotonic version counter, bumped on every observable mutation
    version: u64,
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new(MAX_PAGES_PER_STORY)
    }
}

impl PageStore {
    /// Create a store holding a single empty page.
    ///
    /// The zero-page state is purely constructive and never observable.
    pub fn new(max_pages: usize) -> Self {
        let max_pages = max_pages.clamp(1, MAX_PAGES_PER_STORY);
        let mut store = Self {
            pages: SmallVec::new(),
            current_index: 0,
            max_pages,
            next_page_id: 0,
            version: 0,
        };
        store.push_page(String::new());
        store
    }

    /// Create a store from imported text, distributing paragraphs across
    /// at most `max_pages` pages.
    pub fn from_text(text: &str, max_pages: usize) -> Self {
        let max_pages = max_pages.clamp(1, MAX_PAGES_PER_STORY);
        let mut store = Self {
            pages: SmallVec::new(),
            current_index: 0,
            max_pages,
            next_page_id: 0,
            version: 0,
        };
        for chunk in split_into_sections(text, max_pages) {
            store.push_page(chunk);
        }
        store
    }

    fn push_page(&mut self, content: String) {
        let id = PageId(self.next_page_id);
        self.next_page_id += 1;
        self.pages.push(Page::new(id, content));
        self.version += 1;
    }

    fn position_of(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|p| p.id == id)
    }

    /// Number of pages, always in `1..=max_pages`
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the collection is at the page cap
    pub fn is_at_capacity(&self) -> bool {
        self.pages.len() >= self.max_pages
    }

    /// The configured page cap
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Monotonic mutation counter
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Current cursor position, always `< len()`
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The page the cursor points at
    pub fn current_page(&self) -> &Page {
        &self.pages[self.current_index]
    }

    /// Content of the current page
    pub fn current_content(&self) -> &str {
        &self.pages[self.current_index].content
    }

    /// Look up a page by id
    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Look up a page by index
    pub fn page_at(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Iterate pages in order
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    /// Append a page; returns false (and mutates nothing) at the cap.
    ///
    /// Hitting the cap is a reported, non-fatal condition, not an error.
    pub fn add_page(&mut self, content: &str) -> bool {
        if self.pages.len() >= self.max_pages {
            log::debug!("add_page refused: already at {} pages", self.max_pages);
            return false;
        }
        self.push_page(content.to_string());
        true
    }

    /// Replace the content of the page with the given id.
    ///
    /// Writing identical content is a no-op and does not bump the version,
    /// so downstream observers see no redundant notification.
    pub fn update_page(&mut self, id: PageId, content: &str) -> Result<(), PageError> {
        let idx = self.position_of(id).ok_or(PageError::UnknownPage(id))?;
        if self.pages[idx].content == content {
            return Ok(());
        }
        self.pages[idx].content = content.to_string();
        self.version += 1;
        Ok(())
    }

    /// Convenience wrapper for updating the current page
    pub fn set_current_content(&mut self, content: &str) -> Result<(), PageError> {
        let id = self.current_page().id;
        self.update_page(id, content)
    }

    /// Attach or clear the opaque background template reference of a page
    pub fn set_background_template(
        &mut self,
        id: PageId,
        template: Option<String>,
    ) -> Result<(), PageError> {
        let idx = self.position_of(id).ok_or(PageError::UnknownPage(id))?;
        if self.pages[idx].background_template != template {
            self.pages[idx].background_template = template;
            self.version += 1;
        }
        Ok(())
    }

    /// Remove a page; refuses to remove the last one.
    ///
    /// The cursor keeps pointing at the same logical page when an earlier
    /// page is removed, and clamps when the current page itself goes away.
    pub fn delete_page(&mut self, id: PageId) -> Result<(), PageError> {
        let idx = self.position_of(id).ok_or(PageError::UnknownPage(id))?;
        if self.pages.len() == 1 {
            return Err(PageError::LastPage);
        }

        self.pages.remove(idx);
        if idx < self.current_index {
            self.current_index -= 1;
        } else if idx == self.current_index {
            self.current_index = idx.min(self.pages.len() - 1);
        }
        self.version += 1;
        Ok(())
    }

    /// Reorder a page from one index to another; the cursor follows the
    /// logical page it pointed at.
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), PageError> {
        let len = self.pages.len();
        for index in [from, to] {
            if index >= len {
                return Err(PageError::OutOfBounds { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let page = self.pages.remove(from);
        self.pages.insert(to, page);

        if self.current_index == from {
            self.current_index = to;
        } else if from < self.current_index && to >= self.current_index {
            self.current_index -= 1;
        } else if from > self.current_index && to <= self.current_index {
            self.current_index += 1;
        }
        self.version += 1;
        Ok(())
    }

    /// Move the cursor. Out-of-range requests are rejected, not clamped,
    /// so callers can detect programming errors.
    pub fn navigate_to(&mut self, index: usize) -> Result<(), PageError> {
        if index >= self.pages.len() {
            return Err(PageError::OutOfBounds {
                index,
                len: self.pages.len(),
            });
        }
        if index != self.current_index {
            self.current_index = index;
            self.version += 1;
        }
        Ok(())
    }

    /// Recompute the Section projection from the current pages.
    ///
    /// Pure, on-demand derivation: calling this never mutates the store and
    /// is idempotent and lossless for content.
    pub fn sections(&self, style: &TextStyle) -> Vec<Section> {
        self.pages
            .iter()
            .map(|p| Section {
                id: p.id,
                content: p.content.clone(),
                style: style.clone(),
            })
            .collect()
    }

    /// Concatenated story content, pages joined by paragraph boundaries
    pub fn combined_content(&self) -> String {
        let contents: Vec<&str> = self.pages.iter().map(|p| p.content.as_str()).collect();
        contents.join("\n\n")
    }
}
