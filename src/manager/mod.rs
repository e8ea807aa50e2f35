//! Page manager and navigation protocol
//!
//! Orchestrates content movement between the editing surface and the page
//! store. Every multi-step operation re-reads page identity from the store
//! at the point of use instead of trusting values captured earlier, holds a
//! single serialization flag for its whole duration, and flushes any
//! pending debounced write before reading the page it is about to save.
//! Overlapping operations are dropped ([`PageError::Busy`]), never
//! interleaved.

mod debounce;
mod surface;

pub use debounce::Debounce;
pub use surface::{EditorSurface, SurfaceSelection};

use crate::convert;
use crate::error::PageError;
use crate::reflow::{HeightMeasurer, ReflowEngine};
use crate::split::{self, SplitResult};
use crate::store::PageStore;
use crate::EditorConfig;

/// Orchestration layer between the editing surface and the page store
pub struct PageManager<S: EditorSurface> {
    store: PageStore,
    surface: S,
    config: EditorConfig,
    debounce: Debounce,
    /// Serialization flag: set for the whole duration of a navigation-class
    /// operation; a late overlapping call is dropped
    op_in_progress: bool,
    /// Operation epoch; timers armed under an older epoch never fire
    generation: u64,
}

impl<S: EditorSurface> PageManager<S> {
    /// Create a manager over a fresh single-page store
    pub fn new(surface: S, config: EditorConfig) -> Self {
        let store = PageStore::new(config.max_pages);
        Self::with_store(store, surface, config)
    }

    /// Create a manager over an existing store (e.g. imported content)
    pub fn with_store(store: PageStore, surface: S, config: EditorConfig) -> Self {
        Self {
            store,
            surface,
            config,
            debounce: Debounce::new(),
            op_in_progress: false,
            generation: 0,
        }
    }

    /// Read access to the authoritative store
    pub fn store(&self) -> &PageStore {
        &self.store
    }

    /// Mutable access for host-orchestrated maintenance (reorder, import).
    /// Anything that touches the current page's content goes through the
    /// protocol methods below, never through this; callers follow up with
    /// [`reload_surface`] when the visible page may have changed.
    ///
    /// [`reload_surface`]: PageManager::reload_surface
    pub fn store_mut(&mut self) -> &mut PageStore {
        &mut self.store
    }

    /// The editing surface this manager drives
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Whether a debounced write is still waiting to land
    pub fn has_pending_write(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Non-authoritative display line count for the current page
    pub fn line_count(&self) -> usize {
        convert::estimate_line_count(self.store.current_content(), self.config.avg_chars_per_line)
    }

    /// Record a user edit; the store write lands on a trailing debounce
    pub fn note_edit(&mut self, now_ms: u64) {
        if self.op_in_progress {
            // Listener echo from a programmatic load; not a user edit
            return;
        }
        self.debounce
            .arm(now_ms, self.config.debounce_ms, self.generation);
    }

    /// Timer pump: fires the debounced write once its deadline has passed
    pub fn tick(&mut self, now_ms: u64) {
        if self.op_in_progress {
            return;
        }
        if self.debounce.due(now_ms, self.generation) {
            self.debounce.clear();
            self.write_surface_to_current_page().ok();
        }
    }

    /// Explicit synchronize action: bypasses the debounce and writes the
    /// surface content into the current page immediately
    pub fn sync_now(&mut self) {
        if self.op_in_progress {
            return;
        }
        self.debounce.clear();
        self.write_surface_to_current_page().ok();
    }

    /// Reload the current page into the surface, listeners suspended.
    ///
    /// Used after structural changes made through [`store_mut`], such as
    /// reordering pages or importing content. Any pending debounced write
    /// is discarded; it would carry the replaced surface content.
    ///
    /// [`store_mut`]: PageManager::store_mut
    pub fn reload_surface(&mut self) {
        if self.op_in_progress {
            return;
        }
        // A timer armed against the replaced surface content must not fire
        self.generation += 1;
        self.debounce.clear();
        self.surface.set_listeners_enabled(false);
        self.load_current_page_into_surface();
        self.surface.set_listeners_enabled(true);
    }

    /// Switch the editor to another page.
    ///
    /// Sequencing: bounds check with no side effects; flush the pending
    /// write; suspend listeners; save the surface into the *currently*
    /// active page with read-back validation; advance the cursor; load the
    /// target page wholesale (clear-then-set); re-arm listeners. If the
    /// save fails (page vanished), the whole operation is aborted with the
    /// pre-operation state intact.
    pub fn navigate(&mut self, target: usize) -> Result<(), PageError> {
        let len = self.store.len();
        if target >= len {
            return Err(PageError::OutOfBounds { index: target, len });
        }
        self.begin_op()?;
        let result = self.navigate_inner(target);
        self.op_in_progress = false;
        result
    }

    /// Append a new empty page and navigate to it.
    ///
    /// Current editor content is synced first; at the page cap the call
    /// reports [`PageError::LimitReached`] and does not navigate. The busy
    /// flag drops a second concurrent invocation (rapid double-activation).
    pub fn add_new_page(&mut self) -> Result<usize, PageError> {
        self.begin_op()?;
        let result = self.add_new_page_inner();
        self.op_in_progress = false;
        result
    }

    /// Split the current page at a plain-text offset and carry the tail
    /// onto a newly created page.
    ///
    /// Refused up front when the story is at the page cap or the editor is
    /// empty; aborted with no mutation when the split fails the integrity
    /// check.
    pub fn insert_page_break(&mut self, cursor: usize) -> Result<(), PageError> {
        if self.op_in_progress {
            log::debug!("insert_page_break dropped: operation in progress");
            return Err(PageError::Busy);
        }
        if self.store.is_at_capacity() {
            return Err(PageError::LimitReached(self.store.max_pages()));
        }
        let text = self.surface.plain_text();
        if text.trim().is_empty() {
            return Err(PageError::EmptyContent);
        }
        self.begin_op()?;
        let result = self.insert_page_break_inner(&text, cursor);
        self.op_in_progress = false;
        result
    }

    /// Page break at the surface's current selection.
    ///
    /// Selection offsets count Unicode scalar values over the page's plain
    /// text; they are mapped onto byte offsets here before the split. A
    /// range selection breaks at its start.
    pub fn insert_page_break_at_selection(&mut self) -> Result<(), PageError> {
        let selection = self.surface.selection();
        let start = selection.from.min(selection.to);
        let text = self.surface.plain_text();
        let cursor = text
            .char_indices()
            .nth(start)
            .map(|(offset, _)| offset)
            .unwrap_or(text.len());
        self.insert_page_break(cursor)
    }

    /// Delete the page at an index; the editor reloads whichever page the
    /// cursor lands on.
    ///
    /// The surface is flushed into the current page before the delete so a
    /// pending debounced edit survives. The last remaining page is never
    /// deleted and out-of-range indices are rejected with no side effects.
    pub fn delete_page(&mut self, index: usize) -> Result<(), PageError> {
        let len = self.store.len();
        if index >= len {
            return Err(PageError::OutOfBounds { index, len });
        }
        if len == 1 {
            return Err(PageError::LastPage);
        }
        self.begin_op()?;
        let result = self.delete_page_inner(index);
        self.op_in_progress = false;
        result
    }

    /// Flush the editor into the store, run the overflow push, and reload
    /// the surface when content moved.
    ///
    /// Running under the serialization flag means a debounce timer firing
    /// mid-check cannot rewrite the page the engine just shrank.
    pub fn check_overflow(
        &mut self,
        engine: &mut ReflowEngine,
        measurer: &impl HeightMeasurer,
        now_ms: u64,
    ) -> Result<bool, PageError> {
        self.begin_op()?;
        let result = self.reflow_inner(|store| engine.check_overflow(store, measurer, now_ms));
        self.op_in_progress = false;
        result
    }

    /// Same protocol for the pull-back direction
    pub fn check_reflow(
        &mut self,
        engine: &mut ReflowEngine,
        measurer: &impl HeightMeasurer,
        now_ms: u64,
    ) -> Result<bool, PageError> {
        self.begin_op()?;
        let result = self.reflow_inner(|store| engine.check_reflow(store, measurer, now_ms));
        self.op_in_progress = false;
        result
    }

    fn begin_op(&mut self) -> Result<(), PageError> {
        if self.op_in_progress {
            log::debug!("operation dropped: another page operation is in progress");
            return Err(PageError::Busy);
        }
        self.op_in_progress = true;
        // New epoch: any timer armed before this point is now stale
        self.generation += 1;
        self.debounce.clear();
        Ok(())
    }

    fn navigate_inner(&mut self, target: usize) -> Result<(), PageError> {
        self.surface.set_listeners_enabled(false);

        if let Err(err) = self.write_surface_to_current_page() {
            // Half-committed writes never navigate
            self.surface.set_listeners_enabled(true);
            return Err(err);
        }
        if let Err(err) = self.store.navigate_to(target) {
            self.surface.set_listeners_enabled(true);
            return Err(err);
        }
        self.load_current_page_into_surface();
        self.surface.set_listeners_enabled(true);
        log::debug!("navigated to page {target}");
        Ok(())
    }

    fn add_new_page_inner(&mut self) -> Result<usize, PageError> {
        self.surface.set_listeners_enabled(false);

        if let Err(err) = self.write_surface_to_current_page() {
            self.surface.set_listeners_enabled(true);
            return Err(err);
        }
        if !self.store.add_page("") {
            self.surface.set_listeners_enabled(true);
            return Err(PageError::LimitReached(self.store.max_pages()));
        }
        let target = self.store.len() - 1;
        if let Err(err) = self.store.navigate_to(target) {
            self.surface.set_listeners_enabled(true);
            return Err(err);
        }
        self.load_current_page_into_surface();
        self.surface.set_listeners_enabled(true);
        log::debug!("added page {target}");
        Ok(target)
    }

    fn insert_page_break_inner(&mut self, text: &str, cursor: usize) -> Result<(), PageError> {
        let SplitResult { before, after } = split::split_at(text, cursor);
        if !split::validate_break_integrity(text, &before, &after) {
            log::error!("page break aborted: split failed the integrity check");
            return Err(PageError::IntegrityFailure);
        }

        self.surface.set_listeners_enabled(false);

        // Commit the head to the current page and reload the editor with it
        let current_id = self.store.current_page().id;
        if let Err(err) = self.store.update_page(current_id, &before) {
            self.surface.set_listeners_enabled(true);
            return Err(err);
        }
        self.load_current_page_into_surface();

        if !self.store.add_page("") {
            self.surface.set_listeners_enabled(true);
            return Err(PageError::LimitReached(self.store.max_pages()));
        }
        let target = self.store.len() - 1;
        if let Err(err) = self.store.navigate_to(target) {
            self.surface.set_listeners_enabled(true);
            return Err(err);
        }

        // The tail lands on the fresh page, re-read from the store
        let new_id = self.store.current_page().id;
        if let Err(err) = self.store.update_page(new_id, &after) {
            self.surface.set_listeners_enabled(true);
            return Err(err);
        }
        self.load_current_page_into_surface();
        self.surface.set_listeners_enabled(true);
        log::debug!("page break inserted, tail moved to page {target}");
        Ok(())
    }

    fn delete_page_inner(&mut self, index: usize) -> Result<(), PageError> {
        self.surface.set_listeners_enabled(false);

        if let Err(err) = self.write_surface_to_current_page() {
            self.surface.set_listeners_enabled(true);
            return Err(err);
        }
        // Identity is re-read after the flush, not captured at the bounds
        // check
        let Some(id) = self.store.page_at(index).map(|p| p.id) else {
            self.surface.set_listeners_enabled(true);
            return Err(PageError::OutOfBounds {
                index,
                len: self.store.len(),
            });
        };
        if let Err(err) = self.store.delete_page(id) {
            self.surface.set_listeners_enabled(true);
            return Err(err);
        }
        self.load_current_page_into_surface();
        self.surface.set_listeners_enabled(true);
        log::debug!("deleted page {index}");
        Ok(())
    }

    fn reflow_inner<F>(&mut self, run: F) -> Result<bool, PageError>
    where
        F: FnOnce(&mut PageStore) -> Result<bool, PageError>,
    {
        self.surface.set_listeners_enabled(false);

        if let Err(err) = self.write_surface_to_current_page() {
            self.surface.set_listeners_enabled(true);
            return Err(err);
        }
        let moved = match run(&mut self.store) {
            Ok(moved) => moved,
            Err(err) => {
                self.surface.set_listeners_enabled(true);
                return Err(err);
            }
        };
        if moved {
            // The engine touched the current page; the surface must not
            // keep writing its pre-move content back over it
            self.load_current_page_into_surface();
        }
        self.surface.set_listeners_enabled(true);
        Ok(moved)
    }

    /// Convert the surface markup to canonical text and write it into the
    /// current page, validating the write with one retry.
    fn write_surface_to_current_page(&mut self) -> Result<(), PageError> {
        let text = self.surface.plain_text();
        // Freshest snapshot: page identity is read here, at the point of
        // use, never threaded through from an earlier step
        let id = self.store.current_page().id;
        self.store.update_page(id, &text)?;

        let landed =
            |store: &PageStore| store.page(id).map(|p| p.content.as_str()) == Some(text.as_str());
        if !landed(&self.store) {
            log::warn!("write read-back mismatch for page {id:?}, retrying once");
            self.store.update_page(id, &text)?;
            if !landed(&self.store) {
                // Critical, but the editor stays usable with best-known content
                log::error!("write read-back failed twice for page {id:?}, proceeding");
            }
        }
        Ok(())
    }

    fn load_current_page_into_surface(&mut self) {
        let html = convert::text_to_html(self.store.current_content());
        // Wholesale replace so stale fragments never merge into the load
        self.surface.clear();
        self.surface.set_markup(&html);
        self.surface.focus(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory surface recording how the manager drives it
    #[derive(Default)]
    struct FakeSurface {
        html: String,
        caret: usize,
        /// Overrides the caret when a range selection is being simulated
        range: Option<SurfaceSelection>,
        listeners_enabled: bool,
        /// Listener state observed at each set_markup call
        sets_with_listeners: Vec<bool>,
        clear_count: usize,
    }

    impl FakeSurface {
        fn with_html(html: &str) -> Self {
            Self {
                html: html.to_string(),
                listeners_enabled: true,
                ..Default::default()
            }
        }
    }

    impl EditorSurface for FakeSurface {
        fn markup(&self) -> String {
            self.html.clone()
        }

        fn plain_text(&self) -> String {
            convert::html_to_text(&self.html)
        }

        fn set_markup(&mut self, html: &str) {
            self.sets_with_listeners.push(self.listeners_enabled);
            self.html = html.to_string();
        }

        fn clear(&mut self) {
            self.clear_count += 1;
            self.html.clear();
        }

        fn focus(&mut self, position: Option<usize>) {
            if let Some(p) = position {
                self.caret = p;
            }
        }

        fn selection(&self) -> SurfaceSelection {
            self.range.unwrap_or(SurfaceSelection::caret(self.caret))
        }

        fn set_listeners_enabled(&mut self, enabled: bool) {
            self.listeners_enabled = enabled;
        }
    }

    /// Ten characters per line, ten units per line
    struct LineMeasurer {
        page_height: f32,
    }

    impl HeightMeasurer for LineMeasurer {
        fn content_height(&self, text: &str) -> f32 {
            convert::estimate_line_count(text, 10) as f32 * 10.0
        }

        fn available_height(&self, _page_index: usize, _has_title_block: bool) -> f32 {
            self.page_height
        }
    }

    fn manager_with(html: &str) -> PageManager<FakeSurface> {
        PageManager::new(FakeSurface::with_html(html), EditorConfig::default())
    }

    fn eight_lines() -> Vec<String> {
        (0..8).map(|i| format!("line-{i:04}")).collect()
    }

    #[test]
    fn test_navigate_saves_and_loads() {
        let mut m = manager_with("<p>First page text</p>");
        m.add_new_page().unwrap();
        assert_eq!(m.store().current_index(), 1);
        assert_eq!(m.surface().html, "<p></p>");
        assert_eq!(m.store().page_at(0).unwrap().content, "First page text");

        m.surface.html = "<p>Second page text</p>".to_string();
        m.navigate(0).unwrap();
        assert_eq!(m.surface().html, "<p>First page text</p>");
        assert_eq!(m.store().page_at(1).unwrap().content, "Second page text");
    }

    #[test]
    fn test_navigation_determinism() {
        // A -> B, edit B, back to A: A's content is exactly what it was
        let mut m = manager_with("<p>Alpha</p>");
        m.add_new_page().unwrap();
        m.surface.html = "<p>Beta edited</p>".to_string();
        m.navigate(0).unwrap();
        assert_eq!(m.store().current_content(), "Alpha");
        assert_eq!(m.surface().html, "<p>Alpha</p>");
        assert_eq!(m.store().page_at(1).unwrap().content, "Beta edited");
    }

    #[test]
    fn test_rapid_navigation_without_edits_is_lossless() {
        let mut m = manager_with("<p>One</p>");
        m.add_new_page().unwrap();
        m.surface.html = "<p>Two</p>".to_string();
        m.navigate(0).unwrap();

        for _ in 0..3 {
            m.navigate(1).unwrap();
            m.navigate(0).unwrap();
        }
        assert_eq!(m.store().page_at(0).unwrap().content, "One");
        assert_eq!(m.store().page_at(1).unwrap().content, "Two");
    }

    #[test]
    fn test_navigate_out_of_bounds_has_no_side_effects() {
        let mut m = manager_with("<p>Text</p>");
        let version = m.store().version();
        assert_eq!(
            m.navigate(3),
            Err(PageError::OutOfBounds { index: 3, len: 1 })
        );
        assert_eq!(m.store().version(), version);
        assert_eq!(m.surface().html, "<p>Text</p>");
        assert_eq!(m.surface().clear_count, 0);
    }

    #[test]
    fn test_listeners_suspended_during_loads() {
        let mut m = manager_with("<p>Text</p>");
        m.add_new_page().unwrap();
        m.navigate(0).unwrap();
        assert!(m.surface().sets_with_listeners.iter().all(|&on| !on));
        assert!(m.surface().listeners_enabled);
    }

    #[test]
    fn test_add_new_page_at_cap() {
        let mut m = manager_with("<p>Text</p>");
        for _ in 0..5 {
            m.add_new_page().unwrap();
        }
        assert_eq!(m.store().len(), 6);
        assert_eq!(m.add_new_page(), Err(PageError::LimitReached(6)));
        assert_eq!(m.store().len(), 6);
        // The editor stays on its page and remains usable
        assert_eq!(m.store().current_index(), 5);
    }

    #[test]
    fn test_busy_flag_drops_reentrant_calls() {
        let mut m = manager_with("<p>Text</p>");
        m.store_mut().add_page("other");
        m.op_in_progress = true;
        assert_eq!(m.navigate(0), Err(PageError::Busy));
        assert_eq!(m.add_new_page(), Err(PageError::Busy));
        assert_eq!(m.insert_page_break(0), Err(PageError::Busy));
        assert_eq!(m.delete_page(1), Err(PageError::Busy));
        let mut engine = ReflowEngine::default();
        assert_eq!(
            m.check_overflow(&mut engine, &LineMeasurer { page_height: 40.0 }, 0),
            Err(PageError::Busy)
        );
        assert_eq!(
            m.check_reflow(&mut engine, &LineMeasurer { page_height: 40.0 }, 0),
            Err(PageError::Busy)
        );
        m.op_in_progress = false;
        m.navigate(0).unwrap();
    }

    #[test]
    fn test_insert_page_break_scenario() {
        // "Line 1\nLine 2", cursor at offset 6
        let mut m = manager_with("<p>Line 1<br>Line 2</p>");
        m.insert_page_break(6).unwrap();

        assert_eq!(m.store().len(), 2);
        assert_eq!(m.store().page_at(0).unwrap().content, "Line 1\n");
        assert_eq!(m.store().page_at(1).unwrap().content, "Line 2");
        assert_eq!(m.store().current_index(), 1);
        assert_eq!(m.surface().html, "<p>Line 2</p>");
    }

    #[test]
    fn test_insert_page_break_refuses_empty_content() {
        let mut m = manager_with("<p></p>");
        assert_eq!(m.insert_page_break(0), Err(PageError::EmptyContent));
        assert_eq!(m.store().len(), 1);

        let mut m = manager_with("<p>  <br>  </p>");
        assert_eq!(m.insert_page_break(1), Err(PageError::EmptyContent));
    }

    #[test]
    fn test_insert_page_break_refuses_at_cap() {
        let mut m = manager_with("<p>Text</p>");
        for _ in 0..5 {
            m.add_new_page().unwrap();
        }
        m.surface.html = "<p>Last page</p>".to_string();
        assert_eq!(m.insert_page_break(4), Err(PageError::LimitReached(6)));
        assert_eq!(m.store().len(), 6);
    }

    #[test]
    fn test_insert_page_break_at_selection() {
        let mut m = manager_with("<p>Line 1<br>Line 2</p>");
        m.surface.caret = 6;
        m.insert_page_break_at_selection().unwrap();
        assert_eq!(m.store().len(), 2);
        assert_eq!(m.store().page_at(1).unwrap().content, "Line 2");
    }

    #[test]
    fn test_debounce_writes_on_deadline_only() {
        let mut m = manager_with("<p>typed</p>");
        m.note_edit(1000);
        m.tick(1100);
        assert_eq!(m.store().current_content(), "");
        m.tick(1000 + EditorConfig::default().debounce_ms);
        assert_eq!(m.store().current_content(), "typed");
        assert!(!m.has_pending_write());
    }

    #[test]
    fn test_continued_typing_postpones_the_write() {
        let mut m = manager_with("<p>typed more</p>");
        m.note_edit(1000);
        m.note_edit(1200);
        m.tick(1300);
        assert_eq!(m.store().current_content(), "");
        m.tick(1200 + EditorConfig::default().debounce_ms);
        assert_eq!(m.store().current_content(), "typed more");
    }

    #[test]
    fn test_navigation_flushes_pending_write() {
        let mut m = manager_with("<p>One</p>");
        m.add_new_page().unwrap();
        m.surface.html = "<p>Fresh edit</p>".to_string();
        m.note_edit(1000);
        // Navigate immediately, long before the debounce deadline
        m.navigate(0).unwrap();
        assert_eq!(m.store().page_at(1).unwrap().content, "Fresh edit");
        assert!(!m.has_pending_write());
    }

    #[test]
    fn test_stale_timer_cannot_fire_after_navigation() {
        let mut m = manager_with("<p>One</p>");
        m.add_new_page().unwrap();
        m.surface.html = "<p>Two</p>".to_string();
        m.note_edit(1000);
        m.navigate(0).unwrap();

        let version = m.store().version();
        // The host timer armed before the navigation fires late
        m.tick(10_000);
        assert_eq!(m.store().version(), version);
        assert_eq!(m.store().page_at(0).unwrap().content, "One");
    }

    #[test]
    fn test_sync_now_bypasses_debounce() {
        let mut m = manager_with("<p>Immediate</p>");
        m.note_edit(1000);
        m.sync_now();
        assert_eq!(m.store().current_content(), "Immediate");
        assert!(!m.has_pending_write());
    }

    #[test]
    fn test_note_edit_during_operation_is_listener_echo() {
        let mut m = manager_with("<p>Text</p>");
        m.op_in_progress = true;
        m.note_edit(1000);
        assert!(!m.has_pending_write());
    }

    #[test]
    fn test_line_count_estimate() {
        let mut m = manager_with("<p>abc</p>");
        m.sync_now();
        assert_eq!(m.line_count(), 1);
    }

    #[test]
    fn test_selection_break_on_multibyte_content() {
        // Scalar offset 4 is the start of "world" (byte offset 6); a byte
        // interpretation of the caret would land inside the second "é"
        let mut m = manager_with("<p>héé<br>world</p>");
        m.surface.caret = 4;
        m.insert_page_break_at_selection().unwrap();
        assert_eq!(m.store().page_at(0).unwrap().content, "héé\n");
        assert_eq!(m.store().page_at(1).unwrap().content, "world");
    }

    #[test]
    fn test_range_selection_breaks_at_start() {
        // Backwards range: the break lands at the lower offset
        let mut m = manager_with("<p>Line 1<br>Line 2</p>");
        m.surface.range = Some(SurfaceSelection { from: 9, to: 6 });
        m.insert_page_break_at_selection().unwrap();
        assert_eq!(m.store().page_at(0).unwrap().content, "Line 1\n");
        assert_eq!(m.store().page_at(1).unwrap().content, "Line 2");
    }

    #[test]
    fn test_delete_page_preserves_pending_edit() {
        let mut m = manager_with("<p>Keep</p>");
        m.add_new_page().unwrap();
        m.navigate(0).unwrap();
        m.surface.html = "<p>Keep typed</p>".to_string();
        m.note_edit(1000);
        // Deleting the other page lands the edit first
        m.delete_page(1).unwrap();
        assert_eq!(m.store().len(), 1);
        assert_eq!(m.store().current_content(), "Keep typed");
        assert_eq!(m.surface().html, "<p>Keep typed</p>");
        assert!(!m.has_pending_write());
    }

    #[test]
    fn test_delete_current_page_moves_cursor_and_reloads() {
        let mut m = manager_with("<p>First</p>");
        m.add_new_page().unwrap();
        m.delete_page(1).unwrap();
        assert_eq!(m.store().len(), 1);
        assert_eq!(m.store().current_index(), 0);
        assert_eq!(m.surface().html, "<p>First</p>");
    }

    #[test]
    fn test_delete_guards_have_no_side_effects() {
        let mut m = manager_with("<p>Only</p>");
        let version = m.store().version();
        assert_eq!(m.delete_page(0), Err(PageError::LastPage));
        assert_eq!(
            m.delete_page(5),
            Err(PageError::OutOfBounds { index: 5, len: 1 })
        );
        assert_eq!(m.store().version(), version);
    }

    #[test]
    fn test_reload_surface_disarms_pending_timer() {
        let mut m = manager_with("<p>One</p>");
        m.sync_now();
        m.surface.html = "<p>Stale edit</p>".to_string();
        m.note_edit(1000);
        m.reload_surface();
        assert!(!m.has_pending_write());
        assert_eq!(m.surface().html, "<p>One</p>");
        // A host timer from before the reload fires late and does nothing
        m.tick(10_000);
        assert_eq!(m.store().current_content(), "One");
    }

    #[test]
    fn test_overflow_check_keeps_surface_in_sync() {
        let lines = eight_lines();
        let mut m = manager_with(&format!("<p>{}</p>", lines.join("<br>")));
        let mut engine = ReflowEngine::default();
        let moved = m
            .check_overflow(&mut engine, &LineMeasurer { page_height: 40.0 }, 0)
            .unwrap();
        assert!(moved);
        assert_eq!(m.store().len(), 2);
        // The surface was reloaded with exactly the shrunken current page
        assert_eq!(m.surface().plain_text(), m.store().current_content());

        // A debounced write landing after the move must not resurrect the
        // pushed tail on the current page
        m.note_edit(1000);
        m.tick(5000);
        assert!(split::validate_break_integrity(
            &lines.join("\n"),
            &m.store().page_at(0).unwrap().content,
            &m.store().page_at(1).unwrap().content,
        ));
    }

    #[test]
    fn test_overflow_check_flushes_pending_edit_first() {
        let mut m = manager_with("<p>short</p>");
        m.sync_now();
        m.surface.html = format!("<p>{}</p>", eight_lines().join("<br>"));
        m.note_edit(1000);
        let mut engine = ReflowEngine::default();
        let moved = m
            .check_overflow(&mut engine, &LineMeasurer { page_height: 40.0 }, 1001)
            .unwrap();
        assert!(moved);
        assert!(!m.has_pending_write());
        // The freshly typed lines were split, not the stale store content
        assert!(m.store().page_at(0).unwrap().content.starts_with("line-0000"));
        assert!(m.store().page_at(1).unwrap().content.ends_with("line-0007"));
    }

    #[test]
    fn test_reflow_check_reloads_pulled_content() {
        let mut m = manager_with("<p>short</p>");
        m.sync_now();
        m.store_mut().add_page("pulled\n\nstays here");
        let mut engine = ReflowEngine::default();
        let moved = m
            .check_reflow(&mut engine, &LineMeasurer { page_height: 100.0 }, 0)
            .unwrap();
        assert!(moved);
        assert_eq!(m.store().current_content(), "short\n\npulled");
        assert_eq!(m.surface().plain_text(), "short\n\npulled");
        assert_eq!(m.store().page_at(1).unwrap().content, "stays here");
    }
}
