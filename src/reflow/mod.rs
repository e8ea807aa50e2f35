//! Best-effort auto-pagination heuristic
//!
//! Compares measured content height against the available page height and
//! pushes overflowing tail content to the next page, or pulls a prefix of
//! the next page back when there is spare room. Break points are
//! approximate (snapped to Unicode line-break opportunities); the only
//! hard rule is that no move commits without passing the split integrity
//! check, and that push and pull never oscillate against each other.

use crate::error::PageError;
use crate::split::{self, SplitResult};
use crate::store::{PageId, PageStore};
use rustc_hash::FxHashMap;

/// Host-provided measurement of rendered text
pub trait HeightMeasurer {
    /// Rendered height of the given text, in the host's units
    fn content_height(&self, text: &str) -> f32;

    /// Usable height of a page, accounting for a non-editable title block
    /// occupying space on the first page
    fn available_height(&self, page_index: usize, has_title_block: bool) -> f32;
}

/// Overflow/reflow decision engine
pub struct ReflowEngine {
    has_title_block: bool,
    /// Pushes and pulls within this window refuse to reverse each other
    oscillation_window_ms: u64,
    /// Page id pushed into -> time of push
    recent_pushes: FxHashMap<PageId, u64>,
    /// Page id pulled into -> time of pull
    recent_pulls: FxHashMap<PageId, u64>,
}

impl Default for ReflowEngine {
    fn default() -> Self {
        Self::new(false, 1000)
    }
}

impl ReflowEngine {
    pub fn new(has_title_block: bool, oscillation_window_ms: u64) -> Self {
        Self {
            has_title_block,
            oscillation_window_ms,
            recent_pushes: FxHashMap::default(),
            recent_pulls: FxHashMap::default(),
        }
    }

    fn within_window(&self, map: &FxHashMap<PageId, u64>, id: PageId, now_ms: u64) -> bool {
        map.get(&id)
            .is_some_and(|&t| now_ms.saturating_sub(t) < self.oscillation_window_ms)
    }

    /// Record a move and drop entries the window no longer covers. Page
    /// ids are never reused, so without the prune a long session grows the
    /// maps without bound.
    fn record(map: &mut FxHashMap<PageId, u64>, id: PageId, now_ms: u64, window_ms: u64) {
        map.retain(|_, t| now_ms.saturating_sub(*t) < window_ms);
        map.insert(id, now_ms);
    }

    #[cfg(test)]
    fn tracked_entries(&self) -> usize {
        self.recent_pushes.len() + self.recent_pulls.len()
    }

    /// Push overflowing tail content of the current page onto the next one.
    ///
    /// Returns `Ok(true)` when content moved. Refuses (returns `Ok(false)`)
    /// when nothing overflows, when the page cap blocks a new page, or when
    /// the current page received a pull within the oscillation window.
    pub fn check_overflow(
        &mut self,
        store: &mut PageStore,
        measurer: &impl HeightMeasurer,
        now_ms: u64,
    ) -> Result<bool, PageError> {
        let index = store.current_index();
        let current_id = store.current_page().id;
        let content = store.current_content().to_string();
        if content.trim().is_empty() {
            return Ok(false);
        }
        if self.within_window(&self.recent_pulls, current_id, now_ms) {
            return Ok(false);
        }

        let available = measurer.available_height(index, self.has_title_block);
        let height = measurer.content_height(&content);
        if height <= available || height <= 0.0 {
            return Ok(false);
        }

        // Aim the seam at the character offset proportional to the visible
        // share of the content, snapped to a legal break opportunity
        let ratio = (available / height).clamp(0.0, 1.0);
        let target = (content.len() as f32 * ratio) as usize;
        let seam = break_opportunity_near(&content, target);

        let SplitResult { before, after } = split::split_at(&content, seam);
        if before.trim().is_empty() || after.trim().is_empty() {
            // Degenerate seam; better an overflowing page than an empty one
            return Ok(false);
        }
        if !split::validate_break_integrity(&content, &before, &after) {
            return Err(PageError::IntegrityFailure);
        }

        let next_page = store.page_at(index + 1).map(|p| (p.id, p.content.clone()));
        let next_id = match next_page {
            Some((next_id, next_content)) => {
                let merged = if next_content.is_empty() {
                    after
                } else {
                    format!("{after}\n\n{next_content}")
                };
                store.update_page(next_id, &merged)?;
                next_id
            }
            None => {
                if !store.add_page(&after) {
                    log::debug!("overflow push refused: page cap reached");
                    return Ok(false);
                }
                match store.page_at(index + 1) {
                    Some(p) => p.id,
                    None => return Ok(false),
                }
            }
        };

        // The tail landed safely; now shrink the current page
        store.update_page(current_id, &before)?;
        Self::record(
            &mut self.recent_pushes,
            next_id,
            now_ms,
            self.oscillation_window_ms,
        );
        log::debug!("overflow: pushed tail of page {index} to page {}", index + 1);
        Ok(true)
    }

    /// Pull the leading paragraph of the next page back into the current
    /// page when there is spare vertical room for it.
    ///
    /// Refuses to pull content pushed into that page within the
    /// oscillation window.
    pub fn check_reflow(
        &mut self,
        store: &mut PageStore,
        measurer: &impl HeightMeasurer,
        now_ms: u64,
    ) -> Result<bool, PageError> {
        let index = store.current_index();
        let current_id = store.current_page().id;
        let Some(next) = store.page_at(index + 1) else {
            return Ok(false);
        };
        if next.is_blank() {
            return Ok(false);
        }
        let next_id = next.id;
        let next_content = next.content.clone();
        if self.within_window(&self.recent_pushes, next_id, now_ms) {
            return Ok(false);
        }

        let current = store.current_content().to_string();
        let available = measurer.available_height(index, self.has_title_block);

        let (prefix, rest) = match next_content.split_once("\n\n") {
            Some((p, r)) => (p.to_string(), r.to_string()),
            None => (next_content.clone(), String::new()),
        };
        if prefix.trim().is_empty() {
            return Ok(false);
        }

        let merged = if current.trim().is_empty() {
            prefix
        } else {
            format!("{current}\n\n{prefix}")
        };
        if measurer.content_height(&merged) > available {
            return Ok(false);
        }

        let whole = format!("{current}\n\n{next_content}");
        if !split::validate_break_integrity(&whole, &merged, &rest) {
            return Err(PageError::IntegrityFailure);
        }

        store.update_page(current_id, &merged)?;
        store.update_page(next_id, &rest)?;
        Self::record(
            &mut self.recent_pulls,
            current_id,
            now_ms,
            self.oscillation_window_ms,
        );
        log::debug!("reflow: pulled prefix of page {} into page {index}", index + 1);
        Ok(true)
    }
}

/// Closest legal break offset at or before `target`, falling back to the
/// first opportunity after it.
fn break_opportunity_near(text: &str, target: usize) -> usize {
    let mut best_before = 0;
    let mut first_after = text.len();
    for (offset, _) in unicode_linebreak::linebreaks(text) {
        if offset == 0 || offset >= text.len() {
            continue;
        }
        if offset <= target {
            best_before = offset;
        } else {
            first_after = offset;
            break;
        }
    }
    if best_before > 0 {
        best_before
    } else {
        first_after
    }
}
