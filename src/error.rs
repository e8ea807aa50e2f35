//! Error taxonomy for page operations
//!
//! Every error here is local to the operation that raised it; nothing in
//! this crate panics or requires the host to restart. Limit-style errors
//! are user-actionable messages, `IntegrityFailure` is the hard abort gate
//! for splits, and `Busy` is the silent drop of a re-entrant call.

use crate::store::PageId;
use thiserror::Error;

/// Errors raised by the page store, manager and reflow engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// The story already has the maximum number of pages
    #[error("page limit reached: a story can have at most {0} pages")]
    LimitReached(usize),

    /// A story must always keep at least one page
    #[error("cannot delete the last remaining page")]
    LastPage,

    /// The page id does not match any live page
    #[error("no page with id {0:?}")]
    UnknownPage(PageId),

    /// Navigation target outside the collection
    #[error("page index {index} out of bounds (have {len} pages)")]
    OutOfBounds { index: usize, len: usize },

    /// Page break requested on empty or whitespace-only content
    #[error("cannot insert a page break into empty content")]
    EmptyContent,

    /// A split would lose non-whitespace content; nothing was mutated
    #[error("could not preserve content across the page break")]
    IntegrityFailure,

    /// Another navigation or add-page operation is still in progress
    #[error("operation dropped: another page operation is in progress")]
    Busy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PageError::LimitReached(6).to_string(),
            "page limit reached: a story can have at most 6 pages"
        );
        assert_eq!(
            PageError::OutOfBounds { index: 4, len: 2 }.to_string(),
            "page index 4 out of bounds (have 2 pages)"
        );
    }
}
