//! The editing-surface boundary
//!
//! The rich-text surface is an external collaborator: it emits current
//! markup and accepts wholesale document replacement. The pagination core
//! never reaches into it beyond this trait.

/// Selection descriptor.
///
/// Offsets count Unicode scalar values over the page's canonical plain
/// text (the [`plain_text`] rendition), not bytes and not positions in the
/// markup. `from` and `to` coincide for a caret; either order is accepted
/// for a range.
///
/// [`plain_text`]: EditorSurface::plain_text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSelection {
    pub from: usize,
    pub to: usize,
}

impl SurfaceSelection {
    /// Collapsed selection at a single position
    pub fn caret(position: usize) -> Self {
        Self {
            from: position,
            to: position,
        }
    }
}

/// Contract with the rich-text editing surface
pub trait EditorSurface {
    /// Current document markup (HTML)
    fn markup(&self) -> String;

    /// The surface's own plain-text rendition of the document
    fn plain_text(&self) -> String;

    /// Replace the document markup
    fn set_markup(&mut self, html: &str);

    /// Empty the document entirely
    fn clear(&mut self);

    /// Focus the surface, optionally placing the caret
    fn focus(&mut self, position: Option<usize>);

    /// Current selection, in scalar offsets over [`plain_text`]
    ///
    /// [`plain_text`]: EditorSurface::plain_text
    fn selection(&self) -> SurfaceSelection;

    /// Detach or reattach change-notification listeners.
    ///
    /// The manager suspends listeners while it loads content so a
    /// programmatic document replace is never mistaken for a user edit.
    fn set_listeners_enabled(&mut self, enabled: bool);
}
