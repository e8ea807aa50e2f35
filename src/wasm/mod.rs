//! WASM bindings for the pagination core
//!
//! The browser host supplies the editing surface as a set of JS callbacks
//! and pumps `tick()` from its own timer; all pagination state lives on the
//! Rust side.

use crate::manager::{EditorSurface, PageManager, SurfaceSelection};
use crate::reflow::{HeightMeasurer, ReflowEngine};
use crate::store::TextStyle;
use crate::{convert, EditorConfig, PageError};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Editing-surface adapter over JS callbacks
pub struct JsSurface {
    get_markup: js_sys::Function,
    set_markup: js_sys::Function,
    clear: js_sys::Function,
    focus: js_sys::Function,
    get_selection: js_sys::Function,
    set_listeners_enabled: js_sys::Function,
}

impl EditorSurface for JsSurface {
    fn markup(&self) -> String {
        self.get_markup
            .call0(&JsValue::NULL)
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default()
    }

    fn plain_text(&self) -> String {
        convert::html_to_text(&self.markup())
    }

    fn set_markup(&mut self, html: &str) {
        let _ = self.set_markup.call1(&JsValue::NULL, &JsValue::from_str(html));
    }

    fn clear(&mut self) {
        let _ = self.clear.call0(&JsValue::NULL);
    }

    fn focus(&mut self, position: Option<usize>) {
        let pos = match position {
            Some(p) => JsValue::from_f64(p as f64),
            None => JsValue::NULL,
        };
        let _ = self.focus.call1(&JsValue::NULL, &pos);
    }

    fn selection(&self) -> SurfaceSelection {
        // Expects `{ from, to }` counting Unicode scalar values over the
        // page's plain text; anything else collapses to offset 0
        let value = self.get_selection.call0(&JsValue::NULL).unwrap_or(JsValue::NULL);
        let field = |name: &str| {
            js_sys::Reflect::get(&value, &JsValue::from_str(name))
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0) as usize
        };
        SurfaceSelection {
            from: field("from"),
            to: field("to"),
        }
    }

    fn set_listeners_enabled(&mut self, enabled: bool) {
        let _ = self
            .set_listeners_enabled
            .call1(&JsValue::NULL, &JsValue::from_bool(enabled));
    }
}

/// Height measurement delegated to the browser layout engine
struct JsMeasurer {
    content_height: js_sys::Function,
    available_height: js_sys::Function,
}

impl HeightMeasurer for JsMeasurer {
    fn content_height(&self, text: &str) -> f32 {
        self.content_height
            .call1(&JsValue::NULL, &JsValue::from_str(text))
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as f32
    }

    fn available_height(&self, page_index: usize, has_title_block: bool) -> f32 {
        self.available_height
            .call2(
                &JsValue::NULL,
                &JsValue::from_f64(page_index as f64),
                &JsValue::from_bool(has_title_block),
            )
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(f32::MAX as f64) as f32
    }
}

fn to_js(err: PageError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Get current timestamp in milliseconds
fn now_ms() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// WASM-exposed story editor wrapper
#[wasm_bindgen]
pub struct WasmStoryEditor {
    manager: PageManager<JsSurface>,
    reflow: ReflowEngine,
    measurer: Option<JsMeasurer>,
    style: TextStyle,
}

#[wasm_bindgen]
impl WasmStoryEditor {
    /// Create an editor over the host's surface callbacks
    #[wasm_bindgen(constructor)]
    pub fn new(
        get_markup: js_sys::Function,
        set_markup: js_sys::Function,
        clear: js_sys::Function,
        focus: js_sys::Function,
        get_selection: js_sys::Function,
        set_listeners_enabled: js_sys::Function,
    ) -> Self {
        let surface = JsSurface {
            get_markup,
            set_markup,
            clear,
            focus,
            get_selection,
            set_listeners_enabled,
        };
        Self {
            manager: PageManager::new(surface, EditorConfig::default()),
            reflow: ReflowEngine::default(),
            measurer: None,
            style: TextStyle::default(),
        }
    }

    /// Install the host's height-measurement callbacks and title flag
    #[wasm_bindgen(js_name = setMeasurer)]
    pub fn set_measurer(
        &mut self,
        content_height: js_sys::Function,
        available_height: js_sys::Function,
        has_title_block: bool,
    ) {
        self.measurer = Some(JsMeasurer {
            content_height,
            available_height,
        });
        self.reflow = ReflowEngine::new(has_title_block, 1000);
    }

    /// Record a user edit (arms the trailing debounce)
    #[wasm_bindgen(js_name = noteEdit)]
    pub fn note_edit(&mut self) {
        self.manager.note_edit(now_ms());
    }

    /// Timer pump; call from a host interval
    pub fn tick(&mut self) {
        self.manager.tick(now_ms());
    }

    /// Write the surface content to the store immediately
    #[wasm_bindgen(js_name = syncNow)]
    pub fn sync_now(&mut self) {
        self.manager.sync_now();
    }

    /// Navigate to a page index
    pub fn navigate(&mut self, index: usize) -> Result<(), JsValue> {
        self.manager.navigate(index).map_err(to_js)
    }

    /// Append an empty page and navigate to it; returns its index
    #[wasm_bindgen(js_name = addNewPage)]
    pub fn add_new_page(&mut self) -> Result<usize, JsValue> {
        self.manager.add_new_page().map_err(to_js)
    }

    /// Split the current page at a plain-text offset
    #[wasm_bindgen(js_name = insertPageBreak)]
    pub fn insert_page_break(&mut self, cursor: usize) -> Result<(), JsValue> {
        self.manager.insert_page_break(cursor).map_err(to_js)
    }

    /// Split the current page at the surface's caret
    #[wasm_bindgen(js_name = insertPageBreakAtSelection)]
    pub fn insert_page_break_at_selection(&mut self) -> Result<(), JsValue> {
        self.manager.insert_page_break_at_selection().map_err(to_js)
    }

    /// Delete the page at an index; pending edits are saved first and the
    /// editor reloads the page the cursor lands on
    #[wasm_bindgen(js_name = deletePage)]
    pub fn delete_page(&mut self, index: usize) -> Result<(), JsValue> {
        self.manager.delete_page(index).map_err(to_js)
    }

    /// Reorder a page
    #[wasm_bindgen(js_name = movePage)]
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), JsValue> {
        self.manager.store_mut().move_page(from, to).map_err(to_js)
    }

    /// Reload the current page into the surface after host-side changes
    /// made outside the editor, such as importing content
    #[wasm_bindgen(js_name = reloadSurface)]
    pub fn reload_surface(&mut self) {
        self.manager.reload_surface();
    }

    /// Run the overflow check; returns true when content moved.
    ///
    /// The surface is flushed before the check and reloaded after a move,
    /// so the editor always shows what the current page actually holds.
    #[wasm_bindgen(js_name = checkOverflow)]
    pub fn check_overflow(&mut self) -> Result<bool, JsValue> {
        let Some(measurer) = &self.measurer else {
            return Ok(false);
        };
        self.manager
            .check_overflow(&mut self.reflow, measurer, now_ms())
            .map_err(to_js)
    }

    /// Run the reflow (pull-back) check; returns true when content moved
    #[wasm_bindgen(js_name = checkReflow)]
    pub fn check_reflow(&mut self) -> Result<bool, JsValue> {
        let Some(measurer) = &self.measurer else {
            return Ok(false);
        };
        self.manager
            .check_reflow(&mut self.reflow, measurer, now_ms())
            .map_err(to_js)
    }

    /// Number of pages
    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.manager.store().len()
    }

    /// Index of the page the editor is on
    #[wasm_bindgen(js_name = getCurrentPageIndex)]
    pub fn get_current_page_index(&self) -> usize {
        self.manager.store().current_index()
    }

    /// Canonical plain text of the current page
    #[wasm_bindgen(js_name = getCurrentPageContent)]
    pub fn get_current_page_content(&self) -> String {
        self.manager.store().current_content().to_string()
    }

    /// Whether the page cap has been reached
    #[wasm_bindgen(js_name = isAtCapacity)]
    pub fn is_at_capacity(&self) -> bool {
        self.manager.store().is_at_capacity()
    }

    /// Store mutation counter; the host can skip repaints when unchanged
    pub fn version(&self) -> f64 {
        self.manager.store().version() as f64
    }

    /// Approximate display line count of the current page
    #[wasm_bindgen(js_name = getLineCount)]
    pub fn get_line_count(&self) -> usize {
        self.manager.line_count()
    }

    /// Update the author text settings used by the Section projection
    #[wasm_bindgen(js_name = setTextStyle)]
    pub fn set_text_style(&mut self, style_json: &str) -> Result<(), JsValue> {
        self.style = serde_json::from_str(style_json)
            .map_err(|e| JsValue::from_str(&format!("invalid text style: {e}")))?;
        Ok(())
    }

    /// Page list for the host UI (JSON)
    #[wasm_bindgen(js_name = getPages)]
    pub fn get_pages(&self) -> String {
        let store = self.manager.store();
        let pages: Vec<PageInfo> = store
            .iter()
            .enumerate()
            .map(|(index, p)| PageInfo {
                index,
                id: p.id.0,
                content: p.content.clone(),
                is_current: index == store.current_index(),
                background_template: p.background_template.clone(),
            })
            .collect();
        serde_json::to_string(&pages).unwrap_or_else(|_| "[]".to_string())
    }

    /// Section projection for the image renderer (JSON)
    #[wasm_bindgen(js_name = getSections)]
    pub fn get_sections(&self) -> String {
        let sections = self.manager.store().sections(&self.style);
        serde_json::to_string(&sections).unwrap_or_else(|_| "[]".to_string())
    }

    /// Whole story content, pages joined by paragraph boundaries
    #[wasm_bindgen(js_name = getCombinedContent)]
    pub fn get_combined_content(&self) -> String {
        self.manager.store().combined_content()
    }

    /// Attach or clear a page's background template reference
    #[wasm_bindgen(js_name = setBackgroundTemplate)]
    pub fn set_background_template(
        &mut self,
        index: usize,
        template: Option<String>,
    ) -> Result<(), JsValue> {
        let store = self.manager.store();
        let id = store
            .page_at(index)
            .map(|p| p.id)
            .ok_or_else(|| {
                to_js(PageError::OutOfBounds {
                    index,
                    len: store.len(),
                })
            })?;
        self.manager
            .store_mut()
            .set_background_template(id, template)
            .map_err(to_js)
    }
}

/// Serializable page row for the host UI
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub index: usize,
    pub id: u64,
    pub content: String,
    pub is_current: bool,
    pub background_template: Option<String>,
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    fn noop() -> js_sys::Function {
        js_sys::Function::new_no_args("")
    }

    #[wasm_bindgen_test]
    fn test_editor_over_noop_callbacks() {
        let mut editor = WasmStoryEditor::new(noop(), noop(), noop(), noop(), noop(), noop());
        assert_eq!(editor.get_page_count(), 1);
        assert_eq!(editor.get_current_page_index(), 0);

        editor.add_new_page().unwrap();
        assert_eq!(editor.get_page_count(), 2);
        assert_eq!(editor.get_current_page_index(), 1);

        editor.navigate(0).unwrap();
        assert_eq!(editor.get_current_page_index(), 0);
        assert!(editor.navigate(9).is_err());
    }
}
