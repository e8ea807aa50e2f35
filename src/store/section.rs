//! Section projection for the downstream image renderer

use crate::store::PageId;
use serde::{Deserialize, Serialize};

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Author/editor text settings, consumed read-only by the pagination core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,
    pub alignment: Alignment,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "serif".to_string(),
            font_size: 16.0,
            line_height: 1.5,
            alignment: Alignment::Left,
        }
    }
}

/// A page re-expressed with a fixed text style, consumed read-only once per
/// export action.
///
/// Sections are a projection of pages, never independently owned state:
/// they are recomputed on demand and regenerating them is lossless for
/// content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: PageId,
    pub content: String,
    pub style: TextStyle,
}

// serde for PageId so Section rows serialize as plain numbers
impl Serialize for PageId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for PageId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(PageId)
    }
}
