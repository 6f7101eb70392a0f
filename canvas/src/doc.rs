//! Document model: text layers, their properties, and the ordered store.
//!
//! This module defines the text layer (`TextLayer`), its style enums, the
//! default style bundle new layers start from (`LayerDefaults`), a single-field
//! update type (`LayerField`), and the runtime store that owns all live layers
//! (`LayerStore`).
//!
//! The store keeps layers in an arena keyed by id and the stacking order in a
//! separate id list, so a drag that rewrites a position every pointer move
//! touches one entry instead of copying the collection. Numeric fields are
//! clamped here, at mutation time; callers never need to pre-validate.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{
    CENTER, FALLBACK_LAYER_NAME, FONT_SIZE_RANGE, LETTER_SPACING_RANGE, LINE_HEIGHT_RANGE, PADDING_RANGE,
    UNIT_RANGE, clamp_to,
};

/// Unique identifier for a text layer.
pub type LayerId = Uuid;

/// Font weight choices offered by the property panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Regular,
    Semibold,
    Bold,
}

impl FontWeight {
    /// Numeric CSS weight.
    #[must_use]
    pub fn css_weight(self) -> u16 {
        match self {
            Self::Regular => 400,
            Self::Semibold => 600,
            Self::Bold => 700,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

impl FontStyle {
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
        }
    }

    /// The other style; used by the italic toggle.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Italic,
            Self::Italic => Self::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// One styled text block on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    /// Stable unique identifier.
    pub id: LayerId,
    /// Label shown in the layer list.
    pub name: String,
    /// Content rendered on the canvas.
    pub text: String,
    /// Left edge as a fraction of the frame width.
    pub x: f64,
    /// Top edge as a fraction of the frame height.
    pub y: f64,
    /// Box width as a fraction of the frame width.
    pub width: f64,
    /// Font size in design pixels.
    pub font_size: f64,
    /// Text color as a CSS hex string.
    pub color: String,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_align: TextAlign,
    /// Render the text upper-cased.
    pub uppercase: bool,
    /// Box background color as a CSS hex string.
    pub background_color: String,
    /// Box background alpha in `[0,1]`.
    pub background_opacity: f64,
    /// Horizontal padding in design pixels.
    pub padding: f64,
    /// Tracking in `em`.
    pub letter_spacing: f64,
    /// Line height multiplier.
    pub line_height: f64,
    /// Shadow intensity in `[0,1]`.
    pub shadow: f64,
}

/// Style bundle applied to every new layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDefaults {
    pub text: String,
    pub width: f64,
    pub font_size: f64,
    pub color: String,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_align: TextAlign,
    pub uppercase: bool,
    pub background_color: String,
    pub background_opacity: f64,
    pub padding: f64,
    pub letter_spacing: f64,
    pub line_height: f64,
    pub shadow: f64,
}

impl Default for LayerDefaults {
    fn default() -> Self {
        Self {
            text: "New creative text".to_owned(),
            width: 0.6,
            font_size: 64.0,
            color: "#ffffff".to_owned(),
            font_family: "Poppins".to_owned(),
            font_weight: FontWeight::Semibold,
            font_style: FontStyle::Normal,
            text_align: TextAlign::Center,
            uppercase: false,
            background_color: "#000000".to_owned(),
            background_opacity: 0.0,
            padding: 24.0,
            letter_spacing: 0.0,
            line_height: 1.1,
            shadow: 0.4,
        }
    }
}

/// A single-field update for a text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum LayerField {
    Name(String),
    Text(String),
    X(f64),
    Y(f64),
    Width(f64),
    FontSize(f64),
    Color(String),
    FontFamily(String),
    FontWeight(FontWeight),
    FontStyle(FontStyle),
    TextAlign(TextAlign),
    Uppercase(bool),
    BackgroundColor(String),
    BackgroundOpacity(f64),
    Padding(f64),
    LetterSpacing(f64),
    LineHeight(f64),
    Shadow(f64),
}

impl LayerField {
    /// The numeric payload, if this update carries one.
    fn number(&self) -> Option<f64> {
        match self {
            Self::X(v)
            | Self::Y(v)
            | Self::Width(v)
            | Self::FontSize(v)
            | Self::BackgroundOpacity(v)
            | Self::Padding(v)
            | Self::LetterSpacing(v)
            | Self::LineHeight(v)
            | Self::Shadow(v) => Some(*v),
            _ => None,
        }
    }
}

impl TextLayer {
    fn from_defaults(id: LayerId, name: String, defaults: &LayerDefaults) -> Self {
        Self {
            id,
            name,
            text: defaults.text.clone(),
            x: CENTER,
            y: CENTER,
            width: clamp_to(defaults.width, &UNIT_RANGE),
            font_size: clamp_to(defaults.font_size, &FONT_SIZE_RANGE),
            color: defaults.color.clone(),
            font_family: defaults.font_family.clone(),
            font_weight: defaults.font_weight,
            font_style: defaults.font_style,
            text_align: defaults.text_align,
            uppercase: defaults.uppercase,
            background_color: defaults.background_color.clone(),
            background_opacity: clamp_to(defaults.background_opacity, &UNIT_RANGE),
            padding: clamp_to(defaults.padding, &PADDING_RANGE),
            letter_spacing: clamp_to(defaults.letter_spacing, &LETTER_SPACING_RANGE),
            line_height: clamp_to(defaults.line_height, &LINE_HEIGHT_RANGE),
            shadow: clamp_to(defaults.shadow, &UNIT_RANGE),
        }
    }

    /// Apply one field, clamping numeric values into their allowed range.
    fn apply(&mut self, field: LayerField) {
        match field {
            LayerField::Name(name) => {
                self.name = if name.is_empty() { FALLBACK_LAYER_NAME.to_owned() } else { name };
            }
            LayerField::Text(text) => self.text = text,
            LayerField::X(v) => self.x = clamp_to(v, &UNIT_RANGE),
            LayerField::Y(v) => self.y = clamp_to(v, &UNIT_RANGE),
            LayerField::Width(v) => self.width = clamp_to(v, &UNIT_RANGE),
            LayerField::FontSize(v) => self.font_size = clamp_to(v, &FONT_SIZE_RANGE),
            LayerField::Color(c) => self.color = c,
            LayerField::FontFamily(f) => self.font_family = f,
            LayerField::FontWeight(w) => self.font_weight = w,
            LayerField::FontStyle(s) => self.font_style = s,
            LayerField::TextAlign(a) => self.text_align = a,
            LayerField::Uppercase(u) => self.uppercase = u,
            LayerField::BackgroundColor(c) => self.background_color = c,
            LayerField::BackgroundOpacity(v) => self.background_opacity = clamp_to(v, &UNIT_RANGE),
            LayerField::Padding(v) => self.padding = clamp_to(v, &PADDING_RANGE),
            LayerField::LetterSpacing(v) => self.letter_spacing = clamp_to(v, &LETTER_SPACING_RANGE),
            LayerField::LineHeight(v) => self.line_height = clamp_to(v, &LINE_HEIGHT_RANGE),
            LayerField::Shadow(v) => self.shadow = clamp_to(v, &UNIT_RANGE),
        }
    }
}

/// Ordered store of text layers.
///
/// Index `i` of [`LayerStore::ids`] renders with stacking order `i + 1`; later
/// layers paint on top.
#[derive(Debug, Default)]
pub struct LayerStore {
    layers: HashMap<LayerId, TextLayer>,
    order: Vec<LayerId>,
}

impl LayerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a centered layer styled from `defaults` and return its id.
    pub fn add(&mut self, defaults: &LayerDefaults) -> LayerId {
        let mut id = Uuid::new_v4();
        while self.layers.contains_key(&id) {
            id = Uuid::new_v4();
        }
        let name = format!("Text {}", self.order.len() + 1);
        self.layers.insert(id, TextLayer::from_defaults(id, name, defaults));
        self.order.push(id);
        id
    }

    /// Replace one field of a layer. Returns `false` if the id is unknown or
    /// the value is a non-finite number.
    pub fn update(&mut self, id: &LayerId, field: LayerField) -> bool {
        if field.number().is_some_and(|v| !v.is_finite()) {
            return false;
        }
        let Some(layer) = self.layers.get_mut(id) else {
            return false;
        };
        layer.apply(field);
        true
    }

    /// Move a layer's anchor in one write, clamping both axes to `[0,1]`.
    pub fn set_position(&mut self, id: &LayerId, x: f64, y: f64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        let Some(layer) = self.layers.get_mut(id) else {
            return false;
        };
        layer.x = clamp_to(x, &UNIT_RANGE);
        layer.y = clamp_to(y, &UNIT_RANGE);
        true
    }

    /// Remove a layer by id, returning it if it was present.
    pub fn remove(&mut self, id: &LayerId) -> Option<TextLayer> {
        let removed = self.layers.remove(id)?;
        self.order.retain(|o| o != id);
        Some(removed)
    }

    /// Swap a layer with the one above it. No-op for the topmost layer.
    pub fn bring_forward(&mut self, id: &LayerId) -> bool {
        match self.index_of(id) {
            Some(i) if i + 1 < self.order.len() => {
                self.order.swap(i, i + 1);
                true
            }
            _ => false,
        }
    }

    /// Swap a layer with the one below it. No-op for the bottom layer.
    pub fn send_backward(&mut self, id: &LayerId) -> bool {
        match self.index_of(id) {
            Some(i) if i > 0 => {
                self.order.swap(i, i - 1);
                true
            }
            _ => false,
        }
    }

    /// Drop every layer.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.order.clear();
    }

    #[must_use]
    pub fn get(&self, id: &LayerId) -> Option<&TextLayer> {
        self.layers.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &LayerId) -> bool {
        self.layers.contains_key(id)
    }

    /// Layers bottom-first, i.e. in paint order.
    pub fn ordered(&self) -> impl Iterator<Item = &TextLayer> {
        self.order.iter().filter_map(|id| self.layers.get(id))
    }

    /// Ids bottom-first.
    #[must_use]
    pub fn ids(&self) -> &[LayerId] {
        &self.order
    }

    #[must_use]
    pub fn index_of(&self, id: &LayerId) -> Option<usize> {
        self.order.iter().position(|o| o == id)
    }

    /// 1-based stacking order (the CSS `z-index` the layer paints with).
    #[must_use]
    pub fn stacking_order(&self, id: &LayerId) -> Option<usize> {
        self.index_of(id).map(|i| i + 1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
