//! Resolved per-layer styles: what a layer looks like at the current scale.
//!
//! Normalized attributes (`x`, `y`, `width`) pass through as frame fractions.
//! Design-space pixel attributes are multiplied by the frame [`Scale`]: font
//! size and padding by `scale.x`, shadow geometry by `scale.y`. DOM hosts can
//! apply [`LayerStyle::css`] directly; the 2D-canvas rasterizer reads the
//! numeric fields.

#[cfg(test)]
#[path = "style_test.rs"]
mod style_test;

use std::borrow::Cow;

use serde::Serialize;

use crate::consts::{SHADOW_ALPHA, SHADOW_BLUR_PX, SHADOW_OFFSET_PX, UNIT_RANGE, VERTICAL_PADDING_RATIO, clamp_to};
use crate::doc::{LayerId, LayerStore, TextLayer};
use crate::geometry::Scale;
use crate::selection::SelectionModel;

/// Drop shadow in rendered pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextShadow {
    pub offset_y: f64,
    pub blur: f64,
    pub alpha: f64,
}

impl TextShadow {
    /// The shadow for `intensity` in `[0,1]`, or `None` when it is zero.
    #[must_use]
    pub fn for_intensity(intensity: f64, scale_y: f64) -> Option<Self> {
        if intensity <= 0.0 {
            return None;
        }
        Some(Self {
            offset_y: SHADOW_OFFSET_PX * intensity * scale_y,
            blur: SHADOW_BLUR_PX * intensity * scale_y,
            alpha: SHADOW_ALPHA * intensity,
        })
    }

    /// Black shadow color with this shadow's alpha.
    #[must_use]
    pub fn color(&self) -> String {
        format!("rgba(0,0,0,{})", self.alpha)
    }

    #[must_use]
    pub fn css(&self) -> String {
        format!("0 {}px {}px {}", self.offset_y, self.blur, self.color())
    }

    /// The same shadow in device pixels. Canvas shadow offset and blur
    /// ignore the context transform, so a scaled export must scale them.
    #[must_use]
    pub fn at_pixel_ratio(self, pixel_ratio: f64) -> Self {
        Self { offset_y: self.offset_y * pixel_ratio, blur: self.blur * pixel_ratio, ..self }
    }
}

/// A text layer resolved against the current scale and stacking order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerStyle {
    pub id: LayerId,
    /// 1-based paint order.
    pub z_index: usize,
    pub selected: bool,
    /// Frame fractions.
    pub left: f64,
    pub top: f64,
    pub width: f64,
    /// Rendered pixels.
    pub font_size: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub letter_spacing_em: f64,
    pub line_height: f64,
    pub font_family: String,
    pub font_weight: u16,
    pub font_style: &'static str,
    pub text_align: &'static str,
    pub uppercase: bool,
    pub color: String,
    /// Box background as a CSS `rgba()`.
    pub background: String,
    pub shadow: Option<TextShadow>,
    pub text: String,
}

impl LayerStyle {
    /// Resolve `layer` at `scale`.
    #[must_use]
    pub fn resolve(layer: &TextLayer, scale: Scale, z_index: usize, selected: bool) -> Self {
        let padding_x = layer.padding * scale.x;
        Self {
            id: layer.id,
            z_index,
            selected,
            left: layer.x,
            top: layer.y,
            width: layer.width,
            font_size: layer.font_size * scale.x,
            padding_x,
            padding_y: padding_x * VERTICAL_PADDING_RATIO,
            letter_spacing_em: layer.letter_spacing,
            line_height: layer.line_height,
            font_family: layer.font_family.clone(),
            font_weight: layer.font_weight.css_weight(),
            font_style: layer.font_style.as_css(),
            text_align: layer.text_align.as_css(),
            uppercase: layer.uppercase,
            color: layer.color.clone(),
            background: hex_to_rgba(&layer.background_color, layer.background_opacity),
            shadow: TextShadow::for_intensity(layer.shadow, scale.y),
            text: layer.text.clone(),
        }
    }

    /// Text as painted, honoring the uppercase flag.
    #[must_use]
    pub fn display_text(&self) -> Cow<'_, str> {
        if self.uppercase { Cow::Owned(self.text.to_uppercase()) } else { Cow::Borrowed(&self.text) }
    }

    /// CSS `font` shorthand for a 2D context.
    #[must_use]
    pub fn font_shorthand(&self) -> String {
        format!("{} {} {}px '{}', sans-serif", self.font_style, self.font_weight, self.font_size, self.font_family)
    }

    /// Inline style declaration for an absolutely positioned DOM element.
    #[must_use]
    pub fn css(&self) -> String {
        format!(
            "left: {}%; top: {}%; width: {}%; font-family: '{}', sans-serif; font-weight: {}; font-style: {}; \
             text-align: {}; text-transform: {}; background-color: {}; padding: {}px {}px; font-size: {}px; \
             letter-spacing: {}em; line-height: {}; color: {}; text-shadow: {}; z-index: {}",
            self.left * 100.0,
            self.top * 100.0,
            self.width * 100.0,
            self.font_family,
            self.font_weight,
            self.font_style,
            self.text_align,
            if self.uppercase { "uppercase" } else { "none" },
            self.background,
            self.padding_y,
            self.padding_x,
            self.font_size,
            self.letter_spacing_em,
            self.line_height,
            self.color,
            self.shadow.map_or_else(|| "none".to_owned(), |s| s.css()),
            self.z_index,
        )
    }
}

/// Resolve every layer bottom-first.
#[must_use]
pub fn scene(store: &LayerStore, scale: Scale, selection: &SelectionModel) -> Vec<LayerStyle> {
    store
        .ordered()
        .enumerate()
        .map(|(i, layer)| LayerStyle::resolve(layer, scale, i + 1, selection.is_selected(&layer.id)))
        .collect()
}

/// Convert `#rgb` / `#rrggbb` plus an alpha into a CSS `rgba()` string.
///
/// Anything else falls back to black. Alpha is clamped to `[0,1]`.
#[must_use]
pub fn hex_to_rgba(hex: &str, alpha: f64) -> String {
    let alpha = clamp_to(alpha, &UNIT_RANGE);
    let digits = hex.trim_start_matches('#');
    let expanded: Cow<'_, str> = if digits.len() == 3 {
        Cow::Owned(digits.chars().flat_map(|c| [c, c]).collect())
    } else {
        Cow::Borrowed(digits)
    };
    let rgb = if expanded.len() == 6 { u32::from_str_radix(&expanded, 16).unwrap_or(0) } else { 0 };
    let r = (rgb >> 16) & 0xff;
    let g = (rgb >> 8) & 0xff;
    let b = rgb & 0xff;
    format!("rgba({r}, {g}, {b}, {alpha})")
}
