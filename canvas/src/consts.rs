//! Shared numeric constants for the canvas crate.

use std::ops::RangeInclusive;

// ── Normalized space ────────────────────────────────────────────

/// Bounds for positions, widths and opacities expressed as frame fractions.
pub const UNIT_RANGE: RangeInclusive<f64> = 0.0..=1.0;

/// Position of a freshly added layer on both axes.
pub const CENTER: f64 = 0.5;

// ── Property panel ranges (design-space pixels unless noted) ────

/// Font size range in design pixels.
pub const FONT_SIZE_RANGE: RangeInclusive<f64> = 16.0..=160.0;

/// Horizontal padding range in design pixels.
pub const PADDING_RANGE: RangeInclusive<f64> = 0.0..=80.0;

/// Line height multiplier range.
pub const LINE_HEIGHT_RANGE: RangeInclusive<f64> = 0.8..=2.0;

/// Letter spacing range in `em`.
pub const LETTER_SPACING_RANGE: RangeInclusive<f64> = -0.2..=0.6;

/// Stored in place of an empty layer name.
pub const FALLBACK_LAYER_NAME: &str = "Text";

// ── Rendering ───────────────────────────────────────────────────

/// Vertical padding as a fraction of the horizontal padding.
pub const VERTICAL_PADDING_RATIO: f64 = 0.6;

/// Shadow vertical offset at full intensity, in design pixels.
pub const SHADOW_OFFSET_PX: f64 = 8.0;

/// Shadow blur radius at full intensity, in design pixels.
pub const SHADOW_BLUR_PX: f64 = 24.0;

/// Shadow alpha at full intensity.
pub const SHADOW_ALPHA: f64 = 0.35;

// ── Export ──────────────────────────────────────────────────────

/// Output multiplier applied on top of the export base size.
pub const EXPORT_PIXEL_RATIO: f64 = 2.0;

/// File name of every exported creative.
pub const EXPORT_FILENAME: &str = "creative-ad.png";

/// Mime type produced by the rasterizer.
pub const EXPORT_MIME: &str = "image/png";

/// Clamp `value` into `range`. Non-finite input maps to the range start.
#[must_use]
pub fn clamp_to(value: f64, range: &RangeInclusive<f64>) -> f64 {
    if !value.is_finite() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}
