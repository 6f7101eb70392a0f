//! Rendering: flattens a [`Composition`] onto a 2D canvas for export.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives resolved [`LayerStyle`]s and produces pixels; it never mutates
//! application state. Layout mirrors the live editor: each layer is a box whose
//! top-left corner sits at its normalized position, text wrapped to the box
//! width inside its padding.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

use studio_wire::DataUrl;

use crate::consts::EXPORT_MIME;
use crate::export::{Composition, RasterError, RasterOptions, Rasterizer};
use crate::geometry::Size;
use crate::style::LayerStyle;

/// Rasterizes into a detached `<canvas>` and encodes it as PNG.
///
/// The background must already be decoded; the browser engine loads it before
/// calling [`Rasterizer::render`].
pub struct Canvas2dRasterizer {
    document: Document,
    background: Option<HtmlImageElement>,
}

impl Canvas2dRasterizer {
    #[must_use]
    pub fn new(document: Document, background: Option<HtmlImageElement>) -> Self {
        Self { document, background }
    }

    fn surface(&self, options: &RasterOptions) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
        let canvas: HtmlCanvasElement = self.document.create_element("canvas")?.dyn_into()?;
        canvas.set_width(options.output_width);
        canvas.set_height(options.output_height);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        Ok((canvas, ctx))
    }
}

impl Rasterizer for Canvas2dRasterizer {
    fn render(&mut self, composition: &Composition, options: &RasterOptions) -> Result<Vec<u8>, RasterError> {
        let (canvas, ctx) = self.surface(options).map_err(|e| RasterError::Canvas(describe(&e)))?;
        ctx.scale(options.pixel_ratio, options.pixel_ratio)
            .map_err(|e| RasterError::Canvas(describe(&e)))?;
        draw(&ctx, composition, self.background.as_ref(), options.pixel_ratio)
            .map_err(|e| RasterError::Canvas(describe(&e)))?;

        let url = canvas
            .to_data_url_with_type(EXPORT_MIME)
            .map_err(|e| RasterError::Encode(describe(&e)))?;
        let data = DataUrl::parse(&url).map_err(|e| RasterError::Encode(e.to_string()))?;
        Ok(data.bytes)
    }
}

/// Draw the full composition in base-size CSS pixels onto a context already
/// scaled by `pixel_ratio`.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    composition: &Composition,
    background: Option<&HtmlImageElement>,
    pixel_ratio: f64,
) -> Result<(), JsValue> {
    let base = composition.base;
    ctx.clear_rect(0.0, 0.0, base.width, base.height);

    if let Some(img) = background {
        draw_cover(ctx, img, base)?;
    }
    for layer in &composition.layers {
        draw_layer(ctx, layer, base, pixel_ratio)?;
    }
    Ok(())
}

/// Paint `img` scaled to cover `base`, centered, cropping the overflow.
fn draw_cover(ctx: &CanvasRenderingContext2d, img: &HtmlImageElement, base: Size) -> Result<(), JsValue> {
    let iw = f64::from(img.natural_width());
    let ih = f64::from(img.natural_height());
    if iw <= 0.0 || ih <= 0.0 {
        return Ok(());
    }
    let s = (base.width / iw).max(base.height / ih);
    let (dw, dh) = (iw * s, ih * s);
    ctx.draw_image_with_html_image_element_and_dw_and_dh(
        img,
        (base.width - dw) * 0.5,
        (base.height - dh) * 0.5,
        dw,
        dh,
    )
}

#[allow(clippy::cast_precision_loss)]
fn draw_layer(
    ctx: &CanvasRenderingContext2d,
    layer: &LayerStyle,
    base: Size,
    pixel_ratio: f64,
) -> Result<(), JsValue> {
    let left = layer.left * base.width;
    let top = layer.top * base.height;
    let box_w = layer.width * base.width;
    let inner_w = (box_w - 2.0 * layer.padding_x).max(1.0);
    let line_h = layer.font_size * layer.line_height;

    ctx.save();
    ctx.set_font(&layer.font_shorthand());
    js_sys::Reflect::set(
        ctx,
        &JsValue::from_str("letterSpacing"),
        &JsValue::from_str(&format!("{}px", layer.letter_spacing_em * layer.font_size)),
    )?;

    let text = layer.display_text();
    let lines = wrap_text_lines(ctx, &text, inner_w);
    let box_h = line_h * lines.len() as f64 + 2.0 * layer.padding_y;

    ctx.set_fill_style_str(&layer.background);
    ctx.fill_rect(left, top, box_w, box_h);

    if let Some(shadow) = layer.shadow.map(|s| s.at_pixel_ratio(pixel_ratio)) {
        ctx.set_shadow_color(&shadow.color());
        ctx.set_shadow_offset_y(shadow.offset_y);
        ctx.set_shadow_blur(shadow.blur);
    }
    ctx.set_fill_style_str(&layer.color);
    ctx.set_text_baseline("middle");
    ctx.set_text_align(layer.text_align);
    let anchor_x = match layer.text_align {
        "left" => left + layer.padding_x,
        "right" => left + box_w - layer.padding_x,
        _ => left + box_w * 0.5,
    };
    let first_y = top + layer.padding_y + line_h * 0.5;
    for (idx, line) in lines.iter().enumerate() {
        ctx.fill_text(line, anchor_x, first_y + idx as f64 * line_h)?;
    }

    ctx.restore();
    Ok(())
}

// =============================================================
// Text wrapping
// =============================================================

fn wrap_text_lines(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> Vec<String> {
    let mut out = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measured_text_width(ctx, &candidate) <= max_w {
                current = candidate;
            } else {
                out.push(std::mem::replace(&mut current, word.to_owned()));
            }
        }
        out.push(current);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

fn measured_text_width(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
    match ctx.measure_text(text) {
        Ok(metrics) => metrics.width(),
        Err(_) => f64::INFINITY,
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
