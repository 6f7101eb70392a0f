//! Design space, rendered frame, and the conversions between them.
//!
//! A template fixes the design size (its nominal pixel resolution). The canvas
//! element is rendered at whatever size the page layout gives it; that rendered
//! rect is observed continuously and fed to [`GeometryEngine::observe_frame`].
//! Layer positions live in normalized space (`[0,1]` fractions of the frame), so
//! they never need converting. Design-space pixel attributes (font size,
//! padding, shadow) are multiplied by [`Scale`] before painting.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::Serialize;

/// A point in client (CSS pixel) or normalized space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Multiply both sides by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self { width: self.width * factor, height: self.height * factor }
    }

    fn has_area(self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// The rendered canvas element: client-space origin plus size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Per-axis ratio between rendered size and design size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    /// Scale that maps `design` onto `rendered`. Identity for a zero-area design.
    #[must_use]
    pub fn between(design: Size, rendered: Size) -> Self {
        if !design.has_area() {
            return Self::IDENTITY;
        }
        Self { x: rendered.width / design.width, y: rendered.height / design.height }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Tracks the template design size against the observed render frame.
#[derive(Debug, Clone)]
pub struct GeometryEngine {
    design: Size,
    frame: Rect,
    scale: Scale,
}

impl GeometryEngine {
    /// Start with the frame at the design size, i.e. identity scale.
    #[must_use]
    pub fn new(design: Size) -> Self {
        let frame = Rect::new(0.0, 0.0, design.width, design.height);
        Self { design, frame, scale: Scale::IDENTITY }
    }

    /// Switch to a new template size. Scale is recomputed immediately.
    pub fn set_design_size(&mut self, design: Size) {
        self.design = design;
        self.recompute();
    }

    /// Record the latest rendered rect of the canvas element.
    ///
    /// Returns `false` without touching any state when `rect` equals the last
    /// observed rect, so duplicate resize notifications are harmless.
    pub fn observe_frame(&mut self, rect: Rect) -> bool {
        if rect == self.frame {
            return false;
        }
        self.frame = rect;
        self.recompute();
        true
    }

    fn recompute(&mut self) {
        self.scale = Scale::between(self.design, self.frame.size());
    }

    #[must_use]
    pub fn scale(&self) -> Scale {
        self.scale
    }

    #[must_use]
    pub fn design_size(&self) -> Size {
        self.design
    }

    #[must_use]
    pub fn rendered_size(&self) -> Size {
        self.frame.size()
    }

    #[must_use]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Convert a client-space pointer position into normalized frame space.
    ///
    /// The result is not clamped: a pointer outside the frame maps outside
    /// `[0,1]`. Returns `None` while the frame has no area.
    #[must_use]
    pub fn to_normalized(&self, client: Point) -> Option<Point> {
        if !self.frame.size().has_area() {
            return None;
        }
        Some(Point {
            x: (client.x - self.frame.left) / self.frame.width,
            y: (client.y - self.frame.top) / self.frame.height,
        })
    }

    /// Convert a normalized position back to client space.
    #[must_use]
    pub fn to_client(&self, normalized: Point) -> Point {
        Point {
            x: self.frame.left + normalized.x * self.frame.width,
            y: self.frame.top + normalized.y * self.frame.height,
        }
    }

    /// Project a horizontal design-space pixel value onto the rendered frame.
    #[must_use]
    pub fn design_to_rendered_x(&self, px: f64) -> f64 {
        px * self.scale.x
    }

    /// Project a vertical design-space pixel value onto the rendered frame.
    #[must_use]
    pub fn design_to_rendered_y(&self, px: f64) -> f64 {
        px * self.scale.y
    }
}
