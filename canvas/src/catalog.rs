//! Static catalogs: ad templates and selectable font families.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use serde::Serialize;

use crate::geometry::Size;

/// An ad format: fixed aspect ratio and nominal pixel resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    pub id: &'static str,
    pub label: &'static str,
    pub design_width: u32,
    pub design_height: u32,
    pub description: &'static str,
}

impl Template {
    /// Design size in pixels.
    #[must_use]
    pub fn design_size(&self) -> Size {
        Size::new(f64::from(self.design_width), f64::from(self.design_height))
    }
}

/// Every template, in the order the format picker lists them.
pub const TEMPLATES: [Template; 4] = [
    Template {
        id: "facebook-feed",
        label: "Facebook Feed (1200×628)",
        design_width: 1200,
        design_height: 628,
        description: "Landscape format for Facebook feed ads.",
    },
    Template {
        id: "facebook-story",
        label: "Facebook / Instagram Story (1080×1920)",
        design_width: 1080,
        design_height: 1920,
        description: "Vertical format for Stories and Reels.",
    },
    Template {
        id: "google-display-square",
        label: "Google Display Square (1200×1200)",
        design_width: 1200,
        design_height: 1200,
        description: "Square format common on Google Display and Discovery.",
    },
    Template {
        id: "google-display-banner",
        label: "Google Display Banner (1600×628)",
        design_width: 1600,
        design_height: 628,
        description: "Wide banner for display campaigns.",
    },
];

/// Font families offered in the property panel.
pub const FONT_FAMILIES: [&str; 6] = ["Inter", "Poppins", "Montserrat", "Playfair Display", "Roboto", "Oswald"];

/// The template used on startup and for unknown ids.
#[must_use]
pub fn default_template() -> &'static Template {
    &TEMPLATES[0]
}

/// Find a template by id, falling back to [`default_template`].
#[must_use]
pub fn lookup(id: &str) -> &'static Template {
    TEMPLATES
        .iter()
        .find(|t| t.id == id)
        .unwrap_or_else(default_template)
}

/// All templates in catalog order.
#[must_use]
pub fn all() -> &'static [Template] {
    &TEMPLATES
}
