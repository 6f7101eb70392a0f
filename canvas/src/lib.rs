//! Canvas editing engine for the ad creative studio.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! editor state of a single creative: the chosen ad template, the text layers
//! placed over the background, pointer-driven repositioning, background
//! generation bookkeeping, and PNG export. The host page renders layers from
//! [`engine::EngineCore::layer_styles`] and forwards DOM events to the engine.
//!
//! Layer positions are stored as fractions of the frame, so they survive any
//! resize of the rendered canvas; design-space pixel sizes are scaled to the
//! frame when painted.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Testable [`engine::EngineCore`] and its actions |
//! | [`browser`] | The DOM-bound [`browser::Engine`] (feature `browser`) |
//! | [`catalog`] | Ad templates and font families |
//! | [`geometry`] | Design size, rendered frame, scale and coordinate conversions |
//! | [`doc`] | Text layer model and the ordered layer store |
//! | [`selection`] | The single active layer |
//! | [`input`] | Drag state machine |
//! | [`style`] | Layers resolved against the current scale |
//! | [`background`] | Generation requests and stale-response handling |
//! | [`export`] | Export planning, rasterizer and download seams |
//! | [`render`] | 2D-canvas rasterizer (feature `browser`) |
//! | [`dom`] | Browser listeners, fetch and download helpers |
//! | [`consts`] | Shared numeric constants (ranges, shadow, export) |

pub mod background;
#[cfg(feature = "browser")]
pub mod browser;
pub mod catalog;
pub mod consts;
pub mod doc;
#[cfg(feature = "browser")]
pub mod dom;
pub mod engine;
pub mod export;
pub mod geometry;
pub mod input;
#[cfg(feature = "browser")]
pub mod render;
pub mod selection;
pub mod style;
