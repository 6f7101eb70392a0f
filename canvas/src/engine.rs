//! The editing engine.
//!
//! [`EngineCore`] owns every piece of editor state and applies one UI event per
//! method call, so each event is observed atomically. The browser wrapper lives
//! in [`crate::browser`].

use studio_wire::GenerateResponse;

use crate::background::{BackgroundClient, BackgroundError, GenerationOutcome, GenerationToken, PendingGeneration};
use crate::catalog::{self, Template};
use crate::doc::{LayerDefaults, LayerField, LayerId, LayerStore, TextLayer};
use crate::export::{
    Composition, DownloadSink, ExportCoordinator, ExportError, ExportJob, ExportResolution, ExportSummary, RasterError,
    Rasterizer,
};
use crate::geometry::{GeometryEngine, Point, Rect, Scale};
use crate::input::{DragController, InputState};
use crate::selection::SelectionModel;
use crate::style::{self, LayerStyle};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Cursor shown over the frame while a layer is being dragged.
const CURSOR_GRABBING: &str = "grabbing";
const CURSOR_DEFAULT: &str = "default";

/// Actions returned from event handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    TemplateChanged(&'static str),
    LayersCleared,
    LayerMoved { id: LayerId, x: f64, y: f64 },
    SelectionChanged(Option<LayerId>),
    SetCursor(&'static str),
    GenerationFinished(GenerationOutcome),
    ExportFinished(Result<ExportSummary, ExportError>),
    RenderNeeded,
}

/// Tunables for an editor session.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Style bundle for new text layers.
    pub defaults: LayerDefaults,
    pub export_resolution: ExportResolution,
    /// Drop the background when the template changes.
    pub reset_background_on_template_change: bool,
}

/// Core engine state: all logic that doesn't depend on the DOM.
///
/// Separated from the browser `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    config: EngineConfig,
    template: &'static Template,
    geometry: GeometryEngine,
    layers: LayerStore,
    selection: SelectionModel,
    drag: DragController,
    background: BackgroundClient,
    exporter: ExportCoordinator,
    error: Option<String>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let template = catalog::default_template();
        Self {
            geometry: GeometryEngine::new(template.design_size()),
            exporter: ExportCoordinator::new(config.export_resolution),
            config,
            template,
            layers: LayerStore::new(),
            selection: SelectionModel::new(),
            drag: DragController::new(),
            background: BackgroundClient::new(),
            error: None,
        }
    }

    // --- Template ---

    /// Switch to the template `id` (unknown ids fall back to the default).
    ///
    /// Clears every layer and the selection, ends any drag, and makes an
    /// in-flight generation stale.
    pub fn select_template(&mut self, id: &str) -> Vec<Action> {
        let template = catalog::lookup(id);
        self.template = template;
        self.geometry.set_design_size(template.design_size());
        self.layers.clear();
        self.selection.clear();
        self.drag.release();
        self.background.invalidate();
        if self.config.reset_background_on_template_change {
            self.background.clear_image();
        }
        log::debug!("template changed to {}", template.id);
        vec![
            Action::TemplateChanged(template.id),
            Action::LayersCleared,
            Action::SelectionChanged(None),
            Action::RenderNeeded,
        ]
    }

    // --- Layers ---

    /// Append a centered text layer with the configured defaults and select it.
    pub fn add_text(&mut self) -> LayerId {
        let id = self.layers.add(&self.config.defaults);
        self.selection.select(id, &self.layers);
        id
    }

    /// Apply a property-panel edit. Returns `false` for unknown ids.
    pub fn update_layer(&mut self, id: &LayerId, field: LayerField) -> bool {
        self.layers.update(id, field)
    }

    /// Delete a layer, clearing the selection and ending the drag if either
    /// pointed at it.
    pub fn remove_layer(&mut self, id: &LayerId) -> Option<TextLayer> {
        let removed = self.layers.remove(id)?;
        self.selection.forget(id);
        self.drag.abandon(id);
        Some(removed)
    }

    pub fn bring_forward(&mut self, id: &LayerId) -> bool {
        self.layers.bring_forward(id)
    }

    pub fn send_backward(&mut self, id: &LayerId) -> bool {
        self.layers.send_backward(id)
    }

    // --- Selection ---

    pub fn select(&mut self, id: LayerId) -> bool {
        self.selection.select(id, &self.layers)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- Frame and pointer ---

    /// Record the frame's rendered rect. Identical rects are ignored.
    pub fn observe_frame(&mut self, rect: Rect) -> bool {
        self.geometry.observe_frame(rect)
    }

    /// Pointer pressed at `client`. `target` is the layer under the pointer,
    /// or `None` for the bare canvas.
    pub fn on_pointer_down(&mut self, client: Point, target: Option<LayerId>) -> Vec<Action> {
        if self.drag.is_dragging() {
            return Vec::new();
        }
        let Some(id) = target else {
            self.selection.clear();
            return vec![Action::SelectionChanged(None), Action::RenderNeeded];
        };
        let Some(layer) = self.layers.get(&id) else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if let Some(pointer) = self.geometry.to_normalized(client) {
            self.drag.grab(layer, pointer);
            actions.push(Action::SetCursor(CURSOR_GRABBING));
        }
        self.selection.select(id, &self.layers);
        actions.push(Action::SelectionChanged(Some(id)));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Pointer moved anywhere in the window.
    pub fn on_pointer_move(&mut self, client: Point) -> Vec<Action> {
        if !self.drag.is_dragging() {
            return Vec::new();
        }
        let Some(pointer) = self.geometry.to_normalized(client) else {
            return Vec::new();
        };
        let Some((id, pos)) = self.drag.drag_to(pointer) else {
            return Vec::new();
        };
        if !self.layers.set_position(&id, pos.x, pos.y) {
            self.drag.abandon(&id);
            return vec![Action::SetCursor(CURSOR_DEFAULT)];
        }
        vec![Action::LayerMoved { id, x: pos.x, y: pos.y }, Action::RenderNeeded]
    }

    /// Pointer released anywhere in the window.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        match self.drag.release() {
            Some(_) => vec![Action::SetCursor(CURSOR_DEFAULT)],
            None => Vec::new(),
        }
    }

    // --- Background ---

    /// Start generating a background for the current template.
    ///
    /// # Errors
    ///
    /// [`BackgroundError::EmptyPrompt`] for blank prompts; the message is
    /// also recorded as the current error.
    pub fn begin_generation(&mut self, prompt: &str) -> Result<PendingGeneration, BackgroundError> {
        match self.background.begin(prompt, self.template) {
            Ok(pending) => {
                self.error = None;
                Ok(pending)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Deliver the response for `token`.
    pub fn complete_generation(
        &mut self,
        token: GenerationToken,
        result: Result<GenerateResponse, BackgroundError>,
    ) -> GenerationOutcome {
        let outcome = self.background.complete(token, result);
        match &outcome {
            GenerationOutcome::Installed => self.error = None,
            GenerationOutcome::Failed(message) => self.error = Some(message.clone()),
            GenerationOutcome::Discarded => {}
        }
        outcome
    }

    /// Use a user-supplied image as background.
    pub fn set_background(&mut self, url: String) {
        self.background.set_image(url);
    }

    pub fn clear_background(&mut self) {
        self.background.clear_image();
    }

    // --- Export ---

    /// The composition as the configured export resolution sees it.
    #[must_use]
    pub fn composition(&self) -> Composition {
        let (base, scale) = match self.exporter.resolution() {
            ExportResolution::Design => (self.template.design_size(), Scale::IDENTITY),
            ExportResolution::Viewport => (self.geometry.rendered_size(), self.geometry.scale()),
        };
        Composition {
            base,
            background: self.background.image().map(str::to_owned),
            layers: style::scene(&self.layers, scale, &SelectionModel::new()),
        }
    }

    /// Reserve the exporter and plan the output.
    ///
    /// # Errors
    ///
    /// See [`ExportCoordinator::begin`].
    pub fn begin_export(&mut self) -> Result<ExportJob, ExportError> {
        let composition = self.composition();
        let result = self.exporter.begin(composition);
        self.record_export_error(result)
    }

    /// Deliver the rasterized output of `job`.
    ///
    /// # Errors
    ///
    /// See [`ExportCoordinator::finish`].
    pub fn finish_export(
        &mut self,
        job: &ExportJob,
        rendered: Result<Vec<u8>, RasterError>,
        sink: &mut dyn DownloadSink,
    ) -> Result<ExportSummary, ExportError> {
        let result = self.exporter.finish(job, rendered, sink);
        self.record_export_error(result)
    }

    /// Export synchronously through `rasterizer` into `sink`.
    ///
    /// # Errors
    ///
    /// See [`ExportCoordinator::run`].
    pub fn export(
        &mut self,
        rasterizer: &mut dyn Rasterizer,
        sink: &mut dyn DownloadSink,
    ) -> Result<ExportSummary, ExportError> {
        let composition = self.composition();
        let result = self.exporter.run(composition, rasterizer, sink);
        self.record_export_error(result)
    }

    fn record_export_error<T>(&mut self, result: Result<T, ExportError>) -> Result<T, ExportError> {
        if let Err(err) = &result {
            self.error = Some(err.to_string());
        }
        result
    }

    pub fn set_export_resolution(&mut self, resolution: ExportResolution) {
        self.exporter.set_resolution(resolution);
    }

    // --- Queries ---

    #[must_use]
    pub fn template(&self) -> &'static Template {
        self.template
    }

    #[must_use]
    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    /// Styles for every layer at the current frame scale, bottom-first.
    #[must_use]
    pub fn layer_styles(&self) -> Vec<LayerStyle> {
        style::scene(&self.layers, self.geometry.scale(), &self.selection)
    }

    #[must_use]
    pub fn selection(&self) -> Option<LayerId> {
        self.selection.active()
    }

    /// The layer the property panel edits.
    #[must_use]
    pub fn selected_layer(&self) -> Option<&TextLayer> {
        self.selection.active().and_then(|id| self.layers.get(&id))
    }

    #[must_use]
    pub fn geometry(&self) -> &GeometryEngine {
        &self.geometry
    }

    #[must_use]
    pub fn input_state(&self) -> InputState {
        self.drag.state()
    }

    #[must_use]
    pub fn background(&self) -> Option<&str> {
        self.background.image()
    }

    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.background.is_generating()
    }

    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.exporter.in_progress()
    }

    /// Whether the export button should be enabled.
    #[must_use]
    pub fn can_export(&self) -> bool {
        !self.exporter.in_progress() && (self.background.image().is_some() || !self.layers.is_empty())
    }

    /// The most recent user-facing error, if not dismissed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}
