#![allow(clippy::float_cmp)]

use super::*;
use crate::export::RasterOptions;
use crate::geometry::Size;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Engine with the frame at client origin, 1000x500 CSS px.
fn engine_with_frame() -> EngineCore {
    let mut core = EngineCore::new();
    core.observe_frame(Rect::new(0.0, 0.0, 1000.0, 500.0));
    core
}

/// Client point for a normalized position inside the 1000x500 frame.
fn at(x: f64, y: f64) -> Point {
    Point::new(x * 1000.0, y * 500.0)
}

fn position(core: &EngineCore, id: &LayerId) -> (f64, f64) {
    let layer = core.layers().get(id).unwrap();
    (layer.x, layer.y)
}

struct FixedRaster(Result<Vec<u8>, RasterError>);

impl Rasterizer for FixedRaster {
    fn render(&mut self, _: &Composition, _: &RasterOptions) -> Result<Vec<u8>, RasterError> {
        self.0.clone()
    }
}

#[derive(Default)]
struct CountingSink(usize);

impl DownloadSink for CountingSink {
    fn save(&mut self, _: &str, _: &[u8]) -> Result<(), String> {
        self.0 += 1;
        Ok(())
    }
}

// =============================================================
// Construction
// =============================================================

#[test]
fn starts_on_default_template_with_nothing() {
    let core = EngineCore::new();
    assert_eq!(core.template().id, "facebook-feed");
    assert!(core.layers().is_empty());
    assert!(core.selection().is_none());
    assert!(core.background().is_none());
    assert_eq!(core.input_state(), InputState::Idle);
    assert!(!core.can_export());
}

// =============================================================
// Layers and selection
// =============================================================

#[test]
fn add_text_selects_new_layer() {
    let mut core = EngineCore::new();
    let id = core.add_text();
    assert_eq!(core.selection(), Some(id));
    assert_eq!(core.selected_layer().unwrap().name, "Text 1");
    assert!(core.can_export());
}

#[test]
fn bring_forward_scenario_orders_b_then_a() {
    let mut core = EngineCore::new();
    let a = core.add_text();
    let b = core.add_text();
    assert!(core.bring_forward(&a));
    assert_eq!(core.layers().ids(), &[b, a]);

    let styles = core.layer_styles();
    assert_eq!(styles[0].id, b);
    assert_eq!(styles[1].z_index, 2);
}

#[test]
fn remove_selected_layer_clears_selection() {
    let mut core = EngineCore::new();
    let id = core.add_text();
    assert!(core.remove_layer(&id).is_some());
    assert!(core.selection().is_none());
    assert!(core.remove_layer(&id).is_none());
}

#[test]
fn remove_other_layer_keeps_selection() {
    let mut core = EngineCore::new();
    let a = core.add_text();
    let b = core.add_text();
    core.remove_layer(&a);
    assert_eq!(core.selection(), Some(b));
}

#[test]
fn update_layer_clamps_through_store() {
    let mut core = EngineCore::new();
    let id = core.add_text();
    assert!(core.update_layer(&id, LayerField::BackgroundOpacity(4.0)));
    assert_eq!(core.selected_layer().unwrap().background_opacity, 1.0);
}

#[test]
fn select_unknown_layer_is_rejected() {
    let mut core = EngineCore::new();
    let id = core.add_text();
    core.remove_layer(&id);
    assert!(!core.select(id));
}

// =============================================================
// Template switching
// =============================================================

#[test]
fn template_switch_clears_layers_and_selection() {
    let mut core = EngineCore::new();
    core.add_text();
    core.add_text();

    let actions = core.select_template("facebook-story");

    assert_eq!(core.template().id, "facebook-story");
    assert!(core.layers().is_empty());
    assert!(core.selection().is_none());
    assert_eq!(core.geometry().design_size(), Size::new(1080.0, 1920.0));
    assert!(actions.contains(&Action::TemplateChanged("facebook-story")));
    assert!(actions.contains(&Action::LayersCleared));
}

#[test]
fn template_switch_keeps_background_by_default() {
    let mut core = EngineCore::new();
    core.set_background("data:image/png;base64,AA==".into());
    core.select_template("google-display-square");
    assert_eq!(core.background(), Some("data:image/png;base64,AA=="));
}

#[test]
fn template_switch_can_reset_background() {
    let mut core = EngineCore::with_config(EngineConfig {
        reset_background_on_template_change: true,
        ..EngineConfig::default()
    });
    core.set_background("data:image/png;base64,AA==".into());
    core.select_template("google-display-square");
    assert!(core.background().is_none());
}

#[test]
fn unknown_template_falls_back_to_default() {
    let mut core = EngineCore::new();
    core.select_template("facebook-story");
    core.select_template("tiktok-vertical");
    assert_eq!(core.template().id, "facebook-feed");
}

// =============================================================
// Frame observation
// =============================================================

#[test]
fn scale_tracks_observed_frame() {
    let mut core = EngineCore::new();
    assert!(core.observe_frame(Rect::new(10.0, 20.0, 600.0, 314.0)));
    assert!(approx_eq(core.geometry().scale().x, 0.5));
    assert!(approx_eq(core.geometry().scale().y, 0.5));
}

#[test]
fn identical_frame_notification_is_ignored() {
    let mut core = engine_with_frame();
    assert!(!core.observe_frame(Rect::new(0.0, 0.0, 1000.0, 500.0)));
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_scenario_follows_then_clamps() {
    let mut core = engine_with_frame();
    let id = core.add_text();
    assert_eq!(position(&core, &id), (0.5, 0.5));

    core.on_pointer_down(at(0.5, 0.5), Some(id));
    assert!(matches!(core.input_state(), InputState::Dragging(_)));

    let actions = core.on_pointer_move(at(0.9, 0.9));
    let (x, y) = position(&core, &id);
    assert!(approx_eq(x, 0.9));
    assert!(approx_eq(y, 0.9));
    assert!(matches!(actions[0], Action::LayerMoved { .. }));

    core.on_pointer_move(at(1.2, 1.2));
    assert_eq!(position(&core, &id), (1.0, 1.0));

    assert_eq!(core.on_pointer_up(), vec![Action::SetCursor("default")]);
    assert_eq!(core.input_state(), InputState::Idle);
}

#[test]
fn drag_preserves_grab_offset() {
    let mut core = engine_with_frame();
    let id = core.add_text();
    core.update_layer(&id, LayerField::X(0.2));
    core.update_layer(&id, LayerField::Y(0.3));

    core.on_pointer_down(at(0.25, 0.4), Some(id));
    core.on_pointer_move(at(0.55, 0.6));

    let (x, y) = position(&core, &id);
    assert!(approx_eq(x, 0.5));
    assert!(approx_eq(y, 0.5));
}

#[test]
fn drag_respects_frame_origin() {
    let mut core = EngineCore::new();
    core.observe_frame(Rect::new(100.0, 50.0, 400.0, 200.0));
    let id = core.add_text();

    core.on_pointer_down(Point::new(300.0, 150.0), Some(id));
    core.on_pointer_move(Point::new(400.0, 200.0));

    let (x, y) = position(&core, &id);
    assert!(approx_eq(x, 0.75));
    assert!(approx_eq(y, 0.75));
}

#[test]
fn pointer_down_selects_layer() {
    let mut core = engine_with_frame();
    let a = core.add_text();
    let b = core.add_text();
    assert_eq!(core.selection(), Some(b));

    let actions = core.on_pointer_down(at(0.5, 0.5), Some(a));
    assert_eq!(core.selection(), Some(a));
    assert!(actions.contains(&Action::SelectionChanged(Some(a))));
}

#[test]
fn pointer_down_on_empty_canvas_clears_selection() {
    let mut core = engine_with_frame();
    core.add_text();
    let actions = core.on_pointer_down(at(0.1, 0.1), None);
    assert!(core.selection().is_none());
    assert_eq!(core.input_state(), InputState::Idle);
    assert!(actions.contains(&Action::SelectionChanged(None)));
}

#[test]
fn pointer_down_on_unknown_layer_is_ignored() {
    let mut core = engine_with_frame();
    let id = core.add_text();
    core.remove_layer(&id);
    assert!(core.on_pointer_down(at(0.5, 0.5), Some(id)).is_empty());
    assert_eq!(core.input_state(), InputState::Idle);
}

#[test]
fn second_pointer_down_during_drag_is_ignored() {
    let mut core = engine_with_frame();
    let a = core.add_text();
    let b = core.add_text();
    core.on_pointer_down(at(0.5, 0.5), Some(a));

    assert!(core.on_pointer_down(at(0.5, 0.5), Some(b)).is_empty());
    assert_eq!(core.selection(), Some(a));
}

#[test]
fn move_without_drag_does_nothing() {
    let mut core = engine_with_frame();
    let id = core.add_text();
    assert!(core.on_pointer_move(at(0.9, 0.9)).is_empty());
    assert_eq!(position(&core, &id), (0.5, 0.5));
    assert!(core.on_pointer_up().is_empty());
}

#[test]
fn zero_area_frame_skips_moves() {
    let mut core = engine_with_frame();
    let id = core.add_text();
    core.on_pointer_down(at(0.5, 0.5), Some(id));
    core.observe_frame(Rect::new(0.0, 0.0, 0.0, 0.0));

    assert!(core.on_pointer_move(Point::new(900.0, 450.0)).is_empty());
    assert_eq!(position(&core, &id), (0.5, 0.5));
}

#[test]
fn removing_dragged_layer_ends_drag() {
    let mut core = engine_with_frame();
    let id = core.add_text();
    core.on_pointer_down(at(0.5, 0.5), Some(id));
    core.remove_layer(&id);
    assert_eq!(core.input_state(), InputState::Idle);
}

#[test]
fn template_switch_ends_drag() {
    let mut core = engine_with_frame();
    let id = core.add_text();
    core.on_pointer_down(at(0.5, 0.5), Some(id));
    core.select_template("facebook-story");
    assert_eq!(core.input_state(), InputState::Idle);
    assert!(core.on_pointer_move(at(0.9, 0.9)).is_empty());
}

// =============================================================
// Background generation
// =============================================================

#[test]
fn blank_prompt_records_error() {
    let mut core = EngineCore::new();
    assert!(matches!(core.begin_generation("  "), Err(BackgroundError::EmptyPrompt)));
    assert!(core.error().is_some());
    assert!(!core.is_generating());
    core.dismiss_error();
    assert!(core.error().is_none());
}

#[test]
fn generation_request_uses_template_size() {
    let mut core = EngineCore::new();
    core.select_template("google-display-banner");
    let pending = core.begin_generation("city skyline").unwrap();
    assert_eq!(pending.request.width, Some(1600));
    assert_eq!(pending.request.height, Some(628));
    assert!(core.is_generating());
}

#[test]
fn generation_installs_background() {
    let mut core = EngineCore::new();
    let pending = core.begin_generation("desert").unwrap();
    let outcome = core.complete_generation(pending.token, Ok(GenerateResponse { image: "data:a".into() }));
    assert_eq!(outcome, GenerationOutcome::Installed);
    assert_eq!(core.background(), Some("data:a"));
    assert!(core.error().is_none());
}

#[test]
fn generation_failure_records_error_and_keeps_background() {
    let mut core = EngineCore::new();
    core.set_background("data:old".into());
    let pending = core.begin_generation("desert").unwrap();
    let outcome = core.complete_generation(
        pending.token,
        Err(BackgroundError::Rejected { status: 502, message: "upstream".into() }),
    );
    assert!(matches!(outcome, GenerationOutcome::Failed(_)));
    assert_eq!(core.background(), Some("data:old"));
    assert!(core.error().is_some());
}

#[test]
fn generation_after_template_switch_is_discarded() {
    let mut core = EngineCore::new();
    let pending = core.begin_generation("mountains").unwrap();
    core.select_template("facebook-story");

    let outcome = core.complete_generation(pending.token, Ok(GenerateResponse { image: "data:late".into() }));
    assert_eq!(outcome, GenerationOutcome::Discarded);
    assert!(core.background().is_none());
    assert!(!core.is_generating());
}

// =============================================================
// Export
// =============================================================

#[test]
fn design_export_uses_template_size_at_identity_scale() {
    let mut core = engine_with_frame();
    core.add_text();
    let composition = core.composition();

    assert_eq!(composition.base, Size::new(1200.0, 628.0));
    assert_eq!(composition.layers[0].font_size, 64.0);
    assert!(!composition.layers[0].selected);
}

#[test]
fn viewport_export_uses_rendered_size_and_scale() {
    let mut core = EngineCore::new();
    core.observe_frame(Rect::new(0.0, 0.0, 600.0, 314.0));
    core.set_export_resolution(ExportResolution::Viewport);
    core.add_text();
    let composition = core.composition();

    assert_eq!(composition.base, Size::new(600.0, 314.0));
    assert!(approx_eq(composition.layers[0].font_size, 32.0));
}

#[test]
fn export_output_is_twice_the_base() {
    let mut core = engine_with_frame();
    core.add_text();

    let summary = core.export(&mut FixedRaster(Ok(vec![1, 2, 3])), &mut CountingSink::default()).unwrap();
    assert_eq!((summary.width, summary.height), (2400, 1256));

    core.set_export_resolution(ExportResolution::Viewport);
    let summary = core.export(&mut FixedRaster(Ok(vec![1])), &mut CountingSink::default()).unwrap();
    assert_eq!((summary.width, summary.height), (2000, 1000));
}

#[test]
fn failed_export_records_error_without_download() {
    let mut core = engine_with_frame();
    core.add_text();
    let mut sink = CountingSink::default();

    let err = core.export(&mut FixedRaster(Err(RasterError::Canvas("tainted".into()))), &mut sink).unwrap_err();

    assert!(matches!(err, ExportError::Raster(_)));
    assert_eq!(sink.0, 0);
    assert!(core.error().is_some());
    assert!(!core.is_exporting());
}

#[test]
fn export_of_empty_canvas_is_refused() {
    let mut core = EngineCore::new();
    assert_eq!(core.begin_export().unwrap_err(), ExportError::Empty);
}

#[test]
fn export_in_progress_blocks_another() {
    let mut core = engine_with_frame();
    core.add_text();
    let job = core.begin_export().unwrap();
    assert!(!core.can_export());
    assert_eq!(core.begin_export().unwrap_err(), ExportError::Busy);

    core.finish_export(&job, Ok(vec![1]), &mut CountingSink::default()).unwrap();
    assert!(core.can_export());
}
