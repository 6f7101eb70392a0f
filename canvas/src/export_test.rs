use super::*;
use crate::doc::{LayerDefaults, LayerStore};
use crate::geometry::Scale;
use crate::selection::SelectionModel;
use crate::style;

struct FixedRaster(Result<Vec<u8>, RasterError>);

impl Rasterizer for FixedRaster {
    fn render(&mut self, _: &Composition, _: &RasterOptions) -> Result<Vec<u8>, RasterError> {
        self.0.clone()
    }
}

#[derive(Default)]
struct RecordingSink {
    saved: Vec<(String, Vec<u8>)>,
    fail: bool,
}

impl DownloadSink for RecordingSink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), String> {
        if self.fail {
            return Err("disk full".to_owned());
        }
        self.saved.push((filename.to_owned(), bytes.to_vec()));
        Ok(())
    }
}

fn composition_with_text(base: Size) -> Composition {
    let mut store = LayerStore::new();
    store.add(&LayerDefaults::default());
    Composition {
        base,
        background: None,
        layers: style::scene(&store, Scale::IDENTITY, &SelectionModel::new()),
    }
}

#[test]
fn default_resolution_is_design() {
    assert_eq!(ExportCoordinator::default().resolution(), ExportResolution::Design);
}

#[test]
fn options_double_the_base_size() {
    let options = RasterOptions::for_base(Size::new(1200.0, 628.0));
    assert_eq!((options.output_width, options.output_height), (2400, 1256));
    assert!(options.cache_bust);
}

#[test]
fn options_round_fractional_viewport_sizes() {
    let options = RasterOptions::for_base(Size::new(600.25, 314.0));
    assert_eq!((options.output_width, options.output_height), (1201, 628));
}

#[test]
fn run_delivers_png_to_sink() {
    let mut exporter = ExportCoordinator::default();
    let mut raster = FixedRaster(Ok(vec![0x89, b'P', b'N', b'G']));
    let mut sink = RecordingSink::default();

    let summary = exporter.run(composition_with_text(Size::new(1080.0, 1920.0)), &mut raster, &mut sink).unwrap();

    assert_eq!(summary.filename, "creative-ad.png");
    assert_eq!((summary.width, summary.height), (2160, 3840));
    assert_eq!(summary.bytes, 4);
    assert_eq!(sink.saved.len(), 1);
    assert_eq!(sink.saved[0].0, "creative-ad.png");
    assert!(!exporter.in_progress());
}

#[test]
fn raster_failure_never_reaches_sink() {
    let mut exporter = ExportCoordinator::default();
    let mut raster = FixedRaster(Err(RasterError::Image("404".into())));
    let mut sink = RecordingSink::default();

    let err = exporter.run(composition_with_text(Size::new(100.0, 100.0)), &mut raster, &mut sink).unwrap_err();

    assert!(matches!(err, ExportError::Raster(RasterError::Image(_))));
    assert!(sink.saved.is_empty());
    assert!(!exporter.in_progress());
}

#[test]
fn sink_failure_is_reported() {
    let mut exporter = ExportCoordinator::default();
    let mut raster = FixedRaster(Ok(vec![1]));
    let mut sink = RecordingSink { fail: true, ..Default::default() };

    let err = exporter.run(composition_with_text(Size::new(100.0, 100.0)), &mut raster, &mut sink).unwrap_err();
    assert_eq!(err, ExportError::Download("disk full".into()));
}

#[test]
fn empty_composition_is_refused() {
    let mut exporter = ExportCoordinator::default();
    let empty = Composition { base: Size::new(100.0, 100.0), background: None, layers: Vec::new() };
    assert_eq!(exporter.begin(empty).unwrap_err(), ExportError::Empty);
    assert!(!exporter.in_progress());
}

#[test]
fn background_alone_is_exportable() {
    let mut exporter = ExportCoordinator::default();
    let bg_only = Composition {
        base: Size::new(100.0, 100.0),
        background: Some("data:image/jpeg;base64,AA==".into()),
        layers: Vec::new(),
    };
    assert!(exporter.begin(bg_only).is_ok());
}

#[test]
fn overlapping_export_is_busy() {
    let mut exporter = ExportCoordinator::default();
    let job = exporter.begin(composition_with_text(Size::new(100.0, 100.0))).unwrap();
    assert!(exporter.in_progress());

    assert_eq!(exporter.begin(composition_with_text(Size::new(100.0, 100.0))).unwrap_err(), ExportError::Busy);

    let mut sink = RecordingSink::default();
    exporter.finish(&job, Ok(vec![1, 2]), &mut sink).unwrap();
    assert!(exporter.begin(composition_with_text(Size::new(100.0, 100.0))).is_ok());
}

#[test]
fn cache_busted_appends_stamp() {
    assert_eq!(cache_busted("https://cdn.example/a.jpg", 42), "https://cdn.example/a.jpg?_=42");
    assert_eq!(cache_busted("https://cdn.example/a.jpg?w=1", 42), "https://cdn.example/a.jpg?w=1&_=42");
}

#[test]
fn cache_busted_leaves_data_urls_alone() {
    let url = "data:image/png;base64,AA==";
    assert_eq!(cache_busted(url, 7), url);
}
