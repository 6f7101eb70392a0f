//! Browser bindings used by [`crate::browser::Engine`].
//!
//! Every listener or observer registered here is owned by a guard that
//! unregisters it on drop, so a torn-down editor leaves nothing attached to the
//! window.

use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlAnchorElement, HtmlImageElement, PointerEvent, ResizeObserver, Window};

use studio_wire::{DataUrl, GenerateRequest, GenerateResponse};

use crate::background::{BackgroundError, interpret_response};
use crate::consts::EXPORT_MIME;
use crate::export::{DownloadSink, RasterError};
use crate::geometry::{Point, Rect};

/// Client-space position of a pointer event.
#[must_use]
pub fn client_point(event: &PointerEvent) -> Point {
    Point::new(f64::from(event.client_x()), f64::from(event.client_y()))
}

/// The element's current bounding rect in client space.
#[must_use]
pub fn client_rect(element: &Element) -> Rect {
    let r = element.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

// =============================================================
// Window pointer subscription
// =============================================================

/// Window-level `pointermove` / `pointerup` listeners.
///
/// Attached to the window rather than the frame so a drag keeps tracking when
/// the pointer leaves the canvas. `pointercancel` is treated as a release.
pub struct WindowPointerSubscription {
    window: Window,
    on_move: Closure<dyn FnMut(PointerEvent)>,
    on_up: Closure<dyn FnMut(PointerEvent)>,
}

impl WindowPointerSubscription {
    /// # Errors
    ///
    /// Returns `Err` if the browser refuses a listener.
    pub fn attach(
        window: Window,
        on_move: impl FnMut(PointerEvent) + 'static,
        on_up: impl FnMut(PointerEvent) + 'static,
    ) -> Result<Self, JsValue> {
        let on_move = Closure::wrap(Box::new(on_move) as Box<dyn FnMut(PointerEvent)>);
        let on_up = Closure::wrap(Box::new(on_up) as Box<dyn FnMut(PointerEvent)>);
        window.add_event_listener_with_callback("pointermove", on_move.as_ref().unchecked_ref())?;
        window.add_event_listener_with_callback("pointerup", on_up.as_ref().unchecked_ref())?;
        window.add_event_listener_with_callback("pointercancel", on_up.as_ref().unchecked_ref())?;
        Ok(Self { window, on_move, on_up })
    }
}

impl Drop for WindowPointerSubscription {
    fn drop(&mut self) {
        let removals = [
            ("pointermove", &self.on_move),
            ("pointerup", &self.on_up),
            ("pointercancel", &self.on_up),
        ];
        for (event, callback) in removals {
            if let Err(err) = self
                .window
                .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            {
                log::warn!("failed to detach {event} listener: {err:?}");
            }
        }
    }
}

// =============================================================
// Frame observer
// =============================================================

/// Reports the frame element's client rect whenever its size changes.
pub struct FrameObserver {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl FrameObserver {
    /// Observe `frame`, calling `on_resize` with its bounding rect.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `ResizeObserver` is unavailable.
    pub fn observe(frame: Element, mut on_resize: impl FnMut(Rect) + 'static) -> Result<Self, JsValue> {
        let target = frame.clone();
        let callback = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
            on_resize(client_rect(&target));
        }) as Box<dyn FnMut(js_sys::Array)>);
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(&frame);
        Ok(Self { observer, _callback: callback })
    }
}

impl Drop for FrameObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

// =============================================================
// Network and files
// =============================================================

/// `POST {api_base}/api/generate` through the browser fetch API.
///
/// # Errors
///
/// See [`interpret_response`]; network failures become
/// [`BackgroundError::Transport`].
pub async fn request_background(
    api_base: &str,
    request: &GenerateRequest,
) -> Result<GenerateResponse, BackgroundError> {
    let url = format!("{}/api/generate", api_base.trim_end_matches('/'));
    let response = gloo_net::http::Request::post(&url)
        .json(request)
        .map_err(|e| BackgroundError::Transport(e.to_string()))?
        .send()
        .await
        .map_err(|e| BackgroundError::Transport(e.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackgroundError::Transport(e.to_string()))?;
    interpret_response(status, &body)
}

/// Load and decode an image so it can be drawn synchronously.
///
/// # Errors
///
/// [`RasterError::Image`] when the image cannot be fetched or decoded.
pub async fn load_image(src: &str) -> Result<HtmlImageElement, RasterError> {
    let img = HtmlImageElement::new().map_err(|e| RasterError::Image(format!("{e:?}")))?;
    img.set_cross_origin(Some("anonymous"));
    img.set_src(src);
    JsFuture::from(img.decode())
        .await
        .map_err(|e| RasterError::Image(format!("{e:?}")))?;
    Ok(img)
}

/// Saves exports by clicking a temporary `<a download>` link.
pub struct AnchorDownload {
    document: Document,
}

impl AnchorDownload {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl DownloadSink for AnchorDownload {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), String> {
        let anchor: HtmlAnchorElement = self
            .document
            .create_element("a")
            .and_then(|el| el.dyn_into::<HtmlAnchorElement>().map_err(JsValue::from))
            .map_err(|e| format!("{e:?}"))?;
        anchor.set_href(&DataUrl::encode(EXPORT_MIME, bytes));
        anchor.set_download(filename);
        anchor.click();
        Ok(())
    }
}
