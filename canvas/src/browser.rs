//! Browser engine: [`EngineCore`] bound to the DOM.
//!
//! [`Engine`] observes the frame element, listens for pointer movement on the
//! window, and runs generation and export on the browser event loop. Async
//! completions re-enter the core through its public methods only.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, PointerEvent};

use crate::background::BackgroundError;
use crate::doc::LayerId;
use crate::dom::{self, AnchorDownload, FrameObserver, WindowPointerSubscription};
use crate::engine::{Action, EngineConfig, EngineCore};
use crate::export::{self, ExportError, Rasterizer};
use crate::render::Canvas2dRasterizer;

/// Receives actions produced outside a direct host call.
type Notify = Rc<dyn Fn(&[Action])>;

/// The browser engine. Shares an `EngineCore` with its DOM callbacks.
///
/// Dropping the engine detaches the resize observer and window listeners.
pub struct Engine {
    core: Rc<RefCell<EngineCore>>,
    document: Document,
    api_base: String,
    notify: Notify,
    _frame: FrameObserver,
    _pointer: WindowPointerSubscription,
}

impl Engine {
    /// Bind an engine to the `frame` element.
    ///
    /// `api_base` is the origin of the generation proxy (empty for same
    /// origin). `on_actions` receives actions raised by window listeners and
    /// async completions.
    ///
    /// # Errors
    ///
    /// Returns `Err` if no window is available or a listener cannot attach.
    pub fn new(
        frame: Element,
        config: EngineConfig,
        api_base: impl Into<String>,
        on_actions: impl Fn(&[Action]) + 'static,
    ) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
        let core = Rc::new(RefCell::new(EngineCore::with_config(config)));
        let notify: Notify = Rc::new(on_actions);

        core.borrow_mut().observe_frame(dom::client_rect(&frame));

        let resize_core = Rc::clone(&core);
        let resize_notify = Rc::clone(&notify);
        let frame_observer = FrameObserver::observe(frame, move |rect| {
            let changed = resize_core.borrow_mut().observe_frame(rect);
            if changed {
                resize_notify(&[Action::RenderNeeded]);
            }
        })?;

        let move_core = Rc::clone(&core);
        let move_notify = Rc::clone(&notify);
        let up_core = Rc::clone(&core);
        let up_notify = Rc::clone(&notify);
        let pointer = WindowPointerSubscription::attach(
            window,
            move |event| {
                let actions = move_core.borrow_mut().on_pointer_move(dom::client_point(&event));
                if !actions.is_empty() {
                    move_notify(&actions);
                }
            },
            move |_event| {
                let actions = up_core.borrow_mut().on_pointer_up();
                if !actions.is_empty() {
                    up_notify(&actions);
                }
            },
        )?;

        Ok(Self {
            core,
            document,
            api_base: api_base.into(),
            notify,
            _frame: frame_observer,
            _pointer: pointer,
        })
    }

    /// Shared handle to the core for reads and synchronous edits.
    #[must_use]
    pub fn core(&self) -> Rc<RefCell<EngineCore>> {
        Rc::clone(&self.core)
    }

    /// Forward a `pointerdown` from a layer element (`Some`) or the bare frame
    /// (`None`).
    pub fn pointer_down(&self, event: &PointerEvent, target: Option<LayerId>) -> Vec<Action> {
        event.prevent_default();
        if target.is_some() {
            // Keep the frame's own handler from treating this as an empty-canvas press.
            event.stop_propagation();
        }
        self.core.borrow_mut().on_pointer_down(dom::client_point(event), target)
    }

    /// Request a background for `prompt`. The outcome arrives through the
    /// action callback as [`Action::GenerationFinished`].
    ///
    /// # Errors
    ///
    /// [`BackgroundError::EmptyPrompt`] without sending anything.
    pub fn generate(&self, prompt: &str) -> Result<(), BackgroundError> {
        let pending = self.core.borrow_mut().begin_generation(prompt)?;
        let core = Rc::clone(&self.core);
        let notify = Rc::clone(&self.notify);
        let api_base = self.api_base.clone();
        spawn_local(async move {
            let result = dom::request_background(&api_base, &pending.request).await;
            let outcome = core.borrow_mut().complete_generation(pending.token, result);
            notify(&[Action::GenerationFinished(outcome), Action::RenderNeeded]);
        });
        Ok(())
    }

    /// Export the composition as a PNG download. The result arrives through
    /// the action callback as [`Action::ExportFinished`].
    ///
    /// # Errors
    ///
    /// [`ExportError::Busy`] or [`ExportError::Empty`] before any work starts.
    pub fn export(&self) -> Result<(), ExportError> {
        let job = self.core.borrow_mut().begin_export()?;
        let core = Rc::clone(&self.core);
        let notify = Rc::clone(&self.notify);
        let document = self.document.clone();
        spawn_local(async move {
            let background = match job.composition.background.as_deref() {
                Some(src) if job.options.cache_bust => dom::load_image(&export::cache_busted(src, now_stamp()))
                    .await
                    .map(Some),
                Some(src) => dom::load_image(src).await.map(Some),
                None => Ok(None),
            };
            let rendered = background.and_then(|img| {
                Canvas2dRasterizer::new(document.clone(), img).render(&job.composition, &job.options)
            });
            let mut sink = AnchorDownload::new(document);
            let result = core.borrow_mut().finish_export(&job, rendered, &mut sink);
            notify(&[Action::ExportFinished(result)]);
        });
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn now_stamp() -> u64 {
    js_sys::Date::now() as u64
}
