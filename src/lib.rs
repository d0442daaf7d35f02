#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

use zen_core::gpu::{self, SurfaceRenderer};
use zen_core::{
    AcquireError, AdapterTier, FieldConfig, GestureError, GestureSample, HandLandmarks,
    RenderSurface, Rgb, Shape, Status,
};

mod constants;
mod dom;
mod frame;
mod overlay;

use frame::FrameContext;

type Shared = Rc<RefCell<FrameContext>>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("zen-web starting");
    Ok(())
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

async fn acquire_surface(
    canvas: &web::HtmlCanvasElement,
) -> Result<(SurfaceRenderer<'static>, AdapterTier), AcquireError> {
    let instance = wgpu::Instance::default();
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .map_err(|e| AcquireError::Surface(e.to_string()))?;
    gpu::acquire(&instance, surface, canvas.width(), canvas.height()).await
}

/// Idle/Failed -> Loading, then acquire the GPU asynchronously and mount.
fn mount(shared: &Shared) {
    let (canvas, generation) = {
        let mut ctx = shared.borrow_mut();
        if !ctx.vis.begin_mount() {
            return;
        }
        ctx.generation += 1;
        ctx.show_status();
        (ctx.canvas.clone(), ctx.generation)
    };
    let shared = shared.clone();
    spawn_local(async move {
        let acquired = acquire_surface(&canvas).await;
        let mut ctx = shared.borrow_mut();
        if ctx.generation != generation || *ctx.vis.status() != Status::Loading {
            log::info!("[mount] discarding stale acquisition");
            if let Ok((renderer, _)) = acquired {
                renderer.release();
            }
            return;
        }
        match acquired {
            Ok((renderer, tier)) => {
                let viewport = ctx.viewport();
                let now = ctx.now();
                ctx.vis.mount(renderer, viewport, tier, now);
            }
            Err(e) => ctx.vis.fail(&e),
        }
        ctx.show_status();
        let running = ctx.vis.is_running();
        drop(ctx);
        if running {
            let handle = frame::start_loop(&shared);
            shared.borrow_mut().loop_handle = Some(handle);
        }
    });
}

/// Stop the frame loop and release the GPU context.
fn unmount(shared: &Shared) {
    let mut ctx = shared.borrow_mut();
    ctx.generation += 1;
    ctx.stop_loop();
    ctx.vis.unmount();
    ctx.show_status();
}

/// Handle given to the page: it mounts the visualization onto a canvas and
/// receives gesture input from the page's hand tracker.
#[wasm_bindgen]
pub struct ParticleField {
    shared: Shared,
}

#[wasm_bindgen]
impl ParticleField {
    /// Bind to `canvas_id` (default `zen-canvas`) and wire the retry button.
    /// Nothing is acquired until `mount()`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: Option<String>,
        shape: Option<String>,
        color: Option<String>,
    ) -> Result<ParticleField, JsValue> {
        let document = dom::window_document().ok_or_else(|| js_error("no document"))?;
        let canvas_id = canvas_id.as_deref().unwrap_or(constants::CANVAS_ID);
        let canvas = dom::canvas_by_id(&document, canvas_id).map_err(js_error)?;
        dom::wire_canvas_resize(&canvas);

        let mut config = FieldConfig::default();
        if let Some(name) = shape {
            config.shape = name.parse().map_err(js_error)?;
        }
        if let Some(hex) = color {
            config.color = hex.parse().map_err(js_error)?;
        }

        let shared = Rc::new(RefCell::new(FrameContext::new(canvas, config)));
        let weak = Rc::downgrade(&shared);
        dom::add_click_listener(&document, constants::RETRY_BUTTON_ID, move || {
            if let Some(shared) = weak.upgrade() {
                unmount(&shared);
                mount(&shared);
            }
        });
        shared.borrow().show_status();
        Ok(ParticleField { shared })
    }

    pub fn mount(&self) {
        mount(&self.shared);
    }

    pub fn unmount(&self) {
        unmount(&self.shared);
    }

    /// Re-attempt acquisition from scratch.
    pub fn retry(&self) {
        unmount(&self.shared);
        mount(&self.shared);
    }

    /// Latest reading from the hand tracker. Claps trigger an explosion.
    pub fn push_gesture(&self, tension: f32, present: bool, x: f32, y: f32) {
        self.push_sample(GestureSample::new(tension, present, x, y));
    }

    /// Raw 21-point landmarks as a flat `[x0, y0, z0, x1, ...]` array; an
    /// empty array means no hand is visible.
    pub fn push_landmarks(&self, coords: &[f32]) {
        if coords.is_empty() {
            self.push_sample(GestureSample::absent());
            return;
        }
        match HandLandmarks::from_flat(coords) {
            Ok(hand) => self.push_sample(hand.to_sample()),
            Err(e) => self.submit_error(e),
        }
    }

    /// A single detection failed; the field keeps its previous sample.
    pub fn report_detection_error(&self, message: String) {
        self.submit_error(GestureError::Detection(message));
    }

    /// The hand tracker could not start; the visualization fails until retried.
    pub fn report_tracker_failure(&self, message: String) {
        unmount(&self.shared);
        let mut ctx = self.shared.borrow_mut();
        ctx.vis.fail(&AcquireError::GestureSource(message));
        ctx.show_status();
    }

    pub fn trigger_explosion(&self) {
        self.shared.borrow_mut().vis.trigger_explosion();
    }

    pub fn set_shape(&self, name: &str) -> Result<(), JsValue> {
        let shape: Shape = name.parse().map_err(js_error)?;
        self.shared.borrow_mut().vis.set_shape(shape);
        Ok(())
    }

    pub fn set_color(&self, hex: &str) -> Result<(), JsValue> {
        let color: Rgb = hex.parse().map_err(js_error)?;
        self.shared.borrow_mut().vis.set_color(color);
        Ok(())
    }

    pub fn smoothed_tension(&self) -> f32 {
        self.shared.borrow().vis.smoothed_tension()
    }

    pub fn status(&self) -> String {
        self.shared.borrow().vis.status().to_string()
    }

    pub fn degraded(&self) -> bool {
        *self.shared.borrow().vis.status() == Status::Running { degraded: true }
    }
}

impl ParticleField {
    fn push_sample(&self, sample: GestureSample) {
        let mut ctx = self.shared.borrow_mut();
        let now = ctx.now();
        if ctx.clap.observe(&sample, now) {
            log::info!("[gesture] clap");
            ctx.vis.trigger_explosion();
        }
        ctx.vis.submit_gesture(Ok(sample));
        if let Some(document) = dom::window_document() {
            overlay::tracker_warning(&document, None);
        }
    }

    fn submit_error(&self, err: GestureError) {
        if let Some(document) = dom::window_document() {
            overlay::tracker_warning(&document, Some(&err.to_string()));
        }
        self.shared.borrow_mut().vis.submit_gesture(Err(err));
    }
}

impl Drop for ParticleField {
    fn drop(&mut self) {
        unmount(&self.shared);
    }
}
