use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use instant::Instant;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use zen_core::gpu::SurfaceRenderer;
use zen_core::{ClapDetector, FieldConfig, TickOutcome, Viewport, Visualization};

use crate::{dom, overlay};

pub struct FrameContext {
    pub vis: Visualization<SurfaceRenderer<'static>>,
    pub canvas: web::HtmlCanvasElement,
    pub clap: ClapDetector,
    pub start: Instant,
    /// Bumped on every mount/unmount so a late acquisition can tell it is stale.
    pub generation: u64,
    pub loop_handle: Option<LoopHandle>,
}

impl FrameContext {
    pub fn new(canvas: web::HtmlCanvasElement, config: FieldConfig) -> Self {
        Self {
            vis: Visualization::new(config),
            canvas,
            clap: ClapDetector::default(),
            start: Instant::now(),
            generation: 0,
            loop_handle: None,
        }
    }

    pub fn now(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.canvas.width(), self.canvas.height(), dom::pixel_ratio())
    }

    pub fn show_status(&self) {
        if let Some(document) = dom::window_document() {
            overlay::render_status(&document, self.vis.status());
        }
    }

    /// Stop the frame loop if one is scheduled.
    pub fn stop_loop(&mut self) {
        if let Some(handle) = self.loop_handle.take() {
            handle.cancel();
        }
    }

    /// One animation frame. Returns false when the loop should stop.
    pub fn frame(&mut self) -> bool {
        let viewport = self.viewport();
        self.vis.resize(viewport);
        match self.vis.tick(self.now()) {
            Ok(TickOutcome::Stopped) => false,
            Ok(TickOutcome::Drawn | TickOutcome::Skipped) => true,
            Err(e) => {
                log::error!("[frame] render error: {e}");
                self.show_status();
                false
            }
        }
    }
}

type TickSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Owns the requestAnimationFrame callback; cancelling drops it.
pub struct LoopHandle {
    slot: TickSlot,
    raf_id: Rc<Cell<Option<i32>>>,
}

impl LoopHandle {
    pub fn cancel(self) {
        if let (Some(id), Some(w)) = (self.raf_id.take(), web::window()) {
            _ = w.cancel_animation_frame(id);
        }
        self.slot.borrow_mut().take();
    }
}

fn request_frame(slot: &TickSlot, raf_id: &Cell<Option<i32>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(tick) = slot.borrow().as_ref() {
        raf_id.set(w.request_animation_frame(tick.as_ref().unchecked_ref()).ok());
    }
}

/// The callback only holds a weak reference to the context, which owns the
/// returned handle.
pub fn start_loop(frame_ctx: &Rc<RefCell<FrameContext>>) -> LoopHandle {
    let frame_ctx: Weak<RefCell<FrameContext>> = Rc::downgrade(frame_ctx);
    let tick: TickSlot = Rc::new(RefCell::new(None));
    let raf_id = Rc::new(Cell::new(None));
    let tick_clone = tick.clone();
    let raf_clone = raf_id.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        raf_clone.set(None);
        let Some(frame_ctx) = frame_ctx.upgrade() else {
            return;
        };
        let keep_going = frame_ctx.borrow_mut().frame();
        if keep_going {
            request_frame(&tick_clone, &raf_clone);
        }
    }) as Box<dyn FnMut()>));
    request_frame(&tick, &raf_id);
    LoopHandle { slot: tick, raf_id }
}
