use std::time::Instant;

use winit::event::*;
use winit::event_loop::{EventLoop, EventLoopWindowTarget};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use zen_core::constants::THEME_COLORS;
use zen_core::gpu::{self, SurfaceRenderer};
use zen_core::{AcquireError, FieldConfig, Rgb, Shape, TickOutcome, Viewport, Visualization};

mod hand;

use hand::MouseHand;

struct App<'w> {
    window: &'w Window,
    instance: wgpu::Instance,
    vis: Visualization<SurfaceRenderer<'w>>,
    hand: MouseHand,
    start: Instant,
    color_index: usize,
}

impl<'w> App<'w> {
    fn new(window: &'w Window) -> Self {
        Self {
            window,
            instance: wgpu::Instance::default(),
            vis: Visualization::new(FieldConfig::default()),
            hand: MouseHand::default(),
            start: Instant::now(),
            color_index: 0,
        }
    }

    fn viewport(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::new(size.width, size.height, self.window.scale_factor() as f32)
    }

    /// Acquire a surface and mount; on failure the status carries the reason.
    fn mount(&mut self) {
        if !self.vis.begin_mount() {
            return;
        }
        self.update_title();
        let viewport = self.viewport();
        let acquired = self
            .instance
            .create_surface(self.window)
            .map_err(|e| AcquireError::Surface(e.to_string()))
            .and_then(|surface| {
                pollster::block_on(gpu::acquire(
                    &self.instance,
                    surface,
                    viewport.width,
                    viewport.height,
                ))
            });
        match acquired {
            Ok((renderer, tier)) => {
                self.vis
                    .mount(renderer, viewport, tier, self.start.elapsed())
            }
            Err(e) => self.vis.fail(&e),
        }
        self.update_title();
    }

    fn remount(&mut self) {
        self.vis.unmount();
        self.mount();
    }

    fn update_title(&self) {
        let config = self.vis.config();
        self.window.set_title(&format!(
            "zen particles: {} {} [{}]",
            config.shape,
            config.color,
            self.vis.status()
        ));
    }

    fn key(&mut self, key: &Key, elwt: &EventLoopWindowTarget<()>) {
        match key {
            Key::Named(NamedKey::Escape) => elwt.exit(),
            Key::Named(NamedKey::Space) => self.vis.trigger_explosion(),
            Key::Character(c) => match c.as_str() {
                "r" | "R" => self.remount(),
                "c" | "C" => {
                    self.color_index = (self.color_index + 1) % THEME_COLORS.len();
                    match THEME_COLORS[self.color_index].parse::<Rgb>() {
                        Ok(color) => self.vis.set_color(color),
                        Err(e) => log::warn!("{e}"),
                    }
                    self.update_title();
                }
                digit => {
                    let picked = digit
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| Shape::ALL.get(i).copied());
                    if let Some(shape) = picked {
                        self.vis.set_shape(shape);
                        self.update_title();
                    }
                }
            },
            _ => {}
        }
    }

    fn frame(&mut self, elwt: &EventLoopWindowTarget<()>) {
        if !self.vis.is_running() {
            return;
        }
        let now = self.start.elapsed();
        let (sample, clapped) = self.hand.poll(self.window.inner_size(), now);
        self.vis.submit_gesture(Ok(sample));
        if clapped {
            log::info!("clap");
            self.vis.trigger_explosion();
        }
        match self.vis.tick(now) {
            Ok(TickOutcome::Drawn | TickOutcome::Skipped) => self.window.request_redraw(),
            Ok(TickOutcome::Stopped) => {}
            Err(e) => {
                log::error!("render failed: {e}");
                self.update_title();
                if matches!(e, zen_core::RenderError::OutOfMemory) {
                    elwt.exit();
                }
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("zen particles")
        .build(&event_loop)?;

    let mut app = App::new(&window);
    app.mount();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => {
                app.vis.unmount();
                elwt.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                let viewport = app.viewport();
                app.vis.resize(viewport);
            }
            WindowEvent::CursorMoved { position, .. } => app.hand.moved(position),
            WindowEvent::CursorLeft { .. } => app.hand.left(),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => app.hand.button(state),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => app.key(&logical_key, elwt),
            _ => {}
        },
        Event::AboutToWait => app.frame(elwt),
        _ => {}
    })?;
    Ok(())
}
