// Drives the mount/tick/unmount state machine with a surface that only
// counts what it is asked to do.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use zen_core::{
    AcquireError, AdapterTier, FieldConfig, FrameView, GestureError, GestureSample, RenderError,
    RenderSurface, Rgb, Shape, Status, TickOutcome, Viewport, Visualization,
};

const BASE: usize = 200;
const TRAIL: usize = 5;

#[derive(Default)]
struct Counters {
    draws: Cell<usize>,
    resizes: Cell<usize>,
    releases: Cell<usize>,
    last_vertices: Cell<usize>,
    last_color: Cell<Option<Rgb>>,
    last_explosion: Cell<f32>,
    /// Errors returned by upcoming draws, front first.
    fail_next: RefCell<Vec<RenderError>>,
}

struct CountingSurface {
    counters: Rc<Counters>,
}

impl RenderSurface for CountingSurface {
    fn resize(&mut self, _viewport: Viewport) {
        self.counters.resizes.set(self.counters.resizes.get() + 1);
    }

    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        let mut fail = self.counters.fail_next.borrow_mut();
        if !fail.is_empty() {
            return Err(fail.remove(0));
        }
        self.counters.draws.set(self.counters.draws.get() + 1);
        self.counters.last_vertices.set(frame.vertices.len());
        self.counters.last_color.set(Some(frame.color));
        self.counters.last_explosion.set(frame.explosion);
        Ok(())
    }

    fn release(self) {
        self.counters.releases.set(self.counters.releases.get() + 1);
    }
}

fn viewport() -> Viewport {
    Viewport::new(800, 600, 1.0)
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn mounted(counters: &Rc<Counters>) -> Visualization<CountingSurface> {
    let mut vis = Visualization::with_counts(FieldConfig::default(), BASE, TRAIL).seeded(99);
    assert!(vis.begin_mount());
    vis.mount(
        CountingSurface {
            counters: counters.clone(),
        },
        viewport(),
        AdapterTier::Preferred,
        Duration::ZERO,
    );
    vis
}

#[test]
fn idle_visualization_never_draws() {
    let mut vis: Visualization<CountingSurface> = Visualization::new(FieldConfig::default());
    assert_eq!(*vis.status(), Status::Idle);
    assert_eq!(vis.tick(ms(16)), Ok(TickOutcome::Stopped));
    assert!(vis.field().is_none());
    assert_eq!(vis.smoothed_tension(), 0.0);
    assert!(!vis.unmount());
}

#[test]
fn mount_builds_the_field_and_draws_every_tick() {
    let counters = Rc::new(Counters::default());
    let mut vis = mounted(&counters);
    assert_eq!(*vis.status(), Status::Running { degraded: false });
    assert_eq!(vis.particles().map(|p| p.len()), Some(BASE * TRAIL));

    for i in 1..=5 {
        assert_eq!(vis.tick(ms(16 * i)), Ok(TickOutcome::Drawn));
    }
    assert_eq!(counters.draws.get(), 5);
    assert_eq!(counters.last_vertices.get(), BASE * TRAIL);
    assert_eq!(vis.vertices().len(), BASE * TRAIL);
    let elapsed = vis.field().map(|f| f.elapsed).unwrap_or_default();
    assert!((elapsed - 0.080).abs() < 1e-5);
}

#[test]
fn begin_mount_refuses_while_running() {
    let counters = Rc::new(Counters::default());
    let mut vis = mounted(&counters);
    assert!(!vis.begin_mount());
    assert_eq!(*vis.status(), Status::Running { degraded: false });
}

#[test]
fn fallback_adapter_runs_degraded() {
    let counters = Rc::new(Counters::default());
    let mut vis: Visualization<CountingSurface> =
        Visualization::with_counts(FieldConfig::default(), BASE, TRAIL);
    vis.begin_mount();
    vis.mount(
        CountingSurface {
            counters: counters.clone(),
        },
        viewport(),
        AdapterTier::Fallback,
        Duration::ZERO,
    );
    assert_eq!(*vis.status(), Status::Running { degraded: true });
    assert_eq!(vis.status().to_string(), "running (degraded)");
    assert_eq!(vis.tick(ms(16)), Ok(TickOutcome::Drawn));
}

#[test]
fn acquisition_failure_is_visible_and_retryable() {
    let mut vis: Visualization<CountingSurface> = Visualization::new(FieldConfig::default());
    assert!(vis.begin_mount());
    assert_eq!(*vis.status(), Status::Loading);
    vis.fail(&AcquireError::NoAdapter);
    assert_eq!(
        *vis.status(),
        Status::Failed("no compatible GPU adapter found".into())
    );
    assert_eq!(vis.tick(ms(16)), Ok(TickOutcome::Stopped));

    assert!(vis.begin_mount());
    assert_eq!(*vis.status(), Status::Loading);
}

#[test]
fn unmount_while_loading_returns_to_idle() {
    let mut vis: Visualization<CountingSurface> = Visualization::new(FieldConfig::default());
    vis.begin_mount();
    assert!(!vis.unmount());
    assert_eq!(*vis.status(), Status::Idle);
}

#[test]
fn teardown_stops_draws_and_releases_once() {
    let counters = Rc::new(Counters::default());
    let mut vis = mounted(&counters);
    vis.tick(ms(16)).ok();
    vis.tick(ms(32)).ok();
    let draws = counters.draws.get();

    assert!(vis.unmount());
    assert_eq!(*vis.status(), Status::Idle);
    assert_eq!(counters.releases.get(), 1);

    // a frame callback that was already scheduled fires after teardown
    for i in 3..10 {
        assert_eq!(vis.tick(ms(16 * i)), Ok(TickOutcome::Stopped));
    }
    assert_eq!(counters.draws.get(), draws);

    assert!(!vis.unmount());
    drop(vis);
    assert_eq!(counters.releases.get(), 1);
}

#[test]
fn dropping_a_running_visualization_releases_once() {
    let counters = Rc::new(Counters::default());
    let vis = mounted(&counters);
    drop(vis);
    assert_eq!(counters.releases.get(), 1);
}

#[test]
fn remount_releases_the_previous_surface() {
    let counters = Rc::new(Counters::default());
    let mut vis = mounted(&counters);
    vis.unmount();
    assert!(vis.begin_mount());
    vis.mount(
        CountingSurface {
            counters: counters.clone(),
        },
        viewport(),
        AdapterTier::Preferred,
        ms(100),
    );
    assert_eq!(counters.releases.get(), 1);
    // field state starts over
    assert_eq!(vis.field().map(|f| f.elapsed), Some(0.0));
    drop(vis);
    assert_eq!(counters.releases.get(), 2);
}

#[test]
fn shape_change_resamples_targets_but_keeps_per_particle_data() {
    let counters = Rc::new(Counters::default());
    let mut vis = mounted(&counters);
    vis.tick(ms(16)).ok();
    let before = vis.particles().cloned().expect("running");

    vis.set_shape(Shape::Heart);
    assert_eq!(vis.config().shape, Shape::Heart);
    // applied at the start of the next tick, not immediately
    assert_eq!(vis.particles(), Some(&before));

    vis.tick(ms(32)).ok();
    let after = vis.particles().expect("running");
    assert_eq!(after.randomness, before.randomness);
    assert_eq!(after.scale, before.scale);
    assert_eq!(after.trail_index, before.trail_index);
    assert_eq!(after.len(), before.len());
    let kept = (0..BASE)
        .filter(|&i| after.base_target(i) == before.base_target(i))
        .count();
    assert_eq!(kept, 0);
}

#[test]
fn shape_selected_while_idle_is_used_on_mount() {
    let counters = Rc::new(Counters::default());
    let mut vis: Visualization<CountingSurface> =
        Visualization::with_counts(FieldConfig::default(), BASE, TRAIL);
    vis.set_shape(Shape::Flower);
    vis.begin_mount();
    vis.mount(
        CountingSurface {
            counters: counters.clone(),
        },
        viewport(),
        AdapterTier::Preferred,
        Duration::ZERO,
    );
    // flower index 0 sits at the bottom of the cup
    let first = vis.particles().and_then(|p| p.base_target(0));
    assert_eq!(first, Some(glam::Vec3::new(0.0, -2.0, 0.0)));
}

#[test]
fn colour_change_applies_on_the_next_frame_without_resampling() {
    let counters = Rc::new(Counters::default());
    let mut vis = mounted(&counters);
    vis.tick(ms(16)).ok();
    let targets = vis.particles().cloned();

    let magenta = Rgb::new(255, 0, 255);
    vis.set_color(magenta);
    vis.tick(ms(32)).ok();
    assert_eq!(counters.last_color.get(), Some(magenta));
    assert_eq!(vis.particles().cloned(), targets);
}

#[test]
fn explosion_is_applied_at_the_next_tick() {
    let counters = Rc::new(Counters::default());
    let mut vis = mounted(&counters);
    vis.tick(ms(16)).ok();

    vis.trigger_explosion();
    vis.trigger_explosion();
    assert_eq!(vis.field().map(|f| f.explosion_impulse), Some(0.0));

    // zero dt: the impulse is exactly at full strength when drawn
    vis.tick(ms(16)).ok();
    assert_eq!(counters.last_explosion.get(), 1.0);

    vis.tick(ms(116)).ok();
    let impulse = vis.field().map(|f| f.explosion_impulse).unwrap_or_default();
    assert!((impulse - 0.7).abs() < 1e-5, "{impulse}");
}

#[test]
fn explosion_while_idle_is_ignored() {
    let counters = Rc::new(Counters::default());
    let mut vis: Visualization<CountingSurface> =
        Visualization::with_counts(FieldConfig::default(), BASE, TRAIL);
    vis.trigger_explosion();
    vis.begin_mount();
    vis.mount(
        CountingSurface {
            counters: counters.clone(),
        },
        viewport(),
        AdapterTier::Preferred,
        Duration::ZERO,
    );
    vis.tick(ms(16)).ok();
    assert_eq!(counters.last_explosion.get(), 0.0);
}

#[test]
fn gesture_failures_keep_the_previous_sample() {
    let counters = Rc::new(Counters::default());
    let mut vis = mounted(&counters);
    vis.submit_gesture(Ok(GestureSample::new(0.9, true, 0.5, 0.5)));
    vis.tick(ms(100)).ok();
    let first = vis.smoothed_tension();
    assert!(first > 0.0);

    vis.submit_gesture(Err(GestureError::Detection("frame dropped".into())));
    assert_eq!(vis.latest_gesture().tension, 0.9);
    vis.tick(ms(200)).ok();
    assert!(vis.smoothed_tension() > first);
    assert!(vis.smoothed_tension() < 0.9);
}

#[test]
fn resize_keeps_the_animation_running() {
    let counters = Rc::new(Counters::default());
    let mut vis = mounted(&counters);
    vis.tick(ms(500)).ok();
    let elapsed = vis.field().map(|f| f.elapsed);

    let wide = Viewport::new(1920, 1080, 2.0);
    vis.resize(wide);
    vis.resize(wide);
    assert_eq!(counters.resizes.get(), 1);
    assert_eq!(vis.viewport(), Some(wide));
    assert_eq!(vis.field().map(|f| f.elapsed), elapsed);
    assert_eq!(vis.tick(ms(516)), Ok(TickOutcome::Drawn));
}

#[test]
fn viewport_is_sanitized() {
    let v = Viewport::new(0, 0, f32::NAN);
    assert_eq!((v.width, v.height, v.pixel_ratio), (1, 1, 1.0));
    assert_eq!(Viewport::new(10, 10, 3.0).pixel_ratio, 2.0);
}

#[test]
fn lost_surface_is_reconfigured_and_the_frame_skipped() {
    let counters = Rc::new(Counters::default());
    let mut vis = mounted(&counters);
    counters
        .fail_next
        .borrow_mut()
        .extend([RenderError::Lost, RenderError::Timeout]);
    assert_eq!(vis.tick(ms(16)), Ok(TickOutcome::Skipped));
    assert_eq!(counters.resizes.get(), 1);
    assert_eq!(vis.tick(ms(32)), Ok(TickOutcome::Skipped));
    assert_eq!(vis.tick(ms(48)), Ok(TickOutcome::Drawn));
    assert!(vis.is_running());
}

#[test]
fn fatal_render_error_tears_down() {
    let counters = Rc::new(Counters::default());
    let mut vis = mounted(&counters);
    counters
        .fail_next
        .borrow_mut()
        .push(RenderError::OutOfMemory);
    assert_eq!(vis.tick(ms(16)), Err(RenderError::OutOfMemory));
    assert!(!vis.is_running());
    assert_eq!(counters.releases.get(), 1);
    assert_eq!(*vis.status(), Status::Failed("out of GPU memory".into()));
    assert_eq!(vis.tick(ms(32)), Ok(TickOutcome::Stopped));
    assert!(vis.begin_mount());
}
