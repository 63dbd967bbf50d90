//! Integration tests for the dual-view render/composite pipeline.
//!
//! These run entirely on the dummy backend: every allocation, camera
//! render and compositing pass is recorded, so layout coverage and
//! resource-lifetime properties are asserted without GPU hardware.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use rstest::rstest;

use lookdev::{
    AssetId, Camera, CaptureTool, Compositor, ContentAsset, Context, DataProvider, DisplaySurface,
    DummyBackend, DummyStats, EnvironmentSetup, FrameLoop, LayoutMode, PanelSurface, Rect,
    SceneSettingsRegistry, SplitKind, SurfaceHandle, ViewCompositionIndex, ViewSlot,
};

const FIRST_STAGE: &str = "lookdev_first_view";
const SECOND_STAGE: &str = "lookdev_second_view";

struct TestProvider;

impl DataProvider for TestProvider {
    fn environment_setup(&self) -> EnvironmentSetup {
        EnvironmentSetup {
            skybox: Some(AssetId(99)),
            ..EnvironmentSetup::default()
        }
    }

    fn configure_camera(&self, camera: &mut Camera) {
        camera.set_fov_y(50.0_f32.to_radians());
    }
}

#[derive(Default)]
struct TestCaptureTool {
    available: Cell<bool>,
    begins: Cell<u32>,
    ends: Cell<u32>,
}

impl CaptureTool for TestCaptureTool {
    fn is_available(&self) -> bool {
        self.available.get()
    }

    fn begin_capture(&self, _surface: SurfaceHandle) {
        self.begins.set(self.begins.get() + 1);
    }

    fn end_capture(&self, _surface: SurfaceHandle) {
        self.ends.set(self.ends.get() + 1);
    }
}

struct Rig {
    frame_loop: FrameLoop,
    compositor: Rc<RefCell<Compositor>>,
    surface: Rc<RefCell<PanelSurface>>,
    context: Rc<RefCell<Context>>,
    stats: Arc<DummyStats>,
    capture: Rc<TestCaptureTool>,
}

fn rig() -> Rig {
    let _ = env_logger::builder().is_test(true).try_init();

    let backend = DummyBackend::new();
    let stats = backend.stats();

    let surface = Rc::new(RefCell::new(PanelSurface::new(Rect::from_dimensions(
        200.0, 100.0,
    ))));
    let context = Rc::new(RefCell::new(Context::new()));
    let frame_loop = FrameLoop::new();
    let settings = SceneSettingsRegistry::new();
    let capture = Rc::new(TestCaptureTool::default());

    let compositor = Compositor::new(
        Arc::new(backend),
        surface.clone() as Rc<RefCell<dyn DisplaySurface>>,
        Rc::clone(&context),
        &TestProvider,
        &settings,
        &frame_loop,
        Some(capture.clone() as Rc<dyn CaptureTool>),
    )
    .expect("compositor construction");

    Rig {
        frame_loop,
        compositor,
        surface,
        context,
        stats,
        capture,
    }
}

// ============================================================================
// Layout Coverage
// ============================================================================

/// Each layout renders exactly its active slots, in slot order, and
/// composites only for the custom layouts.
#[rstest]
#[case::full_first(LayoutMode::FullFirst, &[FIRST_STAGE], 0)]
#[case::full_second(LayoutMode::FullSecond, &[SECOND_STAGE], 0)]
#[case::horizontal(LayoutMode::HorizontalSplit, &[FIRST_STAGE, SECOND_STAGE], 0)]
#[case::vertical(LayoutMode::VerticalSplit, &[FIRST_STAGE, SECOND_STAGE], 0)]
#[case::custom_split(LayoutMode::CustomSplit, &[FIRST_STAGE, SECOND_STAGE], 1)]
#[case::custom_circular(LayoutMode::CustomCircular, &[FIRST_STAGE, SECOND_STAGE], 1)]
fn layout_renders_expected_slots(
    #[case] layout: LayoutMode,
    #[case] expected_renders: &[&str],
    #[case] expected_composites: usize,
) {
    let rig = rig();
    rig.surface.borrow_mut().set_layout(layout);

    rig.frame_loop.tick();

    assert_eq!(rig.context.borrow().layout, layout);
    assert_eq!(rig.stats.render_log(), expected_renders);
    assert_eq!(rig.stats.composite_count(), expected_composites);
}

#[rstest]
#[case::custom_split(LayoutMode::CustomSplit, SplitKind::Plane)]
#[case::custom_circular(LayoutMode::CustomCircular, SplitKind::Circle)]
fn composite_layouts_use_their_split_kind(
    #[case] layout: LayoutMode,
    #[case] expected: SplitKind,
) {
    let rig = rig();
    rig.surface.borrow_mut().set_layout(layout);

    rig.frame_loop.tick();

    assert_eq!(rig.stats.composite_log(), vec![expected]);
}

#[test]
fn full_layouts_deliver_to_the_composite_output() {
    let rig = rig();
    rig.frame_loop.tick();

    let surface = rig.surface.borrow();
    assert!(surface.output(ViewCompositionIndex::Composite).is_some());
    assert!(surface.output(ViewCompositionIndex::First).is_none());
    assert!(surface.output(ViewCompositionIndex::Second).is_none());
}

#[test]
fn split_layouts_deliver_per_view_outputs() {
    let rig = rig();
    rig.surface.borrow_mut().set_layout(LayoutMode::VerticalSplit);
    rig.frame_loop.tick();

    let surface = rig.surface.borrow();
    let first = surface.output(ViewCompositionIndex::First).unwrap();
    let second = surface.output(ViewCompositionIndex::Second).unwrap();
    assert!(surface.output(ViewCompositionIndex::Composite).is_none());

    // Half the 200x100 panel each, supersampled 2x.
    assert_eq!((first.width(), first.height()), (200, 200));
    assert_eq!((second.width(), second.height()), (200, 200));
}

#[test]
fn composite_views_render_at_the_full_composite_rect() {
    let rig = rig();
    rig.surface.borrow_mut().set_layout(LayoutMode::CustomSplit);
    rig.frame_loop.tick();

    let surface = rig.surface.borrow();
    let composite = surface.output(ViewCompositionIndex::Composite).unwrap();
    // 200x100 panel, supersampled 2x.
    assert_eq!((composite.width(), composite.height()), (400, 200));
}

// ============================================================================
// Resource Lifetime
// ============================================================================

#[test]
fn steady_state_frames_do_not_reallocate() {
    let rig = rig();
    rig.surface.borrow_mut().set_layout(LayoutMode::VerticalSplit);

    rig.frame_loop.tick();
    let created_after_first = rig.stats.textures_created();

    for _ in 0..10 {
        rig.frame_loop.tick();
    }

    assert_eq!(rig.stats.textures_created(), created_after_first);
    assert_eq!(rig.stats.textures_destroyed(), 0);
}

#[test]
fn panel_resize_reallocates_each_slot_once() {
    let rig = rig();
    rig.surface.borrow_mut().set_layout(LayoutMode::VerticalSplit);
    rig.frame_loop.tick();
    assert_eq!(rig.stats.textures_created(), 2);

    rig.surface
        .borrow_mut()
        .set_panel_rect(Rect::from_dimensions(300.0, 100.0));
    rig.frame_loop.tick();

    assert_eq!(rig.stats.textures_created(), 4);
    assert_eq!(rig.stats.textures_destroyed(), 2);
}

#[test]
fn degenerate_panel_produces_no_output_and_no_allocation() {
    let rig = rig();
    rig.surface
        .borrow_mut()
        .set_panel_rect(Rect::from_dimensions(0.0, 0.0));
    rig.frame_loop.tick();

    assert_eq!(rig.stats.textures_created(), 0);
    assert_eq!(rig.stats.render_count(), 0);
    assert!(
        rig.surface
            .borrow()
            .output(ViewCompositionIndex::Composite)
            .is_none()
    );

    // The panel coming back next frame resumes rendering untouched.
    rig.surface
        .borrow_mut()
        .set_panel_rect(Rect::from_dimensions(200.0, 100.0));
    rig.frame_loop.tick();
    assert_eq!(rig.stats.render_count(), 1);
}

#[test]
fn degenerate_composite_rect_skips_the_blend_pass() {
    let rig = rig();
    rig.surface.borrow_mut().set_layout(LayoutMode::CustomCircular);
    rig.surface
        .borrow_mut()
        .set_panel_rect(Rect::from_dimensions(5.0, f32::NAN));
    rig.frame_loop.tick();

    assert_eq!(rig.stats.render_count(), 0);
    assert_eq!(rig.stats.composite_count(), 0);
}

// ============================================================================
// Content Updates
// ============================================================================

#[test]
fn view_content_follows_the_context() {
    let rig = rig();

    rig.context
        .borrow_mut()
        .view_content_mut(ViewSlot::First)
        .asset = Some(ContentAsset::new(AssetId(5), "preview_sphere"));
    rig.compositor
        .borrow_mut()
        .update_view_content(ViewSlot::First);

    {
        let compositor = rig.compositor.borrow();
        let stage = compositor.stages().stage(ViewSlot::First);
        assert!(stage.content().is_some());
        assert!(!stage.is_content_visible());
    }

    // Content stays hidden outside the render call.
    rig.frame_loop.tick();
    let compositor = rig.compositor.borrow();
    assert!(
        !compositor
            .stages()
            .stage(ViewSlot::First)
            .is_content_visible()
    );
}

// ============================================================================
// Capture Bracketing
// ============================================================================

#[test]
fn capture_brackets_exactly_one_frame() {
    let rig = rig();
    rig.capture.available.set(true);

    rig.surface.borrow_mut().request_capture();
    rig.frame_loop.tick();
    assert_eq!(rig.capture.begins.get(), 1);
    assert_eq!(rig.capture.ends.get(), 1);

    // No new request: the flag must not leak into the next frame.
    rig.frame_loop.tick();
    assert_eq!(rig.capture.begins.get(), 1);
    assert_eq!(rig.capture.ends.get(), 1);
}

#[test]
fn unavailable_capture_tool_is_skipped_and_flag_still_clears() {
    let rig = rig();
    rig.capture.available.set(false);

    rig.surface.borrow_mut().request_capture();
    rig.frame_loop.tick();
    assert_eq!(rig.capture.begins.get(), 0);

    // Becoming available later must not capture without a fresh request.
    rig.capture.available.set(true);
    rig.frame_loop.tick();
    assert_eq!(rig.capture.begins.get(), 0);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn dispose_releases_subscription_and_resources() {
    let rig = rig();
    rig.surface.borrow_mut().set_layout(LayoutMode::VerticalSplit);
    rig.frame_loop.tick();
    let renders_before = rig.stats.render_count();
    assert!(renders_before > 0);

    rig.compositor.borrow_mut().dispose();
    assert!(rig.compositor.borrow().is_disposed());

    // Every allocated target is gone once outputs and cameras let go.
    assert_eq!(
        rig.stats.textures_destroyed(),
        rig.stats.textures_created()
    );

    // Ticking after disposal renders nothing.
    rig.frame_loop.tick();
    assert_eq!(rig.stats.render_count(), renders_before);
    assert_eq!(rig.frame_loop.listener_count(), 0);

    // Disposal is idempotent, including through Drop.
    rig.compositor.borrow_mut().dispose();
    drop(rig.compositor);
}

#[test]
fn layout_change_notification_updates_the_context() {
    let rig = rig();
    assert_eq!(rig.context.borrow().layout, LayoutMode::FullFirst);

    rig.surface.borrow_mut().set_layout(LayoutMode::CustomCircular);
    rig.frame_loop.tick();

    assert_eq!(rig.context.borrow().layout, LayoutMode::CustomCircular);
}

#[test]
fn pixel_density_scales_target_sizes() {
    let rig = rig();
    rig.surface.borrow_mut().set_pixels_per_point(2.0);
    rig.surface
        .borrow_mut()
        .set_panel_rect(Rect::from_dimensions(1500.0, 1500.0));
    rig.frame_loop.tick();

    let surface = rig.surface.borrow();
    let output = surface.output(ViewCompositionIndex::Composite).unwrap();
    assert_eq!((output.width(), output.height()), (3000, 3000));
}
