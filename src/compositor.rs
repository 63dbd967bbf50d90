//! Top-level per-frame driver.
//!
//! The compositor subscribes to the editor's frame loop at construction
//! and, every tick, reads the current layout from the shared context,
//! renders the active views, composites them when the layout calls for
//! it, and delivers the results to the display surface. Disposal releases
//! the frame subscription first and the owned GPU resources after, so a
//! late tick can never touch freed state.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::backend::{CompositeFrame, GpuBackend};
use crate::capture::CaptureTool;
use crate::compositing::CompositingParameters;
use crate::context::Context;
use crate::error::LookDevError;
use crate::frame::{FrameLoop, FrameSubscription, TickCallback};
use crate::layout::{LayoutMode, ViewCompositionIndex, ViewSlot};
use crate::provider::DataProvider;
use crate::renderer::{RenderingRequest, ViewRenderer};
use crate::scene::SceneSettingsRegistry;
use crate::stages::StageCache;
use crate::surface::{DisplaySurface, SurfaceHandle, SurfaceNotification};
use crate::targets::{RenderTarget, RenderTargetCache};
use crate::types::Rect;

/// Dual-view preview compositor.
pub struct Compositor {
    backend: Arc<dyn GpuBackend>,
    surface: Rc<RefCell<dyn DisplaySurface>>,
    context: Rc<RefCell<Context>>,
    stages: StageCache,
    targets: RenderTargetCache,
    renderer: ViewRenderer,
    capture_tool: Option<Rc<dyn CaptureTool>>,
    capture_requested: bool,
    tick_subscription: Option<FrameSubscription>,
    tick_callback: Option<TickCallback>,
    disposed: bool,
}

impl Compositor {
    /// Build the compositor, configure both stages, instantiate the
    /// context's current content, and subscribe to the frame loop.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        backend: Arc<dyn GpuBackend>,
        surface: Rc<RefCell<dyn DisplaySurface>>,
        context: Rc<RefCell<Context>>,
        provider: &dyn DataProvider,
        settings: &SceneSettingsRegistry,
        frame_loop: &FrameLoop,
        capture_tool: Option<Rc<dyn CaptureTool>>,
    ) -> Result<Rc<RefCell<Self>>, LookDevError> {
        let mut stages = StageCache::new(provider, settings)?;
        {
            let context = context.borrow();
            for slot in ViewSlot::ALL {
                stages.update_scene(slot, &context);
            }
        }

        let compositor = Rc::new(RefCell::new(Self {
            targets: RenderTargetCache::new(Arc::clone(&backend)),
            renderer: ViewRenderer::new(Arc::clone(&backend)),
            backend,
            surface,
            context,
            stages,
            capture_tool,
            capture_requested: false,
            tick_subscription: None,
            tick_callback: None,
            disposed: false,
        }));

        let weak = Rc::downgrade(&compositor);
        let callback: TickCallback = Rc::new(RefCell::new(move || {
            if let Some(compositor) = weak.upgrade()
                && let Err(err) = compositor.borrow_mut().render()
            {
                log::error!("look-dev frame failed: {err}");
            }
        }));
        let subscription = frame_loop.subscribe(&callback);
        {
            let mut guard = compositor.borrow_mut();
            guard.tick_callback = Some(callback);
            guard.tick_subscription = Some(subscription);
        }

        Ok(compositor)
    }

    /// Whether pixel-perfect target sizing is active.
    pub fn pixel_perfect(&self) -> bool {
        self.renderer.pixel_perfect
    }

    /// Enable or disable pixel-perfect target sizing.
    pub fn set_pixel_perfect(&mut self, pixel_perfect: bool) {
        self.renderer.pixel_perfect = pixel_perfect;
    }

    /// The stage cache (stage cameras, scenes and content).
    pub fn stages(&self) -> &StageCache {
        &self.stages
    }

    /// Re-instantiate one view's content from the context.
    ///
    /// Call after the context's content asset for the view changed.
    pub fn update_view_content(&mut self, slot: ViewSlot) {
        self.stages.update_scene(slot, &self.context.borrow());
    }

    /// Whether the compositor has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Render one frame.
    ///
    /// Normally driven through the frame-loop subscription; callable
    /// directly by hosts that manage their own update order. A disposed
    /// compositor renders nothing.
    pub fn render(&mut self) -> Result<(), LookDevError> {
        if self.disposed {
            return Ok(());
        }

        self.drain_notifications();

        let capture_handle = self.begin_capture_if_requested();

        let layout = self.context.borrow().layout;
        let result = match layout {
            LayoutMode::FullFirst => self.render_full(ViewSlot::First),
            LayoutMode::FullSecond => self.render_full(ViewSlot::Second),
            LayoutMode::HorizontalSplit | LayoutMode::VerticalSplit => self.render_split(),
            LayoutMode::CustomSplit | LayoutMode::CustomCircular => self.render_composite(layout),
        };

        if let Some(handle) = capture_handle
            && let Some(tool) = &self.capture_tool
        {
            tool.end_capture(handle);
        }
        // Cleared even when the frame failed, so a stale request cannot
        // capture an unrelated later frame.
        self.capture_requested = false;

        result
    }

    /// Release the frame subscription and destroy owned resources.
    ///
    /// Idempotent; also invoked from `Drop`.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        // Unsubscribe before touching resources so a tick can never land
        // on a partially torn-down compositor.
        self.tick_subscription.take();
        self.tick_callback.take();
        self.capture_requested = false;

        self.stages.clear_all();
        for slot in ViewSlot::ALL {
            self.stages.stage_mut(slot).camera_mut().unbind_target();
        }
        self.targets.retire_all();

        let mut surface = self.surface.borrow_mut();
        for index in [
            ViewCompositionIndex::First,
            ViewCompositionIndex::Second,
            ViewCompositionIndex::Composite,
        ] {
            surface.set_output_texture(index, None);
        }

        log::info!("look-dev compositor disposed");
    }

    fn drain_notifications(&mut self) {
        let notifications = self.surface.borrow_mut().drain_notifications();
        for notification in notifications {
            match notification {
                SurfaceNotification::LayoutChanged(layout) => {
                    log::info!("layout changed to {layout:?}");
                    self.context.borrow_mut().layout = layout;
                }
                SurfaceNotification::CaptureRequested => {
                    self.capture_requested = true;
                }
            }
        }
    }

    fn begin_capture_if_requested(&self) -> Option<SurfaceHandle> {
        if !self.capture_requested {
            return None;
        }
        let tool = self.capture_tool.as_ref()?;
        if !tool.is_available() {
            return None;
        }
        let handle = self.surface.borrow().surface_handle();
        tool.begin_capture(handle);
        Some(handle)
    }

    fn render_view(
        &mut self,
        slot: ViewSlot,
        rect: Rect,
    ) -> Result<Option<Arc<RenderTarget>>, LookDevError> {
        let pixels_per_point = self.surface.borrow().pixels_per_point();
        let mut request = RenderingRequest::new(slot, rect);
        self.renderer.acquire(
            &mut request,
            self.stages.stage_mut(slot),
            &mut self.targets,
            pixels_per_point,
        )?;
        Ok(request.output)
    }

    fn render_full(&mut self, slot: ViewSlot) -> Result<(), LookDevError> {
        let rect = self.surface.borrow().viewport_rect(slot.into());
        let output = self.render_view(slot, rect)?;
        self.surface
            .borrow_mut()
            .set_output_texture(ViewCompositionIndex::Composite, output);
        Ok(())
    }

    fn render_split(&mut self) -> Result<(), LookDevError> {
        for slot in ViewSlot::ALL {
            let rect = self.surface.borrow().viewport_rect(slot.into());
            let output = self.render_view(slot, rect)?;
            self.surface
                .borrow_mut()
                .set_output_texture(slot.into(), output);
        }
        Ok(())
    }

    fn render_composite(&mut self, layout: LayoutMode) -> Result<(), LookDevError> {
        let rect = self
            .surface
            .borrow()
            .viewport_rect(ViewCompositionIndex::Composite);
        if rect.is_degenerate() {
            self.surface
                .borrow_mut()
                .set_output_texture(ViewCompositionIndex::Composite, None);
            return Ok(());
        }

        // Both views render at the full composite rect; the blend pass
        // samples both at full resolution.
        let first = self.render_view(ViewSlot::First, rect)?;
        let second = self.render_view(ViewSlot::Second, rect)?;
        let (Some(first), Some(second)) = (first, second) else {
            self.surface
                .borrow_mut()
                .set_output_texture(ViewCompositionIndex::Composite, None);
            return Ok(());
        };

        let kind = layout.split_kind().ok_or_else(|| {
            LookDevError::Internal(format!("layout {layout:?} reached the compositing path"))
        })?;

        let pixels_per_point = self.surface.borrow().pixels_per_point();
        self.targets.update_size(
            ViewCompositionIndex::Composite,
            rect,
            self.renderer.pixel_perfect,
            pixels_per_point,
            None,
        )?;
        let output = self
            .targets
            .target(ViewCompositionIndex::Composite)
            .cloned()
            .ok_or_else(|| {
                LookDevError::Internal("composite target missing after update".into())
            })?;

        let params = CompositingParameters::from_context(&self.context.borrow(), kind, rect);
        let frame = CompositeFrame {
            first: &first,
            second: &second,
            params: &params,
        };
        self.backend.composite(&frame, &output)?;

        self.surface
            .borrow_mut()
            .set_output_texture(ViewCompositionIndex::Composite, Some(output));
        Ok(())
    }
}

impl Drop for Compositor {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("backend", &self.backend.name())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
