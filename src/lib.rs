//! # LookDev
//!
//! Dual-view preview rendering and compositing for editor-hosted look-dev
//! viewports.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`Compositor`] - Per-frame driver rendering one or two preview views
//!   and compositing them under the active [`LayoutMode`]
//! - [`StageCache`] / [`Stage`] - Isolated scene + camera pairs hosting
//!   preview content
//! - [`RenderTargetCache`] - Offscreen color targets recreated only on
//!   resize
//! - [`GpuBackend`] - Trait for GPU backends, with a dummy backend for
//!   testing and an optional wgpu backend
//!
//! ## Example
//!
//! ```ignore
//! use lookdev::{Compositor, Context, FrameLoop, PanelSurface, Rect};
//!
//! let backend = lookdev::create_backend()?;
//! let surface = Rc::new(RefCell::new(PanelSurface::new(Rect::from_dimensions(800.0, 600.0))));
//! let context = Rc::new(RefCell::new(Context::new()));
//! let frame_loop = FrameLoop::new();
//! let compositor = Compositor::new(
//!     backend, surface, context, &provider, &settings, &frame_loop, None,
//! )?;
//! // Host update callback:
//! frame_loop.tick();
//! ```

pub mod backend;
pub mod camera;
pub mod capture;
pub mod compositing;
pub mod compositor;
pub mod context;
pub mod error;
pub mod frame;
pub mod layout;
pub mod provider;
pub mod renderer;
pub mod scene;
pub mod sizing;
pub mod stage;
pub mod stages;
pub mod surface;
pub mod targets;
pub mod types;

// Re-export main types for convenience
pub use backend::{
    CompositeFrame, DummyBackend, DummyStats, GpuBackend, GpuTexture, create_backend,
    has_gpu_backend,
};
pub use camera::Camera;
pub use capture::CaptureTool;
pub use compositing::{CompositingParameters, NeutralToneMap};
pub use compositor::Compositor;
pub use context::{AssetId, ContentAsset, Context, GizmoState, ViewContent};
pub use error::LookDevError;
pub use frame::{FrameLoop, FrameSubscription, TickCallback};
pub use layout::{LayoutMode, SplitKind, ViewCompositionIndex, ViewSlot};
pub use provider::{AmbientMode, DataProvider, EnvironmentSetup, ReflectionMode};
pub use renderer::{RenderingRequest, ViewRenderer};
pub use scene::{
    RenderSettings, Scene, SceneObjectId, SceneSettingsRegistry, SettingsOverrideScope,
};
pub use sizing::{compute_render_size, compute_scale_factor};
pub use stage::Stage;
pub use stages::StageCache;
pub use surface::{
    DisplaySurface, PanelSurface, SurfaceHandle, SurfaceNotification, layout_rect,
};
pub use targets::{RenderTarget, RenderTargetCache, TargetSlot};
pub use types::{Extent3d, Rect, TextureDescriptor, TextureFormat, TextureUsage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the look-dev subsystem.
///
/// This should be called before constructing a [`Compositor`].
pub fn init() {
    log::info!("LookDev v{VERSION} initialized");
}
