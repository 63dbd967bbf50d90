//! Core value types shared across the pipeline.

mod common;
mod texture;

pub use common::{Extent3d, Rect};
pub use texture::{TextureDescriptor, TextureFormat, TextureUsage};
