//! Host-engine data provider contract.
//!
//! The hosting editor supplies the environment a preview stage renders
//! under (skybox, ambient lighting, reflection source) and configures the
//! stage cameras for its render pipeline. The pipeline never reads global
//! editor state directly.

use crate::camera::Camera;
use crate::context::AssetId;

/// Source of ambient reflections in a preview stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReflectionMode {
    /// Reflections sampled from the stage skybox.
    #[default]
    Skybox,
    /// Reflections sampled from a caller-supplied cubemap.
    Custom,
}

/// Ambient lighting model for a preview stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AmbientMode {
    /// Ambient light sampled from the skybox.
    #[default]
    Skybox,
    /// Tri-light gradient ambient.
    Trilight,
    /// Flat ambient color.
    Flat,
}

/// Environment settings applied to each isolated stage scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnvironmentSetup {
    /// Where stage reflections come from.
    pub reflection_mode: ReflectionMode,
    /// Cubemap asset used when `reflection_mode` is [`ReflectionMode::Custom`].
    pub custom_reflection: Option<AssetId>,
    /// Skybox material asset, if any.
    pub skybox: Option<AssetId>,
    /// Ambient lighting model.
    pub ambient_mode: AmbientMode,
}

/// Contract the hosting engine implements to configure preview stages.
pub trait DataProvider {
    /// Environment settings for stage scenes.
    fn environment_setup(&self) -> EnvironmentSetup;

    /// Configure a stage camera for the host render pipeline.
    fn configure_camera(&self, camera: &mut Camera);
}
