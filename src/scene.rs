//! Isolated preview scenes and the scene-settings override protocol.
//!
//! Each stage owns a private scene so preview rendering never touches the
//! host editor's scene. Environment settings are written into a stage scene
//! through a scoped override on the editor-shared settings registry; the
//! scope must be released before another stage is configured, which keeps
//! environment state from leaking between stages or into the host.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::{AssetId, ContentAsset};
use crate::error::LookDevError;
use crate::provider::{AmbientMode, EnvironmentSetup, ReflectionMode};

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier for an isolated scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

/// Identifier for an object instantiated into a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneObjectId(u64);

/// Environment render settings applied to one scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderSettings {
    /// Where reflections come from.
    pub reflection_mode: ReflectionMode,
    /// Cubemap used for custom reflections.
    pub custom_reflection: Option<AssetId>,
    /// Skybox material.
    pub skybox: Option<AssetId>,
    /// Ambient lighting model.
    pub ambient_mode: AmbientMode,
}

impl RenderSettings {
    /// Copy an environment setup into these settings.
    pub fn apply_environment(&mut self, env: &EnvironmentSetup) {
        self.reflection_mode = env.reflection_mode;
        self.custom_reflection = env.custom_reflection;
        self.skybox = env.skybox;
        self.ambient_mode = env.ambient_mode;
    }
}

/// An object instantiated into a preview scene.
#[derive(Debug, Clone)]
pub struct SceneObject {
    id: SceneObjectId,
    name: String,
    asset: AssetId,
    visible: bool,
}

impl SceneObject {
    /// Object identifier.
    pub fn id(&self) -> SceneObjectId {
        self.id
    }

    /// Object name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Asset this object was instantiated from.
    pub fn asset(&self) -> AssetId {
        self.asset
    }

    /// Whether the object is visible to stage cameras.
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// A private scene holding preview content for one stage.
#[derive(Debug)]
pub struct Scene {
    id: SceneId,
    name: String,
    settings: RenderSettings,
    objects: Vec<SceneObject>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SceneId(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            settings: RenderSettings::default(),
            objects: Vec::new(),
        }
    }

    /// Scene identifier.
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Scene name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Environment settings of this scene.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Mutable environment settings of this scene.
    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    /// Instantiate a content asset into the scene, initially hidden.
    pub fn instantiate(&mut self, asset: &ContentAsset) -> SceneObjectId {
        let id = SceneObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed));
        log::trace!("scene {}: instantiating '{}'", self.name, asset.name);
        self.objects.push(SceneObject {
            id,
            name: asset.name.clone(),
            asset: asset.id,
            visible: false,
        });
        id
    }

    /// Remove one object from the scene.
    pub fn remove(&mut self, id: SceneObjectId) {
        self.objects.retain(|obj| obj.id != id);
    }

    /// Remove all objects from the scene.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Set the visibility of one object. Unknown ids are ignored.
    pub fn set_visible(&mut self, id: SceneObjectId, visible: bool) {
        if let Some(obj) = self.objects.iter_mut().find(|obj| obj.id == id) {
            obj.visible = visible;
        }
    }

    /// Look up one object.
    pub fn object(&self, id: SceneObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|obj| obj.id == id)
    }

    /// All objects in the scene.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }
}

/// Editor-shared registry gating scene-settings overrides.
///
/// Only one scene may hold the override at a time. Holding it means writes
/// to ambient render settings land in that scene instead of the host's;
/// the scope guard restores the registry when dropped.
#[derive(Debug, Clone, Default)]
pub struct SceneSettingsRegistry {
    active: Rc<RefCell<Option<SceneId>>>,
}

impl SceneSettingsRegistry {
    /// Create a registry with no active override.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an override is currently held.
    pub fn has_active_override(&self) -> bool {
        self.active.borrow().is_some()
    }

    /// Take the settings override for one scene.
    ///
    /// Fails if another scene already holds the override; stage
    /// construction treats that as fatal rather than rendering into a
    /// corrupted shared scene.
    pub fn begin_override(&self, scene: &Scene) -> Result<SettingsOverrideScope, LookDevError> {
        let mut active = self.active.borrow_mut();
        if let Some(held) = *active {
            return Err(LookDevError::SceneOverrideUnavailable(format!(
                "scene {held:?} already holds the settings override"
            )));
        }
        *active = Some(scene.id());
        log::trace!("settings override taken for scene '{}'", scene.name());
        Ok(SettingsOverrideScope {
            registry: Rc::downgrade(&self.active),
        })
    }
}

/// Scope guard for an active scene-settings override.
///
/// Restores the registry on drop.
#[derive(Debug)]
pub struct SettingsOverrideScope {
    registry: Weak<RefCell<Option<SceneId>>>,
}

impl Drop for SettingsOverrideScope {
    fn drop(&mut self) {
        if let Some(active) = self.registry.upgrade() {
            *active.borrow_mut() = None;
        }
    }
}
