//! A stage: one isolated scene + camera hosting preview content.

use crate::camera::Camera;
use crate::context::ContentAsset;
use crate::scene::{Scene, SceneObjectId};

/// Isolated scene and camera for one preview view.
///
/// The stage's content object stays hidden between frames; the view
/// renderer shows it only for the duration of a single camera render so a
/// shared host pipeline never picks it up by accident.
#[derive(Debug)]
pub struct Stage {
    name: String,
    scene: Scene,
    camera: Camera,
    content: Option<SceneObjectId>,
}

impl Stage {
    /// Create an empty stage with its own scene.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let scene = Scene::new(name.clone());
        Self {
            name,
            scene,
            camera: Camera::new(),
            content: None,
        }
    }

    /// Stage name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stage's scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The stage's scene, mutably.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The stage's camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The stage's camera, mutably.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Instantiate a content asset into the stage, replacing any previous
    /// content. The new instance starts hidden.
    pub fn instantiate_content(&mut self, asset: &ContentAsset) -> SceneObjectId {
        self.clear();
        let id = self.scene.instantiate(asset);
        self.content = Some(id);
        id
    }

    /// The current content instance, if any.
    pub fn content(&self) -> Option<SceneObjectId> {
        self.content
    }

    /// Remove and destroy the current content instance.
    pub fn clear(&mut self) {
        if let Some(id) = self.content.take() {
            self.scene.remove(id);
        }
    }

    /// Show or hide the content instance.
    pub fn set_content_visible(&mut self, visible: bool) {
        if let Some(id) = self.content {
            self.scene.set_visible(id, visible);
        }
    }

    /// Whether the content instance is currently visible.
    pub fn is_content_visible(&self) -> bool {
        self.content
            .and_then(|id| self.scene.object(id))
            .is_some_and(|obj| obj.is_visible())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AssetId;

    #[test]
    fn content_replacement_destroys_previous_instance() {
        let mut stage = Stage::new("stage");
        let first = stage.instantiate_content(&ContentAsset::new(AssetId(1), "a"));
        let second = stage.instantiate_content(&ContentAsset::new(AssetId(2), "b"));

        assert_ne!(first, second);
        assert_eq!(stage.scene().objects().len(), 1);
        assert_eq!(stage.content(), Some(second));
    }

    #[test]
    fn visibility_toggles_content_only() {
        let mut stage = Stage::new("stage");
        assert!(!stage.is_content_visible());
        // No content: toggling is a no-op.
        stage.set_content_visible(true);
        assert!(!stage.is_content_visible());

        stage.instantiate_content(&ContentAsset::new(AssetId(1), "a"));
        stage.set_content_visible(true);
        assert!(stage.is_content_visible());
        stage.set_content_visible(false);
        assert!(!stage.is_content_visible());
    }

    #[test]
    fn clear_removes_content() {
        let mut stage = Stage::new("stage");
        stage.instantiate_content(&ContentAsset::new(AssetId(1), "a"));
        stage.clear();
        assert!(stage.content().is_none());
        assert!(stage.scene().objects().is_empty());
    }
}
