//! The stage cache owning both preview stages.

use crate::context::Context;
use crate::error::LookDevError;
use crate::layout::ViewSlot;
use crate::provider::DataProvider;
use crate::scene::SceneSettingsRegistry;
use crate::stage::Stage;

const FIRST_STAGE_NAME: &str = "lookdev_first_view";
const SECOND_STAGE_NAME: &str = "lookdev_second_view";

/// Stage background colors double as view identity colors in the UI.
const FIRST_VIEW_BACKGROUND: [f32; 4] = [0.0, 0.604, 0.604, 1.0];
const SECOND_VIEW_BACKGROUND: [f32; 4] = [1.0, 0.145, 0.016, 1.0];

/// Owns the two preview stages and keeps their content in sync with the
/// context.
#[derive(Debug)]
pub struct StageCache {
    stages: [Stage; 2],
}

impl StageCache {
    /// Create and configure both stages.
    ///
    /// Environment settings are pushed onto each stage scene under the
    /// settings override; failure to take the override aborts construction.
    pub fn new(
        provider: &dyn DataProvider,
        settings: &SceneSettingsRegistry,
    ) -> Result<Self, LookDevError> {
        Ok(Self {
            stages: [
                Self::init_stage(ViewSlot::First, provider, settings)?,
                Self::init_stage(ViewSlot::Second, provider, settings)?,
            ],
        })
    }

    fn init_stage(
        slot: ViewSlot,
        provider: &dyn DataProvider,
        settings: &SceneSettingsRegistry,
    ) -> Result<Stage, LookDevError> {
        let (name, background) = match slot {
            ViewSlot::First => (FIRST_STAGE_NAME, FIRST_VIEW_BACKGROUND),
            ViewSlot::Second => (SECOND_STAGE_NAME, SECOND_VIEW_BACKGROUND),
        };

        let mut stage = Stage::new(name);

        // The override scope must be dropped before the other stage is
        // configured; holding it across stages would leak environment
        // state between them.
        let scope = settings.begin_override(stage.scene())?;
        let env = provider.environment_setup();
        stage.scene_mut().settings_mut().apply_environment(&env);
        drop(scope);

        stage.camera_mut().set_clear_color(background);
        provider.configure_camera(stage.camera_mut());

        log::info!("stage '{name}' initialized");
        Ok(stage)
    }

    /// The stage for one slot.
    pub fn stage(&self, slot: ViewSlot) -> &Stage {
        &self.stages[slot.index()]
    }

    /// The stage for one slot, mutably.
    pub fn stage_mut(&mut self, slot: ViewSlot) -> &mut Stage {
        &mut self.stages[slot.index()]
    }

    /// Re-instantiate one stage's content from the context.
    ///
    /// Clears the previous instance first; a view with no content asset
    /// ends up with an empty stage.
    pub fn update_scene(&mut self, slot: ViewSlot, context: &Context) {
        let stage = &mut self.stages[slot.index()];
        stage.clear();
        if let Some(asset) = &context.view_content(slot).asset {
            stage.instantiate_content(asset);
        }
    }

    /// Destroy the content of both stages.
    pub fn clear_all(&mut self) {
        for stage in &mut self.stages {
            stage.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::context::{AssetId, ContentAsset};
    use crate::provider::{DataProvider, EnvironmentSetup};

    struct TestProvider;

    impl DataProvider for TestProvider {
        fn environment_setup(&self) -> EnvironmentSetup {
            EnvironmentSetup {
                skybox: Some(AssetId(42)),
                ..EnvironmentSetup::default()
            }
        }

        fn configure_camera(&self, camera: &mut Camera) {
            camera.set_fov_y(45.0_f32.to_radians());
        }
    }

    #[test]
    fn stages_get_environment_and_camera_setup() {
        let settings = SceneSettingsRegistry::new();
        let cache = StageCache::new(&TestProvider, &settings).unwrap();

        for slot in ViewSlot::ALL {
            let stage = cache.stage(slot);
            assert_eq!(stage.scene().settings().skybox, Some(AssetId(42)));
        }
        assert!(!settings.has_active_override());
    }

    #[test]
    fn construction_fails_while_override_is_held() {
        let settings = SceneSettingsRegistry::new();
        let blocker = crate::scene::Scene::new("blocker");
        let _held = settings.begin_override(&blocker).unwrap();

        let err = StageCache::new(&TestProvider, &settings).unwrap_err();
        assert!(matches!(err, LookDevError::SceneOverrideUnavailable(_)));
    }

    #[test]
    fn update_scene_follows_context_content() {
        let settings = SceneSettingsRegistry::new();
        let mut cache = StageCache::new(&TestProvider, &settings).unwrap();
        let mut context = Context::new();

        context.view_content_mut(ViewSlot::First).asset =
            Some(ContentAsset::new(AssetId(1), "sphere"));
        cache.update_scene(ViewSlot::First, &context);
        assert!(cache.stage(ViewSlot::First).content().is_some());

        context.view_content_mut(ViewSlot::First).asset = None;
        cache.update_scene(ViewSlot::First, &context);
        assert!(cache.stage(ViewSlot::First).content().is_none());
    }
}
