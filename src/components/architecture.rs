//! Components for static level architecture: gates and scene triggers.

use bevy_ecs::prelude::Component;

/// Scene loaded when no explicit target is configured.
pub const DEFAULT_TARGET_SCENE: &str = "win_scene";

/// Collision skin of a blocking piece of architecture.
///
/// Removing this component tears the skin down; the movement system stops
/// treating the cell as blocked.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CollisionSkin {
    pub half_extents: glam::Vec3,
}

impl CollisionSkin {
    pub fn cell(cell_size: f32) -> Self {
        Self {
            half_extents: glam::Vec3::splat(cell_size * 0.5),
        }
    }
}

/// Cell that starts a new scene when the player steps on it.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct SceneTrigger {
    pub target_scene: String,
}

impl SceneTrigger {
    pub fn new(target_scene: impl Into<String>) -> Self {
        Self {
            target_scene: target_scene.into(),
        }
    }
}

impl Default for SceneTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_SCENE)
    }
}
