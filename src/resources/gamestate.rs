//! High-level game state resources.
//!
//! - [`InteractionFlags`] – per-pass proximity/combat flags written by the grid
//!   manager and read by sound and UI logic.
//! - [`SceneState`] – the current scene, any requested scene change and the
//!   pause flag, driven by `Menu` events (see
//!   [`crate::systems::scene::scene_event_handler`]).

use bevy_ecs::prelude::Resource;

/// Proximity and combat flags of the player being scanned.
///
/// The grid manager recomputes every flag on each detection pass; nothing is
/// updated incrementally, so a stale value from a previous tick is always
/// overwritten before it is read in the same pass.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionFlags {
    pub in_proximity_of_item: bool,
    pub in_proximity_of_gate: bool,
    pub in_proximity_of_trigger: bool,
    pub in_combat: bool,
}

/// Representation of a requested next scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NextScene {
    #[default]
    Unchanged,
    Pending(String),
}

/// Authoritative scene state.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct SceneState {
    current: String,
    next: NextScene,
    paused: bool,
}

impl SceneState {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            next: NextScene::Unchanged,
            paused: false,
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn next(&self) -> &NextScene {
        &self.next
    }

    /// Request a transition to `scene`. Applied by [`SceneState::apply_pending`].
    pub fn request(&mut self, scene: impl Into<String>) {
        self.next = NextScene::Pending(scene.into());
    }

    /// Make a pending request the current scene.
    ///
    /// Returns the previous scene name when a transition happened.
    pub fn apply_pending(&mut self) -> Option<String> {
        match std::mem::take(&mut self.next) {
            NextScene::Pending(scene) => Some(std::mem::replace(&mut self.current, scene)),
            NextScene::Unchanged => None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new("main")
    }
}
