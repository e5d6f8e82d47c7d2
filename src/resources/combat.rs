use bevy_ecs::prelude::*;
use log::info;

use crate::resources::services::CombatService;

/// Tracks the battle the player is currently engaged in.
///
/// Battle resolution itself belongs to the combat subsystem; this resource
/// only records which enemy was engaged and how many battles were started.
#[derive(Debug, Default, Clone)]
pub struct CombatManager {
    active: Option<Entity>,
    battles_started: u32,
}

impl CombatManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_enemy(&self) -> Option<Entity> {
        self.active
    }

    pub fn battles_started(&self) -> u32 {
        self.battles_started
    }
}

impl CombatService for CombatManager {
    fn initiate_battle(&mut self, enemy: Entity) {
        info!("battle initiated against {:?}", enemy);
        self.active = Some(enemy);
        self.battles_started += 1;
    }

    fn in_battle(&self) -> bool {
        self.active.is_some()
    }
}
