//! Object lifecycle: which actors are still part of the update pipeline.
//!
//! Removal is deferred. [`ObjectManager::remove`] only detaches the actor and
//! queues it; the runtime despawns queued entities after the event bus has
//! been drained (see [`despawn_removed`]), so handlers later in the same drain
//! can still read the removed actor's components.

use bevy_ecs::prelude::*;
use log::debug;

use crate::resources::services::ObjectLifecycle;

#[derive(Debug, Default, Clone)]
pub struct ObjectManager {
    removed: Vec<Entity>,
}

impl ObjectManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities detached since the last [`ObjectManager::take_removed`].
    pub fn pending_removal(&self) -> &[Entity] {
        &self.removed
    }

    pub fn is_removed(&self, actor: Entity) -> bool {
        self.removed.contains(&actor)
    }

    pub fn take_removed(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.removed)
    }
}

impl ObjectLifecycle for ObjectManager {
    fn remove(&mut self, actor: Entity) {
        if !self.removed.contains(&actor) {
            debug!("object manager: detaching {:?}", actor);
            self.removed.push(actor);
        }
    }
}

/// Despawn every entity in `removed` that still exists.
pub fn despawn_removed(world: &mut World, removed: Vec<Entity>) -> usize {
    let mut count = 0;
    for entity in removed {
        if world.get_entity(entity).is_ok() {
            world.despawn(entity);
            count += 1;
        }
    }
    count
}
