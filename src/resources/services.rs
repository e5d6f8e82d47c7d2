//! Contracts of the collaborators the grid manager drives.
//!
//! The grid manager never talks to audio, inventory, combat or the object
//! pipeline directly; it only calls these traits. Stock implementations live
//! in [`crate::resources::audio`], [`crate::resources::inventory`],
//! [`crate::resources::combat`] and [`crate::resources::objectmanager`].

use bevy_ecs::prelude::Entity;

use crate::components::pickup::PickupKind;

/// Fire-and-forget sound cues.
///
/// Implementations must tolerate requests that match the current state
/// (playing an already playing cue, pausing a paused one).
pub trait SoundService: Send + Sync + 'static {
    fn play_cue(&mut self, name: &str);
    fn pause_cue(&mut self, name: &str);
    fn stop_cue(&mut self, name: &str);
}

pub trait InventoryService: Send + Sync + 'static {
    fn add_item(&mut self, item: Entity, kind: PickupKind);
    fn has_item(&self, kind: PickupKind) -> bool;
    /// Consume one item of `kind`. Does nothing when none is held; callers
    /// check [`InventoryService::has_item`] first.
    fn use_item(&mut self, kind: PickupKind);
    fn count(&self, kind: PickupKind) -> u32;
}

pub trait CombatService: Send + Sync + 'static {
    /// Begin a battle against `enemy`.
    fn initiate_battle(&mut self, enemy: Entity);
    fn in_battle(&self) -> bool;
}

/// Render/update pipeline membership of actors.
pub trait ObjectLifecycle: Send + Sync + 'static {
    /// Detach `actor` from the pipeline.
    fn remove(&mut self, actor: Entity);
}
