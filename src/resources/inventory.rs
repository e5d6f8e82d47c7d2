//! Player inventory.

use bevy_ecs::prelude::*;
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::components::pickup::PickupKind;
use crate::resources::services::InventoryService;

/// Counts of collected items per [`PickupKind`], plus the collected entities
/// in pickup order.
#[derive(Debug, Default, Clone)]
pub struct Inventory {
    counts: FxHashMap<PickupKind, u32>,
    collected: Vec<Entity>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collected(&self) -> &[Entity] {
        &self.collected
    }
}

impl InventoryService for Inventory {
    fn add_item(&mut self, item: Entity, kind: PickupKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
        self.collected.push(item);
        debug!("inventory: +1 {:?} ({} held)", kind, self.count(kind));
    }

    fn has_item(&self, kind: PickupKind) -> bool {
        self.count(kind) > 0
    }

    fn use_item(&mut self, kind: PickupKind) {
        match self.counts.get_mut(&kind) {
            Some(count) if *count > 0 => {
                *count -= 1;
                debug!("inventory: -1 {:?} ({} held)", kind, count);
            }
            _ => warn!("inventory: no {:?} to use", kind),
        }
    }

    fn count(&self, kind: PickupKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}
