//! Collectable items and the per-kind feedback they trigger.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Default health restored by a health pickup.
pub const DEFAULT_HEALTH_BONUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickupKind {
    Sword,
    Key,
    Health,
}

impl PickupKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sword" => Some(PickupKind::Sword),
            "key" => Some(PickupKind::Key),
            "health" | "potion" => Some(PickupKind::Health),
            _ => None,
        }
    }

    /// Sound cue played when the item is collected.
    pub fn pickup_cue(self) -> &'static str {
        match self {
            PickupKind::Sword => "equip_sword",
            PickupKind::Key => "keys_jingle",
            PickupKind::Health => "drink_potion",
        }
    }

    /// Label shown in the textbox when the item is collected.
    pub fn label(self) -> &'static str {
        match self {
            PickupKind::Sword => "Sword",
            PickupKind::Key => "Key",
            PickupKind::Health => "Health",
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Pickup {
    pub kind: PickupKind,
    /// Kind-specific amount, e.g. health restored by a potion.
    pub value: f32,
}

impl Pickup {
    pub fn new(kind: PickupKind) -> Self {
        let value = match kind {
            PickupKind::Health => DEFAULT_HEALTH_BONUS,
            _ => 0.0,
        };
        Self { kind, value }
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.value = value;
        self
    }
}
