//! Actor identity components.
//!
//! Every entity the grid manager tracks carries an [`ActorKind`]. The kind is
//! the explicit category discriminant: it decides which category set the actor
//! lives in and is copied into [`ActorRef`] whenever an actor crosses an event
//! boundary, so consumers never need to re-derive it.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Category tag of a grid actor.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    Player,
    Enemy,
    Pickup,
    Gate,
    Trigger,
}

impl ActorKind {
    /// Parse a layout/legend name (`"player"`, `"item"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "player" => Some(ActorKind::Player),
            "enemy" => Some(ActorKind::Enemy),
            "pickup" | "item" => Some(ActorKind::Pickup),
            "gate" => Some(ActorKind::Gate),
            "trigger" => Some(ActorKind::Trigger),
            _ => None,
        }
    }
}

/// Human readable identity used in logs and UI payloads.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ActorName(pub String);

impl ActorName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An actor reference as carried inside event payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorRef {
    pub entity: Entity,
    pub kind: ActorKind,
}

impl ActorRef {
    pub fn new(entity: Entity, kind: ActorKind) -> Self {
        Self { entity, kind }
    }
}

/// Per-turn collision flag for players and enemies.
///
/// Set whenever the actor was found sharing a cell during a detection pass
/// and cleared by the grid manager at the end of the owning side's turn.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnCollision {
    collided: bool,
}

impl TurnCollision {
    pub fn mark(&mut self) {
        self.collided = true;
    }
    pub fn reset(&mut self) {
        self.collided = false;
    }
    pub fn has_collided(&self) -> bool {
        self.collided
    }
}
