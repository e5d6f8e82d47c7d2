//! Bounded log of the informational messages shown to the player.
//!
//! Fed by `Textbox` and `UI` events through [`message_event_handler`]. The
//! oldest entry is dropped once the log is full.

use std::collections::VecDeque;

use bevy_ecs::prelude::*;
use log::{info, warn};

use crate::events::gameevent::GameEvent;

pub const DEFAULT_MESSAGE_LOG: usize = 16;

#[derive(Resource, Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<GameEvent>,
    capacity: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MESSAGE_LOG)
    }
}

impl MessageLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: GameEvent) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    /// Oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &GameEvent> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&GameEvent> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn message_event_handler(event: &GameEvent, world: &mut World) {
    let Some(mut log) = world.get_resource_mut::<MessageLog>() else {
        warn!("message log missing, dropping {}", event);
        return;
    };
    info!(target: "ui", "{}", event);
    log.push(event.clone());
}
