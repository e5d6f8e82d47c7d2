//! Pending event queue resource.
//!
//! The [`EventQueue`] is the publishing half of the event bus. It lives in the
//! ECS world so that any code holding `&mut World` can publish, including
//! handlers invoked while the queue is being drained. The dispatching half is
//! [`crate::events::dispatcher::EventDispatcher`].
//!
//! Contract
//! - Events are kept in publish order (FIFO).
//! - An event whose identity is already pending is rejected, so publishing the
//!   same thing ten times in one cycle yields a single delivery.
//! - Popping an event removes its identity from the pending set; the same
//!   event may be published again afterwards.

use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;
use log::trace;
use rustc_hash::FxHashSet;

use crate::events::gameevent::GameEvent;

pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Resource, Debug)]
pub struct EventQueue {
    queue: VecDeque<GameEvent>,
    pending: FxHashSet<GameEvent>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

impl EventQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut pending = FxHashSet::default();
        pending.reserve(capacity);
        Self {
            queue: VecDeque::with_capacity(capacity),
            pending,
        }
    }

    /// Enqueue `event` unless a structurally equal event is already pending.
    ///
    /// Returns `true` if the event was accepted.
    pub fn publish(&mut self, event: GameEvent) -> bool {
        if self.pending.contains(&event) {
            trace!(target: "events", "duplicate dropped: {}", event);
            return false;
        }
        trace!(target: "events", "published: {}", event);
        self.pending.insert(event.clone());
        self.queue.push_back(event);
        true
    }

    /// Take the oldest event and release its identity.
    pub fn pop(&mut self) -> Option<GameEvent> {
        let event = self.queue.pop_front()?;
        self.pending.remove(&event);
        Some(event)
    }

    pub fn is_pending(&self, event: &GameEvent) -> bool {
        self.pending.contains(event)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of identities currently held by the dedup set.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Read-only view of the queued events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.queue.iter()
    }

    /// Drop every queued event without delivering it.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.pending.clear();
    }
}
