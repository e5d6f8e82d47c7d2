//! Event dispatcher: the subscribing and delivering half of the event bus.
//!
//! Handlers register per [`EventCategory`]; many independent handlers may
//! react to one category and are invoked in registration order. Each handler
//! receives the event and `&mut World`, which lets it read components, mutate
//! resources and publish follow-up events through the
//! [`EventQueue`](crate::resources::eventqueue::EventQueue) resource.
//!
//! # Drain order
//!
//! [`EventDispatcher::drain`] loops until the queue is empty rather than over
//! a snapshot of its length. Events published by a handler are appended to the
//! tail, so all first-generation events are delivered before any event they
//! caused (breadth-first, never depth-first).

use bevy_ecs::prelude::World;
use log::{trace, warn};
use rustc_hash::FxHashMap;

use crate::events::gameevent::{EventCategory, GameEvent};
use crate::resources::eventqueue::EventQueue;

/// Boxed event handler.
pub type EventHandler = Box<dyn FnMut(&GameEvent, &mut World)>;

/// Token returned by [`EventDispatcher::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

#[derive(Default)]
pub struct EventDispatcher {
    handlers: FxHashMap<EventCategory, Vec<(HandlerId, EventHandler)>>,
    next_id: u64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every event of `category`.
    pub fn subscribe<F>(&mut self, category: EventCategory, handler: F) -> HandlerId
    where
        F: FnMut(&GameEvent, &mut World) + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(category)
            .or_default()
            .push((id, Box::new(handler)));
        trace!(target: "events", "subscribed {:?} to {:?}", id, category);
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        for handlers in self.handlers.values_mut() {
            if let Some(index) = handlers.iter().position(|(hid, _)| *hid == id) {
                handlers.remove(index);
                return true;
            }
        }
        false
    }

    pub fn handler_count(&self, category: EventCategory) -> usize {
        self.handlers.get(&category).map_or(0, Vec::len)
    }

    /// Deliver one event to every handler registered for its category.
    ///
    /// A category without handlers is a valid no-op.
    pub fn dispatch(&mut self, event: &GameEvent, world: &mut World) {
        match self.handlers.get_mut(&event.category) {
            Some(handlers) if !handlers.is_empty() => {
                trace!(target: "events", "dispatching {} to {} handler(s)", event, handlers.len());
                for (_, handler) in handlers.iter_mut() {
                    handler(event, world);
                }
            }
            _ => trace!(target: "events", "no handlers for {}", event),
        }
    }

    /// Deliver queued events until the queue is empty.
    ///
    /// Call once per simulation cycle. Returns the number of events delivered.
    pub fn drain(&mut self, world: &mut World) -> usize {
        let mut delivered = 0;
        loop {
            let next = match world.get_resource_mut::<EventQueue>() {
                Some(mut queue) => queue.pop(),
                None => {
                    warn!(target: "events", "EventQueue resource missing, nothing to drain");
                    return delivered;
                }
            };
            let Some(event) = next else {
                break;
            };
            self.dispatch(&event, world);
            delivered += 1;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::gameevent::EventAction;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn world_with_queue() -> World {
        let mut world = World::new();
        world.insert_resource(EventQueue::default());
        world
    }

    fn publish(world: &mut World, event: GameEvent) {
        world.resource_mut::<EventQueue>().publish(event);
    }

    #[test]
    fn duplicate_publish_is_delivered_once() {
        let mut world = world_with_queue();
        let mut dispatcher = EventDispatcher::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        dispatcher.subscribe(EventCategory::Sound2D, move |event, _| {
            sink.borrow_mut().push(event.clone())
        });

        publish(&mut world, GameEvent::sound(EventAction::OnPlay, "growl"));
        publish(&mut world, GameEvent::sound(EventAction::OnPlay, "growl"));

        assert_eq!(dispatcher.drain(&mut world), 1);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let mut world = world_with_queue();
        let mut dispatcher = EventDispatcher::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            dispatcher.subscribe(EventCategory::Game, move |_, _| order.borrow_mut().push(tag));
        }

        publish(&mut world, GameEvent::player_turn());
        dispatcher.drain(&mut world);

        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn republished_events_are_delivered_breadth_first() {
        let mut world = world_with_queue();
        let mut dispatcher = EventDispatcher::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let game_log = log.clone();
        dispatcher.subscribe(EventCategory::Game, move |event, world| {
            game_log.borrow_mut().push(event.to_string());
            if event.action == EventAction::EnemyTurn {
                world
                    .resource_mut::<EventQueue>()
                    .publish(GameEvent::sound(EventAction::OnPlay, "growl"));
            }
        });
        let sound_log = log.clone();
        dispatcher.subscribe(EventCategory::Sound2D, move |event, _| {
            sound_log.borrow_mut().push(event.to_string())
        });

        publish(&mut world, GameEvent::enemy_turn());
        publish(&mut world, GameEvent::player_turn());

        assert_eq!(dispatcher.drain(&mut world), 3);
        assert_eq!(
            *log.borrow(),
            vec![
                "Game/EnemyTurn".to_string(),
                "Game/PlayerTurn".to_string(),
                "Sound2D/OnPlay [growl]".to_string(),
            ]
        );
        let queue = world.resource::<EventQueue>();
        assert!(queue.is_empty());
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn handler_may_republish_the_event_it_is_handling() {
        let mut world = world_with_queue();
        let mut dispatcher = EventDispatcher::new();
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        dispatcher.subscribe(EventCategory::Game, move |event, world| {
            *counter.borrow_mut() += 1;
            if *counter.borrow() < 3 {
                world.resource_mut::<EventQueue>().publish(event.clone());
            }
        });

        publish(&mut world, GameEvent::player_turn());
        assert_eq!(dispatcher.drain(&mut world), 3);
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn missing_category_is_a_noop() {
        let mut world = world_with_queue();
        let mut dispatcher = EventDispatcher::new();
        publish(&mut world, GameEvent::textbox(EventAction::OnDisplayInfo).with("hello"));
        assert_eq!(dispatcher.drain(&mut world), 1);
        assert!(world.resource::<EventQueue>().is_empty());
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut world = world_with_queue();
        let mut dispatcher = EventDispatcher::new();
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        let id = dispatcher.subscribe(EventCategory::Game, move |_, _| *counter.borrow_mut() += 1);

        assert_eq!(dispatcher.handler_count(EventCategory::Game), 1);
        assert!(dispatcher.unsubscribe(id));
        assert!(!dispatcher.unsubscribe(id));
        assert_eq!(dispatcher.handler_count(EventCategory::Game), 0);

        publish(&mut world, GameEvent::player_turn());
        dispatcher.drain(&mut world);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn drain_without_queue_resource_delivers_nothing() {
        let mut world = World::new();
        let mut dispatcher = EventDispatcher::new();
        assert_eq!(dispatcher.drain(&mut world), 0);
    }
}
