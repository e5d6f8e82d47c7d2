//! Event handlers that drive the [`GridManager`].
//!
//! The manager is taken out of the world with `resource_scope` for the
//! duration of each call so that it can read and mutate actor components and
//! publish follow-up events through the [`EventQueue`](crate::resources::eventqueue::EventQueue).

use bevy_ecs::prelude::*;
use log::{trace, warn};

use crate::events::dispatcher::{EventDispatcher, HandlerId};
use crate::events::gameevent::{EventAction, EventCategory, GameEvent};
use crate::resources::gridmanager::GridManager;
use crate::resources::services::{CombatService, InventoryService, ObjectLifecycle, SoundService};

/// Subscribe the grid manager to `Game`, `SystemAdd` and `SystemRemove`.
pub fn register_grid_handlers<S, I, C, O>(dispatcher: &mut EventDispatcher) -> [HandlerId; 3]
where
    S: SoundService,
    I: InventoryService,
    C: CombatService,
    O: ObjectLifecycle,
{
    [
        dispatcher.subscribe(EventCategory::Game, grid_turn_handler::<S, I, C, O>),
        dispatcher.subscribe(EventCategory::SystemAdd, grid_membership_handler::<S, I, C, O>),
        dispatcher.subscribe(EventCategory::SystemRemove, grid_membership_handler::<S, I, C, O>),
    ]
}

/// `Game / PlayerTurn` and `Game / EnemyTurn`.
pub fn grid_turn_handler<S, I, C, O>(event: &GameEvent, world: &mut World)
where
    S: SoundService,
    I: InventoryService,
    C: CombatService,
    O: ObjectLifecycle,
{
    with_grid::<S, I, C, O>(world, event, |grid, world| match event.action {
        EventAction::PlayerTurn => grid.on_player_turn(world),
        EventAction::EnemyTurn => grid.on_enemy_turn(world),
        _ => trace!("grid: ignoring {}", event),
    });
}

/// `SystemAdd / OnAddActor` and `SystemRemove / OnRemoveActor`, both carrying
/// the actor reference as first parameter.
pub fn grid_membership_handler<S, I, C, O>(event: &GameEvent, world: &mut World)
where
    S: SoundService,
    I: InventoryService,
    C: CombatService,
    O: ObjectLifecycle,
{
    let Some(actor) = event.param(0).and_then(|p| p.as_actor()) else {
        warn!("grid: {} carries no actor", event);
        return;
    };
    with_grid::<S, I, C, O>(world, event, |grid, _| match event.action {
        EventAction::OnAddActor => {
            grid.add(actor);
        }
        EventAction::OnRemoveActor => {
            grid.remove(actor);
        }
        _ => trace!("grid: ignoring {}", event),
    });
}

fn with_grid<S, I, C, O>(
    world: &mut World,
    event: &GameEvent,
    f: impl FnOnce(&mut GridManager<S, I, C, O>, &mut World),
) where
    S: SoundService,
    I: InventoryService,
    C: CombatService,
    O: ObjectLifecycle,
{
    if !world.contains_resource::<GridManager<S, I, C, O>>() {
        warn!("grid: no GridManager resource, dropping {}", event);
        return;
    }
    world.resource_scope(|world, mut grid: Mut<GridManager<S, I, C, O>>| {
        f(&mut grid, world);
    });
}
