//! Level spawning.
//!
//! [`spawn_level`] turns every legend cell of a [`LevelLayoutData`] into an
//! actor entity and announces it with `SystemAdd / OnAddActor`, so the grid
//! manager picks it up on the next drain. Spawned entities receive
//! [`ActorKind`], [`ActorName`] and [`Transform3D`] plus the kind-specific
//! components:
//!
//! | kind    | components                         |
//! |---------|------------------------------------|
//! | player  | [`Combatant`], [`TurnCollision`]   |
//! | enemy   | [`Combatant`], [`TurnCollision`]   |
//! | pickup  | [`Pickup`]                         |
//! | gate    | [`CollisionSkin`]                  |
//! | trigger | [`SceneTrigger`]                   |

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{info, warn};

use crate::components::actor::{ActorKind, ActorName, ActorRef, TurnCollision};
use crate::components::architecture::{CollisionSkin, SceneTrigger};
use crate::components::combatant::Combatant;
use crate::components::levellayout::{LayoutError, LevelCell, LevelLayoutData};
use crate::components::pickup::{Pickup, PickupKind};
use crate::components::transform3d::Transform3D;
use crate::events::gameevent::GameEvent;
use crate::resources::eventqueue::EventQueue;

/// Player stats when the legend leaves them out.
pub const PLAYER_DEFAULTS: Combatant = Combatant {
    health: 100.0,
    attack: 10.0,
    defence: 5.0,
};

/// Enemy stats when the legend leaves them out.
pub const ENEMY_DEFAULTS: Combatant = Combatant {
    health: 30.0,
    attack: 6.0,
    defence: 2.0,
};

/// Kind-specific data of a legend cell, validated before anything is spawned.
enum Resolved {
    Fighter(ActorKind, Combatant),
    Pickup(Pickup),
    Gate,
    Trigger(SceneTrigger),
}

fn resolve(symbol: char, cell: &LevelCell) -> Result<Resolved, LayoutError> {
    let unknown = |field: &'static str, value: &str| LayoutError::UnknownKind {
        symbol,
        field,
        value: value.to_string(),
    };
    let kind = ActorKind::from_name(&cell.kind).ok_or_else(|| unknown("kind", &cell.kind))?;

    Ok(match kind {
        ActorKind::Player | ActorKind::Enemy => {
            let defaults = if kind == ActorKind::Player {
                PLAYER_DEFAULTS
            } else {
                ENEMY_DEFAULTS
            };
            Resolved::Fighter(
                kind,
                Combatant::new(
                    cell.health.unwrap_or(defaults.health),
                    cell.attack.unwrap_or(defaults.attack),
                    cell.defence.unwrap_or(defaults.defence),
                ),
            )
        }
        ActorKind::Pickup => {
            let name = cell.pickup.as_deref().unwrap_or_default();
            let pickup_kind = PickupKind::from_name(name).ok_or_else(|| unknown("pickup", name))?;
            let pickup = Pickup::new(pickup_kind);
            Resolved::Pickup(match cell.value {
                Some(value) => pickup.with_value(value),
                None => pickup,
            })
        }
        ActorKind::Gate => Resolved::Gate,
        ActorKind::Trigger => Resolved::Trigger(
            cell.scene
                .as_deref()
                .map(SceneTrigger::new)
                .unwrap_or_default(),
        ),
    })
}

/// Spawn every actor of `data` and publish its `OnAddActor` event.
///
/// The whole legend is validated first; on error nothing is spawned.
pub fn spawn_level(world: &mut World, data: &LevelLayoutData) -> Result<Vec<Entity>, LayoutError> {
    let cells = data
        .iter_cells()
        .map(|placed| resolve(placed.symbol, placed.cell).map(|resolved| (placed, resolved)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut spawned = Vec::with_capacity(cells.len());
    for (placed, resolved) in cells {
        let mut transform = Transform3D::new(placed.translation);
        if let Some(look) = placed.cell.look {
            transform = transform.with_look(Vec3::from_array(look));
        }
        let name = placed
            .cell
            .name
            .clone()
            .unwrap_or_else(|| format!("{}_{}_{}", placed.cell.kind, placed.row, placed.col));

        let kind = match &resolved {
            Resolved::Fighter(kind, _) => *kind,
            Resolved::Pickup(_) => ActorKind::Pickup,
            Resolved::Gate => ActorKind::Gate,
            Resolved::Trigger(_) => ActorKind::Trigger,
        };
        let mut entity = world.spawn((kind, ActorName::new(name), transform));
        match resolved {
            Resolved::Fighter(_, combatant) => {
                entity.insert((combatant, TurnCollision::default()));
            }
            Resolved::Pickup(pickup) => {
                entity.insert(pickup);
            }
            Resolved::Gate => {
                entity.insert(CollisionSkin::cell(data.cell_size));
            }
            Resolved::Trigger(trigger) => {
                entity.insert(trigger);
            }
        }
        let id = entity.id();
        spawned.push(id);

        match world.get_resource_mut::<EventQueue>() {
            Some(mut queue) => {
                queue.publish(GameEvent::add_actor(ActorRef::new(id, kind)));
            }
            None => warn!("level: EventQueue missing, {:?} {:?} not announced", kind, id),
        }
    }

    info!("level: spawned {} actors", spawned.len());
    Ok(spawned)
}
