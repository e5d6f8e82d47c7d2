//! Grid stepping for players.
//!
//! [`step_players`] moves every player one cell along its look direction
//! unless the target cell is occupied by a fighter or a piece of blocking
//! architecture. Players engaged in combat stay where they are.

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::debug;

use crate::components::actor::ActorKind;
use crate::components::architecture::CollisionSkin;
use crate::components::combatant::Combatant;
use crate::components::transform3d::{Transform3D, XZ_MASK};
use crate::resources::gamestate::InteractionFlags;
use crate::resources::gridmanager::GRID_EPSILON;

/// Returns the number of players that moved.
pub fn step_players(world: &mut World, cell_size: f32) -> usize {
    if world
        .get_resource::<InteractionFlags>()
        .is_some_and(|flags| flags.in_combat)
    {
        debug!("movement: in combat, holding position");
        return 0;
    }

    let mut blockers = world
        .query_filtered::<&Transform3D, Or<(With<CollisionSkin>, With<Combatant>)>>();
    let occupied: Vec<Vec3> = blockers.iter(world).map(Transform3D::horizontal).collect();

    let mut moved = 0;
    let mut players = world.query::<(Entity, &ActorKind, &mut Transform3D)>();
    for (entity, kind, mut transform) in players.iter_mut(world) {
        if *kind != ActorKind::Player {
            continue;
        }
        let step = (transform.look * XZ_MASK).normalize_or_zero() * cell_size;
        if step == Vec3::ZERO {
            continue;
        }
        let target = transform.horizontal() + step;
        if occupied.iter().any(|cell| cell.distance(target) <= GRID_EPSILON) {
            debug!("movement: {:?} blocked at {}", entity, target);
            continue;
        }
        transform.translation += step;
        moved += 1;
    }
    moved
}
