//! Animation system.
//!
//! [`animation`] advances the active clip of every
//! [`AnimatedCharacter`](crate::components::animation::AnimatedCharacter) by
//! the scaled frame delta from [`WorldTime`].

use bevy_ecs::prelude::*;

use crate::components::animation::AnimatedCharacter;
use crate::resources::worldtime::WorldTime;

pub fn animation(mut query: Query<&mut AnimatedCharacter>, time: Res<WorldTime>) {
    if time.delta <= 0.0 {
        return;
    }
    for mut character in query.iter_mut() {
        character.advance(time.delta);
    }
}
