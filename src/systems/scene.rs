//! `Menu` event handler driving [`SceneState`].

use bevy_ecs::prelude::World;
use log::{info, trace, warn};

use crate::events::gameevent::{EventAction, GameEvent};
use crate::resources::gamestate::SceneState;

/// - `OnStart [scene]`: request a transition to `scene`.
/// - `OnPause` / `OnResume`: toggle the pause flag.
pub fn scene_event_handler(event: &GameEvent, world: &mut World) {
    let Some(mut scene) = world.get_resource_mut::<SceneState>() else {
        warn!("scene: SceneState missing, dropping {}", event);
        return;
    };
    match event.action {
        EventAction::OnStart => match event.text() {
            Some(target) => {
                info!("scene: '{}' requested", target);
                scene.request(target);
            }
            None => warn!("scene: {} names no scene", event),
        },
        EventAction::OnPause => scene.set_paused(true),
        EventAction::OnResume => scene.set_paused(false),
        _ => trace!("scene: ignoring {}", event),
    }
}
