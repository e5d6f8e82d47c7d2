//! Runtime wiring.
//!
//! [`GameRuntime`] owns the ECS world, the event dispatcher and the per-tick
//! schedule. One tick:
//!
//! 1. advance [`WorldTime`] by the scaled delta;
//! 2. run the schedule (animation);
//! 3. drain the event bus until it is empty;
//! 4. despawn the actors detached during the drain;
//! 5. log what the audio backend reported;
//! 6. apply a pending scene change.
//!
//! A turn is a tick that starts with a `Game / PlayerTurn` or
//! `Game / EnemyTurn` event on the queue.

use bevy_ecs::prelude::*;
use glam::{Mat4, Quat, Vec3};
use log::{debug, info, warn};

use crate::components::actor::ActorKind;
use crate::components::animation::{AnimatedCharacter, AnimationError};
use crate::components::levellayout::{LayoutError, LevelLayoutData};
use crate::components::skinning::{AnimationClip, Keyframe, ModelData, SkinningData};
use crate::events::dispatcher::EventDispatcher;
use crate::events::gameevent::{EventCategory, GameEvent};
use crate::resources::audio::{AudioThread, SoundBridge, setup_audio, shutdown_audio};
use crate::resources::combat::CombatManager;
use crate::resources::eventqueue::EventQueue;
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamestate::{InteractionFlags, SceneState};
use crate::resources::gridmanager::{DefaultGridManager, GridSettings};
use crate::resources::inventory::Inventory;
use crate::resources::messagelog::{MessageLog, message_event_handler};
use crate::resources::objectmanager::{ObjectManager, despawn_removed};
use crate::resources::worldtime::WorldTime;
use crate::systems::animation::animation;
use crate::systems::audio::sound_event_handler;
use crate::systems::grid::register_grid_handlers;
use crate::systems::levellayout::spawn_level;
use crate::systems::movement::step_players;
use crate::systems::scene::scene_event_handler;
use crate::systems::time::update_world_time;

/// Scene every runtime starts in.
pub const START_SCENE: &str = "main";

/// Built-in level used when no layout file is given.
///
/// The player walks east along the corridor: a key, a locked gate and the
/// exit trigger, with a skeleton lurking two cells south of the key.
pub const DEMO_LEVEL: &str = r#"{
    "cell_size": 254.0,
    "origin": [0.0, 0.0, 0.0],
    "grid": [
        "P.k.G.T",
        ".......",
        "..E...."
    ],
    "legend": {
        ".": null,
        "P": { "kind": "player", "name": "hero", "look": [1.0, 0.0, 0.0] },
        "E": { "kind": "enemy", "name": "skeleton", "health": 30.0 },
        "k": { "kind": "pickup", "pickup": "key" },
        "G": { "kind": "gate", "name": "iron_gate" },
        "T": { "kind": "trigger", "scene": "win_scene" }
    }
}"#;

pub struct GameRuntime {
    world: World,
    dispatcher: EventDispatcher,
    schedule: Schedule,
    config: GameConfig,
}

impl GameRuntime {
    /// Build a runtime whose sound commands go to `sound`.
    pub fn new(config: GameConfig, sound: SoundBridge) -> Self {
        let mut world = World::new();
        world.insert_resource(sound.clone());
        Self::build(world, config, sound)
    }

    /// Build a runtime with a running audio backend thread.
    pub fn with_audio(config: GameConfig) -> Self {
        let mut world = World::new();
        let sound = setup_audio(&mut world);
        Self::build(world, config, sound)
    }

    fn build(mut world: World, config: GameConfig, sound: SoundBridge) -> Self {
        world.insert_resource(WorldTime::default());
        world.insert_resource(EventQueue::with_capacity(config.queue_capacity));
        world.insert_resource(InteractionFlags::default());
        world.insert_resource(SceneState::new(START_SCENE));
        world.insert_resource(MessageLog::with_capacity(config.message_log));
        world.insert_resource(DefaultGridManager::new(
            GridSettings::from_config(&config),
            sound,
            Inventory::new(),
            CombatManager::new(),
            ObjectManager::new(),
        ));
        world.insert_resource(config.clone());

        let mut dispatcher = EventDispatcher::new();
        register_grid_handlers::<SoundBridge, Inventory, CombatManager, ObjectManager>(
            &mut dispatcher,
        );
        dispatcher.subscribe(EventCategory::Sound2D, sound_event_handler);
        dispatcher.subscribe(EventCategory::Menu, scene_event_handler);
        dispatcher.subscribe(EventCategory::Textbox, message_event_handler);
        dispatcher.subscribe(EventCategory::UI, message_event_handler);

        let mut schedule = Schedule::default();
        schedule.add_systems(animation);

        Self {
            world,
            dispatcher,
            schedule,
            config,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn dispatcher_mut(&mut self) -> &mut EventDispatcher {
        &mut self.dispatcher
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &DefaultGridManager {
        self.world.resource::<DefaultGridManager>()
    }

    pub fn scene(&self) -> &SceneState {
        self.world.resource::<SceneState>()
    }

    pub fn messages(&self) -> &MessageLog {
        self.world.resource::<MessageLog>()
    }

    pub fn publish(&mut self, event: GameEvent) -> bool {
        self.world.resource_mut::<EventQueue>().publish(event)
    }

    /// Spawn a level and let the grid manager register its actors.
    pub fn load_level(&mut self, data: &LevelLayoutData) -> Result<Vec<Entity>, LayoutError> {
        let spawned = spawn_level(&mut self.world, data)?;
        self.dispatcher.drain(&mut self.world);
        Ok(spawned)
    }

    /// Run one tick. Returns the number of events delivered.
    pub fn tick(&mut self, dt: f32) -> usize {
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
        let delivered = self.dispatcher.drain(&mut self.world);

        let removed = self
            .world
            .resource_mut::<DefaultGridManager>()
            .objects_mut()
            .take_removed();
        if !removed.is_empty() {
            let count = despawn_removed(&mut self.world, removed);
            info!("despawned {} actors", count);
        }

        if let Some(audio) = self.world.get_resource::<AudioThread>() {
            for msg in audio.rx_msg.try_iter() {
                debug!(target: "audio", "{:?}", msg);
            }
        }

        let previous = self.world.resource_mut::<SceneState>().apply_pending();
        if let Some(previous) = previous {
            info!("scene '{}' -> '{}'", previous, self.scene().current());
        }
        delivered
    }

    /// Step the players one cell, then run the player turn.
    pub fn player_turn(&mut self) -> usize {
        step_players(&mut self.world, self.config.cell_size);
        self.publish(GameEvent::player_turn());
        self.tick(self.config.turn_delta)
    }

    pub fn enemy_turn(&mut self) -> usize {
        self.publish(GameEvent::enemy_turn());
        self.tick(self.config.turn_delta)
    }

    /// Give every player the demo walk cycle.
    pub fn animate_players(&mut self) -> Result<usize, AnimationError> {
        let mut players = self.world.query::<(Entity, &ActorKind)>();
        let ids: Vec<Entity> = players
            .iter(&self.world)
            .filter(|(_, kind)| **kind == ActorKind::Player)
            .map(|(entity, _)| entity)
            .collect();

        for entity in &ids {
            let mut character = AnimatedCharacter::new(self.config.animation_looping);
            character.register_clip("walk", "hero.fbx", demo_character_model())?;
            character.select_clip("walk", "hero.fbx")?;
            self.world.entity_mut(*entity).insert(character);
        }
        Ok(ids.len())
    }

    pub fn shutdown(&mut self) {
        shutdown_audio(&mut self.world);
    }
}

/// Parse the built-in level.
pub fn demo_level() -> Result<LevelLayoutData, LayoutError> {
    LevelLayoutData::from_json(DEMO_LEVEL)
}

/// Three-bone biped with a one-second "walk" take swinging both legs.
pub fn demo_character_model() -> ModelData {
    let hip = Mat4::from_translation(Vec3::new(0.0, 90.0, 0.0));
    let leg = |x: f32| Mat4::from_translation(Vec3::new(x, -45.0, 0.0));
    let swing = |x: f32, angle: f32| leg(x) * Mat4::from_quat(Quat::from_rotation_x(angle));

    let walk = AnimationClip::new(
        1.0,
        vec![
            Keyframe::new(1, 0.0, swing(-10.0, 0.4)),
            Keyframe::new(2, 0.0, swing(10.0, -0.4)),
            Keyframe::new(1, 0.5, swing(-10.0, -0.4)),
            Keyframe::new(2, 0.5, swing(10.0, 0.4)),
        ],
    );
    let skinning = SkinningData::from_bind_pose(
        vec![hip, leg(-10.0), leg(10.0)],
        vec![None, Some(0), Some(0)],
    )
    .with_clip("walk", walk);
    ModelData::new("hero").with_skinning(skinning)
}

impl Drop for GameRuntime {
    fn drop(&mut self) {
        if self.world.contains_resource::<AudioThread>() {
            warn!("runtime dropped with audio thread running, shutting it down");
            self.shutdown();
        }
    }
}
