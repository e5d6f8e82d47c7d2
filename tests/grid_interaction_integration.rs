//! Grid interaction integration tests.
//!
//! Each test builds a [`GameRuntime`] with a sound channel it can inspect and
//! records every event that reaches the `Game`, `Menu`, `Sound2D` and
//! `Textbox` categories.

use std::cell::RefCell;
use std::rc::Rc;

use bevy_ecs::prelude::*;
use crossbeam_channel::Receiver;
use glam::Vec3;

use gridcrawl::components::actor::{ActorKind, ActorName, ActorRef, TurnCollision};
use gridcrawl::components::animation::AnimatedCharacter;
use gridcrawl::components::architecture::{CollisionSkin, SceneTrigger};
use gridcrawl::components::combatant::Combatant;
use gridcrawl::components::levellayout::LevelLayoutData;
use gridcrawl::components::pickup::{Pickup, PickupKind};
use gridcrawl::components::transform3d::Transform3D;
use gridcrawl::events::audio::SoundCmd;
use gridcrawl::events::gameevent::{EventAction, EventCategory, EventParam, GameEvent};
use gridcrawl::game::{GameRuntime, demo_level};
use gridcrawl::resources::audio::SoundBridge;
use gridcrawl::resources::gameconfig::{GameConfig, GatePromptPolicy, HealthReport};
use gridcrawl::resources::gamestate::InteractionFlags;
use gridcrawl::resources::gridmanager::{DefaultGridManager, GATE_PROMPT};
use gridcrawl::resources::services::{CombatService, InventoryService};

const D: f32 = 254.0;

struct Harness {
    runtime: GameRuntime,
    sound: Receiver<SoundCmd>,
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl Harness {
    fn new(config: GameConfig) -> Self {
        let (bridge, sound) = SoundBridge::channel();
        let mut runtime = GameRuntime::new(config, bridge);
        let events = Rc::new(RefCell::new(Vec::new()));
        for category in [
            EventCategory::Game,
            EventCategory::Menu,
            EventCategory::Sound2D,
            EventCategory::Textbox,
        ] {
            let log = Rc::clone(&events);
            runtime
                .dispatcher_mut()
                .subscribe(category, move |event, _| log.borrow_mut().push(event.clone()));
        }
        Self {
            runtime,
            sound,
            events,
        }
    }

    fn level(&mut self, json: &str) -> Vec<Entity> {
        let data = LevelLayoutData::from_json(json).unwrap();
        let spawned = self.runtime.load_level(&data).unwrap();
        self.clear();
        spawned
    }

    /// Spawn an actor by hand and register it with the grid.
    fn spawn(&mut self, kind: ActorKind, at: Vec3, bundle: impl Bundle) -> Entity {
        let entity = self
            .runtime
            .world_mut()
            .spawn((kind, Transform3D::new(at), bundle))
            .id();
        self.runtime
            .publish(GameEvent::add_actor(ActorRef::new(entity, kind)));
        self.runtime.tick(0.0);
        self.clear();
        entity
    }

    fn turn(&mut self, event: GameEvent) {
        self.runtime.publish(event);
        self.runtime.tick(0.0);
    }

    fn clear(&mut self) {
        self.events.borrow_mut().clear();
        self.sound.try_iter().for_each(drop);
    }

    fn recorded(&self, category: EventCategory, action: EventAction) -> Vec<GameEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.category == category && e.action == action)
            .cloned()
            .collect()
    }

    fn cues(&self) -> Vec<SoundCmd> {
        self.sound.try_iter().collect()
    }

    fn grid(&mut self) -> Mut<'_, DefaultGridManager> {
        self.runtime.world_mut().resource_mut::<DefaultGridManager>()
    }

    fn flags(&self) -> InteractionFlags {
        *self.runtime.world().resource::<InteractionFlags>()
    }
}

fn play(id: &str) -> SoundCmd {
    SoundCmd::PlayCue { id: id.into() }
}

// =============================================================================
// Event bus
// =============================================================================

#[test]
fn duplicate_events_are_delivered_once_per_cycle() {
    let mut h = Harness::new(GameConfig::new());
    let growl = GameEvent::sound(EventAction::OnPlay, "growl");
    assert!(h.runtime.publish(growl.clone()));
    assert!(!h.runtime.publish(growl.clone()));
    h.runtime.tick(0.0);

    assert_eq!(h.recorded(EventCategory::Sound2D, EventAction::OnPlay), vec![growl.clone()]);

    // Next cycle the identity is free again.
    assert!(h.runtime.publish(growl));
}

// =============================================================================
// Enemies
// =============================================================================

#[test]
fn collision_wins_over_adjacency() {
    let mut h = Harness::new(GameConfig::new());
    let spawned = h.level(
        r#"{ "cell_size": 254.0, "grid": ["P"],
             "legend": { "P": { "kind": "player" } } }"#,
    );
    let player = spawned[0];
    let enemy = h.spawn(
        ActorKind::Enemy,
        Vec3::ZERO,
        (Combatant::new(30.0, 5.0, 1.0), TurnCollision::default()),
    );

    h.turn(GameEvent::player_turn());

    assert!(h.recorded(EventCategory::Textbox, EventAction::OnInitiateBattle).is_empty());
    assert_eq!(h.grid().combat().battles_started(), 0);
    assert!(h.flags().in_combat);

    let world = h.runtime.world();
    assert!(world.get::<TurnCollision>(enemy).unwrap().has_collided());
    // The player's flag is cleared at the end of the player turn.
    assert!(!world.get::<TurnCollision>(player).unwrap().has_collided());
}

#[test]
fn adjacent_enemy_starts_one_battle() {
    let mut h = Harness::new(GameConfig::new());
    let spawned = h.level(
        r#"{ "cell_size": 254.0, "grid": ["PE"],
             "legend": { "P": { "kind": "player" }, "E": { "kind": "enemy" } } }"#,
    );
    let enemy = spawned[1];

    h.turn(GameEvent::player_turn());
    let battles = h.recorded(EventCategory::Textbox, EventAction::OnInitiateBattle);
    assert_eq!(battles.len(), 1);
    assert_eq!(
        battles[0].param(0).and_then(EventParam::as_actor),
        Some(ActorRef::new(enemy, ActorKind::Enemy))
    );
    let cues = h.cues();
    let pause = cues
        .iter()
        .position(|c| *c == SoundCmd::PauseCue { id: "main_theme".into() })
        .unwrap();
    let battle = cues.iter().position(|c| *c == play("battle_theme")).unwrap();
    assert!(pause < battle);
    assert!(h.grid().combat().in_battle());

    // Still adjacent on the next pass: already in combat, no new battle.
    h.clear();
    h.turn(GameEvent::player_turn());
    assert!(h.recorded(EventCategory::Textbox, EventAction::OnInitiateBattle).is_empty());
    assert_eq!(h.grid().combat().battles_started(), 1);
}

#[test]
fn dead_enemy_does_not_start_battle() {
    let mut h = Harness::new(GameConfig::new());
    h.level(
        r#"{ "cell_size": 254.0, "grid": ["PE"],
             "legend": { "P": { "kind": "player" }, "E": { "kind": "enemy", "health": 0.0 } } }"#,
    );
    h.turn(GameEvent::player_turn());
    assert!(h.recorded(EventCategory::Textbox, EventAction::OnInitiateBattle).is_empty());
    assert!(h.flags().in_combat);
}

#[test]
fn enemy_two_cells_away_growls() {
    let mut h = Harness::new(GameConfig::new());
    h.level(
        r#"{ "cell_size": 254.0, "grid": ["P", ".", "E"],
             "legend": { ".": null, "P": { "kind": "player" }, "E": { "kind": "enemy" } } }"#,
    );
    h.turn(GameEvent::player_turn());

    let growls = h.recorded(EventCategory::Sound2D, EventAction::OnPlay);
    assert!(growls.iter().any(|e| e.text() == Some("growl")));
    assert!(!h.flags().in_combat);
}

#[test]
fn enemy_turn_without_enemies_hands_turn_back_once() {
    let mut h = Harness::new(GameConfig::new());
    h.level(
        r#"{ "cell_size": 254.0, "grid": ["P"],
             "legend": { "P": { "kind": "player" } } }"#,
    );
    h.turn(GameEvent::enemy_turn());
    assert_eq!(h.recorded(EventCategory::Game, EventAction::PlayerTurn).len(), 1);
}

#[test]
fn detection_pass_records_the_faced_enemy() {
    let mut h = Harness::new(GameConfig::new());
    let spawned = h.level(
        r#"{ "cell_size": 254.0, "grid": ["EPE"],
             "legend": { "E": { "kind": "enemy" },
                         "P": { "kind": "player", "look": [1.0, 0.0, 0.0] } } }"#,
    );
    let (behind, player, ahead) = (spawned[0], spawned[1], spawned[2]);

    h.turn(GameEvent::player_turn());
    assert_eq!(h.grid().faced_enemies(), &[(player, ahead)]);
    assert!(!h.grid().faced_enemies().contains(&(player, behind)));

    // Turning away clears the record on the next pass.
    h.runtime
        .world_mut()
        .get_mut::<Transform3D>(player)
        .unwrap()
        .look = Vec3::Z;
    h.turn(GameEvent::player_turn());
    assert!(h.grid().faced_enemies().is_empty());
}

#[test]
fn enemy_turn_with_enemies_resets_their_collisions() {
    let mut h = Harness::new(GameConfig::new());
    h.level(
        r#"{ "cell_size": 254.0, "grid": ["P...E"],
             "legend": { ".": null, "P": { "kind": "player" }, "E": { "kind": "enemy" } } }"#,
    );
    let enemy = h.spawn(
        ActorKind::Enemy,
        Vec3::ZERO,
        (Combatant::new(10.0, 1.0, 1.0), TurnCollision::default()),
    );

    h.turn(GameEvent::enemy_turn());

    assert!(h.recorded(EventCategory::Game, EventAction::PlayerTurn).is_empty());
    let world = h.runtime.world();
    assert!(!world.get::<TurnCollision>(enemy).unwrap().has_collided());
}

// =============================================================================
// Items
// =============================================================================

#[test]
fn only_one_of_several_stacked_items_is_collected() {
    let mut h = Harness::new(GameConfig::new());
    h.level(
        r#"{ "cell_size": 254.0, "grid": ["P"],
             "legend": { "P": { "kind": "player" } } }"#,
    );
    let sword = h.spawn(ActorKind::Pickup, Vec3::ZERO, Pickup::new(PickupKind::Sword));
    let key = h.spawn(ActorKind::Pickup, Vec3::ZERO, Pickup::new(PickupKind::Key));

    h.turn(GameEvent::player_turn());

    let added = h.recorded(EventCategory::Textbox, EventAction::OnItemAdded);
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].text(), Some("Sword"));
    assert!(h.cues().contains(&play("equip_sword")));

    let mut grid = h.grid();
    assert_eq!(grid.items().to_vec(), vec![key]);
    assert_eq!(grid.inventory().count(PickupKind::Sword), 1);
    assert_eq!(grid.inventory().count(PickupKind::Key), 0);
    assert!(grid.objects_mut().take_removed().is_empty());

    // Removal is applied at the end of the tick.
    let world = h.runtime.world();
    assert!(world.get_entity(sword).is_err());
    assert!(world.get_entity(key).is_ok());
}

#[test]
fn adjacent_item_twinkles_and_distant_item_stops_it() {
    let mut h = Harness::new(GameConfig::new());
    let spawned = h.level(
        r#"{ "cell_size": 254.0, "grid": ["Pk"],
             "legend": { "P": { "kind": "player" }, "k": { "kind": "item", "pickup": "key" } } }"#,
    );
    h.turn(GameEvent::player_turn());
    assert!(h.cues().contains(&play("item_twinkle")));
    assert!(h.flags().in_proximity_of_item);
    assert!(h.recorded(EventCategory::Sound2D, EventAction::OnStop).is_empty());

    h.runtime
        .world_mut()
        .get_mut::<Transform3D>(spawned[1])
        .unwrap()
        .translation = Vec3::new(5.0 * D, 0.0, 0.0);
    h.clear();
    h.turn(GameEvent::player_turn());

    let stops = h.recorded(EventCategory::Sound2D, EventAction::OnStop);
    assert_eq!(
        stops,
        vec![GameEvent::sound(EventAction::OnStop, "item_twinkle").with(0_i64)]
    );
}

#[test]
fn not_in_combat_restores_main_theme() {
    let mut h = Harness::new(GameConfig::new());
    h.level(
        r#"{ "cell_size": 254.0, "grid": ["P"],
             "legend": { "P": { "kind": "player" } } }"#,
    );
    h.turn(GameEvent::player_turn());

    let sound: Vec<(EventAction, Option<String>)> = h
        .events
        .borrow()
        .iter()
        .filter(|e| e.category == EventCategory::Sound2D)
        .map(|e| (e.action, e.text().map(str::to_string)))
        .collect();
    assert_eq!(
        sound,
        vec![
            (EventAction::OnStop, Some("item_twinkle".into())),
            (EventAction::OnPause, Some("battle_theme".into())),
            (EventAction::OnPlay, Some("main_theme".into())),
        ]
    );
}

#[test]
fn health_pickup_heals_and_reports_per_policy() {
    for (policy, reported) in [(HealthReport::Current, 100.0_f32), (HealthReport::Healed, 125.0_f32)] {
        let mut config = GameConfig::new();
        config.health_report = policy;
        let mut h = Harness::new(config);
        let spawned = h.level(
            r#"{ "cell_size": 254.0, "grid": ["P"],
                 "legend": { "P": { "kind": "player", "health": 100.0 } } }"#,
        );
        h.spawn(
            ActorKind::Pickup,
            Vec3::ZERO,
            Pickup::new(PickupKind::Health).with_value(25.0),
        );

        h.turn(GameEvent::player_turn());

        assert_eq!(
            h.recorded(EventCategory::Textbox, EventAction::PlayerHealthPickup),
            vec![GameEvent::textbox(EventAction::PlayerHealthPickup).with(reported)]
        );
        assert!(h.cues().contains(&play("drink_potion")));
        let health = h.runtime.world().get::<Combatant>(spawned[0]).unwrap().health;
        assert_eq!(health, 125.0);
    }
}

// =============================================================================
// Gates
// =============================================================================

#[test]
fn gate_opens_with_key() {
    let mut h = Harness::new(GameConfig::new());
    let spawned = h.level(
        r#"{ "cell_size": 254.0, "grid": ["PG"],
             "legend": { "P": { "kind": "player" }, "G": { "kind": "gate" } } }"#,
    );
    let gate = spawned[1];
    let key = h.runtime.world_mut().spawn_empty().id();
    h.grid().inventory_mut().add_item(key, PickupKind::Key);
    assert!(h.runtime.world().get::<CollisionSkin>(gate).is_some());

    h.turn(GameEvent::player_turn());

    let gate_open = h.cues().iter().filter(|c| **c == play("gate_open")).count();
    assert_eq!(gate_open, 1);
    assert_eq!(
        h.recorded(EventCategory::Textbox, EventAction::OnItemRemoved),
        vec![GameEvent::textbox(EventAction::OnItemRemoved).with("Key")]
    );
    assert!(h.grid().gates().is_empty());
    assert_eq!(h.grid().inventory().count(PickupKind::Key), 0);
    assert!(h.runtime.world().get_entity(gate).is_err());
    assert!(h.recorded(EventCategory::Textbox, EventAction::OnDisplayInfo).is_empty());
}

#[test]
fn locked_gate_prompts_every_pass_by_default() {
    let mut h = Harness::new(GameConfig::new());
    h.level(
        r#"{ "cell_size": 254.0, "grid": ["PG"],
             "legend": { "P": { "kind": "player" }, "G": { "kind": "gate" } } }"#,
    );
    h.turn(GameEvent::player_turn());
    h.turn(GameEvent::player_turn());

    let prompts = h.recorded(EventCategory::Textbox, EventAction::OnDisplayInfo);
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0].text(), Some(GATE_PROMPT));
    assert_eq!(h.grid().gates().len(), 1);
    assert!(h.flags().in_proximity_of_gate);
}

#[test]
fn locked_gate_prompts_once_per_streak() {
    let mut config = GameConfig::new();
    config.gate_prompt = GatePromptPolicy::Once;
    let mut h = Harness::new(config);
    let spawned = h.level(
        r#"{ "cell_size": 254.0, "grid": ["PG"],
             "legend": { "P": { "kind": "player" }, "G": { "kind": "gate" } } }"#,
    );
    let player = spawned[0];
    h.turn(GameEvent::player_turn());
    h.turn(GameEvent::player_turn());
    assert_eq!(h.recorded(EventCategory::Textbox, EventAction::OnDisplayInfo).len(), 1);

    // Step away and come back: a new streak prompts again.
    let mut transform = h.runtime.world_mut().get_mut::<Transform3D>(player).unwrap();
    transform.translation = Vec3::new(-3.0 * D, 0.0, 0.0);
    h.turn(GameEvent::player_turn());
    h.runtime
        .world_mut()
        .get_mut::<Transform3D>(player)
        .unwrap()
        .translation = Vec3::ZERO;
    h.turn(GameEvent::player_turn());
    assert_eq!(h.recorded(EventCategory::Textbox, EventAction::OnDisplayInfo).len(), 2);
}

#[test]
fn locked_gate_prompts_once_with_several_players() {
    let mut config = GameConfig::new();
    config.gate_prompt = GatePromptPolicy::Once;
    let mut h = Harness::new(config);
    let spawned = h.level(
        r#"{ "cell_size": 254.0, "grid": ["PG", "..", "..", "Q."],
             "legend": { ".": null, "P": { "kind": "player" }, "Q": { "kind": "player" },
                         "G": { "kind": "gate" } } }"#,
    );
    assert_eq!(h.grid().players().len(), 2);

    for _ in 0..3 {
        h.turn(GameEvent::player_turn());
    }
    assert_eq!(h.recorded(EventCategory::Textbox, EventAction::OnDisplayInfo).len(), 1);

    // The far player walking up to the same gate starts a streak of its own.
    h.runtime
        .world_mut()
        .get_mut::<Transform3D>(spawned[2])
        .unwrap()
        .translation = Vec3::new(D, 0.0, D);
    h.turn(GameEvent::player_turn());
    h.turn(GameEvent::player_turn());
    assert_eq!(h.recorded(EventCategory::Textbox, EventAction::OnDisplayInfo).len(), 2);
}

#[test]
fn standing_inside_a_gate_changes_nothing() {
    let mut h = Harness::new(GameConfig::new());
    h.level(
        r#"{ "cell_size": 254.0, "grid": ["P"],
             "legend": { "P": { "kind": "player" } } }"#,
    );
    let gate = h.spawn(ActorKind::Gate, Vec3::ZERO, CollisionSkin::cell(D));
    let key = h.runtime.world_mut().spawn_empty().id();
    h.grid().inventory_mut().add_item(key, PickupKind::Key);

    h.turn(GameEvent::player_turn());

    assert!(!h.cues().contains(&play("gate_open")));
    assert!(h.recorded(EventCategory::Textbox, EventAction::OnItemRemoved).is_empty());
    assert!(h.recorded(EventCategory::Textbox, EventAction::OnDisplayInfo).is_empty());
    assert_eq!(h.grid().inventory().count(PickupKind::Key), 1);
    assert_eq!(h.grid().gates().to_vec(), vec![gate]);
    assert!(h.flags().in_proximity_of_gate);
    assert!(h.runtime.world().get::<CollisionSkin>(gate).is_some());
}

// =============================================================================
// Triggers and membership
// =============================================================================

#[test]
fn trigger_starts_scene_then_pauses() {
    let mut h = Harness::new(GameConfig::new());
    h.level(
        r#"{ "cell_size": 254.0, "grid": ["P"],
             "legend": { "P": { "kind": "player" } } }"#,
    );
    h.spawn(
        ActorKind::Trigger,
        Vec3::new(0.0, 10.0, 0.0),
        SceneTrigger::new("crypt"),
    );
    h.turn(GameEvent::player_turn());

    let menu: Vec<EventAction> = h
        .events
        .borrow()
        .iter()
        .filter(|e| e.category == EventCategory::Menu)
        .map(|e| e.action)
        .collect();
    assert_eq!(menu, vec![EventAction::OnStart, EventAction::OnPause]);
    assert_eq!(
        h.recorded(EventCategory::Menu, EventAction::OnStart)[0].text(),
        Some("crypt")
    );
    assert_eq!(h.runtime.scene().current(), "crypt");
    assert!(h.runtime.scene().is_paused());
}

#[test]
fn adjacent_trigger_does_nothing() {
    let mut h = Harness::new(GameConfig::new());
    h.level(
        r#"{ "cell_size": 254.0, "grid": ["PT"],
             "legend": { "P": { "kind": "player" },
                         "T": { "kind": "trigger", "scene": "crypt" } } }"#,
    );
    h.turn(GameEvent::player_turn());

    assert!(h.events.borrow().iter().all(|e| e.category != EventCategory::Menu));
    assert!(!h.flags().in_proximity_of_trigger);
    assert_eq!(h.runtime.scene().current(), "main");
    assert!(!h.runtime.scene().is_paused());
    assert_eq!(h.grid().triggers().len(), 1);
}

#[test]
fn remove_actor_event_untracks_actor() {
    let mut h = Harness::new(GameConfig::new());
    let spawned = h.level(
        r#"{ "cell_size": 254.0, "grid": ["PE"],
             "legend": { "P": { "kind": "player" }, "E": { "kind": "enemy" } } }"#,
    );
    let enemy = ActorRef::new(spawned[1], ActorKind::Enemy);
    assert!(h.grid().enemies().contains(enemy.entity));

    h.turn(GameEvent::remove_actor(enemy));
    assert!(h.grid().enemies().is_empty());
    assert_eq!(h.grid().players().len(), 1);
    // Only the local set is touched.
    assert!(h.runtime.world().get_entity(enemy.entity).is_ok());
}

// =============================================================================
// Full run
// =============================================================================

#[test]
fn demo_level_runs_to_the_exit() {
    let (bridge, _sound) = SoundBridge::channel();
    let mut runtime = GameRuntime::new(GameConfig::new(), bridge);
    runtime.load_level(&demo_level().unwrap()).unwrap();
    assert_eq!(runtime.animate_players().unwrap(), 1);

    for _ in 0..6 {
        runtime.player_turn();
        runtime.enemy_turn();
    }

    assert_eq!(runtime.scene().current(), "win_scene");
    assert!(runtime.scene().is_paused());
    let grid = runtime.grid();
    assert!(grid.items().is_empty());
    assert!(grid.gates().is_empty());
    assert_eq!(grid.enemies().len(), 1);
    assert_eq!(grid.inventory().count(PickupKind::Key), 0);

    let texts: Vec<(EventAction, Option<&str>)> = runtime
        .messages()
        .entries()
        .map(|e| (e.action, e.text()))
        .collect();
    assert!(texts.contains(&(EventAction::OnItemAdded, Some("Key"))));
    assert!(texts.contains(&(EventAction::OnItemRemoved, Some("Key"))));

    let world = runtime.world_mut();
    let mut heroes = world.query::<(&ActorName, &AnimatedCharacter)>();
    let (name, character) = heroes.single(world).unwrap();
    assert_eq!(name.as_str(), "hero");
    assert!(character.active_player().unwrap().elapsed() > 0.0);
}
