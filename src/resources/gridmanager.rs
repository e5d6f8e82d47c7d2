//! Turn-based spatial interaction manager.
//!
//! The [`GridManager`] owns five disjoint actor sets (players, enemies, items,
//! gates, triggers) and the four collaborators it drives (sound, inventory,
//! combat, object lifecycle). On every turn change it runs a detection pass:
//! each player is scanned against every other category, contacts are
//! classified by horizontal distance on the cell grid, side effects are
//! applied through the collaborators and derived events are published to the
//! [`EventQueue`].
//!
//! # Contact classes
//!
//! With `D` the distance between the centers of two adjacent cells and `d`
//! the horizontal (XZ) distance between two actors:
//!
//! | condition    | class                 |
//! |--------------|-----------------------|
//! | `d == 0`     | [`Contact::Collision`]|
//! | `d <= D`     | [`Contact::Adjacent`] |
//! | `d == 2·D`   | [`Contact::TwoCells`] |
//! | otherwise    | [`Contact::None`]     |
//!
//! Collision takes precedence over adjacency even though `0 <= D`.
//!
//! Player/enemy and player/gate collisions mean the movement system let two
//! actors share a cell. They are logged and otherwise left alone; preventing
//! them is the movement system's job.
//!
//! The manager is a resource so it can be reached from event handlers; see
//! [`crate::systems::grid`] for the handler side.

use bevy_ecs::prelude::*;
use log::{debug, info, warn};
use rustc_hash::FxHashSet;

use crate::components::actor::{ActorKind, ActorName, ActorRef, TurnCollision};
use crate::components::architecture::{CollisionSkin, SceneTrigger};
use crate::components::combatant::Combatant;
use crate::components::pickup::{Pickup, PickupKind};
use crate::components::transform3d::Transform3D;
use crate::events::gameevent::{EventAction, EventCategory, GameEvent};
use crate::resources::audio::SoundBridge;
use crate::resources::combat::CombatManager;
use crate::resources::eventqueue::EventQueue;
use crate::resources::gameconfig::{GameConfig, GatePromptPolicy, HealthReport};
use crate::resources::gamestate::InteractionFlags;
use crate::resources::inventory::Inventory;
use crate::resources::objectmanager::ObjectManager;
use crate::resources::services::{CombatService, InventoryService, ObjectLifecycle, SoundService};

/// Tolerance for distance comparisons on grid-aligned float positions.
pub const GRID_EPSILON: f32 = 1e-3;

pub const MAIN_THEME: &str = "main_theme";
pub const BATTLE_THEME: &str = "battle_theme";
pub const GROWL: &str = "growl";
pub const ITEM_TWINKLE: &str = "item_twinkle";
pub const GATE_OPEN: &str = "gate_open";
pub const GATE_PROMPT: &str = "I will need a key to open this gate";

/// Grid manager wired to the stock collaborators.
pub type DefaultGridManager = GridManager<SoundBridge, Inventory, CombatManager, ObjectManager>;

/// Classification of two actors' relative placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Collision,
    Adjacent,
    TwoCells,
    None,
}

/// Insertion-ordered set of actors of one category.
#[derive(Debug, Default, Clone)]
pub struct ActorSet {
    entities: Vec<Entity>,
}

impl ActorSet {
    /// Returns `false` if the actor was already present.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.contains(entity) {
            return false;
        }
        self.entities.push(entity);
        true
    }

    pub fn remove(&mut self, entity: Entity) -> bool {
        match self.entities.iter().position(|e| *e == entity) {
            Some(index) => {
                self.entities.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Snapshot for iteration while the set may change.
    pub fn to_vec(&self) -> Vec<Entity> {
        self.entities.clone()
    }
}

/// Tunables taken from [`GameConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    /// Distance between the centers of two adjacent cells (`D`).
    pub cell_distance: f32,
    pub gate_prompt: GatePromptPolicy,
    pub health_report: HealthReport,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self::from_config(&GameConfig::new())
    }
}

impl GridSettings {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            cell_distance: config.cell_size,
            gate_prompt: config.gate_prompt,
            health_report: config.health_report,
        }
    }
}

#[derive(Resource)]
pub struct GridManager<S, I, C, O>
where
    S: SoundService,
    I: InventoryService,
    C: CombatService,
    O: ObjectLifecycle,
{
    players: ActorSet,
    enemies: ActorSet,
    items: ActorSet,
    gates: ActorSet,
    triggers: ActorSet,
    sound: S,
    inventory: I,
    combat: C,
    objects: O,
    settings: GridSettings,
    /// `(player, gate)` pairs that already showed the key prompt during the
    /// current adjacency streak ([`GatePromptPolicy::Once`] only).
    prompted_gates: FxHashSet<(Entity, Entity)>,
    /// `(player, enemy)` pairs found facing each other in the last pass.
    faced: Vec<(Entity, Entity)>,
}

impl<S, I, C, O> GridManager<S, I, C, O>
where
    S: SoundService,
    I: InventoryService,
    C: CombatService,
    O: ObjectLifecycle,
{
    pub fn new(settings: GridSettings, sound: S, inventory: I, combat: C, objects: O) -> Self {
        Self {
            players: ActorSet::default(),
            enemies: ActorSet::default(),
            items: ActorSet::default(),
            gates: ActorSet::default(),
            triggers: ActorSet::default(),
            sound,
            inventory,
            combat,
            objects,
            settings,
            prompted_gates: FxHashSet::default(),
            faced: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Category sets
    // ---------------------------------------------------------------------

    fn set_mut(&mut self, kind: ActorKind) -> &mut ActorSet {
        match kind {
            ActorKind::Player => &mut self.players,
            ActorKind::Enemy => &mut self.enemies,
            ActorKind::Pickup => &mut self.items,
            ActorKind::Gate => &mut self.gates,
            ActorKind::Trigger => &mut self.triggers,
        }
    }

    pub fn set(&self, kind: ActorKind) -> &ActorSet {
        match kind {
            ActorKind::Player => &self.players,
            ActorKind::Enemy => &self.enemies,
            ActorKind::Pickup => &self.items,
            ActorKind::Gate => &self.gates,
            ActorKind::Trigger => &self.triggers,
        }
    }

    /// Track `actor` in the set selected by its kind.
    pub fn add(&mut self, actor: ActorRef) -> bool {
        let added = self.set_mut(actor.kind).insert(actor.entity);
        if added {
            debug!("grid: tracking {:?} {:?}", actor.kind, actor.entity);
        }
        added
    }

    /// Stop tracking `actor`. Returns `false` if it was not tracked.
    pub fn remove(&mut self, actor: ActorRef) -> bool {
        let removed = self.set_mut(actor.kind).remove(actor.entity);
        if removed {
            debug!("grid: untracked {:?} {:?}", actor.kind, actor.entity);
            match actor.kind {
                ActorKind::Gate => self.prompted_gates.retain(|(_, gate)| *gate != actor.entity),
                ActorKind::Player => {
                    self.prompted_gates.retain(|(player, _)| *player != actor.entity)
                }
                _ => {}
            }
        }
        removed
    }

    pub fn players(&self) -> &ActorSet {
        &self.players
    }
    pub fn enemies(&self) -> &ActorSet {
        &self.enemies
    }
    pub fn items(&self) -> &ActorSet {
        &self.items
    }
    pub fn gates(&self) -> &ActorSet {
        &self.gates
    }
    pub fn triggers(&self) -> &ActorSet {
        &self.triggers
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }
    pub fn inventory(&self) -> &I {
        &self.inventory
    }
    pub fn inventory_mut(&mut self) -> &mut I {
        &mut self.inventory
    }
    pub fn combat(&self) -> &C {
        &self.combat
    }
    pub fn combat_mut(&mut self) -> &mut C {
        &mut self.combat
    }
    pub fn objects(&self) -> &O {
        &self.objects
    }
    pub fn objects_mut(&mut self) -> &mut O {
        &mut self.objects
    }
    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }
    pub fn faced_enemies(&self) -> &[(Entity, Entity)] {
        &self.faced
    }

    // ---------------------------------------------------------------------
    // Turn handling
    // ---------------------------------------------------------------------

    /// Player turn: detect, then clear every player's collision flag.
    pub fn on_player_turn(&mut self, world: &mut World) {
        self.detect_player_interaction(world);
        for player in self.players.iter() {
            reset_collision(world, player);
        }
    }

    /// Enemy turn: detect, then hand the turn back if no enemy is left.
    pub fn on_enemy_turn(&mut self, world: &mut World) {
        self.detect_player_interaction(world);
        if self.enemies.is_empty() {
            info!("grid: no enemies left, handing turn to player");
            publish(world, GameEvent::player_turn());
        } else {
            for enemy in self.enemies.iter() {
                reset_collision(world, enemy);
            }
        }
    }

    /// Scan every player against all other categories.
    pub fn detect_player_interaction(&mut self, world: &mut World) {
        world.init_resource::<InteractionFlags>();
        self.faced.clear();

        for player in self.players.to_vec() {
            let Some(player_tf) = world.get::<Transform3D>(player).copied() else {
                warn!("grid: player {:?} has no Transform3D, skipped", player);
                continue;
            };

            let in_combat = self.detect_enemies(world, player, &player_tf);
            world.resource_mut::<InteractionFlags>().in_combat = in_combat;

            let near_item = self.detect_items(world, player, &player_tf);
            world.resource_mut::<InteractionFlags>().in_proximity_of_item = near_item;

            let near_gate = self.detect_gates(world, player, &player_tf);
            world.resource_mut::<InteractionFlags>().in_proximity_of_gate = near_gate;

            let near_trigger = self.detect_triggers(world, &player_tf);
            world.resource_mut::<InteractionFlags>().in_proximity_of_trigger = near_trigger;

            self.update_sound(world);
        }
    }

    /// Classify `other` relative to `player` on the horizontal plane.
    pub fn classify(&self, player: &Transform3D, other: &Transform3D) -> Contact {
        let d = player.horizontal_distance(other);
        let cell = self.settings.cell_distance;
        if d <= GRID_EPSILON {
            Contact::Collision
        } else if d <= cell + GRID_EPSILON {
            Contact::Adjacent
        } else if (d - 2.0 * cell).abs() <= GRID_EPSILON {
            Contact::TwoCells
        } else {
            Contact::None
        }
    }

    // ---------------------------------------------------------------------
    // Enemies
    // ---------------------------------------------------------------------

    fn detect_enemies(&mut self, world: &mut World, player: Entity, player_tf: &Transform3D) -> bool {
        let already_in_combat = world.resource::<InteractionFlags>().in_combat;
        let mut battle_started = false;
        let mut in_combat = false;

        for enemy in self.enemies.to_vec() {
            let Some(enemy_tf) = world.get::<Transform3D>(enemy).copied() else {
                continue;
            };

            match self.classify(player_tf, &enemy_tf) {
                Contact::Collision => {
                    self.handle_enemy_collision(world, player, enemy);
                    in_combat = true;
                }
                Contact::Adjacent => {
                    let alive = world.get::<Combatant>(enemy).is_some_and(Combatant::is_alive);
                    if !already_in_combat && !battle_started && alive {
                        self.start_battle(world, enemy);
                        battle_started = true;
                    }
                    in_combat = true;
                }
                Contact::TwoCells => {
                    publish(world, GameEvent::sound(EventAction::OnPlay, GROWL));
                }
                Contact::None => {}
            }

            if player_tf.is_facing(&enemy_tf) {
                self.on_facing_enemy(world, player, enemy);
            }
        }

        in_combat
    }

    fn handle_enemy_collision(&mut self, world: &mut World, player: Entity, enemy: Entity) {
        warn!(
            "grid: player {:?} shares a cell with enemy {:?}; movement should prevent this",
            player, enemy
        );
        mark_collision(world, player);
        mark_collision(world, enemy);
    }

    fn start_battle(&mut self, world: &mut World, enemy: Entity) {
        info!("grid: {} engages the player", display_name(world, enemy));
        self.sound.pause_cue(MAIN_THEME);
        self.sound.play_cue(BATTLE_THEME);
        self.combat.initiate_battle(enemy);
        publish(
            world,
            GameEvent::textbox(EventAction::OnInitiateBattle)
                .with(ActorRef::new(enemy, ActorKind::Enemy)),
        );
    }

    /// Hook for surfacing the faced enemy's health bar.
    fn on_facing_enemy(&mut self, world: &mut World, player: Entity, enemy: Entity) {
        self.faced.push((player, enemy));
        let health = world.get::<Combatant>(enemy).map(|c| c.health);
        debug!(
            "grid: player {:?} faces {} (health {:?})",
            player,
            display_name(world, enemy),
            health
        );
    }

    // ---------------------------------------------------------------------
    // Items
    // ---------------------------------------------------------------------

    fn detect_items(&mut self, world: &mut World, player: Entity, player_tf: &Transform3D) -> bool {
        // Only one item is handled per pass: the first one in set order.
        let hit = self.items.iter().find_map(|item| {
            let item_tf = world.get::<Transform3D>(item)?;
            match self.classify(player_tf, item_tf) {
                contact @ (Contact::Collision | Contact::Adjacent) => Some((item, contact)),
                _ => None,
            }
        });

        match hit {
            Some((item, Contact::Collision)) => self.collect_item(world, player, item),
            Some((_, _)) => {
                self.sound.play_cue(ITEM_TWINKLE);
                true
            }
            None => false,
        }
    }

    /// Returns `false` when `item` turned out not to be a pickup.
    fn collect_item(&mut self, world: &mut World, player: Entity, item: Entity) -> bool {
        let Some(pickup) = world.get::<Pickup>(item).copied() else {
            warn!("grid: item {:?} has no Pickup component, untracked", item);
            self.items.remove(item);
            return false;
        };

        let notice = match pickup.kind {
            PickupKind::Sword | PickupKind::Key => {
                GameEvent::textbox(EventAction::OnItemAdded).with(pickup.kind.label())
            }
            PickupKind::Health => {
                let current = world.get::<Combatant>(player).map_or(0.0, |c| c.health);
                let reported = match self.settings.health_report {
                    HealthReport::Current => current,
                    HealthReport::Healed => current + pickup.value,
                };
                GameEvent::textbox(EventAction::PlayerHealthPickup).with(reported)
            }
        };
        publish(world, notice);
        self.sound.play_cue(pickup.kind.pickup_cue());

        self.inventory.add_item(item, pickup.kind);
        self.objects.remove(item);
        self.items.remove(item);

        if pickup.kind == PickupKind::Health {
            if let Some(mut combatant) = world.get_mut::<Combatant>(player) {
                combatant.heal(pickup.value);
            }
        }
        info!("grid: player {:?} collected {:?}", player, pickup.kind);
        true
    }

    // ---------------------------------------------------------------------
    // Gates
    // ---------------------------------------------------------------------

    fn detect_gates(&mut self, world: &mut World, player: Entity, player_tf: &Transform3D) -> bool {
        let hit = self.gates.iter().find_map(|gate| {
            let gate_tf = world.get::<Transform3D>(gate)?;
            match self.classify(player_tf, gate_tf) {
                contact @ (Contact::Collision | Contact::Adjacent) => Some((gate, contact)),
                _ => None,
            }
        });

        // A prompt streak ends as soon as this player is not next to that gate.
        let adjacent_gate = match hit {
            Some((gate, Contact::Adjacent)) => Some(gate),
            _ => None,
        };
        self.prompted_gates
            .retain(|(owner, gate)| *owner != player || Some(*gate) == adjacent_gate);

        match hit {
            Some((gate, Contact::Collision)) => {
                warn!("grid: player stands inside gate {:?}; movement should prevent this", gate);
                true
            }
            Some((gate, _)) => {
                self.handle_gate(world, player, gate);
                true
            }
            None => false,
        }
    }

    fn handle_gate(&mut self, world: &mut World, player: Entity, gate: Entity) {
        if self.inventory.has_item(PickupKind::Key) {
            self.sound.play_cue(GATE_OPEN);
            self.inventory.use_item(PickupKind::Key);
            publish(
                world,
                GameEvent::textbox(EventAction::OnItemRemoved).with(PickupKind::Key.label()),
            );

            self.gates.remove(gate);
            self.prompted_gates.retain(|(_, prompted)| *prompted != gate);
            self.objects.remove(gate);
            if world.get::<CollisionSkin>(gate).is_some() {
                world.entity_mut(gate).remove::<CollisionSkin>();
            }
            info!("grid: gate {:?} opened", gate);
        } else {
            let first_prompt = self.prompted_gates.insert((player, gate));
            if first_prompt || self.settings.gate_prompt == GatePromptPolicy::Repeat {
                publish(
                    world,
                    GameEvent::textbox(EventAction::OnDisplayInfo).with(GATE_PROMPT),
                );
            }
        }
    }

    // ---------------------------------------------------------------------
    // Triggers
    // ---------------------------------------------------------------------

    fn detect_triggers(&mut self, world: &mut World, player_tf: &Transform3D) -> bool {
        let hit = self.triggers.iter().find(|trigger| {
            world
                .get::<Transform3D>(*trigger)
                .is_some_and(|tf| self.classify(player_tf, tf) == Contact::Collision)
        });

        let Some(trigger) = hit else {
            return false;
        };
        let scene = world
            .get::<SceneTrigger>(trigger)
            .cloned()
            .unwrap_or_default()
            .target_scene;
        info!("grid: trigger {:?} starts scene '{}'", trigger, scene);
        // Load the target scene before suspending the current one.
        publish(
            world,
            GameEvent::new(EventCategory::Menu, EventAction::OnStart).with(scene),
        );
        publish(world, GameEvent::new(EventCategory::Menu, EventAction::OnPause));
        true
    }

    // ---------------------------------------------------------------------
    // Sound
    // ---------------------------------------------------------------------

    fn update_sound(&mut self, world: &mut World) {
        let flags = *world.resource::<InteractionFlags>();
        if !flags.in_proximity_of_item {
            publish(world, GameEvent::sound(EventAction::OnStop, ITEM_TWINKLE).with(0_i64));
        }
        if !flags.in_combat {
            publish(world, GameEvent::sound(EventAction::OnPause, BATTLE_THEME));
            publish(world, GameEvent::sound(EventAction::OnPlay, MAIN_THEME));
        }
    }
}

impl<S, I, C, O> std::fmt::Debug for GridManager<S, I, C, O>
where
    S: SoundService,
    I: InventoryService,
    C: CombatService,
    O: ObjectLifecycle,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridManager")
            .field("players", &self.players().len())
            .field("enemies", &self.enemies().len())
            .field("items", &self.items().len())
            .field("gates", &self.gates().len())
            .field("triggers", &self.triggers().len())
            .finish()
    }
}

fn publish(world: &mut World, event: GameEvent) {
    match world.get_resource_mut::<EventQueue>() {
        Some(mut queue) => {
            queue.publish(event);
        }
        None => warn!("grid: EventQueue missing, dropped {}", event),
    }
}

fn reset_collision(world: &mut World, actor: Entity) {
    if let Some(mut flag) = world.get_mut::<TurnCollision>(actor) {
        flag.reset();
    }
}

fn mark_collision(world: &mut World, actor: Entity) {
    if let Some(mut flag) = world.get_mut::<TurnCollision>(actor) {
        flag.mark();
    }
}

fn display_name(world: &World, actor: Entity) -> String {
    world
        .get::<ActorName>(actor)
        .map(|name| name.as_str().to_string())
        .unwrap_or_else(|| format!("{:?}", actor))
}
