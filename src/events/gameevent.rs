//! Event data exchanged through the event bus.
//!
//! A [`GameEvent`] is a category, an action and an ordered list of opaque
//! parameters that each handler interprets positionally (`["growl"]`,
//! `["Key"]`, `[current_health]`, ...). Identity is structural: two events
//! with the same category, action and parameters are the same event for the
//! purpose of per-cycle deduplication.

use std::fmt;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::components::actor::ActorRef;

/// Routing key of an event. Handlers subscribe per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Turn changes and other high-level flow.
    Game,
    Menu,
    Sound2D,
    SystemAdd,
    SystemRemove,
    /// Informational textbox prompts.
    Textbox,
    UI,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventAction {
    PlayerTurn,
    EnemyTurn,
    OnPlay,
    OnPause,
    OnResume,
    OnStop,
    OnStart,
    OnAddActor,
    OnRemoveActor,
    OnInitiateBattle,
    OnItemAdded,
    OnItemRemoved,
    OnDisplayInfo,
    PlayerHealthPickup,
}

/// One positional payload value.
///
/// `Scalar` compares and hashes by bit pattern so events carrying floats keep
/// a total structural identity.
#[derive(Debug, Clone)]
pub enum EventParam {
    Text(String),
    Int(i64),
    Scalar(f32),
    Actor(ActorRef),
}

impl EventParam {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EventParam::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_actor(&self) -> Option<ActorRef> {
        match self {
            EventParam::Actor(v) => Some(*v),
            _ => None,
        }
    }
}

impl PartialEq for EventParam {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EventParam::Text(a), EventParam::Text(b)) => a == b,
            (EventParam::Int(a), EventParam::Int(b)) => a == b,
            (EventParam::Scalar(a), EventParam::Scalar(b)) => a.to_bits() == b.to_bits(),
            (EventParam::Actor(a), EventParam::Actor(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for EventParam {}

impl Hash for EventParam {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            EventParam::Text(v) => v.hash(state),
            EventParam::Int(v) => v.hash(state),
            EventParam::Scalar(v) => v.to_bits().hash(state),
            EventParam::Actor(v) => v.hash(state),
        }
    }
}

impl fmt::Display for EventParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventParam::Text(v) => write!(f, "{v}"),
            EventParam::Int(v) => write!(f, "{v}"),
            EventParam::Scalar(v) => write!(f, "{v}"),
            EventParam::Actor(v) => write!(f, "{:?}({:?})", v.kind, v.entity),
        }
    }
}

impl From<&str> for EventParam {
    fn from(value: &str) -> Self {
        EventParam::Text(value.to_string())
    }
}

impl From<String> for EventParam {
    fn from(value: String) -> Self {
        EventParam::Text(value)
    }
}

impl From<i64> for EventParam {
    fn from(value: i64) -> Self {
        EventParam::Int(value)
    }
}

impl From<f32> for EventParam {
    fn from(value: f32) -> Self {
        EventParam::Scalar(value)
    }
}

impl From<ActorRef> for EventParam {
    fn from(value: ActorRef) -> Self {
        EventParam::Actor(value)
    }
}

pub type EventParams = SmallVec<[EventParam; 2]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameEvent {
    pub category: EventCategory,
    pub action: EventAction,
    pub params: EventParams,
}

impl GameEvent {
    pub fn new(category: EventCategory, action: EventAction) -> Self {
        Self {
            category,
            action,
            params: SmallVec::new(),
        }
    }

    /// Append a payload value.
    pub fn with(mut self, param: impl Into<EventParam>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn param(&self, index: usize) -> Option<&EventParam> {
        self.params.get(index)
    }

    /// First parameter as text, the common shape for cue names and prompts.
    pub fn text(&self) -> Option<&str> {
        self.param(0).and_then(EventParam::as_text)
    }

    // Shorthands for the events the core publishes and consumes.

    pub fn player_turn() -> Self {
        Self::new(EventCategory::Game, EventAction::PlayerTurn)
    }

    pub fn enemy_turn() -> Self {
        Self::new(EventCategory::Game, EventAction::EnemyTurn)
    }

    pub fn add_actor(actor: ActorRef) -> Self {
        Self::new(EventCategory::SystemAdd, EventAction::OnAddActor).with(actor)
    }

    pub fn remove_actor(actor: ActorRef) -> Self {
        Self::new(EventCategory::SystemRemove, EventAction::OnRemoveActor).with(actor)
    }

    pub fn sound(action: EventAction, cue: &str) -> Self {
        Self::new(EventCategory::Sound2D, action).with(cue)
    }

    pub fn textbox(action: EventAction) -> Self {
        Self::new(EventCategory::Textbox, action)
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.category, self.action)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", params.join(", "))?;
        }
        Ok(())
    }
}
