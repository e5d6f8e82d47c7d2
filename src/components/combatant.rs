use bevy_ecs::prelude::Component;

/// Health and combat stats for players and enemies.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Combatant {
    pub health: f32,
    pub attack: f32,
    pub defence: f32,
}

impl Combatant {
    pub fn new(health: f32, attack: f32, defence: f32) -> Self {
        Self {
            health,
            attack,
            defence,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn heal(&mut self, amount: f32) {
        self.health += amount;
    }
}
