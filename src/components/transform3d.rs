//! World-space placement of a grid actor.
//!
//! Actors sit on the centers of fixed-size cells but their translation is
//! stored as a continuous [`Vec3`]. The vertical (Y) axis never takes part in
//! proximity checks; see [`Transform3D::horizontal_distance`].

use bevy_ecs::prelude::Component;
use glam::Vec3;

/// Masks out the Y component of a vector.
pub const XZ_MASK: Vec3 = Vec3::new(1.0, 0.0, 1.0);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    pub translation: Vec3,
    /// Forward vector the actor is facing.
    pub look: Vec3,
}

impl Transform3D {
    pub fn new(translation: Vec3) -> Self {
        Self {
            translation,
            look: Vec3::NEG_Z,
        }
    }

    pub fn with_look(mut self, look: Vec3) -> Self {
        self.look = look;
        self
    }

    /// Translation projected onto the XZ plane.
    pub fn horizontal(&self) -> Vec3 {
        self.translation * XZ_MASK
    }

    /// Distance to `other` ignoring the vertical axis.
    pub fn horizontal_distance(&self, other: &Transform3D) -> f32 {
        self.horizontal().distance(other.horizontal())
    }

    /// True when this actor looks straight at `target`.
    ///
    /// Exact comparison of normalized vectors, matching grid-aligned facing.
    /// Coincident actors never face each other.
    pub fn is_facing(&self, target: &Transform3D) -> bool {
        let to_self = (self.translation - target.translation).normalize_or_zero();
        if to_self == Vec3::ZERO {
            return false;
        }
        self.look.normalize_or_zero() == -to_self
    }
}
