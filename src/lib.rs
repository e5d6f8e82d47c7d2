//! gridcrawl library.
//!
//! Turn-based grid interaction core: an event bus with per-cycle
//! deduplication, a grid manager that turns spatial relationships between
//! actors into gameplay side effects, and skinned character animation.
//!
//! This module exposes the ECS components, resources, systems and events for
//! the headless runner and the integration tests.

pub mod components;
pub mod events;
pub mod game;
pub mod resources;
pub mod systems;
