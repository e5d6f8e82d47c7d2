//! ECS components for grid actors.
//!
//! Submodules overview:
//! - [`actor`] – actor kind tag, display name, event payload reference and the per-turn collision flag
//! - [`animation`] – clip catalog and skinned animation player of a character
//! - [`architecture`] – gate collision skins and scene triggers
//! - [`combatant`] – health and combat stats
//! - [`levellayout`] – JSON level layout data
//! - [`pickup`] – collectable items
//! - [`skinning`] – skeleton, bind pose and animation clip data of a model
//! - [`transform3d`] – world placement and facing of an actor

pub mod actor;
pub mod animation;
pub mod architecture;
pub mod combatant;
pub mod levellayout;
pub mod pickup;
pub mod skinning;
pub mod transform3d;
