//! Event types and the event bus.
//!
//! Submodules:
//! - [`audio`] – commands and messages for the background audio thread
//! - [`dispatcher`] – per-category handler registration and the drain loop
//! - [`gameevent`] – the categorized, positional-payload event itself
//!
//! The queue half of the bus is a world resource, see
//! [`crate::resources::eventqueue`].
pub mod audio;
pub mod dispatcher;
pub mod gameevent;
