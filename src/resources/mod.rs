//! ECS resources made available to systems and event handlers.
//!
//! Overview
//! - `audio` – bridge and channels for the background audio thread
//! - `combat` – stock combat collaborator recording the active battle
//! - `eventqueue` – deduplicating FIFO of pending events
//! - `gameconfig` – INI-backed runtime configuration
//! - `gamestate` – interaction flags and scene state
//! - `gridmanager` – turn-based spatial interaction between actors
//! - `inventory` – stock inventory collaborator
//! - `messagelog` – bounded log of textbox/UI messages
//! - `objectmanager` – deferred actor removal
//! - `services` – collaborator traits driven by the grid manager
//! - `worldtime` – simulation time and delta
pub mod audio;
pub mod combat;
pub mod eventqueue;
pub mod gameconfig;
pub mod gamestate;
pub mod gridmanager;
pub mod inventory;
pub mod messagelog;
pub mod objectmanager;
pub mod services;
pub mod worldtime;
