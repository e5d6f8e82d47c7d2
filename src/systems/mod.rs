//! Engine systems and event handlers.
//!
//! Submodules overview
//! - [`animation`] – advance skinned animation clips
//! - [`audio`] – audio backend thread and the `Sound2D` handler
//! - [`grid`] – event handlers driving the grid manager
//! - [`levellayout`] – spawn actors from JSON level layouts
//! - [`movement`] – step players across the grid
//! - [`scene`] – `Menu` handler for scene transitions and pausing
//! - [`time`] – update simulation time and delta

pub mod animation;
pub mod audio;
pub mod grid;
pub mod levellayout;
pub mod movement;
pub mod scene;
pub mod time;
