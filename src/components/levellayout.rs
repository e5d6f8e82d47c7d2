//! Level layout data for data-driven actor spawning.
//!
//! A layout is a JSON file describing a grid of cells on the XZ plane. Each
//! character of a grid row is looked up in the legend; characters mapped to
//! `null` (or missing from the legend) are empty floor. See
//! [`spawn_level`](crate::systems::levellayout::spawn_level) for how cells
//! become actors.
//!
//! ```json
//! {
//!   "cell_size": 254.0,
//!   "origin": [0.0, 0.0, 0.0],
//!   "grid": ["P.k.G.T", "...E..."],
//!   "legend": {
//!     ".": null,
//!     "P": { "kind": "player", "name": "hero", "health": 100.0 },
//!     "E": { "kind": "enemy", "name": "skeleton", "health": 30.0 },
//!     "k": { "kind": "pickup", "pickup": "key" },
//!     "G": { "kind": "gate" },
//!     "T": { "kind": "trigger", "scene": "win_scene" }
//!   }
//! }
//! ```

use std::path::Path;

use glam::Vec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to read level layout: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse level layout: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cell '{symbol}' has unknown {field} '{value}'")]
    UnknownKind {
        symbol: char,
        field: &'static str,
        value: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LevelLayoutData {
    pub cell_size: f32,
    #[serde(default)]
    pub origin: [f32; 3],
    pub grid: Vec<String>,
    pub legend: FxHashMap<char, Option<LevelCell>>,
}

/// One legend entry.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LevelCell {
    /// `player`, `enemy`, `pickup` (or `item`), `gate`, `trigger`.
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub health: Option<f32>,
    #[serde(default)]
    pub attack: Option<f32>,
    #[serde(default)]
    pub defence: Option<f32>,
    /// Pickup kind: `sword`, `key`, `health`.
    #[serde(default)]
    pub pickup: Option<String>,
    #[serde(default)]
    pub value: Option<f32>,
    /// Target scene of a trigger.
    #[serde(default)]
    pub scene: Option<String>,
    #[serde(default)]
    pub look: Option<[f32; 3]>,
}

/// A legend cell resolved to its place in the world.
#[derive(Debug, Clone, Copy)]
pub struct PlacedCell<'a> {
    pub symbol: char,
    pub row: usize,
    pub col: usize,
    pub translation: Vec3,
    pub cell: &'a LevelCell,
}

impl LevelLayoutData {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(text: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn origin(&self) -> Vec3 {
        Vec3::from_array(self.origin)
    }

    /// Iterate over all defined cells, row by row, with their world positions.
    pub fn iter_cells(&self) -> impl Iterator<Item = PlacedCell<'_>> {
        let origin = self.origin();
        self.grid.iter().enumerate().flat_map(move |(row, line)| {
            line.chars().enumerate().filter_map(move |(col, symbol)| {
                let Some(Some(cell)) = self.legend.get(&symbol) else {
                    return None;
                };
                let translation =
                    origin + Vec3::new(col as f32 * self.cell_size, 0.0, row as f32 * self.cell_size);
                Some(PlacedCell {
                    symbol,
                    row,
                    col,
                    translation,
                    cell,
                })
            })
        })
    }
}
