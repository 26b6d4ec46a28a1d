//! Tile and grid boundary types.
//!
//! The grid itself (generation, layout, rendering) belongs to the game
//! shell. The engine only needs stable tile identities, category classes,
//! and a narrow mutation surface for goal side effects.

use serde::{Deserialize, Serialize};

/// Tiles consumed per match.
pub const TILES_PER_MATCH: u32 = 3;

/// Identity of one placed tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId(pub u32);

/// A tile's color class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl TileKind {
    /// Every category, in the order levels unlock them.
    pub const ALL: [TileKind; 6] = [
        TileKind::Red,
        TileKind::Orange,
        TileKind::Yellow,
        TileKind::Green,
        TileKind::Blue,
        TileKind::Purple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TileKind::Red => "red",
            TileKind::Orange => "orange",
            TileKind::Yellow => "yellow",
            TileKind::Green => "green",
            TileKind::Blue => "blue",
            TileKind::Purple => "purple",
        }
    }
}

/// Grid cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One placed tile as the engine sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub kind: TileKind,
    pub cell: Cell,
}

impl Tile {
    pub fn new(id: TileId, kind: TileKind, cell: Cell) -> Self {
        Self { id, kind, cell }
    }
}

/// Side effects the engine asks of the grid and audio collaborators.
///
/// Implemented by the game shell; the engine never mutates the grid
/// directly.
pub trait GridEffects {
    /// Replace the tile at `cell` with a freshly generated tile of `kind`,
    /// returning the new tile.
    fn replace_tile(&mut self, cell: Cell, kind: TileKind) -> Tile;

    /// Disable an enemy tile so it stops blocking play.
    fn disable_enemy(&mut self, tile: TileId);

    /// Unblock the cells surrounding a defeated enemy tile.
    fn unblock_neighbors(&mut self, cell: Cell);

    /// Play the goal-completion sound.
    fn play_goal_sound(&mut self);

    /// Whether the goal-completion sound is still playing.
    fn goal_sound_playing(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_order_matches_level_unlock_order() {
        assert_eq!(TileKind::ALL[0], TileKind::Red);
        assert_eq!(TileKind::ALL.len(), 6);
        assert_eq!(TileKind::Purple.as_str(), "purple");
    }
}
