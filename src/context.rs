//! Externally owned gameplay snapshot.
//!
//! The game shell constructs and owns the [`GameContext`]; the engine is
//! handed a mutable reference on every signal. It reads the current tile,
//! the match category, and the per-category totals, and writes back the
//! win flag, the enemy flag, and the active tile.

use std::collections::HashMap;

use crate::grid::{Tile, TileId, TileKind};

/// Mutable snapshot of the running game, shared with the engine.
#[derive(Debug, Clone, Default)]
pub struct GameContext {
    /// Current level id (row into the level table).
    pub level: u32,
    /// Tile most recently clicked or swapped.
    pub current: Option<Tile>,
    /// Category of the most recent match.
    pub matched_kind: Option<TileKind>,
    /// Tiles on the board per category.
    pub totals: HashMap<TileKind, u32>,
    /// Enemy tiles still standing.
    pub enemies: Vec<Tile>,
    /// Enemy tiles spawned since the level started.
    pub enemies_spawned: u32,
    /// Every category's match goal has been reached in time.
    pub won_before_timeout: bool,
    /// Some spawned enemies have not been defeated yet.
    pub enemies_still_present: bool,
}

impl GameContext {
    pub fn new(level: u32) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// Board supply for one category; zero if the category is absent.
    pub fn total(&self, kind: TileKind) -> u32 {
        self.totals.get(&kind).copied().unwrap_or(0)
    }

    pub fn set_total(&mut self, kind: TileKind, count: u32) {
        self.totals.insert(kind, count);
    }

    /// Categories present on the board, in category order.
    pub fn kinds_present(&self) -> Vec<TileKind> {
        let mut kinds: Vec<TileKind> = self
            .totals
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(kind, _)| *kind)
            .collect();
        kinds.sort();
        kinds
    }

    pub fn is_enemy(&self, id: TileId) -> bool {
        self.enemies.iter().any(|t| t.id == id)
    }

    pub fn enemy(&self, id: TileId) -> Option<&Tile> {
        self.enemies.iter().find(|t| t.id == id)
    }

    /// Record a newly spawned enemy tile.
    pub fn register_enemy(&mut self, tile: Tile) {
        self.enemies.push(tile);
        self.enemies_spawned += 1;
        self.enemies_still_present = true;
    }

    /// Drop a defeated enemy from the standing set.
    pub fn remove_enemy(&mut self, id: TileId) {
        self.enemies.retain(|t| t.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    #[test]
    fn totals_default_to_zero() {
        let mut ctx = GameContext::new(0);
        assert_eq!(ctx.total(TileKind::Red), 0);
        ctx.set_total(TileKind::Red, 12);
        assert_eq!(ctx.total(TileKind::Red), 12);
    }

    #[test]
    fn kinds_present_skips_empty_categories() {
        let mut ctx = GameContext::new(0);
        ctx.set_total(TileKind::Blue, 9);
        ctx.set_total(TileKind::Red, 3);
        ctx.set_total(TileKind::Green, 0);
        assert_eq!(ctx.kinds_present(), vec![TileKind::Red, TileKind::Blue]);
    }

    #[test]
    fn enemy_registration_tracks_spawn_count() {
        let mut ctx = GameContext::new(0);
        let enemy = Tile::new(TileId(7), TileKind::Purple, Cell::new(2, 2));
        ctx.register_enemy(enemy);
        assert!(ctx.is_enemy(TileId(7)));
        assert_eq!(ctx.enemies_spawned, 1);
        ctx.remove_enemy(TileId(7));
        assert!(!ctx.is_enemy(TileId(7)));
        assert_eq!(ctx.enemies_spawned, 1);
    }
}
