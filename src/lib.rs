//! Quest and goal evaluation engine for a tile-matching game.
//!
//! The engine observes gameplay events (tile clicked, tile swapped, match
//! found, grid repainted), accumulates per-entity counters and intervals,
//! compares them against level-scaled goal thresholds, and triggers side
//! effects when a goal is satisfied: enemy tiles are disabled, clicked
//! tiles regenerate in place, and collecting every category declares the
//! win.
//!
//! Rendering, input, audio playback, and grid generation stay outside.
//! Collaborators talk to the engine through [`QuestEngine`]'s signal
//! methods, the shared [`GameContext`] snapshot, and the [`GridEffects`]
//! side-effect trait.

pub mod clock;
pub mod context;
pub mod grid;
pub mod quest;

pub use clock::{GameClock, ManualClock, SystemClock};
pub use context::GameContext;
pub use grid::{Cell, GridEffects, Tile, TileId, TileKind, TILES_PER_MATCH};
pub use quest::{
    EntityKey, EventKind, EventStats, EventStatsStore, Goal, GoalCatalog, GoalThreshold,
    HandlerKind, HandlerRegistry, LevelSpec, LevelTable, QuestEngine, QuestFeedback,
};
