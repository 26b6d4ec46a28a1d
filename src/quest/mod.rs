//! Quest System Module
//!
//! Event-driven goal evaluation: per-entity event stats, level-scaled goal
//! thresholds, and four handler variants that turn satisfied goals into
//! side effects (win declaration, enemy destruction, tile regeneration).

pub mod engine;
pub mod events;
pub mod goals;
pub mod handlers;
pub mod registry;
pub mod stats;

pub use engine::QuestEngine;
pub use events::{DefineSignal, EventKind, GameEvent, QuestFeedback};
pub use goals::{Goal, GoalCatalog, GoalThreshold, LevelSpec, LevelTable};
pub use handlers::{HandlerCtx, HandlerKind, QuestHandler};
pub use registry::{HandlerRef, HandlerRegistry};
pub use stats::{EntityKey, EventStats, EventStatsStore};
