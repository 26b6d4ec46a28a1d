//! Gameplay event classification and observable handler outcomes.

use serde::{Deserialize, Serialize};

use crate::grid::{Tile, TileId, TileKind};

/// Classifies the gameplay notifications the engine accumulates stats for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Click,
    Swap,
    Match,
    Repainted,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Click,
        EventKind::Swap,
        EventKind::Match,
        EventKind::Repainted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Swap => "swap",
            EventKind::Match => "match",
            EventKind::Repainted => "repainted",
        }
    }
}

/// A gameplay notification fired by the game loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    TileClicked { tile: Tile },
    TileSwapped { tile: Tile },
    MatchFound { kind: TileKind },
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::TileClicked { .. } => EventKind::Click,
            GameEvent::TileSwapped { .. } => EventKind::Swap,
            GameEvent::MatchFound { .. } => EventKind::Match,
        }
    }
}

/// A goal-(re)definition trigger fired by the grid subsystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefineSignal {
    /// The grid is fully built; the level's goals can be laid out.
    GridCreationDone,
    /// A fresh tile was placed mid-level.
    TileCreated { tile: Tile },
    /// An enemy tile appeared and needs its own click goal.
    EnemyTileCreated { tile: Tile },
}

/// What a handler did with one event.
///
/// `None` from a handler means the event was irrelevant to it (or the
/// handler was inactive); a `Some` value is the observable outcome that
/// also drives the player-facing diagnostic lines.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestFeedback {
    /// Click goal not yet met; this many more clicks are needed.
    ClicksRemaining { tile: TileId, remaining: u32 },
    /// Enemy tile defeated and its neighborhood unblocked.
    EnemyDefeated {
        tile: TileId,
        defeated: u32,
        spawned: u32,
    },
    /// Tile replaced with a fresh one in the same cell.
    TileReplaced { old: TileId, new: TileId },
    /// A category reached its match target; this many remain outstanding.
    KindCollected { kind: TileKind, outstanding: usize },
    /// Every category's match target has been reached.
    AllKindsCollected,
    /// A category's swap miss budget is used up.
    SwapBudgetExhausted { kind: TileKind, swaps: u32 },
}
