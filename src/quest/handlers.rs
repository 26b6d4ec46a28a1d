//! The four quest-handler variants.
//!
//! The variant set is fixed, so handlers form a closed enum dispatched by
//! matching on the event, not an open trait hierarchy. Each variant owns
//! its portion of the goal catalog (laid out in `on_define`) and reacts to
//! exactly one gameplay event source in `on_event`.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info, warn};

use super::events::{DefineSignal, EventKind, GameEvent, QuestFeedback};
use super::goals::{GoalCatalog, GoalThreshold, LevelSpec};
use super::stats::{EntityKey, EventStatsStore};
use crate::context::GameContext;
use crate::grid::{GridEffects, Tile, TileKind, TILES_PER_MATCH};

/// Closed tag identifying each handler variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandlerKind {
    Match,
    Swap,
    TileReplacer,
    Destroy,
}

impl HandlerKind {
    /// Bootstrap (and dispatch) order is fixed.
    pub const INIT_ORDER: [HandlerKind; 4] = [
        HandlerKind::Match,
        HandlerKind::Swap,
        HandlerKind::TileReplacer,
        HandlerKind::Destroy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Match => "match",
            HandlerKind::Swap => "swap",
            HandlerKind::TileReplacer => "tile_replacer",
            HandlerKind::Destroy => "destroy",
        }
    }
}

/// Everything a handler may touch while reacting to one signal.
pub struct HandlerCtx<'a> {
    pub game: &'a mut GameContext,
    pub stats: &'a mut EventStatsStore,
    pub catalog: &'a mut GoalCatalog,
    pub effects: &'a mut dyn GridEffects,
    pub spec: &'a LevelSpec,
    pub rng: &'a mut StdRng,
    pub now: f64,
}

/// One live handler instance; the registry owns exactly one per variant.
#[derive(Debug)]
pub struct QuestHandler {
    kind: HandlerKind,
    active: bool,
    state: HandlerState,
}

#[derive(Debug)]
enum HandlerState {
    Match(MatchQuest),
    Swap(SwapQuest),
    TileReplacer(ReplaceQuest),
    Destroy(DestroyQuest),
}

impl QuestHandler {
    pub fn new(kind: HandlerKind) -> Self {
        let state = match kind {
            HandlerKind::Match => HandlerState::Match(MatchQuest::default()),
            HandlerKind::Swap => HandlerState::Swap(SwapQuest::default()),
            HandlerKind::TileReplacer => HandlerState::TileReplacer(ReplaceQuest),
            HandlerKind::Destroy => HandlerState::Destroy(DestroyQuest::default()),
        };
        Self {
            kind,
            active: false,
            state,
        }
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// (Re)compute this variant's portion of the goal catalog. Definition
    /// signals are wiring, not gameplay events, so they are honored even
    /// while the handler is inactive.
    pub fn on_define(&mut self, signal: &DefineSignal, hc: &mut HandlerCtx) {
        match (&mut self.state, signal) {
            (HandlerState::Match(m), DefineSignal::GridCreationDone) => m.define_goals(hc),
            (HandlerState::Swap(s), DefineSignal::GridCreationDone) => s.define_goals(hc),
            (HandlerState::TileReplacer(_), DefineSignal::GridCreationDone) => {
                if let Some(tile) = hc.game.current {
                    define_click_goal(tile, hc);
                }
            }
            (HandlerState::TileReplacer(_), DefineSignal::TileCreated { tile }) => {
                define_click_goal(*tile, hc);
            }
            (HandlerState::Destroy(d), DefineSignal::GridCreationDone) => d.begin_level(),
            (HandlerState::Destroy(_), DefineSignal::EnemyTileCreated { tile }) => {
                define_click_goal(*tile, hc);
            }
            _ => {}
        }
    }

    /// React to one gameplay event. Silent no-op while inactive or when
    /// the event does not belong to this variant.
    pub fn on_event(&mut self, event: &GameEvent, hc: &mut HandlerCtx) -> Option<QuestFeedback> {
        if !self.active {
            return None;
        }
        match (&mut self.state, event) {
            (HandlerState::Match(m), GameEvent::MatchFound { kind }) => m.handle(*kind, hc),
            (HandlerState::Swap(s), GameEvent::TileSwapped { tile }) => s.handle(*tile, hc),
            (HandlerState::TileReplacer(r), GameEvent::TileClicked { tile }) => r.handle(*tile, hc),
            (HandlerState::Destroy(d), GameEvent::TileClicked { tile }) => d.handle(*tile, hc),
            _ => None,
        }
    }
}

/// Shared base of the two click-goal variants: a click-count target plus a
/// max inter-click gap rolled from the level row, keyed by tile instance.
fn define_click_goal(tile: Tile, hc: &mut HandlerCtx) {
    let threshold = GoalThreshold::timed(
        hc.spec.clicks_per_tile,
        hc.spec.roll_click_interval(hc.rng),
    );
    hc.catalog
        .set_threshold(EntityKey::Tile(tile.id), EventKind::Click, threshold);
    debug!(tile = tile.id.0, clicks = threshold.count, "click goal defined");
}

/// Collect N matches per category; the win condition.
#[derive(Debug, Default)]
struct MatchQuest {
    /// Categories whose match target has not been reached yet.
    outstanding: BTreeSet<TileKind>,
}

impl MatchQuest {
    fn define_goals(&mut self, hc: &mut HandlerCtx) {
        self.outstanding.clear();
        for &kind in hc.spec.kinds() {
            let supply = hc.game.total(kind);
            // A target the board cannot host is nonsense; clamp, and skip
            // categories that cannot host even one match.
            let cap = supply / TILES_PER_MATCH;
            if cap == 0 {
                debug!(
                    kind = kind.as_str(),
                    supply, "no matchable supply; category skipped"
                );
                continue;
            }
            let target = hc.spec.roll_matches(hc.rng).min(cap);
            hc.catalog.set_threshold(
                EntityKey::Kind(kind),
                EventKind::Match,
                GoalThreshold::counted(target),
            );
            self.outstanding.insert(kind);
        }
        debug!(outstanding = self.outstanding.len(), "match goals defined");
    }

    fn handle(&mut self, kind: TileKind, hc: &mut HandlerCtx) -> Option<QuestFeedback> {
        let key = EntityKey::Kind(kind);
        let stats = hc.stats.record(key, EventKind::Match, hc.now);
        if !self.outstanding.contains(&kind) {
            return None;
        }
        if !hc.catalog.match_satisfied(key, &stats) {
            return None;
        }

        self.outstanding.remove(&kind);
        hc.game.won_before_timeout = self.outstanding.is_empty();
        if self.outstanding.is_empty() {
            info!("every category collected");
            Some(QuestFeedback::AllKindsCollected)
        } else {
            info!(
                kind = kind.as_str(),
                outstanding = self.outstanding.len(),
                "category collected"
            );
            Some(QuestFeedback::KindCollected {
                kind,
                outstanding: self.outstanding.len(),
            })
        }
    }
}

/// Watch swap misses against the level's tolerance budget.
#[derive(Debug, Default)]
struct SwapQuest {
    /// Categories already reported, so exhaustion fires once per level.
    exhausted: BTreeSet<TileKind>,
}

impl SwapQuest {
    fn define_goals(&mut self, hc: &mut HandlerCtx) {
        self.exhausted.clear();
        for &kind in hc.spec.kinds() {
            // The swap that exceeds the miss budget trips the threshold,
            // which keeps a budget of zero meaningful.
            hc.catalog.set_threshold(
                EntityKey::Kind(kind),
                EventKind::Swap,
                GoalThreshold::counted(hc.spec.missed_swaps_allowed + 1),
            );
        }
        debug!(
            budget = hc.spec.missed_swaps_allowed,
            "swap miss budgets defined"
        );
    }

    fn handle(&mut self, tile: Tile, hc: &mut HandlerCtx) -> Option<QuestFeedback> {
        let key = EntityKey::Kind(tile.kind);
        let stats = hc.stats.record(key, EventKind::Swap, hc.now);
        if self.exhausted.contains(&tile.kind) {
            return None;
        }
        if !hc.catalog.swap_satisfied(key, &stats) {
            return None;
        }

        self.exhausted.insert(tile.kind);
        warn!(
            kind = tile.kind.as_str(),
            swaps = stats.count,
            "swap miss budget exhausted"
        );
        Some(QuestFeedback::SwapBudgetExhausted {
            kind: tile.kind,
            swaps: stats.count,
        })
    }
}

/// Click an enemy tile enough times to destroy it.
#[derive(Debug, Default)]
struct DestroyQuest {
    defeated: u32,
}

impl DestroyQuest {
    fn begin_level(&mut self) {
        self.defeated = 0;
    }

    fn handle(&mut self, tile: Tile, hc: &mut HandlerCtx) -> Option<QuestFeedback> {
        if !hc.game.is_enemy(tile.id) {
            return None;
        }
        let key = EntityKey::Tile(tile.id);
        let stats = hc.stats.record(key, EventKind::Click, hc.now);
        // A goal that has not been defined yet can never fire.
        let threshold = *hc.catalog.lookup(&key)?.threshold(EventKind::Click)?;

        if threshold.satisfied_by(&stats) {
            hc.effects.disable_enemy(tile.id);
            hc.effects.unblock_neighbors(tile.cell);
            hc.game.remove_enemy(tile.id);

            self.defeated += 1;
            let spawned = hc.game.enemies_spawned;
            hc.game.enemies_still_present = self.defeated < spawned;
            let defeated = self.defeated;
            if !hc.game.enemies_still_present {
                // All cleared; the counter wraps for the next wave.
                self.defeated = 0;
            }
            info!(tile = tile.id.0, defeated, spawned, "enemy tile defeated");
            Some(QuestFeedback::EnemyDefeated {
                tile: tile.id,
                defeated,
                spawned,
            })
        } else {
            let remaining = threshold.count - stats.count;
            info!(tile = tile.id.0, remaining, "clicks remaining on enemy tile");
            Some(QuestFeedback::ClicksRemaining {
                tile: tile.id,
                remaining,
            })
        }
    }
}

/// Click an ordinary tile enough times to regenerate it in place.
#[derive(Debug)]
struct ReplaceQuest;

impl ReplaceQuest {
    fn handle(&mut self, tile: Tile, hc: &mut HandlerCtx) -> Option<QuestFeedback> {
        if hc.game.is_enemy(tile.id) {
            // Enemy clicks belong to the destroy handler.
            return None;
        }
        let key = EntityKey::Tile(tile.id);
        let stats = hc.stats.record(key, EventKind::Click, hc.now);
        let threshold = *hc.catalog.lookup(&key)?.threshold(EventKind::Click)?;

        if !threshold.satisfied_by(&stats) {
            let remaining = threshold.count - stats.count;
            info!(
                tile = tile.id.0,
                remaining, "clicks remaining until tile regenerates"
            );
            return Some(QuestFeedback::ClicksRemaining {
                tile: tile.id,
                remaining,
            });
        }

        if hc.effects.goal_sound_playing() {
            // The previous satisfaction's cue is still audible; do not
            // re-trigger on the same cue.
            debug!(
                tile = tile.id.0,
                "replacement suppressed while goal sound plays"
            );
            return None;
        }

        let new_kind = TileKind::ALL[hc.rng.gen_range(0..TileKind::ALL.len())];
        let new_tile = hc.effects.replace_tile(tile.cell, new_kind);
        hc.effects.play_goal_sound();
        hc.game.current = Some(new_tile);
        define_click_goal(new_tile, hc);

        info!(
            old = tile.id.0,
            new = new_tile.id.0,
            "tile replaced after click goal"
        );
        Some(QuestFeedback::TileReplaced {
            old: tile.id,
            new: new_tile.id,
        })
    }
}
