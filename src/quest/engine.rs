//! Engine wiring: collaborator signals, bootstrap order, level lifecycle.
//!
//! The game loop fires these entry points synchronously from one thread.
//! Each call runs to completion; the engine never suspends. Goal timing is
//! plain data compared by callers, not enforced by any scheduler here.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use super::events::{DefineSignal, EventKind, GameEvent, QuestFeedback};
use super::goals::{GoalCatalog, LevelTable};
use super::handlers::{HandlerCtx, HandlerKind};
use super::registry::HandlerRegistry;
use super::stats::{EntityKey, EventStatsStore};
use crate::clock::{GameClock, SystemClock};
use crate::context::GameContext;
use crate::grid::GridEffects;

/// Owns the quest machinery and routes collaborator signals into it.
///
/// Construction takes an RNG seed so goal catalogs are deterministic per
/// `(level, seed)`; the clock is injectable for the same reason.
pub struct QuestEngine {
    registry: HandlerRegistry,
    stats: EventStatsStore,
    catalog: GoalCatalog,
    table: LevelTable,
    rng: StdRng,
    clock: Box<dyn GameClock>,
    /// Set once the current level's goals are fully laid out; gameplay
    /// events arriving earlier are ignored rather than judged against a
    /// half-built catalog.
    goals_defined: bool,
}

impl QuestEngine {
    pub fn new(table: LevelTable, seed: u64) -> Self {
        Self::with_clock(table, seed, Box::new(SystemClock::new()))
    }

    pub fn with_clock(table: LevelTable, seed: u64, clock: Box<dyn GameClock>) -> Self {
        Self {
            registry: HandlerRegistry::new(),
            stats: EventStatsStore::new(),
            catalog: GoalCatalog::new(),
            table,
            rng: StdRng::seed_from_u64(seed),
            clock,
            goals_defined: false,
        }
    }

    /// Bootstrap: construct and activate every handler, in the fixed
    /// order Match, Swap, TileReplacer, Destroy.
    pub fn init(&self) {
        for kind in HandlerKind::INIT_ORDER {
            self.registry.subscribe(kind);
        }
        info!("quest handlers initialized");
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &EventStatsStore {
        &self.stats
    }

    pub fn catalog(&self) -> &GoalCatalog {
        &self.catalog
    }

    pub fn table(&self) -> &LevelTable {
        &self.table
    }

    // ------------------------------------------------------------------
    // Definition signals (grid subsystem)
    // ------------------------------------------------------------------

    /// The grid for `ctx.level` is fully built: reset per-level state and
    /// lay out every handler's goals before any event is admitted.
    pub fn on_grid_creation_done(&mut self, ctx: &mut GameContext, effects: &mut dyn GridEffects) {
        self.stats.clear();
        self.catalog.clear();
        ctx.won_before_timeout = false;
        self.define(DefineSignal::GridCreationDone, ctx, effects);
        self.goals_defined = true;
        info!(
            level = ctx.level,
            goals = self.catalog.len(),
            "level goals defined"
        );
    }

    /// A fresh tile was placed; `ctx.current` names it.
    pub fn on_tile_created(&mut self, ctx: &mut GameContext, effects: &mut dyn GridEffects) {
        let Some(tile) = ctx.current else {
            return;
        };
        self.define(DefineSignal::TileCreated { tile }, ctx, effects);
    }

    /// An enemy tile spawned; the newest entry of `ctx.enemies` names it.
    pub fn on_enemy_tile_created(&mut self, ctx: &mut GameContext, effects: &mut dyn GridEffects) {
        let Some(tile) = ctx.enemies.last().copied() else {
            return;
        };
        self.define(DefineSignal::EnemyTileCreated { tile }, ctx, effects);
    }

    // ------------------------------------------------------------------
    // Gameplay events (game loop)
    // ------------------------------------------------------------------

    pub fn on_tile_clicked(
        &mut self,
        ctx: &mut GameContext,
        effects: &mut dyn GridEffects,
    ) -> Vec<QuestFeedback> {
        let Some(tile) = ctx.current else {
            return Vec::new();
        };
        self.dispatch(GameEvent::TileClicked { tile }, ctx, effects)
    }

    pub fn on_tile_swapped(
        &mut self,
        ctx: &mut GameContext,
        effects: &mut dyn GridEffects,
    ) -> Vec<QuestFeedback> {
        let Some(tile) = ctx.current else {
            return Vec::new();
        };
        self.dispatch(GameEvent::TileSwapped { tile }, ctx, effects)
    }

    pub fn on_match_found(
        &mut self,
        ctx: &mut GameContext,
        effects: &mut dyn GridEffects,
    ) -> Vec<QuestFeedback> {
        let Some(kind) = ctx.matched_kind else {
            return Vec::new();
        };
        self.dispatch(GameEvent::MatchFound { kind }, ctx, effects)
    }

    /// Repaint bookkeeping: one `Repainted` tick per category present.
    pub fn on_grid_repainted(&mut self, ctx: &mut GameContext) {
        if !self.goals_defined {
            return;
        }
        let now = self.clock.now();
        for kind in ctx.kinds_present() {
            self.stats
                .record(EntityKey::Kind(kind), EventKind::Repainted, now);
        }
    }

    // ------------------------------------------------------------------

    fn define(&mut self, signal: DefineSignal, ctx: &mut GameContext, effects: &mut dyn GridEffects) {
        let now = self.clock.now();
        let spec = *self.table.spec(ctx.level);
        for kind in HandlerKind::INIT_ORDER {
            let handler = self.registry.get_or_create(kind);
            let mut handler = handler.lock().unwrap_or_else(|e| e.into_inner());
            let mut hc = HandlerCtx {
                game: &mut *ctx,
                stats: &mut self.stats,
                catalog: &mut self.catalog,
                effects: &mut *effects,
                spec: &spec,
                rng: &mut self.rng,
                now,
            };
            handler.on_define(&signal, &mut hc);
        }
    }

    fn dispatch(
        &mut self,
        event: GameEvent,
        ctx: &mut GameContext,
        effects: &mut dyn GridEffects,
    ) -> Vec<QuestFeedback> {
        if !self.goals_defined {
            debug!(kind = event.kind().as_str(), "event before goal definition ignored");
            return Vec::new();
        }
        let now = self.clock.now();
        let spec = *self.table.spec(ctx.level);
        let mut feedback = Vec::new();
        for kind in HandlerKind::INIT_ORDER {
            let handler = self.registry.get_or_create(kind);
            let mut handler = handler.lock().unwrap_or_else(|e| e.into_inner());
            let mut hc = HandlerCtx {
                game: &mut *ctx,
                stats: &mut self.stats,
                catalog: &mut self.catalog,
                effects: &mut *effects,
                spec: &spec,
                rng: &mut self.rng,
                now,
            };
            if let Some(fb) = handler.on_event(&event, &mut hc) {
                feedback.push(fb);
            }
        }
        feedback
    }
}
