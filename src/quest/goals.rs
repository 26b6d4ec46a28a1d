//! Goal thresholds and the per-level goal catalog.
//!
//! Level scaling rows live in a TOML-loadable table with a compiled-in
//! default; raw TOML structures are validated into resolved ones the same
//! way quest definitions are parsed elsewhere in the codebase.

use std::collections::HashMap;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::events::EventKind;
use super::stats::{EntityKey, EventStats};
use crate::grid::TileKind;

/// Requirement for one event kind on one entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalThreshold {
    /// Occurrences required before the goal is satisfied.
    pub count: u32,
    /// Longest tolerated gap between occurrences, seconds. Data for the
    /// caller to compare against elapsed time; nothing in the engine
    /// schedules around it.
    pub max_interval_secs: Option<f64>,
}

impl GoalThreshold {
    pub fn counted(count: u32) -> Self {
        Self {
            count,
            max_interval_secs: None,
        }
    }

    pub fn timed(count: u32, max_interval_secs: f64) -> Self {
        Self {
            count,
            max_interval_secs: Some(max_interval_secs),
        }
    }

    /// Goal reached once progress meets or exceeds the requirement.
    pub fn satisfied_by(&self, stats: &EventStats) -> bool {
        stats.count >= self.count
    }

    /// Whether the last occurrence arrived inside the allowed gap.
    pub fn within_interval(&self, stats: &EventStats) -> bool {
        match self.max_interval_secs {
            Some(max) => stats.interval_secs <= max,
            None => true,
        }
    }
}

/// Up to one threshold per event kind, for one entity.
///
/// An absent threshold means nothing was demanded for that kind: it can
/// never be satisfied and never counts as outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub click: Option<GoalThreshold>,
    pub swap: Option<GoalThreshold>,
    pub matches: Option<GoalThreshold>,
    pub repaint: Option<GoalThreshold>,
}

impl Goal {
    pub fn threshold(&self, kind: EventKind) -> Option<&GoalThreshold> {
        match kind {
            EventKind::Click => self.click.as_ref(),
            EventKind::Swap => self.swap.as_ref(),
            EventKind::Match => self.matches.as_ref(),
            EventKind::Repainted => self.repaint.as_ref(),
        }
    }

    pub fn set_threshold(&mut self, kind: EventKind, threshold: GoalThreshold) {
        let slot = match kind {
            EventKind::Click => &mut self.click,
            EventKind::Swap => &mut self.swap,
            EventKind::Match => &mut self.matches,
            EventKind::Repainted => &mut self.repaint,
        };
        *slot = Some(threshold);
    }

    pub fn with_threshold(kind: EventKind, threshold: GoalThreshold) -> Self {
        let mut goal = Self::default();
        goal.set_threshold(kind, threshold);
        goal
    }
}

/// Mapping from entity to goal for the current level.
///
/// Rebuilt wholesale on level start and immutable between rebuilds, apart
/// from per-tile goals re-rolled when a tile is regenerated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalCatalog {
    goals: HashMap<EntityKey, Goal>,
}

impl GoalCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: EntityKey, goal: Goal) {
        self.goals.insert(key, goal);
    }

    /// Set one threshold, creating the entity's goal bundle if needed.
    pub fn set_threshold(&mut self, key: EntityKey, kind: EventKind, threshold: GoalThreshold) {
        self.goals
            .entry(key)
            .or_default()
            .set_threshold(kind, threshold);
    }

    /// Read-only access; `None` means the entity has no active goal.
    pub fn lookup(&self, key: &EntityKey) -> Option<&Goal> {
        self.goals.get(key)
    }

    pub fn clear(&mut self) {
        self.goals.clear();
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Absent goal or absent sub-threshold means never satisfiable.
    pub fn satisfied(&self, key: EntityKey, kind: EventKind, stats: &EventStats) -> bool {
        self.lookup(&key)
            .and_then(|goal| goal.threshold(kind))
            .map(|threshold| threshold.satisfied_by(stats))
            .unwrap_or(false)
    }

    pub fn click_satisfied(&self, key: EntityKey, stats: &EventStats) -> bool {
        self.satisfied(key, EventKind::Click, stats)
    }

    pub fn swap_satisfied(&self, key: EntityKey, stats: &EventStats) -> bool {
        self.satisfied(key, EventKind::Swap, stats)
    }

    pub fn match_satisfied(&self, key: EntityKey, stats: &EventStats) -> bool {
        self.satisfied(key, EventKind::Match, stats)
    }
}

// ============================================================================
// Level scaling table
// ============================================================================

/// Raw level table as it appears in TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLevelTable {
    pub levels: Vec<RawLevelSpec>,
}

/// One raw level row.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLevelSpec {
    pub goal_time_secs: f64,
    pub types_to_collect: usize,
    pub clicks_per_tile: u32,
    /// Inclusive `[min, max]` match-count range per category.
    pub matches_per_type: [u32; 2],
    pub missed_swaps_allowed: u32,
    /// Inclusive `[min, max]` range for the max inter-click gap, seconds.
    pub click_interval_secs: [f64; 2],
}

/// Resolved per-level difficulty row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelSpec {
    pub goal_time_secs: f64,
    pub types_to_collect: usize,
    pub clicks_per_tile: u32,
    pub matches_per_type: (u32, u32),
    pub missed_swaps_allowed: u32,
    pub click_interval_secs: (f64, f64),
}

impl LevelSpec {
    fn from_raw(raw: &RawLevelSpec, index: usize) -> Result<Self, String> {
        if raw.goal_time_secs <= 0.0 {
            return Err(format!("level {}: goal_time_secs must be positive", index));
        }
        if raw.types_to_collect == 0 || raw.types_to_collect > TileKind::ALL.len() {
            return Err(format!(
                "level {}: types_to_collect must be 1..={}",
                index,
                TileKind::ALL.len()
            ));
        }
        if raw.clicks_per_tile == 0 {
            return Err(format!("level {}: clicks_per_tile must be positive", index));
        }
        let [match_min, match_max] = raw.matches_per_type;
        if match_min == 0 || match_min > match_max {
            return Err(format!(
                "level {}: matches_per_type range [{}, {}] is invalid",
                index, match_min, match_max
            ));
        }
        let [gap_min, gap_max] = raw.click_interval_secs;
        if gap_min <= 0.0 || gap_min > gap_max {
            return Err(format!(
                "level {}: click_interval_secs range [{}, {}] is invalid",
                index, gap_min, gap_max
            ));
        }

        Ok(Self {
            goal_time_secs: raw.goal_time_secs,
            types_to_collect: raw.types_to_collect,
            clicks_per_tile: raw.clicks_per_tile,
            matches_per_type: (match_min, match_max),
            missed_swaps_allowed: raw.missed_swaps_allowed,
            click_interval_secs: (gap_min, gap_max),
        })
    }

    /// Categories this level asks the player to collect.
    pub fn kinds(&self) -> &'static [TileKind] {
        &TileKind::ALL[..self.types_to_collect]
    }

    /// Draw a match target from this level's range.
    pub fn roll_matches<R: Rng>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.matches_per_type.0..=self.matches_per_type.1)
    }

    /// Draw a max inter-click gap from this level's range.
    pub fn roll_click_interval<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.click_interval_secs.0..=self.click_interval_secs.1)
    }
}

/// Level-indexed difficulty rows; lookups past the last row clamp to it.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTable {
    levels: Vec<LevelSpec>,
}

impl LevelTable {
    /// The compiled-in scaling table.
    pub fn builtin() -> Self {
        Self {
            levels: vec![
                LevelSpec {
                    goal_time_secs: 30.0,
                    types_to_collect: 3,
                    clicks_per_tile: 3,
                    matches_per_type: (1, 3),
                    missed_swaps_allowed: 6,
                    click_interval_secs: (2.0, 4.0),
                },
                LevelSpec {
                    goal_time_secs: 25.0,
                    types_to_collect: 4,
                    clicks_per_tile: 4,
                    matches_per_type: (3, 5),
                    missed_swaps_allowed: 4,
                    click_interval_secs: (1.5, 3.0),
                },
                LevelSpec {
                    goal_time_secs: 20.0,
                    types_to_collect: 5,
                    clicks_per_tile: 5,
                    matches_per_type: (4, 6),
                    missed_swaps_allowed: 2,
                    click_interval_secs: (1.0, 2.5),
                },
                LevelSpec {
                    goal_time_secs: 17.0,
                    types_to_collect: 6,
                    clicks_per_tile: 5,
                    matches_per_type: (5, 9),
                    missed_swaps_allowed: 0,
                    click_interval_secs: (0.8, 2.0),
                },
            ],
        }
    }

    /// Validate raw rows: each level must be at least as hard as the one
    /// before it.
    pub fn from_raw(raw: &RawLevelTable) -> Result<Self, String> {
        if raw.levels.is_empty() {
            return Err("level table has no levels".to_string());
        }

        let levels = raw
            .levels
            .iter()
            .enumerate()
            .map(|(i, r)| LevelSpec::from_raw(r, i))
            .collect::<Result<Vec<_>, _>>()?;

        for (i, pair) in levels.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            let tightens = next.types_to_collect >= prev.types_to_collect
                && next.clicks_per_tile >= prev.clicks_per_tile
                && next.missed_swaps_allowed <= prev.missed_swaps_allowed
                && next.goal_time_secs <= prev.goal_time_secs;
            if !tightens {
                return Err(format!(
                    "level {} is not at least as hard as level {}",
                    i + 1,
                    i
                ));
            }
        }

        Ok(Self { levels })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let raw: RawLevelTable =
            toml::from_str(content).map_err(|e| format!("Failed to parse level table: {}", e))?;
        Self::from_raw(&raw)
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
        Self::from_toml_str(&content)
    }

    /// The row for `level`, clamped to the deepest defined row.
    pub fn spec(&self, level: u32) -> &LevelSpec {
        let index = (level as usize).min(self.levels.len() - 1);
        &self.levels[index]
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileId;

    fn stats_with_count(count: u32) -> EventStats {
        EventStats {
            count,
            last_at: Some(0.0),
            interval_secs: 0.0,
        }
    }

    #[test]
    fn satisfied_once_progress_meets_threshold() {
        let threshold = GoalThreshold::counted(3);
        assert!(!threshold.satisfied_by(&stats_with_count(2)));
        assert!(threshold.satisfied_by(&stats_with_count(3)));
        assert!(threshold.satisfied_by(&stats_with_count(4)));
    }

    #[test]
    fn absent_goal_is_never_satisfiable() {
        let mut catalog = GoalCatalog::new();
        let key = EntityKey::Kind(TileKind::Red);
        let stats = stats_with_count(100);

        // No goal at all.
        assert!(!catalog.match_satisfied(key, &stats));

        // Goal exists but has no threshold for this kind.
        catalog.insert(
            key,
            Goal::with_threshold(EventKind::Click, GoalThreshold::counted(1)),
        );
        assert!(!catalog.match_satisfied(key, &stats));
        assert!(catalog.click_satisfied(key, &stats));
    }

    #[test]
    fn set_threshold_merges_into_existing_bundle() {
        let mut catalog = GoalCatalog::new();
        let key = EntityKey::Tile(TileId(9));
        catalog.set_threshold(key, EventKind::Click, GoalThreshold::counted(2));
        catalog.set_threshold(key, EventKind::Swap, GoalThreshold::counted(5));

        let goal = catalog.lookup(&key).unwrap();
        assert_eq!(goal.threshold(EventKind::Click).unwrap().count, 2);
        assert_eq!(goal.threshold(EventKind::Swap).unwrap().count, 5);
        assert!(goal.threshold(EventKind::Match).is_none());
    }

    #[test]
    fn within_interval_defaults_to_true() {
        let loose = GoalThreshold::counted(1);
        let tight = GoalThreshold::timed(1, 1.0);
        let slow = EventStats {
            count: 1,
            last_at: Some(5.0),
            interval_secs: 2.0,
        };
        assert!(loose.within_interval(&slow));
        assert!(!tight.within_interval(&slow));
    }

    #[test]
    fn builtin_table_tightens_monotonically() {
        let table = LevelTable::builtin();
        assert_eq!(table.len(), 4);
        for level in 1..table.len() as u32 {
            let prev = table.spec(level - 1);
            let next = table.spec(level);
            assert!(next.types_to_collect >= prev.types_to_collect);
            assert!(next.clicks_per_tile >= prev.clicks_per_tile);
            assert!(next.missed_swaps_allowed <= prev.missed_swaps_allowed);
            assert!(next.goal_time_secs <= prev.goal_time_secs);
        }
    }

    #[test]
    fn lookup_past_last_row_clamps() {
        let table = LevelTable::builtin();
        assert_eq!(table.spec(3), table.spec(99));
    }

    #[test]
    fn level_zero_kinds() {
        let table = LevelTable::builtin();
        assert_eq!(
            table.spec(0).kinds(),
            &[TileKind::Red, TileKind::Orange, TileKind::Yellow]
        );
    }

    const TABLE_TOML: &str = r#"
[[levels]]
goal_time_secs = 30.0
types_to_collect = 3
clicks_per_tile = 3
matches_per_type = [1, 3]
missed_swaps_allowed = 6
click_interval_secs = [2.0, 4.0]

[[levels]]
goal_time_secs = 25.0
types_to_collect = 4
clicks_per_tile = 4
matches_per_type = [3, 5]
missed_swaps_allowed = 4
click_interval_secs = [1.5, 3.0]
"#;

    #[test]
    fn parses_table_from_toml() {
        let table = LevelTable::from_toml_str(TABLE_TOML).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.spec(1).types_to_collect, 4);
    }

    #[test]
    fn rejects_table_that_loosens() {
        let loosening = TABLE_TOML.replace("types_to_collect = 4", "types_to_collect = 2");
        let err = LevelTable::from_toml_str(&loosening).unwrap_err();
        assert!(err.contains("not at least as hard"));
    }

    #[test]
    fn rejects_inverted_match_range() {
        let inverted = TABLE_TOML.replace("matches_per_type = [1, 3]", "matches_per_type = [3, 1]");
        let err = LevelTable::from_toml_str(&inverted).unwrap_err();
        assert!(err.contains("matches_per_type"));
    }

    #[test]
    fn loads_table_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("levels.toml");
        std::fs::write(&path, TABLE_TOML).unwrap();

        let table = LevelTable::from_file(&path).unwrap();
        assert_eq!(table, LevelTable::from_toml_str(TABLE_TOML).unwrap());

        let missing = LevelTable::from_file(&dir.path().join("absent.toml"));
        assert!(missing.unwrap_err().contains("Failed to read"));
    }

    #[test]
    fn rolls_stay_inside_level_ranges() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let spec = *LevelTable::builtin().spec(3);
        for _ in 0..64 {
            let matches = spec.roll_matches(&mut rng);
            assert!((5..=9).contains(&matches));
            let gap = spec.roll_click_interval(&mut rng);
            assert!((0.8..=2.0).contains(&gap));
        }
    }
}
