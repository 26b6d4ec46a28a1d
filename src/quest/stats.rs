//! Per-entity event statistics.
//!
//! Stats are created lazily on first record, mutated in place, and keyed
//! by `(entity, event kind)`. Nothing is deleted during a level; the store
//! is reset only when a new level's goal catalog is rebuilt.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::events::EventKind;
use crate::grid::{TileId, TileKind};

/// Keys either one placed tile or a whole tile category.
///
/// Both variants share the same stats and goal maps, so a click goal on a
/// single enemy tile and a match goal on a color class go through one
/// infrastructure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKey {
    Tile(TileId),
    Kind(TileKind),
}

impl EntityKey {
    pub fn describe(&self) -> String {
        match self {
            EntityKey::Tile(id) => format!("tile#{}", id.0),
            EntityKey::Kind(kind) => kind.as_str().to_string(),
        }
    }
}

impl From<TileId> for EntityKey {
    fn from(id: TileId) -> Self {
        EntityKey::Tile(id)
    }
}

impl From<TileKind> for EntityKey {
    fn from(kind: TileKind) -> Self {
        EntityKey::Kind(kind)
    }
}

/// Accumulated count and timing for one entity/event-kind pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EventStats {
    /// Monotonically non-decreasing occurrence count.
    pub count: u32,
    /// Clock reading of the most recent occurrence, seconds.
    pub last_at: Option<f64>,
    /// Elapsed seconds since the previous occurrence of the same kind for
    /// the same key; zero on the first occurrence.
    pub interval_secs: f64,
}

impl EventStats {
    fn record(&mut self, now: f64) {
        self.interval_secs = match self.last_at {
            Some(prev) => (now - prev).max(0.0),
            None => 0.0,
        };
        self.last_at = Some(now);
        self.count += 1;
    }
}

/// Keyed storage of per-entity event counters and intervals.
#[derive(Debug, Default)]
pub struct EventStatsStore {
    stats: HashMap<(EntityKey, EventKind), EventStats>,
}

impl EventStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count for `(key, kind)`, recompute the interval from
    /// the stored timestamp, and restamp it. Returns the updated stats.
    pub fn record(&mut self, key: EntityKey, kind: EventKind, now: f64) -> EventStats {
        let entry = self.stats.entry((key, kind)).or_default();
        entry.record(now);
        *entry
    }

    /// Non-mutating lookup; `None` means the pair was never observed.
    pub fn get(&self, key: EntityKey, kind: EventKind) -> Option<&EventStats> {
        self.stats.get(&(key, kind))
    }

    /// Drop every kind recorded for one entity.
    pub fn reset(&mut self, key: EntityKey) {
        self.stats.retain(|(k, _), _| *k != key);
    }

    /// Wholesale reset on level rebuild.
    pub fn clear(&mut self) {
        self.stats.clear();
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Debug dump of every tracked pair.
    pub fn snapshot_json(&self) -> String {
        let entries: Vec<_> = self
            .stats
            .iter()
            .map(|((key, kind), stats)| {
                serde_json::json!({
                    "entity": key.describe(),
                    "event": kind.as_str(),
                    "count": stats.count,
                    "interval_secs": stats.interval_secs,
                })
            })
            .collect();
        serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_record_has_zero_interval() {
        let mut store = EventStatsStore::new();
        let stats = store.record(EntityKey::Kind(TileKind::Red), EventKind::Click, 5.0);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.interval_secs, 0.0);
        assert_eq!(stats.last_at, Some(5.0));
    }

    #[test]
    fn interval_tracks_clock_delta_per_kind() {
        let mut store = EventStatsStore::new();
        let key = EntityKey::Tile(TileId(3));

        store.record(key, EventKind::Click, 1.0);
        let stats = store.record(key, EventKind::Click, 3.5);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.interval_secs, 2.5);

        // A different kind for the same key starts its own timeline.
        let swap = store.record(key, EventKind::Swap, 10.0);
        assert_eq!(swap.count, 1);
        assert_eq!(swap.interval_secs, 0.0);
    }

    #[test]
    fn lookup_of_unobserved_pair_is_absent() {
        let store = EventStatsStore::new();
        assert!(store
            .get(EntityKey::Kind(TileKind::Blue), EventKind::Match)
            .is_none());
    }

    #[test]
    fn reset_drops_all_kinds_for_one_key() {
        let mut store = EventStatsStore::new();
        let key = EntityKey::Tile(TileId(1));
        let other = EntityKey::Tile(TileId(2));
        store.record(key, EventKind::Click, 0.0);
        store.record(key, EventKind::Swap, 0.0);
        store.record(other, EventKind::Click, 0.0);

        store.reset(key);
        assert!(store.get(key, EventKind::Click).is_none());
        assert!(store.get(key, EventKind::Swap).is_none());
        assert!(store.get(other, EventKind::Click).is_some());
    }

    #[test]
    fn snapshot_lists_tracked_pairs() {
        let mut store = EventStatsStore::new();
        store.record(EntityKey::Kind(TileKind::Green), EventKind::Match, 2.0);
        let json = store.snapshot_json();
        assert!(json.contains("green"));
        assert!(json.contains("match"));
    }
}
