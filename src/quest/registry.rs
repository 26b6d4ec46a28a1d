//! Handler registry.
//!
//! Owns the single live instance of each handler variant. Construction is
//! lazy and the cache is lock-guarded, so a get-or-create race cannot
//! produce two live singletons. Handlers persist for the registry's
//! lifetime; subscribe/unsubscribe only toggles whether they react.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::handlers::{HandlerKind, QuestHandler};

/// Shared handle to one live handler.
pub type HandlerRef = Arc<Mutex<QuestHandler>>;

#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: Mutex<HashMap<HandlerKind, HandlerRef>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup never fails: an unknown variant is constructed on the spot.
    pub fn get_or_create(&self, kind: HandlerKind) -> HandlerRef {
        let mut handlers = self.handlers.lock().unwrap_or_else(|e| e.into_inner());
        handlers
            .entry(kind)
            .or_insert_with(|| {
                debug!(handler = kind.as_str(), "constructing quest handler");
                Arc::new(Mutex::new(QuestHandler::new(kind)))
            })
            .clone()
    }

    /// Non-creating lookup.
    pub fn get(&self, kind: HandlerKind) -> Option<HandlerRef> {
        let handlers = self.handlers.lock().unwrap_or_else(|e| e.into_inner());
        handlers.get(&kind).cloned()
    }

    /// Activate a handler; idempotent.
    pub fn subscribe(&self, kind: HandlerKind) {
        let handler = self.get_or_create(kind);
        let mut handler = handler.lock().unwrap_or_else(|e| e.into_inner());
        if !handler.is_active() {
            handler.set_active(true);
            debug!(handler = kind.as_str(), "handler subscribed");
        }
    }

    /// Deactivate a handler; a no-op when absent or already inactive.
    pub fn unsubscribe(&self, kind: HandlerKind) {
        let Some(handler) = self.get(kind) else {
            return;
        };
        let mut handler = handler.lock().unwrap_or_else(|e| e.into_inner());
        if handler.is_active() {
            handler.set_active(false);
            debug!(handler = kind.as_str(), "handler unsubscribed");
        }
    }

    pub fn is_active(&self, kind: HandlerKind) -> bool {
        self.get(kind)
            .map(|h| h.lock().unwrap_or_else(|e| e.into_inner()).is_active())
            .unwrap_or(false)
    }

    /// Currently active variants, in init order.
    pub fn active_kinds(&self) -> Vec<HandlerKind> {
        HandlerKind::INIT_ORDER
            .iter()
            .copied()
            .filter(|kind| self.is_active(*kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_is_identity_stable() {
        let registry = HandlerRegistry::new();
        let a = registry.get_or_create(HandlerKind::Match);
        let b = registry.get_or_create(HandlerKind::Match);
        assert!(Arc::ptr_eq(&a, &b));

        let other = registry.get_or_create(HandlerKind::Swap);
        assert!(!Arc::ptr_eq(&a, &other));
    }

    #[test]
    fn concurrent_first_access_yields_one_singleton() {
        let registry = Arc::new(HandlerRegistry::new());

        let mut threads = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            threads.push(std::thread::spawn(move || {
                registry.get_or_create(HandlerKind::Destroy)
            }));
        }

        let handles: Vec<HandlerRef> = threads.into_iter().map(|t| t.join().unwrap()).collect();
        for handle in &handles[1..] {
            assert!(Arc::ptr_eq(&handles[0], handle));
        }
    }

    #[test]
    fn subscribe_unsubscribe_round_trip() {
        let registry = HandlerRegistry::new();
        registry.subscribe(HandlerKind::TileReplacer);
        assert!(registry.is_active(HandlerKind::TileReplacer));
        assert_eq!(registry.active_kinds(), vec![HandlerKind::TileReplacer]);

        registry.unsubscribe(HandlerKind::TileReplacer);
        assert!(!registry.is_active(HandlerKind::TileReplacer));
        assert!(registry.active_kinds().is_empty());
    }

    #[test]
    fn lifecycle_calls_are_idempotent() {
        let registry = HandlerRegistry::new();

        // Unsubscribing a handler that was never created is a no-op and
        // must not construct one.
        registry.unsubscribe(HandlerKind::Match);
        assert!(registry.get(HandlerKind::Match).is_none());

        registry.subscribe(HandlerKind::Match);
        registry.subscribe(HandlerKind::Match);
        assert!(registry.is_active(HandlerKind::Match));

        registry.unsubscribe(HandlerKind::Match);
        registry.unsubscribe(HandlerKind::Match);
        assert!(!registry.is_active(HandlerKind::Match));
    }
}
