//! Per-cycle imagery cache keyed by result id.
//!
//! Cleared wholesale whenever a new result list is published. A cycle never
//! holds more than `max_items` entries, so there is no eviction.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::types::Asset;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnrichmentCache {
    entries: HashMap<Uuid, Asset>,
}

impl EnrichmentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Asset> {
        self.entries.get(&id)
    }

    pub fn set(&mut self, id: Uuid, asset: Asset) {
        self.entries.insert(id, asset);
    }

    #[must_use]
    pub fn has(&self, id: Uuid) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(n: u8) -> Asset {
        Asset {
            image_url: format!("https://img.example.test/{n}.jpg"),
            heading_degrees: None,
        }
    }

    #[test]
    fn set_then_get() {
        let mut cache = EnrichmentCache::new();
        let id = Uuid::new_v4();
        assert!(!cache.has(id));
        assert!(cache.get(id).is_none());

        cache.set(id, asset(1));
        assert!(cache.has(id));
        assert_eq!(cache.get(id), Some(&asset(1)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let mut cache = EnrichmentCache::new();
        let id = Uuid::new_v4();
        cache.set(id, asset(1));
        cache.set(id, asset(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(id), Some(&asset(2)));
    }

    #[test]
    fn clear_drops_everything() {
        let mut cache = EnrichmentCache::new();
        for n in 0..8 {
            cache.set(Uuid::new_v4(), asset(n));
        }
        assert_eq!(cache.len(), 8);
        cache.clear();
        assert!(cache.is_empty());
    }
}
