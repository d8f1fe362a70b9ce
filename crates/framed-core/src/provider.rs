//! Place-scoped prefix providers.
//!
//! Persisting per-place prefixes is not the core's business; the dispatcher
//! only needs to ask "what prefix does this place use?". [`MemoryPrefixProvider`]
//! answers from an in-process map and is what the runtime seeds from config.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

/// Looks up the prefix configured for a place.
pub trait PrefixProvider: Send + Sync {
    fn lookup(&self, place_id: &str) -> Option<String>;
}

/// A [`PrefixProvider`] backed by an in-memory map.
#[derive(Debug, Default)]
pub struct MemoryPrefixProvider {
    prefixes: RwLock<HashMap<String, String>>,
}

impl MemoryPrefixProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider seeded with `(place_id, prefix)` pairs.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let prefixes = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            prefixes: RwLock::new(prefixes),
        }
    }

    /// Sets the prefix for a place, returning the previous one.
    pub fn set(&self, place_id: impl Into<String>, prefix: impl Into<String>) -> Option<String> {
        let place_id = place_id.into();
        let prefix = prefix.into();
        debug!(place = %place_id, prefix = %prefix, "Place prefix set");
        self.prefixes.write().insert(place_id, prefix)
    }

    /// Removes the prefix for a place.
    pub fn remove(&self, place_id: &str) -> Option<String> {
        self.prefixes.write().remove(place_id)
    }

    /// Number of places with a configured prefix.
    pub fn len(&self) -> usize {
        self.prefixes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.read().is_empty()
    }
}

impl PrefixProvider for MemoryPrefixProvider {
    fn lookup(&self, place_id: &str) -> Option<String> {
        self.prefixes.read().get(place_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_set_remove() {
        let provider = MemoryPrefixProvider::from_entries([("guild", "?")]);
        assert_eq!(provider.lookup("guild").as_deref(), Some("?"));
        assert_eq!(provider.lookup("other"), None);

        assert_eq!(provider.set("guild", "$").as_deref(), Some("?"));
        assert_eq!(provider.lookup("guild").as_deref(), Some("$"));

        provider.remove("guild");
        assert!(provider.is_empty());
    }
}
