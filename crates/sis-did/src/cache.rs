use dashmap::DashMap;

use crate::document::PublicKeyJwk;

/// Cache of resolved key material, keyed by kid. Entries never expire on
/// their own; `clear` exists so tests can construct isolated resolvers.
pub trait KeyCache: Send + Sync {
    fn get(&self, kid: &str) -> Option<PublicKeyJwk>;
    fn put(&self, kid: String, key: PublicKeyJwk);
    fn clear(&self);
}

/// Concurrency-safe in-memory cache. Two racing resolutions of the same kid
/// may both fetch and both write; last write wins and both values are
/// correct, so no further coordination is needed.
#[derive(Debug, Default)]
pub struct DashMapKeyCache {
    entries: DashMap<String, PublicKeyJwk>,
}

impl DashMapKeyCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyCache for DashMapKeyCache {
    fn get(&self, kid: &str) -> Option<PublicKeyJwk> {
        self.entries.get(kid).map(|entry| entry.clone())
    }

    fn put(&self, kid: String, key: PublicKeyJwk) {
        self.entries.insert(kid, key);
    }

    fn clear(&self) {
        self.entries.clear();
    }
}
