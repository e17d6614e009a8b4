use std::collections::HashMap;
use std::sync::Arc;

/// Encoded (base64) speech audio exactly as returned by synthesis.
pub type EncodedAudio = Arc<str>;

/// In-memory map from item id to synthesized audio.
///
/// Entries are never evicted one by one; the whole cache is dropped when the
/// deck changes because ids are not guaranteed to keep their prompt.
#[derive(Debug, Default)]
pub struct SoundCache {
    entries: HashMap<String, EncodedAudio>,
}

impl SoundCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<EncodedAudio> {
        self.entries.get(id).cloned()
    }

    pub fn set(&mut self, id: &str, payload: EncodedAudio) {
        self.entries.insert(id.to_string(), payload);
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_same_payload() {
        let mut cache = SoundCache::new();
        assert!(!cache.has("bruh"));
        cache.set("bruh", Arc::from("AAAA"));
        assert!(cache.has("bruh"));
        assert_eq!(cache.get("bruh").as_deref(), Some("AAAA"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let mut cache = SoundCache::new();
        cache.set("wow", Arc::from("AAAA"));
        cache.set("wow", Arc::from("BBBB"));
        assert_eq!(cache.get("wow").as_deref(), Some("BBBB"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_drops_everything() {
        let mut cache = SoundCache::new();
        cache.set("a", Arc::from("AA=="));
        cache.set("b", Arc::from("AA=="));
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.has("a"));
        assert!(!cache.has("b"));
    }
}
