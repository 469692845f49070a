use ahash::RandomState;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap as StdHashMap;
use std::hash::{Hash, Hasher};

pub type HashMap<K, V> = StdHashMap<K, V, RandomState>;

/// Stable-within-a-process content hash, used to skip no-op change
/// notifications.
pub fn content_hash(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_tracks_content() {
        assert_eq!(content_hash(b"draw();"), content_hash(b"draw();"));
        assert_ne!(content_hash(b"draw();"), content_hash(b"draw2();"));
    }
}
