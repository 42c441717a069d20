use super::prelude::*;
use super::{preprocess, ChunkMap};
use primitive_types::H256;
use sha3::{Digest, Keccak256};

/// Number of code blobs kept by [`ChunkCache::default`].
pub const DEFAULT_CHUNK_CACHE_CAPACITY: usize = 1024;

/// Bounded LRU memo of preprocessed code, keyed by the keccak-256 of the
/// code bytes.
///
/// Entries are handed out as `Rc` so a running frame keeps its chunks alive
/// even if the entry is evicted meanwhile. A cache is a plain value owned by
/// one executor at a time. To share it, take it back with
/// [`Executor::into_parts`](crate::Executor::into_parts) and hand it to the
/// next one through [`Executor::with_cache`](crate::Executor::with_cache).
#[derive(Clone, Debug)]
pub struct ChunkCache {
    entries: BTreeMap<H256, Rc<ChunkMap>>,
    /// Front is least recently used.
    order: VecDeque<H256>,
    capacity: usize,
}

impl Default for ChunkCache {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_CACHE_CAPACITY)
    }
}

impl ChunkCache {
    /// Create a cache holding at most `capacity` entries. A zero capacity
    /// disables memoization.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether chunks for the code hashing to `hash` are cached.
    #[must_use]
    pub fn contains(&self, hash: &H256) -> bool {
        self.entries.contains_key(hash)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Return the chunks of `code`, preprocessing it on a miss.
    pub fn get_or_preprocess(&mut self, code: &[u8]) -> Rc<ChunkMap> {
        let hash = H256::from_slice(Keccak256::digest(code).as_slice());

        if let Some(chunks) = self.entries.get(&hash) {
            let chunks = Rc::clone(chunks);
            self.touch(hash);
            return chunks;
        }

        let chunks = Rc::new(preprocess(code));
        if self.capacity == 0 {
            return chunks;
        }
        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(hash, Rc::clone(&chunks));
        self.order.push_back(hash);
        chunks
    }

    fn touch(&mut self, hash: H256) {
        if let Some(index) = self.order.iter().position(|h| *h == hash) {
            self.order.remove(index);
        }
        self.order.push_back(hash);
    }
}
