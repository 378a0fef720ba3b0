//! Thread-safe string interner.
//!
//! Units lower in parallel against one shared interner, so storage is split
//! into [`Name::SHARDS`] independently locked shards. Interned text is
//! leaked and lives for the rest of the process, which is what lets
//! [`StringInterner::lookup`] hand out `&'static str`.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHasher};

use crate::Name;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InternError {
    #[error("interner shard {shard} is full ({count} strings)")]
    ShardFull { shard: usize, count: usize },
}

#[derive(Default)]
struct Shard {
    locals: FxHashMap<&'static str, u32>,
    texts: Vec<&'static str>,
}

impl Shard {
    fn find(&self, text: &str) -> Option<u32> {
        self.locals.get(text).copied()
    }

    fn push(&mut self, shard: usize, text: &str) -> Result<u32, InternError> {
        let count = self.texts.len();
        let local = u32::try_from(count)
            .ok()
            .filter(|&local| local <= Name::LOCAL_MASK)
            .ok_or(InternError::ShardFull { shard, count })?;
        let text: &'static str = Box::leak(text.into());
        self.texts.push(text);
        self.locals.insert(text, local);
        Ok(local)
    }
}

/// Maps strings to [`Name`]s and back. Share it by reference.
pub struct StringInterner {
    shards: [RwLock<Shard>; Name::SHARDS],
    count: AtomicUsize,
}

impl StringInterner {
    /// An interner holding only the empty string, as [`Name::EMPTY`].
    pub fn new() -> Self {
        let mut first = Shard::default();
        first.texts.push("");
        first.locals.insert("", 0);

        let mut first = Some(first);
        StringInterner {
            shards: std::array::from_fn(|_| RwLock::new(first.take().unwrap_or_default())),
            count: AtomicUsize::new(1),
        }
    }

    fn shard_of(text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let mut hasher = FxHasher::default();
        text.hash(&mut hasher);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "reduced modulo the shard count"
        )]
        let shard = (hasher.finish() % Name::SHARDS as u64) as usize;
        shard
    }

    pub fn try_intern(&self, text: &str) -> Result<Name, InternError> {
        let shard = Self::shard_of(text);
        if let Some(local) = self.shards[shard].read().find(text) {
            return Ok(Name::from_parts(shard, local));
        }

        let mut guard = self.shards[shard].write();
        // Another thread may have won the race for the write lock.
        let local = match guard.find(text) {
            Some(local) => local,
            None => {
                let local = guard.push(shard, text)?;
                self.count.fetch_add(1, Ordering::Relaxed);
                local
            }
        };
        Ok(Name::from_parts(shard, local))
    }

    /// # Panics
    /// If a shard is full; see [`StringInterner::try_intern`].
    #[inline]
    pub fn intern(&self, text: &str) -> Name {
        self.try_intern(text).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Text of `name`. Names from another interner may panic or alias.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.shards[name.shard()].read().texts[name.local()]
    }

    /// Number of distinct strings, the empty string included.
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Whether nothing beyond the empty string has been interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
