//! Interned names.

use std::fmt;

/// Handle to a string held by a [`StringInterner`](crate::StringInterner).
///
/// The top [`Name::SHARD_BITS`] bits pick the interner shard; the rest
/// index into that shard.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// The empty string, always the first entry of shard 0.
    pub const EMPTY: Name = Name(0);

    pub const SHARD_BITS: u32 = 4;
    pub const SHARDS: usize = 1 << Self::SHARD_BITS;
    const LOCAL_BITS: u32 = u32::BITS - Self::SHARD_BITS;
    pub const LOCAL_MASK: u32 = (1 << Self::LOCAL_BITS) - 1;

    pub(crate) fn from_parts(shard: usize, local: u32) -> Self {
        debug_assert!(shard < Self::SHARDS);
        debug_assert!(local <= Self::LOCAL_MASK);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard is below SHARDS"
        )]
        let shard = shard as u32;
        Name((shard << Self::LOCAL_BITS) | local)
    }

    #[inline]
    pub const fn shard(self) -> usize {
        (self.0 >> Self::LOCAL_BITS) as usize
    }

    #[inline]
    pub const fn local(self) -> usize {
        (self.0 & Self::LOCAL_MASK) as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Rebuild a name from [`Name::raw`]. Only meaningful against the
    /// interner that produced it.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({}:{})", self.shard(), self.local())
    }
}
