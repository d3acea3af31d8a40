//! Key descriptors: borrowed bytes plus a hash computed once up front.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::ffi::CStr;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a over `bytes`, left to right.
///
/// Unseeded, so the value is stable across calls and process runs. Any
/// hash stored alongside a key must come from here (or be consistent with
/// it for equal bytes) for lookups to find previously inserted entries.
#[inline]
pub const fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut h = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        h ^= bytes[i] as u64;
        h = h.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    h
}

/// A byte-string key with its precomputed hash.
///
/// `Key` never owns its bytes: it is a `Copy` view that can be built once
/// and probed against a table any number of times without rehashing.
/// Equality is byte equality; the hash is only a filter.
#[derive(Copy, Clone)]
pub struct Key<'a> {
    hash: u64,
    bytes: &'a [u8],
}

impl<'a> Key<'a> {
    /// Key over an explicitly bounded byte range. Zero bytes are ordinary
    /// content here.
    #[inline]
    pub const fn from_bytes(bytes: &'a [u8]) -> Self {
        Self {
            hash: hash_bytes(bytes),
            bytes,
        }
    }

    /// Key over a NUL-terminated string, excluding the terminator.
    ///
    /// Produces the same hash and compares equal to `from_bytes` over the
    /// same content.
    #[inline]
    pub fn from_cstr(s: &'a CStr) -> Self {
        Self::from_bytes(s.to_bytes())
    }

    /// Key with a hash supplied by the caller.
    ///
    /// The table trusts the hash: two keys with equal bytes but different
    /// hashes will not find each other. Only use this with hashes that are
    /// a function of the bytes, or in tests that force collisions.
    #[inline]
    pub const fn with_hash(hash: u64, bytes: &'a [u8]) -> Self {
        Self { hash, bytes }
    }

    #[inline]
    pub const fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl PartialEq for Key<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Key<'_> {}

// Hashes the bytes, not the stored hash, so it agrees with `PartialEq`
// even for keys built by `with_hash`.
impl Hash for Key<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Debug for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({:#018x}, b\"{}\")", self.hash, self.bytes.escape_ascii())
    }
}

impl<'a> From<&'a [u8]> for Key<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(s: &'a str) -> Self {
        Self::from_bytes(s.as_bytes())
    }
}

impl<'a> From<&'a CStr> for Key<'a> {
    fn from(s: &'a CStr) -> Self {
        Self::from_cstr(s)
    }
}
