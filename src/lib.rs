//! htab: a single-threaded, open-addressed table from borrowed byte keys
//! to values, driven by hashes the caller computes once.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: let callers that probe the same key repeatedly (interning,
//!   symbol tables) hash it once and reuse the hash on every lookup.
//! - Layers:
//!   - `Key<'a>`: a `Copy` descriptor holding a 64-bit FNV-1a hash and a
//!     borrowed byte slice. Built from a `CStr` (up to the NUL) or from an
//!     explicit slice (zero bytes allowed); both agree on hash and equality.
//!   - `HashTable<'k, V>`: a power-of-two array of slots probed linearly
//!     from `hash & (capacity - 1)`. Insert-or-fetch (`entry`/`put`),
//!     lookup (`get`), and bulk teardown (`destroy_with`).
//!
//! Constraints
//! - Single-threaded: no internal synchronization. Exclusive access for
//!   mutation comes from `&mut self`.
//! - Keys are borrowed, never copied or freed; the bytes must outlive the
//!   table (`'k`).
//! - No per-entry removal, hence no tombstones: a probe stops at the first
//!   empty slot.
//! - Load factor never exceeds 3/4 after an insert; growth doubles the
//!   capacity and relocates buckets by their stored hash.
//!
//! Hasher and rehashing invariants
//! - Each bucket stores the `u64` hash it was inserted with. Equal bytes
//!   must produce equal hashes; equal hashes are confirmed by comparing
//!   bytes. Growth never reads key bytes.
//!
//! Error model
//! - Allocation failure and capacity overflow surface as `TableError` from
//!   `with_capacity` and from any insert that needs to grow; the table is
//!   unchanged on error.
//! - A missing key is `None`, not an error.
//! - Teardown consumes the table, so use after destroy does not compile.
//!
//! Notes and non-goals
//! - Iteration order is slot order and carries no meaning.
//! - The hash is not DoS resistant; adversarial keys can force long probe
//!   sequences.
//! - Values are opaque: a new entry starts as `V::default()` and the table
//!   never inspects it.

pub mod error;
pub mod key;
pub mod table;
mod table_proptest;

// Public surface
pub use error::TableError;
pub use key::{hash_bytes, Key};
pub use table::{Entry, HashTable};
