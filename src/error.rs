//! Errors surfaced by table creation and growth.

use std::collections::TryReserveError;
use thiserror::Error;

/// Failure to obtain slot storage. Returned by `HashTable::with_capacity`
/// and by any `put`/`entry` that has to grow the table; in the latter
/// case the table is left exactly as it was before the call.
#[derive(Debug, Error)]
pub enum TableError {
    /// The requested slot count cannot be represented as a power of two
    /// in `usize`.
    #[error("capacity overflow: {requested} slots cannot be rounded to a power of two")]
    CapacityOverflow { requested: usize },

    /// The allocator refused the slot array.
    #[error("failed to allocate {slots} slots")]
    Alloc {
        slots: usize,
        #[source]
        source: TryReserveError,
    },
}

#[cfg(test)]
mod tests {
    use super::TableError;
    use std::error::Error as _;

    #[test]
    fn overflow_message_names_request() {
        let e = TableError::CapacityOverflow {
            requested: usize::MAX,
        };
        assert!(e.to_string().contains(&usize::MAX.to_string()));
        assert!(e.source().is_none());
    }

    #[test]
    fn alloc_error_keeps_source() {
        let source = Vec::<u64>::new()
            .try_reserve_exact(usize::MAX)
            .expect_err("reserving usize::MAX elements must fail");
        let e = TableError::Alloc { slots: 16, source };
        assert_eq!(e.to_string(), "failed to allocate 16 slots");
        assert!(e.source().is_some());
    }
}
