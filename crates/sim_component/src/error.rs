//! Snapshot error types.
//!
//! The store itself never fails on absent data; only the snapshot boundary
//! (serialisation to and from bytes) can produce errors.

/// Errors that can occur while exporting, encoding, or restoring a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Failed to encode a component or snapshot to MessagePack.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a component or snapshot from MessagePack.
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// A record was decoded as a component kind with a different tag.
    #[error("component record is tagged '{found}', expected '{expected}'")]
    TagMismatch {
        /// The tag of the requested Rust type.
        expected: &'static str,
        /// The tag stored in the record.
        found: String,
    },

    /// The snapshot names an entity id no allocator could have issued.
    #[error("snapshot holds out-of-range entity id {0}")]
    InvalidEntity(u64),
}
