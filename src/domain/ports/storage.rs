//! Persistent key-value storage for session state.

use crate::shared::error::StorageError;

/// Process-wide key-value slot holding the token, profile and logout reason.
///
/// Operations are synchronous so that a read-check-write sequence on the
/// session never straddles a suspension point.
pub trait SessionStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a value in a single assignment.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
