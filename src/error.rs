//! Error types for simulator components.

use thiserror::Error;

/// Errors produced by the scheduler core.
///
/// Structural no-ops (absent keys, delete misses) are not errors; they
/// are reported through return values like [`crate::runqueue::Removal`]
/// and `Option`. This enum covers the failures that must propagate:
/// allocation during mandatory initialization and unusable input.
#[derive(Debug, Error)]
pub enum SimError {
    /// A hash index table could not be allocated. Fatal when it happens
    /// during initialization; growth-time failures are downgraded to a
    /// warning by the index itself and never surface here.
    #[error("hash index allocation failed: requested {slots} slots")]
    IndexAlloc { slots: usize },

    /// The event log could not be opened or read at all.
    #[error("cannot read event log: {0}")]
    EventLog(#[from] std::io::Error),
}
