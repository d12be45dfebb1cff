//! # History Error Types
//!
//! Failures of history primitives and replays. Each is reported before the
//! world is touched, so a failed call leaves both world and history as they
//! were.

use mosaic_core::{DurableKey, Entity};
use thiserror::Error;

/// Errors that can occur while recording or replaying history.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// The target entity is dead or stale.
    #[error("entity {0} is dead or stale")]
    DeadEntity(Entity),

    /// The target entity carries no durable key, so history cannot find it
    /// again after a destroy/recreate cycle.
    #[error("entity {0} has no durable key")]
    MissingKey(Entity),

    /// The component is already attached; use a replace instead.
    #[error("`{key}` already carries `{component}`")]
    AlreadyPresent {
        /// The target entity.
        key: DurableKey,
        /// Rust name of the component type.
        component: &'static str,
    },

    /// The component is not attached.
    #[error("`{key}` does not carry `{component}`")]
    NotPresent {
        /// The target entity.
        key: DurableKey,
        /// Rust name of the component type.
        component: &'static str,
    },

    /// The component type is not editable: deleting an entity would not
    /// snapshot it, so its edits could not be reversed.
    #[error("`{0}` is not editable and cannot be recorded")]
    NotEditable(&'static str),

    /// A replayed action names an entity that no longer exists.
    #[error("no live entity carries durable key `{0}`")]
    UnresolvedKey(DurableKey),

    /// A replayed deletion would recreate an entity whose key is taken.
    #[error("durable key `{0}` is already in use")]
    KeyInUse(DurableKey),

    /// The undo ring needs at least one slot.
    #[error("history capacity must be at least 1")]
    InvalidCapacity,
}

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
