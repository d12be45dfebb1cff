//! # Entity Identifiers
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into component storages
//! - A generation counter for safe reuse
//!
//! An `Entity` is only stable until it is despawned. Anything that must survive
//! a destroy/recreate cycle addresses entities through a
//! [`DurableKey`](crate::identity::DurableKey) instead.

use std::fmt;

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into component storages
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Creates a new entity ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-1)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}

/// Liveness bookkeeping for one entity slot.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct EntitySlot {
    /// Generation of the entity currently (or last) occupying the slot.
    pub(crate) generation: u32,
    /// Whether the slot is occupied.
    pub(crate) alive: bool,
}

impl EntitySlot {
    /// Returns `true` if `entity` refers to the live occupant of this slot.
    #[inline]
    pub(crate) const fn holds(self, entity: Entity) -> bool {
        self.alive && self.generation == entity.generation()
    }
}
