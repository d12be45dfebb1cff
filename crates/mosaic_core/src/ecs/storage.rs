//! # Component Storage
//!
//! Sparse, index-addressed storage for a single component type.
//!
//! The storage uses a sparse array strategy:
//! - One optional slot per entity index
//! - Access is O(1) via entity index
//! - Slots grow on demand and are never shrunk
//!
//! The [`World`](super::World) keeps one storage per component type behind the
//! [`ErasedStorage`] trait so it can clear a despawned entity's slots without
//! knowing the concrete types.

use std::any::{type_name, Any};

/// Storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<Position> = ComponentStorage::new();
/// storage.insert(0, Position { x: 1 });
/// ```
pub struct ComponentStorage<C> {
    /// One slot per entity index.
    data: Vec<Option<C>>,
    /// Number of occupied slots.
    len: usize,
}

impl<C> ComponentStorage<C> {
    /// Creates an empty storage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            len: 0,
        }
    }

    /// Returns the number of stored components.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no component is stored.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gets a component by entity index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&C> {
        self.data.get(index).and_then(Option::as_ref)
    }

    /// Gets a mutable component by entity index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.data.get_mut(index).and_then(Option::as_mut)
    }

    /// Returns `true` if a component is stored at `index`.
    #[inline]
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Stores `component` at `index`, returning the previous value.
    pub fn insert(&mut self, index: usize, component: C) -> Option<C> {
        if index >= self.data.len() {
            self.data.resize_with(index + 1, || None);
        }
        let previous = self.data[index].replace(component);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Removes and returns the component at `index`.
    pub fn remove(&mut self, index: usize) -> Option<C> {
        let removed = self.data.get_mut(index).and_then(Option::take);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Returns the slot at `index`, filling it with `init()` if it is empty.
    pub fn get_or_insert_with(&mut self, index: usize, init: impl FnOnce() -> C) -> &mut C {
        if !self.contains(index) {
            self.insert(index, init());
        }
        match self.data[index].as_mut() {
            Some(component) => component,
            None => unreachable!("slot {index} was filled above"),
        }
    }

    /// Iterates over all stored components with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &C)> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|c| (index, c)))
    }
}

impl<C> Default for ComponentStorage<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a [`ComponentStorage`].
pub(crate) trait ErasedStorage: Any {
    /// Drops the component at `index`, if any.
    fn clear_slot(&mut self, index: usize);

    /// Returns `true` if a component is stored at `index`.
    fn contains_slot(&self, index: usize) -> bool;

    /// Rust type name of the stored component.
    fn component_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: 'static> ErasedStorage for ComponentStorage<C> {
    fn clear_slot(&mut self, index: usize) {
        self.remove(index);
    }

    fn contains_slot(&self, index: usize) -> bool {
        self.contains(index)
    }

    fn component_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
