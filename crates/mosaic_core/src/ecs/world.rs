//! # ECS World
//!
//! The Entity Store: owns entity identities, one [`ComponentStorage`] per
//! component type and a table of singleton values.
//!
//! Every operation here is statically typed. Generic (type-erased) access goes
//! through the [`ComponentRegistry`](crate::registry::ComponentRegistry),
//! whose function tables call back into these methods.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::entity::{Entity, EntitySlot};
use super::storage::{ComponentStorage, ErasedStorage};

/// The ECS World - container for entities, components and singletons.
///
/// Entity slots are recycled: despawning bumps the slot's generation so that
/// stale [`Entity`] handles are rejected by every accessor.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new();
///
/// let entity = world.spawn();
/// world.insert(entity, Position { x: 1 });
/// assert_eq!(world.get::<Position>(entity), Some(&Position { x: 1 }));
/// ```
#[derive(Default)]
pub struct World {
    /// All entity slots ever allocated.
    slots: Vec<EntitySlot>,
    /// Free list of slot indices for reuse.
    free_indices: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
    /// One storage per component type.
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
    /// Values not tied to any entity.
    singletons: HashMap<TypeId, Box<dyn Any>>,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty world with room for `capacity` entities before the
    /// slot table reallocates.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Spawns a new entity, returning its ID.
    ///
    /// Freed slots are reused with an incremented generation.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` slots would be required.
    pub fn spawn(&mut self) -> Entity {
        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.alive = true;
            self.alive_count += 1;
            return Entity::new(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len()).expect("entity slot table exhausted");
        self.slots.push(EntitySlot {
            generation: 0,
            alive: true,
        });
        self.alive_count += 1;
        Entity::new(index, 0)
    }

    /// Despawns an entity, dropping all of its components.
    ///
    /// # Returns
    ///
    /// `true` if the entity was despawned, `false` if it was already dead
    /// or the ID was invalid/stale.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let index = entity.index();
        self.slots[index as usize].alive = false;
        self.alive_count -= 1;
        self.free_indices.push(index);

        for storage in self.storages.values_mut() {
            storage.clear_slot(index as usize);
        }

        true
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        if entity.is_null() {
            return false;
        }
        self.slots
            .get(entity.index() as usize)
            .is_some_and(|slot| slot.holds(entity))
    }

    /// Iterates over all alive entities in slot order.
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            // Slot count is bounded by u32 in `spawn`.
            let index = index as u32;
            slot.alive.then(|| Entity::new(index, slot.generation))
        })
    }

    /// Returns the Rust type names of every component attached to `entity`.
    #[must_use]
    pub fn component_names(&self, entity: Entity) -> Vec<&'static str> {
        if !self.is_alive(entity) {
            return Vec::new();
        }
        let index = entity.index() as usize;
        let mut names: Vec<&'static str> = self
            .storages
            .values()
            .filter(|storage| storage.contains_slot(index))
            .map(|storage| storage.component_name())
            .collect();
        names.sort_unstable();
        names
    }

    // =========================================================================
    // Components
    // =========================================================================

    fn storage<T: 'static>(&self) -> Option<&ComponentStorage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any().downcast_ref())
    }

    fn storage_mut<T: 'static>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any_mut().downcast_mut())
    }

    fn storage_or_create<T: 'static>(&mut self) -> &mut ComponentStorage<T> {
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStorage::<T>::new()))
            .as_any_mut()
            .downcast_mut()
            .expect("component storage keyed by a foreign TypeId")
    }

    fn assert_alive(&self, entity: Entity, operation: &str) {
        assert!(
            self.is_alive(entity),
            "{operation} on dead or stale entity {entity}"
        );
    }

    /// Attaches `component` to `entity`, returning the value it replaced.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is dead or stale.
    pub fn insert<T: 'static>(&mut self, entity: Entity, component: T) -> Option<T> {
        self.assert_alive(entity, "insert");
        self.storage_or_create::<T>()
            .insert(entity.index() as usize, component)
    }

    /// Detaches and returns the `T` component of `entity`.
    pub fn remove<T: 'static>(&mut self, entity: Entity) -> Option<T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.storage_mut::<T>()?.remove(entity.index() as usize)
    }

    /// Gets the `T` component of `entity`.
    #[must_use]
    pub fn get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.storage::<T>()?.get(entity.index() as usize)
    }

    /// Gets the `T` component of `entity` mutably.
    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.storage_mut::<T>()?.get_mut(entity.index() as usize)
    }

    /// Returns `true` if `entity` carries a `T` component.
    #[must_use]
    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Returns the `T` component of `entity`, attaching `init()` first if the
    /// entity has none.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is dead or stale.
    pub fn get_or_insert_with<T: 'static>(
        &mut self,
        entity: Entity,
        init: impl FnOnce() -> T,
    ) -> &mut T {
        self.assert_alive(entity, "get_or_insert_with");
        self.storage_or_create::<T>()
            .get_or_insert_with(entity.index() as usize, init)
    }

    /// Iterates over every alive entity carrying a `T` component.
    pub fn query<T: 'static>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.storage::<T>()
            .into_iter()
            .flat_map(|storage| storage.iter())
            .filter_map(|(index, component)| {
                let slot = self.slots[index];
                // Slot count is bounded by u32 in `spawn`.
                slot.alive
                    .then(|| (Entity::new(index as u32, slot.generation), component))
            })
    }

    // =========================================================================
    // Singletons
    // =========================================================================

    /// Stores a singleton value, returning the previous one.
    pub fn insert_singleton<T: 'static>(&mut self, value: T) -> Option<T> {
        self.singletons
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|previous| previous.downcast().ok())
            .map(|previous| *previous)
    }

    /// Gets the singleton of type `T`.
    #[must_use]
    pub fn singleton<T: 'static>(&self) -> Option<&T> {
        self.singletons
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref())
    }

    /// Gets the singleton of type `T` mutably.
    pub fn singleton_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.singletons
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut())
    }

    /// Gets the singleton of type `T`, inserting `T::default()` first if absent.
    pub fn singleton_or_default<T: Default + 'static>(&mut self) -> &mut T {
        self.singletons
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()))
            .downcast_mut()
            .expect("singleton keyed by a foreign TypeId")
    }

    /// Removes and returns the singleton of type `T`.
    pub fn remove_singleton<T: 'static>(&mut self) -> Option<T> {
        self.singletons
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast().ok())
            .map(|value| *value)
    }
}
