//! # History Engine
//!
//! Records reversible edits grouped into changes.
//!
//! ## States
//!
//! ```text
//!            begin / begin_continuous
//!   IDLE  ------------------------------>  RECORDING (+ CONTINUOUS)
//!         <------------------------------
//!              end / end_continuous
//! ```
//!
//! ## Storage
//!
//! - **Undo ring**: fixed-capacity circular array; `cursor` is the most
//!   recently committed slot. Opening a change overwrites the oldest slot,
//!   which is how capacity eviction works.
//! - **Redo stack**: growable; cleared whenever a non-continuous change opens.
//!
//! ## Coalescing
//!
//! While `CONTINUOUS` is set every `begin`/`begin_continuous` is absorbed, so a
//! drag gesture spanning many events stays one change.

use mosaic_core::{ComponentRegistry, ComponentValue, DurableKey, Entity, TypeToken, World};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::change::Change;
use crate::error::{HistoryError, HistoryResult};

/// Default undo ring capacity.
pub const DEFAULT_CAPACITY: usize = 100;

/// History configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Number of changes the undo ring keeps.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Undo/redo engine.
#[derive(Debug)]
pub struct History {
    ring: Vec<Option<Change>>,
    cursor: usize,
    redo: Vec<Change>,
    recording: bool,
    continuous: bool,
    dirty: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl History {
    /// Creates a history from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidCapacity`] if the capacity is zero.
    pub fn new(config: HistoryConfig) -> HistoryResult<Self> {
        if config.capacity == 0 {
            return Err(HistoryError::InvalidCapacity);
        }
        Ok(Self::with_capacity(config.capacity))
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: (0..capacity).map(|_| None).collect(),
            cursor: 0,
            redo: Vec::new(),
            recording: false,
            continuous: false,
            dirty: false,
        }
    }

    // =========================================================================
    // Change lifecycle
    // =========================================================================

    /// Opens a new change.
    ///
    /// Advances the cursor, overwriting the oldest slot, and discards the
    /// redo stack.
    ///
    /// # Returns
    ///
    /// `false` without doing anything while a continuous scope is open.
    ///
    /// # Panics
    ///
    /// Panics if a non-continuous change is already open.
    pub fn begin(&mut self, description: impl Into<String>) -> bool {
        if self.continuous {
            return false;
        }
        assert!(
            !self.recording,
            "cannot open a change while another one is open"
        );

        let description = description.into();
        tracing::debug!(change = %description, "Begin change");

        self.cursor = self.next_slot();
        self.ring[self.cursor] = Some(Change::new(description));
        self.redo.clear();
        self.recording = true;
        self.dirty = true;
        true
    }

    /// Opens a new change and enters continuous mode.
    ///
    /// # Returns
    ///
    /// `false` without doing anything while a continuous scope is open; only
    /// the outermost scope records.
    ///
    /// # Panics
    ///
    /// Panics if a non-continuous change is already open.
    pub fn begin_continuous(&mut self, description: impl Into<String>) -> bool {
        if !self.begin(description) {
            return false;
        }
        self.continuous = true;
        true
    }

    /// Closes the open non-continuous change. No-op while continuous or idle.
    pub fn end(&mut self) {
        if self.continuous || !self.recording {
            return;
        }
        self.recording = false;
        tracing::debug!(actions = self.active_len(), "End change");
    }

    /// Leaves continuous mode and closes the change.
    ///
    /// # Panics
    ///
    /// Panics if continuous mode is not active.
    pub fn end_continuous(&mut self) {
        assert!(self.continuous, "end_continuous without begin_continuous");
        self.continuous = false;
        self.recording = false;
        tracing::debug!(actions = self.active_len(), "End continuous change");
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// Creates an entity keyed from `name_hint` and records it.
    ///
    /// # Panics
    ///
    /// Panics if no change is open.
    pub fn create_entity(&mut self, world: &mut World, name_hint: &str) -> Entity {
        self.assert_recording("create_entity");
        let key = world.unique_key(name_hint);
        let entity = world.spawn_keyed(key.clone());
        self.log(Action::CreateEntity { key });
        entity
    }

    /// Snapshots every editable component of `entity`, records the deletion
    /// and destroys the entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is dead or has no durable key.
    ///
    /// # Panics
    ///
    /// Panics if no change is open.
    pub fn delete_entity(
        &mut self,
        world: &mut World,
        registry: &ComponentRegistry,
        entity: Entity,
    ) -> HistoryResult<()> {
        self.assert_recording("delete_entity");
        let key = key_of(world, entity)?;
        let components = registry.snapshot_editable(world, entity);
        self.log(Action::DeleteEntity { key, components });
        world.despawn_keyed(entity);
        Ok(())
    }

    /// Attaches `value` to `entity`, which must not carry that type yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is dead or unkeyed, the type is not
    /// editable, or the component is already present.
    ///
    /// # Panics
    ///
    /// Panics if no change is open or the type is unregistered.
    pub fn assign_component(
        &mut self,
        world: &mut World,
        registry: &ComponentRegistry,
        entity: Entity,
        value: ComponentValue<'_>,
    ) -> HistoryResult<()> {
        self.assert_recording("assign_component");
        let key = key_of(world, entity)?;
        let token = value.token();
        check_recordable(registry, token)?;
        if registry.has(world, entity, token) {
            return Err(HistoryError::AlreadyPresent {
                key,
                component: token.rust_name(),
            });
        }

        let saved = registry.copy(&value);
        self.log(Action::AssignComponent { key, value: saved });
        registry.assign(world, entity, value);
        Ok(())
    }

    /// Overwrites the component `entity` carries with `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is dead or unkeyed, the type is not
    /// editable, or the component is absent.
    ///
    /// # Panics
    ///
    /// Panics if no change is open or the type is unregistered.
    pub fn replace_component(
        &mut self,
        world: &mut World,
        registry: &ComponentRegistry,
        entity: Entity,
        value: ComponentValue<'_>,
    ) -> HistoryResult<()> {
        self.assert_recording("replace_component");
        let key = key_of(world, entity)?;
        let token = value.token();
        check_recordable(registry, token)?;
        let Some(old) = registry
            .get(world, entity, token)
            .map(|current| registry.copy(&current))
        else {
            return Err(HistoryError::NotPresent {
                key,
                component: token.rust_name(),
            });
        };

        self.log(Action::ReplaceComponent { key, value: old });
        registry.replace(world, entity, value);
        Ok(())
    }

    /// Detaches the `token` component from `entity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is dead or unkeyed, the type is not
    /// editable, or the component is absent.
    ///
    /// # Panics
    ///
    /// Panics if no change is open or the type is unregistered.
    pub fn remove_component(
        &mut self,
        world: &mut World,
        registry: &ComponentRegistry,
        entity: Entity,
        token: TypeToken,
    ) -> HistoryResult<()> {
        self.assert_recording("remove_component");
        let key = key_of(world, entity)?;
        check_recordable(registry, token)?;
        let Some(value) = registry.remove(world, entity, token) else {
            return Err(HistoryError::NotPresent {
                key,
                component: token.rust_name(),
            });
        };

        self.log(Action::RemoveComponent { key, value });
        Ok(())
    }

    /// Typed [`assign_component`](Self::assign_component).
    ///
    /// # Errors
    ///
    /// See [`assign_component`](Self::assign_component).
    pub fn assign<T: 'static>(
        &mut self,
        world: &mut World,
        registry: &ComponentRegistry,
        entity: Entity,
        value: T,
    ) -> HistoryResult<()> {
        self.assign_component(world, registry, entity, ComponentValue::owned(value))
    }

    /// Typed [`replace_component`](Self::replace_component).
    ///
    /// # Errors
    ///
    /// See [`replace_component`](Self::replace_component).
    pub fn replace<T: 'static>(
        &mut self,
        world: &mut World,
        registry: &ComponentRegistry,
        entity: Entity,
        value: T,
    ) -> HistoryResult<()> {
        self.replace_component(world, registry, entity, ComponentValue::owned(value))
    }

    /// Typed [`remove_component`](Self::remove_component).
    ///
    /// # Errors
    ///
    /// See [`remove_component`](Self::remove_component).
    pub fn remove<T: 'static>(
        &mut self,
        world: &mut World,
        registry: &ComponentRegistry,
        entity: Entity,
    ) -> HistoryResult<()> {
        self.remove_component(world, registry, entity, TypeToken::of::<T>())
    }

    // =========================================================================
    // Undo / redo
    // =========================================================================

    /// Reverses the most recent change.
    ///
    /// Closes an open non-continuous change first. Does nothing while
    /// continuous or when the active slot is empty.
    ///
    /// # Returns
    ///
    /// `true` if a change was undone.
    ///
    /// # Errors
    ///
    /// Returns the replay error if an action cannot be reversed; world and
    /// history are left as they were.
    pub fn perform_undo(
        &mut self,
        world: &mut World,
        registry: &ComponentRegistry,
    ) -> HistoryResult<bool> {
        if self.continuous {
            return Ok(false);
        }
        self.end();

        let Some(change) = self.ring[self.cursor].take() else {
            return Ok(false);
        };
        match change.replay(world, registry) {
            Ok(inverse) => {
                tracing::debug!(change = inverse.description(), "Undo");
                self.redo.push(inverse);
                self.cursor = self.previous_slot();
                self.dirty = true;
                Ok(true)
            }
            Err((change, error)) => {
                self.ring[self.cursor] = Some(change);
                Err(error)
            }
        }
    }

    /// Re-applies the most recently undone change into the next ring slot.
    ///
    /// # Returns
    ///
    /// `true` if a change was redone.
    ///
    /// # Errors
    ///
    /// Returns the replay error if an action cannot be re-applied; world and
    /// history are left as they were.
    pub fn perform_redo(
        &mut self,
        world: &mut World,
        registry: &ComponentRegistry,
    ) -> HistoryResult<bool> {
        if self.continuous {
            return Ok(false);
        }
        self.end();

        let Some(change) = self.redo.pop() else {
            return Ok(false);
        };
        match change.replay(world, registry) {
            Ok(forward) => {
                tracing::debug!(change = forward.description(), "Redo");
                self.cursor = self.next_slot();
                self.ring[self.cursor] = Some(forward);
                self.dirty = true;
                Ok(true)
            }
            Err((change, error)) => {
                self.redo.push(change);
                Err(error)
            }
        }
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Returns the undo ring capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` if [`perform_undo`](Self::perform_undo) would act.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.continuous && self.ring[self.cursor].is_some()
    }

    /// Returns `true` if [`perform_redo`](Self::perform_redo) would act.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.continuous && !self.redo.is_empty()
    }

    /// Returns the change the next undo reverses (or the open change).
    #[must_use]
    pub fn current(&self) -> Option<&Change> {
        self.ring[self.cursor].as_ref()
    }

    /// Returns the description of the change the next undo reverses.
    #[must_use]
    pub fn undo_description(&self) -> Option<&str> {
        self.current().map(Change::description)
    }

    /// Returns the description of the change the next redo re-applies.
    #[must_use]
    pub fn redo_description(&self) -> Option<&str> {
        self.redo.last().map(Change::description)
    }

    /// Returns the number of consecutive undoable changes.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        let capacity = self.capacity();
        (0..capacity)
            .map(|back| (self.cursor + capacity - back) % capacity)
            .take_while(|&slot| self.ring[slot].is_some())
            .count()
    }

    /// Returns the number of redoable changes.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Returns `true` while a change is open.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Returns `true` while a continuous scope is open.
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Returns `true` if anything changed since [`mark_clean`](Self::mark_clean).
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag, typically after saving.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn next_slot(&self) -> usize {
        (self.cursor + 1) % self.ring.len()
    }

    fn previous_slot(&self) -> usize {
        (self.cursor + self.ring.len() - 1) % self.ring.len()
    }

    fn active_len(&self) -> usize {
        self.current().map_or(0, Change::len)
    }

    fn assert_recording(&self, primitive: &str) {
        assert!(self.recording, "{primitive} called with no open change");
    }

    fn log(&mut self, action: Action) {
        tracing::trace!(key = %action.key(), "Record action");
        if let Some(change) = self.ring[self.cursor].as_mut() {
            change.push(action);
        }
    }
}

fn key_of(world: &World, entity: Entity) -> HistoryResult<DurableKey> {
    if !world.is_alive(entity) {
        return Err(HistoryError::DeadEntity(entity));
    }
    world
        .durable_key(entity)
        .cloned()
        .ok_or(HistoryError::MissingKey(entity))
}

/// Only editable types are recorded: they are the ones `delete_entity`
/// snapshots and an undone creation strips.
fn check_recordable(registry: &ComponentRegistry, token: TypeToken) -> HistoryResult<()> {
    if registry.descriptor(token).is_editable() {
        Ok(())
    } else {
        Err(HistoryError::NotEditable(token.rust_name()))
    }
}
