//! # Level
//!
//! The state every system runs against: the entity store, the component
//! registry describing its types, and the edit history over both.

use mosaic_core::{ComponentRegistry, World};
use mosaic_history::{History, HistoryResult};

/// Entity store, type registry and edit history of one loaded level.
#[derive(Default)]
pub struct Level {
    /// Entity store.
    pub world: World,
    /// Component types the level knows about.
    pub registry: ComponentRegistry,
    /// Undo/redo over `world`.
    pub history: History,
}

impl Level {
    /// Creates an empty level.
    #[must_use]
    pub fn new(registry: ComponentRegistry, history: History) -> Self {
        Self {
            world: World::new(),
            registry,
            history,
        }
    }

    /// Runs `f` inside a change named `description`.
    ///
    /// Inside a continuous scope the edits join the open change instead.
    ///
    /// # Panics
    ///
    /// Panics if called from inside another `transact`.
    pub fn transact<R>(
        &mut self,
        description: impl Into<String>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.history.begin(description);
        let result = f(self);
        self.history.end();
        result
    }

    /// Runs `f` inside a continuous change; nested calls join the
    /// outermost scope.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a [`transact`](Self::transact).
    pub fn transact_continuous<R>(
        &mut self,
        description: impl Into<String>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let opened = self.history.begin_continuous(description);
        let result = f(self);
        if opened {
            self.history.end_continuous();
        }
        result
    }

    /// Reverses the latest change.
    ///
    /// # Errors
    ///
    /// Returns the replay error; the level is left unchanged.
    pub fn undo(&mut self) -> HistoryResult<bool> {
        self.history.perform_undo(&mut self.world, &self.registry)
    }

    /// Re-applies the latest undone change.
    ///
    /// # Errors
    ///
    /// Returns the replay error; the level is left unchanged.
    pub fn redo(&mut self) -> HistoryResult<bool> {
        self.history.perform_redo(&mut self.world, &self.registry)
    }
}

#[cfg(test)]
mod tests {
    use mosaic_core::{ComponentType, DurableKey};

    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Position {
        x: i32,
    }

    fn level() -> Level {
        let mut registry = ComponentRegistry::new();
        registry.register(
            ComponentType::<Position>::new()
                .named("Position")
                .default_constructible()
                .copyable(),
        );
        Level::new(registry, History::default())
    }

    #[test]
    fn test_transact_records_one_change() {
        let mut level = level();
        let entity = level.transact("Add", |level| {
            let entity = level.history.create_entity(&mut level.world, "A");
            level
                .history
                .assign(&mut level.world, &level.registry, entity, Position { x: 1 })
                .unwrap();
            entity
        });

        assert!(!level.history.is_recording());
        assert_eq!(level.history.undo_depth(), 1);
        assert_eq!(level.world.get::<Position>(entity), Some(&Position { x: 1 }));

        assert!(level.undo().unwrap());
        assert!(level.world.resolve_key(&DurableKey::from("A")).is_none());
        assert!(level.redo().unwrap());
        assert!(level.world.resolve_key(&DurableKey::from("A")).is_some());
    }

    #[test]
    fn test_nested_continuous_joins_outer() {
        let mut level = level();
        let entity = level.transact("Add", |level| {
            level.history.create_entity(&mut level.world, "A")
        });

        level.transact_continuous("Drag", |level| {
            level
                .history
                .assign(&mut level.world, &level.registry, entity, Position { x: 0 })
                .unwrap();
            level.transact_continuous("Drag again", |level| {
                level
                    .history
                    .replace(&mut level.world, &level.registry, entity, Position { x: 4 })
                    .unwrap();
            });
            assert!(level.history.is_continuous());
        });

        assert!(!level.history.is_continuous());
        assert_eq!(level.history.undo_description(), Some("Drag"));
        assert!(level.undo().unwrap());
        assert!(!level.world.has::<Position>(entity));
    }
}
