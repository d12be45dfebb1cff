//! Integration test for undo/redo over a live world.

use mosaic_core::{ComponentRegistry, ComponentType, DurableKey, Entity, World};
use mosaic_history::{History, HistoryConfig, HistoryError};

#[derive(Debug, Clone, Default, PartialEq)]
struct Position {
    x: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Name(String);

/// Copyable but unnamed, so not editable.
#[derive(Debug, Clone, Default, PartialEq)]
struct Tint(u8);

struct Editor {
    world: World,
    registry: ComponentRegistry,
    history: History,
}

impl Editor {
    fn new(capacity: usize) -> Self {
        let mut registry = ComponentRegistry::new();
        registry.register(
            ComponentType::<Position>::new()
                .named("Position")
                .default_constructible()
                .copyable(),
        );
        registry.register(
            ComponentType::<Name>::new()
                .named("Name")
                .default_constructible()
                .copyable(),
        );
        registry.register(ComponentType::<Tint>::new().default_constructible().copyable());
        Self {
            world: World::new(),
            registry,
            history: History::new(HistoryConfig { capacity }).unwrap(),
        }
    }

    fn entity(&self, key: &str) -> Option<Entity> {
        self.world.resolve_key(&DurableKey::from(key))
    }

    fn position(&self, key: &str) -> Option<Position> {
        self.entity(key)
            .and_then(|entity| self.world.get::<Position>(entity))
            .cloned()
    }

    fn undo(&mut self) -> bool {
        self.history
            .perform_undo(&mut self.world, &self.registry)
            .unwrap()
    }

    fn redo(&mut self) -> bool {
        self.history
            .perform_redo(&mut self.world, &self.registry)
            .unwrap()
    }

    fn create(&mut self, hint: &str) -> Entity {
        self.history.begin(format!("Create {hint}"));
        let entity = self.history.create_entity(&mut self.world, hint);
        self.history.end();
        entity
    }

    fn assign(&mut self, entity: Entity, position: Position) {
        self.history.begin("Assign Position");
        self.history
            .assign(&mut self.world, &self.registry, entity, position)
            .unwrap();
        self.history.end();
    }

    fn replace(&mut self, entity: Entity, position: Position) {
        self.history.begin("Move");
        self.history
            .replace(&mut self.world, &self.registry, entity, position)
            .unwrap();
        self.history.end();
    }
}

#[test]
fn test_create_assign_undo_redo_scenario() {
    let mut editor = Editor::new(100);
    let a = editor.create("A");
    editor.assign(a, Position { x: 1 });

    assert!(editor.undo());
    assert!(editor.entity("A").is_some());
    assert_eq!(editor.position("A"), None);

    assert!(editor.undo());
    assert!(editor.entity("A").is_none());

    assert!(editor.redo());
    assert!(editor.redo());
    assert_eq!(editor.position("A"), Some(Position { x: 1 }));
    assert!(!editor.redo());
}

#[test]
fn test_single_change_undoes_as_a_unit() {
    let mut editor = Editor::new(100);

    editor.history.begin("Create A with Position");
    let a = editor.history.create_entity(&mut editor.world, "A");
    editor
        .history
        .assign(&mut editor.world, &editor.registry, a, Position { x: 1 })
        .unwrap();
    editor.history.end();

    assert!(editor.undo());
    assert!(editor.entity("A").is_none());

    assert!(editor.redo());
    assert_eq!(editor.position("A"), Some(Position { x: 1 }));
}

#[test]
fn test_undo_redo_laws_for_each_primitive() {
    let mut editor = Editor::new(100);
    let a = editor.create("A");
    editor.assign(a, Position { x: 1 });

    // replace
    editor.replace(a, Position { x: 5 });
    assert!(editor.undo());
    assert_eq!(editor.position("A"), Some(Position { x: 1 }));
    assert!(editor.redo());
    assert_eq!(editor.position("A"), Some(Position { x: 5 }));

    // remove
    let a = editor.entity("A").unwrap();
    editor.history.begin("Remove Position");
    editor
        .history
        .remove::<Position>(&mut editor.world, &editor.registry, a)
        .unwrap();
    editor.history.end();
    assert_eq!(editor.position("A"), None);
    assert!(editor.undo());
    assert_eq!(editor.position("A"), Some(Position { x: 5 }));
    assert!(editor.redo());
    assert_eq!(editor.position("A"), None);
    assert!(editor.undo());

    // delete
    let a = editor.entity("A").unwrap();
    editor.world.insert(a, Name("door".into()));
    editor.history.begin("Delete A");
    editor
        .history
        .delete_entity(&mut editor.world, &editor.registry, a)
        .unwrap();
    editor.history.end();
    assert!(editor.entity("A").is_none());

    assert!(editor.undo());
    let restored = editor.entity("A").unwrap();
    assert_ne!(restored, a);
    assert_eq!(editor.position("A"), Some(Position { x: 5 }));
    assert_eq!(editor.world.get::<Name>(restored), Some(&Name("door".into())));

    assert!(editor.redo());
    assert!(editor.entity("A").is_none());
}

#[test]
fn test_continuous_gesture_is_one_change() {
    let mut editor = Editor::new(100);
    let a = editor.create("A");
    editor.assign(a, Position { x: 0 });

    assert!(editor.history.begin_continuous("Drag"));
    for step in 1..=10 {
        // Each input event tries to open its own change.
        editor.history.begin("Drag step");
        editor
            .history
            .replace(&mut editor.world, &editor.registry, a, Position { x: step })
            .unwrap();
        editor.history.end();
        assert!(!editor.history.can_undo());
    }
    editor.history.end_continuous();

    assert_eq!(editor.history.current().map(|change| change.len()), Some(10));
    assert!(editor.undo());
    assert_eq!(editor.position("A"), Some(Position { x: 0 }));
    assert!(editor.redo());
    assert_eq!(editor.position("A"), Some(Position { x: 10 }));
}

#[test]
fn test_undo_is_inert_while_continuous() {
    let mut editor = Editor::new(100);
    let a = editor.create("A");

    editor.history.begin_continuous("Drag");
    editor
        .history
        .assign(&mut editor.world, &editor.registry, a, Position { x: 3 })
        .unwrap();
    assert!(!editor.undo());
    assert!(!editor.redo());
    editor.history.end_continuous();

    assert_eq!(editor.position("A"), Some(Position { x: 3 }));
}

#[test]
fn test_ring_capacity_evicts_oldest() {
    let mut editor = Editor::new(3);
    let a = editor.create("A");
    editor.assign(a, Position { x: 0 });
    for x in 1..=3 {
        editor.replace(a, Position { x });
    }

    // Only the last three replaces survive.
    assert_eq!(editor.history.undo_depth(), 3);
    assert!(editor.undo());
    assert!(editor.undo());
    assert!(editor.undo());
    assert!(!editor.undo());
    assert_eq!(editor.position("A"), Some(Position { x: 0 }));

    for _ in 0..3 {
        assert!(editor.redo());
    }
    assert_eq!(editor.position("A"), Some(Position { x: 3 }));
}

#[test]
fn test_new_change_discards_redo() {
    let mut editor = Editor::new(100);
    let a = editor.create("A");
    editor.assign(a, Position { x: 1 });
    assert!(editor.undo());
    assert!(editor.history.can_redo());

    let b = editor.create("B");
    assert!(!editor.history.can_redo());
    assert!(!editor.redo());
    assert!(editor.world.is_alive(b));
}

#[test]
fn test_replay_conflict_leaves_state_intact() {
    let mut editor = Editor::new(100);
    let a = editor.create("A");

    editor.history.begin("Delete A");
    editor
        .history
        .delete_entity(&mut editor.world, &editor.registry, a)
        .unwrap();
    editor.history.end();

    // Someone recreates "A" outside the history.
    let squatter = editor.world.spawn_keyed(DurableKey::from("A"));

    let result = editor.history.perform_undo(&mut editor.world, &editor.registry);
    assert_eq!(result, Err(HistoryError::KeyInUse(DurableKey::from("A"))));
    assert_eq!(editor.entity("A"), Some(squatter));
    assert_eq!(editor.history.undo_description(), Some("Delete A"));
}

#[test]
fn test_multi_action_rollback_on_failure() {
    let mut editor = Editor::new(100);
    let a = editor.create("A");
    let b = editor.create("B");

    editor.history.begin("Edit both");
    editor
        .history
        .assign(&mut editor.world, &editor.registry, a, Position { x: 1 })
        .unwrap();
    editor
        .history
        .assign(&mut editor.world, &editor.registry, b, Position { x: 2 })
        .unwrap();
    editor.history.end();

    // Detach A's component behind the history's back: undoing the first
    // assign fails after the second was already reversed.
    editor.world.remove::<Position>(a);

    let result = editor.history.perform_undo(&mut editor.world, &editor.registry);
    assert!(matches!(result, Err(HistoryError::NotPresent { .. })));
    assert_eq!(editor.position("B"), Some(Position { x: 2 }));
    assert_eq!(editor.history.current().map(|change| change.len()), Some(2));
}

#[test]
fn test_non_editable_component_is_not_recorded() {
    let mut editor = Editor::new(100);
    let a = editor.create("A");
    editor.assign(a, Position { x: 1 });

    editor.history.begin("Tint A");
    let result = editor
        .history
        .assign(&mut editor.world, &editor.registry, a, Tint(7));
    assert!(matches!(result, Err(HistoryError::NotEditable(_))));
    editor.history.end();
    assert!(!editor.world.has::<Tint>(a));
    assert_eq!(editor.history.current().map(|change| change.len()), Some(0));

    // Deleting and restoring A then walks all the way back.
    editor.history.begin("Delete A");
    editor
        .history
        .delete_entity(&mut editor.world, &editor.registry, a)
        .unwrap();
    editor.history.end();

    assert!(editor.undo());
    assert_eq!(editor.position("A"), Some(Position { x: 1 }));
    assert!(editor.undo());
    assert!(editor.undo());
    assert_eq!(editor.position("A"), None);
    assert!(editor.undo());
    assert!(editor.entity("A").is_none());
    assert!(!editor.undo());

    for _ in 0..4 {
        assert!(editor.redo());
    }
    assert!(editor.entity("A").is_none());
    assert_eq!(editor.world.get::<Tint>(a).map(|tint| tint.0), None);
}
