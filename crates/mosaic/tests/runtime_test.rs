//! Integration test: systems editing a level through the history, driven
//! by a runtime built from TOML.

use mosaic::core::{ComponentRegistry, ComponentType, DurableKey};
use mosaic::history::HistoryError;
use mosaic::schedule::{
    ExecutionContext, Family, ScheduleError, System, SystemDescriptor, SystemRegistry,
};
use mosaic::{ConfigError, Level, Runtime, RuntimeConfig, RuntimeError};

#[derive(Debug, Clone, Default, PartialEq)]
struct Position {
    x: i32,
}

/// Execution trace kept as a world singleton.
#[derive(Default)]
struct Trace(Vec<String>);

fn trace(level: &mut Level, entry: impl Into<String>) {
    level.world.singleton_or_default::<Trace>().0.push(entry.into());
}

fn crate_position(level: &Level) -> Option<i32> {
    level
        .world
        .resolve_key(&DurableKey::from("Crate"))
        .and_then(|entity| level.world.get::<Position>(entity))
        .map(|position| position.x)
}

/// Creates the crate on the first tick.
#[derive(Default)]
struct Spawner;

impl System<Level> for Spawner {
    fn update(&mut self, level: &mut Level, ctx: &ExecutionContext<'_>) {
        trace(level, ctx.current_system());
        if ctx.tick() == 0 {
            level.transact("Spawn crate", |level| {
                let entity = level.history.create_entity(&mut level.world, "Crate");
                level
                    .history
                    .assign(&mut level.world, &level.registry, entity, Position { x: 0 })
                    .unwrap();
            });
        }
    }

    fn shutdown(&mut self, level: &mut Level) {
        trace(level, "spawner:shutdown");
    }
}

/// Moves the crate one step per tick.
#[derive(Default)]
struct Mover;

impl System<Level> for Mover {
    fn update(&mut self, level: &mut Level, ctx: &ExecutionContext<'_>) {
        assert!(ctx.runs_after("spawner"));
        trace(level, ctx.current_system());
        let Some(entity) = level.world.resolve_key(&DurableKey::from("Crate")) else {
            return;
        };
        let x = crate_position(level).unwrap_or_default();
        level.transact("Move crate", |level| {
            level
                .history
                .replace(&mut level.world, &level.registry, entity, Position { x: x + 1 })
                .unwrap();
        });
    }

    fn shutdown(&mut self, level: &mut Level) {
        trace(level, "mover:shutdown");
    }
}

/// Fixed-step system that only records that it ran.
#[derive(Default)]
struct Clock;

impl System<Level> for Clock {
    fn update(&mut self, level: &mut Level, ctx: &ExecutionContext<'_>) {
        trace(level, format!("{}@{}", ctx.current_system(), ctx.tick()));
    }

    fn shutdown(&mut self, level: &mut Level) {
        trace(level, "clock:shutdown");
    }
}

fn components() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register(
        ComponentType::<Position>::new()
            .named("Position")
            .default_constructible()
            .copyable(),
    );
    registry
}

fn systems() -> SystemRegistry<Level> {
    let mut systems = SystemRegistry::new();
    systems
        .register(SystemDescriptor::of::<Mover>("mover", "frame").after("spawner"))
        .unwrap();
    systems
        .register(SystemDescriptor::of::<Spawner>("spawner", "frame").requires("editor"))
        .unwrap();
    systems
        .register(SystemDescriptor::of::<Clock>("clock", "fixed"))
        .unwrap();
    systems
}

const CONFIG: &str = r#"
[history]
capacity = 16

[schedule.families.frame]
tags = ["editor"]

[schedule.families.fixed]
order = ["clock"]
"#;

fn runtime() -> Runtime {
    let config = RuntimeConfig::from_toml_str(CONFIG).unwrap();
    Runtime::new(config, components(), &systems()).unwrap()
}

fn trace_of(runtime: &Runtime) -> Vec<String> {
    runtime
        .level()
        .world
        .singleton::<Trace>()
        .map(|trace| trace.0.clone())
        .unwrap_or_default()
}

#[test]
fn test_runtime_builds_configured_families() {
    let runtime = runtime();
    let families: Vec<_> = runtime.families().map(Family::as_str).collect();
    assert_eq!(families, ["fixed", "frame"]);

    let frame = runtime.schedule(&Family::from("frame")).unwrap();
    assert_eq!(frame.order(), ["spawner", "mover"]);
    assert_eq!(runtime.level().history.capacity(), 16);
}

#[test]
fn test_ticks_edit_through_history() {
    let mut runtime = runtime();
    let frame = Family::from("frame");

    let stats = runtime.tick(&frame).unwrap();
    assert_eq!(stats.family, frame);
    assert_eq!(stats.tick, 0);
    assert_eq!(stats.systems, 2);
    assert_eq!(crate_position(runtime.level()), Some(1));

    let stats = runtime.tick(&frame).unwrap();
    assert_eq!(stats.tick, 1);
    assert_eq!(crate_position(runtime.level()), Some(2));

    // Spawn, move, move.
    let level = runtime.level_mut();
    assert_eq!(level.history.undo_depth(), 3);
    assert!(level.undo().unwrap());
    assert_eq!(crate_position(level), Some(1));
    assert!(level.undo().unwrap());
    assert!(level.undo().unwrap());
    assert_eq!(crate_position(level), None);
    assert!(level.redo().unwrap());
    assert_eq!(crate_position(level), Some(0));
}

#[test]
fn test_tick_all_runs_in_configuration_order() {
    let mut runtime = runtime();
    let stats = runtime.tick_all();

    let families: Vec<_> = stats.iter().map(|stats| stats.family.as_str()).collect();
    assert_eq!(families, ["fixed", "frame"]);
    assert_eq!(trace_of(&runtime), ["clock@0", "spawner", "mover"]);
}

#[test]
fn test_shutdown_runs_in_reverse() {
    let mut runtime = runtime();
    runtime.tick_all();
    runtime.shutdown();

    let trace = trace_of(&runtime);
    assert_eq!(
        &trace[3..],
        ["mover:shutdown", "spawner:shutdown", "clock:shutdown"]
    );
    assert!(!runtime.schedule(&Family::from("frame")).unwrap().is_started());

    // Ticking again starts fresh systems; the tick counter keeps going.
    let stats = runtime.tick(&Family::from("fixed")).unwrap();
    assert_eq!(stats.tick, 1);
}

#[test]
fn test_unknown_family_is_rejected() {
    let mut runtime = runtime();
    let result = runtime.tick(&Family::from("physics"));
    assert!(matches!(
        result,
        Err(RuntimeError::UnknownFamily(family)) if family.as_str() == "physics"
    ));
}

#[test]
fn test_inconsistent_manifest_order_aborts() {
    let config = RuntimeConfig::from_toml_str(
        r#"
        [schedule.families.frame]
        order = ["mover", "spawner"]
        "#,
    )
    .unwrap();

    let result = Runtime::new(config, components(), &systems());
    assert!(matches!(
        result,
        Err(RuntimeError::Schedule(ScheduleError::OrderViolation { .. }))
    ));
}

#[test]
fn test_manifest_order_must_match_tags() {
    let config = RuntimeConfig::from_toml_str(
        r#"
        [schedule.families.frame]
        tags = ["playing"]
        order = ["spawner", "mover"]
        "#,
    )
    .unwrap();

    let result = Runtime::new(config, components(), &systems());
    assert!(matches!(
        result,
        Err(RuntimeError::Schedule(ScheduleError::InactiveSystem { system, .. }))
            if system == "spawner"
    ));

    let config = RuntimeConfig::from_toml_str(
        r#"
        [schedule.families.frame]
        tags = ["playing"]
        order = ["mover"]
        "#,
    )
    .unwrap();
    let runtime = Runtime::new(config, components(), &systems()).unwrap();
    let frame = runtime.schedule(&Family::from("frame")).unwrap();
    assert_eq!(frame.order(), ["mover"]);
}

#[test]
fn test_invalid_registry_aborts() {
    let mut systems = systems();
    systems
        .register(SystemDescriptor::of::<Clock>("late", "frame").after("ghost"))
        .unwrap();

    let result = Runtime::new(RuntimeConfig::default(), components(), &systems);
    assert!(matches!(
        result,
        Err(RuntimeError::Schedule(ScheduleError::UnknownSystem { .. }))
    ));
}

#[test]
fn test_zero_capacity_aborts() {
    let config = RuntimeConfig::from_toml_str("[history]\ncapacity = 0\n").unwrap();
    let result = Runtime::new(config, components(), &systems());
    assert!(matches!(
        result,
        Err(RuntimeError::History(HistoryError::InvalidCapacity))
    ));
}

#[test]
fn test_missing_config_file() {
    let result = Runtime::from_config_file("/nonexistent/mosaic.toml", components(), &systems());
    assert!(matches!(
        result,
        Err(RuntimeError::Config(ConfigError::Io { .. }))
    ));
}
