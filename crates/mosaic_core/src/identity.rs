//! # Durable Keys
//!
//! [`Entity`] handles die with their entity. Edit history destroys and
//! recreates entities, so anything that must outlive that cycle names entities
//! by [`DurableKey`] instead.
//!
//! Keys are attached to their entity as an ordinary component and indexed by
//! the [`Identities`] singleton stored in the [`World`]. The index is only a
//! lookup accelerator: [`World::resolve_key`] re-checks that the entity is
//! alive and still carries the key, so a plain [`World::despawn`] can never
//! make it hand out a stale entity.

use std::collections::HashMap;
use std::fmt;

use crate::ecs::{Entity, World};

/// Fallback prefix for keys derived from an empty name hint.
const DEFAULT_HINT: &str = "entity";

/// A process-unique, human-meaningful entity name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DurableKey(String);

impl DurableKey {
    /// Wraps `key` without checking for uniqueness.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DurableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DurableKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Index from durable key to the entity currently carrying it.
#[derive(Debug, Default)]
pub struct Identities {
    by_key: HashMap<DurableKey, Entity>,
}

impl Identities {
    /// Returns the number of bound keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns `true` if no key is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Returns `true` if `key` is bound.
    #[must_use]
    pub fn contains(&self, key: &DurableKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Binds `key` to `entity`, returning the previously bound entity.
    pub fn bind(&mut self, key: DurableKey, entity: Entity) -> Option<Entity> {
        self.by_key.insert(key, entity)
    }

    /// Unbinds `key`, returning the entity it was bound to.
    pub fn unbind(&mut self, key: &DurableKey) -> Option<Entity> {
        self.by_key.remove(key)
    }

    /// Returns the entity bound to `key`, without liveness checks.
    #[must_use]
    pub fn get(&self, key: &DurableKey) -> Option<Entity> {
        self.by_key.get(key).copied()
    }
}

impl World {
    /// Spawns an entity carrying `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` already names a live entity.
    pub fn spawn_keyed(&mut self, key: DurableKey) -> Entity {
        assert!(
            self.resolve_key(&key).is_none(),
            "durable key `{key}` is already in use"
        );
        let entity = self.spawn();
        self.insert(entity, key.clone());
        self.singleton_or_default::<Identities>().bind(key, entity);
        entity
    }

    /// Spawns an entity keyed by [`unique_key`](Self::unique_key)`(hint)`.
    pub fn spawn_named(&mut self, hint: &str) -> Entity {
        let key = self.unique_key(hint);
        self.spawn_keyed(key)
    }

    /// Derives a key no live entity carries from `hint`.
    ///
    /// Returns `hint` itself when free, otherwise the first free `hint_N`
    /// for `N = 1, 2, ...`. Keys left behind by dead entities count as free.
    #[must_use]
    pub fn unique_key(&self, hint: &str) -> DurableKey {
        let hint = if hint.is_empty() { DEFAULT_HINT } else { hint };
        let candidate = DurableKey::new(hint);
        if self.resolve_key(&candidate).is_none() {
            return candidate;
        }
        (1u64..)
            .map(|n| DurableKey::new(format!("{hint}_{n}")))
            .find(|key| self.resolve_key(key).is_none())
            .unwrap_or(candidate)
    }

    /// Despawns `entity` and releases its durable key.
    ///
    /// Returns `false` if the entity was already dead or stale.
    pub fn despawn_keyed(&mut self, entity: Entity) -> bool {
        if let Some(key) = self.remove::<DurableKey>(entity) {
            if let Some(identities) = self.singleton_mut::<Identities>() {
                if identities.get(&key) == Some(entity) {
                    identities.unbind(&key);
                }
            }
        }
        self.despawn(entity)
    }

    /// Returns the durable key carried by `entity`.
    #[must_use]
    pub fn durable_key(&self, entity: Entity) -> Option<&DurableKey> {
        self.get::<DurableKey>(entity)
    }

    /// Resolves `key` to the live entity carrying it.
    #[must_use]
    pub fn resolve_key(&self, key: &DurableKey) -> Option<Entity> {
        let entity = self.singleton::<Identities>()?.get(key)?;
        (self.durable_key(entity) == Some(key)).then_some(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_key_deduplicates() {
        let mut world = World::new();
        let a = world.spawn_named("Crate");
        let b = world.spawn_named("Crate");
        let c = world.spawn_named("Crate");

        assert_eq!(world.durable_key(a).unwrap().as_str(), "Crate");
        assert_eq!(world.durable_key(b).unwrap().as_str(), "Crate_1");
        assert_eq!(world.durable_key(c).unwrap().as_str(), "Crate_2");
    }

    #[test]
    fn test_empty_hint_uses_default() {
        let mut world = World::new();
        let e = world.spawn_named("");
        assert_eq!(world.durable_key(e).unwrap().as_str(), "entity");
    }

    #[test]
    fn test_resolve_survives_recreate() {
        let mut world = World::new();
        let key = DurableKey::from("Door");
        let first = world.spawn_keyed(key.clone());
        assert_eq!(world.resolve_key(&key), Some(first));

        assert!(world.despawn_keyed(first));
        assert_eq!(world.resolve_key(&key), None);

        let second = world.spawn_keyed(key.clone());
        assert_eq!(world.resolve_key(&key), Some(second));
        assert!(!world.is_alive(first));
    }

    #[test]
    fn test_plain_despawn_never_resolves_stale() {
        let mut world = World::new();
        let key = DurableKey::from("Lamp");
        let e = world.spawn_keyed(key.clone());
        world.despawn(e);
        assert_eq!(world.resolve_key(&key), None);

        // The key can be reused even though the index still holds a stale entry.
        let again = world.spawn_keyed(key.clone());
        assert_eq!(world.resolve_key(&key), Some(again));
    }

    #[test]
    fn test_unique_key_ignores_dead_entities() {
        let mut world = World::new();
        let lamp = world.spawn_named("Lamp");
        world.despawn(lamp);

        assert_eq!(world.unique_key("Lamp").as_str(), "Lamp");
        let again = world.spawn_named("Lamp");
        assert_eq!(world.durable_key(again).unwrap().as_str(), "Lamp");
        assert_eq!(world.unique_key("Lamp").as_str(), "Lamp_1");
    }

    #[test]
    #[should_panic(expected = "already in use")]
    fn test_duplicate_live_key_panics() {
        let mut world = World::new();
        world.spawn_keyed(DurableKey::from("Twin"));
        world.spawn_keyed(DurableKey::from("Twin"));
    }
}
