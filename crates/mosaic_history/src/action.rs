//! # Actions
//!
//! One reversible edit. Replaying an action applies its inverse to the world
//! and returns the action that reverses *that*, so undo and redo share a
//! single code path:
//!
//! ```text
//! CreateEntity     <->  DeleteEntity
//! AssignComponent  <->  RemoveComponent
//! ReplaceComponent <->  ReplaceComponent (with the overwritten value)
//! ```

use mosaic_core::{ComponentRegistry, ComponentValue, DurableKey, World};

use crate::error::HistoryError;

/// A recorded, reversible edit addressed by durable key.
#[derive(Debug)]
pub enum Action {
    /// An entity was created.
    CreateEntity {
        /// The created entity.
        key: DurableKey,
    },
    /// An entity was deleted.
    DeleteEntity {
        /// The deleted entity.
        key: DurableKey,
        /// Its editable components at deletion time.
        components: Vec<ComponentValue<'static>>,
    },
    /// A component was attached.
    AssignComponent {
        /// The target entity.
        key: DurableKey,
        /// Copy of the attached value.
        value: ComponentValue<'static>,
    },
    /// A component was detached.
    RemoveComponent {
        /// The target entity.
        key: DurableKey,
        /// The detached value.
        value: ComponentValue<'static>,
    },
    /// A component was overwritten.
    ReplaceComponent {
        /// The target entity.
        key: DurableKey,
        /// The value before the overwrite.
        value: ComponentValue<'static>,
    },
}

/// An action whose replay was refused, handed back untouched.
pub(crate) struct Rejected {
    pub(crate) action: Action,
    pub(crate) error: HistoryError,
}

impl Action {
    /// Returns the durable key of the target entity.
    #[must_use]
    pub fn key(&self) -> &DurableKey {
        match self {
            Self::CreateEntity { key }
            | Self::DeleteEntity { key, .. }
            | Self::AssignComponent { key, .. }
            | Self::RemoveComponent { key, .. }
            | Self::ReplaceComponent { key, .. } => key,
        }
    }

    /// Applies the inverse of this action and returns the action that
    /// reverses it.
    ///
    /// Preconditions are checked before the world is touched; a refused
    /// action comes back unchanged inside [`Rejected`].
    pub(crate) fn replay(
        self,
        world: &mut World,
        registry: &ComponentRegistry,
    ) -> Result<Self, Rejected> {
        match self {
            Self::CreateEntity { key } => {
                let Some(entity) = world.resolve_key(&key) else {
                    return Err(unresolved(Self::CreateEntity { key }));
                };
                let components = registry
                    .iter()
                    .filter(|descriptor| descriptor.is_editable())
                    .filter_map(|descriptor| registry.remove(world, entity, descriptor.token()))
                    .collect();
                world.despawn_keyed(entity);
                Ok(Self::DeleteEntity { key, components })
            }

            Self::DeleteEntity { key, components } => {
                if world.resolve_key(&key).is_some() {
                    let error = HistoryError::KeyInUse(key.clone());
                    return Err(Rejected {
                        action: Self::DeleteEntity { key, components },
                        error,
                    });
                }
                let entity = world.spawn_keyed(key.clone());
                for value in components {
                    registry.assign(world, entity, value);
                }
                Ok(Self::CreateEntity { key })
            }

            Self::AssignComponent { key, value } => {
                let Some(entity) = world.resolve_key(&key) else {
                    return Err(unresolved(Self::AssignComponent { key, value }));
                };
                match registry.remove(world, entity, value.token()) {
                    Some(removed) => Ok(Self::RemoveComponent {
                        key,
                        value: removed,
                    }),
                    None => {
                        let error = not_present(&key, &value);
                        Err(Rejected {
                            action: Self::AssignComponent { key, value },
                            error,
                        })
                    }
                }
            }

            Self::RemoveComponent { key, value } => {
                let Some(entity) = world.resolve_key(&key) else {
                    return Err(unresolved(Self::RemoveComponent { key, value }));
                };
                if registry.has(world, entity, value.token()) {
                    let error = HistoryError::AlreadyPresent {
                        key: key.clone(),
                        component: value.token().rust_name(),
                    };
                    return Err(Rejected {
                        action: Self::RemoveComponent { key, value },
                        error,
                    });
                }
                let saved = registry.copy(&value);
                registry.assign(world, entity, value);
                Ok(Self::AssignComponent { key, value: saved })
            }

            Self::ReplaceComponent { key, value } => {
                let Some(entity) = world.resolve_key(&key) else {
                    return Err(unresolved(Self::ReplaceComponent { key, value }));
                };
                let current = registry
                    .get(world, entity, value.token())
                    .map(|current| registry.copy(&current));
                match current {
                    Some(current) => {
                        registry.replace(world, entity, value);
                        Ok(Self::ReplaceComponent {
                            key,
                            value: current,
                        })
                    }
                    None => {
                        let error = not_present(&key, &value);
                        Err(Rejected {
                            action: Self::ReplaceComponent { key, value },
                            error,
                        })
                    }
                }
            }
        }
    }
}

fn unresolved(action: Action) -> Rejected {
    let error = HistoryError::UnresolvedKey(action.key().clone());
    Rejected { action, error }
}

fn not_present(key: &DurableKey, value: &ComponentValue<'_>) -> HistoryError {
    HistoryError::NotPresent {
        key: key.clone(),
        component: value.token().rust_name(),
    }
}
