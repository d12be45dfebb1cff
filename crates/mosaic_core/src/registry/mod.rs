//! # Component Type Registry
//!
//! Maps a runtime [`TypeToken`] to the [`ComponentDescriptor`] built for that
//! type, and dispatches generic operations through it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut registry = ComponentRegistry::new();
//! registry.register(
//!     ComponentType::<Position>::new()
//!         .named("Position")
//!         .default_constructible()
//!         .copyable(),
//! );
//!
//! let value = registry.construct(TypeToken::of::<Position>());
//! registry.assign(&mut world, entity, value);
//! ```
//!
//! ## Failure model
//!
//! Misuse is a programming error and panics: registering a type twice,
//! touching an unregistered type, or using a capability the type was
//! registered without. Predicates never panic and report `false` for
//! unregistered types.

mod descriptor;
mod value;

pub use descriptor::{ComponentDescriptor, ComponentType};
pub use value::{ComponentValue, TypeToken};

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::ecs::{Entity, World};

/// Registry of component type descriptors.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    descriptors: HashMap<TypeId, ComponentDescriptor>,
    /// Registration order, for deterministic iteration.
    order: Vec<TypeId>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component type.
    ///
    /// # Panics
    ///
    /// Panics if the type is already registered or the descriptor breaks a
    /// slot pairing rule.
    pub fn register<T: 'static>(&mut self, component: ComponentType<T>) {
        let descriptor = component.into_descriptor();
        descriptor.assert_consistent();

        let token = descriptor.token();
        assert!(
            !self.descriptors.contains_key(&token.type_id()),
            "component type `{token}` registered twice"
        );

        tracing::debug!(
            component = token.rust_name(),
            name = descriptor.name(),
            editable = descriptor.is_editable(),
            attachable = descriptor.is_attachable(),
            "Registered component type"
        );

        self.order.push(token.type_id());
        self.descriptors.insert(token.type_id(), descriptor);
    }

    /// Returns the number of registered types.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no type is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the descriptor for `token`, if registered.
    #[must_use]
    pub fn get_descriptor(&self, token: TypeToken) -> Option<&ComponentDescriptor> {
        self.descriptors.get(&token.type_id())
    }

    /// Returns the descriptor for `token`.
    ///
    /// # Panics
    ///
    /// Panics if the type is not registered.
    #[must_use]
    pub fn descriptor(&self, token: TypeToken) -> &ComponentDescriptor {
        self.get_descriptor(token)
            .unwrap_or_else(|| panic!("component type `{token}` is not registered"))
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Returns the declared display name of `token`, or `fallback`.
    #[must_use]
    pub fn display_name<'a>(&self, token: TypeToken, fallback: &'a str) -> &'a str {
        match self.get_descriptor(token).and_then(ComponentDescriptor::name) {
            Some(name) => name,
            None => fallback,
        }
    }

    /// Returns `true` if `token` is registered.
    #[must_use]
    pub fn is_registered(&self, token: TypeToken) -> bool {
        self.descriptors.contains_key(&token.type_id())
    }

    /// Returns `true` if `token` can be default-constructed.
    #[must_use]
    pub fn is_default_constructible(&self, token: TypeToken) -> bool {
        self.check(token, ComponentDescriptor::is_default_constructible)
    }

    /// Returns `true` if `token` can be copy-constructed.
    #[must_use]
    pub fn is_copy_constructible(&self, token: TypeToken) -> bool {
        self.check(token, ComponentDescriptor::is_copy_constructible)
    }

    /// Returns `true` if `token` can be move-constructed.
    #[must_use]
    pub fn is_move_constructible(&self, token: TypeToken) -> bool {
        self.check(token, ComponentDescriptor::is_move_constructible)
    }

    /// Returns `true` if `token` can be copy-assigned onto an entity.
    #[must_use]
    pub fn is_copy_assignable(&self, token: TypeToken) -> bool {
        self.check(token, ComponentDescriptor::is_copy_assignable)
    }

    /// Returns `true` if `token` can be move-assigned onto an entity.
    #[must_use]
    pub fn is_move_assignable(&self, token: TypeToken) -> bool {
        self.check(token, ComponentDescriptor::is_move_assignable)
    }

    /// Returns `true` if `token` is hidden from tooling.
    #[must_use]
    pub fn is_ignored(&self, token: TypeToken) -> bool {
        self.check(token, ComponentDescriptor::is_ignored)
    }

    /// Returns `true` if `token` is exposed to property editing, preset
    /// capture and level serialization.
    #[must_use]
    pub fn is_editable(&self, token: TypeToken) -> bool {
        self.check(token, ComponentDescriptor::is_editable)
    }

    /// Returns `true` if `token` can be attached to an entity.
    #[must_use]
    pub fn is_attachable(&self, token: TypeToken) -> bool {
        self.check(token, ComponentDescriptor::is_attachable)
    }

    fn check(&self, token: TypeToken, predicate: fn(&ComponentDescriptor) -> bool) -> bool {
        self.get_descriptor(token).is_some_and(predicate)
    }

    /// Visits every registered type once, in registration order.
    pub fn each_registered(&self, mut visit: impl FnMut(&ComponentDescriptor)) {
        for descriptor in self.iter() {
            visit(descriptor);
        }
    }

    /// Visits every editable type once, in registration order.
    pub fn each_editable(&self, mut visit: impl FnMut(&ComponentDescriptor)) {
        for descriptor in self.iter().filter(|descriptor| descriptor.is_editable()) {
            visit(descriptor);
        }
    }

    /// Iterates over descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDescriptor> + '_ {
        self.order.iter().filter_map(|id| self.descriptors.get(id))
    }

    // =========================================================================
    // Value operations
    // =========================================================================

    /// Default-constructs an owned value of `token`.
    ///
    /// # Panics
    ///
    /// Panics if the type is unregistered or not default-constructible.
    #[must_use]
    pub fn construct(&self, token: TypeToken) -> ComponentValue<'static> {
        let construct = self
            .descriptor(token)
            .construct
            .unwrap_or_else(|| panic!("`{token}` is not default-constructible"));
        ComponentValue::from_box(token, construct())
    }

    /// Copies `value` into a new owned value.
    ///
    /// # Panics
    ///
    /// Panics if the type is unregistered or not copy-constructible.
    #[must_use]
    pub fn copy(&self, value: &ComponentValue<'_>) -> ComponentValue<'static> {
        let token = value.token();
        let copy = self
            .descriptor(token)
            .copy
            .unwrap_or_else(|| panic!("`{token}` is not copy-constructible"));
        ComponentValue::from_box(token, copy(value.as_any()))
    }

    /// Moves an owned `value` into a new owned value.
    ///
    /// # Panics
    ///
    /// Panics if the type is unregistered, not move-constructible, or `value`
    /// is borrowed.
    #[must_use]
    pub fn move_value(&self, value: ComponentValue<'_>) -> ComponentValue<'static> {
        let token = value.token();
        let move_fn = self
            .descriptor(token)
            .move_value
            .unwrap_or_else(|| panic!("`{token}` is not move-constructible"));
        match value.into_box() {
            Ok(payload) => ComponentValue::from_box(token, move_fn(payload)),
            Err(_) => panic!("cannot move out of a borrowed `{token}`"),
        }
    }

    /// Moves `value` when it is owned and movable, copies it otherwise.
    ///
    /// # Panics
    ///
    /// Panics if the type is unregistered or neither path is available.
    #[must_use]
    pub fn move_or_copy(&self, value: ComponentValue<'_>) -> ComponentValue<'static> {
        if value.is_owned() && self.is_move_constructible(value.token()) {
            self.move_value(value)
        } else {
            self.copy(&value)
        }
    }

    // =========================================================================
    // Entity Store bindings
    // =========================================================================

    /// Attaches `value` to `entity`, overwriting any present component.
    ///
    /// Owned values are moved in when the type is move-assignable; borrowed
    /// values are copied.
    ///
    /// # Panics
    ///
    /// Panics if the type is unregistered, lacks the needed assignment
    /// capability, or `entity` is dead.
    pub fn assign(&self, world: &mut World, entity: Entity, value: ComponentValue<'_>) {
        let token = value.token();
        let descriptor = self.descriptor(token);
        let value = match descriptor.assign_move {
            Some(assign_move) => match value.into_box() {
                Ok(payload) => return assign_move(world, entity, payload),
                Err(borrowed) => borrowed,
            },
            None => value,
        };
        let assign_copy = descriptor
            .assign_copy
            .unwrap_or_else(|| panic!("`{token}` cannot be assigned from this value"));
        assign_copy(world, entity, value.as_any());
    }

    /// Attaches a default-constructed `token` component to `entity`.
    ///
    /// # Panics
    ///
    /// Panics if the type is unregistered, not default-constructible, or not
    /// attachable.
    pub fn assign_default(&self, world: &mut World, entity: Entity, token: TypeToken) {
        let assign_default = self
            .attachable(token)
            .assign_default
            .unwrap_or_else(|| panic!("`{token}` is not default-constructible"));
        assign_default(world, entity);
    }

    /// Overwrites the component `entity` already carries with `value`.
    ///
    /// # Panics
    ///
    /// Panics if the component is absent, the type is unregistered, or it
    /// lacks the needed capability.
    pub fn replace(&self, world: &mut World, entity: Entity, value: ComponentValue<'_>) {
        let token = value.token();
        let descriptor = self.descriptor(token);
        let value = match descriptor.replace_move {
            Some(replace_move) => match value.into_box() {
                Ok(payload) => return replace_move(world, entity, payload),
                Err(borrowed) => borrowed,
            },
            None => value,
        };
        let replace_copy = descriptor
            .replace_copy
            .unwrap_or_else(|| panic!("`{token}` cannot be replaced from this value"));
        replace_copy(world, entity, value.as_any());
    }

    /// Detaches the `token` component from `entity` and returns it.
    #[must_use = "the removed component is returned"]
    pub fn remove(
        &self,
        world: &mut World,
        entity: Entity,
        token: TypeToken,
    ) -> Option<ComponentValue<'static>> {
        let remove = self.descriptor(token).remove;
        remove(world, entity).map(|payload| ComponentValue::from_box(token, payload))
    }

    /// Returns `true` if `entity` carries a `token` component.
    #[must_use]
    pub fn has(&self, world: &World, entity: Entity, token: TypeToken) -> bool {
        (self.descriptor(token).has)(world, entity)
    }

    /// Borrows the `token` component of `entity`.
    #[must_use]
    pub fn get<'w>(
        &self,
        world: &'w World,
        entity: Entity,
        token: TypeToken,
    ) -> Option<ComponentValue<'w>> {
        let get = self.descriptor(token).get;
        get(world, entity).map(|payload| ComponentValue::from_ref(token, payload))
    }

    /// Borrows the `token` component of `entity` mutably.
    pub fn get_mut<'w>(
        &self,
        world: &'w mut World,
        entity: Entity,
        token: TypeToken,
    ) -> Option<&'w mut dyn Any> {
        let get_mut = self.descriptor(token).get_mut;
        get_mut(world, entity)
    }

    /// Returns the `token` component of `entity`, default-assigning it first if
    /// absent.
    ///
    /// # Panics
    ///
    /// Panics if the type is unregistered, not default-constructible, or not
    /// attachable.
    pub fn get_or_assign<'w>(
        &self,
        world: &'w mut World,
        entity: Entity,
        token: TypeToken,
    ) -> &'w mut dyn Any {
        let get_or_assign = self
            .attachable(token)
            .get_or_assign
            .unwrap_or_else(|| panic!("`{token}` is not default-constructible"));
        get_or_assign(world, entity)
    }

    /// Copies every editable component present on `entity`, in registration
    /// order.
    #[must_use]
    pub fn snapshot_editable(
        &self,
        world: &World,
        entity: Entity,
    ) -> Vec<ComponentValue<'static>> {
        self.iter()
            .filter(|descriptor| descriptor.is_editable())
            .filter_map(|descriptor| {
                let token = descriptor.token();
                let copy = descriptor.copy?;
                (descriptor.get)(world, entity)
                    .map(|current| ComponentValue::from_box(token, copy(current)))
            })
            .collect()
    }

    fn attachable(&self, token: TypeToken) -> &ComponentDescriptor {
        let descriptor = self.descriptor(token);
        assert!(
            descriptor.is_attachable(),
            "`{token}` cannot be attached to an entity"
        );
        descriptor
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(ComponentDescriptor::token))
            .finish()
    }
}
