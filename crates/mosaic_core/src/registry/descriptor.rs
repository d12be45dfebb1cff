//! # Component Type Descriptors
//!
//! A [`ComponentDescriptor`] is the function table for one component type:
//! every slot is a plain `fn` pointer monomorphised for that type, or `None`
//! when the type lacks the capability.
//!
//! Capabilities are captured where the concrete type is known, through the
//! [`ComponentType`] builder. `default_constructible()` only exists when
//! `T: Default` and `copyable()` only when `T: Clone`, so the compiler refuses
//! to bind a capability the type does not have.
//!
//! ## Slot pairing
//!
//! Slots are bound in groups so the pairing invariants hold by construction:
//! - construct, assign-default and get-or-assign come from `Default`
//! - copy, assign-copy and replace-copy come from `Clone`
//! - move, assign-move and replace-move come from ordinary Rust moves

use std::any::{type_name, Any};
use std::marker::PhantomData;

use super::value::TypeToken;
use crate::ecs::{Entity, World};

pub(crate) type ConstructFn = fn() -> Box<dyn Any>;
pub(crate) type CopyFn = fn(&dyn Any) -> Box<dyn Any>;
pub(crate) type MoveFn = fn(Box<dyn Any>) -> Box<dyn Any>;
pub(crate) type AssignDefaultFn = fn(&mut World, Entity);
pub(crate) type AssignCopyFn = fn(&mut World, Entity, &dyn Any);
pub(crate) type AssignMoveFn = fn(&mut World, Entity, Box<dyn Any>);
pub(crate) type RemoveFn = fn(&mut World, Entity) -> Option<Box<dyn Any>>;
pub(crate) type HasFn = fn(&World, Entity) -> bool;
pub(crate) type GetFn = fn(&World, Entity) -> Option<&dyn Any>;
pub(crate) type GetMutFn = fn(&mut World, Entity) -> Option<&mut dyn Any>;
pub(crate) type GetOrAssignFn = fn(&mut World, Entity) -> &mut dyn Any;

/// Function table and metadata for one registered component type.
#[derive(Clone)]
pub struct ComponentDescriptor {
    pub(crate) token: TypeToken,
    pub(crate) name: Option<&'static str>,
    pub(crate) ignored: bool,

    pub(crate) construct: Option<ConstructFn>,
    pub(crate) copy: Option<CopyFn>,
    pub(crate) move_value: Option<MoveFn>,

    pub(crate) assign_default: Option<AssignDefaultFn>,
    pub(crate) assign_copy: Option<AssignCopyFn>,
    pub(crate) assign_move: Option<AssignMoveFn>,
    pub(crate) replace_copy: Option<AssignCopyFn>,
    pub(crate) replace_move: Option<AssignMoveFn>,
    pub(crate) get_or_assign: Option<GetOrAssignFn>,

    pub(crate) remove: RemoveFn,
    pub(crate) has: HasFn,
    pub(crate) get: GetFn,
    pub(crate) get_mut: GetMutFn,
}

impl ComponentDescriptor {
    /// Returns the type token.
    #[inline]
    #[must_use]
    pub const fn token(&self) -> TypeToken {
        self.token
    }

    /// Returns the declared display name, if any.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// Returns `true` if the type is hidden from tooling.
    #[inline]
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Returns `true` if the type can be default-constructed.
    #[inline]
    #[must_use]
    pub const fn is_default_constructible(&self) -> bool {
        self.construct.is_some()
    }

    /// Returns `true` if the type can be copy-constructed.
    #[inline]
    #[must_use]
    pub const fn is_copy_constructible(&self) -> bool {
        self.copy.is_some()
    }

    /// Returns `true` if the type can be move-constructed.
    #[inline]
    #[must_use]
    pub const fn is_move_constructible(&self) -> bool {
        self.move_value.is_some()
    }

    /// Returns `true` if the type can be copy-assigned onto an entity.
    #[inline]
    #[must_use]
    pub const fn is_copy_assignable(&self) -> bool {
        self.assign_copy.is_some()
    }

    /// Returns `true` if the type can be move-assigned onto an entity.
    #[inline]
    #[must_use]
    pub const fn is_move_assignable(&self) -> bool {
        self.assign_move.is_some()
    }

    /// Returns `true` if the type can be attached to an entity at all.
    #[inline]
    #[must_use]
    pub const fn is_attachable(&self) -> bool {
        self.is_copy_assignable() || self.is_move_assignable()
    }

    /// Returns `true` if the type is exposed to property editing, preset
    /// capture and level serialization.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        self.name.is_some()
            && !self.ignored
            && self.is_default_constructible()
            && self.is_copy_constructible()
            && self.is_copy_assignable()
    }

    /// Checks the slot pairing invariants.
    ///
    /// # Panics
    ///
    /// Panics if a paired slot is bound without its partner.
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(
            self.assign_default.is_some(),
            self.get_or_assign.is_some(),
            "{}: assign-default and get-or-assign must be bound together",
            self.token
        );
        assert_eq!(
            self.assign_copy.is_some(),
            self.copy.is_some(),
            "{}: assign-copy and copy must be bound together",
            self.token
        );
        assert_eq!(
            self.assign_move.is_some(),
            self.move_value.is_some(),
            "{}: assign-move and move must be bound together",
            self.token
        );
    }
}

/// Builder capturing the capabilities of component type `T`.
///
/// # Example
///
/// ```rust,ignore
/// registry.register(
///     ComponentType::<Position>::new()
///         .named("Position")
///         .default_constructible()
///         .copyable(),
/// );
/// ```
pub struct ComponentType<T: 'static> {
    descriptor: ComponentDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> ComponentType<T> {
    /// Starts a descriptor for an attachable type: move and query slots bound.
    #[must_use]
    pub fn new() -> Self {
        let mut builder = Self::singleton();
        builder.descriptor.move_value = Some(move_impl::<T>);
        builder.descriptor.assign_move = Some(assign_move_impl::<T>);
        builder.descriptor.replace_move = Some(replace_move_impl::<T>);
        builder
    }

    /// Starts a descriptor for a singleton-only type.
    ///
    /// Nothing can be moved or assigned, so the type can never be attached to
    /// an entity; it may still live in the world as a singleton value.
    #[must_use]
    pub fn singleton() -> Self {
        Self {
            descriptor: ComponentDescriptor {
                token: TypeToken::of::<T>(),
                name: None,
                ignored: false,
                construct: None,
                copy: None,
                move_value: None,
                assign_default: None,
                assign_copy: None,
                assign_move: None,
                replace_copy: None,
                replace_move: None,
                get_or_assign: None,
                remove: remove_impl::<T>,
                has: has_impl::<T>,
                get: get_impl::<T>,
                get_mut: get_mut_impl::<T>,
            },
            _marker: PhantomData,
        }
    }

    /// Declares the display name shown to tooling.
    #[must_use]
    pub fn named(mut self, name: &'static str) -> Self {
        self.descriptor.name = Some(name);
        self
    }

    /// Hides the type from tooling even if it is otherwise editable.
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.descriptor.ignored = true;
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn into_descriptor(self) -> ComponentDescriptor {
        self.descriptor
    }
}

impl<T: Default + 'static> ComponentType<T> {
    /// Binds construct, assign-default and get-or-assign.
    #[must_use]
    pub fn default_constructible(mut self) -> Self {
        self.descriptor.construct = Some(construct_impl::<T>);
        self.descriptor.assign_default = Some(assign_default_impl::<T>);
        self.descriptor.get_or_assign = Some(get_or_assign_impl::<T>);
        self
    }
}

impl<T: Clone + 'static> ComponentType<T> {
    /// Binds copy, assign-copy and replace-copy.
    #[must_use]
    pub fn copyable(mut self) -> Self {
        self.descriptor.copy = Some(copy_impl::<T>);
        self.descriptor.assign_copy = Some(assign_copy_impl::<T>);
        self.descriptor.replace_copy = Some(replace_copy_impl::<T>);
        self
    }
}

impl<T: 'static> Default for ComponentType<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Slot implementations
// =============================================================================

fn downcast<T: 'static>(value: &dyn Any) -> &T {
    value
        .downcast_ref()
        .unwrap_or_else(|| panic!("component value is not a `{}`", type_name::<T>()))
}

fn downcast_box<T: 'static>(value: Box<dyn Any>) -> T {
    match value.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => panic!("component value is not a `{}`", type_name::<T>()),
    }
}

fn construct_impl<T: Default + 'static>() -> Box<dyn Any> {
    Box::new(T::default())
}

fn copy_impl<T: Clone + 'static>(source: &dyn Any) -> Box<dyn Any> {
    Box::new(downcast::<T>(source).clone())
}

fn move_impl<T: 'static>(source: Box<dyn Any>) -> Box<dyn Any> {
    Box::new(downcast_box::<T>(source))
}

fn assign_default_impl<T: Default + 'static>(world: &mut World, entity: Entity) {
    world.insert(entity, T::default());
}

fn assign_copy_impl<T: Clone + 'static>(world: &mut World, entity: Entity, source: &dyn Any) {
    world.insert(entity, downcast::<T>(source).clone());
}

fn assign_move_impl<T: 'static>(world: &mut World, entity: Entity, source: Box<dyn Any>) {
    world.insert(entity, downcast_box::<T>(source));
}

fn existing<T: 'static>(world: &mut World, entity: Entity) -> &mut T {
    world.get_mut::<T>(entity).unwrap_or_else(|| {
        panic!(
            "cannot replace `{}` on {entity}: component not present",
            type_name::<T>()
        )
    })
}

fn replace_copy_impl<T: Clone + 'static>(world: &mut World, entity: Entity, source: &dyn Any) {
    existing::<T>(world, entity).clone_from(downcast::<T>(source));
}

fn replace_move_impl<T: 'static>(world: &mut World, entity: Entity, source: Box<dyn Any>) {
    *existing::<T>(world, entity) = downcast_box::<T>(source);
}

fn remove_impl<T: 'static>(world: &mut World, entity: Entity) -> Option<Box<dyn Any>> {
    world
        .remove::<T>(entity)
        .map(|value| Box::new(value) as Box<dyn Any>)
}

fn has_impl<T: 'static>(world: &World, entity: Entity) -> bool {
    world.has::<T>(entity)
}

fn get_impl<T: 'static>(world: &World, entity: Entity) -> Option<&dyn Any> {
    world.get::<T>(entity).map(|value| value as &dyn Any)
}

fn get_mut_impl<T: 'static>(world: &mut World, entity: Entity) -> Option<&mut dyn Any> {
    world.get_mut::<T>(entity).map(|value| value as &mut dyn Any)
}

fn get_or_assign_impl<T: Default + 'static>(world: &mut World, entity: Entity) -> &mut dyn Any {
    world.get_or_insert_with(entity, T::default)
}
