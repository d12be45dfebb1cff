//! # Generic Component Values
//!
//! A [`ComponentValue`] carries one component across the type-erasure
//! boundary: a [`TypeToken`] plus either a borrow of a live component or an
//! owned, heap-held instance.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime token identifying a component type.
///
/// Equality and hashing use the `TypeId` only; the Rust type name is kept for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct TypeToken {
    id: TypeId,
    rust_name: &'static str,
}

impl TypeToken {
    /// Returns the token for `T`.
    #[inline]
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            rust_name: std::any::type_name::<T>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[inline]
    #[must_use]
    pub const fn type_id(self) -> TypeId {
        self.id
    }

    /// Returns the full Rust type name.
    #[inline]
    #[must_use]
    pub const fn rust_name(self) -> &'static str {
        self.rust_name
    }

    /// Returns `true` if this token identifies `T`.
    #[inline]
    #[must_use]
    pub fn is<T: 'static>(self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl Hash for TypeToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_name)
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_name)
    }
}

enum Storage<'a> {
    Borrowed(&'a dyn Any),
    Owned(Box<dyn Any>),
}

/// A type-erased component: a [`TypeToken`] paired with a borrowed or owned
/// payload.
///
/// The token always names the exact type of the payload. The typed
/// constructors enforce this, and the registry only builds values from the
/// function table registered for the token.
pub struct ComponentValue<'a> {
    token: TypeToken,
    storage: Storage<'a>,
}

impl ComponentValue<'static> {
    /// Wraps an owned component.
    #[must_use]
    pub fn owned<T: 'static>(value: T) -> Self {
        Self {
            token: TypeToken::of::<T>(),
            storage: Storage::Owned(Box::new(value)),
        }
    }

    /// Builds an owned value from a box produced by `token`'s function table.
    pub(crate) fn from_box(token: TypeToken, value: Box<dyn Any>) -> Self {
        debug_assert_eq!(
            Any::type_id(value.as_ref()),
            token.type_id(),
            "payload does not match {token}"
        );
        Self {
            token,
            storage: Storage::Owned(value),
        }
    }
}

impl<'a> ComponentValue<'a> {
    /// Wraps a borrowed component.
    #[must_use]
    pub fn borrowed<T: 'static>(value: &'a T) -> Self {
        Self {
            token: TypeToken::of::<T>(),
            storage: Storage::Borrowed(value),
        }
    }

    /// Builds a borrowed value from a reference produced by `token`'s
    /// function table.
    pub(crate) fn from_ref(token: TypeToken, value: &'a dyn Any) -> Self {
        debug_assert_eq!(
            Any::type_id(value),
            token.type_id(),
            "payload does not match {token}"
        );
        Self {
            token,
            storage: Storage::Borrowed(value),
        }
    }

    /// Returns the type token.
    #[inline]
    #[must_use]
    pub const fn token(&self) -> TypeToken {
        self.token
    }

    /// Returns `true` if the payload is owned.
    #[inline]
    #[must_use]
    pub const fn is_owned(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    /// Returns the payload as `&dyn Any`.
    #[must_use]
    pub fn as_any(&self) -> &dyn Any {
        match &self.storage {
            Storage::Borrowed(value) => *value,
            Storage::Owned(value) => value.as_ref(),
        }
    }

    /// Returns the payload as `&T` if the token names `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Unwraps an owned payload of type `T`.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged if the payload is borrowed or not a `T`.
    pub fn into_inner<T: 'static>(self) -> Result<T, Self> {
        let token = self.token;
        match self.into_box() {
            Ok(value) => match value.downcast::<T>() {
                Ok(value) => Ok(*value),
                Err(value) => Err(ComponentValue::from_box(token, value)),
            },
            Err(borrowed) => Err(borrowed),
        }
    }

    /// Takes the owned payload, or returns `self` if it is borrowed.
    pub(crate) fn into_box(self) -> Result<Box<dyn Any>, Self> {
        match self.storage {
            Storage::Owned(value) => Ok(value),
            Storage::Borrowed(_) => Err(self),
        }
    }
}

impl fmt::Debug for ComponentValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentValue")
            .field("type", &self.token)
            .field("owned", &self.is_owned())
            .finish()
    }
}
