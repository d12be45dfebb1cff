//! # MOSAIC Core
//!
//! Entity store and type-erased component registry for the MOSAIC runtime.
//!
//! ## Layers
//!
//! 1. **Entity store** ([`ecs`]) - generational entities, one sparse storage
//!    per component type, singleton values
//! 2. **Identity** ([`identity`]) - durable keys that outlive destroy/recreate
//!    cycles
//! 3. **Registry** ([`registry`]) - a function table per component type, so
//!    tooling can construct, copy, move and attach components it only knows
//!    by [`TypeToken`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use mosaic_core::{ComponentRegistry, ComponentType, ComponentValue, World};
//!
//! let mut registry = ComponentRegistry::new();
//! registry.register(ComponentType::<Position>::new().named("Position").copyable());
//!
//! let mut world = World::new();
//! let door = world.spawn_named("Door");
//! registry.assign(&mut world, door, ComponentValue::owned(Position { x: 1 }));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod identity;
pub mod registry;

pub use ecs::{ComponentStorage, Entity, World};
pub use identity::{DurableKey, Identities};
pub use registry::{
    ComponentDescriptor, ComponentRegistry, ComponentType, ComponentValue, TypeToken,
};
