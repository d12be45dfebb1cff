//! # Entity Store
//!
//! A small, statically typed entity/component store.
//!
//! ## Design Philosophy
//!
//! - Entity IDs are simple indices with generation counters
//! - Components live in one sparse storage per type, keyed by `TypeId`
//! - Singleton values share the world but belong to no entity
//! - No reflection: type-erased access is layered on top by the registry

mod entity;
mod storage;
mod world;

pub use entity::Entity;
pub use storage::ComponentStorage;
pub use world::World;
