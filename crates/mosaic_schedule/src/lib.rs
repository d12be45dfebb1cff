//! # MOSAIC Schedule
//!
//! Dependency-ordered execution of per-tick logic.
//!
//! ## Model
//!
//! - A **system** belongs to exactly one **family** ("frame", "fixed")
//! - Tag predicates decide whether it runs in a given context
//! - `before`/`after` constraints order it against systems of its family
//! - The registry validates everything up front; a schedule is only ever
//!   built from a consistent registry
//!
//! ## Example
//!
//! ```rust,ignore
//! use mosaic_schedule::{Family, SystemDescriptor, SystemRegistry, TagSet};
//!
//! let mut registry = SystemRegistry::<Level>::new();
//! registry.register(SystemDescriptor::of::<Input>("input", "frame"))?;
//! registry.register(SystemDescriptor::of::<Render>("render", "frame").after("input"))?;
//!
//! let mut schedule = registry.build(&Family::from("frame"), &TagSet::new())?;
//! schedule.tick(&mut level);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod context;
pub mod error;
mod graph;
pub mod manifest;
pub mod registry;
pub mod schedule;
pub mod system;
pub mod tag;

pub use context::ExecutionContext;
pub use error::{ScheduleError, ScheduleResult};
pub use manifest::{FamilyManifest, ScheduleManifest};
pub use registry::SystemRegistry;
pub use schedule::Schedule;
pub use system::{System, SystemDescriptor, SystemFactory};
pub use tag::{Family, Tag, TagSet};
