//! # MOSAIC History
//!
//! Transactional, reversible edits over the entity store.
//!
//! ## Model
//!
//! - An **action** is one reversible edit, addressed by durable key
//! - A **change** groups the actions recorded between `begin` and `end`
//! - Undo replays a change backwards, inverting each action; the inverse
//!   change goes on the redo stack, and redo does the same in reverse
//!
//! Entity handles never enter the history: undo and redo destroy and
//! recreate entities, and only durable keys survive that.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mosaic_history::History;
//!
//! let mut history = History::default();
//!
//! history.begin("Add crate");
//! let entity = history.create_entity(&mut world, "Crate");
//! history.assign(&mut world, &registry, entity, Position { x: 1 })?;
//! history.end();
//!
//! history.perform_undo(&mut world, &registry)?;
//! history.perform_redo(&mut world, &registry)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod action;
pub mod change;
pub mod error;
pub mod history;

pub use action::Action;
pub use change::Change;
pub use error::{HistoryError, HistoryResult};
pub use history::{History, HistoryConfig, DEFAULT_CAPACITY};
