//! # MOSAIC
//!
//! Entity runtime integrating the units:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Runtime                              │
//! │                                                              │
//! │   ┌──────────────────────────┐    ┌──────────────────────┐   │
//! │   │ Level                    │    │ Schedules            │   │
//! │   │  • World (mosaic_core)   │<───│  one per family      │   │
//! │   │  • ComponentRegistry     │    │  (mosaic_schedule)   │   │
//! │   │  • History               │    └──────────────────────┘   │
//! │   │    (mosaic_history)      │                               │
//! │   └──────────────────────────┘                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML runtime configuration
//! - `level`: world, registry and history bundled as system state
//! - `runtime`: schedule construction, ticking and teardown

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod level;
pub mod runtime;

// Re-export the units
pub use mosaic_core as core;
pub use mosaic_history as history;
pub use mosaic_schedule as schedule;

// Re-export commonly used types
pub use config::{ConfigError, RuntimeConfig};
pub use level::Level;
pub use runtime::{Runtime, RuntimeError, RuntimeResult, TickStats, SLOW_TICK};
