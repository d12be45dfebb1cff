//! # Runtime
//!
//! Owns the level and one schedule per configured family.
//!
//! ```text
//! new       validate systems, build every schedule (any error aborts)
//! tick      run one family once, timed
//! shutdown  tear every schedule down, last built first
//! ```

use std::time::{Duration, Instant};

use mosaic_core::ComponentRegistry;
use mosaic_history::{History, HistoryError};
use mosaic_schedule::{Family, Schedule, ScheduleError, SystemRegistry};
use thiserror::Error;

use crate::config::{ConfigError, RuntimeConfig};
use crate::level::Level;

/// Tick time above which a warning is logged.
pub const SLOW_TICK: Duration = Duration::from_millis(33);

/// Errors raised by the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The system registry or a manifest order is inconsistent.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// The history could not be created.
    #[error(transparent)]
    History(#[from] HistoryError),

    /// No schedule was built for the family.
    #[error("no schedule for family `{0}`")]
    UnknownFamily(Family),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Timing of one family tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickStats {
    /// Family that ran.
    pub family: Family,
    /// Index of the tick, starting at 0.
    pub tick: u64,
    /// Systems updated.
    pub systems: usize,
    /// Wall time in microseconds.
    pub elapsed_us: u64,
}

/// A level plus the schedules that drive it.
pub struct Runtime {
    level: Level,
    schedules: Vec<Schedule<Level>>,
}

impl Runtime {
    /// Builds a runtime.
    ///
    /// Validates `systems`, then builds one schedule per family in
    /// `config.schedule`: from the manifest order when one is given,
    /// otherwise from the family's tags.
    ///
    /// # Errors
    ///
    /// Returns the first configuration or ordering error; nothing is
    /// constructed in that case.
    pub fn new(
        config: RuntimeConfig,
        registry: ComponentRegistry,
        systems: &SystemRegistry<Level>,
    ) -> RuntimeResult<Self> {
        systems.validate()?;
        let history = History::new(config.history)?;

        let schedules = config
            .schedule
            .families
            .iter()
            .map(|(family, manifest)| match &manifest.order {
                Some(order) => {
                    systems.build_from_order(family, &manifest.tags, order.as_slice())
                }
                None => systems.build(family, &manifest.tags),
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            families = schedules.len(),
            components = registry.len(),
            history_capacity = history.capacity(),
            "Runtime ready"
        );

        Ok(Self {
            level: Level::new(registry, history),
            schedules,
        })
    }

    /// Loads `path` and builds a runtime from it.
    ///
    /// # Errors
    ///
    /// See [`RuntimeConfig::from_file`] and [`Runtime::new`].
    pub fn from_config_file(
        path: impl AsRef<std::path::Path>,
        registry: ComponentRegistry,
        systems: &SystemRegistry<Level>,
    ) -> RuntimeResult<Self> {
        let config = RuntimeConfig::from_file(path)?;
        Self::new(config, registry, systems)
    }

    /// Runs one tick of `family`, starting its schedule on first use.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownFamily`] if no schedule was built
    /// for `family`.
    pub fn tick(&mut self, family: &Family) -> RuntimeResult<TickStats> {
        let Self { level, schedules } = self;
        let schedule = schedules
            .iter_mut()
            .find(|schedule| schedule.family() == family)
            .ok_or_else(|| RuntimeError::UnknownFamily(family.clone()))?;
        Ok(run(schedule, level))
    }

    /// Runs one tick of every family, in configuration order.
    pub fn tick_all(&mut self) -> Vec<TickStats> {
        let Self { level, schedules } = self;
        schedules
            .iter_mut()
            .map(|schedule| run(schedule, level))
            .collect()
    }

    /// Shuts every schedule down, last built first.
    ///
    /// A later tick starts the schedule again with fresh systems.
    pub fn shutdown(&mut self) {
        let Self { level, schedules } = self;
        for schedule in schedules.iter_mut().rev() {
            schedule.shutdown(level);
        }
        tracing::info!("Runtime shut down");
    }

    /// Returns the level.
    #[inline]
    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Returns the level mutably.
    #[inline]
    #[must_use]
    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    /// Returns the schedule built for `family`.
    #[must_use]
    pub fn schedule(&self, family: &Family) -> Option<&Schedule<Level>> {
        self.schedules
            .iter()
            .find(|schedule| schedule.family() == family)
    }

    /// Returns the scheduled families in configuration order.
    pub fn families(&self) -> impl Iterator<Item = &Family> + '_ {
        self.schedules.iter().map(Schedule::family)
    }
}

fn run(schedule: &mut Schedule<Level>, level: &mut Level) -> TickStats {
    let tick = schedule.tick_count();
    let start = Instant::now();
    let systems = schedule.tick(level);
    let elapsed = start.elapsed();
    let elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);

    if elapsed > SLOW_TICK {
        tracing::warn!(family = %schedule.family(), tick, elapsed_us, "Slow tick");
    }

    TickStats {
        family: schedule.family().clone(),
        tick,
        systems,
        elapsed_us,
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("schedules", &self.schedules)
            .field("history", &self.level.history)
            .finish_non_exhaustive()
    }
}
