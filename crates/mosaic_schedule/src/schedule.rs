//! # Schedule
//!
//! A fixed, ordered list of systems for one family.
//!
//! ```text
//! startup   construct systems in order (once)
//! tick      update every system in order
//! shutdown  shutdown hooks in reverse order, then drop
//! ```
//!
//! Dropping a running schedule releases its systems in reverse order without
//! calling their shutdown hooks, which need the state.

use std::fmt;

use crate::context::ExecutionContext;
use crate::system::{System, SystemFactory};
use crate::tag::Family;

struct Slot<C> {
    factory: SystemFactory<C>,
    instance: Option<Box<dyn System<C>>>,
}

/// An ordered, constructed-on-demand list of systems.
pub struct Schedule<C> {
    family: Family,
    order: Vec<String>,
    slots: Vec<Slot<C>>,
    started: bool,
    tick: u64,
}

impl<C: 'static> Schedule<C> {
    pub(crate) fn new(family: Family, entries: Vec<(String, SystemFactory<C>)>) -> Self {
        let (order, slots): (Vec<String>, Vec<Slot<C>>) = entries
            .into_iter()
            .map(|(name, factory)| {
                (
                    name,
                    Slot {
                        factory,
                        instance: None,
                    },
                )
            })
            .unzip();
        Self {
            family,
            order,
            slots,
            started: false,
            tick: 0,
        }
    }

    /// Constructs every system in order. Does nothing if already started.
    pub fn startup(&mut self, state: &mut C) {
        if self.started {
            return;
        }
        for (name, slot) in self.order.iter().zip(&mut self.slots) {
            tracing::debug!(family = %self.family, system = %name, "Constructing system");
            slot.instance = Some((slot.factory)(state));
        }
        self.started = true;
        tracing::info!(
            family = %self.family,
            systems = self.order.len(),
            "Schedule started"
        );
    }

    /// Runs one tick, starting the schedule first if needed.
    ///
    /// # Returns
    ///
    /// The number of systems updated.
    pub fn tick(&mut self, state: &mut C) -> usize {
        self.startup(state);

        let Self {
            family,
            order,
            slots,
            tick,
            ..
        } = self;
        let (family, order) = (&*family, order.as_slice());

        let mut ran = 0;
        for (index, slot) in slots.iter_mut().enumerate() {
            if let Some(system) = slot.instance.as_mut() {
                let ctx = ExecutionContext::new(family, order, index, *tick);
                system.update(state, &ctx);
                ran += 1;
            }
        }

        tracing::trace!(family = %family, tick = *tick, systems = ran, "Tick complete");
        *tick += 1;
        ran
    }

    /// Runs shutdown hooks in reverse order and drops every system.
    ///
    /// A later [`tick`](Self::tick) constructs fresh instances.
    pub fn shutdown(&mut self, state: &mut C) {
        if !self.started {
            return;
        }
        for (name, slot) in self.order.iter().zip(&mut self.slots).rev() {
            if let Some(mut system) = slot.instance.take() {
                tracing::debug!(family = %self.family, system = %name, "Shutting down system");
                system.shutdown(state);
            }
        }
        self.started = false;
        tracing::info!(family = %self.family, "Schedule shut down");
    }
}

impl<C> Schedule<C> {
    /// Returns the family this schedule runs.
    #[inline]
    #[must_use]
    pub fn family(&self) -> &Family {
        &self.family
    }

    /// Returns the system names in execution order.
    #[inline]
    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Returns the number of systems.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the schedule has no systems.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `true` between startup and shutdown.
    #[inline]
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Returns the number of ticks run so far.
    #[inline]
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Returns `true` if both systems are scheduled and `a` runs before `b`.
    #[must_use]
    pub fn runs_before(&self, a: &str, b: &str) -> bool {
        match (self.position(a), self.position(b)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    /// Returns the execution index of `system`.
    #[must_use]
    pub fn position(&self, system: &str) -> Option<usize> {
        self.order.iter().position(|name| name == system)
    }
}

impl<C> Drop for Schedule<C> {
    fn drop(&mut self) {
        while let Some(slot) = self.slots.pop() {
            drop(slot.instance);
        }
    }
}

impl<C> fmt::Debug for Schedule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schedule")
            .field("family", &self.family)
            .field("order", &self.order)
            .field("started", &self.started)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    struct Recorder {
        name: &'static str,
    }

    impl System<Vec<String>> for Recorder {
        fn update(&mut self, state: &mut Vec<String>, ctx: &ExecutionContext<'_>) {
            state.push(format!("{}@{}", self.name, ctx.tick()));
        }

        fn shutdown(&mut self, state: &mut Vec<String>) {
            state.push(format!("{}:down", self.name));
        }
    }

    fn entry(name: &'static str) -> (String, SystemFactory<Vec<String>>) {
        let factory: SystemFactory<Vec<String>> = Rc::new(move |state: &mut Vec<String>| {
            state.push(format!("{name}:up"));
            Box::new(Recorder { name }) as Box<dyn System<Vec<String>>>
        });
        (name.to_string(), factory)
    }

    fn schedule() -> Schedule<Vec<String>> {
        Schedule::new(Family::from("frame"), vec![entry("a"), entry("b")])
    }

    #[test]
    fn test_lifecycle_order() {
        let mut schedule = schedule();
        let mut log = Vec::new();

        assert_eq!(schedule.tick(&mut log), 2);
        assert_eq!(schedule.tick(&mut log), 2);
        schedule.shutdown(&mut log);

        assert_eq!(
            log,
            vec!["a:up", "b:up", "a@0", "b@0", "a@1", "b@1", "b:down", "a:down"]
        );
        assert_eq!(schedule.tick_count(), 2);
        assert!(!schedule.is_started());
    }

    #[test]
    fn test_startup_is_idempotent() {
        let mut schedule = schedule();
        let mut log = Vec::new();
        schedule.startup(&mut log);
        schedule.startup(&mut log);
        assert_eq!(log, vec!["a:up", "b:up"]);
    }

    #[test]
    fn test_runs_before() {
        let schedule = schedule();
        assert!(schedule.runs_before("a", "b"));
        assert!(!schedule.runs_before("b", "a"));
        assert!(!schedule.runs_before("a", "missing"));
    }
}
