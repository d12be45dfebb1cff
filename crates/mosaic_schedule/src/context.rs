//! # Execution Context
//!
//! The value a schedule threads through every `update` call. It tells a
//! system where it sits in the order, so it can assert its assumptions about
//! what already ran this tick.

use crate::tag::Family;

/// Per-call view of the running schedule.
#[derive(Clone, Copy, Debug)]
pub struct ExecutionContext<'a> {
    family: &'a Family,
    order: &'a [String],
    current: usize,
    tick: u64,
}

impl<'a> ExecutionContext<'a> {
    pub(crate) fn new(family: &'a Family, order: &'a [String], current: usize, tick: u64) -> Self {
        debug_assert!(current < order.len());
        Self {
            family,
            order,
            current,
            tick,
        }
    }

    /// Returns the family being ticked.
    #[inline]
    #[must_use]
    pub fn family(&self) -> &'a Family {
        self.family
    }

    /// Returns the name of the system being updated.
    #[inline]
    #[must_use]
    pub fn current_system(&self) -> &'a str {
        &self.order[self.current]
    }

    /// Returns the zero-based tick index of this family.
    #[inline]
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Returns `true` if the current system runs before `system`.
    ///
    /// Systems absent from this schedule never compare.
    #[must_use]
    pub fn runs_before(&self, system: &str) -> bool {
        self.position(system).is_some_and(|index| self.current < index)
    }

    /// Returns `true` if the current system runs after `system`.
    #[must_use]
    pub fn runs_after(&self, system: &str) -> bool {
        self.position(system).is_some_and(|index| self.current > index)
    }

    fn position(&self, system: &str) -> Option<usize> {
        self.order.iter().position(|name| name == system)
    }
}
