//! # Systems
//!
//! A system is one unit of per-tick logic over some state `C`. Systems are
//! declared through a [`SystemDescriptor`]: a unique name, a family, tag
//! predicates, ordering constraints, and a factory the schedule calls once at
//! startup.

use std::fmt;
use std::rc::Rc;

use crate::context::ExecutionContext;
use crate::tag::{Family, Tag, TagSet};

/// One unit of per-tick logic.
pub trait System<C> {
    /// Runs one tick.
    fn update(&mut self, state: &mut C, ctx: &ExecutionContext<'_>);

    /// Releases anything the system set up. Called once, in reverse
    /// construction order.
    fn shutdown(&mut self, _state: &mut C) {}
}

/// Constructs a system instance from the shared state.
pub type SystemFactory<C> = Rc<dyn Fn(&mut C) -> Box<dyn System<C>>>;

/// Declaration of a system and its scheduling constraints.
///
/// # Example
///
/// ```rust,ignore
/// let descriptor = SystemDescriptor::<Level>::of::<GizmoSystem>("gizmo", "frame")
///     .requires("editor")
///     .excludes("playing")
///     .after("selection");
/// ```
pub struct SystemDescriptor<C> {
    name: String,
    family: Family,
    requires: TagSet,
    excludes: TagSet,
    before: Vec<String>,
    after: Vec<String>,
    factory: SystemFactory<C>,
}

impl<C: 'static> SystemDescriptor<C> {
    /// Declares a system built by `factory`.
    #[must_use]
    pub fn new<F>(name: impl Into<String>, family: impl Into<Family>, factory: F) -> Self
    where
        F: Fn(&mut C) -> Box<dyn System<C>> + 'static,
    {
        Self {
            name: name.into(),
            family: family.into(),
            requires: TagSet::new(),
            excludes: TagSet::new(),
            before: Vec::new(),
            after: Vec::new(),
            factory: Rc::new(factory),
        }
    }

    /// Declares a system constructed with `S::default()`.
    #[must_use]
    pub fn of<S>(name: impl Into<String>, family: impl Into<Family>) -> Self
    where
        S: System<C> + Default + 'static,
    {
        Self::new(name, family, |_: &mut C| Box::new(S::default()) as Box<dyn System<C>>)
    }
}

impl<C> SystemDescriptor<C> {
    /// Runs only when `tag` is active.
    #[must_use]
    pub fn requires(mut self, tag: impl Into<Tag>) -> Self {
        self.requires.insert(tag);
        self
    }

    /// Never runs while `tag` is active.
    #[must_use]
    pub fn excludes(mut self, tag: impl Into<Tag>) -> Self {
        self.excludes.insert(tag);
        self
    }

    /// Must run before `system`.
    #[must_use]
    pub fn before(mut self, system: impl Into<String>) -> Self {
        self.before.push(system.into());
        self
    }

    /// Must run after `system`.
    #[must_use]
    pub fn after(mut self, system: impl Into<String>) -> Self {
        self.after.push(system.into());
        self
    }

    /// Returns the system name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the scheduling family.
    #[inline]
    #[must_use]
    pub fn family(&self) -> &Family {
        &self.family
    }

    /// Returns the tags that must all be active.
    #[must_use]
    pub fn required_tags(&self) -> &TagSet {
        &self.requires
    }

    /// Returns the tags that disable the system.
    #[must_use]
    pub fn excluded_tags(&self) -> &TagSet {
        &self.excludes
    }

    /// Returns the systems this one must precede.
    #[must_use]
    pub fn runs_before(&self) -> &[String] {
        &self.before
    }

    /// Returns the systems this one must follow.
    #[must_use]
    pub fn runs_after(&self) -> &[String] {
        &self.after
    }

    /// Returns `true` if the system participates under `active` tags.
    ///
    /// An empty requirement list means "runs in every context".
    #[must_use]
    pub fn is_active(&self, active: &TagSet) -> bool {
        self.requires.is_subset(active) && self.excludes.is_disjoint(active)
    }

    /// Returns every name referenced by a before/after constraint.
    pub(crate) fn references(&self) -> impl Iterator<Item = &str> + '_ {
        self.before.iter().chain(&self.after).map(String::as_str)
    }

    pub(crate) fn factory(&self) -> SystemFactory<C> {
        Rc::clone(&self.factory)
    }
}

impl<C> fmt::Debug for SystemDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemDescriptor")
            .field("name", &self.name)
            .field("family", &self.family)
            .field("requires", &self.requires)
            .field("excludes", &self.excludes)
            .field("before", &self.before)
            .field("after", &self.after)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter;

    impl System<u32> for Counter {
        fn update(&mut self, state: &mut u32, _ctx: &ExecutionContext<'_>) {
            *state += 1;
        }
    }

    #[test]
    fn test_untagged_system_runs_everywhere() {
        let descriptor = SystemDescriptor::<u32>::of::<Counter>("counter", "frame");
        assert!(descriptor.is_active(&TagSet::new()));
        assert!(descriptor.is_active(&["editor"].into_iter().collect()));
    }

    #[test]
    fn test_tag_filtering() {
        let descriptor = SystemDescriptor::<u32>::of::<Counter>("gizmo", "frame")
            .requires("editor")
            .excludes("playing");

        assert!(descriptor.is_active(&["editor"].into_iter().collect()));
        assert!(!descriptor.is_active(&["editor", "playing"].into_iter().collect()));
        assert!(!descriptor.is_active(&TagSet::new()));
    }

    #[test]
    fn test_factory_builds_instances() {
        let descriptor = SystemDescriptor::<u32>::of::<Counter>("counter", "frame");
        let mut state = 0;
        let mut system = (descriptor.factory())(&mut state);
        let order = vec!["counter".to_string()];
        let family = Family::from("frame");
        let ctx = ExecutionContext::new(&family, &order, 0, 0);
        system.update(&mut state, &ctx);
        assert_eq!(state, 1);
    }
}
