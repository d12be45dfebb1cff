//! # System Registry
//!
//! Holds every [`SystemDescriptor`] and turns them into [`Schedule`]s.
//!
//! ## Validation
//!
//! Validation runs over the complete, unfiltered graph of each family, so a
//! cycle is reported even if no tag combination would ever activate all of
//! its members. Ordering then restricts the graph to the systems active
//! under a tag set; constraints naming a filtered-out system are dropped.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut registry = SystemRegistry::<Level>::new();
//! registry.register(SystemDescriptor::of::<Input>("input", "frame"))?;
//! registry.register(SystemDescriptor::of::<Physics>("physics", "frame").after("input"))?;
//! registry.validate()?;
//!
//! let schedule = registry.build(&Family::from("frame"), &TagSet::new())?;
//! ```

use std::collections::{HashMap, HashSet};

use crate::error::{ScheduleError, ScheduleResult};
use crate::graph::topological_sort;
use crate::manifest::{FamilyManifest, ScheduleManifest};
use crate::schedule::Schedule;
use crate::system::SystemDescriptor;
use crate::tag::{Family, TagSet};

/// Registry of system descriptors.
pub struct SystemRegistry<C> {
    systems: Vec<SystemDescriptor<C>>,
    by_name: HashMap<String, usize>,
}

impl<C> Default for SystemRegistry<C> {
    fn default() -> Self {
        Self {
            systems: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<C: 'static> SystemRegistry<C> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a system.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::DuplicateSystem`] if the name is taken, or
    /// [`ScheduleError::ConflictingTags`] if a tag is both required and
    /// excluded.
    pub fn register(&mut self, descriptor: SystemDescriptor<C>) -> ScheduleResult<()> {
        if self.by_name.contains_key(descriptor.name()) {
            return Err(ScheduleError::DuplicateSystem(descriptor.name().to_string()));
        }
        if let Some(tag) = descriptor
            .required_tags()
            .first_shared(descriptor.excluded_tags())
        {
            return Err(ScheduleError::ConflictingTags {
                system: descriptor.name().to_string(),
                tag: tag.clone(),
            });
        }

        tracing::debug!(
            system = descriptor.name(),
            family = %descriptor.family(),
            "Registered system"
        );

        self.by_name
            .insert(descriptor.name().to_string(), self.systems.len());
        self.systems.push(descriptor);
        Ok(())
    }

    /// Returns the number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns `true` if no system is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Returns the descriptor registered as `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SystemDescriptor<C>> {
        self.by_name.get(name).map(|&index| &self.systems[index])
    }

    /// Returns every family, in order of first registration.
    #[must_use]
    pub fn families(&self) -> Vec<Family> {
        let mut seen = HashSet::new();
        self.systems
            .iter()
            .map(SystemDescriptor::family)
            .filter(|family| seen.insert(*family))
            .cloned()
            .collect()
    }

    /// Checks every constraint of every family.
    ///
    /// # Errors
    ///
    /// Returns the first unknown, self-referencing or cross-family
    /// constraint found in registration order, or a cycle in any family.
    pub fn validate(&self) -> ScheduleResult<()> {
        for system in &self.systems {
            for reference in system.references() {
                if reference == system.name() {
                    return Err(ScheduleError::SelfReference(system.name().to_string()));
                }
                let target = self.get(reference).ok_or_else(|| ScheduleError::UnknownSystem {
                    system: system.name().to_string(),
                    reference: reference.to_string(),
                })?;
                if target.family() != system.family() {
                    return Err(ScheduleError::CrossFamily {
                        system: system.name().to_string(),
                        family: system.family().clone(),
                        reference: reference.to_string(),
                        reference_family: target.family().clone(),
                    });
                }
            }
        }

        for family in self.families() {
            let members = self.members(&family, None);
            self.sort(&family, &members)?;
        }
        Ok(())
    }

    /// Computes the execution order of `family` under `active` tags.
    ///
    /// # Errors
    ///
    /// Returns any validation error, or [`ScheduleError::UnknownFamily`].
    pub fn order(&self, family: &Family, active: &TagSet) -> ScheduleResult<Vec<&str>> {
        self.validate()?;
        self.require_family(family)?;

        let members = self.members(family, Some(active));
        let sorted = self.sort(family, &members)?;
        Ok(sorted
            .into_iter()
            .map(|index| self.systems[index].name())
            .collect())
    }

    /// Builds the schedule of `family` under `active` tags.
    ///
    /// # Errors
    ///
    /// Returns any error of [`order`](Self::order).
    pub fn build(&self, family: &Family, active: &TagSet) -> ScheduleResult<Schedule<C>> {
        let order = self.order(family, active)?;
        let schedule = self.assemble(family, order.iter().map(|name| self.by_name[*name]));

        tracing::info!(
            family = %family,
            order = ?schedule.order(),
            "Schedule built"
        );
        Ok(schedule)
    }

    /// Builds the schedule of `family` from an externally supplied order.
    ///
    /// Every listed name must belong to the family, be active under
    /// `active` and appear once, and the list must satisfy every
    /// before/after constraint between listed systems. Systems left out of
    /// the list do not run.
    ///
    /// # Errors
    ///
    /// Returns any validation error, or the first listing problem found.
    pub fn build_from_order<S: AsRef<str>>(
        &self,
        family: &Family,
        active: &TagSet,
        names: &[S],
    ) -> ScheduleResult<Schedule<C>> {
        self.validate()?;
        self.require_family(family)?;

        let mut positions = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().map(AsRef::as_ref).enumerate() {
            let index = self
                .by_name
                .get(name)
                .copied()
                .filter(|&index| self.systems[index].family() == family)
                .ok_or_else(|| ScheduleError::UnlistedSystem {
                    family: family.clone(),
                    system: name.to_string(),
                })?;
            if !self.systems[index].is_active(active) {
                return Err(ScheduleError::InactiveSystem {
                    family: family.clone(),
                    system: name.to_string(),
                });
            }
            if positions.insert(index, position).is_some() {
                return Err(ScheduleError::RepeatedSystem {
                    family: family.clone(),
                    system: name.to_string(),
                });
            }
        }

        for (first, then) in self.constraints(family) {
            if let (Some(a), Some(b)) = (positions.get(&first), positions.get(&then)) {
                if a > b {
                    return Err(ScheduleError::OrderViolation {
                        family: family.clone(),
                        before: self.systems[first].name().to_string(),
                        after: self.systems[then].name().to_string(),
                    });
                }
            }
        }

        let schedule = self.assemble(
            family,
            names.iter().map(|name| self.by_name[name.as_ref()]),
        );
        tracing::info!(
            family = %family,
            order = ?schedule.order(),
            "Schedule built from supplied order"
        );
        Ok(schedule)
    }

    /// Computes the order of every `(family, tags)` pair and records it as a
    /// manifest.
    ///
    /// # Errors
    ///
    /// Returns any error of [`order`](Self::order).
    pub fn manifest<I>(&self, contexts: I) -> ScheduleResult<ScheduleManifest>
    where
        I: IntoIterator<Item = (Family, TagSet)>,
    {
        let mut manifest = ScheduleManifest::default();
        for (family, tags) in contexts {
            let order = self
                .order(&family, &tags)?
                .into_iter()
                .map(str::to_string)
                .collect();
            manifest.families.insert(
                family,
                FamilyManifest {
                    tags,
                    order: Some(order),
                },
            );
        }
        Ok(manifest)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require_family(&self, family: &Family) -> ScheduleResult<()> {
        if self.systems.iter().any(|system| system.family() == family) {
            Ok(())
        } else {
            Err(ScheduleError::UnknownFamily(family.clone()))
        }
    }

    /// Registration indices of the family's systems, optionally tag-filtered.
    fn members(&self, family: &Family, active: Option<&TagSet>) -> Vec<usize> {
        self.systems
            .iter()
            .enumerate()
            .filter(|(_, system)| system.family() == family)
            .filter(|(_, system)| active.map_or(true, |tags| system.is_active(tags)))
            .map(|(index, _)| index)
            .collect()
    }

    /// Every `(earlier, later)` pair declared inside `family`, as
    /// registration indices. Assumes the registry validated.
    fn constraints(&self, family: &Family) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (index, system) in self.systems.iter().enumerate() {
            if system.family() != family {
                continue;
            }
            for name in system.runs_before() {
                if let Some(&later) = self.by_name.get(name) {
                    pairs.push((index, later));
                }
            }
            for name in system.runs_after() {
                if let Some(&earlier) = self.by_name.get(name) {
                    pairs.push((earlier, index));
                }
            }
        }
        pairs
    }

    /// Topologically sorts `members` (ascending registration indices).
    fn sort(&self, family: &Family, members: &[usize]) -> ScheduleResult<Vec<usize>> {
        let local: HashMap<usize, usize> = members
            .iter()
            .enumerate()
            .map(|(position, &index)| (index, position))
            .collect();

        let edges: Vec<(usize, usize)> = self
            .constraints(family)
            .into_iter()
            .filter_map(|(first, then)| Some((*local.get(&first)?, *local.get(&then)?)))
            .collect();

        match topological_sort(members.len(), &edges) {
            Ok(sorted) => Ok(sorted.into_iter().map(|position| members[position]).collect()),
            Err(stuck) => {
                let systems: Vec<String> = stuck
                    .into_iter()
                    .map(|position| self.systems[members[position]].name().to_string())
                    .collect();
                tracing::warn!(family = %family, ?systems, "Cycle in system graph");
                Err(ScheduleError::CycleDetected {
                    family: family.clone(),
                    systems,
                })
            }
        }
    }

    fn assemble(&self, family: &Family, indices: impl Iterator<Item = usize>) -> Schedule<C> {
        let entries = indices
            .map(|index| {
                let system = &self.systems[index];
                (system.name().to_string(), system.factory())
            })
            .collect();
        Schedule::new(family.clone(), entries)
    }
}

impl<C> std::fmt::Debug for SystemRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.systems).finish()
    }
}
