//! # Schedule Error Types
//!
//! Every registration and ordering inconsistency the scheduler can detect.
//! All of them are startup errors: a registry that produces one of these
//! never yields a schedule.

use thiserror::Error;

use crate::tag::{Family, Tag};

/// Errors raised while registering, validating or ordering systems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A system name was registered twice.
    #[error("system `{0}` registered twice")]
    DuplicateSystem(String),

    /// A system requires and excludes the same tag.
    #[error("system `{system}` both requires and excludes tag `{tag}`")]
    ConflictingTags {
        /// The offending system.
        system: String,
        /// The tag declared on both sides.
        tag: Tag,
    },

    /// A before/after constraint names a system that does not exist.
    #[error("system `{system}` references unknown system `{reference}`")]
    UnknownSystem {
        /// The system declaring the constraint.
        system: String,
        /// The missing name.
        reference: String,
    },

    /// A system orders itself against itself.
    #[error("system `{0}` references itself")]
    SelfReference(String),

    /// A before/after constraint crosses scheduling families.
    #[error(
        "system `{system}` in family `{family}` references `{reference}` \
         in family `{reference_family}`"
    )]
    CrossFamily {
        /// The system declaring the constraint.
        system: String,
        /// Its family.
        family: Family,
        /// The referenced system.
        reference: String,
        /// The referenced system's family.
        reference_family: Family,
    },

    /// The before/after graph of a family contains a cycle.
    #[error("cycle detected in family `{family}` among systems: {}", .systems.join(", "))]
    CycleDetected {
        /// The family whose graph is cyclic.
        family: Family,
        /// Systems that could not be ordered, in registration order.
        systems: Vec<String>,
    },

    /// No system is registered in the requested family.
    #[error("unknown scheduling family `{0}`")]
    UnknownFamily(Family),

    /// A supplied startup order names a system outside the family.
    #[error("startup order for family `{family}` names unknown system `{system}`")]
    UnlistedSystem {
        /// The family being built.
        family: Family,
        /// The name that does not belong to it.
        system: String,
    },

    /// A supplied startup order lists a system its tag filters keep out.
    #[error("startup order for family `{family}` lists `{system}`, inactive under its tags")]
    InactiveSystem {
        /// The family being built.
        family: Family,
        /// The filtered-out system.
        system: String,
    },

    /// A supplied startup order lists a system twice.
    #[error("startup order for family `{family}` lists `{system}` twice")]
    RepeatedSystem {
        /// The family being built.
        family: Family,
        /// The repeated name.
        system: String,
    },

    /// A supplied startup order breaks a before/after constraint.
    #[error("startup order for family `{family}` runs `{after}` before `{before}`")]
    OrderViolation {
        /// The family being built.
        family: Family,
        /// The system that must run first.
        before: String,
        /// The system that must run later.
        after: String,
    },

    /// A schedule manifest could not be parsed or written.
    #[error("invalid schedule manifest: {0}")]
    InvalidManifest(String),
}

/// Result type for scheduler operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;
