//! # Schedule Manifest
//!
//! The externally supplied startup sequencing input, as TOML:
//!
//! ```toml
//! [families.frame]
//! tags = ["editor"]
//! order = ["input", "selection", "gizmo", "render"]
//!
//! [families.fixed]
//! tags = ["playing"]
//! ```
//!
//! A family without `order` is ordered by the registry at startup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};
use crate::tag::{Family, TagSet};

/// Startup configuration of one family.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FamilyManifest {
    /// Active tag set of the family's context.
    pub tags: TagSet,
    /// Explicit execution order; computed when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<String>>,
}

/// Startup configuration of every family.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleManifest {
    /// Families by name.
    pub families: BTreeMap<Family, FamilyManifest>,
}

impl ScheduleManifest {
    /// Parses a manifest from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidManifest`] on malformed input.
    pub fn from_toml_str(source: &str) -> ScheduleResult<Self> {
        toml::from_str(source).map_err(|e| ScheduleError::InvalidManifest(e.to_string()))
    }

    /// Renders the manifest as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidManifest`] if serialization fails.
    pub fn to_toml_string(&self) -> ScheduleResult<String> {
        toml::to_string(self).map_err(|e| ScheduleError::InvalidManifest(e.to_string()))
    }

    /// Returns the configuration of `family`.
    #[must_use]
    pub fn family(&self, family: &Family) -> Option<&FamilyManifest> {
        self.families.get(family)
    }
}
