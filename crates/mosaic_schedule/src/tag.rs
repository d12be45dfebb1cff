//! # Tags and Families
//!
//! A [`Tag`] is a named capability flag of an execution context ("editor",
//! "playing", "server"). A [`Family`] names one independently ordered group
//! of systems ("frame", "fixed").

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A named capability flag describing an execution context.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Creates a tag.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the tag name.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A scheduling family.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Family(String);

impl Family {
    /// Creates a family name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the family name.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Family {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// An ordered set of tags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<Tag>);

impl TagSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag, returning `true` if it was not present.
    pub fn insert(&mut self, tag: impl Into<Tag>) -> bool {
        self.0.insert(tag.into())
    }

    /// Returns `true` if `tag` is present.
    #[must_use]
    pub fn contains(&self, tag: &Tag) -> bool {
        self.0.contains(tag)
    }

    /// Returns the number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the tags in order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> + '_ {
        self.0.iter()
    }

    /// Returns `true` if every tag of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &TagSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Returns `true` if `self` and `other` share no tag.
    #[must_use]
    pub fn is_disjoint(&self, other: &TagSet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    /// Returns the first tag present in both sets.
    #[must_use]
    pub fn first_shared<'a>(&'a self, other: &'a TagSet) -> Option<&'a Tag> {
        self.0.intersection(&other.0).next()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(Tag::from).collect()
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::collections::btree_set::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_set_relations() {
        let active: TagSet = ["editor", "playing"].into_iter().collect();
        let required: TagSet = ["editor"].into_iter().collect();
        let excluded: TagSet = ["server"].into_iter().collect();

        assert!(required.is_subset(&active));
        assert!(excluded.is_disjoint(&active));
        assert_eq!(required.first_shared(&active), Some(&Tag::from("editor")));
        assert_eq!(active.len(), 2);
    }

    #[test]
    fn test_tag_set_deduplicates() {
        let mut tags = TagSet::new();
        assert!(tags.insert("editor"));
        assert!(!tags.insert("editor"));
        assert_eq!(tags.len(), 1);
    }
}
