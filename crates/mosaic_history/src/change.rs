//! # Changes
//!
//! A [`Change`] is one undo/redo unit: a description plus the actions
//! recorded while it was open, in application order.

use mosaic_core::{ComponentRegistry, World};

use crate::action::{Action, Rejected};
use crate::error::HistoryError;

/// One undoable unit of ordered actions.
#[derive(Debug)]
pub struct Change {
    description: String,
    actions: Vec<Action>,
}

impl Change {
    pub(crate) fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            actions: Vec::new(),
        }
    }

    /// Returns the human-readable description.
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the recorded actions in application order.
    #[inline]
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns the number of recorded actions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if nothing was recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub(crate) fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Reverses every action, last first, and returns the change that
    /// reverses the result.
    ///
    /// If an action is refused, the actions already reversed are re-applied
    /// and the change comes back unchanged with the error.
    pub(crate) fn replay(
        self,
        world: &mut World,
        registry: &ComponentRegistry,
    ) -> Result<Self, (Self, HistoryError)> {
        let Self {
            description,
            mut actions,
        } = self;
        let mut inverses = Vec::with_capacity(actions.len());

        while let Some(action) = actions.pop() {
            match action.replay(world, registry) {
                Ok(inverse) => inverses.push(inverse),
                Err(Rejected { action, error }) => {
                    tracing::warn!(change = %description, %error, "Replay refused, rolling back");
                    actions.push(action);
                    while let Some(inverse) = inverses.pop() {
                        match inverse.replay(world, registry) {
                            Ok(restored) => actions.push(restored),
                            Err(Rejected {
                                action,
                                error: rollback_error,
                            }) => {
                                tracing::warn!(
                                    change = %description,
                                    error = %rollback_error,
                                    "Rollback step refused"
                                );
                                actions.push(action);
                            }
                        }
                    }
                    return Err((
                        Self {
                            description,
                            actions,
                        },
                        error,
                    ));
                }
            }
        }

        Ok(Self {
            description,
            actions: inverses,
        })
    }
}
