//! Lifecycle states and the transitions allowed between them.

use std::fmt;

use crate::error::ContainerError;

/// Where a container is in its lifecycle.
///
/// `Idle -> Pulling -> Launching -> Running -> Stopping -> Removed`, with
/// `Failed` reachable from `Pulling`, `Launching` and `Stopping`. An
/// interrupted pull ends in `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Nothing has happened yet.
    #[default]
    Idle,
    /// The image is being pulled.
    Pulling,
    /// The container is being created and started.
    Launching,
    /// The container is running.
    Running,
    /// Teardown is in progress.
    Stopping,
    /// The container was stopped and removed.
    Removed,
    /// A step failed; terminal.
    Failed,
    /// The pull was interrupted before any container existed; terminal.
    Cancelled,
}

impl LifecycleState {
    /// Whether moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Pulling)
                | (Self::Pulling | Self::Stopping, Self::Failed)
                | (Self::Pulling, Self::Launching | Self::Cancelled)
                | (Self::Launching, Self::Running | Self::Failed)
                | (Self::Running, Self::Stopping)
                | (Self::Stopping, Self::Removed)
        )
    }

    /// Move to `next`, or fail if the transition is not allowed.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::InvalidTransition` naming both states.
    pub fn transition_to(self, next: Self) -> Result<Self, ContainerError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ContainerError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Removed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Pulling => "pulling",
            Self::Launching => "launching",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Removed => "removed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}
