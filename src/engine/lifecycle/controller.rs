//! The lifecycle state machine driving one container.

use bollard::errors::Error as BollardError;

use super::{
    ContainerLifecycleClient, ImageReference, Interrupts, LifecycleState, is_already_stopped,
    is_missing_image, is_not_found, is_not_running,
};
use crate::config::RunConfig;
use crate::engine::connection::{
    BindMount, CreateContainerRequest, EngineConnector, PUBLISHED_PORTS, PortPublication,
};
use crate::error::{ContainerError, TeardownStep};

/// A launched container. Only a successful launch produces one.
#[derive(Debug, PartialEq, Eq)]
pub struct ContainerHandle {
    pub(super) id: String,
    pub(super) image: String,
}

impl ContainerHandle {
    /// Engine-assigned container id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Image the container was created from.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }
}

/// What a successful launch produced.
#[derive(Debug, PartialEq, Eq)]
pub struct LaunchReport {
    /// Handle to the running container.
    pub handle: ContainerHandle,
    /// Ports published on the host.
    pub ports: Vec<PortPublication>,
}

/// How a launch ended without error.
#[derive(Debug, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The container is running.
    Started(LaunchReport),
    /// The operator interrupted the image pull. No container was created.
    Cancelled,
}

/// Why the supervised wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The container exited on its own.
    Exited {
        /// Exit status reported by the engine.
        status_code: i64,
    },
    /// The operator interrupted the wait.
    Interrupted,
}

/// Result of a teardown in which every step succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    /// The container that was removed.
    pub container_id: String,
    /// Whether the stop was abandoned and the container killed.
    pub killed: bool,
}

/// Drives one container through launch, supervised wait and teardown.
pub struct LifecycleController<'a, C: ContainerLifecycleClient + ?Sized> {
    client: &'a C,
    state: LifecycleState,
}

enum StopOutcome {
    Completed(Result<(), BollardError>),
    Escalated,
}

impl<'a, C: ContainerLifecycleClient + ?Sized> LifecycleController<'a, C> {
    /// Create a controller in the `Idle` state.
    #[must_use]
    pub const fn new(client: &'a C) -> Self {
        Self {
            client,
            state: LifecycleState::Idle,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    fn advance(&mut self, next: LifecycleState) -> Result<(), ContainerError> {
        let previous = self.state;
        self.state = previous.transition_to(next)?;
        tracing::debug!(from = %previous, to = %next, "lifecycle transition");
        Ok(())
    }

    fn fail_with(&mut self, error: ContainerError) -> ContainerError {
        if let Err(transition_error) = self.advance(LifecycleState::Failed) {
            tracing::warn!(%transition_error, "could not record failed state");
        }
        error
    }

    /// Pull the image, then create and start the container.
    ///
    /// An interrupt during the pull abandons it and yields
    /// [`LaunchOutcome::Cancelled`] with nothing created. A missing image ends
    /// the launch before any container exists. A container that was created
    /// but could not be started is force-removed before the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns `ImageNotFound`, `PullFailed`, `CreateFailed` or `StartFailed`
    /// for the step that failed, or `InvalidTransition` when called twice.
    pub async fn launch(
        &mut self,
        config: &RunConfig,
        interrupts: &mut Interrupts,
    ) -> Result<LaunchOutcome, ContainerError> {
        self.advance(LifecycleState::Pulling)?;
        let image = ImageReference::parse(config.image());
        tracing::info!(image = %image, "pulling image");
        let pulled = tokio::select! {
            biased;
            () = interrupts.received() => None,
            result = self.client.pull_image(&image) => Some(result),
        };
        let Some(pull_result) = pulled else {
            tracing::info!(image = %image, "interrupt received while pulling, nothing created");
            self.advance(LifecycleState::Cancelled)?;
            return Ok(LaunchOutcome::Cancelled);
        };
        if let Err(error) = pull_result {
            let mapped = if is_missing_image(&error) {
                ContainerError::ImageNotFound {
                    image: String::from(config.image()),
                }
            } else {
                ContainerError::PullFailed {
                    image: String::from(config.image()),
                    message: error.to_string(),
                }
            };
            return Err(self.fail_with(mapped));
        }

        self.advance(LifecycleState::Launching)?;
        let request = match CreateContainerRequest::new(
            config.image(),
            BindMount::new(config.host_path(), config.container_path()),
        ) {
            Ok(request) => request
                .with_name(config.container_name().map(String::from))
                .with_credential(config.credential()),
            Err(error) => {
                return Err(self.fail_with(ContainerError::CreateFailed {
                    message: error.to_string(),
                }));
            }
        };

        let container_id = match EngineConnector::create_container_async(self.client, &request).await
        {
            Ok(id) => id,
            Err(error) => return Err(self.fail_with(error)),
        };
        tracing::info!(container_id = %container_id, "container created");

        if let Err(error) = self.client.start_container(&container_id).await {
            self.discard_unstarted(&container_id).await;
            return Err(self.fail_with(ContainerError::StartFailed {
                container_id,
                message: error.to_string(),
            }));
        }

        self.advance(LifecycleState::Running)?;
        tracing::info!(container_id = %container_id, "container started");
        Ok(LaunchOutcome::Started(LaunchReport {
            handle: ContainerHandle {
                id: container_id,
                image: String::from(config.image()),
            },
            ports: PUBLISHED_PORTS.to_vec(),
        }))
    }

    async fn discard_unstarted(&self, container_id: &str) {
        if let Err(error) = self.client.remove_container(container_id, true).await {
            tracing::warn!(container_id, %error, "could not remove container that failed to start");
        }
    }

    /// Block until the container exits or an interrupt arrives.
    ///
    /// There is no timeout. The state stays `Running` either way so teardown
    /// can follow.
    ///
    /// # Errors
    ///
    /// Returns `WaitFailed` when the wait stream errors, or
    /// `InvalidTransition` when the container is not running.
    pub async fn await_termination(
        &self,
        handle: &ContainerHandle,
        interrupts: &mut Interrupts,
    ) -> Result<Termination, ContainerError> {
        if self.state != LifecycleState::Running {
            return Err(ContainerError::InvalidTransition {
                from: self.state.to_string(),
                to: LifecycleState::Running.to_string(),
            });
        }

        tokio::select! {
            biased;
            () = interrupts.received() => {
                tracing::info!(container_id = handle.id(), "interrupt received while running");
                Ok(Termination::Interrupted)
            }
            result = self.client.wait_container(handle.id()) => match result {
                Ok(status_code) => {
                    tracing::info!(container_id = handle.id(), status_code, "container exited");
                    Ok(Termination::Exited { status_code })
                }
                Err(error) => Err(ContainerError::WaitFailed {
                    container_id: String::from(handle.id()),
                    message: error.to_string(),
                }),
            },
        }
    }

    /// Stop and remove the container.
    ///
    /// Remove is always issued, even when stop failed. Interrupts already
    /// queued when teardown begins are discarded; only one that arrives while
    /// stop is in flight abandons the stop and kills the container first.
    /// Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns `TeardownFailed` naming every step that failed, or
    /// `InvalidTransition` when the container is not running.
    pub async fn teardown(
        &mut self,
        handle: ContainerHandle,
        interrupts: &mut Interrupts,
    ) -> Result<TeardownReport, ContainerError> {
        self.advance(LifecycleState::Stopping)?;
        let id = handle.id;
        let mut failures: Vec<(TeardownStep, String)> = Vec::new();

        let mut stale = 0_usize;
        while interrupts.try_received() {
            stale = stale.saturating_add(1);
        }
        if stale > 0 {
            tracing::debug!(container_id = %id, stale, "discarded interrupts queued before stop");
        }

        tracing::info!(container_id = %id, "stopping container");
        let stop = tokio::select! {
            biased;
            result = self.client.stop_container(&id) => StopOutcome::Completed(result),
            () = interrupts.received() => StopOutcome::Escalated,
        };

        let killed = matches!(stop, StopOutcome::Escalated);
        let stopped = match stop {
            StopOutcome::Completed(Ok(())) => true,
            StopOutcome::Completed(Err(error)) if is_already_stopped(&error) => true,
            StopOutcome::Completed(Err(error)) => {
                tracing::warn!(container_id = %id, %error, "stop failed");
                failures.push((TeardownStep::Stop, error.to_string()));
                false
            }
            StopOutcome::Escalated => {
                tracing::warn!(container_id = %id, "second interrupt, killing container");
                match self.client.kill_container(&id).await {
                    Ok(()) => true,
                    Err(error) if is_not_running(&error) => {
                        tracing::debug!(container_id = %id, %error, "container was not running");
                        false
                    }
                    Err(error) => {
                        failures.push((TeardownStep::Kill, error.to_string()));
                        false
                    }
                }
            }
        };

        tracing::info!(container_id = %id, "removing container");
        match self.client.remove_container(&id, !stopped).await {
            Ok(()) => {}
            Err(error) if is_not_found(&error) => {}
            Err(error) => failures.push((TeardownStep::Remove, error.to_string())),
        }

        if failures.is_empty() {
            self.advance(LifecycleState::Removed)?;
            tracing::info!(container_id = %id, "container stopped and removed");
            return Ok(TeardownReport {
                container_id: id,
                killed,
            });
        }

        let message = failures
            .iter()
            .map(|(step, detail)| format!("{step}: {detail}"))
            .collect::<Vec<_>>()
            .join("; ");
        Err(self.fail_with(ContainerError::TeardownFailed {
            container_id: id,
            failed_steps: failures.into_iter().map(|(step, _)| step).collect(),
            message,
        }))
    }
}
