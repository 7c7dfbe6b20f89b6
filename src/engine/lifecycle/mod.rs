//! Container lifecycle: pull, launch, supervised wait and teardown.
//!
//! The engine calls sit behind [`ContainerLifecycleClient`] so the state
//! machine in [`LifecycleController`] can be driven without a live daemon.
//! The controller performs no connection logic; it is handed a verified
//! client.

mod controller;
mod image;
mod interrupts;
mod state;


use std::future::Future;
use std::pin::Pin;

use bollard::query_parameters::{
    CreateImageOptionsBuilder, KillContainerOptions, RemoveContainerOptionsBuilder,
    StartContainerOptions, StopContainerOptions, WaitContainerOptions,
};
use bollard::{Docker, errors::Error as BollardError};
use futures_util::{StreamExt, TryStreamExt, future};

use super::connection::ContainerCreator;

pub use controller::{
    ContainerHandle, LaunchOutcome, LaunchReport, LifecycleController, TeardownReport,
    Termination,
};
pub use image::ImageReference;
pub use interrupts::{InterruptSender, Interrupts, forward_ctrl_c, interrupt_channel};
pub use state::LifecycleState;

/// Boxed future for engine calls that return nothing on success.
pub type EngineUnitFuture<'a> = Pin<Box<dyn Future<Output = Result<(), BollardError>> + Send + 'a>>;

/// Boxed future resolving to a container's exit status.
pub type WaitContainerFuture<'a> =
    Pin<Box<dyn Future<Output = Result<i64, BollardError>> + Send + 'a>>;

/// Engine operations the lifecycle controller drives.
pub trait ContainerLifecycleClient: ContainerCreator {
    /// Pull `image`, draining the progress stream to completion.
    fn pull_image(&self, image: &ImageReference) -> EngineUnitFuture<'_>;

    /// Start a created container.
    fn start_container(&self, container_id: &str) -> EngineUnitFuture<'_>;

    /// Block until the container exits and return its status code.
    fn wait_container(&self, container_id: &str) -> WaitContainerFuture<'_>;

    /// Request a graceful stop using the engine's default grace period.
    fn stop_container(&self, container_id: &str) -> EngineUnitFuture<'_>;

    /// Kill the container immediately.
    fn kill_container(&self, container_id: &str) -> EngineUnitFuture<'_>;

    /// Remove the container, forcing removal of a running one when `force`.
    fn remove_container(&self, container_id: &str, force: bool) -> EngineUnitFuture<'_>;
}

impl ContainerLifecycleClient for Docker {
    fn pull_image(&self, image: &ImageReference) -> EngineUnitFuture<'_> {
        let mut builder = CreateImageOptionsBuilder::new().from_image(image.repository());
        if let Some(tag) = image.tag() {
            builder = builder.tag(tag);
        }
        let options = builder.build();
        Box::pin(async move {
            Self::create_image(self, Some(options), None, None)
                .try_for_each(|_| future::ready(Ok(())))
                .await
        })
    }

    fn start_container(&self, container_id: &str) -> EngineUnitFuture<'_> {
        let id = String::from(container_id);
        Box::pin(async move { Self::start_container(self, &id, None::<StartContainerOptions>).await })
    }

    fn wait_container(&self, container_id: &str) -> WaitContainerFuture<'_> {
        let id = String::from(container_id);
        Box::pin(async move {
            let mut responses = Self::wait_container(self, &id, None::<WaitContainerOptions>);
            match responses.next().await {
                Some(Ok(response)) => Ok(response.status_code),
                // Non-zero exits surface as an error carrying the status code.
                Some(Err(BollardError::DockerContainerWaitError { code, .. })) => Ok(code),
                Some(Err(error)) => Err(error),
                None => Err(BollardError::IOError {
                    err: std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "wait stream ended without a status",
                    ),
                }),
            }
        })
    }

    fn stop_container(&self, container_id: &str) -> EngineUnitFuture<'_> {
        let id = String::from(container_id);
        Box::pin(async move { Self::stop_container(self, &id, None::<StopContainerOptions>).await })
    }

    fn kill_container(&self, container_id: &str) -> EngineUnitFuture<'_> {
        let id = String::from(container_id);
        Box::pin(async move { Self::kill_container(self, &id, None::<KillContainerOptions>).await })
    }

    fn remove_container(&self, container_id: &str, force: bool) -> EngineUnitFuture<'_> {
        let id = String::from(container_id);
        let options = RemoveContainerOptionsBuilder::new().force(force).build();
        Box::pin(async move { Self::remove_container(self, &id, Some(options)).await })
    }
}

/// HTTP status the engine returns when a stop targets a stopped container.
const NOT_MODIFIED: u16 = 304;

/// HTTP status for a missing image or container.
const NOT_FOUND: u16 = 404;

/// HTTP status the engine returns when a kill targets a container that is not
/// running.
const CONFLICT: u16 = 409;

/// Whether a stop error only reports that the container was already stopped.
pub(crate) const fn is_already_stopped(error: &BollardError) -> bool {
    matches!(
        error,
        BollardError::DockerResponseServerError {
            status_code: NOT_MODIFIED,
            ..
        }
    )
}

/// Whether an error reports that the target no longer exists.
pub(crate) const fn is_not_found(error: &BollardError) -> bool {
    matches!(
        error,
        BollardError::DockerResponseServerError {
            status_code: NOT_FOUND,
            ..
        }
    )
}

/// Whether a kill error only reports that the container was not running.
pub(crate) const fn is_not_running(error: &BollardError) -> bool {
    matches!(
        error,
        BollardError::DockerResponseServerError {
            status_code: CONFLICT,
            ..
        }
    )
}

/// Whether a pull error means the image reference does not exist.
pub(crate) fn is_missing_image(error: &BollardError) -> bool {
    match error {
        BollardError::DockerResponseServerError { status_code, .. } => *status_code == NOT_FOUND,
        BollardError::DockerStreamError { error } => {
            let lowered = error.to_lowercase();
            lowered.contains("not found") || lowered.contains("manifest unknown")
        }
        _ => false,
    }
}
