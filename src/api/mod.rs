//! Orchestration API for a deskpod session.
//!
//! [`run`] drives one container from launch to removal against any
//! [`ContainerLifecycleClient`]. It does not print, resolve an engine or call
//! `std::process::exit`; the binary owns those concerns and the caller
//! supplies the interrupt channel.

use crate::config::RunConfig;
use crate::engine::{
    ContainerLifecycleClient, Interrupts, LaunchOutcome, LaunchReport, LifecycleController,
    Termination,
};
use crate::error::Result as DeskpodResult;

/// How a completed session ended.
///
/// No container is left behind in any variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The operator interrupted the image pull, so no container was created.
    CancelledBeforeLaunch,
    /// The operator interrupted the running container, which was then
    /// stopped and removed.
    Interrupted,
    /// The container exited on its own and was removed.
    ContainerExited {
        /// The exit code reported by the container engine.
        code: i64,
    },
}

/// Launch the container, wait for it, then tear it down.
///
/// `on_launched` is called once the container is running, before the wait
/// starts. An interrupt during the image pull ends the session before any
/// container is created. Once a container has been launched, teardown runs
/// exactly once however the wait ends.
///
/// # Errors
///
/// Returns `DeskpodError::Container` for launch, wait or teardown failures.
/// When the wait fails the wait error is returned after teardown has been
/// attempted.
pub async fn run<C, F>(
    client: &C,
    config: &RunConfig,
    interrupts: &mut Interrupts,
    on_launched: F,
) -> DeskpodResult<RunOutcome>
where
    C: ContainerLifecycleClient + ?Sized,
    F: FnOnce(&LaunchReport),
{
    let mut controller = LifecycleController::new(client);
    let report = match controller.launch(config, interrupts).await? {
        LaunchOutcome::Started(report) => report,
        LaunchOutcome::Cancelled => return Ok(RunOutcome::CancelledBeforeLaunch),
    };
    on_launched(&report);

    let LaunchReport { handle, .. } = report;
    let termination = controller.await_termination(&handle, interrupts).await;
    let teardown = controller.teardown(handle, interrupts).await;

    match (termination, teardown) {
        (Err(wait_error), Err(teardown_error)) => {
            tracing::warn!(%teardown_error, "teardown after failed wait also failed");
            Err(wait_error.into())
        }
        (Err(wait_error), Ok(_)) => Err(wait_error.into()),
        (Ok(_), Err(teardown_error)) => Err(teardown_error.into()),
        (Ok(Termination::Interrupted), Ok(_)) => Ok(RunOutcome::Interrupted),
        (Ok(Termination::Exited { status_code }), Ok(_)) => {
            Ok(RunOutcome::ContainerExited { code: status_code })
        }
    }
}
