//! Scenario state for session behavioural tests.

use deskpod::api::RunOutcome;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

use super::engine::{StopBehaviour, WaitBehaviour};

/// High-level outcome of a session.
#[derive(Debug, Clone)]
pub(crate) enum SessionResult {
    /// The session completed.
    Ok(RunOutcome),
    /// The session returned an error.
    Err(String),
}

#[derive(Default, ScenarioState)]
pub(crate) struct SessionState {
    pub(crate) api_key: Slot<String>,
    pub(crate) image_missing: Slot<bool>,
    pub(crate) pull_interrupts: Slot<usize>,
    pub(crate) wait: Slot<WaitBehaviour>,
    pub(crate) stop: Slot<StopBehaviour>,
    pub(crate) result: Slot<SessionResult>,
    pub(crate) calls: Slot<Vec<String>>,
    pub(crate) published_ports: Slot<usize>,
    pub(crate) bind_mounts: Slot<usize>,
}

#[fixture]
pub(crate) fn session_state() -> SessionState {
    let state = SessionState::default();
    state.api_key.set(String::from("sk-test"));
    state.image_missing.set(false);
    state.pull_interrupts.set(0);
    state.wait.set(WaitBehaviour::Pending);
    state.stop.set(StopBehaviour::Succeeds);
    state
}
