//! Scenario state for engine resolution behavioural tests.

use std::collections::HashMap;

use deskpod::engine::{HostOs, ResolutionMethod};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

/// What resolving the endpoint produced.
#[derive(Debug, Clone)]
pub(crate) enum ResolutionResult {
    /// A strategy resolved an endpoint.
    Resolved {
        target: String,
        method: ResolutionMethod,
    },
    /// No strategy resolved.
    Failed {
        message: String,
        attempts: usize,
        diagnostics: String,
    },
}

#[derive(Default, ScenarioState)]
pub(crate) struct EngineConnectionState {
    pub(crate) os: Slot<HostOs>,
    pub(crate) context_ok: Slot<bool>,
    pub(crate) existing_paths: Slot<Vec<String>>,
    pub(crate) env_vars: Slot<HashMap<String, String>>,
    pub(crate) config_socket: Slot<Option<String>>,
    pub(crate) probed_paths: Slot<usize>,
    pub(crate) result: Slot<ResolutionResult>,
}

#[fixture]
pub(crate) fn engine_connection_state() -> EngineConnectionState {
    let state = EngineConnectionState::default();
    state.os.set(HostOs::Linux);
    state.context_ok.set(false);
    state.existing_paths.set(Vec::new());
    state.env_vars.set(HashMap::new());
    state.config_socket.set(None);
    state
}
