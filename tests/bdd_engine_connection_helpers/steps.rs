//! Given/when steps for engine resolution scenarios.

use std::cell::Cell;

use deskpod::engine::{
    ConnectionDiagnostics, DESKTOP_SOCKET_SUFFIX, EngineConnector, HostOs, STANDARD_SOCKET_PATH,
};
use rstest_bdd_macros::{given, when};

use super::StepResult;
use super::probe::ScriptedHostProbe;
use super::state::{EngineConnectionState, ResolutionResult};

fn add_existing_path(state: &EngineConnectionState, path: String) -> StepResult<()> {
    let mut paths = state
        .existing_paths
        .get()
        .ok_or_else(|| String::from("existing paths should be initialised"))?;
    paths.push(path);
    state.existing_paths.set(paths);
    Ok(())
}

fn set_env_var(state: &EngineConnectionState, key: &str, value: &str) -> StepResult<()> {
    let mut vars = state
        .env_vars
        .get()
        .ok_or_else(|| String::from("env vars should be initialised"))?;
    vars.insert(String::from(key), String::from(value));
    state.env_vars.set(vars);
    Ok(())
}

#[given("a Linux host")]
fn given_linux_host(engine_connection_state: &EngineConnectionState) {
    engine_connection_state.os.set(HostOs::Linux);
}

#[given("a macOS host")]
fn given_macos_host(engine_connection_state: &EngineConnectionState) {
    engine_connection_state.os.set(HostOs::MacOs);
}

#[given("the engine context can be inspected")]
fn given_context_ok(engine_connection_state: &EngineConnectionState) {
    engine_connection_state.context_ok.set(true);
}

#[given("the engine context cannot be inspected")]
fn given_context_fails(engine_connection_state: &EngineConnectionState) {
    engine_connection_state.context_ok.set(false);
}

#[given("the desktop socket exists")]
fn given_desktop_socket(engine_connection_state: &EngineConnectionState) -> StepResult<()> {
    add_existing_path(
        engine_connection_state,
        format!("/Users/operator/{DESKTOP_SOCKET_SUFFIX}"),
    )
}

#[given("the standard socket exists")]
fn given_standard_socket(engine_connection_state: &EngineConnectionState) -> StepResult<()> {
    add_existing_path(engine_connection_state, String::from(STANDARD_SOCKET_PATH))
}

#[given("engine socket is configured as {socket}")]
fn given_config_socket(engine_connection_state: &EngineConnectionState, socket: String) {
    engine_connection_state.config_socket.set(Some(socket));
}

#[given("DOCKER_HOST is set to {value}")]
fn given_docker_host(
    engine_connection_state: &EngineConnectionState,
    value: String,
) -> StepResult<()> {
    set_env_var(engine_connection_state, "DOCKER_HOST", &value)
}

#[given("DOCKER_HOST is empty")]
fn given_docker_host_empty(engine_connection_state: &EngineConnectionState) -> StepResult<()> {
    set_env_var(engine_connection_state, "DOCKER_HOST", "")
}

#[given("CONTAINER_HOST is set to {value}")]
fn given_container_host(
    engine_connection_state: &EngineConnectionState,
    value: String,
) -> StepResult<()> {
    set_env_var(engine_connection_state, "CONTAINER_HOST", &value)
}

#[given("PODMAN_HOST is set to {value}")]
fn given_podman_host(
    engine_connection_state: &EngineConnectionState,
    value: String,
) -> StepResult<()> {
    set_env_var(engine_connection_state, "PODMAN_HOST", &value)
}

#[when("the endpoint is resolved")]
fn when_endpoint_resolved(engine_connection_state: &EngineConnectionState) -> StepResult<()> {
    let probe = ScriptedHostProbe {
        os: engine_connection_state
            .os
            .get()
            .ok_or_else(|| String::from("host OS should be set"))?,
        context_ok: engine_connection_state.context_ok.get().unwrap_or(false),
        existing_paths: engine_connection_state
            .existing_paths
            .get()
            .unwrap_or_default(),
        env_vars: engine_connection_state.env_vars.get().unwrap_or_default(),
        config_socket: engine_connection_state.config_socket.get().flatten(),
        probed_paths: Cell::new(0),
    };

    let result = match EngineConnector::resolve(&probe) {
        Ok(resolution) => {
            engine_connection_state
                .probed_paths
                .set(probe.probed_paths.get());
            ResolutionResult::Resolved {
                target: String::from(resolution.endpoint().target()),
                method: resolution.endpoint().method(),
            }
        }
        Err(failure) => {
            engine_connection_state
                .probed_paths
                .set(probe.probed_paths.get());
            ResolutionResult::Failed {
                message: failure.error.to_string(),
                attempts: failure.attempts.len(),
                diagnostics: ConnectionDiagnostics::collect(&probe, &failure).to_string(),
            }
        }
    };
    engine_connection_state.result.set(result);
    Ok(())
}
