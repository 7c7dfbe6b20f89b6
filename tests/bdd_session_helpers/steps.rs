//! Given/when steps for session scenarios.

use deskpod::api;
use deskpod::config::RunConfig;
use deskpod::engine::interrupt_channel;
use rstest_bdd_macros::{given, when};

use super::StepResult;
use super::engine::{ScriptedEngine, StopBehaviour, WaitBehaviour};
use super::state::{SessionResult, SessionState};

#[given("the configuration has no API key")]
fn given_no_api_key(session_state: &SessionState) {
    session_state.api_key.set(String::new());
}

#[given("the image does not exist on the registry")]
fn given_image_missing(session_state: &SessionState) {
    session_state.image_missing.set(true);
}

#[given("the operator interrupts twice while the image is pulling")]
fn given_interrupts_during_pull(session_state: &SessionState) {
    session_state.pull_interrupts.set(2);
}

#[given("the container runs until interrupted")]
fn given_runs_until_interrupted(session_state: &SessionState) {
    session_state.wait.set(WaitBehaviour::Pending);
}

#[given("the container exits with status {code}")]
fn given_container_exits(session_state: &SessionState, code: i64) {
    session_state.wait.set(WaitBehaviour::Exits(code));
}

#[given("stopping the container fails")]
fn given_stop_fails(session_state: &SessionState) {
    session_state.stop.set(StopBehaviour::Fails);
}

#[given("stopping the container hangs until the operator interrupts again")]
fn given_stop_hangs(session_state: &SessionState) {
    session_state.stop.set(StopBehaviour::HangsUntilInterrupted);
}

/// Run one session, sending `interrupts` interrupts once the container is up.
fn run_session(session_state: &SessionState, interrupts: usize) -> StepResult<()> {
    let (sender, mut receiver) = interrupt_channel();
    let engine = ScriptedEngine::new(
        session_state.image_missing.get().unwrap_or(false),
        session_state.wait.get().unwrap_or(WaitBehaviour::Pending),
        session_state.stop.get().unwrap_or(StopBehaviour::Succeeds),
    )
    .with_operator(
        sender.clone(),
        session_state.pull_interrupts.get().unwrap_or(0),
    );

    let api_key = session_state.api_key.get().unwrap_or_default();
    let run_config = match RunConfig::new(
        &api_key,
        "ghcr.io/example/desktop:latest",
        "/Users/operator/.desktop",
        "/home/agent/.config",
    ) {
        Ok(config) => config,
        Err(error) => {
            session_state.result.set(SessionResult::Err(error.to_string()));
            session_state.calls.set(engine.calls());
            return Ok(());
        }
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| format!("failed to create tokio runtime: {error}"))?;

    let result = rt.block_on(api::run(&engine, &run_config, &mut receiver, |report| {
        session_state.published_ports.set(report.ports.len());
        for _ in 0..interrupts {
            assert!(sender.interrupt(), "interrupt channel should be open");
        }
    }));

    session_state.result.set(match result {
        Ok(outcome) => SessionResult::Ok(outcome),
        Err(error) => SessionResult::Err(error.to_string()),
    });
    session_state.calls.set(engine.calls());
    if let Some(body) = engine.created_body() {
        let binds = body
            .host_config
            .and_then(|host_config| host_config.binds)
            .map_or(0, |binds| binds.len());
        session_state.bind_mounts.set(binds);
    }
    Ok(())
}

#[when("the session runs")]
fn when_session_runs(session_state: &SessionState) -> StepResult<()> {
    run_session(session_state, 0)
}

#[when("the session runs and the operator interrupts once")]
fn when_interrupted_once(session_state: &SessionState) -> StepResult<()> {
    run_session(session_state, 1)
}

#[when("the session runs and the operator interrupts twice")]
fn when_interrupted_twice(session_state: &SessionState) -> StepResult<()> {
    run_session(session_state, 2)
}
