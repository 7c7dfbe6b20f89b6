//! Then steps for session scenarios.

use deskpod::api::RunOutcome;
use rstest_bdd_macros::then;

use super::StepResult;
use super::state::{SessionResult, SessionState};

fn result(session_state: &SessionState) -> StepResult<SessionResult> {
    session_state
        .result
        .get()
        .ok_or_else(|| String::from("session result should be set"))
}

fn expect_error_containing(session_state: &SessionState, needle: &str) -> StepResult<()> {
    match result(session_state)? {
        SessionResult::Err(message) if message.contains(needle) => Ok(()),
        SessionResult::Err(message) => {
            Err(format!("expected error containing '{needle}', got '{message}'"))
        }
        SessionResult::Ok(outcome) => Err(format!("expected an error, got {outcome:?}")),
    }
}

#[then("the session fails with missing {key}")]
fn fails_with_missing(session_state: &SessionState, key: String) -> StepResult<()> {
    expect_error_containing(session_state, "missing required configuration")?;
    expect_error_containing(session_state, &key)
}

#[then("the session fails because the image was not found")]
fn fails_with_image_not_found(session_state: &SessionState) -> StepResult<()> {
    expect_error_containing(session_state, "not found")
}

#[then("the session fails with a teardown error")]
fn fails_with_teardown_error(session_state: &SessionState) -> StepResult<()> {
    expect_error_containing(session_state, "failed to tear down container")
}

#[then("the session ends as interrupted")]
fn ends_as_interrupted(session_state: &SessionState) -> StepResult<()> {
    match result(session_state)? {
        SessionResult::Ok(RunOutcome::Interrupted) => Ok(()),
        other => Err(format!("expected Interrupted, got {other:?}")),
    }
}

#[then("the session ends before a container was launched")]
fn ends_before_launch(session_state: &SessionState) -> StepResult<()> {
    match result(session_state)? {
        SessionResult::Ok(RunOutcome::CancelledBeforeLaunch) => Ok(()),
        other => Err(format!("expected CancelledBeforeLaunch, got {other:?}")),
    }
}

#[then("the session ends with exit status {code}")]
fn ends_with_exit_status(session_state: &SessionState, code: i64) -> StepResult<()> {
    match result(session_state)? {
        SessionResult::Ok(RunOutcome::ContainerExited { code: actual }) if actual == code => {
            Ok(())
        }
        other => Err(format!("expected exit status {code}, got {other:?}")),
    }
}

#[then("no engine call was made")]
fn no_engine_call(session_state: &SessionState) -> StepResult<()> {
    let calls = session_state.calls.get().unwrap_or_default();
    if calls.is_empty() {
        Ok(())
    } else {
        Err(format!("expected no engine calls, got {calls:?}"))
    }
}

#[then("the engine calls were {expected}")]
fn engine_calls_were(session_state: &SessionState, expected: String) -> StepResult<()> {
    let calls = session_state
        .calls
        .get()
        .ok_or_else(|| String::from("engine calls should be recorded"))?;
    let expected_calls: Vec<&str> = expected.split(", ").collect();
    if calls == expected_calls {
        Ok(())
    } else {
        Err(format!("expected calls {expected_calls:?}, got {calls:?}"))
    }
}

#[then("{count} ports are published")]
fn ports_are_published(session_state: &SessionState, count: usize) -> StepResult<()> {
    match session_state.published_ports.get() {
        Some(actual) if actual == count => Ok(()),
        other => Err(format!("expected {count} published ports, got {other:?}")),
    }
}

#[then("{count} bind mount is requested")]
fn bind_mount_is_requested(session_state: &SessionState, count: usize) -> StepResult<()> {
    match session_state.bind_mounts.get() {
        Some(actual) if actual == count => Ok(()),
        other => Err(format!("expected {count} bind mounts, got {other:?}")),
    }
}
