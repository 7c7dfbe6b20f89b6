//! Semantic error types for the deskpod application.
//!
//! This module defines the error hierarchy for deskpod, following the principle
//! of using semantic error enums (via `thiserror`) for conditions the caller
//! might inspect or report, while reserving opaque errors (`eyre::Report`) for
//! the application boundary.
//!
//! No error in this hierarchy is retried. Each one ends the run and the binary
//! maps it to exit status 1.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::engine::ConnectionAttempt;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// One or more required configuration values are missing.
    ///
    /// `field` lists every missing name, comma separated.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The names of the missing fields.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error while merging layers.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors that can occur while reaching the container engine.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// No resolution strategy produced an endpoint.
    #[error("no valid container engine endpoint found")]
    NoValidEndpoint,

    /// Failed to connect to the container engine.
    #[error("failed to connect to container engine: {message}")]
    ConnectionFailed {
        /// A description of the connection failure.
        message: String,
    },

    /// The container engine socket was not found.
    #[error("container engine socket not found: {path}")]
    SocketNotFound {
        /// The path where the socket was expected.
        path: PathBuf,
    },

    /// Permission denied when accessing the container engine socket.
    #[error("permission denied accessing container socket: {path}")]
    PermissionDenied {
        /// The path to the socket.
        path: PathBuf,
    },

    /// The engine accepted the connection but did not answer the ping.
    #[error("container engine health check failed: {message}")]
    HealthCheckFailed {
        /// A description of the health check failure.
        message: String,
    },

    /// The ping did not complete in time.
    #[error("container engine health check timed out after {seconds} seconds")]
    HealthCheckTimeout {
        /// The timeout duration in seconds.
        seconds: u64,
    },
}

/// A connection failure together with the resolution attempts that led to it.
///
/// The attempt log is what the operator-facing diagnostics report prints as
/// "resolution paths tried".
#[derive(Debug, Error)]
#[error("{error}")]
pub struct EngineUnavailable {
    /// The underlying connection failure.
    pub error: ConnectionError,

    /// Every strategy evaluated, in order.
    pub attempts: Vec<ConnectionAttempt>,
}

impl EngineUnavailable {
    /// Wrap a connection error with the attempts made so far.
    #[must_use]
    pub const fn new(error: ConnectionError, attempts: Vec<ConnectionAttempt>) -> Self {
        Self { error, attempts }
    }
}

/// A teardown step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStep {
    /// The graceful stop request.
    Stop,
    /// The forced kill issued after a repeated interrupt.
    Kill,
    /// The remove request.
    Remove,
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Stop => "stop",
            Self::Kill => "kill",
            Self::Remove => "remove",
        };
        f.write_str(label)
    }
}

/// Errors that can occur while driving the container lifecycle.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The image reference does not exist on the registry.
    #[error("image '{image}' not found")]
    ImageNotFound {
        /// The image reference that was requested.
        image: String,
    },

    /// Pulling the image failed for a reason other than a missing image.
    #[error("failed to pull image '{image}': {message}")]
    PullFailed {
        /// The image reference that was requested.
        image: String,
        /// A description of the pull failure.
        message: String,
    },

    /// Failed to create a container.
    #[error("failed to create container: {message}")]
    CreateFailed {
        /// A description of the creation failure.
        message: String,
    },

    /// Failed to start a container.
    #[error("failed to start container '{container_id}': {message}")]
    StartFailed {
        /// The ID of the container that failed to start.
        container_id: String,
        /// A description of the start failure.
        message: String,
    },

    /// Waiting for the container to exit failed.
    #[error("failed to wait for container '{container_id}': {message}")]
    WaitFailed {
        /// The ID of the container being waited on.
        container_id: String,
        /// A description of the wait failure.
        message: String,
    },

    /// One or more teardown steps failed.
    #[error("failed to tear down container '{container_id}': {message}")]
    TeardownFailed {
        /// The ID of the container being torn down.
        container_id: String,
        /// The steps that failed, in the order they ran.
        failed_steps: Vec<TeardownStep>,
        /// The engine messages for each failed step.
        message: String,
    },

    /// A lifecycle operation was requested from a state that does not allow it.
    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidTransition {
        /// The current state.
        from: String,
        /// The requested state.
        to: String,
    },
}

/// Top-level error type for the deskpod application.
///
/// At the application boundary (`main.rs`) these errors are converted to
/// `eyre::Report` for human-readable reporting.
#[derive(Debug, Error)]
pub enum DeskpodError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The container engine could not be reached.
    #[error(transparent)]
    Engine(#[from] EngineUnavailable),

    /// An error occurred during container operations.
    #[error(transparent)]
    Container(#[from] ContainerError),
}

impl From<ConnectionError> for DeskpodError {
    fn from(error: ConnectionError) -> Self {
        Self::Engine(EngineUnavailable::new(error, Vec::new()))
    }
}

/// A specialised `Result` type for deskpod operations.
pub type Result<T> = std::result::Result<T, DeskpodError>;
