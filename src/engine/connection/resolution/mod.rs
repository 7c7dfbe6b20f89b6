//! Ordered endpoint resolution strategies.
//!
//! Each strategy is a plain function from host facts to a
//! [`StrategyOutcome`]. Strategies are evaluated in order and the first one
//! that resolves an endpoint wins. Host facts are read through the
//! [`HostProbe`] seam so every strategy can be exercised without a real engine
//! CLI or filesystem.
//!
//! Order:
//! 1. Active context: `docker context inspect` succeeds, so ambient discovery
//!    is trusted.
//! 2. Desktop socket (macOS only): `~/.docker/run/docker.sock`.
//! 3. Standard socket (macOS only): `/var/run/docker.sock`.
//! 4. Ambient discovery (all other hosts): configured socket, `DOCKER_HOST`,
//!    `CONTAINER_HOST`, `PODMAN_HOST`, platform default.

mod system;


use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

use super::EngineConnector;
use crate::error::{ConnectionError, EngineUnavailable};

pub use system::SystemHostProbe;

/// Path of the Docker Desktop socket relative to the home directory.
pub const DESKTOP_SOCKET_SUFFIX: &str = ".docker/run/docker.sock";

/// Path of the standard engine socket.
pub const STANDARD_SOCKET_PATH: &str = "/var/run/docker.sock";

/// Host operating system family, as far as endpoint resolution cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    /// macOS (Darwin).
    MacOs,
    /// Linux.
    Linux,
    /// Windows.
    Windows,
    /// Anything else, carrying the raw OS name.
    Other(&'static str),
}

impl HostOs {
    /// Map a Rust target OS name (as in `std::env::consts::OS`) to a family.
    #[must_use]
    pub fn from_name(name: &'static str) -> Self {
        match name {
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            "windows" => Self::Windows,
            other => Self::Other(other),
        }
    }

    /// The OS this binary is running on.
    #[must_use]
    pub fn current() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Whether socket probing applies to this host.
    #[must_use]
    pub const fn is_macos_family(self) -> bool {
        matches!(self, Self::MacOs)
    }

    /// Human-readable OS name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
            Self::Windows => "Windows",
            Self::Other(name) => name,
        }
    }
}

/// Facts about the host that endpoint resolution and diagnostics depend on.
#[cfg_attr(test, mockall::automock)]
pub trait HostProbe {
    /// The host operating system family.
    fn host_os(&self) -> HostOs;

    /// The OS release string, when it can be determined.
    fn os_release(&self) -> Option<String>;

    /// Whether `docker context inspect` exits successfully.
    fn context_inspect_succeeds(&self) -> bool;

    /// Output of `docker context ls`, or `None` if the command could not run.
    fn context_list(&self) -> Option<String>;

    /// Whether `path` exists on the host filesystem.
    fn path_exists(&self, path: &Utf8Path) -> bool;

    /// The operator's home directory.
    fn home_dir(&self) -> Option<Utf8PathBuf>;

    /// The endpoint produced by ambient environment-based discovery.
    fn ambient_socket(&self) -> String;
}

/// Which strategy produced an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMethod {
    /// The active engine context was inspected successfully.
    ActiveContext,
    /// The Docker Desktop per-user socket.
    DesktopSocket,
    /// The standard system socket.
    StandardSocket,
    /// Ambient environment-based discovery.
    AmbientDiscovery,
}

impl fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ActiveContext => "active context",
            Self::DesktopSocket => "desktop socket",
            Self::StandardSocket => "standard socket",
            Self::AmbientDiscovery => "ambient discovery",
        };
        f.write_str(label)
    }
}

/// A resolved engine control endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEndpoint {
    method: ResolutionMethod,
    target: String,
}

impl EngineEndpoint {
    /// Create an endpoint resolved by `method`.
    #[must_use]
    pub fn new(method: ResolutionMethod, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
        }
    }

    /// Return the strategy that produced this endpoint.
    #[must_use]
    pub const fn method(&self) -> ResolutionMethod {
        self.method
    }

    /// Return the endpoint URI or path.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Result of evaluating one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// The strategy produced an endpoint.
    Resolved(EngineEndpoint),
    /// The strategy did not apply or found nothing.
    Skipped {
        /// The path or endpoint the strategy looked at, if any.
        target: Option<String>,
        /// Why the strategy did not resolve.
        reason: &'static str,
    },
}

/// What happened when a strategy was evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The strategy's endpoint was selected.
    Selected,
    /// The strategy did not resolve.
    Skipped(&'static str),
    /// The endpoint was selected but connecting or pinging it failed.
    Failed(String),
}

/// One entry in the resolution log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionAttempt {
    /// The strategy evaluated.
    pub method: ResolutionMethod,
    /// The path or endpoint examined.
    pub target: Option<String>,
    /// The result.
    pub outcome: AttemptOutcome,
}

impl fmt::Display for ConnectionAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.method)?;
        if let Some(target) = &self.target {
            write!(f, " ({target})")?;
        }
        match &self.outcome {
            AttemptOutcome::Selected => f.write_str(": selected"),
            AttemptOutcome::Skipped(reason) => write!(f, ": skipped, {reason}"),
            AttemptOutcome::Failed(message) => write!(f, ": failed, {message}"),
        }
    }
}

/// A successful resolution together with its attempt log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    endpoint: EngineEndpoint,
    attempts: Vec<ConnectionAttempt>,
}

impl Resolution {
    /// Return the winning endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &EngineEndpoint {
        &self.endpoint
    }

    /// Return every attempt made, ending with the selected one.
    #[must_use]
    pub fn attempts(&self) -> &[ConnectionAttempt] {
        &self.attempts
    }

    /// Record that the selected endpoint failed to connect.
    pub(crate) fn into_failure(self, error: ConnectionError) -> EngineUnavailable {
        let Self { mut attempts, .. } = self;
        if let Some(last) = attempts.last_mut() {
            last.outcome = AttemptOutcome::Failed(error.to_string());
        }
        EngineUnavailable::new(error, attempts)
    }
}

type Strategy = fn(&dyn HostProbe) -> StrategyOutcome;

/// Resolution strategies in evaluation order.
const STRATEGIES: &[(ResolutionMethod, Strategy)] = &[
    (ResolutionMethod::ActiveContext, active_context),
    (ResolutionMethod::DesktopSocket, desktop_socket),
    (ResolutionMethod::StandardSocket, standard_socket),
    (ResolutionMethod::AmbientDiscovery, ambient_discovery),
];

fn active_context(probe: &dyn HostProbe) -> StrategyOutcome {
    if probe.context_inspect_succeeds() {
        StrategyOutcome::Resolved(EngineEndpoint::new(
            ResolutionMethod::ActiveContext,
            probe.ambient_socket(),
        ))
    } else {
        StrategyOutcome::Skipped {
            target: None,
            reason: "context inspect failed",
        }
    }
}

/// Path of the Docker Desktop socket for the probed home directory.
pub(crate) fn desktop_socket_path(probe: &dyn HostProbe) -> Option<Utf8PathBuf> {
    probe.home_dir().map(|home| home.join(DESKTOP_SOCKET_SUFFIX))
}

fn probe_socket(
    probe: &dyn HostProbe,
    method: ResolutionMethod,
    path: &Utf8Path,
) -> StrategyOutcome {
    if probe.path_exists(path) {
        StrategyOutcome::Resolved(EngineEndpoint::new(method, format!("unix://{path}")))
    } else {
        StrategyOutcome::Skipped {
            target: Some(path.to_string()),
            reason: "socket does not exist",
        }
    }
}

fn desktop_socket(probe: &dyn HostProbe) -> StrategyOutcome {
    if !probe.host_os().is_macos_family() {
        return StrategyOutcome::Skipped {
            target: None,
            reason: "not a macOS host",
        };
    }
    desktop_socket_path(probe).map_or(
        StrategyOutcome::Skipped {
            target: None,
            reason: "home directory unknown",
        },
        |path| probe_socket(probe, ResolutionMethod::DesktopSocket, &path),
    )
}

fn standard_socket(probe: &dyn HostProbe) -> StrategyOutcome {
    if !probe.host_os().is_macos_family() {
        return StrategyOutcome::Skipped {
            target: None,
            reason: "not a macOS host",
        };
    }
    probe_socket(
        probe,
        ResolutionMethod::StandardSocket,
        Utf8Path::new(STANDARD_SOCKET_PATH),
    )
}

fn ambient_discovery(probe: &dyn HostProbe) -> StrategyOutcome {
    if probe.host_os().is_macos_family() {
        return StrategyOutcome::Skipped {
            target: None,
            reason: "macOS hosts use socket probing",
        };
    }
    StrategyOutcome::Resolved(EngineEndpoint::new(
        ResolutionMethod::AmbientDiscovery,
        probe.ambient_socket(),
    ))
}

impl EngineConnector {
    /// Resolve an engine endpoint by evaluating the strategies in order.
    ///
    /// Evaluation stops at the first strategy that resolves; later strategies
    /// are not consulted. No connection is attempted here.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::NoValidEndpoint`, wrapped with the attempt
    /// log, when no strategy resolves.
    pub fn resolve(probe: &dyn HostProbe) -> Result<Resolution, EngineUnavailable> {
        let mut attempts = Vec::with_capacity(STRATEGIES.len());

        for (method, strategy) in STRATEGIES {
            match strategy(probe) {
                StrategyOutcome::Resolved(endpoint) => {
                    tracing::info!(
                        method = %endpoint.method(),
                        endpoint = endpoint.target(),
                        "resolved container engine endpoint"
                    );
                    attempts.push(ConnectionAttempt {
                        method: *method,
                        target: Some(endpoint.target().to_owned()),
                        outcome: AttemptOutcome::Selected,
                    });
                    return Ok(Resolution { endpoint, attempts });
                }
                StrategyOutcome::Skipped { target, reason } => {
                    tracing::debug!(method = %method, reason, "resolution strategy skipped");
                    attempts.push(ConnectionAttempt {
                        method: *method,
                        target,
                        outcome: AttemptOutcome::Skipped(reason),
                    });
                }
            }
        }

        Err(EngineUnavailable::new(
            ConnectionError::NoValidEndpoint,
            attempts,
        ))
    }
}
