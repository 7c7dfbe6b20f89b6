//! Endpoint resolution and container engine connection.
//!
//! This module resolves a control endpoint for the container engine through an
//! ordered list of strategies (see [`resolution`]), establishes a connection
//! using the Bollard library, and verifies the engine answers a ping before
//! handing the client to the lifecycle controller.

mod create_container;
mod diagnostics;
mod error_classification;
mod health_check;
mod resolution;

use bollard::Docker;

use crate::error::ConnectionError;

pub use create_container::{
    BindMount, CREDENTIAL_ENV_VAR, ContainerCreator, CreateContainerFuture, CreateContainerRequest,
    PUBLISHED_PORTS, PortPublication,
};
pub use diagnostics::{ConnectionDiagnostics, SocketStatus};
pub use resolution::{
    AttemptOutcome, ConnectionAttempt, DESKTOP_SOCKET_SUFFIX, EngineEndpoint, HostOs, HostProbe,
    Resolution, ResolutionMethod, STANDARD_SOCKET_PATH, StrategyOutcome, SystemHostProbe,
};

/// Environment variable names checked in fallback order after configuration sources.
const FALLBACK_ENV_VARS: &[&str] = &["DOCKER_HOST", "CONTAINER_HOST", "PODMAN_HOST"];

/// Connection timeout in seconds for Docker/Podman API connections.
const CONNECTION_TIMEOUT_SECS: u64 = 120;

/// Timeout in seconds for health check operations.
const HEALTH_CHECK_TIMEOUT_SECS: u64 = 10;

/// Default socket path for Unix platforms.
#[cfg(unix)]
const DEFAULT_SOCKET: &str = "unix:///var/run/docker.sock";

/// Default socket path for Windows platforms.
#[cfg(windows)]
const DEFAULT_SOCKET: &str = "npipe:////./pipe/docker_engine";

/// Resolves container engine socket endpoints from environment variables.
///
/// This is the ambient discovery used when the active engine context is
/// trusted, or on hosts outside the macOS family.
///
/// # Example
///
/// ```ignore
/// use mockable::DefaultEnv;
/// use deskpod::engine::SocketResolver;
///
/// let env = DefaultEnv::new();
/// let resolver = SocketResolver::new(&env);
///
/// if let Some(socket) = resolver.resolve_from_env() {
///     println!("Found socket: {}", socket);
/// }
/// ```
pub struct SocketResolver<'a, E: mockable::Env> {
    env: &'a E,
}

impl<'a, E: mockable::Env> SocketResolver<'a, E> {
    /// Creates a new socket resolver with the given environment provider.
    #[must_use]
    pub const fn new(env: &'a E) -> Self {
        Self { env }
    }

    /// Resolves the socket endpoint from fallback environment variables.
    ///
    /// Checks `DOCKER_HOST`, `CONTAINER_HOST` and `PODMAN_HOST` in that order
    /// and returns the first non-empty value.
    #[must_use]
    pub fn resolve_from_env(&self) -> Option<String> {
        FALLBACK_ENV_VARS
            .iter()
            .filter_map(|var_name| self.env.string(var_name))
            .find(|value| !value.is_empty())
    }

    /// Returns the platform default socket path.
    #[must_use]
    pub const fn default_socket() -> &'static str {
        DEFAULT_SOCKET
    }
}

/// Classifies socket endpoint types for connection handling.
enum SocketType {
    /// Unix socket or Windows named pipe with explicit scheme.
    Socket,
    /// HTTP, HTTPS, or TCP endpoint (TCP is rewritten to HTTP).
    Http,
    /// Bare path without scheme prefix.
    BarePath,
}

impl SocketType {
    fn is_socket_scheme(socket: &str) -> bool {
        socket.starts_with("unix://") || socket.starts_with("npipe://")
    }

    fn is_http_scheme(socket: &str) -> bool {
        socket.starts_with("tcp://")
            || socket.starts_with("http://")
            || socket.starts_with("https://")
    }

    fn classify(socket: &str) -> Self {
        match (Self::is_socket_scheme(socket), Self::is_http_scheme(socket)) {
            (true, _) => Self::Socket,
            (_, true) => Self::Http,
            _ => Self::BarePath,
        }
    }
}

/// Provides methods to resolve, connect to and verify the container engine.
pub struct EngineConnector;

impl EngineConnector {
    /// Connect to the container engine at the specified endpoint.
    ///
    /// Supports `unix://`, `npipe://`, `tcp://` (rewritten to `http://`),
    /// `http://` and `https://` endpoints. Bare paths starting with `\\` or
    /// `//` are treated as named pipes, any other bare path as a Unix socket.
    ///
    /// Constructing the client does not contact the engine; use
    /// [`Self::connect_and_verify_async`] to also run the liveness check.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::SocketNotFound`, `PermissionDenied` or
    /// `ConnectionFailed` depending on the underlying failure.
    pub fn connect(socket: &str) -> Result<Docker, ConnectionError> {
        let (socket_uri, docker) = match SocketType::classify(socket) {
            SocketType::Socket => (
                socket.to_owned(),
                Docker::connect_with_socket(
                    socket,
                    CONNECTION_TIMEOUT_SECS,
                    bollard::API_DEFAULT_VERSION,
                ),
            ),
            SocketType::Http => {
                let http_socket = if socket.starts_with("tcp://") {
                    socket.replacen("tcp://", "http://", 1)
                } else {
                    socket.to_owned()
                };
                let docker = Docker::connect_with_http(
                    &http_socket,
                    CONNECTION_TIMEOUT_SECS,
                    bollard::API_DEFAULT_VERSION,
                );
                (http_socket, docker)
            }
            SocketType::BarePath => {
                let socket_uri = Self::normalize_bare_path(socket);
                let docker = Docker::connect_with_socket(
                    &socket_uri,
                    CONNECTION_TIMEOUT_SECS,
                    bollard::API_DEFAULT_VERSION,
                );
                (socket_uri, docker)
            }
        };

        docker.map_err(|error| error_classification::classify_connection_error(&error, &socket_uri))
    }

    /// Normalize a bare socket path to a URI with the appropriate scheme.
    ///
    /// Detection is based on path syntax, not the current platform.
    fn normalize_bare_path(path: &str) -> String {
        if path.starts_with("\\\\") || path.starts_with("//") {
            format!("npipe://{path}")
        } else {
            format!("unix://{path}")
        }
    }

    /// Resolves the ambient socket endpoint without establishing a connection.
    ///
    /// Resolution order:
    /// 1. `config_socket` (from `--engine-socket`, config file, or
    ///    `DESKPOD_ENGINE_SOCKET`)
    /// 2. `DOCKER_HOST`, `CONTAINER_HOST`, `PODMAN_HOST` (via resolver)
    /// 3. Platform default socket
    #[must_use]
    pub fn resolve_socket<E: mockable::Env>(
        config_socket: Option<&str>,
        resolver: &SocketResolver<'_, E>,
    ) -> String {
        config_socket
            .filter(|s| !s.is_empty())
            .map(String::from)
            .or_else(|| resolver.resolve_from_env())
            .unwrap_or_else(|| SocketResolver::<E>::default_socket().to_owned())
    }
}
