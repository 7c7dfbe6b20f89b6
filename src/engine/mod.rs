//! Container engine connection and container lifecycle.
//!
//! [`EngineConnector`] resolves a control endpoint through an ordered list of
//! strategies and hands back a verified Bollard client:
//!
//! 1. Active engine context (`docker context inspect` succeeds)
//! 2. Docker Desktop socket (macOS only)
//! 3. Standard socket `/var/run/docker.sock` (macOS only)
//! 4. Ambient discovery on other hosts: `--engine-socket`, config file or
//!    `DESKPOD_ENGINE_SOCKET`, then `DOCKER_HOST`, `CONTAINER_HOST`,
//!    `PODMAN_HOST`, then the platform default
//!
//! [`LifecycleController`] then drives a single container through pull,
//! launch, supervised wait and teardown.

mod connection;
mod lifecycle;

pub use connection::{
    AttemptOutcome, BindMount, CREDENTIAL_ENV_VAR, ConnectionAttempt, ConnectionDiagnostics,
    ContainerCreator, CreateContainerFuture, CreateContainerRequest, DESKTOP_SOCKET_SUFFIX,
    EngineConnector, EngineEndpoint, HostOs, HostProbe, PUBLISHED_PORTS, PortPublication,
    Resolution, ResolutionMethod, STANDARD_SOCKET_PATH, SocketResolver, SocketStatus,
    StrategyOutcome, SystemHostProbe,
};
pub use lifecycle::{
    ContainerHandle, ContainerLifecycleClient, EngineUnitFuture, ImageReference, InterruptSender,
    Interrupts, LaunchOutcome, LaunchReport, LifecycleController, LifecycleState, TeardownReport, Termination,
    WaitContainerFuture, forward_ctrl_c, interrupt_channel,
};
