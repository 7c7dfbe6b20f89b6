//! Host probe backed by the real engine CLI, filesystem and environment.

use std::process::{Command, Stdio};

use camino::{Utf8Path, Utf8PathBuf};

use super::{HostOs, HostProbe};
use crate::engine::connection::{EngineConnector, SocketResolver};

const DEFAULT_ENGINE_CLI: &str = "docker";

#[cfg(unix)]
const HOME_ENV_VAR: &str = "HOME";

#[cfg(windows)]
const HOME_ENV_VAR: &str = "USERPROFILE";

/// Reads host facts from the running system.
///
/// Environment access goes through `mockable::Env` so ambient discovery can be
/// tested with a mock environment while still shelling out to the real CLI.
pub struct SystemHostProbe<'a, E: mockable::Env> {
    env: &'a E,
    engine_cli: String,
    config_socket: Option<String>,
}

impl<'a, E: mockable::Env> SystemHostProbe<'a, E> {
    /// Create a probe using the `docker` CLI and no configured socket.
    #[must_use]
    pub fn new(env: &'a E) -> Self {
        Self {
            env,
            engine_cli: String::from(DEFAULT_ENGINE_CLI),
            config_socket: None,
        }
    }

    /// Use an explicitly configured socket ahead of environment discovery.
    #[must_use]
    pub fn with_config_socket(mut self, config_socket: Option<String>) -> Self {
        self.config_socket = config_socket.filter(|value| !value.trim().is_empty());
        self
    }

    /// Use a different engine CLI binary (for example `podman`).
    #[must_use]
    pub fn with_engine_cli(mut self, engine_cli: impl Into<String>) -> Self {
        self.engine_cli = engine_cli.into();
        self
    }

    fn context_command(&self, subcommand: &str) -> Command {
        let mut command = Command::new(&self.engine_cli);
        command.args(["context", subcommand]).stdin(Stdio::null());
        command
    }
}

impl<E: mockable::Env> HostProbe for SystemHostProbe<'_, E> {
    fn host_os(&self) -> HostOs {
        HostOs::current()
    }

    #[cfg(unix)]
    fn os_release(&self) -> Option<String> {
        let output = Command::new("uname").arg("-r").output().ok()?;
        if !output.status.success() {
            return None;
        }
        let release = String::from_utf8(output.stdout).ok()?;
        Some(release.trim().to_owned()).filter(|value| !value.is_empty())
    }

    #[cfg(not(unix))]
    fn os_release(&self) -> Option<String> {
        None
    }

    fn context_inspect_succeeds(&self) -> bool {
        match self
            .context_command("inspect")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) => status.success(),
            Err(error) => {
                tracing::debug!(cli = %self.engine_cli, %error, "could not run context inspect");
                false
            }
        }
    }

    fn context_list(&self) -> Option<String> {
        let output = self.context_command("ls").output().ok()?;
        String::from_utf8(output.stdout).ok()
    }

    fn path_exists(&self, path: &Utf8Path) -> bool {
        path.exists()
    }

    fn home_dir(&self) -> Option<Utf8PathBuf> {
        self.env
            .string(HOME_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(Utf8PathBuf::from)
    }

    fn ambient_socket(&self) -> String {
        let resolver = SocketResolver::new(self.env);
        EngineConnector::resolve_socket(self.config_socket.as_deref(), &resolver)
    }
}
