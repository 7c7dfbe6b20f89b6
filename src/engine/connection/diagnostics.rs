//! Operator-facing report for an unreachable container engine.
//!
//! The report is a plain value so the binary decides where it is printed.
//! Collecting it never fails: facts that cannot be read are shown as
//! unavailable instead.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

use super::resolution::{HostOs, HostProbe, STANDARD_SOCKET_PATH, desktop_socket_path};
use crate::engine::ConnectionAttempt;
use crate::error::EngineUnavailable;

/// Whether a well-known socket path exists on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketStatus {
    /// The socket path checked.
    pub path: Utf8PathBuf,
    /// Whether the path exists.
    pub exists: bool,
}

/// Everything the operator needs to work out why the engine is unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDiagnostics {
    /// Host operating system family.
    pub os: HostOs,
    /// OS release string, if known.
    pub os_release: Option<String>,
    /// Existence of the standard and desktop sockets.
    pub sockets: Vec<SocketStatus>,
    /// Output of `docker context ls`, or `None` if it could not be queried.
    pub contexts: Option<String>,
    /// Resolution paths tried, in order.
    pub attempts: Vec<ConnectionAttempt>,
    /// The raw error text.
    pub error: String,
}

impl ConnectionDiagnostics {
    /// Gather diagnostics for `failure` from the host.
    #[must_use]
    pub fn collect(probe: &dyn HostProbe, failure: &EngineUnavailable) -> Self {
        let mut socket_paths = vec![Utf8PathBuf::from(STANDARD_SOCKET_PATH)];
        socket_paths.extend(desktop_socket_path(probe));

        let sockets = socket_paths
            .into_iter()
            .map(|path| SocketStatus {
                exists: probe.path_exists(&path),
                path,
            })
            .collect();

        Self {
            os: probe.host_os(),
            os_release: probe.os_release(),
            sockets,
            contexts: probe.context_list(),
            attempts: failure.attempts.clone(),
            error: failure.error.to_string(),
        }
    }

    /// Troubleshooting steps for the host OS.
    #[must_use]
    pub fn hints(&self) -> Vec<String> {
        if self.os.is_macos_family() {
            let mut hints = vec![String::from("Verify Docker Desktop is running")];
            hints.extend(self.sockets.iter().map(|socket| socket_hint(&socket.path, socket.exists)));
            hints.extend([
                String::from("Inspect contexts: docker context ls"),
                String::from("Inspect the desktop context: docker context inspect desktop-linux"),
                String::from("Check for an override: echo $DOCKER_HOST"),
            ]);
            hints
        } else {
            vec![
                String::from("Check the engine is running: systemctl status docker"),
                String::from("Check socket permissions: groups | grep docker"),
                String::from("Try a client command: docker ps"),
            ]
        }
    }
}

fn socket_hint(path: &Utf8Path, exists: bool) -> String {
    if exists {
        format!("Check socket permissions: stat {path}")
    } else {
        format!("Socket missing, check: ls -l {path}")
    }
}

impl fmt::Display for ConnectionDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Could not connect to the container engine.")?;
        writeln!(f)?;
        writeln!(f, "Troubleshooting ({}):", self.os.name())?;
        for (index, hint) in self.hints().iter().enumerate() {
            writeln!(f, "  {}. {hint}", index + 1)?;
        }

        writeln!(f)?;
        writeln!(f, "Resolution paths tried:")?;
        for attempt in &self.attempts {
            writeln!(f, "  - {attempt}")?;
        }

        writeln!(f)?;
        writeln!(f, "Debug information:")?;
        match &self.os_release {
            Some(release) => writeln!(f, "  OS: {} {release}", self.os.name())?,
            None => writeln!(f, "  OS: {}", self.os.name())?,
        }
        for socket in &self.sockets {
            let state = if socket.exists { "yes" } else { "no" };
            writeln!(f, "  {} exists: {state}", socket.path)?;
        }

        writeln!(f)?;
        match &self.contexts {
            Some(contexts) => {
                writeln!(f, "Engine contexts:")?;
                writeln!(f, "{}", contexts.trim_end())?;
            }
            None => writeln!(f, "Could not get engine context information")?,
        }

        writeln!(f)?;
        write!(f, "Original error: {}", self.error)
    }
}
