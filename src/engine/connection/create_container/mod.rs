//! Container creation with the fixed desktop port and mount layout.
//!
//! Every container gets the same four TCP port publications and exactly one
//! read-write bind mount. Nothing in configuration can add to or remove from
//! that layout; only the image, the credential and the two mount paths vary.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use bollard::Docker;
use bollard::models::{ContainerCreateBody, ContainerCreateResponse, HostConfig, PortBinding};
use bollard::query_parameters::{CreateContainerOptions, CreateContainerOptionsBuilder};
use camino::{Utf8Path, Utf8PathBuf};

use super::EngineConnector;
use crate::error::{ConfigError, ContainerError};

/// Environment variable the credential is exposed under inside the container.
pub const CREDENTIAL_ENV_VAR: &str = "ANTHROPIC_API_KEY";

/// Boxed future type returned by [`ContainerCreator`] implementors.
pub type CreateContainerFuture<'a> = Pin<
    Box<dyn Future<Output = Result<ContainerCreateResponse, bollard::errors::Error>> + Send + 'a>,
>;

/// Behaviour required to create a container via a backing engine client.
pub trait ContainerCreator {
    /// Create a container from `Bollard` options and body payload.
    fn create_container(
        &self,
        options: Option<CreateContainerOptions>,
        config: ContainerCreateBody,
    ) -> CreateContainerFuture<'_>;
}

impl ContainerCreator for Docker {
    fn create_container(
        &self,
        options: Option<CreateContainerOptions>,
        config: ContainerCreateBody,
    ) -> CreateContainerFuture<'_> {
        Box::pin(async move { Self::create_container(self, options, config).await })
    }
}

/// One host-to-container TCP port publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortPublication {
    /// Port on the host loopback and external interfaces.
    pub host: u16,
    /// Port inside the container.
    pub container: u16,
    /// What the port serves, for operator output.
    pub label: &'static str,
}

impl PortPublication {
    /// Engine port key, such as `5900/tcp`.
    #[must_use]
    pub fn container_key(&self) -> String {
        format!("{}/tcp", self.container)
    }

    fn binding(&self) -> PortBinding {
        PortBinding {
            host_ip: None,
            host_port: Some(self.host.to_string()),
        }
    }
}

impl fmt::Display for PortPublication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: localhost:{}", self.label, self.host)
    }
}

/// The compiled-in port layout. VNC is shifted to 5901 on the host.
pub const PUBLISHED_PORTS: [PortPublication; 4] = [
    PortPublication {
        host: 5901,
        container: 5900,
        label: "VNC",
    },
    PortPublication {
        host: 8501,
        container: 8501,
        label: "Web interface",
    },
    PortPublication {
        host: 6080,
        container: 6080,
        label: "noVNC",
    },
    PortPublication {
        host: 8080,
        container: 8080,
        label: "HTTP",
    },
];

/// The single read-write bind mount from host configuration into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    host: Utf8PathBuf,
    container: Utf8PathBuf,
}

impl BindMount {
    /// Pair a host directory with its mount point in the container.
    #[must_use]
    pub fn new(host: impl Into<Utf8PathBuf>, container: impl Into<Utf8PathBuf>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
        }
    }

    /// Host side of the mount.
    #[must_use]
    pub fn host(&self) -> &Utf8Path {
        &self.host
    }

    /// Container side of the mount.
    #[must_use]
    pub fn container(&self) -> &Utf8Path {
        &self.container
    }

    /// Engine bind specification, `host:container:rw`.
    #[must_use]
    pub fn bind_spec(&self) -> String {
        format!("{}:{}:rw", self.host, self.container)
    }
}

/// Container-creation request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateContainerRequest {
    image: String,
    name: Option<String>,
    env: Vec<String>,
    mount: BindMount,
}

impl CreateContainerRequest {
    /// Create a request for `image` with the given bind mount.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` when `image` is empty or
    /// whitespace-only.
    pub fn new(image: &str, mount: BindMount) -> Result<Self, ConfigError> {
        let trimmed = image.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: String::from("DOCKER_IMAGE"),
            });
        }

        Ok(Self {
            image: String::from(trimmed),
            name: None,
            env: Vec::new(),
            mount,
        })
    }

    /// Attach an optional container name. Blank names are ignored.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name.filter(|value| !value.trim().is_empty());
        self
    }

    /// Expose `credential` to the container as `ANTHROPIC_API_KEY`.
    #[must_use]
    pub fn with_credential(mut self, credential: &str) -> Self {
        self.env.push(format!("{CREDENTIAL_ENV_VAR}={credential}"));
        self
    }

    /// Return the configured image.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Return the optional configured name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return the environment entries in `KEY=value` form.
    #[must_use]
    pub fn env(&self) -> &[String] {
        &self.env
    }

    /// Return the bind mount.
    #[must_use]
    pub const fn mount(&self) -> &BindMount {
        &self.mount
    }
}

impl EngineConnector {
    /// Create a container through `creator` and return its id.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::CreateFailed` when the engine rejects the
    /// create request.
    pub async fn create_container_async<C: ContainerCreator + ?Sized>(
        creator: &C,
        request: &CreateContainerRequest,
    ) -> Result<String, ContainerError> {
        let options = build_create_options(request.name());
        let body = build_create_body(request);

        let response = creator
            .create_container(options, body)
            .await
            .map_err(|error| ContainerError::CreateFailed {
                message: error.to_string(),
            })?;

        for warning in &response.warnings {
            tracing::warn!(container_id = %response.id, %warning, "engine warning on create");
        }
        Ok(response.id)
    }
}

fn build_create_options(name: Option<&str>) -> Option<CreateContainerOptions> {
    name.map(|container_name| {
        CreateContainerOptionsBuilder::new()
            .name(container_name)
            .build()
    })
}

fn build_port_bindings() -> HashMap<String, Option<Vec<PortBinding>>> {
    PUBLISHED_PORTS
        .iter()
        .map(|port| (port.container_key(), Some(vec![port.binding()])))
        .collect()
}

/// Container-side keys of every published port, in [`PUBLISHED_PORTS`] order.
fn build_exposed_ports() -> Vec<String> {
    PUBLISHED_PORTS
        .iter()
        .map(PortPublication::container_key)
        .collect()
}

fn build_create_body(request: &CreateContainerRequest) -> ContainerCreateBody {
    ContainerCreateBody {
        image: Some(String::from(request.image())),
        env: Some(request.env().to_vec()),
        exposed_ports: Some(build_exposed_ports()),
        tty: Some(true),
        open_stdin: Some(true),
        host_config: Some(HostConfig {
            binds: Some(vec![request.mount().bind_spec()]),
            port_bindings: Some(build_port_bindings()),
            ..HostConfig::default()
        }),
        ..ContainerCreateBody::default()
    }
}
