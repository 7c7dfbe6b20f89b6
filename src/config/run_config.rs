//! Validated launch parameters.
//!
//! [`AppConfig`] keeps every field optional so layers can be merged freely.
//! [`RunConfig`] is what the lifecycle controller actually consumes: all four
//! values present, paths absolute, credential hidden from `Debug`.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::AppConfig;
use crate::error::ConfigError;

/// Everything needed to launch the desktop container.
#[derive(Clone, PartialEq, Eq)]
pub struct RunConfig {
    credential: String,
    image: String,
    host_path: Utf8PathBuf,
    container_path: Utf8PathBuf,
    container_name: Option<String>,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("credential", &"<redacted>")
            .field("image", &self.image)
            .field("host_path", &self.host_path)
            .field("container_path", &self.container_path)
            .field("container_name", &self.container_name)
            .finish()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

fn require_absolute(field: &str, path: &Utf8Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: String::from(field),
            reason: format!("{path} is not an absolute path"),
        })
    }
}

impl RunConfig {
    /// Build a run configuration from raw values.
    ///
    /// Blank values count as missing. Every missing key is reported in one
    /// error, joined with `, `.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` listing the absent keys, or
    /// `ConfigError::InvalidValue` when either path is relative.
    pub fn new(
        credential: &str,
        image: &str,
        host_path: &str,
        container_path: &str,
    ) -> Result<Self, ConfigError> {
        Self::from_parts(
            Some(credential),
            Some(image),
            Some(host_path),
            Some(container_path),
        )
    }

    fn from_parts(
        credential: Option<&str>,
        image: Option<&str>,
        host_path: Option<&str>,
        container_path: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let fields = [
            ("ANTHROPIC_API_KEY", present(credential)),
            ("DOCKER_IMAGE", present(image)),
            ("HOST_CONFIG_PATH", present(host_path)),
            ("CONTAINER_CONFIG_PATH", present(container_path)),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();

        let [
            (_, Some(credential_value)),
            (_, Some(image_value)),
            (_, Some(host_value)),
            (_, Some(container_value)),
        ] = fields
        else {
            return Err(ConfigError::MissingRequired {
                field: missing.join(", "),
            });
        };

        let host = Utf8PathBuf::from(host_value);
        let container = Utf8PathBuf::from(container_value);
        require_absolute("HOST_CONFIG_PATH", &host)?;
        require_absolute("CONTAINER_CONFIG_PATH", &container)?;

        Ok(Self {
            credential: String::from(credential_value),
            image: String::from(image_value),
            host_path: host,
            container_path: container,
            container_name: None,
        })
    }

    /// Build a run configuration from merged application configuration.
    ///
    /// `$VAR` and `${VAR}` references in the host path are expanded from
    /// `env`. Unknown variables are left as written.
    ///
    /// # Errors
    ///
    /// As for [`RunConfig::new`].
    pub fn from_app_config<E: mockable::Env>(
        config: &AppConfig,
        env: &E,
    ) -> Result<Self, ConfigError> {
        let expanded_host = config
            .host_config_path
            .as_deref()
            .map(|raw| shellexpand::env_with_context_no_errors(raw, |var| env.string(var)));

        let run_config = Self::from_parts(
            config.api_key.as_deref(),
            config.image.as_deref(),
            expanded_host.as_deref(),
            config.container_config_path.as_deref(),
        )?;
        Ok(run_config.with_container_name(config.container_name.clone()))
    }

    /// Set the name given to the created container.
    #[must_use]
    pub fn with_container_name(mut self, name: Option<String>) -> Self {
        self.container_name = name.filter(|value| !value.trim().is_empty());
        self
    }

    /// Credential passed to the container environment.
    #[must_use]
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Image reference to run.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Host directory to bind-mount.
    #[must_use]
    pub fn host_path(&self) -> &Utf8Path {
        &self.host_path
    }

    /// Mount point inside the container.
    #[must_use]
    pub fn container_path(&self) -> &Utf8Path {
        &self.container_path
    }

    /// Optional container name.
    #[must_use]
    pub fn container_name(&self) -> Option<&str> {
        self.container_name.as_deref()
    }
}
