//! Configuration data types for deskpod.

use std::fmt;

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

/// Root application configuration.
///
/// Loaded from defaults, a TOML file, environment variables and command-line
/// arguments, in increasing order of precedence. Every field is optional at
/// this stage; [`RunConfig`](super::RunConfig) decides what is required.
///
/// Configuration files are discovered in this order:
/// 1. `--config <path>`
/// 2. Path in the `DESKPOD_CONFIG_PATH` environment variable
/// 3. `.deskpod.toml` in the current working directory or home directory
/// 4. `~/.config/deskpod/config.toml`
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "DESKPOD",
    post_merge_hook,
    discovery(
        app_name = "deskpod",
        env_var = "DESKPOD_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".deskpod.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// Credential passed to the container as `ANTHROPIC_API_KEY`.
    #[ortho_config(skip_cli)]
    pub api_key: Option<String>,

    /// Image reference to run.
    pub image: Option<String>,

    /// Host directory bind-mounted into the container. `$VAR` references are
    /// expanded.
    #[ortho_config(skip_cli)]
    pub host_config_path: Option<String>,

    /// Mount point of the host directory inside the container.
    #[ortho_config(skip_cli)]
    pub container_config_path: Option<String>,

    /// Container engine socket path or URL used by ambient discovery.
    pub engine_socket: Option<String>,

    /// Optional name for the created container.
    #[ortho_config(skip_cli)]
    pub container_name: Option<String>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("image", &self.image)
            .field("host_config_path", &self.host_config_path)
            .field("container_config_path", &self.container_config_path)
            .field("engine_socket", &self.engine_socket)
            .field("container_name", &self.container_name)
            .finish()
    }
}

fn normalise(value: &mut Option<String>) {
    *value = value
        .take()
        .map(|raw| String::from(raw.trim()))
        .filter(|trimmed| !trimmed.is_empty());
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // Blank values from any layer count as unset.
        for field in [
            &mut self.api_key,
            &mut self.image,
            &mut self.host_config_path,
            &mut self.container_config_path,
            &mut self.engine_socket,
            &mut self.container_name,
        ] {
            normalise(field);
        }
        Ok(())
    }
}
