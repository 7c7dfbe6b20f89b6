//! Configuration system for deskpod.
//!
//! [`AppConfig`] is assembled by [`load_config`] from defaults, a TOML file,
//! environment variables and command-line flags, in increasing order of
//! precedence. [`RunConfig`] then validates the merged values into what the
//! container launch needs.
//!
//! # Example Configuration
//!
//! ```toml
//! api_key = "sk-..."
//! image = "ghcr.io/example/desktop:latest"
//! host_config_path = "$HOME/.desktop"
//! container_config_path = "/home/agent/.config"
//! engine_socket = "unix:///run/user/1000/podman/podman.sock"
//! ```
//!
//! Each key can also be supplied through the environment as
//! `ANTHROPIC_API_KEY`, `DOCKER_IMAGE`, `HOST_CONFIG_PATH`,
//! `CONTAINER_CONFIG_PATH`, `DESKPOD_ENGINE_SOCKET` and
//! `DESKPOD_CONTAINER_NAME`.

mod cli;
mod loader;
mod run_config;
mod types;

#[cfg(test)]
mod tests;

pub use cli::Cli;
pub use loader::{env_var_names, load_config};
pub use run_config::RunConfig;
pub use types::AppConfig;
