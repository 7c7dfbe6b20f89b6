//! Configuration loading with layered precedence.
//!
//! Layers, lowest to highest: application defaults, configuration file,
//! environment variables, command-line arguments. Layers are pushed into an
//! `ortho_config` `MergeComposer` by hand so that:
//!
//! - an explicit `--config` path is honoured before discovery runs,
//! - environment variables keep their established names (`ANTHROPIC_API_KEY`,
//!   `DOCKER_IMAGE`, ...) instead of a uniform prefix,
//! - environment access goes through `mockable::Env` and can be faked in
//!   tests.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::{AppConfig, Cli};
use crate::error::{ConfigError, Result};

/// Maps one environment variable onto an `AppConfig` field.
struct EnvVarSpec {
    env_var: &'static str,
    field: &'static str,
}

/// Environment variables read by the loader.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "ANTHROPIC_API_KEY",
        field: "api_key",
    },
    EnvVarSpec {
        env_var: "DOCKER_IMAGE",
        field: "image",
    },
    EnvVarSpec {
        env_var: "HOST_CONFIG_PATH",
        field: "host_config_path",
    },
    EnvVarSpec {
        env_var: "CONTAINER_CONFIG_PATH",
        field: "container_config_path",
    },
    EnvVarSpec {
        env_var: "DESKPOD_ENGINE_SOCKET",
        field: "engine_socket",
    },
    EnvVarSpec {
        env_var: "DESKPOD_CONTAINER_NAME",
        field: "container_name",
    },
];

/// Names of the environment variables the loader reads.
///
/// Tests use this to clear the environment without hard-coding the list.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Read a TOML configuration file through `cap_std` and push it as a layer.
fn load_config_file(path: &Utf8Path, composer: &mut MergeComposer) -> Result<()> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| ConfigError::ParseError {
        message: format!("{path} does not name a file"),
    })?;

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;
    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;
    let value = toml::from_str::<Value>(&content).map_err(|e| ConfigError::ParseError {
        message: format!("failed to parse {path}: {e}"),
    })?;

    tracing::debug!(%path, "loaded configuration file");
    composer.push_file(value, Some(path.to_path_buf()));
    Ok(())
}

/// Locate the configuration file, if any.
///
/// An explicit `--config` path must exist. Otherwise the first existing
/// discovery candidate is used, and having none is not an error.
fn config_file_path(cli: &Cli) -> Result<Option<Utf8PathBuf>> {
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(ConfigError::InvalidValue {
                field: String::from("--config"),
                reason: format!("configuration file {path} does not exist"),
            }
            .into());
        }
        return Ok(Some(path.clone()));
    }

    let discovery = ConfigDiscovery::builder("deskpod")
        .env_var("DESKPOD_CONFIG_PATH")
        .config_file_name("config.toml")
        .dotfile_name(".deskpod.toml")
        .build();
    Ok(discovery
        .candidates()
        .into_iter()
        .filter(|candidate| candidate.exists())
        .find_map(|candidate| Utf8PathBuf::try_from(candidate).ok()))
}

/// Load configuration with full layer precedence.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when an explicit `--config` file does
/// not exist, `ConfigError::ParseError` when the file cannot be read or
/// parsed, and `ConfigError::OrthoConfig` when the layers cannot be merged.
pub fn load_config<E: mockable::Env>(cli: &Cli, env: &E) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(path) = config_file_path(cli)? {
        load_config_file(&path, &mut composer)?;
    }

    let env_values = collect_env_vars(env);
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    Ok(config)
}

/// Collect the mapped environment variables into a JSON object.
///
/// Empty values are skipped so they cannot mask a value from the file layer.
fn collect_env_vars<E: mockable::Env>(env: &E) -> Value {
    let root: Map<String, Value> = ENV_VAR_SPECS
        .iter()
        .filter_map(|spec| {
            env.string(spec.env_var)
                .filter(|value| !value.trim().is_empty())
                .map(|value| (String::from(spec.field), Value::String(value)))
        })
        .collect();

    if root.is_empty() {
        Value::Null
    } else {
        Value::Object(root)
    }
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();

    if let Some(socket) = &cli.engine_socket {
        overrides.insert(String::from("engine_socket"), Value::String(socket.clone()));
    }
    if let Some(image) = &cli.image {
        overrides.insert(String::from("image"), Value::String(image.clone()));
    }

    if overrides.is_empty() {
        Value::Null
    } else {
        Value::Object(overrides)
    }
}
