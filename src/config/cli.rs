//! Command-line argument definitions for deskpod.

use camino::Utf8PathBuf;
use clap::Parser;

/// Command-line interface for deskpod.
///
/// Every flag is optional; running with no arguments launches the container
/// described by configuration.
#[derive(Debug, Default, Parser)]
#[command(name = "deskpod")]
#[command(
    author,
    version,
    about = "Launch a desktop container and tear it down on Ctrl-C"
)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Container engine socket path or URL.
    ///
    /// Used by ambient discovery on Linux and Windows, and on macOS only when
    /// `docker context inspect` succeeds. Otherwise macOS probes the Docker
    /// Desktop and standard sockets and ignores this value.
    #[arg(long)]
    pub engine_socket: Option<String>,

    /// Container image to run.
    #[arg(long)]
    pub image: Option<String>,
}
